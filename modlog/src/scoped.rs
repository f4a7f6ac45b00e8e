/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use modlog_types::log::Priority;

use crate::{AcquireError, LogBackend, LogRecord, LoggerHandle, WriteError};

/// A logger released when dropped.
///
/// Guards for the same module/group pair share one logger, so dropping any of
/// them invalidates the others too.
pub struct ScopedLogger<B: LogBackend> {
    backend: B,
    module_id: String,
    group_id: String,
    handle: LoggerHandle,
}

impl<B: LogBackend> ScopedLogger<B> {
    pub fn acquire(backend: B, module_id: &str, group_id: &str) -> Result<Self, AcquireError> {
        let handle = backend.acquire(module_id, group_id)?;
        Ok(ScopedLogger {
            backend,
            module_id: module_id.to_string(),
            group_id: group_id.to_string(),
            handle,
        })
    }

    pub fn handle(&self) -> LoggerHandle {
        self.handle
    }

    pub fn module_id(&self) -> &str {
        &self.module_id
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    pub fn write(
        &self,
        priority: Priority,
        file_name: &str,
        file_line: u32,
        function_name: &str,
        message: &str,
    ) -> Result<(), WriteError> {
        let record = LogRecord::new(priority, file_name, file_line, function_name, message);
        self.backend.write(self.handle, &record)
    }

    pub fn write_record(&self, record: &LogRecord<'_>) -> Result<(), WriteError> {
        self.backend.write(self.handle, record)
    }
}

impl<B: LogBackend> Drop for ScopedLogger<B> {
    fn drop(&mut self) {
        self.backend.release(&self.module_id, &self.group_id);
    }
}

/// Path of the enclosing function.
#[macro_export]
macro_rules! function_name {
    () => {{
        fn f() {}
        let name = ::std::any::type_name_of_val(&f);
        name.strip_suffix("::f").unwrap_or(name)
    }};
}

/// Write through a [`ScopedLogger`] with the location of the call site.
///
/// ```ignore
/// modlog!(logger, Priority::Error, "retry {} failed", n)?;
/// ```
#[macro_export]
macro_rules! modlog {
    ($logger:expr, $priority:expr, $($arg:tt)+) => {
        $logger.write(
            $priority,
            ::std::file!(),
            ::std::line!(),
            $crate::function_name!(),
            &::std::format!($($arg)+),
        )
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LogConfig, SlogBackend};

    #[test]
    fn release_on_drop() {
        let backend = SlogBackend::new(&LogConfig::default_discard(), "test");
        {
            let logger = ScopedLogger::acquire(&backend, "camera", "acquisition").unwrap();
            assert_eq!(backend.logger_count(), 1);
            logger
                .write(Priority::Error, "main.c", 42, "doWork", "disk full")
                .unwrap();
            assert_eq!(logger.module_id(), "camera");
        }
        assert_eq!(backend.logger_count(), 0);
        assert_eq!(backend.module_count(), 0);
    }

    #[test]
    fn macro_location() {
        let backend = SlogBackend::new(&LogConfig::default_discard(), "test");
        let logger = ScopedLogger::acquire(&backend, "camera", "macro").unwrap();
        modlog!(logger, Priority::Notice, "frame {} dropped", 7).unwrap();
        assert_eq!(backend.stats().written, 1);
    }

    #[test]
    fn enclosing_function() {
        let name = function_name!();
        assert!(name.ends_with("tests::enclosing_function"));
    }

    #[test]
    fn acquire_failure() {
        let backend = SlogBackend::new(&LogConfig::default_discard(), "test");
        assert!(ScopedLogger::acquire(&backend, "", "g").is_err());
        assert_eq!(backend.logger_count(), 0);
    }
}
