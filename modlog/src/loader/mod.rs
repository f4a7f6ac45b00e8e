/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

//! Bind any library exporting the three logging functions to [`LogBackend`].

use std::ffi::{CString, c_char, c_int, c_void};
#[cfg(unix)]
use std::sync::Arc;

use crate::{AcquireError, LogBackend, LogRecord, LoggerHandle, WriteError};

#[cfg(unix)]
mod library;
#[cfg(unix)]
pub use library::SharedLibrary;

pub type GetLogFn = unsafe extern "C" fn(*const c_char, *const c_char) -> *mut c_void;
pub type LogFn = unsafe extern "C" fn(
    *mut c_void,
    *const c_char,
    *const c_char,
    c_int,
    *const c_char,
    *const c_char,
) -> c_int;
pub type FreeLogFn = unsafe extern "C" fn(*const c_char, *const c_char);

#[derive(Clone, Copy, Debug)]
pub struct FnTable {
    pub get_log: GetLogFn,
    pub log: LogFn,
    pub free_log: FreeLogFn,
}

impl FnTable {
    /// The exports of this crate.
    pub fn local() -> Self {
        FnTable {
            get_log: crate::ffi::modlog_get_log,
            log: crate::ffi::modlog_log,
            free_log: crate::ffi::modlog_free_log,
        }
    }
}

/// Names of the exported functions to look up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SymbolNames {
    pub get_log: String,
    pub log: String,
    pub free_log: String,
}

impl Default for SymbolNames {
    fn default() -> Self {
        SymbolNames {
            get_log: "modlog_get_log".to_string(),
            log: "modlog_log".to_string(),
            free_log: "modlog_free_log".to_string(),
        }
    }
}

/// A backend reached through a table of C functions.
pub struct DynamicBackend {
    table: FnTable,
    #[cfg(unix)]
    _library: Option<Arc<SharedLibrary>>,
}

impl DynamicBackend {
    /// # Safety
    ///
    /// The functions must follow the logging contract and be callable from
    /// any thread for as long as the backend lives.
    pub unsafe fn new(table: FnTable) -> Self {
        DynamicBackend {
            table,
            #[cfg(unix)]
            _library: None,
        }
    }

    /// Use the exports of this crate.
    pub fn local() -> Self {
        // our own exports are thread safe
        unsafe { DynamicBackend::new(FnTable::local()) }
    }

    /// Load a shared library and resolve its logging functions.
    ///
    /// # Safety
    ///
    /// Loading a library runs its initialization code, and the resolved
    /// symbols must have the expected signatures.
    #[cfg(unix)]
    pub unsafe fn open(path: &std::path::Path, names: &SymbolNames) -> anyhow::Result<Self> {
        let library = SharedLibrary::open(path)?;
        let table = unsafe { library.fn_table(names)? };
        Ok(DynamicBackend {
            table,
            _library: Some(Arc::new(library)),
        })
    }

    pub fn table(&self) -> &FnTable {
        &self.table
    }
}

fn to_cstring<E>(s: &str, e: E) -> Result<CString, E> {
    CString::new(s).map_err(|_| e)
}

impl LogBackend for DynamicBackend {
    fn acquire(&self, module_id: &str, group_id: &str) -> Result<LoggerHandle, AcquireError> {
        let module = to_cstring(module_id, AcquireError::InvalidString("module"))?;
        let group = to_cstring(group_id, AcquireError::InvalidString("group"))?;
        let p = unsafe { (self.table.get_log)(module.as_ptr(), group.as_ptr()) };
        LoggerHandle::from_ptr(p).ok_or_else(|| {
            AcquireError::Unavailable(format!("no logger returned for {module_id}/{group_id}"))
        })
    }

    fn write(&self, handle: LoggerHandle, record: &LogRecord<'_>) -> Result<(), WriteError> {
        let priority = to_cstring(record.priority, WriteError::InvalidString("priority"))?;
        let file_name = to_cstring(record.file_name, WriteError::InvalidString("file name"))?;
        let function_name =
            to_cstring(record.function_name, WriteError::InvalidString("function name"))?;
        let message = to_cstring(record.message, WriteError::InvalidString("message"))?;
        let file_line = c_int::try_from(record.file_line)
            .map_err(|_| WriteError::InvalidLine(record.file_line.into()))?;

        let r = unsafe {
            (self.table.log)(
                handle.as_ptr(),
                priority.as_ptr(),
                file_name.as_ptr(),
                file_line,
                function_name.as_ptr(),
                message.as_ptr(),
            )
        };
        if r == 0 {
            Ok(())
        } else {
            Err(WriteError::Rejected(r))
        }
    }

    fn release(&self, module_id: &str, group_id: &str) {
        let (Ok(module), Ok(group)) = (CString::new(module_id), CString::new(group_id)) else {
            return;
        };
        unsafe { (self.table.free_log)(module.as_ptr(), group.as_ptr()) }
    }
}

#[cfg(test)]
mod tests {
    use std::ffi::CStr;
    use std::sync::Mutex;

    use super::*;
    use crate::{Priority, WriteStatus};

    static CALLS: Mutex<Vec<String>> = Mutex::new(Vec::new());

    unsafe fn s(p: *const c_char) -> String {
        unsafe { CStr::from_ptr(p) }.to_string_lossy().into_owned()
    }

    unsafe extern "C" fn fake_get_log(module: *const c_char, group: *const c_char) -> *mut c_void {
        let (module, group) = unsafe { (s(module), s(group)) };
        CALLS.lock().unwrap().push(format!("get {module}/{group}"));
        if module == "broken" {
            std::ptr::null_mut()
        } else {
            0x10 as *mut c_void
        }
    }

    unsafe extern "C" fn fake_log(
        logger: *mut c_void,
        priority: *const c_char,
        file_name: *const c_char,
        file_line: c_int,
        function_name: *const c_char,
        msg: *const c_char,
    ) -> c_int {
        let line = unsafe {
            format!(
                "log {} {} {}:{file_line} {} {}",
                logger as usize,
                s(priority),
                s(file_name),
                s(function_name),
                s(msg)
            )
        };
        CALLS.lock().unwrap().push(line);
        let priority = unsafe { s(priority) };
        if priority == "Error" { 0 } else { 1 }
    }

    unsafe extern "C" fn fake_free_log(module: *const c_char, group: *const c_char) {
        let (module, group) = unsafe { (s(module), s(group)) };
        CALLS.lock().unwrap().push(format!("free {module}/{group}"));
    }

    #[test]
    fn fake_table() {
        let backend = unsafe {
            DynamicBackend::new(FnTable {
                get_log: fake_get_log,
                log: fake_log,
                free_log: fake_free_log,
            })
        };

        let h = backend.acquire("camera", "acquisition").unwrap();
        assert_eq!(h.as_raw(), 0x10);
        assert!(matches!(
            backend.acquire("broken", "x"),
            Err(AcquireError::Unavailable(_))
        ));

        let r = LogRecord::new(Priority::Error, "main.c", 42, "doWork", "disk full");
        assert_eq!(backend.write_status(h, &r), WriteStatus::Success);
        let r = LogRecord::new(Priority::Debug, "main.c", 43, "doWork", "ignored");
        assert_eq!(backend.write(h, &r), Err(WriteError::Rejected(1)));

        let r = LogRecord::new(Priority::Error, "main.c", 44, "doWork", "nul\0inside");
        assert_eq!(backend.write(h, &r), Err(WriteError::InvalidString("message")));

        backend.release("camera", "acquisition");

        let calls = CALLS.lock().unwrap();
        assert_eq!(
            *calls,
            [
                "get camera/acquisition",
                "get broken/x",
                "log 16 Error main.c:42 doWork disk full",
                "log 16 Debug main.c:43 doWork ignored",
                "free camera/acquisition",
            ]
        );
    }

    #[test]
    fn line_out_of_range() {
        let backend = DynamicBackend::local();
        let h = LoggerHandle::from_raw(1).unwrap();
        let mut r = LogRecord::new(Priority::Error, "main.c", 0, "doWork", "m");
        r.file_line = u32::MAX;
        assert_eq!(
            backend.write(h, &r),
            Err(WriteError::InvalidLine(u32::MAX.into()))
        );
    }

    #[test]
    fn default_symbol_names() {
        let names = SymbolNames::default();
        assert_eq!(names.get_log, "modlog_get_log");
        assert_eq!(names.log, "modlog_log");
        assert_eq!(names.free_log, "modlog_free_log");
    }
}
