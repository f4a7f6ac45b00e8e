/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::ffi::{c_int, c_void};
use std::num::NonZeroUsize;
use std::sync::Arc;

use thiserror::Error;

use modlog_types::log::Priority;

/// Opaque reference to a logger returned by [`LogBackend::acquire`].
///
/// It is only meaningful to the backend that issued it, and only until the
/// matching release.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LoggerHandle(NonZeroUsize);

impl LoggerHandle {
    pub const fn new(id: NonZeroUsize) -> Self {
        LoggerHandle(id)
    }

    pub fn from_raw(raw: usize) -> Option<Self> {
        NonZeroUsize::new(raw).map(LoggerHandle)
    }

    pub fn from_ptr(ptr: *mut c_void) -> Option<Self> {
        Self::from_raw(ptr as usize)
    }

    pub const fn as_raw(&self) -> usize {
        self.0.get()
    }

    pub fn as_ptr(&self) -> *mut c_void {
        self.0.get() as *mut c_void
    }
}

/// One log statement, borrowed from the caller for the duration of a write.
#[derive(Clone, Copy, Debug)]
pub struct LogRecord<'a> {
    pub priority: &'a str,
    pub file_name: &'a str,
    pub file_line: u32,
    pub function_name: &'a str,
    pub message: &'a str,
}

impl<'a> LogRecord<'a> {
    pub fn new(
        priority: Priority,
        file_name: &'a str,
        file_line: u32,
        function_name: &'a str,
        message: &'a str,
    ) -> Self {
        LogRecord {
            priority: priority.as_str(),
            file_name,
            file_line,
            function_name,
            message,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AcquireError {
    #[error("empty {0} identifier")]
    EmptyIdentifier(&'static str),
    #[error("group identifier equals module identifier '{0}'")]
    GroupIsModule(String),
    #[error("invalid {0} string")]
    InvalidString(&'static str),
    #[error("log backend unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WriteError {
    #[error("invalid or released logger handle")]
    InvalidHandle,
    #[error("unrecognized log priority '{0}'")]
    UnknownPriority(String),
    #[error("invalid {0} string")]
    InvalidString(&'static str),
    #[error("invalid file line {0}")]
    InvalidLine(i64),
    #[error("log backend returned status {0}")]
    Rejected(c_int),
    #[error("log backend unavailable: {0}")]
    Unavailable(String),
}

/// The binary outcome of a write as seen through the C ABI.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(i32)]
pub enum WriteStatus {
    Success = 0,
    Failure = 1,
}

impl WriteStatus {
    pub const fn as_raw(self) -> c_int {
        self as c_int
    }

    pub const fn is_success(self) -> bool {
        matches!(self, WriteStatus::Success)
    }
}

impl<E> From<Result<(), E>> for WriteStatus {
    fn from(r: Result<(), E>) -> Self {
        match r {
            Ok(_) => WriteStatus::Success,
            Err(_) => WriteStatus::Failure,
        }
    }
}

/// The three operations every logging backend provides.
///
/// Implementations must accept calls from any thread.
pub trait LogBackend: Send + Sync {
    fn acquire(&self, module_id: &str, group_id: &str) -> Result<LoggerHandle, AcquireError>;

    fn write(&self, handle: LoggerHandle, record: &LogRecord<'_>) -> Result<(), WriteError>;

    /// Invalidate every handle issued for the pair. Unknown pairs are ignored.
    fn release(&self, module_id: &str, group_id: &str);

    fn write_status(&self, handle: LoggerHandle, record: &LogRecord<'_>) -> WriteStatus {
        self.write(handle, record).into()
    }
}

impl<B: LogBackend + ?Sized> LogBackend for &B {
    fn acquire(&self, module_id: &str, group_id: &str) -> Result<LoggerHandle, AcquireError> {
        (**self).acquire(module_id, group_id)
    }

    fn write(&self, handle: LoggerHandle, record: &LogRecord<'_>) -> Result<(), WriteError> {
        (**self).write(handle, record)
    }

    fn release(&self, module_id: &str, group_id: &str) {
        (**self).release(module_id, group_id)
    }
}

impl<B: LogBackend + ?Sized> LogBackend for Arc<B> {
    fn acquire(&self, module_id: &str, group_id: &str) -> Result<LoggerHandle, AcquireError> {
        (**self).acquire(module_id, group_id)
    }

    fn write(&self, handle: LoggerHandle, record: &LogRecord<'_>) -> Result<(), WriteError> {
        (**self).write(handle, record)
    }

    fn release(&self, module_id: &str, group_id: &str) {
        (**self).release(module_id, group_id)
    }
}
