/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

//! C ABI exports of the process-wide backend.
//!
//! ```c
//! void *modlog_get_log(const char *module_id, const char *group_id);
//! int   modlog_log(void *logger, const char *priority, const char *file_name,
//!                  int file_line, const char *function_name, const char *msg);
//! void  modlog_free_log(const char *module_id, const char *group_id);
//! int   modlog_configure(const char *config_path);
//! const char *modlog_last_error(void);
//! ```
//!
//! The backend is created on first use from the yaml file named by the
//! `MODLOG_CONFIG` environment variable, or logs to stderr if it is unset.

use std::cell::RefCell;
use std::ffi::{CStr, CString, c_char, c_int, c_void};
use std::path::Path;
use std::ptr;
use std::sync::{Arc, PoisonError, RwLock};

use log::{debug, warn};

use crate::{
    AcquireError, LogBackend, LogConfig, LogRecord, LoggerHandle, SlogBackend, WriteError,
    WriteStatus,
};

pub const CONFIG_ENV_VAR: &str = "MODLOG_CONFIG";
const PROGRAM_NAME: &str = "modlog";

static GLOBAL_BACKEND: RwLock<Option<Arc<SlogBackend>>> = RwLock::new(None);

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error<E: std::fmt::Display>(e: E) {
    let msg = CString::new(e.to_string().replace('\0', " ")).ok();
    LAST_ERROR.with(|c| *c.borrow_mut() = msg);
}

fn load_env_config() -> anyhow::Result<LogConfig> {
    match std::env::var_os(CONFIG_ENV_VAR) {
        Some(path) => LogConfig::load(Path::new(&path), PROGRAM_NAME),
        None => Ok(LogConfig::default_stderr()),
    }
}

/// Get the process-wide backend, creating it if needed.
pub fn global_backend() -> anyhow::Result<Arc<SlogBackend>> {
    if let Some(backend) = GLOBAL_BACKEND
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .as_ref()
    {
        return Ok(Arc::clone(backend));
    }

    let mut slot = GLOBAL_BACKEND
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    if let Some(backend) = slot.as_ref() {
        return Ok(Arc::clone(backend));
    }
    let config = load_env_config()?;
    let backend = Arc::new(SlogBackend::new(&config, PROGRAM_NAME));
    *slot = Some(Arc::clone(&backend));
    Ok(backend)
}

/// Replace the process-wide backend.
///
/// Handles issued by the previous backend become invalid.
pub fn install_backend(backend: Arc<SlogBackend>) {
    let old = GLOBAL_BACKEND
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .replace(backend);
    if old.is_some() {
        debug!("process-wide log backend replaced");
    }
}

unsafe fn c_str<'a>(p: *const c_char) -> Option<Result<&'a str, std::str::Utf8Error>> {
    if p.is_null() {
        None
    } else {
        Some(unsafe { CStr::from_ptr(p) }.to_str())
    }
}

unsafe fn required_str<'a>(p: *const c_char, what: &'static str) -> Result<&'a str, &'static str> {
    match unsafe { c_str(p) } {
        Some(Ok(s)) => Ok(s),
        _ => Err(what),
    }
}

// a missing location is not worth losing the message for
unsafe fn optional_str<'a>(p: *const c_char, what: &'static str) -> Result<&'a str, &'static str> {
    match unsafe { c_str(p) } {
        None => Ok(""),
        Some(Ok(s)) => Ok(s),
        Some(Err(_)) => Err(what),
    }
}

/// Acquire a logger for the module/group pair.
///
/// Returns null on failure, see [`modlog_last_error`].
///
/// # Safety
///
/// Both arguments must be null or point to nul terminated strings.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn modlog_get_log(
    module_id: *const c_char,
    group_id: *const c_char,
) -> *mut c_void {
    let r = unsafe { get_log(module_id, group_id) };
    match r {
        Ok(handle) => handle.as_ptr(),
        Err(e) => {
            set_last_error(&e);
            ptr::null_mut()
        }
    }
}

unsafe fn get_log(
    module_id: *const c_char,
    group_id: *const c_char,
) -> Result<LoggerHandle, AcquireError> {
    let module_id =
        unsafe { required_str(module_id, "module") }.map_err(AcquireError::InvalidString)?;
    let group_id =
        unsafe { required_str(group_id, "group") }.map_err(AcquireError::InvalidString)?;
    let backend = global_backend().map_err(|e| AcquireError::Unavailable(format!("{e:#}")))?;
    backend.acquire(module_id, group_id)
}

/// Write one record. Returns 0 on success and 1 on failure.
///
/// # Safety
///
/// `logger` must be a value returned by [`modlog_get_log`] or null. The string
/// arguments must be null or point to nul terminated strings.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn modlog_log(
    logger: *mut c_void,
    priority: *const c_char,
    file_name: *const c_char,
    file_line: c_int,
    function_name: *const c_char,
    msg: *const c_char,
) -> c_int {
    let r = unsafe { write_record(logger, priority, file_name, file_line, function_name, msg) };
    if let Err(e) = &r {
        set_last_error(e);
    }
    WriteStatus::from(r).as_raw()
}

unsafe fn write_record(
    logger: *mut c_void,
    priority: *const c_char,
    file_name: *const c_char,
    file_line: c_int,
    function_name: *const c_char,
    msg: *const c_char,
) -> Result<(), WriteError> {
    let handle = LoggerHandle::from_ptr(logger).ok_or(WriteError::InvalidHandle)?;
    let file_line =
        u32::try_from(file_line).map_err(|_| WriteError::InvalidLine(file_line.into()))?;
    let record = LogRecord {
        priority: unsafe { required_str(priority, "priority") }
            .map_err(WriteError::InvalidString)?,
        file_name: unsafe { optional_str(file_name, "file name") }
            .map_err(WriteError::InvalidString)?,
        file_line,
        function_name: unsafe { optional_str(function_name, "function name") }
            .map_err(WriteError::InvalidString)?,
        message: unsafe { required_str(msg, "message") }.map_err(WriteError::InvalidString)?,
    };
    let backend = global_backend().map_err(|e| WriteError::Unavailable(format!("{e:#}")))?;
    backend.write(handle, &record)
}

/// Release the module/group pair. Unknown pairs are ignored.
///
/// # Safety
///
/// Both arguments must be null or point to nul terminated strings.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn modlog_free_log(module_id: *const c_char, group_id: *const c_char) {
    let module_id = unsafe { required_str(module_id, "module") };
    let group_id = unsafe { required_str(group_id, "group") };
    let (Ok(module_id), Ok(group_id)) = (module_id, group_id) else {
        set_last_error("invalid module or group string");
        return;
    };
    match global_backend() {
        Ok(backend) => backend.release(module_id, group_id),
        Err(e) => warn!("unable to release logger {module_id}/{group_id}: {e:#}"),
    }
}

/// Load a yaml config file and replace the process-wide backend with it.
///
/// Returns 0 on success and 1 on failure, in which case the current backend
/// is kept.
///
/// # Safety
///
/// `config_path` must be null or point to a nul terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn modlog_configure(config_path: *const c_char) -> c_int {
    let path = match unsafe { required_str(config_path, "config path") } {
        Ok(s) => s,
        Err(what) => {
            set_last_error(format!("invalid {what} string"));
            return WriteStatus::Failure.as_raw();
        }
    };
    match LogConfig::load(Path::new(path), PROGRAM_NAME) {
        Ok(config) => {
            install_backend(Arc::new(SlogBackend::new(&config, PROGRAM_NAME)));
            WriteStatus::Success.as_raw()
        }
        Err(e) => {
            set_last_error(format!("{e:#}"));
            WriteStatus::Failure.as_raw()
        }
    }
}

/// The message of the last failure on the calling thread, or null.
///
/// The string stays valid until the next failing call on the same thread.
#[unsafe(no_mangle)]
pub extern "C" fn modlog_last_error() -> *const c_char {
    LAST_ERROR.with(|c| match c.borrow().as_ref() {
        Some(s) => s.as_ptr(),
        None => ptr::null(),
    })
}
