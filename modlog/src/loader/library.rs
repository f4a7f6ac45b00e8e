/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::ffi::{CStr, CString, c_void};
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};

use super::{FnTable, FreeLogFn, GetLogFn, LogFn, SymbolNames};

/// A library opened with `dlopen`, closed on drop.
pub struct SharedLibrary {
    handle: *mut c_void,
    path: PathBuf,
}

// the dl* functions are thread safe and the handle is never mutated
unsafe impl Send for SharedLibrary {}
unsafe impl Sync for SharedLibrary {}

fn last_dl_error() -> String {
    let p = unsafe { libc::dlerror() };
    if p.is_null() {
        "unknown error".to_string()
    } else {
        unsafe { CStr::from_ptr(p) }.to_string_lossy().into_owned()
    }
}

impl SharedLibrary {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let c_path = CString::new(path.as_os_str().as_bytes())
            .map_err(|_| anyhow!("nul byte in library path {}", path.display()))?;
        let handle = unsafe { libc::dlopen(c_path.as_ptr(), libc::RTLD_NOW | libc::RTLD_LOCAL) };
        if handle.is_null() {
            return Err(anyhow!(
                "failed to load library {}: {}",
                path.display(),
                last_dl_error()
            ));
        }
        Ok(SharedLibrary {
            handle,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Address of an exported symbol.
    pub fn symbol(&self, name: &str) -> anyhow::Result<*mut c_void> {
        let c_name = CString::new(name).map_err(|_| anyhow!("nul byte in symbol name {name}"))?;
        // clear any stale error so that a null symbol can be told apart
        unsafe { libc::dlerror() };
        let p = unsafe { libc::dlsym(self.handle, c_name.as_ptr()) };
        if p.is_null() {
            return Err(anyhow!(
                "symbol {name} not found in {}: {}",
                self.path.display(),
                last_dl_error()
            ));
        }
        Ok(p)
    }

    /// Resolve the logging functions.
    ///
    /// # Safety
    ///
    /// The symbols must be functions with the expected signatures. The table
    /// must not be used after this library is dropped.
    pub unsafe fn fn_table(&self, names: &SymbolNames) -> anyhow::Result<FnTable> {
        let get_log = self.symbol(&names.get_log).context("no acquire function")?;
        let log = self.symbol(&names.log).context("no write function")?;
        let free_log = self.symbol(&names.free_log).context("no release function")?;
        unsafe {
            Ok(FnTable {
                get_log: std::mem::transmute::<*mut c_void, GetLogFn>(get_log),
                log: std::mem::transmute::<*mut c_void, LogFn>(log),
                free_log: std::mem::transmute::<*mut c_void, FreeLogFn>(free_log),
            })
        }
    }
}

impl Drop for SharedLibrary {
    fn drop(&mut self) {
        unsafe { libc::dlclose(self.handle) };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_library() {
        let r = SharedLibrary::open(Path::new("/nonexistent/libmodlog-none.so"));
        let e = r.err().unwrap().to_string();
        assert!(e.contains("libmodlog-none.so"));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn missing_symbols() {
        let lib = SharedLibrary::open(Path::new("libc.so.6")).unwrap();
        assert!(lib.symbol("strlen").is_ok());
        assert!(lib.symbol("modlog_get_log").is_err());
        assert!(unsafe { lib.fn_table(&SymbolNames::default()) }.is_err());
    }
}
