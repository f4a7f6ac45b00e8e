/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::process::ExitCode;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use log::{debug, error, warn};

#[cfg(unix)]
use modlog::loader::DynamicBackend;
use modlog::{LogBackend, LogConfig, LogRecord, Priority, SlogBackend, WriteStatus};

mod opts;
use opts::{BackendSource, EmitArgs};

const PROGRAM_NAME: &str = "modlog-emit";
const FLUSH_TIMEOUT: Duration = Duration::from_secs(2);

fn emit<B: LogBackend>(backend: &B, args: &EmitArgs) -> anyhow::Result<WriteStatus> {
    if let Err(e) = Priority::from_str(&args.priority) {
        warn!("{e}, the backend decides what to do with it");
    }
    let handle = backend
        .acquire(&args.module, &args.group)
        .context(format!("failed to acquire logger {}/{}", args.module, args.group))?;
    debug!("acquired logger {}/{}: {handle:?}", args.module, args.group);

    let record = LogRecord {
        priority: &args.priority,
        file_name: &args.file,
        file_line: args.line,
        function_name: &args.function,
        message: &args.message,
    };
    let r = backend.write(handle, &record);
    if let Err(e) = &r {
        error!("write failed: {e}");
    }
    backend.release(&args.module, &args.group);
    Ok(WriteStatus::from(r))
}

fn run(args: &EmitArgs) -> anyhow::Result<WriteStatus> {
    match &args.source {
        BackendSource::Default => {
            let backend = SlogBackend::new(&LogConfig::default_stdout(), PROGRAM_NAME);
            let status = emit(&backend, args)?;
            backend.wait_idle(FLUSH_TIMEOUT);
            Ok(status)
        }
        BackendSource::Config(path) => {
            let config = LogConfig::load(path, PROGRAM_NAME)?;
            let backend = SlogBackend::new(&config, PROGRAM_NAME);
            let status = emit(&backend, args)?;
            if !backend.wait_idle(FLUSH_TIMEOUT) {
                error!("log drain still busy after {FLUSH_TIMEOUT:?}");
            }
            Ok(status)
        }
        #[cfg(unix)]
        BackendSource::Library(path, names) => {
            // the library is trusted the same way a linked one would be
            let backend = unsafe { DynamicBackend::open(path, names)? };
            emit(&backend, args)
        }
        #[cfg(not(unix))]
        BackendSource::Library(path, _) => Err(anyhow::anyhow!(
            "loading {} is not supported on this platform",
            path.display()
        )),
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let args = opts::parse(opts::get_matches())?;
    let _log_guard = modlog::process::setup(args.process_log.clone(), args.verbose_level)
        .context("failed to setup process logger")?;

    let status = run(&args)?;
    Ok(ExitCode::from(status.as_raw() as u8))
}
