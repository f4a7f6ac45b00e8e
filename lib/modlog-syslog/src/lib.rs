/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

#![cfg(unix)]

use std::time::Duration;

use modlog_types::log::AsyncLogConfig;

mod async_streamer;
mod backend;
mod format;
mod types;

#[cfg(feature = "yaml")]
mod yaml;

pub use async_streamer::AsyncSyslogStreamer;
pub use backend::SyslogBackendBuilder;
pub use types::{Facility, Severity, encode_priority};

use async_streamer::DEFAULT_RECONNECT_INTERVAL;
use format::FormatterRfc3164;

pub(crate) struct SyslogHeader {
    pub(crate) facility: Facility,
    pub(crate) ident: String,
    pub(crate) pid: u32,
}

/// Builder of the local syslog drain.
#[derive(Clone, Debug)]
pub struct SyslogBuilder {
    ident: String,
    facility: Facility,
    backend: SyslogBackendBuilder,
    append_code_position: bool,
    reconnect_interval: Duration,
}

impl SyslogBuilder {
    pub fn with_ident(ident: String) -> Self {
        SyslogBuilder {
            ident,
            facility: Facility::User,
            backend: SyslogBackendBuilder::Default,
            append_code_position: false,
            reconnect_interval: DEFAULT_RECONNECT_INTERVAL,
        }
    }

    pub fn ident(&self) -> &str {
        &self.ident
    }

    pub fn set_ident(&mut self, ident: String) {
        self.ident = ident;
    }

    pub fn set_facility(&mut self, facility: Facility) {
        self.facility = facility;
    }

    pub fn set_backend(&mut self, backend: SyslogBackendBuilder) {
        self.backend = backend;
    }

    pub fn append_code_position(&mut self, enable: bool) {
        self.append_code_position = enable;
    }

    /// Minimum time between two connect attempts after a failure.
    pub fn set_reconnect_interval(&mut self, interval: Duration) {
        self.reconnect_interval = interval;
    }

    pub fn start_async(self, async_conf: &AsyncLogConfig) -> AsyncSyslogStreamer {
        let header = SyslogHeader {
            facility: self.facility,
            ident: self.ident,
            pid: std::process::id(),
        };
        let formatter = FormatterRfc3164::new(self.append_code_position);
        AsyncSyslogStreamer::new(
            async_conf,
            header,
            formatter,
            &self.backend,
            self.reconnect_interval,
        )
    }
}
