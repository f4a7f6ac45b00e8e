/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

mod async_log;
pub use async_log::{AsyncLogConfig, AsyncLogFormatter, AsyncLogger};

mod fields;
pub use fields::LogFields;

mod priority;
pub use priority::{ParsePriorityError, Priority};

mod stats;
pub use stats::{LogDropSnapshot, LogDropStats, LogIoSnapshot, LogIoStats, LogSnapshot, LogStats};

/// record keys shared by the facade and all sinks
pub mod key {
    pub const MODULE: &str = "module";
    pub const GROUP: &str = "group";
    pub const PRIORITY: &str = "priority";
    pub const FILE: &str = "file";
    pub const LINE: &str = "line";
    pub const FUNCTION: &str = "function";
}
