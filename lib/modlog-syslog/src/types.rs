/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use modlog_types::log::Priority;

#[allow(unused)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Facility {
    // generic user-level messages
    User = 1 << 3,
    // system daemons without separate facility value
    Daemon = 3 << 3,
    Local0 = 16 << 3,
    Local1 = 17 << 3,
    Local2 = 18 << 3,
    Local3 = 19 << 3,
    Local4 = 20 << 3,
    Local5 = 21 << 3,
    Local6 = 22 << 3,
    Local7 = 23 << 3,
}

impl Facility {
    pub fn from_name(name: &str) -> Option<Self> {
        let f = match name {
            "user" => Facility::User,
            "daemon" => Facility::Daemon,
            "local0" => Facility::Local0,
            "local1" => Facility::Local1,
            "local2" => Facility::Local2,
            "local3" => Facility::Local3,
            "local4" => Facility::Local4,
            "local5" => Facility::Local5,
            "local6" => Facility::Local6,
            "local7" => Facility::Local7,
            _ => return None,
        };
        Some(f)
    }
}

#[allow(unused)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Severity {
    // system is unusable
    Emergency,
    // action must be taken immediately
    Alert,
    // critical conditions
    Critical,
    // error conditions
    Error,
    // warning conditions
    Warning,
    // normal, but significant, condition
    Notice,
    // informational message
    Info,
    // debug-level message
    Debug,
}

impl From<Priority> for Severity {
    fn from(p: Priority) -> Self {
        match p {
            Priority::Fatal => Severity::Emergency,
            Priority::Critical => Severity::Critical,
            Priority::Error => Severity::Error,
            Priority::Warning => Severity::Warning,
            Priority::Notice => Severity::Notice,
            Priority::Information => Severity::Info,
            Priority::Debug | Priority::Trace => Severity::Debug,
        }
    }
}

/// The `PRI` part of a syslog message.
pub fn encode_priority(severity: Severity, facility: Facility) -> u8 {
    facility as u8 | severity as u8
}
