/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, anyhow};
use yaml_rust::Yaml;

#[cfg(unix)]
use modlog_syslog::SyslogBuilder;
use modlog_types::log::{AsyncLogConfig, Priority};

const DEFAULT_CHANNEL_SIZE: usize = 4096;
const IO_ERROR_SAMPLING_OFFSET_MAX: usize = 16;
const IO_ERROR_SAMPLING_OFFSET_DEFAULT: usize = 10;

#[derive(Clone, Debug)]
pub enum LogConfigDriver {
    Discard,
    Stdout,
    Stderr,
    #[cfg(unix)]
    Syslog(SyslogBuilder),
}

/// What to do when a group identifier equals its module identifier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GroupPolicy {
    Allow,
    #[default]
    Warn,
    Reject,
}

impl FromStr for GroupPolicy {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "allow" => Ok(GroupPolicy::Allow),
            "warn" => Ok(GroupPolicy::Warn),
            "reject" | "deny" => Ok(GroupPolicy::Reject),
            _ => Err(()),
        }
    }
}

/// What to do with a priority name outside the eight known ones.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UnknownPriorityPolicy {
    #[default]
    Reject,
    Fallback(Priority),
}

#[derive(Clone, Debug)]
pub struct LogConfig {
    pub(crate) driver: LogConfigDriver,
    pub(crate) async_channel_size: usize,
    pub(crate) async_thread_number: usize,
    pub(crate) io_err_sampling_mask: usize,
    pub(crate) min_priority: Priority,
    pub(crate) group_policy: GroupPolicy,
    pub(crate) unknown_priority: UnknownPriorityPolicy,
    pub(crate) append_code_position: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig::default_stderr()
    }
}

impl LogConfig {
    fn with_driver(driver: LogConfigDriver) -> Self {
        LogConfig {
            driver,
            async_channel_size: DEFAULT_CHANNEL_SIZE,
            async_thread_number: 1,
            io_err_sampling_mask: (1 << IO_ERROR_SAMPLING_OFFSET_DEFAULT) - 1,
            min_priority: Priority::Trace,
            group_policy: GroupPolicy::default(),
            unknown_priority: UnknownPriorityPolicy::default(),
            append_code_position: true,
        }
    }

    pub fn default_discard() -> Self {
        Self::with_driver(LogConfigDriver::Discard)
    }

    pub fn default_stdout() -> Self {
        Self::with_driver(LogConfigDriver::Stdout)
    }

    pub fn default_stderr() -> Self {
        Self::with_driver(LogConfigDriver::Stderr)
    }

    #[cfg(unix)]
    pub fn default_syslog(program_name: &str) -> Self {
        Self::with_driver(LogConfigDriver::Syslog(SyslogBuilder::with_ident(
            program_name.to_string(),
        )))
    }

    pub fn driver(&self) -> &LogConfigDriver {
        &self.driver
    }

    pub fn min_priority(&self) -> Priority {
        self.min_priority
    }

    pub fn set_min_priority(&mut self, priority: Priority) {
        self.min_priority = priority;
    }

    pub fn group_policy(&self) -> GroupPolicy {
        self.group_policy
    }

    pub fn set_group_policy(&mut self, policy: GroupPolicy) {
        self.group_policy = policy;
    }

    pub fn unknown_priority(&self) -> UnknownPriorityPolicy {
        self.unknown_priority
    }

    pub fn set_unknown_priority(&mut self, policy: UnknownPriorityPolicy) {
        self.unknown_priority = policy;
    }

    pub fn set_append_code_position(&mut self, enable: bool) {
        self.append_code_position = enable;
    }

    /// Zero is raised to one, a rendezvous channel would drop nearly every record.
    pub fn set_async_channel_size(&mut self, size: usize) {
        self.async_channel_size = size.max(1);
    }

    pub(crate) fn async_conf(&self, thread_name: &str) -> AsyncLogConfig {
        AsyncLogConfig {
            channel_capacity: self.async_channel_size,
            thread_number: self.async_thread_number,
            thread_name: thread_name.to_string(),
        }
    }

    pub fn load(path: &Path, program_name: &str) -> anyhow::Result<Self> {
        let doc = modlog_yaml::load_doc(path)?;
        LogConfig::parse(&doc, program_name)
            .context(format!("invalid log config in file {}", path.display()))
    }

    pub fn parse(v: &Yaml, program_name: &str) -> anyhow::Result<Self> {
        match v {
            Yaml::String(s) => LogConfig::default_for_driver(s, program_name),
            Yaml::Null => Ok(LogConfig::default_stderr()),
            Yaml::Hash(map) => {
                let mut config = LogConfig::default_stderr();
                modlog_yaml::foreach_kv(map, |k, v| {
                    match modlog_yaml::key::normalize(k).as_str() {
                        "driver" => {
                            let name = modlog_yaml::value::as_string(v)
                                .context(format!("invalid string value for key {k}"))?;
                            config.driver =
                                LogConfig::default_for_driver(&name, program_name)?.driver;
                            Ok(())
                        }
                        "discard" => {
                            config.driver = LogConfigDriver::Discard;
                            Ok(())
                        }
                        "stdout" => {
                            config.driver = LogConfigDriver::Stdout;
                            Ok(())
                        }
                        "stderr" => {
                            config.driver = LogConfigDriver::Stderr;
                            Ok(())
                        }
                        #[cfg(unix)]
                        "syslog" => {
                            let builder = SyslogBuilder::parse_yaml(v, program_name)
                                .context("invalid syslog config")?;
                            config.driver = LogConfigDriver::Syslog(builder);
                            Ok(())
                        }
                        "async_channel_size" | "channel_size" => {
                            let size = modlog_yaml::value::as_usize(v)
                                .context(format!("invalid usize value for key {k}"))?;
                            if size == 0 {
                                return Err(anyhow!("value for {k} should not be zero"));
                            }
                            config.async_channel_size = size;
                            Ok(())
                        }
                        "async_thread_number" | "thread_number" => {
                            let n = modlog_yaml::value::as_usize(v)
                                .context(format!("invalid usize value for key {k}"))?;
                            if n == 0 {
                                return Err(anyhow!("value for {k} should not be zero"));
                            }
                            config.async_thread_number = n;
                            Ok(())
                        }
                        "io_error_sampling_offset" => {
                            let offset = modlog_yaml::value::as_usize(v)
                                .context(format!("invalid value for key {k}"))?;
                            if offset > IO_ERROR_SAMPLING_OFFSET_MAX {
                                Err(anyhow!(
                                    "value for {k} should be less than {IO_ERROR_SAMPLING_OFFSET_MAX}"
                                ))
                            } else {
                                config.io_err_sampling_mask = (1 << offset) - 1;
                                Ok(())
                            }
                        }
                        "min_priority" | "priority" => {
                            config.min_priority = modlog_yaml::value::as_priority(v)
                                .context(format!("invalid priority value for key {k}"))?;
                            Ok(())
                        }
                        "group_policy" => {
                            let s = modlog_yaml::value::as_string(v)
                                .context(format!("invalid string value for key {k}"))?;
                            config.group_policy = GroupPolicy::from_str(&s)
                                .map_err(|_| anyhow!("unsupported group policy {s}"))?;
                            Ok(())
                        }
                        "unknown_priority" => {
                            let s = modlog_yaml::value::as_string(v)
                                .context(format!("invalid string value for key {k}"))?;
                            config.unknown_priority = if s.eq_ignore_ascii_case("reject") {
                                UnknownPriorityPolicy::Reject
                            } else {
                                let p = Priority::from_str(&s)?;
                                UnknownPriorityPolicy::Fallback(p)
                            };
                            Ok(())
                        }
                        "append_code_position" | "code_position" => {
                            config.append_code_position = modlog_yaml::value::as_bool(v)
                                .context(format!("invalid bool value for key {k}"))?;
                            Ok(())
                        }
                        _ => Err(anyhow!("invalid key {k}")),
                    }
                })?;
                Ok(config)
            }
            _ => Err(anyhow!("invalid value type")),
        }
    }

    #[cfg_attr(not(unix), allow(unused_variables))]
    fn default_for_driver(name: &str, program_name: &str) -> anyhow::Result<Self> {
        match name {
            "discard" => Ok(LogConfig::default_discard()),
            "stdout" => Ok(LogConfig::default_stdout()),
            "stderr" => Ok(LogConfig::default_stderr()),
            #[cfg(unix)]
            "syslog" => Ok(LogConfig::default_syslog(program_name)),
            _ => Err(anyhow!("invalid log driver {name}")),
        }
    }
}
