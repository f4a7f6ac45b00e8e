/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fmt;
use std::str::FromStr;

use slog::Level;
use thiserror::Error;

/// Severity of a log statement.
///
/// The variants are declared from the least to the most severe one, so the
/// derived ordering gives `Priority::Fatal` as the maximum.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Priority {
    Trace,
    Debug,
    Information,
    Notice,
    Warning,
    Error,
    Critical,
    Fatal,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unrecognized log priority '{0}'")]
pub struct ParsePriorityError(pub String);

impl Priority {
    /// All priorities, in descending severity.
    pub const ALL: [Priority; 8] = [
        Priority::Fatal,
        Priority::Critical,
        Priority::Error,
        Priority::Warning,
        Priority::Notice,
        Priority::Information,
        Priority::Debug,
        Priority::Trace,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Priority::Fatal => "Fatal",
            Priority::Critical => "Critical",
            Priority::Error => "Error",
            Priority::Warning => "Warning",
            Priority::Notice => "Notice",
            Priority::Information => "Information",
            Priority::Debug => "Debug",
            Priority::Trace => "Trace",
        }
    }

    /// slog has six levels, so Fatal and Notice share a level with their
    /// neighbours. Sinks recover the exact priority from the record key.
    pub const fn as_slog_level(&self) -> Level {
        match self {
            Priority::Fatal | Priority::Critical => Level::Critical,
            Priority::Error => Level::Error,
            Priority::Warning => Level::Warning,
            Priority::Notice | Priority::Information => Level::Info,
            Priority::Debug => Level::Debug,
            Priority::Trace => Level::Trace,
        }
    }

    pub fn from_slog_level(level: Level) -> Self {
        match level {
            Level::Critical => Priority::Critical,
            Level::Error => Priority::Error,
            Level::Warning => Priority::Warning,
            Level::Info => Priority::Information,
            Level::Debug => Priority::Debug,
            Level::Trace => Priority::Trace,
        }
    }
}

impl FromStr for Priority {
    type Err = ParsePriorityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Priority::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParsePriorityError(s.to_string()))
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_canonical() {
        for p in Priority::ALL {
            assert_eq!(Priority::from_str(p.as_str()).unwrap(), p);
        }
    }

    #[test]
    fn parse_ignore_case() {
        assert_eq!(Priority::from_str("error").unwrap(), Priority::Error);
        assert_eq!(Priority::from_str("INFORMATION").unwrap(), Priority::Information);
        assert_eq!(Priority::from_str("tRaCe").unwrap(), Priority::Trace);
    }

    #[test]
    fn parse_unknown() {
        assert_eq!(
            Priority::from_str("Info").unwrap_err(),
            ParsePriorityError("Info".to_string())
        );
        assert!(Priority::from_str("").is_err());
        assert!(Priority::from_str("Warn").is_err());
        assert!(Priority::from_str(" Error").is_err());
    }

    #[test]
    fn severity_order() {
        for w in Priority::ALL.windows(2) {
            assert!(w[0] > w[1]);
        }
        assert_eq!(Priority::ALL.iter().max(), Some(&Priority::Fatal));
        assert_eq!(Priority::ALL.iter().min(), Some(&Priority::Trace));
    }

    #[test]
    fn slog_level() {
        assert_eq!(Priority::Fatal.as_slog_level(), Level::Critical);
        assert_eq!(Priority::Notice.as_slog_level(), Level::Info);
        assert_eq!(Priority::Information.as_slog_level(), Level::Info);
        assert_eq!(Priority::Trace.as_slog_level(), Level::Trace);

        for p in Priority::ALL {
            let back = Priority::from_slog_level(p.as_slog_level());
            assert_eq!(back.as_slog_level(), p.as_slog_level());
        }
    }

    #[test]
    fn display() {
        assert_eq!(Priority::Warning.to_string(), "Warning");
        assert_eq!(format!("{}", Priority::Information), "Information");
    }
}
