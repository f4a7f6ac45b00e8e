/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fmt::Arguments;
use std::str::FromStr;

use itoa::Integer;
use ryu::Float;
use slog::{KV, Level, OwnedKVList, Record, Serializer};

use super::{Priority, key};

macro_rules! impl_integer_by_itoa {
    ($t:ty => $f:ident) => {
        fn $f(&mut self, key: slog::Key, val: $t) -> slog::Result {
            self.emit_integer(key, val)
        }
    };
}

macro_rules! impl_float_by_ryu {
    ($t:ty => $f:ident) => {
        fn $f(&mut self, key: slog::Key, val: $t) -> slog::Result {
            self.emit_float(key, val)
        }
    };
}

/// The well known facade keys of a record, split from the free form ones.
#[derive(Debug, Default)]
pub struct LogFields {
    pub module: Option<String>,
    pub group: Option<String>,
    pub priority: Option<Priority>,
    pub file: Option<String>,
    pub line: Option<u32>,
    pub function: Option<String>,
    pub pairs: Vec<(String, String)>,
}

impl LogFields {
    pub fn collect(record: &Record, logger_values: &OwnedKVList) -> Result<Self, slog::Error> {
        let mut fields = LogFields::default();
        let mut serializer = FieldsSerializer(&mut fields);
        record.kv().serialize(record, &mut serializer)?;
        logger_values.serialize(record, &mut serializer)?;
        Ok(fields)
    }

    pub fn priority_or(&self, level: Level) -> Priority {
        self.priority.unwrap_or_else(|| Priority::from_slog_level(level))
    }

    /// `module/group`, or whichever of the two is present.
    pub fn scope(&self) -> Option<String> {
        match (&self.module, &self.group) {
            (Some(m), Some(g)) => Some(format!("{m}/{g}")),
            (Some(m), None) => Some(m.clone()),
            (None, Some(g)) => Some(g.clone()),
            (None, None) => None,
        }
    }

    /// `file:line function` as reported by the caller.
    pub fn location(&self) -> Option<String> {
        let file = self.file.as_deref()?;
        let mut s = String::with_capacity(file.len() + 16);
        s.push_str(file);
        if let Some(line) = self.line {
            s.push(':');
            s.push_str(itoa::Buffer::new().format(line));
        }
        if let Some(function) = self.function.as_deref()
            && !function.is_empty()
        {
            s.push(' ');
            s.push_str(function);
        }
        Some(s)
    }
}

struct FieldsSerializer<'a>(&'a mut LogFields);

impl FieldsSerializer<'_> {
    fn emit_integer<T: Integer>(&mut self, key: slog::Key, value: T) -> slog::Result {
        let mut buffer = itoa::Buffer::new();
        let value_s = buffer.format(value);
        self.emit_str(key, value_s)
    }

    fn emit_float<T: Float>(&mut self, key: slog::Key, value: T) -> slog::Result {
        let mut buffer = ryu::Buffer::new();
        let value_s = buffer.format(value);
        self.emit_str(key, value_s)
    }
}

impl Serializer for FieldsSerializer<'_> {
    impl_integer_by_itoa!(usize => emit_usize);
    impl_integer_by_itoa!(isize => emit_isize);
    impl_integer_by_itoa!(u8 => emit_u8);
    impl_integer_by_itoa!(i8 => emit_i8);
    impl_integer_by_itoa!(u16 => emit_u16);
    impl_integer_by_itoa!(i16 => emit_i16);
    impl_integer_by_itoa!(u32 => emit_u32);
    impl_integer_by_itoa!(i32 => emit_i32);
    impl_integer_by_itoa!(u64 => emit_u64);
    impl_integer_by_itoa!(i64 => emit_i64);
    impl_float_by_ryu!(f32 => emit_f32);
    impl_float_by_ryu!(f64 => emit_f64);

    fn emit_bool(&mut self, key: slog::Key, value: bool) -> slog::Result {
        self.emit_str(key, if value { "true" } else { "false" })
    }

    fn emit_char(&mut self, key: slog::Key, value: char) -> slog::Result {
        self.emit_str(key, value.encode_utf8(&mut [0u8; 4]))
    }

    fn emit_none(&mut self, _key: slog::Key) -> slog::Result {
        Ok(())
    }

    fn emit_str(&mut self, key: slog::Key, value: &str) -> slog::Result {
        // inner values are serialized first, so the first one seen wins
        match key {
            key::MODULE => set_once(&mut self.0.module, value),
            key::GROUP => set_once(&mut self.0.group, value),
            key::FILE => set_once(&mut self.0.file, value),
            key::FUNCTION => set_once(&mut self.0.function, value),
            key::PRIORITY => {
                if self.0.priority.is_none() {
                    self.0.priority = Priority::from_str(value).ok();
                }
            }
            key::LINE => {
                if self.0.line.is_none() {
                    self.0.line = u32::from_str(value).ok();
                }
            }
            _ => self.0.pairs.push((key.to_string(), value.to_string())),
        }
        Ok(())
    }

    fn emit_arguments(&mut self, key: slog::Key, value: &Arguments) -> slog::Result {
        if let Some(s) = value.as_str() {
            self.emit_str(key, s)
        } else {
            let s = std::fmt::format(*value);
            self.emit_str(key, &s)
        }
    }
}

fn set_once(field: &mut Option<String>, value: &str) {
    if field.is_none() {
        *field = Some(value.to_string());
    }
}
