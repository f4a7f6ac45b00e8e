/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use slog::{OwnedKVList, Record};

use modlog_types::log::{AsyncLogFormatter, LogFields};

use super::StdLogValue;

pub struct StdLogFormatter {
    append_code_position: bool,
}

impl StdLogFormatter {
    pub(super) fn new(append_code_position: bool) -> Self {
        StdLogFormatter {
            append_code_position,
        }
    }

    fn code_position(&self, record: &Record, fields: &LogFields) -> Option<String> {
        if !self.append_code_position {
            return None;
        }
        // records written through the facade carry the caller location,
        // everything else falls back to the rust source position
        fields.location().or_else(|| {
            let file = record
                .file()
                .rsplit_once('/')
                .map(|x| x.1)
                .unwrap_or(record.file());
            Some(format!("{}({file}:{})", record.module(), record.line()))
        })
    }
}

impl AsyncLogFormatter<StdLogValue> for StdLogFormatter {
    fn format_slog(
        &self,
        record: &Record,
        logger_values: &OwnedKVList,
    ) -> Result<StdLogValue, slog::Error> {
        let fields = LogFields::collect(record, logger_values)?;

        Ok(StdLogValue {
            priority: fields.priority_or(record.level()),
            scope: fields.scope(),
            message: record.msg().to_string(),
            location: self.code_position(record, &fields),
            kv_pairs: fields.pairs,
        })
    }
}
