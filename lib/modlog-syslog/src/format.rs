/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fmt::Display;
use std::io::{self, Write};

use chrono::Local;
use slog::{OwnedKVList, Record};

use modlog_types::log::{LogFields, Priority};

use super::SyslogHeader;
use crate::types::{Severity, encode_priority};

const RFC3164_TIME_FORMAT: &str = "%b %e %H:%M:%S";

pub(crate) struct FormatterRfc3164 {
    append_code_position: bool,
}

impl FormatterRfc3164 {
    pub(crate) fn new(append_code_position: bool) -> Self {
        FormatterRfc3164 {
            append_code_position,
        }
    }

    pub(crate) fn format_slog(
        &self,
        w: &mut Vec<u8>,
        header: &SyslogHeader,
        record: &Record,
        logger_values: &OwnedKVList,
    ) -> Result<(), slog::Error> {
        let fields = LogFields::collect(record, logger_values)?;
        let priority = fields.priority_or(record.level());
        let time = Local::now().format(RFC3164_TIME_FORMAT);
        format_rfc3164(w, header, time, priority, &fields, record.msg())?;
        if self.append_code_position
            && let Some(location) = fields.location()
        {
            write!(w, " <{location}>")?;
        }
        Ok(())
    }
}

fn format_rfc3164<T: Display, M: Display>(
    w: &mut Vec<u8>,
    header: &SyslogHeader,
    time: T,
    priority: Priority,
    fields: &LogFields,
    msg: M,
) -> io::Result<()> {
    let pri = encode_priority(Severity::from(priority), header.facility);
    write!(w, "<{pri}>{time} {}[{}]: ", header.ident, header.pid)?;
    if let Some(scope) = fields.scope() {
        write!(w, "[{scope}] ")?;
    }
    write!(w, "{msg}")?;
    for (k, v) in &fields.pairs {
        write!(w, " {k}={v},")?;
    }
    Ok(())
}
