/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::atomic::{AtomicUsize, Ordering};

use log::{info, warn};
use slog::{Drain, Level, Never, OwnedKVList, Record};

/// Forward drain errors to the process log instead of the caller.
///
/// Only the first two errors of a run are reported in full, later ones are
/// sampled by `report_mask`.
pub(crate) struct ReportLogIoError<D: Drain<Err = slog::Error, Ok = ()>> {
    drain_name: String,
    error_count: AtomicUsize,
    report_mask: usize,
    inner: D,
}

impl<D: Drain<Err = slog::Error, Ok = ()>> ReportLogIoError<D> {
    pub(crate) fn new(drain: D, drain_name: &str, report_mask: usize) -> Self {
        ReportLogIoError {
            drain_name: drain_name.to_string(),
            error_count: AtomicUsize::new(0),
            report_mask,
            inner: drain,
        }
    }
}

impl<D: Drain<Err = slog::Error, Ok = ()>> Drain for ReportLogIoError<D> {
    type Ok = ();
    type Err = Never;

    fn log(&self, record: &Record, logger_values: &OwnedKVList) -> Result<(), Never> {
        match self.inner.log(record, logger_values) {
            Ok(_) => {
                let error_count = self.error_count.swap(0, Ordering::Relaxed);
                if error_count != 0 {
                    info!(
                        "log drain {} back to work, lost {error_count} records",
                        self.drain_name
                    );
                }
            }
            Err(e) => {
                let old_count = self.error_count.fetch_add(1, Ordering::Relaxed);
                match old_count {
                    0 | 1 => warn!("log drain {} got error: {e}", self.drain_name),
                    _ => {
                        if (old_count & self.report_mask) == 0 {
                            warn!(
                                "log drain {} has seen {old_count} errors, latest: {e}",
                                self.drain_name
                            );
                        }
                    }
                }
            }
        }
        Ok(())
    }

    #[inline]
    fn is_enabled(&self, level: Level) -> bool {
        self.inner.is_enabled(level)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::AtomicBool;

    use slog::{Logger, o};

    use super::*;

    struct FlakyDrain(Arc<AtomicBool>);

    impl Drain for FlakyDrain {
        type Ok = ();
        type Err = slog::Error;

        fn log(&self, _: &Record, _: &OwnedKVList) -> Result<(), slog::Error> {
            if self.0.load(Ordering::Relaxed) {
                Err(slog::Error::Other)
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn count_and_reset() {
        let failing = Arc::new(AtomicBool::new(true));
        let drain = Arc::new(ReportLogIoError::new(
            FlakyDrain(Arc::clone(&failing)),
            "flaky",
            0b11,
        ));
        let logger = Logger::root(Arc::clone(&drain), o!());

        for _ in 0..5 {
            slog::error!(logger, "lost");
        }
        assert_eq!(drain.error_count.load(Ordering::Relaxed), 5);

        failing.store(false, Ordering::Relaxed);
        slog::error!(logger, "written");
        assert_eq!(drain.error_count.load(Ordering::Relaxed), 0);
    }
}
