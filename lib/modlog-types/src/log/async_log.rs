/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::Arc;

use flume::{Sender, TrySendError};
use slog::{Drain, OwnedKVList, Record};

use super::LogStats;

const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

#[derive(Clone, Debug)]
pub struct AsyncLogConfig {
    pub channel_capacity: usize,
    pub thread_number: usize,
    pub thread_name: String,
}

impl AsyncLogConfig {
    pub fn with_name(thread_name: &str) -> Self {
        AsyncLogConfig {
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            thread_number: 1,
            thread_name: thread_name.to_string(),
        }
    }
}

impl Default for AsyncLogConfig {
    fn default() -> Self {
        AsyncLogConfig::with_name("modlog-io")
    }
}

/// Turns a slog record into the value sent to the io threads.
pub trait AsyncLogFormatter<T> {
    fn format_slog(&self, record: &Record, logger_values: &OwnedKVList) -> Result<T, slog::Error>;
}

/// A drain that formats in the caller thread and never blocks on io.
///
/// Records that do not fit into the channel are dropped and counted.
pub struct AsyncLogger<T, F>
where
    F: AsyncLogFormatter<T>,
{
    sender: Sender<T>,
    formatter: F,
    stats: Arc<LogStats>,
}

impl<T, F> AsyncLogger<T, F>
where
    F: AsyncLogFormatter<T>,
{
    pub fn new(sender: Sender<T>, formatter: F, stats: Arc<LogStats>) -> Self {
        AsyncLogger {
            sender,
            formatter,
            stats,
        }
    }

    pub fn get_stats(&self) -> Arc<LogStats> {
        Arc::clone(&self.stats)
    }
}

impl<T, F> Drain for AsyncLogger<T, F>
where
    F: AsyncLogFormatter<T>,
{
    type Ok = ();
    type Err = slog::Error;

    fn log(&self, record: &Record, logger_values: &OwnedKVList) -> Result<(), slog::Error> {
        self.stats.io.add_total();

        match self.formatter.format_slog(record, logger_values) {
            Ok(v) => {
                match self.sender.try_send(v) {
                    Ok(_) => {}
                    Err(TrySendError::Full(_)) => self.stats.drop.add_channel_overflow(),
                    Err(TrySendError::Disconnected(_)) => self.stats.drop.add_channel_closed(),
                }
                Ok(())
            }
            Err(e) => {
                self.stats.drop.add_format_failed();
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slog::{Logger, o};

    struct MsgFormatter;

    impl AsyncLogFormatter<String> for MsgFormatter {
        fn format_slog(&self, record: &Record, _: &OwnedKVList) -> Result<String, slog::Error> {
            Ok(record.msg().to_string())
        }
    }

    #[test]
    fn send_and_overflow() {
        let (sender, receiver) = flume::bounded::<String>(2);
        let stats = Arc::new(LogStats::default());
        let drain = AsyncLogger::new(sender, MsgFormatter, Arc::clone(&stats));
        let logger = Logger::root(drain.fuse(), o!());

        slog::info!(logger, "one");
        slog::info!(logger, "two");
        slog::info!(logger, "three");

        assert_eq!(receiver.try_recv().unwrap(), "one");
        assert_eq!(receiver.try_recv().unwrap(), "two");
        assert!(receiver.try_recv().is_err());

        let snap = stats.snapshot();
        assert_eq!(snap.io.total, 3);
        assert_eq!(snap.drop.channel_overflow, 1);
    }

    #[test]
    fn closed_channel() {
        let (sender, receiver) = flume::bounded::<String>(2);
        drop(receiver);
        let drain = AsyncLogger::new(sender, MsgFormatter, Arc::new(LogStats::default()));
        let stats = drain.get_stats();
        let logger = Logger::root(drain.fuse(), o!());

        slog::warn!(logger, "lost");
        assert_eq!(stats.snapshot().drop.channel_closed, 1);
    }
}
