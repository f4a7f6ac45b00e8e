/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::Arc;
use std::time::{Duration, Instant};

use flume::{Receiver, Sender, TrySendError};
use log::warn;
use slog::{Drain, OwnedKVList, Record};

use modlog_types::log::{AsyncLogConfig, LogStats};

use super::{SyslogBackendBuilder, SyslogHeader};
use crate::backend::{MAX_BATCH_SIZE, SyslogBackend};
use crate::format::FormatterRfc3164;

pub(crate) const DEFAULT_RECONNECT_INTERVAL: Duration = Duration::from_secs(4);

pub struct AsyncSyslogStreamer {
    header: SyslogHeader,
    sender: Sender<Vec<u8>>,
    formatter: FormatterRfc3164,
    stats: Arc<LogStats>,
}

impl AsyncSyslogStreamer {
    pub(super) fn new(
        config: &AsyncLogConfig,
        header: SyslogHeader,
        formatter: FormatterRfc3164,
        backend_builder: &SyslogBackendBuilder,
        reconnect_interval: Duration,
    ) -> Self {
        let (sender, receiver) = flume::bounded::<Vec<u8>>(config.channel_capacity);

        let stats = Arc::new(LogStats::default());

        for i in 0..config.thread_number.max(1) {
            let io_thread = AsyncIoThread {
                receiver: receiver.clone(),
                backend_builder: backend_builder.clone(),
                stats: Arc::clone(&stats),
                batch: Vec::with_capacity(MAX_BATCH_SIZE),
                connection: Connection::Down(None),
                reconnect_interval,
            };

            let _detached_thread = std::thread::Builder::new()
                .name(format!("{}#{i}", config.thread_name))
                .spawn(move || {
                    io_thread.run_to_end();
                });
        }

        AsyncSyslogStreamer {
            header,
            sender,
            formatter,
            stats,
        }
    }

    pub fn get_stats(&self) -> Arc<LogStats> {
        Arc::clone(&self.stats)
    }
}

impl Drain for AsyncSyslogStreamer {
    type Ok = ();
    type Err = slog::Error;

    fn log(&self, record: &Record, logger_values: &OwnedKVList) -> Result<(), slog::Error> {
        self.stats.io.add_total();

        let mut buf = Vec::with_capacity(256);
        match self
            .formatter
            .format_slog(&mut buf, &self.header, record, logger_values)
        {
            Ok(_) => {
                match self.sender.try_send(buf) {
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

enum Connection {
    Up(SyslogBackend),
    Down(Option<Instant>),
}

impl Connection {
    fn get(
        &mut self,
        builder: &SyslogBackendBuilder,
        retry_after: Duration,
    ) -> Option<&SyslogBackend> {
        if let Connection::Down(failed_at) = self {
            if failed_at.is_some_and(|t| t.elapsed() < retry_after) {
                return None;
            }
            match builder.build() {
                Ok(backend) => *self = Connection::Up(backend),
                Err(e) => {
                    warn!(
                        "failed to connect to syslog at {}: {e}, retry in {retry_after:?}",
                        builder.path().display()
                    );
                    *self = Connection::Down(Some(Instant::now()));
                    return None;
                }
            }
        }
        match self {
            Connection::Up(backend) => Some(backend),
            Connection::Down(_) => None,
        }
    }

    fn fail(&mut self) {
        *self = Connection::Down(Some(Instant::now()));
    }
}

struct AsyncIoThread {
    receiver: Receiver<Vec<u8>>,
    backend_builder: SyslogBackendBuilder,
    stats: Arc<LogStats>,
    batch: Vec<Vec<u8>>,
    connection: Connection,
    reconnect_interval: Duration,
}

impl AsyncIoThread {
    fn run_to_end(mut self) {
        while let Ok(msg) = self.receiver.recv() {
            self.batch.push(msg);
            self.batch.extend(self.receiver.try_iter().take(MAX_BATCH_SIZE - 1));
            self.send_batch();
            self.batch.clear();
        }
    }

    fn send_batch(&mut self) {
        let mut sent = 0;
        while sent < self.batch.len() {
            let Some(backend) = self
                .connection
                .get(&self.backend_builder, self.reconnect_interval)
            else {
                break;
            };
            let pending = &self.batch[sent..];
            match backend.write_many(pending) {
                Ok(n) if n > 0 => {
                    self.stats.io.add_passed_n(n);
                    self.stats
                        .io
                        .add_size(pending[..n].iter().map(Vec::len).sum());
                    sent += n;
                }
                Ok(_) => {
                    warn!("syslog accepted no message, will reconnect");
                    self.connection.fail();
                }
                Err(e) => {
                    warn!("failed to send to syslog: {e}, will reconnect");
                    self.connection.fail();
                }
            }
        }
        let lost = self.batch.len() - sent;
        if lost > 0 {
            self.stats.drop.add_peer_unreachable_n(lost);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::os::unix::net::UnixDatagram;
    use std::path::Path;

    use slog::{Logger, o};

    use super::*;
    use crate::SyslogBuilder;

    fn wait_flushed(stats: &LogStats) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while stats.snapshot().pending() > 0 {
            assert!(Instant::now() < deadline, "io thread stalled");
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    fn start(path: &Path, reconnect_interval: Duration) -> (Logger, Arc<LogStats>) {
        let mut builder = SyslogBuilder::with_ident("modlog-test".to_string());
        builder.set_backend(SyslogBackendBuilder::Unix(path.to_path_buf()));
        builder.set_reconnect_interval(reconnect_interval);
        let drain = builder.start_async(&AsyncLogConfig::with_name("syslog-reconnect"));
        let stats = drain.get_stats();
        (Logger::root(drain.fuse(), o!()), stats)
    }

    #[test]
    fn reconnect_after_interval() {
        let dir = std::env::temp_dir().join(format!("modlog-syslog-rc-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("late.sock");
        let _ = std::fs::remove_file(&path);

        let interval = Duration::from_secs(1);
        let (logger, stats) = start(&path, interval);

        slog::info!(logger, "nobody listening");
        wait_flushed(&stats);
        let snap = stats.snapshot();
        assert_eq!(snap.drop.peer_unreachable, 1);
        assert_eq!(snap.io.passed, 0);

        let server = UnixDatagram::bind(&path).unwrap();
        server
            .set_read_timeout(Some(Duration::from_secs(5)))
            .unwrap();

        slog::info!(logger, "inside throttle window");
        wait_flushed(&stats);
        let snap = stats.snapshot();
        assert_eq!(snap.drop.peer_unreachable, 2);
        assert_eq!(snap.io.passed, 0);

        std::thread::sleep(interval + Duration::from_millis(100));
        slog::info!(logger, "after throttle");

        let mut buf = [0u8; 512];
        let n = server.recv(&mut buf).unwrap();
        let msg = std::str::from_utf8(&buf[..n]).unwrap();
        assert!(msg.contains("after throttle"));
        wait_flushed(&stats);
        let snap = stats.snapshot();
        assert_eq!(snap.io.total, 3);
        assert_eq!(snap.io.passed, 1);
        assert_eq!(snap.drop.peer_unreachable, 2);
        assert_eq!(snap.pending(), 0);

        let _ = std::fs::remove_file(&path);
    }
}
