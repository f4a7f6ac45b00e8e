/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io::{self, IsTerminal, Write};
use std::sync::Arc;

use chrono::Local;
use flume::Receiver;

use modlog_types::log::{AsyncLogConfig, AsyncLogger, LogStats, Priority};

mod format;
pub use format::StdLogFormatter;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

pub struct StdLogValue {
    priority: Priority,
    scope: Option<String>,
    message: String,
    kv_pairs: Vec<(String, String)>,
    location: Option<String>,
}

impl StdLogValue {
    fn message_str(&self) -> &str {
        if self.message.is_empty() {
            "()"
        } else {
            &self.message
        }
    }
}

/// Create a console drain.
///
/// A single io thread writes to stdout or stderr so that lines keep the
/// order in which they were logged.
pub fn new_async_logger(
    async_conf: &AsyncLogConfig,
    append_code_position: bool,
    use_stdout: bool,
) -> AsyncLogger<StdLogValue, StdLogFormatter> {
    let (sender, receiver) = flume::bounded::<StdLogValue>(async_conf.channel_capacity);

    let stats = Arc::new(LogStats::default());

    let io_thread = AsyncIoThread {
        receiver,
        stats: Arc::clone(&stats),
    };

    let _detached_thread = std::thread::Builder::new()
        .name(async_conf.thread_name.clone())
        .spawn(move || {
            if use_stdout {
                io_thread.run_with_stdout();
            } else {
                io_thread.run_with_stderr();
            }
        });

    AsyncLogger::new(sender, StdLogFormatter::new(append_code_position), stats)
}

struct AsyncIoThread {
    receiver: Receiver<StdLogValue>,
    stats: Arc<LogStats>,
}

impl AsyncIoThread {
    fn run_with_stderr(self) {
        let stderr = io::stderr();
        let console = stderr.is_terminal();
        self.run(stderr, console)
    }

    fn run_with_stdout(self) {
        let stdout = io::stdout();
        let console = stdout.is_terminal();
        self.run(stdout, console)
    }

    fn run<IO: Write>(&self, mut io: IO, console: bool) {
        let mut buf: Vec<u8> = Vec::with_capacity(1024);
        while let Ok(v) = self.receiver.recv() {
            self.write_one(&mut io, &mut buf, v, console);

            while let Ok(v) = self.receiver.try_recv() {
                self.write_one(&mut io, &mut buf, v, console);
            }

            let _ = io.flush();
        }
    }

    fn write_one<IO: Write>(&self, io: &mut IO, buf: &mut Vec<u8>, v: StdLogValue, console: bool) {
        buf.clear();
        let time = Local::now().format(TIME_FORMAT);
        let r = if console {
            write_console(buf, &time, &v)
        } else {
            write_plain(buf, &time, &v)
        };
        if r.is_err() {
            self.stats.drop.add_format_failed();
            return;
        }
        match io.write_all(buf) {
            Ok(_) => {
                self.stats.io.add_passed();
                self.stats.io.add_size(buf.len());
            }
            Err(_) => self.stats.drop.add_peer_unreachable(),
        }
    }
}

fn write_plain<IO: Write, T: std::fmt::Display>(
    io: &mut IO,
    time: T,
    v: &StdLogValue,
) -> io::Result<()> {
    write!(io, "{time} {}", v.priority)?;
    if let Some(scope) = &v.scope {
        write!(io, " [{scope}]")?;
    }
    for (k, v) in &v.kv_pairs {
        write!(io, " {k}: {v},")?;
    }
    write!(io, " {}", v.message_str())?;
    if let Some(location) = &v.location {
        write!(io, " <{location}>")?;
    }
    writeln!(io)
}

fn write_console<IO: Write, T: std::fmt::Display>(
    io: &mut IO,
    time: T,
    v: &StdLogValue,
) -> io::Result<()> {
    use anstyle::{AnsiColor, Color, Style};

    const COLOR_MAGENTA: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Magenta)));
    const COLOR_RED: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Red)));
    const COLOR_YELLOW: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Yellow)));
    const COLOR_GREEN: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green)));
    const COLOR_BRIGHT_GREEN: Style =
        Style::new().fg_color(Some(Color::Ansi(AnsiColor::BrightGreen)));
    const COLOR_CYAN: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Cyan)));
    const COLOR_BLUE: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Blue)));
    const STYLE_BOLD: Style = Style::new().bold();
    const STYLE_ITALIC: Style = Style::new().italic();

    let bold_s = STYLE_BOLD.render();
    let bold_e = STYLE_BOLD.render_reset();

    let priority_style = match v.priority {
        Priority::Fatal => COLOR_MAGENTA.bold(),
        Priority::Critical => COLOR_MAGENTA,
        Priority::Error => COLOR_RED,
        Priority::Warning => COLOR_YELLOW,
        Priority::Notice => COLOR_BRIGHT_GREEN,
        Priority::Information => COLOR_GREEN,
        Priority::Debug => COLOR_CYAN,
        Priority::Trace => COLOR_BLUE,
    };
    write!(
        io,
        "{time} {}{}{}",
        priority_style.render(),
        v.priority,
        priority_style.render_reset(),
    )?;

    if let Some(scope) = &v.scope {
        write!(io, " [{scope}]")?;
    }

    for (k, v) in &v.kv_pairs {
        write!(io, " {bold_s}{k}{bold_e}={v},")?;
    }

    write!(io, " {bold_s}{}{bold_e}", v.message_str())?;

    if let Some(location) = &v.location {
        write!(
            io,
            " <{}{location}{}>",
            STYLE_ITALIC.render(),
            STYLE_ITALIC.render_reset()
        )?;
    }
    writeln!(io)
}

#[cfg(test)]
mod tests {
    use super::*;
    use slog::{Drain, Logger, o};

    fn value() -> StdLogValue {
        StdLogValue {
            priority: Priority::Error,
            scope: Some("camera/acquisition".to_string()),
            message: "disk full".to_string(),
            kv_pairs: vec![("retry".to_string(), "3".to_string())],
            location: Some("main.c:42 doWork".to_string()),
        }
    }

    #[test]
    fn plain_line() {
        let mut buf = Vec::new();
        write_plain(&mut buf, "T", &value()).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "T Error [camera/acquisition] retry: 3, disk full <main.c:42 doWork>\n"
        );
    }

    #[test]
    fn plain_empty_message() {
        let v = StdLogValue {
            priority: Priority::Notice,
            scope: None,
            message: String::new(),
            kv_pairs: Vec::new(),
            location: None,
        };
        let mut buf = Vec::new();
        write_plain(&mut buf, "T", &v).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "T Notice ()\n");
    }

    #[test]
    fn console_line() {
        let mut buf = Vec::new();
        write_console(&mut buf, "T", &value()).unwrap();
        let s = String::from_utf8(buf).unwrap();
        assert!(s.starts_with("T "));
        assert!(s.contains("Error"));
        assert!(s.contains("disk full"));
        assert!(s.contains("main.c:42 doWork"));
        assert!(s.ends_with('\n'));
    }

    #[test]
    fn formatter_keeps_priority() {
        let (sender, receiver) = flume::bounded::<StdLogValue>(4);
        let drain = AsyncLogger::new(
            sender,
            StdLogFormatter::new(true),
            Arc::new(LogStats::default()),
        );
        let logger = Logger::root(drain.fuse(), o!("module" => "camera"));
        slog::crit!(logger, "halted"; "priority" => "Fatal", "file" => "cam.c", "line" => 7u32);

        let v = receiver.try_recv().unwrap();
        assert_eq!(v.priority, Priority::Fatal);
        assert_eq!(v.scope.as_deref(), Some("camera"));
        assert_eq!(v.message, "halted");
        assert_eq!(v.location.as_deref(), Some("cam.c:7"));
    }

    #[test]
    fn formatter_rust_position() {
        let (sender, receiver) = flume::bounded::<StdLogValue>(4);
        let drain = AsyncLogger::new(
            sender,
            StdLogFormatter::new(true),
            Arc::new(LogStats::default()),
        );
        let logger = Logger::root(drain.fuse(), o!());
        slog::info!(logger, "process message");

        let v = receiver.try_recv().unwrap();
        assert_eq!(v.priority, Priority::Information);
        let location = v.location.unwrap();
        assert!(location.starts_with(module_path!()));
        assert!(location.contains("lib.rs:"));
    }
}
