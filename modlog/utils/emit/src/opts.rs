/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::path::PathBuf;

use anyhow::{Context, anyhow};
use clap::{Arg, ArgAction, ArgMatches, Command, ValueHint, value_parser};

use modlog::Priority;
use modlog::loader::SymbolNames;
use modlog::process::ProcessLogTarget;

const ARG_CONFIG: &str = "config";
const ARG_LIBRARY: &str = "library";
const ARG_GET_LOG_SYMBOL: &str = "get-log-symbol";
const ARG_LOG_SYMBOL: &str = "log-symbol";
const ARG_FREE_LOG_SYMBOL: &str = "free-log-symbol";
const ARG_MODULE: &str = "module";
const ARG_GROUP: &str = "group";
const ARG_PRIORITY: &str = "priority";
const ARG_FILE: &str = "file";
const ARG_LINE: &str = "line";
const ARG_FUNCTION: &str = "function";
const ARG_MESSAGE: &str = "message";
const ARG_VERBOSE: &str = "verbose";
#[cfg(unix)]
const ARG_SYSLOG: &str = "syslog";

pub(crate) enum BackendSource {
    Default,
    Config(PathBuf),
    Library(PathBuf, SymbolNames),
}

pub(crate) struct EmitArgs {
    pub(crate) source: BackendSource,
    pub(crate) module: String,
    pub(crate) group: String,
    /// Kept as given, so that unknown names reach the backend.
    pub(crate) priority: String,
    pub(crate) file: String,
    pub(crate) line: u32,
    pub(crate) function: String,
    pub(crate) message: String,
    pub(crate) verbose_level: u8,
    pub(crate) process_log: ProcessLogTarget,
}

fn build_cli_args() -> Command {
    let cmd = Command::new(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .arg(
            Arg::new(ARG_CONFIG)
                .help("Log config file for the in-process backend")
                .num_args(1)
                .value_name("CONFIG FILE")
                .value_parser(value_parser!(PathBuf))
                .value_hint(ValueHint::FilePath)
                .short('c')
                .long(ARG_CONFIG)
                .conflicts_with(ARG_LIBRARY),
        )
        .arg(
            Arg::new(ARG_LIBRARY)
                .help("Shared library exporting the logging functions")
                .num_args(1)
                .value_name("LIBRARY FILE")
                .value_parser(value_parser!(PathBuf))
                .value_hint(ValueHint::FilePath)
                .short('l')
                .long(ARG_LIBRARY),
        )
        .arg(
            Arg::new(ARG_GET_LOG_SYMBOL)
                .help("Name of the acquire function in the library")
                .num_args(1)
                .value_name("SYMBOL")
                .long(ARG_GET_LOG_SYMBOL)
                .requires(ARG_LIBRARY),
        )
        .arg(
            Arg::new(ARG_LOG_SYMBOL)
                .help("Name of the write function in the library")
                .num_args(1)
                .value_name("SYMBOL")
                .long(ARG_LOG_SYMBOL)
                .requires(ARG_LIBRARY),
        )
        .arg(
            Arg::new(ARG_FREE_LOG_SYMBOL)
                .help("Name of the release function in the library")
                .num_args(1)
                .value_name("SYMBOL")
                .long(ARG_FREE_LOG_SYMBOL)
                .requires(ARG_LIBRARY),
        )
        .arg(
            Arg::new(ARG_MODULE)
                .help("Module identifier")
                .num_args(1)
                .value_name("MODULE")
                .short('m')
                .long(ARG_MODULE)
                .required(true),
        )
        .arg(
            Arg::new(ARG_GROUP)
                .help("Group identifier")
                .num_args(1)
                .value_name("GROUP")
                .short('g')
                .long(ARG_GROUP)
                .required(true),
        )
        .arg(
            Arg::new(ARG_PRIORITY)
                .help("Priority name")
                .num_args(1)
                .value_name("PRIORITY")
                .short('p')
                .long(ARG_PRIORITY)
                .default_value(Priority::Information.as_str()),
        )
        .arg(
            Arg::new(ARG_FILE)
                .help("Source file reported with the entry")
                .num_args(1)
                .value_name("FILE")
                .long(ARG_FILE)
                .default_value(""),
        )
        .arg(
            Arg::new(ARG_LINE)
                .help("Source line reported with the entry")
                .num_args(1)
                .value_name("LINE")
                .value_parser(value_parser!(u32))
                .long(ARG_LINE)
                .default_value("0"),
        )
        .arg(
            Arg::new(ARG_FUNCTION)
                .help("Function name reported with the entry")
                .num_args(1)
                .value_name("FUNCTION")
                .long(ARG_FUNCTION)
                .default_value(""),
        )
        .arg(
            Arg::new(ARG_MESSAGE)
                .help("Message text, words are joined by spaces")
                .num_args(1..)
                .value_name("MESSAGE")
                .required(true),
        )
        .arg(
            Arg::new(ARG_VERBOSE)
                .help("Show verbose message")
                .num_args(0)
                .action(ArgAction::Count)
                .short('v')
                .long(ARG_VERBOSE),
        );
    #[cfg(unix)]
    let cmd = cmd.arg(
        Arg::new(ARG_SYSLOG)
            .help("Send diagnostics of this tool to the local syslog")
            .action(ArgAction::SetTrue)
            .long(ARG_SYSLOG),
    );
    cmd
}

fn get_string(args: &ArgMatches, id: &str) -> anyhow::Result<String> {
    args.get_one::<String>(id)
        .cloned()
        .ok_or_else(|| anyhow!("no value set for {id}"))
}

pub(crate) fn parse(args: ArgMatches) -> anyhow::Result<EmitArgs> {
    let source = if let Some(path) = args.get_one::<PathBuf>(ARG_LIBRARY) {
        let mut names = SymbolNames::default();
        if let Some(s) = args.get_one::<String>(ARG_GET_LOG_SYMBOL) {
            names.get_log = s.clone();
        }
        if let Some(s) = args.get_one::<String>(ARG_LOG_SYMBOL) {
            names.log = s.clone();
        }
        if let Some(s) = args.get_one::<String>(ARG_FREE_LOG_SYMBOL) {
            names.free_log = s.clone();
        }
        BackendSource::Library(path.clone(), names)
    } else if let Some(path) = args.get_one::<PathBuf>(ARG_CONFIG) {
        BackendSource::Config(path.clone())
    } else {
        BackendSource::Default
    };

    let priority = get_string(&args, ARG_PRIORITY)?;

    let message = args
        .get_many::<String>(ARG_MESSAGE)
        .context("no message set")?
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" ");

    Ok(EmitArgs {
        source,
        module: get_string(&args, ARG_MODULE)?,
        group: get_string(&args, ARG_GROUP)?,
        priority,
        file: get_string(&args, ARG_FILE)?,
        line: args.get_one::<u32>(ARG_LINE).copied().unwrap_or_default(),
        function: get_string(&args, ARG_FUNCTION)?,
        message,
        verbose_level: args.get_one::<u8>(ARG_VERBOSE).copied().unwrap_or_default(),
        process_log: process_log_target(&args),
    })
}

#[cfg(unix)]
fn process_log_target(args: &ArgMatches) -> ProcessLogTarget {
    if args.get_flag(ARG_SYSLOG) {
        ProcessLogTarget::Syslog(env!("CARGO_PKG_NAME").to_string())
    } else {
        ProcessLogTarget::Stderr
    }
}

#[cfg(not(unix))]
fn process_log_target(_args: &ArgMatches) -> ProcessLogTarget {
    ProcessLogTarget::Stderr
}

pub(crate) fn get_matches() -> ArgMatches {
    build_cli_args().get_matches()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_from(argv: &[&str]) -> anyhow::Result<EmitArgs> {
        let args = build_cli_args().try_get_matches_from(argv)?;
        parse(args)
    }

    #[test]
    fn verify_cli() {
        build_cli_args().debug_assert();
    }

    #[test]
    fn minimal() {
        let argv = ["modlog-emit", "-m", "camera", "-g", "acq", "disk", "full"];
        let args = parse_from(&argv).unwrap();
        assert!(matches!(args.source, BackendSource::Default));
        assert_eq!(args.module, "camera");
        assert_eq!(args.group, "acq");
        assert_eq!(args.priority, "Information");
        assert_eq!(args.message, "disk full");
        assert_eq!(args.line, 0);
        assert_eq!(args.verbose_level, 0);
        assert_eq!(args.process_log, ProcessLogTarget::Stderr);
    }

    #[test]
    fn library_symbols() {
        let args = parse_from(&[
            "modlog-emit",
            "-l",
            "/opt/lib/libcamlog.so",
            "--log-symbol",
            "camlog_write",
            "-m",
            "camera",
            "-g",
            "acq",
            "-p",
            "Error",
            "--file",
            "main.c",
            "--line",
            "42",
            "-vv",
            "m",
        ])
        .unwrap();
        let BackendSource::Library(path, names) = args.source else {
            panic!("not a library source");
        };
        assert_eq!(path, PathBuf::from("/opt/lib/libcamlog.so"));
        assert_eq!(names.log, "camlog_write");
        assert_eq!(names.get_log, "modlog_get_log");
        assert_eq!(args.line, 42);
        assert_eq!(args.verbose_level, 2);
    }

    #[test]
    fn conflicts() {
        let argv = ["modlog-emit", "-c", "a.yaml", "-l", "b.so", "-m", "x", "-g", "y", "m"];
        assert!(parse_from(&argv).is_err());
        let argv = ["modlog-emit", "--log-symbol", "f", "-m", "x", "-g", "y", "m"];
        assert!(parse_from(&argv).is_err());
        assert!(parse_from(&["modlog-emit", "-m", "x", "m"]).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn syslog_process_log() {
        let argv = ["modlog-emit", "--syslog", "-m", "camera", "-g", "acq", "m"];
        let args = parse_from(&argv).unwrap();
        assert_eq!(args.process_log, ProcessLogTarget::Syslog("modlog-emit".to_string()));
    }

    #[test]
    fn unknown_priority_kept() {
        let argv = ["modlog-emit", "-p", "Loud", "-m", "camera", "-g", "acq", "m"];
        let args = parse_from(&argv).unwrap();
        assert_eq!(args.priority, "Loud");
    }
}
