/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

//! A logging facade made of three operations: acquire a logger for a
//! module/group pair, write one record through it, release it.
//!
//! [`LogBackend`] is the contract. [`SlogBackend`] is the in-process
//! implementation, [`ffi`] exports it with a C ABI, and [`loader`] binds any
//! library exporting the same three functions back into the trait.

mod contract;
pub use contract::{AcquireError, LogBackend, LogRecord, LoggerHandle, WriteError, WriteStatus};

mod config;
pub use config::{GroupPolicy, LogConfig, LogConfigDriver, UnknownPriorityPolicy};

mod backend;
pub use backend::{BackendSnapshot, SlogBackend};

mod scoped;
pub use scoped::ScopedLogger;

pub mod ffi;
pub mod loader;
pub mod process;

pub use modlog_types::log::{ParsePriorityError, Priority};
