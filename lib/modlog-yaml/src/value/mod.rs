/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

mod fs;
mod primary;
mod priority;

pub use fs::as_absolute_path;
pub use primary::{as_bool, as_string, as_usize};
pub use priority::as_priority;
