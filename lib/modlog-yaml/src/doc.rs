/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::path::Path;

use anyhow::{Context, anyhow};
use yaml_rust::{Yaml, YamlLoader};

/// Read a file and return its first yaml document.
///
/// An empty file gives `Yaml::Null`.
pub fn load_doc(path: &Path) -> anyhow::Result<Yaml> {
    let content = std::fs::read_to_string(path)
        .context(format!("failed to read file {}", path.display()))?;
    let docs = YamlLoader::load_from_str(&content)
        .map_err(|e| anyhow!("invalid yaml file {}: {e}", path.display()))?;
    Ok(docs.into_iter().next().unwrap_or(Yaml::Null))
}
