/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use anyhow::{Context, anyhow};
use yaml_rust::Yaml;

use super::SyslogBackendBuilder;

impl SyslogBackendBuilder {
    pub(crate) fn parse_unix_yaml(value: &Yaml) -> anyhow::Result<Self> {
        match value {
            Yaml::Hash(map) => {
                let v = modlog_yaml::hash_get_required(map, "path")?;
                let path = modlog_yaml::value::as_absolute_path(v)
                    .context("invalid value for key path")?;
                Ok(SyslogBackendBuilder::Unix(path))
            }
            Yaml::String(_) => {
                let path = modlog_yaml::value::as_absolute_path(value)?;
                Ok(SyslogBackendBuilder::Unix(path))
            }
            _ => Err(anyhow!("invalid yaml value for unix syslog backend")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modlog_yaml::yaml_doc;
    use std::path::PathBuf;

    #[test]
    fn map_and_string() {
        let v = yaml_doc!("path: /run/syslog.sock");
        assert_eq!(
            SyslogBackendBuilder::parse_unix_yaml(&v).unwrap(),
            SyslogBackendBuilder::Unix(PathBuf::from("/run/syslog.sock"))
        );
        let v = yaml_doc!("/dev/log");
        assert_eq!(
            SyslogBackendBuilder::parse_unix_yaml(&v).unwrap(),
            SyslogBackendBuilder::Unix(PathBuf::from("/dev/log"))
        );
        assert!(SyslogBackendBuilder::parse_unix_yaml(&yaml_doc!("socket: /dev/log")).is_err());
    }
}
