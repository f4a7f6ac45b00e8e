/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use anyhow::{Context, anyhow};
use yaml_rust::Yaml;

use super::{Facility, SyslogBackendBuilder, SyslogBuilder};

impl SyslogBuilder {
    pub fn parse_yaml(value: &Yaml, ident: &str) -> anyhow::Result<Self> {
        let mut builder = SyslogBuilder::with_ident(ident.to_string());
        match value {
            Yaml::Hash(map) => {
                modlog_yaml::foreach_kv(map, |k, v| match modlog_yaml::key::normalize(k).as_str() {
                    "ident" => {
                        let ident = modlog_yaml::value::as_string(v)
                            .context(format!("invalid string value for key {k}"))?;
                        builder.set_ident(ident);
                        Ok(())
                    }
                    "facility" => {
                        let name = modlog_yaml::value::as_string(v)
                            .context(format!("invalid string value for key {k}"))?;
                        let facility = Facility::from_name(&name.to_lowercase())
                            .ok_or_else(|| anyhow!("unsupported facility {name}"))?;
                        builder.set_facility(facility);
                        Ok(())
                    }
                    "target_unix" | "backend_unix" | "path" => {
                        let backend = SyslogBackendBuilder::parse_unix_yaml(v)
                            .context(format!("invalid value for key {k}"))?;
                        builder.set_backend(backend);
                        Ok(())
                    }
                    _ => Err(anyhow!("invalid key {k}")),
                })?;
                Ok(builder)
            }
            Yaml::Null => Ok(builder),
            _ => Err(anyhow!(
                "yaml value type for 'SyslogBuilder' should be 'map'"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modlog_yaml::yaml_doc;
    use std::path::PathBuf;

    #[test]
    fn parse_map() {
        let v = yaml_doc!("ident: cam\nfacility: LOCAL3\nbackend-unix: /tmp/log.sock");
        let builder = SyslogBuilder::parse_yaml(&v, "modlog").unwrap();
        assert_eq!(builder.ident(), "cam");
        assert_eq!(builder.facility, Facility::Local3);
        assert_eq!(
            builder.backend,
            SyslogBackendBuilder::Unix(PathBuf::from("/tmp/log.sock"))
        );
    }

    #[test]
    fn parse_null() {
        let builder = SyslogBuilder::parse_yaml(&Yaml::Null, "modlog").unwrap();
        assert_eq!(builder.ident(), "modlog");
        assert_eq!(builder.backend, SyslogBackendBuilder::Default);
    }

    #[test]
    fn parse_invalid() {
        let v = yaml_doc!("facility: kern");
        assert!(SyslogBuilder::parse_yaml(&v, "modlog").is_err());
        let v = yaml_doc!("path: relative.sock");
        assert!(SyslogBuilder::parse_yaml(&v, "modlog").is_err());
        let v = yaml_doc!("udp: 127.0.0.1:514");
        assert!(SyslogBuilder::parse_yaml(&v, "modlog").is_err());
        assert!(SyslogBuilder::parse_yaml(&Yaml::Integer(1), "modlog").is_err());
    }
}
