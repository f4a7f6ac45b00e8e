/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::path::PathBuf;

use anyhow::anyhow;
use yaml_rust::Yaml;

pub fn as_absolute_path(v: &Yaml) -> anyhow::Result<PathBuf> {
    if let Yaml::String(path) = v {
        let path = PathBuf::from(path);
        if path.is_absolute() {
            Ok(path)
        } else {
            Err(anyhow!("path {} is not absolute", path.display()))
        }
    } else {
        Err(anyhow!("yaml value type for path should be string"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute() {
        let v = Yaml::String("/dev/log".to_string());
        assert_eq!(as_absolute_path(&v).unwrap(), PathBuf::from("/dev/log"));

        let v = Yaml::String("dev/log".to_string());
        assert!(as_absolute_path(&v).is_err());
        assert!(as_absolute_path(&Yaml::Integer(1)).is_err());
    }
}
