/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::str::FromStr;

use anyhow::anyhow;
use yaml_rust::Yaml;

pub fn as_bool(v: &Yaml) -> anyhow::Result<bool> {
    match v {
        Yaml::String(s) => match s.to_lowercase().as_str() {
            "on" | "true" | "yes" | "1" => Ok(true),
            "off" | "false" | "no" | "0" => Ok(false),
            _ => Err(anyhow!("invalid yaml string value for 'bool': {s}")),
        },
        Yaml::Boolean(value) => Ok(*value),
        Yaml::Integer(i) => Ok(*i != 0),
        _ => Err(anyhow!(
            "yaml value type for 'bool' should be 'boolean' / 'string' / 'integer'"
        )),
    }
}

pub fn as_usize(v: &Yaml) -> anyhow::Result<usize> {
    match v {
        Yaml::String(s) => Ok(usize::from_str(s)?),
        Yaml::Integer(i) => Ok(usize::try_from(*i)?),
        _ => Err(anyhow!(
            "yaml value type for 'usize' should be 'string' or 'integer'"
        )),
    }
}

pub fn as_string(v: &Yaml) -> anyhow::Result<String> {
    match v {
        Yaml::String(s) => Ok(s.to_string()),
        Yaml::Integer(i) => Ok(i.to_string()),
        Yaml::Real(s) => Ok(s.to_string()),
        _ => Err(anyhow!(
            "yaml value type for string should be 'string' / 'integer' / 'real'"
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_values() {
        assert!(as_bool(&Yaml::String("yes".to_string())).unwrap());
        assert!(!as_bool(&Yaml::String("Off".to_string())).unwrap());
        assert!(as_bool(&Yaml::Boolean(true)).unwrap());
        assert!(!as_bool(&Yaml::Integer(0)).unwrap());
        assert!(as_bool(&Yaml::String("maybe".to_string())).is_err());
        assert!(as_bool(&Yaml::Null).is_err());
    }

    #[test]
    fn usize_values() {
        assert_eq!(as_usize(&Yaml::Integer(4096)).unwrap(), 4096);
        assert_eq!(as_usize(&Yaml::String("16".to_string())).unwrap(), 16);
        assert!(as_usize(&Yaml::Integer(-1)).is_err());
        assert!(as_usize(&Yaml::Real("1.5".to_string())).is_err());
    }

    #[test]
    fn string_values() {
        assert_eq!(as_string(&Yaml::String("a".to_string())).unwrap(), "a");
        assert_eq!(as_string(&Yaml::Integer(12)).unwrap(), "12");
        assert!(as_string(&Yaml::Array(Vec::new())).is_err());
    }
}
