/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::str::FromStr;

use anyhow::anyhow;
use yaml_rust::Yaml;

use modlog_types::log::Priority;

pub fn as_priority(v: &Yaml) -> anyhow::Result<Priority> {
    if let Yaml::String(s) = v {
        Priority::from_str(s).map_err(|e| anyhow!("{e}"))
    } else {
        Err(anyhow!("yaml value type for 'priority' should be 'string'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse() {
        let v = Yaml::String("notice".to_string());
        assert_eq!(as_priority(&v).unwrap(), Priority::Notice);

        let v = Yaml::String("verbose".to_string());
        assert!(as_priority(&v).is_err());
        assert!(as_priority(&Yaml::Integer(3)).is_err());
    }
}
