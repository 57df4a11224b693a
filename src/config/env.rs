// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Environment variable-based configuration provider implementation.
//!
//! `LOGBOOK_REQUEST__HEADER_STRATEGY=DEFAULT` becomes the key
//! `logbook.request.header_strategy`: the prefix is dropped, the rest is
//! lower-cased, `__` separates levels and single underscores stay part of
//! the key name.

use serde_json::{Value, json};
use std::collections::HashMap;
use std::env;

use super::{ConfigError, ConfigProvider, ROOT_KEY};

/// Default prefix for logbook environment variables.
pub const DEFAULT_PREFIX: &str = "LOGBOOK_";

const LEVEL_SEPARATOR: &str = "__";

/// Configuration provider backed by prefixed environment variables.
#[derive(Debug)]
pub struct EnvConfigProvider {
    prefix: String,
    cache: HashMap<String, String>,
}

impl EnvConfigProvider {
    /// Snapshot every variable starting with `prefix`.
    pub fn new(prefix: &str) -> Self {
        let mut provider = Self {
            prefix: prefix.to_string(),
            cache: HashMap::new(),
        };
        provider.refresh_cache();
        provider
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Re-read the process environment.
    pub fn refresh_cache(&mut self) {
        self.cache = env::vars()
            .filter_map(|(name, value)| {
                let key = self.config_key(&name)?;
                Some((key, value))
            })
            .collect();
    }

    /// Configuration key for the variable `name`, if it carries our prefix.
    fn config_key(&self, name: &str) -> Option<String> {
        let rest = name.strip_prefix(&self.prefix)?;
        if rest.is_empty() {
            return None;
        }
        let path = rest.to_lowercase().replace(LEVEL_SEPARATOR, ".");
        Some(format!("{ROOT_KEY}.{path}"))
    }

    /// JSON first, then bool, then number, then plain string.
    fn parse_value_to_json(value: &str) -> Value {
        if let Ok(json_value) = serde_json::from_str(value) {
            return json_value;
        }
        if value.eq_ignore_ascii_case("true") {
            return json!(true);
        }
        if value.eq_ignore_ascii_case("false") {
            return json!(false);
        }
        if let Ok(int_val) = value.parse::<i64>() {
            return json!(int_val);
        }
        if let Ok(float_val) = value.parse::<f64>() {
            return json!(float_val);
        }
        json!(value)
    }
}

impl Default for EnvConfigProvider {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}

impl ConfigProvider for EnvConfigProvider {
    fn has(&self, key: &str) -> bool {
        self.cache.contains_key(key)
    }

    fn provider_name(&self) -> &str {
        "env"
    }

    fn get_raw(&self, key: &str) -> Result<Option<Value>, ConfigError> {
        Ok(self.cache.get(key).map(|v| Self::parse_value_to_json(v)))
    }
}
