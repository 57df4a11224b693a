// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Resolved logbook settings.

use serde::Deserialize;
use serde_json::Value;

use super::{Config, ConfigError, ROOT_KEY};
use crate::filters::{
    BodyTruncation, HeaderObfuscation, HeaderPolicy, HeaderStrategy, PathObfuscation,
    RequestFilter, ResponseFilter,
};
use crate::format::DEFAULT_CALL_APP_HEADER;

/// App name used when none is configured.
pub const UNKNOWN_APP: &str = "unknown";

/// A header list given either as an array or as one comma-separated string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum HeaderList {
    List(Vec<String>),
    Joined(String),
}

impl HeaderList {
    /// Trimmed, non-empty names.
    pub fn into_names(self) -> Vec<String> {
        let names: Vec<String> = match self {
            HeaderList::List(names) => names,
            HeaderList::Joined(joined) => joined.split(',').map(str::to_string).collect(),
        };
        names
            .into_iter()
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect()
    }
}

/// Header visibility for one direction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectionSettings {
    pub header_strategy: HeaderStrategy,
    pub custom_headers: Vec<String>,
}

/// Every logbook setting, read once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogbookSettings {
    pub enabled: bool,
    pub app_name: String,
    pub original_call_app_header: String,
    pub request: DirectionSettings,
    pub response: DirectionSettings,
    /// Body truncation threshold in characters; negative disables it.
    pub max_body_size: i64,
    pub obfuscate_headers: Vec<String>,
    pub obfuscate_paths: Vec<String>,
}

impl Default for LogbookSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            app_name: UNKNOWN_APP.to_string(),
            original_call_app_header: DEFAULT_CALL_APP_HEADER.to_string(),
            request: DirectionSettings::default(),
            response: DirectionSettings::default(),
            max_body_size: -1,
            obfuscate_headers: Vec::new(),
            obfuscate_paths: Vec::new(),
        }
    }
}

impl LogbookSettings {
    /// Resolve every key against `config`, falling back to defaults.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        Ok(Self {
            enabled: config.get_or_default(&key("enabled"), defaults.enabled)?,
            app_name: read_text(config, "app_name")?.unwrap_or(defaults.app_name),
            original_call_app_header: read_text(config, "original_call_app_header")?
                .unwrap_or(defaults.original_call_app_header),
            request: read_direction(config, "request")?,
            response: read_direction(config, "response")?,
            max_body_size: config.get_or_default(&key("write.max_body_size"), defaults.max_body_size)?,
            obfuscate_headers: read_list(config, "obfuscate.headers")?,
            obfuscate_paths: read_list(config, "obfuscate.paths")?,
        })
    }

    pub fn request_filter(&self) -> RequestFilter {
        RequestFilter {
            headers: HeaderPolicy::for_requests(
                self.request.header_strategy,
                self.request.custom_headers.clone(),
            ),
            obfuscation: HeaderObfuscation::new(self.obfuscate_headers.clone()),
            paths: PathObfuscation::new(&self.obfuscate_paths),
            body: BodyTruncation::new(self.max_body_size),
        }
    }

    pub fn response_filter(&self) -> ResponseFilter {
        ResponseFilter {
            headers: HeaderPolicy::for_responses(
                self.response.header_strategy,
                self.response.custom_headers.clone(),
            ),
            obfuscation: HeaderObfuscation::new(self.obfuscate_headers.clone()),
            body: BodyTruncation::new(self.max_body_size),
        }
    }
}

fn key(suffix: &str) -> String {
    format!("{ROOT_KEY}.{suffix}")
}

fn read_direction(config: &Config, direction: &str) -> Result<DirectionSettings, ConfigError> {
    let strategy_key = key(&format!("{direction}.header_strategy"));
    let header_strategy = match config.get::<String>(&strategy_key)? {
        Some(name) => name
            .parse()
            .map_err(|e: String| ConfigError::invalid_value(&strategy_key, e))?,
        None => HeaderStrategy::default(),
    };

    Ok(DirectionSettings {
        header_strategy,
        custom_headers: read_list(config, &format!("{direction}.custom_headers"))?,
    })
}

fn read_list(config: &Config, suffix: &str) -> Result<Vec<String>, ConfigError> {
    Ok(config
        .get::<HeaderList>(&key(suffix))?
        .map(HeaderList::into_names)
        .unwrap_or_default())
}

/// Scalar as text, so `LOGBOOK_APP_NAME=42` still reads as a name.
fn read_text(config: &Config, suffix: &str) -> Result<Option<String>, ConfigError> {
    let full_key = key(suffix);
    match config.get::<Value>(&full_key)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(text.trim().to_string()).filter(|t| !t.is_empty())),
        Some(Value::Number(number)) => Ok(Some(number.to_string())),
        Some(Value::Bool(flag)) => Ok(Some(flag.to_string())),
        Some(other) => Err(ConfigError::invalid_value(
            full_key,
            format!("expected a string, got {other}"),
        )),
    }
}
