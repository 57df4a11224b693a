// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Logbook configuration subsystem
//!
//! Settings are read from an ordered list of [`ConfigProvider`]s; later
//! providers override earlier ones.  Typical stacking order looks like this:
//!
//! 1. `FileConfigProvider` – `logbook.{toml,json,yaml}`
//! 2. `EnvConfigProvider`  – `LOGBOOK_REQUEST__HEADER_STRATEGY=DEFAULT`
//! 3. *your* provider implementing [`ConfigProvider`]
//!
//! The resolved values are collected once into [`LogbookSettings`].
//!
//! | key | type | default | description |
//! |-----|------|---------|-------------|
//! | `logbook.enabled`                    | bool    | `false`               | Build a sink at all            |
//! | `logbook.app_name`                   | string  | `unknown`             | Name of this service           |
//! | `logbook.original_call_app_header`   | string  | `x-original-call-app` | Caller attribution header      |
//! | `logbook.request.header_strategy`    | string  | `ALL`                 | Request header visibility      |
//! | `logbook.request.custom_headers`     | list    | –                     | Extra request headers to keep  |
//! | `logbook.response.header_strategy`   | string  | `ALL`                 | Response header visibility     |
//! | `logbook.response.custom_headers`    | list    | –                     | Extra response headers to keep |
//! | `logbook.write.max_body_size`        | integer | `-1`                  | Body truncation, `<0` disables |
//! | `logbook.obfuscate.headers`          | list    | –                     | Headers whose values are masked|
//! | `logbook.obfuscate.paths`            | list    | –                     | Path patterns to mask          |

mod env;
pub mod error;
mod file;
mod settings;


pub use env::EnvConfigProvider;
pub use error::ConfigError;
pub use file::{FileConfigProvider, FileFormat};
pub use settings::{DirectionSettings, HeaderList, LogbookSettings};

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt::Debug;
use std::sync::Arc;

/// Root key every logbook setting lives under.
pub const ROOT_KEY: &str = "logbook";

/// Core configuration provider trait that all configuration sources must implement.
/// This trait is object-safe since it doesn't contain generic methods.
pub trait ConfigProvider: Debug + Send + Sync {
    /// Check if the configuration provider has a value for the given key.
    fn has(&self, key: &str) -> bool;

    /// Get the name of the configuration provider for debugging purposes.
    fn provider_name(&self) -> &str;

    /// Get a raw configuration value by key.
    fn get_raw(&self, key: &str) -> Result<Option<Value>, ConfigError>;
}

/// Typed access on top of [`ConfigProvider`].
pub trait ConfigProviderExt: ConfigProvider {
    fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, ConfigError> {
        match self.get_raw(key)? {
            Some(value) => deserialize(key, value).map(Some),
            None => Ok(None),
        }
    }
}

impl<T: ConfigProvider> ConfigProviderExt for T {}

fn deserialize<T: DeserializeOwned>(key: &str, value: Value) -> Result<T, ConfigError> {
    serde_json::from_value(value)
        .map_err(|e| ConfigError::ParseError(format!("failed to deserialize '{key}': {e}")))
}

/// Builder for the configuration system.
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    providers: Vec<Arc<dyn ConfigProvider>>,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a configuration provider.  Providers added later take precedence.
    pub fn with_provider<P: ConfigProvider + 'static>(mut self, provider: P) -> Self {
        self.providers.push(Arc::new(provider));
        self
    }

    /// Add a provider that is already shared.
    pub fn with_shared_provider(mut self, provider: Arc<dyn ConfigProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn build(self) -> Config {
        Config {
            providers: self.providers,
        }
    }
}

/// Layered view over all registered providers.
#[derive(Debug, Clone, Default)]
pub struct Config {
    providers: Vec<Arc<dyn ConfigProvider>>,
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    fn get_raw(&self, key: &str) -> Result<Option<Value>, ConfigError> {
        // Later providers override earlier ones
        for provider in self.providers.iter().rev() {
            if provider.has(key) {
                return provider.get_raw(key);
            }
        }
        Ok(None)
    }

    /// Get a configuration value from the highest-priority provider that has it.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, ConfigError> {
        match self.get_raw(key)? {
            Some(value) => deserialize(key, value).map(Some),
            None => Ok(None),
        }
    }

    /// Get a configuration value by key with a default fallback value.
    pub fn get_or_default<T: DeserializeOwned>(
        &self,
        key: &str,
        default: T,
    ) -> Result<T, ConfigError> {
        Ok(self.get(key)?.unwrap_or(default))
    }

    /// Names of the registered providers, lowest priority first.
    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.provider_name()).collect()
    }

    /// Configuration backed by a single file.
    pub fn default_file(file_path: &str) -> Result<Self, ConfigError> {
        let provider = FileConfigProvider::new(file_path)?;
        Ok(Self::builder().with_provider(provider).build())
    }
}
