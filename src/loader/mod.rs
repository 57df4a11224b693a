// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! High-level entry-point.
//!
//! [`LogbookLoader`] gathers configuration, resolves [`LogbookSettings`] and
//! returns a ready [`LogbookSink`], or nothing when logging is disabled.
//!
//! ```no_run
//! use logbook::LogbookLoader;
//!
//! let sink = LogbookLoader::new()
//!     .with_config_file("logbook.yaml")
//!     .with_env_vars()
//!     .build()?;
//! # Ok::<(), logbook::LoaderError>(())
//! ```


use std::sync::Arc;
use thiserror::Error;

use crate::config::{
    Config, ConfigError, ConfigProvider, EnvConfigProvider, FileConfigProvider, LogbookSettings,
    ROOT_KEY,
};
use crate::core::LogbookError;
use crate::format::ExchangeFormatter;
use crate::logging::{LoggingConfig, init_with_config};
use crate::sink::{HttpLogWriter, InfoLevelLogWriter, LogbookSink};
use crate::{debug_fmt, info_fmt};

/// Errors that can occur while assembling a sink.
#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("configuration error: {0}")]
    ConfigError(#[from] ConfigError),

    #[error("logbook error: {0}")]
    LogbookError(#[from] LogbookError),
}

/// Builder for a configured [`LogbookSink`].
#[derive(Debug, Default)]
pub struct LogbookLoader {
    config: Option<Config>,
    config_file_path: Option<String>,
    use_env_vars: bool,
    env_prefix: Option<String>,
    providers: Vec<Arc<dyn ConfigProvider>>,
    writer: Option<Arc<dyn HttpLogWriter>>,
}

impl LogbookLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a ready configuration instead of file, environment and providers.
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Read a JSON, TOML or YAML configuration file.
    pub fn with_config_file(mut self, file_path: &str) -> Self {
        self.config_file_path = Some(file_path.to_string());
        self
    }

    /// Let `LOGBOOK_*` environment variables override the file.
    pub fn with_env_vars(mut self) -> Self {
        self.use_env_vars = true;
        self
    }

    /// Like [`Self::with_env_vars`] with a custom prefix.
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_string());
        self.use_env_vars = true;
        self
    }

    /// Add a provider that overrides file and environment.
    pub fn with_provider<P: ConfigProvider + 'static>(mut self, provider: P) -> Self {
        self.providers.push(Arc::new(provider));
        self
    }

    /// Send records to `writer` instead of the `log` facade.
    pub fn with_writer<W: HttpLogWriter + 'static>(mut self, writer: W) -> Self {
        self.writer = Some(Arc::new(writer));
        self
    }

    /// Assemble the layered configuration.
    pub fn load_config(&self) -> Result<Config, LoaderError> {
        if let Some(config) = &self.config {
            return Ok(config.clone());
        }

        let mut builder = Config::builder();
        if let Some(file_path) = &self.config_file_path {
            builder = builder.with_provider(FileConfigProvider::new(file_path)?);
        }
        if self.use_env_vars {
            let env_provider = match &self.env_prefix {
                Some(prefix) => EnvConfigProvider::new(prefix),
                None => EnvConfigProvider::default(),
            };
            builder = builder.with_provider(env_provider);
        }
        for provider in &self.providers {
            builder = builder.with_shared_provider(provider.clone());
        }
        Ok(builder.build())
    }

    /// Build the sink, or `None` when `logbook.enabled` is false.
    pub fn build(self) -> Result<Option<LogbookSink>, LoaderError> {
        let config = self.load_config()?;

        if let Some(logging_config) = config.get::<LoggingConfig>(&format!("{ROOT_KEY}.logging"))? {
            init_with_config(logging_config.level_filter(), &logging_config);
        }

        let settings = LogbookSettings::from_config(&config)?;
        if !settings.enabled {
            debug_fmt!("Loader", "Logbook disabled, no sink built");
            return Ok(None);
        }

        info_fmt!(
            "Loader",
            "Logbook enabled for {} (request headers: {}, response headers: {}, max body size: {})",
            settings.app_name,
            settings.request.header_strategy,
            settings.response.header_strategy,
            settings.max_body_size
        );

        let formatter = ExchangeFormatter::from_settings(&settings);
        let writer: Arc<dyn HttpLogWriter> = match self.writer {
            Some(writer) => writer,
            None => Arc::new(InfoLevelLogWriter),
        };
        Ok(Some(LogbookSink::with_shared_writer(formatter, writer)))
    }
}
