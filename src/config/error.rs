// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the configuration module.

use std::fmt;
use std::io;
use thiserror::Error;

/// Errors raised while loading or interpreting configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required key is missing.
    #[error("configuration key not found: {0}")]
    NotFound(String),

    /// A value could not be parsed or deserialized.
    #[error("failed to parse configuration: {0}")]
    ParseError(String),

    /// A value parsed but is not acceptable for its key.
    #[error("invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    /// A configuration source failed.
    #[error("provider error: {provider}: {message}")]
    ProviderError { provider: String, message: String },

    #[error("{0}")]
    Other(String),
}

impl ConfigError {
    pub fn provider_error<P: fmt::Display, M: fmt::Display>(provider: P, message: M) -> Self {
        Self::ProviderError {
            provider: provider.to_string(),
            message: message.to_string(),
        }
    }

    pub fn invalid_value<K: fmt::Display, M: fmt::Display>(key: K, message: M) -> Self {
        Self::InvalidValue {
            key: key.to_string(),
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;
    use std::io::{Error as IoError, ErrorKind};

    #[test]
    fn test_not_found_names_the_key() {
        let error = ConfigError::NotFound("logbook.app_name".to_string());
        assert_eq!(error.to_string(), "configuration key not found: logbook.app_name");
    }

    #[test]
    fn test_invalid_value_constructor() {
        let error = ConfigError::invalid_value("logbook.request.header_strategy", "unknown strategy 'SOME'");

        match &error {
            ConfigError::InvalidValue { key, message } => {
                assert_eq!(key, "logbook.request.header_strategy");
                assert_eq!(message, "unknown strategy 'SOME'");
            }
            _ => panic!("Expected InvalidValue variant"),
        }
        assert_eq!(
            error.to_string(),
            "invalid value for 'logbook.request.header_strategy': unknown strategy 'SOME'"
        );
    }

    #[test]
    fn test_provider_error_constructor() {
        let error = ConfigError::provider_error("file", "invalid format");
        assert_eq!(error.to_string(), "provider error: file: invalid format");
    }

    #[test]
    fn test_io_error_conversion_keeps_source() {
        let error: ConfigError = IoError::new(ErrorKind::PermissionDenied, "access denied").into();

        match error {
            ConfigError::IoError(ref e) => assert_eq!(e.kind(), ErrorKind::PermissionDenied),
            _ => panic!("Expected IoError variant"),
        }
        assert_eq!(error.source().map(|s| s.to_string()), Some("access denied".to_string()));
    }

    #[test]
    fn test_parse_error_has_no_source() {
        let error = ConfigError::ParseError("bad".to_string());
        assert!(error.source().is_none());
        assert_eq!(error.to_string(), "failed to parse configuration: bad");
    }
}
