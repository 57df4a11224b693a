// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Logbook - structured request/response logging for HTTP interceptors
//!
//! An HTTP client interceptor or server filter hands each observed request,
//! and later its response, to a [`Sink`].  The sink filters and formats the
//! exchange into one JSON line per event and passes it to an
//! [`HttpLogWriter`].
//!
//! # Pipeline
//!
//! - **Filtering**: header visibility per direction (`ALL`, `NONE`,
//!   `DEFAULT`, `CUSTOM`, `DEFAULT_AND_CUSTOM`), header value masking, path
//!   masking and body truncation.  See [`filters`].
//! - **Formatting**: a fixed field order, JSON bodies embedded raw, a
//!   `CONSUMER`/`PROVIDER` role and an outcome `code` for responses.  See
//!   [`format`].
//! - **Writing**: the `log` facade, a `slog` logger or any `io::Write`.
//!
//! # Configuration
//!
//! Settings are layered from files (JSON, TOML, YAML), `LOGBOOK_*`
//! environment variables and custom [`ConfigProvider`]s, then resolved once
//! into [`LogbookSettings`].
//!
//! ```rust,no_run
//! use logbook::{CapturedRequest, LogbookLoader, Origin, Precorrelation, Sink};
//!
//! let Some(sink) = LogbookLoader::new().with_env_vars().build()? else {
//!     return Ok(());
//! };
//!
//! let request = CapturedRequest::new(Origin::Remote, "GET", "/orders/7")
//!     .with_header("Accept", "application/json");
//! let precorrelation = Precorrelation::new();
//! sink.on_request(precorrelation.id(), &request)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod logging;

pub mod capture;
pub mod config;
pub mod core;
pub mod filters;
pub mod format;
pub mod loader;
pub mod sink;

// Re-export key types at the crate root for convenience
pub use capture::{CapturedRequest, CapturedResponse, capture_request, capture_response};
pub use config::{
    Config, ConfigBuilder, ConfigError, ConfigProvider, ConfigProviderExt, EnvConfigProvider,
    FileConfigProvider, LogbookSettings,
};
pub use crate::core::{
    Correlation, HttpHeaders, HttpMessage, HttpRequest, HttpResponse, LogbookError, MessageKind,
    Origin, Precorrelation, Role,
};
pub use filters::{
    BodyTruncation, HeaderObfuscation, HeaderPolicy, HeaderStrategy, PathObfuscation,
    RequestFilter, ResponseFilter,
};
pub use format::{ExchangeFormatter, extract_code, is_json};
pub use loader::{LoaderError, LogbookLoader};
pub use sink::{
    HttpLogWriter, InfoLevelLogWriter, LogbookSink, Sink, SlogLogWriter, StreamLogWriter,
};
