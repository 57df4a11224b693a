// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Core primitives – message views, origins, correlation & errors.
//!
//! Everything the formatting pipeline reads is defined here.  The pipeline
//! never owns an HTTP message; it borrows a read-only view supplied by the
//! transport layer (`crate::capture` ships owned snapshots for convenience).


mod headers;

pub use headers::HttpHeaders;

use bytes::Bytes;
use serde::Serialize;
use std::fmt;
use std::time::{Duration, Instant};
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur while formatting or writing an exchange.
#[derive(Error, Debug)]
pub enum LogbookError {
    /// The message body could not be read
    #[error("failed to read body: {0}")]
    BodyRead(String),

    /// The log record could not be serialized
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The log writer rejected the record
    #[error("write error: {0}")]
    Write(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<crate::config::ConfigError> for LogbookError {
    fn from(err: crate::config::ConfigError) -> Self {
        LogbookError::Config(err.to_string())
    }
}

/// Where a message was observed relative to this process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    /// Observed at its point of creation (outbound client send, server reply).
    Local,
    /// Observed on arrival from another process.
    Remote,
}

/// Which half of an exchange a message is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    Request,
    Response,
}

/// Business role of this process in an exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// This process calls a remote service.
    Consumer,
    /// This process serves an inbound caller.
    Provider,
}

impl Role {
    /// Derive the role from the capture point of a message.
    ///
    /// Request and response capture points disagree on what `Local` means:
    /// an outbound client records its request as `Local` but the reply as
    /// `Remote`, while an inbound server filter records the request as
    /// `Remote` and its own reply as `Local`.  Both pairs describe the
    /// same role, hence the crossed table.
    pub fn of(kind: MessageKind, origin: Origin) -> Self {
        match (kind, origin) {
            (MessageKind::Request, Origin::Local) => Role::Consumer,
            (MessageKind::Request, Origin::Remote) => Role::Provider,
            (MessageKind::Response, Origin::Remote) => Role::Consumer,
            (MessageKind::Response, Origin::Local) => Role::Provider,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Consumer => "CONSUMER",
            Role::Provider => "PROVIDER",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read-only view shared by requests and responses.
pub trait HttpMessage: fmt::Debug + Send + Sync {
    /// Headers as observed (or as filtered, for wrapped views).
    fn headers(&self) -> &HttpHeaders;

    /// Raw body bytes.  Reading may fail for lazily buffered bodies.
    fn body(&self) -> Result<Bytes, LogbookError>;

    /// Capture point of this message.
    fn origin(&self) -> Origin;

    /// `Content-Type` header, verbatim.
    fn content_type(&self) -> Option<&str> {
        self.headers().first("content-type")
    }

    /// Body decoded as UTF-8, replacing invalid sequences.
    fn body_as_string(&self) -> Result<String, LogbookError> {
        let body = self.body()?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

/// Read-only request view.
pub trait HttpRequest: HttpMessage {
    /// HTTP method, e.g. `GET`.
    fn method(&self) -> &str;

    /// Request URI as seen by the transport (absolute or origin-form).
    fn request_uri(&self) -> &str;
}

/// Read-only response view.
pub trait HttpResponse: HttpMessage {
    /// Numeric HTTP status.
    fn status(&self) -> u16;
}

/// Correlation handle created when a request is first observed.
#[derive(Debug, Clone)]
pub struct Precorrelation {
    id: String,
    start: Instant,
}

impl Precorrelation {
    /// Start a new exchange with a random id.
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4().to_string())
    }

    /// Start a new exchange with a caller-chosen id.
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            start: Instant::now(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Close the exchange, measuring the time since observation.
    pub fn correlate(self) -> Correlation {
        Correlation {
            duration: self.start.elapsed(),
            id: self.id,
        }
    }
}

impl Default for Precorrelation {
    fn default() -> Self {
        Self::new()
    }
}

/// Correlation handle for a completed exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Correlation {
    id: String,
    duration: Duration,
}

impl Correlation {
    pub fn new(id: impl Into<String>, duration: Duration) -> Self {
        Self {
            id: id.into(),
            duration,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Elapsed time in whole milliseconds, saturating.
    pub fn duration_millis(&self) -> u64 {
        u64::try_from(self.duration.as_millis()).unwrap_or(u64::MAX)
    }
}
