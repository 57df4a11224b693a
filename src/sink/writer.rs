// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Destinations for formatted exchange records.

use std::fmt;
use std::io::Write;
use std::sync::Mutex;

use log::Level;
use slog::Logger;

use crate::core::LogbookError;

/// `log` target used by [`InfoLevelLogWriter`].
pub const LOG_TARGET: &str = "logbook";

/// Persists formatted records.
///
/// Called synchronously from the sink, once per event, from any thread.
pub trait HttpLogWriter: fmt::Debug + Send + Sync {
    /// Whether records would go anywhere.  An inactive writer lets the sink
    /// skip formatting altogether.
    fn is_active(&self) -> bool {
        true
    }

    fn write_request(&self, correlation_id: &str, record: &str) -> Result<(), LogbookError>;

    fn write_response(&self, correlation_id: &str, record: &str) -> Result<(), LogbookError>;
}

/// Writes records at INFO on the `logbook` target of the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct InfoLevelLogWriter;

impl HttpLogWriter for InfoLevelLogWriter {
    fn is_active(&self) -> bool {
        log::log_enabled!(target: LOG_TARGET, Level::Info)
    }

    fn write_request(&self, _correlation_id: &str, record: &str) -> Result<(), LogbookError> {
        log::info!(target: LOG_TARGET, "{}", record);
        Ok(())
    }

    fn write_response(&self, _correlation_id: &str, record: &str) -> Result<(), LogbookError> {
        log::info!(target: LOG_TARGET, "{}", record);
        Ok(())
    }
}

/// Writes records through a `slog` logger, tagged with the correlation id.
#[derive(Clone)]
pub struct SlogLogWriter {
    logger: Logger,
}

impl SlogLogWriter {
    pub fn new(logger: Logger) -> Self {
        Self { logger }
    }

    /// Writer bound to the global `slog-scope` logger.
    pub fn global() -> Self {
        Self::new(slog_scope::logger())
    }
}

impl fmt::Debug for SlogLogWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlogLogWriter").finish_non_exhaustive()
    }
}

impl HttpLogWriter for SlogLogWriter {
    fn write_request(&self, correlation_id: &str, record: &str) -> Result<(), LogbookError> {
        slog::info!(self.logger, "{}", record; "correlation" => correlation_id, "type" => "in");
        Ok(())
    }

    fn write_response(&self, correlation_id: &str, record: &str) -> Result<(), LogbookError> {
        slog::info!(self.logger, "{}", record; "correlation" => correlation_id, "type" => "out");
        Ok(())
    }
}

/// Writes one line per record into any [`Write`] implementation.
pub struct StreamLogWriter<W> {
    stream: Mutex<W>,
}

impl<W: Write + Send> StreamLogWriter<W> {
    pub fn new(stream: W) -> Self {
        Self {
            stream: Mutex::new(stream),
        }
    }

    /// Give back the underlying stream.
    pub fn into_inner(self) -> Result<W, LogbookError> {
        self.stream
            .into_inner()
            .map_err(|_| LogbookError::Write("stream lock poisoned".to_string()))
    }

    fn write_line(&self, record: &str) -> Result<(), LogbookError> {
        let mut stream = self
            .stream
            .lock()
            .map_err(|_| LogbookError::Write("stream lock poisoned".to_string()))?;
        stream.write_all(record.as_bytes())?;
        stream.write_all(b"\n")?;
        stream.flush()?;
        Ok(())
    }
}

impl<W> fmt::Debug for StreamLogWriter<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamLogWriter").finish_non_exhaustive()
    }
}

impl<W: Write + Send> HttpLogWriter for StreamLogWriter<W> {
    fn write_request(&self, _correlation_id: &str, record: &str) -> Result<(), LogbookError> {
        self.write_line(record)
    }

    fn write_response(&self, _correlation_id: &str, record: &str) -> Result<(), LogbookError> {
        self.write_line(record)
    }
}
