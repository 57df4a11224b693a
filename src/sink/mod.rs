// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Event entry points.
//!
//! An interceptor calls [`Sink::on_request`] when it sees a request and
//! [`Sink::on_response`] with the same correlation id once the response is
//! in.  Every call formats and writes exactly one record before returning.
//! Failures are returned to the caller, which must keep them away from the
//! exchange being logged.

pub mod writer;


pub use writer::{HttpLogWriter, InfoLevelLogWriter, LOG_TARGET, SlogLogWriter, StreamLogWriter};

use std::fmt::Debug;
use std::sync::Arc;

use crate::core::{Correlation, HttpRequest, HttpResponse, LogbookError, Precorrelation};
use crate::format::ExchangeFormatter;
use crate::trace_fmt;

/// Receives request and response events.
pub trait Sink: Debug + Send + Sync {
    fn on_request(&self, correlation_id: &str, request: &dyn HttpRequest) -> Result<(), LogbookError>;

    fn on_response(
        &self,
        correlation_id: &str,
        request: &dyn HttpRequest,
        response: &dyn HttpResponse,
        duration_millis: u64,
    ) -> Result<(), LogbookError>;

    /// [`Sink::on_request`] keyed by a precorrelation.
    fn on_precorrelated_request(
        &self,
        precorrelation: &Precorrelation,
        request: &dyn HttpRequest,
    ) -> Result<(), LogbookError> {
        self.on_request(precorrelation.id(), request)
    }

    /// [`Sink::on_response`] with id and duration taken from a correlation.
    fn on_correlated_response(
        &self,
        correlation: &Correlation,
        request: &dyn HttpRequest,
        response: &dyn HttpResponse,
    ) -> Result<(), LogbookError> {
        self.on_response(correlation.id(), request, response, correlation.duration_millis())
    }
}

/// Formats with an [`ExchangeFormatter`] and hands the line to a writer.
#[derive(Debug, Clone)]
pub struct LogbookSink {
    formatter: Arc<ExchangeFormatter>,
    writer: Arc<dyn HttpLogWriter>,
}

impl LogbookSink {
    pub fn new<W: HttpLogWriter + 'static>(formatter: ExchangeFormatter, writer: W) -> Self {
        Self::with_shared_writer(formatter, Arc::new(writer))
    }

    pub fn with_shared_writer(formatter: ExchangeFormatter, writer: Arc<dyn HttpLogWriter>) -> Self {
        Self {
            formatter: Arc::new(formatter),
            writer,
        }
    }

    pub fn formatter(&self) -> &ExchangeFormatter {
        &self.formatter
    }

    pub fn is_active(&self) -> bool {
        self.writer.is_active()
    }
}

impl Sink for LogbookSink {
    fn on_request(&self, correlation_id: &str, request: &dyn HttpRequest) -> Result<(), LogbookError> {
        if !self.writer.is_active() {
            trace_fmt!("LogbookSink", "Writer inactive, skipping request {}", correlation_id);
            return Ok(());
        }
        let record = self.formatter.format_request(correlation_id, request)?;
        self.writer.write_request(correlation_id, &record)
    }

    fn on_response(
        &self,
        correlation_id: &str,
        request: &dyn HttpRequest,
        response: &dyn HttpResponse,
        duration_millis: u64,
    ) -> Result<(), LogbookError> {
        if !self.writer.is_active() {
            trace_fmt!("LogbookSink", "Writer inactive, skipping response {}", correlation_id);
            return Ok(());
        }
        let record = self
            .formatter
            .format_response(correlation_id, request, response, duration_millis)?;
        self.writer.write_response(correlation_id, &record)
    }
}
