// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Exchange formatting.
//!
//! [`ExchangeFormatter`] turns a request, or a request/response pair, into
//! one JSON line:
//!
//! ```text
//! {"correlation":"…","type":"in","uri":"…","method":"GET","origin":"PROVIDER",…}
//! {"correlation":"…","type":"out","uri":"…","origin":"PROVIDER","duration":42,"status":200,"code":"SUCCESS",…}
//! ```
//!
//! Each call is independent and the formatter is immutable, so one instance
//! can be shared across threads without locking.


pub mod code;
pub mod content_type;
pub mod record;

pub use code::extract_code;
pub use content_type::is_json;
pub use record::{LoggedBody, RequestRecord, ResponseRecord, TYPE_IN, TYPE_OUT};

use crate::config::LogbookSettings;
use crate::core::{HttpHeaders, HttpMessage, HttpRequest, HttpResponse, LogbookError, MessageKind, Role};
use crate::filters::{RequestFilter, ResponseFilter};
use crate::trace_fmt;

/// Header carrying the caller's application name.
pub const DEFAULT_CALL_APP_HEADER: &str = "x-original-call-app";

/// Builds log lines for requests and responses.
#[derive(Debug, Clone)]
pub struct ExchangeFormatter {
    app_name: String,
    call_app_header: String,
    request_filter: RequestFilter,
    response_filter: ResponseFilter,
}

impl ExchangeFormatter {
    /// Formatter for `app_name` that keeps every header and the whole body.
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            call_app_header: DEFAULT_CALL_APP_HEADER.to_string(),
            request_filter: RequestFilter::default(),
            response_filter: ResponseFilter::default(),
        }
    }

    /// Formatter configured from loaded settings.
    pub fn from_settings(settings: &LogbookSettings) -> Self {
        Self {
            app_name: settings.app_name.clone(),
            call_app_header: settings.original_call_app_header.clone(),
            request_filter: settings.request_filter(),
            response_filter: settings.response_filter(),
        }
    }

    pub fn with_request_filter(mut self, filter: RequestFilter) -> Self {
        self.request_filter = filter;
        self
    }

    pub fn with_response_filter(mut self, filter: ResponseFilter) -> Self {
        self.response_filter = filter;
        self
    }

    pub fn with_call_app_header(mut self, header: impl Into<String>) -> Self {
        self.call_app_header = header.into();
        self
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    /// Format the record for a freshly observed request.
    pub fn format_request<R>(&self, correlation_id: &str, request: &R) -> Result<String, LogbookError>
    where
        R: HttpRequest + ?Sized,
    {
        let filtered = self.request_filter.apply(request);
        let origin = Role::of(MessageKind::Request, request.origin());

        let record = RequestRecord {
            correlation: correlation_id,
            kind: TYPE_IN,
            uri: filtered.request_uri(),
            method: filtered.method(),
            origin,
            body: LoggedBody::prepare(filtered.content_type(), filtered.body_as_string()?)?,
            headers: non_empty(filtered.headers()),
            original_call_app: match origin {
                Role::Provider => self.original_call_app(request),
                Role::Consumer => None,
            },
        };

        let line = serde_json::to_string(&record)?;
        trace_fmt!("ExchangeFormatter", "Formatted request {}", correlation_id);
        Ok(line)
    }

    /// Format the record for the response to `request`.
    pub fn format_response<R, S>(
        &self,
        correlation_id: &str,
        request: &R,
        response: &S,
        duration_millis: u64,
    ) -> Result<String, LogbookError>
    where
        R: HttpRequest + ?Sized,
        S: HttpResponse + ?Sized,
    {
        let filtered_request = self.request_filter.apply(request);
        let filtered = self.response_filter.apply(response);
        let origin = Role::of(MessageKind::Response, response.origin());

        let status = filtered.status();
        let body = filtered.body_as_string()?;
        let code = extract_code(&body, status);

        let record = ResponseRecord {
            correlation: correlation_id,
            kind: TYPE_OUT,
            uri: filtered_request.request_uri(),
            origin,
            duration: duration_millis,
            status,
            code,
            body: LoggedBody::prepare(filtered.content_type(), body)?,
            headers: non_empty(filtered.headers()),
            // Attribution comes from the inbound request, not our reply.
            original_call_app: match origin {
                Role::Provider => self.original_call_app(request),
                Role::Consumer => None,
            },
        };

        let line = serde_json::to_string(&record)?;
        trace_fmt!(
            "ExchangeFormatter",
            "Formatted response {} ({} in {}ms)",
            correlation_id,
            status,
            duration_millis
        );
        Ok(line)
    }

    /// Caller application named in the unfiltered request, unless it is us.
    fn original_call_app<'a, R>(&self, request: &'a R) -> Option<&'a str>
    where
        R: HttpRequest + ?Sized,
    {
        request
            .headers()
            .first(&self.call_app_header)
            .filter(|caller| {
                !caller.is_empty() && caller.to_lowercase() != self.app_name.to_lowercase()
            })
    }
}

fn non_empty(headers: &HttpHeaders) -> Option<&HttpHeaders> {
    (!headers.is_empty()).then_some(headers)
}
