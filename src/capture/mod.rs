// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Owned message snapshots.
//!
//! Interceptors that don't already have a type implementing
//! [`HttpRequest`]/[`HttpResponse`] can build a [`CapturedRequest`] or
//! [`CapturedResponse`] by hand, or buffer a `hyper` message with
//! [`capture_request`]/[`capture_response`].  The buffered message is handed
//! back with a replayable body so it can continue down the pipeline.


use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Body;

use crate::core::{HttpHeaders, HttpMessage, HttpRequest, HttpResponse, LogbookError, Origin};
use crate::debug_fmt;

/// Owned request snapshot.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    origin: Origin,
    method: String,
    uri: String,
    headers: HttpHeaders,
    body: Bytes,
}

impl CapturedRequest {
    pub fn new(origin: Origin, method: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            origin,
            method: method.into(),
            uri: uri.into(),
            headers: HttpHeaders::new(),
            body: Bytes::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.append(name, value);
        self
    }

    pub fn with_headers(mut self, headers: HttpHeaders) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }
}

impl HttpMessage for CapturedRequest {
    fn headers(&self) -> &HttpHeaders {
        &self.headers
    }

    fn body(&self) -> Result<Bytes, LogbookError> {
        Ok(self.body.clone())
    }

    fn origin(&self) -> Origin {
        self.origin
    }
}

impl HttpRequest for CapturedRequest {
    fn method(&self) -> &str {
        &self.method
    }

    fn request_uri(&self) -> &str {
        &self.uri
    }
}

/// Owned response snapshot.
#[derive(Debug, Clone)]
pub struct CapturedResponse {
    origin: Origin,
    status: u16,
    headers: HttpHeaders,
    body: Bytes,
}

impl CapturedResponse {
    pub fn new(origin: Origin, status: u16) -> Self {
        Self {
            origin,
            status,
            headers: HttpHeaders::new(),
            body: Bytes::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.append(name, value);
        self
    }

    pub fn with_headers(mut self, headers: HttpHeaders) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }
}

impl HttpMessage for CapturedResponse {
    fn headers(&self) -> &HttpHeaders {
        &self.headers
    }

    fn body(&self) -> Result<Bytes, LogbookError> {
        Ok(self.body.clone())
    }

    fn origin(&self) -> Origin {
        self.origin
    }
}

impl HttpResponse for CapturedResponse {
    fn status(&self) -> u16 {
        self.status
    }
}

/// Buffer a `hyper` request body and snapshot the request.
///
/// A body stream that fails yields [`LogbookError::BodyRead`]; in that case
/// the request is consumed and nothing is logged.
pub async fn capture_request<B>(
    request: hyper::Request<B>,
    origin: Origin,
) -> Result<(CapturedRequest, hyper::Request<Full<Bytes>>), LogbookError>
where
    B: Body,
    B::Error: std::fmt::Display,
{
    let (parts, body) = request.into_parts();
    let body = collect_body(body).await?;

    let captured = CapturedRequest {
        origin,
        method: parts.method.to_string(),
        uri: parts.uri.to_string(),
        headers: HttpHeaders::from(&parts.headers),
        body: body.clone(),
    };
    debug_fmt!(
        "Capture",
        "Captured {} {} ({} body bytes)",
        captured.method,
        captured.uri,
        captured.body.len()
    );

    Ok((captured, hyper::Request::from_parts(parts, Full::new(body))))
}

/// Buffer a `hyper` response body and snapshot the response.
pub async fn capture_response<B>(
    response: hyper::Response<B>,
    origin: Origin,
) -> Result<(CapturedResponse, hyper::Response<Full<Bytes>>), LogbookError>
where
    B: Body,
    B::Error: std::fmt::Display,
{
    let (parts, body) = response.into_parts();
    let body = collect_body(body).await?;

    let captured = CapturedResponse {
        origin,
        status: parts.status.as_u16(),
        headers: HttpHeaders::from(&parts.headers),
        body: body.clone(),
    };
    debug_fmt!(
        "Capture",
        "Captured response {} ({} body bytes)",
        captured.status,
        captured.body.len()
    );

    Ok((captured, hyper::Response::from_parts(parts, Full::new(body))))
}

async fn collect_body<B>(body: B) -> Result<Bytes, LogbookError>
where
    B: Body,
    B::Error: std::fmt::Display,
{
    body.collect()
        .await
        .map(|collected| collected.to_bytes())
        .map_err(|e| LogbookError::BodyRead(e.to_string()))
}
