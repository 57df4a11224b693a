// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Message filters
//!
//! Filters decide what part of a message makes it into the log record.
//! They never touch the message itself: [`RequestFilter::apply`] and
//! [`ResponseFilter::apply`] return a wrapper that borrows the original view
//! and exposes the filtered headers, sanitised URI and truncated body through
//! the same read-only traits.
//!
//! | filter | configured by | effect |
//! |--------|---------------|--------|
//! | [`HeaderPolicy`]      | `header_strategy`, `custom_headers` | drops headers outside the allow-list |
//! | [`HeaderObfuscation`] | `obfuscate.headers` | replaces values with `XXX` |
//! | [`PathObfuscation`]   | `obfuscate.paths`   | replaces `{placeholder}` path segments with `XXX` |
//! | [`BodyTruncation`]    | `write.max_body_size` | cuts long bodies and appends `...` |

#[cfg(test)]
#[path = "../../tests/unit/filters/tests.rs"]
mod tests;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use crate::core::{HttpHeaders, HttpMessage, HttpRequest, HttpResponse, LogbookError, Origin};
use crate::trace_fmt;

/// Replacement used for every obfuscated value.
pub const OBFUSCATED: &str = "XXX";

/// Headers kept by the `DEFAULT` strategy on requests.
pub const DEFAULT_REQUEST_HEADERS: &[&str] = &["Accept", "Content-Type", "X-Gravitee-Api-Key"];

/// Headers kept by the `DEFAULT` strategy on responses.
pub const DEFAULT_RESPONSE_HEADERS: &[&str] = &["Content-Type"];

/// Which headers survive into the log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum HeaderStrategy {
    /// Keep every header.
    #[default]
    All,
    /// Drop every header.
    None,
    /// Keep the direction's built-in allow-list.
    Default,
    /// Keep the configured custom allow-list.
    Custom,
    /// Keep the union of both allow-lists.
    DefaultAndCustom,
}

impl HeaderStrategy {
    /// Filter `headers` under this strategy.
    ///
    /// Matching is case-insensitive; an empty effective allow-list keeps nothing.
    pub fn filter<D, C>(
        &self,
        headers: &HttpHeaders,
        default_allowed: &[D],
        custom_allowed: &[C],
    ) -> HttpHeaders
    where
        D: AsRef<str>,
        C: AsRef<str>,
    {
        match self {
            HeaderStrategy::All => headers.clone(),
            HeaderStrategy::None => HttpHeaders::new(),
            HeaderStrategy::Default => keep_listed(headers, default_allowed, &[] as &[&str]),
            HeaderStrategy::Custom => keep_listed(headers, &[] as &[&str], custom_allowed),
            HeaderStrategy::DefaultAndCustom => keep_listed(headers, default_allowed, custom_allowed),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HeaderStrategy::All => "ALL",
            HeaderStrategy::None => "NONE",
            HeaderStrategy::Default => "DEFAULT",
            HeaderStrategy::Custom => "CUSTOM",
            HeaderStrategy::DefaultAndCustom => "DEFAULT_AND_CUSTOM",
        }
    }
}

fn keep_listed<D, C>(headers: &HttpHeaders, first: &[D], second: &[C]) -> HttpHeaders
where
    D: AsRef<str>,
    C: AsRef<str>,
{
    if first.is_empty() && second.is_empty() {
        return HttpHeaders::new();
    }
    let listed = |name: &str| {
        first.iter().any(|allowed| allowed.as_ref().eq_ignore_ascii_case(name))
            || second.iter().any(|allowed| allowed.as_ref().eq_ignore_ascii_case(name))
    };
    let mut kept = headers.clone();
    kept.retain(listed);
    kept
}

impl fmt::Display for HeaderStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HeaderStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "ALL" => Ok(HeaderStrategy::All),
            "NONE" => Ok(HeaderStrategy::None),
            "DEFAULT" => Ok(HeaderStrategy::Default),
            "CUSTOM" => Ok(HeaderStrategy::Custom),
            "DEFAULT_AND_CUSTOM" => Ok(HeaderStrategy::DefaultAndCustom),
            _ => Err(format!("unknown header strategy: {s}")),
        }
    }
}

impl TryFrom<String> for HeaderStrategy {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<HeaderStrategy> for String {
    fn from(strategy: HeaderStrategy) -> Self {
        strategy.as_str().to_string()
    }
}

/// A strategy bound to one direction's allow-lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderPolicy {
    strategy: HeaderStrategy,
    default_allowed: &'static [&'static str],
    custom_allowed: Vec<String>,
}

impl HeaderPolicy {
    pub fn for_requests(strategy: HeaderStrategy, custom_allowed: Vec<String>) -> Self {
        Self {
            strategy,
            default_allowed: DEFAULT_REQUEST_HEADERS,
            custom_allowed,
        }
    }

    pub fn for_responses(strategy: HeaderStrategy, custom_allowed: Vec<String>) -> Self {
        Self {
            strategy,
            default_allowed: DEFAULT_RESPONSE_HEADERS,
            custom_allowed,
        }
    }

    pub fn strategy(&self) -> HeaderStrategy {
        self.strategy
    }

    pub fn apply(&self, headers: &HttpHeaders) -> HttpHeaders {
        self.strategy
            .filter(headers, self.default_allowed, self.custom_allowed.as_slice())
    }
}

/// Masks the values of sensitive headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderObfuscation {
    names: Vec<String>,
}

impl HeaderObfuscation {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn apply(&self, headers: &mut HttpHeaders) {
        if self.names.is_empty() {
            return;
        }
        headers.replace_values(
            |name| self.names.iter().any(|n| n.eq_ignore_ascii_case(name)),
            OBFUSCATED,
        );
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder,
    Wildcard,
}

/// A path template such as `/accounts/{id}/cards/*`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    pub fn parse(pattern: &str) -> Self {
        let segments = strip_root(pattern)
            .split('/')
            .map(|segment| {
                if segment == "*" {
                    Segment::Wildcard
                } else if segment.starts_with('{') && segment.ends_with('}') && segment.len() >= 2 {
                    Segment::Placeholder
                } else {
                    Segment::Literal(segment.to_string())
                }
            })
            .collect();

        Self {
            raw: pattern.to_string(),
            segments,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Obfuscated copy of `path`, or `None` when the pattern doesn't match.
    fn obfuscate(&self, path: &str) -> Option<String> {
        let parts: Vec<&str> = strip_root(path).split('/').collect();
        if parts.len() != self.segments.len() {
            return None;
        }

        let mut out = String::with_capacity(path.len());
        for (part, segment) in parts.iter().zip(&self.segments) {
            out.push('/');
            match segment {
                Segment::Literal(literal) if literal == part => out.push_str(part),
                Segment::Literal(_) => return None,
                Segment::Placeholder => out.push_str(OBFUSCATED),
                Segment::Wildcard => out.push_str(part),
            }
        }
        Some(out)
    }
}

fn strip_root(path: &str) -> &str {
    path.strip_prefix('/').unwrap_or(path)
}

/// Splits a URI into `(scheme+authority, path, query+fragment)`.
fn split_uri(uri: &str) -> (&str, &str, &str) {
    let (head, tail) = match uri.find(['?', '#']) {
        Some(idx) => uri.split_at(idx),
        None => (uri, ""),
    };
    let path_start = match head.find("://") {
        Some(idx) => {
            let authority = idx + 3;
            head[authority..]
                .find('/')
                .map_or(head.len(), |slash| authority + slash)
        }
        None => 0,
    };
    let (prefix, path) = head.split_at(path_start);
    (prefix, path, tail)
}

/// Masks identifiers embedded in request paths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathObfuscation {
    patterns: Vec<PathPattern>,
}

impl PathObfuscation {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            patterns: patterns
                .into_iter()
                .map(|p| PathPattern::parse(p.as_ref()))
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Apply the first matching pattern to the path part of `uri`.
    pub fn apply<'a>(&self, uri: &'a str) -> Cow<'a, str> {
        if self.patterns.is_empty() {
            return Cow::Borrowed(uri);
        }
        let (prefix, path, suffix) = split_uri(uri);
        for pattern in &self.patterns {
            if let Some(obfuscated) = pattern.obfuscate(path) {
                trace_fmt!("PathObfuscation", "Path {} matched {}", path, pattern.as_str());
                return Cow::Owned(format!("{prefix}{obfuscated}{suffix}"));
            }
        }
        Cow::Borrowed(uri)
    }
}

/// Size bound on captured bodies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BodyTruncation {
    max_chars: Option<usize>,
}

impl BodyTruncation {
    /// A negative size disables truncation.
    pub fn new(max_body_size: i64) -> Self {
        Self {
            max_chars: usize::try_from(max_body_size).ok(),
        }
    }

    pub fn unlimited() -> Self {
        Self { max_chars: None }
    }

    pub fn max_chars(&self) -> Option<usize> {
        self.max_chars
    }

    pub fn apply(&self, body: Bytes) -> Bytes {
        let Some(max) = self.max_chars else {
            return body;
        };
        let text = String::from_utf8_lossy(&body);
        match text.char_indices().nth(max) {
            None => body,
            Some((cut, _)) => {
                let mut truncated = String::with_capacity(cut + 3);
                truncated.push_str(&text[..cut]);
                truncated.push_str("...");
                Bytes::from(truncated)
            }
        }
    }
}

/// Everything applied to a request before it is formatted.
#[derive(Debug, Clone)]
pub struct RequestFilter {
    pub headers: HeaderPolicy,
    pub obfuscation: HeaderObfuscation,
    pub paths: PathObfuscation,
    pub body: BodyTruncation,
}

impl Default for RequestFilter {
    fn default() -> Self {
        Self {
            headers: HeaderPolicy::for_requests(HeaderStrategy::All, Vec::new()),
            obfuscation: HeaderObfuscation::default(),
            paths: PathObfuscation::default(),
            body: BodyTruncation::unlimited(),
        }
    }
}

impl RequestFilter {
    pub fn apply<'a, R>(&self, request: &'a R) -> FilteredRequest<'a, R>
    where
        R: HttpRequest + ?Sized,
    {
        let mut headers = self.headers.apply(request.headers());
        self.obfuscation.apply(&mut headers);
        FilteredRequest {
            inner: request,
            headers,
            uri: self.paths.apply(request.request_uri()),
            body: self.body,
        }
    }
}

/// Everything applied to a response before it is formatted.
#[derive(Debug, Clone)]
pub struct ResponseFilter {
    pub headers: HeaderPolicy,
    pub obfuscation: HeaderObfuscation,
    pub body: BodyTruncation,
}

impl Default for ResponseFilter {
    fn default() -> Self {
        Self {
            headers: HeaderPolicy::for_responses(HeaderStrategy::All, Vec::new()),
            obfuscation: HeaderObfuscation::default(),
            body: BodyTruncation::unlimited(),
        }
    }
}

impl ResponseFilter {
    pub fn apply<'a, S>(&self, response: &'a S) -> FilteredResponse<'a, S>
    where
        S: HttpResponse + ?Sized,
    {
        let mut headers = self.headers.apply(response.headers());
        self.obfuscation.apply(&mut headers);
        FilteredResponse {
            inner: response,
            headers,
            body: self.body,
        }
    }
}

/// Request view with filtered headers, sanitised URI and bounded body.
#[derive(Debug)]
pub struct FilteredRequest<'a, R: ?Sized> {
    inner: &'a R,
    headers: HttpHeaders,
    uri: Cow<'a, str>,
    body: BodyTruncation,
}

impl<'a, R: HttpRequest + ?Sized> FilteredRequest<'a, R> {
    /// The unfiltered view this wrapper was built from.
    pub fn original(&self) -> &'a R {
        self.inner
    }
}

impl<R: HttpRequest + ?Sized> HttpMessage for FilteredRequest<'_, R> {
    fn headers(&self) -> &HttpHeaders {
        &self.headers
    }

    fn body(&self) -> Result<Bytes, LogbookError> {
        Ok(self.body.apply(self.inner.body()?))
    }

    fn origin(&self) -> Origin {
        self.inner.origin()
    }

    // The filtered header set may have dropped it.
    fn content_type(&self) -> Option<&str> {
        self.inner.content_type()
    }
}

impl<R: HttpRequest + ?Sized> HttpRequest for FilteredRequest<'_, R> {
    fn method(&self) -> &str {
        self.inner.method()
    }

    fn request_uri(&self) -> &str {
        &self.uri
    }
}

/// Response view with filtered headers and bounded body.
#[derive(Debug)]
pub struct FilteredResponse<'a, S: ?Sized> {
    inner: &'a S,
    headers: HttpHeaders,
    body: BodyTruncation,
}

impl<'a, S: HttpResponse + ?Sized> FilteredResponse<'a, S> {
    /// The unfiltered view this wrapper was built from.
    pub fn original(&self) -> &'a S {
        self.inner
    }
}

impl<S: HttpResponse + ?Sized> HttpMessage for FilteredResponse<'_, S> {
    fn headers(&self) -> &HttpHeaders {
        &self.headers
    }

    fn body(&self) -> Result<Bytes, LogbookError> {
        Ok(self.body.apply(self.inner.body()?))
    }

    fn origin(&self) -> Origin {
        self.inner.origin()
    }

    fn content_type(&self) -> Option<&str> {
        self.inner.content_type()
    }
}

impl<S: HttpResponse + ?Sized> HttpResponse for FilteredResponse<'_, S> {
    fn status(&self) -> u16 {
        self.inner.status()
    }
}
