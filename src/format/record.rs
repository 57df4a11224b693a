// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Log record shapes.
//!
//! Field declaration order is the serialized order, and consumers parse the
//! line positionally: do not reorder fields.

use serde::Serialize;
use serde_json::value::RawValue;

use crate::core::{HttpHeaders, LogbookError, Role};
use crate::format::content_type::is_json;

/// `type` of a request record.
pub const TYPE_IN: &str = "in";

/// `type` of a response record.
pub const TYPE_OUT: &str = "out";

/// A captured body, embedded raw when it is JSON.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum LoggedBody {
    Json(Box<RawValue>),
    Text(String),
}

impl LoggedBody {
    /// Classify a non-empty body by its content type.
    ///
    /// A body labelled JSON that doesn't parse (for example after
    /// truncation) is logged as text so the line stays valid JSON.
    pub fn classify(content_type: Option<&str>, body: String) -> Result<Self, LogbookError> {
        if is_json(content_type) && serde_json::from_str::<&RawValue>(&body).is_ok() {
            return Ok(LoggedBody::Json(RawValue::from_string(body)?));
        }
        Ok(LoggedBody::Text(body))
    }

    /// `None` for an empty body.
    pub fn prepare(content_type: Option<&str>, body: String) -> Result<Option<Self>, LogbookError> {
        if body.is_empty() {
            return Ok(None);
        }
        Self::classify(content_type, body).map(Some)
    }
}

/// Record emitted when a request is observed.
#[derive(Debug, Serialize)]
pub struct RequestRecord<'a> {
    pub correlation: &'a str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub uri: &'a str,
    pub method: &'a str,
    pub origin: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<LoggedBody>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<&'a HttpHeaders>,
    #[serde(rename = "originalCallApp", skip_serializing_if = "Option::is_none")]
    pub original_call_app: Option<&'a str>,
}

/// Record emitted when the response to a request is observed.
#[derive(Debug, Serialize)]
pub struct ResponseRecord<'a> {
    pub correlation: &'a str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub uri: &'a str,
    pub origin: Role,
    pub duration: u64,
    pub status: u16,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<LoggedBody>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<&'a HttpHeaders>,
    #[serde(rename = "originalCallApp", skip_serializing_if = "Option::is_none")]
    pub original_call_app: Option<&'a str>,
}
