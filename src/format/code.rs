// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Application-level outcome codes.
//!
//! The logged `code` deliberately mixes two things: the business code a
//! service embeds in its body (`"code": "ORDER_NOT_FOUND"`) and, when the
//! body carries none, a marker derived from the HTTP status.  Log consumers
//! group on this single field.

use once_cell::sync::Lazy;
use regex::Regex;

/// Code for a 200 response without an embedded code.
pub const SUCCESS: &str = "SUCCESS";

/// Code for any other non-5xx response without an embedded code.
pub const INVALID_REQUEST: &str = "GlobalExceptionHandler.INVALID_REQUEST";

/// Code for a 5xx response without an embedded code: the failure came from
/// outside this process.  Downstream parsers match this literal.
pub const UPSTREAM_FAILURE: &str = "外部响应5xx";

static CODE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#""code"\s*:\s*(?:"(.*?)"|(-?\d*))"#).expect("code pattern is valid")
});

/// Value of the first `"code"` key in `body`, quoted or numeric, trimmed.
///
/// Only the first key is considered: when its value is empty, `null` or
/// anything else that isn't a string or number, the code is absent.
pub fn find_code(body: &str) -> Option<&str> {
    let captures = CODE_PATTERN.captures(body)?;
    captures
        .get(1)
        .or_else(|| captures.get(2))
        .map(|m| m.as_str().trim())
        .filter(|code| !code.is_empty())
}

/// Outcome code for a response with the given body and status.
pub fn extract_code(body: &str, status: u16) -> String {
    let found = find_code(body);
    let code = match status {
        200 => found.unwrap_or(SUCCESS),
        status if status < 500 => found.unwrap_or(INVALID_REQUEST),
        _ => found.unwrap_or(UPSTREAM_FAILURE),
    };
    code.to_string()
}
