// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! JSON content-type detection without a media-type parse.

const APPLICATION: &str = "application/";

// Length of `application/json`.
const PLAIN_JSON_LEN: usize = 16;

/// Whether `content_type` denotes a JSON body.
///
/// Accepts `application/json` and `application/<subtype>+json`, each with or
/// without parameters.  Runs on every logged body, so it only inspects the
/// bytes around the first `;`.
pub fn is_json(content_type: Option<&str>) -> bool {
    let Some(content_type) = content_type else {
        return false;
    };
    if !content_type.starts_with(APPLICATION) {
        return false;
    }

    let delimiter = content_type[APPLICATION.len()..]
        .find(';')
        .map(|idx| idx + APPLICATION.len());

    match delimiter {
        // application/vnd.foo+json;charset=utf-8
        Some(idx) if idx > PLAIN_JSON_LEN => suffix_before(content_type, idx, "+json"),
        // application/json;charset=utf-8
        Some(idx) => suffix_before(content_type, idx, "json"),
        None if content_type.len() == PLAIN_JSON_LEN => content_type.ends_with("json"),
        None => content_type.ends_with("+json"),
    }
}

fn suffix_before(value: &str, end: usize, suffix: &str) -> bool {
    end >= suffix.len() && &value.as_bytes()[end - suffix.len()..end] == suffix.as_bytes()
}
