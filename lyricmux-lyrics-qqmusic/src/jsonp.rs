//! Decoding of the JSONP lyric response.

use lyricmux_core::{CoreError, LyricsPayload};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct LyricResponse {
    code: i64,
    lyric: Option<String>,
}

/// Strip a JSONP callback wrapper such as `jsonp1({...})`.
///
/// Takes everything between the first `(` and the last `)`; text without a
/// wrapper is returned as is.
#[must_use]
pub fn extract_jsonp_body(text: &str) -> &str {
    match (text.find('('), text.rfind(')')) {
        (Some(start), Some(end)) if start < end => &text[start + 1..end],
        _ => text,
    }
}

/// Decode a JSONP lyric response into lyric text.
///
/// # Errors
///
/// Returns an error if the body is not valid JSON.
pub fn decode_lyric_response(text: &str) -> Result<LyricsPayload, CoreError> {
    let response: LyricResponse = serde_json::from_str(extract_jsonp_body(text.trim()))?;

    match response.lyric {
        Some(lyric) if response.code == 0 => Ok(LyricsPayload::plain(
            html_escape::decode_html_entities(&lyric).into_owned(),
        )),
        _ => Ok(LyricsPayload::NotFound),
    }
}
