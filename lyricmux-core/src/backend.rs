use crate::error::CoreError;
use crate::lrc::{parse_lines, LrcLine};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Music catalogs lyrics can be aggregated from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendId {
    Netease,
    #[serde(rename = "qqmusic")]
    QqMusic,
    Kugou,
}

impl BackendId {
    /// Every backend, in default tie-break order
    pub const ALL: [Self; 3] = [Self::Netease, Self::QqMusic, Self::Kugou];

    /// Identifier used in serialized documents and config files
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Netease => "netease",
            Self::QqMusic => "qqmusic",
            Self::Kugou => "kugou",
        }
    }

    /// Human readable catalog name, used in the provenance header
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Netease => "NetEase Cloud Music",
            Self::QqMusic => "QQ Music",
            Self::Kugou => "Kugou Music",
        }
    }
}

impl fmt::Display for BackendId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A search hit on a backend, prior to lyric retrieval
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub source: BackendId,
    /// Backend's own track ID
    pub external_id: String,
    pub title: String,
    pub artist: String,
    /// Extra identifier some backends need to fetch lyrics (e.g. QQ Music's songmid)
    pub backend_ref: Option<String>,
}

impl Candidate {
    pub fn new(
        source: BackendId,
        external_id: impl Into<String>,
        title: impl Into<String>,
        artist: impl Into<String>,
    ) -> Self {
        Self {
            source,
            external_id: external_id.into(),
            title: title.into(),
            artist: artist.into(),
            backend_ref: None,
        }
    }

    #[must_use]
    pub fn with_backend_ref(mut self, backend_ref: impl Into<String>) -> Self {
        self.backend_ref = Some(backend_ref.into());
        self
    }
}

/// Validated title/artist query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LyricsQuery {
    pub title: String,
    /// Empty when the caller gave no artist
    pub artist: String,
}

impl LyricsQuery {
    /// Build a query from raw request parameters.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidQuery`] if `title` is blank.
    pub fn new(title: impl Into<String>, artist: impl Into<String>) -> Result<Self, CoreError> {
        let title = title.into().trim().to_string();
        if title.is_empty() {
            return Err(CoreError::InvalidQuery {
                reason: "'title' parameter is required.".into(),
            });
        }

        Ok(Self {
            title,
            artist: artist.into().trim().to_string(),
        })
    }

    /// Free-text search string sent to the backends
    #[must_use]
    pub fn search_text(&self) -> String {
        format!("{} {}", self.title, self.artist).trim().to_string()
    }
}

/// Decoded lyric text as returned by a backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LyricsPayload {
    /// Lyrics in LRC-style text, with an optional translation stream
    Found {
        lyrics: String,
        translation: Option<String>,
    },
    /// The backend explicitly reported that no lyrics exist
    NotFound,
}

impl LyricsPayload {
    /// Lyrics without a translation stream
    pub fn plain(lyrics: impl Into<String>) -> Self {
        Self::Found {
            lyrics: lyrics.into(),
            translation: None,
        }
    }
}

/// Trait for music catalog backends
///
/// Implementations hold no per-request state and are shared across concurrent
/// fetch tasks.
#[async_trait]
pub trait LyricsBackend: Send + Sync {
    /// Which catalog this backend talks to
    fn id(&self) -> BackendId;

    /// Substrings in lyric text that mean the backend has no lyrics for a track
    fn not_found_markers(&self) -> &'static [&'static str] {
        &[]
    }

    /// Search the catalog for `title` and `artist` as a single free-text query.
    ///
    /// Never fails: network errors and malformed responses yield no candidates.
    async fn search(&self, query: &LyricsQuery) -> Vec<Candidate>;

    /// Retrieve and decode lyrics for a search hit.
    ///
    /// # Errors
    ///
    /// Returns an error when the request fails or the payload cannot be decoded.
    async fn fetch_lyrics(&self, candidate: &Candidate) -> Result<LyricsPayload, CoreError>;
}

/// Whether lyric text is blank or is one of a backend's "not found" messages.
///
/// Markers only count in text without timestamped lines, so lyrics that happen
/// to contain a marker phrase are kept.
#[must_use]
pub fn is_not_found_text(text: &str, markers: &[&str]) -> bool {
    if text.trim().is_empty() {
        return true;
    }
    let has_timestamps = parse_lines(text)
        .iter()
        .any(|line| matches!(line, LrcLine::Timestamped(_)));

    !has_timestamps && markers.iter().any(|marker| text.contains(marker))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_requires_title() {
        let result = LyricsQuery::new("   ", "周杰伦");
        assert!(matches!(result, Err(CoreError::InvalidQuery { .. })));
    }

    #[test]
    fn test_query_search_text() {
        let query = LyricsQuery::new("稻香", "周杰伦").expect("valid query");
        assert_eq!(query.search_text(), "稻香 周杰伦");

        let query = LyricsQuery::new("稻香", "").expect("valid query");
        assert_eq!(query.search_text(), "稻香");
    }

    #[test]
    fn test_backend_id_serialization() {
        let json = serde_json::to_string(&BackendId::QqMusic).expect("serializes");
        assert_eq!(json, "\"qqmusic\"");

        let id: BackendId = serde_json::from_str("\"kugou\"").expect("deserializes");
        assert_eq!(id, BackendId::Kugou);
        assert_eq!(BackendId::Netease.to_string(), "netease");
    }

    #[test]
    fn test_not_found_text() {
        let markers = &["没有找到歌词"];
        assert!(is_not_found_text("这首歌没有找到歌词。", markers));
        assert!(is_not_found_text("  \n ", markers));
        assert!(!is_not_found_text("[00:01.00]稻香", markers));
    }

    #[test]
    fn test_marker_phrase_inside_lyrics_is_kept() {
        let markers = &["没有找到", "无法下载", "发生错误"];
        let lyrics = "[00:01.00]走遍天涯\n[00:05.00]我还是没有找到你\n[00:09.00]再见";
        assert!(!is_not_found_text(lyrics, markers));
        assert!(is_not_found_text("没有找到歌词", markers));
    }
}
