//! NetEase Cloud Music lyrics backend.
//!
//! The only backend that supplies a translation stream; it is merged into the
//! original lyrics by the aggregator.

use async_trait::async_trait;
use lyricmux_core::{BackendId, Candidate, CoreError, LyricsBackend, LyricsPayload, LyricsQuery};
use serde::Deserialize;
use tracing::{debug, info, warn};

const NETEASE_API_URL: &str = "https://music.163.com/api";

/// Number of search hits requested per query
const SEARCH_LIMIT: u32 = 20;

/// Lyric text NetEase uses when a song has no lyrics
const NOT_FOUND_MARKERS: &[&str] = &["没有找到歌词"];

/// NetEase Cloud Music lyrics backend
pub struct NeteaseBackend {
    client: reqwest::Client,
}

impl NeteaseBackend {
    /// Create a NetEase backend sharing an existing client
    #[must_use]
    pub const fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn try_search(&self, query: &LyricsQuery) -> Result<Vec<Candidate>, CoreError> {
        let url = format!(
            "{}/search/get/web?s={}&type=1&offset=0&total=true&limit={}",
            NETEASE_API_URL,
            urlencoding::encode(&query.search_text()),
            SEARCH_LIMIT
        );

        debug!("NetEase GET (search): {}", url);
        let response = self.client.get(&url).send().await?.error_for_status()?;
        let body: SearchResponse = response.json().await?;
        Ok(parse_search(body))
    }

    async fn try_fetch(&self, candidate: &Candidate) -> Result<LyricsPayload, CoreError> {
        let url = format!(
            "{}/song/lyric?id={}&lv=1&kv=1&tv=-1",
            NETEASE_API_URL,
            urlencoding::encode(&candidate.external_id)
        );

        debug!("NetEase GET (lyric): {}", url);
        let response = self.client.get(&url).send().await?.error_for_status()?;
        let body: LyricResponse = response.json().await?;
        Ok(parse_lyrics(body))
    }
}

/// Response from the web search endpoint
#[derive(Debug, Deserialize)]
struct SearchResponse {
    result: Option<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(rename = "songCount", default)]
    song_count: u64,
    #[serde(default)]
    songs: Vec<SearchSong>,
}

#[derive(Debug, Deserialize)]
struct SearchSong {
    id: u64,
    #[serde(default)]
    name: String,
    #[serde(default)]
    artists: Vec<Artist>,
}

#[derive(Debug, Deserialize)]
struct Artist {
    #[serde(default)]
    name: Option<String>,
}

/// Response from the lyric endpoint
#[derive(Debug, Deserialize)]
struct LyricResponse {
    lrc: Option<LyricBody>,
    tlyric: Option<LyricBody>,
}

#[derive(Debug, Deserialize)]
struct LyricBody {
    lyric: Option<String>,
}

impl LyricBody {
    fn into_text(self) -> Option<String> {
        self.lyric.filter(|l| !l.trim().is_empty())
    }
}

fn parse_search(response: SearchResponse) -> Vec<Candidate> {
    let Some(result) = response.result.filter(|r| r.song_count > 0) else {
        return Vec::new();
    };

    result
        .songs
        .into_iter()
        .map(|song| {
            let artist = song
                .artists
                .into_iter()
                .filter_map(|a| a.name.filter(|n| !n.is_empty()))
                .collect::<Vec<_>>()
                .join("; ");
            Candidate::new(BackendId::Netease, song.id.to_string(), song.name, artist)
        })
        .collect()
}

fn parse_lyrics(response: LyricResponse) -> LyricsPayload {
    let Some(lyrics) = response.lrc.and_then(LyricBody::into_text) else {
        return LyricsPayload::NotFound;
    };

    LyricsPayload::Found {
        lyrics,
        translation: response.tlyric.and_then(LyricBody::into_text),
    }
}

#[async_trait]
impl LyricsBackend for NeteaseBackend {
    fn id(&self) -> BackendId {
        BackendId::Netease
    }

    fn not_found_markers(&self) -> &'static [&'static str] {
        NOT_FOUND_MARKERS
    }

    async fn search(&self, query: &LyricsQuery) -> Vec<Candidate> {
        match self.try_search(query).await {
            Ok(candidates) => {
                info!(
                    "NetEase search found {} songs for: {}",
                    candidates.len(),
                    query.search_text()
                );
                candidates
            }
            Err(e) => {
                warn!("NetEase search failed: {}", e);
                Vec::new()
            }
        }
    }

    async fn fetch_lyrics(&self, candidate: &Candidate) -> Result<LyricsPayload, CoreError> {
        self.try_fetch(candidate)
            .await
            .map_err(|e| e.for_backend(BackendId::Netease))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search() {
        let body: SearchResponse = serde_json::from_str(
            r#"{
                "result": {
                    "songs": [
                        {"id": 185811, "name": "稻香", "artists": [{"name": "周杰伦"}], "album": {"name": "魔杰座"}},
                        {"id": 1901371647, "name": "Stay", "artists": [{"name": "The Kid LAROI"}, {"name": "Justin Bieber"}]}
                    ],
                    "songCount": 2
                },
                "code": 200
            }"#,
        )
        .expect("valid fixture");

        let candidates = parse_search(body);
        assert_eq!(candidates.len(), 2);
        assert_eq!(
            candidates[0],
            Candidate::new(BackendId::Netease, "185811", "稻香", "周杰伦")
        );
        assert_eq!(candidates[1].artist, "The Kid LAROI; Justin Bieber");
    }

    #[test]
    fn test_parse_search_without_results() {
        let body: SearchResponse =
            serde_json::from_str(r#"{"result": {"songCount": 0}, "code": 200}"#).expect("valid fixture");
        assert!(parse_search(body).is_empty());

        let body: SearchResponse = serde_json::from_str(r#"{"code": 400}"#).expect("valid fixture");
        assert!(parse_search(body).is_empty());
    }

    #[test]
    fn test_parse_lyrics_with_translation() {
        let body: LyricResponse = serde_json::from_str(
            r#"{
                "lrc": {"version": 1, "lyric": "[00:01.00]Hello\n"},
                "tlyric": {"version": 1, "lyric": "[00:01.00]你好\n"},
                "code": 200
            }"#,
        )
        .expect("valid fixture");

        assert_eq!(
            parse_lyrics(body),
            LyricsPayload::Found {
                lyrics: "[00:01.00]Hello\n".to_string(),
                translation: Some("[00:01.00]你好\n".to_string()),
            }
        );
    }

    #[test]
    fn test_parse_lyrics_empty_translation() {
        let body: LyricResponse = serde_json::from_str(
            r#"{"lrc": {"lyric": "[00:01.00]稻香"}, "tlyric": {"lyric": ""}, "code": 200}"#,
        )
        .expect("valid fixture");

        assert_eq!(parse_lyrics(body), LyricsPayload::plain("[00:01.00]稻香"));
    }

    #[test]
    fn test_parse_lyrics_missing() {
        let body: LyricResponse =
            serde_json::from_str(r#"{"nolyric": true, "code": 200}"#).expect("valid fixture");
        assert_eq!(parse_lyrics(body), LyricsPayload::NotFound);

        let body: LyricResponse =
            serde_json::from_str(r#"{"lrc": {"lyric": ""}, "code": 200}"#).expect("valid fixture");
        assert_eq!(parse_lyrics(body), LyricsPayload::NotFound);
    }
}
