//! QQ Music lyrics backend.
//!
//! Lyrics come back as JSONP with the lyric text HTML-entity encoded. The web
//! endpoint does not serve translations.

mod jsonp;

use async_trait::async_trait;
use lyricmux_core::{BackendId, Candidate, CoreError, LyricsBackend, LyricsPayload, LyricsQuery};
use reqwest::header::REFERER;
use serde::Deserialize;
use tracing::{debug, info, warn};

pub use jsonp::{decode_lyric_response, extract_jsonp_body};

const QQ_SEARCH_URL: &str = "https://c.y.qq.com/soso/fcgi-bin/search_cp";
const QQ_LYRIC_URL: &str = "https://c.y.qq.com/lyric/fcgi-bin/fcg_query_lyric.fcg";

/// Number of search hits requested per query
const SEARCH_LIMIT: u32 = 10;

/// Lyric text QQ Music uses when a song has no lyrics
const NOT_FOUND_MARKERS: &[&str] = &["未找到该歌曲的歌词"];

/// QQ Music lyrics backend
pub struct QqMusicBackend {
    client: reqwest::Client,
}

impl QqMusicBackend {
    /// Create a QQ Music backend sharing an existing client
    #[must_use]
    pub const fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn try_search(&self, query: &LyricsQuery) -> Result<Vec<Candidate>, CoreError> {
        let url = format!(
            "{}?w={}&n={}&t=0&aggr=1&cr=1&catZhida=1&lossless=0&flag_qc=0&p=1\
             &format=json&inCharset=utf8&outCharset=utf-8&notice=0&platform=yqq&needNewCode=0",
            QQ_SEARCH_URL,
            urlencoding::encode(&query.search_text()),
            SEARCH_LIMIT
        );

        debug!("QQ Music GET (search): {}", url);
        let response = self.client.get(&url).send().await?.error_for_status()?;
        let body: SearchResponse = response.json().await?;
        Ok(parse_search(body))
    }

    async fn try_fetch(&self, candidate: &Candidate) -> Result<LyricsPayload, CoreError> {
        let url = format!(
            "{}?nobase64=1&musicid={}&format=jsonp&inCharset=utf8&outCharset=utf-8",
            QQ_LYRIC_URL,
            urlencoding::encode(&candidate.external_id)
        );

        // The lyric endpoint refuses requests without a song page referer
        let songmid = candidate.backend_ref.as_deref().unwrap_or_default();
        let referer = format!("http://y.qq.com/portal/song/{songmid}.html");

        debug!("QQ Music GET (lyric): {}", url);
        let response = self
            .client
            .get(&url)
            .header(REFERER, referer)
            .send()
            .await?
            .error_for_status()?;
        let text = response.text().await?;
        decode_lyric_response(&text)
    }
}

/// Response from the `search_cp` endpoint
#[derive(Debug, Deserialize)]
struct SearchResponse {
    code: i64,
    data: Option<SearchData>,
}

#[derive(Debug, Deserialize)]
struct SearchData {
    song: Option<SongList>,
}

#[derive(Debug, Deserialize)]
struct SongList {
    #[serde(default)]
    list: Vec<SearchSong>,
}

#[derive(Debug, Deserialize)]
struct SearchSong {
    songid: u64,
    songmid: String,
    #[serde(default)]
    songname: String,
    #[serde(default)]
    singer: Vec<Singer>,
}

#[derive(Debug, Deserialize)]
struct Singer {
    name: String,
}

fn parse_search(response: SearchResponse) -> Vec<Candidate> {
    if response.code != 0 {
        debug!("QQ Music search returned code {}", response.code);
        return Vec::new();
    }

    response
        .data
        .and_then(|d| d.song)
        .map(|s| s.list)
        .unwrap_or_default()
        .into_iter()
        .map(|song| {
            let artist = song
                .singer
                .into_iter()
                .map(|s| s.name)
                .collect::<Vec<_>>()
                .join("; ");
            Candidate::new(BackendId::QqMusic, song.songid.to_string(), song.songname, artist)
                .with_backend_ref(song.songmid)
        })
        .collect()
}

#[async_trait]
impl LyricsBackend for QqMusicBackend {
    fn id(&self) -> BackendId {
        BackendId::QqMusic
    }

    fn not_found_markers(&self) -> &'static [&'static str] {
        NOT_FOUND_MARKERS
    }

    async fn search(&self, query: &LyricsQuery) -> Vec<Candidate> {
        match self.try_search(query).await {
            Ok(candidates) => {
                info!(
                    "QQ Music search found {} songs for: {}",
                    candidates.len(),
                    query.search_text()
                );
                candidates
            }
            Err(e) => {
                warn!("QQ Music search failed: {}", e);
                Vec::new()
            }
        }
    }

    async fn fetch_lyrics(&self, candidate: &Candidate) -> Result<LyricsPayload, CoreError> {
        self.try_fetch(candidate)
            .await
            .map_err(|e| e.for_backend(BackendId::QqMusic))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search() {
        let body: SearchResponse = serde_json::from_str(
            r#"{
                "code": 0,
                "data": {
                    "keyword": "晴天 周杰伦",
                    "song": {
                        "curnum": 2,
                        "list": [
                            {"songid": 97773, "songmid": "0039MnYb0qxYhV", "songname": "晴天", "singer": [{"id": 4558, "mid": "0025NhlN2yWrP4", "name": "周杰伦"}]},
                            {"songid": 1234, "songmid": "00abc", "songname": "晴天 (Live)", "singer": [{"name": "A"}, {"name": "B"}]}
                        ]
                    }
                }
            }"#,
        )
        .expect("valid fixture");

        let candidates = parse_search(body);
        assert_eq!(candidates.len(), 2);
        assert_eq!(
            candidates[0],
            Candidate::new(BackendId::QqMusic, "97773", "晴天", "周杰伦")
                .with_backend_ref("0039MnYb0qxYhV")
        );
        assert_eq!(candidates[1].artist, "A; B");
    }

    #[test]
    fn test_parse_search_error_code() {
        let body: SearchResponse =
            serde_json::from_str(r#"{"code": 500, "data": null}"#).expect("valid fixture");
        assert!(parse_search(body).is_empty());
    }

    #[test]
    fn test_parse_search_empty_list() {
        let body: SearchResponse =
            serde_json::from_str(r#"{"code": 0, "data": {"song": {"list": []}}}"#).expect("valid fixture");
        assert!(parse_search(body).is_empty());
    }
}
