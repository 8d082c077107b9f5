//! Kugou Music lyrics backend.
//!
//! Lyrics take two requests: a lookup that lists lyric candidates for a song
//! hash, then a download of the chosen candidate's base64 content.

pub mod krc;

use async_trait::async_trait;
use lyricmux_core::{BackendId, Candidate, CoreError, LyricsBackend, LyricsPayload, LyricsQuery};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

pub use krc::{decode_krc, KrcError};

const KUGOU_SEARCH_URL: &str = "http://ioscdn.kugou.com/api/v3/search/song";
const KUGOU_LOOKUP_URL: &str = "https://krcs.kugou.com/search";
const KUGOU_DOWNLOAD_URL: &str = "https://lyrics.kugou.com/download";

/// Number of search hits requested per query
const SEARCH_PAGE_SIZE: u32 = 10;

/// Lyric candidates tagged with this are Kugou's official lyrics
const OFFICIAL_PRODUCT: &str = "官方推荐歌词";

/// Lyric text Kugou uses when a song has no lyrics
const NOT_FOUND_MARKERS: &[&str] = &["没有找到", "无法下载", "发生错误"];

/// Kugou Music lyrics backend
pub struct KugouBackend {
    client: reqwest::Client,
}

impl KugouBackend {
    /// Create a Kugou backend sharing an existing client
    #[must_use]
    pub const fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn try_search(&self, query: &LyricsQuery) -> Result<Vec<Candidate>, CoreError> {
        let url = format!(
            "{}?keyword={}&page=1&pagesize={}&showtype=10&plat=2&version=7910&tag=1&correct=1&privilege=1&sver=5",
            KUGOU_SEARCH_URL,
            urlencoding::encode(&query.search_text()),
            SEARCH_PAGE_SIZE
        );

        debug!("Kugou GET (search): {}", url);
        let response = self.client.get(&url).send().await?.error_for_status()?;
        let body: SearchResponse = response.json().await?;
        Ok(parse_search(body))
    }

    async fn lookup(&self, hash: &str) -> Result<LookupResponse, CoreError> {
        let url = format!(
            "{}?ver=1&man=yes&client=mobi&keyword=&duration=&hash={}",
            KUGOU_LOOKUP_URL,
            urlencoding::encode(hash)
        );

        debug!("Kugou GET (lyric lookup): {}", url);
        let response = self.client.get(&url).send().await?.error_for_status()?;
        Ok(response.json().await?)
    }

    async fn download(&self, lyric: &LyricCandidate) -> Result<DownloadResponse, CoreError> {
        let url = format!(
            "{}?ver=1&client=pc&id={}&accesskey={}&fmt=lrc&charset=utf8",
            KUGOU_DOWNLOAD_URL,
            urlencoding::encode(&json_id(&lyric.id)),
            urlencoding::encode(&lyric.accesskey)
        );

        debug!("Kugou GET (lyric download): {}", url);
        let response = self.client.get(&url).send().await?.error_for_status()?;
        Ok(response.json().await?)
    }

    async fn try_fetch(&self, candidate: &Candidate) -> Result<LyricsPayload, CoreError> {
        let lookup = self.lookup(&candidate.external_id).await?;
        if lookup.status != 200 {
            debug!("Kugou lyric lookup returned status {}", lookup.status);
            return Ok(LyricsPayload::NotFound);
        }
        let Some(lyric) = select_lyric_candidate(&lookup.candidates) else {
            return Ok(LyricsPayload::NotFound);
        };

        let download = self.download(lyric).await?;
        decode_download(download)
    }
}

/// Response from the song search endpoint
#[derive(Debug, Deserialize)]
struct SearchResponse {
    errcode: i64,
    data: Option<SearchData>,
}

#[derive(Debug, Deserialize)]
struct SearchData {
    #[serde(default)]
    info: Vec<SearchSong>,
}

#[derive(Debug, Deserialize)]
struct SearchSong {
    hash: String,
    #[serde(default)]
    songname: String,
    #[serde(default)]
    singername: String,
}

/// Response from the lyric lookup endpoint
#[derive(Debug, Deserialize)]
struct LookupResponse {
    status: i64,
    #[serde(default)]
    candidates: Vec<LyricCandidate>,
}

#[derive(Debug, Deserialize)]
struct LyricCandidate {
    /// Sent as either a string or a number
    id: Value,
    accesskey: String,
    #[serde(default)]
    product_from: Option<String>,
}

/// Response from the lyric download endpoint
#[derive(Debug, Deserialize)]
struct DownloadResponse {
    status: i64,
    content: Option<String>,
}

fn parse_search(response: SearchResponse) -> Vec<Candidate> {
    if response.errcode != 0 {
        debug!("Kugou search returned errcode {}", response.errcode);
        return Vec::new();
    }

    response
        .data
        .map(|d| d.info)
        .unwrap_or_default()
        .into_iter()
        .map(|song| Candidate::new(BackendId::Kugou, song.hash, song.songname, song.singername))
        .collect()
}

/// Prefer the official lyrics, else the first candidate
fn select_lyric_candidate(candidates: &[LyricCandidate]) -> Option<&LyricCandidate> {
    candidates
        .iter()
        .find(|c| c.product_from.as_deref() == Some(OFFICIAL_PRODUCT))
        .or_else(|| candidates.first())
}

/// Decode the downloaded KRC content, or report no lyrics when the download was refused
fn decode_download(download: DownloadResponse) -> Result<LyricsPayload, CoreError> {
    match download.content {
        Some(content) if download.status == 200 => {
            let text = decode_krc(&content).map_err(|e| CoreError::DecodeFailure {
                backend: BackendId::Kugou.to_string(),
                reason: e.to_string(),
            })?;
            Ok(LyricsPayload::plain(text))
        }
        _ => {
            debug!("Kugou lyric download returned status {}", download.status);
            Ok(LyricsPayload::NotFound)
        }
    }
}

fn json_id(id: &Value) -> String {
    match id {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[async_trait]
impl LyricsBackend for KugouBackend {
    fn id(&self) -> BackendId {
        BackendId::Kugou
    }

    fn not_found_markers(&self) -> &'static [&'static str] {
        NOT_FOUND_MARKERS
    }

    async fn search(&self, query: &LyricsQuery) -> Vec<Candidate> {
        match self.try_search(query).await {
            Ok(candidates) => {
                info!(
                    "Kugou search found {} songs for: {}",
                    candidates.len(),
                    query.search_text()
                );
                candidates
            }
            Err(e) => {
                warn!("Kugou search failed: {}", e);
                Vec::new()
            }
        }
    }

    async fn fetch_lyrics(&self, candidate: &Candidate) -> Result<LyricsPayload, CoreError> {
        self.try_fetch(candidate)
            .await
            .map_err(|e| e.for_backend(BackendId::Kugou))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search() {
        let body: SearchResponse = serde_json::from_str(
            r#"{
                "status": 1,
                "errcode": 0,
                "data": {
                    "total": 2,
                    "info": [
                        {"hash": "E3D6C9D5C1D7A0E7B5D7F1C0A1B2C3D4", "songname": "稻香", "singername": "周杰伦", "duration": 223},
                        {"hash": "0F1E2D3C4B5A69788796A5B4C3D2E1F0", "songname": "稻香 (Live)", "singername": "周杰伦"}
                    ]
                }
            }"#,
        )
        .expect("valid fixture");

        let candidates = parse_search(body);
        assert_eq!(candidates.len(), 2);
        assert_eq!(
            candidates[0],
            Candidate::new(
                BackendId::Kugou,
                "E3D6C9D5C1D7A0E7B5D7F1C0A1B2C3D4",
                "稻香",
                "周杰伦"
            )
        );
    }

    #[test]
    fn test_parse_search_error() {
        let body: SearchResponse =
            serde_json::from_str(r#"{"status": 0, "errcode": 20010, "data": null}"#).expect("valid fixture");
        assert!(parse_search(body).is_empty());
    }

    #[test]
    fn test_select_official_lyrics() {
        let lookup: LookupResponse = serde_json::from_str(
            r#"{
                "status": 200,
                "candidates": [
                    {"id": "111", "accesskey": "AAA", "product_from": "第三方歌词"},
                    {"id": 222, "accesskey": "BBB", "product_from": "官方推荐歌词"}
                ]
            }"#,
        )
        .expect("valid fixture");

        let chosen = select_lyric_candidate(&lookup.candidates).expect("has candidates");
        assert_eq!(chosen.accesskey, "BBB");
        assert_eq!(json_id(&chosen.id), "222");
    }

    #[test]
    fn test_select_falls_back_to_first() {
        let lookup: LookupResponse = serde_json::from_str(
            r#"{"status": 200, "candidates": [{"id": "111", "accesskey": "AAA"}, {"id": "333", "accesskey": "CCC"}]}"#,
        )
        .expect("valid fixture");

        let chosen = select_lyric_candidate(&lookup.candidates).expect("has candidates");
        assert_eq!(json_id(&chosen.id), "111");

        let empty: LookupResponse =
            serde_json::from_str(r#"{"status": 404}"#).expect("valid fixture");
        assert!(select_lyric_candidate(&empty.candidates).is_none());
    }

    #[test]
    fn test_decode_download_content() {
        let download: DownloadResponse = serde_json::from_str(
            r#"{"status": 200, "content": "WzAwOjAxLjAwXeeou+mmmQ=="}"#,
        )
        .expect("valid fixture");
        assert_eq!(
            decode_download(download).expect("decodes"),
            LyricsPayload::plain("[00:01.00]稻香")
        );
    }

    #[test]
    fn test_corrupt_download_is_decode_failure() {
        // "krc18" magic followed by bytes that are not a zlib stream
        let download: DownloadResponse = serde_json::from_str(
            r#"{"status": 200, "content": "a3JjMTgAAQIDBAUGBwg="}"#,
        )
        .expect("valid fixture");

        let err = decode_download(download).expect_err("corrupt payload");
        assert!(matches!(&err, CoreError::DecodeFailure { backend, .. } if backend == "kugou"));
        assert!(matches!(
            err.for_backend(BackendId::Kugou),
            CoreError::DecodeFailure { .. }
        ));
    }

    #[test]
    fn test_refused_download_is_not_found() {
        let download: DownloadResponse =
            serde_json::from_str(r#"{"status": 404, "content": null}"#).expect("valid fixture");
        assert_eq!(decode_download(download).expect("no error"), LyricsPayload::NotFound);
    }
}
