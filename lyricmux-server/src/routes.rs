use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use lyricmux_core::{LyricsAggregator, LyricsQuery};
use serde::Deserialize;

use crate::error::ApiError;

/// Shared state for request handlers
#[derive(Clone)]
pub struct AppState {
    pub aggregator: Arc<LyricsAggregator>,
}

/// Query parameters for `/lyric`
#[derive(Debug, Deserialize)]
pub struct LyricParams {
    #[serde(default)]
    title: String,
    #[serde(default)]
    artist: String,
    #[serde(default)]
    format: ResponseFormat,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ResponseFormat {
    #[default]
    Json,
    /// Lyrics of the best match only, as plain text
    Text,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/lyric", get(lyric))
        .with_state(state)
}

async fn lyric(
    State(state): State<AppState>,
    Query(params): Query<LyricParams>,
) -> Result<Response, ApiError> {
    let query = LyricsQuery::new(params.title, params.artist)?;
    let documents = state.aggregator.aggregate(&query).await?;

    let response = match params.format {
        ResponseFormat::Json => Json(documents).into_response(),
        ResponseFormat::Text => match documents.into_iter().next() {
            Some(best) => (
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                best.lyrics,
            )
                .into_response(),
            None => (StatusCode::NOT_FOUND, "No lyrics found.").into_response(),
        },
    };

    Ok(response)
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

const INDEX_HTML: &str = r"<!DOCTYPE html>
<html>
<head>
    <meta charset='utf-8'>
    <title>Lyricmux</title>
    <style>
        body { font-family: sans-serif; line-height: 1.6; padding: 2em; }
        h1 { color: #333; }
        p { color: #555; }
        code { background-color: #f4f4f4; padding: 2px 4px; border-radius: 4px; }
    </style>
</head>
<body>
    <h1>Lyricmux</h1>
    <p>A lyrics search server. Query the <code>/lyric</code> endpoint to search NetEase Cloud Music, QQ Music and Kugou Music at once.</p>
    <p>Example: <code>/lyric?title=song&amp;artist=artist</code></p>
    <p>Add <code>&amp;format=text</code> to get only the best match as plain text.</p>
</body>
</html>
";
