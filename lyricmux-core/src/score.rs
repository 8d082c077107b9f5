//! Relevance scoring of lyric documents against the query.

use crate::backend::LyricsQuery;

/// Highest score a document can receive
pub const MAX_SCORE: u8 = 6;

/// Score how well a result's title and artist match the query.
///
/// Case-insensitive; no whitespace or punctuation normalization.
/// - title: +2 if the query title is a substring, +1 more if equal
/// - artist (only when the query has one): +2 if substring, +1 more if equal
#[must_use]
pub fn relevance_score(title: &str, artist: &str, query: &LyricsQuery) -> u8 {
    let mut score = field_score(title, &query.title);
    if !query.artist.is_empty() {
        score += field_score(artist, &query.artist);
    }
    score
}

fn field_score(actual: &str, wanted: &str) -> u8 {
    let actual = actual.to_lowercase();
    let wanted = wanted.to_lowercase();

    if actual == wanted {
        3
    } else if actual.contains(&wanted) {
        2
    } else {
        0
    }
}
