use crate::backend::{BackendId, Candidate, LyricsQuery};
use crate::lrc::{merge_bilingual, with_provenance};
use crate::score::relevance_score;
use serde::Serialize;

/// Normalized, backend-agnostic lyrics result returned to callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LyricDocument {
    pub source: BackendId,
    pub id: String,
    pub title: String,
    pub artist: String,
    /// Final lyric text, starting with the provenance header line
    pub lyrics: String,
}

impl LyricDocument {
    /// Build a document from a candidate and its lyric streams.
    ///
    /// Returns the document and whether any translation was merged in.
    #[must_use]
    pub fn assemble(
        candidate: Candidate,
        lyrics: &str,
        translation: Option<&str>,
    ) -> (Self, bool) {
        let merged = merge_bilingual(lyrics, translation);
        let document = Self {
            source: candidate.source,
            id: candidate.external_id,
            title: candidate.title,
            artist: candidate.artist,
            lyrics: with_provenance(candidate.source, &merged.text),
        };
        (document, merged.has_translation)
    }
}

/// A document plus the ranking keys that never leave the aggregator
#[derive(Debug, Clone)]
pub(crate) struct ScoredDocument {
    pub document: LyricDocument,
    pub score: u8,
    pub has_translation: bool,
    /// Backend order, then candidate order
    pub discovery_order: usize,
}

impl ScoredDocument {
    pub fn new(
        document: LyricDocument,
        has_translation: bool,
        discovery_order: usize,
        query: &LyricsQuery,
    ) -> Self {
        let score = relevance_score(&document.title, &document.artist, query);
        Self {
            document,
            score,
            has_translation,
            discovery_order,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assemble_document() {
        let candidate = Candidate::new(BackendId::Netease, "186016", "晴天", "周杰伦");
        let (document, has_translation) =
            LyricDocument::assemble(candidate, "[00:01.00]A", Some("[00:01.00]甲"));

        assert!(has_translation);
        assert_eq!(document.id, "186016");
        assert_eq!(
            document.lyrics,
            "[00:00.00] Lyrics from NetEase Cloud Music\n[00:01.00] A 【甲】"
        );
    }

    #[test]
    fn test_serialized_fields() {
        let candidate = Candidate::new(BackendId::QqMusic, "97773", "晴天", "周杰伦");
        let (document, _) = LyricDocument::assemble(candidate, "[00:01.00]A", None);

        let value = serde_json::to_value(&document).expect("serializes");
        let object = value.as_object().expect("is an object");
        let mut keys: Vec<_> = object.keys().map(String::as_str).collect();
        keys.sort_unstable();

        assert_eq!(keys, ["artist", "id", "lyrics", "source", "title"]);
        assert_eq!(object["source"], "qqmusic");
    }
}
