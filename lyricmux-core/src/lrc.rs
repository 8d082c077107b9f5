//! LRC line handling and bilingual lyric merging.
//!
//! Timestamps are kept as the literal text between the brackets. Two streams
//! are merged by exact string equality on that text, so `00:01.0` and
//! `00:01.00` are different keys.

use crate::backend::BackendId;
use std::collections::HashMap;

/// Timestamp token used for the synthetic provenance line
pub const ZERO_TIMESTAMP: &str = "00:00.00";

/// A lyric line with a bracketed timestamp token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampedLine {
    /// Literal bracket contents, e.g. `03:12.50`
    pub token: String,
    pub text: String,
}

/// A single line of LRC-style text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LrcLine<'a> {
    Timestamped(TimestampedLine),
    /// Blank lines and anything without a bracketed token, kept verbatim
    Passthrough(&'a str),
}

impl<'a> LrcLine<'a> {
    /// Parse one line of lyric text.
    ///
    /// The token is the text between the first `[` and the first `]`; the
    /// lyric is whatever follows the last `]`, trimmed. A line with no `[`
    /// before its first `]` has no token and passes through unchanged.
    #[must_use]
    pub fn parse(line: &'a str) -> Self {
        let Some(close) = line.find(']') else {
            return Self::Passthrough(line);
        };
        let Some(open) = line[..close].find('[') else {
            return Self::Passthrough(line);
        };
        let text_start = line.rfind(']').unwrap_or(close) + 1;

        Self::Timestamped(TimestampedLine {
            token: line[open + 1..close].to_string(),
            text: line[text_start..].trim().to_string(),
        })
    }
}

/// Parse lyric text into lines, preserving order
#[must_use]
pub fn parse_lines(input: &str) -> Vec<LrcLine<'_>> {
    input.lines().map(LrcLine::parse).collect()
}

/// Result of merging an original lyric stream with its translation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedLyrics {
    pub text: String,
    /// True if at least one line received a translation
    pub has_translation: bool,
}

/// Interleave a translation stream into the original lyrics.
///
/// Each timestamped original line becomes `[token] text`, followed by
/// ` 【translation】` when the translation stream has a non-empty line with
/// the exact same token. Translation lines whose token never appears in the
/// original are dropped. Without a translation the original text is returned
/// untouched.
#[must_use]
pub fn merge_bilingual(original: &str, translation: Option<&str>) -> MergedLyrics {
    let Some(translation) = translation.filter(|t| !t.trim().is_empty()) else {
        return MergedLyrics {
            text: original.to_string(),
            has_translation: false,
        };
    };

    // Later duplicates overwrite earlier ones
    let mut translations: HashMap<String, String> = HashMap::new();
    for line in parse_lines(translation) {
        if let LrcLine::Timestamped(line) = line {
            if !line.text.is_empty() {
                translations.insert(line.token, line.text);
            }
        }
    }

    let mut has_translation = false;
    let merged: Vec<String> = parse_lines(original)
        .into_iter()
        .map(|line| match line {
            LrcLine::Timestamped(line) => {
                let mut out = format!("[{}] {}", line.token, line.text);
                if let Some(translated) = translations.get(&line.token) {
                    has_translation = true;
                    out.push_str(" 【");
                    out.push_str(translated);
                    out.push('】');
                }
                out
            }
            LrcLine::Passthrough(raw) => raw.to_string(),
        })
        .collect();

    MergedLyrics {
        text: merged.join("\n").trim_end().to_string(),
        has_translation,
    }
}

/// Zero-timestamp line naming where the lyrics came from
#[must_use]
pub fn provenance_header(source: BackendId) -> String {
    format!("[{ZERO_TIMESTAMP}] Lyrics from {}", source.display_name())
}

/// Prepend the provenance header to lyric text
#[must_use]
pub fn with_provenance(source: BackendId, lyrics: &str) -> String {
    format!("{}\n{lyrics}", provenance_header(source))
}
