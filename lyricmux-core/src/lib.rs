pub mod aggregator;
pub mod backend;
pub mod config;
pub mod document;
pub mod error;
pub mod http;
pub mod lrc;
pub mod paths;
pub mod score;

pub use aggregator::{LyricsAggregator, DEFAULT_CANDIDATE_LIMIT};
pub use backend::{is_not_found_text, BackendId, Candidate, LyricsBackend, LyricsPayload, LyricsQuery};
pub use config::{BackendsConfig, LoggingConfig, LyricmuxConfig, ServerConfig};

pub use document::LyricDocument;
pub use error::CoreError;
pub use lrc::{merge_bilingual, LrcLine, MergedLyrics, TimestampedLine};
pub use paths::{config_dir, config_path, log_file_path, CONFIG_DIR_NAME, CONFIG_FILE_NAME};
pub use score::relevance_score;
