use std::sync::Arc;

use lyricmux_core::{BackendId, BackendsConfig, CoreError, LyricsBackend};
use lyricmux_lyrics_kugou::KugouBackend;
use lyricmux_lyrics_netease::NeteaseBackend;
use lyricmux_lyrics_qqmusic::QqMusicBackend;

/// Create the enabled backends in configured order, sharing one HTTP client.
///
/// Duplicate entries in `enabled` are ignored after their first occurrence.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be created.
pub fn create_backends(config: &BackendsConfig) -> Result<Vec<Arc<dyn LyricsBackend>>, CoreError> {
    let client = lyricmux_core::http::client_from_config(config)?;

    let mut seen = Vec::new();
    let mut backends: Vec<Arc<dyn LyricsBackend>> = Vec::new();
    for &id in &config.enabled {
        if seen.contains(&id) {
            continue;
        }
        seen.push(id);

        let backend: Arc<dyn LyricsBackend> = match id {
            BackendId::Netease => Arc::new(NeteaseBackend::with_client(client.clone())),
            BackendId::QqMusic => Arc::new(QqMusicBackend::with_client(client.clone())),
            BackendId::Kugou => Arc::new(KugouBackend::with_client(client.clone())),
        };
        backends.push(backend);
    }

    Ok(backends)
}
