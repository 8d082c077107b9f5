//! KRC lyric decoding.
//!
//! KRC is Kugou's obfuscated lyric container: base64 text wrapping a 4-byte
//! `krc1` header followed by zlib data XORed with a fixed 16-byte key. The
//! first encrypted byte decrypts to the zlib header, which is why every KRC
//! payload begins with `krc18`.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use flate2::read::ZlibDecoder;
use std::io::Read;
use thiserror::Error;

/// Leading bytes identifying an encrypted KRC payload
pub const KRC_MAGIC: &[u8] = b"krc18";

/// Bytes dropped before decryption
const KRC_HEADER_LEN: usize = 4;

/// XOR key applied cyclically to the payload after the header
pub const KRC_KEY: [u8; 16] = [
    64, 71, 97, 119, 94, 50, 116, 71, 81, 54, 49, 45, 206, 210, 110, 105,
];

/// KRC decoding errors
#[derive(Debug, Error)]
pub enum KrcError {
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("zlib inflate failed: {0}")]
    Inflate(#[from] std::io::Error),
}

/// Decode base64 lyric content from Kugou into LRC-style text.
///
/// Payloads without the `krc18` magic are plain text and only base64 decoded.
/// Invalid UTF-8 sequences are dropped.
///
/// # Errors
///
/// Returns [`KrcError`] if the base64 is invalid or the KRC data cannot be inflated.
pub fn decode_krc(encoded: &str) -> Result<String, KrcError> {
    let bytes = STANDARD.decode(encoded.trim())?;

    if !bytes.starts_with(KRC_MAGIC) {
        return Ok(utf8_ignoring_invalid(&bytes));
    }

    let decrypted = xor_with_key(&bytes[KRC_HEADER_LEN..]);

    let mut inflated = Vec::new();
    ZlibDecoder::new(decrypted.as_slice()).read_to_end(&mut inflated)?;

    Ok(utf8_ignoring_invalid(&inflated))
}

/// XOR each byte with the key at `index % 16`. Applying it twice is a no-op.
fn xor_with_key(data: &[u8]) -> Vec<u8> {
    data.iter()
        .enumerate()
        .map(|(i, byte)| byte ^ KRC_KEY[i % KRC_KEY.len()])
        .collect()
}

fn utf8_ignoring_invalid(mut bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    loop {
        match std::str::from_utf8(bytes) {
            Ok(valid) => {
                out.push_str(valid);
                return out;
            }
            Err(e) => {
                let (valid, rest) = bytes.split_at(e.valid_up_to());
                out.push_str(std::str::from_utf8(valid).unwrap_or_default());
                // `None` means the input ends mid-sequence
                bytes = &rest[e.error_len().unwrap_or(rest.len())..];
            }
        }
    }
}
