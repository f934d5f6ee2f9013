//! Avatar images uploaded from disk.
//!
//! Personas carry their avatar inline as a `data:` URL, so an uploaded
//! image is checked and encoded here before it goes into a payload.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::{CoreError, Result};

/// Largest accepted avatar file.
pub const MAX_AVATAR_BYTES: usize = 200 * 1024;

const PNG_SIGNATURE: &[u8] = &[0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];
const JPEG_SIGNATURE: &[u8] = &[0xff, 0xd8, 0xff];

/// Image type, sniffed from the file header.
fn mime_type(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(PNG_SIGNATURE) {
        Some("image/png")
    } else if bytes.starts_with(JPEG_SIGNATURE) {
        Some("image/jpeg")
    } else {
        None
    }
}

/// Encode a PNG or JPEG image as a `data:` URL.
///
/// The type is checked before the size.
pub fn avatar_data_url(bytes: &[u8]) -> Result<String> {
    let mime = mime_type(bytes)
        .ok_or_else(|| CoreError::InvalidAvatar("Avatar must be a PNG or JPEG image".to_string()))?;
    if bytes.len() > MAX_AVATAR_BYTES {
        return Err(CoreError::InvalidAvatar("Avatar must be ≤ 200 KB".to_string()));
    }
    Ok(format!("data:{mime};base64,{}", STANDARD.encode(bytes)))
}
