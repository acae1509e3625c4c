//! Object key generation shared by every backend.
//!
//! Key format: `{aspect-prefix}/{random-name}.{extension}`, no leading slash.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::RngCore;
use tubely_core::constants::OBJECT_NAME_RANDOM_BYTES;
use tubely_core::models::AspectClass;

/// Random, URL-safe object name (32 bytes from the thread CSPRNG, base64url without padding).
///
/// Uniqueness is probabilistic; existing keys are never checked.
pub fn generate_object_name() -> String {
    let mut bytes = [0u8; OBJECT_NAME_RANDOM_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Build the object key for a processed video.
pub fn build_object_key(class: AspectClass, name: &str, extension: &str) -> String {
    format!("{}/{}.{}", class.prefix(), name, extension)
}

/// File extension for a `type/subtype` media type, taken from the subtype.
///
/// Parameters are ignored (`video/mp4; codecs=avc1` gives `mp4`).
/// Returns `None` for values without a usable subtype.
pub fn extension_for_content_type(content_type: &str) -> Option<&str> {
    let essence = content_type.split(';').next()?.trim();
    let (_, subtype) = essence.split_once('/')?;
    let subtype = subtype.trim();
    if subtype.is_empty() || subtype.contains(['/', '.']) {
        return None;
    }
    Some(subtype)
}
