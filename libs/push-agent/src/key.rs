//! VAPID public key conversion for `PushManager.subscribe`.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

use crate::error::AgentError;

/// Length of an uncompressed P-256 public key.
const P256_UNCOMPRESSED_LEN: usize = 65;

/// Decode a URL-safe base64 VAPID public key (padding optional) into the raw
/// bytes expected as `applicationServerKey`.
pub fn url_base64_to_bytes(encoded: &str) -> Result<Vec<u8>, AgentError> {
    let trimmed = encoded.trim().trim_end_matches('=');
    let bytes = URL_SAFE_NO_PAD
        .decode(trimmed)
        .map_err(|e| AgentError::InvalidKey(e.to_string()))?;

    if bytes.len() != P256_UNCOMPRESSED_LEN || bytes[0] != 0x04 {
        return Err(AgentError::InvalidKey(format!(
            "expected {P256_UNCOMPRESSED_LEN}-byte uncompressed P-256 point, got {} bytes",
            bytes.len()
        )));
    }
    Ok(bytes)
}
