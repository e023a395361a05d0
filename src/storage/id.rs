//! Store-assigned identifiers.

use chrono::Utc;

/// Generates a 24 character lowercase hex id: four bytes of big-endian unix
/// seconds followed by eight random bytes.
pub fn generate_object_id() -> String {
    let seconds = Utc::now().timestamp().clamp(0, i64::from(u32::MAX)) as u32;
    let mut bytes = [0u8; 12];
    bytes[..4].copy_from_slice(&seconds.to_be_bytes());
    bytes[4..].copy_from_slice(&rand::random::<[u8; 8]>());
    hex::encode(bytes)
}
