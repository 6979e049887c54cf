//! Instance identifier construction.
//!
//! Unique types get a fixed id so that re-ingestion replaces the previous
//! instance in the store. Every other type gets an id that is unique per
//! ingestion: content discriminator, timestamp and a random suffix.

use crate::Timestamp;
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Builds the id for a new instance of a component type.
///
/// `prefix` is normally the component type name. `now` comes from the
/// engine's clock so ids and `updated_at` agree on the time of ingestion.
pub fn build_instance_id(
    prefix: &str,
    data: &serde_json::Value,
    unique: bool,
    now: Timestamp,
) -> String {
    if unique {
        return format!("{prefix}-singleton");
    }
    let suffix = Uuid::new_v4().simple().to_string();
    format!(
        "{prefix}-{}-{}-{}",
        content_discriminator(data),
        now.as_millis(),
        &suffix[..8]
    )
}

/// Short hex digest of the payload, stable for identical content.
pub fn content_discriminator(data: &serde_json::Value) -> String {
    let digest = Sha256::digest(data.to_string().as_bytes());
    hex::encode(&digest[..4])
}
