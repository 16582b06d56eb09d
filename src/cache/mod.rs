use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

mod db;

/// Local result cache: derived analysis payloads keyed by
/// `(kind, recording_id)`.
///
/// There is no TTL and no capacity bound: an analysis is fetched once per
/// recording and kept until the recording is deleted (`invalidate`) or the
/// account goes away (`clear`). Single-writer in practice: one command
/// touches one key at a time.

/// Load a cached payload, deserialized from its JSON blob.
pub fn load<T: DeserializeOwned>(kind: &str, recording_id: &str) -> Result<Option<T>> {
    let conn = db::open_db()?;
    let Some(raw) = db::get(&conn, kind, recording_id)? else {
        return Ok(None);
    };

    let payload = serde_json::from_str(&raw)
        .with_context(|| format!("Corrupt {kind} cache entry for {recording_id}"))?;
    Ok(Some(payload))
}

/// Store a payload under `(kind, recording_id)`, replacing any previous
/// entry.
pub fn store<T: Serialize>(kind: &str, recording_id: &str, payload: &T) -> Result<()> {
    let conn = db::open_db()?;
    let raw = serde_json::to_string(payload)
        .with_context(|| format!("Failed to serialize {kind} payload"))?;
    db::put(&conn, kind, recording_id, &raw)
}

/// Drop every cached kind for one recording. Fired when the recording is
/// deleted server-side so no stale analysis outlives it.
pub fn invalidate(recording_id: &str) -> Result<usize> {
    let conn = db::open_db()?;
    db::invalidate(&conn, recording_id)
}

/// Drop the whole cache.
pub fn clear() -> Result<usize> {
    let conn = db::open_db()?;
    db::clear(&conn)
}
