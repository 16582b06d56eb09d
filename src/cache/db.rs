use anyhow::{Context, Result};
use rusqlite::Connection;

/// Open (or create) the analysis cache database.
pub fn open_db() -> Result<Connection> {
    let path = crate::paths::cache_db_path();

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let conn = Connection::open(&path)
        .with_context(|| format!("Failed to open cache database: {}", path.display()))?;

    conn.execute_batch("PRAGMA journal_mode=WAL;")
        .context("Failed to set database pragmas")?;

    init_schema(&conn)?;
    Ok(conn)
}

/// Create the cache table if it doesn't exist. Idempotent.
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS analysis_cache (
            kind TEXT NOT NULL,
            recording_id TEXT NOT NULL,
            data TEXT NOT NULL,
            cached_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (kind, recording_id)
        );",
    )
    .context("Failed to initialize cache schema")?;

    Ok(())
}

/// Fetch a cached payload, or None on a miss.
pub fn get(conn: &Connection, kind: &str, recording_id: &str) -> Result<Option<String>> {
    let mut stmt = conn
        .prepare("SELECT data FROM analysis_cache WHERE kind = ?1 AND recording_id = ?2")
        .context("Failed to prepare cache lookup")?;

    let mut rows = stmt
        .query(rusqlite::params![kind, recording_id])
        .context("Failed to query cache")?;

    match rows.next().context("Failed to read cache row")? {
        Some(row) => Ok(Some(row.get(0).context("Failed to read cached data")?)),
        None => Ok(None),
    }
}

/// Store (or replace) a cached payload.
pub fn put(conn: &Connection, kind: &str, recording_id: &str, data: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO analysis_cache (kind, recording_id, data)
         VALUES (?1, ?2, ?3)
         ON CONFLICT(kind, recording_id) DO UPDATE SET
            data = ?3,
            cached_at = datetime('now')",
        rusqlite::params![kind, recording_id, data],
    )
    .with_context(|| format!("Failed to cache {kind} analysis for {recording_id}"))?;

    Ok(())
}

/// Remove every cached kind for a recording. Returns how many entries went.
pub fn invalidate(conn: &Connection, recording_id: &str) -> Result<usize> {
    let removed = conn
        .execute(
            "DELETE FROM analysis_cache WHERE recording_id = ?1",
            [recording_id],
        )
        .context("Failed to invalidate cache entries")?;

    Ok(removed)
}

/// Drop the entire cache (used when the account is deleted).
pub fn clear(conn: &Connection) -> Result<usize> {
    let removed = conn
        .execute("DELETE FROM analysis_cache", [])
        .context("Failed to clear cache")?;

    Ok(removed)
}
