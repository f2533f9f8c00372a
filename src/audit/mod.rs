use rusqlite::{Connection, params};
use serde_json::Value;

const RETENTION_DAYS: i64 = 365;

/// Write one audit entry. Callers treat this as best-effort and discard the
/// result; an audit failure must not fail the mutation it describes.
pub fn log(
    conn: &Connection,
    user_id: i64,
    action: &str,
    target_type: &str,
    target_id: &str,
    details: Value,
) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO audit_logs (user_id, action, target_type, target_id, details) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![user_id, action, target_type, target_id, details.to_string()],
    )?;
    Ok(())
}

#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub id: i64,
    pub user_id: i64,
    pub action: String,
    pub target_type: String,
    pub target_id: String,
    pub details: String,
    pub created_at: String,
}

pub fn find_recent(conn: &Connection, limit: i64) -> rusqlite::Result<Vec<AuditEntry>> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, action, target_type, target_id, details, created_at \
         FROM audit_logs ORDER BY id DESC LIMIT ?1",
    )?;
    let rows = stmt.query_map(params![limit], |row| {
        Ok(AuditEntry {
            id: row.get(0)?,
            user_id: row.get(1)?,
            action: row.get(2)?,
            target_type: row.get(3)?,
            target_id: row.get(4)?,
            details: row.get(5)?,
            created_at: row.get(6)?,
        })
    })?;
    rows.collect()
}

/// Drop audit entries older than the retention window. Run once at startup.
pub fn cleanup_old_entries(conn: &Connection) {
    match conn.execute(
        "DELETE FROM audit_logs WHERE created_at < datetime('now', ?1)",
        params![format!("-{} days", RETENTION_DAYS)],
    ) {
        Ok(0) => {}
        Ok(n) => log::info!("Audit cleanup removed {} old entries", n),
        Err(e) => log::warn!("Audit cleanup failed: {}", e),
    }
}
