use rusqlite::{Connection, params};

/// Outcome of one login attempt, as recorded in login_logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    Success,
    BadPassword,
    BadTotp,
    UnknownUser,
    RateLimited,
}

impl LoginOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::BadPassword => "BAD_PASSWORD",
            Self::BadTotp => "BAD_TOTP",
            Self::UnknownUser => "UNKNOWN_USER",
            Self::RateLimited => "RATE_LIMITED",
        }
    }
}

/// Record a login attempt. Best-effort: a failed write must never block the
/// login flow itself, so callers ignore the result.
pub fn record(
    conn: &Connection,
    user_id: Option<i64>,
    username: &str,
    ip: &str,
    outcome: LoginOutcome,
) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO login_logs (user_id, username, ip, outcome) VALUES (?1, ?2, ?3, ?4)",
        params![user_id, username, ip, outcome.as_str()],
    )?;
    Ok(())
}

#[derive(Debug, Clone)]
pub struct LoginLogEntry {
    pub id: i64,
    pub user_id: Option<i64>,
    pub username: String,
    pub ip: String,
    pub outcome: String,
    pub created_at: String,
}

pub fn find_recent(conn: &Connection, limit: i64) -> rusqlite::Result<Vec<LoginLogEntry>> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, username, ip, outcome, created_at \
         FROM login_logs ORDER BY id DESC LIMIT ?1",
    )?;
    let rows = stmt.query_map(params![limit], |row| {
        Ok(LoginLogEntry {
            id: row.get(0)?,
            user_id: row.get(1)?,
            username: row.get(2)?,
            ip: row.get(3)?,
            outcome: row.get(4)?,
            created_at: row.get(5)?,
        })
    })?;
    rows.collect()
}
