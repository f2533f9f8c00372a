use rusqlite::{Connection, OptionalExtension, params};

/// Profile row mirroring the authenticated account, including the optional
/// TOTP secret and application role.
#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub full_name: String,
    pub password_hash: String,
    pub role: String,
    pub totp_secret: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub full_name: String,
    pub password_hash: String,
    pub role: String,
}

const USER_COLUMNS: &str =
    "id, email, username, full_name, password_hash, role, totp_secret, created_at, updated_at";

fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get("id")?,
        email: row.get("email")?,
        username: row.get("username")?,
        full_name: row.get("full_name")?,
        password_hash: row.get("password_hash")?,
        role: row.get("role")?,
        totp_secret: row.get("totp_secret")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

pub fn create(conn: &Connection, new: &NewUser) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO users (email, username, full_name, password_hash, role) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![new.email, new.username, new.full_name, new.password_hash, new.role],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn find_by_id(conn: &Connection, id: i64) -> rusqlite::Result<Option<User>> {
    conn.query_row(
        &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
        params![id],
        row_to_user,
    )
    .optional()
}

pub fn find_by_username(conn: &Connection, username: &str) -> rusqlite::Result<Option<User>> {
    conn.query_row(
        &format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1 OR email = ?1"),
        params![username],
        row_to_user,
    )
    .optional()
}

/// The director roster, ordered by name. Attendance recaps are keyed on
/// these full names.
pub fn list_directors(conn: &Connection) -> rusqlite::Result<Vec<User>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE role = 'DIREKTUR' ORDER BY full_name"
    ))?;
    let rows = stmt.query_map([], row_to_user)?;
    rows.collect()
}

/// Enable (Some) or disable (None) the TOTP second factor.
pub fn set_totp_secret(
    conn: &Connection,
    id: i64,
    secret: Option<&str>,
) -> rusqlite::Result<()> {
    conn.execute(
        "UPDATE users SET totp_secret = ?2, updated_at = datetime('now') WHERE id = ?1",
        params![id, secret],
    )?;
    Ok(())
}

pub fn count(conn: &Connection) -> rusqlite::Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
}
