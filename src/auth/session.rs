use actix_session::Session;

use crate::errors::AppError;

pub fn get_user_id(session: &Session) -> Option<i64> {
    session.get::<i64>("user_id").unwrap_or(None)
}

pub fn get_username(session: &Session) -> Result<String, String> {
    match session.get::<String>("username") {
        Ok(Some(username)) => Ok(username),
        Ok(None) => Err("No username in session".to_string()),
        Err(e) => Err(format!("Session error: {}", e)),
    }
}

pub fn get_role(session: &Session) -> String {
    session
        .get::<String>("role")
        .unwrap_or(None)
        .unwrap_or_default()
}

/// Require an authenticated actor; returns the user id or a session error.
/// Mutation handlers call this before touching the database.
pub fn require_user(session: &Session) -> Result<i64, AppError> {
    get_user_id(session).ok_or_else(|| AppError::Session("Not authenticated".to_string()))
}

/// Establish a full session after all login factors have passed.
pub fn establish(session: &Session, user_id: i64, username: &str, role: &str) {
    let _ = session.insert("user_id", user_id);
    let _ = session.insert("username", username);
    let _ = session.insert("role", role);
    session.remove("pending_2fa_user");
}

/// Mark a half-completed login that still needs the TOTP step.
pub fn set_pending_2fa(session: &Session, user_id: i64) {
    let _ = session.insert("pending_2fa_user", user_id);
}

pub fn pending_2fa(session: &Session) -> Option<i64> {
    session.get::<i64>("pending_2fa_user").unwrap_or(None)
}

pub fn take_flash(session: &Session) -> Option<String> {
    let flash = session.get::<String>("flash").unwrap_or(None);
    if flash.is_some() {
        session.remove("flash");
    }
    flash
}

pub fn set_flash(session: &Session, message: &str) {
    let _ = session.insert("flash", message);
}
