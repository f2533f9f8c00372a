//! Shared test fixtures: a temp-file SQLite database with migrations applied
//! and helpers for seeding users and agendas.

#![allow(dead_code)]

use rusqlite::Connection;
use tempfile::TempDir;

use rapat::models::agenda::{self, MeetingType, NewAgenda};
use rapat::models::user::{self, NewUser};

pub fn setup_test_db() -> (TempDir, Connection) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = dir.path().join("test.db");
    let conn = Connection::open(&db_path).expect("Failed to open test DB");
    conn.execute_batch("PRAGMA foreign_keys=ON; PRAGMA journal_mode=WAL;")
        .expect("Failed to set pragmas");
    conn.execute_batch(rapat::db::MIGRATIONS)
        .expect("Failed to run migrations");
    (dir, conn)
}

pub fn seed_user(conn: &Connection, username: &str, role: &str) -> i64 {
    user::create(
        conn,
        &NewUser {
            email: format!("{}@example.com", username),
            username: username.to_string(),
            full_name: username.to_string(),
            password_hash: "x".to_string(),
            role: role.to_string(),
        },
    )
    .expect("Failed to seed user")
}

/// Create a proposal with every attachment slot required.
pub fn seed_agenda(conn: &Connection, user_id: i64, title: &str, meeting_type: MeetingType) -> String {
    agenda::create(
        conn,
        &NewAgenda {
            title: title.to_string(),
            description: String::new(),
            meeting_type,
            review_doc_required: true,
            proposal_note_required: true,
            presentation_required: true,
            created_by: user_id,
        },
    )
    .expect("Failed to create agenda")
}
