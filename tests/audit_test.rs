//! Audit log tests — entry writing, recency ordering and retention cleanup.

mod common;

use rapat::audit;
use common::*;

#[test]
fn test_log_and_find_recent() {
    let (_dir, conn) = setup_test_db();
    let user_id = seed_user(&conn, "admin", "ADMIN");

    audit::log(
        &conn,
        user_id,
        "agenda.created",
        "agenda",
        "abc-123",
        serde_json::json!({"title": "Rencana kerja"}),
    )
    .expect("Failed to write audit entry");
    audit::log(
        &conn,
        user_id,
        "agenda.scheduled",
        "agenda",
        "abc-123",
        serde_json::json!({"meeting_number": 12, "meeting_year": 2025}),
    )
    .expect("Failed to write audit entry");

    let recent = audit::find_recent(&conn, 10).expect("Query failed");
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].action, "agenda.scheduled");
    assert_eq!(recent[1].action, "agenda.created");
    assert_eq!(recent[0].target_id, "abc-123");

    let details: serde_json::Value =
        serde_json::from_str(&recent[0].details).expect("Details are not JSON");
    assert_eq!(details["meeting_number"], 12);
}

#[test]
fn test_cleanup_removes_only_expired_entries() {
    let (_dir, conn) = setup_test_db();
    let user_id = seed_user(&conn, "admin", "ADMIN");

    audit::log(&conn, user_id, "agenda.created", "agenda", "new", serde_json::json!({}))
        .expect("Failed to write audit entry");
    // backdate one entry past the retention window
    conn.execute(
        "INSERT INTO audit_logs (user_id, action, target_type, target_id, details, created_at) \
         VALUES (?1, 'agenda.created', 'agenda', 'old', '{}', datetime('now', '-400 days'))",
        rusqlite::params![user_id],
    )
    .expect("Failed to insert backdated entry");

    audit::cleanup_old_entries(&conn);

    let recent = audit::find_recent(&conn, 10).expect("Query failed");
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].target_id, "new");
}
