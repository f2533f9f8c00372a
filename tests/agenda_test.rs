//! Agenda model tests — proposal lifecycle, readiness derivation, scheduling,
//! session grouping, minutes persistence and cascade delete.

mod common;

use std::collections::BTreeMap;

use rapat::models::agenda::{
    self, AgendaStatus, AttachmentField, FollowUpItem, MeetingType, NewAgenda,
};
use common::*;

fn item(description: &str, status: &str) -> FollowUpItem {
    FollowUpItem {
        description: description.to_string(),
        status: status.to_string(),
        pic: "Direktur Keuangan".to_string(),
        due_date: "2025-10-01".to_string(),
        evidence_path: String::new(),
    }
}

#[test]
fn test_create_starts_in_draft_when_documents_required() {
    let (_dir, conn) = setup_test_db();
    let user_id = seed_user(&conn, "admin", "ADMIN");

    let id = seed_agenda(&conn, user_id, "Rencana kerja 2026", MeetingType::Radir);
    let row = agenda::find_by_id(&conn, &id)
        .expect("Query failed")
        .expect("Agenda not found");

    assert_eq!(row.status, "DRAFT");
    assert_eq!(row.meeting_type, "RADIR");
    assert!(row.review_doc_required);
}

#[test]
fn test_create_ready_when_no_documents_required() {
    let (_dir, conn) = setup_test_db();
    let user_id = seed_user(&conn, "admin", "ADMIN");

    let id = agenda::create(
        &conn,
        &NewAgenda {
            title: "Laporan singkat".to_string(),
            description: String::new(),
            meeting_type: MeetingType::Rakordir,
            review_doc_required: false,
            proposal_note_required: false,
            presentation_required: false,
            created_by: user_id,
        },
    )
    .expect("Failed to create agenda");

    let row = agenda::find_by_id(&conn, &id).expect("Query failed").expect("Not found");
    assert_eq!(row.status, "DAPAT_DILANJUTKAN");
}

#[test]
fn test_find_by_id_not_found() {
    let (_dir, conn) = setup_test_db();
    let result = agenda::find_by_id(&conn, "no-such-id").expect("Query failed");
    assert!(result.is_none());
}

#[test]
fn test_readiness_rederived_as_attachments_fill() {
    let (_dir, conn) = setup_test_db();
    let user_id = seed_user(&conn, "admin", "ADMIN");
    let id = seed_agenda(&conn, user_id, "Akuisisi anak usaha", MeetingType::Radir);

    agenda::set_attachment(&conn, &id, AttachmentField::ReviewDoc, "radir/a/kajian.pdf")
        .expect("Failed to set attachment");
    let row = agenda::find_by_id(&conn, &id).unwrap().unwrap();
    assert_eq!(row.status, "DRAFT");

    agenda::set_attachment(&conn, &id, AttachmentField::ProposalNote, "radir/a/nota.pdf")
        .expect("Failed to set attachment");
    agenda::set_attachment(&conn, &id, AttachmentField::Presentation, "radir/a/materi.pptx")
        .expect("Failed to set attachment");
    let row = agenda::find_by_id(&conn, &id).unwrap().unwrap();
    assert_eq!(row.status, "DAPAT_DILANJUTKAN");

    // clearing a required slot drops it back to DRAFT
    agenda::set_attachment(&conn, &id, AttachmentField::Presentation, "")
        .expect("Failed to clear attachment");
    let row = agenda::find_by_id(&conn, &id).unwrap().unwrap();
    assert_eq!(row.status, "DRAFT");
}

#[test]
fn test_readiness_follows_required_flags_on_update() {
    let (_dir, conn) = setup_test_db();
    let user_id = seed_user(&conn, "admin", "ADMIN");
    let id = seed_agenda(&conn, user_id, "Kebijakan SDM", MeetingType::Rakordir);

    agenda::update_proposal(
        &conn,
        &id,
        "Kebijakan SDM",
        "Revisi",
        MeetingType::Rakordir,
        false,
        false,
        false,
    )
    .expect("Failed to update");

    let row = agenda::find_by_id(&conn, &id).unwrap().unwrap();
    assert_eq!(row.status, "DAPAT_DILANJUTKAN");
    assert_eq!(row.description, "Revisi");
}

#[test]
fn test_readiness_not_rederived_after_scheduling() {
    let (_dir, conn) = setup_test_db();
    let user_id = seed_user(&conn, "admin", "ADMIN");
    let id = seed_agenda(&conn, user_id, "Investasi TI", MeetingType::Radir);

    agenda::set_schedule(&conn, &id, "2025-09-10", "09:00", "11:00", "Luring", "Ruang rapat", "", 12, 2025)
        .expect("Failed to schedule");

    // the slot write must not pull a scheduled row back to DRAFT
    agenda::set_attachment(&conn, &id, AttachmentField::ReviewDoc, "")
        .expect("Failed to clear attachment");
    let row = agenda::find_by_id(&conn, &id).unwrap().unwrap();
    assert_eq!(row.status, "DIJADWALKAN");
    assert_eq!(row.meeting_number, Some(12));
    assert_eq!(row.meeting_year, Some(2025));
    assert_eq!(row.execution_date, "2025-09-10");
}

#[test]
fn test_session_groups_rows_by_number_and_year() {
    let (_dir, conn) = setup_test_db();
    let user_id = seed_user(&conn, "admin", "ADMIN");
    let a = seed_agenda(&conn, user_id, "Agenda pertama", MeetingType::Radir);
    let b = seed_agenda(&conn, user_id, "Agenda kedua", MeetingType::Radir);
    let c = seed_agenda(&conn, user_id, "Agenda lain tahun", MeetingType::Radir);

    agenda::set_schedule(&conn, &a, "2025-09-10", "", "", "", "", "", 12, 2025).unwrap();
    agenda::set_schedule(&conn, &b, "2025-09-10", "", "", "", "", "", 12, 2025).unwrap();
    agenda::set_schedule(&conn, &c, "2024-09-10", "", "", "", "", "", 12, 2024).unwrap();

    let session = agenda::find_by_session(&conn, 2025, 12).expect("Query failed");
    assert_eq!(session.len(), 2);
    assert!(session.iter().all(|row| row.meeting_year == Some(2025)));
}

#[test]
fn test_save_minutes_writes_canonical_json_and_monev() {
    let (_dir, conn) = setup_test_db();
    let user_id = seed_user(&conn, "admin", "ADMIN");
    let id = seed_agenda(&conn, user_id, "RKAP 2026", MeetingType::Radir);

    let decisions = vec![item("Setujui RKAP", "DONE"), item("Kaji ulang capex", "ON_PROGRESS")];
    let directives = vec![item("Laporkan bulanan", "ON_PROGRESS")];
    let mut attendance = BTreeMap::new();
    attendance.insert("Direktur Utama".to_string(), "Hadir".to_string());
    attendance.insert("Direktur Keuangan".to_string(), "Tidak Hadir".to_string());
    let guests = vec!["Kepala Divisi TI".to_string()];

    agenda::save_minutes(&conn, &id, "Catatan rapat", &decisions, &directives, &attendance, &guests)
        .expect("Failed to save minutes");

    let row = agenda::find_by_id(&conn, &id).unwrap().unwrap();
    assert_eq!(row.notes, "Catatan rapat");
    assert_eq!(row.decision_items().len(), 2);
    assert_eq!(row.directive_items().len(), 1);
    assert_eq!(row.attendance_map().get("Direktur Utama").map(String::as_str), Some("Hadir"));
    assert_eq!(row.guest_list(), guests);
    // one item still open, so the agenda is not done
    assert_eq!(row.monev_status, "ON_PROGRESS");
}

#[test]
fn test_set_follow_ups_recomputes_monev_status() {
    let (_dir, conn) = setup_test_db();
    let user_id = seed_user(&conn, "admin", "ADMIN");
    let id = seed_agenda(&conn, user_id, "Divestasi", MeetingType::Radir);

    agenda::set_follow_ups(&conn, &id, &[item("Jual aset", "ON_PROGRESS")], &[])
        .expect("Failed to set follow-ups");
    let row = agenda::find_by_id(&conn, &id).unwrap().unwrap();
    assert_eq!(row.monev_status, "ON_PROGRESS");

    agenda::set_follow_ups(&conn, &id, &[item("Jual aset", "DONE")], &[])
        .expect("Failed to set follow-ups");
    let row = agenda::find_by_id(&conn, &id).unwrap().unwrap();
    assert_eq!(row.monev_status, "DONE");
}

#[test]
fn test_list_filtered_by_status_and_type() {
    let (_dir, conn) = setup_test_db();
    let user_id = seed_user(&conn, "admin", "ADMIN");
    let a = seed_agenda(&conn, user_id, "Radir draft", MeetingType::Radir);
    let _b = seed_agenda(&conn, user_id, "Rakordir draft", MeetingType::Rakordir);
    agenda::update_status(&conn, &a, AgendaStatus::Dibatalkan).unwrap();

    let all = agenda::list_filtered(&conn, None, None).expect("Query failed");
    assert_eq!(all.len(), 2);

    let cancelled = agenda::list_filtered(&conn, Some("DIBATALKAN"), None).expect("Query failed");
    assert_eq!(cancelled.len(), 1);
    assert_eq!(cancelled[0].id, a);

    let rakordir = agenda::list_filtered(&conn, None, Some("RAKORDIR")).expect("Query failed");
    assert_eq!(rakordir.len(), 1);

    let none = agenda::list_filtered(&conn, Some("DIBATALKAN"), Some("RAKORDIR")).expect("Query failed");
    assert!(none.is_empty());
}

#[test]
fn test_delete_returns_every_attachment_path() {
    let (_dir, mut conn) = setup_test_db();
    let user_id = seed_user(&conn, "admin", "ADMIN");
    let id = seed_agenda(&conn, user_id, "Agenda berkas", MeetingType::Radir);

    agenda::set_attachment(&conn, &id, AttachmentField::ReviewDoc, "radir/a/kajian.pdf").unwrap();
    agenda::add_support_doc(&conn, &id, "radir/a/lampiran.xlsx").unwrap();
    let mut with_evidence = item("Tindak lanjut", "DONE");
    with_evidence.evidence_path = "evidence/a/bukti.pdf".to_string();
    agenda::set_follow_ups(&conn, &id, &[with_evidence], &[]).unwrap();

    let paths = agenda::delete(&mut conn, &id).expect("Failed to delete");
    assert_eq!(paths.len(), 3);
    assert!(paths.contains(&"radir/a/kajian.pdf".to_string()));
    assert!(paths.contains(&"radir/a/lampiran.xlsx".to_string()));
    assert!(paths.contains(&"evidence/a/bukti.pdf".to_string()));

    assert!(agenda::find_by_id(&conn, &id).expect("Query failed").is_none());
    assert_eq!(agenda::count(&conn).unwrap(), 0);
}

#[test]
fn test_delete_missing_row_returns_no_paths() {
    let (_dir, mut conn) = setup_test_db();
    let paths = agenda::delete(&mut conn, "no-such-id").expect("Delete failed");
    assert!(paths.is_empty());
}
