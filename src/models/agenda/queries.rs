use rusqlite::{Connection, OptionalExtension, params};
use uuid::Uuid;

use super::json::{FollowUpItem, encode_follow_ups, overall_monev_status};
use super::types::{Agenda, AgendaStatus, MeetingType};

/// Fields needed to create a proposal. Everything else starts empty and is
/// filled in by later workflow actions.
#[derive(Debug, Clone)]
pub struct NewAgenda {
    pub title: String,
    pub description: String,
    pub meeting_type: MeetingType,
    pub review_doc_required: bool,
    pub proposal_note_required: bool,
    pub presentation_required: bool,
    pub created_by: i64,
}

const AGENDA_COLUMNS: &str = "\
    id, title, description, status, meeting_type, \
    execution_date, start_time, end_time, method, location, meeting_link, \
    meeting_number, meeting_year, \
    notes, decisions, directives, attendance, guests, \
    review_doc_path, review_doc_required, proposal_note_path, proposal_note_required, \
    presentation_path, presentation_required, support_doc_paths, \
    monev_status, created_by, created_at, updated_at";

fn row_to_agenda(row: &rusqlite::Row<'_>) -> rusqlite::Result<Agenda> {
    Ok(Agenda {
        id: row.get("id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        status: row.get("status")?,
        meeting_type: row.get("meeting_type")?,
        execution_date: row.get("execution_date")?,
        start_time: row.get("start_time")?,
        end_time: row.get("end_time")?,
        method: row.get("method")?,
        location: row.get("location")?,
        meeting_link: row.get("meeting_link")?,
        meeting_number: row.get("meeting_number")?,
        meeting_year: row.get("meeting_year")?,
        notes: row.get("notes")?,
        decisions: row.get("decisions")?,
        directives: row.get("directives")?,
        attendance: row.get("attendance")?,
        guests: row.get("guests")?,
        review_doc_path: row.get("review_doc_path")?,
        review_doc_required: row.get("review_doc_required")?,
        proposal_note_path: row.get("proposal_note_path")?,
        proposal_note_required: row.get("proposal_note_required")?,
        presentation_path: row.get("presentation_path")?,
        presentation_required: row.get("presentation_required")?,
        support_doc_paths: row.get("support_doc_paths")?,
        monev_status: row.get("monev_status")?,
        created_by: row.get("created_by")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

/// Create a proposal row. Returns the generated id.
///
/// Initial status is derived from attachment readiness: with no files yet,
/// that is DRAFT unless every slot is flagged not-required.
pub fn create(conn: &Connection, new: &NewAgenda) -> rusqlite::Result<String> {
    let id = Uuid::new_v4().to_string();
    let ready = !new.review_doc_required && !new.proposal_note_required && !new.presentation_required;
    let status = if ready {
        AgendaStatus::DapatDilanjutkan
    } else {
        AgendaStatus::Draft
    };

    conn.execute(
        "INSERT INTO agendas (id, title, description, status, meeting_type, \
             review_doc_required, proposal_note_required, presentation_required, created_by) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            id,
            new.title,
            new.description,
            status.as_str(),
            new.meeting_type.as_str(),
            new.review_doc_required,
            new.proposal_note_required,
            new.presentation_required,
            new.created_by,
        ],
    )?;
    Ok(id)
}

pub fn find_by_id(conn: &Connection, id: &str) -> rusqlite::Result<Option<Agenda>> {
    conn.query_row(
        &format!("SELECT {AGENDA_COLUMNS} FROM agendas WHERE id = ?1"),
        params![id],
        row_to_agenda,
    )
    .optional()
}

/// List agendas, optionally filtered by status and/or meeting type,
/// newest activity first.
pub fn list_filtered(
    conn: &Connection,
    status: Option<&str>,
    meeting_type: Option<&str>,
) -> rusqlite::Result<Vec<Agenda>> {
    let mut sql = format!("SELECT {AGENDA_COLUMNS} FROM agendas WHERE 1=1");
    let mut binds: Vec<String> = Vec::new();
    if let Some(s) = status {
        binds.push(s.to_string());
        sql.push_str(&format!(" AND status = ?{}", binds.len()));
    }
    if let Some(t) = meeting_type {
        binds.push(t.to_string());
        sql.push_str(&format!(" AND meeting_type = ?{}", binds.len()));
    }
    sql.push_str(" ORDER BY updated_at DESC, created_at DESC");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(rusqlite::params_from_iter(binds.iter()), row_to_agenda)?;
    rows.collect()
}

/// All rows whose last update falls inside an inclusive timestamp range.
/// This is the aggregator's input slice.
pub fn list_updated_between(
    conn: &Connection,
    from_ts: &str,
    to_ts: &str,
) -> rusqlite::Result<Vec<Agenda>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {AGENDA_COLUMNS} FROM agendas \
         WHERE updated_at >= ?1 AND updated_at <= ?2 \
         ORDER BY updated_at DESC"
    ))?;
    let rows = stmt.query_map(params![from_ts, to_ts], row_to_agenda)?;
    rows.collect()
}

/// All agendas of one meeting session: the rows sharing
/// (meeting_number, meeting_year).
pub fn find_by_session(
    conn: &Connection,
    meeting_year: i64,
    meeting_number: i64,
) -> rusqlite::Result<Vec<Agenda>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {AGENDA_COLUMNS} FROM agendas \
         WHERE meeting_year = ?1 AND meeting_number = ?2 \
         ORDER BY created_at ASC"
    ))?;
    let rows = stmt.query_map(params![meeting_year, meeting_number], row_to_agenda)?;
    rows.collect()
}

/// Update proposal narrative fields. Re-derives the readiness status when the
/// row is still pre-schedule (DRAFT or DAPAT_DILANJUTKAN).
pub fn update_proposal(
    conn: &Connection,
    id: &str,
    title: &str,
    description: &str,
    meeting_type: MeetingType,
    review_doc_required: bool,
    proposal_note_required: bool,
    presentation_required: bool,
) -> rusqlite::Result<()> {
    conn.execute(
        "UPDATE agendas SET title = ?2, description = ?3, meeting_type = ?4, \
             review_doc_required = ?5, proposal_note_required = ?6, presentation_required = ?7, \
             updated_at = datetime('now') \
         WHERE id = ?1",
        params![
            id,
            title,
            description,
            meeting_type.as_str(),
            review_doc_required,
            proposal_note_required,
            presentation_required,
        ],
    )?;
    rederive_readiness(conn, id)
}

/// Recompute the derived pre-schedule status from attachment readiness.
/// A no-op for rows already past scheduling.
pub fn rederive_readiness(conn: &Connection, id: &str) -> rusqlite::Result<()> {
    let agenda = match find_by_id(conn, id)? {
        Some(a) => a,
        None => return Ok(()),
    };
    match agenda.status_enum() {
        Some(AgendaStatus::Draft) | Some(AgendaStatus::DapatDilanjutkan) => {}
        _ => return Ok(()),
    }
    let derived = agenda.readiness_status();
    if derived.as_str() != agenda.status {
        conn.execute(
            "UPDATE agendas SET status = ?2, updated_at = datetime('now') WHERE id = ?1",
            params![id, derived.as_str()],
        )?;
    }
    Ok(())
}

/// Set scheduling fields and move the row to DIJADWALKAN.
#[allow(clippy::too_many_arguments)]
pub fn set_schedule(
    conn: &Connection,
    id: &str,
    execution_date: &str,
    start_time: &str,
    end_time: &str,
    method: &str,
    location: &str,
    meeting_link: &str,
    meeting_number: i64,
    meeting_year: i64,
) -> rusqlite::Result<()> {
    conn.execute(
        "UPDATE agendas SET execution_date = ?2, start_time = ?3, end_time = ?4, \
             method = ?5, location = ?6, meeting_link = ?7, \
             meeting_number = ?8, meeting_year = ?9, \
             status = ?10, updated_at = datetime('now') \
         WHERE id = ?1",
        params![
            id,
            execution_date,
            start_time,
            end_time,
            method,
            location,
            meeting_link,
            meeting_number,
            meeting_year,
            AgendaStatus::Dijadwalkan.as_str(),
        ],
    )?;
    Ok(())
}

/// Write a status directly. Any action may set any status; the workflow is
/// one-directional in intent only.
pub fn update_status(conn: &Connection, id: &str, status: AgendaStatus) -> rusqlite::Result<()> {
    conn.execute(
        "UPDATE agendas SET status = ?2, updated_at = datetime('now') WHERE id = ?1",
        params![id, status.as_str()],
    )?;
    Ok(())
}

/// Persist minute-taking output for one agenda. All JSON columns are written
/// canonically encoded; monev status is recomputed from the decision items.
pub fn save_minutes(
    conn: &Connection,
    id: &str,
    notes: &str,
    decisions: &[FollowUpItem],
    directives: &[FollowUpItem],
    attendance: &std::collections::BTreeMap<String, String>,
    guests: &[String],
) -> rusqlite::Result<()> {
    let monev = overall_monev_status(decisions);
    conn.execute(
        "UPDATE agendas SET notes = ?2, decisions = ?3, directives = ?4, \
             attendance = ?5, guests = ?6, monev_status = ?7, \
             updated_at = datetime('now') \
         WHERE id = ?1",
        params![
            id,
            notes,
            encode_follow_ups(decisions),
            encode_follow_ups(directives),
            serde_json::to_string(attendance).unwrap_or_else(|_| "{}".to_string()),
            serde_json::to_string(guests).unwrap_or_else(|_| "[]".to_string()),
            monev.as_str(),
        ],
    )?;
    Ok(())
}

/// Replace the follow-up arrays (monev progress updates) and recompute the
/// row's global monev status.
pub fn set_follow_ups(
    conn: &Connection,
    id: &str,
    decisions: &[FollowUpItem],
    directives: &[FollowUpItem],
) -> rusqlite::Result<()> {
    let monev = overall_monev_status(decisions);
    conn.execute(
        "UPDATE agendas SET decisions = ?2, directives = ?3, monev_status = ?4, \
             updated_at = datetime('now') \
         WHERE id = ?1",
        params![
            id,
            encode_follow_ups(decisions),
            encode_follow_ups(directives),
            monev.as_str(),
        ],
    )?;
    Ok(())
}

/// Attachment slots addressable by upload/remove actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentField {
    ReviewDoc,
    ProposalNote,
    Presentation,
}

impl AttachmentField {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "review-doc" => Some(Self::ReviewDoc),
            "proposal-note" => Some(Self::ProposalNote),
            "presentation" => Some(Self::Presentation),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ReviewDoc => "review-doc",
            Self::ProposalNote => "proposal-note",
            Self::Presentation => "presentation",
        }
    }

    fn column(&self) -> &'static str {
        match self {
            Self::ReviewDoc => "review_doc_path",
            Self::ProposalNote => "proposal_note_path",
            Self::Presentation => "presentation_path",
        }
    }
}

/// Record a stored attachment path (empty string clears the slot), then
/// re-derive readiness.
pub fn set_attachment(
    conn: &Connection,
    id: &str,
    field: AttachmentField,
    path: &str,
) -> rusqlite::Result<()> {
    // column name comes from a fixed enum, never from user input
    conn.execute(
        &format!(
            "UPDATE agendas SET {} = ?2, updated_at = datetime('now') WHERE id = ?1",
            field.column()
        ),
        params![id, path],
    )?;
    rederive_readiness(conn, id)
}

pub fn add_support_doc(conn: &Connection, id: &str, path: &str) -> rusqlite::Result<()> {
    let agenda = match find_by_id(conn, id)? {
        Some(a) => a,
        None => return Ok(()),
    };
    let mut docs = agenda.support_docs();
    docs.push(path.to_string());
    write_support_docs(conn, id, &docs)
}

pub fn remove_support_doc(conn: &Connection, id: &str, path: &str) -> rusqlite::Result<()> {
    let agenda = match find_by_id(conn, id)? {
        Some(a) => a,
        None => return Ok(()),
    };
    let docs: Vec<String> = agenda.support_docs().into_iter().filter(|p| p != path).collect();
    write_support_docs(conn, id, &docs)
}

fn write_support_docs(conn: &Connection, id: &str, docs: &[String]) -> rusqlite::Result<()> {
    conn.execute(
        "UPDATE agendas SET support_doc_paths = ?2, updated_at = datetime('now') WHERE id = ?1",
        params![
            id,
            serde_json::to_string(docs).unwrap_or_else(|_| "[]".to_string())
        ],
    )?;
    Ok(())
}

/// Delete a row inside a transaction and return every storage path it
/// referenced, so the caller can remove the files after commit.
pub fn delete(conn: &mut Connection, id: &str) -> rusqlite::Result<Vec<String>> {
    let tx = conn.transaction()?;
    let agenda = tx
        .query_row(
            &format!("SELECT {AGENDA_COLUMNS} FROM agendas WHERE id = ?1"),
            params![id],
            row_to_agenda,
        )
        .optional()?;
    let paths = match agenda {
        Some(a) => {
            tx.execute("DELETE FROM agendas WHERE id = ?1", params![id])?;
            a.attachment_paths()
        }
        None => Vec::new(),
    };
    tx.commit()?;
    Ok(paths)
}

pub fn count(conn: &Connection) -> rusqlite::Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM agendas", [], |row| row.get(0))
}
