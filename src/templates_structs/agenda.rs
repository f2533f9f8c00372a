use askama::Template;

use crate::models::agenda::{Agenda, FollowUpItem};
use super::PageContext;

/// One agenda in the list view, with Option fields already flattened for
/// display.
pub struct AgendaRowView {
    pub id: String,
    pub title: String,
    pub meeting_type: String,
    pub status: String,
    pub execution_date: String,
    pub session_label: String,
    pub monev_summary: String,
}

#[derive(Template)]
#[template(path = "agendas/list.html")]
pub struct AgendaListTemplate {
    pub ctx: PageContext,
    pub agendas: Vec<AgendaRowView>,
    pub status_filter: String,
    pub type_filter: String,
}

/// Shared by the new-proposal and edit forms; `agenda` is a default row for
/// the new form.
#[derive(Template)]
#[template(path = "agendas/form.html")]
pub struct AgendaFormTemplate {
    pub ctx: PageContext,
    pub agenda: Agenda,
    pub is_new: bool,
}

/// One attachment slot on the detail page: field key, stored path and a
/// signed download URL (both empty when the slot is unfilled).
pub struct AttachmentView {
    pub field: String,
    pub label: String,
    pub path: String,
    pub url: String,
    pub required: bool,
}

#[derive(Template)]
#[template(path = "agendas/detail.html")]
pub struct AgendaDetailTemplate {
    pub ctx: PageContext,
    pub agenda: Agenda,
    pub status_label: String,
    pub type_label: String,
    pub session_label: String,
    /// Link to the session's minutes editor; empty until scheduled.
    pub minutes_url: String,
    pub attachments: Vec<AttachmentView>,
    pub support_docs: Vec<AttachmentView>,
    pub decisions: Vec<FollowUpItem>,
    pub directives: Vec<FollowUpItem>,
    pub attendance: Vec<(String, String)>,
    pub guests: Vec<String>,
    pub monev_summary: String,
}

/// One agenda inside the bulk minutes editor.
pub struct MinutesAgendaView {
    pub agenda: Agenda,
    pub decisions: Vec<FollowUpItem>,
    pub directives: Vec<FollowUpItem>,
}

#[derive(Template)]
#[template(path = "agendas/minutes.html")]
pub struct MinutesTemplate {
    pub ctx: PageContext,
    pub meeting_year: i64,
    pub meeting_number: i64,
    pub agendas: Vec<MinutesAgendaView>,
    pub directors: Vec<String>,
    pub attendance: Vec<(String, String)>,
}

/// One follow-up item on the monev board. `evidence_url` is a signed
/// download link, empty when no evidence has been uploaded.
pub struct MonevItemView {
    pub description: String,
    pub pic: String,
    pub due_date: String,
    pub status: String,
    pub evidence_url: String,
}

/// One completed agenda in the monev board with its decoded follow-ups.
pub struct MonevEntryView {
    pub id: String,
    pub title: String,
    pub meeting_type: String,
    pub session_label: String,
    pub monev_status: String,
    pub summary: String,
    pub decisions: Vec<MonevItemView>,
    pub directives: Vec<MonevItemView>,
}

#[derive(Template)]
#[template(path = "agendas/monev.html")]
pub struct MonevTemplate {
    pub ctx: PageContext,
    pub entries: Vec<MonevEntryView>,
}
