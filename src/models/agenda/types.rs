use serde::{Deserialize, Serialize};

/// Workflow status of an agenda row. Transitions are one-directional in
/// intent (draft → ready → scheduled → completed/cancelled) but any action
/// may write any status directly; there is no enforcing state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgendaStatus {
    Draft,
    DapatDilanjutkan,
    Dijadwalkan,
    Ditunda,
    RapatSelesai,
    Dibatalkan,
}

impl AgendaStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::DapatDilanjutkan => "DAPAT_DILANJUTKAN",
            Self::Dijadwalkan => "DIJADWALKAN",
            Self::Ditunda => "DITUNDA",
            Self::RapatSelesai => "RAPAT_SELESAI",
            Self::Dibatalkan => "DIBATALKAN",
        }
    }

    /// Parse a stored status string. Rows written by earlier code paths may
    /// carry the English aliases, so those are accepted too.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "DRAFT" => Some(Self::Draft),
            "DAPAT_DILANJUTKAN" => Some(Self::DapatDilanjutkan),
            "DIJADWALKAN" => Some(Self::Dijadwalkan),
            "DITUNDA" => Some(Self::Ditunda),
            "RAPAT_SELESAI" | "COMPLETED" => Some(Self::RapatSelesai),
            "DIBATALKAN" | "CANCELLED" => Some(Self::Dibatalkan),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::DapatDilanjutkan => "Dapat Dilanjutkan",
            Self::Dijadwalkan => "Dijadwalkan",
            Self::Ditunda => "Ditunda",
            Self::RapatSelesai => "Rapat Selesai",
            Self::Dibatalkan => "Dibatalkan",
        }
    }

    pub const ALL: [AgendaStatus; 6] = [
        Self::Draft,
        Self::DapatDilanjutkan,
        Self::Dijadwalkan,
        Self::Ditunda,
        Self::RapatSelesai,
        Self::Dibatalkan,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MeetingType {
    Radir,
    Rakordir,
    KepdirSirkuler,
}

impl MeetingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Radir => "RADIR",
            Self::Rakordir => "RAKORDIR",
            Self::KepdirSirkuler => "KEPDIR_SIRKULER",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "RADIR" => Some(Self::Radir),
            "RAKORDIR" => Some(Self::Rakordir),
            "KEPDIR_SIRKULER" | "KEPDIR SIRKULER" => Some(Self::KepdirSirkuler),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Radir => "Rapat Direksi",
            Self::Rakordir => "Rapat Koordinasi Direksi",
            Self::KepdirSirkuler => "Keputusan Direksi Sirkuler",
        }
    }

    /// Storage bucket prefix for this meeting type's attachments.
    pub fn storage_prefix(&self) -> &'static str {
        match self {
            Self::Radir => "radir",
            Self::Rakordir => "rakordir",
            Self::KepdirSirkuler => "kepdir-sirkuler",
        }
    }

    pub const ALL: [MeetingType; 3] = [Self::Radir, Self::Rakordir, Self::KepdirSirkuler];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MonevStatus {
    OnProgress,
    Done,
}

impl MonevStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OnProgress => "ON_PROGRESS",
            Self::Done => "DONE",
        }
    }
}

/// One agenda row, as stored. JSON sub-fields stay raw here and are decoded
/// exactly once through the accessors below; downstream code never touches
/// the raw strings.
#[derive(Debug, Clone, Default)]
pub struct Agenda {
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: String,
    pub meeting_type: String,

    pub execution_date: String,
    pub start_time: String,
    pub end_time: String,
    pub method: String,
    pub location: String,
    pub meeting_link: String,
    pub meeting_number: Option<i64>,
    pub meeting_year: Option<i64>,

    pub notes: String,
    pub decisions: String,
    pub directives: String,
    pub attendance: String,
    pub guests: String,

    pub review_doc_path: String,
    pub review_doc_required: bool,
    pub proposal_note_path: String,
    pub proposal_note_required: bool,
    pub presentation_path: String,
    pub presentation_required: bool,
    pub support_doc_paths: String,

    pub monev_status: String,

    pub created_by: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl Agenda {
    pub fn status_enum(&self) -> Option<AgendaStatus> {
        AgendaStatus::parse(&self.status)
    }

    pub fn meeting_type_enum(&self) -> Option<MeetingType> {
        MeetingType::parse(&self.meeting_type)
    }

    pub fn is_completed(&self) -> bool {
        self.status_enum() == Some(AgendaStatus::RapatSelesai)
    }

    pub fn is_cancelled(&self) -> bool {
        self.status_enum() == Some(AgendaStatus::Dibatalkan)
    }

    pub fn decision_items(&self) -> Vec<super::FollowUpItem> {
        super::decode_follow_ups(&self.decisions)
    }

    pub fn directive_items(&self) -> Vec<super::FollowUpItem> {
        super::decode_follow_ups(&self.directives)
    }

    pub fn attendance_map(&self) -> std::collections::BTreeMap<String, String> {
        super::decode_attendance(&self.attendance)
    }

    pub fn guest_list(&self) -> Vec<String> {
        super::decode_string_array(&self.guests)
    }

    pub fn support_docs(&self) -> Vec<String> {
        super::decode_string_array(&self.support_doc_paths)
    }

    /// All storage paths referenced by this row, for cascade removal.
    pub fn attachment_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = [
            &self.review_doc_path,
            &self.proposal_note_path,
            &self.presentation_path,
        ]
        .into_iter()
        .filter(|p| !p.is_empty())
        .cloned()
        .collect();
        paths.extend(self.support_docs());
        paths.extend(
            self.decision_items()
                .into_iter()
                .chain(self.directive_items())
                .filter_map(|item| {
                    if item.evidence_path.is_empty() {
                        None
                    } else {
                        Some(item.evidence_path)
                    }
                }),
        );
        paths
    }

    /// Derived pre-schedule readiness: an agenda can leave DRAFT once every
    /// required attachment slot is filled or explicitly flagged not-required.
    pub fn readiness_status(&self) -> AgendaStatus {
        let slots = [
            (&self.review_doc_path, self.review_doc_required),
            (&self.proposal_note_path, self.proposal_note_required),
            (&self.presentation_path, self.presentation_required),
        ];
        let ready = slots
            .iter()
            .all(|(path, required)| !required || !path.is_empty());
        if ready {
            AgendaStatus::DapatDilanjutkan
        } else {
            AgendaStatus::Draft
        }
    }
}
