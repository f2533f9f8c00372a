//! Dashboard statistics: rolls a date-filtered slice of the agenda store up
//! into per-type status counts, director attendance, and monev follow-up
//! totals.
//!
//! Failure policy: only the underlying fetch error propagates. A malformed
//! row (unknown status string, undecodable JSON sub-field) contributes
//! nothing to the statistics and never aborts the aggregation.

use chrono::NaiveDate;
use rusqlite::Connection;
use std::collections::BTreeMap;

use super::agenda::{
    self, Agenda, AgendaStatus, MeetingType, is_done_status, is_in_progress_status,
};

#[derive(Debug, Clone)]
pub struct StatusCount {
    pub status: AgendaStatus,
    pub count: i64,
}

/// Per-meeting-type counts bucketed by workflow status.
#[derive(Debug, Clone)]
pub struct TypeStatusCounts {
    pub meeting_type: MeetingType,
    pub counts: Vec<StatusCount>,
    pub total: i64,
}

/// Attendance recap for one director over completed RADIR meetings.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectorAttendance {
    pub name: String,
    pub present: i64,
    pub total: i64,
    pub percentage: f64,
}

/// Follow-up progress totals for one meeting type.
#[derive(Debug, Clone)]
pub struct TypeMonevTotals {
    pub meeting_type: MeetingType,
    pub in_progress: i64,
    pub done: i64,
}

impl TypeMonevTotals {
    pub fn total(&self) -> i64 {
        self.in_progress + self.done
    }
}

/// One agenda row in the dashboard's flat list view.
#[derive(Debug, Clone)]
pub struct AgendaOverviewRow {
    pub id: String,
    pub title: String,
    pub meeting_type: String,
    pub status: String,
    pub execution_date: String,
    pub monev_summary: String,
    pub updated_at: String,
}

#[derive(Debug, Clone)]
pub struct DashboardStats {
    pub by_type: Vec<TypeStatusCounts>,
    pub attendance: Vec<DirectorAttendance>,
    pub monev: Vec<TypeMonevTotals>,
    pub rows: Vec<AgendaOverviewRow>,
}

/// Aggregate all agendas whose `updated_at` falls in the inclusive date
/// range. Bounds are normalized to start and end of day.
pub fn compute(conn: &Connection, from: NaiveDate, to: NaiveDate) -> rusqlite::Result<DashboardStats> {
    let from_ts = format!("{} 00:00:00", from.format("%Y-%m-%d"));
    let to_ts = format!("{} 23:59:59", to.format("%Y-%m-%d"));
    let rows = agenda::list_updated_between(conn, &from_ts, &to_ts)?;
    Ok(aggregate(&rows))
}

/// Pure aggregation over an already-fetched slice.
pub fn aggregate(rows: &[Agenda]) -> DashboardStats {
    DashboardStats {
        by_type: status_counts(rows),
        attendance: attendance_recap(rows),
        monev: monev_totals(rows),
        rows: overview_rows(rows),
    }
}

fn status_counts(rows: &[Agenda]) -> Vec<TypeStatusCounts> {
    MeetingType::ALL
        .iter()
        .map(|&meeting_type| {
            let mut counts: Vec<StatusCount> = AgendaStatus::ALL
                .iter()
                .map(|&status| StatusCount { status, count: 0 })
                .collect();
            let mut total = 0;
            for row in rows {
                if row.meeting_type_enum() != Some(meeting_type) {
                    continue;
                }
                // rows with an unparseable status contribute nothing
                let Some(status) = row.status_enum() else {
                    continue;
                };
                if let Some(c) = counts.iter_mut().find(|c| c.status == status) {
                    c.count += 1;
                    total += 1;
                }
            }
            TypeStatusCounts {
                meeting_type,
                counts,
                total,
            }
        })
        .collect()
}

/// Attendance counts only over completed RADIR meetings with decodable,
/// non-empty attendance data. A director's total grows for the recorded
/// statuses Hadir, Tidak Hadir and Kuasa; Hadir and Kuasa count as present.
fn attendance_recap(rows: &[Agenda]) -> Vec<DirectorAttendance> {
    let mut per_director: BTreeMap<String, (i64, i64)> = BTreeMap::new();

    for row in rows {
        if !row.is_completed() || row.meeting_type_enum() != Some(MeetingType::Radir) {
            continue;
        }
        for (name, status) in row.attendance_map() {
            let (present, total) = match status.trim() {
                "Hadir" | "Kuasa" => (1, 1),
                "Tidak Hadir" => (0, 1),
                _ => continue,
            };
            let entry = per_director.entry(name).or_insert((0, 0));
            entry.0 += present;
            entry.1 += total;
        }
    }

    per_director
        .into_iter()
        .map(|(name, (present, total))| DirectorAttendance {
            name,
            present,
            total,
            percentage: if total > 0 {
                present as f64 * 100.0 / total as f64
            } else {
                0.0
            },
        })
        .collect()
}

/// Follow-up totals over completed meetings, classifying every decision and
/// directive item's status string. Cancelled rows never contribute.
fn monev_totals(rows: &[Agenda]) -> Vec<TypeMonevTotals> {
    MeetingType::ALL
        .iter()
        .map(|&meeting_type| {
            let mut totals = TypeMonevTotals {
                meeting_type,
                in_progress: 0,
                done: 0,
            };
            for row in rows {
                if row.meeting_type_enum() != Some(meeting_type) || !row.is_completed() {
                    continue;
                }
                for item in row.decision_items().iter().chain(row.directive_items().iter()) {
                    if is_done_status(&item.status) {
                        totals.done += 1;
                    } else if is_in_progress_status(&item.status) {
                        totals.in_progress += 1;
                    }
                }
            }
            totals
        })
        .collect()
}

fn overview_rows(rows: &[Agenda]) -> Vec<AgendaOverviewRow> {
    rows.iter()
        .map(|row| AgendaOverviewRow {
            id: row.id.clone(),
            title: row.title.clone(),
            meeting_type: row
                .meeting_type_enum()
                .map(|t| t.label().to_string())
                .unwrap_or_else(|| row.meeting_type.clone()),
            status: row
                .status_enum()
                .map(|s| s.label().to_string())
                .unwrap_or_else(|| row.status.clone()),
            execution_date: row.execution_date.clone(),
            monev_summary: monev_summary(row),
            updated_at: row.updated_at.clone(),
        })
        .collect()
}

/// Human-readable follow-up summary for the list view.
pub fn monev_summary(row: &Agenda) -> String {
    if row.is_cancelled() {
        return "Dibatalkan".to_string();
    }
    if !row.is_completed() {
        return "Belum rapat".to_string();
    }
    let items = row.decision_items();
    if items.is_empty() {
        return "Belum ada keputusan".to_string();
    }
    let done = items.iter().filter(|i| is_done_status(&i.status)).count();
    format!("{}/{} tindak lanjut selesai", done, items.len())
}
