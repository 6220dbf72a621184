//! Shared data models.

use serde::{Deserialize, Serialize};

/// Sentinel identifier for schedule rows that cannot be assigned to a schedule.
pub const ORPHAN: &str = "ORPHAN";

/// Explanation attached to every orphan warning returned to the uploader.
pub const ORPHAN_EXPLANATION: &str =
    "This row's Day column has no day number, so it belongs to no schedule and was not saved.";

/// Schedule assigned to one calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayRecord {
    /// Schedule identifier, e.g. `US Day 2` or `X Day - US`
    pub schedule: String,
    /// Internal date key in `M-D-YY` form
    pub date: String,
}

/// A named bell schedule with its events in chronological order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleDocument {
    pub name: String,
    pub friendly_name: String,
    pub schedule: Vec<ScheduleEvent>,
}

/// One period of a schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEvent {
    pub name: String,
    /// Block letter when the description names one, otherwise the full description
    pub code: String,
    pub start_time: String,
    pub end_time: String,
}

/// Raw row of a days CSV export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayRow {
    #[serde(rename = "Event Date")]
    pub event_date: String,
    #[serde(rename = "Event Caption")]
    pub event_caption: String,
    #[serde(rename = "Event Description", default)]
    pub event_description: Option<String>,
}

/// Raw row of a schedules CSV export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRow {
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Start Time")]
    pub start_time: String,
    #[serde(rename = "End Time")]
    pub end_time: String,
    #[serde(rename = "Block Schedule")]
    pub block_schedule: String,
    #[serde(rename = "Day")]
    pub day: String,
}

/// Orphan row reported back to the uploader.
#[derive(Debug, Clone, Serialize)]
pub struct UploadWarning {
    pub row: ScheduleRow,
    pub message: &'static str,
}

impl From<ScheduleRow> for UploadWarning {
    fn from(row: ScheduleRow) -> Self {
        Self {
            row,
            message: ORPHAN_EXPLANATION,
        }
    }
}

/// Upload response payload.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    /// Documents stored for the first time
    pub saved: usize,
    /// Documents that replaced an existing one with the same key
    pub updated: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<UploadWarning>,
}
