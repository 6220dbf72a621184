//! Row-to-document mapping.

use regex::Regex;
use std::sync::OnceLock;

use crate::models::{DayRecord, DayRow, ScheduleEvent, ScheduleRow};
use crate::normalize::{extract_identifier, format_internal_date, parse_external_date, strip_us_suffix};
use crate::{Error, Result};

/// Captions containing this marker bound a semester and assign no schedule.
const SEMESTER_MARKER: &str = "Semester";

fn block_code_re() -> &'static Regex {
    static BLOCK_CODE_RE: OnceLock<Regex> = OnceLock::new();
    BLOCK_CODE_RE.get_or_init(|| Regex::new(r"Block ([A-Z])").expect("valid block code regex"))
}

/// Map a days CSV row to a [`DayRecord`].
///
/// Returns `Ok(None)` for semester boundary markers.
pub fn map_day_row(row: &DayRow) -> Result<Option<DayRecord>> {
    if row.event_caption.contains(SEMESTER_MARKER) {
        return Ok(None);
    }

    let schedule = extract_identifier(&row.event_caption);
    if schedule.is_empty() {
        return Err(Error::MalformedInput(format!(
            "caption '{}' names no schedule",
            row.event_caption
        )));
    }

    let date = parse_external_date(&row.event_date)?;

    Ok(Some(DayRecord {
        schedule: schedule.to_string(),
        date: format_internal_date(&date),
    }))
}

/// Map a schedules CSV row to the [`ScheduleEvent`] it describes.
pub fn map_schedule_event_row(row: &ScheduleRow) -> ScheduleEvent {
    let code = block_code_re()
        .captures(&row.description)
        .and_then(|caps| caps.get(1))
        .map_or_else(|| row.description.clone(), |m| m.as_str().to_string());

    ScheduleEvent {
        name: strip_us_suffix(&row.description),
        code,
        start_time: row.start_time.to_uppercase(),
        end_time: row.end_time.to_uppercase(),
    }
}
