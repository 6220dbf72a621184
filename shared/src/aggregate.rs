//! Grouping of schedule rows into named schedule documents.

use indexmap::IndexMap;
use regex::Regex;
use std::sync::OnceLock;

use crate::mapper::map_schedule_event_row;
use crate::models::{ScheduleDocument, ScheduleEvent, ScheduleRow, ORPHAN};
use crate::normalize::{extract_cycle_identifier, strip_us_suffix};
use crate::{Error, Result};

/// Day field value meaning "no cycle day, use the block schedule label".
const NO_CYCLE_DAY: &str = "-";

fn clock_re() -> &'static Regex {
    static CLOCK_RE: OnceLock<Regex> = OnceLock::new();
    CLOCK_RE.get_or_init(|| {
        Regex::new(r"^\s*(\d{1,2}):(\d{2})\s*([AP]M)\s*$").expect("valid clock time regex")
    })
}

/// Wall-clock time of day, ordered by (hour, minute) on a 24-hour clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ClockTime {
    pub hour: u32,
    pub minute: u32,
}

impl ClockTime {
    /// Parse `H:MM AM` / `H:MM PM` (case-insensitive).
    ///
    /// 12 AM is hour 0, 12 PM stays 12, other PM hours gain 12.
    pub fn parse(s: &str) -> Option<Self> {
        let upper = s.to_uppercase();
        let caps = clock_re().captures(&upper)?;

        let hour: u32 = caps[1].parse().ok()?;
        let minute: u32 = caps[2].parse().ok()?;
        if !(1..=12).contains(&hour) || minute > 59 {
            return None;
        }

        let hour = match (&caps[3], hour) {
            ("AM", 12) => 0,
            ("AM", h) => h,
            ("PM", 12) => 12,
            (_, h) => h + 12,
        };

        Some(Self { hour, minute })
    }
}

/// Identifier of the schedule a row belongs to.
///
/// A `-` day without a block schedule label names no schedule at all and is
/// rejected rather than reported as an orphan.
pub fn schedule_identifier(row: &ScheduleRow) -> Result<String> {
    if row.day != NO_CYCLE_DAY {
        return Ok(extract_cycle_identifier(&row.day));
    }

    if row.block_schedule.is_empty() {
        return Err(Error::MalformedInput(format!(
            "'{}' has no cycle day and no block schedule",
            row.description
        )));
    }
    Ok(row.block_schedule.clone())
}

/// Rows collected under one identifier.
#[derive(Debug, Clone)]
pub struct ScheduleGroup {
    pub document: ScheduleDocument,
    /// Source rows in upload order
    pub rows: Vec<ScheduleRow>,
}

/// Result of grouping an upload, keyed by identifier in first-seen order.
#[derive(Debug, Default)]
pub struct Aggregation {
    groups: IndexMap<String, ScheduleGroup>,
}

impl Aggregation {
    pub fn get(&self, identifier: &str) -> Option<&ScheduleGroup> {
        self.groups.get(identifier)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Documents eligible for persistence (every group except [`ORPHAN`]).
    pub fn documents(&self) -> impl Iterator<Item = &ScheduleDocument> {
        self.groups
            .iter()
            .filter(|(id, _)| id.as_str() != ORPHAN)
            .map(|(_, group)| &group.document)
    }

    /// Split into persistable documents and orphan rows.
    pub fn into_parts(mut self) -> (Vec<ScheduleDocument>, Vec<ScheduleRow>) {
        let orphans = self
            .groups
            .shift_remove(ORPHAN)
            .map(|group| group.rows)
            .unwrap_or_default();

        let documents = self.groups.into_values().map(|group| group.document).collect();
        (documents, orphans)
    }
}

struct Accumulator {
    name: String,
    events: Vec<(Option<ClockTime>, ScheduleEvent)>,
    rows: Vec<ScheduleRow>,
}

impl Accumulator {
    fn finish(mut self) -> ScheduleGroup {
        // Stable sort: equal start times keep upload order.
        self.events.sort_by_key(|(start, _)| *start);

        ScheduleGroup {
            document: ScheduleDocument {
                friendly_name: strip_us_suffix(&self.name),
                name: self.name,
                schedule: self.events.into_iter().map(|(_, event)| event).collect(),
            },
            rows: self.rows,
        }
    }
}

/// Group schedule rows into documents and sort each document's events by start time.
///
/// Orphan rows are grouped but never time-parsed. Any other row whose start
/// time is not `H:MM AM/PM` fails the whole upload.
pub fn aggregate_schedules(rows: impl IntoIterator<Item = ScheduleRow>) -> Result<Aggregation> {
    let mut accumulators: IndexMap<String, Accumulator> = IndexMap::new();

    for row in rows {
        let identifier = schedule_identifier(&row)?;

        let start = if identifier == ORPHAN {
            None
        } else {
            let parsed = ClockTime::parse(&row.start_time).ok_or_else(|| {
                Error::MalformedInput(format!(
                    "start time '{}' of '{}' is not H:MM AM/PM",
                    row.start_time, row.description
                ))
            })?;
            Some(parsed)
        };

        let event = map_schedule_event_row(&row);
        let accumulator = accumulators
            .entry(identifier)
            .or_insert_with_key(|name| Accumulator {
                name: name.clone(),
                events: Vec::new(),
                rows: Vec::new(),
            });
        accumulator.events.push((start, event));
        accumulator.rows.push(row);
    }

    Ok(Aggregation {
        groups: accumulators
            .into_iter()
            .map(|(id, accumulator)| (id, accumulator.finish()))
            .collect(),
    })
}
