//! Ingestion of uploaded CSV exports.

use serde::de::DeserializeOwned;
use tracing::{info, warn};

use crate::aggregate::aggregate_schedules;
use crate::drain::{drain, DrainProgress, DrainSummary};
use crate::mapper::map_day_row;
use crate::models::{DayRecord, DayRow, ScheduleDocument, ScheduleRow};
use crate::store::Collection;
use crate::{Error, Result};

/// Outcome of a schedules upload.
#[derive(Debug)]
pub struct SchedulesIngest {
    pub summary: DrainSummary,
    /// Rows that could not be assigned to a schedule and were not saved
    pub orphans: Vec<ScheduleRow>,
}

/// Parse CSV text whose first row names the columns. Blank lines are skipped.
pub fn parse_csv<T: DeserializeOwned>(text: &str) -> Result<Vec<T>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(text.as_bytes());

    if reader.headers()?.iter().all(|h| h.is_empty()) {
        return Err(Error::MalformedInput("missing header row".to_string()));
    }

    let mut rows = Vec::new();
    for result in reader.deserialize() {
        let row: T = result?;
        rows.push(row);
    }
    Ok(rows)
}

/// Ingest a days CSV export, upserting one [`DayRecord`] per date.
pub async fn ingest_days<C, P>(days: &C, csv_text: &str, progress: P) -> Result<DrainSummary>
where
    C: Collection<DayRecord> + ?Sized,
    P: FnMut(&DrainProgress) + Send,
{
    let rows: Vec<DayRow> = parse_csv(csv_text)?;
    let row_count = rows.len();

    let mut records = Vec::with_capacity(row_count);
    for row in &rows {
        if let Some(record) = map_day_row(row)? {
            records.push(record);
        }
    }

    info!(
        "Parsed {} day rows, {} assign a schedule",
        row_count,
        records.len()
    );

    drain(days, records, progress).await
}

/// Ingest a schedules CSV export, upserting one [`ScheduleDocument`] per schedule name.
///
/// Rows that belong to no schedule are returned instead of saved.
pub async fn ingest_schedules<C, P>(schedules: &C, csv_text: &str, progress: P) -> Result<SchedulesIngest>
where
    C: Collection<ScheduleDocument> + ?Sized,
    P: FnMut(&DrainProgress) + Send,
{
    let rows: Vec<ScheduleRow> = parse_csv(csv_text)?;
    let row_count = rows.len();

    let (documents, orphans) = aggregate_schedules(rows)?.into_parts();

    info!(
        "Parsed {} schedule rows into {} schedules",
        row_count,
        documents.len()
    );
    if !orphans.is_empty() {
        warn!("{} schedule rows could not be assigned to a schedule", orphans.len());
    }

    let summary = drain(schedules, documents, progress).await?;
    Ok(SchedulesIngest { summary, orphans })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ORPHAN;
    use crate::store::{MemoryCollection, StoreError};

    const DAYS_CSV: &str = "\
Event Date,Event Caption,Event Description
08/26/24,Semester 1 Begins,First day
9/5/24,US Day 2,

09/06/24,US Day 3 (Late Start - US),Delayed opening
";

    const SCHEDULES_CSV: &str = "\
Description,End Time,Start Time,Block Schedule,Day
Block B - US,9:50 am,9:00 am,-,US D1
Block A - US,8:50 am,8:00 am,-,US D1
Lunch - US,12:40 pm,12:00 pm,-,US D1
Block A - US,10:50 am,10:00 am,Late Start - US,-
Community Time,2:00 pm,1:15 pm,-,TBD
Block C - US,8:50 am,8:00 am,-,US D2
";

    #[test]
    fn test_parse_csv_requires_header() {
        let result: Result<Vec<DayRow>> = parse_csv("");
        assert!(matches!(result, Err(Error::MalformedInput(_))));
    }

    #[test]
    fn test_parse_csv_missing_column() {
        let result: Result<Vec<DayRow>> = parse_csv("Event Date,Other\n9/5/24,x\n");
        assert!(matches!(result, Err(Error::Csv(_))));
    }

    #[test]
    fn test_parse_csv_ragged_row() {
        let result: Result<Vec<DayRow>> =
            parse_csv("Event Date,Event Caption\n9/5/24,US Day 2,extra\n");
        assert!(matches!(result, Err(Error::Csv(_))));
    }

    #[test]
    fn test_parse_csv_skips_blank_lines() {
        let rows: Vec<DayRow> = parse_csv(DAYS_CSV).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].event_caption, "US Day 2");
    }

    #[tokio::test]
    async fn test_ingest_days() {
        let days: MemoryCollection<DayRecord> = MemoryCollection::new();
        let summary = ingest_days(&days, DAYS_CSV, |_| {}).await.unwrap();

        assert_eq!(summary, DrainSummary { inserted: 2, replaced: 0 });
        assert_eq!(
            days.get("9-5-24"),
            Some(DayRecord {
                schedule: "US Day 2".to_string(),
                date: "9-5-24".to_string(),
            })
        );
        assert_eq!(days.get("9-6-24").unwrap().schedule, "Late Start - US");
        assert!(days.get("8-26-24").is_none());
    }

    #[tokio::test]
    async fn test_ingest_days_twice_last_upload_wins() {
        let days: MemoryCollection<DayRecord> = MemoryCollection::new();
        ingest_days(&days, "Event Date,Event Caption\n9/5/24,US Day 2\n", |_| {})
            .await
            .unwrap();
        let id = days.id_of("9-5-24");

        let summary = ingest_days(&days, "Event Date,Event Caption\n09/05/24,US Day 6\n", |_| {})
            .await
            .unwrap();

        assert_eq!(summary, DrainSummary { inserted: 0, replaced: 1 });
        assert_eq!(days.len(), 1);
        assert_eq!(days.get("9-5-24").unwrap().schedule, "US Day 6");
        assert_eq!(days.id_of("9-5-24"), id);
    }

    #[tokio::test]
    async fn test_ingest_days_rejects_bad_date() {
        let days: MemoryCollection<DayRecord> = MemoryCollection::new();
        let result = ingest_days(&days, "Event Date,Event Caption\nsoon,US Day 2\n", |_| {}).await;
        assert!(matches!(result, Err(Error::MalformedInput(_))));
        assert!(days.is_empty());
    }

    #[tokio::test]
    async fn test_ingest_schedules() {
        let schedules: MemoryCollection<ScheduleDocument> = MemoryCollection::new();
        let result = ingest_schedules(&schedules, SCHEDULES_CSV, |_| {}).await.unwrap();

        assert_eq!(result.summary, DrainSummary { inserted: 3, replaced: 0 });
        assert_eq!(schedules.len(), 3);
        assert!(schedules.get(ORPHAN).is_none());

        let day_one = schedules.get("US Day 1").unwrap();
        assert_eq!(day_one.friendly_name, "US Day 1");
        let codes: Vec<&str> = day_one.schedule.iter().map(|e| e.code.as_str()).collect();
        assert_eq!(codes, vec!["A", "B", "Lunch - US"]);
        assert_eq!(day_one.schedule[0].start_time, "8:00 AM");
        assert_eq!(day_one.schedule[2].name, "Lunch");

        let late_start = schedules.get("Late Start - US").unwrap();
        assert_eq!(late_start.friendly_name, "Late Start");
    }

    #[tokio::test]
    async fn test_ingest_schedules_reports_orphans() {
        let schedules: MemoryCollection<ScheduleDocument> = MemoryCollection::new();
        let result = ingest_schedules(&schedules, SCHEDULES_CSV, |_| {}).await.unwrap();

        assert_eq!(result.orphans.len(), 1);
        assert_eq!(result.orphans[0].description, "Community Time");
        assert_eq!(result.orphans[0].day, "TBD");
    }

    #[tokio::test]
    async fn test_ingest_schedules_replaces_whole_document() {
        let schedules: MemoryCollection<ScheduleDocument> = MemoryCollection::new();
        ingest_schedules(&schedules, SCHEDULES_CSV, |_| {}).await.unwrap();

        let reupload = "\
Description,End Time,Start Time,Block Schedule,Day
Block D - US,9:50 am,9:00 am,-,US D1
";
        let result = ingest_schedules(&schedules, reupload, |_| {}).await.unwrap();

        assert_eq!(result.summary, DrainSummary { inserted: 0, replaced: 1 });
        assert!(result.orphans.is_empty());
        let day_one = schedules.get("US Day 1").unwrap();
        assert_eq!(day_one.schedule.len(), 1);
        assert_eq!(day_one.schedule[0].code, "D");
    }

    #[tokio::test]
    async fn test_ingest_schedules_propagates_store_failure() {
        let schedules: MemoryCollection<ScheduleDocument> = MemoryCollection::new();
        schedules.fail_on_key("US Day 2");

        let result = ingest_schedules(&schedules, SCHEDULES_CSV, |_| {}).await;
        assert!(matches!(result, Err(Error::Store(StoreError::Backend(_)))));
    }

    #[tokio::test]
    async fn test_progress_reaches_total() {
        let days: MemoryCollection<DayRecord> = MemoryCollection::new();
        let mut last = None;
        ingest_days(&days, DAYS_CSV, |p: &DrainProgress| last = Some(p.clone()))
            .await
            .unwrap();

        let last = last.unwrap();
        assert_eq!(last.completed, 2);
        assert_eq!(last.total, 2);
    }
}
