//! Read-side lookups for displaying schedules.

use tracing::debug;

use crate::models::{DayRecord, ScheduleDocument};
use crate::store::Collection;
use crate::{Error, Result};

/// Fetch a schedule by name.
pub async fn fetch_schedule<S>(schedules: &S, name: &str) -> Result<ScheduleDocument>
where
    S: Collection<ScheduleDocument> + ?Sized,
{
    schedules
        .find_one(name)
        .await?
        .ok_or_else(|| Error::NotFound(format!("schedule '{}'", name)))
}

/// Fetch the schedule assigned to a date given as an `M-D-YY` key.
pub async fn fetch_schedule_for_date<D, S>(days: &D, schedules: &S, date: &str) -> Result<ScheduleDocument>
where
    D: Collection<DayRecord> + ?Sized,
    S: Collection<ScheduleDocument> + ?Sized,
{
    let day = days
        .find_one(date)
        .await?
        .ok_or_else(|| Error::NotFound(format!("no schedule assigned to {}", date)))?;

    debug!("{} follows schedule {}", date, day.schedule);
    fetch_schedule(schedules, &day.schedule).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ScheduleEvent;
    use crate::store::MemoryCollection;

    fn schedule(name: &str) -> ScheduleDocument {
        ScheduleDocument {
            name: name.to_string(),
            friendly_name: name.replace(" - US", ""),
            schedule: vec![ScheduleEvent {
                name: "Block A".to_string(),
                code: "A".to_string(),
                start_time: "8:00 AM".to_string(),
                end_time: "8:50 AM".to_string(),
            }],
        }
    }

    #[tokio::test]
    async fn test_fetch_schedule() {
        let schedules: MemoryCollection<ScheduleDocument> = MemoryCollection::new();
        schedules.insert_one(&schedule("US Day 1")).await.unwrap();

        let found = fetch_schedule(&schedules, "US Day 1").await.unwrap();
        assert_eq!(found.schedule.len(), 1);

        let missing = fetch_schedule(&schedules, "US Day 7").await;
        assert!(matches!(missing, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_fetch_schedule_for_date() {
        let days: MemoryCollection<DayRecord> = MemoryCollection::new();
        let schedules: MemoryCollection<ScheduleDocument> = MemoryCollection::new();
        days.insert_one(&DayRecord {
            schedule: "Late Start - US".to_string(),
            date: "9-5-24".to_string(),
        })
        .await
        .unwrap();
        schedules.insert_one(&schedule("Late Start - US")).await.unwrap();

        let found = fetch_schedule_for_date(&days, &schedules, "9-5-24").await.unwrap();
        assert_eq!(found.friendly_name, "Late Start");

        let missing = fetch_schedule_for_date(&days, &schedules, "9-6-24").await;
        assert!(matches!(missing, Err(Error::NotFound(_))));
    }
}
