use chrono::{DateTime, Local};
use url::Url;

use crate::error::ScheduleError;
use crate::extract::ScheduleParser;
use crate::fetch::PageFetcher;
use crate::types::PrayerSchedule;

/// Fetch, extract and normalize once, with `now` as the reference day.
pub async fn fetch_schedule(
    fetcher: &dyn PageFetcher,
    parser: &ScheduleParser,
    url: &Url,
    now: DateTime<Local>,
) -> Result<PrayerSchedule, ScheduleError> {
    let page = fetcher.fetch(url).await?;
    let schedule = parser.parse(&page, now.date_naive())?;
    let unset = schedule.iter().filter(|e| e.is_unset()).count();
    tracing::info!(
        url=%page.url,
        entries=schedule.len(),
        unset,
        "pipeline.schedule_ready"
    );
    Ok(schedule)
}
