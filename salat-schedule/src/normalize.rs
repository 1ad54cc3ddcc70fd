//! Turning published `H:MM` strings into local instants.
//!
//! The source prints every time without an AM/PM marker. Morning events come
//! through as small hours (`02:21`), afternoon and evening ones on a 12-hour
//! clock (`9:35` for Maghrib). The evening set below is shifted by twelve
//! hours; `Noon` is shifted too unless it reads `11`.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, TimeZone};

use crate::error::TimeFormatError;
use crate::types::ScheduleEntry;

/// Labels always published on a 12-hour clock.
pub const EVENING_LABELS: [&str; 3] = ["Sunset", "Maghrib", "Midnight"];

const NOON: &str = "Noon";
const NOON_MORNING_HOUR: u32 = 11;

/// Hour and minute after the AM/PM shift. `hour` may exceed 23, in which case
/// the time lands on the following day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WallClock {
    pub hour: u32,
    pub minute: u32,
}

impl WallClock {
    pub fn on(self, date: NaiveDate) -> NaiveDateTime {
        date.and_time(NaiveTime::MIN)
            + TimeDelta::hours(i64::from(self.hour))
            + TimeDelta::minutes(i64::from(self.minute))
    }
}

pub fn shifts_to_evening(label: &str, hour: u32) -> bool {
    (label == NOON && hour != NOON_MORNING_HOUR) || EVENING_LABELS.contains(&label)
}

fn digits(s: &str) -> Option<u32> {
    if s.is_empty() || !s.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Parse `raw` and apply the evening shift for `label`.
pub fn wall_clock(label: &str, raw: &str) -> Result<WallClock, TimeFormatError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(TimeFormatError::Empty);
    }
    let (h, m) = raw
        .split_once(':')
        .ok_or_else(|| TimeFormatError::MissingSeparator(raw.to_string()))?;

    let hour = digits(h.trim())
        .filter(|h| *h <= 23)
        .ok_or_else(|| TimeFormatError::InvalidHour(h.to_string()))?;
    let minute = digits(m.trim())
        .filter(|m| *m <= 59)
        .ok_or_else(|| TimeFormatError::InvalidMinute(m.to_string()))?;

    let hour = if shifts_to_evening(label, hour) {
        hour + 12
    } else {
        hour
    };
    Ok(WallClock { hour, minute })
}

/// Resolve `raw` on `reference` in an arbitrary time zone.
///
/// Ambiguous local times (DST fold) take the earlier instant; times inside a
/// DST gap are rejected.
pub fn normalize_in<Tz: TimeZone>(
    label: &str,
    raw: &str,
    reference: NaiveDate,
    tz: &Tz,
) -> Result<DateTime<Tz>, TimeFormatError> {
    let naive = wall_clock(label, raw)?.on(reference);
    tz.from_local_datetime(&naive)
        .earliest()
        .ok_or_else(|| TimeFormatError::NonexistentLocalTime(naive.to_string()))
}

/// Build a [`ScheduleEntry`] in the system time zone. Unusable times are
/// logged and leave the entry unset; they never fail the schedule.
pub fn normalize(label: &str, raw: &str, reference: NaiveDate) -> ScheduleEntry {
    let time = match normalize_in(label, raw, reference, &Local) {
        Ok(t) => Some(t),
        Err(TimeFormatError::Empty) => {
            tracing::debug!(label, "normalize.unpublished_time");
            None
        }
        Err(err) => {
            tracing::warn!(label, raw, error=%err, "normalize.invalid_time");
            None
        }
    };
    ScheduleEntry {
        label: label.to_string(),
        raw: raw.to_string(),
        time,
    }
}
