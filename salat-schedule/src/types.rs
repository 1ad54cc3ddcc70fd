use chrono::{DateTime, Local, NaiveDate};
use serde::Serialize;
use url::Url;

use crate::normalize;

/// Response body of one fetch; dropped once parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPage {
    pub url: Url,
    pub body: String,
}

/// One named event of the day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleEntry {
    /// Letters only, e.g. `Maghrib`.
    pub label: String,
    /// Time exactly as published (`9:35`), empty when the site left it out.
    pub raw: String,
    /// Local instant on the reference day; `None` when `raw` was unusable.
    pub time: Option<DateTime<Local>>,
}

impl ScheduleEntry {
    pub fn is_unset(&self) -> bool {
        self.time.is_none()
    }
}

/// `(label, raw time)` pairs in document order, labels unique.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RawSchedule {
    entries: Vec<(String, String)>,
}

impl RawSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite. A repeated label keeps the slot of its first
    /// appearance and takes the newest value.
    pub fn insert(&mut self, label: impl Into<String>, raw: impl Into<String>) {
        let label = label.into();
        let raw = raw.into();
        match self.entries.iter_mut().find(|(l, _)| *l == label) {
            Some(slot) => slot.1 = raw,
            None => self.entries.push((label, raw)),
        }
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, raw)| raw.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(l, r)| (l.as_str(), r.as_str()))
    }

    pub fn labels(&self) -> Vec<&str> {
        self.entries.iter().map(|(l, _)| l.as_str()).collect()
    }

    /// Resolve every raw time against `reference`, in the local time zone.
    pub fn normalize(&self, reference: NaiveDate) -> PrayerSchedule {
        let mut schedule = PrayerSchedule::new();
        for (label, raw) in self.iter() {
            schedule.insert(normalize::normalize(label, raw, reference));
        }
        schedule
    }
}

/// Snapshot of one day's schedule, keyed by label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PrayerSchedule {
    entries: Vec<ScheduleEntry>,
}

impl PrayerSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Same overwrite rule as [`RawSchedule::insert`].
    pub fn insert(&mut self, entry: ScheduleEntry) {
        match self.entries.iter_mut().find(|e| e.label == entry.label) {
            Some(slot) => *slot = entry,
            None => self.entries.push(entry),
        }
    }

    pub fn get(&self, label: &str) -> Option<&ScheduleEntry> {
        self.entries.iter().find(|e| e.label == label)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScheduleEntry> {
        self.entries.iter()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.label.as_str()).collect()
    }

    /// The raw strings, for consumers that format times themselves.
    pub fn raw(&self) -> RawSchedule {
        let mut raw = RawSchedule::new();
        for e in &self.entries {
            raw.insert(e.label.clone(), e.raw.clone());
        }
        raw
    }

    /// Entries whose label appears in `order`, sorted by that list.
    pub fn ordered_by(&self, order: &[&str]) -> Vec<&ScheduleEntry> {
        order.iter().filter_map(|label| self.get(label)).collect()
    }

    /// Earliest entry strictly after `now`; unset entries are ignored.
    pub fn next_after(&self, now: DateTime<Local>) -> Option<&ScheduleEntry> {
        self.entries
            .iter()
            .filter(|e| e.time.is_some_and(|t| t > now))
            .min_by_key(|e| e.time)
    }
}

/// A schedule plus the instant it was fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedSchedule {
    pub schedule: PrayerSchedule,
    pub fetched_at: DateTime<Local>,
}

impl CachedSchedule {
    /// Stale once `now` falls on a later local calendar day.
    pub fn is_stale_at(&self, now: DateTime<Local>) -> bool {
        self.fetched_at.date_naive() < now.date_naive()
    }
}
