//! Prayer-time acquisition and normalization.
//!
//! The pipeline has three stages, leaves first:
//!
//! - [`fetch`]: a [`PageFetcher`] pulls the source page as text
//! - [`extract`] + [`normalize`]: [`ScheduleParser`] finds the `#prayer_time`
//!   list, keeps the letters of each label, and turns the published `H:MM`
//!   strings into local instants
//! - [`cache`]: [`ScheduleCache`] refreshes at most once per local calendar
//!   day, coalesces concurrent callers onto one fetch, and falls back to
//!   stale-or-empty data instead of failing
//!
//! ```
//! use chrono::NaiveDate;
//! use salat_schedule::ScheduleParser;
//!
//! let html = r#"<div id="prayer_time"><ul>
//!     <li>Dawn<span>02:21</span></li>
//!     <li>Maghrib<span>9:35</span></li>
//! </ul></div>"#;
//!
//! let day = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
//! let raw = ScheduleParser::standard().unwrap().extract(html).unwrap();
//! assert_eq!(raw.get("Maghrib"), Some("9:35"));
//!
//! let schedule = raw.normalize(day);
//! let maghrib = schedule.get("Maghrib").unwrap();
//! assert_eq!(maghrib.time.unwrap().format("%H:%M").to_string(), "21:35");
//! ```

pub mod cache;
pub mod display;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod normalize;
pub mod pipeline;
pub mod types;

pub use cache::{RefreshStatus, ScheduleCache, ScheduleSnapshot, next_refresh_at};
pub use error::{FetchError, ParseError, ScheduleError, TimeFormatError};
pub use extract::ScheduleParser;
pub use fetch::{HttpPageFetcher, PageFetcher};
pub use types::{CachedSchedule, PrayerSchedule, RawPage, RawSchedule, ScheduleEntry};
