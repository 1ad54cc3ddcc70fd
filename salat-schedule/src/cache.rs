//! Once-a-day schedule cache with single-flight refresh.
//!
//! Semantics:
//! - A cached schedule is served until the local calendar day changes.
//! - A refresh runs in its own task. Every caller that needs one while it is
//!   in flight awaits the same task, so there is never more than one fetch
//!   outstanding. Dropping a caller does not cancel the task; the cache is
//!   still populated.
//! - Failures never escape: the previous schedule is served as stale, or an
//!   empty one if nothing was ever fetched, with the error attached.

use chrono::{DateTime, Days, Local, NaiveTime, TimeDelta, TimeZone};
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use salat_config::SourceConfig;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::RwLock;
use url::Url;

use crate::error::{FetchError, ScheduleError};
use crate::extract::ScheduleParser;
use crate::fetch::{HttpPageFetcher, PageFetcher};
use crate::pipeline::fetch_schedule;
use crate::types::{CachedSchedule, PrayerSchedule};

type RefreshOutcome = Result<(), Arc<ScheduleError>>;
type InflightRefresh = Shared<BoxFuture<'static, RefreshOutcome>>;

enum Pending {
    Running(InflightRefresh),
    Current(CachedSchedule),
}

/// How the data in a [`ScheduleSnapshot`] came to be.
#[derive(Debug, Clone)]
pub enum RefreshStatus {
    /// Fetched by the refresh this call waited on.
    Fresh,
    /// Served from cache without any I/O.
    Cached,
    /// The refresh failed; this is the last good schedule.
    Stale(Arc<ScheduleError>),
    /// The refresh failed and nothing was cached; the schedule is empty.
    Unavailable(Arc<ScheduleError>),
}

/// What a consumer gets back. Always displayable.
#[derive(Debug, Clone)]
pub struct ScheduleSnapshot {
    pub schedule: PrayerSchedule,
    pub fetched_at: Option<DateTime<Local>>,
    pub status: RefreshStatus,
}

impl ScheduleSnapshot {
    pub fn error(&self) -> Option<&ScheduleError> {
        match &self.status {
            RefreshStatus::Stale(e) | RefreshStatus::Unavailable(e) => Some(e),
            RefreshStatus::Fresh | RefreshStatus::Cached => None,
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.error().is_some()
    }
}

struct Inner {
    source: Url,
    fetcher: Arc<dyn PageFetcher>,
    parser: ScheduleParser,
    slot: RwLock<Option<CachedSchedule>>,
    inflight: Mutex<Option<InflightRefresh>>,
}

impl Inner {
    fn inflight(&self) -> MutexGuard<'_, Option<InflightRefresh>> {
        self.inflight.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn refresh_task(self: Arc<Self>, now: DateTime<Local>) -> RefreshOutcome {
        let _clear = ClearInflight(Arc::clone(&self));
        match fetch_schedule(self.fetcher.as_ref(), &self.parser, &self.source, now).await {
            Ok(schedule) => {
                let mut slot = self.slot.write().await;
                *slot = Some(CachedSchedule {
                    schedule,
                    fetched_at: now,
                });
                tracing::info!(fetched_at=%now, "cache.refresh.stored");
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error=%err, "cache.refresh.failed");
                Err(Arc::new(err))
            }
        }
    }
}

/// Clears the in-flight handle when the refresh task ends, panics included.
struct ClearInflight(Arc<Inner>);

impl Drop for ClearInflight {
    fn drop(&mut self) {
        self.0.inflight().take();
    }
}

/// Shared handle; clones see the same slot.
#[derive(Clone)]
pub struct ScheduleCache {
    inner: Arc<Inner>,
}

impl ScheduleCache {
    pub fn new(source: Url, fetcher: Arc<dyn PageFetcher>, parser: ScheduleParser) -> Self {
        Self {
            inner: Arc::new(Inner {
                source,
                fetcher,
                parser,
                slot: RwLock::new(None),
                inflight: Mutex::new(None),
            }),
        }
    }

    /// HTTP-backed cache for the configured source.
    pub fn from_config(cfg: &SourceConfig) -> Result<Self, ScheduleError> {
        let source = Url::parse(&cfg.url).map_err(|e| FetchError::Url(e.to_string()))?;
        let fetcher = HttpPageFetcher::from_config(cfg)?;
        let parser = ScheduleParser::new(&cfg.container_id)?;
        Ok(Self::new(source, Arc::new(fetcher), parser))
    }

    pub fn source(&self) -> &Url {
        &self.inner.source
    }

    /// Current cache content, without triggering a refresh.
    pub async fn cached(&self) -> Option<CachedSchedule> {
        self.inner.slot.read().await.clone()
    }

    /// Today's schedule, refreshing first if the cache is empty or from an
    /// earlier day.
    pub async fn get_schedule(&self, now: DateTime<Local>) -> ScheduleSnapshot {
        if let Some(cached) = self.inner.slot.read().await.as_ref() {
            if !cached.is_stale_at(now) {
                tracing::debug!(fetched_at=%cached.fetched_at, "cache.hit");
                return ScheduleSnapshot {
                    schedule: cached.schedule.clone(),
                    fetched_at: Some(cached.fetched_at),
                    status: RefreshStatus::Cached,
                };
            }
            tracing::debug!(fetched_at=%cached.fetched_at, now=%now, "cache.stale");
        }
        self.run_refresh(now, false).await
    }

    /// Refresh regardless of freshness. Joins a refresh already in flight.
    pub async fn refresh(&self, now: DateTime<Local>) -> ScheduleSnapshot {
        self.run_refresh(now, true).await
    }

    async fn run_refresh(&self, now: DateTime<Local>, force: bool) -> ScheduleSnapshot {
        let refresh = match self.join_or_start(now, force) {
            Pending::Running(refresh) => refresh,
            Pending::Current(cached) => {
                return ScheduleSnapshot {
                    schedule: cached.schedule,
                    fetched_at: Some(cached.fetched_at),
                    status: RefreshStatus::Cached,
                };
            }
        };
        let outcome = refresh.await;
        let cached = self.inner.slot.read().await.clone();
        match (outcome, cached) {
            (Ok(()), Some(c)) => ScheduleSnapshot {
                schedule: c.schedule,
                fetched_at: Some(c.fetched_at),
                status: RefreshStatus::Fresh,
            },
            (Err(err), Some(c)) => ScheduleSnapshot {
                schedule: c.schedule,
                fetched_at: Some(c.fetched_at),
                status: RefreshStatus::Stale(err),
            },
            (Err(err), None) => ScheduleSnapshot {
                schedule: PrayerSchedule::new(),
                fetched_at: None,
                status: RefreshStatus::Unavailable(err),
            },
            (Ok(()), None) => ScheduleSnapshot {
                schedule: PrayerSchedule::new(),
                fetched_at: None,
                status: RefreshStatus::Unavailable(Arc::new(ScheduleError::Task(
                    "refresh finished without storing a schedule".into(),
                ))),
            },
        }
    }

    fn join_or_start(&self, now: DateTime<Local>, force: bool) -> Pending {
        // Held across spawn + store so the task cannot clear the handle
        // before it has been published.
        let mut inflight = self.inner.inflight();
        if let Some(running) = inflight.as_ref() {
            tracing::debug!("cache.refresh.joined");
            return Pending::Running(running.clone());
        }

        // A refresh may have stored and cleared itself since the caller last
        // looked at the slot. The task clears `inflight` only after its slot
        // write, so with no refresh running the slot is settled here.
        if !force {
            if let Ok(slot) = self.inner.slot.try_read() {
                if let Some(cached) = slot.as_ref().filter(|c| !c.is_stale_at(now)) {
                    tracing::debug!(fetched_at=%cached.fetched_at, "cache.refresh.already_current");
                    return Pending::Current(cached.clone());
                }
            }
        }

        tracing::debug!(now=%now, "cache.refresh.start");
        let handle = tokio::spawn(Arc::clone(&self.inner).refresh_task(now));
        let refresh = async move {
            match handle.await {
                Ok(outcome) => outcome,
                Err(join) => Err(Arc::new(ScheduleError::Task(join.to_string()))),
            }
        }
        .boxed()
        .shared();
        *inflight = Some(refresh.clone());
        Pending::Running(refresh)
    }
}

/// Start of the next local day: when a once-a-day consumer should come back.
pub fn next_refresh_at(now: DateTime<Local>) -> DateTime<Local> {
    now.date_naive()
        .checked_add_days(Days::new(1))
        .and_then(|d| Local.from_local_datetime(&d.and_time(NaiveTime::MIN)).earliest())
        .unwrap_or_else(|| now + TimeDelta::days(1))
}
