//! Long-running mode: print the schedule, sleep until the next local
//! midnight, repeat. Ctrl-C cancels the sleep and exits cleanly.

use anyhow::Result;
use chrono::{DateTime, Local};
use salat_schedule::{ScheduleCache, next_refresh_at};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::cli::ShowOpts;
use crate::render;

pub async fn run(cache: ScheduleCache, opts: ShowOpts) -> Result<()> {
    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("watch.interrupted");
        }
        on_signal.cancel();
    });

    run_until(cache, opts, cancel).await
}

async fn run_until(cache: ScheduleCache, opts: ShowOpts, cancel: CancellationToken) -> Result<()> {
    tracing::info!(source=%cache.source(), "watch.start");
    loop {
        let now = Local::now();
        let snap = cache.get_schedule(now).await;
        println!("{}", render::render(&snap, &opts)?);

        let next = next_refresh_at(now);
        tracing::debug!(next=%next, degraded = snap.is_degraded(), "watch.sleep");
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(until(next, Local::now())) => {}
        }
    }
    tracing::info!("watch.stop");
    Ok(())
}

fn until(next: DateTime<Local>, now: DateTime<Local>) -> Duration {
    (next - now).to_std().unwrap_or(Duration::ZERO)
}
