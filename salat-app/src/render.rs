//! Text and JSON views of a [`ScheduleSnapshot`].

use chrono::{DateTime, Local};
use salat_schedule::display::{WIDGET_PRAYERS, display_name};
use salat_schedule::{RefreshStatus, ScheduleEntry, ScheduleSnapshot};
use serde::Serialize;

use crate::cli::ShowOpts;

const UNSET: &str = "--:--";

#[derive(Debug, Serialize)]
struct Report<'a> {
    status: &'static str,
    fetched_at: Option<DateTime<Local>>,
    error: Option<String>,
    prayers: Vec<Row<'a>>,
}

#[derive(Debug, Serialize)]
struct Row<'a> {
    label: &'a str,
    name: &'a str,
    raw: &'a str,
    time: Option<DateTime<Local>>,
}

fn status_name(status: &RefreshStatus) -> &'static str {
    match status {
        RefreshStatus::Fresh => "fresh",
        RefreshStatus::Cached => "cached",
        RefreshStatus::Stale(_) => "stale",
        RefreshStatus::Unavailable(_) => "unavailable",
    }
}

fn selected<'a>(snap: &'a ScheduleSnapshot, opts: &ShowOpts) -> Vec<&'a ScheduleEntry> {
    if opts.all {
        snap.schedule.iter().collect()
    } else {
        snap.schedule.ordered_by(&WIDGET_PRAYERS)
    }
}

fn name_of<'a>(entry: &'a ScheduleEntry, opts: &ShowOpts) -> &'a str {
    if opts.all {
        &entry.label
    } else {
        display_name(&entry.label)
    }
}

pub fn render(snap: &ScheduleSnapshot, opts: &ShowOpts) -> anyhow::Result<String> {
    if opts.json {
        render_json(snap, opts)
    } else {
        Ok(render_text(snap, opts))
    }
}

fn render_json(snap: &ScheduleSnapshot, opts: &ShowOpts) -> anyhow::Result<String> {
    let report = Report {
        status: status_name(&snap.status),
        fetched_at: snap.fetched_at,
        error: snap.error().map(|e| e.to_string()),
        prayers: selected(snap, opts)
            .into_iter()
            .map(|entry| Row {
                label: &entry.label,
                name: name_of(entry, opts),
                raw: &entry.raw,
                time: entry.time,
            })
            .collect(),
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

fn render_text(snap: &ScheduleSnapshot, opts: &ShowOpts) -> String {
    let rows = selected(snap, opts);
    let mut out = Vec::with_capacity(rows.len() + 1);
    let width = rows
        .iter()
        .map(|e| name_of(e, opts).len())
        .max()
        .unwrap_or(0);

    for entry in rows {
        let value = if opts.raw {
            entry.raw.clone()
        } else {
            entry
                .time
                .map(|t| t.format("%H:%M").to_string())
                .unwrap_or_else(|| UNSET.to_string())
        };
        out.push(format!("{:<width$}  {value}", name_of(entry, opts)));
    }

    match (&snap.status, snap.fetched_at) {
        (RefreshStatus::Stale(err), Some(at)) => {
            out.push(format!("(from {}; refresh failed: {err})", at.format("%Y-%m-%d")))
        }
        (RefreshStatus::Unavailable(err), _) => {
            out.push(format!("No prayer times available: {err}"))
        }
        _ if snap.schedule.is_empty() => out.push("No prayer times published.".to_string()),
        _ => {}
    }
    out.join("\n")
}
