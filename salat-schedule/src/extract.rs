//! Extraction of `(label, time)` pairs from the source page.
//!
//! Expected markup:
//!
//! ```html
//! <div id="prayer_time">
//!   <ul>
//!     <li><i class="icon"></i> Dawn <span>02:21</span></li>
//!     ...
//!   </ul>
//! </div>
//! ```
//!
//! The label is whatever text the `<li>` holds outside its `<span>`, reduced
//! to alphabetic characters (`char::is_alphabetic`, so the result does not
//! depend on the process locale). The time is the text of the nested
//! `<span>`s; an item without one yields an empty time and is still kept.
//! An item whose label has no letters at all is kept under the empty label.

use chrono::NaiveDate;
use salat_config::DEFAULT_CONTAINER_ID;
use scraper::{ElementRef, Html, Selector};

use crate::error::ParseError;
use crate::types::{PrayerSchedule, RawPage, RawSchedule};

/// Compiled selectors for one container id.
#[derive(Debug, Clone)]
pub struct ScheduleParser {
    container_id: String,
    container: Selector,
    items: Selector,
    time: Selector,
}

fn selector(id: &str, css: &str) -> Result<Selector, ParseError> {
    Selector::parse(css).map_err(|e| ParseError::Selector {
        id: id.to_string(),
        reason: e.to_string(),
    })
}

impl ScheduleParser {
    pub fn new(container_id: &str) -> Result<Self, ParseError> {
        let escaped = container_id.replace('\\', "\\\\").replace('"', "\\\"");
        Ok(Self {
            container_id: container_id.to_string(),
            container: selector(container_id, &format!("[id=\"{escaped}\"]"))?,
            items: selector(container_id, "ul > li")?,
            time: selector(container_id, "span")?,
        })
    }

    /// Parser for the source's own `#prayer_time` container.
    pub fn standard() -> Result<Self, ParseError> {
        Self::new(DEFAULT_CONTAINER_ID)
    }

    pub fn container_id(&self) -> &str {
        &self.container_id
    }

    /// Pull raw `(label, time)` pairs out of `html`.
    ///
    /// Only a missing container is an error; an empty list is a valid,
    /// empty schedule.
    pub fn extract(&self, html: &str) -> Result<RawSchedule, ParseError> {
        let document = Html::parse_document(html);
        let container = document.select(&self.container).next().ok_or_else(|| {
            ParseError::StructureNotFound {
                id: self.container_id.clone(),
            }
        })?;

        let mut raw = RawSchedule::new();
        for item in container.select(&self.items) {
            let label = letters(&label_text(item));
            let time = self.time_text(item);
            if label.is_empty() {
                tracing::debug!(time=%time, "extract.item_without_label");
            }
            if raw.get(&label).is_some() {
                tracing::debug!(label=%label, "extract.duplicate_label");
            }
            raw.insert(label, time);
        }

        tracing::debug!(
            container=%self.container_id,
            items=raw.len(),
            labels=?raw.labels(),
            "extract.done"
        );
        Ok(raw)
    }

    /// Extract and normalize against `reference` (the fetch day).
    pub fn parse(&self, page: &RawPage, reference: NaiveDate) -> Result<PrayerSchedule, ParseError> {
        let raw = self.extract(&page.body)?;
        Ok(raw.normalize(reference))
    }

    fn time_text(&self, item: ElementRef<'_>) -> String {
        item.select(&self.time)
            .map(|span| span.text().collect::<String>().trim().to_string())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Text of `item` excluding anything inside a `<span>`.
fn label_text(item: ElementRef<'_>) -> String {
    let mut out = String::new();
    for node in item.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let in_span = node
            .ancestors()
            .take_while(|a| a.id() != item.id())
            .any(|a| a.value().as_element().is_some_and(|e| e.name() == "span"));
        if !in_span {
            out.push_str(text);
        }
    }
    out
}

/// Keep Unicode alphabetic characters only.
pub fn letters(s: &str) -> String {
    s.chars().filter(|c| c.is_alphabetic()).collect()
}
