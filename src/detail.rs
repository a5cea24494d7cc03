//! Detail overlay for the activated row.
//!
//! The selection stores only the record's key. The overlay looks the record
//! up in the controller's current page each time it is drawn, so a refresh
//! that returns an updated copy of the same record is shown immediately, and
//! a refresh that drops it closes the overlay.

use crate::controller::ListController;
use crate::types::Record;

/// Largest body rendered before truncation
pub const MAX_BODY_BYTES: usize = 64 * 1024;

#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct SelectedDetail {
    key: Option<String>,
    scroll: u16,
}

impl SelectedDetail {
    pub fn select(&mut self, key: impl Into<String>) {
        self.key = Some(key.into());
        self.scroll = 0;
    }

    pub fn clear(&mut self) {
        self.key = None;
        self.scroll = 0;
    }

    pub fn is_open(&self) -> bool {
        self.key.is_some()
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn scroll(&self) -> u16 {
        self.scroll
    }

    pub fn scroll_by(&mut self, delta: i32, max: u16) {
        let next = (self.scroll as i32 + delta).clamp(0, max as i32);
        self.scroll = next as u16;
    }

    /// The selected record as currently held by `list`
    pub fn resolve<'a>(&self, list: &'a ListController) -> Option<&'a Record> {
        self.key.as_deref().and_then(|k| list.find(k))
    }

    /// Close the overlay if its record left the current page
    pub fn sync(&mut self, list: &ListController) {
        if self.key.is_some() && self.resolve(list).is_none() {
            log::debug!("[detail] {:?} no longer listed, closing", self.key);
            self.clear();
        }
    }
}

/// Pretty JSON for the overlay, cut at the last full line before `max_bytes`
pub fn detail_body(record: &Record, max_bytes: usize) -> String {
    let full = serde_json::to_string_pretty(&record.to_json()).unwrap_or_else(|_| "{}".to_string());
    if full.len() <= max_bytes {
        return full;
    }
    let mut cut = max_bytes;
    while !full.is_char_boundary(cut) {
        cut -= 1;
    }
    let cut = full[..cut].rfind('\n').unwrap_or(cut);
    format!(
        "{}\n\n... (truncated - {} total bytes)",
        &full[..cut],
        full.len()
    )
}
