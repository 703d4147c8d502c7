//! Timed field emphasis
//!
//! Emphasis is deadline based: each entry stores the instant it expires
//! and queries take the current instant, so nothing runs in the
//! background and tests can drive time explicitly.

use std::time::{Duration, Instant};

use crate::surface::View;

/// Default emphasis duration
pub const DEFAULT_HIGHLIGHT: Duration = Duration::from_millis(2000);

/// A field currently emphasized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Emphasis {
    pub view: View,
    pub field_id: String,
    pub until: Instant,
}

/// Tracks emphasized fields
#[derive(Debug, Clone)]
pub struct Highlighter {
    duration: Duration,
    active: Vec<Emphasis>,
}

impl Highlighter {
    #[must_use]
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            active: Vec::new(),
        }
    }

    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Emphasize a field starting at `now`, restarting any running emphasis
    pub fn emphasize(&mut self, view: View, field_id: &str, now: Instant) {
        let until = now + self.duration;
        match self.active.iter_mut().find(|e| e.view == view && e.field_id == field_id) {
            Some(existing) => existing.until = until,
            None => self.active.push(Emphasis {
                view,
                field_id: field_id.to_string(),
                until,
            }),
        }
    }

    /// Whether the field is emphasized at `now`
    #[must_use]
    pub fn is_emphasized(&self, view: View, field_id: &str, now: Instant) -> bool {
        self.active
            .iter()
            .any(|e| e.view == view && e.field_id == field_id && now < e.until)
    }

    /// Drop expired entries and return how many were removed
    pub fn expire(&mut self, now: Instant) -> usize {
        let before = self.active.len();
        self.active.retain(|e| now < e.until);
        before - self.active.len()
    }

    /// Entries still running at `now`
    pub fn active(&self, now: Instant) -> impl Iterator<Item = &Emphasis> {
        self.active.iter().filter(move |e| now < e.until)
    }

    /// Drop everything
    pub fn clear(&mut self) {
        self.active.clear();
    }
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new(DEFAULT_HIGHLIGHT)
    }
}
