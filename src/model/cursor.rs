//! Cursor: the caller-owned continuation token threaded across polls.
//!
//! The engine never stores a cursor globally. Callers create one, pass it to
//! every acquisition call, and persist it between pipeline iterations if they
//! want to resume. Serde derives cover persistence; there is no on-disk
//! format of the cursor's own.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Mutable state threaded across repeated calls to a discovery strategy.
///
/// `next == None` is the terminal sentinel: once set, every strategy reports
/// `Done` on every subsequent call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cursor {
    /// The next expected observation number, or `None` for "stop".
    pub next: Option<u32>,

    /// Quorum bookkeeping for flag-based strategies: source key (flag file
    /// or task name) to the set of filenames already consumed for the
    /// current observation.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    seen: BTreeMap<String, BTreeSet<String>>,
}

impl Cursor {
    /// A cursor expecting `number` as the next observation.
    pub fn starting_at(number: u32) -> Self {
        Self {
            next: Some(number),
            seen: BTreeMap::new(),
        }
    }

    /// True once the terminal sentinel has been set.
    pub fn is_done(&self) -> bool {
        self.next.is_none()
    }

    /// Move the expected number forward. Strategies only ever move forward;
    /// a jump past abandoned numbers also drops their bookkeeping.
    pub fn advance_to(&mut self, number: u32) {
        self.next = Some(number);
    }

    /// Set the terminal sentinel. Every later poll reports `Done`.
    pub fn finish(&mut self) {
        self.next = None;
    }

    /// Filenames already consumed from the given source.
    pub fn seen_for(&self, source: &str) -> Option<&BTreeSet<String>> {
        self.seen.get(source)
    }

    /// Record a filename as consumed from the given source.
    pub fn record_seen(&mut self, source: &str, file: &str) {
        self.seen
            .entry(source.to_string())
            .or_default()
            .insert(file.to_string());
    }

    /// Drop all per-observation bookkeeping, used when the strategy jumps to
    /// a new observation number.
    pub fn reset_seen(&mut self) {
        self.seen.clear();
    }
}
