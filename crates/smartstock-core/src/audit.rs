//! # Audit Log
//!
//! Append-only history of every accepted command.
//!
//! Entries are kept in the order they were appended, which is also strictly
//! increasing timestamp order: [`AuditLog::next_timestamp`] nudges a clock
//! reading forward by a microsecond whenever it would not sort after the
//! last entry. Nothing here removes or edits an entry.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use ts_rs::TS;

use crate::types::{AuditAction, AuditEntry};

/// Activity log filter. Results come back newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct AuditQuery {
    pub user: Option<String>,
    pub action: Option<AuditAction>,
    /// Maximum number of entries; `None` returns all matches.
    pub limit: Option<usize>,
}

impl AuditQuery {
    /// The `n` most recent entries.
    pub fn recent(n: usize) -> Self {
        AuditQuery {
            limit: Some(n),
            ..Default::default()
        }
    }

    pub fn by_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn by_action(mut self, action: AuditAction) -> Self {
        self.action = Some(action);
        self
    }

    pub fn matches(&self, entry: &AuditEntry) -> bool {
        self.user.as_deref().map_or(true, |u| entry.user == u)
            && self.action.map_or(true, |a| entry.action == a)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditLog {
    entries: Vec<AuditEntry>,
}

impl AuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a log from stored entries, restoring timestamp order.
    pub fn from_entries(mut entries: Vec<AuditEntry>) -> Self {
        entries.sort_by_key(|e| e.timestamp);
        AuditLog { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Oldest first.
    pub fn entries(&self) -> &[AuditEntry] {
        &self.entries
    }

    pub fn last(&self) -> Option<&AuditEntry> {
        self.entries.last()
    }

    /// The timestamp the next entry should carry given a clock reading.
    pub fn next_timestamp(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self.entries.last() {
            Some(last) if now <= last.timestamp => last.timestamp + Duration::microseconds(1),
            _ => now,
        }
    }

    pub fn append(&mut self, entry: AuditEntry) {
        debug_assert!(
            self.entries
                .last()
                .map_or(true, |last| entry.timestamp > last.timestamp),
            "audit timestamps must strictly increase"
        );
        self.entries.push(entry);
    }

    /// Matching entries, newest first.
    pub fn query(&self, query: &AuditQuery) -> Vec<AuditEntry> {
        let matching = self.entries.iter().rev().filter(|e| query.matches(e));
        match query.limit {
            Some(limit) => matching.take(limit).cloned().collect(),
            None => matching.cloned().collect(),
        }
    }

    pub fn recent(&self, n: usize) -> Vec<AuditEntry> {
        self.query(&AuditQuery::recent(n))
    }

    /// Everyone who has issued a command, sorted.
    pub fn users(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|e| e.user.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}
