//! # Undo Buffer
//!
//! Holds snapshots of deleted products for a short window so a delete
//! can be taken back with `RestoreProduct`.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use smartstock_core::ProductSnapshot;

#[derive(Debug)]
pub struct UndoBuffer {
    window: Duration,
    entries: HashMap<String, (ProductSnapshot, Instant)>,
}

impl UndoBuffer {
    pub fn new(window: Duration) -> Self {
        UndoBuffer {
            window,
            entries: HashMap::new(),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Keeps `snapshot` until `now + window`. A second delete of the same id
    /// replaces the first.
    pub fn hold(&mut self, snapshot: ProductSnapshot, now: Instant) {
        self.purge_expired(now);
        if self.window.is_zero() {
            return;
        }
        self.entries
            .insert(snapshot.product.id.clone(), (snapshot, now + self.window));
    }

    /// Removes and returns the snapshot for `id` if it has not expired.
    pub fn take(&mut self, id: &str, now: Instant) -> Option<ProductSnapshot> {
        let (snapshot, expires_at) = self.entries.remove(id)?;
        (now < expires_at).then_some(snapshot)
    }

    /// Puts a snapshot back after a failed restore, keeping its deadline.
    pub fn put_back(&mut self, snapshot: ProductSnapshot, expires_at: Instant) {
        self.entries
            .insert(snapshot.product.id.clone(), (snapshot, expires_at));
    }

    /// Deadline for `id`, if it is held.
    pub fn expires_at(&self, id: &str) -> Option<Instant> {
        self.entries.get(id).map(|(_, at)| *at)
    }

    pub fn purge_expired(&mut self, now: Instant) {
        self.entries.retain(|_, (_, expires_at)| now < *expires_at);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
