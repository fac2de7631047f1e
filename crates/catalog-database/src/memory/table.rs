//! Shared row storage for the in-memory repositories.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use uuid::Uuid;

use catalog_core::AppError;
use catalog_core::result::AppResult;

#[derive(Debug, Clone)]
struct Row<T> {
    seq: u64,
    value: T,
}

/// Rows keyed by id, with an insertion sequence.
#[derive(Debug)]
pub(crate) struct Table<T> {
    rows: DashMap<Uuid, Row<T>>,
    next_seq: AtomicU64,
}

impl<T: Clone> Table<T> {
    pub(crate) fn new() -> Self {
        Self {
            rows: DashMap::new(),
            next_seq: AtomicU64::new(0),
        }
    }

    pub(crate) fn get(&self, id: Uuid) -> Option<T> {
        self.rows.get(&id).map(|row| row.value.clone())
    }

    /// Insert a new row; an existing id is a conflict.
    pub(crate) fn insert(&self, id: Uuid, value: T) -> AppResult<T> {
        match self.rows.entry(id) {
            Entry::Occupied(_) => Err(AppError::conflict(format!("Duplicate id {id}"))),
            Entry::Vacant(slot) => {
                let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
                slot.insert(Row {
                    seq,
                    value: value.clone(),
                });
                Ok(value)
            }
        }
    }

    /// Replace an existing row, keeping its position.
    pub(crate) fn replace(&self, id: Uuid, value: T) -> Option<T> {
        let mut row = self.rows.get_mut(&id)?;
        row.value = value.clone();
        Some(value)
    }

    /// Mutate rows in place; returns how many the closure reported changed.
    pub(crate) fn update_where(&self, ids: &[Uuid], mut f: impl FnMut(&mut T) -> bool) -> u64 {
        let mut changed = 0;
        for id in ids {
            if let Some(mut row) = self.rows.get_mut(id) {
                if f(&mut row.value) {
                    changed += 1;
                }
            }
        }
        changed
    }

    /// Mutate every row in place; returns how many the closure reported changed.
    pub(crate) fn update_all(&self, mut f: impl FnMut(&mut T) -> bool) -> u64 {
        let mut changed = 0;
        for mut row in self.rows.iter_mut() {
            if f(&mut row.value) {
                changed += 1;
            }
        }
        changed
    }

    pub(crate) fn remove(&self, id: Uuid) -> Option<T> {
        self.rows.remove(&id).map(|(_, row)| row.value)
    }

    /// All rows in insertion order.
    pub(crate) fn values(&self) -> Vec<T> {
        let mut rows: Vec<(u64, T)> = self
            .rows
            .iter()
            .map(|entry| (entry.seq, entry.value.clone()))
            .collect();
        rows.sort_by_key(|(seq, _)| *seq);
        rows.into_iter().map(|(_, value)| value).collect()
    }

    /// Rows matching a predicate, in insertion order.
    pub(crate) fn filter(&self, mut predicate: impl FnMut(&T) -> bool) -> Vec<T> {
        self.values().into_iter().filter(|v| predicate(v)).collect()
    }
}

/// A unique key index: key -> owning row id.
#[derive(Debug, Default)]
pub(crate) struct UniqueIndex {
    keys: DashMap<String, Uuid>,
}

impl UniqueIndex {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn lookup(&self, key: &str) -> Option<Uuid> {
        self.keys.get(key).map(|id| *id)
    }

    /// Claim `key` for `owner`. Claiming a key the owner already holds is a no-op.
    pub(crate) fn claim(&self, key: &str, owner: Uuid, conflict: impl FnOnce() -> AppError) -> AppResult<()> {
        match self.keys.entry(key.to_string()) {
            Entry::Occupied(existing) if *existing.get() != owner => Err(conflict()),
            Entry::Occupied(_) => Ok(()),
            Entry::Vacant(slot) => {
                slot.insert(owner);
                Ok(())
            }
        }
    }

    /// Release `key` if `owner` holds it.
    pub(crate) fn release(&self, key: &str, owner: Uuid) {
        self.keys.remove_if(key, |_, id| *id == owner);
    }
}
