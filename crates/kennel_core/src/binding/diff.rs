//! Row diffing for observers that re-render from live results.

use std::collections::HashMap;
use std::hash::Hash;

/// A row with a stable identity.
pub trait Keyed {
    type Key: Copy + Eq + Hash;

    fn key(&self) -> Self::Key;
}

/// Index-level difference between two renders of the same collection.
///
/// `deletions` index into the old rows; `insertions` and `modifications`
/// index into the new rows. A row whose relative order changed is reported
/// as a deletion plus an insertion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionChanges {
    pub deletions: Vec<usize>,
    pub insertions: Vec<usize>,
    pub modifications: Vec<usize>,
}

impl CollectionChanges {
    pub fn is_empty(&self) -> bool {
        self.deletions.is_empty() && self.insertions.is_empty() && self.modifications.is_empty()
    }
}

/// Computes the changes that turn `old` into `new`.
pub fn diff_keyed<T: Keyed + PartialEq>(old: &[T], new: &[T]) -> CollectionChanges {
    let old_index = index_by_key(old);
    let new_index = index_by_key(new);
    let mut changes = CollectionChanges::default();

    for (index, row) in old.iter().enumerate() {
        if !new_index.contains_key(&row.key()) {
            changes.deletions.push(index);
        }
    }
    for (index, row) in new.iter().enumerate() {
        if !old_index.contains_key(&row.key()) {
            changes.insertions.push(index);
        }
    }

    let old_kept = old
        .iter()
        .map(Keyed::key)
        .filter(|key| new_index.contains_key(key));
    let new_kept = new
        .iter()
        .map(Keyed::key)
        .filter(|key| old_index.contains_key(key));

    for (before, after) in old_kept.zip(new_kept) {
        let old_at = old_index[&after];
        let new_at = new_index[&after];
        if before != after {
            changes.deletions.push(old_at);
            changes.insertions.push(new_at);
        } else if old[old_at] != new[new_at] {
            changes.modifications.push(new_at);
        }
    }

    changes.deletions.sort_unstable();
    changes.insertions.sort_unstable();
    changes.modifications.sort_unstable();
    changes
}

fn index_by_key<T: Keyed>(rows: &[T]) -> HashMap<T::Key, usize> {
    rows.iter()
        .enumerate()
        .map(|(index, row)| (row.key(), index))
        .collect()
}
