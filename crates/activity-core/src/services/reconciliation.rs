//! Set reconciliation shared by supervisor and enrollment sync.
//!
//! The caller hands over the complete desired membership; the diff against the
//! current assignments is computed here and nowhere else.

use std::collections::HashSet;
use std::hash::Hash;

/// Deltas that turn the current membership into the desired one.
///
/// `K` is the related id (staff or student), `A` the assignment row id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation<K, A> {
    pub to_remove: Vec<A>,
    pub to_add: Vec<K>,
}

impl<K, A> Reconciliation<K, A> {
    pub fn is_empty(&self) -> bool {
        self.to_remove.is_empty() && self.to_add.is_empty()
    }
}

/// `current` pairs each related id with its assignment id. Output order
/// follows the input order; duplicate desired ids are added once.
pub fn reconcile<K, A>(current: &[(K, A)], desired: &[K]) -> Reconciliation<K, A>
where
    K: Eq + Hash + Copy,
    A: Copy,
{
    let wanted: HashSet<K> = desired.iter().copied().collect();
    let mut present: HashSet<K> = current.iter().map(|(k, _)| *k).collect();

    let to_remove = current
        .iter()
        .filter(|(k, _)| !wanted.contains(k))
        .map(|(_, a)| *a)
        .collect();

    let to_add = desired
        .iter()
        .copied()
        .filter(|k| present.insert(*k))
        .collect();

    Reconciliation { to_remove, to_add }
}

/// Drops repeated ids, keeping first occurrences in place.
pub fn dedup_ordered<K: Eq + Hash + Copy>(ids: &[K]) -> Vec<K> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}
