//! Clearing collections for reuse.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::hash::{BuildHasher, Hash};

/// A collection that can be emptied and handed out again.
pub trait Recycle {
    /// Drop all contents. When the capacity is above `shrink_threshold` and
    /// more than four times the length held before clearing, the capacity is
    /// cut back to that length.
    fn recycle(&mut self, shrink_threshold: usize);
}

/// Capacity to shrink to, if any.
fn shrink_target(used: usize, capacity: usize, shrink_threshold: usize) -> Option<usize> {
    (capacity > shrink_threshold && capacity > used.saturating_mul(4)).then_some(used)
}

impl<T> Recycle for Vec<T> {
    fn recycle(&mut self, shrink_threshold: usize) {
        let used = self.len();
        self.clear();
        if let Some(keep) = shrink_target(used, self.capacity(), shrink_threshold) {
            self.shrink_to(keep);
        }
    }
}

impl<T> Recycle for VecDeque<T> {
    fn recycle(&mut self, shrink_threshold: usize) {
        let used = self.len();
        self.clear();
        if let Some(keep) = shrink_target(used, self.capacity(), shrink_threshold) {
            self.shrink_to(keep);
        }
    }
}

impl<K: Eq + Hash, V, S: BuildHasher> Recycle for HashMap<K, V, S> {
    fn recycle(&mut self, shrink_threshold: usize) {
        let used = self.len();
        self.clear();
        if let Some(keep) = shrink_target(used, self.capacity(), shrink_threshold) {
            self.shrink_to(keep);
        }
    }
}

impl<T: Eq + Hash, S: BuildHasher> Recycle for HashSet<T, S> {
    fn recycle(&mut self, shrink_threshold: usize) {
        let used = self.len();
        self.clear();
        if let Some(keep) = shrink_target(used, self.capacity(), shrink_threshold) {
            self.shrink_to(keep);
        }
    }
}

// Tree collections hold no spare capacity.
impl<K, V> Recycle for BTreeMap<K, V> {
    fn recycle(&mut self, _shrink_threshold: usize) {
        self.clear();
    }
}

impl<T> Recycle for BTreeSet<T> {
    fn recycle(&mut self, _shrink_threshold: usize) {
        self.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recycle_clears_contents() {
        let mut map: HashMap<u64, &str> = HashMap::new();
        map.insert(1, "a");
        map.insert(2, "b");
        map.recycle(64);
        assert!(map.is_empty());

        let mut tree = BTreeSet::from([1, 2, 3]);
        tree.recycle(64);
        assert!(tree.is_empty());
    }

    #[test]
    fn test_recycle_keeps_small_capacity() {
        let mut list: Vec<u32> = Vec::with_capacity(32);
        list.push(1);
        list.recycle(64);
        assert!(list.capacity() >= 32);
    }

    #[test]
    fn test_recycle_shrinks_oversized_capacity() {
        let mut list: Vec<u32> = Vec::with_capacity(4096);
        list.extend(0..10);
        list.recycle(64);
        assert!(list.is_empty());
        assert!(list.capacity() < 4096);
        assert!(list.capacity() >= 10);
    }

    #[test]
    fn test_recycle_keeps_well_used_capacity() {
        let mut set: HashSet<u32> = (0..200).collect();
        let before = set.capacity();
        set.recycle(64);
        assert!(set.is_empty());
        assert_eq!(set.capacity(), before);
    }
}
