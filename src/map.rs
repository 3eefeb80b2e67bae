//! The sorted index.
//!
//! `SortedMap` keeps unique `Timestamp` keys in a `BTreeMap` behind a
//! reader-writer lock. The tree sits in an `Arc`: a scan clones the `Arc`
//! under the read lock and walks the tree afterwards, so it observes the map
//! as it was when the scan started. A write that lands while a scan still
//! holds the old tree copies it first.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::bounds::{Bound, ScanRange};
use crate::cursor::RangeSnapshot;
use crate::error::Result;
use crate::record::Record;
use crate::timestamp::Timestamp;

type Tree<V> = Arc<BTreeMap<Timestamp, V>>;

#[derive(Debug)]
pub struct SortedMap<V> {
    records: RwLock<Tree<V>>,
}

impl<V> Default for SortedMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone> FromIterator<Record<V>> for SortedMap<V> {
    fn from_iter<I: IntoIterator<Item = Record<V>>>(iter: I) -> Self {
        Self::with_records(iter)
    }
}

impl<V> SortedMap<V> {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Arc::new(BTreeMap::new())),
        }
    }

    // Poisoning is ignored: every critical section leaves the map valid.
    fn read(&self) -> RwLockReadGuard<'_, Tree<V>> {
        self.records.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Tree<V>> {
        self.records.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn has(&self, key: Timestamp) -> bool {
        self.read().contains_key(&key)
    }

    pub fn batch_has(&self, keys: impl IntoIterator<Item = Timestamp>) -> Vec<bool> {
        let guard = self.read();
        keys.into_iter().map(|key| guard.contains_key(&key)).collect()
    }

    /// All keys in ascending order.
    pub fn keys(&self) -> Vec<Timestamp> {
        self.read().keys().copied().collect()
    }

    /// Keys inside the resolved range, ascending.
    pub fn bounded_keys(
        &self,
        lower: impl Into<Bound>,
        upper: impl Into<Bound>,
    ) -> Result<Vec<Timestamp>> {
        let range = ScanRange::resolve(false, lower.into(), upper.into())?;
        Ok(self
            .read()
            .range(range.lower()..=range.upper())
            .map(|(key, _)| *key)
            .collect())
    }

    /// The smallest and largest stored keys, if any.
    pub fn extent(&self) -> Option<(Timestamp, Timestamp)> {
        let guard = self.read();
        let (min, _) = guard.first_key_value()?;
        let (max, _) = guard.last_key_value()?;
        Some((*min, *max))
    }

    /// Point-in-time view of the records inside `range`.
    pub fn range_snapshot(&self, range: ScanRange) -> RangeSnapshot<V> {
        RangeSnapshot::new(Arc::clone(&*self.read()), range)
    }

    /// Resolves the bounds and takes a view of the resolved range.
    pub fn bounded_snapshot(
        &self,
        reversed: bool,
        lower: impl Into<Bound>,
        upper: impl Into<Bound>,
    ) -> Result<RangeSnapshot<V>> {
        let range = ScanRange::resolve(reversed, lower.into(), upper.into())?;
        Ok(self.range_snapshot(range))
    }
}

impl<V: Clone> SortedMap<V> {
    /// Builds a map from `records`. Later duplicates of a key are ignored.
    pub fn with_records(records: impl IntoIterator<Item = Record<V>>) -> Self {
        let map = Self::new();
        map.batch_insert(records);
        map
    }

    fn modify<R>(&self, f: impl FnOnce(&mut BTreeMap<Timestamp, V>) -> R) -> R {
        let mut guard = self.write();
        f(Arc::make_mut(&mut *guard))
    }

    /// Inserts `value` under `key` unless the key is already present.
    ///
    /// Returns `true` if the record was inserted.
    pub fn insert(&self, key: Timestamp, value: V) -> bool {
        self.modify(|records| insert_vacant(records, key, value))
    }

    pub fn batch_insert(&self, records: impl IntoIterator<Item = Record<V>>) -> Vec<bool> {
        self.modify(|tree| {
            records
                .into_iter()
                .map(|record| insert_vacant(tree, record.key, record.value))
                .collect()
        })
    }

    /// Inserts or overwrites, returning the previous value for `key`.
    pub fn replace(&self, key: Timestamp, value: V) -> Option<V> {
        self.modify(|records| records.insert(key, value))
    }

    pub fn batch_replace(&self, records: impl IntoIterator<Item = Record<V>>) {
        self.modify(|tree| {
            for record in records {
                tree.insert(record.key, record.value);
            }
        })
    }

    pub fn delete(&self, key: Timestamp) -> Option<V> {
        self.modify(|records| records.remove(&key))
    }

    /// Deletes each key, reporting per key whether it was present.
    pub fn batch_delete(&self, keys: impl IntoIterator<Item = Timestamp>) -> Vec<bool> {
        self.modify(|records| {
            keys.into_iter()
                .map(|key| records.remove(&key).is_some())
                .collect()
        })
    }

    /// Deletes every record inside the resolved range.
    ///
    /// Resolution follows the same rules as a bounded scan, so equal bounds
    /// are rejected and nothing is deleted.
    pub fn bounded_delete(
        &self,
        lower: impl Into<Bound>,
        upper: impl Into<Bound>,
    ) -> Result<usize> {
        let range = ScanRange::resolve(false, lower.into(), upper.into())?;
        let removed = self.modify(|records| {
            let doomed: Vec<Timestamp> = records
                .range(range.lower()..=range.upper())
                .map(|(key, _)| *key)
                .collect();
            for key in &doomed {
                records.remove(key);
            }
            doomed.len()
        });
        log::trace!(
            "bounded delete removed {removed} records in [{}, {}]",
            range.lower(),
            range.upper()
        );
        Ok(removed)
    }

    pub fn get(&self, key: Timestamp) -> Option<V> {
        self.read().get(&key).cloned()
    }

    pub fn batch_get(&self, keys: impl IntoIterator<Item = Timestamp>) -> Vec<Option<V>> {
        let guard = self.read();
        keys.into_iter().map(|key| guard.get(&key).cloned()).collect()
    }

    /// A full copy of the map's contents.
    pub fn snapshot(&self) -> BTreeMap<Timestamp, V> {
        (**self.read()).clone()
    }
}

fn insert_vacant<V>(records: &mut BTreeMap<Timestamp, V>, key: Timestamp, value: V) -> bool {
    match records.entry(key) {
        Entry::Vacant(slot) => {
            slot.insert(value);
            true
        }
        Entry::Occupied(_) => false,
    }
}
