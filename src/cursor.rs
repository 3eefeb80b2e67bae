use std::collections::btree_map;
use std::collections::BTreeMap;
use std::iter::FusedIterator;
use std::sync::Arc;

use crate::bounds::ScanRange;
use crate::record::Record;
use crate::timestamp::Timestamp;

/// Point-in-time view of the records inside one resolved range.
///
/// Taking one is O(1): it shares the map's current tree, and a writer that
/// commits while the view is alive copies the tree instead of touching it.
/// The view holds no lock.
#[derive(Debug, Clone)]
pub struct RangeSnapshot<V> {
    records: Arc<BTreeMap<Timestamp, V>>,
    range: ScanRange,
}

impl<V> RangeSnapshot<V> {
    pub(crate) fn new(records: Arc<BTreeMap<Timestamp, V>>, range: ScanRange) -> Self {
        Self { records, range }
    }

    pub fn range(&self) -> ScanRange {
        self.range
    }

    /// Number of records in the whole tree the view was taken from. The
    /// range itself never holds more.
    pub fn stored(&self) -> usize {
        self.records.len()
    }

    /// Walks the range in its direction, cloning each value as it is reached.
    pub fn iter(&self) -> RangeCursor<'_, V> {
        RangeCursor {
            records: self.records.range(self.range.lower()..=self.range.upper()),
            reversed: self.range.reversed(),
        }
    }
}

impl<'a, V: Clone> IntoIterator for &'a RangeSnapshot<V> {
    type Item = Record<V>;
    type IntoIter = RangeCursor<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Ordered, non-restartable walk over a `RangeSnapshot`.
#[derive(Debug)]
pub struct RangeCursor<'a, V> {
    records: btree_map::Range<'a, Timestamp, V>,
    reversed: bool,
}

impl<V> RangeCursor<'_, V> {
    pub fn reversed(&self) -> bool {
        self.reversed
    }
}

impl<V: Clone> Iterator for RangeCursor<'_, V> {
    type Item = Record<V>;

    fn next(&mut self) -> Option<Self::Item> {
        let next = if self.reversed {
            self.records.next_back()
        } else {
            self.records.next()
        };
        next.map(|(key, value)| Record::new(*key, value.clone()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.records.size_hint()
    }
}

impl<V: Clone> FusedIterator for RangeCursor<'_, V> {}
