//! Callback-driven scans on the caller's thread.

use crate::bounds::{Bound, ScanRange};
use crate::cursor::RangeSnapshot;
use crate::error::Result;
use crate::map::SortedMap;
use crate::record::Record;

impl<V: Clone> SortedMap<V> {
    /// Calls `visit` for every record until it returns `false`.
    pub fn iter_func<F>(&self, reversed: bool, visit: F)
    where
        F: FnMut(Record<V>) -> bool,
    {
        walk(&self.range_snapshot(ScanRange::full(reversed)), visit);
    }

    /// Calls `visit` for every record between two bounds until it returns
    /// `false`.
    ///
    /// `visit` works on a snapshot and may call back into this map. Values
    /// are cloned only for the records it is actually handed. On
    /// `Error::InvalidRange` it is never called.
    pub fn bounded_iter_func<F>(
        &self,
        reversed: bool,
        lower: impl Into<Bound>,
        upper: impl Into<Bound>,
        visit: F,
    ) -> Result<()>
    where
        F: FnMut(Record<V>) -> bool,
    {
        walk(&self.bounded_snapshot(reversed, lower, upper)?, visit);
        Ok(())
    }
}

fn walk<V, F>(snapshot: &RangeSnapshot<V>, mut visit: F)
where
    V: Clone,
    F: FnMut(Record<V>) -> bool,
{
    for record in snapshot {
        if !visit(record) {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::timestamp::Timestamp;

    /// Payload that counts how often it is cloned.
    #[derive(Debug)]
    struct Counted(Arc<AtomicUsize>);

    impl Clone for Counted {
        fn clone(&self) -> Self {
            self.0.fetch_add(1, Ordering::SeqCst);
            Self(Arc::clone(&self.0))
        }
    }

    fn populated(count: i64) -> SortedMap<i64> {
        (0..count)
            .map(|i| Record::new(Timestamp::from_unix(i, 0), i))
            .collect()
    }

    #[test]
    fn stops_on_first_false() {
        let map = populated(10);
        for reversed in [false, true] {
            let mut calls = 0;
            map.iter_func(reversed, |_| {
                calls += 1;
                false
            });
            assert_eq!(calls, 1);
        }
    }

    #[test]
    fn visits_in_requested_order() {
        let map = populated(5);
        let mut seen = Vec::new();
        map.iter_func(true, |record| {
            seen.push(record.value);
            true
        });
        assert_eq!(seen, vec![4, 3, 2, 1, 0]);
    }

    #[test]
    fn visit_may_mutate_the_map() {
        let map = populated(3);
        map.iter_func(false, |record| {
            map.delete(record.key);
            true
        });
        assert!(map.is_empty());
    }

    #[test]
    fn early_stop_clones_only_visited_records() {
        let clones = Arc::new(AtomicUsize::new(0));
        let map: SortedMap<Counted> = (0..10_000)
            .map(|i| Record::new(Timestamp::from_unix(i, 0), Counted(Arc::clone(&clones))))
            .collect();
        assert_eq!(clones.load(Ordering::SeqCst), 0);

        let mut calls = 0;
        map.iter_func(false, |_| {
            calls += 1;
            false
        });
        assert_eq!(calls, 1);
        assert_eq!(clones.load(Ordering::SeqCst), 1);

        let lower = Timestamp::from_unix(10, 0);
        let upper = Timestamp::from_unix(500, 0);
        map.bounded_iter_func(true, lower, upper, |record| {
            record.key > Timestamp::from_unix(498, 0)
        })
        .expect("range");
        assert_eq!(clones.load(Ordering::SeqCst), 4);
    }
}
