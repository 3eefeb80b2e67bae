#![allow(dead_code)]

use sortedmap::{Record, RecordStream, SortedMap, Timestamp};

/// Deterministic xorshift so failures reproduce.
struct XorShift(u64);

impl XorShift {
    fn next(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
}

/// A map of `count` records with distinct keys between the UNIX epoch and
/// now. Each value is the key's nanosecond offset.
pub fn random_map(count: usize) -> SortedMap<i128> {
    let now = Timestamp::now().as_unix_nanos() as u64;
    let mut rng = XorShift(0x9e37_79b9_7f4a_7c15);
    let map = SortedMap::new();
    while map.len() < count {
        let nanos = i128::from(rng.next() % now);
        map.insert(Timestamp::from_unix_nanos(nanos), nanos);
    }
    map
}

/// Drains a stream, asserting every record is in order for the direction.
pub fn drain_ordered(stream: RecordStream<i128>, reversed: bool) -> Vec<Record<i128>> {
    let records: Vec<Record<i128>> = stream.collect();
    assert_ordered(&records, reversed);
    records
}

pub fn assert_ordered<V>(records: &[Record<V>], reversed: bool) {
    for pair in records.windows(2) {
        if reversed {
            assert!(pair[0].key > pair[1].key, "descending order violated");
        } else {
            assert!(pair[0].key < pair[1].key, "ascending order violated");
        }
    }
}

pub fn keys<V>(records: &[Record<V>]) -> Vec<Timestamp> {
    records.iter().map(|record| record.key).collect()
}
