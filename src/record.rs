use crate::timestamp::Timestamp;

/// An owned snapshot of one stored entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record<V> {
    pub key: Timestamp,
    pub value: V,
}

impl<V> Record<V> {
    pub fn new(key: Timestamp, value: V) -> Self {
        Self { key, value }
    }

    pub fn into_parts(self) -> (Timestamp, V) {
        (self.key, self.value)
    }
}

impl<V> From<(Timestamp, V)> for Record<V> {
    fn from((key, value): (Timestamp, V)) -> Self {
        Self { key, value }
    }
}

/// A single receive from a record stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery<V> {
    Data(Record<V>),
    /// The producer has finished or abandoned the scan. Returned for every
    /// receive once the stream is closed.
    EndOfStream,
}

impl<V> Delivery<V> {
    pub fn is_end(&self) -> bool {
        matches!(self, Delivery::EndOfStream)
    }

    pub fn into_record(self) -> Option<Record<V>> {
        match self {
            Delivery::Data(record) => Some(record),
            Delivery::EndOfStream => None,
        }
    }
}
