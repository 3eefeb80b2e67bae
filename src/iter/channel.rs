//! Channel-delivered scans.
//!
//! Every successful `*_iter_ch` call takes a view of the requested range on
//! the caller's thread and hands it to one producer thread, which pushes the
//! records through a bounded channel. A producer with a send timeout gives
//! up on the first record the consumer does not take in time; any producer
//! stops as soon as the consumer drops its `RecordStream`.

use std::thread;
use std::time::Duration;

use crossbeam::channel::{
    self, Receiver, RecvTimeoutError, SendTimeoutError, Sender, TryRecvError,
};
use serde::{Deserialize, Serialize};

use crate::bounds::{Bound, ScanRange};
use crate::cursor::RangeSnapshot;
use crate::error::{Error, Result};
use crate::map::SortedMap;
use crate::record::{Delivery, Record};

const PRODUCER_THREAD_NAME: &str = "sortedmap-iter";

/// Options for a channel scan.
///
/// Deserializes from a partial document; missing fields take their defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IterChParams {
    /// Walk keys in descending order.
    /// Default: false
    pub reversed: bool,

    /// Default: unbounded
    pub lower_bound: Bound,

    /// Default: unbounded
    pub upper_bound: Bound,

    /// Channel capacity. 0 hands each record over directly. Values above
    /// the number of stored records are clamped to it.
    /// Default: 0
    pub buf_size: usize,

    /// Longest wait for the consumer to take one record before the scan is
    /// abandoned. `None` or zero waits indefinitely.
    /// Default: None
    pub send_timeout: Option<Duration>,
}

impl IterChParams {
    pub fn reversed(mut self, reversed: bool) -> Self {
        self.reversed = reversed;
        self
    }

    pub fn lower_bound(mut self, bound: impl Into<Bound>) -> Self {
        self.lower_bound = bound.into();
        self
    }

    pub fn upper_bound(mut self, bound: impl Into<Bound>) -> Self {
        self.upper_bound = bound.into();
        self
    }

    pub fn buf_size(mut self, buf_size: usize) -> Self {
        self.buf_size = buf_size;
        self
    }

    pub fn send_timeout(mut self, timeout: Duration) -> Self {
        self.send_timeout = Some(timeout);
        self
    }

    fn effective_timeout(&self) -> Option<Duration> {
        self.send_timeout.filter(|timeout| !timeout.is_zero())
    }
}

/// Receiving end of a channel scan.
///
/// Once the producer is done, every receive returns `Delivery::EndOfStream`.
/// A stream that ended early because the send timeout fired looks the same
/// as one that delivered every record.
#[derive(Debug)]
pub struct RecordStream<V> {
    rx: Receiver<Record<V>>,
}

impl<V> RecordStream<V> {
    /// Blocks until the next record arrives or the stream ends.
    pub fn recv(&self) -> Delivery<V> {
        match self.rx.recv() {
            Ok(record) => Delivery::Data(record),
            Err(_) => Delivery::EndOfStream,
        }
    }

    /// Like `recv`, but returns `None` if nothing arrived within `timeout`
    /// while the stream is still open.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<Delivery<V>> {
        match self.rx.recv_timeout(timeout) {
            Ok(record) => Some(Delivery::Data(record)),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => Some(Delivery::EndOfStream),
        }
    }

    pub fn try_recv(&self) -> Option<Delivery<V>> {
        match self.rx.try_recv() {
            Ok(record) => Some(Delivery::Data(record)),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Delivery::EndOfStream),
        }
    }

    /// Records buffered and ready to receive.
    pub fn buffered(&self) -> usize {
        self.rx.len()
    }
}

impl<V> Iterator for RecordStream<V> {
    type Item = Record<V>;

    fn next(&mut self) -> Option<Self::Item> {
        self.recv().into_record()
    }
}

impl<V: Clone + Send + Sync + 'static> SortedMap<V> {
    /// Streams the whole map.
    pub fn iter_ch(&self, reversed: bool) -> Result<RecordStream<V>> {
        spawn_producer(self.range_snapshot(ScanRange::full(reversed)), 0, None)
    }

    /// Streams the records between two bounds with no buffering and no
    /// send timeout.
    pub fn bounded_iter_ch(
        &self,
        reversed: bool,
        lower: impl Into<Bound>,
        upper: impl Into<Bound>,
    ) -> Result<RecordStream<V>> {
        self.custom_iter_ch(
            IterChParams::default()
                .reversed(reversed)
                .lower_bound(lower)
                .upper_bound(upper),
        )
    }

    /// Streams a range with every option exposed.
    ///
    /// Returns `Error::InvalidRange` without starting a producer when both
    /// bounds resolve to the same instant.
    pub fn custom_iter_ch(&self, params: IterChParams) -> Result<RecordStream<V>> {
        let snapshot =
            self.bounded_snapshot(params.reversed, params.lower_bound, params.upper_bound)?;
        spawn_producer(snapshot, params.buf_size, params.effective_timeout())
    }
}

fn spawn_producer<V: Clone + Send + Sync + 'static>(
    snapshot: RangeSnapshot<V>,
    buf_size: usize,
    send_timeout: Option<Duration>,
) -> Result<RecordStream<V>> {
    // The array flavor allocates its whole capacity up front.
    let (tx, rx) = channel::bounded(buf_size.min(snapshot.stored()));
    thread::Builder::new()
        .name(PRODUCER_THREAD_NAME.to_string())
        .spawn(move || {
            let (sent, end) = produce(&snapshot, &tx, send_timeout);
            match end {
                ScanEnd::Completed => log::trace!("iterator delivered {sent} records"),
                ScanEnd::TimedOut => log::debug!(
                    "iterator abandoned after {sent} records: send timeout {:?} elapsed",
                    send_timeout.unwrap_or_default()
                ),
                ScanEnd::ConsumerGone => {
                    log::debug!("iterator stopped after {sent} records: receiver dropped")
                }
            }
        })
        .map_err(Error::Spawn)?;
    Ok(RecordStream { rx })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanEnd {
    Completed,
    TimedOut,
    ConsumerGone,
}

fn produce<V>(
    records: impl IntoIterator<Item = Record<V>>,
    tx: &Sender<Record<V>>,
    send_timeout: Option<Duration>,
) -> (usize, ScanEnd) {
    let mut sent = 0;
    for record in records {
        let delivered = match send_timeout {
            Some(timeout) => tx.send_timeout(record, timeout).map_err(|err| match err {
                SendTimeoutError::Timeout(_) => ScanEnd::TimedOut,
                SendTimeoutError::Disconnected(_) => ScanEnd::ConsumerGone,
            }),
            None => tx.send(record).map_err(|_| ScanEnd::ConsumerGone),
        };
        if let Err(end) = delivered {
            return (sent, end);
        }
        sent += 1;
    }
    (sent, ScanEnd::Completed)
}
