//! In-memory sorted map keyed by timestamps.
//!
//! Records can be scanned over a range either synchronously through a
//! callback (`iter_func`, `bounded_iter_func`) or asynchronously through a
//! channel fed by a producer thread (`iter_ch`, `bounded_iter_ch`,
//! `custom_iter_ch`). Channel scans accept a send timeout after which an
//! unread stream is abandoned, so a consumer that stops reading never
//! strands its producer.

pub mod bounds;
pub mod cursor;
pub mod error;
pub mod iter;
pub mod map;
pub mod record;
pub mod timestamp;

pub use bounds::{Bound, ScanRange};
pub use cursor::{RangeCursor, RangeSnapshot};
pub use error::{Error, Result};
pub use iter::{IterChParams, RecordStream};
pub use map::SortedMap;
pub use record::{Delivery, Record};
pub use timestamp::Timestamp;
