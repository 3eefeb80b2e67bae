//! Timestamp key type.
//!
//! A `Timestamp` is a signed second offset from the UNIX epoch plus a
//! nanosecond fraction, so it covers dates well before 1970 and far past
//! the range of a `u64` nanosecond counter.

use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

const NANOS_PER_SEC: u32 = 1_000_000_000;

/// A totally ordered point in time with nanosecond resolution.
///
/// `Timestamp::MIN` is the zero value (and `Default`); `Timestamp::MAX` is
/// the far-future value callers may pass as an explicit upper bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp {
    secs: i64,
    nanos: u32,
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::MIN
    }
}

impl Timestamp {
    pub const MIN: Timestamp = Timestamp {
        secs: i64::MIN,
        nanos: 0,
    };
    pub const MAX: Timestamp = Timestamp {
        secs: i64::MAX,
        nanos: NANOS_PER_SEC - 1,
    };
    pub const UNIX_EPOCH: Timestamp = Timestamp { secs: 0, nanos: 0 };

    /// Builds a timestamp from seconds and nanoseconds since the UNIX epoch.
    ///
    /// Nanoseconds past one second carry into `secs`, saturating at `MAX`.
    pub fn from_unix(secs: i64, nanos: u32) -> Self {
        let carry = i64::from(nanos / NANOS_PER_SEC);
        match secs.checked_add(carry) {
            Some(secs) => Self {
                secs,
                nanos: nanos % NANOS_PER_SEC,
            },
            None => Self::MAX,
        }
    }

    pub fn from_unix_nanos(nanos: i128) -> Self {
        let per_sec = i128::from(NANOS_PER_SEC);
        let secs = nanos.div_euclid(per_sec);
        let frac = nanos.rem_euclid(per_sec) as u32;
        match i64::try_from(secs) {
            Ok(secs) => Self { secs, nanos: frac },
            Err(_) if secs < 0 => Self::MIN,
            Err(_) => Self::MAX,
        }
    }

    pub fn now() -> Self {
        SystemTime::now().into()
    }

    pub fn unix_seconds(&self) -> i64 {
        self.secs
    }

    pub fn subsec_nanos(&self) -> u32 {
        self.nanos
    }

    pub fn as_unix_nanos(&self) -> i128 {
        i128::from(self.secs) * i128::from(NANOS_PER_SEC) + i128::from(self.nanos)
    }

    pub fn checked_add(&self, duration: Duration) -> Option<Self> {
        let secs = i64::try_from(duration.as_secs()).ok()?;
        let mut secs = self.secs.checked_add(secs)?;
        let mut nanos = self.nanos + duration.subsec_nanos();
        if nanos >= NANOS_PER_SEC {
            nanos -= NANOS_PER_SEC;
            secs = secs.checked_add(1)?;
        }
        Some(Self { secs, nanos })
    }

    pub fn checked_sub(&self, duration: Duration) -> Option<Self> {
        let secs = i64::try_from(duration.as_secs()).ok()?;
        let mut secs = self.secs.checked_sub(secs)?;
        let sub = duration.subsec_nanos();
        let nanos = if self.nanos >= sub {
            self.nanos - sub
        } else {
            secs = secs.checked_sub(1)?;
            self.nanos + NANOS_PER_SEC - sub
        };
        Some(Self { secs, nanos })
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match OffsetDateTime::try_from(*self) {
            Ok(datetime) => write!(f, "{datetime}"),
            Err(_) => write!(f, "{}.{:09}s", self.secs, self.nanos),
        }
    }
}

impl From<SystemTime> for Timestamp {
    fn from(value: SystemTime) -> Self {
        match value.duration_since(UNIX_EPOCH) {
            Ok(after) => Timestamp::UNIX_EPOCH
                .checked_add(after)
                .unwrap_or(Timestamp::MAX),
            Err(err) => Timestamp::UNIX_EPOCH
                .checked_sub(err.duration())
                .unwrap_or(Timestamp::MIN),
        }
    }
}

impl From<OffsetDateTime> for Timestamp {
    fn from(value: OffsetDateTime) -> Self {
        Self {
            secs: value.unix_timestamp(),
            nanos: value.nanosecond(),
        }
    }
}

impl TryFrom<Timestamp> for OffsetDateTime {
    type Error = time::error::ComponentRange;

    fn try_from(value: Timestamp) -> Result<Self, Self::Error> {
        OffsetDateTime::from_unix_timestamp_nanos(value.as_unix_nanos())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn min_is_default_and_smallest() {
        assert_eq!(Timestamp::default(), Timestamp::MIN);
        assert!(Timestamp::MIN < Timestamp::UNIX_EPOCH);
        assert!(Timestamp::UNIX_EPOCH < Timestamp::MAX);
        assert!(Timestamp::now() < Timestamp::MAX);
    }

    #[test]
    fn unix_nanos_handles_negative_offsets() {
        let ts = Timestamp::from_unix_nanos(-1);
        assert_eq!(ts.unix_seconds(), -1);
        assert_eq!(ts.subsec_nanos(), 999_999_999);
        assert_eq!(ts.as_unix_nanos(), -1);
        assert!(ts < Timestamp::UNIX_EPOCH);
    }

    #[test]
    fn unix_nanos_saturates() {
        assert_eq!(Timestamp::from_unix_nanos(i128::MAX), Timestamp::MAX);
        assert_eq!(Timestamp::from_unix_nanos(i128::MIN), Timestamp::MIN);
    }

    #[test]
    fn from_unix_carries_nanos() {
        let ts = Timestamp::from_unix(10, 2_500_000_000);
        assert_eq!(ts.unix_seconds(), 12);
        assert_eq!(ts.subsec_nanos(), 500_000_000);
    }

    #[test]
    fn offset_datetime_conversion() {
        let date = datetime!(1970-01-01 0:00:01.5 UTC);
        let ts = Timestamp::from(date);
        assert_eq!(ts.as_unix_nanos(), 1_500_000_000);
        assert_eq!(OffsetDateTime::try_from(ts).expect("in range"), date);
        assert!(OffsetDateTime::try_from(Timestamp::MAX).is_err());
    }

    #[test]
    fn system_time_before_epoch() {
        let before = UNIX_EPOCH - Duration::from_millis(1_500);
        let ts = Timestamp::from(before);
        assert_eq!(ts.as_unix_nanos(), -1_500_000_000);
    }

    #[test]
    fn checked_arithmetic() {
        let ts = Timestamp::from_unix(1, 900_000_000);
        let later = ts.checked_add(Duration::from_millis(200)).expect("add");
        assert_eq!(later, Timestamp::from_unix(2, 100_000_000));
        let back = later.checked_sub(Duration::from_millis(200)).expect("sub");
        assert_eq!(back, ts);
        assert!(Timestamp::MAX.checked_add(Duration::from_secs(1)).is_none());
        assert!(Timestamp::MIN.checked_sub(Duration::from_nanos(1)).is_none());
    }
}
