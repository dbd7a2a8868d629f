//! Timestamps and mockable clocks
//!
//! Token times are carried on the wire as fractional seconds since the Unix
//! epoch. Internally they are held as integer nanoseconds so that a value
//! survives a round trip through a token with better than microsecond
//! precision.

use std::time::{Duration, SystemTime};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

const NANOS_PER_SEC: i64 = 1_000_000_000;

/// A point in time
///
/// Represented as the number of nanoseconds elapsed since the beginning of
/// the Unix epoch on 1970/01/01 at 00:00:00 UTC. Negative values lie before
/// the epoch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Ord, PartialOrd)]
#[repr(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    /// The beginning of the Unix epoch
    pub const UNIX_EPOCH: Timestamp = Timestamp(0);

    /// The current time according to the system clock
    #[inline]
    #[must_use]
    pub fn now() -> Self {
        System.now()
    }

    /// Constructs a timestamp from nanoseconds since the Unix epoch
    #[inline]
    #[must_use]
    pub const fn from_unix_nanos(nanos: i64) -> Self {
        Self(nanos)
    }

    /// Constructs a timestamp from whole seconds since the Unix epoch
    #[inline]
    #[must_use]
    pub const fn from_unix_secs(secs: i64) -> Self {
        Self(secs.saturating_mul(NANOS_PER_SEC))
    }

    /// Constructs a timestamp from fractional seconds since the Unix epoch
    ///
    /// Values outside of the representable range saturate; `NaN` maps to
    /// the epoch.
    #[must_use]
    pub fn from_unix_secs_f64(secs: f64) -> Self {
        Self((secs * 1e9).round() as i64)
    }

    /// Nanoseconds since the Unix epoch
    #[inline]
    #[must_use]
    pub const fn as_unix_nanos(self) -> i64 {
        self.0
    }

    /// Whole seconds since the Unix epoch, rounded toward negative infinity
    #[inline]
    #[must_use]
    pub const fn as_unix_secs(self) -> i64 {
        self.0.div_euclid(NANOS_PER_SEC)
    }

    /// Fractional seconds since the Unix epoch
    #[must_use]
    pub fn as_unix_secs_f64(self) -> f64 {
        let secs = self.0.div_euclid(NANOS_PER_SEC);
        let nanos = self.0.rem_euclid(NANOS_PER_SEC);
        secs as f64 + nanos as f64 / 1e9
    }

    /// Adds a duration, saturating at the bounds of the representation
    #[must_use]
    pub fn saturating_add(self, duration: Duration) -> Self {
        let nanos = i64::try_from(duration.as_nanos()).unwrap_or(i64::MAX);
        Self(self.0.saturating_add(nanos))
    }

    /// Subtracts a duration, saturating at the bounds of the representation
    #[must_use]
    pub fn saturating_sub(self, duration: Duration) -> Self {
        let nanos = i64::try_from(duration.as_nanos()).unwrap_or(i64::MAX);
        Self(self.0.saturating_sub(nanos))
    }

    /// The absolute distance between two timestamps
    #[must_use]
    pub fn abs_diff(self, other: Self) -> Duration {
        Duration::from_nanos(self.0.abs_diff(other.0))
    }
}

impl From<SystemTime> for Timestamp {
    fn from(t: SystemTime) -> Self {
        let nanos = match t.duration_since(SystemTime::UNIX_EPOCH) {
            Ok(after) => i64::try_from(after.as_nanos()).unwrap_or(i64::MAX),
            Err(before) => i64::try_from(before.duration().as_nanos())
                .map(|n| -n)
                .unwrap_or(i64::MIN),
        };

        Self(nanos)
    }
}

impl From<Timestamp> for SystemTime {
    fn from(t: Timestamp) -> Self {
        let offset = Duration::from_nanos(t.0.unsigned_abs());
        if t.0 >= 0 {
            SystemTime::UNIX_EPOCH + offset
        } else {
            SystemTime::UNIX_EPOCH - offset
        }
    }
}

/// Serialized as a JSON number of (possibly fractional) seconds since the epoch
impl Serialize for Timestamp {
    #[inline]
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.as_unix_secs_f64().serialize(serializer)
    }
}

/// Accepts both integral and fractional seconds since the epoch
impl<'de> Deserialize<'de> for Timestamp {
    #[inline]
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Ok(Self::from_unix_secs_f64(secs))
    }
}

/// Represents a clock, which can tell the current time
pub trait Clock {
    /// Gets the current time according to this clock
    fn now(&self) -> Timestamp;
}

impl<T: Clock + ?Sized> Clock for &'_ T {
    #[inline]
    fn now(&self) -> Timestamp {
        T::now(&**self)
    }
}

/// The system clock as provided by `std::time::SystemTime`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct System;

impl Clock for System {
    #[inline]
    fn now(&self) -> Timestamp {
        Timestamp::from(SystemTime::now())
    }
}

/// A test clock which maintains the current time as internal state
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TestClock(Timestamp);

impl Clock for TestClock {
    #[inline]
    fn now(&self) -> Timestamp {
        self.0
    }
}

impl TestClock {
    /// Creates a new test clock with the specified time
    #[inline]
    pub const fn new(time: Timestamp) -> Self {
        Self(time)
    }

    /// Updates the clock's current time to `val`
    pub fn set(&mut self, val: Timestamp) {
        self.0 = val;
    }

    /// Moves the clock's current time forward by `inc`
    pub fn advance(&mut self, inc: Duration) {
        self.0 = self.0.saturating_add(inc);
    }
}
