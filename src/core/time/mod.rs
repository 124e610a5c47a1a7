//! Time: clocks, epochs, durations and time points.
//!
//! Durations and time points carry their tick unit in their type, so only
//! values counted in the same unit can be compared or combined.

mod clock;
mod epoch;

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::ops::{Add, Sub};

pub use clock::*;
pub use epoch::*;

pub use crate::core::aspect::{Calendar, EpochKind, TimeUnit};

/// Count of tick periods, as stored in time domains.
pub type TickPeriodCount = u64;

/// Type-level time unit.
pub trait TimeUnitMarker: Copy + fmt::Debug + 'static {
    const UNIT: TimeUnit;
}

/// Marker types of the time units.
pub mod unit {
    use super::{TimeUnit, TimeUnitMarker};

    macro_rules! unit_marker {
        ($($name:ident),+) => {
            $(
                #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
                pub struct $name;

                impl TimeUnitMarker for $name {
                    const UNIT: TimeUnit = TimeUnit::$name;
                }
            )+
        };
    }

    unit_marker!(Second, Minute, Hour, Day, Week, Month, Year);
}

/// Amount of time, counted in ticks of unit `U`.
pub struct Duration<U> {
    nr_ticks: TickPeriodCount,
    _unit: PhantomData<U>,
}

impl<U: TimeUnitMarker> Duration<U> {
    pub const fn new(nr_ticks: TickPeriodCount) -> Self {
        Self {
            nr_ticks,
            _unit: PhantomData,
        }
    }

    pub const fn nr_ticks(&self) -> TickPeriodCount {
        self.nr_ticks
    }

    pub fn unit(&self) -> TimeUnit {
        U::UNIT
    }
}

// Manual impls: the marker type itself need not implement these.
impl<U> Clone for Duration<U> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<U> Copy for Duration<U> {}

impl<U> PartialEq for Duration<U> {
    fn eq(&self, other: &Self) -> bool {
        self.nr_ticks == other.nr_ticks
    }
}

impl<U> Eq for Duration<U> {}

impl<U> PartialOrd for Duration<U> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<U> Ord for Duration<U> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.nr_ticks.cmp(&other.nr_ticks)
    }
}

impl<U> Hash for Duration<U> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.nr_ticks.hash(state);
    }
}

impl<U: TimeUnitMarker> fmt::Debug for Duration<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Duration({} {})", self.nr_ticks, U::UNIT)
    }
}

impl<U> Add for Duration<U> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            nr_ticks: self.nr_ticks + rhs.nr_ticks,
            _unit: PhantomData,
        }
    }
}

impl<U> Sub for Duration<U> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self {
            nr_ticks: self.nr_ticks - rhs.nr_ticks,
            _unit: PhantomData,
        }
    }
}

/// Moment in time, as a duration since the clock's epoch.
pub struct TimePoint<U> {
    since_epoch: Duration<U>,
}

impl<U: TimeUnitMarker> TimePoint<U> {
    pub const fn new(since_epoch: Duration<U>) -> Self {
        Self { since_epoch }
    }

    pub const fn time_since_epoch(&self) -> Duration<U> {
        self.since_epoch
    }

    pub const fn nr_ticks(&self) -> TickPeriodCount {
        self.since_epoch.nr_ticks
    }
}

impl<U> Clone for TimePoint<U> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<U> Copy for TimePoint<U> {}

impl<U> PartialEq for TimePoint<U> {
    fn eq(&self, other: &Self) -> bool {
        self.since_epoch == other.since_epoch
    }
}

impl<U> Eq for TimePoint<U> {}

impl<U> PartialOrd for TimePoint<U> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<U> Ord for TimePoint<U> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.since_epoch.cmp(&other.since_epoch)
    }
}

impl<U: TimeUnitMarker> fmt::Debug for TimePoint<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TimePoint({} {})", self.since_epoch.nr_ticks, U::UNIT)
    }
}

impl<U> Add<Duration<U>> for TimePoint<U> {
    type Output = Self;

    fn add(self, rhs: Duration<U>) -> Self {
        Self {
            since_epoch: self.since_epoch + rhs,
        }
    }
}

impl<U> Sub for TimePoint<U> {
    type Output = Duration<U>;

    fn sub(self, rhs: Self) -> Duration<U> {
        self.since_epoch - rhs.since_epoch
    }
}
