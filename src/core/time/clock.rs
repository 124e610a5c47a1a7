//! Clocks: an epoch plus the duration of a tick.

use std::fmt;

use super::{Epoch, TickPeriodCount, TimePoint, TimeUnitMarker};
use crate::container::Group;
use crate::core::aspect::{Aspect, TimeUnit};
use crate::util::{Error, Result};

/// Attribute storing the number of units in a tick period.
pub const TICK_PERIOD_COUNT_TAG: &str = "lue_tick_period_count";

/// Duration of one clock tick: a number of time units.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TickPeriod {
    unit: TimeUnit,
    nr_units: TickPeriodCount,
}

impl TickPeriod {
    pub fn new(unit: TimeUnit, nr_units: TickPeriodCount) -> Self {
        Self { unit, nr_units }
    }

    pub fn unit(&self) -> TimeUnit {
        self.unit
    }

    pub fn nr_units(&self) -> TickPeriodCount {
        self.nr_units
    }
}

/// Clock used to interpret time domain coordinates.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Clock {
    epoch: Epoch,
    tick_period: TickPeriod,
}

impl Clock {
    /// Clock ticking every `nr_units` units, since the default epoch.
    pub fn new(unit: TimeUnit, nr_units: TickPeriodCount) -> Self {
        Self::with_epoch(Epoch::default(), unit, nr_units)
    }

    pub fn with_epoch(epoch: Epoch, unit: TimeUnit, nr_units: TickPeriodCount) -> Self {
        Self {
            epoch,
            tick_period: TickPeriod::new(unit, nr_units),
        }
    }

    /// Clock ticking in units of `U`.
    pub fn for_unit<U: TimeUnitMarker>(nr_units: TickPeriodCount) -> Self {
        Self::new(U::UNIT, nr_units)
    }

    pub fn epoch(&self) -> &Epoch {
        &self.epoch
    }

    pub fn tick_period(&self) -> TickPeriod {
        self.tick_period
    }

    pub fn unit(&self) -> TimeUnit {
        self.tick_period.unit
    }

    /// Number of time units elapsed at `time_point`.
    pub fn nr_units<U: TimeUnitMarker>(&self, time_point: &TimePoint<U>) -> Result<TickPeriodCount> {
        time_point
            .nr_ticks()
            .checked_mul(self.tick_period.nr_units())
            .ok_or_else(|| {
                Error::Overflow(format!(
                    "{} ticks of {} {}",
                    time_point.nr_ticks(),
                    self.tick_period.nr_units(),
                    self.tick_period.unit()
                ))
            })
    }

    pub fn load(group: &Group) -> Result<Self> {
        let unit = TimeUnit::load(group)?;
        let nr_units = group.read_attribute::<u64>(TICK_PERIOD_COUNT_TAG)?;
        let epoch = Epoch::load(group)?;
        Ok(Self::with_epoch(epoch, unit, nr_units))
    }

    pub fn save(&self, group: &Group) -> Result<()> {
        self.tick_period.unit.save(group)?;
        group.write_attribute(TICK_PERIOD_COUNT_TAG, self.tick_period.nr_units)?;
        self.epoch.save(group)
    }
}

impl fmt::Display for Clock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} x {} since {}",
            self.tick_period.nr_units, self.tick_period.unit, self.epoch
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::File;
    use crate::core::aspect::EpochKind;
    use crate::core::time::{unit, Duration};

    #[test]
    fn test_nr_units() {
        let clock = Clock::for_unit::<unit::Day>(7);
        let time_point = TimePoint::<unit::Day>::new(Duration::new(3));
        assert_eq!(clock.nr_units(&time_point).unwrap(), 21);
        assert_eq!(clock.unit(), TimeUnit::Day);

        let time_point = TimePoint::<unit::Day>::new(Duration::new(u64::MAX / 2));
        let error = clock.nr_units(&time_point).unwrap_err();
        assert!(matches!(error, Error::Overflow(_)));
        assert!(error.is_range_error());
    }

    #[test]
    fn test_save_load() {
        let root = File::create_in_memory("clock-tests").root();
        let clock = Clock::with_epoch(
            Epoch::from_kind(EpochKind::FormationOfEarth),
            TimeUnit::Year,
            1000,
        );
        clock.save(&root).unwrap();
        assert_eq!(Clock::load(&root).unwrap(), clock);
        assert_eq!(root.read_attribute::<u64>("lue_tick_period_count").unwrap(), 1000);
    }
}
