//! Epochs: the reference moment time points are counted from.

use std::fmt;

use crate::container::Group;
use crate::core::aspect::{Aspect, Calendar, EpochKind};
use crate::util::Result;

/// Attribute storing the epoch's origin.
pub const EPOCH_ORIGIN_TAG: &str = "lue_epoch_origin";

/// Origin of the default epoch, in ISO 8601 format.
pub const DEFAULT_EPOCH_ORIGIN: &str = "1970-01-01T00:00:00+00:00";

/// Start of a time axis, relative to some reference event.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Epoch {
    kind: EpochKind,
    /// ISO 8601 formatted moment
    origin: Option<String>,
    calendar: Option<Calendar>,
}

impl Epoch {
    pub fn new(kind: EpochKind, origin: Option<String>, calendar: Option<Calendar>) -> Self {
        Self {
            kind,
            origin,
            calendar,
        }
    }

    /// Epoch without origin or calendar.
    pub fn from_kind(kind: EpochKind) -> Self {
        Self::new(kind, None, None)
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    pub fn with_calendar(mut self, calendar: Calendar) -> Self {
        self.calendar = Some(calendar);
        self
    }

    pub fn kind(&self) -> EpochKind {
        self.kind
    }

    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }

    pub fn calendar(&self) -> Option<Calendar> {
        self.calendar
    }

    pub fn load(group: &Group) -> Result<Self> {
        let kind = EpochKind::load(group)?;
        let origin = if group.has_attribute(EPOCH_ORIGIN_TAG) {
            Some(group.read_attribute::<String>(EPOCH_ORIGIN_TAG)?)
        } else {
            None
        };
        let calendar = if group.has_attribute(Calendar::ATTRIBUTE) {
            Some(Calendar::load(group)?)
        } else {
            None
        };
        Ok(Self::new(kind, origin, calendar))
    }

    pub fn save(&self, group: &Group) -> Result<()> {
        self.kind.save(group)?;
        if let Some(origin) = &self.origin {
            group.write_attribute(EPOCH_ORIGIN_TAG, origin.clone())?;
        }
        if let Some(calendar) = self.calendar {
            calendar.save(group)?;
        }
        Ok(())
    }
}

impl Default for Epoch {
    /// Common era, starting at the Unix epoch, Gregorian calendar.
    fn default() -> Self {
        Self::new(
            EpochKind::CommonEra,
            Some(DEFAULT_EPOCH_ORIGIN.to_string()),
            Some(Calendar::Gregorian),
        )
    }
}

impl fmt::Display for Epoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(origin) = &self.origin {
            write!(f, " {}", origin)?;
        }
        if let Some(calendar) = self.calendar {
            write!(f, " ({})", calendar)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::File;

    #[test]
    fn test_default_epoch() {
        let epoch = Epoch::default();
        assert_eq!(epoch.kind(), EpochKind::CommonEra);
        assert_eq!(epoch.origin(), Some("1970-01-01T00:00:00+00:00"));
        assert_eq!(epoch.calendar(), Some(Calendar::Gregorian));
    }

    #[test]
    fn test_save_load() {
        let root = File::create_in_memory("epoch-tests").root();

        let bare = root.create_group("bare").unwrap();
        let epoch = Epoch::from_kind(EpochKind::FormationOfEarth);
        epoch.save(&bare).unwrap();
        assert_eq!(Epoch::load(&bare).unwrap(), epoch);

        let full = root.create_group("full").unwrap();
        let epoch = Epoch::from_kind(EpochKind::CommonEra)
            .with_origin("2000-02-03")
            .with_calendar(Calendar::Gregorian);
        epoch.save(&full).unwrap();
        assert_eq!(Epoch::load(&full).unwrap(), epoch);
    }
}
