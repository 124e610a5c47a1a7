//! Aspects: enumerated configuration choices persisted as string tags.
//!
//! Every aspect has exactly one table mapping its values to the tags stored
//! in the container, and one attribute name under which the tag is stored.
//! Decoding an unknown tag is an error; encoding is total.

use std::fmt;

use crate::container::Group;
use crate::util::{Error, Result};

/// An enumerated configuration choice.
pub trait Aspect: Copy + Eq + fmt::Debug + 'static {
    /// Name of the aspect, for error messages.
    const NAME: &'static str;

    /// Attribute under which the aspect is persisted.
    const ATTRIBUTE: &'static str;

    /// All values and their tags.
    const TABLE: &'static [(Self, &'static str)];

    /// Tag of this value.
    fn encode(self) -> &'static str;

    /// Value of a tag.
    fn decode(tag: &str) -> Result<Self> {
        Self::TABLE
            .iter()
            .find(|(_, t)| *t == tag)
            .map(|(value, _)| *value)
            .ok_or_else(|| Error::UnrecognizedTag {
                aspect: Self::NAME,
                tag: tag.to_string(),
            })
    }

    /// Read the aspect from a group's attributes.
    fn load(group: &Group) -> Result<Self> {
        Self::decode(&group.read_attribute::<String>(Self::ATTRIBUTE)?)
    }

    /// Write the aspect to a group's attributes.
    fn save(self, group: &Group) -> Result<()> {
        group.write_attribute(Self::ATTRIBUTE, self.encode().to_string())
    }
}

macro_rules! aspect {
    (
        $(#[$meta:meta])*
        $name:ident => $attribute:literal {
            $($(#[$variant_meta:meta])* $variant:ident => $tag:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum $name {
            $($(#[$variant_meta])* $variant),+
        }

        impl Aspect for $name {
            const NAME: &'static str = stringify!($name);
            const ATTRIBUTE: &'static str = $attribute;
            const TABLE: &'static [(Self, &'static str)] = &[$((Self::$variant, $tag)),+];

            fn encode(self) -> &'static str {
                match self {
                    $(Self::$variant => $tag),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.encode())
            }
        }
    };
}

aspect! {
    /// Whether all objects' arrays share one shape.
    ShapePerObject => "lue_shape_per_item_type" {
        Same => "lue_same_shape",
        Different => "lue_different_shape",
    }
}

aspect! {
    /// Whether values change through time.
    ValueVariability => "lue_value_variability" {
        Constant => "lue_constant",
        Variable => "lue_variable",
    }
}

aspect! {
    /// Whether the shape of a variable value changes through time.
    ShapeVariability => "lue_shape_variability" {
        Constant => "lue_constant_shape",
        Variable => "lue_variable_shape",
    }
}

aspect! {
    /// Whether space domain items move through time.
    Mobility => "lue_mobility" {
        Stationary => "lue_stationary",
        Mobile => "lue_mobile",
    }
}

aspect! {
    /// Kind of location in space.
    SpaceDomainItemType => "lue_space_domain_item_type" {
        Point => "lue_point",
        Box => "lue_box",
    }
}

aspect! {
    /// Kind of location in time.
    TimeDomainItemType => "lue_time_domain_item_type" {
        Point => "lue_point",
        Box => "lue_box",
        /// Box divided into a number of equally sized cells
        Cell => "lue_cell",
    }
}

aspect! {
    /// Unit of a clock's tick period.
    TimeUnit => "lue_time_unit" {
        Second => "lue_second",
        Minute => "lue_minute",
        Hour => "lue_hour",
        Day => "lue_day",
        Week => "lue_week",
        Month => "lue_month",
        Year => "lue_year",
    }
}

aspect! {
    Calendar => "lue_epoch_calendar" {
        Gregorian => "lue_gregorian",
    }
}

aspect! {
    /// Reference event an epoch is relative to.
    EpochKind => "lue_epoch_kind" {
        CommonEra => "lue_common_era",
        FormationOfEarth => "lue_formation_of_earth",
    }
}

aspect! {
    TimeDiscretization => "lue_time_discretization_type" {
        RegularGrid => "lue_regular_grid",
    }
}

aspect! {
    SpaceDiscretization => "lue_space_discretization_type" {
        RegularGrid => "lue_regular_grid",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::File;

    fn assert_round_trip<A: Aspect>() {
        for (value, tag) in A::TABLE {
            assert_eq!(value.encode(), *tag);
            assert_eq!(A::decode(tag).unwrap(), *value);
        }
    }

    #[test]
    fn test_round_trip_all_aspects() {
        assert_round_trip::<ShapePerObject>();
        assert_round_trip::<ValueVariability>();
        assert_round_trip::<ShapeVariability>();
        assert_round_trip::<Mobility>();
        assert_round_trip::<SpaceDomainItemType>();
        assert_round_trip::<TimeDomainItemType>();
        assert_round_trip::<TimeUnit>();
        assert_round_trip::<Calendar>();
        assert_round_trip::<EpochKind>();
        assert_round_trip::<TimeDiscretization>();
        assert_round_trip::<SpaceDiscretization>();
    }

    #[test]
    fn test_unknown_tag() {
        let err = Mobility::decode("lue_flying").unwrap_err();
        assert!(matches!(
            err,
            Error::UnrecognizedTag { aspect: "Mobility", ref tag } if tag == "lue_flying"
        ));
    }

    #[test]
    fn test_tables_are_unique() {
        let tags: Vec<_> = TimeUnit::TABLE.iter().map(|(_, t)| *t).collect();
        let mut sorted = tags.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), tags.len());
    }

    #[test]
    fn test_save_load() {
        let root = File::create_in_memory("aspect-tests").root();
        Mobility::Mobile.save(&root).unwrap();
        assert_eq!(
            root.read_attribute::<String>("lue_mobility").unwrap(),
            "lue_mobile"
        );
        assert_eq!(Mobility::load(&root).unwrap(), Mobility::Mobile);

        root.write_attribute("lue_mobility", "lue_teleporting".to_string())
            .unwrap();
        assert!(matches!(
            Mobility::load(&root),
            Err(Error::UnrecognizedTag { .. })
        ));
        assert!(matches!(
            Calendar::load(&root),
            Err(Error::MissingRequiredNode(_))
        ));
    }
}
