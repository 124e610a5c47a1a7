//! Time domains: the locations in time at which objects are active.
//!
//! Coordinates are tick counts of the domain's [`Clock`]:
//! - points hold one count per location
//! - boxes hold a begin and end count per location
//! - cells are boxes plus, per box, the number of equally sized cells it is
//!   divided into

use tracing::debug;

use crate::array::same_shape::{self, create_value};
use crate::container::Group;
use crate::core::tag::{COUNT_TAG, TIME_DOMAIN_TAG, VALUE_TAG};
use crate::core::{Clock, Configuration, TimeConfiguration, TimeDomainItemType};
use crate::util::{file_datatype, Count, Datatype, Error, Index, IndexRange, Result, Shape};

/// Coordinates of a time domain, laid out per item type.
#[derive(Clone, Debug)]
pub enum TimeDomainValue {
    Point(same_shape::Value),
    Box(same_shape::Value),
    Cell {
        boxes: same_shape::Value,
        counts: same_shape::Value,
    },
}

fn tick_datatype() -> Datatype {
    Datatype::native_of::<u64>()
}

fn coordinate_shape(item_type: TimeDomainItemType) -> Shape {
    match item_type {
        TimeDomainItemType::Point => Shape::scalar(),
        TimeDomainItemType::Box | TimeDomainItemType::Cell => Shape::from([2]),
    }
}

impl TimeDomainValue {
    fn create(group: &Group, item_type: TimeDomainItemType) -> Result<Self> {
        let memory = tick_datatype();
        let coordinates = create_value(
            group,
            VALUE_TAG,
            file_datatype(&memory),
            memory,
            &coordinate_shape(item_type),
        )?;
        Ok(match item_type {
            TimeDomainItemType::Point => Self::Point(coordinates),
            TimeDomainItemType::Box => Self::Box(coordinates),
            TimeDomainItemType::Cell => Self::Cell {
                boxes: coordinates,
                counts: create_value(
                    group,
                    COUNT_TAG,
                    file_datatype(&memory),
                    memory,
                    &Shape::scalar(),
                )?,
            },
        })
    }

    fn open(group: &Group, item_type: TimeDomainItemType) -> Result<Self> {
        let coordinates = same_shape::Value::open_with(group, VALUE_TAG, tick_datatype())?;
        let expected = coordinate_shape(item_type);
        if coordinates.array_shape() != &expected {
            return Err(Error::shape_mismatch(
                coordinates.array().pathname(),
                &expected,
                coordinates.array_shape(),
            ));
        }
        Ok(match item_type {
            TimeDomainItemType::Point => Self::Point(coordinates),
            TimeDomainItemType::Box => Self::Box(coordinates),
            TimeDomainItemType::Cell => Self::Cell {
                boxes: coordinates,
                counts: same_shape::Value::open_with(group, COUNT_TAG, tick_datatype())?,
            },
        })
    }

    pub fn item_type(&self) -> TimeDomainItemType {
        match self {
            Self::Point(_) => TimeDomainItemType::Point,
            Self::Box(_) => TimeDomainItemType::Box,
            Self::Cell { .. } => TimeDomainItemType::Cell,
        }
    }

    /// Coordinates: points, or begin and end of boxes.
    pub fn coordinates(&self) -> &same_shape::Value {
        match self {
            Self::Point(value) | Self::Box(value) => value,
            Self::Cell { boxes, .. } => boxes,
        }
    }

    /// Number of cells per box, for cell domains only.
    pub fn count(&self) -> Option<&same_shape::Value> {
        match self {
            Self::Cell { counts, .. } => Some(counts),
            _ => None,
        }
    }

    /// Number of stored locations in time.
    pub fn nr_items(&self) -> Result<Count> {
        self.coordinates().nr_arrays()
    }

    /// Append point or box coordinates, returning the index of the first
    /// new item.
    pub fn append(&self, coordinates: &[u64]) -> Result<Index> {
        if let Self::Cell { .. } = self {
            return Err(Error::type_mismatch(
                "time points or boxes",
                "time cells, append with their counts",
            ));
        }
        self.append_items(coordinates)
    }

    /// Append boxes together with the number of cells in each.
    pub fn append_cells(&self, boxes: &[u64], counts: &[u64]) -> Result<Index> {
        let Self::Cell { counts: values, .. } = self else {
            return Err(Error::type_mismatch("time cells", self.item_type()));
        };
        if boxes.len() != 2 * counts.len() {
            return Err(Error::shape_mismatch(
                values.array().pathname(),
                format!("{} counts", boxes.len() / 2),
                format!("{} counts", counts.len()),
            ));
        }
        let first = self.append_items(boxes)?;
        values.expand(counts.len() as Count)?;
        values.write_range(IndexRange::new(first, first + counts.len() as Count), counts)?;
        Ok(first)
    }

    fn append_items(&self, coordinates: &[u64]) -> Result<Index> {
        let value = self.coordinates();
        let per_item = value.array_shape().nr_elements() as usize;
        if coordinates.len() % per_item != 0 {
            return Err(Error::shape_mismatch(
                value.array().pathname(),
                format!("multiple of {per_item} coordinates"),
                coordinates.len(),
            ));
        }
        let nr_items = (coordinates.len() / per_item) as Count;
        let first = value.expand(nr_items)?;
        value.write_range(IndexRange::new(first, first + nr_items), coordinates)?;
        Ok(first)
    }
}

/// Time domain of a property set, possibly shared with others.
#[derive(Clone, Debug)]
pub struct TimeDomain {
    group: Group,
    configuration: TimeConfiguration,
    clock: Clock,
    value: TimeDomainValue,
}

/// Create a time domain in the domain group `parent`.
pub fn create_time_domain(
    parent: &Group,
    configuration: TimeConfiguration,
    clock: Clock,
) -> Result<TimeDomain> {
    let group = parent.create_group(TIME_DOMAIN_TAG)?;
    configuration.save(&group)?;
    clock.save(&group)?;
    let value = TimeDomainValue::create(&group, configuration.item_type)?;
    debug!(path = %group.pathname(), item_type = %configuration.item_type, %clock, "created time domain");

    Ok(TimeDomain {
        group,
        configuration,
        clock,
        value,
    })
}

/// Make the domain group `parent` share the time domain of another property set.
pub fn link_time_domain(parent: &Group, time_domain: &TimeDomain) -> Result<TimeDomain> {
    parent.create_soft_link(TIME_DOMAIN_TAG, &time_domain.pathname())?;
    debug!(
        path = %parent.child_pathname(TIME_DOMAIN_TAG),
        target = %time_domain.pathname(),
        "linked time domain"
    );
    TimeDomain::open(parent)
}

/// Whether the time domain in the domain group `parent` is a link.
pub fn has_linked_time_domain(parent: &Group) -> bool {
    parent.is_soft_link(TIME_DOMAIN_TAG)
}

impl TimeDomain {
    /// Open the time domain in the domain group `parent`, following a link.
    pub fn open(parent: &Group) -> Result<Self> {
        let group = parent.open_required_group(TIME_DOMAIN_TAG)?;
        let configuration = TimeConfiguration::load(&group)?;
        let clock = Clock::load(&group)?;
        let value = TimeDomainValue::open(&group, configuration.item_type)?;
        Ok(Self {
            group,
            configuration,
            clock,
            value,
        })
    }

    pub fn group(&self) -> &Group {
        &self.group
    }

    pub fn pathname(&self) -> String {
        self.group.pathname()
    }

    pub fn configuration(&self) -> TimeConfiguration {
        self.configuration
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn value(&self) -> &TimeDomainValue {
        &self.value
    }

    pub fn value_mut(&mut self) -> &mut TimeDomainValue {
        &mut self.value
    }
}
