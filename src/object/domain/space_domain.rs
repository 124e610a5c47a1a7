//! Space domains: the locations in space of objects.
//!
//! Points hold `rank` coordinates per item, boxes `2 * rank`. Stationary items
//! are stored per object, mobile items per active object.

use tracing::debug;

use crate::array::same_shape::{self, create_value};
use crate::container::Group;
use crate::core::tag::{DISCRETIZED_PRESENCE_TAG, SPACE_DOMAIN_TAG, VALUE_TAG};
use crate::core::{Configuration, Mobility, SpaceConfiguration, SpaceDomainItemType};
use crate::object::property::Property;
use crate::util::{
    file_datatype, Count, Datatype, Element, Error, Index, IndexRange, Rank, Result, Shape,
};

/// Coordinates of a space domain, laid out per mobility and item type.
#[derive(Clone, Debug)]
pub enum SpaceDomainValue {
    StationaryPoint(same_shape::Value),
    StationaryBox(same_shape::Value),
    MobilePoint(same_shape::Value),
    MobileBox(same_shape::Value),
}

fn coordinate_shape(item_type: SpaceDomainItemType, rank: Rank) -> Shape {
    match item_type {
        SpaceDomainItemType::Point => Shape::from([rank as u64]),
        SpaceDomainItemType::Box => Shape::from([2 * rank as u64]),
    }
}

impl SpaceDomainValue {
    fn wrap(configuration: SpaceConfiguration, value: same_shape::Value) -> Self {
        match (configuration.mobility, configuration.item_type) {
            (Mobility::Stationary, SpaceDomainItemType::Point) => Self::StationaryPoint(value),
            (Mobility::Stationary, SpaceDomainItemType::Box) => Self::StationaryBox(value),
            (Mobility::Mobile, SpaceDomainItemType::Point) => Self::MobilePoint(value),
            (Mobility::Mobile, SpaceDomainItemType::Box) => Self::MobileBox(value),
        }
    }

    /// Coordinates of all stored items.
    pub fn coordinates(&self) -> &same_shape::Value {
        match self {
            Self::StationaryPoint(value)
            | Self::StationaryBox(value)
            | Self::MobilePoint(value)
            | Self::MobileBox(value) => value,
        }
    }

    pub fn is_mobile(&self) -> bool {
        matches!(self, Self::MobilePoint(_) | Self::MobileBox(_))
    }

    /// Number of spatial dimensions.
    pub fn rank(&self) -> Rank {
        let nr_coordinates = self.coordinates().array_shape().nr_elements() as Rank;
        match self {
            Self::StationaryPoint(_) | Self::MobilePoint(_) => nr_coordinates,
            Self::StationaryBox(_) | Self::MobileBox(_) => nr_coordinates / 2,
        }
    }

    pub fn nr_items(&self) -> Result<Count> {
        self.coordinates().nr_arrays()
    }

    /// Append the coordinates of whole items, returning the index of the
    /// first new item.
    pub fn append<T: Element>(&self, coordinates: &[T]) -> Result<Index> {
        let value = self.coordinates();
        let per_item = value.array_shape().nr_elements() as usize;
        if per_item == 0 || coordinates.len() % per_item != 0 {
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

/// Space domain of a property set.
#[derive(Clone, Debug)]
pub struct SpaceDomain {
    group: Group,
    configuration: SpaceConfiguration,
    value: SpaceDomainValue,
}

/// Create a space domain in the domain group `parent`, storing coordinates
/// of `datatype` in `rank` dimensions.
pub fn create_space_domain(
    parent: &Group,
    configuration: SpaceConfiguration,
    datatype: Datatype,
    rank: Rank,
) -> Result<SpaceDomain> {
    if rank == 0 {
        return Err(Error::shape_mismatch(
            parent.child_pathname(SPACE_DOMAIN_TAG),
            "rank of at least 1",
            rank,
        ));
    }
    let group = parent.create_group(SPACE_DOMAIN_TAG)?;
    configuration.save(&group)?;
    let value = create_value(
        &group,
        VALUE_TAG,
        file_datatype(&datatype),
        datatype,
        &coordinate_shape(configuration.item_type, rank),
    )?;
    debug!(
        path = %group.pathname(),
        mobility = %configuration.mobility,
        item_type = %configuration.item_type,
        rank,
        "created space domain"
    );

    Ok(SpaceDomain {
        group,
        configuration,
        value: SpaceDomainValue::wrap(configuration, value),
    })
}

impl SpaceDomain {
    /// Open the space domain in the domain group `parent`.
    pub fn open(parent: &Group) -> Result<Self> {
        let group = parent.open_required_group(SPACE_DOMAIN_TAG)?;
        let configuration = SpaceConfiguration::load(&group)?;
        let value = same_shape::Value::open(&group, VALUE_TAG)?;
        let nr_coordinates = value.array_shape().nr_elements();
        if value.array_shape().rank() != 1
            || (configuration.item_type == SpaceDomainItemType::Box && nr_coordinates % 2 != 0)
        {
            return Err(Error::shape_mismatch(
                value.array().pathname(),
                format!("coordinates of {}", configuration.item_type),
                value.array_shape(),
            ));
        }
        Ok(Self {
            group,
            configuration,
            value: SpaceDomainValue::wrap(configuration, value),
        })
    }

    pub fn group(&self) -> &Group {
        &self.group
    }

    pub fn pathname(&self) -> String {
        self.group.pathname()
    }

    pub fn configuration(&self) -> SpaceConfiguration {
        self.configuration
    }

    pub fn value(&self) -> &SpaceDomainValue {
        &self.value
    }

    pub fn value_mut(&mut self) -> &mut SpaceDomainValue {
        &mut self.value
    }

    /// Record that `property` discretizes the presence of objects within
    /// their space boxes.
    pub fn discretize_presence(&self, property: &Property) -> Result<()> {
        if self.group.contains(DISCRETIZED_PRESENCE_TAG) {
            return Err(Error::DiscretizationAlreadySet(
                self.group.child_pathname(DISCRETIZED_PRESENCE_TAG),
            ));
        }
        self.group
            .create_soft_link(DISCRETIZED_PRESENCE_TAG, &property.pathname())?;
        debug!(path = %self.pathname(), target = %property.pathname(), "discretized presence");
        Ok(())
    }

    pub fn presence_is_discretized(&self) -> bool {
        self.group.contains(DISCRETIZED_PRESENCE_TAG)
    }

    pub fn discretized_presence_property(&self) -> Result<Property> {
        Property::open(&self.group, DISCRETIZED_PRESENCE_TAG)
    }
}
