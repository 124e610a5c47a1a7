//! Properties: named values recorded for the objects of a property set.
//!
//! A property group holds:
//! - the aspects of its [`PropertyConfiguration`]
//! - an optional description
//! - its value, `lue_value`, laid out per the configuration
//! - optional soft links to the properties discretizing its time and space
//!   domain items

mod properties;

pub use properties::{create_properties, Properties, TypedProperties};

use tracing::debug;

use crate::array::{Value, ValueKind, ValueShape, ValueStrategy};
use crate::container::Group;
use crate::core::tag::{
    DESCRIPTION_TAG, SPACE_DISCRETIZATION_TAG, TIME_DISCRETIZATION_TAG, VALUE_TAG,
};
use crate::core::{
    check_item_name, Aspect, CollectionItem, Configuration, PropertyConfiguration,
    SpaceDiscretization, TimeDiscretization,
};
use crate::util::{file_datatype, Datatype, Error, Result};

/// A named value plus its metadata.
#[derive(Clone, Debug)]
pub struct Property {
    group: Group,
    configuration: PropertyConfiguration,
    value: Value,
}

/// Create property `name` in `parent`, storing elements of `datatype`.
///
/// Values are persisted little-endian and read back as `datatype`.
pub fn create_property(
    parent: &Group,
    name: &str,
    configuration: &PropertyConfiguration,
    datatype: Datatype,
    shape: &ValueShape,
    description: Option<&str>,
) -> Result<Property> {
    check_item_name(parent, name)?;
    if parent.contains(name) {
        return Err(Error::AlreadyExists(parent.child_pathname(name)));
    }
    let kind = ValueKind::of(configuration);
    shape.check(kind)?;

    let group = parent.create_group(name)?;
    configuration.save(&group)?;
    if let Some(description) = description {
        group.write_attribute(DESCRIPTION_TAG, description.to_string())?;
    }
    let value = Value::create(
        &group,
        VALUE_TAG,
        configuration,
        file_datatype(&datatype),
        datatype,
        shape,
    )?;
    debug!(path = %group.pathname(), %kind, datatype = %datatype, "created property");

    Ok(Property {
        group,
        configuration: *configuration,
        value,
    })
}

impl Property {
    /// Open property `name` in `parent`, following a soft link.
    pub fn open(parent: &Group, name: &str) -> Result<Self> {
        Self::from_group(parent.open_required_group(name)?)
    }

    pub fn from_group(group: Group) -> Result<Self> {
        let configuration = PropertyConfiguration::load(&group)?;
        let value = Value::open(&group, VALUE_TAG, &configuration, None)?;
        Ok(Self {
            group,
            configuration,
            value,
        })
    }

    pub fn group(&self) -> &Group {
        &self.group
    }

    pub fn name(&self) -> &str {
        self.group.name()
    }

    pub fn pathname(&self) -> String {
        self.group.pathname()
    }

    pub fn description(&self) -> Result<Option<String>> {
        self.group.read_optional_attribute(DESCRIPTION_TAG)
    }

    pub fn configuration(&self) -> &PropertyConfiguration {
        &self.configuration
    }

    /// Storage layout of the value.
    pub fn kind(&self) -> ValueKind {
        self.value.kind()
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn value_mut(&mut self) -> &mut Value {
        &mut self.value
    }

    fn set_discretization(&self, tag: &str, property: &Property) -> Result<()> {
        if self.group.contains(tag) {
            return Err(Error::DiscretizationAlreadySet(self.group.child_pathname(tag)));
        }
        self.group.create_soft_link(tag, &property.pathname())?;
        debug!(path = %self.pathname(), link = tag, target = %property.pathname(), "set discretization");
        Ok(())
    }

    /// Record that `property` discretizes the time domain items of this property.
    pub fn set_time_discretization(
        &self,
        discretization: TimeDiscretization,
        property: &Property,
    ) -> Result<()> {
        self.set_discretization(TIME_DISCRETIZATION_TAG, property)?;
        discretization.save(&self.group)
    }

    /// Record that `property` discretizes the space domain items of this property.
    pub fn set_space_discretization(
        &self,
        discretization: SpaceDiscretization,
        property: &Property,
    ) -> Result<()> {
        self.set_discretization(SPACE_DISCRETIZATION_TAG, property)?;
        discretization.save(&self.group)
    }

    pub fn time_is_discretized(&self) -> bool {
        self.group.contains(TIME_DISCRETIZATION_TAG)
    }

    pub fn space_is_discretized(&self) -> bool {
        self.group.contains(SPACE_DISCRETIZATION_TAG)
    }

    pub fn time_discretization_type(&self) -> Result<TimeDiscretization> {
        TimeDiscretization::load(&self.group)
    }

    pub fn space_discretization_type(&self) -> Result<SpaceDiscretization> {
        SpaceDiscretization::load(&self.group)
    }

    /// Property discretizing the time domain items of this property.
    pub fn time_discretization_property(&self) -> Result<Property> {
        Property::open(&self.group, TIME_DISCRETIZATION_TAG)
    }

    /// Property discretizing the space domain items of this property.
    pub fn space_discretization_property(&self) -> Result<Property> {
        Property::open(&self.group, SPACE_DISCRETIZATION_TAG)
    }
}

impl CollectionItem for Property {
    fn open(parent: &Group, name: &str) -> Result<Self> {
        Property::open(parent, name)
    }
}
