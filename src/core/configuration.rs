//! Configurations: fixed combinations of aspects.
//!
//! A configuration is chosen when a node is created and persisted as the
//! node's aspect attributes. Reopening a node loads its configuration, after
//! which the matching storage layout is selected.

use crate::container::Group;
use crate::util::Result;

use super::aspect::{
    Aspect, Mobility, ShapePerObject, ShapeVariability, SpaceDomainItemType, TimeDomainItemType,
    ValueVariability,
};

/// A set of aspects persisted together.
pub trait Configuration: Sized {
    fn load(group: &Group) -> Result<Self>;

    fn save(&self, group: &Group) -> Result<()>;

    /// Typed access to one of the configuration's aspects.
    fn value<A: Aspect>(&self) -> A
    where
        Self: HasAspect<A>,
    {
        HasAspect::<A>::aspect(self)
    }
}

/// Configurations containing aspect `A`.
pub trait HasAspect<A: Aspect> {
    fn aspect(&self) -> A;
}

/// How a property's values are shaped and how they vary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PropertyConfiguration {
    pub shape_per_object: ShapePerObject,
    pub value_variability: ValueVariability,
    /// Only present for variable values
    pub shape_variability: Option<ShapeVariability>,
}

impl PropertyConfiguration {
    /// Configuration of constant values.
    pub fn constant(shape_per_object: ShapePerObject) -> Self {
        Self {
            shape_per_object,
            value_variability: ValueVariability::Constant,
            shape_variability: None,
        }
    }

    /// Configuration of values varying through time.
    pub fn variable(shape_per_object: ShapePerObject, shape_variability: ShapeVariability) -> Self {
        Self {
            shape_per_object,
            value_variability: ValueVariability::Variable,
            shape_variability: Some(shape_variability),
        }
    }
}

impl Configuration for PropertyConfiguration {
    fn load(group: &Group) -> Result<Self> {
        let shape_per_object = ShapePerObject::load(group)?;
        let value_variability = ValueVariability::load(group)?;
        let shape_variability = match value_variability {
            ValueVariability::Constant => None,
            ValueVariability::Variable => Some(ShapeVariability::load(group)?),
        };
        Ok(Self {
            shape_per_object,
            value_variability,
            shape_variability,
        })
    }

    fn save(&self, group: &Group) -> Result<()> {
        self.shape_per_object.save(group)?;
        self.value_variability.save(group)?;
        if self.value_variability == ValueVariability::Variable {
            // Variable values without an explicit shape variability keep their shape
            self.shape_variability
                .unwrap_or(ShapeVariability::Constant)
                .save(group)?;
        }
        Ok(())
    }
}

impl HasAspect<ShapePerObject> for PropertyConfiguration {
    fn aspect(&self) -> ShapePerObject {
        self.shape_per_object
    }
}

impl HasAspect<ValueVariability> for PropertyConfiguration {
    fn aspect(&self) -> ValueVariability {
        self.value_variability
    }
}

/// Configuration of a time domain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimeConfiguration {
    pub item_type: TimeDomainItemType,
}

impl TimeConfiguration {
    pub fn new(item_type: TimeDomainItemType) -> Self {
        Self { item_type }
    }
}

impl Configuration for TimeConfiguration {
    fn load(group: &Group) -> Result<Self> {
        Ok(Self {
            item_type: TimeDomainItemType::load(group)?,
        })
    }

    fn save(&self, group: &Group) -> Result<()> {
        self.item_type.save(group)
    }
}

impl HasAspect<TimeDomainItemType> for TimeConfiguration {
    fn aspect(&self) -> TimeDomainItemType {
        self.item_type
    }
}

/// Configuration of a space domain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SpaceConfiguration {
    pub mobility: Mobility,
    pub item_type: SpaceDomainItemType,
}

impl SpaceConfiguration {
    pub fn new(mobility: Mobility, item_type: SpaceDomainItemType) -> Self {
        Self {
            mobility,
            item_type,
        }
    }
}

impl Configuration for SpaceConfiguration {
    fn load(group: &Group) -> Result<Self> {
        Ok(Self {
            mobility: Mobility::load(group)?,
            item_type: SpaceDomainItemType::load(group)?,
        })
    }

    fn save(&self, group: &Group) -> Result<()> {
        self.mobility.save(group)?;
        self.item_type.save(group)
    }
}

impl HasAspect<Mobility> for SpaceConfiguration {
    fn aspect(&self) -> Mobility {
        self.mobility
    }
}

impl HasAspect<SpaceDomainItemType> for SpaceConfiguration {
    fn aspect(&self) -> SpaceDomainItemType {
        self.item_type
    }
}
