//! The properties of a property set.

use std::marker::PhantomData;

use super::{create_property, Property};
use crate::array::{ValueShape, ValueVariant};
use crate::container::Group;
use crate::core::tag::PROPERTIES_TAG;
use crate::core::{
    Collection, PropertyConfiguration, ShapePerObject, ShapeVariability, ValueVariability,
};
use crate::util::{Datatype, Error, Rank, Result, Shape};

/// Named collection of properties sharing one domain and object tracker.
#[derive(Debug)]
pub struct Properties {
    collection: Collection<Property>,
}

/// Create the properties group in `parent`.
pub fn create_properties(parent: &Group) -> Result<Properties> {
    Ok(Properties {
        collection: Collection::create(parent, PROPERTIES_TAG)?,
    })
}

impl Properties {
    /// Open the properties group in `parent` and all properties in it.
    pub fn open(parent: &Group) -> Result<Self> {
        Ok(Self {
            collection: Collection::open(parent, PROPERTIES_TAG)?,
        })
    }

    pub fn group(&self) -> &Group {
        self.collection.group()
    }

    pub fn len(&self) -> usize {
        self.collection.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collection.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.collection.contains(name)
    }

    pub fn names(&self) -> Vec<String> {
        self.collection.names()
    }

    pub fn get(&self, name: &str) -> Result<&Property> {
        self.collection.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Result<&mut Property> {
        self.collection.get_mut(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Property)> {
        self.collection.iter()
    }

    /// Add a property of any configuration.
    pub fn add_with(
        &mut self,
        name: &str,
        configuration: &PropertyConfiguration,
        datatype: Datatype,
        shape: ValueShape,
        description: Option<&str>,
    ) -> Result<&mut Property> {
        let property = create_property(
            self.collection.group(),
            name,
            configuration,
            datatype,
            &shape,
            description,
        )?;
        Ok(self.collection.insert(name, property))
    }

    /// Add a constant property whose object arrays all have `shape`.
    pub fn add(
        &mut self,
        name: &str,
        datatype: Datatype,
        shape: Shape,
        description: Option<&str>,
    ) -> Result<&mut Property> {
        self.add_with(
            name,
            &PropertyConfiguration::constant(ShapePerObject::Same),
            datatype,
            ValueShape::Same(shape),
            description,
        )
    }

    /// Add a constant property whose object arrays have `rank` but differ in shape.
    pub fn add_different_shape(
        &mut self,
        name: &str,
        datatype: Datatype,
        rank: Rank,
        description: Option<&str>,
    ) -> Result<&mut Property> {
        self.add_with(
            name,
            &PropertyConfiguration::constant(ShapePerObject::Different),
            datatype,
            ValueShape::Different(rank),
            description,
        )
    }

    /// Add a variable property whose object arrays always have `shape`.
    pub fn add_variable(
        &mut self,
        name: &str,
        datatype: Datatype,
        shape: Shape,
        description: Option<&str>,
    ) -> Result<&mut Property> {
        self.add_with(
            name,
            &PropertyConfiguration::variable(ShapePerObject::Same, ShapeVariability::Constant),
            datatype,
            ValueShape::Same(shape),
            description,
        )
    }

    /// Add a variable property whose object arrays share a shape per time
    /// location.
    pub fn add_variable_shape(
        &mut self,
        name: &str,
        datatype: Datatype,
        rank: Rank,
        description: Option<&str>,
    ) -> Result<&mut Property> {
        self.add_with(
            name,
            &PropertyConfiguration::variable(ShapePerObject::Same, ShapeVariability::Variable),
            datatype,
            ValueShape::Different(rank),
            description,
        )
    }

    /// Add a variable property with a constant shape per object.
    pub fn add_different_shape_variable(
        &mut self,
        name: &str,
        datatype: Datatype,
        rank: Rank,
        description: Option<&str>,
    ) -> Result<&mut Property> {
        self.add_with(
            name,
            &PropertyConfiguration::variable(ShapePerObject::Different, ShapeVariability::Constant),
            datatype,
            ValueShape::Different(rank),
            description,
        )
    }

    /// Add a variable property whose object arrays differ in shape per object
    /// and per time location.
    pub fn add_different_shape_variable_shape(
        &mut self,
        name: &str,
        datatype: Datatype,
        rank: Rank,
        description: Option<&str>,
    ) -> Result<&mut Property> {
        self.add_with(
            name,
            &PropertyConfiguration::variable(ShapePerObject::Different, ShapeVariability::Variable),
            datatype,
            ValueShape::Different(rank),
            description,
        )
    }

    pub fn shape_per_object(&self, name: &str) -> Result<ShapePerObject> {
        Ok(self.get(name)?.configuration().shape_per_object)
    }

    pub fn value_variability(&self, name: &str) -> Result<ValueVariability> {
        Ok(self.get(name)?.configuration().value_variability)
    }

    /// Shape variability of a property, `None` for constant values.
    pub fn shape_variability(&self, name: &str) -> Result<Option<ShapeVariability>> {
        Ok(self.get(name)?.configuration().shape_variability)
    }

    /// Value of property `name`, down-cast to strategy `S`.
    pub fn value_as<S: ValueVariant>(&self, name: &str) -> Result<&S> {
        self.get(name)?.value().downcast()
    }

    pub fn value_as_mut<S: ValueVariant>(&mut self, name: &str) -> Result<&mut S> {
        self.get_mut(name)?.value_mut().downcast_mut()
    }

    /// View on all properties, each of which must use strategy `S`.
    pub fn collection<S: ValueVariant>(&self) -> Result<TypedProperties<'_, S>> {
        for (_, property) in self.iter() {
            property.value().downcast::<S>().map_err(|_| {
                Error::type_mismatch(
                    format!("{} properties", S::KIND),
                    format!("{} property {}", property.kind(), property.pathname()),
                )
            })?;
        }
        Ok(TypedProperties {
            properties: self,
            _strategy: PhantomData,
        })
    }

    /// Properties using strategy `S`, skipping all others.
    pub fn of_kind<'a, S: ValueVariant + 'a>(
        &'a self,
    ) -> impl Iterator<Item = (&'a Property, &'a S)> + 'a {
        self.iter()
            .filter_map(|(_, property)| S::from_value(property.value()).map(|v| (property, v)))
    }
}

/// Properties known to share value strategy `S`.
#[derive(Debug)]
pub struct TypedProperties<'a, S> {
    properties: &'a Properties,
    _strategy: PhantomData<&'a S>,
}

impl<'a, S: ValueVariant> TypedProperties<'a, S> {
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn names(&self) -> Vec<String> {
        self.properties.names()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.properties.contains(name)
    }

    pub fn property(&self, name: &str) -> Result<&'a Property> {
        self.properties.get(name)
    }

    /// Value of property `name`.
    pub fn get(&self, name: &str) -> Result<&'a S> {
        self.properties.value_as(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a S)> + 'a {
        self.properties
            .collection
            .iter()
            .filter_map(|(name, property)| S::from_value(property.value()).map(|v| (name, v)))
    }
}
