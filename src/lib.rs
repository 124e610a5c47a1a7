//! # LUE
//!
//! Rust implementation of the LUE scientific data model.
//!
//! A dataset stores phenomena: collections of objects identified by ID.
//! Property sets describe the objects of a phenomenon. Each has an object
//! tracker recording which objects are active when, an optional time and
//! space domain, and properties whose values are stored as object arrays.
//!
//! ## Modules
//!
//! - [`util`] - Element types, shapes, errors
//! - [`container`] - Hierarchical container of groups, datasets and attributes
//! - [`core`] - Aspects, configurations, clocks and named collections
//! - [`array`] - Typed arrays and the storage strategies of property values
//! - [`object`] - Datasets, phenomena, property sets, domains and properties
//! - [`validate`] - Consistency checks of whole datasets
//!
//! ## Example
//!
//! ```ignore
//! use lue::prelude::*;
//!
//! let mut dataset = Dataset::create("planets.lue", None)?;
//! let planets = dataset.add_phenomenon("planets", None)?;
//! planets.object_id().append(&[1, 2, 3])?;
//!
//! let constants = planets
//!     .property_sets_mut()
//!     .add("constants", &DomainDefinition::omnipresent())?;
//! let gravity = constants.properties_mut().add(
//!     "gravity",
//!     Datatype::native_of::<f32>(),
//!     Shape::scalar(),
//!     None,
//! )?;
//! let value = gravity.value().as_same_shape()?;
//! value.reserve(3)?;
//! value.write_all(&[9.8f32, 3.7, 24.8])?;
//!
//! lue::validate::assert_is_valid(&dataset, false)?;
//! ```

pub mod util;
pub mod container;
pub mod core;
pub mod array;
pub mod object;
pub mod validate;

// Re-export commonly used types
pub use util::{Datatype, ElementType, Error, Result, Shape};
pub use object::{Dataset, LUE_VERSION};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::array::{Value, ValueKind, ValueShape, ValueStrategy};
    pub use crate::container::OpenMode;
    pub use crate::core::{
        Clock, Mobility, PropertyConfiguration, ShapePerObject, ShapeVariability,
        SpaceConfiguration, SpaceDomainItemType, TimeConfiguration, TimeDomainItemType, TimeUnit,
        ValueVariability,
    };
    pub use crate::object::{
        Dataset, DomainDefinition, Phenomenon, Properties, Property, PropertySet, Universe,
    };
    pub use crate::util::{Count, Datatype, ElementType, Error, Id, Index, Result, Shape};
    pub use crate::validate::{assert_is_valid, validate, Issues};
}
