//! Object layer - the data model hierarchy.
//!
//! ```text
//! Dataset
//! ├── Universes
//! │   └── Universe ── Phenomena
//! └── Phenomena
//!     └── Phenomenon
//!         ├── ObjectId
//!         ├── PropertySets
//!         └── PropertySets (collection)
//!             └── PropertySet
//!                 ├── ObjectTracker
//!                 ├── Domain (time, space)
//!                 └── Properties
//!                     └── Property ── Value
//! ```

mod dataset;
pub mod domain;
pub mod object_tracker;
mod phenomenon;
pub mod property;
mod property_set;
mod universe;

pub use dataset::{dataset_exists, remove_dataset, Dataset, LUE_VERSION};
pub use domain::{Domain, SpaceDomain, SpaceDomainValue, TimeDomain, TimeDomainValue};
pub use object_tracker::{IndexArray, ObjectId, ObjectTracker};
pub use phenomenon::{create_phenomenon, Phenomena, Phenomenon};
pub use property::{Properties, Property, TypedProperties};
pub use property_set::{create_property_set, DomainDefinition, PropertySet, PropertySets};
pub use universe::{create_universe, Universe, Universes};
