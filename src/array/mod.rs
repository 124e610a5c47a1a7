//! Storage of property values in container datasets.
//!
//! - [`Array`] - typed view on one dataset
//! - [`same_shape`] - all object arrays share a shape
//! - [`different_shape`] - object arrays differ in shape
//! - [`Value`] - any of the above, selected by a property configuration

pub mod different_shape;
pub mod same_shape;
mod typed;
mod value;
mod value_group;

pub use typed::Array;
pub use value::{Value, ValueKind, ValueShape, ValueStrategy, ValueVariant};
pub use value_group::ValueGroup;
