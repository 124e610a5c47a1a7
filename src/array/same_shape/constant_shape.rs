//! Variable values of constant shape.
//!
//! Stored exactly like constant same-shape values, but with one row per
//! active object per time location instead of one row per object. The
//! object tracker's active object index holds the row of each active object.

pub use super::{create_value, create_value_with, ObjectArray, Value};
