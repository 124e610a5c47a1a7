//! Utility types and functions for LUE.
//!
//! This module contains fundamental types used throughout the library:
//! - [`ElementType`] / [`Datatype`] - Element types and byte orders of stored arrays
//! - [`Shape`] / [`Hyperslab`] - Array extents and selections
//! - [`Error`] / [`Result`] - Error handling

mod element;
mod error;
mod shape;

pub use element::*;
pub use error::*;
pub use shape::*;
