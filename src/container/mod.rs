//! Hierarchical container engine.
//!
//! Stores the data model in a tree of:
//! - groups with named children
//! - N-dimensional datasets with growable axes and hyperslab I/O
//! - attributes on groups and datasets
//! - soft links, resolved transparently on open
//!
//! The whole tree is held in memory. Files are read on open and written on
//! flush, see [`File`].

mod attribute;
pub mod chunk;
mod compression;
mod dataset;
mod file;
pub mod format;
mod group;
mod node;
mod reader;
mod writer;

pub use attribute::{AttributeType, AttributeValue, Attributes};
pub use dataset::{CreationProperties, Dataset, Dataspace};
pub use file::{File, OpenMode};
pub use group::Group;
