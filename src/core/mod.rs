//! Core layer - configuration encoding and fundamental types.
//!
//! This module provides:
//! - [`Aspect`] - Enumerated configuration choices and their persisted tags
//! - [`Configuration`] - Aspect combinations of properties and domains
//! - [`time`] - Clocks, epochs, durations and time points
//! - [`Collection`] - Named collections of data model nodes
//! - [`tag`] - Names of nodes and attributes in the persisted layout

pub mod aspect;
mod collection;
mod configuration;
pub mod tag;
pub mod time;

pub use aspect::{
    Aspect, Calendar, EpochKind, Mobility, ShapePerObject, ShapeVariability, SpaceDiscretization,
    SpaceDomainItemType, TimeDiscretization, TimeDomainItemType, TimeUnit, ValueVariability,
};
pub use collection::{check_item_name, Collection, CollectionItem};
pub use configuration::{
    Configuration, HasAspect, PropertyConfiguration, SpaceConfiguration, TimeConfiguration,
};
pub use time::{Clock, Epoch, TickPeriod};
