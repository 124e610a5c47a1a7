//! Values whose object arrays differ in shape.
//!
//! Each object gets its own dataset, named by the object's ID. All datasets
//! share the rank and datatype recorded in the value group. The number of
//! objects is kept in the `lue_nr_objects` attribute, which is authoritative.
//!
//! - [`Value`] - constant values, one fixed-shape dataset per object
//! - [`constant_shape::Value`] - variable values of constant shape, one
//!   dataset per object with an unlimited location axis
//! - [`variable_shape::Value`] - variable values of variable shape, one
//!   [`Value`] per time location

pub mod constant_shape;
pub mod variable_shape;

use std::collections::BTreeSet;

use tracing::debug;

use super::typed::Array;
use super::value::{ValueKind, ValueStrategy};
use super::value_group::ValueGroup;
use crate::container::{CreationProperties, Dataspace, Group};
use crate::core::tag::NR_OBJECTS_TAG;
use crate::util::{Count, Datatype, Error, Id, Rank, Result, Shape};

/// One dataset per object, named by the object's ID.
#[derive(Clone, Debug)]
pub struct Value {
    group: ValueGroup,
}

/// Create a different-shape value `name` under `parent`, for arrays of `rank`.
pub fn create_value(
    parent: &Group,
    name: &str,
    file_datatype: Datatype,
    memory_datatype: Datatype,
    rank: Rank,
) -> Result<Value> {
    let group = ValueGroup::create(parent, name, file_datatype, memory_datatype, rank)?;
    group.write_count(NR_OBJECTS_TAG, 0)?;
    Ok(Value { group })
}

/// Check a batch of object IDs and shapes before anything is created.
///
/// Fails when the lengths differ, a shape has the wrong rank, an ID is
/// repeated or an ID already has a dataset in `group`.
pub(crate) fn check_reservation(group: &ValueGroup, ids: &[Id], shapes: &[Shape]) -> Result<()> {
    check_objects(&group.pathname(), group.rank(), ids, shapes, |name| {
        group.group().contains(name)
    })
}

/// Same checks as [`check_reservation`], for a value at `path` that may not
/// exist yet. `exists` tells whether an object name is already taken.
pub(crate) fn check_objects(
    path: &str,
    rank: Rank,
    ids: &[Id],
    shapes: &[Shape],
    exists: impl Fn(&str) -> bool,
) -> Result<()> {
    if ids.len() != shapes.len() {
        return Err(Error::shape_mismatch(
            path,
            format!("{} shapes", ids.len()),
            format!("{} shapes", shapes.len()),
        ));
    }

    let mut seen = BTreeSet::new();
    for (id, shape) in ids.iter().zip(shapes) {
        let name = id.to_string();
        if shape.rank() != rank {
            return Err(Error::shape_mismatch(
                format!("{}/{}", path, name),
                format!("rank {}", rank),
                shape,
            ));
        }
        if !seen.insert(*id) || exists(&name) {
            return Err(Error::AlreadyExists(format!("{}/{}", path, name)));
        }
    }
    Ok(())
}

impl Value {
    pub fn open(parent: &Group, name: &str) -> Result<Self> {
        Ok(Self {
            group: ValueGroup::open(parent, name, None)?,
        })
    }

    pub fn open_with(parent: &Group, name: &str, memory_datatype: Datatype) -> Result<Self> {
        Ok(Self {
            group: ValueGroup::open(parent, name, Some(memory_datatype))?,
        })
    }

    pub fn value_group(&self) -> &ValueGroup {
        &self.group
    }

    /// Number of objects with a stored array.
    pub fn nr_objects(&self) -> Result<Count> {
        self.group.read_count(NR_OBJECTS_TAG)
    }

    pub fn contains(&self, id: Id) -> bool {
        self.group.group().contains_dataset(&id.to_string())
    }

    /// IDs of all objects with a stored array, in increasing order.
    pub fn object_ids(&self) -> Vec<Id> {
        let mut ids: Vec<Id> = self
            .group
            .group()
            .dataset_names()
            .iter()
            .filter_map(|name| name.parse().ok())
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Create one array per object, with the shape at the same position.
    ///
    /// Nothing is created unless all IDs and shapes are valid.
    pub fn reserve(&self, ids: &[Id], shapes: &[Shape]) -> Result<()> {
        check_reservation(&self.group, ids, shapes)?;

        let nr_objects = self.nr_objects()?;
        for (id, shape) in ids.iter().zip(shapes) {
            self.group.create_array(
                &id.to_string(),
                Dataspace::fixed(shape.clone()),
                CreationProperties::new(),
            )?;
        }
        self.group
            .write_count(NR_OBJECTS_TAG, nr_objects + ids.len() as Count)?;
        debug!(path = %self.group.pathname(), count = ids.len(), "reserved object arrays");
        Ok(())
    }

    /// Create the array of a single object.
    pub fn reserve_one(&self, id: Id, shape: &Shape) -> Result<Array> {
        self.reserve(&[id], std::slice::from_ref(shape))?;
        self.get(id)
    }

    /// Array of object `id`.
    pub fn get(&self, id: Id) -> Result<Array> {
        let name = id.to_string();
        if !self.group.group().contains_dataset(&name) {
            return Err(Error::NotFound(self.group.group().child_pathname(&name)));
        }
        self.group.open_array(&name)
    }
}

impl ValueStrategy for Value {
    fn kind(&self) -> ValueKind {
        ValueKind::DifferentShape
    }

    fn file_datatype(&self) -> Datatype {
        self.group.file_datatype()
    }

    fn memory_datatype(&self) -> Datatype {
        self.group.memory_datatype()
    }

    fn rank(&self) -> Rank {
        self.group.rank()
    }

    fn nr_values(&self) -> Result<Count> {
        self.nr_objects()
    }

    fn pathname(&self) -> String {
        self.group.pathname()
    }
}
