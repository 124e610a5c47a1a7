//! Variable values of constant shape, for objects of different shapes.
//!
//! One dataset per object, `[locations, ...object_shape]`, with an unlimited
//! location axis. Each dataset behaves as a [`same_shape::Value`] whose rows
//! are the time locations the object is active in.

use tracing::debug;

use super::super::same_shape;
use super::super::value::{ValueKind, ValueStrategy};
use super::super::value_group::ValueGroup;
use super::check_reservation;
use crate::container::chunk::chunk_shape;
use crate::container::{CreationProperties, Dataspace, Group};
use crate::core::tag::NR_OBJECTS_TAG;
use crate::util::{Count, Datatype, Error, Id, Index, Rank, Result, Shape};

/// One growable dataset per object.
#[derive(Clone, Debug)]
pub struct Value {
    group: ValueGroup,
}

/// Create a value `name` under `parent`, for object arrays of `rank`.
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

    pub fn nr_objects(&self) -> Result<Count> {
        self.group.read_count(NR_OBJECTS_TAG)
    }

    pub fn contains(&self, id: Id) -> bool {
        self.group.group().contains_dataset(&id.to_string())
    }

    /// Create one dataset per object, with room for `nr_locations` arrays each.
    pub fn reserve(&self, ids: &[Id], nr_locations: Count, shapes: &[Shape]) -> Result<()> {
        check_reservation(&self.group, ids, shapes)?;

        let element_size = self.group.file_datatype().num_bytes();
        let nr_objects = self.nr_objects()?;
        for (id, shape) in ids.iter().zip(shapes) {
            self.group.create_array(
                &id.to_string(),
                Dataspace::unlimited_rows(shape.prepend(nr_locations)),
                CreationProperties::new().with_chunk(chunk_shape(shape, element_size)),
            )?;
        }
        self.group
            .write_count(NR_OBJECTS_TAG, nr_objects + ids.len() as Count)?;
        debug!(path = %self.group.pathname(), count = ids.len(), nr_locations, "reserved object arrays");
        Ok(())
    }

    /// Append room for `nr_locations` arrays of object `id`, returning the
    /// index of the first one.
    pub fn expand(&self, id: Id, nr_locations: Count) -> Result<Index> {
        self.get(id)?.expand(nr_locations)
    }

    /// Values of object `id`, one row per location.
    pub fn get(&self, id: Id) -> Result<same_shape::Value> {
        let name = id.to_string();
        if !self.group.group().contains_dataset(&name) {
            return Err(Error::NotFound(self.group.group().child_pathname(&name)));
        }
        same_shape::Value::from_array(self.group.open_array(&name)?)
    }
}

impl ValueStrategy for Value {
    fn kind(&self) -> ValueKind {
        ValueKind::DifferentShapeConstantShape
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::File;
    use crate::util::ElementType;

    fn value() -> Value {
        let root = File::create_in_memory("constant-shape-tests").root();
        let datatype = Datatype::native(ElementType::Int64);
        create_value(&root, "v", datatype, datatype, 1).unwrap()
    }

    #[test]
    fn test_reserve_expand() {
        let value = value();
        value
            .reserve(&[3, 4], 2, &[Shape::from([2]), Shape::from([3])])
            .unwrap();
        assert_eq!(value.nr_objects().unwrap(), 2);

        let object = value.get(4).unwrap();
        assert_eq!(object.array_shape(), &Shape::from([3]));
        assert_eq!(object.nr_arrays().unwrap(), 2);
        object.write(1, &[7i64, 8, 9]).unwrap();

        assert_eq!(value.expand(4, 3).unwrap(), 2);
        let object = value.get(4).unwrap();
        assert_eq!(object.nr_arrays().unwrap(), 5);
        assert_eq!(object.read::<i64>(1).unwrap(), vec![7, 8, 9]);
        // Other objects are not affected
        assert_eq!(value.get(3).unwrap().nr_arrays().unwrap(), 2);
    }

    #[test]
    fn test_unknown_object() {
        let value = value();
        assert!(matches!(value.get(1), Err(Error::NotFound(_))));
        assert!(matches!(value.expand(1, 1), Err(Error::NotFound(_))));
        value.reserve(&[1], 0, &[Shape::from([2])]).unwrap();
        assert!(matches!(
            value.reserve(&[1], 0, &[Shape::from([2])]),
            Err(Error::AlreadyExists(_))
        ));
    }
}
