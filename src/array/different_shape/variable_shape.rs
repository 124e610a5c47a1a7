//! Variable values of variable shape, for objects of different shapes.
//!
//! One [`different_shape::Value`](super::Value) per time location, named by
//! the location's index. Every (location, object) pair has its own dataset.

use tracing::debug;

use super::super::value::{ValueKind, ValueStrategy};
use super::super::value_group::ValueGroup;
use crate::container::Group;
use crate::core::tag::NR_LOCATIONS_IN_TIME_TAG;
use crate::util::{Count, Datatype, Error, Id, Index, Rank, Result, Shape};

/// Different-shape value per time location.
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
    group.write_count(NR_LOCATIONS_IN_TIME_TAG, 0)?;
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

    pub fn nr_locations_in_time(&self) -> Result<Count> {
        self.group.read_count(NR_LOCATIONS_IN_TIME_TAG)
    }

    /// Create the arrays of `ids` at a time location.
    ///
    /// `location` must be an existing location or the next one. A new
    /// location is only added when all IDs and shapes are valid.
    pub fn reserve(&self, location: Index, ids: &[Id], shapes: &[Shape]) -> Result<super::Value> {
        let nr_locations = self.nr_locations_in_time()?;
        if location < nr_locations {
            let value = self.get(location)?;
            value.reserve(ids, shapes)?;
            return Ok(value);
        }
        if location > nr_locations {
            return Err(Error::out_of_range(
                self.group.pathname(),
                location,
                nr_locations,
            ));
        }

        let name = location.to_string();
        super::check_objects(
            &self.group.group().child_pathname(&name),
            self.group.rank(),
            ids,
            shapes,
            |_| false,
        )?;
        let value = super::create_value(
            self.group.group(),
            &name,
            self.group.file_datatype(),
            self.group.memory_datatype(),
            self.group.rank(),
        )?;
        value.reserve(ids, shapes)?;
        self.group
            .write_count(NR_LOCATIONS_IN_TIME_TAG, nr_locations + 1)?;
        debug!(path = %self.group.pathname(), location, "added time location");
        Ok(value)
    }

    /// Value stored for a time location.
    pub fn get(&self, location: Index) -> Result<super::Value> {
        let nr_locations = self.nr_locations_in_time()?;
        if location >= nr_locations {
            return Err(Error::out_of_range(
                self.group.pathname(),
                location,
                nr_locations,
            ));
        }
        super::Value::open_with(
            self.group.group(),
            &location.to_string(),
            self.group.memory_datatype(),
        )
    }
}

impl ValueStrategy for Value {
    fn kind(&self) -> ValueKind {
        ValueKind::DifferentShapeVariableShape
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
        self.nr_locations_in_time()
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

    #[test]
    fn test_locations() {
        let root = File::create_in_memory("variable-shape-tests").root();
        let datatype = Datatype::native(ElementType::Uint16);
        let value = create_value(&root, "v", datatype, datatype, 2).unwrap();

        let first = value
            .reserve(0, &[1, 2], &[Shape::from([1, 2]), Shape::from([2, 2])])
            .unwrap();
        first.get(2).unwrap().write_all(&[1u16, 2, 3, 4]).unwrap();
        value.reserve(1, &[2], &[Shape::from([3, 1])]).unwrap();
        // Add an object to an existing location
        value.reserve(0, &[3], &[Shape::from([1, 1])]).unwrap();

        assert_eq!(value.nr_locations_in_time().unwrap(), 2);
        let first = value.get(0).unwrap();
        assert_eq!(first.nr_objects().unwrap(), 3);
        assert_eq!(first.get(2).unwrap().read_all::<u16>().unwrap(), vec![1, 2, 3, 4]);
        assert_eq!(
            value.get(1).unwrap().get(2).unwrap().shape().unwrap(),
            Shape::from([3, 1])
        );

        assert!(matches!(
            value.reserve(3, &[1], &[Shape::from([1, 1])]),
            Err(Error::OutOfRange { .. })
        ));
        assert!(matches!(value.get(2), Err(Error::OutOfRange { .. })));
    }

    #[test]
    fn test_failed_reserve_adds_no_location() {
        let root = File::create_in_memory("variable-shape-tests").root();
        let datatype = Datatype::native(ElementType::Uint16);
        let value = create_value(&root, "v", datatype, datatype, 2).unwrap();
        let group = value.value_group().group().clone();

        // Duplicate ID
        assert!(matches!(
            value.reserve(0, &[1, 1], &[Shape::from([1, 1]), Shape::from([1, 1])]),
            Err(Error::AlreadyExists(_))
        ));
        // Wrong rank
        assert!(matches!(
            value.reserve(0, &[2], &[Shape::from([1, 1, 1])]),
            Err(Error::ShapeMismatch { .. })
        ));
        // Length mismatch
        assert!(matches!(
            value.reserve(0, &[2, 3], &[Shape::from([1, 1])]),
            Err(Error::ShapeMismatch { .. })
        ));
        assert_eq!(value.nr_locations_in_time().unwrap(), 0);
        assert!(!group.contains("0"));

        value.reserve(0, &[1], &[Shape::from([2, 2])]).unwrap();
        // Failures at an existing location leave it untouched
        assert!(value.reserve(0, &[1], &[Shape::from([1, 1])]).is_err());
        assert!(value.reserve(1, &[4, 4], &[Shape::from([1, 1]), Shape::from([1, 1])]).is_err());
        assert_eq!(value.nr_locations_in_time().unwrap(), 1);
        assert_eq!(value.get(0).unwrap().object_ids(), vec![1]);
        assert!(!group.contains("1"));
    }
}
