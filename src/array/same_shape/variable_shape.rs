//! Variable values whose shape changes through time.
//!
//! One same-shape value per time location, named by the location's index.
//! All arrays within a location share a shape; shapes may differ between
//! locations.

use tracing::debug;

use super::super::value::{ValueKind, ValueStrategy};
use super::super::value_group::ValueGroup;
use crate::container::Group;
use crate::core::tag::NR_LOCATIONS_IN_TIME_TAG;
use crate::util::{Count, Datatype, Error, Index, Rank, Result, Shape};

/// Same-shape value per time location.
#[derive(Clone, Debug)]
pub struct Value {
    group: ValueGroup,
}

/// Create a variable-shape value `name` under `parent`, for arrays of `rank`.
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

    /// Number of time locations values are stored for.
    pub fn nr_locations_in_time(&self) -> Result<Count> {
        self.group.read_count(NR_LOCATIONS_IN_TIME_TAG)
    }

    /// Make room for `nr_arrays` arrays of `array_shape` at a time location.
    ///
    /// Locations are added in order: `location` must be an existing location
    /// or the next one.
    pub fn reserve(
        &self,
        location: Index,
        nr_arrays: Count,
        array_shape: &Shape,
    ) -> Result<super::Value> {
        if array_shape.rank() != self.group.rank() {
            return Err(Error::shape_mismatch(
                self.group.pathname(),
                format!("rank {}", self.group.rank()),
                array_shape,
            ));
        }

        let nr_locations = self.nr_locations_in_time()?;
        let value = if location < nr_locations {
            let value = self.get(location)?;
            if value.array_shape() != array_shape {
                return Err(Error::shape_mismatch(
                    value.array().pathname(),
                    value.array_shape(),
                    array_shape,
                ));
            }
            value
        } else if location == nr_locations {
            let value = super::create_value(
                self.group.group(),
                &location.to_string(),
                self.group.file_datatype(),
                self.group.memory_datatype(),
                array_shape,
            )?;
            self.group
                .write_count(NR_LOCATIONS_IN_TIME_TAG, nr_locations + 1)?;
            debug!(path = %self.group.pathname(), location, shape = %array_shape, "added time location");
            value
        } else {
            return Err(Error::out_of_range(
                self.group.pathname(),
                location,
                nr_locations,
            ));
        };

        value.reserve(nr_arrays)?;
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
        ValueKind::SameShapeVariableShape
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

    fn value() -> Value {
        let root = File::create_in_memory("variable-shape-tests").root();
        let datatype = Datatype::native(ElementType::Int32);
        create_value(&root, "v", datatype, datatype, 1).unwrap()
    }

    #[test]
    fn test_shapes_per_location() {
        let value = value();
        assert_eq!(value.nr_locations_in_time().unwrap(), 0);

        let first = value.reserve(0, 2, &Shape::from([3])).unwrap();
        first.write_all(&[1, 2, 3, 4, 5, 6]).unwrap();
        let second = value.reserve(1, 1, &Shape::from([5])).unwrap();
        second.write_all(&[7, 8, 9, 10, 11]).unwrap();

        assert_eq!(value.nr_locations_in_time().unwrap(), 2);
        assert_eq!(value.nr_values().unwrap(), 2);
        let first = value.get(0).unwrap();
        assert_eq!(first.nr_arrays().unwrap(), 2);
        assert_eq!(first.read::<i32>(1).unwrap(), vec![4, 5, 6]);
        assert_eq!(value.get(1).unwrap().array_shape(), &Shape::from([5]));
    }

    #[test]
    fn test_grow_existing_location() {
        let value = value();
        value.reserve(0, 2, &Shape::from([3])).unwrap();
        let grown = value.reserve(0, 4, &Shape::from([3])).unwrap();
        assert_eq!(grown.nr_arrays().unwrap(), 4);
        assert!(matches!(
            value.reserve(0, 4, &Shape::from([2])),
            Err(Error::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_locations_in_order() {
        let value = value();
        assert!(matches!(
            value.reserve(1, 2, &Shape::from([3])),
            Err(Error::OutOfRange { .. })
        ));
        assert!(matches!(
            value.reserve(0, 2, &Shape::from([3, 3])),
            Err(Error::ShapeMismatch { .. })
        ));
        assert!(matches!(value.get(0), Err(Error::OutOfRange { .. })));
    }
}
