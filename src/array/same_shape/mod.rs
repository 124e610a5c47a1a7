//! Values whose object arrays all share one shape.
//!
//! All arrays are stored in a single dataset, one per row. The row axis is
//! unlimited, so rows can be appended at any time:
//! - constant values hold one row per object
//! - variable values of constant shape hold one row per active object, per
//!   time location ([`constant_shape`])
//!
//! Variable values whose shape changes through time are stored per time
//! location ([`variable_shape`]).

pub mod constant_shape;
pub mod variable_shape;

use tracing::{debug, trace};

use super::typed::Array;
use super::value::{ValueKind, ValueStrategy};
use crate::container::chunk::chunk_shape;
use crate::container::{CreationProperties, Dataspace, Group};
use crate::util::{
    Count, Datatype, Element, Error, Hyperslab, Index, IndexRange, Rank, Result, Shape,
};

/// Same-shape value: `[rows, ...array_shape]` in one dataset.
#[derive(Clone, Debug)]
pub struct Value {
    array: Array,
    array_shape: Shape,
}

/// Create a same-shape value dataset `name` under `parent`.
pub fn create_value(
    parent: &Group,
    name: &str,
    file_datatype: Datatype,
    memory_datatype: Datatype,
    array_shape: &Shape,
) -> Result<Value> {
    create_value_with(
        parent,
        name,
        file_datatype,
        memory_datatype,
        array_shape,
        CreationProperties::new(),
    )
}

/// Create a same-shape value with explicit creation properties.
///
/// Without a chunk shape in `properties`, one is chosen for `array_shape`.
pub fn create_value_with(
    parent: &Group,
    name: &str,
    file_datatype: Datatype,
    memory_datatype: Datatype,
    array_shape: &Shape,
    mut properties: CreationProperties,
) -> Result<Value> {
    if parent.contains(name) {
        return Err(Error::AlreadyExists(parent.child_pathname(name)));
    }
    if properties.chunk().is_none() {
        properties = properties.with_chunk(chunk_shape(array_shape, file_datatype.num_bytes()));
    }

    let array = Array::create(
        parent,
        name,
        file_datatype,
        memory_datatype,
        Dataspace::unlimited_rows(array_shape.prepend(0)),
        properties,
    )?;
    debug!(path = %array.pathname(), shape = %array_shape, "created same-shape value");

    Ok(Value {
        array,
        array_shape: array_shape.clone(),
    })
}

impl Value {
    /// Open a value, reading elements in native byte order.
    pub fn open(parent: &Group, name: &str) -> Result<Self> {
        Self::from_array(Array::open(parent, name, None)?)
    }

    pub fn open_with(parent: &Group, name: &str, memory_datatype: Datatype) -> Result<Self> {
        Self::from_array(Array::open(parent, name, Some(memory_datatype))?)
    }

    pub fn from_array(array: Array) -> Result<Self> {
        let shape = array.shape()?;
        if shape.rank() == 0 {
            return Err(Error::shape_mismatch(
                array.pathname(),
                "[rows x ...]",
                shape,
            ));
        }
        Ok(Self {
            array_shape: shape.tail(),
            array,
        })
    }

    pub fn array(&self) -> &Array {
        &self.array
    }

    /// Shape of each object array.
    pub fn array_shape(&self) -> &Shape {
        &self.array_shape
    }

    /// Number of stored arrays.
    pub fn nr_arrays(&self) -> Result<Count> {
        Ok(self.array.shape()?.extent(0).unwrap_or(0))
    }

    /// Make room for at least `nr_arrays` arrays. Never shrinks.
    pub fn reserve(&self, nr_arrays: Count) -> Result<()> {
        let current = self.nr_arrays()?;
        if nr_arrays <= current {
            return Ok(());
        }
        trace!(path = %self.array.pathname(), from = current, to = nr_arrays, "reserve arrays");
        self.array.resize(&self.array_shape.prepend(nr_arrays))
    }

    /// Append room for `nr_arrays` arrays, returning the index of the first one.
    pub fn expand(&self, nr_arrays: Count) -> Result<Index> {
        let first = self.nr_arrays()?;
        self.reserve(first + nr_arrays)?;
        Ok(first)
    }

    fn check_range(&self, range: IndexRange) -> Result<()> {
        let nr_arrays = self.nr_arrays()?;
        if range.end > nr_arrays || range.begin > range.end {
            return Err(Error::out_of_range(
                self.array.pathname(),
                range.end.max(range.begin).saturating_sub(1),
                nr_arrays,
            ));
        }
        Ok(())
    }

    fn single(&self, index: Index) -> Result<IndexRange> {
        match IndexRange::single(index) {
            Some(range) => Ok(range),
            None => Err(Error::out_of_range(self.array.pathname(), index, self.nr_arrays()?)),
        }
    }

    fn rows(&self, range: IndexRange) -> Hyperslab {
        Hyperslab::rows(range, &self.array_shape.prepend(range.end))
    }

    /// Read all arrays.
    pub fn read_all<T: Element>(&self) -> Result<Vec<T>> {
        self.array.read_all()
    }

    /// Write all arrays.
    pub fn write_all<T: Element>(&self, values: &[T]) -> Result<()> {
        self.array.write_all(values)
    }

    /// Read the arrays in `range`.
    pub fn read_range<T: Element>(&self, range: IndexRange) -> Result<Vec<T>> {
        self.check_range(range)?;
        self.array.read(&self.rows(range))
    }

    /// Write the arrays in `range`.
    pub fn write_range<T: Element>(&self, range: IndexRange, values: &[T]) -> Result<()> {
        self.check_range(range)?;
        self.array.write(&self.rows(range), values)
    }

    /// Read the array at `index`.
    pub fn read<T: Element>(&self, index: Index) -> Result<Vec<T>> {
        self.read_range(self.single(index)?)
    }

    /// Write the array at `index`.
    pub fn write<T: Element>(&self, index: Index, values: &[T]) -> Result<()> {
        self.write_range(self.single(index)?, values)
    }

    /// View on the array at `index`.
    pub fn get(&self, index: Index) -> Result<ObjectArray<'_>> {
        self.check_range(self.single(index)?)?;
        Ok(ObjectArray { value: self, index })
    }
}

impl ValueStrategy for Value {
    fn kind(&self) -> ValueKind {
        ValueKind::SameShape
    }

    fn file_datatype(&self) -> Datatype {
        self.array.file_datatype()
    }

    fn memory_datatype(&self) -> Datatype {
        self.array.memory_datatype()
    }

    fn rank(&self) -> Rank {
        self.array_shape.rank()
    }

    fn nr_values(&self) -> Result<Count> {
        self.nr_arrays()
    }

    fn pathname(&self) -> String {
        self.array.pathname()
    }
}

/// One object's array within a same-shape value.
#[derive(Clone, Copy, Debug)]
pub struct ObjectArray<'a> {
    value: &'a Value,
    index: Index,
}

impl ObjectArray<'_> {
    pub fn index(&self) -> Index {
        self.index
    }

    pub fn shape(&self) -> &Shape {
        self.value.array_shape()
    }

    pub fn read<T: Element>(&self) -> Result<Vec<T>> {
        self.value.read(self.index)
    }

    pub fn write<T: Element>(&self, values: &[T]) -> Result<()> {
        self.value.write(self.index, values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::File;
    use crate::util::ElementType;

    fn float_value(array_shape: Shape) -> Value {
        let root = File::create_in_memory("same-shape-tests").root();
        let datatype = Datatype::native(ElementType::Float64);
        create_value(&root, "v", datatype, datatype, &array_shape).unwrap()
    }

    #[test]
    fn test_create_is_empty() {
        let value = float_value(Shape::from([2, 3]));
        assert_eq!(value.nr_arrays().unwrap(), 0);
        assert_eq!(value.array_shape(), &Shape::from([2, 3]));
        assert_eq!(value.rank(), 2);
        assert_eq!(
            value.array().dataset().creation_properties().chunk().map(Shape::rank),
            Some(3)
        );
    }

    #[test]
    fn test_create_twice_fails() {
        let root = File::create_in_memory("same-shape-tests").root();
        let datatype = Datatype::native(ElementType::Uint8);
        create_value(&root, "v", datatype, datatype, &Shape::scalar()).unwrap();
        assert!(matches!(
            create_value(&root, "v", datatype, datatype, &Shape::scalar()),
            Err(Error::AlreadyExists(_))
        ));
    }

    #[test]
    fn test_append_only_growth() {
        let value = float_value(Shape::from([2]));
        value.reserve(2).unwrap();
        value.write_all(&[1.0, 2.0, 3.0, 4.0]).unwrap();

        let first_new = value.expand(3).unwrap();
        assert_eq!(first_new, 2);
        assert_eq!(value.nr_arrays().unwrap(), 5);
        // Earlier rows are unchanged
        assert_eq!(value.read::<f64>(0).unwrap(), vec![1.0, 2.0]);
        assert_eq!(value.read::<f64>(1).unwrap(), vec![3.0, 4.0]);

        // Reserving less never shrinks
        value.reserve(1).unwrap();
        assert_eq!(value.nr_arrays().unwrap(), 5);
    }

    #[test]
    fn test_ranges_and_views() {
        let value = float_value(Shape::scalar());
        value.reserve(4).unwrap();
        value
            .write_range(IndexRange::new(1, 3), &[10.0, 20.0])
            .unwrap();
        assert_eq!(value.read_all::<f64>().unwrap(), vec![0.0, 10.0, 20.0, 0.0]);

        let view = value.get(2).unwrap();
        assert_eq!(view.read::<f64>().unwrap(), vec![20.0]);
        view.write(&[25.0]).unwrap();
        assert_eq!(value.read::<f64>(2).unwrap(), vec![25.0]);
    }

    #[test]
    fn test_out_of_range() {
        let value = float_value(Shape::from([3]));
        value.reserve(2).unwrap();
        assert!(matches!(
            value.read::<f64>(2),
            Err(Error::OutOfRange { index: 2, count: 2, .. })
        ));
        assert!(matches!(value.get(5), Err(Error::OutOfRange { .. })));
        assert!(matches!(
            value.read::<f64>(Index::MAX),
            Err(Error::OutOfRange { count: 2, .. })
        ));
        assert!(matches!(value.get(Index::MAX), Err(Error::OutOfRange { .. })));
        assert!(matches!(
            value.write::<f64>(0, &[1.0]),
            Err(Error::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_reopen() {
        let value = float_value(Shape::from([2]));
        value.reserve(1).unwrap();
        value.write(0, &[5.0, 6.0]).unwrap();

        let root = value.array().dataset().file().root();
        let reopened = Value::open(&root, "v").unwrap();
        assert_eq!(reopened.array_shape(), &Shape::from([2]));
        assert_eq!(reopened.read::<f64>(0).unwrap(), vec![5.0, 6.0]);
    }
}
