//! Typed access to datasets.

use crate::container::{CreationProperties, Dataset, Dataspace, Group};
use crate::util::{
    convert_byte_order, Datatype, Element, Error, Hyperslab, Rank, Result, Shape,
};

/// Dataset plus the datatype its elements have in memory.
///
/// Reads and writes convert between the file and memory byte order.
#[derive(Clone, Debug)]
pub struct Array {
    dataset: Dataset,
    memory_datatype: Datatype,
}

impl Array {
    /// Wrap a dataset, failing if the memory datatype holds other elements.
    pub fn new(dataset: Dataset, memory_datatype: Datatype) -> Result<Self> {
        dataset.datatype().check_compatible(&memory_datatype)?;
        Ok(Self {
            dataset,
            memory_datatype,
        })
    }

    /// Create a dataset and wrap it.
    pub fn create(
        parent: &Group,
        name: &str,
        file_datatype: Datatype,
        memory_datatype: Datatype,
        dataspace: Dataspace,
        properties: CreationProperties,
    ) -> Result<Self> {
        file_datatype.check_compatible(&memory_datatype)?;
        let dataset = parent.create_dataset(name, file_datatype, dataspace, properties)?;
        Self::new(dataset, memory_datatype)
    }

    /// Open a dataset. Without a memory datatype, elements are read in native byte order.
    pub fn open(parent: &Group, name: &str, memory_datatype: Option<Datatype>) -> Result<Self> {
        let dataset = parent.open_dataset(name)?;
        let memory_datatype =
            memory_datatype.unwrap_or_else(|| Datatype::native(dataset.datatype().element_type));
        Self::new(dataset, memory_datatype)
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn name(&self) -> &str {
        self.dataset.name()
    }

    pub fn pathname(&self) -> String {
        self.dataset.pathname()
    }

    #[inline]
    pub fn file_datatype(&self) -> Datatype {
        self.dataset.datatype()
    }

    #[inline]
    pub fn memory_datatype(&self) -> Datatype {
        self.memory_datatype
    }

    pub fn shape(&self) -> Result<Shape> {
        self.dataset.shape()
    }

    pub fn rank(&self) -> Result<Rank> {
        Ok(self.shape()?.rank())
    }

    pub fn resize(&self, shape: &Shape) -> Result<()> {
        self.dataset.resize(shape)
    }

    fn check_element<T: Element>(&self) -> Result<()> {
        if T::ELEMENT_TYPE != self.memory_datatype.element_type {
            return Err(Error::type_mismatch(self.memory_datatype, T::ELEMENT_TYPE));
        }
        Ok(())
    }

    /// Read the selected elements into `buffer`.
    pub fn read_into<T: Element>(&self, slab: &Hyperslab, buffer: &mut [T]) -> Result<()> {
        self.check_element::<T>()?;
        let bytes: &mut [u8] = bytemuck::cast_slice_mut(buffer);
        self.dataset.read(slab, bytes)?;
        convert_byte_order(
            bytes,
            T::SIZE,
            self.file_datatype().byte_order,
            self.memory_datatype.byte_order,
        );
        Ok(())
    }

    /// Read the selected elements.
    pub fn read<T: Element>(&self, slab: &Hyperslab) -> Result<Vec<T>> {
        let mut buffer = vec![T::default(); slab.nr_elements() as usize];
        self.read_into(slab, &mut buffer)?;
        Ok(buffer)
    }

    /// Write `values` to the selected elements.
    pub fn write<T: Element>(&self, slab: &Hyperslab, values: &[T]) -> Result<()> {
        self.check_element::<T>()?;
        let bytes: &[u8] = bytemuck::cast_slice(values);
        let file_order = self.file_datatype().byte_order;
        if file_order == self.memory_datatype.byte_order {
            self.dataset.write(slab, bytes)
        } else {
            let mut converted = bytes.to_vec();
            convert_byte_order(&mut converted, T::SIZE, self.memory_datatype.byte_order, file_order);
            self.dataset.write(slab, &converted)
        }
    }

    /// Read all elements.
    pub fn read_all<T: Element>(&self) -> Result<Vec<T>> {
        self.read(&Hyperslab::all(&self.shape()?))
    }

    /// Write all elements.
    pub fn write_all<T: Element>(&self, values: &[T]) -> Result<()> {
        self.write(&Hyperslab::all(&self.shape()?), values)
    }
}
