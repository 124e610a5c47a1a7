//! Dataset handles.
//!
//! A dataset is an N-dimensional array of fixed-size elements with:
//! - a [`Dataspace`]: current shape plus maximum extent per axis
//! - [`CreationProperties`]: chunk shape, fill value and deflate level
//! - hyperslab based reads and writes of raw file-order bytes

use std::fmt;

use smallvec::SmallVec;
use tracing::trace;

use super::attribute::AttributeType;
use super::file::File;
use super::node::{join_pathname, lookup, lookup_mut, Node};
use crate::util::{for_each_run, Datatype, Error, Extent, Hyperslab, Rank, Result, Shape};

/// Current and maximum extents of a dataset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dataspace {
    shape: Shape,
    /// `None` means unlimited
    max_extents: SmallVec<[Option<Extent>; 4]>,
}

impl Dataspace {
    pub fn new(shape: Shape, max_extents: Vec<Option<Extent>>) -> Self {
        Self {
            shape,
            max_extents: SmallVec::from_vec(max_extents),
        }
    }

    /// Dataspace whose shape can never change.
    pub fn fixed(shape: Shape) -> Self {
        let max_extents = shape.extents().iter().map(|&e| Some(e)).collect();
        Self { shape, max_extents }
    }

    /// Dataspace whose first axis is unlimited and other axes are fixed.
    pub fn unlimited_rows(shape: Shape) -> Self {
        let max_extents = shape
            .extents()
            .iter()
            .enumerate()
            .map(|(d, &e)| if d == 0 { None } else { Some(e) })
            .collect();
        Self { shape, max_extents }
    }

    #[inline]
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn max_extents(&self) -> &[Option<Extent>] {
        &self.max_extents
    }

    #[inline]
    pub fn rank(&self) -> Rank {
        self.shape.rank()
    }

    /// Whether `shape` is a valid current shape for this dataspace.
    pub fn allows(&self, shape: &Shape) -> bool {
        shape.rank() == self.max_extents.len()
            && shape
                .extents()
                .iter()
                .zip(&self.max_extents)
                .all(|(&e, max)| max.map_or(true, |m| e <= m))
    }

    pub(crate) fn check(&self, pathname: &str) -> Result<()> {
        if !self.allows(&self.shape) {
            return Err(Error::engine(
                pathname,
                format!("shape {} exceeds maximum {:?}", self.shape, self.max_extents),
            ));
        }
        Ok(())
    }

    pub(crate) fn set_shape(&mut self, shape: Shape) {
        self.shape = shape;
    }
}

/// Properties fixed at dataset creation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CreationProperties {
    chunk: Option<Shape>,
    /// One element in file byte order
    fill_value: Option<Vec<u8>>,
    deflate: Option<u32>,
}

impl CreationProperties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_chunk(mut self, chunk: Shape) -> Self {
        self.chunk = Some(chunk);
        self
    }

    /// Fill value given as the bytes of one element in file byte order.
    pub fn with_fill_value(mut self, element: Vec<u8>) -> Self {
        self.fill_value = Some(element);
        self
    }

    /// Compress the payload with the given zlib level (1-9) when persisting.
    pub fn with_deflate(mut self, level: u32) -> Self {
        self.deflate = Some(level);
        self
    }

    pub fn chunk(&self) -> Option<&Shape> {
        self.chunk.as_ref()
    }

    pub fn fill_value(&self) -> Option<&[u8]> {
        self.fill_value.as_deref()
    }

    pub fn deflate(&self) -> Option<u32> {
        self.deflate
    }

    pub(crate) fn check(&self, pathname: &str, datatype: &Datatype, dataspace: &Dataspace) -> Result<()> {
        if let Some(chunk) = &self.chunk {
            if chunk.rank() != dataspace.rank() {
                return Err(Error::shape_mismatch(pathname, dataspace.shape(), chunk));
            }
            if chunk.extents().contains(&0) {
                return Err(Error::engine(pathname, format!("zero extent in chunk {}", chunk)));
            }
        }
        if let Some(fill) = &self.fill_value {
            if fill.len() != datatype.num_bytes() {
                return Err(Error::engine(
                    pathname,
                    format!("fill value of {} bytes for {}", fill.len(), datatype),
                ));
            }
        }
        Ok(())
    }
}

/// Buffer of `nr_elements` elements, each set to `fill` or zero.
pub(crate) fn filled(nr_elements: usize, element_size: usize, fill: Option<&[u8]>) -> Vec<u8> {
    match fill {
        Some(element) if element.iter().any(|&b| b != 0) => element.repeat(nr_elements),
        _ => vec![0; nr_elements * element_size],
    }
}

/// Handle to a dataset in a container.
#[derive(Clone)]
pub struct Dataset {
    file: File,
    path: Vec<String>,
    datatype: Datatype,
    properties: CreationProperties,
}

impl Dataset {
    pub(crate) fn new(file: File, path: Vec<String>, datatype: Datatype, properties: CreationProperties) -> Self {
        Self {
            file,
            path,
            datatype,
            properties,
        }
    }

    pub fn file(&self) -> &File {
        &self.file
    }

    pub fn name(&self) -> &str {
        self.path.last().map(String::as_str).unwrap_or("/")
    }

    pub fn pathname(&self) -> String {
        join_pathname(&self.path)
    }

    /// Datatype of the stored elements.
    #[inline]
    pub fn datatype(&self) -> Datatype {
        self.datatype
    }

    pub fn creation_properties(&self) -> &CreationProperties {
        &self.properties
    }

    pub fn dataspace(&self) -> Result<Dataspace> {
        self.file.read(|root| {
            lookup(root, &self.path)
                .and_then(Node::as_dataset)
                .map(|d| d.dataspace.clone())
                .ok_or_else(|| Error::NotFound(self.pathname()))
        })
    }

    /// Current shape.
    pub fn shape(&self) -> Result<Shape> {
        Ok(self.dataspace()?.shape)
    }

    /// Change the shape, keeping the overlapping elements in place.
    ///
    /// New elements are set to the fill value.
    pub fn resize(&self, new_shape: &Shape) -> Result<()> {
        let pathname = self.pathname();
        self.file.write(|root| {
            let node = lookup_mut(root, &self.path)
                .and_then(Node::as_dataset_mut)
                .ok_or_else(|| Error::NotFound(pathname.clone()))?;
            let old_shape = node.dataspace.shape().clone();
            if &old_shape == new_shape {
                return Ok(());
            }
            if !node.dataspace.allows(new_shape) {
                return Err(Error::shape_mismatch(
                    &pathname,
                    format!("shape within {:?}", node.dataspace.max_extents()),
                    new_shape,
                ));
            }

            trace!(path = %pathname, from = %old_shape, to = %new_shape, "resize dataset");
            let element_size = node.datatype.num_bytes();
            let fill = node.properties.fill_value();
            let nr_new_elements = new_shape.nr_elements() as usize;

            if old_shape.tail() == new_shape.tail() {
                // Only the slowest varying axis changes: truncate or append
                let nr_old_elements = old_shape.nr_elements() as usize;
                if nr_new_elements <= nr_old_elements {
                    node.data.truncate(nr_new_elements * element_size);
                } else {
                    node.data.extend(filled(nr_new_elements - nr_old_elements, element_size, fill));
                }
            } else {
                let overlap = Shape::from(
                    old_shape
                        .extents()
                        .iter()
                        .zip(new_shape.extents())
                        .map(|(&a, &b)| a.min(b))
                        .collect::<Vec<_>>(),
                );
                let slab = Hyperslab::all(&overlap);
                let mut packed = vec![0u8; overlap.nr_elements() as usize * element_size];
                for_each_run(&old_shape, &slab, |src, dst, n| {
                    packed[dst * element_size..(dst + n) * element_size]
                        .copy_from_slice(&node.data[src * element_size..(src + n) * element_size]);
                });
                let mut data = filled(nr_new_elements, element_size, fill);
                for_each_run(new_shape, &slab, |dst, src, n| {
                    data[dst * element_size..(dst + n) * element_size]
                        .copy_from_slice(&packed[src * element_size..(src + n) * element_size]);
                });
                node.data = data;
            }

            node.dataspace.set_shape(new_shape.clone());
            Ok(())
        })
    }

    /// Read the selected elements into `buffer`, in file byte order.
    pub fn read(&self, slab: &Hyperslab, buffer: &mut [u8]) -> Result<()> {
        let pathname = self.pathname();
        self.file.read(|root| {
            let node = lookup(root, &self.path)
                .and_then(Node::as_dataset)
                .ok_or_else(|| Error::NotFound(pathname.clone()))?;
            let element_size = node.datatype.num_bytes();
            check_selection(&pathname, node.dataspace.shape(), slab, buffer.len(), element_size)?;

            for_each_run(node.dataspace.shape(), slab, |src, dst, n| {
                buffer[dst * element_size..(dst + n) * element_size]
                    .copy_from_slice(&node.data[src * element_size..(src + n) * element_size]);
            });
            Ok(())
        })
    }

    /// Write `buffer`, in file byte order, to the selected elements.
    pub fn write(&self, slab: &Hyperslab, buffer: &[u8]) -> Result<()> {
        let pathname = self.pathname();
        self.file.write(|root| {
            let node = lookup_mut(root, &self.path)
                .and_then(Node::as_dataset_mut)
                .ok_or_else(|| Error::NotFound(pathname.clone()))?;
            let element_size = node.datatype.num_bytes();
            let shape = node.dataspace.shape().clone();
            check_selection(&pathname, &shape, slab, buffer.len(), element_size)?;

            let data = &mut node.data;
            for_each_run(&shape, slab, |dst, src, n| {
                data[dst * element_size..(dst + n) * element_size]
                    .copy_from_slice(&buffer[src * element_size..(src + n) * element_size]);
            });
            Ok(())
        })
    }

    pub fn read_attribute<T: AttributeType>(&self, name: &str) -> Result<T> {
        self.file.read_attribute(&self.path, name)
    }

    pub fn write_attribute<T: AttributeType>(&self, name: &str, value: T) -> Result<()> {
        self.file.write_attribute(&self.path, name, value)
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.file.has_attribute(&self.path, name)
    }
}

fn check_selection(
    pathname: &str,
    shape: &Shape,
    slab: &Hyperslab,
    buffer_len: usize,
    element_size: usize,
) -> Result<()> {
    if slab.offset.rank() != shape.rank() || slab.count.rank() != shape.rank() {
        return Err(Error::shape_mismatch(pathname, shape, &slab.count));
    }
    if !slab.fits(shape) {
        let (end, extent) = slab
            .offset
            .extents()
            .iter()
            .zip(slab.count.extents())
            .zip(shape.extents())
            .map(|((o, c), e)| (o.saturating_add(*c), *e))
            .find(|(end, e)| end > e)
            .unwrap_or((0, 0));
        return Err(Error::out_of_range(pathname, end.saturating_sub(1), extent));
    }
    let expected = slab.nr_elements() as usize * element_size;
    if buffer_len != expected {
        return Err(Error::shape_mismatch(
            pathname,
            format!("{} bytes", expected),
            format!("{} bytes", buffer_len),
        ));
    }
    Ok(())
}

impl fmt::Debug for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Dataset({}:{} {})", self.file.name(), self.pathname(), self.datatype)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::{ElementType, IndexRange};

    fn u32_dataset(name: &str, dataspace: Dataspace, properties: CreationProperties) -> Dataset {
        let file = File::create_in_memory("dataset-tests");
        file.root()
            .create_dataset(name, Datatype::native(ElementType::Uint32), dataspace, properties)
            .unwrap()
    }

    fn bytes(values: &[u32]) -> Vec<u8> {
        bytemuck::cast_slice(values).to_vec()
    }

    fn values(bytes: &[u8]) -> Vec<u32> {
        bytemuck::pod_collect_to_vec(bytes)
    }

    #[test]
    fn test_write_read_rows() {
        let dataset = u32_dataset(
            "v",
            Dataspace::unlimited_rows(Shape::from([3, 2])),
            CreationProperties::default(),
        );
        let shape = dataset.shape().unwrap();
        dataset
            .write(&Hyperslab::all(&shape), &bytes(&[1, 2, 3, 4, 5, 6]))
            .unwrap();

        let slab = Hyperslab::rows(IndexRange::new(1, 3), &shape);
        let mut buffer = vec![0u8; 16];
        dataset.read(&slab, &mut buffer).unwrap();
        assert_eq!(values(&buffer), vec![3, 4, 5, 6]);
    }

    #[test]
    fn test_resize_rows_uses_fill_value() {
        let dataset = u32_dataset(
            "v",
            Dataspace::unlimited_rows(Shape::from([1, 2])),
            CreationProperties::new().with_fill_value(bytes(&[9])),
        );
        dataset
            .write(&Hyperslab::all(&Shape::from([1, 2])), &bytes(&[1, 2]))
            .unwrap();
        dataset.resize(&Shape::from([3, 2])).unwrap();

        let mut buffer = vec![0u8; 24];
        dataset
            .read(&Hyperslab::all(&Shape::from([3, 2])), &mut buffer)
            .unwrap();
        assert_eq!(values(&buffer), vec![1, 2, 9, 9, 9, 9]);
    }

    #[test]
    fn test_resize_inner_axis_relayouts() {
        let dataset = u32_dataset(
            "v",
            Dataspace::new(Shape::from([2, 2]), vec![None, None]),
            CreationProperties::default(),
        );
        dataset
            .write(&Hyperslab::all(&Shape::from([2, 2])), &bytes(&[1, 2, 3, 4]))
            .unwrap();
        dataset.resize(&Shape::from([2, 3])).unwrap();

        let mut buffer = vec![0u8; 24];
        dataset
            .read(&Hyperslab::all(&Shape::from([2, 3])), &mut buffer)
            .unwrap();
        assert_eq!(values(&buffer), vec![1, 2, 0, 3, 4, 0]);
    }

    #[test]
    fn test_resize_beyond_maximum() {
        let dataset = u32_dataset(
            "v",
            Dataspace::fixed(Shape::from([2])),
            CreationProperties::default(),
        );
        assert!(matches!(
            dataset.resize(&Shape::from([3])),
            Err(Error::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_out_of_range_selection() {
        let dataset = u32_dataset(
            "v",
            Dataspace::unlimited_rows(Shape::from([2])),
            CreationProperties::default(),
        );
        let slab = Hyperslab::rows(IndexRange::new(1, 3), &Shape::from([2]));
        let mut buffer = vec![0u8; 8];
        assert!(matches!(
            dataset.read(&slab, &mut buffer),
            Err(Error::OutOfRange { index: 2, count: 2, .. })
        ));

        let mut short = vec![0u8; 4];
        assert!(matches!(
            dataset.read(&Hyperslab::all(&Shape::from([2])), &mut short),
            Err(Error::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_invalid_creation_properties() {
        let file = File::create_in_memory("dataset-tests");
        let result = file.root().create_dataset(
            "v",
            Datatype::native(ElementType::Uint32),
            Dataspace::unlimited_rows(Shape::from([0, 3])),
            CreationProperties::new().with_chunk(Shape::from([10])),
        );
        assert!(matches!(result, Err(Error::ShapeMismatch { .. })));
    }
}
