//! Array shapes and selections.
//!
//! - [`Shape`] - extents of a multi-dimensional array
//! - [`Hyperslab`] - rectangular selection (offset + count) within a shape
//! - [`IndexRange`] - half-open range of indices along one axis

use smallvec::SmallVec;
use std::fmt;

/// Number of things (objects, arrays, locations).
pub type Count = u64;
/// Position along an axis.
pub type Index = u64;
/// Number of dimensions.
pub type Rank = usize;
/// Extent of a single dimension.
pub type Extent = u64;
/// Object identifier, unique within a phenomenon.
pub type Id = u64;

/// Shape of a multi-dimensional array. Empty means scalar (rank 0).
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Shape {
    dims: SmallVec<[Extent; 4]>,
}

impl Shape {
    /// Create a scalar shape (rank 0).
    pub fn scalar() -> Self {
        Self {
            dims: SmallVec::new(),
        }
    }

    /// Create from a slice of extents.
    pub fn from_slice(extents: &[Extent]) -> Self {
        Self {
            dims: SmallVec::from_slice(extents),
        }
    }

    /// Rank (number of dimensions).
    #[inline]
    pub fn rank(&self) -> Rank {
        self.dims.len()
    }

    /// Extent of a specific dimension, if present.
    pub fn extent(&self, dim: usize) -> Option<Extent> {
        self.dims.get(dim).copied()
    }

    /// All extents as a slice.
    pub fn extents(&self) -> &[Extent] {
        &self.dims
    }

    /// Mutable access to the extents.
    pub fn extents_mut(&mut self) -> &mut [Extent] {
        &mut self.dims
    }

    /// Total number of elements (product of all extents, 1 for scalars).
    pub fn nr_elements(&self) -> Count {
        self.dims.iter().product()
    }

    #[inline]
    pub fn is_scalar(&self) -> bool {
        self.dims.is_empty()
    }

    /// Add a new dimension at the end.
    pub fn push(&mut self, extent: Extent) {
        self.dims.push(extent);
    }

    /// New shape with `extent` prepended as the slowest varying axis.
    pub fn prepend(&self, extent: Extent) -> Shape {
        let mut dims = SmallVec::with_capacity(self.rank() + 1);
        dims.push(extent);
        dims.extend_from_slice(&self.dims);
        Shape { dims }
    }

    /// New shape without the slowest varying axis.
    pub fn tail(&self) -> Shape {
        Shape::from_slice(self.dims.get(1..).unwrap_or(&[]))
    }
}

impl From<Vec<Extent>> for Shape {
    fn from(v: Vec<Extent>) -> Self {
        Self {
            dims: SmallVec::from_vec(v),
        }
    }
}

impl From<&[Extent]> for Shape {
    fn from(v: &[Extent]) -> Self {
        Self::from_slice(v)
    }
}

impl<const N: usize> From<[Extent; N]> for Shape {
    fn from(v: [Extent; N]) -> Self {
        Self::from_slice(&v)
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, s) in self.dims.iter().enumerate() {
            if i > 0 {
                write!(f, " x ")?;
            }
            write!(f, "{}", s)?;
        }
        write!(f, "]")
    }
}

/// Half-open range `[begin, end)` of indices along one axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct IndexRange {
    pub begin: Index,
    pub end: Index,
}

impl IndexRange {
    pub fn new(begin: Index, end: Index) -> Self {
        Self { begin, end }
    }

    /// Range holding only `index`, `None` when `index` is the last representable one.
    pub fn single(index: Index) -> Option<Self> {
        index.checked_add(1).map(|end| Self::new(index, end))
    }

    #[inline]
    pub fn len(&self) -> Count {
        self.end.saturating_sub(self.begin)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.end <= self.begin
    }
}

/// Rectangular selection within a shape.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Hyperslab {
    pub offset: Shape,
    pub count: Shape,
}

impl Hyperslab {
    pub fn new(offset: Shape, count: Shape) -> Self {
        Self { offset, count }
    }

    /// Selection covering all of `shape`.
    pub fn all(shape: &Shape) -> Self {
        Self {
            offset: Shape::from(vec![0; shape.rank()]),
            count: shape.clone(),
        }
    }

    /// Selection of `range` along the first axis, all of the remaining axes.
    pub fn rows(range: IndexRange, shape: &Shape) -> Self {
        let mut offset = Shape::from(vec![0; shape.rank()]);
        let mut count = shape.clone();
        if let (Some(o), Some(c)) = (offset.extents_mut().first_mut(), count.extents_mut().first_mut()) {
            *o = range.begin;
            *c = range.len();
        }
        Self { offset, count }
    }

    #[inline]
    pub fn rank(&self) -> Rank {
        self.offset.rank()
    }

    /// Number of selected elements.
    pub fn nr_elements(&self) -> Count {
        self.count.nr_elements()
    }

    /// Whether this selection lies within `shape`.
    pub fn fits(&self, shape: &Shape) -> bool {
        self.offset.rank() == shape.rank()
            && self.count.rank() == shape.rank()
            && self
                .offset
                .extents()
                .iter()
                .zip(self.count.extents())
                .zip(shape.extents())
                .all(|((o, c), e)| o.checked_add(*c).is_some_and(|end| end <= *e))
    }
}

impl fmt::Display for Hyperslab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "offset {} count {}", self.offset, self.count)
    }
}

/// Visit each contiguous run of elements selected by `slab` within `shape`.
///
/// The callback receives the element offset of the run within the full
/// row-major array, the element offset within the packed selection and the
/// run length. Runs follow the fastest varying axis.
pub fn for_each_run(shape: &Shape, slab: &Hyperslab, mut f: impl FnMut(usize, usize, usize)) {
    let rank = shape.rank();
    if slab.nr_elements() == 0 {
        return;
    }
    if rank == 0 {
        f(0, 0, 1);
        return;
    }

    let extents = shape.extents();
    let offset = slab.offset.extents();
    let count = slab.count.extents();

    // Row-major strides of the full array.
    let mut strides = vec![1usize; rank];
    for d in (0..rank - 1).rev() {
        strides[d] = strides[d + 1] * extents[d + 1] as usize;
    }

    let run = count[rank - 1] as usize;
    let mut index = vec![0u64; rank - 1];
    let mut packed = 0usize;

    loop {
        let mut source = offset[rank - 1] as usize;
        for d in 0..rank - 1 {
            source += (offset[d] + index[d]) as usize * strides[d];
        }
        f(source, packed, run);
        packed += run;

        // Advance the multi-index over all but the last axis.
        let mut d = rank - 1;
        loop {
            if d == 0 {
                return;
            }
            d -= 1;
            index[d] += 1;
            if index[d] < count[d] {
                break;
            }
            index[d] = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_basics() {
        let s = Shape::scalar();
        assert_eq!(s.rank(), 0);
        assert_eq!(s.nr_elements(), 1);

        let s = Shape::from([3, 4]);
        assert_eq!(s.rank(), 2);
        assert_eq!(s.nr_elements(), 12);
        assert_eq!(s.prepend(5), Shape::from([5, 3, 4]));
        assert_eq!(s.prepend(5).tail(), s);
        assert_eq!(s.to_string(), "[3 x 4]");
    }

    #[test]
    fn test_hyperslab_fits() {
        let shape = Shape::from([10, 3]);
        assert!(Hyperslab::all(&shape).fits(&shape));
        assert!(Hyperslab::rows(IndexRange::new(2, 5), &shape).fits(&shape));
        assert!(!Hyperslab::rows(IndexRange::new(8, 11), &shape).fits(&shape));
        assert!(!Hyperslab::all(&Shape::from([10])).fits(&shape));
    }

    #[test]
    fn test_for_each_run_2d() {
        // 4 x 3 array, select rows 1..3, columns 1..3
        let shape = Shape::from([4, 3]);
        let slab = Hyperslab::new(Shape::from([1, 1]), Shape::from([2, 2]));
        let mut runs = Vec::new();
        for_each_run(&shape, &slab, |src, dst, n| runs.push((src, dst, n)));
        assert_eq!(runs, vec![(4, 0, 2), (7, 2, 2)]);
    }

    #[test]
    fn test_for_each_run_scalar_and_empty() {
        let mut runs = Vec::new();
        for_each_run(&Shape::scalar(), &Hyperslab::all(&Shape::scalar()), |s, d, n| {
            runs.push((s, d, n))
        });
        assert_eq!(runs, vec![(0, 0, 1)]);

        runs.clear();
        let shape = Shape::from([0, 3]);
        for_each_run(&shape, &Hyperslab::all(&shape), |s, d, n| runs.push((s, d, n)));
        assert!(runs.is_empty());
    }
}
