//! Chunk shape policy for growable datasets.
//!
//! A chunk of a value dataset spans one or more object arrays. Its size in
//! bytes is kept between [`LOWER_CHUNK_SIZE_LIMIT`] and
//! [`UPPER_CHUNK_SIZE_LIMIT`]:
//! - small object arrays are grouped, as many as fit in the upper limit
//! - large object arrays are split, giving each value dimension an equal
//!   share of the budget, visiting dimensions in increasing extent order

use crate::util::{Extent, Shape};

/// Lower limit of the size of a chunk, in bytes.
pub const LOWER_CHUNK_SIZE_LIMIT: usize = 10 * 1024;

/// Upper limit of the size of a chunk, in bytes.
pub const UPPER_CHUNK_SIZE_LIMIT: usize = 1024 * 1024;

/// Size in bytes of a chunk of `chunk` elements of `element_size` bytes each.
pub fn size_of_chunk(chunk: &Shape, element_size: usize) -> usize {
    chunk.extents().iter().map(|&e| e as usize).product::<usize>() * element_size
}

/// Chunk shape for a dataset storing arrays of `value_shape` along a leading
/// object axis.
///
/// The result has rank `value_shape.rank() + 1`.
pub fn chunk_shape(value_shape: &Shape, element_size: usize) -> Shape {
    let element_size = element_size.max(1);
    // Zero extents still need a chunk extent of at least one
    let extents: Vec<Extent> = value_shape.extents().iter().map(|&e| e.max(1)).collect();
    let nr_value_elements: usize = extents.iter().map(|&e| e as usize).product();
    let value_size = nr_value_elements.saturating_mul(element_size);

    let mut chunk = Vec::with_capacity(extents.len() + 1);

    if value_size <= UPPER_CHUNK_SIZE_LIMIT {
        chunk.push((UPPER_CHUNK_SIZE_LIMIT / value_size) as Extent);
        chunk.extend_from_slice(&extents);
        return Shape::from(chunk);
    }

    // A single object array does not fit. Split it, handing out the element
    // budget from the smallest dimension to the largest one.
    chunk.push(1);
    let mut value_chunk = vec![0 as Extent; extents.len()];
    let mut order: Vec<usize> = (0..extents.len()).collect();
    order.sort_by_key(|&d| extents[d]);

    let mut budget = (UPPER_CHUNK_SIZE_LIMIT / element_size) as u64;
    for (i, &d) in order.iter().enumerate() {
        let nr_remaining = (order.len() - i) as f64;
        let share = ((budget as f64).powf(1.0 / nr_remaining).floor() as u64).max(1);
        let extent = extents[d].min(share).min(budget.max(1));
        value_chunk[d] = extent;
        budget = (budget / extent).max(1);
    }

    chunk.extend_from_slice(&value_chunk);
    Shape::from(chunk)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_within_limits(shape: &Shape, element_size: usize) {
        let chunk = chunk_shape(shape, element_size);
        let size = size_of_chunk(&chunk, element_size);
        assert_eq!(chunk.rank(), shape.rank() + 1);
        assert!(size >= LOWER_CHUNK_SIZE_LIMIT, "{} -> {} ({} bytes)", shape, chunk, size);
        assert!(size <= UPPER_CHUNK_SIZE_LIMIT, "{} -> {} ({} bytes)", shape, chunk, size);
    }

    #[test]
    fn test_scalar_values() {
        let chunk = chunk_shape(&Shape::scalar(), 8);
        assert_eq!(chunk, Shape::from([UPPER_CHUNK_SIZE_LIMIT as u64 / 8]));
        assert_within_limits(&Shape::scalar(), 1);
    }

    #[test]
    fn test_small_values_are_grouped() {
        let chunk = chunk_shape(&Shape::from([3]), 4);
        assert_eq!(chunk.extent(1), Some(3));
        assert_eq!(chunk.extent(0), Some((UPPER_CHUNK_SIZE_LIMIT / 12) as u64));
    }

    #[test]
    fn test_large_values_are_split() {
        let shape = Shape::from([5000, 6000]);
        let chunk = chunk_shape(&shape, 4);
        assert_eq!(chunk.extent(0), Some(1));
        assert!(chunk.extent(1).unwrap() < 5000);
        assert!(chunk.extent(2).unwrap() < 6000);
        assert_within_limits(&shape, 4);
    }

    #[test]
    fn test_large_elongated_values() {
        assert_within_limits(&Shape::from([2, 3_000_000]), 8);
        assert_within_limits(&Shape::from([5_000_000]), 8);
        assert_within_limits(&Shape::from([1, 1, 9_000_000]), 2);
    }

    #[test]
    fn test_zero_extents() {
        assert_within_limits(&Shape::from([0, 4]), 8);
    }
}
