//! Object IDs and the active-object indirection.
//!
//! An [`ObjectTracker`] holds three parallel arrays:
//! - `lue_active_set_index` - per time location, offset of its active set in
//!   the active object IDs
//! - `lue_active_object_id` - per active object, its ID
//! - `lue_active_object_index` - per active object, the index of its array in
//!   the property values
//!
//! The begin offsets in the active set index are non-decreasing. Together
//! with the number of active object IDs as end sentinel they bound each
//! active set.

use tracing::{debug, trace};

use crate::array::Array;
use crate::container::chunk::chunk_shape;
use crate::container::{CreationProperties, Dataspace, Group};
use crate::core::tag::{
    ACTIVE_OBJECT_ID_TAG, ACTIVE_OBJECT_INDEX_TAG, ACTIVE_SET_INDEX_TAG, OBJECT_TRACKER_TAG,
};
use crate::util::{
    file_datatype, Count, Datatype, Element, Error, Hyperslab, Id, Index, IndexRange, Result,
    Shape,
};

/// Create a growable 1-D array of `u64` elements.
fn create_u64_array(parent: &Group, name: &str) -> Result<Array> {
    let memory_datatype = Datatype::native_of::<u64>();
    Array::create(
        parent,
        name,
        file_datatype(&memory_datatype),
        memory_datatype,
        Dataspace::unlimited_rows(Shape::from([0])),
        CreationProperties::new().with_chunk(chunk_shape(&Shape::scalar(), u64::SIZE)),
    )
}

macro_rules! growable_array {
    (
        $(#[$meta:meta])*
        $name:ident, $element:ty, $count:ident
    ) => {
        $(#[$meta])*
        #[derive(Clone, Debug)]
        pub struct $name {
            array: Array,
        }

        impl $name {
            pub fn create(parent: &Group, name: &str) -> Result<Self> {
                Ok(Self {
                    array: create_u64_array(parent, name)?,
                })
            }

            pub fn open(parent: &Group, name: &str) -> Result<Self> {
                Ok(Self {
                    array: Array::open(parent, name, Some(Datatype::native_of::<u64>()))?,
                })
            }

            pub fn array(&self) -> &Array {
                &self.array
            }

            pub fn pathname(&self) -> String {
                self.array.pathname()
            }

            /// Number of stored elements.
            pub fn $count(&self) -> Result<Count> {
                Ok(self.array.shape()?.extent(0).unwrap_or(0))
            }

            /// Make room for at least `count` elements. Never shrinks.
            pub fn reserve(&self, count: Count) -> Result<()> {
                let current = self.$count()?;
                if count > current {
                    trace!(path = %self.pathname(), from = current, to = count, "reserve");
                    self.array.resize(&Shape::from([count]))?;
                }
                Ok(())
            }

            /// Append `values`, returning the index of the first one.
            pub fn append(&self, values: &[$element]) -> Result<Index> {
                let first = self.$count()?;
                self.reserve(first + values.len() as Count)?;
                self.write(IndexRange::new(first, first + values.len() as Count), values)?;
                Ok(first)
            }

            pub fn read_all(&self) -> Result<Vec<$element>> {
                self.array.read_all()
            }

            pub fn write_all(&self, values: &[$element]) -> Result<()> {
                self.array.write_all(values)
            }

            fn check_range(&self, range: IndexRange) -> Result<()> {
                let count = self.$count()?;
                if range.end > count || range.begin > range.end {
                    return Err(Error::out_of_range(
                        self.pathname(),
                        range.end.max(range.begin).saturating_sub(1),
                        count,
                    ));
                }
                Ok(())
            }

            pub fn read(&self, range: IndexRange) -> Result<Vec<$element>> {
                self.check_range(range)?;
                self.array.read(&Hyperslab::rows(range, &Shape::from([range.end])))
            }

            pub fn write(&self, range: IndexRange, values: &[$element]) -> Result<()> {
                self.check_range(range)?;
                self.array
                    .write(&Hyperslab::rows(range, &Shape::from([range.end])), values)
            }

            fn single(&self, index: Index) -> Result<IndexRange> {
                match IndexRange::single(index) {
                    Some(range) => Ok(range),
                    None => Err(Error::out_of_range(self.pathname(), index, self.$count()?)),
                }
            }

            pub fn read_at(&self, index: Index) -> Result<$element> {
                let values = self.read(self.single(index)?)?;
                values
                    .first()
                    .copied()
                    .ok_or_else(|| Error::out_of_range(self.pathname(), index, 0))
            }

            pub fn write_at(&self, index: Index, value: $element) -> Result<()> {
                self.write(self.single(index)?, &[value])
            }
        }
    };
}

growable_array! {
    /// Growable array of object IDs.
    ObjectId, Id, nr_ids
}

growable_array! {
    /// Growable array of indices, used for active set and active object indices.
    IndexArray, Index, nr_indices
}

/// Active sets of objects, per time location.
#[derive(Clone, Debug)]
pub struct ObjectTracker {
    group: Group,
    active_set_index: IndexArray,
    active_object_id: ObjectId,
    active_object_index: IndexArray,
}

/// Create an object tracker in `parent`.
pub fn create_object_tracker(parent: &Group) -> Result<ObjectTracker> {
    let group = parent.create_group(OBJECT_TRACKER_TAG)?;
    IndexArray::create(&group, ACTIVE_SET_INDEX_TAG)?;
    ObjectId::create(&group, ACTIVE_OBJECT_ID_TAG)?;
    IndexArray::create(&group, ACTIVE_OBJECT_INDEX_TAG)?;
    debug!(path = %group.pathname(), "created object tracker");
    ObjectTracker::open(parent)
}

/// Make `parent` share the object tracker of another property set.
pub fn link_object_tracker(parent: &Group, object_tracker: &ObjectTracker) -> Result<ObjectTracker> {
    parent.create_soft_link(OBJECT_TRACKER_TAG, &object_tracker.pathname())?;
    debug!(
        path = %parent.child_pathname(OBJECT_TRACKER_TAG),
        target = %object_tracker.pathname(),
        "linked object tracker"
    );
    ObjectTracker::open(parent)
}

/// Whether the object tracker in `parent` is a link to another one.
pub fn has_linked_object_tracker(parent: &Group) -> bool {
    parent.is_soft_link(OBJECT_TRACKER_TAG)
}

impl ObjectTracker {
    /// Open the object tracker in `parent`, following a link.
    pub fn open(parent: &Group) -> Result<Self> {
        let group = parent.open_required_group(OBJECT_TRACKER_TAG)?;
        Ok(Self {
            active_set_index: IndexArray::open(&group, ACTIVE_SET_INDEX_TAG)?,
            active_object_id: ObjectId::open(&group, ACTIVE_OBJECT_ID_TAG)?,
            active_object_index: IndexArray::open(&group, ACTIVE_OBJECT_INDEX_TAG)?,
            group,
        })
    }

    pub fn group(&self) -> &Group {
        &self.group
    }

    pub fn pathname(&self) -> String {
        self.group.pathname()
    }

    pub fn active_set_index(&self) -> &IndexArray {
        &self.active_set_index
    }

    pub fn active_set_index_mut(&mut self) -> &mut IndexArray {
        &mut self.active_set_index
    }

    pub fn active_object_id(&self) -> &ObjectId {
        &self.active_object_id
    }

    pub fn active_object_id_mut(&mut self) -> &mut ObjectId {
        &mut self.active_object_id
    }

    pub fn active_object_index(&self) -> &IndexArray {
        &self.active_object_index
    }

    pub fn active_object_index_mut(&mut self) -> &mut IndexArray {
        &mut self.active_object_index
    }

    pub fn nr_active_sets(&self) -> Result<Count> {
        self.active_set_index.nr_indices()
    }

    /// Append an active set: the IDs of the objects active at the next time
    /// location, plus the index of each object's array in the values.
    ///
    /// Returns the index of the new active set.
    pub fn add_active_set(&self, ids: &[Id], object_indices: &[Index]) -> Result<Index> {
        if ids.len() != object_indices.len() {
            return Err(Error::shape_mismatch(
                self.active_object_index.pathname(),
                format!("{} indices", ids.len()),
                format!("{} indices", object_indices.len()),
            ));
        }

        let begin = self.active_object_id.nr_ids()?;
        let set_index = self.active_set_index.append(&[begin])?;
        self.active_object_id.append(ids)?;
        self.active_object_index.append(object_indices)?;
        trace!(path = %self.pathname(), set_index, size = ids.len(), "added active set");
        Ok(set_index)
    }

    /// Begin offsets of all active sets, followed by the number of active
    /// object IDs.
    pub fn active_set_bounds(&self) -> Result<Vec<Index>> {
        let mut bounds = self.active_set_index.read_all()?;
        bounds.push(self.active_object_id.nr_ids()?);
        Ok(bounds)
    }

    /// Range of active object IDs making up active set `set_index`.
    pub fn active_set(&self, set_index: Index) -> Result<IndexRange> {
        let bounds = self.active_set_bounds()?;
        let nr_sets = bounds.len().saturating_sub(1) as Count;
        let begin = usize::try_from(set_index).ok().filter(|_| set_index < nr_sets);
        match begin.and_then(|begin| bounds.get(begin..=begin + 1)) {
            Some([begin, end]) => Ok(IndexRange::new(*begin, *end)),
            _ => Err(Error::out_of_range(
                self.active_set_index.pathname(),
                set_index,
                nr_sets,
            )),
        }
    }
}
