//! Property-based tests for chunking, aspects and object tracking.

use lue::container::chunk::{
    chunk_shape, size_of_chunk, LOWER_CHUNK_SIZE_LIMIT, UPPER_CHUNK_SIZE_LIMIT,
};
use lue::core::{Aspect, Mobility, TimeUnit};
use lue::prelude::*;
use proptest::prelude::*;

proptest! {
    #[test]
    fn test_chunk_shape_within_limits(
        extents in prop::collection::vec(0u64..5000, 0..4),
        element_size in prop::sample::select(vec![1usize, 2, 4, 8]),
    ) {
        let shape = Shape::from(extents.clone());
        let chunk = chunk_shape(&shape, element_size);
        prop_assert_eq!(chunk.rank(), shape.rank() + 1);
        prop_assert!(chunk.extents().iter().all(|&e| e >= 1));

        let size = size_of_chunk(&chunk, element_size);
        prop_assert!(size >= LOWER_CHUNK_SIZE_LIMIT, "{} -> {}", shape, chunk);
        prop_assert!(size <= UPPER_CHUNK_SIZE_LIMIT, "{} -> {}", shape, chunk);

        // Object arrays that fit are never split
        let extents: Vec<u64> = extents.iter().map(|&e| e.max(1)).collect();
        let value_size = extents.iter().product::<u64>() as usize * element_size;
        if value_size <= UPPER_CHUNK_SIZE_LIMIT {
            prop_assert_eq!(chunk.tail(), Shape::from(extents));
        }
    }

    #[test]
    fn test_unknown_tags_rejected(tag in "[a-z_]{1,24}") {
        let known = Mobility::TABLE.iter().any(|(_, t)| *t == tag);
        prop_assert_eq!(Mobility::decode(&tag).is_ok(), known);
        let known = TimeUnit::TABLE.iter().any(|(_, t)| *t == tag);
        prop_assert_eq!(TimeUnit::decode(&tag).is_ok(), known);
    }

    #[test]
    fn test_active_sets_partition_ids(
        sets in prop::collection::vec(prop::collection::btree_set(0u64..50, 0..8), 0..12),
    ) {
        let mut dataset = Dataset::create_in_memory("proptest", None).expect("Failed to create");
        let cars = dataset.add_phenomenon("cars", None).expect("Failed to add phenomenon");
        cars.object_id().append(&(0..50).collect::<Vec<Id>>()).expect("Failed to write IDs");
        let set = cars
            .property_sets_mut()
            .add("positions", &DomainDefinition::omnipresent())
            .expect("Failed to add property set");
        let tracker = set.object_tracker();

        let mut next_index = 0;
        for (set_index, ids) in sets.iter().enumerate() {
            let ids: Vec<Id> = ids.iter().copied().collect();
            let indices: Vec<Index> = (next_index..next_index + ids.len() as Index).collect();
            next_index += ids.len() as Index;
            prop_assert_eq!(
                tracker.add_active_set(&ids, &indices).expect("Failed to add active set"),
                set_index as Index
            );
        }

        prop_assert_eq!(tracker.nr_active_sets().expect("Failed to count"), sets.len() as Count);
        let bounds = tracker.active_set_bounds().expect("Failed to read bounds");
        prop_assert_eq!(bounds.len(), sets.len() + 1);
        prop_assert!(bounds.windows(2).all(|pair| pair[0] <= pair[1]));
        prop_assert_eq!(*bounds.last().expect("Bounds are never empty"), next_index);

        for (set_index, ids) in sets.iter().enumerate() {
            let range = tracker.active_set(set_index as Index).expect("Missing active set");
            prop_assert_eq!(range.len(), ids.len() as Count);
            let stored = tracker.active_object_id().read(range).expect("Failed to read IDs");
            prop_assert_eq!(stored, ids.iter().copied().collect::<Vec<Id>>());
        }
        prop_assert!(tracker.active_set(sets.len() as Index).is_err());

        let mut issues = Issues::new();
        validate(&dataset, &mut issues);
        prop_assert!(!issues.errors_found(), "{}", lue::validate::message(&issues));
    }
}
