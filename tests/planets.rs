//! Integration tests writing a dataset of planets and reading it back.

mod common;

use lue::array::same_shape;
use lue::prelude::*;
use lue::validate::assert_is_valid_path;
use rand::seq::SliceRandom;
use rand::Rng;

const NR_PLANETS: usize = 15;

#[test]
fn test_roundtrip_planet_gravity() {
    common::init_tracing();
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("planets.lue");

    let mut rng = rand::thread_rng();
    let mut ids: Vec<Id> = (0..100).collect();
    ids.shuffle(&mut rng);
    ids.truncate(NR_PLANETS);
    let gravity: Vec<f32> = (0..NR_PLANETS).map(|_| rng.gen_range(5.0..15.0)).collect();

    // Write dataset
    {
        let mut dataset =
            Dataset::create(&path, Some("solar system")).expect("Failed to create dataset");
        let planets = dataset
            .add_phenomenon("planets", None)
            .expect("Failed to add phenomenon");
        planets.object_id().append(&ids).expect("Failed to write IDs");

        let constants = planets
            .property_sets_mut()
            .add("constants", &DomainDefinition::omnipresent())
            .expect("Failed to add property set");
        let property = constants
            .properties_mut()
            .add(
                "gravity",
                Datatype::native_of::<f32>(),
                Shape::scalar(),
                Some("surface gravity"),
            )
            .expect("Failed to add property");
        let value = property.value().as_same_shape().expect("Not a same shape value");
        value.reserve(NR_PLANETS as Count).expect("Failed to reserve");
        value.write_all(&gravity).expect("Failed to write values");

        assert_is_valid(&dataset, true).expect("Written dataset is not valid");
        dataset.flush().expect("Failed to flush");
    }

    // Read back and verify
    let dataset = Dataset::open(&path, OpenMode::ReadOnly).expect("Failed to open dataset");
    assert_eq!(
        dataset.description().expect("Failed to read description").as_deref(),
        Some("solar system")
    );
    assert_eq!(dataset.phenomena().names(), vec!["planets"]);

    let planets = dataset.phenomena().get("planets").expect("Missing planets");
    assert_eq!(planets.object_id().read_all().expect("Failed to read IDs"), ids);

    let constants = planets
        .property_sets()
        .get("constants")
        .expect("Missing constants");
    assert!(!constants.has_time_domain());
    assert!(!constants.has_space_domain());

    let properties = constants.properties();
    assert_eq!(properties.names(), vec!["gravity"]);
    assert_eq!(
        properties.shape_per_object("gravity").expect("Missing gravity"),
        ShapePerObject::Same
    );
    assert_eq!(
        properties.value_variability("gravity").expect("Missing gravity"),
        ValueVariability::Constant
    );
    assert_eq!(
        properties
            .get("gravity")
            .expect("Missing gravity")
            .description()
            .expect("Failed to read description")
            .as_deref(),
        Some("surface gravity")
    );

    let value = properties
        .value_as::<same_shape::Value>("gravity")
        .expect("Not a same shape value");
    assert_eq!(value.nr_arrays().expect("Failed to count"), NR_PLANETS as Count);
    assert_eq!(value.memory_datatype(), Datatype::native_of::<f32>());
    assert_eq!(value.read_all::<f32>().expect("Failed to read values"), gravity);
    assert!(gravity.iter().all(|g| (5.0..15.0).contains(g)));

    // Typed view over all same shape properties
    let typed = properties
        .collection::<same_shape::Value>()
        .expect("Properties differ in kind");
    assert_eq!(typed.len(), 1);
    assert_eq!(
        typed.get("gravity").expect("Missing gravity").read::<f32>(3).expect("Failed to read"),
        vec![gravity[3]]
    );

    drop(dataset);
    assert_is_valid_path(&path, true).expect("Reopened dataset is not valid");
}

#[test]
fn test_roundtrip_different_shape() {
    common::init_tracing();
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("areas.lue");

    let ids: [Id; 3] = [5, 7, 9];
    let shapes = [Shape::from([3, 2]), Shape::from([5, 4]), Shape::from([7, 6])];

    {
        let mut dataset = Dataset::create(&path, None).expect("Failed to create dataset");
        let areas = dataset
            .add_phenomenon("areas", None)
            .expect("Failed to add phenomenon");
        areas.object_id().append(&ids).expect("Failed to write IDs");

        let constants = areas
            .property_sets_mut()
            .add("constants", &DomainDefinition::omnipresent())
            .expect("Failed to add property set");
        let property = constants
            .properties_mut()
            .add_different_shape("elevation", Datatype::native_of::<i32>(), 2, None)
            .expect("Failed to add property");
        let value = property
            .value()
            .as_different_shape()
            .expect("Not a different shape value");
        value.reserve(&ids, &shapes).expect("Failed to reserve");

        for (&id, shape) in ids.iter().zip(&shapes) {
            let values: Vec<i32> = (0..shape.nr_elements() as i32).map(|v| v * id as i32).collect();
            value
                .get(id)
                .expect("Missing object array")
                .write_all(&values)
                .expect("Failed to write object array");
        }
        dataset.flush().expect("Failed to flush");
    }

    let dataset = Dataset::open(&path, OpenMode::ReadOnly).expect("Failed to open dataset");
    assert_is_valid(&dataset, true).expect("Dataset is not valid");

    let properties = dataset
        .phenomena()
        .get("areas")
        .and_then(|areas| areas.property_sets().get("constants"))
        .map(|constants| constants.properties())
        .expect("Missing property set");
    let value = properties
        .get("elevation")
        .expect("Missing elevation")
        .value()
        .as_different_shape()
        .expect("Not a different shape value");

    assert_eq!(value.nr_objects().expect("Failed to count"), 3);
    assert_eq!(value.object_ids(), ids.to_vec());
    assert!(!value.contains(6));
    for (&id, shape) in ids.iter().zip(&shapes) {
        let array = value.get(id).expect("Missing object array");
        assert_eq!(&array.shape().expect("Failed to read shape"), shape);
        let values = array.read_all::<i32>().expect("Failed to read object array");
        assert_eq!(values.len() as Count, shape.nr_elements());
        assert_eq!(values[1], id as i32);
    }
    assert!(value.get(6).is_err());
}

#[test]
fn test_universes() {
    common::init_tracing();
    let mut dataset = Dataset::create_in_memory("universes", None).expect("Failed to create");
    for name in ["baseline", "scenario"] {
        let universe = dataset.add_universe(name).expect("Failed to add universe");
        let planets = universe
            .phenomena_mut()
            .add("planets", None)
            .expect("Failed to add phenomenon");
        planets.object_id().append(&[1, 2]).expect("Failed to write IDs");
    }
    assert!(matches!(dataset.add_universe("baseline"), Err(Error::AlreadyExists(_))));

    let scenario = dataset.universes().get("scenario").expect("Missing scenario");
    assert_eq!(scenario.phenomena().names(), vec!["planets"]);
    assert!(dataset.phenomena().is_empty());
    assert_is_valid(&dataset, true).expect("Dataset is not valid");
}
