//! Integration tests for dataset validation.

mod common;

use lue::core::{SpaceDiscretization, TimeDiscretization};
use lue::prelude::*;
use lue::validate::{assert_is_valid_path, message, validate_path, Severity};

const GRAVITY_PATH: &str = "/planets/lue_property_sets/constants/lue_properties/gravity";

/// Three planets, but gravity values for only `nr_values` of them.
fn planets(nr_values: Count) -> Dataset {
    let mut dataset = Dataset::create_in_memory("planets", None).expect("Failed to create");
    let planets = dataset
        .add_phenomenon("planets", None)
        .expect("Failed to add phenomenon");
    planets.object_id().append(&[4, 5, 6]).expect("Failed to write IDs");
    let constants = planets
        .property_sets_mut()
        .add("constants", &DomainDefinition::omnipresent())
        .expect("Failed to add property set");
    let gravity = constants
        .properties_mut()
        .add("gravity", Datatype::native_of::<f32>(), Shape::scalar(), None)
        .expect("Failed to add property");
    gravity
        .value()
        .as_same_shape()
        .expect("Not a same shape value")
        .reserve(nr_values)
        .expect("Failed to reserve");
    dataset
}

#[test]
fn test_value_count_mismatch() {
    common::init_tracing();
    let dataset = planets(2);

    let mut issues = Issues::new();
    validate(&dataset, &mut issues);
    assert_eq!(issues.errors().len(), 1);
    assert!(!issues.warnings_found());

    let issue = &issues.errors()[0];
    assert_eq!(issue.location(), GRAVITY_PATH);
    assert_eq!(issue.severity(), Severity::Error);
    assert!(issue.message().contains("(2 != 3)"), "{}", issue);

    let error = assert_is_valid(&dataset, false).expect_err("Dataset should be invalid");
    assert!(matches!(error, Error::Invalid(_)));
    assert_eq!(error.to_string(), message(&issues));
    assert!(error.to_string().starts_with(&format!("{}:\n- [1/1] error: ", GRAVITY_PATH)));
}

#[test]
fn test_value_count_match() {
    common::init_tracing();
    let dataset = planets(3);
    assert!(assert_is_valid(&dataset, true).is_ok());
}

#[test]
fn test_validate_file() {
    common::init_tracing();
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("planets.lue");
    {
        let mut dataset = Dataset::create(&path, None).expect("Failed to create dataset");
        let planets = dataset
            .add_phenomenon("planets", None)
            .expect("Failed to add phenomenon");
        planets.object_id().append(&[1, 2]).expect("Failed to write IDs");
        planets
            .property_sets_mut()
            .add("constants", &DomainDefinition::omnipresent())
            .expect("Failed to add property set")
            .properties_mut()
            .add("radius", Datatype::native_of::<f64>(), Shape::scalar(), None)
            .expect("Failed to add property");
        dataset.flush().expect("Failed to flush");
    }

    let mut issues = Issues::new();
    validate_path(&path, &mut issues);
    assert_eq!(issues.errors().len(), 1);
    assert!(issues.errors()[0].message().contains("(0 != 2)"));
    assert!(assert_is_valid_path(&path, false).is_err());

    // Not a dataset at all
    let garbage = dir.path().join("garbage.lue");
    std::fs::write(&garbage, b"not a dataset").expect("Failed to write file");
    let mut issues = Issues::new();
    validate_path(&garbage, &mut issues);
    assert_eq!(issues.errors().len(), 1);
    assert_eq!(issues.errors()[0].location(), garbage.display().to_string());
}

#[test]
fn test_unsupported_discretization_warns() {
    common::init_tracing();
    let mut dataset = planets(3);
    {
        let planets = dataset.phenomena_mut().get_mut("planets").expect("Missing planets");
        let constants = planets
            .property_sets_mut()
            .get_mut("constants")
            .expect("Missing constants");
        let shape = constants
            .properties_mut()
            .add("shape", Datatype::native_of::<u64>(), Shape::from([2]), None)
            .expect("Failed to add property");
        shape
            .value()
            .as_same_shape()
            .expect("Not a same shape value")
            .reserve(3)
            .expect("Failed to reserve");
    }

    let properties = dataset
        .phenomena()
        .get("planets")
        .and_then(|planets| planets.property_sets().get("constants"))
        .map(|constants| constants.properties())
        .expect("Missing properties");
    let gravity = properties.get("gravity").expect("Missing gravity");
    let shape = properties.get("shape").expect("Missing shape");
    gravity
        .set_time_discretization(TimeDiscretization::RegularGrid, shape)
        .expect("Failed to discretize");

    let mut issues = Issues::new();
    validate(&dataset, &mut issues);
    assert!(!issues.errors_found());
    assert_eq!(issues.warnings().len(), 1);
    assert_eq!(issues.warnings()[0].location(), GRAVITY_PATH);
    assert!(issues.warnings()[0].message().ends_with("is not supported yet"));

    assert!(assert_is_valid(&dataset, false).is_ok());
    assert!(assert_is_valid(&dataset, true).is_err());
}

#[test]
fn test_space_discretization() {
    common::init_tracing();
    let mut dataset = Dataset::create_in_memory("areas", None).expect("Failed to create");
    let areas = dataset
        .add_phenomenon("areas", None)
        .expect("Failed to add phenomenon");
    areas.object_id().append(&[1, 2]).expect("Failed to write IDs");
    let definition = DomainDefinition::new().with_space(
        SpaceConfiguration::new(Mobility::Stationary, SpaceDomainItemType::Box),
        Datatype::native_of::<f64>(),
        2,
    );
    let set = areas
        .property_sets_mut()
        .add("areas", &definition)
        .expect("Failed to add property set");
    set.space_domain()
        .expect("Missing space domain")
        .value()
        .append(&[0.0f64, 0.0, 3.0, 2.0, 3.0, 0.0, 8.0, 4.0])
        .expect("Failed to write boxes");

    let properties = set.properties_mut();
    properties
        .add_different_shape("elevation", Datatype::native_of::<f32>(), 2, None)
        .expect("Failed to add elevation")
        .value()
        .as_different_shape()
        .expect("Not a different shape value")
        .reserve(&[1, 2], &[Shape::from([2, 3]), Shape::from([4, 5])])
        .expect("Failed to reserve");
    let grid_shape = properties
        .add("grid_shape", Datatype::native_of::<u32>(), Shape::from([2]), None)
        .expect("Failed to add grid shape")
        .value()
        .as_same_shape()
        .expect("Not a same shape value")
        .clone();
    grid_shape.reserve(2).expect("Failed to reserve");
    grid_shape.write_all(&[2u32, 3, 4, 5]).expect("Failed to write");

    let elevation = properties.get("elevation").expect("Missing elevation");
    let grid_shape_property = properties.get("grid_shape").expect("Missing grid shape");
    elevation
        .set_space_discretization(SpaceDiscretization::RegularGrid, grid_shape_property)
        .expect("Failed to discretize");
    assert_eq!(
        elevation.space_discretization_type().expect("Missing type"),
        SpaceDiscretization::RegularGrid
    );
    assert!(assert_is_valid(&dataset, true).is_ok());

    // One grid shape too many
    grid_shape.reserve(3).expect("Failed to reserve");
    let mut issues = Issues::new();
    validate(&dataset, &mut issues);
    // Both the grid shape values and the discretization are off
    assert_eq!(issues.errors().len(), 2, "{}", message(&issues));
    assert!(issues
        .errors()
        .iter()
        .any(|issue| issue.message().contains("number of object arrays discretized (3 != 2)")));
}

#[test]
fn test_validate_universes() {
    common::init_tracing();
    let mut dataset = Dataset::create_in_memory("universes", None).expect("Failed to create");
    let universe = dataset.add_universe("scenario").expect("Failed to add universe");
    let planets = universe
        .phenomena_mut()
        .add("planets", None)
        .expect("Failed to add phenomenon");
    planets.object_id().append(&[1, 1]).expect("Failed to write IDs");
    planets
        .property_sets_mut()
        .add("constants", &DomainDefinition::omnipresent())
        .expect("Failed to add property set");

    let mut issues = Issues::new();
    validate(&dataset, &mut issues);
    assert_eq!(issues.errors().len(), 1);
    assert_eq!(issues.errors()[0].location(), "/scenario/planets/lue_object_id");
}
