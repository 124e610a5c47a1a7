//! Dataset validation.
//!
//! Validation walks a dataset and records every violation of the data
//! model's consistency rules as an [`Issue`]. Errors make a dataset
//! unusable. Warnings flag parts that could not be checked.
//!
//! Per property set, the object tracker is checked first. Domains and
//! properties are only checked against a tracker without errors.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::path::Path;

use tracing::{debug, warn};

use crate::array::{different_shape, same_shape, Value, ValueStrategy};
use crate::container::OpenMode;
use crate::core::tag::COLLECTION_PROPERTY_SETS_TAG;
use crate::core::{
    Mobility, ShapePerObject, ShapeVariability, SpaceDomainItemType, TimeDomainItemType,
    ValueVariability,
};
use crate::object::domain::Domain;
use crate::object::{
    Dataset, ObjectTracker, Phenomenon, Property, PropertySet, SpaceDomain, TimeDomain,
    TimeDomainValue,
};
use crate::util::{Count, Error, Id, Index, Result};

/// ID standing in for the collection as a whole, when a collection property
/// set does not track any object yet.
const COLLECTION_ID: Id = 999;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Error => "error",
            Self::Warning => "warning",
        })
    }
}

/// One violation, recorded at the pathname of the node it concerns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Issue {
    location: String,
    severity: Severity,
    message: String,
}

impl Issue {
    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.location, self.severity, self.message)
    }
}

/// Errors and warnings found during validation.
#[derive(Clone, Debug, Default)]
pub struct Issues {
    errors: Vec<Issue>,
    warnings: Vec<Issue>,
}

impl Issues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, location: impl Into<String>, message: impl Into<String>) {
        self.errors.push(Issue {
            location: location.into(),
            severity: Severity::Error,
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, location: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(Issue {
            location: location.into(),
            severity: Severity::Warning,
            message: message.into(),
        });
    }

    pub fn errors(&self) -> &[Issue] {
        &self.errors
    }

    pub fn warnings(&self) -> &[Issue] {
        &self.warnings
    }

    pub fn errors_found(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn warnings_found(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len() + self.warnings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Format issues grouped per location.
///
/// Locations with errors come first, in the order of their first error.
/// Within a location, errors precede warnings. Issues are numbered over the
/// whole report.
pub fn message(issues: &Issues) -> String {
    let mut locations: Vec<(&str, Vec<&Issue>)> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for issue in issues.errors.iter().chain(&issues.warnings) {
        let position = *positions.entry(issue.location()).or_insert_with(|| {
            locations.push((issue.location(), Vec::new()));
            locations.len() - 1
        });
        locations[position].1.push(issue);
    }

    let nr_issues = issues.len();
    let mut count = 0;
    let mut text = String::new();
    for (location, location_issues) in locations {
        text.push_str(location);
        text.push_str(":\n");
        for issue in location_issues {
            count += 1;
            text.push_str(&format!(
                "- [{}/{}] {}: {}\n",
                count, nr_issues, issue.severity, issue.message
            ));
        }
    }
    text
}

/// Validate `dataset`, adding issues found to `issues`.
pub fn validate(dataset: &Dataset, issues: &mut Issues) {
    for (_, phenomenon) in dataset.phenomena().iter() {
        validate_phenomenon(phenomenon, issues);
    }
    for (_, universe) in dataset.universes().iter() {
        for (_, phenomenon) in universe.phenomena().iter() {
            validate_phenomenon(phenomenon, issues);
        }
    }

    if issues.errors_found() {
        warn!(
            dataset = %dataset.pathname(),
            nr_errors = issues.errors().len(),
            nr_warnings = issues.warnings().len(),
            "dataset is not valid"
        );
    } else {
        debug!(dataset = %dataset.pathname(), nr_warnings = issues.warnings().len(), "validated dataset");
    }
}

/// Validate the dataset at `path`. Failing to open it is an error issue.
pub fn validate_path(path: impl AsRef<Path>, issues: &mut Issues) {
    let path = path.as_ref();
    match Dataset::open(path, OpenMode::ReadOnly) {
        Ok(dataset) => validate(&dataset, issues),
        Err(error) => issues.add_error(path.display().to_string(), error.to_string()),
    }
}

fn check_issues(issues: &Issues, fail_on_warning: bool) -> Result<()> {
    if issues.errors_found() || (fail_on_warning && issues.warnings_found()) {
        return Err(Error::Invalid(message(issues)));
    }
    Ok(())
}

/// Fail with [`Error::Invalid`] when `dataset` has errors, or warnings if
/// `fail_on_warning` is set.
pub fn assert_is_valid(dataset: &Dataset, fail_on_warning: bool) -> Result<()> {
    let mut issues = Issues::new();
    validate(dataset, &mut issues);
    check_issues(&issues, fail_on_warning)
}

/// Like [`assert_is_valid`], for the dataset at `path`.
pub fn assert_is_valid_path(path: impl AsRef<Path>, fail_on_warning: bool) -> Result<()> {
    let mut issues = Issues::new();
    validate_path(path, &mut issues);
    check_issues(&issues, fail_on_warning)
}

/// Record a failed read as an error at `location`.
fn checked<T>(issues: &mut Issues, location: &str, result: Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(error) => {
            issues.add_error(location, error.to_string());
            None
        }
    }
}

fn not_supported(issues: &mut Issues, location: &str, what: &str) {
    issues.add_warning(location, format!("{what} is not supported yet"));
}

fn assert_unique(issues: &mut Issues, location: &str, ids: &[Id]) -> bool {
    let mut sorted = ids.to_vec();
    sorted.sort_unstable();
    match sorted.windows(2).find(|pair| pair[0] == pair[1]) {
        Some(pair) => {
            issues.add_error(
                location,
                format!(
                    "Object IDs must be unique, but at least one duplicate was found ({})",
                    pair[0]
                ),
            );
            false
        }
        None => true,
    }
}

fn assert_increasing(issues: &mut Issues, location: &str, values: &[u64]) {
    if let Some(pair) = values.windows(2).find(|pair| pair[0] > pair[1]) {
        issues.add_error(
            location,
            format!(
                "Values must be (nonstrictly) increasing, but at least two adjacent \
                 values were not ({} > {})",
                pair[0], pair[1]
            ),
        );
    }
}

/// IDs of the objects a property set describes.
struct ObjectIds<'a> {
    location: String,
    ids: &'a [Id],
}

impl ObjectIds<'_> {
    fn nr_ids(&self) -> Count {
        self.ids.len() as Count
    }
}

/// Contents of a valid object tracker.
struct ActiveSets {
    /// Begin offsets plus end sentinel
    bounds: Vec<Index>,
    ids: Vec<Id>,
    indices: Vec<Index>,
}

impl ActiveSets {
    fn nr_sets(&self) -> Count {
        (self.bounds.len() - 1) as Count
    }

    fn nr_active_ids(&self) -> Count {
        self.ids.len() as Count
    }

    fn set_sizes(&self) -> impl Iterator<Item = Count> + '_ {
        self.bounds.windows(2).map(|pair| pair[1] - pair[0])
    }

    fn set_ids(&self) -> impl Iterator<Item = &[Id]> + '_ {
        self.bounds
            .windows(2)
            .map(|pair| &self.ids[pair[0] as usize..pair[1] as usize])
    }
}

fn validate_phenomenon(phenomenon: &Phenomenon, issues: &mut Issues) {
    let location = phenomenon.object_id().pathname();
    let Some(ids) = checked(issues, &location, phenomenon.object_id().read_all()) else {
        return;
    };
    let object_ids = ObjectIds {
        location,
        ids: &ids,
    };
    for (_, property_set) in phenomenon.property_sets().iter() {
        validate_property_set(&object_ids, property_set, issues);
    }

    // Collection property sets describe a single object: the collection.
    // Its ID is the one tracked, if any.
    for (_, property_set) in phenomenon.collection_property_sets().iter() {
        let id = property_set
            .object_tracker()
            .active_object_id()
            .read_at(0)
            .unwrap_or(COLLECTION_ID);
        let collection_ids = [id];
        let object_ids = ObjectIds {
            location: property_set.pathname(),
            ids: &collection_ids,
        };
        validate_property_set(&object_ids, property_set, issues);
        validate_collection_active_sets(property_set, issues);
    }
}

/// Temporal collection properties hold one object per active set.
fn validate_collection_active_sets(property_set: &PropertySet, issues: &mut Issues) {
    let is_temporal = |property: &Property| match property.value() {
        Value::SameShape(_) => {
            property.configuration().value_variability == ValueVariability::Variable
        }
        Value::SameShapeVariableShape(_) | Value::DifferentShapeConstantShape(_) => true,
        _ => false,
    };
    if !property_set.properties().iter().any(|(_, p)| is_temporal(p)) {
        return;
    }

    let location = property_set.pathname();
    let tracker = property_set.object_tracker();
    let Some(nr_active_sets) = checked(issues, &location, tracker.nr_active_sets()) else {
        return;
    };
    let Some(nr_active_ids) = checked(issues, &location, tracker.active_object_id().nr_ids())
    else {
        return;
    };
    if nr_active_sets != nr_active_ids {
        issues.add_error(
            location,
            format!(
                "Size of each active set in object tracker of collection properties \
                 does not equal the number of active object IDs ({} != {})",
                nr_active_sets, nr_active_ids
            ),
        );
    }
}

fn validate_property_set(ids: &ObjectIds<'_>, property_set: &PropertySet, issues: &mut Issues) {
    let Some(active) = validate_object_tracker(ids, property_set.object_tracker(), issues) else {
        return;
    };

    if let Some(time_domain) = property_set.time_domain() {
        validate_time_domain(&active, time_domain, issues);
    }
    if let Some(space_domain) = property_set.space_domain() {
        validate_space_domain(ids, &active, space_domain, property_set, issues);
    }
    for (_, property) in property_set.properties().iter() {
        validate_property(ids, &active, property, issues);
    }
}

/// Check the tracker, returning its contents when no errors were found.
fn validate_object_tracker(
    ids: &ObjectIds<'_>,
    tracker: &ObjectTracker,
    issues: &mut Issues,
) -> Option<ActiveSets> {
    let nr_errors = issues.errors().len();
    assert_unique(issues, &ids.location, ids.ids);

    let set_index_location = tracker.active_set_index().pathname();
    let active_id_location = tracker.active_object_id().pathname();
    let active_index_location = tracker.active_object_index().pathname();
    let begins = checked(issues, &set_index_location, tracker.active_set_index().read_all())?;
    let active_ids = checked(issues, &active_id_location, tracker.active_object_id().read_all())?;
    let active_indices = checked(
        issues,
        &active_index_location,
        tracker.active_object_index().read_all(),
    )?;

    if begins.is_empty() {
        if !active_ids.is_empty() {
            issues.add_error(
                &set_index_location,
                format!(
                    "{} IDs of active objects are stored, but indices of active sets are missing",
                    active_ids.len()
                ),
            );
        }
        if !active_indices.is_empty() {
            issues.add_error(
                &set_index_location,
                format!(
                    "{} indices of active objects are stored, but indices of active sets \
                     are missing",
                    active_indices.len()
                ),
            );
        }
    } else {
        validate_active_set_ranges(
            issues,
            &set_index_location,
            &begins,
            &active_id_location,
            "IDs",
            active_ids.len(),
            Some(active_ids.as_slice()),
        );
        // Active object indices are optional
        if !active_indices.is_empty() {
            validate_active_set_ranges(
                issues,
                &set_index_location,
                &begins,
                &active_index_location,
                "indices",
                active_indices.len(),
                None,
            );
        }
    }

    // Without static IDs, any active ID is allowed
    if !ids.ids.is_empty() {
        let known: BTreeSet<Id> = ids.ids.iter().copied().collect();
        if let Some(id) = active_ids.iter().find(|id| !known.contains(id)) {
            issues.add_error(
                &active_id_location,
                format!(
                    "All active object IDs must also be part of the collection of static \
                     object IDs (at least {} is not)",
                    id
                ),
            );
        }
    }

    if issues.errors().len() != nr_errors {
        return None;
    }
    let mut bounds = begins;
    bounds.push(active_ids.len() as Index);
    Some(ActiveSets {
        bounds,
        ids: active_ids,
        indices: active_indices,
    })
}

/// Check that the begin offsets partition a collection of `size` elements.
/// When `ids` are passed, they must be unique per active set.
fn validate_active_set_ranges(
    issues: &mut Issues,
    set_index_location: &str,
    begins: &[Index],
    location: &str,
    what: &str,
    size: usize,
    ids: Option<&[Id]>,
) {
    let mut bounds = begins.to_vec();
    bounds.push(size as Index);
    for pair in bounds.windows(2) {
        let (begin, end) = (pair[0], pair[1]);
        if end < begin {
            issues.add_error(
                set_index_location,
                format!(
                    "Start indices of active sets must be monotonic increasing, but next \
                     index {} < current index {}",
                    end, begin
                ),
            );
            break;
        }
        if end > size as Index {
            issues.add_error(
                location,
                format!(
                    "Part of the collection of active object {} is missing (end index {} > \
                     collection size {})",
                    what, end, size
                ),
            );
            break;
        }
        if let Some(ids) = ids {
            if !assert_unique(issues, location, &ids[begin as usize..end as usize]) {
                break;
            }
        }
    }
}

fn validate_time_domain(active: &ActiveSets, time_domain: &TimeDomain, issues: &mut Issues) {
    let value = time_domain.value();
    let location = value.coordinates().array().pathname();
    let Some(coordinates) = checked(issues, &location, value.coordinates().read_all::<u64>())
    else {
        return;
    };
    assert_increasing(issues, &location, &coordinates);
    let Some(nr_items) = checked(issues, &location, value.nr_items()) else {
        return;
    };

    let nr_active_sets = active.nr_sets();
    match value {
        TimeDomainValue::Cell { counts, .. } => {
            let counts_location = counts.array().pathname();
            let Some(counts) = checked(issues, &counts_location, counts.read_all::<u64>()) else {
                return;
            };
            if counts.len() as Count != nr_items {
                issues.add_error(
                    counts_location,
                    format!(
                        "For each box a count must be written, but the number of counts \
                         does not equal the number of boxes ({} != {})",
                        counts.len(),
                        nr_items
                    ),
                );
            } else {
                let nr_cells: Count = counts.iter().sum();
                if nr_cells != nr_active_sets {
                    issues.add_error(
                        location,
                        format!(
                            "Number of cells in time domain does not equal the number of \
                             active set indices in object tracker ({} != {})",
                            nr_cells, nr_active_sets
                        ),
                    );
                }
            }
        }
        TimeDomainValue::Point(_) | TimeDomainValue::Box(_) => {
            if nr_items != nr_active_sets {
                let items = match value.item_type() {
                    TimeDomainItemType::Point => "points",
                    _ => "boxes",
                };
                issues.add_error(
                    location,
                    format!(
                        "Number of {} in time domain does not equal the number of active \
                         set indices in object tracker ({} != {})",
                        items, nr_items, nr_active_sets
                    ),
                );
            }
        }
    }
}

fn validate_space_domain(
    ids: &ObjectIds<'_>,
    active: &ActiveSets,
    space_domain: &SpaceDomain,
    property_set: &PropertySet,
    issues: &mut Issues,
) {
    let value = space_domain.value();
    let location = value.coordinates().array().pathname();
    if let Some(nr_items) = checked(issues, &location, value.nr_items()) {
        if value.is_mobile() {
            if nr_items != active.nr_active_ids() {
                issues.add_error(
                    &location,
                    format!(
                        "Number of object arrays in value array does not equal the number of \
                         active object IDs in object tracker ({} != {})",
                        nr_items,
                        active.nr_active_ids()
                    ),
                );
            }
        } else if nr_items != ids.nr_ids() {
            issues.add_error(
                &location,
                format!(
                    "Number of object arrays in value array does not equal the number of \
                     IDs ({} != {})",
                    nr_items,
                    ids.nr_ids()
                ),
            );
        }
    }

    if space_domain.presence_is_discretized() {
        validate_discretized_presence(space_domain, property_set, issues);
    }
}

/// Property set group containing `property`.
fn property_set_group(property: &Property) -> Option<crate::container::Group> {
    property.group().parent()?.parent()
}

fn is_collection_property(property: &Property) -> bool {
    property_set_group(property)
        .and_then(|group| group.parent())
        .is_some_and(|group| group.name() == COLLECTION_PROPERTY_SETS_TAG)
}

fn validate_discretized_presence(
    space_domain: &SpaceDomain,
    property_set: &PropertySet,
    issues: &mut Issues,
) {
    let location = space_domain.pathname();
    let configuration = space_domain.configuration();
    if configuration.item_type != SpaceDomainItemType::Box {
        issues.add_error(
            location,
            format!(
                "Discretization of presence in space is only supported for space domain \
                 item type {}, but it is {}",
                SpaceDomainItemType::Box,
                configuration.item_type
            ),
        );
        return;
    }
    let Some(presence) = checked(issues, &location, space_domain.discretized_presence_property())
    else {
        return;
    };

    match (configuration.mobility, presence.configuration().value_variability) {
        (Mobility::Mobile, _) => not_supported(
            issues,
            &location,
            "validation of discretization of presence of mobile space domain items",
        ),
        (Mobility::Stationary, ValueVariability::Constant) => not_supported(
            issues,
            &location,
            "validation of discretization of presence of stationary space domain items \
             with constant presence",
        ),
        (Mobility::Stationary, ValueVariability::Variable) => {
            let presence_time_domain = property_set_group(&presence)
                .and_then(|group| Domain::open(&group).ok())
                .and_then(|domain| domain.time_domain().map(TimeDomain::pathname));
            if let (Some(own), Some(theirs)) = (property_set.time_domain(), presence_time_domain) {
                if own.pathname() != theirs {
                    issues.add_error(
                        presence.pathname(),
                        format!(
                            "Time domain of presence property must equal the time domain of \
                             the property-set containing the space domain ({} != {})",
                            theirs,
                            own.pathname()
                        ),
                    );
                }
            }
        }
    }
}

fn validate_property(
    ids: &ObjectIds<'_>,
    active: &ActiveSets,
    property: &Property,
    issues: &mut Issues,
) {
    let location = property.pathname();
    match property.value() {
        Value::SameShape(value) => match property.configuration().value_variability {
            ValueVariability::Constant => validate_same_shape(ids, &location, value, issues),
            ValueVariability::Variable => {
                validate_same_shape_constant_shape(active, &location, value, issues)
            }
        },
        Value::SameShapeVariableShape(value) => {
            validate_same_shape_variable_shape(active, &location, value, issues)
        }
        Value::DifferentShape(value) => validate_different_shape(ids, &location, value, issues),
        Value::DifferentShapeConstantShape(value) => {
            validate_different_shape_constant_shape(active, &location, value, issues)
        }
        Value::DifferentShapeVariableShape(value) => {
            validate_different_shape_variable_shape(active, &location, value, issues)
        }
    }

    if property.time_is_discretized() {
        match property.time_discretization_property() {
            Ok(discretization) => validate_time_discretization(property, &discretization, issues),
            Err(error) => issues.add_error(
                &location,
                format!("Time discretization property cannot be opened: {error}"),
            ),
        }
    }
    if property.space_is_discretized() {
        match property.space_discretization_property() {
            Ok(discretization) => {
                validate_space_discretization(property, &discretization, issues)
            }
            Err(error) => issues.add_error(
                &location,
                format!("Space discretization property cannot be opened: {error}"),
            ),
        }
    }
}

fn validate_same_shape(
    ids: &ObjectIds<'_>,
    location: &str,
    value: &same_shape::Value,
    issues: &mut Issues,
) {
    let Some(nr_arrays) = checked(issues, location, value.nr_arrays()) else {
        return;
    };
    if nr_arrays != ids.nr_ids() {
        issues.add_error(
            location,
            format!(
                "Number of object arrays in value array does not equal the number of IDs \
                 ({} != {})",
                nr_arrays,
                ids.nr_ids()
            ),
        );
    }
}

fn validate_same_shape_constant_shape(
    active: &ActiveSets,
    location: &str,
    value: &same_shape::Value,
    issues: &mut Issues,
) {
    let Some(nr_arrays) = checked(issues, location, value.nr_arrays()) else {
        return;
    };
    if nr_arrays != active.nr_active_ids() {
        issues.add_error(
            location,
            format!(
                "Number of object arrays in value array does not equal the number of active \
                 object IDs in object tracker ({} != {})",
                nr_arrays,
                active.nr_active_ids()
            ),
        );
    } else if let Some(index) = active.indices.iter().find(|&&index| index >= nr_arrays) {
        issues.add_error(
            location,
            format!(
                "Active object indices must refer to stored object arrays, but at least \
                 index {} does not ({} arrays)",
                index, nr_arrays
            ),
        );
    }
}

fn validate_same_shape_variable_shape(
    active: &ActiveSets,
    location: &str,
    value: &same_shape::variable_shape::Value,
    issues: &mut Issues,
) {
    let Some(nr_locations) = checked(issues, location, value.nr_locations_in_time()) else {
        return;
    };
    if nr_locations != active.nr_sets() {
        issues.add_error(
            location,
            format!(
                "Number of value arrays in value does not equal the number of active sets \
                 in object tracker ({} != {})",
                nr_locations,
                active.nr_sets()
            ),
        );
        return;
    }
    for (set_index, set_size) in active.set_sizes().enumerate() {
        let result = value
            .get(set_index as Index)
            .and_then(|location_value| location_value.nr_arrays());
        let Some(nr_arrays) = checked(issues, location, result) else {
            return;
        };
        if nr_arrays != set_size {
            issues.add_error(
                location,
                format!(
                    "Number of object arrays stored does not equal the size of the active \
                     set ({} != {})",
                    nr_arrays, set_size
                ),
            );
            return;
        }
    }
}

fn validate_different_shape(
    ids: &ObjectIds<'_>,
    location: &str,
    value: &different_shape::Value,
    issues: &mut Issues,
) {
    let Some(nr_objects) = checked(issues, location, value.nr_objects()) else {
        return;
    };
    if nr_objects != ids.nr_ids() {
        issues.add_error(
            location,
            format!(
                "Number of object arrays in value does not equal the number of IDs ({} != {})",
                nr_objects,
                ids.nr_ids()
            ),
        );
        return;
    }
    for id in ids.ids.iter().filter(|&&id| !value.contains(id)) {
        issues.add_error(
            location,
            format!("For at least one object, no value is stored (id={})", id),
        );
    }
}

fn validate_different_shape_constant_shape(
    active: &ActiveSets,
    location: &str,
    value: &different_shape::constant_shape::Value,
    issues: &mut Issues,
) {
    let Some(nr_objects) = checked(issues, location, value.nr_objects()) else {
        return;
    };
    // May be empty
    let unique_ids: BTreeSet<Id> = active.ids.iter().copied().collect();
    if nr_objects != unique_ids.len() as Count {
        issues.add_error(
            location,
            format!(
                "Number of value arrays must be equal to the number of objects that have \
                 been active ({} != {})",
                nr_objects,
                unique_ids.len()
            ),
        );
        return;
    }
    if let Some(id) = unique_ids.iter().find(|&&id| !value.contains(id)) {
        issues.add_error(
            location,
            format!(
                "Each active object must have a corresponding value array, but at least \
                 value array for object with ID {} is missing",
                id
            ),
        );
        return;
    }

    for (&id, &index) in active.ids.iter().zip(&active.indices) {
        let result = value.get(id).and_then(|object_value| object_value.nr_arrays());
        let Some(nr_arrays) = checked(issues, location, result) else {
            return;
        };
        if index >= nr_arrays {
            issues.add_error(
                location,
                format!(
                    "Number of object arrays stored in each value array must equal the \
                     number of times the object is active (at least value array of object \
                     with ID {} does not have enough object arrays)",
                    id
                ),
            );
            return;
        }
    }
}

fn validate_different_shape_variable_shape(
    active: &ActiveSets,
    location: &str,
    value: &different_shape::variable_shape::Value,
    issues: &mut Issues,
) {
    let Some(nr_locations) = checked(issues, location, value.nr_locations_in_time()) else {
        return;
    };
    if nr_locations != active.nr_sets() {
        issues.add_error(
            location,
            format!(
                "Number of value arrays in value does not equal the number of active sets \
                 in object tracker ({} != {})",
                nr_locations,
                active.nr_sets()
            ),
        );
        return;
    }
    for (set_index, set_ids) in active.set_ids().enumerate() {
        let Some(location_value) = checked(issues, location, value.get(set_index as Index))
        else {
            return;
        };
        if let Some(id) = set_ids.iter().find(|&&id| !location_value.contains(id)) {
            issues.add_error(
                location,
                format!(
                    "For each active object an array must be stored, but at location {} \
                     object {} has none",
                    set_index, id
                ),
            );
            return;
        }
    }
}

fn check_unsigned_integral(issues: &mut Issues, discretization: &Property) {
    let datatype = discretization.value().memory_datatype();
    if !datatype.element_type.is_unsigned_integral() {
        issues.add_error(
            discretization.pathname(),
            format!(
                "Discretization property must contain unsigned integral values ({} is not \
                 unsigned integral)",
                datatype.element_type
            ),
        );
    }
}

fn validate_time_discretization(
    property: &Property,
    discretization: &Property,
    issues: &mut Issues,
) {
    let Value::SameShapeVariableShape(value) = property.value() else {
        not_supported(
            issues,
            &property.pathname(),
            "validation of discretization through time",
        );
        return;
    };

    let configuration = discretization.configuration();
    let mut testable = true;
    if configuration.value_variability != ValueVariability::Variable {
        issues.add_error(
            discretization.pathname(),
            "Property values for discretization of variable property values must be \
             variable themselves",
        );
        testable = false;
    }
    if configuration.shape_per_object != ShapePerObject::Same {
        issues.add_error(
            property.pathname(),
            "Property values of regular grid must be the same for each object",
        );
        testable = false;
    }
    if configuration.shape_variability != Some(ShapeVariability::Constant) {
        issues.add_error(
            property.pathname(),
            "Shape of property values of regular grid must be constant through time",
        );
        testable = false;
    }
    if !testable {
        return;
    }

    let Value::SameShape(counts) = discretization.value() else {
        return;
    };
    let location = discretization.pathname();
    let (Some(nr_counts), Some(nr_locations)) = (
        checked(issues, &location, counts.nr_arrays()),
        checked(issues, &property.pathname(), value.nr_locations_in_time()),
    ) else {
        return;
    };
    if nr_counts != nr_locations {
        issues.add_error(
            &location,
            format!(
                "Number of counts in discretization property must equal the number of \
                 locations in time for which values are discretized ({} != {})",
                nr_counts, nr_locations
            ),
        );
    }
    check_unsigned_integral(issues, discretization);
    if counts.array_shape().rank() != 1 {
        issues.add_error(
            &location,
            format!(
                "The rank of the discretization property values must be 1, but it \
                 currently is {}",
                counts.array_shape().rank()
            ),
        );
    }
}

fn validate_space_discretization(
    property: &Property,
    discretization: &Property,
    issues: &mut Issues,
) {
    let location = property.pathname();
    let variable_same_shape = property.configuration().value_variability
        == ValueVariability::Variable
        && matches!(property.value(), Value::SameShape(_));
    let nr_discretized = match property.value() {
        Value::DifferentShape(value) => value.nr_objects(),
        Value::DifferentShapeConstantShape(value) => value.nr_objects(),
        // A single grid applies to all object arrays, which share one shape
        Value::SameShape(_) if variable_same_shape => Ok(1),
        _ => {
            not_supported(issues, &location, "validation of discretization through space");
            return;
        }
    };
    let Some(nr_discretized) = checked(issues, &location, nr_discretized) else {
        return;
    };

    if discretization.configuration().value_variability != ValueVariability::Constant {
        if variable_same_shape {
            not_supported(
                issues,
                &discretization.pathname(),
                "validation of variable discretization through space",
            );
        } else {
            issues.add_error(
                discretization.pathname(),
                "Property values for discretization of constant property values must be \
                 constant themselves",
            );
        }
        return;
    }

    if discretization.configuration().shape_per_object != ShapePerObject::Same {
        issues.add_error(
            &location,
            "Shape of object arrays of regular grid must be the same for each object",
        );
        return;
    }
    let Value::SameShape(grid) = discretization.value() else {
        return;
    };
    let expected = if is_collection_property(discretization) {
        1
    } else {
        nr_discretized
    };
    if let Some(nr_arrays) = checked(issues, &discretization.pathname(), grid.nr_arrays()) {
        if nr_arrays != expected {
            issues.add_error(
                discretization.pathname(),
                format!(
                    "Number of object arrays in discretization property must equal the \
                     number of object arrays discretized ({} != {})",
                    nr_arrays, expected
                ),
            );
        }
    }
    check_unsigned_integral(issues, discretization);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Clock, TimeConfiguration, TimeUnit};
    use crate::object::DomainDefinition;
    use crate::util::{Datatype, Shape};

    fn dataset() -> Dataset {
        Dataset::create_in_memory("validate-tests", None).unwrap()
    }

    #[test]
    fn test_message_groups_errors_first() {
        let mut issues = Issues::new();
        issues.add_warning("/b", "w1");
        issues.add_error("/a", "e1");
        issues.add_error("/b", "e2");
        issues.add_warning("/c", "w2");
        issues.add_error("/a", "e3");

        assert_eq!(
            message(&issues),
            "/a:\n\
             - [1/5] error: e1\n\
             - [2/5] error: e3\n\
             /b:\n\
             - [3/5] error: e2\n\
             - [4/5] warning: w1\n\
             /c:\n\
             - [5/5] warning: w2\n"
        );
    }

    #[test]
    fn test_empty_dataset_is_valid() {
        let dataset = dataset();
        let mut issues = Issues::new();
        validate(&dataset, &mut issues);
        assert!(issues.is_empty());
        assert!(assert_is_valid(&dataset, true).is_ok());
    }

    #[test]
    fn test_duplicate_ids() {
        let mut dataset = dataset();
        let planets = dataset.add_phenomenon("planets", None).unwrap();
        planets.object_id().append(&[1, 2, 1]).unwrap();
        planets
            .property_sets_mut()
            .add("constants", &DomainDefinition::omnipresent())
            .unwrap();

        let mut issues = Issues::new();
        validate(&dataset, &mut issues);
        assert_eq!(issues.errors().len(), 1);
        assert_eq!(issues.errors()[0].location(), "/planets/lue_object_id");
        assert!(issues.errors()[0].message().contains("(1)"));
    }

    #[test]
    fn test_unknown_active_id() {
        let mut dataset = dataset();
        let planets = dataset.add_phenomenon("planets", None).unwrap();
        planets.object_id().append(&[1, 2]).unwrap();
        let set = planets
            .property_sets_mut()
            .add("orbits", &DomainDefinition::omnipresent())
            .unwrap();
        set.object_tracker().add_active_set(&[1, 3], &[0, 1]).unwrap();

        let mut issues = Issues::new();
        validate(&dataset, &mut issues);
        assert_eq!(issues.errors().len(), 1);
        assert!(issues.errors()[0].message().contains("at least 3 is not"));
    }

    #[test]
    fn test_broken_active_set_index() {
        let mut dataset = dataset();
        let planets = dataset.add_phenomenon("planets", None).unwrap();
        let set = planets
            .property_sets_mut()
            .add("orbits", &DomainDefinition::omnipresent())
            .unwrap();
        let tracker = set.object_tracker();
        tracker.active_object_id().append(&[1, 2]).unwrap();
        tracker.active_set_index().append(&[0, 3]).unwrap();

        let mut issues = Issues::new();
        validate(&dataset, &mut issues);
        assert!(issues.errors_found());
        assert!(issues.errors()[0].message().contains("is missing"));
    }

    #[test]
    fn test_time_points_per_active_set() {
        let mut dataset = dataset();
        let planets = dataset.add_phenomenon("planets", None).unwrap();
        planets.object_id().append(&[1]).unwrap();
        let definition = DomainDefinition::new().with_time(
            TimeConfiguration::new(TimeDomainItemType::Point),
            Clock::new(TimeUnit::Day, 1),
        );
        let set = planets.property_sets_mut().add("orbits", &definition).unwrap();
        set.object_tracker().add_active_set(&[1], &[0]).unwrap();
        set.object_tracker().add_active_set(&[1], &[1]).unwrap();
        let time_domain = set.time_domain().cloned().unwrap();
        time_domain.value().append(&[10, 5]).unwrap();

        let mut issues = Issues::new();
        validate(&dataset, &mut issues);
        assert_eq!(issues.errors().len(), 1);
        assert!(issues.errors()[0].message().contains("increasing"));

        time_domain.value().append(&[20]).unwrap();
        let mut issues = Issues::new();
        validate(&dataset, &mut issues);
        assert_eq!(issues.errors().len(), 2);
        assert!(issues.errors()[1].message().contains("(3 != 2)"));
    }

    #[test]
    fn test_different_shape_missing_object() {
        let mut dataset = dataset();
        let planets = dataset.add_phenomenon("planets", None).unwrap();
        planets.object_id().append(&[5, 7]).unwrap();
        let set = planets
            .property_sets_mut()
            .add("constants", &DomainDefinition::omnipresent())
            .unwrap();
        let property = set
            .properties_mut()
            .add_different_shape("shape", Datatype::native_of::<f32>(), 1, None)
            .unwrap();
        property
            .value()
            .as_different_shape()
            .unwrap()
            .reserve(&[5, 8], &[Shape::from([2]), Shape::from([3])])
            .unwrap();

        let mut issues = Issues::new();
        validate(&dataset, &mut issues);
        assert_eq!(issues.errors().len(), 1);
        assert_eq!(
            issues.errors()[0].location(),
            "/planets/lue_property_sets/constants/lue_properties/shape"
        );
        assert!(issues.errors()[0].message().contains("id=7"));
    }

    #[test]
    fn test_collection_property_set() {
        let mut dataset = dataset();
        let planets = dataset.add_phenomenon("planets", None).unwrap();
        let set = planets
            .collection_property_sets_mut()
            .add("totals", &DomainDefinition::omnipresent())
            .unwrap();
        let property = set
            .properties_mut()
            .add("mass", Datatype::native_of::<f64>(), Shape::scalar(), None)
            .unwrap();
        let value = property.value().as_same_shape().unwrap().clone();
        value.reserve(1).unwrap();
        assert!(assert_is_valid(&dataset, false).is_ok());

        value.reserve(2).unwrap();
        let error = assert_is_valid(&dataset, false).unwrap_err();
        assert!(matches!(error, Error::Invalid(_)));
        assert!(error.to_string().contains("(2 != 1)"));
    }

    #[test]
    fn test_validate_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.lue");
        let mut issues = Issues::new();
        validate_path(&path, &mut issues);
        assert_eq!(issues.errors().len(), 1);
        assert!(assert_is_valid_path(&path, false).is_err());
    }
}
