//! Names of the nodes and attributes making up the persisted layout.

/// Prefix of all names reserved by the data model.
pub const RESERVED_PREFIX: &str = "lue_";

// Dataset root
pub const LUE_VERSION_TAG: &str = "lue_version";
pub const DESCRIPTION_TAG: &str = "lue_description";
pub const UNIVERSES_TAG: &str = "lue_universes";

// Phenomenon
pub const OBJECT_ID_TAG: &str = "lue_object_id";
pub const PROPERTY_SETS_TAG: &str = "lue_property_sets";
pub const COLLECTION_PROPERTY_SETS_TAG: &str = "lue_collection_property_sets";

// Property set
pub const OBJECT_TRACKER_TAG: &str = "lue_object_tracker";
pub const ACTIVE_SET_INDEX_TAG: &str = "lue_active_set_index";
pub const ACTIVE_OBJECT_ID_TAG: &str = "lue_active_object_id";
pub const ACTIVE_OBJECT_INDEX_TAG: &str = "lue_active_object_index";
pub const DOMAIN_TAG: &str = "lue_domain";
pub const TIME_DOMAIN_TAG: &str = "lue_time";
pub const SPACE_DOMAIN_TAG: &str = "lue_space";
pub const PROPERTIES_TAG: &str = "lue_properties";

// Domains and properties
pub const VALUE_TAG: &str = "lue_value";
pub const COUNT_TAG: &str = "lue_count";
pub const RANK_TAG: &str = "lue_rank";
pub const TIME_DISCRETIZATION_TAG: &str = "lue_time_discretization";
pub const SPACE_DISCRETIZATION_TAG: &str = "lue_space_discretization";
pub const DISCRETIZED_PRESENCE_TAG: &str = "lue_discretized_presence";

// Value groups
pub const DATATYPE_TAG: &str = "lue_datatype";
pub const BYTE_ORDER_TAG: &str = "lue_byte_order";
pub const NR_OBJECTS_TAG: &str = "lue_nr_objects";
pub const NR_LOCATIONS_IN_TIME_TAG: &str = "lue_nr_locations_in_time";

/// Whether `name` uses the reserved prefix.
pub fn is_reserved(name: &str) -> bool {
    name.starts_with(RESERVED_PREFIX)
}
