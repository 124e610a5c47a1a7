//! Phenomena: collections of objects and the property sets describing them.
//!
//! Property sets in `lue_collection_property_sets` describe the collection of
//! objects as a whole, instead of each object individually.

use tracing::debug;

use super::object_tracker::ObjectId;
use super::property_set::PropertySets;
use crate::container::Group;
use crate::core::tag::{
    COLLECTION_PROPERTY_SETS_TAG, DESCRIPTION_TAG, OBJECT_ID_TAG, PROPERTY_SETS_TAG,
};
use crate::core::{check_item_name, Collection, CollectionItem};
use crate::util::{Error, Result};

#[derive(Debug)]
pub struct Phenomenon {
    group: Group,
    object_id: ObjectId,
    property_sets: PropertySets,
    collection_property_sets: PropertySets,
}

/// Create phenomenon `name` in `parent`.
pub fn create_phenomenon(
    parent: &Group,
    name: &str,
    description: Option<&str>,
) -> Result<Phenomenon> {
    check_item_name(parent, name)?;
    if parent.contains(name) {
        return Err(Error::AlreadyExists(parent.child_pathname(name)));
    }

    let group = parent.create_group(name)?;
    if let Some(description) = description {
        group.write_attribute(DESCRIPTION_TAG, description.to_string())?;
    }
    let object_id = ObjectId::create(&group, OBJECT_ID_TAG)?;
    let property_sets = Collection::create(&group, PROPERTY_SETS_TAG)?;
    let collection_property_sets = Collection::create(&group, COLLECTION_PROPERTY_SETS_TAG)?;
    debug!(path = %group.pathname(), "created phenomenon");

    Ok(Phenomenon {
        group,
        object_id,
        property_sets,
        collection_property_sets,
    })
}

impl Phenomenon {
    pub fn open(parent: &Group, name: &str) -> Result<Self> {
        let group = parent.open_required_group(name)?;
        let object_id = ObjectId::open(&group, OBJECT_ID_TAG)?;
        let property_sets = Collection::open(&group, PROPERTY_SETS_TAG)?;
        let collection_property_sets = Collection::open(&group, COLLECTION_PROPERTY_SETS_TAG)?;
        debug!(path = %group.pathname(), "opened phenomenon");
        Ok(Self {
            group,
            object_id,
            property_sets,
            collection_property_sets,
        })
    }

    pub fn group(&self) -> &Group {
        &self.group
    }

    pub fn name(&self) -> &str {
        self.group.name()
    }

    pub fn pathname(&self) -> String {
        self.group.pathname()
    }

    pub fn description(&self) -> Result<Option<String>> {
        self.group.read_optional_attribute(DESCRIPTION_TAG)
    }

    /// IDs of all objects of this phenomenon.
    pub fn object_id(&self) -> &ObjectId {
        &self.object_id
    }

    pub fn object_id_mut(&mut self) -> &mut ObjectId {
        &mut self.object_id
    }

    pub fn property_sets(&self) -> &PropertySets {
        &self.property_sets
    }

    pub fn property_sets_mut(&mut self) -> &mut PropertySets {
        &mut self.property_sets
    }

    pub fn collection_property_sets(&self) -> &PropertySets {
        &self.collection_property_sets
    }

    pub fn collection_property_sets_mut(&mut self) -> &mut PropertySets {
        &mut self.collection_property_sets
    }
}

impl CollectionItem for Phenomenon {
    fn open(parent: &Group, name: &str) -> Result<Self> {
        Phenomenon::open(parent, name)
    }
}

/// Phenomena of a dataset or universe.
pub type Phenomena = Collection<Phenomenon>;

impl Collection<Phenomenon> {
    /// Create phenomenon `name`, returning it.
    pub fn add(&mut self, name: &str, description: Option<&str>) -> Result<&mut Phenomenon> {
        let phenomenon = create_phenomenon(self.group(), name, description)?;
        Ok(self.insert(name, phenomenon))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::File;
    use crate::object::DomainDefinition;

    #[test]
    fn test_create_open() {
        let root = File::create_in_memory("phenomenon-tests").root();
        let mut phenomena = Phenomena::empty(root.clone());
        let planets = phenomena.add("planets", Some("solar system")).unwrap();
        planets.object_id().append(&[3, 1, 2]).unwrap();
        planets
            .property_sets_mut()
            .add("constants", &DomainDefinition::omnipresent())
            .unwrap();
        planets
            .collection_property_sets_mut()
            .add("globals", &DomainDefinition::omnipresent())
            .unwrap();

        let reopened = Phenomenon::open(&root, "planets").unwrap();
        assert_eq!(reopened.description().unwrap().as_deref(), Some("solar system"));
        assert_eq!(reopened.object_id().read_all().unwrap(), vec![3, 1, 2]);
        assert_eq!(reopened.property_sets().names(), vec!["constants"]);
        assert_eq!(reopened.collection_property_sets().names(), vec!["globals"]);
    }

    #[test]
    fn test_description() {
        let root = File::create_in_memory("phenomenon-tests").root();
        let mut phenomena = Phenomena::empty(root);
        let planets = phenomena.add("planets", None).unwrap();
        assert_eq!(planets.description().unwrap(), None);

        // A description of the wrong type is an error, not a missing one
        planets.group().write_attribute(DESCRIPTION_TAG, 42u64).unwrap();
        assert!(matches!(planets.description(), Err(Error::TypeMismatch { .. })));
    }

    #[test]
    fn test_duplicate_and_reserved() {
        let root = File::create_in_memory("phenomenon-tests").root();
        let mut phenomena = Phenomena::empty(root);
        phenomena.add("planets", None).unwrap();
        assert!(matches!(phenomena.add("planets", None), Err(Error::AlreadyExists(_))));
        assert!(matches!(phenomena.add("lue_planets", None), Err(Error::ReservedName(_))));
        assert_eq!(phenomena.len(), 1);
    }
}
