//! Named collections of data model nodes.
//!
//! A collection is a group whose child groups are all items of one kind,
//! e.g. the phenomena of a dataset or the property sets of a phenomenon.
//! All items are opened when the collection is opened.

use std::collections::BTreeMap;

use tracing::debug;

use super::tag::is_reserved;
use crate::container::Group;
use crate::util::{Error, Result};

/// Nodes that can be opened as members of a collection.
pub trait CollectionItem: Sized {
    fn open(parent: &Group, name: &str) -> Result<Self>;
}

/// Fail for names the data model reserves for itself.
pub fn check_item_name(parent: &Group, name: &str) -> Result<()> {
    if is_reserved(name) {
        return Err(Error::ReservedName(parent.child_pathname(name)));
    }
    Ok(())
}

/// Collection of items stored as child groups of one group.
#[derive(Debug)]
pub struct Collection<T> {
    group: Group,
    items: BTreeMap<String, T>,
}

impl<T: CollectionItem> Collection<T> {
    /// Create the collection group `name` under `parent`.
    pub fn create(parent: &Group, name: &str) -> Result<Self> {
        Ok(Self::empty(parent.create_group(name)?))
    }

    /// Open the collection group `name` under `parent` and all its items.
    pub fn open(parent: &Group, name: &str) -> Result<Self> {
        Self::open_group(parent.open_required_group(name)?)
    }

    /// Open all items in `group`, skipping children with reserved names.
    pub fn open_group(group: Group) -> Result<Self> {
        let mut items = BTreeMap::new();
        for name in group.group_names() {
            if is_reserved(&name) {
                continue;
            }
            let item = T::open(&group, &name)?;
            items.insert(name, item);
        }
        debug!(path = %group.pathname(), nr_items = items.len(), "opened collection");
        Ok(Self { group, items })
    }

    /// Collection in `group` without any items yet.
    pub fn empty(group: Group) -> Self {
        Self {
            group,
            items: BTreeMap::new(),
        }
    }
}

impl<T> Collection<T> {
    /// Group holding the items.
    pub fn group(&self) -> &Group {
        &self.group
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.items.contains_key(name)
    }

    /// Item names, sorted.
    pub fn names(&self) -> Vec<String> {
        self.items.keys().cloned().collect()
    }

    pub fn get(&self, name: &str) -> Result<&T> {
        self.items
            .get(name)
            .ok_or_else(|| Error::NotFound(self.group.child_pathname(name)))
    }

    pub fn get_mut(&mut self, name: &str) -> Result<&mut T> {
        let pathname = self.group.child_pathname(name);
        self.items.get_mut(name).ok_or(Error::NotFound(pathname))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.items.iter().map(|(n, item)| (n.as_str(), item))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut T)> {
        self.items.iter_mut().map(|(n, item)| (n.as_str(), item))
    }

    /// Register a newly created item, returning it.
    pub fn insert(&mut self, name: &str, item: T) -> &mut T {
        self.items.entry(name.to_string()).or_insert(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::File;

    #[derive(Debug)]
    struct Named(String);

    impl CollectionItem for Named {
        fn open(parent: &Group, name: &str) -> Result<Self> {
            Ok(Named(parent.open_group(name)?.pathname()))
        }
    }

    #[test]
    fn test_open_skips_reserved() {
        let root = File::create_in_memory("collection-tests").root();
        let group = root.create_group("things").unwrap();
        group.create_group("b").unwrap();
        group.create_group("a").unwrap();
        group.create_group("lue_internal").unwrap();

        let collection = Collection::<Named>::open(&root, "things").unwrap();
        assert_eq!(collection.names(), vec!["a", "b"]);
        assert_eq!(collection.get("a").unwrap().0, "/things/a");
        assert!(matches!(collection.get("c"), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_reserved_names() {
        let root = File::create_in_memory("collection-tests").root();
        assert!(check_item_name(&root, "planets").is_ok());
        assert!(matches!(
            check_item_name(&root, "lue_planets"),
            Err(Error::ReservedName(_))
        ));
    }

    #[test]
    fn test_missing_collection() {
        let root = File::create_in_memory("collection-tests").root();
        assert!(matches!(
            Collection::<Named>::open(&root, "things"),
            Err(Error::MissingRequiredNode(_))
        ));
    }
}
