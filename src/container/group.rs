//! Group handles.

use std::fmt;

use tracing::trace;

use super::attribute::AttributeType;
use super::dataset::{filled, CreationProperties, Dataset, Dataspace};
use super::file::File;
use super::node::{
    join_pathname, lookup, lookup_mut, split_pathname, DatasetNode, GroupNode, Node,
};
use crate::util::{Datatype, Error, Result};

/// Handle to a group in a container.
#[derive(Clone)]
pub struct Group {
    file: File,
    path: Vec<String>,
}

impl Group {
    pub(crate) fn new(file: File, path: Vec<String>) -> Self {
        Self { file, path }
    }

    /// File this group belongs to.
    pub fn file(&self) -> &File {
        &self.file
    }

    /// Name of the group, `/` for the root.
    pub fn name(&self) -> &str {
        self.path.last().map(String::as_str).unwrap_or("/")
    }

    /// Absolute path of the group within its file.
    pub fn pathname(&self) -> String {
        join_pathname(&self.path)
    }

    /// Absolute path of a child of this group.
    pub fn child_pathname(&self, name: &str) -> String {
        let mut path = self.path.clone();
        path.push(name.to_string());
        join_pathname(&path)
    }

    /// Parent group, `None` for the root.
    pub fn parent(&self) -> Option<Group> {
        let (_, parent) = self.path.split_last()?;
        Some(Group::new(self.file.clone(), parent.to_vec()))
    }

    /// Whether a child of any kind named `name` exists.
    pub fn contains(&self, name: &str) -> bool {
        self.file.read(|root| {
            lookup(root, &self.path)
                .and_then(Node::as_group)
                .is_some_and(|g| g.children.contains_key(name))
        })
    }

    /// Whether `name` is a group, possibly reached through a soft link.
    pub fn contains_group(&self, name: &str) -> bool {
        self.resolved_kind(name) == Some("group")
    }

    /// Whether `name` is a dataset, possibly reached through a soft link.
    pub fn contains_dataset(&self, name: &str) -> bool {
        self.resolved_kind(name) == Some("dataset")
    }

    fn resolved_kind(&self, name: &str) -> Option<&'static str> {
        let path = self.file.resolve(&self.path, name).ok()?;
        self.file.read(|root| lookup(root, &path).map(Node::kind))
    }

    /// Whether the child `name` is a soft link.
    pub fn is_soft_link(&self, name: &str) -> bool {
        self.child_kind(name) == Some("soft link")
    }

    fn child_kind(&self, name: &str) -> Option<&'static str> {
        let mut path = self.path.clone();
        path.push(name.to_string());
        self.file.read(|root| lookup(root, &path).map(Node::kind))
    }

    /// Target pathname of the soft link `name`.
    pub fn soft_link_target(&self, name: &str) -> Result<String> {
        let mut path = self.path.clone();
        path.push(name.to_string());
        self.file.read(|root| match lookup(root, &path) {
            Some(Node::SoftLink(target)) => Ok(target.clone()),
            Some(node) => Err(Error::type_mismatch("soft link", node.kind())),
            None => Err(Error::NotFound(join_pathname(&path))),
        })
    }

    /// Names of all children, sorted.
    pub fn child_names(&self) -> Vec<String> {
        self.file.read(|root| {
            lookup(root, &self.path)
                .and_then(Node::as_group)
                .map(|g| g.children.keys().cloned().collect())
                .unwrap_or_default()
        })
    }

    /// Names of all child groups, including soft links to groups.
    pub fn group_names(&self) -> Vec<String> {
        self.child_names()
            .into_iter()
            .filter(|name| self.contains_group(name))
            .collect()
    }

    /// Names of all child datasets, including soft links to datasets.
    pub fn dataset_names(&self) -> Vec<String> {
        self.child_names()
            .into_iter()
            .filter(|name| self.contains_dataset(name))
            .collect()
    }

    fn check_name(&self, name: &str) -> Result<()> {
        if name.is_empty() || name.contains('/') || name == "." || name == ".." {
            return Err(Error::engine(
                self.child_pathname(name),
                format!("invalid node name {:?}", name),
            ));
        }
        Ok(())
    }

    /// Insert a new child node, failing if the name is taken.
    fn insert_child(&self, name: &str, node: Node) -> Result<()> {
        self.check_name(name)?;
        let pathname = self.child_pathname(name);
        self.file.write(|root| {
            let group = lookup_mut(root, &self.path)
                .and_then(Node::as_group_mut)
                .ok_or_else(|| Error::NotFound(join_pathname(&self.path)))?;
            if group.children.contains_key(name) {
                return Err(Error::AlreadyExists(pathname));
            }
            trace!(path = %pathname, kind = node.kind(), "insert node");
            group.children.insert(name.to_string(), node);
            Ok(())
        })
    }

    /// Create a child group.
    pub fn create_group(&self, name: &str) -> Result<Group> {
        self.insert_child(name, Node::Group(GroupNode::default()))?;
        let mut path = self.path.clone();
        path.push(name.to_string());
        Ok(Group::new(self.file.clone(), path))
    }

    /// Open a child group, following soft links.
    pub fn open_group(&self, name: &str) -> Result<Group> {
        let path = self.file.resolve(&self.path, name)?;
        let kind = self.file.read(|root| lookup(root, &path).map(Node::kind));
        match kind {
            Some("group") => Ok(Group::new(self.file.clone(), path)),
            Some(other) => Err(Error::type_mismatch("group", other)),
            None => Err(Error::NotFound(join_pathname(&path))),
        }
    }

    /// Open a child group the data model cannot do without.
    pub fn open_required_group(&self, name: &str) -> Result<Group> {
        self.open_group(name).map_err(|e| match e {
            Error::NotFound(path) => Error::MissingRequiredNode(path),
            other => other,
        })
    }

    /// Create a child dataset, initialised with the fill value.
    pub fn create_dataset(
        &self,
        name: &str,
        datatype: Datatype,
        dataspace: Dataspace,
        properties: CreationProperties,
    ) -> Result<Dataset> {
        let pathname = self.child_pathname(name);
        dataspace.check(&pathname)?;
        properties.check(&pathname, &datatype, &dataspace)?;

        let data = filled(
            dataspace.shape().nr_elements() as usize,
            datatype.num_bytes(),
            properties.fill_value(),
        );
        self.insert_child(
            name,
            Node::Dataset(DatasetNode {
                datatype,
                dataspace,
                properties: properties.clone(),
                attributes: Default::default(),
                data,
            }),
        )?;

        let mut path = self.path.clone();
        path.push(name.to_string());
        Ok(Dataset::new(self.file.clone(), path, datatype, properties))
    }

    /// Open a child dataset, following soft links.
    pub fn open_dataset(&self, name: &str) -> Result<Dataset> {
        let path = self.file.resolve(&self.path, name)?;
        let found = self.file.read(|root| match lookup(root, &path) {
            Some(Node::Dataset(d)) => Ok((d.datatype, d.properties.clone())),
            Some(other) => Err(Error::type_mismatch("dataset", other.kind())),
            None => Err(Error::NotFound(join_pathname(&path))),
        })?;
        Ok(Dataset::new(self.file.clone(), path, found.0, found.1))
    }

    /// Create a soft link `name` pointing to the absolute path `target`.
    ///
    /// The target must exist. Hard links are not supported.
    pub fn create_soft_link(&self, name: &str, target: &str) -> Result<()> {
        let target_path = split_pathname(target);
        if !self.file.read(|root| lookup(root, &target_path).is_some()) {
            return Err(Error::NotFound(join_pathname(&target_path)));
        }
        self.insert_child(name, Node::SoftLink(join_pathname(&target_path)))
    }

    /// Read a typed attribute of this group.
    pub fn read_attribute<T: AttributeType>(&self, name: &str) -> Result<T> {
        self.file.read_attribute(&self.path, name)
    }

    /// Read an attribute that may be absent, `None` when it is.
    pub fn read_optional_attribute<T: AttributeType>(&self, name: &str) -> Result<Option<T>> {
        if !self.has_attribute(name) {
            return Ok(None);
        }
        self.read_attribute(name).map(Some)
    }

    /// Create or overwrite an attribute of this group.
    pub fn write_attribute<T: AttributeType>(&self, name: &str, value: T) -> Result<()> {
        self.file.write_attribute(&self.path, name, value)
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.file.has_attribute(&self.path, name)
    }

    pub fn attribute_names(&self) -> Vec<String> {
        self.file.attribute_names(&self.path)
    }
}

impl PartialEq for Group {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path && self.file.name() == other.file.name()
    }
}

impl fmt::Debug for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Group({}:{})", self.file.name(), self.pathname())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::{ElementType, Shape};

    fn root() -> Group {
        File::create_in_memory("group-tests").root()
    }

    #[test]
    fn test_create_open_group() {
        let root = root();
        let planets = root.create_group("planets").unwrap();
        assert_eq!(planets.name(), "planets");
        assert_eq!(planets.pathname(), "/planets");
        assert_eq!(planets.parent().unwrap().pathname(), "/");

        assert!(root.contains_group("planets"));
        assert!(!root.contains_dataset("planets"));
        assert!(matches!(
            root.create_group("planets"),
            Err(Error::AlreadyExists(_))
        ));
        assert!(matches!(root.open_group("moons"), Err(Error::NotFound(_))));
        assert!(matches!(
            root.open_required_group("moons"),
            Err(Error::MissingRequiredNode(_))
        ));
    }

    #[test]
    fn test_invalid_names() {
        let root = root();
        assert!(root.create_group("").is_err());
        assert!(root.create_group("a/b").is_err());
    }

    #[test]
    fn test_soft_links() {
        let root = root();
        let a = root.create_group("a").unwrap();
        a.create_group("inner").unwrap();
        root.create_soft_link("alias", "/a").unwrap();

        assert!(root.is_soft_link("alias"));
        assert!(root.contains_group("alias"));
        assert_eq!(root.soft_link_target("alias").unwrap(), "/a");

        // Opening through a link yields the canonical path
        let opened = root.open_group("alias").unwrap();
        assert_eq!(opened.pathname(), "/a");
        assert!(opened.contains_group("inner"));

        assert!(matches!(
            root.create_soft_link("dangling", "/nope"),
            Err(Error::NotFound(_))
        ));
        assert_eq!(root.group_names(), vec!["a", "alias"]);
    }

    #[test]
    fn test_datasets_are_listed() {
        let root = root();
        let datatype = Datatype::native(ElementType::Uint64);
        root.create_dataset(
            "ids",
            datatype,
            Dataspace::unlimited_rows(Shape::from([0])),
            CreationProperties::default(),
        )
        .unwrap();
        assert!(root.contains_dataset("ids"));
        assert_eq!(root.dataset_names(), vec!["ids"]);
        assert!(root.group_names().is_empty());
        assert!(matches!(root.open_group("ids"), Err(Error::TypeMismatch { .. })));
    }

    #[test]
    fn test_attributes() {
        let root = root();
        let g = root.create_group("g").unwrap();
        g.write_attribute("lue_nr_objects", 3u64).unwrap();
        g.write_attribute("lue_shape", vec![2u64, 3]).unwrap();
        assert!(g.has_attribute("lue_nr_objects"));
        assert_eq!(g.read_attribute::<u64>("lue_nr_objects").unwrap(), 3);
        assert_eq!(g.read_attribute::<Vec<u64>>("lue_shape").unwrap(), vec![2, 3]);
        assert!(matches!(
            g.read_attribute::<String>("lue_nr_objects"),
            Err(Error::TypeMismatch { .. })
        ));
        assert!(matches!(
            g.read_attribute::<u64>("missing"),
            Err(Error::MissingRequiredNode(_))
        ));
        assert_eq!(g.attribute_names(), vec!["lue_nr_objects", "lue_shape"]);
    }
}
