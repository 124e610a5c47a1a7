//! In-memory node tree of a container.

use std::collections::BTreeMap;

use super::attribute::Attributes;
use super::dataset::{CreationProperties, Dataspace};
use crate::util::Datatype;

/// A node in the container hierarchy.
#[derive(Clone, Debug)]
pub(crate) enum Node {
    Group(GroupNode),
    Dataset(DatasetNode),
    /// Absolute path of the link target
    SoftLink(String),
}

#[derive(Clone, Debug, Default)]
pub(crate) struct GroupNode {
    pub attributes: Attributes,
    pub children: BTreeMap<String, Node>,
}

#[derive(Clone, Debug)]
pub(crate) struct DatasetNode {
    pub datatype: Datatype,
    pub dataspace: Dataspace,
    pub properties: CreationProperties,
    pub attributes: Attributes,
    /// Row-major elements, in the byte order of `datatype`
    pub data: Vec<u8>,
}

impl Node {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Group(_) => "group",
            Self::Dataset(_) => "dataset",
            Self::SoftLink(_) => "soft link",
        }
    }

    pub fn as_group(&self) -> Option<&GroupNode> {
        match self {
            Self::Group(g) => Some(g),
            _ => None,
        }
    }

    pub fn as_group_mut(&mut self) -> Option<&mut GroupNode> {
        match self {
            Self::Group(g) => Some(g),
            _ => None,
        }
    }

    pub fn as_dataset(&self) -> Option<&DatasetNode> {
        match self {
            Self::Dataset(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_dataset_mut(&mut self) -> Option<&mut DatasetNode> {
        match self {
            Self::Dataset(d) => Some(d),
            _ => None,
        }
    }

    pub fn attributes(&self) -> Option<&Attributes> {
        match self {
            Self::Group(g) => Some(&g.attributes),
            Self::Dataset(d) => Some(&d.attributes),
            Self::SoftLink(_) => None,
        }
    }

    pub fn attributes_mut(&mut self) -> Option<&mut Attributes> {
        match self {
            Self::Group(g) => Some(&mut g.attributes),
            Self::Dataset(d) => Some(&mut d.attributes),
            Self::SoftLink(_) => None,
        }
    }
}

/// Find the node at `path`, without following soft links.
pub(crate) fn lookup<'a>(root: &'a Node, path: &[String]) -> Option<&'a Node> {
    let mut node = root;
    for name in path {
        node = node.as_group()?.children.get(name)?;
    }
    Some(node)
}

/// Find the node at `path` for modification, without following soft links.
pub(crate) fn lookup_mut<'a>(root: &'a mut Node, path: &[String]) -> Option<&'a mut Node> {
    let mut node = root;
    for name in path {
        node = node.as_group_mut()?.children.get_mut(name)?;
    }
    Some(node)
}

/// Split an absolute pathname into its components.
pub(crate) fn split_pathname(pathname: &str) -> Vec<String> {
    pathname
        .split('/')
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect()
}

/// Absolute pathname of a path.
pub(crate) fn join_pathname(path: &[String]) -> String {
    if path.is_empty() {
        "/".to_string()
    } else {
        let mut pathname = String::new();
        for name in path {
            pathname.push('/');
            pathname.push_str(name);
        }
        pathname
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pathnames() {
        assert_eq!(join_pathname(&[]), "/");
        let path = split_pathname("/planets/lue_object_id");
        assert_eq!(path, vec!["planets", "lue_object_id"]);
        assert_eq!(join_pathname(&path), "/planets/lue_object_id");
    }

    #[test]
    fn test_lookup() {
        let mut inner = GroupNode::default();
        inner
            .children
            .insert("link".into(), Node::SoftLink("/a".into()));
        let mut root = GroupNode::default();
        root.children.insert("a".into(), Node::Group(inner));
        let root = Node::Group(root);

        let path = split_pathname("/a/link");
        assert_eq!(lookup(&root, &path).map(Node::kind), Some("soft link"));
        assert!(lookup(&root, &split_pathname("/a/link/x")).is_none());
        assert!(lookup(&root, &[]).is_some());
    }
}
