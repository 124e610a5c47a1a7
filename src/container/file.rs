//! Container files.
//!
//! A [`File`] owns the node tree of one container. Handles are cheap to
//! clone and share the tree. The tree is read completely on open and
//! written back on [`File::flush`] and when the last handle of a writable
//! file is dropped.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, error};

use super::attribute::AttributeType;
use super::format::MAX_LINK_DEPTH;
use super::group::Group;
use super::node::{join_pathname, lookup, lookup_mut, split_pathname, GroupNode, Node};
use super::{reader, writer};
use crate::util::{Error, Result};

/// How to open an existing file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpenMode {
    ReadOnly,
    ReadWrite,
}

/// Handle to a container file.
#[derive(Clone)]
pub struct File {
    inner: Arc<FileInner>,
}

struct FileInner {
    name: String,
    /// Backing file, absent for in-memory containers
    path: Option<PathBuf>,
    mode: OpenMode,
    root: RwLock<Node>,
    dirty: AtomicBool,
}

impl File {
    /// Create a new container file, truncating an existing one.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let root = Node::Group(GroupNode::default());
        writer::write_file(path, &root)?;
        debug!(path = %path.display(), "created container");

        Ok(Self::from_parts(
            path.display().to_string(),
            Some(path.to_path_buf()),
            OpenMode::ReadWrite,
            root,
        ))
    }

    /// Create a container that lives in memory only.
    pub fn create_in_memory(name: impl Into<String>) -> Self {
        Self::from_parts(
            name.into(),
            None,
            OpenMode::ReadWrite,
            Node::Group(GroupNode::default()),
        )
    }

    /// Open an existing container file.
    pub fn open(path: impl AsRef<Path>, mode: OpenMode) -> Result<Self> {
        let path = path.as_ref();
        let root = reader::read_file(path)?;
        debug!(path = %path.display(), ?mode, "opened container");

        Ok(Self::from_parts(
            path.display().to_string(),
            Some(path.to_path_buf()),
            mode,
            root,
        ))
    }

    /// Whether `path` names an existing container file.
    pub fn exists(path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        path.is_file() && reader::is_container(path)
    }

    /// Remove a container file.
    pub fn remove(path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        std::fs::remove_file(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::FileNotFound(path.to_path_buf())
            } else {
                Error::Io(e)
            }
        })
    }

    fn from_parts(name: String, path: Option<PathBuf>, mode: OpenMode, root: Node) -> Self {
        Self {
            inner: Arc::new(FileInner {
                name,
                path,
                mode,
                root: RwLock::new(root),
                dirty: AtomicBool::new(false),
            }),
        }
    }

    /// Name of the file: its path, or the name of an in-memory container.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Path of the backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.inner.path.as_deref()
    }

    pub fn mode(&self) -> OpenMode {
        self.inner.mode
    }

    #[inline]
    pub fn is_writable(&self) -> bool {
        self.inner.mode == OpenMode::ReadWrite
    }

    #[inline]
    pub fn is_in_memory(&self) -> bool {
        self.inner.path.is_none()
    }

    /// The root group.
    pub fn root(&self) -> Group {
        Group::new(self.clone(), Vec::new())
    }

    /// Whether a node exists at the absolute `pathname`.
    pub fn contains(&self, pathname: &str) -> bool {
        let path = split_pathname(pathname);
        self.read(|root| lookup(root, &path).is_some())
    }

    /// Whether both handles share one node tree.
    pub fn is_same(&self, other: &File) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Write all pending changes to the backing file.
    pub fn flush(&self) -> Result<()> {
        if let Some(path) = &self.inner.path {
            if self.is_writable() && self.inner.dirty.swap(false, Ordering::AcqRel) {
                let root = self.inner.root.read();
                if let Err(e) = writer::write_file(path, &root) {
                    self.inner.dirty.store(true, Ordering::Release);
                    return Err(e);
                }
            }
        }
        Ok(())
    }

    /// Run `f` on the node tree.
    pub(crate) fn read<R>(&self, f: impl FnOnce(&Node) -> R) -> R {
        f(&self.inner.root.read())
    }

    /// Run `f` on the node tree for modification.
    pub(crate) fn write<R>(&self, f: impl FnOnce(&mut Node) -> Result<R>) -> Result<R> {
        if !self.is_writable() {
            return Err(Error::ReadOnly(self.inner.name.clone()));
        }
        let mut root = self.inner.root.write();
        let result = f(&mut root)?;
        self.inner.dirty.store(true, Ordering::Release);
        Ok(result)
    }

    /// Canonical path of `parent/name`, following soft links.
    pub(crate) fn resolve(&self, parent: &[String], name: &str) -> Result<Vec<String>> {
        let mut path = parent.to_vec();
        path.push(name.to_string());

        self.read(|root| {
            for _ in 0..MAX_LINK_DEPTH {
                match lookup(root, &path) {
                    None => return Err(Error::NotFound(join_pathname(&path))),
                    Some(Node::SoftLink(target)) => path = split_pathname(target),
                    Some(_) => return Ok(path),
                }
            }
            Err(Error::engine(join_pathname(&path), "too many levels of soft links"))
        })
    }

    pub(crate) fn read_attribute<T: AttributeType>(&self, path: &[String], name: &str) -> Result<T> {
        self.read(|root| {
            let pathname = join_pathname(path);
            let attributes = lookup(root, path)
                .and_then(Node::attributes)
                .ok_or_else(|| Error::NotFound(pathname.clone()))?;
            let value = attributes
                .get(name)
                .ok_or_else(|| Error::MissingRequiredNode(format!("{}@{}", pathname, name)))?;
            T::from_value(value).ok_or_else(|| Error::type_mismatch(T::TYPE_NAME, value.type_name()))
        })
    }

    pub(crate) fn write_attribute<T: AttributeType>(
        &self,
        path: &[String],
        name: &str,
        value: T,
    ) -> Result<()> {
        self.write(|root| {
            let attributes = lookup_mut(root, path)
                .and_then(Node::attributes_mut)
                .ok_or_else(|| Error::NotFound(join_pathname(path)))?;
            attributes.set(name, value.into_value());
            Ok(())
        })
    }

    pub(crate) fn has_attribute(&self, path: &[String], name: &str) -> bool {
        self.read(|root| {
            lookup(root, path)
                .and_then(Node::attributes)
                .is_some_and(|a| a.contains(name))
        })
    }

    pub(crate) fn attribute_names(&self, path: &[String]) -> Vec<String> {
        self.read(|root| {
            lookup(root, path)
                .and_then(Node::attributes)
                .map(|a| a.iter().map(|(n, _)| n.to_string()).collect())
                .unwrap_or_default()
        })
    }
}

impl fmt::Debug for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("File")
            .field("name", &self.inner.name)
            .field("mode", &self.inner.mode)
            .finish()
    }
}

impl Drop for FileInner {
    fn drop(&mut self) {
        if self.mode != OpenMode::ReadWrite || !*self.dirty.get_mut() {
            return;
        }
        if let Some(path) = &self.path {
            if let Err(e) = writer::write_file(path, self.root.get_mut()) {
                error!(path = %path.display(), error = %e, "failed to flush container");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_create_and_reopen() {
        let temp = NamedTempFile::new().expect("temp file");
        {
            let file = File::create(temp.path()).unwrap();
            let root = file.root();
            root.create_group("planets").unwrap();
            root.write_attribute("lue_description", "solar system".to_string())
                .unwrap();
        }
        assert!(File::exists(temp.path()));

        let file = File::open(temp.path(), OpenMode::ReadOnly).unwrap();
        let root = file.root();
        assert!(root.contains_group("planets"));
        assert_eq!(
            root.read_attribute::<String>("lue_description").unwrap(),
            "solar system"
        );
        assert!(matches!(root.create_group("moons"), Err(Error::ReadOnly(_))));
    }

    #[test]
    fn test_explicit_flush() {
        let temp = NamedTempFile::new().expect("temp file");
        let file = File::create(temp.path()).unwrap();
        file.root().create_group("a").unwrap();
        file.flush().unwrap();

        let other = File::open(temp.path(), OpenMode::ReadOnly).unwrap();
        assert!(other.root().contains_group("a"));
    }

    #[test]
    fn test_open_missing() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("missing.lue");
        assert!(!File::exists(&path));
        assert!(matches!(
            File::open(&path, OpenMode::ReadOnly),
            Err(Error::FileNotFound(_))
        ));
        assert!(matches!(File::remove(&path), Err(Error::FileNotFound(_))));
    }

    #[test]
    fn test_in_memory() {
        let file = File::create_in_memory("scratch");
        assert!(file.is_in_memory());
        file.root().create_group("a").unwrap();
        file.flush().unwrap();
        assert!(file.root().contains_group("a"));
    }
}
