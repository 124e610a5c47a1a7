//! Datasets: the root of the data model hierarchy, one per container file.

use std::path::Path;

use tracing::{debug, info};

use super::phenomenon::{Phenomena, Phenomenon};
use super::universe::{Universe, Universes};
use crate::container::{File, OpenMode};
use crate::core::tag::{DESCRIPTION_TAG, LUE_VERSION_TAG, UNIVERSES_TAG};
use crate::core::Collection;
use crate::util::{Error, Result};

/// Version written to new datasets.
pub const LUE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// A LUE dataset.
#[derive(Debug)]
pub struct Dataset {
    file: File,
    universes: Universes,
    phenomena: Phenomena,
}

/// Whether `path` names an existing dataset file.
pub fn dataset_exists(path: impl AsRef<Path>) -> bool {
    File::exists(path)
}

/// Remove the dataset file at `path`.
pub fn remove_dataset(path: impl AsRef<Path>) -> Result<()> {
    File::remove(path)
}

impl Dataset {
    /// Create a dataset at `path`, truncating an existing file.
    pub fn create(path: impl AsRef<Path>, description: Option<&str>) -> Result<Self> {
        let file = File::create(path)?;
        let dataset = Self::initialize(file, description)?;
        info!(path = %dataset.file.name(), version = LUE_VERSION, "created dataset");
        Ok(dataset)
    }

    /// Create a dataset that lives in memory only.
    pub fn create_in_memory(name: &str, description: Option<&str>) -> Result<Self> {
        Self::initialize(File::create_in_memory(name), description)
    }

    fn initialize(file: File, description: Option<&str>) -> Result<Self> {
        let root = file.root();
        root.write_attribute(LUE_VERSION_TAG, LUE_VERSION.to_string())?;
        if let Some(description) = description {
            root.write_attribute(DESCRIPTION_TAG, description.to_string())?;
        }
        let universes = Collection::create(&root, UNIVERSES_TAG)?;
        Ok(Self {
            phenomena: Collection::empty(root),
            universes,
            file,
        })
    }

    /// Open the dataset at `path`.
    pub fn open(path: impl AsRef<Path>, mode: OpenMode) -> Result<Self> {
        let file = File::open(path, mode)?;
        let root = file.root();
        let version = root.read_attribute::<String>(LUE_VERSION_TAG)?;
        if version != LUE_VERSION {
            debug!(path = %file.name(), %version, current = LUE_VERSION, "dataset version differs");
        }
        let universes = Collection::open(&root, UNIVERSES_TAG)?;
        let phenomena = Collection::open_group(root)?;
        info!(path = %file.name(), ?mode, nr_phenomena = phenomena.len(), "opened dataset");
        Ok(Self {
            file,
            universes,
            phenomena,
        })
    }

    pub fn file(&self) -> &File {
        &self.file
    }

    pub fn pathname(&self) -> &str {
        self.file.name()
    }

    /// Version of the library that created the dataset.
    pub fn lue_version(&self) -> Result<String> {
        self.file.root().read_attribute(LUE_VERSION_TAG)
    }

    pub fn description(&self) -> Result<Option<String>> {
        self.file.root().read_optional_attribute(DESCRIPTION_TAG)
    }

    pub fn universes(&self) -> &Universes {
        &self.universes
    }

    pub fn universes_mut(&mut self) -> &mut Universes {
        &mut self.universes
    }

    pub fn phenomena(&self) -> &Phenomena {
        &self.phenomena
    }

    pub fn phenomena_mut(&mut self) -> &mut Phenomena {
        &mut self.phenomena
    }

    pub fn add_universe(&mut self, name: &str) -> Result<&mut Universe> {
        self.universes.add(name)
    }

    pub fn add_phenomenon(
        &mut self,
        name: &str,
        description: Option<&str>,
    ) -> Result<&mut Phenomenon> {
        self.phenomena.add(name, description)
    }

    /// Write pending changes to the file.
    pub fn flush(&self) -> Result<()> {
        if !self.file.is_writable() {
            return Err(Error::ReadOnly(self.file.name().to_string()));
        }
        self.file.flush()
    }
}
