//! Universes: alternative states of a system, each with its own phenomena.

use tracing::debug;

use super::phenomenon::Phenomena;
use crate::container::Group;
use crate::core::{check_item_name, Collection, CollectionItem};
use crate::util::{Error, Result};

#[derive(Debug)]
pub struct Universe {
    phenomena: Phenomena,
}

/// Create universe `name` in `parent`.
pub fn create_universe(parent: &Group, name: &str) -> Result<Universe> {
    check_item_name(parent, name)?;
    if parent.contains(name) {
        return Err(Error::AlreadyExists(parent.child_pathname(name)));
    }
    let group = parent.create_group(name)?;
    debug!(path = %group.pathname(), "created universe");
    Ok(Universe {
        phenomena: Collection::empty(group),
    })
}

impl Universe {
    /// Open universe `name` and all its phenomena.
    pub fn open(parent: &Group, name: &str) -> Result<Self> {
        Ok(Self {
            phenomena: Collection::open(parent, name)?,
        })
    }

    pub fn group(&self) -> &Group {
        self.phenomena.group()
    }

    pub fn name(&self) -> &str {
        self.group().name()
    }

    pub fn phenomena(&self) -> &Phenomena {
        &self.phenomena
    }

    pub fn phenomena_mut(&mut self) -> &mut Phenomena {
        &mut self.phenomena
    }
}

impl CollectionItem for Universe {
    fn open(parent: &Group, name: &str) -> Result<Self> {
        Universe::open(parent, name)
    }
}

/// Universes of a dataset.
pub type Universes = Collection<Universe>;

impl Collection<Universe> {
    /// Create universe `name`, returning it.
    pub fn add(&mut self, name: &str) -> Result<&mut Universe> {
        let universe = create_universe(self.group(), name)?;
        Ok(self.insert(name, universe))
    }
}
