//! Domains: where and when the objects of a property set are located.
//!
//! A property set without a time domain is omnipresent in time, one without
//! a space domain is omnipresent in space.

mod space_domain;
mod time_domain;

pub use space_domain::{create_space_domain, SpaceDomain, SpaceDomainValue};
pub use time_domain::{
    create_time_domain, has_linked_time_domain, link_time_domain, TimeDomain, TimeDomainValue,
};

use tracing::debug;

use crate::container::Group;
use crate::core::tag::{DOMAIN_TAG, SPACE_DOMAIN_TAG, TIME_DOMAIN_TAG};
use crate::util::Result;

/// Time and space domain of a property set.
#[derive(Clone, Debug)]
pub struct Domain {
    group: Group,
    time: Option<TimeDomain>,
    space: Option<SpaceDomain>,
}

/// Create an empty domain group in the property set group `parent`.
pub fn create_domain(parent: &Group) -> Result<Domain> {
    let group = parent.create_group(DOMAIN_TAG)?;
    debug!(path = %group.pathname(), "created domain");
    Ok(Domain {
        group,
        time: None,
        space: None,
    })
}

impl Domain {
    /// Open the domain in the property set group `parent`.
    pub fn open(parent: &Group) -> Result<Self> {
        let group = parent.open_required_group(DOMAIN_TAG)?;
        let time = if group.contains(TIME_DOMAIN_TAG) {
            Some(TimeDomain::open(&group)?)
        } else {
            None
        };
        let space = if group.contains(SPACE_DOMAIN_TAG) {
            Some(SpaceDomain::open(&group)?)
        } else {
            None
        };
        Ok(Self { group, time, space })
    }

    pub fn group(&self) -> &Group {
        &self.group
    }

    pub fn pathname(&self) -> String {
        self.group.pathname()
    }

    pub fn has_time_domain(&self) -> bool {
        self.time.is_some()
    }

    pub fn has_space_domain(&self) -> bool {
        self.space.is_some()
    }

    /// Whether the time domain is stored here rather than linked.
    pub fn owns_time_domain(&self) -> bool {
        self.time.is_some() && !has_linked_time_domain(&self.group)
    }

    pub fn time_domain(&self) -> Option<&TimeDomain> {
        self.time.as_ref()
    }

    pub fn time_domain_mut(&mut self) -> Option<&mut TimeDomain> {
        self.time.as_mut()
    }

    pub fn space_domain(&self) -> Option<&SpaceDomain> {
        self.space.as_ref()
    }

    pub fn space_domain_mut(&mut self) -> Option<&mut SpaceDomain> {
        self.space.as_mut()
    }

    pub(crate) fn set_time_domain(&mut self, time_domain: TimeDomain) {
        self.time = Some(time_domain);
    }

    pub(crate) fn set_space_domain(&mut self, space_domain: SpaceDomain) {
        self.space = Some(space_domain);
    }
}
