//! Property sets: properties sharing one domain and one object tracker.

use tracing::debug;

use super::domain::{
    create_domain, create_space_domain, create_time_domain, link_time_domain, Domain,
    SpaceDomain, TimeDomain,
};
use super::object_tracker::{
    create_object_tracker, has_linked_object_tracker, link_object_tracker, ObjectTracker,
};
use super::property::{create_properties, Properties};
use crate::container::Group;
use crate::core::{
    check_item_name, Clock, Collection, CollectionItem, SpaceConfiguration, TimeConfiguration,
};
use crate::util::{Datatype, Error, Rank, Result};

#[derive(Clone, Debug)]
enum TimeDefinition<'a> {
    Own(TimeConfiguration, Clock),
    Shared(&'a TimeDomain),
}

/// How to set up the domain and object tracker of a new property set.
///
/// Without a time domain, objects are omnipresent in time. Without a space
/// domain, they are omnipresent in space.
#[derive(Clone, Debug, Default)]
pub struct DomainDefinition<'a> {
    time: Option<TimeDefinition<'a>>,
    space: Option<(SpaceConfiguration, Datatype, Rank)>,
    object_tracker: Option<&'a ObjectTracker>,
}

impl<'a> DomainDefinition<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Omnipresent in time and space.
    pub fn omnipresent() -> Self {
        Self::default()
    }

    /// Add a time domain of its own.
    pub fn with_time(mut self, configuration: TimeConfiguration, clock: Clock) -> Self {
        self.time = Some(TimeDefinition::Own(configuration, clock));
        self
    }

    /// Share the time domain of another property set.
    pub fn sharing_time_domain(mut self, time_domain: &'a TimeDomain) -> Self {
        self.time = Some(TimeDefinition::Shared(time_domain));
        self
    }

    /// Add a space domain with coordinates of `datatype` in `rank` dimensions.
    pub fn with_space(
        mut self,
        configuration: SpaceConfiguration,
        datatype: Datatype,
        rank: Rank,
    ) -> Self {
        self.space = Some((configuration, datatype, rank));
        self
    }

    /// Share the object tracker of another property set.
    pub fn sharing_object_tracker(mut self, object_tracker: &'a ObjectTracker) -> Self {
        self.object_tracker = Some(object_tracker);
        self
    }

    fn check_link_target(parent: &Group, target: &Group) -> Result<()> {
        let pathname = target.pathname();
        if !target.file().is_same(parent.file()) || !parent.file().contains(&pathname) {
            return Err(Error::NotFound(pathname));
        }
        Ok(())
    }

    /// Verify that shared nodes exist in the file of `parent`.
    fn check(&self, parent: &Group) -> Result<()> {
        if let Some(TimeDefinition::Shared(time_domain)) = &self.time {
            Self::check_link_target(parent, time_domain.group())?;
        }
        if let Some(object_tracker) = self.object_tracker {
            Self::check_link_target(parent, object_tracker.group())?;
        }
        Ok(())
    }
}

/// Properties plus the domain and object tracker they share.
#[derive(Debug)]
pub struct PropertySet {
    group: Group,
    object_tracker: ObjectTracker,
    domain: Domain,
    properties: Properties,
}

/// Create property set `name` in `parent`.
pub fn create_property_set(
    parent: &Group,
    name: &str,
    definition: &DomainDefinition<'_>,
) -> Result<PropertySet> {
    check_item_name(parent, name)?;
    if parent.contains(name) {
        return Err(Error::AlreadyExists(parent.child_pathname(name)));
    }
    definition.check(parent)?;

    let group = parent.create_group(name)?;
    let object_tracker = match definition.object_tracker {
        Some(shared) => link_object_tracker(&group, shared)?,
        None => create_object_tracker(&group)?,
    };

    let mut domain = create_domain(&group)?;
    match &definition.time {
        Some(TimeDefinition::Own(configuration, clock)) => {
            let time_domain = create_time_domain(domain.group(), *configuration, clock.clone())?;
            domain.set_time_domain(time_domain);
        }
        Some(TimeDefinition::Shared(shared)) => {
            let time_domain = link_time_domain(domain.group(), shared)?;
            domain.set_time_domain(time_domain);
        }
        None => {}
    }
    if let Some((configuration, datatype, rank)) = definition.space {
        let space_domain = create_space_domain(domain.group(), configuration, datatype, rank)?;
        domain.set_space_domain(space_domain);
    }

    let properties = create_properties(&group)?;
    debug!(
        path = %group.pathname(),
        time = domain.has_time_domain(),
        space = domain.has_space_domain(),
        "created property set"
    );

    Ok(PropertySet {
        group,
        object_tracker,
        domain,
        properties,
    })
}

impl PropertySet {
    pub fn open(parent: &Group, name: &str) -> Result<Self> {
        let group = parent.open_required_group(name)?;
        let object_tracker = ObjectTracker::open(&group)?;
        let domain = Domain::open(&group)?;
        let properties = Properties::open(&group)?;
        debug!(path = %group.pathname(), nr_properties = properties.len(), "opened property set");
        Ok(Self {
            group,
            object_tracker,
            domain,
            properties,
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

    pub fn object_tracker(&self) -> &ObjectTracker {
        &self.object_tracker
    }

    pub fn object_tracker_mut(&mut self) -> &mut ObjectTracker {
        &mut self.object_tracker
    }

    /// Whether the object tracker is stored here rather than linked.
    pub fn owns_object_tracker(&self) -> bool {
        !has_linked_object_tracker(&self.group)
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    pub fn domain_mut(&mut self) -> &mut Domain {
        &mut self.domain
    }

    pub fn has_time_domain(&self) -> bool {
        self.domain.has_time_domain()
    }

    pub fn has_space_domain(&self) -> bool {
        self.domain.has_space_domain()
    }

    /// Whether the time domain is stored here rather than linked.
    pub fn owns_time_domain(&self) -> bool {
        self.domain.owns_time_domain()
    }

    pub fn time_domain(&self) -> Option<&TimeDomain> {
        self.domain.time_domain()
    }

    pub fn space_domain(&self) -> Option<&SpaceDomain> {
        self.domain.space_domain()
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    pub fn properties_mut(&mut self) -> &mut Properties {
        &mut self.properties
    }
}

impl CollectionItem for PropertySet {
    fn open(parent: &Group, name: &str) -> Result<Self> {
        PropertySet::open(parent, name)
    }
}

/// Property sets of a phenomenon.
pub type PropertySets = Collection<PropertySet>;

impl Collection<PropertySet> {
    /// Create property set `name`, returning it.
    pub fn add(
        &mut self,
        name: &str,
        definition: &DomainDefinition<'_>,
    ) -> Result<&mut PropertySet> {
        let property_set = create_property_set(self.group(), name, definition)?;
        Ok(self.insert(name, property_set))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::File;
    use crate::core::tag::PROPERTY_SETS_TAG;
    use crate::core::{Mobility, SpaceDomainItemType, TimeDomainItemType, TimeUnit};

    fn property_sets(root: &Group) -> PropertySets {
        Collection::create(root, PROPERTY_SETS_TAG).unwrap()
    }

    #[test]
    fn test_omnipresent() {
        let root = File::create_in_memory("property-set-tests").root();
        let mut sets = property_sets(&root);
        let set = sets.add("constants", &DomainDefinition::omnipresent()).unwrap();
        assert!(!set.has_time_domain());
        assert!(!set.has_space_domain());
        assert!(set.owns_object_tracker());
        assert!(set.properties().is_empty());

        let reopened = PropertySets::open(&root, PROPERTY_SETS_TAG).unwrap();
        assert_eq!(reopened.names(), vec!["constants"]);
        assert!(!reopened.get("constants").unwrap().has_time_domain());
    }

    #[test]
    fn test_time_and_space() {
        let root = File::create_in_memory("property-set-tests").root();
        let mut sets = property_sets(&root);
        let definition = DomainDefinition::new()
            .with_time(
                TimeConfiguration::new(TimeDomainItemType::Box),
                Clock::new(TimeUnit::Day, 1),
            )
            .with_space(
                SpaceConfiguration::new(Mobility::Stationary, SpaceDomainItemType::Point),
                Datatype::native_of::<f64>(),
                2,
            );
        let set = sets.add("areas", &definition).unwrap();
        assert!(set.owns_time_domain());
        assert_eq!(set.space_domain().unwrap().value().rank(), 2);

        let reopened = PropertySet::open(sets.group(), "areas").unwrap();
        assert_eq!(
            reopened.time_domain().unwrap().configuration().item_type,
            TimeDomainItemType::Box
        );
        assert!(reopened.has_space_domain());
    }

    #[test]
    fn test_sharing() {
        let root = File::create_in_memory("property-set-tests").root();
        let mut sets = property_sets(&root);
        let definition = DomainDefinition::new().with_time(
            TimeConfiguration::new(TimeDomainItemType::Point),
            Clock::new(TimeUnit::Second, 1),
        );
        sets.add("a", &definition).unwrap();
        let first = PropertySet::open(sets.group(), "a").unwrap();

        let shared = DomainDefinition::new()
            .sharing_time_domain(first.time_domain().unwrap())
            .sharing_object_tracker(first.object_tracker());
        let second = sets.add("b", &shared).unwrap();
        assert!(!second.owns_object_tracker());
        assert!(!second.owns_time_domain());
        assert!(second.has_time_domain());

        first.object_tracker().add_active_set(&[4], &[0]).unwrap();
        assert_eq!(
            second.object_tracker().active_object_id().read_all().unwrap(),
            vec![4]
        );
    }

    #[test]
    fn test_create_preconditions() {
        let root = File::create_in_memory("property-set-tests").root();
        let other = File::create_in_memory("other").root();
        let foreign = create_object_tracker(&other).unwrap();

        let mut sets = property_sets(&root);
        sets.add("a", &DomainDefinition::omnipresent()).unwrap();
        assert!(matches!(
            sets.add("a", &DomainDefinition::omnipresent()),
            Err(Error::AlreadyExists(_))
        ));
        assert!(matches!(
            sets.add("lue_a", &DomainDefinition::omnipresent()),
            Err(Error::ReservedName(_))
        ));
        assert!(matches!(
            sets.add("b", &DomainDefinition::new().sharing_object_tracker(&foreign)),
            Err(Error::NotFound(_))
        ));
        assert!(!sets.group().contains("b"));
    }
}
