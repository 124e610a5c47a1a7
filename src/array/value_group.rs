//! Values stored as a group of datasets.
//!
//! The datasets of a group-backed value are created lazily, so the group
//! itself records what they will hold: element type, byte order and rank.

use tracing::debug;

use super::typed::Array;
use crate::container::{CreationProperties, Dataspace, Group};
use crate::core::tag::{BYTE_ORDER_TAG, DATATYPE_TAG, RANK_TAG};
use crate::util::{ByteOrder, Datatype, ElementType, Error, Rank, Result};

/// Group holding the datasets of one value.
#[derive(Clone, Debug)]
pub struct ValueGroup {
    group: Group,
    file_datatype: Datatype,
    memory_datatype: Datatype,
    rank: Rank,
}

impl ValueGroup {
    pub fn create(
        parent: &Group,
        name: &str,
        file_datatype: Datatype,
        memory_datatype: Datatype,
        rank: Rank,
    ) -> Result<Self> {
        file_datatype.check_compatible(&memory_datatype)?;
        let group = parent.create_group(name)?;
        group.write_attribute(DATATYPE_TAG, file_datatype.element_type.name().to_string())?;
        group.write_attribute(BYTE_ORDER_TAG, file_datatype.byte_order.name().to_string())?;
        group.write_attribute(RANK_TAG, rank as u64)?;
        debug!(path = %group.pathname(), datatype = %file_datatype, rank, "created value group");

        Ok(Self {
            group,
            file_datatype,
            memory_datatype,
            rank,
        })
    }

    pub fn open(parent: &Group, name: &str, memory_datatype: Option<Datatype>) -> Result<Self> {
        Self::from_group(parent.open_required_group(name)?, memory_datatype)
    }

    pub fn from_group(group: Group, memory_datatype: Option<Datatype>) -> Result<Self> {
        let element_name = group.read_attribute::<String>(DATATYPE_TAG)?;
        let element_type =
            ElementType::from_name(&element_name).ok_or_else(|| Error::UnrecognizedTag {
                aspect: "ElementType",
                tag: element_name.clone(),
            })?;
        let order_name = group.read_attribute::<String>(BYTE_ORDER_TAG)?;
        let byte_order = ByteOrder::from_name(&order_name).ok_or_else(|| Error::UnrecognizedTag {
            aspect: "ByteOrder",
            tag: order_name.clone(),
        })?;
        let rank = group.read_attribute::<u64>(RANK_TAG)? as Rank;

        let file_datatype = Datatype::new(element_type, byte_order);
        let memory_datatype = memory_datatype.unwrap_or(Datatype::native(element_type));
        file_datatype.check_compatible(&memory_datatype)?;

        Ok(Self {
            group,
            file_datatype,
            memory_datatype,
            rank,
        })
    }

    pub fn group(&self) -> &Group {
        &self.group
    }

    pub fn pathname(&self) -> String {
        self.group.pathname()
    }

    pub fn file_datatype(&self) -> Datatype {
        self.file_datatype
    }

    pub fn memory_datatype(&self) -> Datatype {
        self.memory_datatype
    }

    /// Rank of the object arrays, excluding any location axis.
    pub fn rank(&self) -> Rank {
        self.rank
    }

    pub fn read_count(&self, tag: &str) -> Result<u64> {
        self.group.read_attribute::<u64>(tag)
    }

    pub fn write_count(&self, tag: &str, count: u64) -> Result<()> {
        self.group.write_attribute(tag, count)
    }

    /// Create a dataset holding elements of this value's datatype.
    pub fn create_array(
        &self,
        name: &str,
        dataspace: Dataspace,
        properties: CreationProperties,
    ) -> Result<Array> {
        Array::create(
            &self.group,
            name,
            self.file_datatype,
            self.memory_datatype,
            dataspace,
            properties,
        )
    }

    pub fn open_array(&self, name: &str) -> Result<Array> {
        Array::open(&self.group, name, Some(self.memory_datatype))
    }
}
