//! Container deserialization.
//!
//! Files are memory-mapped (with the `mmap` feature) or read completely and
//! parsed into a node tree. Nothing refers back into the file afterwards, so
//! the file may be rewritten while the tree is in use.

use std::collections::BTreeMap;
use std::io::{Cursor, Read};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt};
#[cfg(feature = "mmap")]
use memmap2::Mmap;

use super::attribute::{AttributeValue, Attributes};
use super::compression;
use super::dataset::{CreationProperties, Dataspace};
use super::format::*;
use super::node::{DatasetNode, GroupNode, Node};
use crate::util::{ByteOrder, Datatype, ElementType, Error, Result, Shape};

/// Read and parse the container at `path`.
pub(crate) fn read_file(path: &Path) -> Result<Node> {
    let file = std::fs::File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::FileNotFound(path.to_path_buf())
        } else {
            Error::Io(e)
        }
    })?;

    let size = file.metadata()?.len();
    if size < HEADER_SIZE as u64 {
        return Err(Error::UnexpectedEof(size));
    }

    #[cfg(feature = "mmap")]
    {
        // Safety: the map is only read while parsing and dropped before returning
        let mmap = unsafe { Mmap::map(&file) }.map_err(|e| Error::MmapFailed(e.to_string()))?;
        parse_container(&mmap)
    }

    #[cfg(not(feature = "mmap"))]
    {
        let mut file = file;
        let mut data = Vec::with_capacity(size as usize);
        file.read_to_end(&mut data)?;
        parse_container(&data)
    }
}

/// Whether the file at `path` starts with the container magic bytes.
pub(crate) fn is_container(path: &Path) -> bool {
    let mut magic = [0u8; 8];
    std::fs::File::open(path)
        .and_then(|mut f| f.read_exact(&mut magic))
        .is_ok()
        && &magic == MAGIC
}

/// Parse header and node tree.
pub(crate) fn parse_container(data: &[u8]) -> Result<Node> {
    if data.len() < HEADER_SIZE {
        return Err(Error::UnexpectedEof(data.len() as u64));
    }
    if &data[..MAGIC.len()] != MAGIC {
        return Err(Error::InvalidMagic);
    }
    let version = u16::from_le_bytes([data[VERSION_OFFSET], data[VERSION_OFFSET + 1]]);
    if version == 0 || version > CURRENT_VERSION {
        return Err(Error::UnsupportedVersion(version));
    }

    let mut stream = IStream::new(data);
    stream.seek(HEADER_SIZE as u64);
    let root = stream.read_node()?;
    if !matches!(root, Node::Group(_)) {
        return Err(Error::invalid("root node is not a group"));
    }
    Ok(root)
}

/// Cursor over container bytes.
struct IStream<'a> {
    cursor: Cursor<&'a [u8]>,
}

impl<'a> IStream<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self {
            cursor: Cursor::new(data),
        }
    }

    fn seek(&mut self, pos: u64) {
        self.cursor.set_position(pos);
    }

    fn eof(&self) -> Error {
        Error::UnexpectedEof(self.cursor.position())
    }

    fn read_u8(&mut self) -> Result<u8> {
        self.cursor.read_u8().map_err(|_| self.eof())
    }

    fn read_u32(&mut self) -> Result<u32> {
        self.cursor.read_u32::<LittleEndian>().map_err(|_| self.eof())
    }

    fn read_u64(&mut self) -> Result<u64> {
        self.cursor.read_u64::<LittleEndian>().map_err(|_| self.eof())
    }

    fn read_i64(&mut self) -> Result<i64> {
        self.cursor.read_i64::<LittleEndian>().map_err(|_| self.eof())
    }

    fn read_f64(&mut self) -> Result<f64> {
        self.cursor.read_f64::<LittleEndian>().map_err(|_| self.eof())
    }

    fn read_len(&mut self) -> Result<usize> {
        Ok(self.read_u32()? as usize)
    }

    fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>> {
        let size = self.cursor.get_ref().len() as u64;
        if len as u64 > size.saturating_sub(self.cursor.position()) {
            return Err(Error::UnexpectedEof(self.cursor.position() + len as u64));
        }
        let mut bytes = vec![0u8; len];
        self.cursor.read_exact(&mut bytes).map_err(|_| self.eof())?;
        Ok(bytes)
    }

    fn read_string(&mut self) -> Result<String> {
        let len = self.read_len()?;
        Ok(String::from_utf8(self.read_bytes(len)?)?)
    }

    fn read_shape(&mut self) -> Result<Shape> {
        let rank = self.read_len()?;
        let mut extents = Vec::with_capacity(rank.min(32));
        for _ in 0..rank {
            extents.push(self.read_u64()?);
        }
        Ok(Shape::from(extents))
    }

    fn read_node(&mut self) -> Result<Node> {
        match self.read_u8()? {
            TAG_GROUP => self.read_group().map(Node::Group),
            TAG_DATASET => self.read_dataset().map(Node::Dataset),
            TAG_SOFT_LINK => self.read_string().map(Node::SoftLink),
            tag => Err(Error::invalid(format!(
                "unknown node tag {} at position {}",
                tag,
                self.cursor.position() - 1
            ))),
        }
    }

    fn read_group(&mut self) -> Result<GroupNode> {
        let attributes = self.read_attributes()?;
        let nr_children = self.read_len()?;
        let mut children = BTreeMap::new();
        for _ in 0..nr_children {
            let name = self.read_string()?;
            let child = self.read_node()?;
            children.insert(name, child);
        }
        Ok(GroupNode {
            attributes,
            children,
        })
    }

    fn read_dataset(&mut self) -> Result<DatasetNode> {
        let attributes = self.read_attributes()?;
        let element_type = self.read_u8()?;
        let element_type = ElementType::from_u8(element_type)
            .ok_or_else(|| Error::invalid(format!("unknown element type {}", element_type)))?;
        let byte_order = self.read_u8()?;
        let byte_order = ByteOrder::from_u8(byte_order)
            .ok_or_else(|| Error::invalid(format!("unknown byte order {}", byte_order)))?;
        let datatype = Datatype::new(element_type, byte_order);

        let shape = self.read_shape()?;
        let mut max_extents = Vec::with_capacity(shape.rank());
        for _ in 0..shape.rank() {
            max_extents.push(decode_max_extent(self.read_u64()?));
        }
        let dataspace = Dataspace::new(shape, max_extents);

        let mut properties = CreationProperties::new();
        if self.read_u8()? != 0 {
            properties = properties.with_chunk(self.read_shape()?);
        }
        if self.read_u8()? != 0 {
            let len = self.read_len()?;
            properties = properties.with_fill_value(self.read_bytes(len)?);
        }
        let level = self.read_u8()?;
        if level > 0 {
            properties = properties.with_deflate(level as u32);
        }

        let expected_len = dataspace.shape().nr_elements() as usize * datatype.num_bytes();
        let encoding = self.read_u8()?;
        let stored_len = self.read_u64()? as usize;
        let stored = self.read_bytes(stored_len)?;
        let data = match encoding {
            DATA_RAW => stored,
            DATA_DEFLATE => compression::decompress(&stored, expected_len)?,
            other => return Err(Error::invalid(format!("unknown payload encoding {}", other))),
        };
        if data.len() != expected_len {
            return Err(Error::invalid(format!(
                "dataset payload of {} bytes, expected {}",
                data.len(),
                expected_len
            )));
        }

        Ok(DatasetNode {
            datatype,
            dataspace,
            properties,
            attributes,
            data,
        })
    }

    fn read_attributes(&mut self) -> Result<Attributes> {
        let count = self.read_len()?;
        let mut attributes = Attributes::new();
        for _ in 0..count {
            let name = self.read_string()?;
            let value = match self.read_u8()? {
                ATTR_STRING => AttributeValue::String(self.read_string()?),
                ATTR_U64 => AttributeValue::U64(self.read_u64()?),
                ATTR_I64 => AttributeValue::I64(self.read_i64()?),
                ATTR_F64 => AttributeValue::F64(self.read_f64()?),
                ATTR_U64_ARRAY => {
                    let len = self.read_len()?;
                    let mut values = Vec::with_capacity(len.min(1024));
                    for _ in 0..len {
                        values.push(self.read_u64()?);
                    }
                    AttributeValue::U64Array(values)
                }
                tag => return Err(Error::invalid(format!("unknown attribute tag {}", tag))),
            };
            attributes.set(name, value);
        }
        Ok(attributes)
    }
}
