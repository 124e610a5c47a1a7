//! Container serialization.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use byteorder::{LittleEndian, WriteBytesExt};
use tracing::trace;

use super::attribute::{AttributeValue, Attributes};
use super::compression;
use super::format::*;
use super::node::{DatasetNode, GroupNode, Node};
use crate::util::{Error, Result, Shape};

/// Output stream for writing container data.
pub(crate) struct OStream<W: Write> {
    writer: W,
    pos: u64,
}

impl OStream<BufWriter<File>> {
    /// Create a new output stream for the given file path.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;

        Ok(Self::new(BufWriter::with_capacity(2 * 1024 * 1024, file)))
    }
}

impl<W: Write> OStream<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, pos: 0 }
    }

    /// Get the current write position.
    #[inline]
    pub fn pos(&self) -> u64 {
        self.pos
    }

    /// Write bytes and advance position.
    pub fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.writer.write_all(data)?;
        self.pos += data.len() as u64;
        Ok(())
    }

    pub fn write_u64(&mut self, value: u64) -> Result<()> {
        self.writer.write_u64::<LittleEndian>(value)?;
        self.pos += 8;
        Ok(())
    }

    pub fn write_i64(&mut self, value: i64) -> Result<()> {
        self.writer.write_i64::<LittleEndian>(value)?;
        self.pos += 8;
        Ok(())
    }

    pub fn write_f64(&mut self, value: f64) -> Result<()> {
        self.writer.write_f64::<LittleEndian>(value)?;
        self.pos += 8;
        Ok(())
    }

    pub fn write_u32(&mut self, value: u32) -> Result<()> {
        self.writer.write_u32::<LittleEndian>(value)?;
        self.pos += 4;
        Ok(())
    }

    pub fn write_u16(&mut self, value: u16) -> Result<()> {
        self.writer.write_u16::<LittleEndian>(value)?;
        self.pos += 2;
        Ok(())
    }

    pub fn write_u8(&mut self, value: u8) -> Result<()> {
        self.writer.write_u8(value)?;
        self.pos += 1;
        Ok(())
    }

    /// Write a length-prefixed count (u32).
    pub fn write_len(&mut self, len: usize) -> Result<()> {
        let len = u32::try_from(len).map_err(|_| Error::invalid(format!("length {} too large", len)))?;
        self.write_u32(len)
    }

    /// Write a length-prefixed UTF-8 string.
    pub fn write_string(&mut self, value: &str) -> Result<()> {
        self.write_len(value.len())?;
        self.write_bytes(value.as_bytes())
    }

    pub fn write_shape(&mut self, shape: &Shape) -> Result<()> {
        self.write_len(shape.rank())?;
        for &extent in shape.extents() {
            self.write_u64(extent)?;
        }
        Ok(())
    }

    /// Flush buffered data and return the underlying writer.
    pub fn finish(mut self) -> Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

/// Write the complete node tree to `path`.
pub(crate) fn write_file(path: &Path, root: &Node) -> Result<()> {
    let mut stream = OStream::create(path)?;
    write_container(&mut stream, root)?;
    trace!(path = %path.display(), bytes = stream.pos(), "wrote container");
    stream.finish()?;
    Ok(())
}

/// Serialize header and node tree.
pub(crate) fn write_container<W: Write>(stream: &mut OStream<W>, root: &Node) -> Result<()> {
    let mut header = [0u8; HEADER_SIZE];
    header[..MAGIC.len()].copy_from_slice(MAGIC);
    header[VERSION_OFFSET..VERSION_OFFSET + 2].copy_from_slice(&CURRENT_VERSION.to_le_bytes());
    stream.write_bytes(&header)?;
    write_node(stream, root)
}

fn write_node<W: Write>(stream: &mut OStream<W>, node: &Node) -> Result<()> {
    match node {
        Node::Group(group) => write_group(stream, group),
        Node::Dataset(dataset) => write_dataset(stream, dataset),
        Node::SoftLink(target) => {
            stream.write_u8(TAG_SOFT_LINK)?;
            stream.write_string(target)
        }
    }
}

fn write_group<W: Write>(stream: &mut OStream<W>, group: &GroupNode) -> Result<()> {
    stream.write_u8(TAG_GROUP)?;
    write_attributes(stream, &group.attributes)?;
    stream.write_len(group.children.len())?;
    for (name, child) in &group.children {
        stream.write_string(name)?;
        write_node(stream, child)?;
    }
    Ok(())
}

fn write_dataset<W: Write>(stream: &mut OStream<W>, dataset: &DatasetNode) -> Result<()> {
    stream.write_u8(TAG_DATASET)?;
    write_attributes(stream, &dataset.attributes)?;
    stream.write_u8(dataset.datatype.element_type as u8)?;
    stream.write_u8(dataset.datatype.byte_order as u8)?;

    let dataspace = &dataset.dataspace;
    stream.write_shape(dataspace.shape())?;
    for &max in dataspace.max_extents() {
        stream.write_u64(encode_max_extent(max))?;
    }

    let properties = &dataset.properties;
    match properties.chunk() {
        Some(chunk) => {
            stream.write_u8(1)?;
            stream.write_shape(chunk)?;
        }
        None => stream.write_u8(0)?,
    }
    match properties.fill_value() {
        Some(fill) => {
            stream.write_u8(1)?;
            stream.write_len(fill.len())?;
            stream.write_bytes(fill)?;
        }
        None => stream.write_u8(0)?,
    }
    let level = properties.deflate().unwrap_or(0);
    stream.write_u8(level.min(9) as u8)?;

    match compression::compress(&dataset.data, level)? {
        Some(compressed) => {
            stream.write_u8(DATA_DEFLATE)?;
            stream.write_u64(compressed.len() as u64)?;
            stream.write_bytes(&compressed)
        }
        None => {
            stream.write_u8(DATA_RAW)?;
            stream.write_u64(dataset.data.len() as u64)?;
            stream.write_bytes(&dataset.data)
        }
    }
}

fn write_attributes<W: Write>(stream: &mut OStream<W>, attributes: &Attributes) -> Result<()> {
    stream.write_len(attributes.len())?;
    for (name, value) in attributes.iter() {
        stream.write_string(name)?;
        match value {
            AttributeValue::String(s) => {
                stream.write_u8(ATTR_STRING)?;
                stream.write_string(s)?;
            }
            AttributeValue::U64(v) => {
                stream.write_u8(ATTR_U64)?;
                stream.write_u64(*v)?;
            }
            AttributeValue::I64(v) => {
                stream.write_u8(ATTR_I64)?;
                stream.write_i64(*v)?;
            }
            AttributeValue::F64(v) => {
                stream.write_u8(ATTR_F64)?;
                stream.write_f64(*v)?;
            }
            AttributeValue::U64Array(values) => {
                stream.write_u8(ATTR_U64_ARRAY)?;
                stream.write_len(values.len())?;
                for v in values {
                    stream.write_u64(*v)?;
                }
            }
        }
    }
    Ok(())
}
