//! Container format constants.
//!
//! Layout of a container file:
//! - 16 byte header: magic, version, reserved padding
//! - the root group node, serialized depth-first
//!
//! All integers are little-endian.

/// Magic bytes at the start of a container file.
pub const MAGIC: &[u8; 8] = b"\x89LUE\r\n\x1a\n";

/// Size of the file header in bytes.
pub const HEADER_SIZE: usize = 16;

/// Offset of the version in the header.
pub const VERSION_OFFSET: usize = 8;

/// Current container format version.
pub const CURRENT_VERSION: u16 = 1;

/// Node tag of a group.
pub const TAG_GROUP: u8 = 1;

/// Node tag of a dataset.
pub const TAG_DATASET: u8 = 2;

/// Node tag of a soft link.
pub const TAG_SOFT_LINK: u8 = 3;

/// Attribute value tags.
pub const ATTR_STRING: u8 = 1;
pub const ATTR_U64: u8 = 2;
pub const ATTR_I64: u8 = 3;
pub const ATTR_F64: u8 = 4;
pub const ATTR_U64_ARRAY: u8 = 5;

/// Dataset payload stored as-is.
pub const DATA_RAW: u8 = 0;

/// Dataset payload stored zlib-compressed.
pub const DATA_DEFLATE: u8 = 1;

/// Persisted maximum extent of an unlimited axis.
pub const UNLIMITED: u64 = u64::MAX;

/// Maximum number of soft links followed while resolving one path.
pub const MAX_LINK_DEPTH: usize = 16;

/// Encode an optional maximum extent.
#[inline]
pub const fn encode_max_extent(extent: Option<u64>) -> u64 {
    match extent {
        Some(e) => e,
        None => UNLIMITED,
    }
}

/// Decode a persisted maximum extent.
#[inline]
pub const fn decode_max_extent(extent: u64) -> Option<u64> {
    if extent == UNLIMITED {
        None
    } else {
        Some(extent)
    }
}
