//! Element types and datatypes of stored arrays.
//!
//! A [`Datatype`] pairs an [`ElementType`] with a [`ByteOrder`]. Values are
//! stored using a *file* datatype and handed to callers using a *memory*
//! datatype. The two share the element type and may differ in byte order.

use bytemuck::{Pod, Zeroable};
use half::f16;
use std::fmt;

use super::{Error, Result};

/// Numeric element types that can be stored in object arrays.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum ElementType {
    /// Unsigned 8-bit integer
    Uint8 = 1,
    /// Signed 8-bit integer
    Int8 = 2,
    /// Unsigned 16-bit integer
    Uint16 = 3,
    /// Signed 16-bit integer
    Int16 = 4,
    /// Unsigned 32-bit integer
    Uint32 = 5,
    /// Signed 32-bit integer
    Int32 = 6,
    /// Unsigned 64-bit integer
    Uint64 = 7,
    /// Signed 64-bit integer
    Int64 = 8,
    /// 16-bit floating point (IEEE 754 half precision)
    Float16 = 9,
    /// 32-bit floating point (IEEE 754 single precision)
    Float32 = 10,
    /// 64-bit floating point (IEEE 754 double precision)
    Float64 = 11,
}

impl ElementType {
    /// All element types, in tag order.
    pub const ALL: [ElementType; 11] = [
        Self::Uint8,
        Self::Int8,
        Self::Uint16,
        Self::Int16,
        Self::Uint32,
        Self::Int32,
        Self::Uint64,
        Self::Int64,
        Self::Float16,
        Self::Float32,
        Self::Float64,
    ];

    /// Returns the size in bytes of a single element of this type.
    #[inline]
    pub const fn num_bytes(self) -> usize {
        match self {
            Self::Uint8 | Self::Int8 => 1,
            Self::Uint16 | Self::Int16 | Self::Float16 => 2,
            Self::Uint32 | Self::Int32 | Self::Float32 => 4,
            Self::Uint64 | Self::Int64 | Self::Float64 => 8,
        }
    }

    /// Returns the name of this type as a string.
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Uint8 => "uint8",
            Self::Int8 => "int8",
            Self::Uint16 => "uint16",
            Self::Int16 => "int16",
            Self::Uint32 => "uint32",
            Self::Int32 => "int32",
            Self::Uint64 => "uint64",
            Self::Int64 => "int64",
            Self::Float16 => "float16",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
        }
    }

    /// Parse an element type from its name string.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.name() == name)
    }

    /// Convert from the u8 tag used in the container format.
    pub const fn from_u8(v: u8) -> Option<Self> {
        match v {
            1 => Some(Self::Uint8),
            2 => Some(Self::Int8),
            3 => Some(Self::Uint16),
            4 => Some(Self::Int16),
            5 => Some(Self::Uint32),
            6 => Some(Self::Int32),
            7 => Some(Self::Uint64),
            8 => Some(Self::Int64),
            9 => Some(Self::Float16),
            10 => Some(Self::Float32),
            11 => Some(Self::Float64),
            _ => None,
        }
    }

    /// Returns true if this is an unsigned integer type.
    #[inline]
    pub const fn is_unsigned_integral(self) -> bool {
        matches!(
            self,
            Self::Uint8 | Self::Uint16 | Self::Uint32 | Self::Uint64
        )
    }

    /// Returns true if this is a floating point type.
    #[inline]
    pub const fn is_float(self) -> bool {
        matches!(self, Self::Float16 | Self::Float32 | Self::Float64)
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Byte order of multi-byte elements.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ByteOrder {
    LittleEndian = 0,
    BigEndian = 1,
}

impl ByteOrder {
    /// Byte order of the machine we run on.
    #[cfg(target_endian = "little")]
    pub const NATIVE: ByteOrder = ByteOrder::LittleEndian;
    #[cfg(target_endian = "big")]
    pub const NATIVE: ByteOrder = ByteOrder::BigEndian;

    pub const fn name(self) -> &'static str {
        match self {
            Self::LittleEndian => "le",
            Self::BigEndian => "be",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "le" => Some(Self::LittleEndian),
            "be" => Some(Self::BigEndian),
            _ => None,
        }
    }

    pub const fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(Self::LittleEndian),
            1 => Some(Self::BigEndian),
            _ => None,
        }
    }
}

/// Element type plus byte order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Datatype {
    pub element_type: ElementType,
    pub byte_order: ByteOrder,
}

impl Datatype {
    /// Create a datatype.
    pub const fn new(element_type: ElementType, byte_order: ByteOrder) -> Self {
        Self {
            element_type,
            byte_order,
        }
    }

    /// Native datatype for an element type.
    pub const fn native(element_type: ElementType) -> Self {
        Self::new(element_type, ByteOrder::NATIVE)
    }

    /// Native datatype of a Rust element.
    pub const fn native_of<T: Element>() -> Self {
        Self::native(T::ELEMENT_TYPE)
    }

    /// Little-endian datatype for an element type.
    pub const fn little_endian(element_type: ElementType) -> Self {
        Self::new(element_type, ByteOrder::LittleEndian)
    }

    /// Size in bytes of one element.
    #[inline]
    pub const fn num_bytes(&self) -> usize {
        self.element_type.num_bytes()
    }

    #[inline]
    pub fn is_native(&self) -> bool {
        self.byte_order == ByteOrder::NATIVE
    }

    /// Whether buffers of `other` can be converted to `self` by byte swapping only.
    pub fn is_compatible_with(&self, other: &Datatype) -> bool {
        self.element_type == other.element_type
    }

    /// Fail with a type mismatch unless both datatypes share their element type.
    pub fn check_compatible(&self, other: &Datatype) -> Result<()> {
        if self.is_compatible_with(other) {
            Ok(())
        } else {
            Err(Error::type_mismatch(self, other))
        }
    }
}

impl fmt::Display for Datatype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.element_type, self.byte_order.name())
    }
}

/// File datatype used to persist values handed over in `memory_datatype`.
///
/// Files are always little-endian, whatever the host.
pub const fn file_datatype(memory_datatype: &Datatype) -> Datatype {
    Datatype::little_endian(memory_datatype.element_type)
}

/// Convert a buffer of elements from one byte order to another, in place.
pub fn convert_byte_order(buffer: &mut [u8], element_size: usize, from: ByteOrder, to: ByteOrder) {
    if from == to || element_size <= 1 {
        return;
    }
    for element in buffer.chunks_exact_mut(element_size) {
        element.reverse();
    }
}

// === Element trait for type-safe buffers ===

/// Rust types that can be read from and written to object arrays.
pub trait Element: Pod + Zeroable + Copy + Default + PartialEq + fmt::Debug {
    /// The corresponding ElementType enum value.
    const ELEMENT_TYPE: ElementType;

    /// Size of this type in bytes.
    const SIZE: usize = std::mem::size_of::<Self>();
}

impl Element for u8 {
    const ELEMENT_TYPE: ElementType = ElementType::Uint8;
}

impl Element for i8 {
    const ELEMENT_TYPE: ElementType = ElementType::Int8;
}

impl Element for u16 {
    const ELEMENT_TYPE: ElementType = ElementType::Uint16;
}

impl Element for i16 {
    const ELEMENT_TYPE: ElementType = ElementType::Int16;
}

impl Element for u32 {
    const ELEMENT_TYPE: ElementType = ElementType::Uint32;
}

impl Element for i32 {
    const ELEMENT_TYPE: ElementType = ElementType::Int32;
}

impl Element for u64 {
    const ELEMENT_TYPE: ElementType = ElementType::Uint64;
}

impl Element for i64 {
    const ELEMENT_TYPE: ElementType = ElementType::Int64;
}

impl Element for f16 {
    const ELEMENT_TYPE: ElementType = ElementType::Float16;
}

impl Element for f32 {
    const ELEMENT_TYPE: ElementType = ElementType::Float32;
}

impl Element for f64 {
    const ELEMENT_TYPE: ElementType = ElementType::Float64;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_sizes() {
        assert_eq!(ElementType::Uint8.num_bytes(), 1);
        assert_eq!(ElementType::Int32.num_bytes(), 4);
        assert_eq!(ElementType::Float16.num_bytes(), 2);
        assert_eq!(ElementType::Float64.num_bytes(), 8);
        for t in ElementType::ALL {
            assert_eq!(ElementType::from_u8(t as u8), Some(t));
            assert_eq!(ElementType::from_name(t.name()), Some(t));
        }
        assert_eq!(ElementType::from_u8(0), None);
    }

    #[test]
    fn test_file_datatype_is_little_endian() {
        let memory = Datatype::new(ElementType::Float32, ByteOrder::BigEndian);
        let file = file_datatype(&memory);
        assert_eq!(file.element_type, ElementType::Float32);
        assert_eq!(file.byte_order, ByteOrder::LittleEndian);
        assert!(file.is_compatible_with(&memory));
    }

    #[test]
    fn test_check_compatible() {
        let a = Datatype::native_of::<f64>();
        let b = Datatype::native_of::<i64>();
        assert!(a.check_compatible(&a).is_ok());
        assert!(matches!(
            a.check_compatible(&b),
            Err(Error::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_convert_byte_order() {
        let mut buffer = 0x0102_0304u32.to_le_bytes().to_vec();
        convert_byte_order(&mut buffer, 4, ByteOrder::LittleEndian, ByteOrder::BigEndian);
        assert_eq!(buffer, 0x0102_0304u32.to_be_bytes());

        let mut same = vec![1u8, 2, 3, 4];
        convert_byte_order(&mut same, 2, ByteOrder::BigEndian, ByteOrder::BigEndian);
        assert_eq!(same, vec![1, 2, 3, 4]);
    }
}
