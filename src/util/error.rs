//! Error types for the LUE library.
//!
//! Errors fall into three families:
//! - schema errors, raised when a node's layout or tags do not match the data model
//! - range errors, raised for out-of-bounds indices and mismatching buffer shapes
//! - engine errors, raised by the hierarchical container underneath

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for LUE operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A persisted aspect tag is not part of the aspect's vocabulary
    #[error("Unknown {aspect} aspect: {tag:?}")]
    UnrecognizedTag { aspect: &'static str, tag: String },

    /// A node with this name already exists under the parent
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Datatype or strategy does not match what was requested
    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    /// A node the data model requires is absent
    #[error("Missing required node: {0}")]
    MissingRequiredNode(String),

    /// Object, property or child looked up by name/ID does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// A discretization link may only be set once per property
    #[error("Discretization already set: {0}")]
    DiscretizationAlreadySet(String),

    /// Names starting with `lue_` are reserved for the data model itself
    #[error("Reserved name: {0}")]
    ReservedName(String),

    /// Index out of bounds
    #[error("Index {index} out of bounds (count: {count}) in {path}")]
    OutOfRange { path: String, index: u64, count: u64 },

    /// Time or count arithmetic does not fit in 64 bits
    #[error("Overflow: {0}")]
    Overflow(String),

    /// Shape, rank or buffer length mismatch
    #[error("Shape mismatch in {path}: expected {expected}, got {actual}")]
    ShapeMismatch {
        path: String,
        expected: String,
        actual: String,
    },

    /// Container engine failure
    #[error("Engine error in {path}: {message}")]
    Engine { path: String, message: String },

    /// File does not exist or cannot be accessed
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Invalid magic bytes at start of file
    #[error("Invalid LUE file: expected container magic bytes")]
    InvalidMagic,

    /// Unsupported container format version
    #[error("Unsupported container version: {0}")]
    UnsupportedVersion(u16),

    /// File is truncated or corrupted
    #[error("Unexpected end of file at position {0}")]
    UnexpectedEof(u64),

    /// Invalid data structure in file
    #[error("Invalid file structure: {0}")]
    InvalidStructure(String),

    /// File is not writable (opened read-only)
    #[error("File is read-only: {0}")]
    ReadOnly(String),

    /// Memory mapping failed
    #[error("Memory mapping failed: {0}")]
    MmapFailed(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// UTF-8 conversion error
    #[error("Invalid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// Dataset failed validation
    #[error("{0}")]
    Invalid(String),
}

impl Error {
    /// Create an engine error for a container path.
    pub fn engine(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Engine {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an invalid structure error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidStructure(msg.into())
    }

    /// Create a type mismatch error from anything displayable.
    pub fn type_mismatch(expected: impl ToString, actual: impl ToString) -> Self {
        Self::TypeMismatch {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Create a shape mismatch error from anything displayable.
    pub fn shape_mismatch(
        path: impl Into<String>,
        expected: impl ToString,
        actual: impl ToString,
    ) -> Self {
        Self::ShapeMismatch {
            path: path.into(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Create an out of range error.
    pub fn out_of_range(path: impl Into<String>, index: u64, count: u64) -> Self {
        Self::OutOfRange {
            path: path.into(),
            index,
            count,
        }
    }

    /// Whether this error concerns the data model's layout rules.
    pub fn is_schema_error(&self) -> bool {
        matches!(
            self,
            Self::UnrecognizedTag { .. }
                | Self::AlreadyExists(_)
                | Self::TypeMismatch { .. }
                | Self::MissingRequiredNode(_)
                | Self::NotFound(_)
                | Self::DiscretizationAlreadySet(_)
                | Self::ReservedName(_)
        )
    }

    /// Whether this error is an index or shape violation.
    pub fn is_range_error(&self) -> bool {
        matches!(
            self,
            Self::OutOfRange { .. } | Self::Overflow(_) | Self::ShapeMismatch { .. }
        )
    }

    /// Whether this error originates from the container engine.
    pub fn is_engine_error(&self) -> bool {
        matches!(
            self,
            Self::Engine { .. }
                | Self::FileNotFound(_)
                | Self::InvalidMagic
                | Self::UnsupportedVersion(_)
                | Self::UnexpectedEof(_)
                | Self::InvalidStructure(_)
                | Self::ReadOnly(_)
                | Self::MmapFailed(_)
                | Self::Io(_)
                | Self::Utf8(_)
        )
    }
}

/// Result type alias for LUE operations.
pub type Result<T> = std::result::Result<T, Error>;
