//! Error types for bank linking, decompiling and sequence banks.

use std::path::PathBuf;

use soundbank_aiff::AiffError;
use soundbank_struct::StructError;
use thiserror::Error;

use crate::model::ObjectKind;

/// Result type for bank operations.
pub type BankResult<T> = Result<T, BankError>;

/// Errors that can occur while linking or reading bank files.
#[derive(Debug, Error)]
pub enum BankError {
    /// A metadata record failed to encode or decode.
    #[error(transparent)]
    Struct(#[from] StructError),

    /// A sample file could not be read.
    #[error(transparent)]
    Aiff(#[from] AiffError),

    /// Two objects of the same kind share a name.
    #[error("duplicate {kind} '{name}'")]
    DuplicateObject {
        /// Object kind.
        kind: ObjectKind,
        /// Object name.
        name: String,
    },

    /// A reference names no object at all.
    #[error("{from_kind} '{from_name}' field '{field}' references unknown {kind} '{name}'")]
    UnresolvedReference {
        /// Expected kind of the target.
        kind: ObjectKind,
        /// Name of the missing target.
        name: String,
        /// Kind of the referencing object.
        from_kind: ObjectKind,
        /// Name of the referencing object.
        from_name: String,
        /// Referencing field.
        field: &'static str,
    },

    /// A reference names an object of another kind.
    #[error(
        "{from_kind} '{from_name}' field '{field}' expects a {expected} but '{name}' is a {found}"
    )]
    WrongReferenceKind {
        /// Kind the field requires.
        expected: ObjectKind,
        /// Kind of the object found under the name.
        found: ObjectKind,
        /// Referenced name.
        name: String,
        /// Kind of the referencing object.
        from_kind: ObjectKind,
        /// Name of the referencing object.
        from_name: String,
        /// Referencing field.
        field: &'static str,
    },

    /// An object name was requested that was never inserted.
    #[error("no {kind} named '{name}'")]
    UnknownObject {
        /// Requested kind.
        kind: ObjectKind,
        /// Requested name.
        name: String,
    },

    /// The builder has already produced its tables.
    #[error("bank already built")]
    AlreadyBuilt,

    /// The builder configuration is unusable.
    #[error("invalid linker configuration: {message}")]
    InvalidConfig {
        /// What is wrong.
        message: String,
    },

    /// The patched header differs in size from its placeholder.
    #[error("header size changed from {placeholder} to {actual} bytes")]
    HeaderSizeChanged {
        /// Placeholder size.
        placeholder: usize,
        /// Size of the final header.
        actual: usize,
    },

    /// A table grew past what a 32-bit offset can address.
    #[error("{table} table overflow at {size} bytes")]
    TableOverflow {
        /// Table name.
        table: &'static str,
        /// Size reached.
        size: usize,
    },

    /// A sample source has no file under the given path.
    #[error("sample file not found: {path}")]
    MissingSample {
        /// Requested path.
        path: String,
    },

    /// A sample file could not be read from disk.
    #[error("failed to read sample {path}: {source}")]
    SampleRead {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A compressed sample has no predictor codebook.
    #[error("compressed sample {path} has no VADPCM codebook")]
    MissingCodebook {
        /// Sample path.
        path: String,
    },

    /// A revision tag other than the one the format requires.
    #[error("unsupported {format} version '{found}', expected '{expected}'")]
    UnsupportedVersion {
        /// Format name.
        format: &'static str,
        /// Required tag.
        expected: String,
        /// Tag found.
        found: String,
    },

    /// An offset or record inside a bank does not resolve.
    #[error("malformed bank at offset {offset:#x}: {message}")]
    MalformedBank {
        /// Table offset of the bad record or reference.
        offset: usize,
        /// What went wrong.
        message: String,
    },

    /// Symbolic form could not be (de)serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BankError {
    /// Creates a malformed bank error.
    pub fn malformed(offset: usize, message: impl Into<String>) -> Self {
        Self::MalformedBank {
            offset,
            message: message.into(),
        }
    }

    /// Stable error code for diagnostics.
    pub fn code(&self) -> &'static str {
        match self {
            BankError::Struct(_) => "BANK_001",
            BankError::Aiff(_) => "BANK_002",
            BankError::DuplicateObject { .. } => "BANK_003",
            BankError::UnresolvedReference { .. } => "BANK_004",
            BankError::WrongReferenceKind { .. } => "BANK_005",
            BankError::UnknownObject { .. } => "BANK_006",
            BankError::AlreadyBuilt => "BANK_007",
            BankError::InvalidConfig { .. } => "BANK_008",
            BankError::HeaderSizeChanged { .. } => "BANK_009",
            BankError::TableOverflow { .. } => "BANK_010",
            BankError::MissingSample { .. } => "BANK_011",
            BankError::SampleRead { .. } => "BANK_012",
            BankError::MissingCodebook { .. } => "BANK_013",
            BankError::UnsupportedVersion { .. } => "BANK_014",
            BankError::MalformedBank { .. } => "BANK_015",
            BankError::Json(_) => "BANK_016",
            BankError::Io(_) => "BANK_017",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unresolved_reference_names_both_sides() {
        let err = BankError::UnresolvedReference {
            kind: ObjectKind::Sound,
            name: "s9".to_string(),
            from_kind: ObjectKind::Instrument,
            from_name: "lead".to_string(),
            field: "sounds",
        };
        let msg = err.to_string();
        assert!(msg.contains("'s9'"));
        assert!(msg.contains("instrument 'lead'"));
        assert_eq!(err.code(), "BANK_004");
    }

    #[test]
    fn test_malformed_formats_offset_in_hex() {
        let err = BankError::malformed(0x40, "truncated");
        assert_eq!(err.to_string(), "malformed bank at offset 0x40: truncated");
    }
}
