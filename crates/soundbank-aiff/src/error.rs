//! Error types for the AIFF/AIFC codec.

use soundbank_struct::StructError;
use thiserror::Error;

/// Result type for AIFF operations.
pub type AiffResult<T> = Result<T, AiffError>;

/// Errors that can occur while reading, writing or converting audio files.
#[derive(Debug, Error)]
pub enum AiffError {
    /// A record failed to decode or encode.
    #[error(transparent)]
    Struct(#[from] StructError),

    /// The input holds no `FORM` chunk.
    #[error("no FORM chunk found in {chunks} top-level chunk(s)")]
    NotAForm {
        /// Number of top-level chunks seen.
        chunks: usize,
    },

    /// The `FORM` sub-format is neither `AIFF` nor `AIFC`.
    #[error("unsupported form type '{form}'")]
    UnsupportedFormType {
        /// Form type found.
        form: String,
    },

    /// A chunk tag is not four bytes long.
    #[error("invalid chunk id '{id}': must be exactly 4 bytes")]
    InvalidChunkId {
        /// Offending tag.
        id: String,
    },

    /// A chunk the operation needs is absent.
    #[error("{form} file has no {chunk} chunk")]
    MissingChunk {
        /// Form type of the file.
        form: &'static str,
        /// Missing chunk tag.
        chunk: &'static str,
    },

    /// A loop play mode outside the defined values.
    #[error("invalid loop play mode {mode}")]
    InvalidPlayMode {
        /// Raw play mode.
        mode: i16,
    },

    /// An application chunk does not hold the expected sub-record.
    #[error("invalid application record '{name}': {message}")]
    InvalidApplicationRecord {
        /// Sub-record name.
        name: String,
        /// Error message.
        message: String,
    },

    /// Sample size the conversion does not handle.
    #[error("unsupported bit depth: {bits}")]
    UnsupportedBitDepth {
        /// Bits per sample.
        bits: u16,
    },

    /// Channel count outside what a WAV file can hold.
    #[error("invalid channel count: {channels}")]
    InvalidChannelCount {
        /// Channel count found.
        channels: i16,
    },

    /// Compressed audio where PCM is required.
    #[error("compressed audio ({compression}) not supported")]
    Compressed {
        /// Compression type tag.
        compression: String,
    },

    /// WAV reader or writer error.
    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AiffError {
    /// Creates an invalid application record error.
    pub fn application(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidApplicationRecord {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Stable error code for diagnostics.
    pub fn code(&self) -> &'static str {
        match self {
            AiffError::Struct(_) => "AIFF_001",
            AiffError::NotAForm { .. } => "AIFF_002",
            AiffError::UnsupportedFormType { .. } => "AIFF_003",
            AiffError::InvalidChunkId { .. } => "AIFF_004",
            AiffError::MissingChunk { .. } => "AIFF_005",
            AiffError::InvalidPlayMode { .. } => "AIFF_006",
            AiffError::InvalidApplicationRecord { .. } => "AIFF_007",
            AiffError::UnsupportedBitDepth { .. } => "AIFF_008",
            AiffError::Compressed { .. } => "AIFF_009",
            AiffError::Wav(_) => "AIFF_010",
            AiffError::Io(_) => "AIFF_011",
            AiffError::InvalidChannelCount { .. } => "AIFF_012",
        }
    }
}
