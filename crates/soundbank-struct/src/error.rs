//! Error types for schema-driven decoding and encoding.

use thiserror::Error;

/// Result type for schema operations.
pub type StructResult<T> = Result<T, StructError>;

/// Errors that can occur while defining, decoding or encoding a schema.
///
/// Decode and encode failures always name the owning schema and the field
/// being processed, since a schema is usually nested several levels deep.
#[derive(Debug, Error)]
pub enum StructError {
    /// Not enough bytes left in the input for a field.
    #[error(
        "tried to read {needed} bytes but only {remaining} remaining for field {field} on {schema}"
    )]
    BufferUnderrun {
        /// Owning schema.
        schema: &'static str,
        /// Field being decoded.
        field: &'static str,
        /// Bytes the field needs.
        needed: usize,
        /// Bytes left in the input.
        remaining: usize,
    },

    /// A field decoded or encoded to more bytes than its declared size.
    #[error("size {actual} larger than predetermined size {declared} for field {field} on {schema}")]
    FieldTooLarge {
        /// Owning schema.
        schema: &'static str,
        /// Offending field.
        field: &'static str,
        /// Bytes produced or consumed.
        actual: usize,
        /// Declared size of the field.
        declared: usize,
    },

    /// The discriminant function of a variant did not pick a member.
    #[error("could not resolve variant member of {variant} for field {field} on {schema}")]
    UnresolvedVariant {
        /// Owning schema.
        schema: &'static str,
        /// Variant-typed field.
        field: &'static str,
        /// Name of the variant.
        variant: &'static str,
    },

    /// A field has no value and no opt-in default.
    #[error("missing field {field} when serializing {schema}")]
    MissingField {
        /// Owning schema.
        schema: &'static str,
        /// Missing field.
        field: &'static str,
    },

    /// A field needs a size but none could be resolved.
    #[error("field {field} on {schema} needs a size but none was declared")]
    MissingSize {
        /// Owning schema.
        schema: &'static str,
        /// Unsized field.
        field: &'static str,
    },

    /// A numeric field declares a width the kind cannot be stored in.
    #[error("unsupported {width}-byte width for {kind} field {field} on {schema}")]
    UnsupportedWidth {
        /// Owning schema.
        schema: &'static str,
        /// Offending field.
        field: &'static str,
        /// Numeric kind of the field.
        kind: &'static str,
        /// Declared width in bytes.
        width: usize,
    },

    /// Static size was requested for a schema with dynamic fields.
    #[error("cannot get static size of {schema}: field {field} is not statically sized")]
    NotStaticallySized {
        /// Schema queried.
        schema: &'static str,
        /// First dynamic field.
        field: &'static str,
    },

    /// A variant has a member without a static size.
    #[error("variant {variant} has a member without a static size")]
    UnsizedVariant {
        /// Name of the variant.
        variant: &'static str,
    },

    /// A numeric value does not fit in its field.
    #[error("value {value} out of range for {width}-byte field {field} on {schema}")]
    ValueOutOfRange {
        /// Owning schema.
        schema: &'static str,
        /// Offending field.
        field: &'static str,
        /// The value, rendered.
        value: String,
        /// Field width in bytes.
        width: usize,
    },

    /// A value has the wrong shape for its field.
    #[error("expected {expected} value for field {field} on {schema}, found {found}")]
    TypeMismatch {
        /// Owning schema.
        schema: &'static str,
        /// Offending field.
        field: &'static str,
        /// Expected value kind.
        expected: &'static str,
        /// Found value kind.
        found: &'static str,
    },

    /// An array value has a different length than its count function says.
    #[error("field {field} on {schema} declares {expected} elements but {actual} were supplied")]
    CountMismatch {
        /// Owning schema.
        schema: &'static str,
        /// Array field.
        field: &'static str,
        /// Count computed from the record.
        expected: usize,
        /// Elements supplied.
        actual: usize,
    },

    /// A text field holds bytes that are not UTF-8.
    #[error("invalid UTF-8 in field {field} on {schema}")]
    InvalidText {
        /// Owning schema.
        schema: &'static str,
        /// Offending field.
        field: &'static str,
    },

    /// A size or count function asked for a context value that was not supplied.
    #[error("context value '{key}' was not supplied")]
    MissingContext {
        /// Context key.
        key: &'static str,
    },

    /// A record accessor asked for a field that is absent.
    #[error("record has no field '{field}'")]
    NoSuchField {
        /// Field name.
        field: String,
    },

    /// A record accessor found a value of the wrong shape.
    #[error("record field '{field}' is not {expected}")]
    WrongValue {
        /// Field name.
        field: String,
        /// Expected value description.
        expected: &'static str,
    },

    /// An error raised outside the engine (by a size function or a custom
    /// codec), located at the field being processed.
    #[error("{source} (field {field} on {schema})")]
    InField {
        /// Owning schema.
        schema: &'static str,
        /// Field being processed.
        field: &'static str,
        /// Underlying error.
        source: Box<StructError>,
    },

    /// Failure reported by a custom field codec.
    #[error("{codec}: {message}")]
    Codec {
        /// Codec name.
        codec: &'static str,
        /// Error message.
        message: String,
    },

    /// I/O error from the byte reader/writer.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StructError {
    /// Creates a custom codec error.
    pub fn codec(codec: &'static str, message: impl Into<String>) -> Self {
        Self::Codec {
            codec,
            message: message.into(),
        }
    }

    /// Attributes an error from a size function or custom codec to a field.
    ///
    /// Short reads and invalid text take the field's location in place of
    /// the codec's own;
    /// anything else is wrapped in [`StructError::InField`].
    pub fn in_field(self, schema: &'static str, field: &'static str) -> Self {
        match self {
            Self::BufferUnderrun {
                needed, remaining, ..
            } => Self::BufferUnderrun {
                schema,
                field,
                needed,
                remaining,
            },
            Self::InvalidText { .. } => Self::InvalidText { schema, field },
            located @ Self::InField { .. } => located,
            other => Self::InField {
                schema,
                field,
                source: Box::new(other),
            },
        }
    }

    /// Returns true for errors caused by a broken schema definition rather
    /// than by the data being processed.
    pub fn is_definition_error(&self) -> bool {
        matches!(
            self,
            Self::MissingSize { .. }
                | Self::UnsupportedWidth { .. }
                | Self::NotStaticallySized { .. }
                | Self::UnsizedVariant { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_underrun_names_field_and_schema() {
        let err = StructError::BufferUnderrun {
            schema: "AIFFChunk",
            field: "chunkData",
            needed: 12,
            remaining: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains("chunkData"));
        assert!(msg.contains("AIFFChunk"));
        assert!(msg.contains("12"));
    }

    #[test]
    fn test_in_field_locates_codec_errors() {
        let err = StructError::BufferUnderrun {
            schema: "PString",
            field: "text",
            needed: 5,
            remaining: 1,
        }
        .in_field("AIFFMarker", "markerName");
        assert!(matches!(
            err,
            StructError::BufferUnderrun {
                schema: "AIFFMarker",
                field: "markerName",
                needed: 5,
                remaining: 1
            }
        ));

        let err = StructError::MissingContext {
            key: "soundDataSize",
        }
        .in_field("AIFFSoundData", "soundData");
        let msg = err.to_string();
        assert!(msg.contains("soundDataSize"));
        assert!(msg.contains("soundData on AIFFSoundData"));
    }

    #[test]
    fn test_definition_errors() {
        assert!(StructError::UnsizedVariant { variant: "waveInfo" }.is_definition_error());
        assert!(!StructError::MissingField {
            schema: "ALSound",
            field: "flags"
        }
        .is_definition_error());
    }
}
