//! Record schemas for the AIFF and AIFF-C local chunks.
//!
//! All records are big-endian. Sizes that depend on the enclosing chunk are
//! read from the context under [`SOUND_DATA_SIZE`] and [`DATA_SIZE`].

use std::sync::OnceLock;

use soundbank_struct::{
    align_to, Context, Endian, Field, FieldCodec, Len, Record, Schema, StructError, StructResult,
    Value,
};

/// Context key: byte length of the `SSND` sample data.
pub const SOUND_DATA_SIZE: &str = "soundDataSize";
/// Context key: byte length of a text or application payload.
pub const DATA_SIZE: &str = "dataSize";

/// Fixed-size part of an `SSND` payload (offset and block size).
pub const SOUND_DATA_HEADER_SIZE: usize = 8;
/// Fixed-size part of an `APPL` payload (application signature).
pub const APPLICATION_HEADER_SIZE: usize = 4;

/// Pascal string: a length byte followed by that many bytes, padded so the
/// total is even.
#[derive(Debug)]
pub struct PString;

/// Shared instance used by schemas.
pub static PSTRING: PString = PString;

impl PString {
    /// Encodes a string directly.
    pub fn to_bytes(text: &str) -> StructResult<Vec<u8>> {
        let len = u8::try_from(text.len()).map_err(|_| {
            StructError::codec("PString", format!("string of {} bytes exceeds 255", text.len()))
        })?;
        let mut out = Vec::with_capacity(text.len() + 2);
        out.push(len);
        out.extend_from_slice(text.as_bytes());
        out.resize(align_to(out.len(), 2), 0);
        Ok(out)
    }
}

impl FieldCodec for PString {
    fn name(&self) -> &'static str {
        "PString"
    }

    fn decode(&self, buf: &[u8], offset: usize, _ctx: &Context) -> StructResult<(Value, usize)> {
        let remaining = buf.len().saturating_sub(offset);
        let underrun = |field, needed| StructError::BufferUnderrun {
            schema: "PString",
            field,
            needed,
            remaining,
        };
        let len = *buf.get(offset).ok_or_else(|| underrun("length", 1))? as usize;
        let text = buf
            .get(offset + 1..offset + 1 + len)
            .ok_or_else(|| underrun("text", 1 + len))?;
        let text = std::str::from_utf8(text).map_err(|_| StructError::InvalidText {
            schema: "PString",
            field: "text",
        })?;
        Ok((Value::Text(text.to_string()), align_to(1 + len, 2)))
    }

    fn encode(&self, value: &Value, _ctx: &Context) -> StructResult<Vec<u8>> {
        let text = value
            .as_text()
            .ok_or_else(|| {
                StructError::codec(
                    "PString",
                    format!("expected text, found {}", value.kind_name()),
                )
            })?;
        PString::to_bytes(text)
    }
}

fn sound_data_size(_record: &Record, ctx: &Context) -> StructResult<usize> {
    ctx.get(SOUND_DATA_SIZE)
}

fn data_size(_record: &Record, ctx: &Context) -> StructResult<usize> {
    ctx.get(DATA_SIZE)
}

fn marker_count(record: &Record, _ctx: &Context) -> StructResult<usize> {
    record.usize("numMarkers")
}

fn comment_length(record: &Record, _ctx: &Context) -> StructResult<usize> {
    record.usize("count")
}

fn common_fields(builder: soundbank_struct::SchemaBuilder) -> soundbank_struct::SchemaBuilder {
    builder
        .field(Field::int("numChannels", 2))
        .field(Field::uint("numSampleFrames", 4))
        .field(Field::int("sampleSize", 2))
        .field(Field::bytes("sampleRate", 10usize))
}

/// `COMM` payload of an AIFF file.
pub fn common_schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| common_fields(Schema::builder("AIFFCommon", Endian::Big)).build())
}

/// `COMM` payload of an AIFF-C file.
pub fn aifc_common_schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        common_fields(Schema::builder("AIFCCommon", Endian::Big))
            .field(Field::bytes("compressionType", 4usize))
            .field(Field::custom("compressionName", &PSTRING))
            .build()
    })
}

/// `SSND` payload.
pub fn sound_data_schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        Schema::builder("AIFFSoundData", Endian::Big)
            .field(Field::uint("offset", 4).default_value(0u32))
            .field(Field::uint("blockSize", 4).default_value(0u32))
            .field(Field::bytes("soundData", Len::Computed(sound_data_size)))
            .build()
    })
}

/// One marker of a `MARK` chunk.
pub fn marker_schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        Schema::builder("AIFFMarker", Endian::Big)
            .field(Field::int("id", 2))
            .field(Field::uint("position", 4))
            .field(Field::custom("markerName", &PSTRING))
            .build()
    })
}

/// `MARK` payload.
pub fn marker_chunk_schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        Schema::builder("AIFFMarkerChunk", Endian::Big)
            .field(Field::uint("numMarkers", 2))
            .field(Field::nested("markers", marker_schema()).array(Len::Computed(marker_count)))
            .build()
    })
}

/// `COMT` payload.
pub fn comment_schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        Schema::builder("AIFFComment", Endian::Big)
            .field(Field::uint("timeStamp", 4))
            .field(Field::int("marker", 2).default_value(0i16))
            .field(Field::uint("count", 2))
            .field(Field::utf8("text", Len::Computed(comment_length)))
            .build()
    })
}

/// Sustain or release loop of an `INST` chunk.
pub fn loop_schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        Schema::builder("AIFFLoop", Endian::Big)
            .field(Field::int("playMode", 2).default_value(0i16))
            .field(Field::int("beginLoop", 2).default_value(0i16))
            .field(Field::int("endLoop", 2).default_value(0i16))
            .build()
    })
}

/// `INST` payload.
pub fn instrument_schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        Schema::builder("AIFFInstrument", Endian::Big)
            .field(Field::int("baseNote", 1))
            .field(Field::int("detune", 1))
            .field(Field::int("lowNote", 1))
            .field(Field::int("highNote", 1))
            .field(Field::int("lowVelocity", 1))
            .field(Field::int("highVelocity", 1))
            .field(Field::int("gain", 2))
            .field(Field::nested("sustainLoop", loop_schema()))
            .field(Field::nested("releaseLoop", loop_schema()))
            .build()
    })
}

/// `NAME`, `AUTH`, `(c) ` and `ANNO` payloads.
pub fn text_schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        Schema::builder("AIFFText", Endian::Big)
            .field(Field::utf8("text", Len::Computed(data_size)))
            .build()
    })
}

/// `APPL` payload.
pub fn application_schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        Schema::builder("AIFCApplicationSpecific", Endian::Big)
            .field(Field::bytes("applicationSignature", 4usize))
            .field(Field::bytes("data", Len::Computed(data_size)))
            .build()
    })
}

/// `FVER` payload.
pub fn format_version_schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        Schema::builder("AIFCFormat", Endian::Big)
            .field(Field::uint("timestamp", 4))
            .build()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_pstring_padding() {
        assert_eq!(PString::to_bytes("").unwrap(), vec![0, 0]);
        assert_eq!(PString::to_bytes("a").unwrap(), vec![1, b'a']);
        assert_eq!(PString::to_bytes("ab").unwrap(), vec![2, b'a', b'b', 0]);

        let (value, consumed) = PSTRING.decode(&[2, b'a', b'b', 0, 9], 0, &Context::new()).unwrap();
        assert_eq!(value, Value::Text("ab".to_string()));
        assert_eq!(consumed, 4);
    }

    #[test]
    fn test_pstring_too_long() {
        assert!(PString::to_bytes(&"x".repeat(256)).is_err());
        assert!(matches!(
            PSTRING.decode(&[5, b'a'], 0, &Context::new()),
            Err(StructError::BufferUnderrun {
                needed: 6,
                remaining: 2,
                ..
            })
        ));
    }

    #[test]
    fn test_pstring_rejects_invalid_utf8() {
        assert!(matches!(
            PSTRING.decode(&[2, 0xff, 0xfe, 0], 0, &Context::new()),
            Err(StructError::InvalidText { .. })
        ));
    }

    #[test]
    fn test_truncated_marker_names_field() {
        let err = marker_chunk_schema()
            .decode(&[0, 1, 0, 1, 0, 0, 0, 0, 5, b'a'], 0, &Context::new())
            .unwrap_err();
        assert!(matches!(
            err,
            StructError::BufferUnderrun {
                schema: "AIFFMarker",
                field: "markerName",
                ..
            }
        ));
        let msg = err.to_string();
        assert!(msg.contains("markerName"), "{msg}");
        assert!(msg.contains("AIFFMarker"), "{msg}");
    }

    #[test]
    fn test_missing_sound_data_size_names_field() {
        let err = sound_data_schema()
            .decode(&[0; 12], 0, &Context::new())
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("soundDataSize"), "{msg}");
        assert!(msg.contains("soundData on AIFFSoundData"), "{msg}");
    }

    #[test]
    fn test_static_sizes() {
        assert_eq!(common_schema().static_size().unwrap(), 18);
        assert_eq!(loop_schema().static_size().unwrap(), 6);
        assert_eq!(instrument_schema().static_size().unwrap(), 20);
        assert!(aifc_common_schema().static_size().is_err());
    }

    #[test]
    fn test_marker_chunk_round_trip() {
        let record = Record::new().with("numMarkers", 2u16).with(
            "markers",
            vec![
                Value::Record(
                    Record::new()
                        .with("id", 1i16)
                        .with("position", 0u32)
                        .with("markerName", "start"),
                ),
                Value::Record(
                    Record::new()
                        .with("id", 2i16)
                        .with("position", 4410u32)
                        .with("markerName", "end"),
                ),
            ],
        );
        let bytes = marker_chunk_schema().encode(&record, &Context::new()).unwrap();
        // 2 + (2 + 4 + 6) + (2 + 4 + 4)
        assert_eq!(bytes.len(), 24);
        let (decoded, consumed) = marker_chunk_schema().decode(&bytes, 0, &Context::new()).unwrap();
        assert_eq!(consumed, 24);
        assert_eq!(decoded, record);
    }

    #[test]
    fn test_sound_data_size_from_context() {
        let buf = [0, 0, 0, 0, 0, 0, 0, 0, 1, 2, 3, 4];
        let ctx = Context::new().with(SOUND_DATA_SIZE, buf.len() - SOUND_DATA_HEADER_SIZE);
        let (record, consumed) = sound_data_schema().decode(&buf, 0, &ctx).unwrap();
        assert_eq!(consumed, 12);
        assert_eq!(record.bytes("soundData").unwrap(), &[1, 2, 3, 4]);
    }
}
