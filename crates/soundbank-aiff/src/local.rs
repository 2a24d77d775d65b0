//! Dispatch of `FORM` local chunks to their typed records.

use soundbank_struct::{Context, Record};

use crate::aiff::FormType;
use crate::chunk::{Chunk, ChunkId};
use crate::error::AiffResult;
use crate::records::{Application, Comment, Common, Instrument, Marker, SoundData};
use crate::schemas::{format_version_schema, text_schema, DATA_SIZE};

/// `FVER` timestamp of AIFF-C version 1.
pub const AIFC_VERSION_1: u32 = 0xA280_5140;

/// A decoded local chunk of a `FORM`.
#[derive(Debug, Clone, PartialEq)]
pub enum LocalChunk {
    /// `COMM`
    Common(Common),
    /// `SSND`
    SoundData(SoundData),
    /// `MARK`
    Markers(Vec<Marker>),
    /// `COMT`
    Comment(Comment),
    /// `INST`
    Instrument(Instrument),
    /// `NAME`
    Name(String),
    /// `AUTH`
    Author(String),
    /// `(c) `
    Copyright(String),
    /// `ANNO`
    Annotation(String),
    /// `APPL`
    Application(Application),
    /// `FVER`
    FormatVersion(u32),
    /// Any other tag, kept verbatim.
    Unknown(Chunk),
}

impl LocalChunk {
    /// Chunk tag.
    pub fn id(&self) -> ChunkId {
        match self {
            LocalChunk::Common(_) => ChunkId::COMM,
            LocalChunk::SoundData(_) => ChunkId::SSND,
            LocalChunk::Markers(_) => ChunkId::MARK,
            LocalChunk::Comment(_) => ChunkId::COMT,
            LocalChunk::Instrument(_) => ChunkId::INST,
            LocalChunk::Name(_) => ChunkId::NAME,
            LocalChunk::Author(_) => ChunkId::AUTH,
            LocalChunk::Copyright(_) => ChunkId::COPYRIGHT,
            LocalChunk::Annotation(_) => ChunkId::ANNO,
            LocalChunk::Application(_) => ChunkId::APPL,
            LocalChunk::FormatVersion(_) => ChunkId::FVER,
            LocalChunk::Unknown(chunk) => chunk.id,
        }
    }

    /// Decodes a raw chunk according to its tag.
    pub fn decode(chunk: &Chunk, form: FormType) -> AiffResult<Self> {
        tracing::debug!(id = %chunk.id, len = chunk.data.len(), "decoding local chunk");
        let data = &chunk.data;
        let local = match chunk.id {
            ChunkId::COMM => LocalChunk::Common(Common::decode(data, form)?),
            ChunkId::SSND => LocalChunk::SoundData(SoundData::decode(data)?),
            ChunkId::MARK => LocalChunk::Markers(Marker::decode_all(data)?),
            ChunkId::COMT => LocalChunk::Comment(Comment::decode(data)?),
            ChunkId::INST => LocalChunk::Instrument(Instrument::decode(data)?),
            ChunkId::NAME => LocalChunk::Name(decode_text(data)?),
            ChunkId::AUTH => LocalChunk::Author(decode_text(data)?),
            ChunkId::COPYRIGHT => LocalChunk::Copyright(decode_text(data)?),
            ChunkId::ANNO => LocalChunk::Annotation(decode_text(data)?),
            ChunkId::APPL => LocalChunk::Application(Application::decode(data)?),
            ChunkId::FVER => {
                let (record, _) = format_version_schema().decode(data, 0, &Context::new())?;
                LocalChunk::FormatVersion(record.uint("timestamp")? as u32)
            }
            id => {
                tracing::warn!(%id, "unknown chunk type, keeping raw payload");
                LocalChunk::Unknown(chunk.clone())
            }
        };
        Ok(local)
    }

    /// Encodes back into a raw chunk.
    pub fn to_chunk(&self) -> AiffResult<Chunk> {
        let data = match self {
            LocalChunk::Common(common) => common.encode()?,
            LocalChunk::SoundData(sound) => sound.encode()?,
            LocalChunk::Markers(markers) => Marker::encode_all(markers)?,
            LocalChunk::Comment(comment) => comment.encode()?,
            LocalChunk::Instrument(inst) => inst.encode()?,
            LocalChunk::Name(text)
            | LocalChunk::Author(text)
            | LocalChunk::Copyright(text)
            | LocalChunk::Annotation(text) => encode_text(text)?,
            LocalChunk::Application(appl) => appl.encode()?,
            LocalChunk::FormatVersion(timestamp) => format_version_schema().encode(
                &Record::new().with("timestamp", *timestamp),
                &Context::new(),
            )?,
            LocalChunk::Unknown(chunk) => return Ok(chunk.clone()),
        };
        Ok(Chunk::new(self.id(), data))
    }
}

fn decode_text(data: &[u8]) -> AiffResult<String> {
    let ctx = Context::new().with(DATA_SIZE, data.len());
    let (record, _) = text_schema().decode(data, 0, &ctx)?;
    Ok(record.text("text")?.to_string())
}

fn encode_text(text: &str) -> AiffResult<Vec<u8>> {
    let ctx = Context::new().with(DATA_SIZE, text.len());
    let record = Record::new().with("text", text);
    Ok(text_schema().encode(&record, &ctx)?)
}
