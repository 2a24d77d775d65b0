//! The IFF chunk envelope: 4-byte tag, 32-bit length, even-padded payload.

use std::fmt;
use std::sync::OnceLock;

use soundbank_struct::{Context, Endian, Field, Len, Record, Schema, StructResult};

use crate::error::{AiffError, AiffResult};

/// A four-character chunk or type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkId([u8; 4]);

impl ChunkId {
    pub const FORM: ChunkId = ChunkId(*b"FORM");
    pub const AIFF: ChunkId = ChunkId(*b"AIFF");
    pub const AIFC: ChunkId = ChunkId(*b"AIFC");
    pub const COMM: ChunkId = ChunkId(*b"COMM");
    pub const SSND: ChunkId = ChunkId(*b"SSND");
    pub const MARK: ChunkId = ChunkId(*b"MARK");
    pub const COMT: ChunkId = ChunkId(*b"COMT");
    pub const INST: ChunkId = ChunkId(*b"INST");
    pub const NAME: ChunkId = ChunkId(*b"NAME");
    pub const AUTH: ChunkId = ChunkId(*b"AUTH");
    pub const COPYRIGHT: ChunkId = ChunkId(*b"(c) ");
    pub const ANNO: ChunkId = ChunkId(*b"ANNO");
    pub const APPL: ChunkId = ChunkId(*b"APPL");
    pub const FVER: ChunkId = ChunkId(*b"FVER");

    /// Creates a code from its raw bytes.
    pub const fn from_bytes(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }

    /// Creates a code from a 4-byte string.
    pub fn new(id: &str) -> AiffResult<Self> {
        let bytes: [u8; 4] = id
            .as_bytes()
            .try_into()
            .map_err(|_| AiffError::InvalidChunkId { id: id.to_string() })?;
        Ok(Self(bytes))
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }

    /// The code as text; non-UTF-8 codes render lossily.
    pub fn as_str(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.0)
    }
}

impl fmt::Display for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

fn chunk_data_size(record: &Record, _ctx: &Context) -> StructResult<usize> {
    record.usize("ckSize")
}

/// Schema of the chunk envelope.
pub fn chunk_schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        Schema::builder("AIFFChunk", Endian::Big)
            .field(Field::bytes("ckID", 4usize))
            .field(Field::uint("ckSize", 4))
            .field(Field::bytes("chunkData", Len::Computed(chunk_data_size)).align(2))
            .build()
    })
}

/// A raw chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Chunk tag.
    pub id: ChunkId,
    /// Payload, without the pad byte.
    pub data: Vec<u8>,
}

impl Chunk {
    /// Creates a chunk.
    pub fn new(id: ChunkId, data: Vec<u8>) -> Self {
        Self { id, data }
    }

    /// Decodes one chunk at `offset`, returning it with the bytes consumed
    /// (always even).
    pub fn parse(buf: &[u8], offset: usize) -> AiffResult<(Chunk, usize)> {
        let (record, consumed) = chunk_schema().decode(buf, offset, &Context::new())?;
        let id = record.bytes("ckID")?;
        let id_bytes: [u8; 4] = id.try_into().map_err(|_| AiffError::InvalidChunkId {
            id: String::from_utf8_lossy(id).into_owned(),
        })?;
        let chunk = Chunk {
            id: ChunkId(id_bytes),
            data: record.bytes("chunkData")?.to_vec(),
        };
        if chunk.data.is_empty() {
            tracing::warn!(id = %chunk.id, offset, "zero-length chunk");
        }
        tracing::trace!(id = %chunk.id, offset, len = chunk.data.len(), "read chunk");
        Ok((chunk, consumed))
    }

    /// Encodes the chunk, padding the payload to an even length.
    pub fn to_bytes(&self) -> AiffResult<Vec<u8>> {
        let record = Record::new()
            .with("ckID", self.id.0.to_vec())
            .with("ckSize", self.data.len() as u64)
            .with("chunkData", self.data.clone());
        Ok(chunk_schema().encode(&record, &Context::new())?)
    }
}

/// Reads a flat sequence of chunks until the buffer is exhausted.
pub fn read_chunks(buf: &[u8]) -> AiffResult<Vec<Chunk>> {
    let mut chunks = Vec::new();
    let mut pos = 0;
    while pos < buf.len() {
        let (chunk, consumed) = Chunk::parse(buf, pos)?;
        chunks.push(chunk);
        pos += consumed;
    }
    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use soundbank_struct::StructError;

    #[test]
    fn test_chunk_padded_to_even() {
        let chunk = Chunk::new(ChunkId::NAME, b"abc".to_vec());
        let bytes = chunk.to_bytes().unwrap();
        assert_eq!(bytes, b"NAME\x00\x00\x00\x03abc\x00".to_vec());

        let (parsed, consumed) = Chunk::parse(&bytes, 0).unwrap();
        assert_eq!(consumed, 12);
        assert_eq!(parsed, chunk);
    }

    #[test]
    fn test_read_chunks_until_exhausted() {
        let mut buf = Chunk::new(ChunkId::ANNO, b"odd".to_vec()).to_bytes().unwrap();
        buf.extend(Chunk::new(ChunkId::AUTH, b"even".to_vec()).to_bytes().unwrap());
        let chunks = read_chunks(&buf).unwrap();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[1].id, ChunkId::AUTH);
        assert_eq!(chunks[1].data, b"even".to_vec());
    }

    #[test]
    fn test_truncated_chunk_underruns() {
        let mut bytes = Chunk::new(ChunkId::SSND, vec![0; 16]).to_bytes().unwrap();
        bytes.truncate(20);
        let err = Chunk::parse(&bytes, 0).unwrap_err();
        assert!(matches!(
            err,
            AiffError::Struct(StructError::BufferUnderrun {
                field: "chunkData",
                ..
            })
        ));
    }

    #[test]
    fn test_chunk_id() {
        assert_eq!(ChunkId::new("(c) ").unwrap(), ChunkId::COPYRIGHT);
        assert!(ChunkId::new("TOOLONG").is_err());
        assert_eq!(ChunkId::COMM.to_string(), "COMM");
    }
}
