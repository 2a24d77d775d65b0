//! AIFF and AIFF-C files.

use crate::chunk::{read_chunks, Chunk, ChunkId};
use crate::error::{AiffError, AiffResult};
use crate::local::{LocalChunk, AIFC_VERSION_1};
use crate::records::{Application, Common, Compression, Instrument, Marker, SoundData};
use crate::vadpcm::{
    VadpcmCodebook, VadpcmLoops, VadpcmRecord, FRAME_BYTES, FRAME_SAMPLES, VADPCM_COMPRESSION,
};

/// `FORM` sub-format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormType {
    /// Uncompressed AIFF.
    Aiff,
    /// AIFF-C, possibly compressed.
    Aifc,
}

impl FormType {
    /// Type code following the `FORM` header.
    pub fn id(self) -> ChunkId {
        match self {
            FormType::Aiff => ChunkId::AIFF,
            FormType::Aifc => ChunkId::AIFC,
        }
    }

    /// Type code as text.
    pub fn as_str(self) -> &'static str {
        match self {
            FormType::Aiff => "AIFF",
            FormType::Aifc => "AIFC",
        }
    }

    /// File extension conventionally used for the form.
    pub fn extension(self) -> &'static str {
        match self {
            FormType::Aiff => "aiff",
            FormType::Aifc => "aifc",
        }
    }

    /// Parses a type code.
    pub fn from_id(id: ChunkId) -> Option<Self> {
        match id {
            ChunkId::AIFF => Some(FormType::Aiff),
            ChunkId::AIFC => Some(FormType::Aifc),
            _ => None,
        }
    }
}

/// Audio parameters for building a file from raw sample data.
#[derive(Debug, Clone, PartialEq)]
pub struct SoundParams {
    pub num_channels: i16,
    /// Bits per sample.
    pub sample_size: i16,
    /// Sample rate in Hz.
    pub sample_rate: f64,
    /// Compression; AIFF-C only.
    pub compression: Option<Compression>,
}

impl SoundParams {
    /// Mono 16-bit PCM.
    pub fn mono16(sample_rate: f64) -> Self {
        Self {
            num_channels: 1,
            sample_size: 16,
            sample_rate,
            compression: None,
        }
    }

    /// Number of sample frames held in `len` bytes of sample data.
    pub fn frames(&self, len: usize) -> u32 {
        let frames = match &self.compression {
            Some(c) if c.kind == VADPCM_COMPRESSION => len / FRAME_BYTES * FRAME_SAMPLES,
            _ => {
                let frame_bytes =
                    self.num_channels.max(0) as usize * (self.sample_size.max(0) as usize / 8);
                if frame_bytes == 0 {
                    0
                } else {
                    len / frame_bytes
                }
            }
        };
        frames as u32
    }
}

/// A parsed AIFF or AIFF-C file.
///
/// Local chunks are kept in file order, including chunks of unknown type, so
/// re-encoding a parsed file reproduces it.
#[derive(Debug, Clone, PartialEq)]
pub struct AiffFile {
    /// Sub-format of the `FORM`.
    pub form: FormType,
    /// Local chunks of the `FORM`, in order.
    pub chunks: Vec<LocalChunk>,
    /// Top-level chunks other than the `FORM`, written after it.
    pub extra: Vec<Chunk>,
}

/// Parses an AIFF or AIFF-C file.
pub fn parse_aiff(buf: &[u8]) -> AiffResult<AiffFile> {
    AiffFile::parse(buf)
}

impl AiffFile {
    /// Parses an AIFF or AIFF-C file.
    pub fn parse(buf: &[u8]) -> AiffResult<Self> {
        let mut top = read_chunks(buf)?;
        let form_index = top
            .iter()
            .position(|c| c.id == ChunkId::FORM)
            .ok_or(AiffError::NotAForm { chunks: top.len() })?;
        let form_chunk = top.remove(form_index);

        let type_bytes: [u8; 4] = form_chunk
            .data
            .get(0..4)
            .and_then(|b| b.try_into().ok())
            .ok_or_else(|| AiffError::UnsupportedFormType {
                form: String::from_utf8_lossy(&form_chunk.data).into_owned(),
            })?;
        let type_id = ChunkId::from_bytes(type_bytes);
        let form = FormType::from_id(type_id).ok_or_else(|| AiffError::UnsupportedFormType {
            form: type_id.to_string(),
        })?;
        tracing::debug!(form = form.as_str(), len = form_chunk.data.len(), "parsing FORM");

        let chunks = read_chunks(&form_chunk.data[4..])?
            .iter()
            .map(|chunk| LocalChunk::decode(chunk, form))
            .collect::<AiffResult<Vec<_>>>()?;

        Ok(Self {
            form,
            chunks,
            extra: top,
        })
    }

    /// Builds a file holding `sound_data`. AIFF-C files get an `FVER` chunk
    /// first; `COMM` and `SSND` follow.
    pub fn pcm(form: FormType, params: SoundParams, sound_data: Vec<u8>) -> Self {
        let mut chunks = Vec::new();
        let compression = match form {
            FormType::Aiff => None,
            FormType::Aifc => {
                chunks.push(LocalChunk::FormatVersion(AIFC_VERSION_1));
                Some(params.compression.clone().unwrap_or_else(Compression::none))
            }
        };
        chunks.push(LocalChunk::Common(Common::new(
            params.num_channels,
            params.frames(sound_data.len()),
            params.sample_size,
            params.sample_rate,
            compression,
        )));
        chunks.push(LocalChunk::SoundData(SoundData::new(sound_data)));
        Self {
            form,
            chunks,
            extra: Vec::new(),
        }
    }

    /// Appends a local chunk.
    pub fn with_chunk(mut self, chunk: LocalChunk) -> Self {
        self.chunks.push(chunk);
        self
    }

    /// Encodes the file.
    pub fn to_bytes(&self) -> AiffResult<Vec<u8>> {
        let mut form_data = self.form.id().as_bytes().to_vec();
        for local in &self.chunks {
            form_data.extend(local.to_chunk()?.to_bytes()?);
        }
        let mut out = Chunk::new(ChunkId::FORM, form_data).to_bytes()?;
        for chunk in &self.extra {
            out.extend(chunk.to_bytes()?);
        }
        Ok(out)
    }

    fn missing(&self, chunk: &'static str) -> AiffError {
        AiffError::MissingChunk {
            form: self.form.as_str(),
            chunk,
        }
    }

    /// Common audio parameters.
    pub fn common(&self) -> AiffResult<&Common> {
        self.chunks
            .iter()
            .find_map(|c| match c {
                LocalChunk::Common(common) => Some(common),
                _ => None,
            })
            .ok_or_else(|| self.missing("COMM"))
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> AiffResult<f64> {
        Ok(self.common()?.sample_rate())
    }

    /// Raw sample bytes.
    pub fn sound_data(&self) -> AiffResult<&[u8]> {
        self.chunks
            .iter()
            .find_map(|c| match c {
                LocalChunk::SoundData(sound) => Some(sound.data.as_slice()),
                _ => None,
            })
            .ok_or_else(|| self.missing("SSND"))
    }

    /// Markers, or an empty slice when the file has no `MARK` chunk.
    pub fn markers(&self) -> &[Marker] {
        self.chunks
            .iter()
            .find_map(|c| match c {
                LocalChunk::Markers(markers) => Some(markers.as_slice()),
                _ => None,
            })
            .unwrap_or_default()
    }

    /// Marker with the given id.
    pub fn marker(&self, id: i16) -> Option<&Marker> {
        self.markers().iter().find(|m| m.id == id)
    }

    /// Instrument chunk, if present.
    pub fn instrument(&self) -> Option<&Instrument> {
        self.chunks.iter().find_map(|c| match c {
            LocalChunk::Instrument(inst) => Some(inst),
            _ => None,
        })
    }

    /// Application chunks in file order.
    pub fn applications(&self) -> impl Iterator<Item = &Application> {
        self.chunks.iter().filter_map(|c| match c {
            LocalChunk::Application(appl) => Some(appl),
            _ => None,
        })
    }

    /// True for VADPCM-compressed AIFF-C files.
    pub fn is_vadpcm(&self) -> bool {
        self.common()
            .ok()
            .and_then(|c| c.compression.as_ref())
            .is_some_and(|c| c.kind == VADPCM_COMPRESSION)
    }

    fn vadpcm_records(&self) -> AiffResult<Vec<VadpcmRecord>> {
        let mut records = Vec::new();
        for appl in self.applications() {
            if let Some(record) = VadpcmRecord::from_application(appl)? {
                records.push(record);
            }
        }
        Ok(records)
    }

    /// VADPCM predictor codebook, if present.
    pub fn vadpcm_codebook(&self) -> AiffResult<Option<VadpcmCodebook>> {
        Ok(self.vadpcm_records()?.into_iter().find_map(|r| match r {
            VadpcmRecord::Codebook(book) => Some(book),
            _ => None,
        }))
    }

    /// VADPCM loop list, if present.
    pub fn vadpcm_loops(&self) -> AiffResult<Option<VadpcmLoops>> {
        Ok(self.vadpcm_records()?.into_iter().find_map(|r| match r {
            VadpcmRecord::Loops(loops) => Some(loops),
            _ => None,
        }))
    }
}
