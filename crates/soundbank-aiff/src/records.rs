//! Typed AIFF records.
//!
//! Each record converts to and from the chunk payload through its schema in
//! [`crate::schemas`].

use soundbank_struct::{Context, Record, StructError, Value};

use crate::aiff::FormType;
use crate::chunk::ChunkId;
use crate::error::{AiffError, AiffResult};
use crate::extended::{from_extended, to_extended};
use crate::schemas::{
    aifc_common_schema, application_schema, comment_schema, common_schema, instrument_schema,
    marker_chunk_schema, sound_data_schema, APPLICATION_HEADER_SIZE,
    DATA_SIZE, SOUND_DATA_HEADER_SIZE, SOUND_DATA_SIZE,
};

/// Compression type and name of an AIFF-C file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compression {
    /// Compression type code, e.g. `VAPC`.
    pub kind: ChunkId,
    /// Human-readable name.
    pub name: String,
}

impl Compression {
    /// Uncompressed AIFF-C audio.
    pub fn none() -> Self {
        Self {
            kind: ChunkId::from_bytes(*b"NONE"),
            name: "not compressed".to_string(),
        }
    }
}

/// `COMM`: common audio parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Common {
    /// Number of interleaved channels.
    pub num_channels: i16,
    /// Sample frames (samples per channel).
    pub num_sample_frames: u32,
    /// Bits per sample.
    pub sample_size: i16,
    /// Sample rate as stored, in 80-bit extended format.
    pub sample_rate_bytes: [u8; 10],
    /// Present in AIFF-C files only.
    pub compression: Option<Compression>,
}

impl Common {
    /// Creates common parameters from a sample rate in Hz.
    pub fn new(
        num_channels: i16,
        num_sample_frames: u32,
        sample_size: i16,
        sample_rate: f64,
        compression: Option<Compression>,
    ) -> Self {
        Self {
            num_channels,
            num_sample_frames,
            sample_size,
            sample_rate_bytes: to_extended(sample_rate),
            compression,
        }
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> f64 {
        from_extended(&self.sample_rate_bytes)
    }

    /// Decodes a `COMM` payload; the layout depends on the form type.
    pub fn decode(data: &[u8], form: FormType) -> AiffResult<Self> {
        let schema = match form {
            FormType::Aiff => common_schema(),
            FormType::Aifc => aifc_common_schema(),
        };
        let (record, _) = schema.decode(data, 0, &Context::new())?;

        let mut sample_rate_bytes = [0u8; 10];
        sample_rate_bytes.copy_from_slice(record.bytes("sampleRate")?);

        let compression = match form {
            FormType::Aiff => None,
            FormType::Aifc => Some(Compression {
                kind: chunk_id(record.bytes("compressionType")?)?,
                name: record.text("compressionName")?.to_string(),
            }),
        };

        Ok(Self {
            num_channels: record.int("numChannels")? as i16,
            num_sample_frames: record.uint("numSampleFrames")? as u32,
            sample_size: record.int("sampleSize")? as i16,
            sample_rate_bytes,
            compression,
        })
    }

    /// Encodes a `COMM` payload in the AIFF-C layout when compression is set.
    pub fn encode(&self) -> AiffResult<Vec<u8>> {
        let mut record = Record::new()
            .with("numChannels", self.num_channels)
            .with("numSampleFrames", self.num_sample_frames)
            .with("sampleSize", self.sample_size)
            .with("sampleRate", self.sample_rate_bytes.to_vec());
        let schema = match &self.compression {
            Some(compression) => {
                record.insert("compressionType", compression.kind.as_bytes().to_vec());
                record.insert("compressionName", compression.name.as_str());
                aifc_common_schema()
            }
            None => common_schema(),
        };
        Ok(schema.encode(&record, &Context::new())?)
    }
}

/// `SSND`: sample data.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SoundData {
    /// Offset of the first sample frame within `data`.
    pub offset: u32,
    /// Block alignment size.
    pub block_size: u32,
    /// Raw sample bytes.
    pub data: Vec<u8>,
}

impl SoundData {
    /// Sample data with zero offset and block size.
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            offset: 0,
            block_size: 0,
            data,
        }
    }

    /// Decodes an `SSND` payload; the sample bytes run to the end of the chunk.
    pub fn decode(data: &[u8]) -> AiffResult<Self> {
        let ctx = Context::new().with(
            SOUND_DATA_SIZE,
            data.len().saturating_sub(SOUND_DATA_HEADER_SIZE),
        );
        let (record, _) = sound_data_schema().decode(data, 0, &ctx)?;
        Ok(Self {
            offset: record.uint("offset")? as u32,
            block_size: record.uint("blockSize")? as u32,
            data: record.bytes("soundData")?.to_vec(),
        })
    }

    /// Encodes an `SSND` payload.
    pub fn encode(&self) -> AiffResult<Vec<u8>> {
        let record = Record::new()
            .with("offset", self.offset)
            .with("blockSize", self.block_size)
            .with("soundData", self.data.clone());
        let ctx = Context::new().with(SOUND_DATA_SIZE, self.data.len());
        Ok(sound_data_schema().encode(&record, &ctx)?)
    }
}

/// A named position in the sample data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    /// Marker id, referenced by loops; must be positive.
    pub id: i16,
    /// Sample frame number.
    pub position: u32,
    /// Marker name.
    pub name: String,
}

impl Marker {
    fn from_record(record: &Record) -> AiffResult<Self> {
        Ok(Self {
            id: record.int("id")? as i16,
            position: record.uint("position")? as u32,
            name: record.text("markerName")?.to_string(),
        })
    }

    fn to_record(&self) -> Record {
        Record::new()
            .with("id", self.id)
            .with("position", self.position)
            .with("markerName", self.name.as_str())
    }

    /// Decodes a `MARK` payload.
    pub fn decode_all(data: &[u8]) -> AiffResult<Vec<Marker>> {
        let (record, _) = marker_chunk_schema().decode(data, 0, &Context::new())?;
        record
            .array("markers")?
            .iter()
            .map(|value| {
                let marker = value.as_record().ok_or_else(|| StructError::WrongValue {
                    field: "markers".to_string(),
                    expected: "a marker record",
                })?;
                Marker::from_record(marker)
            })
            .collect()
    }

    /// Encodes a `MARK` payload.
    pub fn encode_all(markers: &[Marker]) -> AiffResult<Vec<u8>> {
        let record = Record::new()
            .with("numMarkers", markers.len() as u64)
            .with(
                "markers",
                markers
                    .iter()
                    .map(|m| Value::Record(m.to_record()))
                    .collect::<Vec<_>>(),
            );
        Ok(marker_chunk_schema().encode(&record, &Context::new())?)
    }
}

/// `COMT`: a comment attached to a marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    /// Creation time, seconds since 1904.
    pub time_stamp: u32,
    /// Marker the comment refers to, or 0.
    pub marker: i16,
    /// Comment text.
    pub text: String,
}

impl Comment {
    /// Decodes a `COMT` payload.
    pub fn decode(data: &[u8]) -> AiffResult<Self> {
        let (record, _) = comment_schema().decode(data, 0, &Context::new())?;
        Ok(Self {
            time_stamp: record.uint("timeStamp")? as u32,
            marker: record.int("marker")? as i16,
            text: record.text("text")?.to_string(),
        })
    }

    /// Encodes a `COMT` payload.
    pub fn encode(&self) -> AiffResult<Vec<u8>> {
        let record = Record::new()
            .with("timeStamp", self.time_stamp)
            .with("marker", self.marker)
            .with("count", self.text.len() as u64)
            .with("text", self.text.as_str());
        Ok(comment_schema().encode(&record, &Context::new())?)
    }
}

/// How a loop plays back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayMode {
    /// No looping.
    NoLooping,
    /// Loop from begin to end.
    Forward,
    /// Alternate forward and backward.
    ForwardBackward,
}

impl PlayMode {
    /// Raw value stored in the file.
    pub fn raw(self) -> i16 {
        match self {
            PlayMode::NoLooping => 0,
            PlayMode::Forward => 1,
            PlayMode::ForwardBackward => 2,
        }
    }
}

impl TryFrom<i16> for PlayMode {
    type Error = AiffError;

    fn try_from(mode: i16) -> AiffResult<Self> {
        match mode {
            0 => Ok(PlayMode::NoLooping),
            1 => Ok(PlayMode::Forward),
            2 => Ok(PlayMode::ForwardBackward),
            mode => Err(AiffError::InvalidPlayMode { mode }),
        }
    }
}

/// A loop between two markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Loop {
    /// Raw play mode, see [`PlayMode`].
    pub play_mode: i16,
    /// Marker id of the loop start.
    pub begin_loop: i16,
    /// Marker id of the loop end.
    pub end_loop: i16,
}

impl Loop {
    /// Forward loop between two markers.
    pub fn forward(begin_loop: i16, end_loop: i16) -> Self {
        Self {
            play_mode: PlayMode::Forward.raw(),
            begin_loop,
            end_loop,
        }
    }

    /// Decoded play mode.
    pub fn mode(&self) -> AiffResult<PlayMode> {
        PlayMode::try_from(self.play_mode)
    }

    fn from_record(record: &Record) -> AiffResult<Self> {
        Ok(Self {
            play_mode: record.int("playMode")? as i16,
            begin_loop: record.int("beginLoop")? as i16,
            end_loop: record.int("endLoop")? as i16,
        })
    }

    fn to_record(self) -> Record {
        Record::new()
            .with("playMode", self.play_mode)
            .with("beginLoop", self.begin_loop)
            .with("endLoop", self.end_loop)
    }
}

/// `INST`: playback parameters and loops.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Instrument {
    pub base_note: i8,
    pub detune: i8,
    pub low_note: i8,
    pub high_note: i8,
    pub low_velocity: i8,
    pub high_velocity: i8,
    /// Gain in decibels.
    pub gain: i16,
    pub sustain_loop: Loop,
    pub release_loop: Loop,
}

impl Instrument {
    /// Decodes an `INST` payload.
    pub fn decode(data: &[u8]) -> AiffResult<Self> {
        let (record, _) = instrument_schema().decode(data, 0, &Context::new())?;
        Ok(Self {
            base_note: record.int("baseNote")? as i8,
            detune: record.int("detune")? as i8,
            low_note: record.int("lowNote")? as i8,
            high_note: record.int("highNote")? as i8,
            low_velocity: record.int("lowVelocity")? as i8,
            high_velocity: record.int("highVelocity")? as i8,
            gain: record.int("gain")? as i16,
            sustain_loop: Loop::from_record(record.record("sustainLoop")?)?,
            release_loop: Loop::from_record(record.record("releaseLoop")?)?,
        })
    }

    /// Encodes an `INST` payload.
    pub fn encode(&self) -> AiffResult<Vec<u8>> {
        let record = Record::new()
            .with("baseNote", self.base_note)
            .with("detune", self.detune)
            .with("lowNote", self.low_note)
            .with("highNote", self.high_note)
            .with("lowVelocity", self.low_velocity)
            .with("highVelocity", self.high_velocity)
            .with("gain", self.gain)
            .with("sustainLoop", self.sustain_loop.to_record())
            .with("releaseLoop", self.release_loop.to_record());
        Ok(instrument_schema().encode(&record, &Context::new())?)
    }
}

/// `APPL`: application-specific data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Application {
    /// Application signature, e.g. `stoc`.
    pub signature: ChunkId,
    /// Opaque payload.
    pub data: Vec<u8>,
}

impl Application {
    /// Decodes an `APPL` payload.
    pub fn decode(data: &[u8]) -> AiffResult<Self> {
        let ctx = Context::new().with(
            DATA_SIZE,
            data.len().saturating_sub(APPLICATION_HEADER_SIZE),
        );
        let (record, _) = application_schema().decode(data, 0, &ctx)?;
        Ok(Self {
            signature: chunk_id(record.bytes("applicationSignature")?)?,
            data: record.bytes("data")?.to_vec(),
        })
    }

    /// Encodes an `APPL` payload.
    pub fn encode(&self) -> AiffResult<Vec<u8>> {
        let record = Record::new()
            .with("applicationSignature", self.signature.as_bytes().to_vec())
            .with("data", self.data.clone());
        let ctx = Context::new().with(DATA_SIZE, self.data.len());
        Ok(application_schema().encode(&record, &ctx)?)
    }
}

fn chunk_id(bytes: &[u8]) -> AiffResult<ChunkId> {
    let raw: [u8; 4] = bytes.try_into().map_err(|_| AiffError::InvalidChunkId {
        id: String::from_utf8_lossy(bytes).into_owned(),
    })?;
    Ok(ChunkId::from_bytes(raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_aifc_common_round_trip() {
        let common = Common::new(
            1,
            1600,
            16,
            22050.0,
            Some(Compression {
                kind: ChunkId::from_bytes(*b"VAPC"),
                name: "VADPCM ~4-1".to_string(),
            }),
        );
        let bytes = common.encode().unwrap();
        // 18 fixed + 4 type + 12 byte pstring
        assert_eq!(bytes.len(), 34);
        let decoded = Common::decode(&bytes, FormType::Aifc).unwrap();
        assert_eq!(decoded, common);
        assert_eq!(decoded.sample_rate(), 22050.0);
    }

    #[test]
    fn test_instrument_loops() {
        let inst = Instrument {
            base_note: 60,
            high_note: 127,
            high_velocity: 127,
            sustain_loop: Loop::forward(1, 2),
            ..Default::default()
        };
        let bytes = inst.encode().unwrap();
        assert_eq!(bytes.len(), 20);
        let decoded = Instrument::decode(&bytes).unwrap();
        assert_eq!(decoded, inst);
        assert_eq!(decoded.sustain_loop.mode().unwrap(), PlayMode::Forward);
        assert_eq!(decoded.release_loop.mode().unwrap(), PlayMode::NoLooping);
    }

    #[test]
    fn test_invalid_play_mode() {
        let looped = Loop {
            play_mode: 7,
            ..Default::default()
        };
        assert!(matches!(
            looped.mode(),
            Err(AiffError::InvalidPlayMode { mode: 7 })
        ));
    }

    #[test]
    fn test_comment_round_trip() {
        let comment = Comment {
            time_stamp: 0xDEAD,
            marker: 1,
            text: "loop point".to_string(),
        };
        let bytes = comment.encode().unwrap();
        assert_eq!(Comment::decode(&bytes).unwrap(), comment);
    }

    #[test]
    fn test_application_data_runs_to_end() {
        let appl = Application {
            signature: ChunkId::from_bytes(*b"stoc"),
            data: vec![1, 2, 3, 4, 5],
        };
        let bytes = appl.encode().unwrap();
        assert_eq!(&bytes[0..4], b"stoc");
        assert_eq!(Application::decode(&bytes).unwrap(), appl);
    }
}
