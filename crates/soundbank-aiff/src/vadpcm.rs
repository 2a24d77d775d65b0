//! VADPCM codebook and loop records carried in AIFF-C application chunks.
//!
//! The compressed sample format stores its predictor codebook and loop
//! start states in `APPL` chunks signed `stoc`. The payload starts with a
//! Pascal string naming the record, followed by the record itself.

use std::sync::OnceLock;

use soundbank_struct::{
    Context, Endian, Field, FieldCodec, Len, Record, Schema, StructResult, Value,
};

use crate::chunk::ChunkId;
use crate::error::{AiffError, AiffResult};
use crate::records::{Application, Compression};
use crate::schemas::{PString, PSTRING};

/// Application signature of VADPCM records.
pub const STOC: ChunkId = ChunkId::from_bytes(*b"stoc");
/// Compression type of VADPCM AIFF-C files.
pub const VADPCM_COMPRESSION: ChunkId = ChunkId::from_bytes(*b"VAPC");
/// Compression name of VADPCM AIFF-C files.
pub const VADPCM_COMPRESSION_NAME: &str = "VADPCM ~4-1";
/// Record name of the predictor codebook.
pub const CODES_NAME: &str = "VADPCMCODES";
/// Record name of the loop list.
pub const LOOPS_NAME: &str = "VADPCMLOOPS";
/// Record version written by this crate.
pub const VADPCM_VERSION: u16 = 1;
/// Samples decoded from each 9-byte VADPCM frame.
pub const FRAME_SAMPLES: usize = 16;
/// Bytes in one VADPCM frame.
pub const FRAME_BYTES: usize = 9;

/// Compression descriptor for VADPCM.
pub fn vadpcm_compression() -> Compression {
    Compression {
        kind: VADPCM_COMPRESSION,
        name: VADPCM_COMPRESSION_NAME.to_string(),
    }
}

fn coefficient_count(record: &Record, _ctx: &Context) -> StructResult<usize> {
    Ok(record.usize("order")? * record.usize("npredictors")? * 8)
}

fn loop_count(record: &Record, _ctx: &Context) -> StructResult<usize> {
    record.usize("nloops")
}

fn codebook_schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        Schema::builder("VADPCMCodes", Endian::Big)
            .field(Field::uint("version", 2))
            .field(Field::int("order", 2))
            .field(Field::int("npredictors", 2))
            .field(Field::int("coefficients", 2).array(Len::Computed(coefficient_count)))
            .build()
    })
}

/// A loop with its 16-sample decoder state, 44 bytes. The bank metadata
/// table stores loops in the same layout.
pub fn vadpcm_loop_schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        Schema::builder("VADPCMLoop", Endian::Big)
            .field(Field::uint("start", 4))
            .field(Field::uint("end", 4))
            .field(Field::uint("count", 4))
            .field(Field::int("state", 2).array(16usize))
            .build()
    })
}

fn loops_schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        Schema::builder("VADPCMLoops", Endian::Big)
            .field(Field::uint("version", 2))
            .field(Field::int("nloops", 2))
            .field(Field::nested("loops", vadpcm_loop_schema()).array(Len::Computed(loop_count)))
            .build()
    })
}

/// Predictor codebook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VadpcmCodebook {
    pub version: u16,
    /// Predictor order.
    pub order: i16,
    /// Number of predictors.
    pub predictors: i16,
    /// `order * predictors * 8` coefficients.
    pub coefficients: Vec<i16>,
}

/// A loop with the decoder state at its start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VadpcmLoop {
    pub start: u32,
    pub end: u32,
    /// Repeat count; `u32::MAX` loops forever.
    pub count: u32,
    pub state: [i16; 16],
}

/// Loop list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VadpcmLoops {
    pub version: u16,
    pub loops: Vec<VadpcmLoop>,
}

/// A VADPCM application record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VadpcmRecord {
    /// `VADPCMCODES`
    Codebook(VadpcmCodebook),
    /// `VADPCMLOOPS`
    Loops(VadpcmLoops),
}

/// Reads an array of 16-bit signed values.
pub(crate) fn i16_array(record: &Record, name: &str) -> StructResult<Vec<i16>> {
    record
        .array(name)?
        .iter()
        .map(|v| {
            v.as_i64()
                .map(|n| n as i16)
                .ok_or_else(|| soundbank_struct::StructError::WrongValue {
                    field: name.to_string(),
                    expected: "16-bit integers",
                })
        })
        .collect()
}

impl VadpcmLoop {
    /// Builds a loop from a decoded loop record.
    pub fn from_record(record: &Record) -> AiffResult<Self> {
        let values = i16_array(record, "state")?;
        let mut state = [0i16; 16];
        if values.len() != state.len() {
            return Err(AiffError::application(LOOPS_NAME, "loop state must hold 16 values"));
        }
        state.copy_from_slice(&values);
        Ok(Self {
            start: record.uint("start")? as u32,
            end: record.uint("end")? as u32,
            count: record.uint("count")? as u32,
            state,
        })
    }

    /// Loop as a record.
    pub fn to_record(&self) -> Record {
        Record::new()
            .with("start", self.start)
            .with("end", self.end)
            .with("count", self.count)
            .with("state", Value::array_of(self.state))
    }
}

impl VadpcmCodebook {
    /// Builds a codebook from a record with `order`, `npredictors` and
    /// `coefficients` (or `book`) fields.
    pub fn from_record(record: &Record, coefficients: &str) -> AiffResult<Self> {
        let version = record
            .get("version")
            .and_then(Value::as_u64)
            .unwrap_or(VADPCM_VERSION as u64);
        Ok(Self {
            version: version as u16,
            order: record.int("order")? as i16,
            predictors: record.int("npredictors")? as i16,
            coefficients: i16_array(record, coefficients)?,
        })
    }
}

impl VadpcmRecord {
    /// Record name written before the payload.
    pub fn name(&self) -> &'static str {
        match self {
            VadpcmRecord::Codebook(_) => CODES_NAME,
            VadpcmRecord::Loops(_) => LOOPS_NAME,
        }
    }

    /// Decodes an application chunk. Returns `None` for chunks of other
    /// applications or record names.
    pub fn from_application(appl: &Application) -> AiffResult<Option<Self>> {
        if appl.signature != STOC {
            return Ok(None);
        }
        let ctx = Context::new();
        let (name, offset) = PSTRING.decode(&appl.data, 0, &ctx)?;
        let name = name.as_text().unwrap_or_default();
        let record = match name {
            CODES_NAME => {
                let (record, _) = codebook_schema().decode(&appl.data, offset, &ctx)?;
                VadpcmRecord::Codebook(VadpcmCodebook::from_record(&record, "coefficients")?)
            }
            LOOPS_NAME => {
                let (record, _) = loops_schema().decode(&appl.data, offset, &ctx)?;
                let loops = record
                    .array("loops")?
                    .iter()
                    .map(|v| {
                        v.as_record()
                            .ok_or_else(|| {
                                AiffError::application(LOOPS_NAME, "loop is not a record")
                            })
                            .and_then(VadpcmLoop::from_record)
                    })
                    .collect::<AiffResult<Vec<_>>>()?;
                VadpcmRecord::Loops(VadpcmLoops {
                    version: record.uint("version")? as u16,
                    loops,
                })
            }
            other => {
                tracing::warn!(name = other, "unknown stoc application record");
                return Ok(None);
            }
        };
        Ok(Some(record))
    }

    /// Encodes into an application chunk.
    pub fn to_application(&self) -> AiffResult<Application> {
        let ctx = Context::new();
        let mut data = PString::to_bytes(self.name())?;
        let body = match self {
            VadpcmRecord::Codebook(book) => {
                let expected = book.order.max(0) as usize * book.predictors.max(0) as usize * 8;
                if book.coefficients.len() != expected {
                    return Err(AiffError::application(
                        CODES_NAME,
                        format!(
                            "{} coefficients for order {} with {} predictors",
                            book.coefficients.len(),
                            book.order,
                            book.predictors
                        ),
                    ));
                }
                let record = Record::new()
                    .with("version", book.version)
                    .with("order", book.order)
                    .with("npredictors", book.predictors)
                    .with("coefficients", Value::array_of(book.coefficients.iter().copied()));
                codebook_schema().encode(&record, &ctx)?
            }
            VadpcmRecord::Loops(loops) => {
                let record = Record::new()
                    .with("version", loops.version)
                    .with("nloops", loops.loops.len() as i64)
                    .with(
                        "loops",
                        loops
                            .loops
                            .iter()
                            .map(|l| Value::Record(l.to_record()))
                            .collect::<Vec<_>>(),
                    );
                loops_schema().encode(&record, &ctx)?
            }
        };
        data.extend_from_slice(&body);
        Ok(Application {
            signature: STOC,
            data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn codebook() -> VadpcmCodebook {
        VadpcmCodebook {
            version: 1,
            order: 2,
            predictors: 1,
            coefficients: (0..16).map(|i| i * 100 - 800).collect(),
        }
    }

    #[test]
    fn test_codebook_layout() {
        let appl = VadpcmRecord::Codebook(codebook()).to_application().unwrap();
        assert_eq!(appl.signature, STOC);
        assert_eq!(&appl.data[0..12], b"\x0bVADPCMCODES");
        // version, order, npredictors, then 16 coefficients
        assert_eq!(&appl.data[12..18], &[0, 1, 0, 2, 0, 1]);
        assert_eq!(appl.data.len(), 12 + 6 + 32);

        let decoded = VadpcmRecord::from_application(&appl).unwrap();
        assert_eq!(decoded, Some(VadpcmRecord::Codebook(codebook())));
    }

    #[test]
    fn test_loops_round_trip() {
        let mut state = [0i16; 16];
        state[0] = -3;
        state[15] = 1200;
        let loops = VadpcmRecord::Loops(VadpcmLoops {
            version: 1,
            loops: vec![VadpcmLoop {
                start: 128,
                end: 4096,
                count: u32::MAX,
                state,
            }],
        });
        let appl = loops.to_application().unwrap();
        assert_eq!(appl.data.len(), 12 + 4 + 44);
        assert_eq!(VadpcmRecord::from_application(&appl).unwrap(), Some(loops));
    }

    #[test]
    fn test_bad_coefficient_count() {
        let mut book = codebook();
        book.coefficients.pop();
        assert!(VadpcmRecord::Codebook(book).to_application().is_err());
    }

    #[test]
    fn test_other_application_ignored() {
        let appl = Application {
            signature: ChunkId::from_bytes(*b"pdos"),
            data: vec![0; 8],
        };
        assert_eq!(VadpcmRecord::from_application(&appl).unwrap(), None);
    }
}
