//! AIFF and AIFF-C reading and writing.
//!
//! Files are parsed into an [`AiffFile`]: the `FORM` sub-format, its local
//! chunks decoded into typed records ([`LocalChunk`]), and any top-level
//! chunks after the `FORM`. Unknown chunk types are kept as raw bytes, so
//! parsing and re-encoding a file is lossless.
//!
//! Also provided:
//!
//! - the 80-bit extended float used for sample rates ([`extended`])
//! - VADPCM codebook and loop records carried in `APPL` chunks ([`vadpcm`])
//! - conversion to and from PCM WAV ([`aiff_to_wav`], [`wav_to_aiff`])
//! - a pre-parse fix for files with a wrong `FORM` length
//!   ([`repair_form_length`])

pub mod aiff;
pub mod chunk;
pub mod error;
pub mod extended;
pub mod local;
pub mod records;
pub mod repair;
pub mod schemas;
pub mod vadpcm;
pub mod wav;

pub use aiff::{parse_aiff, AiffFile, FormType, SoundParams};
pub use chunk::{read_chunks, Chunk, ChunkId};
pub use error::{AiffError, AiffResult};
pub use extended::{from_extended, to_extended};
pub use local::{LocalChunk, AIFC_VERSION_1};
pub use records::{
    Application, Comment, Common, Compression, Instrument, Loop, Marker, PlayMode, SoundData,
};
pub use repair::{form_length_is_valid, repair_form_length};
pub use vadpcm::{
    vadpcm_compression, vadpcm_loop_schema, VadpcmCodebook, VadpcmLoop, VadpcmLoops,
    VadpcmRecord, VADPCM_COMPRESSION,
};
pub use wav::{aiff_to_wav, wav_to_aiff};
