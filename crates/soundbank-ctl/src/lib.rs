//! Sound-bank linking and decompiling for `.ctl`/`.tbl` bank files.
//!
//! A bank is described symbolically as named objects ([`Bank`],
//! [`Instrument`], [`Sound`], [`Keymap`], [`Envelope`], [`Wavetable`]) that
//! refer to one another by name. [`BankBuilder`] links them into two tables:
//!
//! - the metadata table (`.ctl`): a header listing the banks, then big-endian
//!   records in which every reference is a byte offset from the table start
//! - the sample table (`.tbl`): sample data loaded through a [`SampleSource`]
//!
//! [`decompile`] goes the other way, recovering objects and regenerating an
//! AIFF or AIFF-C file for every wavetable. [`SequenceBank`] reads and writes
//! the companion sequence bank format.
//!
//! # Example
//!
//! ```no_run
//! use soundbank_ctl::{
//!     Bank, BankBuilder, DirSampleSource, Envelope, Instrument, Keymap, LinkerConfig, Sound,
//! };
//!
//! # fn main() -> soundbank_ctl::BankResult<()> {
//! let mut builder = BankBuilder::new(LinkerConfig::default(), DirSampleSource::new("samples"))?;
//! builder.insert(Envelope::new("env"))?;
//! builder.insert(Keymap::new("keys"))?;
//! builder.insert(Sound::new("piano_c4", "piano_c4.aifc", "keys", "env"))?;
//! builder.insert(Instrument::new("piano", vec!["piano_c4".to_string()]))?;
//! let mut bank = Bank::new("main");
//! bank.instruments.push(Some("piano".to_string()));
//! builder.insert(bank)?;
//!
//! let binary = builder.build()?;
//! binary.write_files("out/main")?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod decompile;
pub mod error;
pub mod layout;
pub mod linker;
pub mod model;
pub mod seqbank;
pub mod source;
pub mod table;

pub use config::{LinkerConfig, BANK_REVISION, DEFAULT_ALIGNMENT};
pub use decompile::{decompile, DecompiledBank};
pub use error::{BankError, BankResult};
pub use linker::{BankBinary, BankBuilder};
pub use model::{
    objects_from_json, objects_to_json, Bank, BankObject, Envelope, Instrument, Keymap,
    ObjectKind, Sound, Wavetable, DEFAULT_SAMPLE_RATE,
};
pub use seqbank::{SequenceBank, SEQUENCE_REVISION};
pub use source::{DirSampleSource, MemorySampleSource, SampleSource};
pub use table::Table;
