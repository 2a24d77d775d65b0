//! End-to-end tests for the sound-bank toolchain.
//!
//! The tests link object graphs into banks, decompile them, relink the
//! result and compare bytes; they also cover the sample container scenarios
//! and the conversion helpers.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p soundbank-tests
//! ```

pub mod determinism;
pub mod fixtures;

pub use determinism::{assert_bytes_identical, first_difference, verify_determinism, DiffInfo};
pub use fixtures::{
    codebook, looped_aiff, ramp_aiff, read_u32, vadpcm_aifc, DemoBank, SampleDirFixture,
};
