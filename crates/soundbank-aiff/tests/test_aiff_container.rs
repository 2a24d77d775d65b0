//! Tests for the AIFF container: byte layout of generated files, parsing of
//! hand-assembled files, and the conversion helpers.

use soundbank_aiff::{
    aiff_to_wav, parse_aiff, read_chunks, repair_form_length, to_extended, wav_to_aiff, AiffError,
    AiffFile, Chunk, ChunkId, FormType, LocalChunk, SoundParams,
};

// =============================================================================
// Helper Functions
// =============================================================================

/// Assembles a chunk by hand, independent of the codec.
fn raw_chunk(id: &[u8; 4], data: &[u8]) -> Vec<u8> {
    let mut out = id.to_vec();
    out.extend_from_slice(&(data.len() as u32).to_be_bytes());
    out.extend_from_slice(data);
    if data.len() % 2 == 1 {
        out.push(0);
    }
    out
}

fn raw_form(form: &[u8; 4], chunks: &[Vec<u8>]) -> Vec<u8> {
    let mut payload = form.to_vec();
    for chunk in chunks {
        payload.extend_from_slice(chunk);
    }
    raw_chunk(b"FORM", &payload)
}

fn raw_comm(channels: i16, frames: u32, bits: i16, rate: f64) -> Vec<u8> {
    let mut data = channels.to_be_bytes().to_vec();
    data.extend_from_slice(&frames.to_be_bytes());
    data.extend_from_slice(&bits.to_be_bytes());
    data.extend_from_slice(&to_extended(rate));
    raw_chunk(b"COMM", &data)
}

fn raw_ssnd(samples: &[u8]) -> Vec<u8> {
    let mut data = vec![0; 8];
    data.extend_from_slice(samples);
    raw_chunk(b"SSND", &data)
}

// =============================================================================
// Scenario: mono 16-bit silence
// =============================================================================

#[test]
fn test_mono_16bit_silence_round_trip() {
    let n = 100;
    let bytes = AiffFile::pcm(FormType::Aiff, SoundParams::mono16(44100.0), vec![0; 2 * n])
        .to_bytes()
        .unwrap();

    let file = parse_aiff(&bytes).unwrap();
    let common = file.common().unwrap();
    assert_eq!(common.num_channels, 1);
    assert_eq!(common.sample_size, 16);
    assert_eq!(common.num_sample_frames, n as u32);
    assert!((file.sample_rate().unwrap() - 44100.0).abs() < 0.001);
    assert_eq!(file.sound_data().unwrap().len(), 2 * n);
}

#[test]
fn test_every_chunk_consumes_even_length() {
    let bytes = AiffFile::pcm(FormType::Aiff, SoundParams::mono16(8000.0), vec![0; 2])
        .with_chunk(LocalChunk::Name("odd".to_string()))
        .with_chunk(LocalChunk::Author("even".to_string()))
        .to_bytes()
        .unwrap();
    assert_eq!(bytes.len() % 2, 0);

    let form = &read_chunks(&bytes).unwrap()[0];
    let mut pos = 4;
    while pos < form.data.len() {
        let (_, consumed) = Chunk::parse(&form.data, pos).unwrap();
        assert_eq!(consumed % 2, 0);
        pos += consumed;
    }
    assert_eq!(pos, form.data.len());
}

// =============================================================================
// Hand-assembled Input
// =============================================================================

#[test]
fn test_parse_hand_assembled_file() {
    let bytes = raw_form(
        b"AIFF",
        &[
            raw_chunk(b"ANNO", b"made by hand"),
            raw_comm(2, 2, 8, 11025.0),
            raw_ssnd(&[1, 2, 3, 4]),
        ],
    );
    let file = parse_aiff(&bytes).unwrap();
    assert_eq!(file.form, FormType::Aiff);
    assert_eq!(file.chunks.len(), 3);
    assert_eq!(file.chunks[0], LocalChunk::Annotation("made by hand".to_string()));
    assert_eq!(file.common().unwrap().num_channels, 2);
    assert_eq!(file.sample_rate().unwrap(), 11025.0);
    assert_eq!(file.sound_data().unwrap(), &[1, 2, 3, 4]);

    // Re-encoding keeps chunk order and bytes.
    assert_eq!(file.to_bytes().unwrap(), bytes);
}

#[test]
fn test_unknown_chunk_survives_round_trip() {
    let bytes = raw_form(
        b"AIFF",
        &[
            raw_comm(1, 1, 16, 22050.0),
            raw_chunk(b"XTRA", &[9, 8, 7]),
            raw_ssnd(&[0, 0]),
        ],
    );
    let file = parse_aiff(&bytes).unwrap();
    assert_eq!(file.chunks[1].id(), ChunkId::new("XTRA").unwrap());
    assert_eq!(file.to_bytes().unwrap(), bytes);
}

#[test]
fn test_truncated_ssnd_fails() {
    let mut bytes = raw_form(b"AIFF", &[raw_comm(1, 4, 16, 8000.0), raw_ssnd(&[0; 8])]);
    bytes.truncate(bytes.len() - 4);
    assert!(matches!(parse_aiff(&bytes), Err(AiffError::Struct(_))));
}

// =============================================================================
// Repair and Conversion
// =============================================================================

#[test]
fn test_repair_then_parse() {
    let good = raw_form(b"AIFF", &[raw_comm(1, 1, 16, 8000.0), raw_ssnd(&[0, 0])]);
    let mut bad = good.clone();
    bad[4..8].copy_from_slice(&8u32.to_be_bytes());
    assert!(parse_aiff(&bad).is_err());

    let fixed = repair_form_length(&bad).expect("length should be repaired");
    assert_eq!(fixed, good);
    assert!(parse_aiff(&fixed).is_ok());
}

#[test]
fn test_wav_aiff_wav_preserves_samples() {
    let aiff = raw_form(
        b"AIFF",
        &[raw_comm(1, 3, 16, 32000.0), raw_ssnd(&[0x12, 0x34, 0x80, 0x00, 0x7f, 0xff])],
    );
    let wav = aiff_to_wav(&aiff).unwrap();
    assert_eq!(&wav[0..4], b"RIFF");

    let back = parse_aiff(&wav_to_aiff(&wav).unwrap()).unwrap();
    assert_eq!(back.sound_data().unwrap(), &[0x12, 0x34, 0x80, 0x00, 0x7f, 0xff]);
    assert_eq!(back.sample_rate().unwrap(), 32000.0);

    let canonical = back.to_bytes().unwrap();
    let again = wav_to_aiff(&aiff_to_wav(&canonical).unwrap()).unwrap();
    assert_eq!(again, canonical);
}
