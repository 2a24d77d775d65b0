use super::*;
use crate::source::MemorySampleSource;
use pretty_assertions::assert_eq;
use soundbank_aiff::{
    vadpcm_compression, ChunkId, FormType, Instrument as InstChunk, LocalChunk, Loop, Marker,
    SoundParams, VadpcmCodebook, VadpcmLoop, VadpcmLoops, VadpcmRecord,
};

// =============================================================================
// Fixtures
// =============================================================================

fn raw_aiff(frames: usize) -> Vec<u8> {
    AiffFile::pcm(FormType::Aiff, SoundParams::mono16(22050.0), vec![0x11; frames * 2])
        .to_bytes()
        .unwrap()
}

fn looped_aiff() -> Vec<u8> {
    let markers = vec![
        Marker {
            id: 1,
            position: 4,
            name: "start".to_string(),
        },
        Marker {
            id: 2,
            position: 12,
            name: "end".to_string(),
        },
    ];
    let inst = InstChunk {
        sustain_loop: Loop::forward(1, 2),
        ..Default::default()
    };
    AiffFile::pcm(FormType::Aiff, SoundParams::mono16(22050.0), vec![0; 32])
        .with_chunk(LocalChunk::Markers(markers))
        .with_chunk(LocalChunk::Instrument(inst))
        .to_bytes()
        .unwrap()
}

fn vadpcm_params() -> SoundParams {
    SoundParams {
        compression: Some(vadpcm_compression()),
        ..SoundParams::mono16(22050.0)
    }
}

fn codebook() -> VadpcmCodebook {
    VadpcmCodebook {
        version: 1,
        order: 2,
        predictors: 1,
        coefficients: (0..16).collect(),
    }
}

fn adpcm_aifc(with_loop: bool) -> Vec<u8> {
    let mut file = AiffFile::pcm(FormType::Aifc, vadpcm_params(), vec![0x22; 18]).with_chunk(
        LocalChunk::Application(VadpcmRecord::Codebook(codebook()).to_application().unwrap()),
    );
    if with_loop {
        let loops = VadpcmLoops {
            version: 1,
            loops: vec![VadpcmLoop {
                start: 0,
                end: 32,
                count: u32::MAX,
                state: [3; 16],
            }],
        };
        file = file.with_chunk(LocalChunk::Application(
            VadpcmRecord::Loops(loops).to_application().unwrap(),
        ));
    }
    file.to_bytes().unwrap()
}

fn builder(source: MemorySampleSource) -> BankBuilder<MemorySampleSource> {
    BankBuilder::new(LinkerConfig::default(), source).unwrap()
}

/// One bank, one instrument, one sound.
fn minimal(builder: &mut BankBuilder<MemorySampleSource>, file: &str) {
    builder.insert(Envelope::new("env")).unwrap();
    builder.insert(Keymap::new("km")).unwrap();
    builder.insert(Sound::new("s1", file, "km", "env")).unwrap();
    builder
        .insert(Instrument::new("lead", vec!["s1".to_string()]))
        .unwrap();
    let mut bank = Bank::new("main");
    bank.instruments.push(Some("lead".to_string()));
    builder.insert(bank).unwrap();
}

fn u32_at(bytes: &[u8], offset: usize) -> u32 {
    u32::from_be_bytes(bytes[offset..offset + 4].try_into().unwrap())
}

// =============================================================================
// Layout
// =============================================================================

#[test]
fn test_minimal_bank_layout() {
    let mut b = builder(MemorySampleSource::new().with("a.aiff", raw_aiff(4)));
    minimal(&mut b, "a.aiff");
    let binary = b.build().unwrap();

    // header 8, envelope 16, keymap 8, wavetable 24, sound 16, instrument 24, bank 16
    assert_eq!(binary.ctl.len(), 112);
    assert_eq!(&binary.ctl[0..8], &[b'B', b'1', 0, 1, 0, 0, 0, 96]);

    // sound record refers to envelope, keymap and wavetable in that order
    assert_eq!(u32_at(&binary.ctl, 56), 8);
    assert_eq!(u32_at(&binary.ctl, 60), 24);
    assert_eq!(u32_at(&binary.ctl, 64), 32);

    // instrument holds the sound; bank holds the instrument
    assert_eq!(u32_at(&binary.ctl, 72 + 16), 56);
    assert_eq!(u32_at(&binary.ctl, 96 + 12), 72);

    assert_eq!(binary.tbl, vec![0x11; 8]);
}

#[test]
fn test_empty_bank_header_only() {
    let mut b = builder(MemorySampleSource::new());
    let binary = b.build().unwrap();
    assert_eq!(binary.ctl, vec![b'B', b'1', 0, 0, 0, 0, 0, 0]);
    assert!(binary.tbl.is_empty());
}

#[test]
fn test_empty_instrument_slots_and_percussion() {
    let mut b = builder(MemorySampleSource::new().with("a.aiff", raw_aiff(4)));
    minimal(&mut b, "a.aiff");
    let mut bank = Bank::new("drums");
    bank.instruments = vec![None, Some("lead".to_string())];
    bank.percussion_default = Some("lead".to_string());
    b.insert(bank).unwrap();

    let lead = b.resolve(ObjectKind::Instrument, "lead").unwrap();
    let binary = b.build().unwrap();
    let second_bank = u32_at(&binary.ctl, 8) as usize;
    // percussion then the two slots
    assert_eq!(u32_at(&binary.ctl, second_bank + 8), lead);
    assert_eq!(u32_at(&binary.ctl, second_bank + 12), 0);
    assert_eq!(u32_at(&binary.ctl, second_bank + 16), lead);
}

// =============================================================================
// Deduplication
// =============================================================================

#[test]
fn test_shared_objects_written_once() {
    let mut b = builder(MemorySampleSource::new().with("a.aiff", raw_aiff(4)));
    minimal(&mut b, "a.aiff");
    b.insert(Sound::new("s2", "a.aiff", "km", "env")).unwrap();
    let inst = Instrument::new("pad", vec!["s1".to_string(), "s2".to_string()]);
    b.insert(inst).unwrap();

    let first = b.resolve(ObjectKind::Sound, "s1").unwrap();
    assert_eq!(b.resolve(ObjectKind::Sound, "s1").unwrap(), first);
    let pad = b.resolve(ObjectKind::Instrument, "pad").unwrap();
    let binary = b.build().unwrap();

    // s2 reuses envelope, keymap and wavetable of s1
    let s2 = u32_at(&binary.ctl, pad as usize + 20) as usize;
    assert_eq!(u32_at(&binary.ctl, s2), u32_at(&binary.ctl, first as usize));
    assert_eq!(u32_at(&binary.ctl, s2 + 8), u32_at(&binary.ctl, first as usize + 8));
    assert_eq!(binary.tbl.len(), 8);
}

#[test]
fn test_wavetables_sharing_a_file_share_samples() {
    let mut b = builder(MemorySampleSource::new().with("a.aiff", raw_aiff(3)));
    b.insert(Wavetable {
        name: "w1".to_string(),
        file: "a.aiff".to_string(),
    })
    .unwrap();
    b.insert(Wavetable {
        name: "w2".to_string(),
        file: "a.aiff".to_string(),
    })
    .unwrap();
    let w1 = b.resolve(ObjectKind::Wavetable, "w1").unwrap();
    let w2 = b.resolve(ObjectKind::Wavetable, "w2").unwrap();
    assert_ne!(w1, w2);

    let binary = b.build().unwrap();
    // six sample bytes padded to eight
    assert_eq!(binary.tbl.len(), 8);
    assert_eq!(u32_at(&binary.ctl, w1 as usize), 0);
    assert_eq!(u32_at(&binary.ctl, w2 as usize), 0);
    assert_eq!(u32_at(&binary.ctl, w2 as usize + 4), 6);
}

#[test]
fn test_sound_synthesizes_wavetable() {
    let mut b = builder(MemorySampleSource::new());
    b.insert(Sound::new("s", "x.aiff", "k", "e")).unwrap();
    assert!(matches!(
        b.get(ObjectKind::Wavetable, "x.aiff"),
        Some(BankObject::Wavetable(w)) if w.file == "x.aiff"
    ));
}

#[test]
fn test_explicit_wavetable_replaces_synthesized() {
    let mut b = builder(MemorySampleSource::new().with("real.aiff", raw_aiff(2)));
    b.insert(Sound::new("s", "x", "k", "e")).unwrap();
    b.insert(Wavetable {
        name: "x".to_string(),
        file: "real.aiff".to_string(),
    })
    .unwrap();
    assert!(matches!(
        b.get(ObjectKind::Wavetable, "x"),
        Some(BankObject::Wavetable(w)) if w.file == "real.aiff"
    ));
    assert!(matches!(
        b.insert(Wavetable::from_file("x")),
        Err(BankError::DuplicateObject { .. })
    ));
}

#[test]
fn test_build_is_deterministic() {
    let source = MemorySampleSource::new().with("a.aiff", raw_aiff(16));
    let mut first = builder(source.clone());
    minimal(&mut first, "a.aiff");
    let mut second = builder(source);
    minimal(&mut second, "a.aiff");
    assert_eq!(first.build().unwrap(), second.build().unwrap());
}

// =============================================================================
// Wavetables
// =============================================================================

#[test]
fn test_raw_wavetable_with_sustain_loop() {
    let mut b = builder(MemorySampleSource::new().with("loop.aiff", looped_aiff()));
    b.insert(Wavetable::from_file("loop.aiff")).unwrap();
    let offset = b.resolve(ObjectKind::Wavetable, "loop.aiff").unwrap() as usize;
    let binary = b.build().unwrap();

    // loop record precedes the wavetable
    assert_eq!(offset, 8 + 16);
    assert_eq!(binary.ctl[offset + 8], AL_RAW16_WAVE);
    let loop_offset = u32_at(&binary.ctl, offset + 12) as usize;
    assert_eq!(loop_offset, 8);
    assert_eq!(u32_at(&binary.ctl, loop_offset), 4);
    assert_eq!(u32_at(&binary.ctl, loop_offset + 4), 12);
    assert_eq!(u32_at(&binary.ctl, loop_offset + 8), LOOP_FOREVER);
}

#[test]
fn test_raw_wavetable_without_loop() {
    let mut b = builder(MemorySampleSource::new().with("a.aiff", raw_aiff(2)));
    b.insert(Wavetable::from_file("a.aiff")).unwrap();
    let offset = b.resolve(ObjectKind::Wavetable, "a.aiff").unwrap() as usize;
    let binary = b.build().unwrap();
    assert_eq!(u32_at(&binary.ctl, offset + 12), 0);
}

#[test]
fn test_adpcm_wavetable_writes_loop_and_book() {
    let mut b = builder(MemorySampleSource::new().with("a.aifc", adpcm_aifc(true)));
    b.insert(Wavetable::from_file("a.aifc")).unwrap();
    let offset = b.resolve(ObjectKind::Wavetable, "a.aifc").unwrap() as usize;
    let binary = b.build().unwrap();

    // header 8, loop 48, book 40
    assert_eq!(offset, 96);
    assert_eq!(binary.ctl[offset + 8], AL_ADPCM_WAVE);
    assert_eq!(u32_at(&binary.ctl, offset + 12), 8);
    assert_eq!(u32_at(&binary.ctl, offset + 16), 56);
    // order and predictor count, then coefficients
    assert_eq!(u32_at(&binary.ctl, 56), 2);
    assert_eq!(u32_at(&binary.ctl, 60), 1);
    assert_eq!(&binary.ctl[64..68], &[0, 0, 0, 1]);
    assert_eq!(binary.tbl.len(), 24);
}

#[test]
fn test_adpcm_wavetable_without_loop() {
    let mut b = builder(MemorySampleSource::new().with("a.aifc", adpcm_aifc(false)));
    b.insert(Wavetable::from_file("a.aifc")).unwrap();
    let offset = b.resolve(ObjectKind::Wavetable, "a.aifc").unwrap() as usize;
    let binary = b.build().unwrap();
    assert_eq!(u32_at(&binary.ctl, offset + 12), 0);
    assert_eq!(u32_at(&binary.ctl, offset + 16), 8);
}

#[test]
fn test_adpcm_without_codebook_fails() {
    let bytes = AiffFile::pcm(FormType::Aifc, vadpcm_params(), vec![0; 9])
        .to_bytes()
        .unwrap();
    let mut b = builder(MemorySampleSource::new().with("a.aifc", bytes));
    b.insert(Wavetable::from_file("a.aifc")).unwrap();
    let err = b.resolve(ObjectKind::Wavetable, "a.aifc").unwrap_err();
    assert!(matches!(err, BankError::MissingCodebook { ref path } if path == "a.aifc"));
}

#[test]
fn test_other_compression_rejected() {
    let params = SoundParams {
        compression: Some(Compression {
            kind: ChunkId::new("ima4").unwrap(),
            name: "IMA 4:1".to_string(),
        }),
        ..SoundParams::mono16(22050.0)
    };
    let bytes = AiffFile::pcm(FormType::Aifc, params, vec![0; 34])
        .to_bytes()
        .unwrap();
    let mut b = builder(MemorySampleSource::new().with("a.aifc", bytes));
    b.insert(Wavetable::from_file("a.aifc")).unwrap();
    assert!(matches!(
        b.resolve(ObjectKind::Wavetable, "a.aifc"),
        Err(BankError::Aiff(AiffError::Compressed { .. }))
    ));
}

#[test]
fn test_uncompressed_aifc_is_raw() {
    let bytes = AiffFile::pcm(FormType::Aifc, SoundParams::mono16(8000.0), vec![0; 4])
        .to_bytes()
        .unwrap();
    let mut b = builder(MemorySampleSource::new().with("a.aifc", bytes));
    b.insert(Wavetable::from_file("a.aifc")).unwrap();
    let offset = b.resolve(ObjectKind::Wavetable, "a.aifc").unwrap() as usize;
    let binary = b.build().unwrap();
    assert_eq!(binary.ctl[offset + 8], AL_RAW16_WAVE);
}

#[test]
fn test_missing_sample_file() {
    let mut b = builder(MemorySampleSource::new());
    minimal(&mut b, "gone.aiff");
    assert!(matches!(
        b.build(),
        Err(BankError::MissingSample { ref path }) if path == "gone.aiff"
    ));
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn test_duplicate_object() {
    let mut b = builder(MemorySampleSource::new());
    b.insert(Keymap::new("k")).unwrap();
    // same name in another kind is fine
    b.insert(Envelope::new("k")).unwrap();
    assert!(matches!(
        b.insert(Keymap::new("k")),
        Err(BankError::DuplicateObject {
            kind: ObjectKind::Keymap,
            ..
        })
    ));
}

#[test]
fn test_wrong_reference_kind() {
    let mut b = builder(MemorySampleSource::new().with("a.aiff", raw_aiff(1)));
    b.insert(Envelope::new("env")).unwrap();
    b.insert(Sound::new("s", "a.aiff", "env", "env")).unwrap();
    let err = b.resolve(ObjectKind::Sound, "s").unwrap_err();
    match err {
        BankError::WrongReferenceKind {
            expected,
            found,
            field,
            ..
        } => {
            assert_eq!(expected, ObjectKind::Keymap);
            assert_eq!(found, ObjectKind::Envelope);
            assert_eq!(field, "keymap");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_unresolved_reference() {
    let mut b = builder(MemorySampleSource::new());
    b.insert(Instrument::new("i", vec!["nowhere".to_string()]))
        .unwrap();
    let err = b.resolve(ObjectKind::Instrument, "i").unwrap_err();
    assert!(matches!(
        err,
        BankError::UnresolvedReference {
            kind: ObjectKind::Sound,
            field: "sounds",
            ..
        }
    ));
}

#[test]
fn test_resolve_unknown_object() {
    let mut b = builder(MemorySampleSource::new());
    assert!(matches!(
        b.resolve(ObjectKind::Bank, "none"),
        Err(BankError::UnknownObject { .. })
    ));
}

#[test]
fn test_builder_is_single_use() {
    let mut b = builder(MemorySampleSource::new());
    b.build().unwrap();
    assert!(matches!(b.build(), Err(BankError::AlreadyBuilt)));
    assert!(matches!(
        b.insert(Keymap::new("k")),
        Err(BankError::AlreadyBuilt)
    ));
}

#[test]
fn test_bank_added_after_header_reserved() {
    let mut b = builder(MemorySampleSource::new());
    b.insert(Keymap::new("k")).unwrap();
    b.resolve(ObjectKind::Keymap, "k").unwrap();
    b.insert(Bank::new("late")).unwrap();
    assert!(matches!(
        b.build(),
        Err(BankError::HeaderSizeChanged { .. })
    ));
}

#[test]
fn test_invalid_config_rejected() {
    let config = LinkerConfig {
        ctl_alignment: 3,
        ..LinkerConfig::default()
    };
    assert!(matches!(
        BankBuilder::new(config, MemorySampleSource::new()),
        Err(BankError::InvalidConfig { .. })
    ));
}

// =============================================================================
// Output
// =============================================================================

#[test]
fn test_hash_covers_both_tables() {
    let a = BankBinary::new(vec![1, 2], vec![3]);
    let b = BankBinary::new(vec![1, 2], vec![4]);
    assert_eq!(a.hash.len(), 64);
    assert_ne!(a.hash, b.hash);
}

#[test]
fn test_write_files() {
    let dir = tempfile::tempdir().unwrap();
    let binary = BankBinary::new(vec![1, 2, 3], vec![4, 5]);
    let (ctl, tbl) = binary.write_files(dir.path().join("sfx.v2")).unwrap();
    assert_eq!(ctl.file_name().unwrap(), "sfx.v2.ctl");
    assert_eq!(std::fs::read(ctl).unwrap(), vec![1, 2, 3]);
    assert_eq!(std::fs::read(tbl).unwrap(), vec![4, 5]);
}
