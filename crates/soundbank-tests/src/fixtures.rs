//! Sample files and object graphs shared by the end-to-end tests.

use std::fs;
use std::path::{Path, PathBuf};

use soundbank_aiff::{
    vadpcm_compression, AiffFile, FormType, Instrument as InstrumentChunk, LocalChunk, Loop,
    Marker, SoundParams, VadpcmCodebook, VadpcmLoop, VadpcmLoops, VadpcmRecord,
};
use soundbank_ctl::{
    Bank, BankBinary, BankBuilder, BankObject, Envelope, Instrument, Keymap, LinkerConfig,
    MemorySampleSource, Sound,
};
use tempfile::TempDir;

/// Mono 16-bit AIFF holding a rising ramp of `frames` samples.
pub fn ramp_aiff(frames: usize, sample_rate: f64) -> Vec<u8> {
    let data = (0..frames)
        .flat_map(|i| ((i as i16).wrapping_mul(97)).to_be_bytes())
        .collect();
    AiffFile::pcm(FormType::Aiff, SoundParams::mono16(sample_rate), data)
        .to_bytes()
        .expect("Failed to encode AIFF")
}

/// Mono 16-bit AIFF with a forward sustain loop between two markers.
pub fn looped_aiff(frames: usize, start: u32, end: u32, sample_rate: f64) -> Vec<u8> {
    let markers = vec![
        Marker {
            id: 1,
            position: start,
            name: "start".to_string(),
        },
        Marker {
            id: 2,
            position: end,
            name: "end".to_string(),
        },
    ];
    let inst = InstrumentChunk {
        sustain_loop: Loop::forward(1, 2),
        ..Default::default()
    };
    let file = AiffFile::parse(&ramp_aiff(frames, sample_rate)).expect("Failed to parse ramp");
    file.with_chunk(LocalChunk::Markers(markers))
        .with_chunk(LocalChunk::Instrument(inst))
        .to_bytes()
        .expect("Failed to encode looped AIFF")
}

/// An order-2 codebook with one predictor.
pub fn codebook() -> VadpcmCodebook {
    VadpcmCodebook {
        version: 1,
        order: 2,
        predictors: 1,
        coefficients: (0..16).map(|i| i * 100 - 800).collect(),
    }
}

/// VADPCM AIFF-C of `frames` 9-byte frames, with a codebook and optionally a
/// loop over the whole sample.
pub fn vadpcm_aifc(frames: usize, with_loop: bool, sample_rate: f64) -> Vec<u8> {
    let params = SoundParams {
        compression: Some(vadpcm_compression()),
        ..SoundParams::mono16(sample_rate)
    };
    let data = (0..frames * 9).map(|i| (i % 251) as u8).collect();
    let codes = VadpcmRecord::Codebook(codebook())
        .to_application()
        .expect("Failed to encode codebook");
    let mut file =
        AiffFile::pcm(FormType::Aifc, params, data).with_chunk(LocalChunk::Application(codes));
    if with_loop {
        let loops = VadpcmLoops {
            version: 1,
            loops: vec![VadpcmLoop {
                start: 0,
                end: (frames * 16) as u32,
                count: u32::MAX,
                state: [0; 16],
            }],
        };
        let appl = VadpcmRecord::Loops(loops)
            .to_application()
            .expect("Failed to encode loops");
        file = file.with_chunk(LocalChunk::Application(appl));
    }
    file.to_bytes().expect("Failed to encode AIFF-C")
}

/// Reads a big-endian u32.
pub fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    let word: [u8; 4] = bytes[offset..offset + 4]
        .try_into()
        .expect("Offset out of range");
    u32::from_be_bytes(word)
}

/// A bank graph exercising every object kind and wavetable flavour.
pub struct DemoBank {
    pub objects: Vec<BankObject>,
    pub source: MemorySampleSource,
}

impl DemoBank {
    /// Two banks sharing instruments, with raw, looped and ADPCM samples.
    pub fn new() -> Self {
        let source = MemorySampleSource::new()
            .with("piano.aiff", ramp_aiff(64, 22050.0))
            .with("strings.aiff", looped_aiff(128, 16, 112, 22050.0))
            .with("bass.aifc", vadpcm_aifc(4, true, 22050.0))
            .with("kick.aifc", vadpcm_aifc(2, false, 22050.0));

        let mut soft = Keymap::new("soft");
        soft.velocity_max = 63;
        let mut loud = Keymap::new("loud");
        loud.velocity_min = 64;
        let mut pluck = Envelope::new("pluck");
        pluck.decay_time = 120_000;

        let mut piano = Instrument::new(
            "piano",
            vec!["piano_soft".to_string(), "piano_loud".to_string()],
        );
        piano.bend_range = 100;
        let mut drums = Instrument::new("drums", vec!["kick".to_string()]);
        drums.priority = 10;

        let mut main = Bank::new("main");
        main.sample_rate = 22050;
        main.instruments = vec![
            Some("piano".to_string()),
            None,
            Some("strings".to_string()),
            Some("bass".to_string()),
        ];
        main.percussion_default = Some("drums".to_string());
        let mut alt = Bank::new("alt");
        alt.sample_rate = 22050;
        alt.instruments = vec![Some("bass".to_string()), Some("piano".to_string())];

        let objects = vec![
            Envelope::new("default").into(),
            pluck.into(),
            soft.into(),
            loud.into(),
            Keymap::new("full").into(),
            Sound::new("piano_soft", "piano.aiff", "soft", "default").into(),
            Sound::new("piano_loud", "piano.aiff", "loud", "default").into(),
            Sound::new("strings", "strings.aiff", "full", "default").into(),
            Sound::new("bass", "bass.aifc", "full", "pluck").into(),
            Sound::new("kick", "kick.aifc", "full", "pluck").into(),
            piano.into(),
            Instrument::new("strings", vec!["strings".to_string()]).into(),
            Instrument::new("bass", vec!["bass".to_string()]).into(),
            drums.into(),
            main.into(),
            alt.into(),
        ];
        Self { objects, source }
    }

    /// A builder holding every object of the graph.
    pub fn builder(&self) -> BankBuilder<MemorySampleSource> {
        let mut builder = BankBuilder::new(LinkerConfig::default(), self.source.clone())
            .expect("Default config is valid");
        builder
            .insert_all(self.objects.iter().cloned())
            .expect("Demo objects have unique names");
        builder
    }

    /// Links the graph.
    pub fn build(&self) -> BankBinary {
        self.builder().build().expect("Failed to build demo bank")
    }
}

impl Default for DemoBank {
    fn default() -> Self {
        Self::new()
    }
}

/// A temporary directory of sample files.
pub struct SampleDirFixture {
    pub root: TempDir,
}

impl SampleDirFixture {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self {
            root: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    /// Directory path.
    pub fn path(&self) -> &Path {
        self.root.path()
    }

    /// Writes a sample file.
    pub fn add(&self, name: &str, bytes: &[u8]) -> PathBuf {
        let path = self.root.path().join(name);
        fs::write(&path, bytes).expect("Failed to write sample file");
        path
    }
}

impl Default for SampleDirFixture {
    fn default() -> Self {
        Self::new()
    }
}
