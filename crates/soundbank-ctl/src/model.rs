//! Symbolic bank objects.
//!
//! Objects reference each other by name. Field defaults apply when an object
//! is deserialized from a definition document and mirror the defaults of the
//! instrument definition language; the binary encoders always write the
//! values held here.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kinds of bank objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    Bank,
    Instrument,
    Sound,
    Keymap,
    Envelope,
    Wavetable,
}

impl ObjectKind {
    /// All kinds, leaves last.
    pub const ALL: [ObjectKind; 6] = [
        ObjectKind::Bank,
        ObjectKind::Instrument,
        ObjectKind::Sound,
        ObjectKind::Keymap,
        ObjectKind::Envelope,
        ObjectKind::Wavetable,
    ];

    /// Lowercase keyword, as used in definition documents.
    pub fn as_str(self) -> &'static str {
        match self {
            ObjectKind::Bank => "bank",
            ObjectKind::Instrument => "instrument",
            ObjectKind::Sound => "sound",
            ObjectKind::Keymap => "keymap",
            ObjectKind::Envelope => "envelope",
            ObjectKind::Wavetable => "wavetable",
        }
    }

    /// Prefix of names derived from table offsets.
    pub fn name_prefix(self) -> &'static str {
        match self {
            ObjectKind::Bank => "Bank",
            ObjectKind::Instrument => "Instrument",
            ObjectKind::Sound => "Sound",
            ObjectKind::Keymap => "Keymap",
            ObjectKind::Envelope => "Envelope",
            ObjectKind::Wavetable => "Wavetable",
        }
    }

    /// Name for an object found at `offset` in a metadata table.
    pub fn offset_name(self, offset: u32) -> String {
        format!("{}{:x}", self.name_prefix(), offset)
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Default bank sample rate in Hz.
pub const DEFAULT_SAMPLE_RATE: i32 = 44100;

fn default_sample_rate() -> i32 {
    DEFAULT_SAMPLE_RATE
}

fn default_volume() -> u8 {
    127
}

fn default_pan() -> u8 {
    64
}

fn default_priority() -> u8 {
    5
}

fn default_bend_range() -> i16 {
    200
}

fn default_velocity_max() -> u8 {
    127
}

fn default_key() -> u8 {
    60
}

fn default_key_base() -> u8 {
    76
}

fn default_attack_volume() -> i16 {
    127
}

fn default_decay_time() -> i32 {
    500_000
}

fn default_decay_volume() -> i16 {
    100
}

fn default_release_time() -> i32 {
    200_000
}

/// A bank: instrument slots indexed by program number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Bank {
    pub name: String,
    /// Output sample rate in Hz.
    #[serde(default = "default_sample_rate")]
    pub sample_rate: i32,
    #[serde(default)]
    pub flags: u8,
    /// Instrument used for percussion channels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percussion_default: Option<String>,
    /// Instrument per program number; `None` leaves the slot empty.
    #[serde(default)]
    pub instruments: Vec<Option<String>>,
}

impl Bank {
    /// A bank with default settings and no instruments.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sample_rate: DEFAULT_SAMPLE_RATE,
            flags: 0,
            percussion_default: None,
            instruments: Vec::new(),
        }
    }
}

/// An instrument: playback parameters and its sounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Instrument {
    pub name: String,
    #[serde(default = "default_volume")]
    pub volume: u8,
    #[serde(default = "default_pan")]
    pub pan: u8,
    #[serde(default = "default_priority")]
    pub priority: u8,
    #[serde(default)]
    pub flags: u8,
    #[serde(default)]
    pub trem_type: u8,
    #[serde(default)]
    pub trem_rate: u8,
    #[serde(default)]
    pub trem_depth: u8,
    #[serde(default)]
    pub trem_delay: u8,
    #[serde(default)]
    pub vib_type: u8,
    #[serde(default)]
    pub vib_rate: u8,
    #[serde(default)]
    pub vib_depth: u8,
    #[serde(default)]
    pub vib_delay: u8,
    /// Pitch bend range in cents.
    #[serde(default = "default_bend_range")]
    pub bend_range: i16,
    #[serde(default)]
    pub sounds: Vec<String>,
}

impl Instrument {
    /// An instrument with default settings and the given sounds.
    pub fn new(name: impl Into<String>, sounds: Vec<String>) -> Self {
        Self {
            name: name.into(),
            volume: default_volume(),
            pan: default_pan(),
            priority: default_priority(),
            flags: 0,
            trem_type: 0,
            trem_rate: 0,
            trem_depth: 0,
            trem_delay: 0,
            vib_type: 0,
            vib_rate: 0,
            vib_depth: 0,
            vib_delay: 0,
            bend_range: default_bend_range(),
            sounds,
        }
    }
}

/// A sound: one sample with its envelope and key range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Sound {
    pub name: String,
    /// Wavetable name; a wavetable loading this path is created when none
    /// with this name exists.
    pub file: String,
    #[serde(default = "default_volume")]
    pub volume: u8,
    #[serde(default = "default_pan")]
    pub pan: u8,
    #[serde(default)]
    pub flags: u8,
    pub keymap: String,
    pub envelope: String,
}

impl Sound {
    /// A sound with default volume and pan.
    pub fn new(
        name: impl Into<String>,
        file: impl Into<String>,
        keymap: impl Into<String>,
        envelope: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            file: file.into(),
            volume: default_volume(),
            pan: default_pan(),
            flags: 0,
            keymap: keymap.into(),
            envelope: envelope.into(),
        }
    }
}

/// Velocity and key range a sound answers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Keymap {
    pub name: String,
    #[serde(default)]
    pub velocity_min: u8,
    #[serde(default = "default_velocity_max")]
    pub velocity_max: u8,
    #[serde(default = "default_key")]
    pub key_min: u8,
    #[serde(default = "default_key")]
    pub key_max: u8,
    /// Key at which the sample plays at its recorded pitch.
    #[serde(default = "default_key_base")]
    pub key_base: u8,
    #[serde(default)]
    pub detune: u8,
}

impl Keymap {
    /// A key map with default ranges.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            velocity_min: 0,
            velocity_max: default_velocity_max(),
            key_min: default_key(),
            key_max: default_key(),
            key_base: default_key_base(),
            detune: 0,
        }
    }
}

/// Attack-decay-release envelope; times in microseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Envelope {
    pub name: String,
    #[serde(default)]
    pub attack_time: i32,
    #[serde(default = "default_attack_volume")]
    pub attack_volume: i16,
    #[serde(default = "default_decay_time")]
    pub decay_time: i32,
    #[serde(default = "default_decay_volume")]
    pub decay_volume: i16,
    #[serde(default = "default_release_time")]
    pub release_time: i32,
}

impl Envelope {
    /// An envelope with default times and volumes.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attack_time: 0,
            attack_volume: default_attack_volume(),
            decay_time: default_decay_time(),
            decay_volume: default_decay_volume(),
            release_time: default_release_time(),
        }
    }
}

/// A sample loaded from an AIFF or AIFF-C file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Wavetable {
    pub name: String,
    /// Path handed to the sample source.
    pub file: String,
}

impl Wavetable {
    /// A wavetable named after the file it loads.
    pub fn from_file(file: impl Into<String>) -> Self {
        let file = file.into();
        Self {
            name: file.clone(),
            file,
        }
    }
}

/// Any bank object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BankObject {
    Bank(Bank),
    Instrument(Instrument),
    Sound(Sound),
    Keymap(Keymap),
    Envelope(Envelope),
    Wavetable(Wavetable),
}

impl BankObject {
    /// Kind of the object.
    pub fn kind(&self) -> ObjectKind {
        match self {
            BankObject::Bank(_) => ObjectKind::Bank,
            BankObject::Instrument(_) => ObjectKind::Instrument,
            BankObject::Sound(_) => ObjectKind::Sound,
            BankObject::Keymap(_) => ObjectKind::Keymap,
            BankObject::Envelope(_) => ObjectKind::Envelope,
            BankObject::Wavetable(_) => ObjectKind::Wavetable,
        }
    }

    /// Name of the object, unique within its kind.
    pub fn name(&self) -> &str {
        match self {
            BankObject::Bank(o) => &o.name,
            BankObject::Instrument(o) => &o.name,
            BankObject::Sound(o) => &o.name,
            BankObject::Keymap(o) => &o.name,
            BankObject::Envelope(o) => &o.name,
            BankObject::Wavetable(o) => &o.name,
        }
    }
}

impl From<Bank> for BankObject {
    fn from(o: Bank) -> Self {
        BankObject::Bank(o)
    }
}

impl From<Instrument> for BankObject {
    fn from(o: Instrument) -> Self {
        BankObject::Instrument(o)
    }
}

impl From<Sound> for BankObject {
    fn from(o: Sound) -> Self {
        BankObject::Sound(o)
    }
}

impl From<Keymap> for BankObject {
    fn from(o: Keymap) -> Self {
        BankObject::Keymap(o)
    }
}

impl From<Envelope> for BankObject {
    fn from(o: Envelope) -> Self {
        BankObject::Envelope(o)
    }
}

impl From<Wavetable> for BankObject {
    fn from(o: Wavetable) -> Self {
        BankObject::Wavetable(o)
    }
}

/// Parses a JSON array of objects.
pub fn objects_from_json(json: &str) -> serde_json::Result<Vec<BankObject>> {
    serde_json::from_str(json)
}

/// Serializes objects as a pretty-printed JSON array.
pub fn objects_to_json(objects: &[BankObject]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(objects)
}
