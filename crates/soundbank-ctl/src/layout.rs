//! Big-endian record layouts of the metadata table.
//!
//! Every cross-reference is a byte offset from the start of the metadata
//! table; zero means "none".

use std::sync::OnceLock;

use soundbank_aiff::vadpcm_loop_schema;
use soundbank_struct::{Context, Endian, Field, Len, Record, Schema, StructResult, Variant};

/// Wavetable type: VADPCM-compressed samples.
pub const AL_ADPCM_WAVE: u8 = 0;
/// Wavetable type: raw 16-bit samples.
pub const AL_RAW16_WAVE: u8 = 1;

/// Loop count of a loop that repeats forever.
pub const LOOP_FOREVER: u32 = u32::MAX;

fn count_of(record: &Record, name: &str) -> StructResult<usize> {
    record.usize(name)
}

fn bank_count(record: &Record, _ctx: &Context) -> StructResult<usize> {
    count_of(record, "bankCount")
}

fn inst_count(record: &Record, _ctx: &Context) -> StructResult<usize> {
    count_of(record, "instCount")
}

fn sound_count(record: &Record, _ctx: &Context) -> StructResult<usize> {
    count_of(record, "soundCount")
}

fn book_size(record: &Record, _ctx: &Context) -> StructResult<usize> {
    Ok(record.usize("order")? * record.usize("npredictors")? * 8)
}

/// `ALBankFile`: revision tag, bank count and bank offsets.
pub fn bank_file_schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        Schema::builder("ALBankFile", Endian::Big)
            .field(Field::bytes("revision", 2usize))
            .field(Field::int("bankCount", 2))
            .field(Field::int("bankArray", 4).array(Len::Computed(bank_count)))
            .build()
    })
}

/// `ALBank`
pub fn bank_schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        Schema::builder("ALBank", Endian::Big)
            .field(Field::int("instCount", 2))
            .field(Field::uint("flags", 1))
            .field(Field::uint("pad", 1).default_value(0u8))
            .field(Field::int("sampleRate", 4))
            .field(Field::int("percussion", 4))
            .field(Field::int("instArray", 4).array(Len::Computed(inst_count)))
            .build()
    })
}

/// `ALInstrument`
pub fn instrument_schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        Schema::builder("ALInstrument", Endian::Big)
            .field(Field::uint("volume", 1))
            .field(Field::uint("pan", 1))
            .field(Field::uint("priority", 1))
            .field(Field::uint("flags", 1))
            .field(Field::uint("tremType", 1))
            .field(Field::uint("tremRate", 1))
            .field(Field::uint("tremDepth", 1))
            .field(Field::uint("tremDelay", 1))
            .field(Field::uint("vibType", 1))
            .field(Field::uint("vibRate", 1))
            .field(Field::uint("vibDepth", 1))
            .field(Field::uint("vibDelay", 1))
            .field(Field::int("bendRange", 2))
            .field(Field::int("soundCount", 2))
            .field(Field::int("soundArray", 4).array(Len::Computed(sound_count)))
            .build()
    })
}

/// `ALSound`. The trailing flags byte is padded so the record is 16 bytes,
/// as the native struct is.
pub fn sound_schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        Schema::builder("ALSound", Endian::Big)
            .field(Field::uint("envelope", 4))
            .field(Field::uint("keyMap", 4))
            .field(Field::uint("wavetable", 4))
            .field(Field::uint("samplePan", 1))
            .field(Field::uint("sampleVolume", 1))
            .field(Field::uint("flags", 1).align(2))
            .build()
    })
}

/// `ALEnvelope`
pub fn envelope_schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        Schema::builder("ALEnvelope", Endian::Big)
            .field(Field::int("attackTime", 4))
            .field(Field::int("decayTime", 4))
            .field(Field::int("releaseTime", 4))
            .field(Field::int("attackVolume", 2))
            .field(Field::int("decayVolume", 2))
            .build()
    })
}

/// `ALKeyMap`
pub fn keymap_schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        Schema::builder("ALKeyMap", Endian::Big)
            .field(Field::uint("velocityMin", 1))
            .field(Field::uint("velocityMax", 1))
            .field(Field::uint("keyMin", 1))
            .field(Field::uint("keyMax", 1))
            .field(Field::uint("keyBase", 1))
            .field(Field::uint("detune", 1))
            .build()
    })
}

/// `ALADPCMWaveInfo`
pub fn adpcm_wave_info_schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        Schema::builder("ALADPCMWaveInfo", Endian::Big)
            .field(Field::uint("loop", 4))
            .field(Field::uint("book", 4))
            .build()
    })
}

/// `ALRAWWaveInfo`
pub fn raw_wave_info_schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        Schema::builder("ALRAWWaveInfo", Endian::Big)
            .field(Field::uint("loop", 4))
            .build()
    })
}

fn select_wave_info(record: &Record, _ctx: &Context) -> Option<&'static Schema> {
    match u8::try_from(record.uint("type").ok()?).ok()? {
        AL_ADPCM_WAVE => Some(adpcm_wave_info_schema()),
        AL_RAW16_WAVE => Some(raw_wave_info_schema()),
        _ => None,
    }
}

/// Union of the two wave info records, chosen by the wavetable type.
pub fn wave_info_variant() -> &'static Variant {
    static VARIANT: OnceLock<Variant> = OnceLock::new();
    VARIANT.get_or_init(|| {
        Variant::new(
            "waveInfo",
            vec![adpcm_wave_info_schema(), raw_wave_info_schema()],
            select_wave_info,
        )
    })
}

/// `ALWaveTable`. Two pad bytes put the union at its native offset of 12.
pub fn wavetable_schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        Schema::builder("ALWaveTable", Endian::Big)
            .field(Field::int("base", 4))
            .field(Field::int("len", 4))
            .field(Field::uint("type", 1))
            .field(Field::uint("flags", 1))
            .field(Field::bytes("pad", 2usize).default_value(vec![0u8, 0]))
            .field(Field::variant("waveInfo", wave_info_variant()))
            .build()
    })
}

/// `ALADPCMloop`, shared with the AIFF-C `VADPCMLOOPS` record.
pub fn adpcm_loop_schema() -> &'static Schema {
    vadpcm_loop_schema()
}

/// `ALADPCMBook`
pub fn adpcm_book_schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        Schema::builder("ALADPCMBook", Endian::Big)
            .field(Field::int("order", 4))
            .field(Field::int("npredictors", 4))
            .field(Field::int("book", 2).array(Len::Computed(book_size)))
            .build()
    })
}

/// `ALRawLoop`
pub fn raw_loop_schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        Schema::builder("ALRawLoop", Endian::Big)
            .field(Field::uint("start", 4))
            .field(Field::uint("end", 4))
            .field(Field::uint("count", 4))
            .build()
    })
}
