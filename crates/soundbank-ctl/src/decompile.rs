//! Recovers symbolic objects and sample files from a linked bank.
//!
//! Objects are named after their offset in the metadata table. Each
//! wavetable becomes a regenerated sample file: AIFF-C with VADPCM records
//! for ADPCM wavetables, AIFF with a forward sustain loop for raw ones.

use std::collections::BTreeMap;
use std::fmt::{self, Write as _};
use std::path::Path;

use soundbank_aiff::vadpcm::VADPCM_VERSION;
use soundbank_aiff::{
    vadpcm_compression, AiffFile, FormType, Instrument as InstrumentChunk, LocalChunk, Loop,
    Marker, SoundParams, VadpcmCodebook, VadpcmLoop, VadpcmLoops, VadpcmRecord,
};
use soundbank_struct::{Context, Record, Schema};

use crate::config::BANK_REVISION;
use crate::error::{BankError, BankResult};
use crate::layout::{
    adpcm_book_schema, adpcm_loop_schema, bank_file_schema, bank_schema, envelope_schema,
    instrument_schema, keymap_schema, raw_loop_schema, sound_schema, wavetable_schema,
    AL_ADPCM_WAVE, AL_RAW16_WAVE, LOOP_FOREVER,
};
use crate::model::{
    objects_to_json, Bank, BankObject, Envelope, Instrument, Keymap, ObjectKind, Sound, Wavetable,
};
use crate::source::MemorySampleSource;

/// Objects and sample files recovered from a bank.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DecompiledBank {
    /// Objects, dependencies before dependents; banks last in header order.
    pub objects: Vec<BankObject>,
    /// Regenerated sample files by wavetable name.
    pub files: BTreeMap<String, Vec<u8>>,
}

impl DecompiledBank {
    /// Looks up a recovered object.
    pub fn get(&self, kind: ObjectKind, name: &str) -> Option<&BankObject> {
        self.objects
            .iter()
            .find(|object| object.kind() == kind && object.name() == name)
    }

    /// Objects of one kind.
    pub fn of_kind(&self, kind: ObjectKind) -> impl Iterator<Item = &BankObject> {
        self.objects.iter().filter(move |object| object.kind() == kind)
    }

    /// A sample source serving the regenerated files, for relinking.
    pub fn sample_source(&self) -> MemorySampleSource {
        MemorySampleSource::from(self.files.clone())
    }

    /// Objects as a JSON definition document.
    pub fn to_json(&self) -> BankResult<String> {
        Ok(objects_to_json(&self.objects)?)
    }

    /// Objects in the instrument definition language.
    pub fn render(&self) -> String {
        self.to_string()
    }

    /// Writes every regenerated sample file into `dir`.
    pub fn write_samples(&self, dir: impl AsRef<Path>) -> BankResult<()> {
        let dir = dir.as_ref();
        for (name, bytes) in &self.files {
            std::fs::write(dir.join(name), bytes)?;
        }
        tracing::info!(dir = %dir.display(), files = self.files.len(), "wrote samples");
        Ok(())
    }
}

/// Decompiles the bank whose metadata table starts at `ctl_start` in
/// `region`, with sample data in `tbl`.
pub fn decompile(region: &[u8], ctl_start: usize, tbl: &[u8]) -> BankResult<DecompiledBank> {
    let ctl = region
        .get(ctl_start..)
        .ok_or_else(|| BankError::malformed(ctl_start, "metadata table starts past the input"))?;
    let decompiled = Decompiler::new(ctl, ctl_start, tbl).run()?;
    tracing::info!(
        objects = decompiled.objects.len(),
        files = decompiled.files.len(),
        "decompiled bank"
    );
    Ok(decompiled)
}

struct Decompiler<'a> {
    ctl: &'a [u8],
    base: usize,
    tbl: &'a [u8],
    banks: Vec<Bank>,
    objects: BTreeMap<ObjectKind, BTreeMap<u32, BankObject>>,
    files: BTreeMap<String, Vec<u8>>,
}

impl<'a> Decompiler<'a> {
    fn new(ctl: &'a [u8], base: usize, tbl: &'a [u8]) -> Self {
        Self {
            ctl,
            base,
            tbl,
            banks: Vec::new(),
            objects: BTreeMap::new(),
            files: BTreeMap::new(),
        }
    }

    fn malformed(&self, offset: u32, message: impl Into<String>) -> BankError {
        BankError::malformed(self.base + offset as usize, message)
    }

    fn decode(&self, schema: &'static Schema, what: &str, offset: u32) -> BankResult<Record> {
        schema
            .decode(self.ctl, offset as usize, &Context::new())
            .map(|(record, _)| record)
            .map_err(|e| self.malformed(offset, format!("{what}: {e}")))
    }

    fn int<T: TryFrom<i64>>(&self, record: &Record, name: &str, at: u32) -> BankResult<T> {
        let value = record
            .int(name)
            .map_err(|e| self.malformed(at, e.to_string()))?;
        T::try_from(value)
            .map_err(|_| self.malformed(at, format!("{name} {value} is out of range")))
    }

    /// A reference that must not be zero.
    fn required(&self, record: &Record, name: &str, at: u32) -> BankResult<u32> {
        match self.int::<u32>(record, name, at)? {
            0 => Err(self.malformed(at, format!("{name} is empty"))),
            offset => Ok(offset),
        }
    }

    fn offsets(&self, record: &Record, name: &str, at: u32) -> BankResult<Vec<u32>> {
        record
            .array(name)
            .map_err(|e| self.malformed(at, e.to_string()))?
            .iter()
            .map(|value| {
                value
                    .as_u64()
                    .and_then(|v| u32::try_from(v).ok())
                    .ok_or_else(|| self.malformed(at, format!("{name} holds an invalid offset")))
            })
            .collect()
    }

    fn known(&self, kind: ObjectKind, offset: u32) -> Option<&BankObject> {
        self.objects.get(&kind).and_then(|objects| objects.get(&offset))
    }

    fn add(&mut self, kind: ObjectKind, offset: u32, object: impl Into<BankObject>) {
        self.objects.entry(kind).or_default().insert(offset, object.into());
    }

    fn run(mut self) -> BankResult<DecompiledBank> {
        let bank_offsets = self.header()?;

        let mut instruments = Vec::new();
        let mut seen_banks = Vec::new();
        for offset in bank_offsets {
            if offset == 0 {
                return Err(self.malformed(0, "bank offset is empty"));
            }
            if seen_banks.contains(&offset) {
                continue;
            }
            seen_banks.push(offset);
            self.bank(offset, &mut instruments)?;
        }

        let mut sounds = Vec::new();
        for (offset, sample_rate) in instruments {
            if self.known(ObjectKind::Instrument, offset).is_none() {
                self.instrument(offset, sample_rate, &mut sounds)?;
            }
        }
        for (offset, sample_rate) in sounds {
            if self.known(ObjectKind::Sound, offset).is_none() {
                self.sound(offset, sample_rate)?;
            }
        }

        let mut objects = Vec::new();
        for kind in [
            ObjectKind::Wavetable,
            ObjectKind::Envelope,
            ObjectKind::Keymap,
            ObjectKind::Sound,
            ObjectKind::Instrument,
        ] {
            if let Some(of_kind) = self.objects.remove(&kind) {
                objects.extend(of_kind.into_values());
            }
        }
        objects.extend(self.banks.into_iter().map(BankObject::from));
        Ok(DecompiledBank {
            objects,
            files: self.files,
        })
    }

    fn header(&self) -> BankResult<Vec<u32>> {
        let revision = self
            .ctl
            .get(0..2)
            .ok_or_else(|| self.malformed(0, "missing bank file header"))?;
        if revision != BANK_REVISION.as_bytes() {
            return Err(BankError::UnsupportedVersion {
                format: "bank",
                expected: BANK_REVISION.to_string(),
                found: String::from_utf8_lossy(revision).into_owned(),
            });
        }
        let header = self.decode(bank_file_schema(), "bank file header", 0)?;
        self.offsets(&header, "bankArray", 0)
    }

    fn bank(&mut self, offset: u32, instruments: &mut Vec<(u32, i32)>) -> BankResult<()> {
        let record = self.decode(bank_schema(), "bank", offset)?;
        let sample_rate: i32 = self.int(&record, "sampleRate", offset)?;
        let percussion: u32 = self.int(&record, "percussion", offset)?;

        let mut bank = Bank::new(ObjectKind::Bank.offset_name(offset));
        bank.sample_rate = sample_rate;
        bank.flags = self.int(&record, "flags", offset)?;
        if percussion != 0 {
            bank.percussion_default = Some(ObjectKind::Instrument.offset_name(percussion));
            instruments.push((percussion, sample_rate));
        }
        for slot in self.offsets(&record, "instArray", offset)? {
            if slot == 0 {
                bank.instruments.push(None);
            } else {
                bank.instruments.push(Some(ObjectKind::Instrument.offset_name(slot)));
                instruments.push((slot, sample_rate));
            }
        }
        tracing::debug!(offset, name = %bank.name, "decoded bank");
        self.banks.push(bank);
        Ok(())
    }

    fn instrument(
        &mut self,
        offset: u32,
        sample_rate: i32,
        sounds: &mut Vec<(u32, i32)>,
    ) -> BankResult<()> {
        let record = self.decode(instrument_schema(), "instrument", offset)?;
        let mut names = Vec::new();
        for sound in self.offsets(&record, "soundArray", offset)? {
            if sound == 0 {
                return Err(self.malformed(offset, "instrument sound offset is empty"));
            }
            names.push(ObjectKind::Sound.offset_name(sound));
            sounds.push((sound, sample_rate));
        }

        let instrument = Instrument {
            name: ObjectKind::Instrument.offset_name(offset),
            volume: self.int(&record, "volume", offset)?,
            pan: self.int(&record, "pan", offset)?,
            priority: self.int(&record, "priority", offset)?,
            flags: self.int(&record, "flags", offset)?,
            trem_type: self.int(&record, "tremType", offset)?,
            trem_rate: self.int(&record, "tremRate", offset)?,
            trem_depth: self.int(&record, "tremDepth", offset)?,
            trem_delay: self.int(&record, "tremDelay", offset)?,
            vib_type: self.int(&record, "vibType", offset)?,
            vib_rate: self.int(&record, "vibRate", offset)?,
            vib_depth: self.int(&record, "vibDepth", offset)?,
            vib_delay: self.int(&record, "vibDelay", offset)?,
            bend_range: self.int(&record, "bendRange", offset)?,
            sounds: names,
        };
        self.add(ObjectKind::Instrument, offset, instrument);
        Ok(())
    }

    fn sound(&mut self, offset: u32, sample_rate: i32) -> BankResult<()> {
        let record = self.decode(sound_schema(), "sound", offset)?;
        let envelope = self.required(&record, "envelope", offset)?;
        let keymap = self.required(&record, "keyMap", offset)?;
        let wavetable = self.required(&record, "wavetable", offset)?;

        let sound = Sound {
            name: ObjectKind::Sound.offset_name(offset),
            envelope: self.envelope(envelope)?,
            keymap: self.keymap(keymap)?,
            file: self.wavetable(wavetable, sample_rate)?,
            volume: self.int(&record, "sampleVolume", offset)?,
            pan: self.int(&record, "samplePan", offset)?,
            flags: self.int(&record, "flags", offset)?,
        };
        self.add(ObjectKind::Sound, offset, sound);
        Ok(())
    }

    fn envelope(&mut self, offset: u32) -> BankResult<String> {
        if let Some(known) = self.known(ObjectKind::Envelope, offset) {
            return Ok(known.name().to_string());
        }
        let record = self.decode(envelope_schema(), "envelope", offset)?;
        let envelope = Envelope {
            name: ObjectKind::Envelope.offset_name(offset),
            attack_time: self.int(&record, "attackTime", offset)?,
            attack_volume: self.int(&record, "attackVolume", offset)?,
            decay_time: self.int(&record, "decayTime", offset)?,
            decay_volume: self.int(&record, "decayVolume", offset)?,
            release_time: self.int(&record, "releaseTime", offset)?,
        };
        let name = envelope.name.clone();
        self.add(ObjectKind::Envelope, offset, envelope);
        Ok(name)
    }

    fn keymap(&mut self, offset: u32) -> BankResult<String> {
        if let Some(known) = self.known(ObjectKind::Keymap, offset) {
            return Ok(known.name().to_string());
        }
        let record = self.decode(keymap_schema(), "keymap", offset)?;
        let keymap = Keymap {
            name: ObjectKind::Keymap.offset_name(offset),
            velocity_min: self.int(&record, "velocityMin", offset)?,
            velocity_max: self.int(&record, "velocityMax", offset)?,
            key_min: self.int(&record, "keyMin", offset)?,
            key_max: self.int(&record, "keyMax", offset)?,
            key_base: self.int(&record, "keyBase", offset)?,
            detune: self.int(&record, "detune", offset)?,
        };
        let name = keymap.name.clone();
        self.add(ObjectKind::Keymap, offset, keymap);
        Ok(name)
    }

    fn wavetable(&mut self, offset: u32, sample_rate: i32) -> BankResult<String> {
        if let Some(known) = self.known(ObjectKind::Wavetable, offset) {
            return Ok(known.name().to_string());
        }
        let record = self.decode(wavetable_schema(), "wavetable", offset)?;
        let base: u32 = self.int(&record, "base", offset)?;
        let len: u32 = self.int(&record, "len", offset)?;
        let data = (base as usize)
            .checked_add(len as usize)
            .and_then(|end| self.tbl.get(base as usize..end))
            .ok_or_else(|| {
                self.malformed(
                    offset,
                    format!(
                        "sample data {base:#x}+{len:#x} is outside the {}-byte sample table",
                        self.tbl.len()
                    ),
                )
            })?
            .to_vec();
        let info = record
            .record("waveInfo")
            .map_err(|e| self.malformed(offset, e.to_string()))?;

        let wave_type: u8 = self.int(&record, "type", offset)?;
        let (form, file) = match wave_type {
            AL_ADPCM_WAVE => (FormType::Aifc, self.adpcm_file(info, data, sample_rate, offset)?),
            AL_RAW16_WAVE => (FormType::Aiff, self.raw_file(info, data, sample_rate, offset)?),
            other => {
                return Err(self.malformed(offset, format!("unknown wavetable type {other}")));
            }
        };

        let name = format!(
            "{}.{}",
            ObjectKind::Wavetable.offset_name(offset),
            form.extension()
        );
        let bytes = file.to_bytes()?;
        tracing::debug!(offset, name = %name, len = bytes.len(), "regenerated sample file");
        self.files.insert(name.clone(), bytes);
        self.add(ObjectKind::Wavetable, offset, Wavetable::from_file(name.as_str()));
        Ok(name)
    }

    fn adpcm_file(
        &self,
        info: &Record,
        data: Vec<u8>,
        sample_rate: i32,
        at: u32,
    ) -> BankResult<AiffFile> {
        let book_offset = self.required(info, "book", at)?;
        let book_record = self.decode(adpcm_book_schema(), "ADPCM codebook", book_offset)?;
        let book = VadpcmCodebook::from_record(&book_record, "book")
            .map_err(|e| self.malformed(book_offset, e.to_string()))?;

        let params = SoundParams {
            compression: Some(vadpcm_compression()),
            ..SoundParams::mono16(f64::from(sample_rate))
        };
        let mut file = AiffFile::pcm(FormType::Aifc, params, data).with_chunk(
            LocalChunk::Application(VadpcmRecord::Codebook(book).to_application()?),
        );

        let loop_offset: u32 = self.int(info, "loop", at)?;
        if loop_offset != 0 {
            let loop_record = self.decode(adpcm_loop_schema(), "ADPCM loop", loop_offset)?;
            let vadpcm_loop = VadpcmLoop::from_record(&loop_record)
                .map_err(|e| self.malformed(loop_offset, e.to_string()))?;
            let loops = VadpcmLoops {
                version: VADPCM_VERSION,
                loops: vec![vadpcm_loop],
            };
            file = file.with_chunk(LocalChunk::Application(
                VadpcmRecord::Loops(loops).to_application()?,
            ));
        }
        Ok(file)
    }

    fn raw_file(
        &self,
        info: &Record,
        data: Vec<u8>,
        sample_rate: i32,
        at: u32,
    ) -> BankResult<AiffFile> {
        let file = AiffFile::pcm(
            FormType::Aiff,
            SoundParams::mono16(f64::from(sample_rate)),
            data,
        );
        let loop_offset: u32 = self.int(info, "loop", at)?;
        if loop_offset == 0 {
            return Ok(file);
        }

        let loop_record = self.decode(raw_loop_schema(), "raw loop", loop_offset)?;
        let start: u32 = self.int(&loop_record, "start", loop_offset)?;
        let end: u32 = self.int(&loop_record, "end", loop_offset)?;
        let count: u32 = self.int(&loop_record, "count", loop_offset)?;
        if count != LOOP_FOREVER {
            tracing::warn!(offset = loop_offset, count, "sample files only keep endless loops");
        }

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
        Ok(file
            .with_chunk(LocalChunk::Markers(markers))
            .with_chunk(LocalChunk::Instrument(inst)))
    }
}

impl fmt::Display for DecompiledBank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for kind in [
            ObjectKind::Bank,
            ObjectKind::Instrument,
            ObjectKind::Sound,
            ObjectKind::Keymap,
            ObjectKind::Envelope,
        ] {
            for object in self.of_kind(kind) {
                if !first {
                    f.write_char('\n')?;
                }
                first = false;
                render_object(f, object)?;
            }
        }
        Ok(())
    }
}

fn render_object(f: &mut fmt::Formatter<'_>, object: &BankObject) -> fmt::Result {
    match object {
        BankObject::Bank(bank) => {
            writeln!(f, "bank {} {{", bank.name)?;
            writeln!(f, "    sampleRate = {};", bank.sample_rate)?;
            if let Some(percussion) = &bank.percussion_default {
                writeln!(f, "    percussionDefault = {percussion};")?;
            }
            for (program, slot) in bank.instruments.iter().enumerate() {
                if let Some(name) = slot {
                    writeln!(f, "    instrument [{program}] = {name};")?;
                }
            }
        }
        BankObject::Instrument(inst) => {
            writeln!(f, "instrument {} {{", inst.name)?;
            writeln!(f, "    volume = {};", inst.volume)?;
            writeln!(f, "    pan = {};", inst.pan)?;
            writeln!(f, "    priority = {};", inst.priority)?;
            writeln!(f, "    flags = {};", inst.flags)?;
            writeln!(f, "    tremType = {};", inst.trem_type)?;
            writeln!(f, "    tremRate = {};", inst.trem_rate)?;
            writeln!(f, "    tremDepth = {};", inst.trem_depth)?;
            writeln!(f, "    tremDelay = {};", inst.trem_delay)?;
            writeln!(f, "    vibType = {};", inst.vib_type)?;
            writeln!(f, "    vibRate = {};", inst.vib_rate)?;
            writeln!(f, "    vibDepth = {};", inst.vib_depth)?;
            writeln!(f, "    vibDelay = {};", inst.vib_delay)?;
            writeln!(f, "    bendRange = {};", inst.bend_range)?;
            for sound in &inst.sounds {
                writeln!(f, "    sound = {sound};")?;
            }
        }
        BankObject::Sound(sound) => {
            writeln!(f, "sound {} {{", sound.name)?;
            writeln!(f, "    use (\"{}\");", sound.file)?;
            writeln!(f, "    pan = {};", sound.pan)?;
            writeln!(f, "    volume = {};", sound.volume)?;
            writeln!(f, "    keymap = {};", sound.keymap)?;
            writeln!(f, "    envelope = {};", sound.envelope)?;
        }
        BankObject::Keymap(keymap) => {
            writeln!(f, "keymap {} {{", keymap.name)?;
            writeln!(f, "    velocityMin = {};", keymap.velocity_min)?;
            writeln!(f, "    velocityMax = {};", keymap.velocity_max)?;
            writeln!(f, "    keyMin = {};", keymap.key_min)?;
            writeln!(f, "    keyMax = {};", keymap.key_max)?;
            writeln!(f, "    keyBase = {};", keymap.key_base)?;
            writeln!(f, "    detune = {};", keymap.detune)?;
        }
        BankObject::Envelope(envelope) => {
            writeln!(f, "envelope {} {{", envelope.name)?;
            writeln!(f, "    attackTime = {};", envelope.attack_time)?;
            writeln!(f, "    attackVolume = {};", envelope.attack_volume)?;
            writeln!(f, "    decayTime = {};", envelope.decay_time)?;
            writeln!(f, "    decayVolume = {};", envelope.decay_volume)?;
            writeln!(f, "    releaseTime = {};", envelope.release_time)?;
        }
        BankObject::Wavetable(wavetable) => {
            writeln!(f, "wavetable {} {{", wavetable.name)?;
            writeln!(f, "    use (\"{}\");", wavetable.file)?;
        }
    }
    writeln!(f, "}}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LinkerConfig;
    use crate::linker::BankBuilder;
    use pretty_assertions::assert_eq;

    fn linked() -> (Vec<u8>, Vec<u8>) {
        let sample = AiffFile::pcm(FormType::Aiff, SoundParams::mono16(22050.0), vec![5; 8])
            .to_bytes()
            .unwrap();
        let mut builder = BankBuilder::new(
            LinkerConfig::default(),
            MemorySampleSource::new().with("a.aiff", sample),
        )
        .unwrap();
        builder.insert(Envelope::new("env")).unwrap();
        builder.insert(Keymap::new("km")).unwrap();
        builder.insert(Sound::new("s", "a.aiff", "km", "env")).unwrap();
        builder
            .insert(Instrument::new("i", vec!["s".to_string()]))
            .unwrap();
        let mut bank = Bank::new("b");
        bank.sample_rate = 22050;
        bank.instruments = vec![Some("i".to_string()), None];
        builder.insert(bank).unwrap();
        let binary = builder.build().unwrap();
        (binary.ctl, binary.tbl)
    }

    #[test]
    fn test_names_follow_offsets() {
        let (ctl, tbl) = linked();
        let bank = decompile(&ctl, 0, &tbl).unwrap();
        assert!(bank.get(ObjectKind::Envelope, "Envelope8").is_some());
        assert!(bank.get(ObjectKind::Keymap, "Keymap18").is_some());
        assert!(bank.get(ObjectKind::Wavetable, "Wavetable20.aiff").is_some());
        assert!(bank.files.contains_key("Wavetable20.aiff"));
        match bank.objects.last() {
            Some(BankObject::Bank(b)) => {
                assert_eq!(b.sample_rate, 22050);
                assert_eq!(b.instruments, vec![Some("Instrument48".to_string()), None]);
            }
            other => panic!("expected bank last, got {other:?}"),
        }
    }

    #[test]
    fn test_regenerated_sample_keeps_data_and_rate() {
        let (ctl, tbl) = linked();
        let bank = decompile(&ctl, 0, &tbl).unwrap();
        let file = AiffFile::parse(&bank.files["Wavetable20.aiff"]).unwrap();
        assert_eq!(file.sound_data().unwrap(), &[5; 8]);
        assert_eq!(file.sample_rate().unwrap(), 22050.0);
    }

    #[test]
    fn test_ctl_start_offsets_into_region() {
        let (ctl, tbl) = linked();
        let mut region = vec![0xEE; 16];
        region.extend_from_slice(&ctl);
        assert_eq!(
            decompile(&region, 16, &tbl).unwrap(),
            decompile(&ctl, 0, &tbl).unwrap()
        );
    }

    #[test]
    fn test_wrong_revision() {
        let (mut ctl, tbl) = linked();
        ctl[1] = b'2';
        assert!(matches!(
            decompile(&ctl, 0, &tbl),
            Err(BankError::UnsupportedVersion { ref found, .. }) if found == "B2"
        ));
    }

    #[test]
    fn test_truncated_table_is_malformed() {
        let (ctl, tbl) = linked();
        let err = decompile(&ctl[..40], 0, &tbl).unwrap_err();
        assert_eq!(err.code(), "BANK_015");
    }

    #[test]
    fn test_sample_outside_tbl_is_malformed() {
        let (ctl, _) = linked();
        assert!(matches!(
            decompile(&ctl, 0, &[0; 4]),
            Err(BankError::MalformedBank { offset: 0x20, .. })
        ));
    }

    #[test]
    fn test_render() {
        let (ctl, tbl) = linked();
        let text = decompile(&ctl, 0, &tbl).unwrap().render();
        assert!(text.starts_with("bank Bank60 {\n    sampleRate = 22050;\n"));
        assert!(text.contains("    instrument [0] = Instrument48;\n"));
        assert!(!text.contains("instrument [1]"));
        assert!(text.contains("sound Sound38 {\n    use (\"Wavetable20.aiff\");\n"));
        assert!(text.contains("keymap Keymap18 {\n"));
        assert!(text.contains("envelope Envelope8 {\n"));
    }
}
