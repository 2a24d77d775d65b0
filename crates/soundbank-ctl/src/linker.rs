//! Links symbolic bank objects into a metadata table (`.ctl`) and a sample
//! table (`.tbl`).
//!
//! Objects are resolved depth-first from each bank: an object's
//! dependencies are written before the object itself, and every object is
//! written once no matter how often it is referenced. The file header comes
//! first in the metadata table; it is reserved with zero offsets and patched
//! once the banks have been resolved.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};

use soundbank_aiff::{AiffError, AiffFile, Compression, PlayMode, VADPCM_COMPRESSION};
use soundbank_struct::{Context, Record, Schema, Value};

use crate::config::LinkerConfig;
use crate::error::{BankError, BankResult};
use crate::layout::{
    adpcm_book_schema, adpcm_loop_schema, bank_file_schema, bank_schema, envelope_schema,
    instrument_schema, keymap_schema, raw_loop_schema, sound_schema, wavetable_schema,
    AL_ADPCM_WAVE, AL_RAW16_WAVE, LOOP_FOREVER,
};
use crate::model::{
    Bank, BankObject, Envelope, Instrument, Keymap, ObjectKind, Sound, Wavetable,
};
use crate::source::SampleSource;
use crate::table::Table;

/// The two tables of a linked bank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BankBinary {
    /// Metadata table.
    pub ctl: Vec<u8>,
    /// Sample table.
    pub tbl: Vec<u8>,
    /// BLAKE3 digest of both tables, hex encoded.
    pub hash: String,
}

impl BankBinary {
    /// Wraps two tables and computes their digest.
    pub fn new(ctl: Vec<u8>, tbl: Vec<u8>) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&ctl);
        hasher.update(&tbl);
        let hash = hasher.finalize().to_hex().to_string();
        Self { ctl, tbl, hash }
    }

    /// Output paths for a prefix: `<prefix>.ctl` and `<prefix>.tbl`.
    pub fn file_names(prefix: impl AsRef<Path>) -> (PathBuf, PathBuf) {
        let prefix = prefix.as_ref();
        (with_suffix(prefix, "ctl"), with_suffix(prefix, "tbl"))
    }

    /// Writes both tables next to `prefix` and returns their paths.
    pub fn write_files(&self, prefix: impl AsRef<Path>) -> BankResult<(PathBuf, PathBuf)> {
        let (ctl_path, tbl_path) = Self::file_names(prefix);
        std::fs::write(&ctl_path, &self.ctl)?;
        std::fs::write(&tbl_path, &self.tbl)?;
        tracing::info!(
            ctl = %ctl_path.display(),
            tbl = %tbl_path.display(),
            hash = %self.hash,
            "wrote bank files"
        );
        Ok((ctl_path, tbl_path))
    }
}

fn with_suffix(prefix: &Path, extension: &str) -> PathBuf {
    let mut name = prefix.as_os_str().to_owned();
    name.push(".");
    name.push(extension);
    PathBuf::from(name)
}

/// The object and field holding a reference.
#[derive(Debug, Clone, Copy)]
struct Referrer<'a> {
    kind: ObjectKind,
    name: &'a str,
    field: &'static str,
}

#[derive(Debug, Clone, Copy)]
struct SampleRef {
    base: u32,
    len: usize,
}

/// Builds a bank from symbolic objects.
///
/// A builder is single-use: after [`BankBuilder::build`] it rejects further
/// inserts and builds.
pub struct BankBuilder<S> {
    config: LinkerConfig,
    source: S,
    objects: BTreeMap<ObjectKind, BTreeMap<String, BankObject>>,
    banks: Vec<String>,
    synthesized: HashSet<String>,
    ctl: Table,
    tbl: Table,
    header: Option<(u32, usize)>,
    resolved: HashMap<(ObjectKind, String), u32>,
    samples: HashMap<String, SampleRef>,
    built: bool,
}

impl<S: SampleSource> BankBuilder<S> {
    /// Creates an empty builder reading samples from `source`.
    pub fn new(config: LinkerConfig, source: S) -> BankResult<Self> {
        config.validate()?;
        let ctl = Table::new("ctl", config.ctl_alignment);
        let tbl = Table::new("tbl", config.tbl_alignment);
        Ok(Self {
            config,
            source,
            objects: BTreeMap::new(),
            banks: Vec::new(),
            synthesized: HashSet::new(),
            ctl,
            tbl,
            header: None,
            resolved: HashMap::new(),
            samples: HashMap::new(),
            built: false,
        })
    }

    /// Configuration in use.
    pub fn config(&self) -> &LinkerConfig {
        &self.config
    }

    fn ensure_unbuilt(&self) -> BankResult<()> {
        if self.built {
            Err(BankError::AlreadyBuilt)
        } else {
            Ok(())
        }
    }

    /// Adds an object. Names must be unique within a kind.
    ///
    /// Inserting a sound whose `file` names no wavetable also adds a
    /// wavetable of that name loading that path. A wavetable inserted later
    /// under the same name replaces the added one.
    pub fn insert(&mut self, object: impl Into<BankObject>) -> BankResult<()> {
        self.ensure_unbuilt()?;
        let object = object.into();
        let kind = object.kind();
        let name = object.name().to_string();
        let replaces_synthesized =
            kind == ObjectKind::Wavetable && self.synthesized.remove(&name);
        if self.contains(kind, &name) && !replaces_synthesized {
            return Err(BankError::DuplicateObject { kind, name });
        }

        let synthesized = match &object {
            BankObject::Sound(sound) if !self.contains(ObjectKind::Wavetable, &sound.file) => {
                Some(Wavetable::from_file(sound.file.as_str()))
            }
            _ => None,
        };

        if kind == ObjectKind::Bank {
            self.banks.push(name.clone());
        }
        tracing::debug!(%kind, name = %name, "inserted object");
        self.objects.entry(kind).or_default().insert(name, object);

        if let Some(wavetable) = synthesized {
            tracing::debug!(file = %wavetable.file, "synthesized wavetable");
            self.synthesized.insert(wavetable.name.clone());
            self.objects
                .entry(ObjectKind::Wavetable)
                .or_default()
                .insert(wavetable.name.clone(), wavetable.into());
        }
        Ok(())
    }

    /// Adds several objects in order.
    pub fn insert_all(&mut self, objects: impl IntoIterator<Item = BankObject>) -> BankResult<()> {
        for object in objects {
            self.insert(object)?;
        }
        Ok(())
    }

    /// Looks up an inserted object.
    pub fn get(&self, kind: ObjectKind, name: &str) -> Option<&BankObject> {
        self.objects.get(&kind).and_then(|objects| objects.get(name))
    }

    fn contains(&self, kind: ObjectKind, name: &str) -> bool {
        self.get(kind, name).is_some()
    }

    /// Writes an object and everything it depends on, returning its offset
    /// in the metadata table. Resolving an object again returns the same
    /// offset without writing anything.
    pub fn resolve(&mut self, kind: ObjectKind, name: &str) -> BankResult<u32> {
        self.ensure_unbuilt()?;
        if !self.contains(kind, name) {
            return Err(BankError::UnknownObject {
                kind,
                name: name.to_string(),
            });
        }
        self.reserve_header()?;
        self.resolve_object(kind, name)
    }

    /// Resolves every bank, patches the header and hands out both tables.
    pub fn build(&mut self) -> BankResult<BankBinary> {
        self.ensure_unbuilt()?;
        let (header_offset, header_len) = self.reserve_header()?;

        let banks = self.banks.clone();
        let mut offsets = Vec::with_capacity(banks.len());
        for name in &banks {
            offsets.push(self.resolve_object(ObjectKind::Bank, name)?);
        }
        let header = self.encode_header(&offsets)?;
        self.ctl.patch(header_offset, header_len, &header)?;

        self.built = true;
        let binary = BankBinary::new(self.ctl.take(), self.tbl.take());
        tracing::info!(
            banks = banks.len(),
            ctl_len = binary.ctl.len(),
            tbl_len = binary.tbl.len(),
            "built bank"
        );
        Ok(binary)
    }

    fn encode_header(&self, bank_offsets: &[u32]) -> BankResult<Vec<u8>> {
        let record = Record::new()
            .with("revision", self.config.revision.as_bytes().to_vec())
            .with("bankCount", bank_offsets.len() as u64)
            .with("bankArray", Value::array_of(bank_offsets.iter().copied()));
        Ok(bank_file_schema().encode(&record, &Context::new())?)
    }

    fn reserve_header(&mut self) -> BankResult<(u32, usize)> {
        if let Some(header) = self.header {
            return Ok(header);
        }
        let placeholder = self.encode_header(&vec![0; self.banks.len()])?;
        let offset = self.ctl.insert(&placeholder)?;
        let header = (offset, placeholder.len());
        self.header = Some(header);
        Ok(header)
    }

    fn resolve_ref(&mut self, kind: ObjectKind, name: &str, from: Referrer<'_>) -> BankResult<u32> {
        if !self.contains(kind, name) {
            let found = ObjectKind::ALL
                .into_iter()
                .find(|other| self.contains(*other, name));
            return Err(match found {
                Some(found) => BankError::WrongReferenceKind {
                    expected: kind,
                    found,
                    name: name.to_string(),
                    from_kind: from.kind,
                    from_name: from.name.to_string(),
                    field: from.field,
                },
                None => BankError::UnresolvedReference {
                    kind,
                    name: name.to_string(),
                    from_kind: from.kind,
                    from_name: from.name.to_string(),
                    field: from.field,
                },
            });
        }
        self.resolve_object(kind, name)
    }

    fn resolve_object(&mut self, kind: ObjectKind, name: &str) -> BankResult<u32> {
        let key = (kind, name.to_string());
        if let Some(&offset) = self.resolved.get(&key) {
            return Ok(offset);
        }
        let object = self
            .get(kind, name)
            .cloned()
            .ok_or_else(|| BankError::UnknownObject {
                kind,
                name: name.to_string(),
            })?;

        let offset = match &object {
            BankObject::Bank(bank) => self.link_bank(bank)?,
            BankObject::Instrument(inst) => self.link_instrument(inst)?,
            BankObject::Sound(sound) => self.link_sound(sound)?,
            BankObject::Keymap(keymap) => self.link_keymap(keymap)?,
            BankObject::Envelope(envelope) => self.link_envelope(envelope)?,
            BankObject::Wavetable(wavetable) => self.link_wavetable(wavetable)?,
        };
        tracing::debug!(%kind, name, offset, "resolved object");
        self.resolved.insert(key, offset);
        Ok(offset)
    }

    fn emit(&mut self, schema: &'static Schema, record: &Record) -> BankResult<u32> {
        let bytes = schema.encode(record, &Context::new())?;
        self.ctl.insert(&bytes)
    }

    fn link_bank(&mut self, bank: &Bank) -> BankResult<u32> {
        let from = |field| Referrer {
            kind: ObjectKind::Bank,
            name: &bank.name,
            field,
        };
        let mut instruments = Vec::with_capacity(bank.instruments.len());
        for slot in &bank.instruments {
            let offset = match slot {
                Some(name) => self.resolve_ref(ObjectKind::Instrument, name, from("instruments"))?,
                None => 0,
            };
            instruments.push(offset);
        }
        let percussion = match &bank.percussion_default {
            Some(name) => {
                self.resolve_ref(ObjectKind::Instrument, name, from("percussionDefault"))?
            }
            None => 0,
        };

        let record = Record::new()
            .with("instCount", instruments.len() as u64)
            .with("flags", bank.flags)
            .with("sampleRate", bank.sample_rate)
            .with("percussion", percussion)
            .with("instArray", Value::array_of(instruments));
        self.emit(bank_schema(), &record)
    }

    fn link_instrument(&mut self, inst: &Instrument) -> BankResult<u32> {
        let from = Referrer {
            kind: ObjectKind::Instrument,
            name: &inst.name,
            field: "sounds",
        };
        let mut sounds = Vec::with_capacity(inst.sounds.len());
        for name in &inst.sounds {
            sounds.push(self.resolve_ref(ObjectKind::Sound, name, from)?);
        }

        let record = Record::new()
            .with("volume", inst.volume)
            .with("pan", inst.pan)
            .with("priority", inst.priority)
            .with("flags", inst.flags)
            .with("tremType", inst.trem_type)
            .with("tremRate", inst.trem_rate)
            .with("tremDepth", inst.trem_depth)
            .with("tremDelay", inst.trem_delay)
            .with("vibType", inst.vib_type)
            .with("vibRate", inst.vib_rate)
            .with("vibDepth", inst.vib_depth)
            .with("vibDelay", inst.vib_delay)
            .with("bendRange", inst.bend_range)
            .with("soundCount", sounds.len() as u64)
            .with("soundArray", Value::array_of(sounds));
        self.emit(instrument_schema(), &record)
    }

    fn link_sound(&mut self, sound: &Sound) -> BankResult<u32> {
        let from = |field| Referrer {
            kind: ObjectKind::Sound,
            name: &sound.name,
            field,
        };
        let envelope = self.resolve_ref(ObjectKind::Envelope, &sound.envelope, from("envelope"))?;
        let keymap = self.resolve_ref(ObjectKind::Keymap, &sound.keymap, from("keymap"))?;
        let wavetable = self.resolve_ref(ObjectKind::Wavetable, &sound.file, from("file"))?;

        let record = Record::new()
            .with("envelope", envelope)
            .with("keyMap", keymap)
            .with("wavetable", wavetable)
            .with("samplePan", sound.pan)
            .with("sampleVolume", sound.volume)
            .with("flags", sound.flags);
        self.emit(sound_schema(), &record)
    }

    fn link_keymap(&mut self, keymap: &Keymap) -> BankResult<u32> {
        let record = Record::new()
            .with("velocityMin", keymap.velocity_min)
            .with("velocityMax", keymap.velocity_max)
            .with("keyMin", keymap.key_min)
            .with("keyMax", keymap.key_max)
            .with("keyBase", keymap.key_base)
            .with("detune", keymap.detune);
        self.emit(keymap_schema(), &record)
    }

    fn link_envelope(&mut self, envelope: &Envelope) -> BankResult<u32> {
        let record = Record::new()
            .with("attackTime", envelope.attack_time)
            .with("decayTime", envelope.decay_time)
            .with("releaseTime", envelope.release_time)
            .with("attackVolume", envelope.attack_volume)
            .with("decayVolume", envelope.decay_volume);
        self.emit(envelope_schema(), &record)
    }

    fn insert_sample(&mut self, path: &str, data: &[u8]) -> BankResult<SampleRef> {
        if let Some(&sample) = self.samples.get(path) {
            return Ok(sample);
        }
        let sample = SampleRef {
            base: self.tbl.insert(data)?,
            len: data.len(),
        };
        tracing::debug!(path, base = sample.base, len = sample.len, "inserted sample");
        self.samples.insert(path.to_string(), sample);
        Ok(sample)
    }

    fn link_wavetable(&mut self, wavetable: &Wavetable) -> BankResult<u32> {
        let bytes = self.source.load(&wavetable.file)?;
        let file = AiffFile::parse(&bytes)?;
        let sample = self.insert_sample(&wavetable.file, file.sound_data()?)?;

        let compression = file.common()?.compression.clone();
        let (wave_type, wave_info) = match compression {
            Some(c) if c.kind == VADPCM_COMPRESSION => {
                (AL_ADPCM_WAVE, self.link_adpcm_info(&file, &wavetable.file)?)
            }
            Some(c) if c.kind != Compression::none().kind => {
                return Err(AiffError::Compressed {
                    compression: c.kind.to_string(),
                }
                .into());
            }
            _ => (AL_RAW16_WAVE, self.link_raw_info(&file)?),
        };

        let record = Record::new()
            .with("base", sample.base)
            .with("len", sample.len as u64)
            .with("type", wave_type)
            .with("flags", 0u8)
            .with("waveInfo", wave_info);
        self.emit(wavetable_schema(), &record)
    }

    fn link_adpcm_info(&mut self, file: &AiffFile, path: &str) -> BankResult<Record> {
        let book = file.vadpcm_codebook()?.ok_or_else(|| BankError::MissingCodebook {
            path: path.to_string(),
        })?;
        let first_loop = file.vadpcm_loops()?.and_then(|loops| loops.loops.first().copied());
        let loop_offset = match first_loop {
            Some(vadpcm_loop) => self.emit(adpcm_loop_schema(), &vadpcm_loop.to_record())?,
            None => 0,
        };

        let book_record = Record::new()
            .with("order", book.order)
            .with("npredictors", book.predictors)
            .with("book", Value::array_of(book.coefficients.iter().copied()));
        let book_offset = self.emit(adpcm_book_schema(), &book_record)?;

        Ok(Record::new()
            .with("loop", loop_offset)
            .with("book", book_offset))
    }

    fn link_raw_info(&mut self, file: &AiffFile) -> BankResult<Record> {
        let loop_offset = match forward_loop(file)? {
            Some((start, end)) => {
                let record = Record::new()
                    .with("start", start)
                    .with("end", end)
                    .with("count", LOOP_FOREVER);
                self.emit(raw_loop_schema(), &record)?
            }
            None => 0,
        };
        Ok(Record::new().with("loop", loop_offset))
    }
}

/// Sample frame range of the instrument's sustain loop, when it loops
/// forward between two existing markers.
fn forward_loop(file: &AiffFile) -> BankResult<Option<(u32, u32)>> {
    let Some(inst) = file.instrument() else {
        return Ok(None);
    };
    let sustain = inst.sustain_loop;
    if sustain.mode()? != PlayMode::Forward {
        return Ok(None);
    }
    match (file.marker(sustain.begin_loop), file.marker(sustain.end_loop)) {
        (Some(begin), Some(end)) => Ok(Some((begin.position, end.position))),
        _ => {
            tracing::warn!(
                begin = sustain.begin_loop,
                end = sustain.end_loop,
                "sustain loop refers to missing markers, ignoring it"
            );
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests;
