//! Sequence banks: a header of `{offset, len}` entries followed by the raw
//! sequence data. The first sequence follows the header directly; each
//! sequence is padded to a multiple of 8 bytes.

use std::sync::OnceLock;

use soundbank_struct::{
    align_to, Context, Endian, Field, Len, Record, Schema, StructResult, Value,
};

use crate::error::{BankError, BankResult};

/// Revision tag of sequence banks.
pub const SEQUENCE_REVISION: &str = "S1";

/// Padding granularity of each sequence.
pub const SEQUENCE_ALIGNMENT: usize = 8;

fn seq_count(record: &Record, _ctx: &Context) -> StructResult<usize> {
    record.usize("seqCount")
}

/// `ALSeqData`
pub fn seq_data_schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        Schema::builder("ALSeqData", Endian::Big)
            .field(Field::uint("offset", 4))
            .field(Field::int("len", 4))
            .build()
    })
}

/// `ALSeqFile`
pub fn seq_file_schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        Schema::builder("ALSeqFile", Endian::Big)
            .field(Field::bytes("revision", 2usize))
            .field(Field::int("seqCount", 2))
            .field(Field::nested("seqArray", seq_data_schema()).array(Len::Computed(seq_count)))
            .build()
    })
}

/// An ordered collection of sequences.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SequenceBank {
    pub sequences: Vec<Vec<u8>>,
}

impl SequenceBank {
    pub fn new(sequences: Vec<Vec<u8>>) -> Self {
        Self { sequences }
    }

    /// Parses a sequence bank.
    pub fn parse(buf: &[u8]) -> BankResult<Self> {
        let revision = buf
            .get(0..2)
            .ok_or_else(|| BankError::malformed(0, "missing sequence bank header"))?;
        if revision != SEQUENCE_REVISION.as_bytes() {
            return Err(BankError::UnsupportedVersion {
                format: "sequence bank",
                expected: SEQUENCE_REVISION.to_string(),
                found: String::from_utf8_lossy(revision).into_owned(),
            });
        }

        let (header, _) = seq_file_schema()
            .decode(buf, 0, &Context::new())
            .map_err(|e| BankError::malformed(0, format!("sequence bank header: {e}")))?;
        let entries = header
            .array("seqArray")
            .map_err(|e| BankError::malformed(0, e.to_string()))?;

        let mut sequences = Vec::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            let at = 4 + index * 8;
            let entry = entry
                .as_record()
                .ok_or_else(|| BankError::malformed(at, "sequence entry is not a record"))?;
            let offset = entry
                .usize("offset")
                .map_err(|e| BankError::malformed(at, e.to_string()))?;
            let len = entry
                .usize("len")
                .map_err(|_| BankError::malformed(at, "sequence length is negative"))?;
            let data = offset
                .checked_add(len)
                .and_then(|end| buf.get(offset..end))
                .ok_or_else(|| {
                    BankError::malformed(
                        at,
                        format!("sequence {index} at {offset:#x}+{len:#x} runs past the bank"),
                    )
                })?;
            sequences.push(data.to_vec());
        }
        tracing::debug!(sequences = sequences.len(), "parsed sequence bank");
        Ok(Self { sequences })
    }

    fn header(&self, entries: &[(u32, usize)]) -> BankResult<Vec<u8>> {
        let entries = entries
            .iter()
            .map(|&(offset, len)| {
                Value::Record(
                    Record::new()
                        .with("offset", offset)
                        .with("len", len as u64),
                )
            })
            .collect::<Vec<_>>();
        let record = Record::new()
            .with("revision", SEQUENCE_REVISION.as_bytes())
            .with("seqCount", self.sequences.len() as u64)
            .with("seqArray", entries);
        Ok(seq_file_schema().encode(&record, &Context::new())?)
    }

    /// Encodes the bank. The header is laid out once with empty entries to
    /// find where the first sequence starts, then again with real offsets.
    pub fn to_bytes(&self) -> BankResult<Vec<u8>> {
        let placeholder = vec![(0, 0); self.sequences.len()];
        let header_len = self.header(&placeholder)?.len();

        let mut entries = Vec::with_capacity(self.sequences.len());
        let mut offset = header_len;
        for sequence in &self.sequences {
            let start = u32::try_from(offset).map_err(|_| BankError::TableOverflow {
                table: "sequence",
                size: offset,
            })?;
            entries.push((start, sequence.len()));
            offset += align_to(sequence.len(), SEQUENCE_ALIGNMENT);
        }

        let mut out = self.header(&entries)?;
        for (sequence, &(start, _)) in self.sequences.iter().zip(&entries) {
            out.resize(start as usize, 0);
            out.extend_from_slice(sequence);
        }
        out.resize(offset, 0);
        Ok(out)
    }
}
