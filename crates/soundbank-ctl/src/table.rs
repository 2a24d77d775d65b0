//! Append-only byte tables with aligned entries.

use soundbank_struct::align_to;

use crate::error::{BankError, BankResult};

/// A growable table. Every entry starts and ends on an alignment boundary,
/// so the table length is the sum of the aligned entry lengths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    name: &'static str,
    alignment: usize,
    data: Vec<u8>,
}

impl Table {
    /// Creates an empty table.
    pub fn new(name: &'static str, alignment: usize) -> Self {
        Self {
            name,
            alignment,
            data: Vec::new(),
        }
    }

    /// Appends an entry and returns its offset.
    pub fn insert(&mut self, bytes: &[u8]) -> BankResult<u32> {
        let offset = self.data.len();
        let end = align_to(offset + bytes.len(), self.alignment);
        if u32::try_from(end).is_err() {
            return Err(BankError::TableOverflow {
                table: self.name,
                size: end,
            });
        }
        self.data.extend_from_slice(bytes);
        self.data.resize(end, 0);
        tracing::trace!(table = self.name, offset, len = bytes.len(), "table insert");
        Ok(offset as u32)
    }

    /// Overwrites an earlier entry in place. The replacement must have the
    /// same length as the entry written at `offset`.
    pub fn patch(&mut self, offset: u32, placeholder_len: usize, bytes: &[u8]) -> BankResult<()> {
        if bytes.len() != placeholder_len {
            return Err(BankError::HeaderSizeChanged {
                placeholder: placeholder_len,
                actual: bytes.len(),
            });
        }
        let start = offset as usize;
        let region = self
            .data
            .get_mut(start..start + bytes.len())
            .ok_or_else(|| {
                BankError::malformed(start, format!("patch past end of {} table", self.name))
            })?;
        region.copy_from_slice(bytes);
        Ok(())
    }

    /// Current length in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True when nothing has been inserted.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Table contents.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Takes the contents, leaving the table empty.
    pub fn take(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.data)
    }
}
