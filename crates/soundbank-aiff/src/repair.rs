//! Repair of files whose `FORM` length disagrees with their size.
//!
//! Some legacy sound tools wrote a `FORM` length that does not match the
//! bytes that follow. The codec rejects such files; callers that want to
//! accept them run [`repair_form_length`] on the raw bytes first.

use byteorder::{BigEndian, ByteOrder};

use crate::chunk::ChunkId;

const FORM_HEADER_SIZE: usize = 8;

/// Checks whether `buf` starts with a `FORM` chunk whose declared length
/// matches the bytes after its header, allowing one trailing pad byte.
pub fn form_length_is_valid(buf: &[u8]) -> bool {
    match declared_form_length(buf) {
        Some(declared) => {
            let actual = buf.len() - FORM_HEADER_SIZE;
            declared == actual || (declared % 2 == 1 && declared + 1 == actual)
        }
        None => true,
    }
}

fn declared_form_length(buf: &[u8]) -> Option<usize> {
    if buf.len() < FORM_HEADER_SIZE || buf[0..4] != *ChunkId::FORM.as_bytes() {
        return None;
    }
    Some(BigEndian::read_u32(&buf[4..8]) as usize)
}

/// Returns a copy of `buf` with the `FORM` length set to the number of
/// bytes following the header, or `None` when no repair is needed (the
/// length already matches, or the input is not a `FORM`).
pub fn repair_form_length(buf: &[u8]) -> Option<Vec<u8>> {
    if form_length_is_valid(buf) {
        return None;
    }
    let declared = declared_form_length(buf)?;
    let actual = buf.len() - FORM_HEADER_SIZE;
    let actual_u32 = u32::try_from(actual).ok()?;
    tracing::warn!(declared, actual, "repairing FORM length");

    let mut fixed = buf.to_vec();
    BigEndian::write_u32(&mut fixed[4..8], actual_u32);
    Some(fixed)
}
