//! Byte-identity checks for linked output.

use std::fmt;

/// First byte at which two outputs differ.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffInfo {
    /// Byte offset of the difference.
    pub offset: usize,
    /// Byte of the reference output; `None` past its end.
    pub expected: Option<u8>,
    /// Byte of the compared output; `None` past its end.
    pub actual: Option<u8>,
}

impl fmt::Display for DiffInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |b: Option<u8>| b.map_or("<end>".to_string(), |b| format!("0x{b:02X}"));
        write!(
            f,
            "difference at byte {:#x}: expected {}, got {}",
            self.offset,
            show(self.expected),
            show(self.actual)
        )
    }
}

/// Finds the first differing byte, if any.
pub fn first_difference(expected: &[u8], actual: &[u8]) -> Option<DiffInfo> {
    let offset = expected
        .iter()
        .zip(actual)
        .position(|(a, b)| a != b)
        .or_else(|| (expected.len() != actual.len()).then(|| expected.len().min(actual.len())))?;
    Some(DiffInfo {
        offset,
        expected: expected.get(offset).copied(),
        actual: actual.get(offset).copied(),
    })
}

/// Panics with the first difference when two outputs are not identical.
pub fn assert_bytes_identical(label: &str, expected: &[u8], actual: &[u8]) {
    if let Some(diff) = first_difference(expected, actual) {
        panic!(
            "{label}: outputs differ ({} vs {} bytes), {diff}",
            expected.len(),
            actual.len()
        );
    }
}

/// Outcome of running a generator several times.
#[derive(Debug, Clone)]
pub struct DeterminismResult {
    /// Whether every run matched the first.
    pub is_deterministic: bool,
    /// Number of runs.
    pub runs: usize,
    /// BLAKE3 hash of the first run's output.
    pub hash: String,
    /// First difference found, with the index of the differing run.
    pub diff: Option<(usize, DiffInfo)>,
}

/// Runs `generate` `runs` times and compares every output with the first.
pub fn verify_determinism<F, O>(generate: F, runs: usize) -> DeterminismResult
where
    F: Fn() -> O,
    O: AsRef<[u8]>,
{
    assert!(runs >= 2, "Must run at least 2 times to verify determinism");
    let reference = generate();
    let hash = blake3::hash(reference.as_ref()).to_hex().to_string();
    for run in 1..runs {
        let output = generate();
        if let Some(diff) = first_difference(reference.as_ref(), output.as_ref()) {
            return DeterminismResult {
                is_deterministic: false,
                runs,
                hash,
                diff: Some((run, diff)),
            };
        }
    }
    DeterminismResult {
        is_deterministic: true,
        runs,
        hash,
        diff: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_difference() {
        assert_eq!(first_difference(&[1, 2, 3], &[1, 2, 3]), None);
        assert_eq!(
            first_difference(&[1, 2, 3], &[1, 9, 3]),
            Some(DiffInfo {
                offset: 1,
                expected: Some(2),
                actual: Some(9)
            })
        );
        assert_eq!(
            first_difference(&[1, 2], &[1, 2, 3]),
            Some(DiffInfo {
                offset: 2,
                expected: None,
                actual: Some(3)
            })
        );
    }

    #[test]
    fn test_verify_determinism() {
        let result = verify_determinism(|| vec![4u8; 16], 3);
        assert!(result.is_deterministic);
        assert_eq!(result.hash, blake3::hash(&[4u8; 16]).to_hex().to_string());
    }
}
