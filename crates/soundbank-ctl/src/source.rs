//! Where the linker gets sample files from.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{BankError, BankResult};

/// Supplies the bytes of AIFF/AIFF-C sample files by path.
pub trait SampleSource {
    /// Loads the file at `path`.
    fn load(&self, path: &str) -> BankResult<Vec<u8>>;
}

/// Sample files held in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemorySampleSource {
    files: BTreeMap<String, Vec<u8>>,
}

impl MemorySampleSource {
    /// Creates an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file.
    pub fn insert(&mut self, path: impl Into<String>, bytes: Vec<u8>) {
        self.files.insert(path.into(), bytes);
    }

    /// Adds a file, builder style.
    pub fn with(mut self, path: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.insert(path, bytes);
        self
    }

    /// Paths held.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }
}

impl From<BTreeMap<String, Vec<u8>>> for MemorySampleSource {
    fn from(files: BTreeMap<String, Vec<u8>>) -> Self {
        Self { files }
    }
}

impl SampleSource for MemorySampleSource {
    fn load(&self, path: &str) -> BankResult<Vec<u8>> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| BankError::MissingSample {
                path: path.to_string(),
            })
    }
}

/// Sample files read from a directory; paths are relative to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirSampleSource {
    root: PathBuf,
}

impl DirSampleSource {
    /// Creates a source rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl SampleSource for DirSampleSource {
    fn load(&self, path: &str) -> BankResult<Vec<u8>> {
        let full = self.root.join(path);
        tracing::debug!(path = %full.display(), "loading sample");
        std::fs::read(&full).map_err(|source| BankError::SampleRead { path: full, source })
    }
}

impl<S: SampleSource + ?Sized> SampleSource for &S {
    fn load(&self, path: &str) -> BankResult<Vec<u8>> {
        (**self).load(path)
    }
}
