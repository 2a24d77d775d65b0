//! Caller-supplied context for size functions.

use crate::error::{StructError, StructResult};

/// Values threaded through a decode or encode call for size functions that
/// need information the record itself does not carry, such as the length of
/// the enclosing chunk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Context {
    values: Vec<(&'static str, usize)>,
}

impl Context {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter.
    pub fn with(mut self, key: &'static str, value: usize) -> Self {
        self.set(key, value);
        self
    }

    /// Sets a value, replacing any previous one.
    pub fn set(&mut self, key: &'static str, value: usize) {
        match self.values.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.values.push((key, value)),
        }
    }

    /// Looks up a value, failing if it was not supplied.
    pub fn get(&self, key: &'static str) -> StructResult<usize> {
        self.values
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| *v)
            .ok_or(StructError::MissingContext { key })
    }
}
