//! C-style unions: one of several fixed-size schemas chosen at runtime.

use crate::context::Context;
use crate::error::{StructError, StructResult};
use crate::schema::Schema;
use crate::value::Record;

/// Discriminant function: picks a member from the fields decoded so far.
pub type SelectFn = fn(&Record, &Context) -> Option<&'static Schema>;

/// A fixed set of statically-sized member schemas sharing one reserved slot.
///
/// The slot is as large as the largest member. Smaller members are
/// zero-padded on encode; bytes past a member's own fields are skipped on
/// decode.
#[derive(Debug)]
pub struct Variant {
    name: &'static str,
    members: Vec<&'static Schema>,
    select: SelectFn,
    size: Option<usize>,
}

impl Variant {
    /// Creates a variant. The reserved size is computed here, once.
    pub fn new(name: &'static str, members: Vec<&'static Schema>, select: SelectFn) -> Self {
        let size = members
            .iter()
            .map(|m| m.static_size().ok())
            .collect::<Option<Vec<_>>>()
            .and_then(|sizes| sizes.into_iter().max());
        if size.is_none() {
            tracing::warn!(variant = name, "variant member without static size");
        }
        Self {
            name,
            members,
            select,
            size,
        }
    }

    /// Variant name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Member schemas.
    pub fn members(&self) -> &[&'static Schema] {
        &self.members
    }

    /// Size of the reserved slot.
    pub fn size(&self) -> StructResult<usize> {
        self.size
            .ok_or(StructError::UnsizedVariant { variant: self.name })
    }

    /// Resolves the member for a (partial) record. A schema returned by the
    /// discriminant that is not one of the members counts as unresolved.
    pub fn select(&self, record: &Record, ctx: &Context) -> Option<&'static Schema> {
        let chosen = (self.select)(record, ctx)?;
        self.members
            .iter()
            .copied()
            .find(|m| std::ptr::eq(*m, chosen))
    }
}
