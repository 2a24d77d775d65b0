//! Field descriptors.

use std::fmt;

use crate::context::Context;
use crate::error::StructResult;
use crate::schema::Schema;
use crate::value::{Record, Value};
use crate::variant::Variant;

/// Byte order of a multi-byte numeric field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    /// Most significant byte first.
    Big,
    /// Least significant byte first.
    Little,
}

/// Function computing a size or count from the fields decoded so far and
/// the caller's context.
pub type LenFn = fn(&Record, &Context) -> StructResult<usize>;

/// A byte width or element count.
#[derive(Clone, Copy)]
pub enum Len {
    /// Literal value.
    Fixed(usize),
    /// Computed from earlier fields and the context.
    Computed(LenFn),
}

impl Len {
    /// Resolves the length against a (partial) record.
    pub fn resolve(&self, record: &Record, ctx: &Context) -> StructResult<usize> {
        match self {
            Len::Fixed(n) => Ok(*n),
            Len::Computed(f) => f(record, ctx),
        }
    }

    /// The literal value, if any.
    pub fn fixed(&self) -> Option<usize> {
        match self {
            Len::Fixed(n) => Some(*n),
            Len::Computed(_) => None,
        }
    }
}

impl From<usize> for Len {
    fn from(n: usize) -> Self {
        Len::Fixed(n)
    }
}

impl From<LenFn> for Len {
    fn from(f: LenFn) -> Self {
        Len::Computed(f)
    }
}

impl fmt::Debug for Len {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Len::Fixed(n) => write!(f, "Fixed({})", n),
            Len::Computed(_) => write!(f, "Computed"),
        }
    }
}

/// A field type that knows how to decode and encode itself.
///
/// Used for encodings the declarative fields cannot describe, such as a
/// length-prefixed string padded to an even size.
pub trait FieldCodec: Send + Sync {
    /// Name used in diagnostics.
    fn name(&self) -> &'static str;

    /// Decodes a value at `offset`, returning it with the bytes consumed.
    fn decode(&self, buf: &[u8], offset: usize, ctx: &Context) -> StructResult<(Value, usize)>;

    /// Encodes a value.
    fn encode(&self, value: &Value, ctx: &Context) -> StructResult<Vec<u8>>;
}

/// How a field's bytes are interpreted.
#[derive(Clone, Copy)]
pub enum FieldType {
    /// Unsigned integer, 1/2/4/8 bytes.
    UInt,
    /// Signed integer, 1/2/4/8 bytes.
    Int,
    /// IEEE-754 single, 4 bytes.
    Float,
    /// IEEE-754 double, 8 bytes.
    Double,
    /// Signed 64-bit integer.
    BigInt,
    /// Unsigned 64-bit integer.
    BigUInt,
    /// Character code, decoded as an unsigned integer.
    Char,
    /// Opaque byte run.
    Bytes,
    /// UTF-8 text.
    Utf8,
    /// Nested schema.
    Struct(&'static Schema),
    /// One of several fixed-size schemas chosen by earlier fields.
    Variant(&'static Variant),
    /// Self-describing custom codec.
    Custom(&'static dyn FieldCodec),
}

impl fmt::Debug for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::UInt => write!(f, "UInt"),
            FieldType::Int => write!(f, "Int"),
            FieldType::Float => write!(f, "Float"),
            FieldType::Double => write!(f, "Double"),
            FieldType::BigInt => write!(f, "BigInt"),
            FieldType::BigUInt => write!(f, "BigUInt"),
            FieldType::Char => write!(f, "Char"),
            FieldType::Bytes => write!(f, "Bytes"),
            FieldType::Utf8 => write!(f, "Utf8"),
            FieldType::Struct(s) => write!(f, "Struct({})", s.name()),
            FieldType::Variant(v) => write!(f, "Variant({})", v.name()),
            FieldType::Custom(c) => write!(f, "Custom({})", c.name()),
        }
    }
}

/// A single field of a schema.
#[derive(Debug, Clone)]
pub struct Field {
    pub(crate) name: &'static str,
    pub(crate) ty: FieldType,
    pub(crate) size: Option<Len>,
    pub(crate) endian: Option<Endian>,
    pub(crate) align: Option<usize>,
    pub(crate) count: Option<Len>,
    pub(crate) default: Option<Value>,
}

impl Field {
    /// Creates a field of any type.
    pub fn new(name: &'static str, ty: FieldType) -> Self {
        Self {
            name,
            ty,
            size: None,
            endian: None,
            align: None,
            count: None,
            default: None,
        }
    }

    /// Unsigned integer of `width` bytes.
    pub fn uint(name: &'static str, width: usize) -> Self {
        Self::new(name, FieldType::UInt).sized(width)
    }

    /// Signed integer of `width` bytes.
    pub fn int(name: &'static str, width: usize) -> Self {
        Self::new(name, FieldType::Int).sized(width)
    }

    /// Single-byte character code.
    pub fn char(name: &'static str) -> Self {
        Self::new(name, FieldType::Char).sized(1)
    }

    /// 32-bit float.
    pub fn float(name: &'static str) -> Self {
        Self::new(name, FieldType::Float).sized(4)
    }

    /// 64-bit float.
    pub fn double(name: &'static str) -> Self {
        Self::new(name, FieldType::Double).sized(8)
    }

    /// Signed 64-bit integer.
    pub fn big_int(name: &'static str) -> Self {
        Self::new(name, FieldType::BigInt).sized(8)
    }

    /// Unsigned 64-bit integer.
    pub fn big_uint(name: &'static str) -> Self {
        Self::new(name, FieldType::BigUInt).sized(8)
    }

    /// Opaque byte run.
    pub fn bytes(name: &'static str, size: impl Into<Len>) -> Self {
        Self::new(name, FieldType::Bytes).sized(size)
    }

    /// UTF-8 text of a given byte length.
    pub fn utf8(name: &'static str, size: impl Into<Len>) -> Self {
        Self::new(name, FieldType::Utf8).sized(size)
    }

    /// Nested schema.
    pub fn nested(name: &'static str, schema: &'static Schema) -> Self {
        Self::new(name, FieldType::Struct(schema))
    }

    /// Variant (union) slot.
    pub fn variant(name: &'static str, variant: &'static Variant) -> Self {
        Self::new(name, FieldType::Variant(variant))
    }

    /// Field handled by a custom codec.
    pub fn custom(name: &'static str, codec: &'static dyn FieldCodec) -> Self {
        Self::new(name, FieldType::Custom(codec))
    }

    /// Sets the byte width (or, for nested fields, the reserved size).
    pub fn sized(mut self, size: impl Into<Len>) -> Self {
        self.size = Some(size.into());
        self
    }

    /// Overrides the schema's byte order for this field.
    pub fn endian(mut self, endian: Endian) -> Self {
        self.endian = Some(endian);
        self
    }

    /// Pads the field (each element, for arrays) to a multiple of `modulus`.
    pub fn align(mut self, modulus: usize) -> Self {
        self.align = Some(modulus);
        self
    }

    /// Makes the field an array of `count` elements.
    pub fn array(mut self, count: impl Into<Len>) -> Self {
        self.count = Some(count.into());
        self
    }

    /// Value written when a record being encoded omits this field.
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Field name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Field type.
    pub fn ty(&self) -> FieldType {
        self.ty
    }

    /// Literal size, if declared.
    pub fn fixed_size(&self) -> Option<usize> {
        self.size.and_then(|s| s.fixed())
    }

    /// Returns true if the field is an array.
    pub fn is_array(&self) -> bool {
        self.count.is_some()
    }
}
