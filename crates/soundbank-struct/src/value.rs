//! Decoded values and records.

use crate::error::{StructError, StructResult};

/// A single decoded field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Unsigned integer (`uint`, `char`, `biguint` fields).
    UInt(u64),
    /// Signed integer (`int`, `bigint` fields).
    Int(i64),
    /// Floating point (`float`, `double` fields).
    Float(f64),
    /// Opaque byte run.
    Bytes(Vec<u8>),
    /// UTF-8 text.
    Text(String),
    /// Nested record (struct or variant member).
    Record(Record),
    /// Array of values.
    Array(Vec<Value>),
}

impl Value {
    /// Short name of the value's shape, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::UInt(_) => "uint",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Bytes(_) => "bytes",
            Value::Text(_) => "text",
            Value::Record(_) => "record",
            Value::Array(_) => "array",
        }
    }

    /// Integer value widened to i128, if this is an integer.
    pub fn as_i128(&self) -> Option<i128> {
        match *self {
            Value::UInt(v) => Some(v as i128),
            Value::Int(v) => Some(v as i128),
            _ => None,
        }
    }

    /// Value as u64, if it is a non-negative integer.
    pub fn as_u64(&self) -> Option<u64> {
        self.as_i128().and_then(|v| u64::try_from(v).ok())
    }

    /// Value as i64, if it is an integer that fits.
    pub fn as_i64(&self) -> Option<i64> {
        self.as_i128().and_then(|v| i64::try_from(v).ok())
    }

    /// Value as f64 (integers are converted).
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::Float(v) => Some(v),
            Value::UInt(v) => Some(v as f64),
            Value::Int(v) => Some(v as f64),
            _ => None,
        }
    }

    /// Borrow the bytes of a byte run.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Borrow the string of a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow a nested record.
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(r) => Some(r),
            _ => None,
        }
    }

    /// Borrow array elements.
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Builds an array value from anything convertible to values.
    pub fn array_of<T: Into<Value>>(items: impl IntoIterator<Item = T>) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }
}

macro_rules! impl_from_unsigned {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::UInt(v as u64)
            }
        })*
    };
}

macro_rules! impl_from_signed {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::Int(v as i64)
            }
        })*
    };
}

impl_from_unsigned!(u8, u16, u32, u64);
impl_from_signed!(i8, i16, i32, i64);

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v as f64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Bytes(v.to_vec())
    }
}

impl From<Record> for Value {
    fn from(v: Record) -> Self {
        Value::Record(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Array(v)
    }
}

/// An ordered mapping of field name to decoded value.
///
/// Field order follows the schema that produced the record, so two records
/// compare equal only if they were decoded (or built) in the same order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Inserts or replaces a field, keeping the position of an existing one.
    pub fn insert(&mut self, name: &str, value: impl Into<Value>) {
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name.to_string(), value)),
        }
    }

    /// Looks up a field.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Returns true if the field is present.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates fields in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Looks up a field, failing if absent.
    pub fn require(&self, name: &str) -> StructResult<&Value> {
        self.get(name).ok_or_else(|| StructError::NoSuchField {
            field: name.to_string(),
        })
    }

    fn wrong(name: &str, expected: &'static str) -> StructError {
        StructError::WrongValue {
            field: name.to_string(),
            expected,
        }
    }

    /// Reads a non-negative integer field.
    pub fn uint(&self, name: &str) -> StructResult<u64> {
        self.require(name)?
            .as_u64()
            .ok_or_else(|| Self::wrong(name, "an unsigned integer"))
    }

    /// Reads a signed integer field.
    pub fn int(&self, name: &str) -> StructResult<i64> {
        self.require(name)?
            .as_i64()
            .ok_or_else(|| Self::wrong(name, "a signed integer"))
    }

    /// Reads a non-negative integer field as a length or count.
    pub fn usize(&self, name: &str) -> StructResult<usize> {
        self.require(name)?
            .as_u64()
            .and_then(|v| usize::try_from(v).ok())
            .ok_or_else(|| Self::wrong(name, "a length"))
    }

    /// Reads a numeric field as f64.
    pub fn float(&self, name: &str) -> StructResult<f64> {
        self.require(name)?
            .as_f64()
            .ok_or_else(|| Self::wrong(name, "a number"))
    }

    /// Borrows a byte-run field.
    pub fn bytes(&self, name: &str) -> StructResult<&[u8]> {
        self.require(name)?
            .as_bytes()
            .ok_or_else(|| Self::wrong(name, "a byte run"))
    }

    /// Borrows a text field.
    pub fn text(&self, name: &str) -> StructResult<&str> {
        self.require(name)?
            .as_text()
            .ok_or_else(|| Self::wrong(name, "text"))
    }

    /// Borrows a nested record field.
    pub fn record(&self, name: &str) -> StructResult<&Record> {
        self.require(name)?
            .as_record()
            .ok_or_else(|| Self::wrong(name, "a record"))
    }

    /// Borrows an array field.
    pub fn array(&self, name: &str) -> StructResult<&[Value]> {
        self.require(name)?
            .as_array()
            .ok_or_else(|| Self::wrong(name, "an array"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_keeps_position() {
        let mut rec = Record::new().with("a", 1u8).with("b", 2u8);
        rec.insert("a", 7u8);
        let names: Vec<&str> = rec.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(rec.uint("a").unwrap(), 7);
    }

    #[test]
    fn test_accessors_convert_integers() {
        let rec = Record::new().with("neg", -3i16).with("pos", 40000u32);
        assert_eq!(rec.int("neg").unwrap(), -3);
        assert_eq!(rec.int("pos").unwrap(), 40000);
        assert!(rec.uint("neg").is_err());
        assert_eq!(rec.usize("pos").unwrap(), 40000);
    }

    #[test]
    fn test_missing_field_error() {
        let rec = Record::new();
        let err = rec.uint("ckSize").unwrap_err();
        assert!(err.to_string().contains("ckSize"));
    }

    #[test]
    fn test_array_of() {
        let v = Value::array_of([1i16, -2, 3]);
        assert_eq!(
            v.as_array().unwrap(),
            &[Value::Int(1), Value::Int(-2), Value::Int(3)]
        );
    }
}
