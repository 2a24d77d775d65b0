//! Fixed-width numeric reads and writes.

use byteorder::{BigEndian, LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{StructError, StructResult};
use crate::field::{Endian, FieldType};
use crate::value::Value;

/// Numeric interpretation of a primitive field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Numeric {
    Unsigned,
    Signed,
    Float,
}

impl Numeric {
    /// Numeric kind of a field type, or None for non-numeric types.
    pub(crate) fn of(ty: FieldType) -> Option<Self> {
        match ty {
            FieldType::UInt | FieldType::BigUInt | FieldType::Char => Some(Numeric::Unsigned),
            FieldType::Int | FieldType::BigInt => Some(Numeric::Signed),
            FieldType::Float | FieldType::Double => Some(Numeric::Float),
            _ => None,
        }
    }
}

/// Checks that a numeric field type can be stored in `width` bytes.
pub(crate) fn check_width(
    ty: FieldType,
    width: usize,
    schema: &'static str,
    field: &'static str,
) -> StructResult<()> {
    let (ok, kind) = match ty {
        FieldType::UInt => (matches!(width, 1 | 2 | 4 | 8), "uint"),
        FieldType::Int => (matches!(width, 1 | 2 | 4 | 8), "int"),
        FieldType::Char => (width == 1, "char"),
        FieldType::BigInt => (width == 8, "bigint"),
        FieldType::BigUInt => (width == 8, "biguint"),
        FieldType::Float => (width == 4, "float"),
        FieldType::Double => (width == 8, "double"),
        _ => (true, ""),
    };
    if ok {
        Ok(())
    } else {
        Err(StructError::UnsupportedWidth {
            schema,
            field,
            kind,
            width,
        })
    }
}

macro_rules! read_endian {
    ($cur:expr, $endian:expr, $method:ident) => {
        match $endian {
            Endian::Big => $cur.$method::<BigEndian>(),
            Endian::Little => $cur.$method::<LittleEndian>(),
        }
    };
}

macro_rules! write_endian {
    ($out:expr, $endian:expr, $method:ident, $value:expr) => {
        match $endian {
            Endian::Big => $out.$method::<BigEndian>($value),
            Endian::Little => $out.$method::<LittleEndian>($value),
        }
    };
}

/// Reads a numeric value of `width` bytes from the start of `bytes`.
///
/// Single-byte values ignore byte order.
pub(crate) fn read(
    mut bytes: &[u8],
    kind: Numeric,
    width: usize,
    endian: Endian,
) -> StructResult<Value> {
    let cur = &mut bytes;
    let value = match (kind, width) {
        (Numeric::Unsigned, 1) => Value::UInt(cur.read_u8()? as u64),
        (Numeric::Unsigned, 2) => Value::UInt(read_endian!(cur, endian, read_u16)? as u64),
        (Numeric::Unsigned, 4) => Value::UInt(read_endian!(cur, endian, read_u32)? as u64),
        (Numeric::Unsigned, _) => Value::UInt(read_endian!(cur, endian, read_u64)?),
        (Numeric::Signed, 1) => Value::Int(cur.read_i8()? as i64),
        (Numeric::Signed, 2) => Value::Int(read_endian!(cur, endian, read_i16)? as i64),
        (Numeric::Signed, 4) => Value::Int(read_endian!(cur, endian, read_i32)? as i64),
        (Numeric::Signed, _) => Value::Int(read_endian!(cur, endian, read_i64)?),
        (Numeric::Float, 4) => Value::Float(read_endian!(cur, endian, read_f32)? as f64),
        (Numeric::Float, _) => Value::Float(read_endian!(cur, endian, read_f64)?),
    };
    Ok(value)
}

/// Appends a numeric value of `width` bytes to `out`.
pub(crate) fn write(
    out: &mut Vec<u8>,
    value: &Value,
    kind: Numeric,
    width: usize,
    endian: Endian,
    schema: &'static str,
    field: &'static str,
) -> StructResult<()> {
    if kind == Numeric::Float {
        let v = value.as_f64().ok_or(StructError::TypeMismatch {
            schema,
            field,
            expected: "float",
            found: value.kind_name(),
        })?;
        if width == 4 {
            write_endian!(out, endian, write_f32, v as f32)?;
        } else {
            write_endian!(out, endian, write_f64, v)?;
        }
        return Ok(());
    }

    let v = value.as_i128().ok_or(StructError::TypeMismatch {
        schema,
        field,
        expected: "integer",
        found: value.kind_name(),
    })?;
    let bits = (width * 8) as u32;
    let (min, max) = match kind {
        Numeric::Unsigned => (0i128, (1i128 << bits) - 1),
        _ => (-(1i128 << (bits - 1)), (1i128 << (bits - 1)) - 1),
    };
    if v < min || v > max {
        return Err(StructError::ValueOutOfRange {
            schema,
            field,
            value: v.to_string(),
            width,
        });
    }

    match (kind, width) {
        (Numeric::Unsigned, 1) => out.write_u8(v as u8)?,
        (Numeric::Unsigned, 2) => write_endian!(out, endian, write_u16, v as u16)?,
        (Numeric::Unsigned, 4) => write_endian!(out, endian, write_u32, v as u32)?,
        (Numeric::Unsigned, _) => write_endian!(out, endian, write_u64, v as u64)?,
        (_, 1) => out.write_i8(v as i8)?,
        (_, 2) => write_endian!(out, endian, write_i16, v as i16)?,
        (_, 4) => write_endian!(out, endian, write_i32, v as i32)?,
        (_, _) => write_endian!(out, endian, write_i64, v as i64)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_big_and_little() {
        let bytes = [0x12, 0x34];
        assert_eq!(
            read(&bytes, Numeric::Unsigned, 2, Endian::Big).unwrap(),
            Value::UInt(0x1234)
        );
        assert_eq!(
            read(&bytes, Numeric::Unsigned, 2, Endian::Little).unwrap(),
            Value::UInt(0x3412)
        );
    }

    #[test]
    fn test_signed_read() {
        let bytes = [0xFF, 0xFE];
        assert_eq!(
            read(&bytes, Numeric::Signed, 2, Endian::Big).unwrap(),
            Value::Int(-2)
        );
        assert_eq!(
            read(&bytes, Numeric::Signed, 1, Endian::Little).unwrap(),
            Value::Int(-1)
        );
    }

    #[test]
    fn test_write_range_checked() {
        let mut out = Vec::new();
        let err = write(
            &mut out,
            &Value::UInt(256),
            Numeric::Unsigned,
            1,
            Endian::Big,
            "S",
            "f",
        )
        .unwrap_err();
        assert!(matches!(err, StructError::ValueOutOfRange { width: 1, .. }));

        write(&mut out, &Value::Int(-32768), Numeric::Signed, 2, Endian::Big, "S", "f").unwrap();
        assert_eq!(out, vec![0x80, 0x00]);
    }

    #[test]
    fn test_float_write() {
        let mut out = Vec::new();
        write(&mut out, &Value::Float(1.0), Numeric::Float, 4, Endian::Big, "S", "f").unwrap();
        assert_eq!(out, 1.0f32.to_be_bytes().to_vec());
    }

    #[test]
    fn test_width_check() {
        assert!(check_width(FieldType::UInt, 3, "S", "f").is_err());
        assert!(check_width(FieldType::Double, 8, "S", "f").is_ok());
        assert!(check_width(FieldType::Float, 8, "S", "f").is_err());
    }
}
