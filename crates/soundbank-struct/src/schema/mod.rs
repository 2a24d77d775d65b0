//! Schemas and the decode/encode engine.

use crate::context::Context;
use crate::error::{StructError, StructResult};
use crate::field::{Endian, Field, FieldCodec, FieldType};
use crate::numeric::{self, Numeric};
use crate::value::{Record, Value};

/// Rounds `size` up to a multiple of `modulus`.
pub fn align_to(size: usize, modulus: usize) -> usize {
    if modulus <= 1 {
        size
    } else {
        size.div_ceil(modulus) * modulus
    }
}

/// An ordered list of fields describing a binary layout.
///
/// Field order is both decode order and byte layout order. Size, count and
/// variant functions may read fields declared before them, never after.
/// Schemas hold no decode state and can be shared freely.
#[derive(Debug)]
pub struct Schema {
    name: &'static str,
    endian: Endian,
    fields: Vec<Field>,
}

/// Builder for [`Schema`].
#[derive(Debug)]
pub struct SchemaBuilder {
    name: &'static str,
    endian: Endian,
    fields: Vec<Field>,
}

impl SchemaBuilder {
    /// Appends a field.
    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Finishes the schema.
    pub fn build(self) -> Schema {
        Schema {
            name: self.name,
            endian: self.endian,
            fields: self.fields,
        }
    }
}

/// The concrete interpretation of a field once sizes and variants are resolved.
#[derive(Clone, Copy)]
enum Target {
    Numeric(Numeric),
    Bytes,
    Utf8,
    Struct(&'static Schema),
    Custom(&'static dyn FieldCodec),
}

impl Schema {
    /// Starts building a schema with a default byte order.
    pub fn builder(name: &'static str, endian: Endian) -> SchemaBuilder {
        SchemaBuilder {
            name,
            endian,
            fields: Vec::new(),
        }
    }

    /// Schema name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Default byte order.
    pub fn endian(&self) -> Endian {
        self.endian
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Looks up a field by name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Size in bytes when every field has a literal size.
    ///
    /// Nested schemas without a declared size contribute their own static
    /// size. Arrays and computed sizes make the schema dynamic.
    pub fn static_size(&self) -> StructResult<usize> {
        let mut size = 0;
        for field in &self.fields {
            let not_static = || StructError::NotStaticallySized {
                schema: self.name,
                field: field.name,
            };
            if field.count.is_some() {
                return Err(not_static());
            }
            let field_size = match (field.size, field.ty) {
                (Some(len), _) => len.fixed().ok_or_else(not_static)?,
                (None, FieldType::Struct(s)) => s.static_size()?,
                (None, FieldType::Variant(v)) => v.size()?,
                (None, _) => return Err(not_static()),
            };
            size += align_to(field_size, field.align.unwrap_or(1));
        }
        Ok(size)
    }

    /// Resolves the concrete target type and size of a field against the
    /// fields known so far.
    fn resolve(
        &self,
        field: &Field,
        record: &Record,
        ctx: &Context,
    ) -> StructResult<(Target, Option<usize>)> {
        let size = match field.size {
            Some(len) => Some(
                len.resolve(record, ctx)
                    .map_err(|e| e.in_field(self.name, field.name))?,
            ),
            None => None,
        };
        let target = match field.ty {
            FieldType::Bytes => Target::Bytes,
            FieldType::Utf8 => Target::Utf8,
            FieldType::Struct(s) => Target::Struct(s),
            FieldType::Custom(c) => Target::Custom(c),
            FieldType::Variant(v) => {
                let member = v.select(record, ctx).ok_or(StructError::UnresolvedVariant {
                    schema: self.name,
                    field: field.name,
                    variant: v.name(),
                })?;
                return Ok((Target::Struct(member), Some(v.size()?)));
            }
            ty => {
                let kind = Numeric::of(ty).ok_or(StructError::MissingSize {
                    schema: self.name,
                    field: field.name,
                })?;
                let width = size.ok_or(StructError::MissingSize {
                    schema: self.name,
                    field: field.name,
                })?;
                numeric::check_width(ty, width, self.name, field.name)?;
                Target::Numeric(kind)
            }
        };
        Ok((target, size))
    }

    /// Decodes a record starting at `offset`.
    ///
    /// Returns the record and the number of bytes consumed, including any
    /// alignment padding.
    pub fn decode(
        &self,
        buf: &[u8],
        offset: usize,
        ctx: &Context,
    ) -> StructResult<(Record, usize)> {
        let mut record = Record::new();
        let mut pos = offset;

        for field in &self.fields {
            let (target, size) = self.resolve(field, &record, ctx)?;
            let endian = field.endian.unwrap_or(self.endian);

            let value = match field.count {
                Some(count) => {
                    let count = count
                        .resolve(&record, ctx)
                        .map_err(|e| e.in_field(self.name, field.name))?;
                    let mut items = Vec::with_capacity(count.min(buf.len()));
                    for _ in 0..count {
                        let (item, consumed) =
                            self.decode_element(field, target, size, endian, buf, pos, ctx)?;
                        pos += consumed;
                        items.push(item);
                    }
                    Value::Array(items)
                }
                None => {
                    let (item, consumed) =
                        self.decode_element(field, target, size, endian, buf, pos, ctx)?;
                    pos += consumed;
                    item
                }
            };
            record.insert(field.name, value);
        }

        Ok((record, pos - offset))
    }

    /// Decodes one element of a field, returning the value and the bytes to
    /// advance by.
    #[allow(clippy::too_many_arguments)]
    fn decode_element(
        &self,
        field: &Field,
        target: Target,
        size: Option<usize>,
        endian: Endian,
        buf: &[u8],
        pos: usize,
        ctx: &Context,
    ) -> StructResult<(Value, usize)> {
        let take = |n: usize| self.slice(field, buf, pos, n);
        let need_size = || StructError::MissingSize {
            schema: self.name,
            field: field.name,
        };

        let (value, parsed) = match target {
            Target::Numeric(kind) => {
                let width = size.ok_or_else(need_size)?;
                (numeric::read(take(width)?, kind, width, endian)?, width)
            }
            Target::Bytes => {
                let n = size.ok_or_else(need_size)?;
                (Value::Bytes(take(n)?.to_vec()), n)
            }
            Target::Utf8 => {
                let n = size.ok_or_else(need_size)?;
                let text = std::str::from_utf8(take(n)?).map_err(|_| StructError::InvalidText {
                    schema: self.name,
                    field: field.name,
                })?;
                (Value::Text(text.to_string()), n)
            }
            Target::Struct(schema) => {
                let (record, consumed) = schema.decode(buf, pos, ctx)?;
                (Value::Record(record), consumed)
            }
            Target::Custom(codec) => codec
                .decode(buf, pos, ctx)
                .map_err(|e| e.in_field(self.name, field.name))?,
        };

        if let Some(declared) = size {
            if parsed > declared {
                return Err(StructError::FieldTooLarge {
                    schema: self.name,
                    field: field.name,
                    actual: parsed,
                    declared,
                });
            }
        }

        let consumed = align_to(size.unwrap_or(parsed), field.align.unwrap_or(1));
        tracing::trace!(
            schema = self.name,
            field = field.name,
            offset = pos,
            consumed,
            "read field"
        );
        Ok((value, consumed))
    }

    fn slice<'a>(
        &self,
        field: &Field,
        buf: &'a [u8],
        pos: usize,
        n: usize,
    ) -> StructResult<&'a [u8]> {
        let remaining = buf.len().saturating_sub(pos);
        if n > remaining {
            return Err(StructError::BufferUnderrun {
                schema: self.name,
                field: field.name,
                needed: n,
                remaining,
            });
        }
        Ok(&buf[pos..pos + n])
    }

    /// Encodes a record.
    ///
    /// Every field must be present in the record unless it declares an
    /// explicit default.
    pub fn encode(&self, record: &Record, ctx: &Context) -> StructResult<Vec<u8>> {
        let mut out = Vec::new();

        for field in &self.fields {
            let value = match record.get(field.name) {
                Some(v) => v,
                None => field.default.as_ref().ok_or(StructError::MissingField {
                    schema: self.name,
                    field: field.name,
                })?,
            };
            let endian = field.endian.unwrap_or(self.endian);

            match field.count {
                Some(count) => {
                    let items = value.as_array().ok_or(StructError::TypeMismatch {
                        schema: self.name,
                        field: field.name,
                        expected: "array",
                        found: value.kind_name(),
                    })?;
                    let expected = count
                        .resolve(record, ctx)
                        .map_err(|e| e.in_field(self.name, field.name))?;
                    if items.len() != expected {
                        return Err(StructError::CountMismatch {
                            schema: self.name,
                            field: field.name,
                            expected,
                            actual: items.len(),
                        });
                    }
                    let (target, size) = self.resolve(field, record, ctx)?;
                    for item in items {
                        self.encode_element(field, target, size, endian, item, ctx, &mut out)?;
                    }
                }
                None => {
                    let (target, size) = self.resolve(field, record, ctx)?;
                    self.encode_element(field, target, size, endian, value, ctx, &mut out)?;
                }
            }
        }

        Ok(out)
    }

    #[allow(clippy::too_many_arguments)]
    fn encode_element(
        &self,
        field: &Field,
        target: Target,
        size: Option<usize>,
        endian: Endian,
        value: &Value,
        ctx: &Context,
        out: &mut Vec<u8>,
    ) -> StructResult<()> {
        let mismatch = |expected: &'static str| StructError::TypeMismatch {
            schema: self.name,
            field: field.name,
            expected,
            found: value.kind_name(),
        };

        let mut part = match target {
            Target::Numeric(kind) => {
                let width = size.ok_or(StructError::MissingSize {
                    schema: self.name,
                    field: field.name,
                })?;
                let mut part = Vec::with_capacity(width);
                numeric::write(&mut part, value, kind, width, endian, self.name, field.name)?;
                part
            }
            Target::Bytes => value.as_bytes().ok_or_else(|| mismatch("bytes"))?.to_vec(),
            Target::Utf8 => value
                .as_text()
                .ok_or_else(|| mismatch("text"))?
                .as_bytes()
                .to_vec(),
            Target::Struct(schema) => {
                let nested = value.as_record().ok_or_else(|| mismatch("record"))?;
                schema.encode(nested, ctx)?
            }
            Target::Custom(codec) => codec
                .encode(value, ctx)
                .map_err(|e| e.in_field(self.name, field.name))?,
        };

        if let Some(declared) = size {
            if part.len() > declared {
                return Err(StructError::FieldTooLarge {
                    schema: self.name,
                    field: field.name,
                    actual: part.len(),
                    declared,
                });
            }
            part.resize(declared, 0);
        }
        let aligned = align_to(part.len(), field.align.unwrap_or(1));
        part.resize(aligned, 0);

        tracing::trace!(
            schema = self.name,
            field = field.name,
            len = part.len(),
            "wrote field"
        );
        out.extend_from_slice(&part);
        Ok(())
    }
}
