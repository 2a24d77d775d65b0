//! Declarative binary struct schemas.
//!
//! A [`Schema`] is an ordered list of [`Field`]s built at runtime. Decoding
//! produces a [`Record`] (an ordered name to [`Value`] map) together with the
//! number of bytes consumed; encoding turns a record back into bytes.
//!
//! # Features
//!
//! - **Numeric fields**: signed and unsigned integers of 1, 2, 4 or 8 bytes,
//!   32/64-bit floats, with a per-schema byte order and per-field overrides
//! - **Computed sizes and counts**: a field's size or element count may be a
//!   function of the fields decoded before it and of a caller [`Context`]
//! - **Alignment**: any field can be padded to a multiple of N bytes
//! - **Variants**: C-style unions whose member is chosen from earlier fields
//!   and whose slot is as large as the largest member
//! - **Custom codecs**: [`FieldCodec`] for encodings fields cannot describe
//!
//! Schemas hold no cursor state: decode takes an explicit offset and returns
//! the consumed length, so a single schema can be shared across threads and
//! used re-entrantly.
//!
//! # Example
//!
//! ```
//! use soundbank_struct::{Context, Endian, Field, Record, Schema};
//!
//! let keymap = Schema::builder("ALKeyMap", Endian::Big)
//!     .field(Field::uint("velocityMin", 1))
//!     .field(Field::uint("velocityMax", 1))
//!     .build();
//!
//! let (record, consumed) = keymap.decode(&[0, 127], 0, &Context::new()).unwrap();
//! assert_eq!(consumed, 2);
//! assert_eq!(record.uint("velocityMax").unwrap(), 127);
//!
//! let bytes = keymap
//!     .encode(&Record::new().with("velocityMin", 1u8).with("velocityMax", 100u8), &Context::new())
//!     .unwrap();
//! assert_eq!(bytes, vec![1, 100]);
//! ```

pub mod context;
pub mod error;
pub mod field;
mod numeric;
pub mod schema;
pub mod value;
pub mod variant;

pub use context::Context;
pub use error::{StructError, StructResult};
pub use field::{Endian, Field, FieldCodec, FieldType, Len, LenFn};
pub use schema::{align_to, Schema, SchemaBuilder};
pub use value::{Record, Value};
pub use variant::{SelectFn, Variant};
