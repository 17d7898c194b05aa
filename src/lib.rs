//! # structstream — declarative fixed-size binary records over seekable streams
//!
//! Describe a record once as an ordered list of typed fields, then read and write it
//! against any `Read`/`Write`/`Seek` handle. Layouts compile to a packed format
//! descriptor (`"<4sBII"`) and are cached by content, so repeated use of the same
//! declaration compiles once.
//!
//! ## Field kinds
//!
//! - Integers: `Int8`, `UInt8`, `Int16`, `UInt16`, `Int32`, `UInt32`, `Int64`, `UInt64`
//! - Floats: `Half` (IEEE binary16), `Float`, `Double`
//! - `Char`: fixed-length byte string, zero-padded on write, returned raw on read
//!
//! A field with `count > 1` is an array and decodes as a [`Value::Tuple`]; for `Char` the
//! count is the byte length instead.
//!
//! ## Example
//!
//! ```ignore
//! use std::io::Cursor;
//! use structstream::{FieldSpec, Kind, Record, StructStream, Value};
//!
//! let header = [
//!     FieldSpec::array(Kind::Char, "magic", 4),
//!     FieldSpec::new(Kind::UInt8, "version"),
//!     FieldSpec::new(Kind::UInt32, "crc"),
//!     FieldSpec::new(Kind::UInt32, "flags"),
//! ];
//! let mut s = StructStream::new(Cursor::new(Vec::new()));
//! {
//!     let mut at_start = s.pushing(None)?;
//!     at_start.write_struct(&header, &[
//!         Value::from("asdf"), Value::U8(1), Value::U32(0xAABBCCDD), Value::U32(12345678),
//!     ])?;
//! }
//! let rec: Record = s.read_struct(&header)?.expect("13 bytes available");
//! ```
//!
//! Layouts can also be declared as text; see [`parser`].

pub mod cache;
pub mod codec;
pub mod field;
pub mod format;
pub mod kind;
pub mod layout;
pub mod parser;
pub mod position;
pub mod primitive;
pub mod stream;
pub mod value;

pub use cache::LayoutCache;
pub use codec::{decode_record, encode_record, read_record, write_record, CodecError, Endianness, Input};
pub use field::{fields_from_items, FieldSpec, Item};
pub use format::Format;
pub use kind::Kind;
pub use layout::{Group, Layout};
pub use parser::{parse, LayoutDecl};
pub use position::PositionStack;
pub use primitive::Scalar;
pub use stream::{PositionGuard, StructStream};
pub use value::{Record, Value};
