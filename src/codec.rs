//! Read and write whole records against a compiled [`Layout`].
//!
//! A write flattens named or positional input into the layout's slot sequence, packs it,
//! and issues a single `write_all`. A read pulls exactly `layout.size()` bytes; when the
//! stream ends first, the read yields `None` and the stream is put back where it was.

use crate::kind::Kind;
use crate::layout::{Group, Layout};
use crate::value::{Record, Value};
use std::io::{self, Read, Seek, SeekFrom, Write};

/// Byte order for multi-byte numeric slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Endianness {
    #[default]
    Little,
    Big,
}

impl Endianness {
    /// Format descriptor prefix.
    pub fn prefix(self) -> char {
        match self {
            Endianness::Little => '<',
            Endianness::Big => '>',
        }
    }

    /// `<` little, `>` or `!` (network order) big.
    pub fn from_prefix(c: char) -> Option<Endianness> {
        match c {
            '<' => Some(Endianness::Little),
            '>' | '!' => Some(Endianness::Big),
            _ => None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("IO: {0}")]
    Io(#[from] io::Error),
    #[error("Malformed layout: {0}")]
    MalformedSpec(String),
    #[error("Field too long: {len} bytes exceeds declared length {declared}")]
    FieldTooLong { len: usize, declared: usize },
    #[error("Missing field: {0}")]
    MissingField(String),
    #[error("Arity mismatch: {0}")]
    ArityMismatch(String),
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: Kind, found: &'static str },
    #[error("Value {value} out of range for {kind}")]
    OutOfRange { kind: Kind, value: String },
    #[error("Position stack is empty")]
    EmptyStack,
}

/// Record input: values by field name, or one value per field in declared order.
#[derive(Debug, Clone, Copy)]
pub enum Input<'a> {
    Named(&'a Record),
    Positional(&'a [Value]),
}

impl<'a> From<&'a Record> for Input<'a> {
    fn from(r: &'a Record) -> Self {
        Input::Named(r)
    }
}

impl<'a> From<&'a [Value]> for Input<'a> {
    fn from(v: &'a [Value]) -> Self {
        Input::Positional(v)
    }
}

impl<'a> From<&'a Vec<Value>> for Input<'a> {
    fn from(v: &'a Vec<Value>) -> Self {
        Input::Positional(v.as_slice())
    }
}

impl<'a, const N: usize> From<&'a [Value; N]> for Input<'a> {
    fn from(v: &'a [Value; N]) -> Self {
        Input::Positional(v.as_slice())
    }
}

/// Encode one record to bytes.
pub fn encode_record(layout: &Layout, input: Input<'_>) -> Result<Vec<u8>, CodecError> {
    let mut flat = Vec::with_capacity(layout.slots());
    match input {
        Input::Named(record) => {
            for g in layout.groups() {
                let v = record
                    .get(&g.name)
                    .ok_or_else(|| CodecError::MissingField(g.name.clone()))?;
                flatten_group(&mut flat, g, v)?;
            }
        }
        Input::Positional(values) => {
            if values.len() != layout.groups().len() {
                return Err(CodecError::ArityMismatch(format!(
                    "layout has {} fields, got {} positional values",
                    layout.groups().len(),
                    values.len()
                )));
            }
            for (g, v) in layout.groups().iter().zip(values) {
                flatten_group(&mut flat, g, v)?;
            }
        }
    }
    layout.format().pack(&flat)
}

/// Decode one record from exactly `layout.size()` bytes.
pub fn decode_record(layout: &Layout, bytes: &[u8]) -> Result<Record, CodecError> {
    let flat = layout.format().unpack(bytes)?;
    let mut flat = flat.into_iter();
    let mut record = Record::with_capacity(layout.groups().len());
    for g in layout.groups() {
        let v = if g.is_array() {
            Value::Tuple(flat.by_ref().take(g.slots).collect())
        } else {
            flat.next()
                .ok_or_else(|| CodecError::ArityMismatch(format!("no value left for field {}", g.name)))?
        };
        record.insert(g.name.clone(), v);
    }
    Ok(record)
}

/// Write one record to `w`. Returns the number of bytes written.
pub fn write_record<W: Write + ?Sized>(layout: &Layout, w: &mut W, input: Input<'_>) -> Result<usize, CodecError> {
    let bytes = encode_record(layout, input)?;
    w.write_all(&bytes)?;
    Ok(bytes.len())
}

/// Read one record from `r`.
///
/// Returns `Ok(None)` when fewer than `layout.size()` bytes remain; the stream position
/// is restored to where it was before the call.
pub fn read_record<R: Read + Seek + ?Sized>(layout: &Layout, r: &mut R) -> Result<Option<Record>, CodecError> {
    let start = r.stream_position()?;
    let mut buf = vec![0u8; layout.size()];
    let filled = read_up_to(r, &mut buf)?;
    if filled < buf.len() {
        log::trace!("short read at {}: {} of {} bytes", start, filled, buf.len());
        r.seek(SeekFrom::Start(start))?;
        return Ok(None);
    }
    decode_record(layout, &buf).map(Some)
}

fn flatten_group(flat: &mut Vec<Value>, g: &Group, v: &Value) -> Result<(), CodecError> {
    if !g.is_array() {
        flat.push(v.clone());
        return Ok(());
    }
    let items = v.as_tuple().ok_or(CodecError::TypeMismatch {
        expected: g.kind,
        found: v.type_name(),
    })?;
    if items.len() != g.slots {
        return Err(CodecError::ArityMismatch(format!(
            "field {} takes {} values, got {}",
            g.name,
            g.slots,
            items.len()
        )));
    }
    flat.extend_from_slice(items);
    Ok(())
}

/// Read until `buf` is full or the stream ends. Returns bytes read.
fn read_up_to<R: Read + ?Sized>(r: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match r.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldSpec;
    use std::io::Cursor;

    fn layout() -> Layout {
        Layout::compile(
            &[
                FieldSpec::new(Kind::UInt8, "id"),
                FieldSpec::array(Kind::Int16, "pos", 2),
                FieldSpec::array(Kind::Char, "tag", 3),
            ],
            Endianness::Big,
        )
        .unwrap()
    }

    fn record() -> Record {
        let mut r = Record::new();
        r.insert("id".into(), Value::U8(7));
        r.insert("pos".into(), Value::Tuple(vec![Value::I16(-1), Value::I16(2)]));
        r.insert("tag".into(), Value::from("ab"));
        r
    }

    #[test]
    fn encode_named() {
        let bytes = encode_record(&layout(), Input::Named(&record())).unwrap();
        assert_eq!(bytes, vec![7, 0xFF, 0xFF, 0, 2, b'a', b'b', 0]);
    }

    #[test]
    fn named_and_positional_agree() {
        let positional = vec![
            Value::U8(7),
            Value::Tuple(vec![Value::I16(-1), Value::I16(2)]),
            Value::from("ab"),
        ];
        assert_eq!(
            encode_record(&layout(), (&positional).into()).unwrap(),
            encode_record(&layout(), (&record()).into()).unwrap()
        );
    }

    #[test]
    fn missing_field() {
        let mut r = record();
        r.remove("pos");
        assert!(matches!(
            encode_record(&layout(), Input::Named(&r)),
            Err(CodecError::MissingField(name)) if name == "pos"
        ));
    }

    #[test]
    fn positional_arity_must_match_fields() {
        let short = [Value::U8(7), Value::Tuple(vec![Value::I16(0), Value::I16(0)])];
        assert!(matches!(encode_record(&layout(), (&short).into()), Err(CodecError::ArityMismatch(_))));
    }

    #[test]
    fn array_length_must_match() {
        let mut r = record();
        r.insert("pos".into(), Value::Tuple(vec![Value::I16(1)]));
        assert!(matches!(encode_record(&layout(), Input::Named(&r)), Err(CodecError::ArityMismatch(_))));
        r.insert("pos".into(), Value::I16(1));
        assert!(matches!(encode_record(&layout(), Input::Named(&r)), Err(CodecError::TypeMismatch { .. })));
    }

    #[test]
    fn decode_regroups() {
        let l = layout();
        let bytes = encode_record(&l, Input::Named(&record())).unwrap();
        let back = decode_record(&l, &bytes).unwrap();
        assert_eq!(back["id"], Value::U8(7));
        assert_eq!(back["pos"], Value::Tuple(vec![Value::I16(-1), Value::I16(2)]));
        assert_eq!(back["tag"], Value::Bytes(b"ab\0".to_vec()));
        assert_eq!(back.len(), 3);
    }

    #[test]
    fn short_read_restores_position() {
        let l = layout();
        let mut cur = Cursor::new(vec![1u8, 2, 3, 4, 5, 6, 7, 8, 9]);
        cur.set_position(3);
        assert!(read_record(&l, &mut cur).unwrap().is_none());
        assert_eq!(cur.position(), 3);
        cur.set_position(1);
        assert!(read_record(&l, &mut cur).unwrap().is_some());
        assert_eq!(cur.position(), 9);
    }

    #[test]
    fn write_returns_byte_count() {
        let l = layout();
        let mut out = Vec::new();
        assert_eq!(write_record(&l, &mut out, Input::Named(&record())).unwrap(), 8);
        assert_eq!(out.len(), l.size());
    }

    #[test]
    fn endianness_prefixes() {
        assert_eq!(Endianness::from_prefix('!'), Some(Endianness::Big));
        assert_eq!(Endianness::from_prefix('='), None);
        assert_eq!(Endianness::default().prefix(), '<');
    }
}
