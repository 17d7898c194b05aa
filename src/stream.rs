//! [`StructStream`]: a seekable handle with a layout cache, typed scalar accessors and a
//! position stack.
//!
//! ```ignore
//! use std::io::{Cursor, SeekFrom};
//! use structstream::{FieldSpec, Kind, StructStream, Value};
//!
//! let header = [FieldSpec::array(Kind::Char, "magic", 4), FieldSpec::new(Kind::UInt32, "len")];
//! let mut s = StructStream::new(Cursor::new(Vec::new()));
//! s.with_position(None, |s| s.write_struct(&header, &[Value::from("RIFF"), Value::U32(4)]))?;
//! let rec = s.read_struct(&header)?.expect("full header");
//! ```

use crate::cache::LayoutCache;
use crate::codec::{read_record, write_record, CodecError, Endianness, Input};
use crate::field::{fields_from_items, FieldSpec, Item};
use crate::kind::Kind;
use crate::layout::Layout;
use crate::position::PositionStack;
use crate::primitive::{pad_bytes, read_ordered, read_scalar, write_ordered, write_scalar, Scalar};
use crate::value::{Record, Value};
use half::f16;
use std::io::{Read, Seek, SeekFrom, Write};
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

#[derive(Debug)]
pub struct StructStream<S> {
    handle: S,
    endianness: Endianness,
    cache: Arc<LayoutCache>,
    stack: PositionStack,
}

impl<S> StructStream<S> {
    /// Little-endian stream backed by the process-wide layout cache.
    pub fn new(handle: S) -> Self {
        StructStream {
            handle,
            endianness: Endianness::default(),
            cache: LayoutCache::global(),
            stack: PositionStack::new(),
        }
    }

    pub fn with_endianness(mut self, endianness: Endianness) -> Self {
        self.endianness = endianness;
        self
    }

    pub fn with_cache(mut self, cache: Arc<LayoutCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    pub fn cache(&self) -> &Arc<LayoutCache> {
        &self.cache
    }

    /// Compiled layout for `fields` in this stream's byte order.
    pub fn layout(&self, fields: &[FieldSpec]) -> Result<Arc<Layout>, CodecError> {
        self.cache.get(fields, self.endianness)
    }

    /// Saved offsets currently on the position stack.
    pub fn depth(&self) -> usize {
        self.stack.depth()
    }

    pub fn get_ref(&self) -> &S {
        &self.handle
    }

    pub fn get_mut(&mut self) -> &mut S {
        &mut self.handle
    }

    pub fn into_inner(self) -> S {
        self.handle
    }
}

impl<S: Seek> StructStream<S> {
    pub fn seek(&mut self, pos: SeekFrom) -> Result<u64, CodecError> {
        Ok(self.handle.seek(pos)?)
    }

    pub fn tell(&mut self) -> Result<u64, CodecError> {
        Ok(self.handle.stream_position()?)
    }

    /// Save the current offset, then move to `target` (stay put on `None`).
    pub fn push(&mut self, target: Option<SeekFrom>) -> Result<u64, CodecError> {
        self.stack.push(&mut self.handle, target)
    }

    /// Return to the most recently saved offset.
    pub fn pop(&mut self) -> Result<u64, CodecError> {
        self.stack.pop(&mut self.handle)
    }

    /// Push now and pop when the returned guard goes out of scope, including on early
    /// return and unwinding.
    pub fn pushing(&mut self, target: Option<SeekFrom>) -> Result<PositionGuard<'_, S>, CodecError> {
        self.push(target)?;
        Ok(PositionGuard { stream: self, restored: false })
    }

    /// Run `f` at `target` and return to the current offset whether `f` succeeds or not.
    /// An error from `f` takes precedence over an error from restoring.
    pub fn with_position<T, E, F>(&mut self, target: Option<SeekFrom>, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut StructStream<S>) -> Result<T, E>,
        E: From<CodecError>,
    {
        let mut guard = self.pushing(target)?;
        let result = f(&mut *guard);
        let restored = guard.restore();
        let value = result?;
        restored?;
        Ok(value)
    }
}

impl<S: Read + Seek> StructStream<S> {
    /// Read one record; `None` on short read (offset unchanged).
    pub fn read_struct(&mut self, fields: &[FieldSpec]) -> Result<Option<Record>, CodecError> {
        let layout = self.layout(fields)?;
        self.read_layout(&layout)
    }

    pub fn read_items(&mut self, items: &[Item]) -> Result<Option<Record>, CodecError> {
        self.read_struct(&fields_from_items(items)?)
    }

    pub fn read_layout(&mut self, layout: &Layout) -> Result<Option<Record>, CodecError> {
        read_record(layout, &mut self.handle)
    }
}

impl<S: Read> StructStream<S> {
    /// Read up to `n` bytes; fewer at end of data.
    pub fn read(&mut self, n: usize) -> Result<Vec<u8>, CodecError> {
        let mut buf = Vec::with_capacity(n);
        (&mut self.handle).take(n as u64).read_to_end(&mut buf)?;
        Ok(buf)
    }

    /// Read a single value of `kind`. For `Char`, one byte.
    pub fn read_kind(&mut self, kind: Kind) -> Result<Value, CodecError> {
        Ok(read_scalar(&mut self.handle, kind, kind.slot_width(1), self.endianness)?)
    }

    /// Read a raw fixed-length byte string, padding included.
    pub fn read_chars(&mut self, len: usize) -> Result<Vec<u8>, CodecError> {
        let mut buf = vec![0u8; len];
        self.handle.read_exact(&mut buf)?;
        Ok(buf)
    }

    /// Read one native scalar in the stream's byte order.
    pub fn read_value<T: Scalar>(&mut self) -> Result<T, CodecError> {
        Ok(read_ordered(&mut self.handle, self.endianness)?)
    }

    pub fn read_i8(&mut self) -> Result<i8, CodecError> {
        self.read_value()
    }

    pub fn read_u8(&mut self) -> Result<u8, CodecError> {
        self.read_value()
    }

    pub fn read_i16(&mut self) -> Result<i16, CodecError> {
        self.read_value()
    }

    pub fn read_u16(&mut self) -> Result<u16, CodecError> {
        self.read_value()
    }

    pub fn read_i32(&mut self) -> Result<i32, CodecError> {
        self.read_value()
    }

    pub fn read_u32(&mut self) -> Result<u32, CodecError> {
        self.read_value()
    }

    pub fn read_i64(&mut self) -> Result<i64, CodecError> {
        self.read_value()
    }

    pub fn read_u64(&mut self) -> Result<u64, CodecError> {
        self.read_value()
    }

    pub fn read_f16(&mut self) -> Result<f16, CodecError> {
        self.read_value()
    }

    pub fn read_f32(&mut self) -> Result<f32, CodecError> {
        self.read_value()
    }

    pub fn read_f64(&mut self) -> Result<f64, CodecError> {
        self.read_value()
    }
}

impl<S: Write> StructStream<S> {
    /// Write one record. Returns bytes written.
    pub fn write_struct<'a>(&mut self, fields: &[FieldSpec], input: impl Into<Input<'a>>) -> Result<usize, CodecError> {
        let layout = self.layout(fields)?;
        self.write_layout(&layout, input)
    }

    pub fn write_items<'a>(&mut self, items: &[Item], input: impl Into<Input<'a>>) -> Result<usize, CodecError> {
        self.write_struct(&fields_from_items(items)?, input)
    }

    pub fn write_layout<'a>(&mut self, layout: &Layout, input: impl Into<Input<'a>>) -> Result<usize, CodecError> {
        write_record(layout, &mut self.handle, input.into())
    }

    pub fn write(&mut self, bytes: &[u8]) -> Result<usize, CodecError> {
        self.handle.write_all(bytes)?;
        Ok(bytes.len())
    }

    /// Write a single value as `kind`. For `Char`, the value's own length is used.
    pub fn write_kind(&mut self, kind: Kind, v: &Value) -> Result<usize, CodecError> {
        let width = match (kind, v) {
            (Kind::Char, Value::Bytes(b)) => b.len(),
            _ => kind.slot_width(1),
        };
        let mut buf = Vec::with_capacity(width);
        write_scalar(&mut buf, kind, width, self.endianness, v)?;
        self.write(&buf)
    }

    /// Write `data` zero-padded to `len` (default: `data.len()`).
    /// Fails with [`CodecError::FieldTooLong`] if `data` is longer than `len`.
    pub fn write_chars(&mut self, data: &[u8], len: Option<usize>) -> Result<usize, CodecError> {
        let padded = pad_bytes(data, len.unwrap_or(data.len()))?;
        self.write(&padded)
    }

    /// Write one native scalar in the stream's byte order. Returns bytes written.
    pub fn write_value<T: Scalar>(&mut self, v: T) -> Result<usize, CodecError> {
        write_ordered(&mut self.handle, self.endianness, v)?;
        Ok(T::KIND.slot_width(1))
    }

    pub fn write_i8(&mut self, v: i8) -> Result<usize, CodecError> {
        self.write_value(v)
    }

    pub fn write_u8(&mut self, v: u8) -> Result<usize, CodecError> {
        self.write_value(v)
    }

    pub fn write_i16(&mut self, v: i16) -> Result<usize, CodecError> {
        self.write_value(v)
    }

    pub fn write_u16(&mut self, v: u16) -> Result<usize, CodecError> {
        self.write_value(v)
    }

    pub fn write_i32(&mut self, v: i32) -> Result<usize, CodecError> {
        self.write_value(v)
    }

    pub fn write_u32(&mut self, v: u32) -> Result<usize, CodecError> {
        self.write_value(v)
    }

    pub fn write_i64(&mut self, v: i64) -> Result<usize, CodecError> {
        self.write_value(v)
    }

    pub fn write_u64(&mut self, v: u64) -> Result<usize, CodecError> {
        self.write_value(v)
    }

    pub fn write_f16(&mut self, v: f16) -> Result<usize, CodecError> {
        self.write_value(v)
    }

    pub fn write_f32(&mut self, v: f32) -> Result<usize, CodecError> {
        self.write_value(v)
    }

    pub fn write_f64(&mut self, v: f64) -> Result<usize, CodecError> {
        self.write_value(v)
    }
}

/// Restore point taken by [`StructStream::pushing`]. Derefs to the stream.
pub struct PositionGuard<'a, S: Seek> {
    stream: &'a mut StructStream<S>,
    restored: bool,
}

impl<S: Seek> PositionGuard<'_, S> {
    /// Pop now and report the result instead of leaving it to drop.
    pub fn restore(mut self) -> Result<u64, CodecError> {
        self.restored = true;
        self.stream.pop()
    }
}

impl<S: Seek> Deref for PositionGuard<'_, S> {
    type Target = StructStream<S>;

    fn deref(&self) -> &StructStream<S> {
        &*self.stream
    }
}

impl<S: Seek> DerefMut for PositionGuard<'_, S> {
    fn deref_mut(&mut self) -> &mut StructStream<S> {
        &mut *self.stream
    }
}

impl<S: Seek> Drop for PositionGuard<'_, S> {
    fn drop(&mut self) {
        if self.restored {
            return;
        }
        if let Err(e) = self.stream.pop() {
            log::warn!("position restore failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn stream() -> StructStream<Cursor<Vec<u8>>> {
        StructStream::new(Cursor::new(Vec::new())).with_cache(Arc::new(LayoutCache::new()))
    }

    #[test]
    fn typed_accessors_round_trip() {
        let mut s = stream().with_endianness(Endianness::Big);
        s.write_u16(0x0102).unwrap();
        s.write_i32(-2).unwrap();
        s.write_f16(f16::from_f32(2.5)).unwrap();
        s.write_f64(0.25).unwrap();
        assert_eq!(&s.get_ref().get_ref()[..2], &[0x01, 0x02]);
        s.seek(SeekFrom::Start(0)).unwrap();
        assert_eq!(s.read_u16().unwrap(), 0x0102);
        assert_eq!(s.read_i32().unwrap(), -2);
        assert_eq!(s.read_f16().unwrap(), f16::from_f32(2.5));
        assert_eq!(s.read_f64().unwrap(), 0.25);
    }

    #[test]
    fn typed_accessors_follow_stream_endianness() {
        for (e, expected) in [
            (Endianness::Little, [0x04, 0x03, 0x02, 0x01]),
            (Endianness::Big, [0x01, 0x02, 0x03, 0x04]),
        ] {
            let mut s = stream().with_endianness(e);
            assert_eq!(s.write_u32(0x01020304).unwrap(), 4);
            assert_eq!(s.write_value(f16::from_f32(-1.0)).unwrap(), 2);
            assert_eq!(&s.get_ref().get_ref()[..4], &expected);
            s.seek(SeekFrom::Start(0)).unwrap();
            assert_eq!(s.read_value::<u32>().unwrap(), 0x01020304);
            assert_eq!(s.read_f16().unwrap(), f16::from_f32(-1.0));
            assert!(s.read_i8().is_err());
        }
    }

    #[test]
    fn kind_accessors_cover_registry() {
        let mut s = stream();
        for kind in Kind::ALL {
            let v = match kind {
                Kind::Char => Value::from("x"),
                Kind::Half => Value::Half(f16::from_f32(1.0)),
                Kind::Float => Value::Float(1.0),
                Kind::Double => Value::Double(1.0),
                Kind::Int8 => Value::I8(1),
                Kind::UInt8 => Value::U8(1),
                Kind::Int16 => Value::I16(1),
                Kind::UInt16 => Value::U16(1),
                Kind::Int32 => Value::I32(1),
                Kind::UInt32 => Value::U32(1),
                Kind::Int64 => Value::I64(1),
                Kind::UInt64 => Value::U64(1),
            };
            let start = s.tell().unwrap();
            let n = s.write_kind(kind, &v).unwrap();
            assert_eq!(n, kind.slot_width(1));
            s.seek(SeekFrom::Start(start)).unwrap();
            assert_eq!(s.read_kind(kind).unwrap(), v, "{}", kind);
        }
    }

    #[test]
    fn chars_pad_and_read_raw() {
        let mut s = stream();
        assert_eq!(s.write_chars(b"ab", Some(4)).unwrap(), 4);
        assert!(matches!(s.write_chars(b"abcde", Some(4)), Err(CodecError::FieldTooLong { len: 5, declared: 4 })));
        s.seek(SeekFrom::Start(0)).unwrap();
        assert_eq!(s.read_chars(4).unwrap(), b"ab\0\0".to_vec());
    }

    #[test]
    fn raw_read_may_be_short() {
        let mut s = stream();
        s.write(&[1, 2, 3]).unwrap();
        s.seek(SeekFrom::Start(1)).unwrap();
        assert_eq!(s.read(10).unwrap(), vec![2, 3]);
    }

    #[test]
    fn guard_pops_on_drop() {
        let mut s = stream();
        s.write(&[0u8; 16]).unwrap();
        {
            let mut g = s.pushing(Some(SeekFrom::Start(2))).unwrap();
            g.write_u8(9).unwrap();
            assert_eq!(g.depth(), 1);
        }
        assert_eq!(s.tell().unwrap(), 16);
        assert_eq!(s.depth(), 0);
        assert_eq!(s.get_ref().get_ref()[2], 9);
    }

    #[test]
    fn with_position_restores_on_error() {
        let mut s = stream();
        s.write(&[0u8; 8]).unwrap();
        s.seek(SeekFrom::Start(3)).unwrap();
        let r: Result<(), CodecError> = s.with_position(Some(SeekFrom::Start(6)), |s| {
            s.read_u64()?;
            Ok(())
        });
        assert!(matches!(r, Err(CodecError::Io(_))));
        assert_eq!(s.tell().unwrap(), 3);
        assert_eq!(s.depth(), 0);
    }

    #[test]
    fn pop_without_push() {
        let mut s = stream();
        assert!(matches!(s.pop(), Err(CodecError::EmptyStack)));
    }
}
