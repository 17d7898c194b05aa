//! Single-value encode/decode for every registered kind.
//!
//! Dispatch is an exhaustive `match` on [`Kind`]; the layout codec packs its flat value
//! sequence through these, and [`StructStream`](crate::stream::StructStream) exposes them
//! as typed `read_*` / `write_*` accessors.

use crate::codec::{CodecError, Endianness};
use crate::kind::Kind;
use crate::value::Value;
use byteorder::{BigEndian, ByteOrder, LittleEndian, ReadBytesExt, WriteBytesExt};
use half::f16;
use std::io::{self, Read, Write};

/// Decode one slot of `kind`. `width` is only consulted for `Char`.
pub fn read_scalar<R: Read + ?Sized>(
    r: &mut R,
    kind: Kind,
    width: usize,
    endianness: Endianness,
) -> io::Result<Value> {
    match endianness {
        Endianness::Little => read_with::<LittleEndian, R>(r, kind, width),
        Endianness::Big => read_with::<BigEndian, R>(r, kind, width),
    }
}

/// Encode one slot of `kind` onto `w`.
///
/// Integers are range-checked against the target kind, and finite floats that would
/// narrow to infinity in `Half` or `Float` fail with [`CodecError::OutOfRange`]. `Char`
/// values shorter than `width` are zero-padded; longer values fail with
/// [`CodecError::FieldTooLong`].
pub fn write_scalar(
    w: &mut Vec<u8>,
    kind: Kind,
    width: usize,
    endianness: Endianness,
    v: &Value,
) -> Result<(), CodecError> {
    match endianness {
        Endianness::Little => write_with::<LittleEndian>(w, kind, width, v),
        Endianness::Big => write_with::<BigEndian>(w, kind, width, v),
    }
}

/// Zero-pad `bytes` to `width`.
pub fn pad_bytes(bytes: &[u8], width: usize) -> Result<Vec<u8>, CodecError> {
    if bytes.len() > width {
        return Err(CodecError::FieldTooLong {
            len: bytes.len(),
            declared: width,
        });
    }
    let mut out = Vec::with_capacity(width);
    out.extend_from_slice(bytes);
    out.resize(width, 0);
    Ok(out)
}

/// Fixed-width numeric type with a byte-order-generic encoding.
///
/// Implemented for every native type behind a numeric [`Kind`]; `StructStream`'s typed
/// accessors and the layout codec both go through it.
pub trait Scalar: Sized + Copy {
    const KIND: Kind;

    fn read_from<B: ByteOrder, R: Read + ?Sized>(r: &mut R) -> io::Result<Self>;
    fn write_to<B: ByteOrder, W: Write + ?Sized>(self, w: &mut W) -> io::Result<()>;
}

macro_rules! ordered_scalar {
    ($t:ty, $kind:expr, $read:ident, $write:ident) => {
        impl Scalar for $t {
            const KIND: Kind = $kind;

            fn read_from<B: ByteOrder, R: Read + ?Sized>(r: &mut R) -> io::Result<Self> {
                r.$read::<B>()
            }

            fn write_to<B: ByteOrder, W: Write + ?Sized>(self, w: &mut W) -> io::Result<()> {
                w.$write::<B>(self)
            }
        }
    };
}

ordered_scalar!(i16, Kind::Int16, read_i16, write_i16);
ordered_scalar!(u16, Kind::UInt16, read_u16, write_u16);
ordered_scalar!(i32, Kind::Int32, read_i32, write_i32);
ordered_scalar!(u32, Kind::UInt32, read_u32, write_u32);
ordered_scalar!(i64, Kind::Int64, read_i64, write_i64);
ordered_scalar!(u64, Kind::UInt64, read_u64, write_u64);
ordered_scalar!(f32, Kind::Float, read_f32, write_f32);
ordered_scalar!(f64, Kind::Double, read_f64, write_f64);

impl Scalar for i8 {
    const KIND: Kind = Kind::Int8;

    fn read_from<B: ByteOrder, R: Read + ?Sized>(r: &mut R) -> io::Result<Self> {
        r.read_i8()
    }

    fn write_to<B: ByteOrder, W: Write + ?Sized>(self, w: &mut W) -> io::Result<()> {
        w.write_i8(self)
    }
}

impl Scalar for u8 {
    const KIND: Kind = Kind::UInt8;

    fn read_from<B: ByteOrder, R: Read + ?Sized>(r: &mut R) -> io::Result<Self> {
        r.read_u8()
    }

    fn write_to<B: ByteOrder, W: Write + ?Sized>(self, w: &mut W) -> io::Result<()> {
        w.write_u8(self)
    }
}

impl Scalar for f16 {
    const KIND: Kind = Kind::Half;

    fn read_from<B: ByteOrder, R: Read + ?Sized>(r: &mut R) -> io::Result<Self> {
        Ok(f16::from_bits(r.read_u16::<B>()?))
    }

    fn write_to<B: ByteOrder, W: Write + ?Sized>(self, w: &mut W) -> io::Result<()> {
        w.write_u16::<B>(self.to_bits())
    }
}

/// Read one `T` in the given byte order.
pub fn read_ordered<T: Scalar, R: Read + ?Sized>(r: &mut R, endianness: Endianness) -> io::Result<T> {
    match endianness {
        Endianness::Little => T::read_from::<LittleEndian, R>(r),
        Endianness::Big => T::read_from::<BigEndian, R>(r),
    }
}

/// Write one `T` in the given byte order.
pub fn write_ordered<T: Scalar, W: Write + ?Sized>(w: &mut W, endianness: Endianness, v: T) -> io::Result<()> {
    match endianness {
        Endianness::Little => v.write_to::<LittleEndian, W>(w),
        Endianness::Big => v.write_to::<BigEndian, W>(w),
    }
}

fn read_with<B: ByteOrder, R: Read + ?Sized>(r: &mut R, kind: Kind, width: usize) -> io::Result<Value> {
    Ok(match kind {
        Kind::Int8 => Value::I8(i8::read_from::<B, R>(r)?),
        Kind::UInt8 => Value::U8(u8::read_from::<B, R>(r)?),
        Kind::Int16 => Value::I16(i16::read_from::<B, R>(r)?),
        Kind::UInt16 => Value::U16(u16::read_from::<B, R>(r)?),
        Kind::Int32 => Value::I32(i32::read_from::<B, R>(r)?),
        Kind::UInt32 => Value::U32(u32::read_from::<B, R>(r)?),
        Kind::Int64 => Value::I64(i64::read_from::<B, R>(r)?),
        Kind::UInt64 => Value::U64(u64::read_from::<B, R>(r)?),
        Kind::Half => Value::Half(f16::read_from::<B, R>(r)?),
        Kind::Float => Value::Float(f32::read_from::<B, R>(r)?),
        Kind::Double => Value::Double(f64::read_from::<B, R>(r)?),
        Kind::Char => {
            let mut buf = vec![0u8; width];
            r.read_exact(&mut buf)?;
            Value::Bytes(buf)
        }
    })
}

fn write_with<B: ByteOrder>(w: &mut Vec<u8>, kind: Kind, width: usize, v: &Value) -> Result<(), CodecError> {
    match kind {
        Kind::Int8 => int_value::<i8>(kind, v)?.write_to::<B, _>(w)?,
        Kind::UInt8 => int_value::<u8>(kind, v)?.write_to::<B, _>(w)?,
        Kind::Int16 => int_value::<i16>(kind, v)?.write_to::<B, _>(w)?,
        Kind::UInt16 => int_value::<u16>(kind, v)?.write_to::<B, _>(w)?,
        Kind::Int32 => int_value::<i32>(kind, v)?.write_to::<B, _>(w)?,
        Kind::UInt32 => int_value::<u32>(kind, v)?.write_to::<B, _>(w)?,
        Kind::Int64 => int_value::<i64>(kind, v)?.write_to::<B, _>(w)?,
        Kind::UInt64 => int_value::<u64>(kind, v)?.write_to::<B, _>(w)?,
        Kind::Half => {
            let h = match v {
                Value::Half(h) => *h,
                other => {
                    let x = float_value(kind, other)?;
                    narrowed(kind, x, f16::from_f64(x), f16::is_infinite)?
                }
            };
            h.write_to::<B, _>(w)?
        }
        Kind::Float => {
            let f = match v {
                Value::Float(f) => *f,
                other => {
                    let x = float_value(kind, other)?;
                    narrowed(kind, x, x as f32, f32::is_infinite)?
                }
            };
            f.write_to::<B, _>(w)?
        }
        Kind::Double => float_value(kind, v)?.write_to::<B, _>(w)?,
        Kind::Char => {
            let bytes = v.as_bytes().ok_or(CodecError::TypeMismatch {
                expected: kind,
                found: v.type_name(),
            })?;
            w.extend_from_slice(&pad_bytes(bytes, width)?);
        }
    }
    Ok(())
}

/// A finite value that narrows to infinity does not fit the target kind.
fn narrowed<T: Copy>(kind: Kind, x: f64, n: T, is_infinite: fn(T) -> bool) -> Result<T, CodecError> {
    if x.is_finite() && is_infinite(n) {
        return Err(CodecError::OutOfRange {
            kind,
            value: x.to_string(),
        });
    }
    Ok(n)
}

fn int_value<T: TryFrom<i128>>(kind: Kind, v: &Value) -> Result<T, CodecError> {
    let n = v.as_i128().ok_or(CodecError::TypeMismatch {
        expected: kind,
        found: v.type_name(),
    })?;
    T::try_from(n).map_err(|_| CodecError::OutOfRange {
        kind,
        value: n.to_string(),
    })
}

fn float_value(kind: Kind, v: &Value) -> Result<f64, CodecError> {
    v.as_f64().ok_or(CodecError::TypeMismatch {
        expected: kind,
        found: v.type_name(),
    })
}
