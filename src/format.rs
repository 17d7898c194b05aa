//! Packed-format descriptor: endianness prefix followed by `<count><code>` items.
//!
//! `"<4sBII"` is a little-endian 4-byte string, one u8 and two u32s (13 bytes, 4 slots).
//! The count is omitted for single numeric items; for `s` it is always the byte length
//! and the item occupies one slot.

use crate::codec::{CodecError, Endianness};
use crate::kind::Kind;
use crate::primitive::{read_scalar, write_scalar};
use crate::value::Value;
use std::fmt;
use std::io::Cursor;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FormatItem {
    pub count: usize,
    pub kind: Kind,
}

impl FormatItem {
    pub fn slots(&self) -> usize {
        match self.kind {
            Kind::Char => 1,
            _ => self.count,
        }
    }

    /// Encoded length in bytes, or `None` if it does not fit in `usize`.
    pub fn byte_len(&self) -> Option<usize> {
        match self.kind.width() {
            Some(w) => w.checked_mul(self.count),
            None => Some(self.count),
        }
    }
}

/// Fixed-size packing descriptor. Size and slot count are known up front.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Format {
    endianness: Endianness,
    items: Vec<FormatItem>,
    size: usize,
    slots: usize,
}

impl Format {
    /// Build a descriptor from items. Fails with [`CodecError::MalformedSpec`] when the
    /// total byte size overflows `usize`.
    pub fn new(endianness: Endianness, items: Vec<FormatItem>) -> Result<Self, CodecError> {
        let mut size: usize = 0;
        for item in &items {
            size = item
                .byte_len()
                .and_then(|len| size.checked_add(len))
                .ok_or_else(|| {
                    CodecError::MalformedSpec(format!(
                        "item {}{} overflows the record size",
                        item.count,
                        item.kind.code()
                    ))
                })?;
        }
        // every slot is at least one byte, so this cannot overflow once size fits
        let slots = items.iter().map(FormatItem::slots).sum();
        Ok(Format { endianness, items, size, slots })
    }

    /// Parse a descriptor string such as `">H3I8s"`. Whitespace between items is ignored.
    pub fn parse(s: &str) -> Result<Self, CodecError> {
        let mut chars = s.chars().peekable();
        let endianness = match chars.peek().copied().and_then(Endianness::from_prefix) {
            Some(e) => {
                chars.next();
                e
            }
            None => Endianness::default(),
        };
        let mut items = Vec::new();
        let mut digits = String::new();
        for c in chars {
            if c.is_ascii_digit() {
                digits.push(c);
                continue;
            }
            if c.is_whitespace() {
                if !digits.is_empty() {
                    return Err(CodecError::MalformedSpec(format!("format {:?}: count {} has no code", s, digits)));
                }
                continue;
            }
            let kind = Kind::from_code(c)
                .ok_or_else(|| CodecError::MalformedSpec(format!("format {:?}: unknown code {:?}", s, c)))?;
            let count = if digits.is_empty() {
                1
            } else {
                digits
                    .parse::<usize>()
                    .map_err(|e| CodecError::MalformedSpec(format!("format {:?}: {}", s, e)))?
            };
            if count == 0 {
                return Err(CodecError::MalformedSpec(format!("format {:?}: zero count for {:?}", s, c)));
            }
            digits.clear();
            items.push(FormatItem { count, kind });
        }
        if !digits.is_empty() {
            return Err(CodecError::MalformedSpec(format!("format {:?}: trailing count {}", s, digits)));
        }
        Format::new(endianness, items)
    }

    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    pub fn items(&self) -> &[FormatItem] {
        &self.items
    }

    /// Total encoded size in bytes.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of values in the flat sequence.
    pub fn slots(&self) -> usize {
        self.slots
    }

    /// Pack a flat value sequence, one value per slot, in item order.
    pub fn pack(&self, values: &[Value]) -> Result<Vec<u8>, CodecError> {
        if values.len() != self.slots {
            return Err(CodecError::ArityMismatch(format!(
                "format {} packs {} values, got {}",
                self, self.slots, values.len()
            )));
        }
        let mut out = Vec::with_capacity(self.size);
        let mut values = values.iter();
        for item in &self.items {
            let width = item.kind.slot_width(item.count);
            for v in values.by_ref().take(item.slots()) {
                write_scalar(&mut out, item.kind, width, self.endianness, v)?;
            }
        }
        Ok(out)
    }

    /// Unpack exactly [`size`](Self::size) bytes into a flat value sequence.
    pub fn unpack(&self, bytes: &[u8]) -> Result<Vec<Value>, CodecError> {
        if bytes.len() != self.size {
            return Err(CodecError::ArityMismatch(format!(
                "format {} unpacks {} bytes, got {}",
                self,
                self.size,
                bytes.len()
            )));
        }
        let mut r = Cursor::new(bytes);
        let mut out = Vec::with_capacity(self.slots);
        for item in &self.items {
            let width = item.kind.slot_width(item.count);
            for _ in 0..item.slots() {
                out.push(read_scalar(&mut r, item.kind, width, self.endianness)?);
            }
        }
        Ok(out)
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.endianness.prefix())?;
        for item in &self.items {
            if item.kind == Kind::Char || item.count != 1 {
                write!(f, "{}", item.count)?;
            }
            write!(f, "{}", item.kind.code())?;
        }
        Ok(())
    }
}

impl FromStr for Format {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Format::parse(s)
    }
}
