//! Registry of primitive kinds a layout field may declare.

use std::fmt;

/// Scalar primitive kind.
///
/// Numeric kinds have a fixed byte width. `Char` is a fixed-length byte string whose
/// width is the count declared on the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Half,
    Float,
    Double,
    Char,
}

impl Kind {
    /// Every registered kind, in registry order.
    pub const ALL: [Kind; 12] = [
        Kind::Int8,
        Kind::UInt8,
        Kind::Int16,
        Kind::UInt16,
        Kind::Int32,
        Kind::UInt32,
        Kind::Int64,
        Kind::UInt64,
        Kind::Half,
        Kind::Float,
        Kind::Double,
        Kind::Char,
    ];

    /// Packed-format code.
    pub fn code(self) -> char {
        match self {
            Kind::Int8 => 'b',
            Kind::UInt8 => 'B',
            Kind::Int16 => 'h',
            Kind::UInt16 => 'H',
            Kind::Int32 => 'i',
            Kind::UInt32 => 'I',
            Kind::Int64 => 'q',
            Kind::UInt64 => 'Q',
            Kind::Half => 'e',
            Kind::Float => 'f',
            Kind::Double => 'd',
            Kind::Char => 's',
        }
    }

    pub fn from_code(code: char) -> Option<Kind> {
        Kind::ALL.iter().copied().find(|k| k.code() == code)
    }

    /// Fixed byte width; `None` for `Char`.
    pub fn width(self) -> Option<usize> {
        match self {
            Kind::Int8 | Kind::UInt8 => Some(1),
            Kind::Int16 | Kind::UInt16 | Kind::Half => Some(2),
            Kind::Int32 | Kind::UInt32 | Kind::Float => Some(4),
            Kind::Int64 | Kind::UInt64 | Kind::Double => Some(8),
            Kind::Char => None,
        }
    }

    /// Byte width of one slot of this kind declared with `count`.
    pub fn slot_width(self, count: usize) -> usize {
        self.width().unwrap_or(count)
    }

    pub fn is_integer(self) -> bool {
        matches!(
            self,
            Kind::Int8
                | Kind::UInt8
                | Kind::Int16
                | Kind::UInt16
                | Kind::Int32
                | Kind::UInt32
                | Kind::Int64
                | Kind::UInt64
        )
    }

    pub fn is_float(self) -> bool {
        matches!(self, Kind::Half | Kind::Float | Kind::Double)
    }

    pub fn name(self) -> &'static str {
        match self {
            Kind::Int8 => "Int8",
            Kind::UInt8 => "UInt8",
            Kind::Int16 => "Int16",
            Kind::UInt16 => "UInt16",
            Kind::Int32 => "Int32",
            Kind::UInt32 => "UInt32",
            Kind::Int64 => "Int64",
            Kind::UInt64 => "UInt64",
            Kind::Half => "Half",
            Kind::Float => "Float",
            Kind::Double => "Double",
            Kind::Char => "Char",
        }
    }

    /// Resolve a registry name (`UInt16`) or short alias (`u16`).
    pub fn from_name(name: &str) -> Option<Kind> {
        if let Some(k) = Kind::ALL.iter().copied().find(|k| k.name() == name) {
            return Some(k);
        }
        Some(match name {
            "i8" => Kind::Int8,
            "u8" => Kind::UInt8,
            "i16" => Kind::Int16,
            "u16" => Kind::UInt16,
            "i32" => Kind::Int32,
            "u32" => Kind::UInt32,
            "i64" => Kind::Int64,
            "u64" => Kind::UInt64,
            "f16" | "half" => Kind::Half,
            "f32" | "float" => Kind::Float,
            "f64" | "double" => Kind::Double,
            "char" | "bytes" => Kind::Char,
            _ => return None,
        })
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
