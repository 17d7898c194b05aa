//! Field declarations: the input to the layout compiler.

use crate::codec::CodecError;
use crate::kind::Kind;
use std::collections::HashSet;

/// One declared field.
///
/// `count` is the number of repeated slots for numeric kinds, or the byte length for
/// [`Kind::Char`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldSpec {
    pub kind: Kind,
    pub name: String,
    pub count: usize,
}

impl FieldSpec {
    pub fn new(kind: Kind, name: impl Into<String>) -> Self {
        FieldSpec { kind, name: name.into(), count: 1 }
    }

    pub fn array(kind: Kind, name: impl Into<String>, count: usize) -> Self {
        FieldSpec { kind, name: name.into(), count }
    }

    /// Slots this field occupies in the flat value sequence.
    pub fn slots(&self) -> usize {
        match self.kind {
            Kind::Char => 1,
            _ => self.count,
        }
    }

    /// Encoded byte width of the whole field, or `None` if it overflows `usize`.
    pub fn byte_len(&self) -> Option<usize> {
        match self.kind.width() {
            Some(w) => w.checked_mul(self.count),
            None => Some(self.count),
        }
    }
}

/// Element of a flat declaration list: `kind, name [, count]` repeated.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Kind(Kind),
    Name(String),
    Count(i64),
}

impl From<Kind> for Item {
    fn from(k: Kind) -> Self {
        Item::Kind(k)
    }
}

impl From<&str> for Item {
    fn from(s: &str) -> Self {
        Item::Name(s.to_string())
    }
}

impl From<String> for Item {
    fn from(s: String) -> Self {
        Item::Name(s)
    }
}

impl From<i32> for Item {
    fn from(n: i32) -> Self {
        Item::Count(n as i64)
    }
}

/// Build a flat declaration list: `items![Kind::Char, "magic", 4, Kind::UInt8, "version"]`.
#[macro_export]
macro_rules! items {
    ($($x:expr),* $(,)?) => {
        vec![$($crate::field::Item::from($x)),*]
    };
}

/// Group a flat declaration list into fields.
pub fn fields_from_items(items: &[Item]) -> Result<Vec<FieldSpec>, CodecError> {
    let mut fields = Vec::new();
    let mut i = 0;
    while i < items.len() {
        let kind = match &items[i] {
            Item::Kind(k) => *k,
            other => {
                return Err(CodecError::MalformedSpec(format!(
                    "element {}: expected a kind, found {:?}",
                    i, other
                )))
            }
        };
        let name = match items.get(i + 1) {
            Some(Item::Name(n)) => n.clone(),
            Some(other) => {
                return Err(CodecError::MalformedSpec(format!(
                    "element {}: expected a field name, found {:?}",
                    i + 1,
                    other
                )))
            }
            None => {
                return Err(CodecError::MalformedSpec(format!(
                    "element {}: {} declaration has no name",
                    i, kind
                )))
            }
        };
        i += 2;
        let mut count = 1;
        if let Some(Item::Count(n)) = items.get(i) {
            count = usize::try_from(*n)
                .ok()
                .filter(|&c| c > 0)
                .ok_or_else(|| CodecError::MalformedSpec(format!("field {}: count must be positive, got {}", name, n)))?;
            i += 1;
        }
        fields.push(FieldSpec { kind, name, count });
    }
    Ok(fields)
}

/// Reject empty or non-identifier names, zero counts and duplicate names.
pub fn validate_fields(fields: &[FieldSpec]) -> Result<(), CodecError> {
    let mut seen = HashSet::new();
    for f in fields {
        if !is_identifier(&f.name) {
            return Err(CodecError::MalformedSpec(format!("invalid field name {:?}", f.name)));
        }
        if f.count == 0 {
            return Err(CodecError::MalformedSpec(format!("field {}: count must be positive", f.name)));
        }
        if !seen.insert(f.name.as_str()) {
            return Err(CodecError::MalformedSpec(format!("duplicate field name: {}", f.name)));
        }
    }
    Ok(())
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
