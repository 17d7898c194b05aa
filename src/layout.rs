//! Layout compiler: turns an ordered field list into a packed [`Format`] plus the
//! per-field grouping needed to map flat values back onto named fields.

use crate::codec::{CodecError, Endianness};
use crate::field::{fields_from_items, validate_fields, FieldSpec, Item};
use crate::format::{Format, FormatItem};
use crate::kind::Kind;

/// Per-field slice of the flat value sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub name: String,
    /// Slots taken in the flat sequence: `count` for numeric kinds, 1 for `Char`.
    pub slots: usize,
    pub kind: Kind,
    /// Declared count (byte length for `Char`).
    pub count: usize,
}

impl Group {
    /// Whether the field decodes as a tuple rather than a scalar.
    pub fn is_array(&self) -> bool {
        self.slots > 1
    }
}

/// Compiled, immutable record layout.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    fields: Vec<FieldSpec>,
    groups: Vec<Group>,
    format: Format,
}

impl Layout {
    /// Compile a field list. Fails with [`CodecError::MalformedSpec`] on empty or
    /// duplicate names, zero counts and record sizes that overflow `usize`.
    pub fn compile(fields: &[FieldSpec], endianness: Endianness) -> Result<Layout, CodecError> {
        validate_fields(fields)?;
        let mut items = Vec::with_capacity(fields.len());
        let mut groups = Vec::with_capacity(fields.len());
        for f in fields {
            items.push(FormatItem { count: f.count, kind: f.kind });
            groups.push(Group {
                name: f.name.clone(),
                slots: f.slots(),
                kind: f.kind,
                count: f.count,
            });
        }
        let format = Format::new(endianness, items)?;
        Ok(Layout {
            fields: fields.to_vec(),
            groups,
            format,
        })
    }

    /// Compile a flat `kind, name [, count]` declaration list.
    pub fn compile_items(items: &[Item], endianness: Endianness) -> Result<Layout, CodecError> {
        let fields = fields_from_items(items)?;
        Layout::compile(&fields, endianness)
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn format(&self) -> &Format {
        &self.format
    }

    pub fn endianness(&self) -> Endianness {
        self.format.endianness()
    }

    /// Encoded record size in bytes.
    pub fn size(&self) -> usize {
        self.format.size()
    }

    /// Total slot count of the flat value sequence.
    pub fn slots(&self) -> usize {
        self.format.slots()
    }

    pub fn group(&self, name: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.name == name)
    }
}
