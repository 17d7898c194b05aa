//! Parse textual layout declarations using PEST.
//!
//! ```text
//! endian little;      // optional: little | big | network
//! magic:   char[4];
//! version: u8;
//! crc:     u32;
//! samples: i16[8];
//! ```
//!
//! Kinds accept registry names (`UInt16`) and short aliases (`u16`, `f32`, `char`).

use crate::codec::{CodecError, Endianness};
use crate::field::{validate_fields, FieldSpec};
use crate::kind::Kind;
use crate::layout::Layout;
use pest::Parser;
use pest_derive::Parser as PestParser;

#[derive(PestParser)]
#[grammar = "grammar.pest"]
struct LayoutParser;

/// Parsed declaration file.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutDecl {
    /// Byte order from an `endian` header, if present.
    pub endianness: Option<Endianness>,
    pub fields: Vec<FieldSpec>,
}

impl LayoutDecl {
    /// Compile using the declared byte order, or `default` when none was declared.
    pub fn compile(&self, default: Endianness) -> Result<Layout, CodecError> {
        Layout::compile(&self.fields, self.endianness.unwrap_or(default))
    }
}

/// Parse layout declaration source.
pub fn parse(source: &str) -> Result<LayoutDecl, CodecError> {
    let pairs = LayoutParser::parse(Rule::layout, source)
        .map_err(|e| CodecError::MalformedSpec(format!("Parse error: {}", e)))?;
    let pair = pairs
        .into_iter()
        .next()
        .ok_or_else(|| CodecError::MalformedSpec("Empty parse".to_string()))?;

    let mut endianness = None;
    let mut fields = Vec::new();
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::endian_decl => endianness = Some(build_endianness(inner)?),
            Rule::field => fields.push(build_field(inner)?),
            _ => {}
        }
    }
    validate_fields(&fields)?;
    Ok(LayoutDecl { endianness, fields })
}

fn build_endianness(pair: pest::iterators::Pair<Rule>) -> Result<Endianness, CodecError> {
    let kw = pair
        .into_inner()
        .find(|p| p.as_rule() == Rule::endian_kw)
        .ok_or_else(|| CodecError::MalformedSpec("endian: missing byte order".to_string()))?;
    match kw.as_str() {
        "little" => Ok(Endianness::Little),
        "big" | "network" => Ok(Endianness::Big),
        other => Err(CodecError::MalformedSpec(format!("endian: unknown byte order {}", other))),
    }
}

fn build_field(pair: pest::iterators::Pair<Rule>) -> Result<FieldSpec, CodecError> {
    let (line, _) = pair.as_span().start_pos().line_col();
    let mut name = String::new();
    let mut kind = None;
    let mut count = 1;
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::ident => name = inner.as_str().to_string(),
            Rule::kind_name => {
                let k = inner.as_str();
                kind = Some(Kind::from_name(k).ok_or_else(|| {
                    CodecError::MalformedSpec(format!("line {}: unknown kind {}", line, k))
                })?);
            }
            Rule::array_len => {
                let n = inner.into_inner().next().map(|p| p.as_str()).unwrap_or("");
                count = n
                    .parse::<usize>()
                    .map_err(|e| CodecError::MalformedSpec(format!("line {}: count {}: {}", line, n, e)))?;
                if count == 0 {
                    return Err(CodecError::MalformedSpec(format!("line {}: field {}: count must be positive", line, name)));
                }
            }
            _ => {}
        }
    }
    let kind = kind.ok_or_else(|| CodecError::MalformedSpec(format!("line {}: field {} has no kind", line, name)))?;
    let field = FieldSpec { kind, name, count };
    if field.byte_len().is_none() {
        return Err(CodecError::MalformedSpec(format!("line {}: field {}: size overflows", line, field.name)));
    }
    Ok(field)
}
