//! Layout declaration parser tests: syntax (parse success/failure) and semantics
//! (kinds, counts, endianness, duplicate names).

use std::io::{Cursor, SeekFrom};
use structstream::{parse, CodecError, Endianness, FieldSpec, Kind, StructStream, Value};

// ==================== Syntax: valid declarations ====================

#[test]
fn parse_empty_declaration() {
    let decl = parse("").expect("empty declaration can parse");
    assert!(decl.fields.is_empty());
    assert!(decl.endianness.is_none());
}

#[test]
fn parse_all_short_kinds() {
    let src = r#"
a: i8;
b: u8;
c: i16;
d: u16;
e: i32;
f: u32;
g: i64;
h: u64;
i: f16;
j: f32;
k: f64;
l: char[3];
"#;
    let decl = parse(src).expect("parse");
    let kinds: Vec<Kind> = decl.fields.iter().map(|f| f.kind).collect();
    assert_eq!(kinds, Kind::ALL.to_vec());
    let layout = decl.compile(Endianness::Little).expect("compile");
    assert_eq!(layout.format().to_string(), "<bBhHiIqQefd3s");
    assert_eq!(layout.size(), 1 + 1 + 2 + 2 + 4 + 4 + 8 + 8 + 2 + 4 + 8 + 3);
}

#[test]
fn parse_registry_names() {
    let decl = parse("x: UInt16[2]; y: Double; z: Char[8];").expect("parse");
    assert_eq!(
        decl.fields,
        vec![
            FieldSpec::array(Kind::UInt16, "x", 2),
            FieldSpec::new(Kind::Double, "y"),
            FieldSpec::array(Kind::Char, "z", 8),
        ]
    );
}

#[test]
fn parse_with_comments() {
    let src = r#"
// file header
magic: char[4]; /* ascii tag */
version: u8;
"#;
    let decl = parse(src).expect("parse");
    assert_eq!(decl.fields.len(), 2);
    assert_eq!(decl.fields[1].name, "version");
}

#[test]
fn parse_endian_headers() {
    for (src, expected) in [
        ("endian little; a: u8;", Endianness::Little),
        ("endian big; a: u8;", Endianness::Big),
        ("endian network; a: u8;", Endianness::Big),
    ] {
        assert_eq!(parse(src).expect("parse").endianness, Some(expected), "{}", src);
    }
}

// ==================== Syntax: invalid declarations ====================

#[test]
fn parse_fails_missing_semicolon() {
    assert!(parse("a: u8").is_err());
}

#[test]
fn parse_fails_missing_kind() {
    assert!(parse("a: ;").is_err());
}

#[test]
fn parse_fails_bad_identifier() {
    assert!(parse("1a: u8;").is_err());
}

#[test]
fn parse_fails_endian_without_separator() {
    assert!(parse("endianbig;").is_err());
    assert!(parse("endianlittle; a: u8;").is_err());
    assert_eq!(parse("endian\nbig; a: u8;").expect("parse").endianness, Some(Endianness::Big));
}

#[test]
fn parse_fails_endian_after_fields() {
    assert!(parse("a: u8; endian big;").is_err());
}

// ==================== Semantics ====================

#[test]
fn unknown_kind_is_malformed() {
    let err = parse("a: u128;").unwrap_err();
    assert!(matches!(err, CodecError::MalformedSpec(ref m) if m.contains("u128")), "{}", err);
}

#[test]
fn zero_count_is_malformed() {
    assert!(matches!(parse("a: u8[0];"), Err(CodecError::MalformedSpec(_))));
}

#[test]
fn oversized_field_is_malformed() {
    let err = parse("x: u64[2305843009213693952];").unwrap_err();
    assert!(matches!(err, CodecError::MalformedSpec(ref m) if m.contains("line 1")), "{}", err);
}

#[test]
fn oversized_record_fails_to_compile() {
    let src = format!("a: char[{}];\nb: u8;", usize::MAX);
    let decl = parse(&src).expect("each field fits on its own");
    assert!(matches!(decl.compile(Endianness::Little), Err(CodecError::MalformedSpec(_))));
}

#[test]
fn duplicate_name_is_malformed() {
    assert!(matches!(parse("a: u8; a: u16;"), Err(CodecError::MalformedSpec(_))));
}

#[test]
fn parsed_layout_drives_stream() {
    let decl = parse("endian big;\nid: u16;\npos: i16[2];\ntag: char[4];").expect("parse");
    let mut s = StructStream::new(Cursor::new(Vec::new())).with_endianness(Endianness::Big);
    s.write_struct(
        &decl.fields,
        &[
            Value::U16(0x0102),
            Value::Tuple(vec![Value::I16(-1), Value::I16(1)]),
            Value::from("ab"),
        ],
    )
    .expect("write");
    assert_eq!(&s.get_ref().get_ref()[..2], &[0x01, 0x02]);
    s.seek(SeekFrom::Start(0)).unwrap();
    let rec = s.read_struct(&decl.fields).expect("read").expect("record");
    assert_eq!(rec["tag"], Value::Bytes(b"ab\0\0".to_vec()));
    assert_eq!(rec["pos"].as_tuple().map(|t| t.len()), Some(2));
}
