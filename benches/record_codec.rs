//! Benchmark: layout cache lookup vs fresh compile, and record encode/decode for a small
//! header and a wider array-heavy record.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::io::{Cursor, SeekFrom};
use std::sync::Arc;
use structstream::{decode_record, encode_record, Endianness, FieldSpec, Input, Kind, Layout, LayoutCache, StructStream, Value};

fn header() -> Vec<FieldSpec> {
    vec![
        FieldSpec::array(Kind::Char, "magic", 4),
        FieldSpec::new(Kind::UInt8, "version"),
        FieldSpec::new(Kind::UInt32, "crc"),
        FieldSpec::new(Kind::UInt32, "flags"),
    ]
}

fn header_values() -> Vec<Value> {
    vec![Value::from("asdf"), Value::U8(1), Value::U32(0xAABBCCDD), Value::U32(12345678)]
}

fn sample_block() -> (Vec<FieldSpec>, Vec<Value>) {
    let fields = vec![
        FieldSpec::new(Kind::UInt64, "timestamp"),
        FieldSpec::array(Kind::Int16, "samples", 64),
        FieldSpec::array(Kind::Float, "gain", 4),
        FieldSpec::array(Kind::Char, "label", 16),
    ];
    let values = vec![
        Value::U64(1_700_000_000),
        Value::Tuple((0..64).map(|i| Value::I16(i * 3 - 90)).collect()),
        Value::Tuple(vec![Value::Float(1.0); 4]),
        Value::from("channel-0"),
    ];
    (fields, values)
}

fn bench_compile(c: &mut Criterion) {
    let fields = header();
    let cache = LayoutCache::new();
    cache.get(&fields, Endianness::Little).unwrap();
    c.bench_function("compile_fresh", |b| {
        b.iter(|| Layout::compile(black_box(&fields), Endianness::Little).unwrap())
    });
    c.bench_function("compile_cached", |b| {
        b.iter(|| cache.get(black_box(&fields), Endianness::Little).unwrap())
    });
}

fn bench_codec(c: &mut Criterion) {
    let layout = Layout::compile(&header(), Endianness::Little).unwrap();
    let values = header_values();
    let bytes = encode_record(&layout, Input::Positional(&values)).unwrap();
    c.bench_function("header_encode", |b| {
        b.iter(|| encode_record(&layout, Input::Positional(black_box(&values))).unwrap())
    });
    c.bench_function("header_decode", |b| b.iter(|| decode_record(&layout, black_box(&bytes)).unwrap()));

    let (fields, values) = sample_block();
    let layout = Layout::compile(&fields, Endianness::Big).unwrap();
    let bytes = encode_record(&layout, Input::Positional(&values)).unwrap();
    c.bench_function("block_encode", |b| {
        b.iter(|| encode_record(&layout, Input::Positional(black_box(&values))).unwrap())
    });
    c.bench_function("block_decode", |b| b.iter(|| decode_record(&layout, black_box(&bytes)).unwrap()));
}

fn bench_stream(c: &mut Criterion) {
    let fields = header();
    let values = header_values();
    let mut s = StructStream::new(Cursor::new(Vec::with_capacity(13 * 1024))).with_cache(Arc::new(LayoutCache::new()));
    for _ in 0..1024 {
        s.write_struct(&fields, &values).unwrap();
    }
    c.bench_function("stream_read_1024_headers", |b| {
        b.iter(|| {
            s.seek(SeekFrom::Start(0)).unwrap();
            let mut n = 0usize;
            while s.read_struct(&fields).unwrap().is_some() {
                n += 1;
            }
            black_box(n)
        })
    });
}

criterion_group!(benches, bench_compile, bench_codec, bench_stream);
criterion_main!(benches);
