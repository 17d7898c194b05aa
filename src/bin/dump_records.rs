//! Dump fixed-size records from a binary file using a layout declaration.
//!
//! Usage:
//!   dump_records [OPTIONS] LAYOUT DATA
//!
//! Options:
//!   --big, -b        Big-endian when the layout has no `endian` header (default little)
//!   --offset=N       Start reading at byte N
//!   --limit=N        Stop after N records
//!
//! Reads records until fewer than one record's worth of bytes remain, then reports how
//! many trailing bytes were left over. Set RUST_LOG=debug for layout compile details.

use std::fs::File;
use std::io::{BufReader, SeekFrom};
use std::path::PathBuf;
use structstream::value::Value;
use structstream::{parse, Endianness, Layout, StructStream};

fn format_value(v: &Value) -> String {
    match v {
        Value::I8(x) => x.to_string(),
        Value::U8(x) => x.to_string(),
        Value::I16(x) => x.to_string(),
        Value::U16(x) => x.to_string(),
        Value::I32(x) => x.to_string(),
        Value::U32(x) => x.to_string(),
        Value::I64(x) => x.to_string(),
        Value::U64(x) => x.to_string(),
        Value::Half(x) => x.to_string(),
        Value::Float(x) => x.to_string(),
        Value::Double(x) => x.to_string(),
        Value::Bytes(b) => format!("{:?}", String::from_utf8_lossy(b)),
        Value::Tuple(items) => {
            let parts: Vec<String> = items.iter().map(format_value).collect();
            format!("({})", parts.join(", "))
        }
    }
}

fn take_flag(args: &mut Vec<String>, names: &[&str]) -> bool {
    if let Some(pos) = args.iter().position(|a| names.contains(&a.as_str())) {
        args.remove(pos);
        true
    } else {
        false
    }
}

fn take_number(args: &mut Vec<String>, prefix: &str) -> anyhow::Result<Option<u64>> {
    match args.iter().position(|a| a.starts_with(prefix)) {
        Some(pos) => {
            let arg = args.remove(pos);
            let n = arg[prefix.len()..]
                .parse()
                .map_err(|e| anyhow::anyhow!("{}: {}", arg, e))?;
            Ok(Some(n))
        }
        None => Ok(None),
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let default_endianness = if take_flag(&mut args, &["--big", "-b"]) {
        Endianness::Big
    } else {
        Endianness::Little
    };
    let offset = take_number(&mut args, "--offset=")?.unwrap_or(0);
    let limit = take_number(&mut args, "--limit=")?;
    let mut args = args.into_iter();
    let (layout_path, data_path) = match (args.next(), args.next()) {
        (Some(l), Some(d)) => (PathBuf::from(l), PathBuf::from(d)),
        _ => anyhow::bail!("usage: dump_records [--big] [--offset=N] [--limit=N] LAYOUT DATA"),
    };

    let src = std::fs::read_to_string(&layout_path)?;
    let decl = parse(&src)?;
    let layout: Layout = decl.compile(default_endianness)?;
    log::info!(
        "{}: {} fields, format {}, {} bytes per record",
        layout_path.display(),
        layout.fields().len(),
        layout.format(),
        layout.size()
    );
    if layout.size() == 0 {
        anyhow::bail!("{}: layout has no fields", layout_path.display());
    }

    let file = File::open(&data_path)?;
    let mut stream = StructStream::new(BufReader::new(file)).with_endianness(layout.endianness());
    let end = stream.seek(SeekFrom::End(0))?;
    stream.seek(SeekFrom::Start(offset))?;

    let mut count: u64 = 0;
    while limit.map_or(true, |l| count < l) {
        let at = stream.tell()?;
        let record = match stream.read_layout(&layout)? {
            Some(r) => r,
            None => break,
        };
        println!("#{} @{}", count, at);
        for g in layout.groups() {
            if let Some(v) = record.get(&g.name) {
                println!("  {}: {} = {}", g.name, g.kind, format_value(v));
            }
        }
        count += 1;
    }

    let pos = stream.tell()?;
    eprintln!("{} record(s), {} trailing byte(s)", count, end.saturating_sub(pos));
    Ok(())
}
