//! Format fuzz target: the first line is a packed-format descriptor, the rest is data.
//! Parsing, unpacking and re-packing must not panic, and a successful unpack must
//! re-pack to the same bytes.
//! Build with: cargo fuzz run format_fuzz (requires nightly and cargo fuzz).

#![cfg_attr(fuzzing, no_main)]

#[cfg(fuzzing)]
use libfuzzer_sys::fuzz_target;

#[cfg(fuzzing)]
fuzz_target!(|data: &[u8]| {
    let split = data.iter().position(|&b| b == b'\n').unwrap_or(data.len());
    let (head, rest) = data.split_at(split);
    let Ok(descriptor) = std::str::from_utf8(head) else { return };
    let Ok(format) = structstream::Format::parse(descriptor) else { return };
    if format.size() > 1 << 16 {
        return;
    }
    let body = rest.get(1..).unwrap_or(&[]);
    if body.len() < format.size() {
        return;
    }
    if let Ok(values) = format.unpack(&body[..format.size()]) {
        let packed = format.pack(&values).expect("unpacked values re-pack");
        assert_eq!(packed, &body[..format.size()]);
    }
});

#[cfg(not(fuzzing))]
fn main() {
    eprintln!("Build with: cargo fuzz run format_fuzz");
}
