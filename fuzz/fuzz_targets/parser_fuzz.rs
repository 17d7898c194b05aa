//! Layout parser fuzz target: feed arbitrary bytes to the declaration parser.
//! Neither parsing nor compiling an accepted declaration may panic; oversized records
//! fail to compile with an error.
//! Build with: cargo fuzz run parser_fuzz (requires nightly and cargo fuzz).

#![cfg_attr(fuzzing, no_main)]

#[cfg(fuzzing)]
use libfuzzer_sys::fuzz_target;

#[cfg(fuzzing)]
fuzz_target!(|data: &[u8]| {
    let s = match std::str::from_utf8(data) {
        Ok(x) => x,
        Err(_) => return,
    };
    if let Ok(decl) = structstream::parse(s) {
        let _ = decl.compile(structstream::Endianness::Little);
    }
});

#[cfg(not(fuzzing))]
fn main() {
    eprintln!("Build with: cargo fuzz run parser_fuzz");
}
