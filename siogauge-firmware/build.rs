//! Build script for siogauge-firmware
//!
//! Puts the GBA linker script on the link path and passes it to the linker.

use std::env;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

fn main() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy gba.ld to the output directory
    let script = include_bytes!("gba.ld");
    let mut f = File::create(out_dir.join("gba.ld")).unwrap();
    f.write_all(script).unwrap();

    println!("cargo:rustc-link-search={}", out_dir.display());
    println!("cargo:rustc-link-arg-bins=-Tgba.ld");

    println!("cargo:rerun-if-changed=gba.ld");
    println!("cargo:rerun-if-changed=build.rs");
}
