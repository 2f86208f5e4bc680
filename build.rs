//! Puts `memory.x` on the linker search path for the firmware image.

use std::env;
use std::fs;
use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");

    // Host builds of the library and its tests never link against it.
    if env::var_os("CARGO_FEATURE_FIRMWARE").is_none() {
        return;
    }

    let out = PathBuf::from(env::var_os("OUT_DIR").unwrap());
    fs::write(out.join("memory.x"), include_bytes!("memory.x")).unwrap();
    println!("cargo:rustc-link-search={}", out.display());
}
