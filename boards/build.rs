// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2024.

//! Build script shared by board crates. It links the board with its
//! `layout.ld` and, when `DOOMGENERIC_LIB_DIR` is set, with the prebuilt
//! `libdoomgeneric.a` found there.
//!
//! Board crates can use this script from their `Cargo.toml` files:
//!
//! ```toml
//! [package]
//! # ...
//! build = "../build.rs"
//! ```

use std::path::Path;

const LINKER_SCRIPT: &str = "layout.ld";

fn main() {
    if !Path::new(LINKER_SCRIPT).exists() {
        panic!("Boards must provide a `layout.ld` link script file");
    }

    // The board's `.cargo/config.toml` sets a sentinel cfg next to the
    // rustflags the image needs. A RUSTFLAGS environment variable replaces
    // that list, and the build would silently produce a broken image.
    //
    // Only checked when cross compiling, so host tools such as `cargo clippy`
    // keep working.
    if std::env::var("HOST") != std::env::var("TARGET") {
        let rust_flags = std::env::var("CARGO_ENCODED_RUSTFLAGS");
        if !rust_flags
            .iter()
            .any(|f| f.contains("cfg_tock_buildflagssentinel"))
        {
            panic!(
                "Incorrect build configuration. \
            Verify you have not unintentionally set the RUSTFLAGS environment variable."
            );
        }
    }

    println!("cargo:rustc-link-arg=-L{}", std::env!("CARGO_MANIFEST_DIR"));
    println!("cargo:rustc-link-arg=-T{}", LINKER_SCRIPT);
    println!("cargo:rerun-if-changed={}", LINKER_SCRIPT);

    println!("cargo:rerun-if-env-changed=DOOMGENERIC_LIB_DIR");
    if let Ok(dir) = std::env::var("DOOMGENERIC_LIB_DIR") {
        println!("cargo:rustc-link-search=native={}", dir);
        println!("cargo:rustc-link-lib=static=doomgeneric");
    }
}
