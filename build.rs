//! Build script for the macrodata firmware
//!
//! - Passes the esp-hal linker scripts when building for the chip
//! - Detects optional image assets and exposes them as cfgs

use std::{env, path::Path};

const ASSETS: [(&str, &str); 2] = [
    ("assets/logo.rgb.zlib", "has_logo_asset"),
    ("assets/background.rgb.zlib", "has_background_asset"),
];

fn main() {
    setup_linker();
    detect_assets();
}

fn setup_linker() {
    println!("cargo:rerun-if-changed=build.rs");

    let target = env::var("TARGET").unwrap_or_default();
    if target.starts_with("xtensa-") {
        println!("cargo:rustc-link-arg=-Tlinkall.x");
    }
}

fn detect_assets() {
    println!("cargo:rerun-if-env-changed=MACRODATA_CLOCK_BASE");

    for (path, cfg) in ASSETS {
        println!("cargo:rustc-check-cfg=cfg({cfg})");
        println!("cargo:rerun-if-changed={path}");
        if Path::new(path).exists() {
            println!("cargo:rustc-cfg={cfg}");
        } else {
            println!("cargo:warning={path} not found, building without it");
        }
    }
}
