//! Stamps the version `pantryctl --version` prints.
//!
//! Packagers may set PANTRY_VERSION (e.g. "0.4.0+deb1"); unset or blank
//! falls back to the crate version.

fn main() {
    let version = std::env::var("PANTRY_VERSION")
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string());

    println!("cargo:rustc-env=PANTRY_VERSION={}", version);
    println!("cargo:rerun-if-env-changed=PANTRY_VERSION");
    println!("cargo:rerun-if-changed=Cargo.toml");
}
