//! Location of the genuine C runtime library.
//!
//! The path is a configuration value resolved at startup: well-known
//! per-architecture install paths are tried first, then the plain soname,
//! which `dlopen` resolves through the default loader search path on
//! distributions that keep libc elsewhere.

use std::path::PathBuf;

#[cfg(target_os = "linux")]
pub const LIBC_SONAME: &str = "libc.so.6";
#[cfg(target_os = "macos")]
pub const LIBC_SONAME: &str = "libSystem.B.dylib";

#[cfg(all(target_os = "linux", target_arch = "x86_64"))]
const WELL_KNOWN_PATHS: &[&str] = &[
    "/lib/x86_64-linux-gnu/libc.so.6",
    "/lib64/libc.so.6",
    "/usr/lib/libc.so.6",
];

#[cfg(all(target_os = "linux", target_arch = "aarch64"))]
const WELL_KNOWN_PATHS: &[&str] = &[
    "/lib/aarch64-linux-gnu/libc.so.6",
    "/lib64/libc.so.6",
    "/usr/lib/libc.so.6",
];

#[cfg(all(target_os = "linux", not(any(target_arch = "x86_64", target_arch = "aarch64"))))]
const WELL_KNOWN_PATHS: &[&str] = &["/lib64/libc.so.6", "/usr/lib/libc.so.6"];

#[cfg(target_os = "macos")]
const WELL_KNOWN_PATHS: &[&str] = &["/usr/lib/libSystem.B.dylib"];

/// First existing well-known path, or the bare soname as a fallback.
pub fn default_libc_path() -> PathBuf {
    for candidate in WELL_KNOWN_PATHS {
        let path = PathBuf::from(candidate);
        if path.exists() {
            return path;
        }
    }
    PathBuf::from(LIBC_SONAME)
}
