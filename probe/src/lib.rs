//! hookcheck-probe: detection engine for preload-style function interposition.
//!
//! For each probed symbol the engine resolves two addresses: one inside an
//! explicitly reopened C runtime library, and one with
//! search-after-current-module (`RTLD_NEXT`) scope. In an unmodified process
//! both resolutions name the same code location; a mismatch means an
//! interposed implementation sits ahead of the genuine library function in
//! the dynamic-linking search order.

pub mod detector;
pub mod error;
pub mod loader;
pub mod platform;

pub use detector::{CheckOutcome, Finding, HookDetector, ScanReport, SymbolCheck, DEFAULT_SYMBOLS};
pub use error::{ProbeError, Result};
pub use loader::Library;
