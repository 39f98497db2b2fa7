//! The interposition check: resolve each symbol twice and compare.

use std::path::{Path, PathBuf};

use log::debug;
use serde::Serialize;

use crate::error::Result;
use crate::loader::{self, Library};

/// Functions commonly wrapped by preload-based hooks: filesystem and
/// networking entry points.
pub const DEFAULT_SYMBOLS: &[&str] = &["open", "readdir", "fopen", "accept", "access", "unlink"];

/// A detected interposition for one symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub symbol: String,
    /// Address resolved inside the explicitly opened runtime library.
    pub libc_address: usize,
    /// Address resolved with search-after-current-module scope.
    pub next_address: usize,
    /// Pathname of the module containing `next_address`, when `dladdr`
    /// can attribute it.
    pub interposer: Option<String>,
}

/// Per-symbol result of the comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckOutcome {
    /// Both resolutions name the same code location.
    Clean { address: usize },
    /// The resolutions disagree: something is interposed ahead of the
    /// runtime library in the search order.
    Hooked(Finding),
    /// The symbol did not resolve on one or both sides and is excluded
    /// from comparison.
    Unresolved { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymbolCheck {
    pub symbol: String,
    pub outcome: CheckOutcome,
}

/// Ordered result of a full scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    pub libc_path: PathBuf,
    pub checks: Vec<SymbolCheck>,
}

impl ScanReport {
    pub fn findings(&self) -> Vec<&Finding> {
        self.checks
            .iter()
            .filter_map(|c| match &c.outcome {
                CheckOutcome::Hooked(f) => Some(f),
                _ => None,
            })
            .collect()
    }

    pub fn unresolved(&self) -> Vec<&SymbolCheck> {
        self.checks
            .iter()
            .filter(|c| matches!(c.outcome, CheckOutcome::Unresolved { .. }))
            .collect()
    }

    pub fn is_clean(&self) -> bool {
        self.findings().is_empty()
    }
}

/// One-shot detector over a symbol list and a runtime-library path.
///
/// Idempotent: re-running `scan` in an unchanged process yields identical
/// findings. Results may legitimately differ between runs if the host's
/// loaded-library set changes in between.
pub struct HookDetector {
    libc_path: PathBuf,
    symbols: Vec<String>,
}

impl HookDetector {
    /// Detector over the default symbol list.
    pub fn new(libc_path: impl Into<PathBuf>) -> Self {
        Self::with_symbols(
            libc_path,
            DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect(),
        )
    }

    /// Detector over a caller-supplied symbol list, checked in list order.
    pub fn with_symbols(libc_path: impl Into<PathBuf>, symbols: Vec<String>) -> Self {
        Self {
            libc_path: libc_path.into(),
            symbols,
        }
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn libc_path(&self) -> &Path {
        &self.libc_path
    }

    /// Run the full check.
    ///
    /// Opening the runtime library is the one fatal failure: it aborts the
    /// scan before any comparison. Everything per-symbol is recorded in the
    /// report instead of returned as an error.
    pub fn scan(&self) -> Result<ScanReport> {
        let library = Library::open_lazy(&self.libc_path)?;
        debug!("opened {} for baseline resolution", self.libc_path.display());

        let checks = self
            .symbols
            .iter()
            .map(|symbol| check_symbol(&library, symbol))
            .collect();

        Ok(ScanReport {
            libc_path: self.libc_path.clone(),
            checks,
        })
    }
}

fn check_symbol(library: &Library, symbol: &str) -> SymbolCheck {
    let libc_address = match library.resolve(symbol) {
        Ok(addr) => addr,
        Err(e) => return unresolved(symbol, e.to_string()),
    };
    let next_address = match loader::resolve_next(symbol) {
        Ok(addr) => addr,
        Err(e) => return unresolved(symbol, e.to_string()),
    };

    debug!(
        "{}: libc {:#x}, next {:#x}",
        symbol, libc_address, next_address
    );

    let outcome = if libc_address == next_address {
        CheckOutcome::Clean {
            address: libc_address,
        }
    } else {
        CheckOutcome::Hooked(Finding {
            symbol: symbol.to_string(),
            libc_address,
            next_address,
            interposer: loader::module_for_address(next_address),
        })
    };

    SymbolCheck {
        symbol: symbol.to_string(),
        outcome,
    }
}

fn unresolved(symbol: &str, reason: String) -> SymbolCheck {
    debug!("{}: {}", symbol, reason);
    SymbolCheck {
        symbol: symbol.to_string(),
        outcome: CheckOutcome::Unresolved { reason },
    }
}
