use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProbeError {
    /// The runtime library could not be opened. Fatal: no comparison is
    /// meaningful without the baseline handle.
    #[error("failed to load {path}: {reason}")]
    Loader { path: String, reason: String },

    /// A symbol did not resolve in one of the two lookup contexts.
    /// Recoverable at per-symbol granularity.
    #[error("symbol not found: {0}")]
    SymbolNotFound(String),

    #[error("symbol name contains an interior NUL byte: {0:?}")]
    BadSymbolName(String),
}

pub type Result<T> = std::result::Result<T, ProbeError>;
