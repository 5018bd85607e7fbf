//! Error taxonomy for the core pipeline.
//!
//! The pipeline is fail-closed at its boundary: a parse or chroot error
//! aborts the call and surfaces to the caller. Matching failures never
//! surface as errors -- they degrade to `Added`/`Removed` document diffs.

/// A failure encountered while decoding a YAML byte stream into documents.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("{message} at line {line}, column {column}")]
pub struct ParseError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

/// A failure encountered while navigating a chroot path into a document.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("could not navigate to '{path}': {reason}")]
pub struct ChrootError {
    pub path: String,
    pub reason: ChrootErrorReason,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChrootErrorReason {
    #[error("key '{0}' not found in mapping")]
    KeyNotFound(String),
    #[error("index {index} is out of bounds for a list of length {len}")]
    IndexOutOfBounds { index: usize, len: usize },
    #[error("path descends into a scalar value")]
    DescendsIntoScalar,
    #[error("invalid path syntax: {0}")]
    Syntax(String),
}

/// A failure encountered while compiling a regex-based filter.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("invalid filter pattern '{pattern}': {message}")]
pub struct FilterError {
    pub pattern: String,
    pub message: String,
}

/// Top-level error returned by the core pipeline entry points.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Chroot(#[from] ChrootError),
    #[error(transparent)]
    Filter(#[from] FilterError),
}
