use thiserror::Error;

/// Unified error type for ci-bump operations.
///
/// Every variant is fatal: the binary reports it and exits with status 1.
#[derive(Error, Debug)]
pub enum CiBumpError {
    #[error("Version field not found: {0}")]
    MissingVersionField(String),

    #[error("Invalid SemVer version: {0}")]
    InvalidSemVer(String),

    #[error("Invalid bump directive: {0}")]
    InvalidBumpDirective(String),

    #[error("Unknown manifest type: {0}")]
    UnknownManifestType(String),

    #[error("Manifest error: {0}")]
    Manifest(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("Tag error: {0}")]
    Tag(String),

    #[error("Remote operation failed: {0}")]
    Remote(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in ci-bump
pub type Result<T> = std::result::Result<T, CiBumpError>;

impl CiBumpError {
    /// Create a missing-version-field error with context
    pub fn missing_field(msg: impl Into<String>) -> Self {
        CiBumpError::MissingVersionField(msg.into())
    }

    /// Create an invalid SemVer error with context
    pub fn semver(msg: impl Into<String>) -> Self {
        CiBumpError::InvalidSemVer(msg.into())
    }

    /// Create an invalid bump directive error with context
    pub fn bump(msg: impl Into<String>) -> Self {
        CiBumpError::InvalidBumpDirective(msg.into())
    }

    /// Create a manifest parse/serialize error with context
    pub fn manifest(msg: impl Into<String>) -> Self {
        CiBumpError::Manifest(msg.into())
    }

    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        CiBumpError::Config(msg.into())
    }

    /// Create a tag error with context
    pub fn tag(msg: impl Into<String>) -> Self {
        CiBumpError::Tag(msg.into())
    }

    /// Create a remote error with context
    pub fn remote(msg: impl Into<String>) -> Self {
        CiBumpError::Remote(msg.into())
    }
}
