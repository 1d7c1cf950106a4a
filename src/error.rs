//! Error and warning types.
//!
//! Only [`InputError`], [`RenderError`] and [`ConfigError`] ever reach a
//! caller as `Err`. [`AssetWarning`]s are contained inside the renderer: they
//! are logged and reported alongside a successful result.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Malformed or incomplete line-item payload.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("line items are not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("line items must be a JSON list of objects")]
    NotAList,

    #[error("line item {index} is not an object")]
    NotAnObject { index: usize },

    #[error("line item {index} is missing required field '{field}'")]
    MissingField { index: usize, field: &'static str },

    #[error("line item {index} has an invalid '{field}': {reason}")]
    InvalidField {
        index: usize,
        field: &'static str,
        reason: String,
    },
}

/// The request cannot be rendered, or the output directory or file could
/// not be created or written.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Line totals that do not fit in a `Decimal`. Only reachable for
    /// requests built without [`crate::invoice::parse_line_items`].
    #[error(transparent)]
    Input(#[from] InputError),

    #[error("could not create output directory '{}': {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not write '{}': {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// The issuer profile file could not be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read issuer profile '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid issuer profile '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A non-fatal asset problem. Rendering continues with a fallback.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssetWarning {
    #[error("font file '{}' is missing, using builtin Helvetica", .0.display())]
    MissingFont(PathBuf),

    #[error("font file '{}' could not be loaded ({reason}), using builtin Helvetica", .path.display())]
    UnreadableFont { path: PathBuf, reason: String },

    #[error("background image '{}' could not be loaded ({reason}), continuing without it", .path.display())]
    UnreadableBackground { path: PathBuf, reason: String },
}
