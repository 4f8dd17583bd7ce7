//! Errors raised while acquiring an observation.
//!
//! "No more observations" is not an error — the engine reports that as
//! [`Outcome::Done`](crate::engine::Outcome). Everything here means the
//! current acquisition attempt failed, and the diagnostic names the specific
//! file or source involved.

use std::{io, path::PathBuf, time::Duration};

/// Errors that can occur during an acquisition attempt.
#[derive(Debug, thiserror::Error)]
pub enum AcquireError {
    /// The polling budget ran out while waiting for a specific observation.
    /// Distinct from `Done` so callers can tell "finished" from "stalled".
    #[error("timed out after {}s waiting for observation {observation}", waited.as_secs())]
    Timeout { observation: u32, waited: Duration },

    /// A required file or flag is missing and skipping is disabled.
    #[error("required file not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// A staged basename exists as a symlink whose target no longer resolves.
    #[error("dangling symlink in working directory: {}", link.display())]
    DanglingLink { link: PathBuf },

    /// A staged basename already exists as a symlink to a different file.
    #[error(
        "symlink {} already points at {}, refusing to retarget to {}",
        link.display(), existing.display(), wanted.display()
    )]
    LinkConflict {
        link: PathBuf,
        existing: PathBuf,
        wanted: PathBuf,
    },

    /// A flag file could not be read or parsed.
    #[error("malformed flag file {}: {reason}", path.display())]
    MalformedFlag { path: PathBuf, reason: String },

    /// An observation resolved to zero raw files.
    #[error("observation {observation} resolved to no files")]
    EmptyFrame { observation: u32 },

    /// A configured filename pattern failed to compile.
    #[error("invalid filename pattern \"{pattern}\": {reason}")]
    BadPattern { pattern: String, reason: String },

    /// The selected strategy cannot resolve pattern-based filenames.
    #[error("{strategy} does not support pattern filenames; use the flag-file strategy")]
    PatternUnsupported { strategy: &'static str },

    /// A live remote source could not be reached. Always fatal for the run:
    /// there is no meaningful skip target when a data source vanishes.
    #[error("remote task \"{task}\" unavailable: {reason}")]
    RemoteUnavailable { task: String, reason: String },

    /// The external format converter failed or produced no usable output.
    #[error("conversion of {} failed: {reason}", input.display())]
    ConversionFailed { input: PathBuf, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = core::result::Result<T, AcquireError>;

/// Coarse error classes matching the engine's error taxonomy.
///
/// Several specific variants collapse onto `Inconsistent`; callers that only
/// care about the class (retry? abort? reconfigure?) match on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Timeout,
    NotFound,
    Inconsistent,
    RemoteUnavailable,
    ConversionFailed,
    Io,
}

impl AcquireError {
    /// The coarse class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::DanglingLink { .. }
            | Self::LinkConflict { .. }
            | Self::MalformedFlag { .. }
            | Self::EmptyFrame { .. }
            | Self::BadPattern { .. }
            | Self::PatternUnsupported { .. } => ErrorKind::Inconsistent,
            Self::RemoteUnavailable { .. } => ErrorKind::RemoteUnavailable,
            Self::ConversionFailed { .. } => ErrorKind::ConversionFailed,
            Self::Io(_) => ErrorKind::Io,
        }
    }
}
