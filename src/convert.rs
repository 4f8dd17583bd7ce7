//! Format conversion seam.
//!
//! The real converter is an external collaborator; the engine only relies on
//! it being idempotent and keyed by input path. When input and output
//! formats already match, conversion degenerates to handing back the input
//! location, which the stager then symlinks.

use std::path::{Path, PathBuf};

use crate::error::{AcquireError, Result};

/// Converts one raw file into the pipeline's working format.
pub trait Converter {
    /// Convert `raw`, producing the absolute path of the usable file.
    ///
    /// Must be idempotent: converting the same input twice yields the same
    /// output path without error. Returns [`AcquireError::ConversionFailed`]
    /// when the converter runs but produces nothing usable.
    fn convert(&self, raw: &Path, out_dir: &Path) -> Result<PathBuf>;
}

/// The degenerate converter for instruments already writing the working
/// format: the "converted" file is the raw file itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl Converter for Passthrough {
    fn convert(&self, raw: &Path, _out_dir: &Path) -> Result<PathBuf> {
        if raw.is_file() {
            Ok(raw.to_path_buf())
        } else {
            Err(AcquireError::ConversionFailed {
                input: raw.to_path_buf(),
                reason: "input vanished before conversion".to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    use std::fs;

    use tempfile::TempDir;

    #[test]
    fn passthrough_returns_the_input_path() {
        let dir = TempDir::new().unwrap();
        let raw = dir.path().join("f1.sdf");
        fs::write(&raw, b"x").unwrap();

        let out = Passthrough.convert(&raw, dir.path()).unwrap();
        assert_eq!(out, raw);
        // Idempotent.
        assert_eq!(Passthrough.convert(&raw, dir.path()).unwrap(), raw);
    }

    #[test]
    fn missing_input_is_a_conversion_failure() {
        let dir = TempDir::new().unwrap();
        let err = Passthrough
            .convert(&dir.path().join("gone.sdf"), dir.path())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConversionFailed);
    }
}
