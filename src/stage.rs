//! Staging converted files into the working directory.
//!
//! One basename, one link. A converted file becomes reachable from the
//! output directory either because it already lives there or through a
//! symlink back to where it really is. A dangling symlink at a basename the
//! engine needs is a fatal inconsistency, never a missing-file condition;
//! a symlink pointing at some other file is refused rather than silently
//! retargeted.

use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::error::{AcquireError, Result};

/// Stages files into one pipeline-owned working directory.
#[derive(Debug, Clone)]
pub struct Stager {
    out_dir: PathBuf,
}

impl Stager {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }

    /// Make `file` reachable from the working directory and return its
    /// staged basename.
    ///
    /// Idempotent: staging the same file twice leaves a single link and
    /// both calls resolve to the same real file.
    pub fn stage(&self, file: &Path) -> Result<String> {
        // The working directory can vanish mid-run (operator cleanup over
        // NFS); repair it rather than fail the observation.
        fs::create_dir_all(&self.out_dir)?;

        let basename = file
            .file_name()
            .ok_or_else(|| AcquireError::NotFound {
                path: file.to_path_buf(),
            })?
            .to_string_lossy()
            .into_owned();
        let link = self.out_dir.join(&basename);

        if link.symlink_metadata().is_ok() {
            self.verify_existing(&link, file)?;
        } else if file.parent() != Some(self.out_dir.as_path()) {
            std::os::unix::fs::symlink(file, &link)?;
        }

        // Re-verify through the link; a target gone between the check and
        // now surfaces here instead of deep inside the pipeline.
        if fs::metadata(&link).is_err() {
            return Err(AcquireError::DanglingLink { link });
        }

        Ok(basename)
    }

    /// A basename already present in the working directory must resolve to
    /// the same real file we are staging.
    fn verify_existing(&self, link: &Path, wanted: &Path) -> Result<()> {
        let meta = link.symlink_metadata()?;

        if meta.file_type().is_symlink() && fs::metadata(link).is_err() {
            return Err(AcquireError::DanglingLink {
                link: link.to_path_buf(),
            });
        }

        let existing = fs::canonicalize(link)?;
        let wanted = fs::canonicalize(wanted)?;
        if existing != wanted {
            return Err(AcquireError::LinkConflict {
                link: link.to_path_buf(),
                existing,
                wanted,
            });
        }
        Ok(())
    }
}
