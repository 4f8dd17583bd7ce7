//! Live remote-task sources.
//!
//! Some instruments deliver frames through running acquisition tasks rather
//! than files on disk. Each task exposes a "most recent frame" parameter,
//! fetched with a synchronous get per source per poll; the message bus
//! behind the call is an opaque endpoint. A source that cannot be reached
//! is fatal for the whole run.

use std::{
    io::Write,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AcquireError, Result};

/// The structured value a remote task reports for its latest frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameReport {
    /// Monotonically increasing frame/sequence number.
    pub number: u32,

    /// Where the frame's data actually is.
    pub payload: FramePayload,
}

/// A remote frame's data: a file the task wrote, or the image inline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum FramePayload {
    /// The task wrote a file; resolve it like any raw file.
    File { path: PathBuf },

    /// The image travelled in the parameter itself and must be written out
    /// before staging.
    Inline {
        data: Vec<u8>,
        /// Extension for the materialized file, including the dot.
        suffix: String,
    },
}

impl FrameReport {
    /// Decode the structured parameter value a task handed back.
    ///
    /// The bus delivers it as JSON; anything unintelligible counts as the
    /// source being unavailable, since no further polling can fix it.
    pub fn from_json(source: &str, value: &str) -> Result<Self> {
        serde_json::from_str(value).map_err(|e| AcquireError::RemoteUnavailable {
            task: source.to_string(),
            reason: format!("unintelligible frame parameter: {e}"),
        })
    }

    /// The on-disk path for this report's data, materializing inline
    /// payloads to a uniquely named file under `dir`.
    pub fn materialize(&self, source: &str, dir: &Path) -> Result<PathBuf> {
        match &self.payload {
            FramePayload::File { path } => {
                if path.is_file() {
                    Ok(path.clone())
                } else {
                    Err(AcquireError::NotFound { path: path.clone() })
                }
            }
            FramePayload::Inline { data, suffix } => {
                let mut file = tempfile::Builder::new()
                    .prefix(&format!("{source}_{:05}_{}", self.number, Uuid::new_v4()))
                    .suffix(suffix)
                    .tempfile_in(dir)?;
                file.write_all(data)?;
                let (_, path) = file.keep().map_err(|e| e.error)?;
                Ok(path)
            }
        }
    }
}

/// One live acquisition task.
pub trait RemoteSource {
    /// Stable name for diagnostics and quorum bookkeeping.
    fn name(&self) -> &str;

    /// Fetch the task's most recent frame parameter.
    ///
    /// Implementations return [`AcquireError::RemoteUnavailable`] when the
    /// task cannot be reached; the engine never skips past that.
    fn latest(&self) -> Result<FrameReport>;
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;

    use tempfile::TempDir;

    #[test]
    fn inline_payloads_get_unique_files() {
        let dir = TempDir::new().unwrap();
        let report = FrameReport {
            number: 6,
            payload: FramePayload::Inline {
                data: vec![1, 2, 3],
                suffix: ".sdf".to_string(),
            },
        };

        let a = report.materialize("cam_a", dir.path()).unwrap();
        let b = report.materialize("cam_a", dir.path()).unwrap();
        assert_ne!(a, b);
        assert_eq!(fs::read(&a).unwrap(), vec![1, 2, 3]);
        assert!(a.file_name().unwrap().to_string_lossy().starts_with("cam_a_00006_"));
    }

    #[test]
    fn file_payload_must_exist() {
        let dir = TempDir::new().unwrap();
        let report = FrameReport {
            number: 1,
            payload: FramePayload::File {
                path: dir.path().join("missing.sdf"),
            },
        };
        assert!(matches!(
            report.materialize("cam_a", dir.path()).unwrap_err(),
            AcquireError::NotFound { .. }
        ));
    }

    #[test]
    fn report_round_trips_as_json() {
        let report = FrameReport {
            number: 9,
            payload: FramePayload::File {
                path: PathBuf::from("/raw/f9.sdf"),
            },
        };
        let json = serde_json::to_string(&report).unwrap();
        let back = FrameReport::from_json("cam_a", &json).unwrap();
        assert_eq!(back.number, 9);
    }

    #[test]
    fn garbage_parameter_counts_as_unavailable() {
        let err = FrameReport::from_json("cam_a", "not json").unwrap_err();
        assert!(matches!(err, AcquireError::RemoteUnavailable { ref task, .. } if task == "cam_a"));
    }
}
