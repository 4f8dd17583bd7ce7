//! Frame: the pipeline's unit of work, built from staged files.

use crate::error::{AcquireError, Result};

use super::ObservationId;

/// One observation's worth of staged files, ready for reduction.
///
/// The engine's only contract with the downstream pipeline is
/// [`Frame::configure`]: it must succeed or the observation is treated as
/// failed. Files are basenames in the output working directory, held in
/// lexical order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    observation: ObservationId,
    files: Vec<String>,
}

impl Frame {
    /// Build a frame from staged basenames.
    ///
    /// Fails with [`AcquireError::EmptyFrame`] if no files were staged; a
    /// frame is never constructed partially.
    pub fn configure(observation: ObservationId, mut files: Vec<String>) -> Result<Self> {
        if files.is_empty() {
            return Err(AcquireError::EmptyFrame {
                observation: observation.number,
            });
        }
        files.sort();
        Ok(Self { observation, files })
    }

    pub fn observation(&self) -> ObservationId {
        self.observation
    }

    /// Staged basenames in lexical order.
    pub fn files(&self) -> &[String] {
        &self.files
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn obs(n: u32) -> ObservationId {
        ObservationId::new(jiff::civil::date(2026, 8, 6), n)
    }

    #[test]
    fn files_come_out_sorted() {
        let frame = Frame::configure(
            obs(3),
            vec!["b.sdf".to_string(), "a.sdf".to_string()],
        )
        .unwrap();
        assert_eq!(frame.files(), ["a.sdf", "b.sdf"]);
    }

    #[test]
    fn empty_set_is_refused() {
        let err = Frame::configure(obs(3), Vec::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Inconsistent);
    }
}
