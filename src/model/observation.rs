//! Observation identity: UT date plus sequence number.

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

/// The immutable identity of one observation.
///
/// Numbers are positive and assigned monotonically by the acquisition
/// source, but the sequence may have gaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObservationId {
    /// UT date of the observing night.
    pub ut_date: Date,

    /// Sequence number within the night.
    pub number: u32,
}

impl ObservationId {
    pub fn new(ut_date: Date, number: u32) -> Self {
        Self { ut_date, number }
    }

    /// The date as it appears in raw filenames: `YYYYMMDD`.
    pub fn ut_compact(&self) -> String {
        format!(
            "{:04}{:02}{:02}",
            self.ut_date.year(),
            self.ut_date.month(),
            self.ut_date.day()
        )
    }
}

impl std::fmt::Display for ObservationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.ut_compact(), self.number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compact_date_is_zero_padded() {
        let id = ObservationId::new(jiff::civil::date(2026, 8, 6), 42);
        assert_eq!(id.ut_compact(), "20260806");
        assert_eq!(id.to_string(), "20260806#42");
    }

    #[test]
    fn ordering_is_date_then_number() {
        let a = ObservationId::new(jiff::civil::date(2026, 8, 6), 9);
        let b = ObservationId::new(jiff::civil::date(2026, 8, 7), 1);
        assert!(a < b);
    }
}
