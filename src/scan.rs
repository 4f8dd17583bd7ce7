//! Directory scans over the raw-data tree.
//!
//! The skip branches need to answer "what is the highest observation on
//! disk?" and "what is the next observation after N that actually exists?"
//! by listing the input root and parsing numbers back out of basenames.
//! Unreadable entries are skipped rather than fatal; a half-written
//! directory listing is normal on a live instrument.

use std::fs;

use jiff::civil::Date;

use crate::error::Result;
use crate::layout::Layout;
use crate::model::ObservationId;

/// All observation numbers present under the input root for the night,
/// in ascending order without duplicates.
pub fn observations_present(layout: &Layout, ut_date: Date) -> Result<Vec<u32>> {
    let ut = ObservationId::new(ut_date, 0).ut_compact();
    let mut numbers: Vec<u32> = Vec::new();

    for entry in fs::read_dir(&layout.input_root)? {
        let Ok(entry) = entry else { continue };
        let name = entry.file_name();
        if let Some(number) = layout.parse_number(&name.to_string_lossy(), &ut) {
            numbers.push(number);
        }
    }

    numbers.sort_unstable();
    numbers.dedup();
    Ok(numbers)
}

/// The highest observation number currently on disk, if any.
pub fn highest_observation(layout: &Layout, ut_date: Date) -> Result<Option<u32>> {
    Ok(observations_present(layout, ut_date)?.last().copied())
}

/// The smallest observation number strictly greater than `current` that
/// exists on disk. Never searches backward.
pub fn next_observation(layout: &Layout, ut_date: Date, current: u32) -> Result<Option<u32>> {
    Ok(observations_present(layout, ut_date)?
        .into_iter()
        .find(|&n| n > current))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::path::PathBuf;

    use tempfile::TempDir;

    fn layout(root: &std::path::Path) -> Layout {
        Layout {
            input_root: root.to_path_buf(),
            output_root: PathBuf::from("/work"),
            prefixes: vec!["f".to_string()],
            suffix: ".sdf".to_string(),
            number_width: 5,
            search_pattern: None,
        }
    }

    #[test]
    fn next_and_highest_over_a_gappy_night() {
        let dir = TempDir::new().unwrap();
        for n in [3u32, 5, 9] {
            fs::write(dir.path().join(format!("f20260806_{n:05}.sdf")), b"x").unwrap();
        }
        // Noise that must not parse as observations.
        fs::write(dir.path().join("README"), b"x").unwrap();
        fs::write(dir.path().join("f20260805_00004.sdf"), b"x").unwrap();

        let layout = layout(dir.path());
        let ut = jiff::civil::date(2026, 8, 6);

        assert_eq!(next_observation(&layout, ut, 4).unwrap(), Some(5));
        assert_eq!(highest_observation(&layout, ut).unwrap(), Some(9));
        assert_eq!(next_observation(&layout, ut, 9).unwrap(), None);
    }

    #[test]
    fn empty_directory_has_no_observations() {
        let dir = TempDir::new().unwrap();
        let layout = layout(dir.path());
        let ut = jiff::civil::date(2026, 8, 6);
        assert_eq!(highest_observation(&layout, ut).unwrap(), None);
    }
}
