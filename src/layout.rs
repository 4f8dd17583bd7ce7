//! Filename and flag-file naming conventions.
//!
//! This is the engine's view of the instrument layout tables: a pure lookup
//! from `(UT date, observation number)` to the filenames the instrument will
//! write. Semester logic and per-telescope root selection live outside the
//! engine; the layout only consumes the two roots it is given.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::model::ObservationId;
use crate::naming::FileQuery;

/// Naming convention for one instrument.
///
/// Raw filenames are `<prefix><YYYYMMDD>_<number><suffix>` with the number
/// zero-padded to `number_width`. Instruments with several subsystems list
/// one prefix per subsystem; each observation then has one raw file and one
/// flag file per prefix, and the flag strategy requires the whole quorum.
///
/// When `search_pattern` is set the raw files cannot be named literally:
/// they are scattered below the input root and must be found by recursive
/// search. The pattern is a regex template in which `{ut}` and `{obs}` are
/// replaced before compilation, e.g. `^f{ut}_{obs}(_\d+)?\.sdf$`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Layout {
    /// Root of the raw-data tree for the night.
    pub input_root: PathBuf,

    /// The pipeline's working directory.
    pub output_root: PathBuf,

    /// One filename prefix per subsystem, usually just one.
    pub prefixes: Vec<String>,

    /// Raw filename extension, including the dot.
    pub suffix: String,

    /// Zero-padding width of the observation number in filenames.
    #[serde(default = "default_number_width")]
    pub number_width: usize,

    /// Regex template for scattered raw files, when literal naming is
    /// impossible.
    #[serde(default)]
    pub search_pattern: Option<String>,
}

fn default_number_width() -> usize {
    5
}

impl Layout {
    /// The literal raw basename for one prefix:
    /// `f20260806_00042.sdf`.
    pub fn raw_basename(&self, prefix: &str, obs: ObservationId) -> String {
        format!(
            "{prefix}{}_{:0width$}{}",
            obs.ut_compact(),
            obs.number,
            self.suffix,
            width = self.number_width
        )
    }

    /// One query per subsystem prefix for the observation's raw files.
    ///
    /// Literal paths when the convention allows it; otherwise one pattern
    /// query over the input subtree.
    pub fn raw_queries(&self, obs: ObservationId) -> Vec<FileQuery> {
        if let Some(template) = &self.search_pattern {
            let pattern = template
                .replace("{ut}", &obs.ut_compact())
                .replace("{obs}", &format!("{:0width$}", obs.number, width = self.number_width));
            return vec![FileQuery::Pattern {
                root: self.input_root.clone(),
                pattern,
            }];
        }

        self.prefixes
            .iter()
            .map(|prefix| FileQuery::Literal(self.input_root.join(self.raw_basename(prefix, obs))))
            .collect()
    }

    /// Flag-file paths for the observation, one per subsystem prefix:
    /// `.f20260806_00042.ok`, hidden next to the raw data.
    ///
    /// All of them must be present and non-empty before the observation
    /// counts as ready.
    pub fn flag_paths(&self, obs: ObservationId) -> Vec<PathBuf> {
        self.prefixes
            .iter()
            .map(|prefix| {
                self.input_root.join(format!(
                    ".{prefix}{}_{:0width$}.ok",
                    obs.ut_compact(),
                    obs.number,
                    width = self.number_width
                ))
            })
            .collect()
    }

    /// Parse the observation number out of a raw basename, if the basename
    /// follows this layout's literal convention for the given date.
    pub fn parse_number(&self, basename: &str, ut_compact: &str) -> Option<u32> {
        let stem = basename.strip_suffix(&self.suffix)?;
        for prefix in &self.prefixes {
            let Some(rest) = stem.strip_prefix(prefix.as_str()) else {
                continue;
            };
            let Some(digits) = rest
                .strip_prefix(ut_compact)
                .and_then(|r| r.strip_prefix('_'))
            else {
                continue;
            };
            if let Ok(number) = digits.parse::<u32>() {
                return Some(number);
            }
        }
        None
    }

    /// Resolve a flag-file line or list entry against the input root.
    pub fn resolve_entry(&self, entry: &str) -> PathBuf {
        let path = Path::new(entry);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.input_root.join(path)
        }
    }
}
