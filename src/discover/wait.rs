//! Timed-wait strategy: poll for the literal raw filename.
//!
//! A file being copied in must not be consumed mid-write, and there is no
//! notification when the writer finishes. The guard is size stability: the
//! file is accepted only after two consecutive polls see the same non-zero
//! size. NFS attribute caching makes a single sample untrustworthy; two
//! agreeing samples one interval apart are the accepted compromise.
//!
//! Pattern filename conventions cannot be waited on this way (every poll
//! would be a subtree walk with no single expected path) and are rejected
//! up front in favor of the flag-file strategy.

use std::path::PathBuf;

use log::warn;

use crate::error::{AcquireError, Result};
use crate::model::{Cursor, ObservationId};
use crate::naming::FileQuery;
use crate::scan;

use super::{Context, PollClock, Step};

/// Re-derive "highest observation present" every this many polls when
/// skipping is allowed.
const RESCAN_EVERY: u64 = 30;

pub(super) fn poll(ctx: &Context<'_>, cursor: &mut Cursor) -> Result<Step> {
    let Some(mut number) = cursor.next else {
        return Ok(Step::Done);
    };

    let mut paths = literal_paths(ctx, number)?;
    let mut clock = PollClock::new(ctx.timeout);
    let mut previous: Option<Vec<u64>> = None;

    loop {
        match sample_sizes(&paths) {
            Some(sizes) if sizes.iter().all(|&s| s > 0) && previous.as_ref() == Some(&sizes) => {
                cursor.advance_to(number + 1);
                return Ok(Step::Ready {
                    observation: ObservationId::new(ctx.ut_date, number),
                    files: paths,
                });
            }
            sample => previous = sample,
        }

        // The expected file may never appear at all; periodically look for
        // later observations instead of waiting out the whole budget.
        if ctx.skip && clock.polls() > 0 && clock.polls() % RESCAN_EVERY == 0 {
            if let Some(highest) = scan::highest_observation(ctx.layout, ctx.ut_date)? {
                if highest > number {
                    warn!("observation {number} never appeared, jumping forward to {highest}");
                    number = highest;
                    cursor.advance_to(number);
                    cursor.reset_seen();
                    paths = literal_paths(ctx, number)?;
                    previous = None;
                }
            }
        }

        clock.tick(ctx, number)?;
    }
}

/// The expected literal path per subsystem, refusing pattern conventions.
fn literal_paths(ctx: &Context<'_>, number: u32) -> Result<Vec<PathBuf>> {
    let observation = ObservationId::new(ctx.ut_date, number);
    ctx.layout
        .raw_queries(observation)
        .into_iter()
        .map(|query| match query {
            FileQuery::Literal(path) => Ok(path),
            FileQuery::Pattern { .. } => Err(AcquireError::PatternUnsupported {
                strategy: "timed-wait",
            }),
        })
        .collect()
}

/// Sizes of all expected files, or `None` while any of them is missing.
fn sample_sizes(paths: &[PathBuf]) -> Option<Vec<u64>> {
    paths
        .iter()
        .map(|path| std::fs::metadata(path).ok().map(|m| m.len()))
        .collect()
}
