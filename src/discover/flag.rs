//! Flag-file-quorum strategy.
//!
//! Flag files signal readiness: presence means a candidate observation has
//! started, non-zero size means writing is validated, and the contents list
//! the raw files belonging to the observation. A flag may grow over time
//! (staged delivery); newly appended lines belong to the same observation
//! and are delivered incrementally, diffed against the cursor's bookkeeping.
//!
//! Decision order on every poll, for current number N:
//!
//! 1. N+1's whole flag quorum present and non-empty: N is complete (or
//!    abandoned); jump to N+1 with fresh bookkeeping and read it.
//! 2. N's quorum present: zero-size members mean "not validated yet", keep
//!    waiting; otherwise deliver only the lines not yet seen, or keep
//!    waiting if nothing new appeared.
//! 3. Quorum missing and skipping allowed: look ahead a bounded window for
//!    the first number whose quorum has started, and jump there.
//! 4. Sleep and re-poll until the budget runs out.
//!
//! The cursor number moves only on the jumps, never on incremental
//! delivery, so a slowly-growing flag is revisited instead of skipped.

use std::path::PathBuf;

use log::warn;

use crate::error::Result;
use crate::model::{Cursor, ObservationId};
use crate::naming::{self, QuorumState};

use super::{Context, PollClock, Step};

/// How many observations ahead the skip branch will look.
const SKIP_LOOKAHEAD: u32 = 10;

pub(super) fn poll(ctx: &Context<'_>, cursor: &mut Cursor) -> Result<Step> {
    let Some(mut number) = cursor.next else {
        return Ok(Step::Done);
    };

    let mut clock = PollClock::new(ctx.timeout);

    loop {
        // Step 1: the next observation's flags can legitimately start
        // appearing before the current one is fully consumed. A complete,
        // non-empty quorum for N+1 closes out N for good.
        let next = ObservationId::new(ctx.ut_date, number + 1);
        if naming::quorum_state(&ctx.layout.flag_paths(next)) == QuorumState::Ready {
            cursor.reset_seen();
            number += 1;
            cursor.advance_to(number);
        }

        // Step 2: the current observation's own quorum.
        let observation = ObservationId::new(ctx.ut_date, number);
        let flags = ctx.layout.flag_paths(observation);
        match naming::quorum_state(&flags) {
            QuorumState::Ready => {
                if let Some(files) = read_fresh(ctx, cursor, &flags)? {
                    return Ok(Step::Ready { observation, files });
                }
                // Nothing new since the last delivery; the flag may still
                // grow, so stay on this number.
            }
            QuorumState::Empty => {
                // Started but not validated; wait for the writer.
            }
            QuorumState::Missing => {
                // Step 3: bounded forward search.
                if ctx.skip {
                    if let Some(found) = look_ahead(ctx, number) {
                        warn!(
                            "no flag for observation {number}, jumping forward to {found}"
                        );
                        cursor.reset_seen();
                        number = found;
                        cursor.advance_to(number);
                        continue;
                    }
                }
            }
        }

        // Step 4.
        clock.tick(ctx, number)?;
    }
}

/// Lines present in the quorum that the cursor has not consumed yet,
/// resolved to absolute paths.
///
/// The cursor is only updated after every flag has been read cleanly, so a
/// malformed flag leaves it untouched and the attempt can be retried.
fn read_fresh(
    ctx: &Context<'_>,
    cursor: &mut Cursor,
    flags: &[PathBuf],
) -> Result<Option<Vec<PathBuf>>> {
    let mut fresh: Vec<(String, String)> = Vec::new();

    for flag in flags {
        let key = flag.to_string_lossy().into_owned();
        for line in naming::read_flag_lines(flag)? {
            let already = cursor.seen_for(&key).is_some_and(|seen| seen.contains(&line));
            if !already {
                fresh.push((key.clone(), line));
            }
        }
    }

    if fresh.is_empty() {
        return Ok(None);
    }

    let mut files = Vec::with_capacity(fresh.len());
    for (key, line) in fresh {
        cursor.record_seen(&key, &line);
        files.push(ctx.layout.resolve_entry(&line));
    }
    // A multi-flag quorum may list the same file more than once; one
    // delivery per path.
    files.sort();
    files.dedup();
    Ok(Some(files))
}

/// First observation within the lookahead window whose quorum has started.
fn look_ahead(ctx: &Context<'_>, from: u32) -> Option<u32> {
    (from + 1..=from + SKIP_LOOKAHEAD).find(|&candidate| {
        let obs = ObservationId::new(ctx.ut_date, candidate);
        naming::quorum_state(&ctx.layout.flag_paths(obs)) != QuorumState::Missing
    })
}
