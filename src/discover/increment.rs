//! Unbounded-increment strategy.
//!
//! Takes whatever number the cursor holds, tries to resolve it, and moves
//! the cursor forward either way. External tooling supplies the starting
//! point and is responsible for stopping the run.

use log::warn;

use crate::error::{AcquireError, Result};
use crate::model::{Cursor, ObservationId};
use crate::scan;

use super::{Context, Resolution, Step, resolve_observation};

pub(super) fn poll(ctx: &Context<'_>, cursor: &mut Cursor) -> Result<Step> {
    let Some(number) = cursor.next else {
        return Ok(Step::Done);
    };

    let observation = ObservationId::new(ctx.ut_date, number);
    match resolve_observation(ctx, observation)? {
        Resolution::Found(files) => {
            cursor.advance_to(number + 1);
            Ok(Step::Ready { observation, files })
        }
        Resolution::Missing(path) => {
            // Sequences may have gaps; with skip the hole is recovered by
            // jumping to the next number that actually exists on disk.
            if ctx.skip {
                if let Some(found) = scan::next_observation(ctx.layout, ctx.ut_date, number)? {
                    warn!("observation {number} has no files on disk, skipping forward to {found}");
                    let observation = ObservationId::new(ctx.ut_date, found);
                    if let Resolution::Found(files) = resolve_observation(ctx, observation)? {
                        cursor.advance_to(found + 1);
                        return Ok(Step::Ready { observation, files });
                    }
                }
            }

            // The slot advances regardless of success; that is the contract.
            cursor.advance_to(number + 1);
            Err(AcquireError::NotFound { path })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discover::testutil::{CountingWaiter, context, layout};

    use std::fs;

    use tempfile::TempDir;

    fn write_obs(dir: &std::path::Path, n: u32) {
        fs::write(dir.join(format!("f20260806_{n:05}.sdf")), b"x").unwrap();
    }

    #[test]
    fn advances_even_when_the_file_is_absent() {
        let raw = TempDir::new().unwrap();
        let work = TempDir::new().unwrap();
        write_obs(raw.path(), 2);

        let layout = layout(raw.path(), work.path());
        let waiter = CountingWaiter::default();
        let ctx = context(&layout, &waiter);
        let mut cursor = Cursor::starting_at(1);

        // Observation 1 is absent: error, but the slot still moves on.
        assert!(poll(&ctx, &mut cursor).is_err());
        assert_eq!(cursor.next, Some(2));

        let step = poll(&ctx, &mut cursor).unwrap();
        assert!(matches!(step, Step::Ready { observation, .. } if observation.number == 2));
        assert_eq!(cursor.next, Some(3));
    }

    #[test]
    fn skip_recovers_a_gap_by_jumping_forward() {
        let raw = TempDir::new().unwrap();
        let work = TempDir::new().unwrap();
        write_obs(raw.path(), 2);

        let layout = layout(raw.path(), work.path());
        let waiter = CountingWaiter::default();
        let mut ctx = context(&layout, &waiter);
        ctx.skip = true;
        let mut cursor = Cursor::starting_at(1);

        // The gap at 1 yields the next observation on disk, not an error.
        let step = poll(&ctx, &mut cursor).unwrap();
        assert!(matches!(step, Step::Ready { observation, .. } if observation.number == 2));
        assert_eq!(cursor.next, Some(3));
    }

    #[test]
    fn skip_with_nothing_ahead_is_still_fatal() {
        let raw = TempDir::new().unwrap();
        let work = TempDir::new().unwrap();

        let layout = layout(raw.path(), work.path());
        let waiter = CountingWaiter::default();
        let mut ctx = context(&layout, &waiter);
        ctx.skip = true;
        let mut cursor = Cursor::starting_at(5);

        let err = poll(&ctx, &mut cursor).unwrap_err();
        assert!(matches!(err, AcquireError::NotFound { .. }));
        assert_eq!(cursor.next, Some(6));
    }
}
