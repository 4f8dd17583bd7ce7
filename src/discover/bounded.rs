//! Bounded-list strategy: a caller-supplied sequence of observation numbers.

use std::collections::VecDeque;

use log::warn;

use crate::error::{AcquireError, Result};
use crate::model::{Cursor, ObservationId};

use super::{Context, Resolution, Step, resolve_observation};

/// Deliver the next number from the queue.
///
/// With skip enabled, numbers whose files are absent are discarded with a
/// warning; without it, absence is fatal because the caller asked for an
/// exact sequence. The queue is only popped once delivery is certain, so a
/// failed attempt can be retried exactly.
pub(super) fn poll(
    queue: &mut VecDeque<u32>,
    ctx: &Context<'_>,
    cursor: &mut Cursor,
) -> Result<Step> {
    loop {
        let Some(&number) = queue.front() else {
            cursor.finish();
            return Ok(Step::Done);
        };

        let observation = ObservationId::new(ctx.ut_date, number);
        match resolve_observation(ctx, observation)? {
            Resolution::Found(files) => {
                queue.pop_front();
                cursor.advance_to(number + 1);
                return Ok(Step::Ready { observation, files });
            }
            Resolution::Missing(path) => {
                if ctx.skip {
                    warn!("observation {number} has no files on disk, skipping");
                    queue.pop_front();
                    continue;
                }
                return Err(AcquireError::NotFound { path });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discover::testutil::{CountingWaiter, context, layout};
    use crate::error::ErrorKind;

    use std::fs;

    use tempfile::TempDir;

    fn write_obs(dir: &std::path::Path, n: u32) {
        fs::write(dir.join(format!("f20260806_{n:05}.sdf")), b"x").unwrap();
    }

    #[test]
    fn delivers_the_list_in_order_then_done() {
        let raw = TempDir::new().unwrap();
        let work = TempDir::new().unwrap();
        for n in [2, 4] {
            write_obs(raw.path(), n);
        }

        let layout = layout(raw.path(), work.path());
        let waiter = CountingWaiter::default();
        let ctx = context(&layout, &waiter);

        let mut queue: VecDeque<u32> = [2, 4].into_iter().collect();
        let mut cursor = Cursor::starting_at(2);

        let mut delivered = Vec::new();
        loop {
            match poll(&mut queue, &ctx, &mut cursor).unwrap() {
                Step::Ready { observation, .. } => delivered.push(observation.number),
                Step::Done => break,
            }
        }
        assert_eq!(delivered, [2, 4]);
        assert!(cursor.is_done());
    }

    #[test]
    fn missing_number_is_fatal_without_skip_and_retryable() {
        let raw = TempDir::new().unwrap();
        let work = TempDir::new().unwrap();
        let layout = layout(raw.path(), work.path());
        let waiter = CountingWaiter::default();
        let ctx = context(&layout, &waiter);

        let mut queue: VecDeque<u32> = [3].into_iter().collect();
        let mut cursor = Cursor::starting_at(3);

        let err = poll(&mut queue, &ctx, &mut cursor).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        // Nothing consumed: the file showing up later makes the retry succeed.
        write_obs(raw.path(), 3);
        let step = poll(&mut queue, &ctx, &mut cursor).unwrap();
        assert!(matches!(step, Step::Ready { observation, .. } if observation.number == 3));
    }

    #[test]
    fn skip_discards_absent_numbers_forward_only() {
        let raw = TempDir::new().unwrap();
        let work = TempDir::new().unwrap();
        write_obs(raw.path(), 9);

        let layout = layout(raw.path(), work.path());
        let waiter = CountingWaiter::default();
        let mut ctx = context(&layout, &waiter);
        ctx.skip = true;

        let mut queue: VecDeque<u32> = [7, 8, 9].into_iter().collect();
        let mut cursor = Cursor::starting_at(7);

        let step = poll(&mut queue, &ctx, &mut cursor).unwrap();
        assert!(matches!(step, Step::Ready { observation, .. } if observation.number == 9));
        assert_eq!(cursor.next, Some(10));
    }
}
