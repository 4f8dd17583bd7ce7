//! Live-task-quorum strategy.
//!
//! The raw-data source is a set of running acquisition tasks, each exposing
//! a "most recent frame" parameter. A frame is only accepted once every
//! source reports the same number, newer than the last delivered one. The
//! quorum key itself can move mid-wait: if one source runs ahead, partial
//! results for the stale number are discarded and the wait retargets.

use std::collections::BTreeMap;

use log::warn;

use crate::error::{AcquireError, Result};
use crate::model::{Cursor, ObservationId};
use crate::remote::{FrameReport, RemoteSource};

use super::{Context, PollClock, Step};

pub(super) fn poll(
    sources: &[Box<dyn RemoteSource>],
    ctx: &Context<'_>,
    cursor: &mut Cursor,
) -> Result<Step> {
    let Some(wanted) = cursor.next else {
        return Ok(Step::Done);
    };
    if sources.is_empty() {
        return Err(AcquireError::RemoteUnavailable {
            task: "(none)".to_string(),
            reason: "no remote sources configured".to_string(),
        });
    }

    let mut clock = PollClock::new(ctx.timeout);
    let mut target = wanted;
    let mut agreed: BTreeMap<String, FrameReport> = BTreeMap::new();

    loop {
        for source in sources.iter() {
            // Unreachable sources are fatal for the run, never a skip.
            let report = source.latest()?;

            if report.number > target {
                if !agreed.is_empty() {
                    warn!(
                        "source \"{}\" moved on to frame {}, discarding partial data for frame {target}",
                        source.name(),
                        report.number
                    );
                }
                target = report.number;
                agreed.clear();
            }
            if report.number == target {
                agreed.insert(source.name().to_string(), report);
            }
            // Reports below the target are a source that has not caught up
            // yet, or the previous frame still current; both mean wait.
        }

        if agreed.len() == sources.len() {
            let mut files = Vec::with_capacity(agreed.len());
            for (name, report) in &agreed {
                files.push(report.materialize(name, &ctx.layout.input_root)?);
            }
            files.sort();
            cursor.advance_to(target + 1);
            cursor.reset_seen();
            return Ok(Step::Ready {
                observation: ObservationId::new(ctx.ut_date, target),
                files,
            });
        }

        clock.tick(ctx, target)?;
    }
}
