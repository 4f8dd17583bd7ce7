//! Discovery strategies: six interchangeable polling policies.
//!
//! Every strategy implements one contract: take the shared [`Context`] and
//! the caller's [`Cursor`], return zero or one ready observation as a
//! [`Step`], or fail. `Step::Done` means "no further observations"; once a
//! cursor carries the terminal sentinel, every later poll reports `Done`
//! without consulting the policy.
//!
//! Waiting is a sleep-poll loop — the filesystem and remote tasks push no
//! events. The sleep itself goes through the injectable [`Waiter`] so an
//! attached UI can stay responsive and tests can observe waits.

mod bounded;
mod flag;
mod increment;
mod list;
mod task;
mod wait;

use std::{
    collections::VecDeque,
    path::PathBuf,
    time::{Duration, Instant},
};

use jiff::civil::Date;
use log::info;

use crate::error::{AcquireError, Result};
use crate::layout::Layout;
use crate::model::{Cursor, ObservationId};
use crate::naming::FileQuery;
use crate::remote::RemoteSource;

/// Progress indicator cadence, in polls.
const PROGRESS_EVERY: u64 = 15;

/// What one strategy poll produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// One observation is ready; `files` are the raw inputs, unsorted.
    Ready {
        observation: ObservationId,
        files: Vec<PathBuf>,
    },

    /// No further observations. A normal terminal signal, not an error.
    Done,
}

/// Pauses between polls. The default sleeps the thread; embeddings that
/// need to keep an event loop alive inject their own.
pub trait Waiter {
    fn pause(&self, duration: Duration);
}

/// Plain `thread::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SleepWaiter;

impl Waiter for SleepWaiter {
    fn pause(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Everything a strategy reads but does not own.
pub struct Context<'a> {
    pub layout: &'a Layout,
    pub ut_date: Date,

    /// Whether a missing expected observation may be skipped forward.
    pub skip: bool,

    /// Wall-clock budget for one acquisition attempt.
    pub timeout: Duration,
    pub poll_interval: Duration,
    pub waiter: &'a dyn Waiter,
}

/// The selected discovery policy, chosen once at startup.
///
/// A closed set: the engine dispatches by match, not trait objects, and
/// strategies carrying caller-supplied sequences own them here. Sequences
/// are only consumed on successful delivery, so a failed attempt may be
/// retried with an unmodified cursor and behave identically.
pub enum Strategy {
    /// Work through a caller-supplied list of observation numbers.
    Bounded { queue: VecDeque<u32> },

    /// Take the cursor's number and increment it regardless of success;
    /// external tooling supplies the start and decides when to stop.
    Increment,

    /// Poll for the literal raw filename until its size is stable.
    TimedWait,

    /// Wait on flag files, delivering incremental flag growth.
    FlagQuorum,

    /// Wait for every live remote task to agree on a new frame.
    TaskQuorum {
        sources: Vec<Box<dyn RemoteSource>>,
    },

    /// Work through caller-supplied literal filenames.
    FileList { queue: VecDeque<String> },
}

impl Strategy {
    pub fn bounded(observations: impl IntoIterator<Item = u32>) -> Self {
        Self::Bounded {
            queue: observations.into_iter().collect(),
        }
    }

    pub fn file_list(files: impl IntoIterator<Item = String>) -> Self {
        Self::FileList {
            queue: files.into_iter().collect(),
        }
    }

    pub fn task(sources: Vec<Box<dyn RemoteSource>>) -> Self {
        Self::TaskQuorum { sources }
    }

    /// Run one poll of the selected policy.
    pub fn poll(&mut self, ctx: &Context<'_>, cursor: &mut Cursor) -> Result<Step> {
        if cursor.is_done() {
            return Ok(Step::Done);
        }
        match self {
            Self::Bounded { queue } => bounded::poll(queue, ctx, cursor),
            Self::Increment => increment::poll(ctx, cursor),
            Self::TimedWait => wait::poll(ctx, cursor),
            Self::FlagQuorum => flag::poll(ctx, cursor),
            Self::TaskQuorum { sources } => task::poll(sources, ctx, cursor),
            Self::FileList { queue } => list::poll(queue, ctx, cursor),
        }
    }
}

/// Where an observation's raw files stand right now.
pub(crate) enum Resolution {
    /// Every subsystem query matched; files are sorted lexically.
    Found(Vec<PathBuf>),

    /// At least one query matched nothing; the path names what was expected.
    Missing(PathBuf),
}

/// Resolve all of an observation's raw files, requiring every subsystem
/// query to match at least once.
pub(crate) fn resolve_observation(ctx: &Context<'_>, obs: ObservationId) -> Result<Resolution> {
    let mut files = Vec::new();
    for query in ctx.layout.raw_queries(obs) {
        let mut found = query.locate()?;
        if found.is_empty() {
            return Ok(Resolution::Missing(expected_path(&query)));
        }
        files.append(&mut found);
    }
    files.sort();
    Ok(Resolution::Found(files))
}

/// A displayable path for "this is what we were looking for" diagnostics.
pub(crate) fn expected_path(query: &FileQuery) -> PathBuf {
    match query {
        FileQuery::Literal(path) => path.clone(),
        FileQuery::Pattern { root, pattern } => root.join(pattern),
    }
}

/// Timeout accounting and progress output for one polling wait.
pub(crate) struct PollClock {
    started: Instant,
    budget: Duration,
    polls: u64,
}

impl PollClock {
    pub(crate) fn new(budget: Duration) -> Self {
        Self {
            started: Instant::now(),
            budget,
            polls: 0,
        }
    }

    pub(crate) fn polls(&self) -> u64 {
        self.polls
    }

    /// Sleep one poll interval, or fail once the budget is spent.
    ///
    /// The final sleep is clamped to the remaining budget, so the timeout
    /// error lands within one interval of the configured budget.
    pub(crate) fn tick(&mut self, ctx: &Context<'_>, observation: u32) -> Result<()> {
        let elapsed = self.started.elapsed();
        if elapsed >= self.budget {
            return Err(AcquireError::Timeout {
                observation,
                waited: elapsed,
            });
        }

        ctx.waiter.pause(ctx.poll_interval.min(self.budget - elapsed));
        self.polls += 1;
        if self.polls % PROGRESS_EVERY == 0 {
            info!(
                "still waiting for observation {observation} ({}s elapsed)",
                self.started.elapsed().as_secs()
            );
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod testutil {
    //! Shared fixtures for strategy tests.

    use std::cell::Cell;
    use std::path::Path;
    use std::time::Duration;

    use super::{Context, Waiter};
    use crate::layout::Layout;

    /// Counts pauses instead of sleeping (beyond a token yield).
    #[derive(Debug, Default)]
    pub struct CountingWaiter {
        pub pauses: Cell<u64>,
    }

    impl Waiter for CountingWaiter {
        fn pause(&self, duration: Duration) {
            self.pauses.set(self.pauses.get() + 1);
            // Keep real time moving so budgets expire.
            std::thread::sleep(duration.min(Duration::from_millis(5)));
        }
    }

    pub fn layout(input: &Path, output: &Path) -> Layout {
        Layout {
            input_root: input.to_path_buf(),
            output_root: output.to_path_buf(),
            prefixes: vec!["f".to_string()],
            suffix: ".sdf".to_string(),
            number_width: 5,
            search_pattern: None,
        }
    }

    pub fn context<'a>(layout: &'a Layout, waiter: &'a dyn Waiter) -> Context<'a> {
        Context {
            layout,
            ut_date: jiff::civil::date(2026, 8, 6),
            skip: false,
            timeout: Duration::from_millis(300),
            poll_interval: Duration::from_millis(10),
            waiter,
        }
    }
}
