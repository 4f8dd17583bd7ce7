//! The acquisition loop driver.
//!
//! Owns nothing but the selected strategy and the call sequence:
//! discover, convert, stage, configure a [`Frame`]. Frame-construction
//! failure is surfaced, not retried; the caller decides whether to advance
//! the cursor and continue or abort the run.

use std::time::Duration;

use jiff::civil::Date;
use log::info;

use crate::config::Config;
use crate::convert::{Converter, Passthrough};
use crate::discover::{Context, SleepWaiter, Step, Strategy, Waiter};
use crate::error::Result;
use crate::layout::Layout;
use crate::model::{Cursor, Frame};
use crate::remote::RemoteSource;
use crate::stage::Stager;

/// The result of one acquisition attempt.
#[derive(Debug)]
pub enum Outcome {
    /// One observation, fully staged and configured.
    Ready(Frame),

    /// No further observations. Distinct from every error, so callers can
    /// tell "pipeline is done" from "pipeline stalled".
    Done,
}

/// The observation acquisition engine.
///
/// One engine per running pipeline instance; the output working directory
/// is treated as exclusively owned. The cursor stays with the caller.
pub struct Engine {
    layout: Layout,
    ut_date: Date,
    skip: bool,
    timeout: Duration,
    poll_interval: Duration,
    strategy: Strategy,
    converter: Box<dyn Converter>,
    stager: Stager,
    waiter: Box<dyn Waiter>,
}

impl Engine {
    /// Build an engine from configuration, with pass-through conversion.
    ///
    /// `sources` are the live remote tasks for the `task-quorum` strategy;
    /// pass an empty vec for every other kind.
    pub fn from_config(config: &Config, sources: Vec<Box<dyn RemoteSource>>) -> Self {
        let strategy = config.build_strategy(sources);
        Self {
            stager: Stager::new(&config.layout.output_root),
            layout: config.layout.clone(),
            ut_date: config.ut_date,
            skip: config.skip,
            timeout: config.timeout(),
            poll_interval: config.poll_interval(),
            strategy,
            converter: Box::new(Passthrough),
            waiter: Box::new(SleepWaiter),
        }
    }

    /// Replace the format converter.
    pub fn with_converter(mut self, converter: Box<dyn Converter>) -> Self {
        self.converter = converter;
        self
    }

    /// Replace the between-polls pause, e.g. to pump a UI event loop.
    pub fn with_waiter(mut self, waiter: Box<dyn Waiter>) -> Self {
        self.waiter = waiter;
        self
    }

    /// Acquire the next observation.
    ///
    /// Runs the selected strategy once, then converts and stages every raw
    /// file it produced. Any failure on any file aborts the whole
    /// observation; no partial frame is ever handed out.
    pub fn acquire(&mut self, cursor: &mut Cursor) -> Result<Outcome> {
        let ctx = Context {
            layout: &self.layout,
            ut_date: self.ut_date,
            skip: self.skip,
            timeout: self.timeout,
            poll_interval: self.poll_interval,
            waiter: self.waiter.as_ref(),
        };

        let Step::Ready { observation, mut files } = self.strategy.poll(&ctx, cursor)? else {
            return Ok(Outcome::Done);
        };
        files.sort();

        let mut staged = Vec::with_capacity(files.len());
        for raw in &files {
            let converted = self.converter.convert(raw, &self.layout.output_root)?;
            staged.push(self.stager.stage(&converted)?);
        }

        let frame = Frame::configure(observation, staged)?;
        info!(
            "observation {observation} ready with {} file(s)",
            frame.files().len()
        );
        Ok(Outcome::Ready(frame))
    }
}
