//! Observation acquisition for an astronomical data-reduction pipeline.
//!
//! The engine discovers when a new observation's raw data is ready, stages
//! it into the pipeline's working directory, and hands back a fully
//! materialized [`Frame`]. Discovery is polling only — no push channel is
//! assumed to exist — under one of six interchangeable policies: a bounded
//! list of numbers, unbounded increment, timed wait for a literal file,
//! flag-file quorum, live remote-task quorum, or an explicit file list.
//!
//! Guarantees, regardless of policy:
//!
//! - no file is consumed while still being written,
//! - no observation is delivered twice or silently dropped,
//! - observation numbers arrive in non-decreasing order,
//! - files within one observation arrive in lexical order.
//!
//! Callers hold the [`Cursor`] between calls; the engine keeps no global
//! discovery state.
//!
//! ```no_run
//! use std::path::Path;
//!
//! use firstlight::{Config, Cursor, Engine, Outcome};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load(Path::new("night.toml"))?;
//! let mut engine = Engine::from_config(&config, Vec::new());
//! let mut cursor = Cursor::starting_at(1);
//!
//! loop {
//!     match engine.acquire(&mut cursor)? {
//!         Outcome::Ready(frame) => println!("reduce {:?}", frame.files()),
//!         Outcome::Done => break,
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod convert;
pub mod discover;
pub mod engine;
pub mod error;
pub mod layout;
pub mod model;
pub mod naming;
pub mod remote;
pub mod scan;
pub mod stage;

pub use config::{Config, ConfigError, StrategyKind};
pub use convert::{Converter, Passthrough};
pub use discover::{SleepWaiter, Strategy, Waiter};
pub use engine::{Engine, Outcome};
pub use error::{AcquireError, ErrorKind, Result};
pub use layout::Layout;
pub use model::{Cursor, Frame, ObservationId};
pub use remote::{FramePayload, FrameReport, RemoteSource};
pub use stage::Stager;
