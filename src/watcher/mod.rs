//! Live filing of newly created files.
//!
//! # Architecture
//!
//! ```text
//! notify::RecommendedWatcher (recursive, own thread)
//!   -> unbounded channel (queues events during the initial scan)
//!   -> WatchDriver::run
//!        create event -> task: settle delay -> Classifier -> OutcomeSink
//!        error event  -> OutcomeSink (loop continues)
//! ```

mod driver;
mod error;
mod state;

pub use driver::{WatchDriver, WatchStats};
pub use error::WatchError;
pub use state::WatchState;
