//! Start Page Library
//!
//! Runs the start page view against its host without a screen, reporting
//! what the view shows as NDJSON.

pub mod headless;

pub use headless::runner::run_headless;
pub use headless::{EventSink, HeadlessEvent};
