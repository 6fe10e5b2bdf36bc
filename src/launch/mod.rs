//! Launching the downstream application.

pub mod dispatcher;

pub use dispatcher::{should_pause, LaunchDispatcher, PAUSE_MESSAGE};
