//! memoctl library - exposes modules for testing.

pub mod cli;
pub mod client;
pub mod logging;
pub mod models;
pub mod scenario;
