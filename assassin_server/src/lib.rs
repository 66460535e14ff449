//! HTTP server for assassin target chains.
//!
//! Hosts upload a CSV roster, the server builds a random single-cycle chain
//! and mails every player their target. Players can also post timestamped
//! selfie check-ins.

pub mod api;
pub mod config;
pub mod logging;
pub mod metrics;
