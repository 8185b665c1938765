//! certpost CLI library
//!
//! The `certpost` binary is a thin wrapper around these modules; they are
//! exposed as a library so integration tests can drive the terminal
//! collaborators and the xlsx report writer directly.

pub mod cli;
pub mod commands;
pub mod error;
pub mod interaction;
pub mod logging;
pub mod output;
pub mod progress;
pub mod report;
