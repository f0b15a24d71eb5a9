//! # faim
//!
//! Command-line front end for the FAIM-QIRF rule engine.
//!
//! The binary in `main.rs` only sets up logging and dispatches to [`cli`];
//! everything here is exposed so the integration tests can drive commands
//! directly against temporary snapshot files.

pub mod cli;
pub mod config;
pub mod logging;
