//! Command-line interface for tagdex.
//!
//! This module provides CLI commands for scanning a music tree into the
//! index and querying the indexed catalog.

mod commands;

pub use commands::{Cli, Commands, run_command};
