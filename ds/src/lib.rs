//! DealScout: a terminal client for the deal-scout analysis backend.
//!
//! Submit a company domain, watch analysis steps stream in while the
//! backend works, and read the final six-metric scoring summary. Runs
//! either as a full-screen TUI or as a headless batch command.
//!
//! # Modules
//!
//! - `batch`: headless analyze-and-print runs for `ds analyze`
//! - `cli`: clap command definitions
//! - `config`: layered YAML configuration
//! - `poller`: fixed-interval job polling on a background task
//! - `tui`: the interactive terminal interface

pub mod batch;
pub mod cli;
pub mod config;
pub mod poller;
pub mod tui;

// Re-export the main types for convenience
pub use cli::{Cli, Command, OutputFormat};
pub use config::Config;
pub use poller::{JobPoller, PollEvent};
