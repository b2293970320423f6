#![forbid(unsafe_code)]

//! Scripted sessions for the freightdesk widgets.
//!
//! Each subcommand drives real widgets against an in-memory catalog with a
//! virtual clock and prints every interesting frame as plain text.

pub mod catalog;
pub mod cli;
pub mod error;
pub mod job_form;
pub mod logging;
pub mod modes;
pub mod screen;

pub use cli::{Cli, run, run_from_env};
pub use error::{DemoError, Result};
