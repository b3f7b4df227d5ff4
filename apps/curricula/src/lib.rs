//! # Curricula
//!
//! Command-line front end over `curricula-core`: configuration, learner
//! progress files, and the `curricula` subcommands.

pub mod cli;
pub mod config;
pub mod progress;
