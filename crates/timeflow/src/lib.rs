//! TimeFlow - gamification replay tool
//!
//! Plays the storage side of the scoring core: reads a persisted
//! gamification snapshot and a JSON Lines file of activity events, runs
//! them through `timeflow-core`, and writes the snapshot back.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod store;

pub use error::{Error, Result};
