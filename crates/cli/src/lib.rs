//! # Plots CLI
//!
//! Session setup, rendering, sub-commands and the interactive mode behind
//! the `plots` binary.

pub mod commands;
pub mod interactive;
pub mod render;
pub mod session;
