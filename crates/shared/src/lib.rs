//! # Plots Shared
//!
//! Common types and interfaces used across all plot listing packages.

pub mod error;
pub mod identity;
pub mod resource;
pub mod config;

// Re-exports
pub use error::*;
pub use identity::*;
pub use resource::*;
pub use config::*;
