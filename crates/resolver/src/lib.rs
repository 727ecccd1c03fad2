//! # Plots Resolver
//!
//! Identity resolution pipeline: result cache, remote name source and
//! request coalescing.

mod cache;
mod error;
mod identity_resolver;
mod static_source;
mod types;

pub use cache::ResultCache;
pub use error::ResolutionError;
pub use identity_resolver::{IdentityResolutionPipeline, PipelineConfig, PipelineStats};
pub use static_source::StaticNameSource;
pub use types::*;
