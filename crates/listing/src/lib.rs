//! # Plots Listing
//!
//! The plot list use case: turns a list request into a query, slices one
//! page and resolves every name shown on it with a single bounded batch.

mod error;
mod listing_core;
mod page;
mod request;

pub use error::ListingError;
pub use listing_core::{ListingCore, Viewer};
pub use page::{ListingPage, ListingRow, NameEntry, NameStatus, Relation};
pub use request::{ListKind, ListRequest};

// Re-export dependencies
pub use query::{PageArg, Paginator, Query, QueryEngine, SortStrategy};
pub use resolver::{IdentityResolutionPipeline, PipelineConfig, RemoteNameSource, StaticNameSource};
