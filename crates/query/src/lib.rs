//! # Plots Query
//!
//! Declarative resource queries and page slicing.
//!
//! ## Components
//!
//! - `Query` - Source, predicates, sorting and relative area
//! - `QueryEngine` - Evaluates a query against a `ResourceStore`
//! - `Paginator` - Fixed-size, clamped pages over an ordered slice

pub mod engine;
pub mod paginator;
pub mod query;
pub mod sorting;

pub use engine::QueryEngine;
pub use paginator::{PageArg, PageResult, Paginator};
pub use query::{Predicate, Query, QuerySource};
pub use sorting::SortStrategy;
