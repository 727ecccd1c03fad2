//! # Plots Store
//!
//! Resource storage behind the `shared::ResourceStore` port.
//!
//! ## Components
//!
//! - `InMemoryResourceStore` - Thread-safe map of resources, ordered by id
//! - `ResourceFile` - JSON fixture format

pub mod fixture;
pub mod in_memory;

pub use fixture::ResourceFile;
pub use in_memory::InMemoryResourceStore;
