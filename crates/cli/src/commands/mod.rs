//! CLI Commands

pub mod complete;
pub mod list;

pub use complete::CompleteCommand;
pub use list::ListCommand;
