//! Listing errors

use resolver::ResolutionError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ListingError {
    /// Malformed list arguments; the message shows the expected syntax
    #[error("{0}")]
    Usage(String),

    #[error("Invalid player: '{key}'")]
    InvalidPlayer { key: String },

    #[error("Plots cannot be listed for sale while the economy is disabled")]
    EconomyDisabled,

    #[error(transparent)]
    Resolution(#[from] ResolutionError),
}
