//! Result and error types for Hallar.
//!
//! "Nothing matched" is never an error anywhere in the engine — empty
//! sequences and `None` carry that outcome. The variants here cover the
//! programmer-error and external-failure classes only.

use thiserror::Error;

/// Result type for Hallar operations
pub type HallarResult<T> = Result<T, HallarError>;

/// Errors that can occur in Hallar
#[derive(Debug, Error)]
pub enum HallarError {
    /// Malformed selector input, raised at locator construction
    #[error("Invalid selector '{selector}': {message}")]
    InvalidSelector {
        /// The selector as given
        selector: String,
        /// What was wrong with it
        message: String,
    },

    /// Malformed init-script input
    #[error("Invalid init script: {message}")]
    InvalidScript {
        /// What was wrong with it
        message: String,
    },

    /// An external script could not be injected
    #[error("Failed to load script '{path}': {message}")]
    ScriptLoad {
        /// Path of the script
        path: String,
        /// Why injection failed
        message: String,
    },
}
