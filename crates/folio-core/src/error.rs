//! Unified error types for the Folio core.
//!
//! Activation-level outcomes (skipped plugins and their reasons) live in
//! `folio-framework`; this module only covers the class registry and the
//! application container.

use std::path::PathBuf;

use thiserror::Error;

/// Boxed error returned by provider hooks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

// =============================================================================
// Class Errors
// =============================================================================

/// Errors raised while defining or loading activation classes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassError {
    /// A class with this name is already known to the registry.
    #[error("class '{0}' is already defined")]
    AlreadyDefined(String),

    /// A unit file was found but could not be turned into class definitions.
    #[error("failed to load unit {path}: {reason}")]
    UnitLoad {
        /// The unit file that failed.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },
}

impl ClassError {
    /// Creates a unit load error.
    pub fn unit_load(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::UnitLoad {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

/// Result type for class registry operations.
pub type ClassResult<T> = Result<T, ClassError>;

// =============================================================================
// Container Errors
// =============================================================================

/// Errors that can occur inside the application container.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContainerError {
    /// A provider's `register` hook failed.
    #[error("provider '{class}' failed to register: {reason}")]
    RegisterFailed {
        /// Activation class of the provider.
        class: String,
        /// Reason for failure.
        reason: String,
    },

    /// A provider's `boot` hook failed.
    #[error("provider '{class}' failed to boot: {reason}")]
    BootFailed {
        /// Activation class of the provider.
        class: String,
        /// Reason for failure.
        reason: String,
    },
}

/// Result type for container operations.
pub type ContainerResult<T> = Result<T, ContainerError>;
