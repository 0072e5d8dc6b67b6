//! Error types for policy binding.
//!
//! Every failure here happens while the backend is being assembled, before
//! anything is handed to the deployment platform, so all of them are fatal.

use thiserror::Error;

/// Errors raised while building the storage access configuration.
#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigurationError {
    /// The principal class has no role in the identity directory.
    #[error("Role for principal '{principal}' does not exist in the identity directory")]
    UnknownRole { principal: String },

    /// A bucket reference could not be resolved to an ARN.
    #[error("Cannot resolve ARN for bucket '{bucket}' in region '{region}': {reason}")]
    UnresolvedArn {
        bucket: String,
        region: String,
        reason: String,
    },

    /// A policy references a path that the storage outputs do not declare
    /// for the principal it is attached to.
    #[error("Policy '{policy}' grants '{principal}' access to '{path}', which the storage outputs do not declare")]
    UndeclaredPath {
        policy: String,
        principal: String,
        path: String,
    },

    /// A policy grants an action the storage outputs do not declare for the
    /// principal on that path.
    #[error("Policy '{policy}' grants '{action}' on '{path}' to '{principal}', which the storage outputs do not declare")]
    UndeclaredAction {
        policy: String,
        principal: String,
        path: String,
        action: String,
    },

    /// A declared path has no attached policy covering it.
    #[error("Storage outputs declare '{path}' for '{principal}' but no attached policy covers it")]
    UncoveredPath { principal: String, path: String },

    /// A statement grants access without being scoped to any path prefix.
    #[error("Statement '{statement}' in policy '{policy}' is not scoped to any declared path prefix")]
    UnscopedStatement { policy: String, statement: String },

    /// A path pattern is not of the form `<prefix>/*`.
    #[error("Invalid path pattern '{0}': expected '<prefix>/*'")]
    InvalidPathPattern(String),

    /// The storage output descriptor is malformed or inconsistent.
    #[error("Invalid storage outputs: {0}")]
    InvalidDescriptor(String),

    /// The backend definition is malformed or inconsistent.
    #[error("Invalid backend definition: {0}")]
    InvalidDefinition(String),
}

impl ConfigurationError {
    pub(crate) fn descriptor(message: impl Into<String>) -> Self {
        Self::InvalidDescriptor(message.into())
    }

    pub(crate) fn definition(message: impl Into<String>) -> Self {
        Self::InvalidDefinition(message.into())
    }
}

impl From<serde_json::Error> for ConfigurationError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidDescriptor(err.to_string())
    }
}

impl From<toml::de::Error> for ConfigurationError {
    fn from(err: toml::de::Error) -> Self {
        Self::InvalidDefinition(err.to_string())
    }
}

/// Result type for configuration assembly.
pub type Result<T> = std::result::Result<T, ConfigurationError>;
