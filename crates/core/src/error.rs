//! Fatal conversion errors.
//!
//! Everything recoverable is reported through [`crate::diagnostics`] instead.

/// Errors that abort a conversion run.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// A non-primitive node reached the registry without a usable name.
    #[error("cannot derive identity key for {kind} node: name is empty")]
    MissingIdentity {
        /// Token type of the offending node.
        kind: &'static str,
    },

    /// The facts document is not valid JSON or does not match the fact model.
    #[error("failed to parse declaration facts: {0}")]
    Facts(#[from] serde_json::Error),

    /// The converter configuration could not be parsed.
    #[error("failed to parse converter config: {0}")]
    Config(#[from] toml::de::Error),
}
