//! Configuration errors
//!
//! Only mistakes in the *declaration* of rules or in binding are errors.
//! An attribute failing its rules is ordinary data and is reported through
//! [`InvalidAttrs`](crate::controller::InvalidAttrs), never through this type.

use thiserror::Error;

/// Result type for operations that can hit a configuration error.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// A declaration or binding mistake surfaced to the caller immediately.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A rule object names a validator the catalog does not know.
    #[error("unknown validator '{name}' declared for attribute '{attr}'")]
    UnknownValidator {
        /// The attribute whose rules reference the validator
        attr: String,
        /// The unresolved validator name
        name: String,
    },

    /// A `fn` rule names a model method that does not exist.
    #[error("model has no validation method '{name}' (attribute '{attr}')")]
    UnknownMethod {
        /// The attribute being validated
        attr: String,
        /// The unresolved method name
        name: String,
    },

    /// A validator received a parameter of the wrong shape.
    #[error("invalid parameter for validator '{validator}': {reason}")]
    InvalidParam {
        /// The validator that rejected its parameter
        validator: String,
        /// What was wrong with it
        reason: String,
    },

    /// A pattern parameter or registered pattern is not a valid regex.
    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The pattern source
        pattern: String,
        /// The regex compiler's message
        reason: String,
    },

    /// A JSON declaration has the wrong shape.
    #[error("invalid declaration for attribute '{attr}': {reason}")]
    InvalidDeclaration {
        /// The attribute being declared
        attr: String,
        /// What was wrong with it
        reason: String,
    },

    /// `bind` was called without a model or a collection.
    #[error(
        "before you execute the binding your view must have a model or a collection"
    )]
    MissingModel,
}

impl ConfigError {
    pub(crate) fn invalid_param(validator: &str, reason: impl Into<String>) -> Self {
        Self::InvalidParam {
            validator: validator.to_owned(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_pattern(pattern: &str, err: &regex::Error) -> Self {
        Self::InvalidPattern {
            pattern: pattern.to_owned(),
            reason: err.to_string(),
        }
    }
}
