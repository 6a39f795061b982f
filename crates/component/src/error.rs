//! Runtime error type.

use core::fmt::{Display, Formatter, Result as FmtResult};
use std::error::Error;

/// Errors raised by the component runtime itself. Errors produced by factories
/// and callbacks are never wrapped in this type; they travel as the original
/// `anyhow::Error`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentError {
    /// A builder mutator was called after the component was built.
    ConfigurationFrozen {
        /// Name of the rejected operation.
        operation: &'static str,
    },
    /// A caller passed a property the definition does not declare.
    UnknownProperty {
        /// The undeclared property name.
        name: String,
    },
    /// A property did not have the shape a typed record expects.
    InvalidProperty {
        /// Property name.
        name: String,
        /// Human readable description of the expected shape.
        expected: &'static str,
    },
    /// No callback is registered under this name.
    MissingCallback {
        /// Callback name.
        name: String,
    },
}

impl Display for ComponentError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::ConfigurationFrozen { operation } => write!(
                formatter,
                "ConfigurationFrozenError: cannot call `{operation}` after the component was built"
            ),
            Self::UnknownProperty { name } => write!(formatter, "unknown property `{name}`"),
            Self::InvalidProperty { name, expected } => {
                write!(formatter, "property `{name}` must be {expected}")
            }
            Self::MissingCallback { name } => write!(formatter, "no callback named `{name}`"),
        }
    }
}

impl Error for ComponentError {}
