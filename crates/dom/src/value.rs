use core::fmt::{Debug, Display, Formatter, Result as FmtResult};
use std::error::Error;
use std::rc::Rc;

use anyhow::Result;
use indextree::NodeId;
use serde_json::Value;

/// Signature of a function exposed across the host boundary.
pub type HostFn = dyn Fn(Vec<HostValue>) -> Result<HostValue> + 'static;

/// A shared, invocable host function.
///
/// Cloning is cheap and keeps the identity of the underlying closure, so
/// [`HostFunction::ptr_eq`] can be used to tell two registrations apart.
#[derive(Clone)]
pub struct HostFunction(Rc<HostFn>);

impl HostFunction {
    /// Wrap a closure.
    pub fn new<F>(function: F) -> Self
    where
        F: Fn(Vec<HostValue>) -> Result<HostValue> + 'static,
    {
        Self(Rc::new(function))
    }

    /// Wrap a closure that takes no arguments and returns nothing.
    pub fn from_action<F>(action: F) -> Self
    where
        F: Fn() -> Result<()> + 'static,
    {
        Self::new(move |_arguments| {
            action()?;
            Ok(HostValue::Undefined)
        })
    }

    /// Invoke the function. Errors are returned exactly as the closure produced them.
    ///
    /// # Errors
    /// Propagates whatever the wrapped closure returns.
    pub fn call(&self, arguments: Vec<HostValue>) -> Result<HostValue> {
        (self.0)(arguments)
    }

    /// Returns true if both handles point at the same closure.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Debug for HostFunction {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FmtResult {
        formatter.write_str("HostFunction")
    }
}

/// The closed set of values that cross the host boundary: attribute values,
/// component properties and member-call arguments.
#[derive(Clone, Debug, Default)]
pub enum HostValue {
    /// The `undefined` value.
    #[default]
    Undefined,
    /// The null-like sentinel, also used for removed attributes.
    Null,
    /// A boolean primitive.
    Boolean(bool),
    /// A number (IEEE 754 double precision).
    Number(f64),
    /// A string value. Raw attribute values always arrive as this variant.
    String(String),
    /// Structured data such as a decoded JSON record.
    Json(Value),
    /// An invocable function.
    Function(HostFunction),
}

impl HostValue {
    /// Returns the string slice if this is a `String`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(text) => Some(text),
            _ => None,
        }
    }

    /// Returns the number if this is a `Number`.
    pub const fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(number) => Some(*number),
            _ => None,
        }
    }

    /// Returns the function if this is a `Function`.
    pub const fn as_function(&self) -> Option<&HostFunction> {
        match self {
            Self::Function(function) => Some(function),
            _ => None,
        }
    }

    /// Returns the structured value if this is `Json`.
    pub const fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            _ => None,
        }
    }

    /// `Undefined` and `Null`.
    pub const fn is_nullish(&self) -> bool {
        matches!(self, Self::Undefined | Self::Null)
    }

    /// Build a value from an optional attribute: `None` maps to `Null`.
    pub fn from_attribute(value: Option<String>) -> Self {
        value.map_or(Self::Null, Self::String)
    }
}

impl PartialEq for HostValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Undefined, Self::Undefined) | (Self::Null, Self::Null) => true,
            (Self::Boolean(left), Self::Boolean(right)) => left == right,
            (Self::Number(left), Self::Number(right)) => left == right,
            (Self::String(left), Self::String(right)) => left == right,
            (Self::Json(left), Self::Json(right)) => left == right,
            (Self::Function(left), Self::Function(right)) => left.ptr_eq(right),
            _ => false,
        }
    }
}

impl Display for HostValue {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Undefined => formatter.write_str("undefined"),
            Self::Null => formatter.write_str("null"),
            Self::Boolean(flag) => write!(formatter, "{flag}"),
            Self::Number(number) if number.fract() == 0.0 && number.is_finite() => {
                write!(formatter, "{number:.0}")
            }
            Self::Number(number) => write!(formatter, "{number}"),
            Self::String(text) => formatter.write_str(text),
            Self::Json(value) => write!(formatter, "{value}"),
            Self::Function(_) => formatter.write_str("function"),
        }
    }
}

impl From<&str> for HostValue {
    fn from(text: &str) -> Self {
        Self::String(text.to_owned())
    }
}

impl From<String> for HostValue {
    fn from(text: String) -> Self {
        Self::String(text)
    }
}

impl From<f64> for HostValue {
    fn from(number: f64) -> Self {
        Self::Number(number)
    }
}

impl From<bool> for HostValue {
    fn from(flag: bool) -> Self {
        Self::Boolean(flag)
    }
}

impl From<Value> for HostValue {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

impl From<HostFunction> for HostValue {
    fn from(function: HostFunction) -> Self {
        Self::Function(function)
    }
}

/// Errors raised by tree and registry operations.
#[derive(Debug)]
pub enum DomError {
    /// The node id does not belong to this document.
    UnknownNode(NodeId),
    /// The requested insertion would break the tree shape.
    Hierarchy(String),
    /// The custom element name is not valid.
    InvalidCustomElementName(String),
    /// A custom element is already defined under this name.
    AlreadyDefined(String),
    /// The element does not expose a member with this name.
    UnknownMember(String),
    /// The element already has a shadow root.
    ShadowRootExists(NodeId),
}

impl Display for DomError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::UnknownNode(node) => write!(formatter, "unknown node {node:?}"),
            Self::Hierarchy(message) => write!(formatter, "HierarchyRequestError: {message}"),
            Self::InvalidCustomElementName(name) => {
                write!(formatter, "SyntaxError: '{name}' is not a valid custom element name")
            }
            Self::AlreadyDefined(name) => {
                write!(formatter, "NotSupportedError: '{name}' has already been defined")
            }
            Self::UnknownMember(name) => write!(formatter, "TypeError: '{name}' is not a function"),
            Self::ShadowRootExists(node) => {
                write!(formatter, "NotSupportedError: node {node:?} already has a shadow root")
            }
        }
    }
}

impl Error for DomError {}

#[cfg(test)]
mod tests {
    use super::*;

    /// Tests that numbers stringify without a trailing fraction when integral
    #[test]
    fn test_number_display() {
        assert_eq!(HostValue::Number(5.0).to_string(), "5");
        assert_eq!(HostValue::Number(2.5).to_string(), "2.5");
        assert_eq!(HostValue::Null.to_string(), "null");
    }

    /// Tests that function equality is identity based
    #[test]
    fn test_function_identity() {
        let first = HostFunction::from_action(|| Ok(()));
        let second = HostFunction::from_action(|| Ok(()));
        assert_eq!(HostValue::from(first.clone()), HostValue::from(first.clone()));
        assert_ne!(HostValue::from(first), HostValue::from(second));
    }

    /// Tests that removed attributes map to the null sentinel
    #[test]
    fn test_from_attribute() {
        assert_eq!(HostValue::from_attribute(None), HostValue::Null);
        assert_eq!(
            HostValue::from_attribute(Some("5".to_owned())),
            HostValue::String("5".to_owned())
        );
    }
}
