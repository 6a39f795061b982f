//! Form submission as JSON.
//!
//! [`FormSubmitter::install`] takes over every `submit` event of a document:
//! the form is serialized into a JSON object with per-control coercion, sent
//! to its `action`, and a status widget in the form reports the outcome.

pub mod response;
pub mod serialize;
pub mod submit;

pub use response::{RESPONSE_WIDGET_CLASS, ResponseStatusCommand, form_response_component, response_value};
pub use serialize::{FieldKind, coerce_field, form_entries, serialize_form};
pub use submit::FormSubmitter;
