//! Fetching with error routing.
//!
//! [`fetch_checked`] sends a request and insists on a success status. Every
//! failure is written into an optional error target in the document and
//! logged before it is returned.

use std::rc::Rc;

use anyhow::Result;
use dom::{Document, NodeId};
use log::{error, warn};
use serde_json::Value;

use crate::client::Client;
use crate::error::FetchError;
use crate::message::{Request, Response};

/// Hook that sees the raw response before the success check.
pub type ResponseHandler = Rc<dyn Fn(&Response) -> Result<()>>;

/// The decoded body of a successful fetch.
#[derive(Clone, Debug, PartialEq)]
pub enum Body {
    Text(String),
    Json(Value),
}

impl Body {
    /// The text body, if the fetch did not parse JSON.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Json(_) => None,
        }
    }

    /// The parsed JSON body, if requested.
    pub const fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Text(_) => None,
            Self::Json(value) => Some(value),
        }
    }
}

/// A node whose text content receives failure messages.
#[derive(Clone)]
pub struct ErrorTarget {
    document: Document,
    node: NodeId,
}

impl ErrorTarget {
    /// Target `node` of `document`.
    pub const fn new(document: Document, node: NodeId) -> Self {
        Self { document, node }
    }

    /// Replace the target's content with `message`.
    pub fn report(&self, message: &str) {
        if let Err(report_error) = self.document.set_text_content(self.node, message) {
            warn!("could not report fetch error: {report_error:#}");
        }
    }
}

/// Options for [`fetch_checked`].
#[derive(Clone, Default)]
pub struct FetchOptions {
    pub error_target: Option<ErrorTarget>,
    pub response_handler: Option<ResponseHandler>,
    pub parse_as_json: bool,
}

impl FetchOptions {
    /// No error target, no handler, text body.
    pub fn new() -> Self {
        Self::default()
    }

    /// Report failures into `node`.
    #[must_use]
    pub fn error_target(mut self, document: &Document, node: NodeId) -> Self {
        self.error_target = Some(ErrorTarget::new(document.clone(), node));
        self
    }

    /// Run `handler` on the raw response before the success check.
    #[must_use]
    pub fn response_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Response) -> Result<()> + 'static,
    {
        self.response_handler = Some(Rc::new(handler));
        self
    }

    /// Parse the body as JSON.
    #[must_use]
    pub const fn json(mut self) -> Self {
        self.parse_as_json = true;
        self
    }
}

async fn fetch_unreported(client: &Client, request: Request, options: &FetchOptions) -> Result<Body, FetchError> {
    let response = client.send(request).await?;
    if let Some(handler) = &options.response_handler
        && let Err(handler_error) = handler(&response)
    {
        warn!("response handler failed: {handler_error:#}");
    }
    if !response.ok() {
        return Err(FetchError::Status {
            status: response.status,
            status_text: response.status_text,
        });
    }
    if options.parse_as_json {
        response.json().map(Body::Json)
    } else {
        response.text().map(Body::Text)
    }
}

/// Send `request` and decode the body of a successful response.
///
/// # Errors
/// [`FetchError::Status`] for a non-success status, [`FetchError::Transport`]
/// when no response arrived and [`FetchError::Body`] when the body does not
/// decode. The message is also written to the error target, if any.
pub async fn fetch_checked(client: &Client, request: Request, options: FetchOptions) -> Result<Body, FetchError> {
    let description = format!("{} {}", request.method, request.url);
    let result = fetch_unreported(client, request, &options).await;
    if let Err(fetch_error) = &result {
        if let Some(target) = &options.error_target {
            target.report(&fetch_error.to_string());
        }
        error!("{description} failed: {fetch_error}");
    }
    result
}
