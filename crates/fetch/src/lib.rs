//! Fetch collaborator for components.
//!
//! Requests go through a [`Transport`]: [`ReqwestTransport`] for real HTTP and
//! [`RecordingTransport`] for tests. [`fetch_checked`] adds status checking and
//! routes failures into the document.

pub mod checked;
pub mod client;
pub mod config;
pub mod error;
pub mod message;
pub mod transport;

pub use checked::{Body, ErrorTarget, FetchOptions, ResponseHandler, fetch_checked};
pub use client::Client;
pub use config::FetchConfig;
pub use error::FetchError;
pub use message::{Request, Response};
pub use reqwest::Method;
pub use transport::{RecordingTransport, ReqwestTransport, Transport};
pub use url::Url;
