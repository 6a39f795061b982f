//! Fetch failures.

use core::fmt::{Display, Formatter, Result as FmtResult};
use std::error::Error;

/// A failed fetch. Never retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The server answered with a non-success status.
    Status {
        /// Numeric status code.
        status: u16,
        /// Reason phrase.
        status_text: String,
    },
    /// The request never produced a response.
    Transport(String),
    /// The body could not be read or parsed.
    Body(String),
}

impl Display for FetchError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Status { status, status_text } => write!(formatter, "Error: {status} {status_text}"),
            Self::Transport(message) => write!(formatter, "NetworkError: {message}"),
            Self::Body(message) => write!(formatter, "SyntaxError: {message}"),
        }
    }
}

impl Error for FetchError {}
