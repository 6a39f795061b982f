//! Request and response descriptors.

use bytes::Bytes;
use reqwest::Method;
use serde_json::Value;
use url::Url;

use crate::error::FetchError;

/// An outgoing request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub body: Option<Bytes>,
}

impl Request {
    /// A request without headers or body.
    pub const fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: Vec::new(),
            body: None,
        }
    }

    /// Shorthand for a `GET` request.
    pub const fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    /// Add a header.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    /// Set the raw body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Serialize `value` as the body and mark it as JSON.
    #[must_use]
    pub fn with_json(self, value: &Value) -> Self {
        self.with_header("Content-Type", "application/json")
            .with_body(value.to_string())
    }

    /// First header value with the given name, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// A received response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub status_text: String,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl Response {
    /// A response with an empty body.
    pub fn new(status: u16, status_text: &str) -> Self {
        Self {
            status,
            status_text: status_text.to_owned(),
            headers: Vec::new(),
            body: Bytes::new(),
        }
    }

    /// Set the body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Whether the status is in the success range.
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// First header value with the given name, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// The body as UTF-8 text.
    ///
    /// # Errors
    /// [`FetchError::Body`] if the body is not valid UTF-8.
    pub fn text(&self) -> Result<String, FetchError> {
        String::from_utf8(self.body.to_vec()).map_err(|error| FetchError::Body(error.to_string()))
    }

    /// The body parsed as JSON.
    ///
    /// # Errors
    /// [`FetchError::Body`] if the body is not valid JSON.
    pub fn json(&self) -> Result<Value, FetchError> {
        serde_json::from_slice(&self.body).map_err(|error| FetchError::Body(error.to_string()))
    }
}

fn find_header<'headers>(headers: &'headers [(String, String)], name: &str) -> Option<&'headers str> {
    headers
        .iter()
        .find(|(header, _)| header.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Tests JSON request construction
    #[test]
    fn test_json_request() -> anyhow::Result<()> {
        let request = Request::new(Method::POST, Url::parse("http://shop.test/api/item")?).with_json(&json!({"a": 1}));
        assert_eq!(request.header("content-type"), Some("application/json"));
        assert_eq!(request.body.as_deref(), Some(br#"{"a":1}"#.as_slice()));
        Ok(())
    }

    /// Tests the success range and body decoding
    #[test]
    fn test_response_decoding() {
        assert!(Response::new(204, "No Content").ok());
        assert!(!Response::new(404, "Not Found").ok());
        assert!(!Response::new(199, "").ok());

        let response = Response::new(200, "OK").with_body("[1, 2]");
        assert_eq!(response.json(), Ok(json!([1, 2])));
        assert_eq!(response.text().as_deref(), Ok("[1, 2]"));
        assert!(matches!(
            Response::new(200, "OK").with_body("nope").json(),
            Err(FetchError::Body(_))
        ));
    }
}
