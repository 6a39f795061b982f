//! Ways of turning a [`Request`] into a [`Response`].

use core::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use futures::FutureExt as _;
use futures::future::LocalBoxFuture;
use log::{debug, trace};
use reqwest::Client as HttpClient;

use crate::error::FetchError;
use crate::message::{Request, Response};

/// Sends requests. Futures are polled on the host's local event loop and need
/// not be `Send`.
pub trait Transport {
    /// Send one request.
    fn send(&self, request: Request) -> LocalBoxFuture<'static, Result<Response, FetchError>>;
}

/// HTTP transport backed by `reqwest`.
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransport {
    client: HttpClient,
}

impl ReqwestTransport {
    /// Wrap an existing client.
    pub const fn new(client: HttpClient) -> Self {
        Self { client }
    }
}

async fn send_http(client: HttpClient, request: Request) -> Result<Response, FetchError> {
    let url = request.url.clone();
    let mut builder = client.request(request.method, request.url);
    for (name, value) in &request.headers {
        builder = builder.header(name, value);
    }
    if let Some(body) = request.body {
        builder = builder.body(body);
    }

    let resp = builder
        .send()
        .await
        .map_err(|error| FetchError::Transport(error.to_string()))?;
    let status = resp.status();
    let headers = resp
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|text| (name.to_string(), text.to_owned()))
        })
        .collect();
    let body = resp
        .bytes()
        .await
        .map_err(|error| FetchError::Body(error.to_string()))?;
    debug!("{url} answered {status}");
    Ok(Response {
        status: status.as_u16(),
        status_text: status.canonical_reason().unwrap_or("").to_owned(),
        headers,
        body,
    })
}

impl Transport for ReqwestTransport {
    fn send(&self, request: Request) -> LocalBoxFuture<'static, Result<Response, FetchError>> {
        send_http(self.client.clone(), request).boxed_local()
    }
}

#[derive(Default)]
struct Recording {
    responses: VecDeque<Result<Response, FetchError>>,
    requests: Vec<Request>,
}

/// In-memory transport: answers with queued responses in order and records
/// every request it sees. Clones share the same queue and log.
#[derive(Clone, Default)]
pub struct RecordingTransport {
    state: Rc<RefCell<Recording>>,
}

impl RecordingTransport {
    /// An empty transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response.
    pub fn push_response(&self, response: Response) {
        self.state.borrow_mut().responses.push_back(Ok(response));
    }

    /// Queue a failure.
    pub fn push_error(&self, error: FetchError) {
        self.state.borrow_mut().responses.push_back(Err(error));
    }

    /// Requests sent so far.
    pub fn requests(&self) -> Vec<Request> {
        self.state.borrow().requests.clone()
    }

    /// Number of queued responses not yet consumed.
    pub fn pending(&self) -> usize {
        self.state.borrow().responses.len()
    }
}

impl Transport for RecordingTransport {
    fn send(&self, request: Request) -> LocalBoxFuture<'static, Result<Response, FetchError>> {
        trace!("recorded {} {}", request.method, request.url);
        let answer = {
            let mut state = self.state.borrow_mut();
            state.requests.push(request);
            state
                .responses
                .pop_front()
                .unwrap_or_else(|| Err(FetchError::Transport("no response queued".to_owned())))
        };
        async move { answer }.boxed_local()
    }
}
