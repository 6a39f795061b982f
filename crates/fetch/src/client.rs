//! Shared client handle.

use std::rc::Rc;

use futures::future::LocalBoxFuture;

use crate::config::FetchConfig;
use crate::error::FetchError;
use crate::message::{Request, Response};
use crate::transport::{ReqwestTransport, Transport};

/// A transport paired with the endpoints it talks to. Cheap to clone.
#[derive(Clone)]
pub struct Client {
    transport: Rc<dyn Transport>,
    config: Rc<FetchConfig>,
}

impl Client {
    /// Pair `transport` with `config`.
    pub fn new(transport: impl Transport + 'static, config: FetchConfig) -> Self {
        Self {
            transport: Rc::new(transport),
            config: Rc::new(config),
        }
    }

    /// An HTTP client configured from the environment.
    pub fn from_env() -> Self {
        Self::new(ReqwestTransport::default(), FetchConfig::from_env())
    }

    /// Endpoint configuration.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Send a request without any status checking.
    pub fn send(&self, request: Request) -> LocalBoxFuture<'static, Result<Response, FetchError>> {
        self.transport.send(request)
    }
}
