use super::constants::DEFAULT_TIMEOUT;
use super::endpoint::Endpoint;
use super::error::{ClientError, Result};

use async_trait::async_trait;
use reqwest::{Client, Proxy};

use std::collections::HashMap;
use std::error::Error as StdError;
use std::fmt::{self, Display};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Per-call transport settings
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransportPolicy {
    /// Validate the handset's certificate. Handsets usually ship self-signed
    /// or expired certificates, so this is off by default.
    pub verify_certs: bool,
    /// Forward proxy, e.g. `http://proxy.lab:3128`. `None` connects directly.
    pub proxy: Option<String>,
    pub timeout: Duration,
}

impl Default for TransportPolicy {
    fn default() -> Self {
        Self {
            verify_certs: false,
            proxy: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT),
        }
    }
}

/// Completed HTTP exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Endpoint that actually answered; differs from the requested one after a downgrade
    pub endpoint: Endpoint,
    pub status: u16,
    pub body: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Refused, reset, or TLS handshake failure
    Connect,
    Timeout,
    Other,
}

/// The exchange never completed, so there is no status code
#[derive(Debug, Clone)]
pub struct TransportError {
    endpoint: Endpoint,
    kind: FailureKind,
    message: String,
    attempts: u32,
}

impl TransportError {
    pub fn new<S: Into<String>>(endpoint: Endpoint, kind: FailureKind, message: S) -> Self {
        Self {
            endpoint,
            kind,
            message: message.into(),
            attempts: 1,
        }
    }

    fn from_reqwest(endpoint: &Endpoint, e: reqwest::Error) -> Self {
        let kind = if e.is_timeout() {
            FailureKind::Timeout
        } else if e.is_connect() {
            FailureKind::Connect
        } else {
            FailureKind::Other
        };

        // The login url carries the password
        let e = e.without_url();
        let mut message = e.to_string();
        let mut source = e.source();
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }

        Self::new(endpoint.clone(), kind, message)
    }

    /// Endpoint of the last attempt
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn kind(&self) -> FailureKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Number of sends made before giving up
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub(crate) fn after_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self
    }
}

impl Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} unreachable: {}", self.endpoint, self.message)?;
        if self.attempts > 1 {
            write!(f, " (after {} attempts)", self.attempts)?;
        }
        Ok(())
    }
}

impl StdError for TransportError {}

/// Sends one GET request to a handset
///
/// Implementations must not retry; see [`DowngradeRetrier`](super::DowngradeRetrier).
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(
        &self,
        endpoint: &Endpoint,
        query: &str,
        policy: &TransportPolicy,
    ) -> std::result::Result<Response, TransportError>;

    /// Reject unusable settings (e.g. a malformed proxy) before any request is made
    fn prepare(&self, _policy: &TransportPolicy) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(
        &self,
        endpoint: &Endpoint,
        query: &str,
        policy: &TransportPolicy,
    ) -> std::result::Result<Response, TransportError> {
        (**self).send(endpoint, query, policy).await
    }

    fn prepare(&self, policy: &TransportPolicy) -> Result<()> {
        (**self).prepare(policy)
    }
}

/// [`Transport`] over reqwest
///
/// One client is built and kept per distinct [`TransportPolicy`].
#[derive(Debug, Default)]
pub struct HttpTransport {
    clients: Mutex<HashMap<TransportPolicy, Client>>,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn client(&self, policy: &TransportPolicy) -> Result<Client> {
        let mut clients = self.clients.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(client) = clients.get(policy) {
            return Ok(client.clone());
        }

        let mut builder = Client::builder()
            .timeout(policy.timeout)
            .danger_accept_invalid_certs(!policy.verify_certs);
        builder = match &policy.proxy {
            Some(proxy) => builder.proxy(
                Proxy::all(proxy.as_str())
                    .map_err(|_| ClientError::InvalidProxy(proxy.clone()))?,
            ),
            None => builder.no_proxy(),
        };
        let client = builder.build()?;

        clients.insert(policy.clone(), client.clone());
        Ok(client)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        endpoint: &Endpoint,
        query: &str,
        policy: &TransportPolicy,
    ) -> std::result::Result<Response, TransportError> {
        let client = self
            .client(policy)
            .map_err(|e| TransportError::new(endpoint.clone(), FailureKind::Other, e.to_string()))?;

        log::debug!(target: "necsip::transport", "GET {}", endpoint);
        let res = client
            .get(endpoint.url(query))
            .send()
            .await
            .map_err(|e| TransportError::from_reqwest(endpoint, e))?;

        let status = res.status().as_u16();
        let body = res
            .text()
            .await
            .map_err(|e| TransportError::from_reqwest(endpoint, e))?;
        log::trace!(target: "necsip::transport", "{} answered {}: {}", endpoint, status, body);

        Ok(Response {
            endpoint: endpoint.clone(),
            status,
            body,
        })
    }

    fn prepare(&self, policy: &TransportPolicy) -> Result<()> {
        self.client(policy).map(|_| ())
    }
}
