use super::endpoint::Endpoint;
use super::error::Result;
use super::transport::{Response, Transport, TransportError, TransportPolicy};

use async_trait::async_trait;

/// Falls back from `https` to `http` when a handset's TLS stack rejects the client
///
/// Wraps another [`Transport`]. When a send fails to complete (no status code at
/// all) and downgrading is allowed, the same query is sent once more to the same
/// host over plain http and that result is final. HTTP error statuses are never
/// retried. The fallback applies to the failing call only; the next call starts
/// over on the caller's endpoint.
#[derive(Debug, Clone)]
pub struct DowngradeRetrier<T> {
    inner: T,
    allow_downgrade: bool,
}

impl<T: Transport> DowngradeRetrier<T> {
    /// Secure transport only until [`allow_downgrade`](Self::allow_downgrade) is set
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            allow_downgrade: false,
        }
    }

    pub fn allow_downgrade(mut self, allow: bool) -> Self {
        self.allow_downgrade = allow;
        self
    }

    pub fn allows_downgrade(&self) -> bool {
        self.allow_downgrade
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }
}

#[async_trait]
impl<T: Transport> Transport for DowngradeRetrier<T> {
    async fn send(
        &self,
        endpoint: &Endpoint,
        query: &str,
        policy: &TransportPolicy,
    ) -> std::result::Result<Response, TransportError> {
        let err = match self.inner.send(endpoint, query, policy).await {
            Ok(res) => return Ok(res),
            Err(err) => err,
        };

        match endpoint.downgraded() {
            Some(fallback) if self.allow_downgrade => {
                log::warn!(
                    target: "necsip::retry",
                    "{}, degrading protocol to {}",
                    err,
                    fallback
                );
                self.inner
                    .send(&fallback, query, policy)
                    .await
                    .map_err(|e| e.after_attempts(2))
            }
            _ => Err(err),
        }
    }

    fn prepare(&self, policy: &TransportPolicy) -> Result<()> {
        self.inner.prepare(policy)
    }
}
