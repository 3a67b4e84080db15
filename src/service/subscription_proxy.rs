//! Subscription creation proxy.
//!
//! Forwards a JSON body verbatim to the upstream subscription endpoint and
//! hands back whatever status and JSON body the upstream answered with.

use std::time::Duration;

use crate::error::GatewayError;

/// Upstream answer, passed through unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamReply {
    /// HTTP status code returned by the upstream.
    pub status: u16,
    /// JSON body returned by the upstream.
    pub body: serde_json::Value,
}

/// HTTP client bound to the upstream subscription endpoint.
#[derive(Debug, Clone)]
pub struct SubscriptionProxy {
    client: reqwest::Client,
    upstream_url: String,
}

impl SubscriptionProxy {
    /// Creates a proxy for `upstream_url`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Internal`] if the HTTP client cannot be built.
    pub fn new(upstream_url: impl Into<String>, timeout: Duration) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Internal(format!("http client: {e}")))?;
        Ok(Self {
            client,
            upstream_url: upstream_url.into(),
        })
    }

    /// Upstream endpoint.
    #[must_use]
    pub fn upstream_url(&self) -> &str {
        &self.upstream_url
    }

    /// POSTs `body` to the upstream.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Upstream`] if the request fails in transport
    /// or the upstream body is not JSON.
    pub async fn forward(&self, body: &serde_json::Value) -> Result<UpstreamReply, GatewayError> {
        let response = self
            .client
            .post(&self.upstream_url)
            .json(body)
            .send()
            .await
            .map_err(|e| GatewayError::Upstream(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| GatewayError::Upstream(format!("non-JSON upstream body: {e}")))?;

        tracing::debug!(status, upstream = %self.upstream_url, "subscription forwarded");
        Ok(UpstreamReply { status, body })
    }
}
