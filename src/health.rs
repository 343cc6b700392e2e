// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Liveness probe for the running application.
//!
//! Streamlit answers `GET /_stcore/health` with `200 ok` once the server is
//! up. The container `HEALTHCHECK` runs `lca-entrypoint healthcheck`, which
//! calls that endpoint on the loopback interface.

use std::time::Duration;

use url::Url;

use crate::config::RuntimeConfig;

/// Errors that prevent the probe from producing a status.
#[derive(Debug, thiserror::Error)]
pub enum HealthError {
    #[error("invalid health URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("health request failed: {0}")]
    Request(#[source] reqwest::Error),
}

/// Outcome of a probe that reached the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthStatus {
    Healthy,
    /// The server answered with a non-success status code.
    Unhealthy(u16),
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Healthy)
    }
}

/// HTTP probe against a fixed health URL.
#[derive(Debug, Clone)]
pub struct HealthProbe {
    url: Url,
    client: reqwest::Client,
}

impl HealthProbe {
    /// Create a probe for `url` with a request timeout.
    pub fn new(url: Url, timeout: Duration) -> Result<Self, HealthError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(HealthError::Client)?;
        Ok(Self { url, client })
    }

    /// Probe the application described by `config` on the loopback address.
    pub fn for_config(config: &RuntimeConfig) -> Result<Self, HealthError> {
        let url = Url::parse(&format!("http://127.0.0.1:{}", config.port))?
            .join(&config.health_path)?;
        Self::new(url, config.health_timeout)
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Issue one GET request.
    pub async fn check(&self) -> Result<HealthStatus, HealthError> {
        let response = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .map_err(HealthError::Request)?;

        let status = response.status();
        if status.is_success() {
            Ok(HealthStatus::Healthy)
        } else {
            Ok(HealthStatus::Unhealthy(status.as_u16()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::get, Router};
    use std::net::SocketAddr;

    async fn serve(router: Router) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        addr
    }

    fn config_for(addr: SocketAddr) -> RuntimeConfig {
        RuntimeConfig {
            port: addr.port(),
            health_timeout: Duration::from_secs(2),
            ..RuntimeConfig::default()
        }
    }

    #[test]
    fn url_targets_loopback_health_path() {
        let probe = HealthProbe::for_config(&RuntimeConfig::default()).unwrap();
        assert_eq!(probe.url().as_str(), "http://127.0.0.1:8501/_stcore/health");
    }

    #[test]
    fn configured_path_stays_on_loopback() {
        let config = RuntimeConfig::from_lookup(|name| {
            (name == "HEALTH_PATH").then(|| "//other-host/x".to_string())
        })
        .unwrap();
        let probe = HealthProbe::for_config(&config).unwrap();

        assert_eq!(probe.url().host_str(), Some("127.0.0.1"));
        assert_eq!(probe.url().as_str(), "http://127.0.0.1:8501/other-host/x");
    }

    #[tokio::test]
    async fn ok_response_is_healthy() {
        let addr = serve(Router::new().route("/_stcore/health", get(|| async { "ok" }))).await;
        let probe = HealthProbe::for_config(&config_for(addr)).unwrap();

        assert_eq!(probe.check().await.unwrap(), HealthStatus::Healthy);
    }

    #[tokio::test]
    async fn error_status_is_unhealthy() {
        let addr = serve(Router::new().route(
            "/_stcore/health",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "starting") }),
        ))
        .await;
        let probe = HealthProbe::for_config(&config_for(addr)).unwrap();

        let status = probe.check().await.unwrap();
        assert_eq!(status, HealthStatus::Unhealthy(503));
        assert!(!status.is_healthy());
    }

    #[tokio::test]
    async fn wrong_path_is_unhealthy() {
        let addr = serve(Router::new().route("/other", get(|| async { "ok" }))).await;
        let probe = HealthProbe::for_config(&config_for(addr)).unwrap();

        assert_eq!(probe.check().await.unwrap(), HealthStatus::Unhealthy(404));
    }

    #[tokio::test]
    async fn nothing_listening_is_an_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let probe = HealthProbe::for_config(&config_for(addr)).unwrap();
        assert!(matches!(probe.check().await, Err(HealthError::Request(_))));
    }
}
