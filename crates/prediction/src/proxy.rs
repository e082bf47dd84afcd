//! Reverse proxy to the prediction service.
//!
//! Browsers on the ward dashboard cannot call the prediction service directly because it does
//! not send CORS headers. Requests under the proxy prefix are instead sent to this server and
//! forwarded: `{prefix}/rest?query` becomes `{upstream}/rest?query`. Method, body and
//! end-to-end headers pass through unchanged in both directions.

use crate::{PredictionError, PredictionResult};
use bytes::Bytes;
use puw_core::CoreConfig;
use reqwest::header::{HeaderMap, HeaderName};
use reqwest::{Method, StatusCode};
use std::time::Duration;

/// Headers that describe a single connection and must not be forwarded.
const HOP_BY_HOP_HEADERS: [&str; 10] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
    "host",
    "content-length",
];

fn is_hop_by_hop(name: &HeaderName) -> bool {
    HOP_BY_HOP_HEADERS.contains(&name.as_str())
}

fn end_to_end(headers: &HeaderMap) -> HeaderMap {
    headers
        .iter()
        .filter(|(name, _)| !is_hop_by_hop(name))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}

/// Upstream answer, ready to be relayed to the client.
#[derive(Debug)]
pub struct ProxiedResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

#[derive(Clone, Debug)]
pub struct ReverseProxy {
    client: reqwest::Client,
    upstream: String,
    prefix: String,
    timeout: Duration,
}

impl ReverseProxy {
    pub fn new(upstream: &str, prefix: &str, timeout: Duration) -> PredictionResult<Self> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self {
            client,
            upstream: upstream.trim_end_matches('/').to_string(),
            prefix: prefix.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn from_config(cfg: &CoreConfig) -> PredictionResult<Self> {
        Self::new(
            cfg.prediction_url(),
            cfg.proxy_prefix(),
            cfg.prediction_timeout(),
        )
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Maps a request path under the prefix to the upstream URL.
    ///
    /// # Errors
    ///
    /// Returns [`PredictionError::InvalidUrl`] if `path` is outside the prefix or contains a
    /// `..` segment.
    pub fn upstream_url(&self, path: &str, query: Option<&str>) -> PredictionResult<String> {
        let rest = path
            .strip_prefix(&self.prefix)
            .filter(|rest| rest.is_empty() || rest.starts_with('/'))
            .ok_or_else(|| {
                PredictionError::InvalidUrl(format!(
                    "path '{}' is not under proxy prefix '{}'",
                    path, self.prefix
                ))
            })?;

        if rest.split('/').any(|segment| segment == "..") {
            return Err(PredictionError::InvalidUrl(format!(
                "path '{}' contains a parent-directory segment",
                path
            )));
        }

        let rest = if rest.is_empty() { "/" } else { rest };
        Ok(match query.filter(|q| !q.is_empty()) {
            Some(q) => format!("{}{}?{}", self.upstream, rest, q),
            None => format!("{}{}", self.upstream, rest),
        })
    }

    /// Forwards one request and collects the upstream response.
    ///
    /// # Errors
    ///
    /// - [`PredictionError::InvalidUrl`] for paths outside the prefix
    /// - [`PredictionError::Timeout`] if the upstream does not answer in time
    /// - [`PredictionError::Http`] for connection or body errors
    pub async fn forward(
        &self,
        method: Method,
        path: &str,
        query: Option<&str>,
        headers: &HeaderMap,
        body: Bytes,
    ) -> PredictionResult<ProxiedResponse> {
        let url = self.upstream_url(path, query)?;
        tracing::debug!(%method, %url, "proxying request");

        let request = self
            .client
            .request(method, &url)
            .headers(end_to_end(headers))
            .body(body);

        let exchange = async {
            let response = request.send().await?;
            let status = response.status();
            let headers = end_to_end(response.headers());
            let body = response.bytes().await?;
            Ok::<_, PredictionError>(ProxiedResponse {
                status,
                headers,
                body,
            })
        };

        tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| PredictionError::Timeout(self.timeout))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::tests::spawn_upstream;
    use axum::{
        body::Bytes as AxumBytes,
        extract::{Query, Request},
        routing::{any, get},
        Router,
    };
    use std::collections::HashMap;

    fn proxy_for(upstream: &str) -> ReverseProxy {
        ReverseProxy::new(upstream, "/api/ai", Duration::from_secs(2)).unwrap()
    }

    #[test]
    fn test_upstream_url_strips_prefix() {
        let proxy = proxy_for("http://predictor:8000/");

        assert_eq!(
            proxy.upstream_url("/api/ai/predict/abc", None).unwrap(),
            "http://predictor:8000/predict/abc"
        );
        assert_eq!(
            proxy.upstream_url("/api/ai/predict", Some("lang=ko")).unwrap(),
            "http://predictor:8000/predict?lang=ko"
        );
        assert_eq!(
            proxy.upstream_url("/api/ai", Some("")).unwrap(),
            "http://predictor:8000/"
        );
    }

    #[test]
    fn test_upstream_url_rejects_paths_outside_prefix() {
        let proxy = proxy_for("http://predictor:8000");

        assert!(proxy.upstream_url("/api/aix/predict", None).is_err());
        assert!(proxy.upstream_url("/patients", None).is_err());
        assert!(proxy.upstream_url("/api/ai/../admin", None).is_err());
    }

    #[test]
    fn test_hop_by_hop_headers_are_dropped() {
        let mut headers = HeaderMap::new();
        headers.insert("connection", "keep-alive".parse().unwrap());
        headers.insert("host", "localhost:3000".parse().unwrap());
        headers.insert("x-request-id", "42".parse().unwrap());
        headers.insert("content-type", "application/json".parse().unwrap());

        let forwarded = end_to_end(&headers);
        assert!(forwarded.get("connection").is_none());
        assert!(forwarded.get("host").is_none());
        assert_eq!(forwarded.get("x-request-id").unwrap(), "42");
        assert_eq!(forwarded.get("content-type").unwrap(), "application/json");
    }

    #[tokio::test]
    async fn test_forward_relays_method_body_query_and_status() {
        let upstream = Router::new()
            .route(
                "/echo",
                any(|req: Request| async move {
                    let method = req.method().to_string();
                    let marker = req
                        .headers()
                        .get("x-ward")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("")
                        .to_string();
                    let body = axum::body::to_bytes(req.into_body(), 1024).await.unwrap();
                    (
                        axum::http::StatusCode::CREATED,
                        [("x-upstream", "yes")],
                        format!("{} {} {}", method, marker, String::from_utf8_lossy(&body)),
                    )
                }),
            )
            .route(
                "/query",
                get(|Query(q): Query<HashMap<String, String>>| async move {
                    q.get("lang").cloned().unwrap_or_default()
                }),
            );
        let addr = spawn_upstream(upstream).await;
        let proxy = proxy_for(&format!("http://{}", addr));

        let mut headers = HeaderMap::new();
        headers.insert("x-ward", "3B".parse().unwrap());
        let response = proxy
            .forward(
                Method::POST,
                "/api/ai/echo",
                None,
                &headers,
                Bytes::from_static(b"ping"),
            )
            .await
            .expect("forward should succeed");

        assert_eq!(response.status, StatusCode::CREATED);
        assert_eq!(response.headers.get("x-upstream").unwrap(), "yes");
        assert_eq!(response.body, AxumBytes::from_static(b"POST 3B ping"));

        let response = proxy
            .forward(
                Method::GET,
                "/api/ai/query",
                Some("lang=ko"),
                &HeaderMap::new(),
                Bytes::new(),
            )
            .await
            .unwrap();
        assert_eq!(response.body, Bytes::from_static(b"ko"));
    }

    #[tokio::test]
    async fn test_forward_to_unreachable_upstream_fails() {
        let proxy = proxy_for("http://127.0.0.1:9");
        let result = proxy
            .forward(
                Method::GET,
                "/api/ai/predict/x",
                None,
                &HeaderMap::new(),
                Bytes::new(),
            )
            .await;
        assert!(matches!(result, Err(PredictionError::Http(_))));
    }
}
