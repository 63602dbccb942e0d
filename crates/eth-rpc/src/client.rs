use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::RpcError;
use crate::models::{RpcRequest, RpcResponse};

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Longest response body echoed back in an HTTP status error.
const MAX_ERROR_BODY: usize = 256;

/// JSON-RPC client for a single Ethereum endpoint.
#[derive(Debug, Clone)]
pub struct RpcClient {
    http: reqwest::Client,
    endpoint: Url,
    timeout: Duration,
    next_id: Arc<AtomicU64>,
}

/// Builder for [`RpcClient`].
#[derive(Debug, Clone)]
pub struct RpcClientBuilder {
    endpoint: String,
    timeout: Duration,
}

impl RpcClientBuilder {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Validates the endpoint and builds the HTTP client.
    pub fn build(self) -> Result<RpcClient, RpcError> {
        let endpoint = Url::parse(&self.endpoint)
            .map_err(|e| RpcError::InvalidUrl(format!("{}: {e}", self.endpoint)))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(RpcError::InvalidUrl(format!(
                "{}: unsupported scheme `{}`",
                self.endpoint,
                endpoint.scheme()
            )));
        }

        let http = reqwest::Client::builder().timeout(self.timeout).build()?;

        Ok(RpcClient {
            http,
            endpoint,
            timeout: self.timeout,
            next_id: Arc::new(AtomicU64::new(1)),
        })
    }
}

impl RpcClient {
    /// Creates a configurable builder for the RPC client.
    #[must_use]
    pub fn builder(endpoint: impl Into<String>) -> RpcClientBuilder {
        RpcClientBuilder::new(endpoint)
    }

    /// Creates a client with the default timeout.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, RpcError> {
        RpcClientBuilder::new(endpoint).build()
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Sends one JSON-RPC call and deserializes its `result`.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<T, RpcError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = RpcRequest::new(id, method, params);
        let start = Instant::now();

        debug!(method, id, "sending rpc request");

        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        debug!(
            method,
            id,
            status = status.as_u16(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "rpc response received"
        );

        if !status.is_success() {
            let mut body = body;
            if body.len() > MAX_ERROR_BODY {
                let mut end = MAX_ERROR_BODY;
                while !body.is_char_boundary(end) {
                    end -= 1;
                }
                body.truncate(end);
            }
            return Err(RpcError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        let response: RpcResponse<Value> = serde_json::from_str(&body)
            .map_err(|e| RpcError::MalformedResponse(format!("{method}: {e}")))?;

        if let Some(error) = response.error {
            debug!(method, id, code = error.code, message = %error.message, "rpc error");
            return Err(error.into());
        }

        let result = response
            .result
            .ok_or_else(|| RpcError::MissingResult(method.to_string()))?;

        serde_json::from_value(result)
            .map_err(|e| RpcError::MalformedResponse(format!("{method}: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    #[test]
    fn builder_rejects_invalid_urls() {
        assert!(matches!(
            RpcClient::new("not a url"),
            Err(RpcError::InvalidUrl(_))
        ));
        assert!(matches!(
            RpcClient::new("ftp://example.com"),
            Err(RpcError::InvalidUrl(_))
        ));
    }

    #[test]
    fn builder_applies_timeout() {
        let client = RpcClient::builder("http://localhost:8545")
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();
        assert_eq!(client.timeout(), Duration::from_secs(5));

        let default = RpcClient::new("https://localhost:8545").unwrap();
        assert_eq!(default.timeout(), DEFAULT_TIMEOUT);
    }

    #[tokio::test]
    async fn request_returns_result() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .match_body(Matcher::PartialJson(json!({
                "jsonrpc": "2.0",
                "method": "web3_clientVersion",
                "params": []
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"jsonrpc":"2.0","id":1,"result":"Geth/v1.10.0"}"#)
            .expect(1)
            .create_async()
            .await;

        let client = RpcClient::new(server.url()).unwrap();
        let version: String = client.request("web3_clientVersion", json!([])).await.unwrap();

        assert_eq!(version, "Geth/v1.10.0");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn request_ids_increase() {
        let mut server = Server::new_async().await;
        let first = server
            .mock("POST", "/")
            .match_body(Matcher::PartialJson(json!({"id": 1})))
            .with_body(r#"{"jsonrpc":"2.0","id":1,"result":"0x1"}"#)
            .create_async()
            .await;
        let second = server
            .mock("POST", "/")
            .match_body(Matcher::PartialJson(json!({"id": 2})))
            .with_body(r#"{"jsonrpc":"2.0","id":2,"result":"0x2"}"#)
            .create_async()
            .await;

        let client = RpcClient::new(server.url()).unwrap();
        let a: String = client.request("eth_blockNumber", json!([])).await.unwrap();
        let b: String = client.request("eth_blockNumber", json!([])).await.unwrap();

        assert_eq!((a.as_str(), b.as_str()), ("0x1", "0x2"));
        first.assert_async().await;
        second.assert_async().await;
    }

    #[tokio::test]
    async fn node_error_maps_to_rpc_error() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/")
            .with_body(
                r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32000,"message":"nonce too low"}}"#,
            )
            .create_async()
            .await;

        let client = RpcClient::new(server.url()).unwrap();
        let err = client
            .request::<String>("eth_sendRawTransaction", json!(["0x00"]))
            .await
            .unwrap_err();

        match err {
            RpcError::Node { code, message } => {
                assert_eq!(code, -32000);
                assert_eq!(message, "nonce too low");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn http_status_is_an_error() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/")
            .with_status(503)
            .with_body("service unavailable")
            .create_async()
            .await;

        let client = RpcClient::new(server.url()).unwrap();
        let err = client
            .request::<String>("eth_gasPrice", json!([]))
            .await
            .unwrap_err();

        assert!(matches!(err, RpcError::HttpStatus { status: 503, .. }));
    }

    #[tokio::test]
    async fn missing_result_is_an_error() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/")
            .with_body(r#"{"jsonrpc":"2.0","id":1,"result":null}"#)
            .create_async()
            .await;

        let client = RpcClient::new(server.url()).unwrap();
        let err = client
            .request::<String>("eth_gasPrice", json!([]))
            .await
            .unwrap_err();

        assert!(matches!(err, RpcError::MissingResult(m) if m == "eth_gasPrice"));
    }

    #[tokio::test]
    async fn malformed_body_is_an_error() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/")
            .with_body("<html>not json</html>")
            .create_async()
            .await;

        let client = RpcClient::new(server.url()).unwrap();
        let err = client
            .request::<String>("eth_gasPrice", json!([]))
            .await
            .unwrap_err();

        assert!(matches!(err, RpcError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn result_of_wrong_type_is_malformed() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/")
            .with_body(r#"{"jsonrpc":"2.0","id":1,"result":{"unexpected":true}}"#)
            .create_async()
            .await;

        let client = RpcClient::new(server.url()).unwrap();
        let err = client
            .request::<String>("eth_gasPrice", json!([]))
            .await
            .unwrap_err();

        assert!(matches!(err, RpcError::MalformedResponse(_)));
    }
}
