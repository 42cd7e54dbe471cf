//! HTTP client for the dashboard backend.
//!
//! Every endpoint goes through the same pipeline: request, status check,
//! JSON parse (all retried per [`RetryPolicy`]), then a typed conversion that
//! turns "valid JSON, wrong fields" into [`FetchError::InvalidShape`] without
//! burning retry attempts on it.

use color_eyre::{eyre::eyre, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::config::Config;
use crate::error::FetchError;
use crate::sync::{with_retry, RetryPolicy};

use super::types::{
  Deployment, HealthStatus, KubernetesInfo, PodLogs, PodSummary, ScanOutcome, ScanRequest,
  ServiceInfo, SystemInfo,
};

/// Dashboard API client wrapper.
#[derive(Clone)]
pub struct ApiClient {
  http: reqwest::Client,
  base_url: String,
  retry: RetryPolicy,
}

impl ApiClient {
  pub fn new(config: &Config) -> Result<Self> {
    let url = Url::parse(&config.api.base_url)
      .map_err(|e| eyre!("Invalid API base URL {}: {}", config.api.base_url, e))?;

    Ok(Self::with_base_url(
      url.as_str(),
      RetryPolicy {
        max_attempts: config.retry.max_attempts,
        base_delay: Duration::from_millis(config.retry.base_delay_ms),
      },
    ))
  }

  pub fn with_base_url(base_url: &str, retry: RetryPolicy) -> Self {
    Self {
      http: reqwest::Client::new(),
      base_url: base_url.trim_end_matches('/').to_string(),
      retry,
    }
  }

  /// Host and CPU/memory/disk metrics.
  pub async fn system_info(&self) -> Result<SystemInfo, FetchError> {
    self.get_json("/system_info", &[]).await
  }

  /// All namespace names known to the cluster.
  pub async fn namespaces(&self) -> Result<Vec<String>, FetchError> {
    self.get_json("/kubernetes_namespaces", &[]).await
  }

  /// Resource counts for one namespace.
  pub async fn kubernetes_info(&self, namespace: &str) -> Result<KubernetesInfo, FetchError> {
    self
      .get_json("/kubernetes_info", &[("namespace", namespace)])
      .await
  }

  /// Pods (name + raw status) in one namespace.
  pub async fn pods(&self, namespace: &str) -> Result<Vec<PodSummary>, FetchError> {
    self.get_json("/pods", &[("namespace", namespace)]).await
  }

  /// Tail of a pod's logs.
  pub async fn pod_logs(
    &self,
    namespace: &str,
    pod_name: &str,
    tail_lines: u32,
  ) -> Result<PodLogs, FetchError> {
    let tail = tail_lines.to_string();
    self
      .get_json(
        "/pod_logs",
        &[
          ("namespace", namespace),
          ("pod_name", pod_name),
          ("tail_lines", &tail),
        ],
      )
      .await
  }

  pub async fn deployments(&self, namespace: &str) -> Result<Vec<Deployment>, FetchError> {
    self
      .get_json("/kubernetes_deployments", &[("namespace", namespace)])
      .await
  }

  pub async fn services(&self, namespace: &str) -> Result<Vec<ServiceInfo>, FetchError> {
    self
      .get_json("/kubernetes_services", &[("namespace", namespace)])
      .await
  }

  pub async fn health(&self) -> Result<HealthStatus, FetchError> {
    self.get_json("/health", &[]).await
  }

  /// Trigger a vulnerability scan of a container image.
  pub async fn scan_image(&self, container_id: &str) -> Result<ScanOutcome, FetchError> {
    let body = ScanRequest {
      container_id: container_id.to_string(),
    };
    self.post_json("/scan_image", &body).await
  }

  async fn get_json<T: DeserializeOwned>(
    &self,
    path: &str,
    query: &[(&str, &str)],
  ) -> Result<T, FetchError> {
    let value = with_retry(self.retry, || self.get_value(path, query)).await?;
    serde_json::from_value(value).map_err(|e| FetchError::invalid_shape(path, e))
  }

  async fn post_json<B: Serialize, T: DeserializeOwned>(
    &self,
    path: &str,
    body: &B,
  ) -> Result<T, FetchError> {
    let value = with_retry(self.retry, || {
      Self::execute(self.http.post(self.endpoint(path)).json(body))
    })
    .await?;
    serde_json::from_value(value).map_err(|e| FetchError::invalid_shape(path, e))
  }

  async fn get_value(&self, path: &str, query: &[(&str, &str)]) -> Result<Value, FetchError> {
    Self::execute(self.http.get(self.endpoint(path)).query(query)).await
  }

  /// Single attempt: send, check status, parse. Any failure here is
  /// retryable; shape checking happens after the retry loop.
  async fn execute(request: reqwest::RequestBuilder) -> Result<Value, FetchError> {
    let response = request.send().await?;
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
      return Err(FetchError::Http { status, body });
    }

    debug!(%status, bytes = body.len(), "response received");
    Ok(serde_json::from_str(&body)?)
  }

  fn endpoint(&self, path: &str) -> String {
    format!("{}{}", self.base_url, path)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tokio::io::{AsyncReadExt, AsyncWriteExt};
  use tokio::net::TcpListener;

  /// Serve one canned HTTP response per expected connection, in order.
  async fn serve(responses: Vec<(u16, &'static str)>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
      for (status, body) in responses {
        let Ok((mut socket, _)) = listener.accept().await else {
          return;
        };
        let mut buf = [0u8; 2048];
        let _ = socket.read(&mut buf).await;
        let reason = if status == 200 { "OK" } else { "Error" };
        let response = format!(
          "HTTP/1.1 {status} {reason}\r\n\
           content-type: application/json\r\n\
           content-length: {}\r\n\
           connection: close\r\n\r\n{body}",
          body.len()
        );
        let _ = socket.write_all(response.as_bytes()).await;
      }
    });

    format!("http://{addr}")
  }

  fn fast_retry() -> RetryPolicy {
    RetryPolicy {
      max_attempts: 3,
      base_delay: Duration::from_millis(5),
    }
  }

  #[tokio::test]
  async fn fetches_and_decodes_system_info() {
    let base = serve(vec![(
      200,
      r#"{"cpu_percent": 12.0, "memory_usage": {"percent": 34.0}, "disk_usage": {"percent": 56.0}}"#,
    )])
    .await;
    let client = ApiClient::with_base_url(&base, fast_retry());

    let info = client.system_info().await.unwrap();
    assert_eq!(info.cpu_percent, 12.0);
    assert_eq!(info.disk_usage.percent, 56.0);
  }

  #[tokio::test]
  async fn retries_through_server_errors() {
    let base = serve(vec![
      (500, "oops"),
      (503, "still warming up"),
      (200, r#"[{"name": "web-0", "status": "Running"}]"#),
    ])
    .await;
    let client = ApiClient::with_base_url(&base, fast_retry());

    let pods = client.pods("default").await.unwrap();
    assert_eq!(pods.len(), 1);
    assert_eq!(pods[0].name, "web-0");
  }

  #[tokio::test]
  async fn malformed_body_is_retried_like_any_failure() {
    let base = serve(vec![(200, "{truncated"), (200, r#"["default", "kube-system"]"#)]).await;
    let client = ApiClient::with_base_url(&base, fast_retry());

    let namespaces = client.namespaces().await.unwrap();
    assert_eq!(namespaces, vec!["default", "kube-system"]);
  }

  #[tokio::test]
  async fn exhaustion_reports_attempts_and_last_error() {
    let base = serve(vec![(500, "a"), (500, "b"), (500, "final straw")]).await;
    let client = ApiClient::with_base_url(&base, fast_retry());

    match client.namespaces().await.unwrap_err() {
      FetchError::ExhaustedRetries { attempts, last } => {
        assert_eq!(attempts, 3);
        assert!(last.to_string().contains("final straw"));
      }
      other => panic!("expected ExhaustedRetries, got {other}"),
    }
  }

  #[tokio::test]
  async fn wrong_shape_surfaces_without_retry() {
    // One response only: a shape failure must not consume further attempts.
    let base = serve(vec![(200, "[1, 2, 3]")]).await;
    let client = ApiClient::with_base_url(&base, fast_retry());

    let err = client.namespaces().await.unwrap_err();
    assert!(matches!(err, FetchError::InvalidShape { .. }));
  }

  #[tokio::test]
  async fn scan_image_posts_and_decodes_outcome() {
    let base = serve(vec![(200, r#"{"scan_results": {"vulnerabilities": []}}"#)]).await;
    let client = ApiClient::with_base_url(&base, fast_retry());

    let outcome = client.scan_image("nginx:latest").await.unwrap();
    assert!(outcome.error.is_none());
    assert!(outcome.scan_results.is_some());
  }
}
