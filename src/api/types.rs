//! Serde-deserializable types matching the dashboard API responses.
//!
//! Unknown fields are ignored everywhere so the client keeps working when the
//! backend grows its payloads.

use serde::{Deserialize, Serialize};

/// Response from `GET /system_info`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SystemInfo {
  pub cpu_percent: f64,
  pub memory_usage: UsageStats,
  pub disk_usage: UsageStats,
}

/// Percentage-based usage block nested inside `SystemInfo`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UsageStats {
  pub percent: f64,
}

/// One pod from `GET /pods?namespace=`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PodSummary {
  pub name: String,
  pub status: String,
}

/// Per-namespace resource counts from `GET /kubernetes_info?namespace=`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct KubernetesInfo {
  pub num_deployments: u64,
  pub num_pods: u64,
  pub num_services: u64,
}

/// One deployment from `GET /kubernetes_deployments?namespace=`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Deployment {
  pub name: String,
  pub replicas: u32,
  #[serde(default)]
  pub ready_replicas: u32,
  pub strategy: String,
}

impl Deployment {
  /// A deployment is ready when every desired replica is ready.
  pub fn is_ready(&self) -> bool {
    self.ready_replicas == self.replicas
  }
}

/// One service from `GET /kubernetes_services?namespace=`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ServiceInfo {
  pub name: String,
  #[serde(rename = "type")]
  pub service_type: String,
  pub cluster_ip: String,
  #[serde(default)]
  pub ports: Vec<ServicePort>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ServicePort {
  pub port: u16,
  pub protocol: String,
}

/// Response from `GET /pod_logs?...`. The backend returns either a `logs`
/// array or an `error` string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PodLogs {
  #[serde(default)]
  pub logs: Vec<String>,
  pub error: Option<String>,
}

/// Response from `GET /health`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HealthStatus {
  pub status: String,
}

impl HealthStatus {
  pub fn is_ok(&self) -> bool {
    self.status == "ok"
  }
}

/// Request body for `POST /scan_image`.
#[derive(Debug, Clone, Serialize)]
pub struct ScanRequest {
  pub container_id: String,
}

/// Response from `POST /scan_image`. Raw scanner output is kept as JSON; the
/// result-formatting layer owns its interpretation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScanOutcome {
  pub scan_results: Option<serde_json::Value>,
  pub error: Option<String>,
}
