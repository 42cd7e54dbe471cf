//! The dashboard controller: owns the caches, metric windows and API client,
//! and runs refresh cycles.
//!
//! All shared state lives here rather than in module globals; the controller
//! is handed to whoever needs it. Results are emitted as [`DashboardEvent`]s
//! on a channel so the rendering layer never talks to the network itself.

use color_eyre::Result;
use std::future::Future;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::api::types::{
  Deployment, HealthStatus, KubernetesInfo, PodLogs, PodSummary, ScanOutcome, ServiceInfo,
  SystemInfo,
};
use crate::api::ApiClient;
use crate::config::Config;
use crate::error::FetchError;
use crate::sync::{
  classify, CacheKey, DashboardCache, MetricSeries, PodStatusTally, SeriesKey, TimeSeriesPoint,
};

/// Severity of a user-facing notice, mirroring the toast levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
  Info,
  Success,
  Warning,
  Error,
}

/// Updates handed to the rendering layer.
#[derive(Debug, Clone)]
pub enum DashboardEvent {
  SystemInfo(SystemInfo),
  Namespaces(Vec<String>),
  KubernetesInfo(KubernetesInfo),
  PodStatuses {
    tally: PodStatusTally,
    pods: Vec<PodSummary>,
  },
  Notice {
    message: String,
    level: NoticeLevel,
  },
}

/// Where a dataset's value came from during a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
  /// Served from a still-fresh cache entry.
  CacheFresh,
  /// Fetched from the backend this cycle; the cache needs updating.
  Network,
}

#[derive(Debug)]
struct CycleFetch<T> {
  value: T,
  origin: Origin,
}

/// Cache-first fetch: a fresh cached value short-circuits the network call.
async fn fetch_if_missing<T, F, Fut>(
  cached: Option<T>,
  fetcher: F,
) -> Result<CycleFetch<T>, FetchError>
where
  F: FnOnce() -> Fut,
  Fut: Future<Output = Result<T, FetchError>>,
{
  match cached {
    Some(value) => Ok(CycleFetch {
      value,
      origin: Origin::CacheFresh,
    }),
    None => fetcher().await.map(|value| CycleFetch {
      value,
      origin: Origin::Network,
    }),
  }
}

/// Top-level dashboard state and refresh-cycle driver.
pub struct Dashboard {
  api: ApiClient,
  cache: DashboardCache,
  series: MetricSeries,
  namespace: String,
  event_tx: mpsc::UnboundedSender<DashboardEvent>,
}

impl Dashboard {
  /// Build the controller and the event stream the rendering layer drains.
  pub fn new(config: &Config) -> Result<(Self, mpsc::UnboundedReceiver<DashboardEvent>)> {
    let api = ApiClient::new(config)?;
    let (event_tx, event_rx) = mpsc::unbounded_channel();

    Ok((
      Self {
        api,
        cache: DashboardCache::new(),
        series: MetricSeries::new(config.series_capacity),
        namespace: config.namespace.clone(),
        event_tx,
      },
      event_rx,
    ))
  }

  /// Run one refresh cycle.
  ///
  /// Cache reads happen up front, so the whole cycle observes the cache as of
  /// its start. Missing datasets are fetched concurrently; each one fails or
  /// succeeds on its own, and a failure leaves the previous cache entry in
  /// place (stale data beats no data). Pod statuses are applied before the
  /// namespace list: they were fetched for the cycle's starting namespace,
  /// and applying namespaces may switch to a fallback, whose invalidation
  /// must also clear that write. Kubernetes info goes last for the same
  /// reason, fetched for whichever namespace the cycle settled on.
  pub async fn run_cycle(&mut self) {
    debug!(namespace = %self.namespace, "refresh cycle started");

    let cached_sys = self.cache.system_info().cloned();
    let cached_ns = self.cache.namespaces().cloned();
    let cached_pods = self.cache.pod_statuses().cloned();

    let (sys, namespaces, pods) = futures::join!(
      fetch_if_missing(cached_sys, || self.api.system_info()),
      fetch_if_missing(cached_ns, || self.api.namespaces()),
      fetch_if_missing(cached_pods, || self.api.pods(&self.namespace)),
    );

    self.apply_system_info(sys);
    self.apply_pod_statuses(pods);
    self.apply_namespaces(namespaces);

    self.refresh_kubernetes_info().await;
  }

  fn apply_system_info(&mut self, result: Result<CycleFetch<SystemInfo>, FetchError>) {
    match result {
      Ok(fetch) => {
        debug!(key = %CacheKey::SystemInfo, origin = ?fetch.origin, "dataset applied");
        if fetch.origin == Origin::Network {
          self.cache.set_system_info(fetch.value.clone());
        }
        self.series.record(&fetch.value);
        self.emit(DashboardEvent::SystemInfo(fetch.value));
      }
      Err(err) => self.notify(format!("Failed to fetch system metrics: {err}"), NoticeLevel::Error),
    }
  }

  fn apply_namespaces(&mut self, result: Result<CycleFetch<Vec<String>>, FetchError>) {
    match result {
      Ok(fetch) => {
        debug!(key = %CacheKey::Namespaces, origin = ?fetch.origin, "dataset applied");
        if fetch.origin == Origin::Network {
          self.cache.set_namespaces(fetch.value.clone());
        }
        if !fetch.value.iter().any(|ns| ns == &self.namespace) {
          let fallback = fetch
            .value
            .first()
            .cloned()
            .unwrap_or_else(|| "default".to_string());
          info!(from = %self.namespace, to = %fallback, "active namespace no longer listed, switching");
          self.namespace = fallback;
          self.cache.invalidate_namespace_scoped();
        }
        self.emit(DashboardEvent::Namespaces(fetch.value));
      }
      Err(err) => self.notify(format!("Failed to fetch namespaces: {err}"), NoticeLevel::Error),
    }
  }

  fn apply_pod_statuses(&mut self, result: Result<CycleFetch<Vec<PodSummary>>, FetchError>) {
    match result {
      Ok(fetch) => {
        debug!(key = %CacheKey::PodStatuses, origin = ?fetch.origin, "dataset applied");
        if fetch.origin == Origin::Network {
          self.cache.set_pod_statuses(fetch.value.clone());
        }
        let tally = classify(fetch.value.iter().map(|p| p.status.as_str()));
        self.emit(DashboardEvent::PodStatuses {
          tally,
          pods: fetch.value,
        });
      }
      Err(err) => self.notify(format!("Failed to fetch pod statuses: {err}"), NoticeLevel::Error),
    }
  }

  async fn refresh_kubernetes_info(&mut self) {
    let cached = self.cache.kubernetes_info().cloned();
    match fetch_if_missing(cached, || self.api.kubernetes_info(&self.namespace)).await {
      Ok(fetch) => {
        debug!(key = %CacheKey::KubernetesInfo, origin = ?fetch.origin, "dataset applied");
        if fetch.origin == Origin::Network {
          self.cache.set_kubernetes_info(fetch.value.clone());
        }
        self.emit(DashboardEvent::KubernetesInfo(fetch.value));
      }
      Err(err) => self.notify(
        format!("Failed to fetch info for namespace {}: {err}", self.namespace),
        NoticeLevel::Error,
      ),
    }
  }

  /// Switch the active namespace, dropping the cached datasets scoped to the
  /// old one. No-op when the namespace is unchanged.
  pub fn set_namespace(&mut self, namespace: impl Into<String>) {
    let namespace = namespace.into();
    if namespace == self.namespace {
      return;
    }
    self.namespace = namespace;
    self.cache.invalidate_namespace_scoped();
    self.notify(
      format!("Switched to namespace: {}", self.namespace),
      NoticeLevel::Info,
    );
  }

  pub fn namespace(&self) -> &str {
    &self.namespace
  }

  /// Read-only view of the cached datasets, for the rendering layer.
  pub fn cache(&self) -> &DashboardCache {
    &self.cache
  }

  /// The rolling window for one metric chart, oldest first.
  pub fn snapshot(&self, key: SeriesKey) -> Vec<TimeSeriesPoint> {
    self.series.snapshot(key)
  }

  // On-demand operations outside the cached refresh cycle. All go through
  // the same retrying fetcher.

  /// Last `tail_lines` log lines of a pod in the active namespace.
  pub async fn pod_logs(&self, pod_name: &str, tail_lines: u32) -> Result<PodLogs, FetchError> {
    let logs = self
      .api
      .pod_logs(&self.namespace, pod_name, tail_lines)
      .await?;
    if logs.error.is_none() {
      self.notify(
        format!("Logs fetched for pod: {pod_name}"),
        NoticeLevel::Success,
      );
    }
    Ok(logs)
  }

  pub async fn deployments(&self) -> Result<Vec<Deployment>, FetchError> {
    self.api.deployments(&self.namespace).await
  }

  pub async fn services(&self) -> Result<Vec<ServiceInfo>, FetchError> {
    self.api.services(&self.namespace).await
  }

  pub async fn health(&self) -> Result<HealthStatus, FetchError> {
    let health = self.api.health().await?;
    if !health.is_ok() {
      self.notify(
        format!("Cluster health check: {}", health.status),
        NoticeLevel::Warning,
      );
    }
    Ok(health)
  }

  pub async fn scan_image(&self, container_id: &str) -> Result<ScanOutcome, FetchError> {
    let outcome = self.api.scan_image(container_id).await?;
    match &outcome.error {
      Some(err) => self.notify(format!("Scan error: {err}"), NoticeLevel::Error),
      None => self.notify(
        format!("Scan completed for: {container_id}"),
        NoticeLevel::Success,
      ),
    }
    Ok(outcome)
  }

  fn emit(&self, event: DashboardEvent) {
    // A closed receiver means the front-end is gone; late results are
    // harmless and simply never rendered.
    let _ = self.event_tx.send(event);
  }

  fn notify(&self, message: String, level: NoticeLevel) {
    self.emit(DashboardEvent::Notice { message, level });
  }
}
