//! TTL caching for short-lived API responses.
//!
//! Each dataset gets its own slot with an independent expiry; a slot answers
//! "is this still fresh?" and nothing more. There is no eviction beyond
//! natural expiry and entries persist until overwritten, so a failed refresh
//! keeps serving the previous value for as long as it stays fresh.

use std::fmt;
use std::time::Duration;
use tokio::time::Instant;

use crate::api::types::{KubernetesInfo, PodSummary, SystemInfo};

/// Logical dataset names. The set is closed: keys are not arbitrary strings,
/// and each carries its own validity duration fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
  SystemInfo,
  Namespaces,
  KubernetesInfo,
  PodStatuses,
}

impl CacheKey {
  /// How long a cached value for this dataset stays fresh.
  pub fn ttl(self) -> Duration {
    match self {
      CacheKey::SystemInfo => Duration::from_secs(5),
      CacheKey::Namespaces => Duration::from_secs(30),
      CacheKey::KubernetesInfo => Duration::from_secs(10),
      CacheKey::PodStatuses => Duration::from_secs(10),
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      CacheKey::SystemInfo => "system_info",
      CacheKey::Namespaces => "namespaces",
      CacheKey::KubernetesInfo => "kubernetes_info",
      CacheKey::PodStatuses => "pod_statuses",
    }
  }
}

impl fmt::Display for CacheKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// A cached value plus the moment it was fetched. Always replaced as a whole,
/// never partially updated.
#[derive(Debug, Clone)]
struct CacheEntry<T> {
  value: T,
  fetched_at: Instant,
}

/// Single-slot cache with a fixed TTL.
///
/// `get` returns the value only while `now - fetched_at < ttl`; an expired or
/// never-set slot reads as absent, not as an error, and the caller refetches.
#[derive(Debug, Clone)]
pub struct TtlCache<T> {
  entry: Option<CacheEntry<T>>,
  ttl: Duration,
}

impl<T> TtlCache<T> {
  pub fn new(ttl: Duration) -> Self {
    Self { entry: None, ttl }
  }

  /// The value, if still fresh.
  pub fn get(&self) -> Option<&T> {
    self
      .entry
      .as_ref()
      .filter(|e| e.fetched_at.elapsed() < self.ttl)
      .map(|e| &e.value)
  }

  /// Store a value, resetting `fetched_at` to now. Always succeeds;
  /// last writer wins.
  pub fn set(&mut self, value: T) {
    self.entry = Some(CacheEntry {
      value,
      fetched_at: Instant::now(),
    });
  }

  pub fn clear(&mut self) {
    self.entry = None;
  }

  #[allow(dead_code)]
  pub fn ttl(&self) -> Duration {
    self.ttl
  }
}

/// All cached datasets for one dashboard, one typed slot per [`CacheKey`].
///
/// Owned exclusively by the refresh cycle, so no locking: reads and writes
/// run to completion between suspension points.
#[derive(Debug)]
pub struct DashboardCache {
  system_info: TtlCache<SystemInfo>,
  namespaces: TtlCache<Vec<String>>,
  kubernetes_info: TtlCache<KubernetesInfo>,
  pod_statuses: TtlCache<Vec<PodSummary>>,
}

impl DashboardCache {
  pub fn new() -> Self {
    Self {
      system_info: TtlCache::new(CacheKey::SystemInfo.ttl()),
      namespaces: TtlCache::new(CacheKey::Namespaces.ttl()),
      kubernetes_info: TtlCache::new(CacheKey::KubernetesInfo.ttl()),
      pod_statuses: TtlCache::new(CacheKey::PodStatuses.ttl()),
    }
  }

  pub fn system_info(&self) -> Option<&SystemInfo> {
    self.system_info.get()
  }

  pub fn set_system_info(&mut self, info: SystemInfo) {
    self.system_info.set(info);
  }

  pub fn namespaces(&self) -> Option<&Vec<String>> {
    self.namespaces.get()
  }

  pub fn set_namespaces(&mut self, namespaces: Vec<String>) {
    self.namespaces.set(namespaces);
  }

  pub fn kubernetes_info(&self) -> Option<&KubernetesInfo> {
    self.kubernetes_info.get()
  }

  pub fn set_kubernetes_info(&mut self, info: KubernetesInfo) {
    self.kubernetes_info.set(info);
  }

  pub fn pod_statuses(&self) -> Option<&Vec<PodSummary>> {
    self.pod_statuses.get()
  }

  pub fn set_pod_statuses(&mut self, pods: Vec<PodSummary>) {
    self.pod_statuses.set(pods);
  }

  /// Drop the datasets scoped to a namespace. Called on namespace switch so
  /// the new namespace never sees the old one's counts.
  pub fn invalidate_namespace_scoped(&mut self) {
    self.kubernetes_info.clear();
    self.pod_statuses.clear();
  }
}

impl Default for DashboardCache {
  fn default() -> Self {
    Self::new()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tokio::time::advance;

  #[tokio::test(start_paused = true)]
  async fn absent_until_set_then_fresh_until_ttl() {
    let mut cache: TtlCache<u32> = TtlCache::new(Duration::from_secs(5));
    assert_eq!(cache.get(), None);

    cache.set(7);
    assert_eq!(cache.get(), Some(&7));

    advance(Duration::from_millis(4_999)).await;
    assert_eq!(cache.get(), Some(&7));

    // Exactly at the TTL boundary the entry is stale.
    advance(Duration::from_millis(1)).await;
    assert_eq!(cache.get(), None);
  }

  #[tokio::test(start_paused = true)]
  async fn set_resets_fetched_at() {
    let mut cache: TtlCache<&str> = TtlCache::new(Duration::from_secs(5));
    cache.set("old");
    advance(Duration::from_secs(4)).await;

    cache.set("new");
    advance(Duration::from_secs(4)).await;
    assert_eq!(cache.get(), Some(&"new"));
  }

  #[tokio::test(start_paused = true)]
  async fn dashboard_cache_uses_per_key_ttls() {
    let mut cache = DashboardCache::new();
    cache.set_system_info(SystemInfo {
      cpu_percent: 10.0,
      memory_usage: crate::api::types::UsageStats { percent: 20.0 },
      disk_usage: crate::api::types::UsageStats { percent: 30.0 },
    });
    cache.set_namespaces(vec!["default".to_string()]);

    // system_info expires at 5s, namespaces lives until 30s
    advance(Duration::from_secs(6)).await;
    assert!(cache.system_info().is_none());
    assert!(cache.namespaces().is_some());

    advance(Duration::from_secs(25)).await;
    assert!(cache.namespaces().is_none());
  }

  #[tokio::test(start_paused = true)]
  async fn namespace_switch_clears_scoped_slots_only() {
    let mut cache = DashboardCache::new();
    cache.set_namespaces(vec!["default".to_string(), "kube-system".to_string()]);
    cache.set_kubernetes_info(KubernetesInfo {
      num_deployments: 1,
      num_pods: 2,
      num_services: 3,
    });
    cache.set_pod_statuses(vec![PodSummary {
      name: "web-0".to_string(),
      status: "Running".to_string(),
    }]);

    cache.invalidate_namespace_scoped();
    assert!(cache.kubernetes_info().is_none());
    assert!(cache.pod_statuses().is_none());
    assert!(cache.namespaces().is_some());
  }
}
