//! Client-side data synchronization: the mechanisms that keep dashboard data
//! fresh without hammering the backend.
//!
//! - TTL caches with independent per-dataset expirations
//! - bounded, linear-backoff retry around network calls
//! - fixed-size rolling windows for the live metric charts
//! - pod status tallies for the status widget
//! - the periodic/manual refresh lifecycle

mod cache;
mod retry;
mod scheduler;
mod series;
mod status;

pub use cache::{CacheKey, DashboardCache};
pub use retry::{with_retry, RetryPolicy};
pub use scheduler::RefreshScheduler;
pub use series::{MetricSeries, SeriesKey, TimeSeriesPoint};
pub use status::{classify, PodStatusTally};
