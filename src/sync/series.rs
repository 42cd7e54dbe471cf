//! Rolling time-series windows feeding the live charts.

use std::collections::VecDeque;

use crate::api::types::SystemInfo;

/// Default window size: the charts show the last ten samples.
pub const DEFAULT_CAPACITY: usize = 10;

/// One chart sample: a wall-clock label and a percentage value.
///
/// Values are expected in `[0, 100]` but not validated here; range policy
/// belongs to the producer.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeriesPoint {
  pub label: String,
  pub value: f64,
}

/// Fixed-capacity FIFO window of samples, oldest first.
#[derive(Debug, Clone)]
pub struct SeriesBuffer {
  points: VecDeque<TimeSeriesPoint>,
  capacity: usize,
}

impl SeriesBuffer {
  pub fn new(capacity: usize) -> Self {
    Self {
      points: VecDeque::with_capacity(capacity),
      capacity,
    }
  }

  /// Append a sample, evicting the oldest one once the window is full.
  pub fn push(&mut self, point: TimeSeriesPoint) {
    self.points.push_back(point);
    while self.points.len() > self.capacity {
      self.points.pop_front();
    }
  }

  /// The current window, oldest to newest. Never mutates; safe to call from
  /// a render path on every frame.
  pub fn snapshot(&self) -> Vec<TimeSeriesPoint> {
    self.points.iter().cloned().collect()
  }

  pub fn len(&self) -> usize {
    self.points.len()
  }

  pub fn is_empty(&self) -> bool {
    self.points.is_empty()
  }

  #[allow(dead_code)]
  pub fn capacity(&self) -> usize {
    self.capacity
  }
}

/// The metric streams the dashboard charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeriesKey {
  Cpu,
  Memory,
  Storage,
}

/// One independent window per displayed metric.
#[derive(Debug, Clone)]
pub struct MetricSeries {
  cpu: SeriesBuffer,
  memory: SeriesBuffer,
  storage: SeriesBuffer,
}

impl MetricSeries {
  pub fn new(capacity: usize) -> Self {
    Self {
      cpu: SeriesBuffer::new(capacity),
      memory: SeriesBuffer::new(capacity),
      storage: SeriesBuffer::new(capacity),
    }
  }

  /// Record all three metrics from one system-info sample under a shared
  /// timestamp label.
  pub fn record(&mut self, info: &SystemInfo) {
    let label = chrono::Local::now().format("%H:%M:%S").to_string();
    self.record_labeled(&label, info);
  }

  fn record_labeled(&mut self, label: &str, info: &SystemInfo) {
    self.cpu.push(TimeSeriesPoint {
      label: label.to_string(),
      value: info.cpu_percent,
    });
    self.memory.push(TimeSeriesPoint {
      label: label.to_string(),
      value: info.memory_usage.percent,
    });
    self.storage.push(TimeSeriesPoint {
      label: label.to_string(),
      value: info.disk_usage.percent,
    });
  }

  pub fn snapshot(&self, key: SeriesKey) -> Vec<TimeSeriesPoint> {
    self.buffer(key).snapshot()
  }

  fn buffer(&self, key: SeriesKey) -> &SeriesBuffer {
    match key {
      SeriesKey::Cpu => &self.cpu,
      SeriesKey::Memory => &self.memory,
      SeriesKey::Storage => &self.storage,
    }
  }
}

impl Default for MetricSeries {
  fn default() -> Self {
    Self::new(DEFAULT_CAPACITY)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::types::UsageStats;

  fn point(label: &str, value: f64) -> TimeSeriesPoint {
    TimeSeriesPoint {
      label: label.to_string(),
      value,
    }
  }

  #[test]
  fn never_exceeds_capacity_and_evicts_oldest() {
    let mut buffer = SeriesBuffer::new(3);
    for i in 0..5 {
      buffer.push(point(&format!("t{i}"), i as f64));
      assert!(buffer.len() <= 3);
    }

    let snapshot = buffer.snapshot();
    assert_eq!(snapshot.len(), 3);
    let labels: Vec<&str> = snapshot.iter().map(|p| p.label.as_str()).collect();
    assert_eq!(labels, vec!["t2", "t3", "t4"]);
  }

  #[test]
  fn snapshot_preserves_insertion_order() {
    let mut buffer = SeriesBuffer::new(10);
    buffer.push(point("a", 1.0));
    buffer.push(point("b", 2.0));
    buffer.push(point("c", 3.0));

    let values: Vec<f64> = buffer.snapshot().iter().map(|p| p.value).collect();
    assert_eq!(values, vec![1.0, 2.0, 3.0]);
  }

  #[test]
  fn snapshot_does_not_mutate() {
    let mut buffer = SeriesBuffer::new(2);
    buffer.push(point("a", 1.0));
    let first = buffer.snapshot();
    let second = buffer.snapshot();
    assert_eq!(first, second);
    assert_eq!(buffer.len(), 1);
  }

  #[test]
  fn out_of_range_values_are_preserved() {
    let mut buffer = SeriesBuffer::new(2);
    buffer.push(point("a", 142.0));
    assert_eq!(buffer.snapshot()[0].value, 142.0);
  }

  #[test]
  fn record_fans_out_to_independent_windows() {
    let mut series = MetricSeries::new(2);
    let info = SystemInfo {
      cpu_percent: 10.0,
      memory_usage: UsageStats { percent: 20.0 },
      disk_usage: UsageStats { percent: 30.0 },
    };
    series.record(&info);
    series.record(&info);
    series.record(&info);

    for key in [SeriesKey::Cpu, SeriesKey::Memory, SeriesKey::Storage] {
      assert_eq!(series.snapshot(key).len(), 2);
    }
    assert_eq!(series.snapshot(SeriesKey::Cpu)[0].value, 10.0);
    assert_eq!(series.snapshot(SeriesKey::Memory)[0].value, 20.0);
    assert_eq!(series.snapshot(SeriesKey::Storage)[0].value, 30.0);
  }
}
