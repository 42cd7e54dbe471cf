//! Pod status classification for the status widget and doughnut chart.

/// Counts of pods per displayed category. Rebuilt from scratch on every
/// classification pass; never incrementally mutated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PodStatusTally {
  pub running: usize,
  pub pending: usize,
  pub failed: usize,
}

impl PodStatusTally {
  pub fn total(&self) -> usize {
    self.running + self.pending + self.failed
  }
}

/// Tally raw status strings into the three displayed buckets.
///
/// Matching is case-insensitive substring search in fixed priority order:
/// "running", then "pending", then "failed"/"error". Statuses matching none
/// of these (e.g. `CrashLoopBackOff`, `Unknown`) are dropped from the tally
/// entirely; the widget only shows the three buckets.
pub fn classify<I, S>(statuses: I) -> PodStatusTally
where
  I: IntoIterator<Item = S>,
  S: AsRef<str>,
{
  let mut tally = PodStatusTally::default();
  for status in statuses {
    let status = status.as_ref().to_lowercase();
    if status.contains("running") {
      tally.running += 1;
    } else if status.contains("pending") {
      tally.pending += 1;
    } else if status.contains("failed") || status.contains("error") {
      tally.failed += 1;
    }
  }
  tally
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn buckets_by_priority_and_drops_unmatched() {
    let tally = classify(["Running", "Pending", "CrashLoopBackOff", "Failed: OOM"]);
    assert_eq!(
      tally,
      PodStatusTally {
        running: 1,
        pending: 1,
        failed: 1,
      }
    );
  }

  #[test]
  fn matching_is_case_insensitive_substring() {
    let tally = classify(["running (ready)", "IMAGEPULLERROR", "PENDING"]);
    assert_eq!(tally.running, 1);
    assert_eq!(tally.pending, 1);
    assert_eq!(tally.failed, 1);
  }

  #[test]
  fn running_wins_over_later_categories() {
    // Priority order: a status containing both words counts once, as running.
    let tally = classify(["running-with-errors"]);
    assert_eq!(tally.running, 1);
    assert_eq!(tally.failed, 0);
  }

  #[test]
  fn empty_input_yields_empty_tally() {
    let tally = classify(Vec::<String>::new());
    assert_eq!(tally, PodStatusTally::default());
    assert_eq!(tally.total(), 0);
  }

  #[test]
  fn same_input_same_tally() {
    let statuses = vec!["Running", "Evicted", "Error", "Running"];
    assert_eq!(classify(statuses.clone()), classify(statuses));
  }
}
