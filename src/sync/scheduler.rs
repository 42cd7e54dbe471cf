//! Refresh scheduling: the periodic timer and the manual-refresh debounce.
//!
//! The scheduler never runs a cycle itself; it sends [`RefreshTrigger`]s on a
//! channel and the owner drives the cycle. That keeps exactly one timer task
//! alive at a time and makes teardown a structural guarantee: dropping or
//! tearing down the scheduler aborts the task, so no timer can outlive its
//! owning context.

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::debug;

/// Why a refresh cycle is being requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTrigger {
  /// Fired by the periodic timer.
  Scheduled,
  /// Requested by the user, subject to the cooldown debounce.
  Manual,
}

/// Owns the periodic refresh timer and the manual-refresh cooldown.
pub struct RefreshScheduler {
  tx: mpsc::UnboundedSender<RefreshTrigger>,
  period: Duration,
  cooldown: Duration,
  timer: Option<JoinHandle<()>>,
  cooldown_until: Option<Instant>,
}

impl RefreshScheduler {
  /// Create a scheduler and the trigger stream its owner should drain.
  pub fn new(period: Duration, cooldown: Duration) -> (Self, mpsc::UnboundedReceiver<RefreshTrigger>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
      Self {
        tx,
        period,
        cooldown,
        timer: None,
        cooldown_until: None,
      },
      rx,
    )
  }

  /// Start the periodic timer. The first trigger fires one full period after
  /// enabling. Enabling while already scheduled replaces the timer; two
  /// periodic timers never coexist.
  pub fn enable_auto(&mut self) {
    self.cancel_timer();

    let tx = self.tx.clone();
    let period = self.period;
    self.timer = Some(tokio::spawn(async move {
      let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
      loop {
        ticker.tick().await;
        if tx.send(RefreshTrigger::Scheduled).is_err() {
          break;
        }
      }
    }));
    debug!(period = ?self.period, "auto-refresh enabled");
  }

  /// Stop the periodic timer. No-op when already idle.
  pub fn disable_auto(&mut self) {
    if self.timer.is_some() {
      self.cancel_timer();
      debug!("auto-refresh disabled");
    }
  }

  pub fn is_auto_enabled(&self) -> bool {
    self.timer.is_some()
  }

  /// Request an immediate refresh. Returns false when the call lands inside
  /// the cooldown window, in which case it is ignored entirely: nothing is
  /// queued for later. The auto-refresh timer is unaffected either way.
  pub fn manual_refresh(&mut self) -> bool {
    let now = Instant::now();
    if let Some(until) = self.cooldown_until {
      if now < until {
        debug!("manual refresh ignored, cooling down");
        return false;
      }
    }
    self.cooldown_until = Some(now + self.cooldown);
    // Receiver gone means the owner is shutting down; nothing to do.
    let _ = self.tx.send(RefreshTrigger::Manual);
    true
  }

  /// Cancel the timer and the pending cooldown. Safe to call repeatedly and
  /// from any state; afterwards zero timers are outstanding.
  pub fn teardown(&mut self) {
    self.cancel_timer();
    self.cooldown_until = None;
  }

  fn cancel_timer(&mut self) {
    if let Some(handle) = self.timer.take() {
      handle.abort();
    }
  }
}

impl Drop for RefreshScheduler {
  fn drop(&mut self) {
    self.teardown();
  }
}
