// Авторские права (c) 2025 urdekcah. Все права защищены.
//
// Этот исходный код распространяется под лицензией AGPL-3.0,
// текст которой находится в файле LICENSE в корневом каталоге данного проекта.
use crate::manager::FormManager;
use config::FormsConfig;
use std::time::Duration;
use tokio::{task::JoinHandle, time::MissedTickBehavior};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtlPolicy {
  min: Duration,
  max: Duration,
}

impl TtlPolicy {
  pub fn new(min: Duration, max: Duration) -> Self {
    Self {
      min: min.min(max),
      max,
    }
  }

  pub fn from_config(config: &FormsConfig) -> Self {
    Self::new(config.min_ttl(), config.max_ttl())
  }

  pub fn max(&self) -> Duration {
    self.max
  }

  /// Effective lifetime of a form; no request means the maximum.
  pub fn clamp(&self, requested: Option<Duration>) -> Duration {
    match requested {
      None => self.max,
      Some(ttl) if ttl < self.min => {
        debug!("Raised ttl {:?} to the minimum {:?}", ttl, self.min);
        self.min
      }
      Some(ttl) if ttl > self.max => {
        debug!("Lowered ttl {:?} to the maximum {:?}", ttl, self.max);
        self.max
      }
      Some(ttl) => ttl,
    }
  }

  pub fn expires_at(&self, now: i64, requested: Option<Duration>) -> i64 {
    let ttl = i64::try_from(self.clamp(requested).as_secs()).unwrap_or(i64::MAX);
    now.saturating_add(ttl)
  }
}

pub fn now() -> i64 {
  chrono::Utc::now().timestamp()
}

/// Periodically unloads forms whose ttl has passed.
pub fn spawn_sweeper(manager: FormManager, period: Duration) -> JoinHandle<()> {
  tokio::spawn(async move {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
      interval.tick().await;
      let unloaded = manager.sweep_expired(now()).await;
      if unloaded > 0 {
        info!("Unloaded {} expired forms", unloaded);
      }
    }
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  fn policy() -> TtlPolicy {
    TtlPolicy::new(Duration::from_secs(10), Duration::from_secs(86_400))
  }

  #[test]
  fn out_of_range_ttl_is_clamped() {
    let policy = policy();
    assert_eq!(policy.clamp(Some(Duration::from_secs(5))), Duration::from_secs(10));
    assert_eq!(
      policy.clamp(Some(Duration::from_secs(999_999))),
      Duration::from_secs(86_400)
    );
    assert_eq!(policy.clamp(Some(Duration::ZERO)), Duration::from_secs(10));
  }

  #[test]
  fn in_range_and_missing_ttl() {
    let policy = policy();
    assert_eq!(policy.clamp(Some(Duration::from_secs(60))), Duration::from_secs(60));
    assert_eq!(policy.clamp(None), Duration::from_secs(86_400));
    assert_eq!(policy.expires_at(1_000, Some(Duration::from_secs(60))), 1_060);
  }

  #[test]
  fn minimum_never_exceeds_maximum() {
    let policy = TtlPolicy::new(Duration::from_secs(100), Duration::from_secs(50));
    assert_eq!(policy.clamp(Some(Duration::from_secs(1))), Duration::from_secs(50));
  }
}
