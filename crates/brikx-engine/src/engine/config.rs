use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Tunable timing and queue parameters of a [`GameSession`](super::GameSession).
///
/// Every field has a default, so a partial JSON document is a valid config:
///
/// ```
/// use brikx_engine::SessionConfig;
///
/// let config: SessionConfig = serde_json::from_str(r#"{ "lookahead": 3 }"#).unwrap();
/// assert_eq!(config.lookahead, 3);
/// assert_eq!(config.clear_delay_ms, 150);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Number of upcoming pieces shown in the queue.
    pub lookahead: usize,
    /// Delay between flagging completed rows and removing them.
    pub clear_delay_ms: u64,
    /// Duration of each countdown step (3, 2, 1, GO).
    pub countdown_step_ms: u64,
    /// Gravity interval at level 1.
    pub initial_drop_interval_ms: u64,
    /// How much faster gravity gets per level.
    pub drop_interval_step_ms: u64,
    /// Lower bound of the gravity interval.
    pub min_drop_interval_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            lookahead: 5,
            clear_delay_ms: 150,
            countdown_step_ms: 1000,
            initial_drop_interval_ms: 1000,
            drop_interval_step_ms: 100,
            min_drop_interval_ms: 100,
        }
    }
}

impl SessionConfig {
    /// Clamps values the session cannot run with.
    ///
    /// The lookahead is at least one piece and the minimum drop interval is at
    /// least one millisecond, so gravity always makes progress.
    #[must_use]
    pub fn sanitized(self) -> Self {
        Self {
            lookahead: self.lookahead.max(1),
            min_drop_interval_ms: self.min_drop_interval_ms.max(1),
            ..self
        }
    }

    #[must_use]
    pub fn clear_delay(&self) -> Duration {
        Duration::from_millis(self.clear_delay_ms)
    }

    #[must_use]
    pub fn countdown_step(&self) -> Duration {
        Duration::from_millis(self.countdown_step_ms)
    }

    /// Gravity interval at `level`: one step faster per level, floored at the
    /// minimum interval.
    #[must_use]
    pub fn drop_interval(&self, level: u32) -> Duration {
        let speedup = self
            .drop_interval_step_ms
            .saturating_mul(u64::from(level.saturating_sub(1)));
        let millis = self
            .initial_drop_interval_ms
            .saturating_sub(speedup)
            .max(self.min_drop_interval_ms);
        Duration::from_millis(millis)
    }
}
