//! Limiter configuration, fixed at construction time.

use std::time::Duration;

use crate::error::{CoreError, CoreResult};

/// Timing knobs for the [`AdmissionController`](crate::AdmissionController).
///
/// The defaults match a 5 requests/second cap per client, reclaiming clients
/// idle for three minutes on a one-minute sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimiterConfig {
    /// Minimum spacing between two admitted requests of one client.
    pub refill_interval: Duration,
    /// Idle time after which a client's state is reclaimed.
    pub staleness_threshold: Duration,
    /// How often the reclamation sweep runs.
    pub sweep_interval: Duration,
}

impl Default for LimiterConfig {
    fn default() -> Self {
        Self {
            refill_interval: Duration::from_millis(200),
            staleness_threshold: Duration::from_secs(180),
            sweep_interval: Duration::from_secs(60),
        }
    }
}

impl LimiterConfig {
    /// Checks the settings for consistency.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfig`] when an interval is zero or when
    /// the staleness threshold does not exceed the sweep interval (a sweep
    /// could otherwise reclaim clients that are still active).
    pub fn validate(&self) -> CoreResult<()> {
        if self.refill_interval.is_zero() {
            return Err(CoreError::InvalidConfig(
                "refill interval must be non-zero".to_string(),
            ));
        }
        if self.sweep_interval.is_zero() {
            return Err(CoreError::InvalidConfig(
                "sweep interval must be non-zero".to_string(),
            ));
        }
        if self.staleness_threshold <= self.sweep_interval {
            return Err(CoreError::InvalidConfig(format!(
                "staleness threshold ({:?}) must be greater than sweep interval ({:?})",
                self.staleness_threshold, self.sweep_interval
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = LimiterConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.refill_interval, Duration::from_millis(200));
        assert_eq!(config.staleness_threshold, Duration::from_secs(180));
        assert_eq!(config.sweep_interval, Duration::from_secs(60));
    }

    #[test]
    fn zero_refill_interval_rejected() {
        let config = LimiterConfig {
            refill_interval: Duration::ZERO,
            ..LimiterConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("refill interval"));
    }

    #[test]
    fn zero_sweep_interval_rejected() {
        let config = LimiterConfig {
            sweep_interval: Duration::ZERO,
            ..LimiterConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn staleness_must_exceed_sweep_interval() {
        let config = LimiterConfig {
            staleness_threshold: Duration::from_secs(60),
            sweep_interval: Duration::from_secs(60),
            ..LimiterConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, CoreError::InvalidConfig(_)));
        assert!(err.to_string().contains("staleness threshold"));
    }
}
