//! Runtime configuration structures and loaders.
use std::env;
use std::time::Duration;

/// Default log-size budget in bytes (256 KiB).
pub const DEFAULT_LOG_SIZE_BUDGET: usize = 262_144;

/// Settings shared by every attempt a runner starts.
#[derive(Clone, Debug)]
pub struct RuntimeConfig {
    /// Action-log size at which health reaches zero.
    pub log_size_budget: usize,
    /// How often the embedding loop should call [`Attempt::poll_time`](crate::Attempt::poll_time).
    pub poll_interval: Duration,
    pub telemetry: TelemetryConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            log_size_budget: DEFAULT_LOG_SIZE_BUDGET,
            poll_interval: Duration::from_millis(100),
            telemetry: TelemetryConfig::default(),
        }
    }
}

impl RuntimeConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `CHALLENGE_LOG_SIZE_BUDGET` - Log-size budget in bytes (default: 262144)
    /// - `CHALLENGE_POLL_INTERVAL_MS` - Time-limit polling interval (default: 100)
    /// - plus everything read by [`TelemetryConfig::from_env`]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(budget) = read_env::<usize>("CHALLENGE_LOG_SIZE_BUDGET") {
            config.log_size_budget = budget.max(1);
        }

        if let Some(millis) = read_env::<u64>("CHALLENGE_POLL_INTERVAL_MS") {
            config.poll_interval = Duration::from_millis(millis.max(1));
        }

        config.telemetry = TelemetryConfig::from_env();
        config
    }
}

/// Where and how attempts are reported.
///
/// Telemetry is only active when all three of `submit_url`, `report_url` and
/// `token` are present; see [`TelemetryConfig::endpoints`].
#[derive(Clone, Debug)]
pub struct TelemetryConfig {
    pub submit_url: Option<String>,
    pub report_url: Option<String>,
    pub token: Option<String>,
    /// Delay between deactivation and closing the report connection.
    pub close_grace: Duration,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            submit_url: None,
            report_url: None,
            token: None,
            close_grace: Duration::from_secs(1),
        }
    }
}

impl TelemetryConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `CHALLENGE_SUBMIT_TO` - Completion submission URL
    /// - `CHALLENGE_REPORT_TO` - WebSocket URL of the report collector
    /// - `CHALLENGE_TOKEN` - Submission token
    /// - `CHALLENGE_CLOSE_GRACE_MS` - Close grace period (default: 1000)
    pub fn from_env() -> Self {
        let mut config = Self {
            submit_url: read_env_string("CHALLENGE_SUBMIT_TO"),
            report_url: read_env_string("CHALLENGE_REPORT_TO"),
            token: read_env_string("CHALLENGE_TOKEN"),
            ..Self::default()
        };

        if let Some(millis) = read_env::<u64>("CHALLENGE_CLOSE_GRACE_MS") {
            config.close_grace = Duration::from_millis(millis);
        }

        config
    }

    /// Complete set of endpoints, or `None` when any of them is missing.
    pub fn endpoints(&self) -> Option<TelemetryEndpoints> {
        Some(TelemetryEndpoints {
            submit_url: self.submit_url.clone()?,
            report_url: self.report_url.clone()?,
            token: self.token.clone()?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TelemetryEndpoints {
    pub submit_url: String,
    pub report_url: String,
    pub token: String,
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}

fn read_env_string(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_require_all_three_values() {
        let mut config = TelemetryConfig {
            submit_url: Some("http://collector/submit".into()),
            report_url: Some("ws://collector/report".into()),
            token: None,
            ..TelemetryConfig::default()
        };
        assert_eq!(config.endpoints(), None);

        config.token = Some("t".into());
        let endpoints = config.endpoints().unwrap();
        assert_eq!(endpoints.token, "t");
        assert_eq!(endpoints.report_url, "ws://collector/report");
    }

    #[test]
    fn defaults_match_documented_values() {
        let config = RuntimeConfig::default();
        assert_eq!(config.log_size_budget, 262_144);
        assert_eq!(config.poll_interval, Duration::from_millis(100));
        assert_eq!(config.telemetry.close_grace, Duration::from_secs(1));
    }
}
