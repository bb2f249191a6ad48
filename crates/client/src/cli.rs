//! Command-line arguments.

use std::path::PathBuf;

use challenge_content::ChallengeKind;
use clap::Parser;
use runtime::RuntimeConfig;

#[derive(Debug, Parser)]
#[command(
    name = "challenge",
    version,
    about = "Run a timed challenge attempt from the terminal",
    long_about = "Reads one JSON action per line from stdin, e.g. {\"type\":\"c\",\"payload\":3}, \
                  and prints the attempt status as JSON after every action."
)]
pub struct Cli {
    /// Challenge to run.
    #[arg(short, long, default_value = "demo")]
    pub challenge: ChallengeKind,

    /// Seed chosen by the embedding page.
    #[arg(short, long, default_value = "local")]
    pub seed: String,

    /// Completion submission URL.
    #[arg(long, env = "CHALLENGE_SUBMIT_TO")]
    pub submit_to: Option<String>,

    /// WebSocket URL of the report collector.
    #[arg(long, env = "CHALLENGE_REPORT_TO")]
    pub report_to: Option<String>,

    /// Submission token.
    #[arg(long, env = "CHALLENGE_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Also write logs to this directory.
    #[arg(long, env = "CHALLENGE_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// Verify a recorded attempt (`{challengeMetadata, actionLog}`) instead of
    /// starting a new one.
    #[arg(long, value_name = "FILE")]
    pub replay: Option<PathBuf>,
}

impl Cli {
    /// Environment configuration with command-line overrides applied.
    pub fn runtime_config(&self) -> RuntimeConfig {
        let mut config = RuntimeConfig::from_env();
        let telemetry = &mut config.telemetry;

        if let Some(url) = &self.submit_to {
            telemetry.submit_url = Some(url.clone());
        }
        if let Some(url) = &self.report_to {
            telemetry.report_url = Some(url.clone());
        }
        if let Some(token) = &self.token {
            telemetry.token = Some(token.clone());
        }

        config
    }
}
