//! Console client for challenge attempts.
//!
//! This binary is the composition root: it loads configuration from `.env`,
//! the environment and the command line, installs logging, and runs either a
//! live attempt or the replay of a recorded one.
//!
//! # Examples
//!
//! ```bash
//! # Offline attempt of the sorting challenge
//! cargo run -p challenge-client -- --challenge sorting --seed abc
//!
//! # Reported attempt
//! CHALLENGE_SUBMIT_TO=https://collector/submit \
//! CHALLENGE_REPORT_TO=wss://collector/report \
//! CHALLENGE_TOKEN=... cargo run -p challenge-client -- --challenge demo
//!
//! # Verify a recorded attempt
//! cargo run -p challenge-client -- --challenge hunting --replay attempt.json
//! ```

mod cli;
mod logging;
mod replay;
mod session;

use anyhow::Result;
use challenge_content::{
    ArithmeticChallenge, ChallengeKind, DatesChallenge, DemoChallenge, HuntingChallenge,
    RobotChallenge, SortingChallenge,
};
use clap::Parser;

use crate::cli::Cli;
use crate::replay::Recording;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let _guard = logging::setup_logging(cli.log_dir.as_deref())?;
    let config = cli.runtime_config();

    tracing::info!("Starting challenge client");
    tracing::info!("Challenge: {}", cli.challenge);
    tracing::info!(
        "Telemetry: {}",
        if config.telemetry.endpoints().is_some() { "enabled" } else { "offline" }
    );

    if let Some(path) = &cli.replay {
        let recording = Recording::load(path)?;
        let budget = config.log_size_budget;
        return match cli.challenge {
            ChallengeKind::Demo => replay::run(DemoChallenge, recording, budget),
            ChallengeKind::Arithmetic => replay::run(ArithmeticChallenge, recording, budget),
            ChallengeKind::Sorting => replay::run(SortingChallenge, recording, budget),
            ChallengeKind::Hunting => replay::run(HuntingChallenge, recording, budget),
            ChallengeKind::Robot => replay::run(RobotChallenge::default(), recording, budget),
            ChallengeKind::Dates => replay::run(DatesChallenge, recording, budget),
        };
    }

    let seed = cli.seed.clone();
    match cli.challenge {
        ChallengeKind::Demo => session::run(DemoChallenge, config, seed).await?,
        ChallengeKind::Arithmetic => session::run(ArithmeticChallenge, config, seed).await?,
        ChallengeKind::Sorting => session::run(SortingChallenge, config, seed).await?,
        ChallengeKind::Hunting => session::run(HuntingChallenge, config, seed).await?,
        ChallengeKind::Robot => session::run(RobotChallenge::default(), config, seed).await?,
        ChallengeKind::Dates => session::run(DatesChallenge, config, seed).await?,
    }

    tracing::info!("Client shutdown complete");
    Ok(())
}
