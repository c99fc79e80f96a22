//! Command-line interface for SafeRoute risk-aware route advice.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};

mod advise;
mod classify;
mod error;
mod fs;
mod snapshot;

pub use error::CliError;

use advise::AdviseArgs;
use classify::ClassifyArgs;

const ARG_DESTINATION: &str = "destination";
const ARG_ORIGIN: &str = "origin";
const ARG_AVOID_RISK: &str = "avoid-risk";
const ARG_HAZARDS: &str = "hazards";
const ARG_HAZARDS_DB: &str = "hazards-db";
const ARG_GAZETTEER: &str = "gazetteer";
const ARG_OSRM_BASE_URL: &str = "osrm-base-url";
const ARG_NOMINATIM_BASE_URL: &str = "nominatim-base-url";
const ARG_TIMEOUT_SECS: &str = "timeout-secs";
const ARG_LAT: &str = "lat";
const ARG_LON: &str = "lon";
const ENV_ADVISE_DESTINATION: &str = "SAFEROUTE_CMDS_ADVISE_DESTINATION";
const ENV_CLASSIFY_LAT: &str = "SAFEROUTE_CMDS_CLASSIFY_LAT";
const ENV_CLASSIFY_LON: &str = "SAFEROUTE_CMDS_CLASSIFY_LON";

/// Run the SafeRoute CLI with the current process arguments and environment.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Advise(args) => advise::run_advise(args),
        Command::Classify(args) => classify::run_classify(args),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "saferoute",
    about = "Risk-aware route advice for the Chihuahua metropolitan area",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Recommend a route to a destination and print the advisory as JSON.
    Advise(AdviseArgs),
    /// Classify the risk level at a single coordinate.
    Classify(ClassifyArgs),
}

#[cfg(test)]
mod tests;
