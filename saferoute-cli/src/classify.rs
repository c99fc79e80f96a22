//! Classify command implementation for the SafeRoute CLI.

use std::io::Write;

use camino::Utf8PathBuf;
use chrono::{DateTime, Utc};
use clap::Parser;
use geo::Coord;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use saferoute_core::{RiskAssessment, RiskClassifier, is_valid_coord};
use serde::{Deserialize, Serialize};

use crate::fs::write_json;
use crate::snapshot::HazardSource;
use crate::{ARG_HAZARDS, ARG_HAZARDS_DB, ARG_LAT, ARG_LON, CliError, ENV_CLASSIFY_LAT, ENV_CLASSIFY_LON};

/// CLI arguments for the `classify` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(about = "Classify the risk level at a coordinate")]
#[ortho_config(prefix = "SAFEROUTE")]
pub(crate) struct ClassifyArgs {
    /// Latitude in decimal degrees.
    #[arg(long = ARG_LAT, value_name = "degrees", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) lat: Option<f64>,
    /// Longitude in decimal degrees.
    #[arg(long = ARG_LON, value_name = "degrees", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) lon: Option<f64>,
    /// Path to a JSON hazard document.
    #[arg(long = ARG_HAZARDS, value_name = "path")]
    #[serde(default)]
    pub(crate) hazards: Option<Utf8PathBuf>,
    /// Path to a SQLite hazard database.
    #[arg(long = ARG_HAZARDS_DB, value_name = "path")]
    #[serde(default)]
    pub(crate) hazards_db: Option<Utf8PathBuf>,
}

impl ClassifyArgs {
    pub(crate) fn into_config(self) -> Result<ClassifyConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        ClassifyConfig::try_from(merged)
    }
}

/// Resolved `classify` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ClassifyConfig {
    pub(crate) point: Coord,
    pub(crate) hazards: HazardSource,
}

impl TryFrom<ClassifyArgs> for ClassifyConfig {
    type Error = CliError;

    fn try_from(args: ClassifyArgs) -> Result<Self, Self::Error> {
        let lat = args.lat.ok_or(CliError::MissingArgument {
            field: ARG_LAT,
            env: ENV_CLASSIFY_LAT,
        })?;
        let lon = args.lon.ok_or(CliError::MissingArgument {
            field: ARG_LON,
            env: ENV_CLASSIFY_LON,
        })?;
        let point = Coord { x: lon, y: lat };
        if !is_valid_coord(point) {
            return Err(CliError::InvalidCoordinate { lat, lon });
        }
        let hazards = HazardSource::from_options(args.hazards, args.hazards_db)?;
        Ok(Self { point, hazards })
    }
}

/// JSON payload printed by `classify`.
#[derive(Debug, Serialize)]
struct ClassifyReport<'a> {
    lat: f64,
    lon: f64,
    snapshot_version: u64,
    #[serde(flatten)]
    assessment: &'a RiskAssessment,
}

pub(crate) fn run_classify(args: ClassifyArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_classify_with(args, Utc::now(), &mut stdout)
}

pub(crate) fn run_classify_with(
    args: ClassifyArgs,
    now: DateTime<Utc>,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    config.hazards.validate()?;
    let snapshot = config.hazards.load(now)?;
    let assessment = RiskClassifier::default().assess(config.point, &snapshot, now);
    log::debug!(
        "classified ({}, {}) as {} against snapshot {}",
        config.point.y,
        config.point.x,
        assessment.level,
        snapshot.version()
    );
    write_json(
        writer,
        &ClassifyReport {
            lat: config.point.y,
            lon: config.point.x,
            snapshot_version: snapshot.version(),
            assessment: &assessment,
        },
    )
}
