//! Advise command implementation for the SafeRoute CLI.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use camino::Utf8PathBuf;
use chrono::Utc;
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use saferoute_core::{AdviseRequest, Advisory, AdvisorConfig, Geocoder, RouteAdvisor, Router};
use saferoute_data::{
    NominatimGeocoder, NominatimGeocoderConfig, OsrmRouter, OsrmRouterConfig, read_gazetteer,
};
use serde::{Deserialize, Serialize};

use crate::fs::{require_existing, write_json};
use crate::snapshot::HazardSource;
use crate::{
    ARG_AVOID_RISK, ARG_DESTINATION, ARG_GAZETTEER, ARG_HAZARDS, ARG_HAZARDS_DB,
    ARG_NOMINATIM_BASE_URL, ARG_ORIGIN, ARG_OSRM_BASE_URL, ARG_TIMEOUT_SECS, CliError,
    ENV_ADVISE_DESTINATION,
};

const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// CLI arguments for the `advise` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Resolve the origin and destination, fetch candidate routes \
                 from OSRM, score them against the hazard data and print the \
                 advisory as JSON. Options can come from CLI flags, \
                 configuration files, or environment variables.",
    about = "Recommend a route to a destination"
)]
#[ortho_config(prefix = "SAFEROUTE")]
pub(crate) struct AdviseArgs {
    /// Destination as free text or "lat, lon".
    #[arg(value_name = "text")]
    #[serde(default)]
    pub(crate) destination: Option<String>,
    /// Origin as free text or "lat, lon"; defaults to the city centre.
    #[arg(long = ARG_ORIGIN, value_name = "text")]
    #[serde(default)]
    pub(crate) origin: Option<String>,
    /// Score candidates and prefer the least risky one (default true).
    #[arg(long = ARG_AVOID_RISK, value_name = "bool")]
    #[serde(default)]
    pub(crate) avoid_risk: Option<bool>,
    /// Path to a JSON hazard document.
    #[arg(long = ARG_HAZARDS, value_name = "path")]
    #[serde(default)]
    pub(crate) hazards: Option<Utf8PathBuf>,
    /// Path to a SQLite hazard database.
    #[arg(long = ARG_HAZARDS_DB, value_name = "path")]
    #[serde(default)]
    pub(crate) hazards_db: Option<Utf8PathBuf>,
    /// Path to a JSON gazetteer of known places.
    #[arg(long = ARG_GAZETTEER, value_name = "path")]
    #[serde(default)]
    pub(crate) gazetteer: Option<Utf8PathBuf>,
    /// Base URL for the OSRM server.
    #[arg(long = ARG_OSRM_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) osrm_base_url: Option<String>,
    /// Base URL for the Nominatim server.
    #[arg(long = ARG_NOMINATIM_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) nominatim_base_url: Option<String>,
    /// Timeout applied to each geocoding and routing call.
    #[arg(long = ARG_TIMEOUT_SECS, value_name = "seconds")]
    #[serde(default)]
    pub(crate) timeout_secs: Option<u64>,
}

impl AdviseArgs {
    pub(crate) fn into_config(self) -> Result<AdviseConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        AdviseConfig::try_from(merged)
    }
}

/// Resolved `advise` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AdviseConfig {
    pub(crate) destination: String,
    pub(crate) origin: Option<String>,
    pub(crate) avoid_risk: bool,
    pub(crate) hazards: HazardSource,
    pub(crate) gazetteer: Option<Utf8PathBuf>,
    pub(crate) osrm_base_url: String,
    pub(crate) nominatim_base_url: String,
    pub(crate) timeout: Duration,
}

impl AdviseConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        self.hazards.validate()?;
        if let Some(path) = &self.gazetteer {
            require_existing(path, ARG_GAZETTEER)?;
        }
        Ok(())
    }

    fn request(&self) -> AdviseRequest {
        let request =
            AdviseRequest::new(self.destination.clone()).with_avoid_risk(self.avoid_risk);
        match &self.origin {
            Some(origin) => request.with_origin(origin.clone()),
            None => request,
        }
    }
}

impl TryFrom<AdviseArgs> for AdviseConfig {
    type Error = CliError;

    fn try_from(args: AdviseArgs) -> Result<Self, Self::Error> {
        let destination = args
            .destination
            .filter(|text| !text.trim().is_empty())
            .ok_or(CliError::MissingArgument {
                field: ARG_DESTINATION,
                env: ENV_ADVISE_DESTINATION,
            })?;
        let hazards = HazardSource::from_options(args.hazards, args.hazards_db)?;
        let osrm_base_url = args
            .osrm_base_url
            .unwrap_or_else(|| OsrmRouterConfig::default().base_url);
        let nominatim_base_url = args
            .nominatim_base_url
            .unwrap_or_else(|| NominatimGeocoderConfig::default().base_url);
        Ok(Self {
            destination,
            origin: args.origin.filter(|text| !text.trim().is_empty()),
            avoid_risk: args.avoid_risk.unwrap_or(true),
            hazards,
            gazetteer: args.gazetteer,
            osrm_base_url,
            nominatim_base_url,
            timeout: Duration::from_secs(args.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
        })
    }
}

/// Collaborators for one advise invocation.
pub(crate) struct AdviseServices {
    pub(crate) geocoder: Box<dyn Geocoder>,
    pub(crate) router: Box<dyn Router>,
}

/// Builds the geocoder and router for the current advise invocation.
pub(crate) trait AdviseServicesBuilder {
    fn build(&self, config: &AdviseConfig) -> Result<AdviseServices, CliError>;
}

pub(crate) struct DefaultAdviseServicesBuilder;

impl AdviseServicesBuilder for DefaultAdviseServicesBuilder {
    fn build(&self, config: &AdviseConfig) -> Result<AdviseServices, CliError> {
        let geocoder = NominatimGeocoder::with_config(
            NominatimGeocoderConfig::new(config.nominatim_base_url.clone())
                .with_timeout(config.timeout),
        )
        .map_err(|source| CliError::BuildProvider {
            service: "geocoding",
            base_url: config.nominatim_base_url.clone(),
            source,
        })?;
        let router = OsrmRouter::with_config(
            OsrmRouterConfig::new(config.osrm_base_url.clone()).with_timeout(config.timeout),
        )
        .map_err(|source| CliError::BuildProvider {
            service: "routing",
            base_url: config.osrm_base_url.clone(),
            source,
        })?;
        Ok(AdviseServices {
            geocoder: Box::new(geocoder),
            router: Box::new(router),
        })
    }
}

pub(crate) fn run_advise(args: AdviseArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_advise_with(args, &DefaultAdviseServicesBuilder, &mut stdout)
}

pub(crate) fn run_advise_with(
    args: AdviseArgs,
    builder: &dyn AdviseServicesBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let advisory = execute_advise(args, builder)?;
    write_json(writer, &advisory)
}

fn execute_advise(
    args: AdviseArgs,
    builder: &dyn AdviseServicesBuilder,
) -> Result<Advisory, CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;

    let now = Utc::now();
    let snapshot = config.hazards.load(now)?;
    let services = builder.build(&config)?;
    let advisor_config = AdvisorConfig::default()
        .with_geocode_timeout(config.timeout)
        .with_route_timeout(config.timeout);
    let mut advisor = RouteAdvisor::new(
        Arc::new(services.geocoder),
        services.router,
        advisor_config,
    );
    if let Some(path) = &config.gazetteer {
        let gazetteer = read_gazetteer(path)?;
        log::debug!("loaded {} gazetteer places from {path}", gazetteer.len());
        advisor = advisor.with_gazetteer(Arc::new(gazetteer));
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;
    let advisory = runtime.block_on(advisor.advise(&config.request(), &snapshot, now))?;
    Ok(advisory)
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<AdviseConfig, CliError> {
    let merged = AdviseArgs::merge_from_layers(layers).map_err(CliError::from)?;
    AdviseConfig::try_from(merged)
}
