//! Error types emitted by the SafeRoute CLI.
//!
//! Keep this error type reasonably small, as many CLI helpers return
//! `Result<_, CliError>`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use saferoute_core::{AdviseError, HazardStoreError};
use saferoute_data::{HazardFileError, ProviderBuildError};
use thiserror::Error;

/// Errors emitted by the SafeRoute CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// The requested operation requires a missing compile-time feature.
    #[error("{action} requires the `{feature}` feature to be enabled")]
    MissingFeature {
        feature: &'static str,
        action: &'static str,
    },
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist or is not a file")]
    MissingSourceFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        field: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Both a JSON document and a SQLite database were given as hazard
    /// sources.
    #[error("set only one of --hazards and --hazards-db")]
    ConflictingHazardSources,
    /// The classify coordinate is not a finite WGS84 position.
    #[error("({lat}, {lon}) is not a valid coordinate")]
    InvalidCoordinate { lat: f64, lon: f64 },
    /// Loading a JSON hazard document or gazetteer failed.
    #[error(transparent)]
    LoadHazards(#[from] HazardFileError),
    /// A hazard store failed to produce a snapshot.
    #[error(transparent)]
    HazardStore(#[from] HazardStoreError),
    /// Constructing an HTTP adapter failed.
    #[error("failed to build {service} client for {base_url:?}: {source}")]
    BuildProvider {
        service: &'static str,
        base_url: String,
        #[source]
        source: ProviderBuildError,
    },
    /// Building the async runtime failed.
    #[error("failed to build Tokio runtime: {0}")]
    Runtime(#[source] std::io::Error),
    /// The advisor rejected the request.
    #[error("advice failed: {0}")]
    Advise(#[from] AdviseError),
    /// Serializing command output failed.
    #[error("failed to serialize output: {0}")]
    SerializeOutput(#[source] serde_json::Error),
    /// Writing command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
