//! Focused unit tests covering classify CLI configuration and output.

use crate::classify::{ClassifyArgs, ClassifyConfig, run_classify_with};
use super::helpers::{CATEDRAL_HAZARDS, Workspace};
use super::*;
use chrono::{TimeZone, Utc};
use rstest::rstest;

#[rstest]
#[case::lat(None, Some(-106.0), ARG_LAT, ENV_CLASSIFY_LAT)]
#[case::lon(Some(28.6), None, ARG_LON, ENV_CLASSIFY_LON)]
fn converting_without_coordinates_errors(
    #[case] lat: Option<f64>,
    #[case] lon: Option<f64>,
    #[case] field: &'static str,
    #[case] env_var: &'static str,
) {
    let args = ClassifyArgs {
        lat,
        lon,
        ..ClassifyArgs::default()
    };
    match ClassifyConfig::try_from(args) {
        Err(CliError::MissingArgument {
            field: missing,
            env,
        }) => {
            assert_eq!(missing, field);
            assert_eq!(env, env_var);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn out_of_range_coordinates_are_rejected() {
    let args = ClassifyArgs {
        lat: Some(128.6),
        lon: Some(-106.0),
        ..ClassifyArgs::default()
    };
    assert!(matches!(
        ClassifyConfig::try_from(args),
        Err(CliError::InvalidCoordinate { .. })
    ));
}

#[rstest]
fn classify_prints_the_assessment() {
    let workspace = Workspace::new();
    let hazards = workspace.write("hazards.json", CATEDRAL_HAZARDS);
    let args = ClassifyArgs {
        lat: Some(28.6353),
        lon: Some(-106.0772),
        hazards: Some(hazards),
        hazards_db: None,
    };
    let now = Utc
        .with_ymd_and_hms(2024, 5, 1, 12, 0, 0)
        .single()
        .expect("valid time");
    let mut output = Vec::new();

    run_classify_with(args, now, &mut output).expect("classify should succeed");

    let report: serde_json::Value = serde_json::from_slice(&output).expect("JSON output");
    assert_eq!(report["level"], "high");
    assert_eq!(report["snapshot_version"], 11);
    // The Catedral zone plus the zone derived from the verified report.
    assert_eq!(report["zone_matches"], 2);
    assert_eq!(report["nearby_incidents"], 1);
}
