//! Timeout and resolution tests for [`RouteAdvisor`] on paused Tokio time.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use geo::Coord;
use rstest::{fixture, rstest};
use saferoute_core::advisor::{DEFAULT_ORIGIN, DEFAULT_ORIGIN_LABEL};
use saferoute_core::test_support::{StubGeocoder, StubRouter};
use saferoute_core::{
    AdviseError, AdviseRequest, AdvisorConfig, DisasterRecord, FallbackReason,
    HazardSnapshot, RiskLevel, RouteAdvisor, RouteCandidate, RouteProviderError, RouteSource,
    WarningKind,
};

const CATEDRAL: Coord = Coord {
    x: -106.0772,
    y: 28.6353,
};
const PALOMAR: Coord = Coord {
    x: -106.0930,
    y: 28.6296,
};

#[fixture]
fn direct_route() -> RouteCandidate {
    RouteCandidate::new(vec![DEFAULT_ORIGIN, CATEDRAL], 1.1, 3.0).expect("valid candidate")
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn slow_reverse_geocoding_uses_the_default_label(direct_route: RouteCandidate) {
    let geocoder = StubGeocoder::new()
        .with_place("Catedral", CATEDRAL)
        .with_reverse_label("Calle Libertad")
        .with_delay(Duration::from_secs(60));
    let router = StubRouter::with_candidates(vec![direct_route]);
    let config = AdvisorConfig::default().with_geocode_timeout(Duration::from_secs(2));
    let advisor = RouteAdvisor::new(Arc::new(geocoder), router, config);

    // Literal destination so the slow geocoder is only used for the label.
    let request = AdviseRequest::new("28.6353, -106.0772");
    let advisory = advisor
        .advise(&request, &HazardSnapshot::empty(1), Utc::now())
        .await
        .expect("advisory");
    assert_eq!(advisory.origin.label, DEFAULT_ORIGIN_LABEL);
    assert_eq!(advisory.route_source, RouteSource::Provider);
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn slow_destination_geocoding_is_not_found(direct_route: RouteCandidate) {
    let geocoder = StubGeocoder::new()
        .with_place("Catedral", CATEDRAL)
        .with_delay(Duration::from_secs(60));
    let router = StubRouter::with_candidates(vec![direct_route]);
    let advisor = RouteAdvisor::new(Arc::new(geocoder), router, AdvisorConfig::default());

    let err = advisor
        .advise(
            &AdviseRequest::new("Catedral"),
            &HazardSnapshot::empty(1),
            Utc::now(),
        )
        .await
        .expect_err("geocoder too slow");
    assert_eq!(
        err,
        AdviseError::DestinationNotFound {
            query: "Catedral".into()
        }
    );
}

#[rstest]
#[tokio::test]
async fn router_receives_resolved_endpoints(direct_route: RouteCandidate) {
    let geocoder = StubGeocoder::new()
        .with_place("Catedral", CATEDRAL)
        .with_place("Palomar", PALOMAR);
    let router = StubRouter::with_candidates(vec![direct_route]);
    let advisor = RouteAdvisor::new(Arc::new(geocoder), router, AdvisorConfig::default());
    let request = AdviseRequest::new("Catedral").with_origin("Palomar");

    let advisory = advisor
        .advise(&request, &HazardSnapshot::empty(1), Utc::now())
        .await
        .expect("advisory");
    assert_eq!(advisory.origin.label, "Palomar");
    assert_eq!(advisory.origin.coord(), PALOMAR);
    assert_eq!(advisory.destination.coord(), CATEDRAL);
}

#[rstest]
#[tokio::test]
async fn unresolvable_origin_falls_back_to_default(direct_route: RouteCandidate) {
    let geocoder = StubGeocoder::new()
        .with_place("Catedral", CATEDRAL)
        .with_reverse_label("Plaza de Armas");
    let router = StubRouter::with_candidates(vec![direct_route]);
    let advisor = RouteAdvisor::new(Arc::new(geocoder), router, AdvisorConfig::default());
    let request = AdviseRequest::new("Catedral").with_origin("Nowhere in particular");

    let advisory = advisor
        .advise(&request, &HazardSnapshot::empty(1), Utc::now())
        .await
        .expect("advisory");
    assert_eq!(advisory.origin.coord(), DEFAULT_ORIGIN);
    assert_eq!(advisory.origin.label, "Plaza de Armas");
}

#[rstest]
#[tokio::test]
async fn identical_endpoints_are_invalid() {
    let geocoder = StubGeocoder::new().with_place("Catedral", CATEDRAL);
    let router = StubRouter::with_error(RouteProviderError::NoRoute);
    let advisor = RouteAdvisor::new(Arc::new(geocoder), router, AdvisorConfig::default());
    let request = AdviseRequest::new("Catedral").with_origin("28.6353, -106.0772");

    let err = advisor
        .advise(&request, &HazardSnapshot::empty(1), Utc::now())
        .await
        .expect_err("identical endpoints");
    assert!(matches!(err, AdviseError::InvalidInput { .. }));
}

#[rstest]
#[tokio::test]
async fn provider_no_route_is_surfaced() {
    let geocoder = StubGeocoder::new().with_place("Catedral", CATEDRAL);
    let router = StubRouter::with_error(RouteProviderError::NoRoute);
    let advisor = RouteAdvisor::new(Arc::new(geocoder), router, AdvisorConfig::default());

    let err = advisor
        .advise(
            &AdviseRequest::new("Catedral"),
            &HazardSnapshot::empty(1),
            Utc::now(),
        )
        .await
        .expect_err("no route");
    assert_eq!(err, AdviseError::NoRouteFound);
}

#[rstest]
#[tokio::test]
async fn provider_timeout_errors_are_reported_as_timeouts() {
    let geocoder = StubGeocoder::new().with_place("Catedral", CATEDRAL);
    let router = StubRouter::with_error(RouteProviderError::Timeout {
        url: "http://osrm.invalid/route/v1/driving".into(),
        timeout_secs: 10,
    });
    let advisor = RouteAdvisor::new(Arc::new(geocoder), router, AdvisorConfig::default());

    let advisory = advisor
        .advise(
            &AdviseRequest::new("Catedral"),
            &HazardSnapshot::empty(1),
            Utc::now(),
        )
        .await
        .expect("fallback advisory");
    assert_eq!(
        advisory.route_source,
        RouteSource::Fallback {
            reason: FallbackReason::Timeout
        }
    );
}

#[rstest]
#[tokio::test]
async fn nearby_disasters_are_critical_warnings(direct_route: RouteCandidate) {
    let geocoder = StubGeocoder::new().with_place("Catedral", CATEDRAL);
    let router = StubRouter::with_candidates(vec![direct_route]);
    let advisor = RouteAdvisor::new(Arc::new(geocoder), router, AdvisorConfig::default());
    let now = Utc::now();
    let flood = DisasterRecord::user_reported(
        "d1",
        "flood",
        Coord {
            x: -106.08,
            y: 28.645,
        },
        RiskLevel::High,
        now,
    )
    .expect("valid disaster");
    let snapshot = HazardSnapshot::new(9, Vec::new(), Vec::new(), vec![flood]);

    let advisory = advisor
        .advise(&AdviseRequest::new("Catedral"), &snapshot, now)
        .await
        .expect("advisory");
    let disaster_warnings: Vec<_> = advisory
        .warnings
        .iter()
        .filter(|warning| warning.kind == WarningKind::Disaster)
        .collect();
    assert_eq!(disaster_warnings.len(), 1);
    assert_eq!(disaster_warnings[0].severity, RiskLevel::Critical);
    assert_eq!(advisory.snapshot_version, 9);
}
