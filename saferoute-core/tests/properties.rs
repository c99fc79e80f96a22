//! Property tests for the classifier, the evaluator and the estimator.

use chrono::{DateTime, TimeZone, Utc};
use geo::Coord;
use proptest::prelude::*;
use saferoute_core::{
    HazardSnapshot, RiskClassifier, RiskLevel, RiskZone, RouteCandidate, RouteEvaluator,
    TransportEstimator, TransportMode, distance_km,
};

const KM_PER_DEGREE: f64 = 111.2;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0)
        .single()
        .expect("valid time")
}

fn level() -> impl Strategy<Value = RiskLevel> {
    prop::sample::select(RiskLevel::ALL.to_vec())
}

/// A coordinate in a 5 km box around the city centre, so zones overlap.
fn central_coord() -> impl Strategy<Value = Coord> {
    (-106.10f64..-106.05, 28.60f64..28.65).prop_map(|(x, y)| Coord { x, y })
}

fn zone() -> impl Strategy<Value = RiskZone> {
    (central_coord(), 0.05f64..3.0, level()).prop_map(|(centre, radius, level)| {
        RiskZone::new("z", "zone", centre, radius, level).expect("valid zone")
    })
}

fn candidate() -> impl Strategy<Value = RouteCandidate> {
    prop::collection::vec(central_coord(), 2..25).prop_map(|vertices| {
        RouteCandidate::new(vertices, 5.0, 10.0).expect("valid candidate")
    })
}

proptest! {
    #[test]
    fn a_point_inside_a_zone_is_at_least_its_level(
        zone in zone(),
        bearing in 0.0f64..std::f64::consts::TAU,
        fraction in 0.0f64..0.9,
    ) {
        let reach_km = zone.radius_km() * fraction;
        let centre = zone.centre();
        let point = Coord {
            x: centre.x + reach_km * bearing.cos() / (KM_PER_DEGREE * centre.y.to_radians().cos()),
            y: centre.y + reach_km * bearing.sin() / KM_PER_DEGREE,
        };
        prop_assume!(distance_km(point, centre) <= zone.radius_km());
        let snapshot = HazardSnapshot::new(1, vec![zone.clone()], Vec::new(), Vec::new());
        let level = RiskClassifier::default().classify(point, &snapshot, now());
        prop_assert!(level >= zone.level());
    }

    #[test]
    fn the_highest_containing_zone_dominates(
        zones in prop::collection::vec(zone(), 1..12),
        point in central_coord(),
    ) {
        let snapshot = HazardSnapshot::new(1, zones.clone(), Vec::new(), Vec::new());
        let expected = zones
            .iter()
            .filter(|zone| zone.contains(point))
            .map(RiskZone::level)
            .max()
            .unwrap_or(RiskLevel::Low);
        prop_assert_eq!(RiskClassifier::default().classify(point, &snapshot, now()), expected);
    }

    #[test]
    fn selection_is_deterministic(
        zones in prop::collection::vec(zone(), 0..8),
        candidates in prop::collection::vec(candidate(), 1..6),
        stride in 1usize..12,
    ) {
        let snapshot = HazardSnapshot::new(1, zones, Vec::new(), Vec::new());
        let evaluator = RouteEvaluator::default().with_stride(stride);
        let first = evaluator.select_best(candidates.clone(), true, &snapshot, now());
        let second = evaluator.select_best(candidates, true, &snapshot, now());
        prop_assert_eq!(first, second);
    }

    #[test]
    fn selection_picks_the_first_minimum(
        zones in prop::collection::vec(zone(), 0..8),
        candidates in prop::collection::vec(candidate(), 2..6),
    ) {
        let snapshot = HazardSnapshot::new(1, zones, Vec::new(), Vec::new());
        let evaluator = RouteEvaluator::default();
        let scores: Vec<u32> = candidates
            .iter()
            .map(|candidate| evaluator.score(candidate, &snapshot, now()))
            .collect();
        let selection = evaluator
            .select_best(candidates, true, &snapshot, now())
            .expect("non-empty candidates");
        let best = scores.iter().copied().min().expect("scores");
        let first_best = scores.iter().position(|&score| score == best).expect("minimum");
        prop_assert_eq!(selection.index, first_best);
        prop_assert_eq!(selection.score, Some(best));
    }

    #[test]
    fn motorcycle_never_slower_than_car(
        distance in 0.1f64..200.0,
        duration in 0.1f64..600.0,
        risk in level(),
    ) {
        let options = TransportEstimator::default()
            .estimate(distance, duration, risk)
            .expect("valid inputs");
        let minutes = |mode: TransportMode| {
            options
                .iter()
                .find(|option| option.mode == mode)
                .map(|option| option.minutes)
                .expect("mode present")
        };
        prop_assert!(minutes(TransportMode::Motorcycle) <= minutes(TransportMode::Car));
    }

    #[test]
    fn cycling_is_always_low_risk(
        distance in 0.1f64..200.0,
        duration in 0.1f64..600.0,
        risk in level(),
    ) {
        let options = TransportEstimator::default()
            .estimate(distance, duration, risk)
            .expect("valid inputs");
        let bicycle = options
            .iter()
            .find(|option| option.mode == TransportMode::Bicycle)
            .expect("bicycle present");
        prop_assert_eq!(bicycle.risk, RiskLevel::Low);
        prop_assert!(bicycle.eco_friendly);
    }
}
