//! Behavioural coverage for [`RouteEvaluator::select_best`].

use chrono::Utc;
use geo::Coord;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use saferoute_core::{
    EvaluateError, HazardSnapshot, RiskClassifier, RiskLevel, RiskZone, RouteCandidate,
    RouteEvaluator, RouteSelection,
};
use std::cell::RefCell;

type SelectionCell = RefCell<Option<Result<RouteSelection, EvaluateError>>>;

const MEDIUM_CENTRE: Coord = Coord {
    x: -106.10,
    y: 28.60,
};
const HIGH_CENTRE: Coord = Coord {
    x: -106.05,
    y: 28.66,
};

fn snapshot() -> HazardSnapshot {
    let zones = vec![
        RiskZone::new("m", "Medium", MEDIUM_CENTRE, 0.5, RiskLevel::Medium).expect("zone"),
        RiskZone::new("h", "High", HIGH_CENTRE, 0.5, RiskLevel::High).expect("zone"),
    ];
    HazardSnapshot::new(1, zones, Vec::new(), Vec::new())
}

/// Three vertices heading north from `centre`, all well inside its zone.
fn candidate_through(centre: Coord) -> RouteCandidate {
    let vertices = (0..3)
        .map(|step| Coord {
            x: centre.x,
            y: centre.y + f64::from(step) * 0.001,
        })
        .collect();
    RouteCandidate::new(vertices, 0.3, 1.0).expect("valid candidate")
}

#[fixture]
fn candidates() -> RefCell<Vec<RouteCandidate>> {
    RefCell::new(Vec::new())
}

#[fixture]
fn selection() -> SelectionCell {
    RefCell::new(None)
}

fn select(
    avoid_risk: bool,
    candidates: &RefCell<Vec<RouteCandidate>>,
    selection: &SelectionCell,
) {
    let evaluator = RouteEvaluator::new(RiskClassifier::default()).with_stride(1);
    *selection.borrow_mut() = Some(evaluator.select_best(
        candidates.borrow().clone(),
        avoid_risk,
        &snapshot(),
        Utc::now(),
    ));
}

fn selected(selection: &SelectionCell) -> RouteSelection {
    match selection.borrow().as_ref() {
        Some(Ok(chosen)) => chosen.clone(),
        other => panic!("expected a selection, got {other:?}"),
    }
}

// --- Given steps ---

#[given("a high risk candidate followed by a medium risk candidate")]
fn high_then_medium(#[from(candidates)] candidates: &RefCell<Vec<RouteCandidate>>) {
    *candidates.borrow_mut() = vec![
        candidate_through(HIGH_CENTRE),
        candidate_through(MEDIUM_CENTRE),
    ];
}

#[given("two identical candidates through the high risk zone")]
fn identical(#[from(candidates)] candidates: &RefCell<Vec<RouteCandidate>>) {
    *candidates.borrow_mut() = vec![
        candidate_through(HIGH_CENTRE),
        candidate_through(HIGH_CENTRE),
    ];
}

#[given("no candidates")]
fn no_candidates(#[from(candidates)] candidates: &RefCell<Vec<RouteCandidate>>) {
    candidates.borrow_mut().clear();
}

// --- When steps ---

#[when("I select the best route avoiding risk")]
fn select_avoiding(
    #[from(candidates)] candidates: &RefCell<Vec<RouteCandidate>>,
    #[from(selection)] selection: &SelectionCell,
) {
    select(true, candidates, selection);
}

#[when("I select the best route without avoiding risk")]
fn select_plain(
    #[from(candidates)] candidates: &RefCell<Vec<RouteCandidate>>,
    #[from(selection)] selection: &SelectionCell,
) {
    select(false, candidates, selection);
}

// --- Then steps ---

#[then("candidate {index} is selected")]
fn then_index(index: usize, #[from(selection)] selection: &SelectionCell) {
    assert_eq!(selected(selection).index, index);
}

#[then("the selection score is {score}")]
fn then_score(score: u32, #[from(selection)] selection: &SelectionCell) {
    assert_eq!(selected(selection).score, Some(score));
}

#[then("the selection is unscored")]
fn then_unscored(#[from(selection)] selection: &SelectionCell) {
    assert_eq!(selected(selection).score, None);
}

#[then("the selected route risk is {risk}")]
fn then_risk(risk: RiskLevel, #[from(selection)] selection: &SelectionCell) {
    assert_eq!(selected(selection).risk, risk);
}

#[then("no route can be selected")]
fn then_none(#[from(selection)] selection: &SelectionCell) {
    assert!(
        matches!(&*selection.borrow(), Some(Err(EvaluateError::NoCandidates))),
        "expected NoCandidates, got {:?}",
        selection.borrow()
    );
}

// --- Scenario registrations ---

macro_rules! register_scenario {
    ($fn_name:ident, $title:literal) => {
        #[scenario(path = "tests/features/route_selection.feature", name = $title)]
        fn $fn_name(candidates: RefCell<Vec<RouteCandidate>>, selection: SelectionCell) {
            let _ = (candidates, selection);
        }
    };
}

register_scenario!(lower_score_wins, "the lower scoring candidate wins");
register_scenario!(ties_keep_first, "equal scores keep the first candidate");
register_scenario!(
    first_candidate_without_avoidance,
    "without risk avoidance the first candidate is used"
);
register_scenario!(empty_list_errors, "an empty candidate list is an error");
