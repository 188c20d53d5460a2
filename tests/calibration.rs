use property_planner::calibration::{CalibrationOutcome, CalibrationSession, CalibrationState, DistanceReply};
use property_planner::Point;
use proptest::prelude::*;

fn calibrate(a: Point, b: Point, reply: DistanceReply) -> CalibrationOutcome {
    let mut session = CalibrationSession::new();
    session.begin();
    let mut prompt = move || reply;
    assert_eq!(
        session.capture(a, &mut prompt),
        CalibrationOutcome::StartCaptured(a)
    );
    session.capture(b, &mut prompt)
}

#[test]
fn test_calibration_uses_city_block_distance() {
    let outcome = calibrate(
        Point::new(0.0, 0.0),
        Point::new(30.0, 40.0),
        DistanceReply::confirmed(35.0),
    );
    let CalibrationOutcome::Calibrated(scale) = outcome else {
        panic!("expected calibration, got {outcome:?}");
    };
    // 35 ft over 70 px (not 50 px Euclidean)
    assert!((scale.feet_per_pixel() - 0.5).abs() < 1e-12);
}

#[test]
fn test_same_point_twice_is_abandoned() {
    let p = Point::new(12.0, 12.0);
    let outcome = calibrate(p, p, DistanceReply::confirmed(100.0));
    assert_eq!(outcome, CalibrationOutcome::Abandoned);
}

#[test]
fn test_cancelled_prompt_is_abandoned() {
    let outcome = calibrate(
        Point::new(0.0, 0.0),
        Point::new(10.0, 0.0),
        DistanceReply {
            feet: 50.0,
            confirmed: false,
        },
    );
    assert_eq!(outcome, CalibrationOutcome::Abandoned);
}

#[test]
fn test_non_positive_distance_is_abandoned() {
    for feet in [0.0, -4.0] {
        let outcome = calibrate(
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            DistanceReply::confirmed(feet),
        );
        assert_eq!(outcome, CalibrationOutcome::Abandoned);
    }
}

#[test]
fn test_abandon_returns_to_awaiting_start() {
    let mut session = CalibrationSession::new();
    session.begin();
    let mut prompt = DistanceReply::cancelled;
    session.capture(Point::new(0.0, 0.0), &mut prompt);
    session.capture(Point::new(5.0, 5.0), &mut prompt);
    assert_eq!(session.state(), CalibrationState::AwaitingStart);
}

#[test]
fn test_success_ends_session() {
    let mut session = CalibrationSession::new();
    session.begin();
    session.capture_start(Point::new(0.0, 0.0));
    let pending = session.capture_end(Point::new(0.0, 200.0)).unwrap();
    assert_eq!(pending.pixel_distance, 200.0);
    let outcome = session.resolve(pending, DistanceReply::confirmed(100.0));
    assert!(matches!(outcome, CalibrationOutcome::Calibrated(_)));
    assert!(!session.is_active());
    assert_eq!(
        session.reference_line(),
        Some((Point::new(0.0, 0.0), Point::new(0.0, 200.0)))
    );
}

proptest! {
    #[test]
    fn prop_scale_is_distance_over_l1(
        ax in -1000.0f64..1000.0, ay in -1000.0f64..1000.0,
        dx in 1.0f64..500.0, dy in -500.0f64..500.0,
        feet in 0.01f64..10_000.0,
    ) {
        let a = Point::new(ax, ay);
        let b = Point::new(ax + dx, ay + dy);
        let outcome = calibrate(a, b, DistanceReply::confirmed(feet));
        let CalibrationOutcome::Calibrated(scale) = outcome else {
            panic!("expected calibration, got {outcome:?}");
        };
        let expected = feet / a.manhattan_distance(b);
        prop_assert!(scale.feet_per_pixel() > 0.0);
        prop_assert!((scale.feet_per_pixel() - expected).abs() <= expected * 1e-12);
    }

    #[test]
    fn prop_zero_span_never_calibrates(x in -1000.0f64..1000.0, y in -1000.0f64..1000.0, feet in 0.01f64..1000.0) {
        let p = Point::new(x, y);
        prop_assert_eq!(calibrate(p, p, DistanceReply::confirmed(feet)), CalibrationOutcome::Abandoned);
    }
}
