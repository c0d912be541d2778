// Integration tests for the trajectory engine and controller.
// Native-only; no browser APIs are touched.

use function_aim::sim::{
    EvalError, GameController, Level, LevelCatalog, ShotOutcome, Status, evaluate_shot,
    segment_intersects_circle,
};
use function_aim::{ConfigError, GameConfig};
use glam::DVec2;
use proptest::prelude::*;

fn first_level() -> Level {
    LevelCatalog::standard().get(0).cloned().unwrap()
}

// Classic scenario: x * 0.5 from (400, 550) lands 350 units from the target
#[test]
fn half_slope_misses_first_target() {
    let config = GameConfig::default();
    let shot = evaluate_shot(&first_level(), DVec2::new(400.0, 550.0), "x * 0.5", &config);

    let Some(trace) = shot.trace.as_ref() else {
        panic!("trace expected for a valid expression");
    };
    assert!(!trace.obstacle_hit);
    match shot.outcome {
        ShotOutcome::Missed { distance } => assert!((distance - 350.0).abs() < 1e-9),
        other => panic!("expected a miss, got {:?}", other),
    }
}

#[test]
fn malformed_expression_reports_error_and_keeps_level() {
    let mut controller = GameController::new(LevelCatalog::standard(), GameConfig::default(), 1).unwrap();
    let shot = controller.submit("x +");

    assert!(matches!(shot.outcome, ShotOutcome::TraceFailed(_)));
    assert!(shot.trace.is_none());
    assert!(controller.status_message().starts_with("Error evaluating function"));
    assert_eq!(controller.state().level_index, 0);
}

#[test]
fn blockade_near_line_stops_trace_before_target_check() {
    // Flat line at y = 450 would hit the target at (600, 450) dead center,
    // but passes 30 units from the blockade first.
    let level = Level::new((600.0, 450.0), (450.0, 480.0), "100");
    let config = GameConfig::default();
    let shot = evaluate_shot(&level, DVec2::new(300.0, 550.0), "100", &config);

    assert_eq!(shot.outcome, ShotOutcome::ObstacleHit);
    let trace = shot.trace.unwrap();
    assert!(trace.obstacle_hit);
    assert_eq!(trace.hit_index, Some(trace.points.len() - 1));
    // Start point, vertical jump to the line, then the first horizontal step
    assert_eq!(trace.points.len(), 3);
}

#[test]
fn final_level_completion_is_terminal() {
    let levels = vec![
        Level::new((400.0, 450.0), (5000.0, 5000.0), "100"),
        Level::new((400.0, 350.0), (5000.0, 5000.0), "200"),
    ];
    let catalog = LevelCatalog::new(levels).unwrap();
    let mut controller = GameController::new(catalog, GameConfig::default(), 99).unwrap();

    controller.submit("100");
    assert_eq!(controller.state().level_index, 1);
    assert_eq!(controller.state().expression, "200");

    controller.submit("200");
    assert_eq!(controller.state().level_index, 1);
    assert_eq!(controller.state().status, Status::Completed);
    assert_eq!(
        controller.status_message(),
        "Congratulations! You've completed all levels!"
    );

    // Reloading after completion moves nothing and keeps the final status
    controller.load_level(0);
    assert_eq!(controller.state().level_index, 1);
    assert_eq!(controller.state().status, Status::Completed);
}

#[test]
fn runaway_expression_fails_the_shot_cleanly() {
    let src = format!("{}x", "x+".repeat(20_000));
    let shot = evaluate_shot(&first_level(), DVec2::new(400.0, 550.0), &src, &GameConfig::default());

    assert!(shot.trace.is_none());
    assert_eq!(shot.outcome, ShotOutcome::TraceFailed(EvalError::TooLarge));
}

#[test]
fn controller_refuses_unbounded_sampling() {
    let config = GameConfig {
        sample_step: 1e-9,
        ..GameConfig::default()
    };
    assert!(matches!(
        GameController::new(LevelCatalog::standard(), config, 5),
        Err(ConfigError::TooManySamples { .. })
    ));
}

#[test]
fn target_check_error_is_reported_separately() {
    // log(x + 1) is fine to the right of the start, NaN far to the left
    let level = Level::new((60.0, 300.0), (5000.0, 5000.0), "x");
    let config = GameConfig::default();
    let shot = evaluate_shot(&level, DVec2::new(700.0, 550.0), "log(x + 1)", &config);

    assert!(shot.trace.is_some());
    assert!(matches!(shot.outcome, ShotOutcome::TargetCheckFailed(_)));
}

#[test]
fn segment_mode_is_more_lenient_than_line_mode() {
    // Line sloping down to the right; extended back up-left it runs
    // straight through the blockade behind the player
    let level = Level::new((700.0, 300.0), (100.0, 490.0), "x");
    let start = DVec2::new(400.0, 550.0);
    let expr = "-x * 0.2";

    let line = evaluate_shot(&level, start, expr, &GameConfig::default());
    assert_eq!(line.outcome, ShotOutcome::ObstacleHit);

    let segment_config = GameConfig {
        collision: function_aim::CollisionMode::Segment,
        ..GameConfig::default()
    };
    let segment = evaluate_shot(&level, start, expr, &segment_config);
    assert_ne!(segment.outcome, ShotOutcome::ObstacleHit);
}

fn token() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec![
        "x", "1", "2.5", "+", "-", "*", "/", "**", "(", ")", ",", "sin", "pow", "log", "pi", "y",
        "$",
    ])
}

proptest! {
    #[test]
    fn evaluator_never_panics(src in ".{0,40}", x in -1000.0f64..1000.0) {
        let _ = function_aim::sim::evaluate(&src, x);
    }

    #[test]
    fn failed_trace_never_yields_points(tokens in prop::collection::vec(token(), 0..12), start_x in 50.0f64..750.0) {
        let src = tokens.join(" ");
        let shot = evaluate_shot(&first_level(), DVec2::new(start_x, 550.0), &src, &GameConfig::default());
        let failed = matches!(shot.outcome, ShotOutcome::TraceFailed(_));
        prop_assert_eq!(failed, shot.trace.is_none());
    }

    #[test]
    fn trace_is_idempotent(k in -3.0f64..3.0, start_x in 50.0f64..750.0, level in 0usize..10) {
        let catalog = LevelCatalog::standard();
        let level = catalog.clamped(level);
        let src = format!("x * {} + sin(x / 40) * 30", k);
        let start = DVec2::new(start_x, 550.0);
        let config = GameConfig::default();

        let a = evaluate_shot(level, start, &src, &config);
        let b = evaluate_shot(level, start, &src, &config);
        prop_assert_eq!(a, b);
    }

    #[test]
    fn degenerate_segment_is_point_in_circle(
        px in -1000.0f64..1000.0,
        py in -1000.0f64..1000.0,
        r in 0.0f64..200.0,
    ) {
        let p = DVec2::new(px, py);
        let c = DVec2::new(400.0, 200.0);
        prop_assume!((p.distance(c) - r).abs() > 1e-6);
        prop_assert_eq!(segment_intersects_circle(p, p, c, r), p.distance(c) <= r);
    }

    #[test]
    fn level_index_never_decreases(
        actions in prop::collection::vec((0usize..12, prop::sample::select(vec!["x * 0.5", "100", "x +", "0"])), 1..20),
        seed in any::<u64>(),
    ) {
        let mut controller = GameController::new(LevelCatalog::standard(), GameConfig::default(), seed).unwrap();
        let mut last = 0;
        for (load, expr) in actions {
            controller.load_level(load);
            prop_assert!(controller.state().level_index >= last);
            last = controller.state().level_index;
            controller.submit(expr);
            prop_assert!(controller.state().level_index >= last);
            prop_assert!(controller.state().level_index <= 9);
            last = controller.state().level_index;
        }
    }
}
