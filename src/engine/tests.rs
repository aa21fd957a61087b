use super::*;
use crate::types::{TouchContact, Viewport};

const VIEWPORT: Viewport = Viewport::new(200.0, 300.0);
const CENTER: Point = Point::new(100.0, 150.0);

fn single(point: Point) -> TouchBatch {
    TouchBatch::new(&[TouchContact::new(1, point.x, point.y)], Some(VIEWPORT))
}

fn ring(radius: f32, start_deg: f32, step_deg: f32, count: usize) -> Vec<Point> {
    (0..count)
        .map(|k| {
            let angle = (start_deg + step_deg * k as f32).to_radians();
            Point::new(
                CENTER.x + radius * angle.cos(),
                CENTER.y + radius * angle.sin(),
            )
        })
        .collect()
}

fn rotation_engine() -> GestureEngine {
    let mut engine = GestureEngine::new(GestureConfig::default());
    engine.set_active_area(40.0, 80.0).unwrap();
    engine
}

/// Plays a single-touch path and returns every emitted event.
fn play(engine: &mut GestureEngine, down: Point, moves: &[Point], lift: bool) -> Vec<GestureEvent> {
    let mut events = engine.touch_began(0, &single(down)).events;
    let mut now_ms = 0;
    for point in moves {
        now_ms += 10;
        events.extend(engine.touch_moved(now_ms, &single(*point)).events);
    }
    if lift {
        let last = moves.last().copied().unwrap_or(down);
        events.extend(engine.touch_ended(now_ms + 10, &single(last)).events);
    }
    events
}

fn count(events: &[GestureEvent], name: &str) -> usize {
    events.iter().filter(|event| event.name() == name).count()
}

#[test]
fn shake_passes_through() {
    let mut engine = GestureEngine::new(GestureConfig::default());
    let output = engine.shake(5);
    assert_eq!(output.events, vec![GestureEvent::Shake]);
    assert_eq!(output.trace.now_ms, 5);
}

#[test]
fn inverted_active_area_is_rejected() {
    let mut engine = rotation_engine();
    assert!(engine.set_active_area(90.0, 30.0).is_err());
    assert_eq!(
        engine.circle().annulus().map(|area| area.outer_radius),
        Some(80.0)
    );
}

#[test]
fn counter_clockwise_loop_completes_reverse_rotation() {
    let mut engine = rotation_engine();
    let events = play(
        &mut engine,
        Point::new(100.0, 100.0),
        &ring(60.0, -120.0, -30.0, 12),
        true,
    );

    assert_eq!(count(&events, "rotation_began"), 1);
    assert_eq!(count(&events, "rotation_moved"), 9);
    let tail: Vec<_> = events
        .iter()
        .filter(|event| event.name().starts_with("rotation") || event.name().starts_with("reverse"))
        .rev()
        .take(2)
        .collect();
    assert_eq!(
        tail,
        vec![
            &GestureEvent::ReverseRotationCompleted,
            &GestureEvent::RotationEnded {
                direction: RotationDirection::CounterClockwise
            },
        ]
    );
    assert!(!engine.is_rotating());
}

#[test]
fn leaving_the_active_area_ends_rotation() {
    let mut engine = rotation_engine();
    let mut moves = ring(60.0, -60.0, 30.0, 4);
    moves.push(Point::new(
        CENTER.x + 100.0 * 60f32.to_radians().cos(),
        CENTER.y + 100.0 * 60f32.to_radians().sin(),
    ));
    let events = play(&mut engine, Point::new(100.0, 100.0), &moves, false);

    assert_eq!(count(&events, "rotation_began"), 1);
    assert_eq!(
        events.last(),
        Some(&GestureEvent::RotationEnded {
            direction: RotationDirection::Unknown
        })
    );
    assert!(!engine.is_rotating());
}

#[test]
fn second_finger_stops_rotation() {
    let mut engine = rotation_engine();
    play(
        &mut engine,
        Point::new(100.0, 100.0),
        &ring(60.0, -60.0, 30.0, 4),
        false,
    );
    assert!(engine.is_rotating());

    let second = TouchBatch::new(&[TouchContact::new(2, 20.0, 20.0)], Some(VIEWPORT))
        .with_all_touches(2);
    let output = engine.touch_began(100, &second);
    assert!(output.events.contains(&GestureEvent::RotationEnded {
        direction: RotationDirection::Unknown
    }));
    assert_eq!(output.trace.rotation_reject, RejectReason::MultiTouch);
    assert_eq!(output.trace.touch_count, 2);
}

#[test]
fn unset_active_area_never_rotates() {
    let mut engine = GestureEngine::new(GestureConfig::default());
    let events = play(
        &mut engine,
        Point::new(100.0, 100.0),
        &ring(60.0, -60.0, 30.0, 12),
        true,
    );
    assert_eq!(count(&events, "rotation_began"), 0);
    assert_eq!(engine.trace().rotation_reject, RejectReason::AnnulusUnset);
}

#[test]
fn trace_follows_the_gesture() {
    let mut engine = GestureEngine::new(GestureConfig::default());
    let down = TouchBatch::new(
        &[
            TouchContact::new(1, 20.0, 20.0),
            TouchContact::new(2, 60.0, 20.0),
        ],
        Some(VIEWPORT),
    );
    let began = engine.touch_began(0, &down);
    assert_eq!(began.trace.phase, GesturePhase::Assessing);
    assert_eq!(began.trace.live_touches, 2);
    assert_eq!(began.trace.touch_count, 2);

    let assessed = engine.tick(50);
    assert_eq!(assessed.trace.phase, GesturePhase::Tap);
    assert!(engine.touch(TouchId(1)).is_some_and(|touch| touch.on));
}

#[test]
fn time_never_runs_backwards() {
    let mut engine = GestureEngine::new(GestureConfig::default());
    engine.tick(100);
    let output = engine.tick(40);
    assert_eq!(output.trace.now_ms, 100);
}

#[test]
fn next_deadline_tracks_assessment() {
    let mut engine = GestureEngine::new(GestureConfig::default());
    assert_eq!(engine.next_due_ms(), None);
    engine.touch_began(10, &single(Point::new(20.0, 20.0)));
    assert_eq!(engine.next_due_ms(), Some(60));
}
