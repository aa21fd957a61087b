use super::*;

const TIMING: TouchTiming = TouchTiming {
    hold_min_ms: 1_200,
    min_tap_length_ms: 50,
};

fn zone_touch(now_ms: u64) -> TouchObject {
    let mut touch = TouchObject::new(TouchId(1), Point::new(10.0, 20.0), now_ms, TIMING);
    touch.set_grid(Some(GridCoordinate::new(2, 3)));
    touch
}

fn count(events: &[GestureEvent], pred: impl Fn(&GestureEvent) -> bool) -> usize {
    events.iter().filter(|event| pred(event)).count()
}

fn is_life_complete(event: &GestureEvent) -> bool {
    matches!(event, GestureEvent::TouchLifeComplete(_))
}

#[test]
fn on_emits_only_for_addressable_touches() {
    let mut out = Vec::new();
    let mut plain = TouchObject::new(TouchId(7), Point::default(), 0, TIMING);
    plain.on(&mut out);
    assert!(plain.is_on());
    assert!(out.is_empty());

    let mut zoned = zone_touch(0);
    zoned.on(&mut out);
    zoned.on(&mut out);
    assert_eq!(count(&out, |e| matches!(e, GestureEvent::TouchOn(_))), 1);
}

#[test]
fn instant_tap_still_lasts_min_tap_length() {
    let mut out = Vec::new();
    let mut touch = zone_touch(1_000);
    touch.on(&mut out);
    assert_eq!(touch.off(1_000, &mut out), TouchStatus::Alive);
    assert_eq!(touch.touch_length_ms(), 50);
    assert_eq!(touch.next_due_ms(), Some(1_050));

    match out.last() {
        Some(GestureEvent::TouchOffZone(snapshot)) => assert_eq!(snapshot.touch_length_ms, 50),
        other => panic!("unexpected event {other:?}"),
    }

    assert_eq!(touch.fire_due(1_049, &mut out), TouchStatus::Alive);
    assert_eq!(touch.fire_due(1_050, &mut out), TouchStatus::LifeComplete);
    assert_eq!(touch.lifecycle(), Lifecycle::Removed);
    assert_eq!(count(&out, is_life_complete), 1);
}

#[test]
fn long_touch_releases_note_immediately() {
    let mut out = Vec::new();
    let mut touch = zone_touch(0);
    touch.on(&mut out);
    touch.off(400, &mut out);
    assert_eq!(touch.touch_length_ms(), 400);
    assert_eq!(touch.next_due_ms(), Some(400));
}

#[test]
fn double_off_completes_life_once() {
    let mut out = Vec::new();
    let mut touch = zone_touch(0);
    touch.on(&mut out);
    touch.off(10, &mut out);
    touch.off(20, &mut out);
    assert_eq!(touch.next_due_ms(), Some(50));
    touch.fire_due(100, &mut out);
    touch.off(120, &mut out);
    touch.fire_due(500, &mut out);
    assert_eq!(count(&out, is_life_complete), 1);
}

#[test]
fn non_addressable_off_completes_immediately() {
    let mut out = Vec::new();
    let mut touch = TouchObject::new(TouchId(3), Point::default(), 0, TIMING);
    assert_eq!(touch.off(5, &mut out), TouchStatus::LifeComplete);
    assert_eq!(touch.off(6, &mut out), TouchStatus::Alive);
    assert!(matches!(out[0], GestureEvent::TouchOffNonZone(_)));
    assert_eq!(count(&out, is_life_complete), 1);
}

#[test]
fn hold_pulses_on_and_off_on_a_zone() {
    let mut out = Vec::new();
    let mut touch = zone_touch(0);
    touch.start_hold_timer(0, 500);
    touch.on(&mut out);
    out.clear();

    // 500 and 1000 are below the hold minimum, 1500 starts the hold.
    for now_ms in [500, 1_000, 1_500] {
        touch.fire_due(now_ms, &mut out);
    }
    assert!(touch.is_holding());
    assert!(out.is_empty());

    touch.fire_due(2_000, &mut out);
    assert!(matches!(out[0], GestureEvent::HoldOnZone(_)));
    assert!(matches!(out[1], GestureEvent::TouchOn(_)));
    assert_eq!(touch.next_due_ms(), Some(2_450));

    touch.fire_due(2_450, &mut out);
    assert!(matches!(out[2], GestureEvent::TouchDeferredOff(_)));
    assert_eq!(count(&out, is_life_complete), 0);
    assert_eq!(touch.lifecycle(), Lifecycle::Active);
}

#[test]
fn release_after_hold_completes_life() {
    let mut out = Vec::new();
    let mut touch = zone_touch(0);
    touch.start_hold_timer(0, 500);
    touch.on(&mut out);
    touch.fire_due(2_000, &mut out);
    assert!(touch.is_holding());

    touch.off(2_100, &mut out);
    assert!(!touch.is_holding());
    assert_eq!(touch.fire_due(2_100, &mut out), TouchStatus::LifeComplete);
    assert_eq!(count(&out, is_life_complete), 1);
}

#[test]
fn hold_off_grid_reports_once() {
    let mut out = Vec::new();
    let mut touch = TouchObject::new(TouchId(4), Point::default(), 0, TIMING);
    touch.start_hold_timer(0, 500);
    // The 1500 tick starts the hold, the 2000 tick reports it.
    assert_eq!(touch.fire_due(1_500, &mut out), TouchStatus::Alive);
    assert!(out.is_empty());
    assert_eq!(touch.fire_due(2_000, &mut out), TouchStatus::HeldOffGrid);
    assert_eq!(
        count(&out, |e| matches!(e, GestureEvent::HoldOnNonZone(_))),
        1
    );
    assert_eq!(touch.next_due_ms(), None);
    assert_eq!(touch.fire_due(5_000, &mut out), TouchStatus::Alive);
}

#[test]
fn switch_tears_down_old_zone_without_completing() {
    let mut out = Vec::new();
    let mut touch = zone_touch(0);
    touch.on(&mut out);
    out.clear();

    touch.switch_to(
        300,
        Point::new(50.0, 60.0),
        Some(GridCoordinate::new(4, 3)),
        &mut out,
    );

    assert!(matches!(out[0], GestureEvent::TouchOffZone(s) if s.grid == Some(GridCoordinate::new(2, 3))));
    assert!(matches!(out[1], GestureEvent::TouchDeferredOff(_)));
    assert!(matches!(out[2], GestureEvent::TouchOn(s) if s.grid == Some(GridCoordinate::new(4, 3))));
    assert_eq!(out.len(), 3);
    assert_eq!(touch.lifecycle(), Lifecycle::Active);
    assert!(touch.is_on());
    assert_eq!(touch.began_point(), Point::new(50.0, 60.0));
    assert_eq!(touch.began_ms(), 300);
}

#[test]
fn removed_object_ignores_everything() {
    let mut out = Vec::new();
    let mut touch = zone_touch(0);
    touch.start_hold_timer(0, 100);
    touch.remove();
    touch.remove();
    touch.on(&mut out);
    touch.switch_to(10, Point::default(), Some(GridCoordinate::new(0, 0)), &mut out);
    assert_eq!(touch.off(20, &mut out), TouchStatus::Alive);
    assert_eq!(touch.fire_due(10_000, &mut out), TouchStatus::Alive);
    assert!(out.is_empty());
    assert_eq!(touch.grid(), None);
    assert_eq!(touch.began_point(), Point::default());
    assert_eq!(touch.touch_length_ms(), 0);
    assert_eq!(touch.id(), TouchId(1));
}

#[test]
fn huge_hold_interval_does_not_overflow_the_note_off() {
    let mut out = Vec::new();
    let interval_ms = u64::MAX / 4;
    let mut touch = zone_touch(0);
    touch.start_hold_timer(0, interval_ms);
    touch.on(&mut out);

    touch.fire_due(interval_ms, &mut out);
    assert!(touch.is_holding());
    touch.fire_due(2 * interval_ms, &mut out);
    assert!(out.iter().any(|event| matches!(event, GestureEvent::HoldOnZone(_))));
    assert_eq!(touch.next_due_ms(), Some(2 * interval_ms + u64::MAX / 10));
}
