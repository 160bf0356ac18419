//! End-to-end drag lifecycle tests against the in-memory host.

use std::cell::RefCell;
use std::rc::Rc;

use dropkit_core::{ConfigError, DragCallback, DragEngine, DropCallback, ElementId};
use dropkit_geometry::{Point, Rect};
use dropkit_testing::TestHost;

type DragLog = Rc<RefCell<Vec<(ElementId, Option<ElementId>)>>>;
type DropLog = Rc<RefCell<Vec<(ElementId, ElementId)>>>;

fn drag_logger() -> (DragLog, DragCallback) {
    let log: DragLog = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    let callback: DragCallback =
        Rc::new(move |element, area| sink.borrow_mut().push((element, area)));
    (log, callback)
}

fn drop_logger() -> (DropLog, DropCallback) {
    let log: DropLog = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    let callback: DropCallback =
        Rc::new(move |element, area| sink.borrow_mut().push((element, area)));
    (log, callback)
}

/// One drag area with a single 200x200 drop area at the origin and a 50x50
/// draggable sitting at (10, 10) inside it, registered as a direct child of
/// the drag area.
fn single_area_fixture() -> (Rc<TestHost>, DragEngine, ElementId, ElementId) {
    let host = TestHost::new();
    let drag_area = host.add_element(Rect::new(0.0, 0.0, 600.0, 600.0), None);
    let drop_area = host.add_element(Rect::new(0.0, 0.0, 200.0, 200.0), Some(drag_area));
    let draggable = host.add_element(Rect::new(10.0, 10.0, 50.0, 50.0), Some(drag_area));

    let engine = DragEngine::new(host.clone());
    engine.make_drag_area(drag_area);
    engine.make_drop_area(drop_area).unwrap();
    (host, engine, drop_area, draggable)
}

#[test]
fn configuration_order_is_enforced() {
    let host = TestHost::new();
    let area = host.add_element(Rect::new(0.0, 0.0, 100.0, 100.0), None);
    let element = host.add_element(Rect::new(0.0, 0.0, 10.0, 10.0), None);

    let engine = DragEngine::new(host.clone());
    assert_eq!(engine.make_drop_area(area), Err(ConfigError::NoDragArea));
    assert_eq!(
        engine.make_draggable(element, true, true, None, None),
        Err(ConfigError::NoDragArea)
    );

    engine.make_drag_area(area);
    assert_eq!(
        engine.make_draggable(element, true, true, None, None),
        Err(ConfigError::NoDropAreas)
    );

    engine.make_drop_area(area).unwrap();
    assert_eq!(engine.make_draggable(element, true, true, None, None), Ok(()));
}

#[test]
fn second_drag_area_replaces_the_first() {
    let host = TestHost::new();
    let first = host.add_element(Rect::new(0.0, 0.0, 300.0, 300.0), None);
    let second = host.add_element(Rect::new(0.0, 0.0, 600.0, 600.0), None);
    let drop_area = host.add_element(Rect::new(0.0, 0.0, 200.0, 200.0), Some(first));
    let draggable = host.add_element(Rect::new(10.0, 10.0, 50.0, 50.0), Some(drop_area));

    let engine = DragEngine::new(host.clone());
    engine.make_drag_area(first);
    engine.make_drop_area(drop_area).unwrap();
    engine
        .make_draggable(draggable, true, true, None, None)
        .unwrap();

    engine.make_drag_area(second);
    engine.on_touch_start(draggable, 35.0, 35.0);

    // Drags started after the replacement reparent under the new area.
    assert_eq!(host.parent_of(draggable), Some(second));
    assert_eq!(host.frame_of(draggable).origin(), Point::new(10.0, 10.0));
}

#[test]
fn invalid_release_snaps_back_without_on_drop() {
    let (host, engine, _drop_area, draggable) = single_area_fixture();
    let (drops, on_drop) = drop_logger();
    engine
        .make_draggable(draggable, true, true, None, Some(on_drop))
        .unwrap();

    engine.on_touch_start(draggable, 35.0, 35.0);
    engine.on_touch_move(100.0, 100.0);
    engine.on_touch_end(500.0, 500.0);

    assert!(drops.borrow().is_empty());
    let animations = host.animations();
    assert_eq!(animations.len(), 1);
    let (element, snap) = animations[0];
    assert_eq!(element, draggable);
    assert_eq!(snap.from, Point::new(75.0, 75.0));
    assert_eq!(snap.to, Point::new(10.0, 10.0));
    assert!(!engine.is_dragging());

    host.complete_animations();
    assert_eq!(host.frame_of(draggable).origin(), Point::new(10.0, 10.0));
}

#[test]
fn valid_release_fires_on_drop_and_updates_drop_position() {
    let (host, engine, drop_area, draggable) = single_area_fixture();
    let (drops, on_drop) = drop_logger();
    engine
        .make_draggable(draggable, true, true, None, Some(on_drop))
        .unwrap();

    engine.on_touch_start(draggable, 35.0, 35.0);
    engine.on_touch_move(100.0, 100.0);
    engine.on_touch_end(100.0, 100.0);

    assert_eq!(drops.borrow().as_slice(), &[(draggable, drop_area)]);
    // Touch point minus half-extents.
    assert_eq!(engine.last_drop_position(draggable), Some(Point::new(75.0, 75.0)));
    assert_eq!(host.frame_of(draggable).origin(), Point::new(75.0, 75.0));
    assert!(host.animations().is_empty());
    assert!(!engine.is_dragging());
}

#[test]
fn drop_resolves_to_the_area_under_the_release_point() {
    let host = TestHost::new();
    let drag_area = host.add_element(Rect::new(0.0, 0.0, 600.0, 600.0), None);
    let area_a = host.add_element(Rect::new(0.0, 0.0, 100.0, 100.0), Some(drag_area));
    let area_b = host.add_element(Rect::new(200.0, 0.0, 100.0, 100.0), Some(drag_area));
    let draggable = host.add_element(Rect::new(25.0, 25.0, 50.0, 50.0), Some(drag_area));

    let engine = DragEngine::new(host.clone());
    engine.make_drag_area(drag_area);
    engine.make_drop_area(area_a).unwrap();
    engine.make_drop_area(area_b).unwrap();
    let (drops, on_drop) = drop_logger();
    engine
        .make_draggable(draggable, true, true, None, Some(on_drop))
        .unwrap();

    engine.on_touch_start(draggable, 50.0, 50.0);
    engine.on_touch_move(250.0, 50.0);
    engine.on_touch_end(250.0, 50.0);

    assert_eq!(drops.borrow().as_slice(), &[(draggable, area_b)]);
    assert_eq!(host.frame_of(draggable).origin(), Point::new(225.0, 25.0));
}

#[test]
fn overlapping_areas_resolve_to_the_first_registered() {
    let host = TestHost::new();
    let drag_area = host.add_element(Rect::new(0.0, 0.0, 600.0, 600.0), None);
    let area_a = host.add_element(Rect::new(0.0, 0.0, 100.0, 100.0), Some(drag_area));
    let area_b = host.add_element(Rect::new(0.0, 0.0, 100.0, 100.0), Some(drag_area));
    let draggable = host.add_element(Rect::new(25.0, 25.0, 50.0, 50.0), Some(drag_area));

    let engine = DragEngine::new(host.clone());
    engine.make_drag_area(drag_area);
    engine.make_drop_area(area_a).unwrap();
    engine.make_drop_area(area_b).unwrap();
    let (drops, on_drop) = drop_logger();
    engine
        .make_draggable(draggable, true, true, None, Some(on_drop))
        .unwrap();

    engine.on_touch_start(draggable, 50.0, 50.0);
    engine.on_touch_end(50.0, 50.0);

    assert_eq!(drops.borrow().as_slice(), &[(draggable, area_a)]);
}

#[test]
fn single_area_retains_axis_outside_its_span() {
    let (host, engine, _drop_area, draggable) = single_area_fixture();
    engine
        .make_draggable(draggable, true, true, None, None)
        .unwrap();

    engine.on_touch_start(draggable, 35.0, 35.0);
    // X is beyond the area's horizontal span: retained exactly. Y moves.
    engine.on_touch_move(500.0, 100.0);

    assert_eq!(host.frame_of(draggable).origin(), Point::new(10.0, 75.0));
    assert_eq!(engine.last_drag_position(draggable), Some(Point::new(10.0, 75.0)));
}

#[test]
fn on_drag_fires_on_the_next_tick_not_inline() {
    let (host, engine, drop_area, draggable) = single_area_fixture();
    let (drags, on_drag) = drag_logger();
    engine
        .make_draggable(draggable, true, true, Some(on_drag), None)
        .unwrap();

    engine.on_touch_start(draggable, 35.0, 35.0);
    engine.on_touch_move(100.0, 100.0);

    // Deferred: nothing until the scheduler tick runs.
    assert!(drags.borrow().is_empty());
    host.fire_timers();
    assert_eq!(drags.borrow().as_slice(), &[(draggable, Some(drop_area))]);
}

#[test]
fn rejected_move_changes_nothing_and_schedules_nothing() {
    let host = TestHost::new();
    let drag_area = host.add_element(Rect::new(0.0, 0.0, 600.0, 600.0), None);
    let drop_area = host.add_element(Rect::new(0.0, 0.0, 200.0, 200.0), Some(drag_area));
    // Starts outside the only drop area, so every single-drop move that
    // cannot land inside is rejected outright.
    let draggable = host.add_element(Rect::new(400.0, 400.0, 50.0, 50.0), Some(drag_area));

    let engine = DragEngine::new(host.clone());
    engine.make_drag_area(drag_area);
    engine.make_drop_area(drop_area).unwrap();
    let (drags, on_drag) = drag_logger();
    engine
        .make_draggable(draggable, true, true, Some(on_drag), None)
        .unwrap();

    engine.on_touch_start(draggable, 425.0, 425.0);
    engine.on_touch_move(425.0, 300.0);

    assert_eq!(host.frame_of(draggable).origin(), Point::new(400.0, 400.0));
    host.fire_timers();
    assert!(drags.borrow().is_empty());
}

#[test]
fn drag_starts_reparent_nested_draggables_into_the_drag_area() {
    let host = TestHost::new();
    let drag_area = host.add_element(Rect::new(0.0, 0.0, 600.0, 600.0), None);
    let drop_area = host.add_element(Rect::new(50.0, 50.0, 200.0, 200.0), Some(drag_area));
    // Child of the drop area; its frame is relative to that parent.
    let draggable = host.add_element(Rect::new(10.0, 10.0, 50.0, 50.0), Some(drop_area));

    let engine = DragEngine::new(host.clone());
    engine.make_drag_area(drag_area);
    engine.make_drop_area(drop_area).unwrap();
    engine
        .make_draggable(draggable, true, true, None, None)
        .unwrap();

    engine.on_touch_start(draggable, 85.0, 85.0);

    // Now a direct child of the drag area, absolute position preserved by
    // the former parent's offset.
    assert_eq!(host.parent_of(draggable), Some(drag_area));
    assert_eq!(host.frame_of(draggable).origin(), Point::new(60.0, 60.0));
    assert_eq!(engine.last_drag_position(draggable), Some(Point::new(60.0, 60.0)));
    // (60, 60) sits inside the drop area, so it is also the first valid
    // drop position.
    assert_eq!(engine.last_drop_position(draggable), Some(Point::new(60.0, 60.0)));
}

#[test]
fn scroll_lock_held_for_the_drag_and_restored_after() {
    let (host, engine, _drop_area, draggable) = single_area_fixture();
    engine
        .make_draggable(draggable, true, true, None, None)
        .unwrap();

    assert!(host.scroll_enabled());
    engine.on_touch_start(draggable, 35.0, 35.0);
    assert!(!host.scroll_enabled());
    engine.on_touch_move(100.0, 100.0);
    assert!(!host.scroll_enabled());
    engine.on_touch_end(100.0, 100.0);
    assert!(host.scroll_enabled());
}

#[test]
fn constrained_axis_release_resolves_from_the_settled_frame() {
    let (host, engine, drop_area, draggable) = single_area_fixture();
    let (drops, on_drop) = drop_logger();
    // Horizontal only: the end handler must wait for committed geometry.
    engine
        .make_draggable(draggable, true, false, None, Some(on_drop))
        .unwrap();

    engine.on_touch_start(draggable, 35.0, 35.0);
    engine.on_touch_move(100.0, 35.0);
    engine.on_touch_end(100.0, 35.0);

    // Geometry is already valid, so the settle signal resolves the drop
    // without waiting, and the timeout timer is disarmed again.
    assert_eq!(drops.borrow().as_slice(), &[(draggable, drop_area)]);
    assert_eq!(host.frame_of(draggable).origin(), Point::new(75.0, 10.0));
    assert!(host.armed_timers().is_empty());
    assert!(!engine.is_dragging());
}

#[test]
fn constrained_axis_release_waits_for_late_geometry() {
    let (host, engine, drop_area, draggable) = single_area_fixture();
    let (drops, on_drop) = drop_logger();
    engine
        .make_draggable(draggable, false, true, None, Some(on_drop))
        .unwrap();

    engine.on_touch_start(draggable, 35.0, 35.0);
    engine.on_touch_move(35.0, 100.0);

    // Model a final frame that has not committed yet.
    host.set_frame(draggable, Rect::new(10.0, 75.0, 0.0, 0.0));
    engine.on_touch_end(35.0, 100.0);
    assert!(engine.is_dragging());
    assert!(drops.borrow().is_empty());

    // The frame commits; the next layout pass resolves the drop.
    host.set_frame(draggable, Rect::new(10.0, 75.0, 50.0, 50.0));
    host.run_layout();

    assert_eq!(drops.borrow().as_slice(), &[(draggable, drop_area)]);
    assert!(!engine.is_dragging());
    assert!(host.armed_timers().is_empty());
}

#[test]
fn settle_timeout_abandons_the_drop_with_a_snap_back() {
    let (host, engine, _drop_area, draggable) = single_area_fixture();
    let (drops, on_drop) = drop_logger();
    engine
        .make_draggable(draggable, false, true, None, Some(on_drop))
        .unwrap();

    engine.on_touch_start(draggable, 35.0, 35.0);
    engine.on_touch_move(35.0, 100.0);

    host.set_frame(draggable, Rect::new(10.0, 75.0, 0.0, 0.0));
    engine.on_touch_end(35.0, 100.0);

    // Geometry never settles; the timeout fires instead.
    host.fire_timers();

    assert!(drops.borrow().is_empty());
    assert!(!engine.is_dragging());
    assert!(host.scroll_enabled());
    let animations = host.animations();
    assert_eq!(animations.len(), 1);
    assert_eq!(animations[0].1.from, Point::new(10.0, 75.0));
    assert_eq!(animations[0].1.to, Point::new(10.0, 10.0));
}

#[test]
fn snap_back_falls_back_to_the_first_area_corner() {
    let host = TestHost::new();
    let drag_area = host.add_element(Rect::new(0.0, 0.0, 600.0, 600.0), None);
    let area_a = host.add_element(Rect::new(20.0, 30.0, 100.0, 100.0), Some(drag_area));
    let area_b = host.add_element(Rect::new(200.0, 0.0, 100.0, 100.0), Some(drag_area));
    // Never inside any drop area, so no valid drop position is ever recorded.
    let draggable = host.add_element(Rect::new(400.0, 400.0, 50.0, 50.0), Some(drag_area));

    let engine = DragEngine::new(host.clone());
    engine.make_drag_area(drag_area);
    engine.make_drop_area(area_a).unwrap();
    engine.make_drop_area(area_b).unwrap();
    engine
        .make_draggable(draggable, true, true, None, None)
        .unwrap();

    engine.on_touch_start(draggable, 425.0, 425.0);
    engine.on_touch_move(500.0, 500.0);
    engine.on_touch_end(500.0, 500.0);

    let animations = host.animations();
    assert_eq!(animations.len(), 1);
    assert_eq!(animations[0].1.to, Point::new(20.0, 30.0));
}

#[test]
fn destroy_is_idempotent_and_blocks_further_use() {
    let (host, engine, _drop_area, draggable) = single_area_fixture();
    engine
        .make_draggable(draggable, true, true, None, None)
        .unwrap();

    engine.on_touch_start(draggable, 35.0, 35.0);
    engine.destroy();
    assert!(!engine.is_dragging());
    assert!(host.scroll_enabled());
    assert!(host.armed_timers().is_empty());

    // Second destroy produces the same cleared state.
    engine.destroy();
    assert!(!engine.is_dragging());

    // The engine rejects configuration and ignores touches afterwards.
    let area = host.add_element(Rect::new(0.0, 0.0, 50.0, 50.0), None);
    assert_eq!(engine.make_drop_area(area), Err(ConfigError::NoDragArea));
    engine.on_touch_start(draggable, 35.0, 35.0);
    assert!(!engine.is_dragging());
}

#[test]
fn touches_without_an_active_drag_are_ignored() {
    let (host, engine, _drop_area, draggable) = single_area_fixture();
    engine
        .make_draggable(draggable, true, true, None, None)
        .unwrap();

    engine.on_touch_move(100.0, 100.0);
    engine.on_touch_end(100.0, 100.0);

    assert_eq!(host.frame_of(draggable).origin(), Point::new(10.0, 10.0));
    assert!(host.animations().is_empty());
    assert!(host.scroll_enabled());
}

#[test]
fn second_touch_start_during_a_drag_is_ignored() {
    let (host, engine, _drop_area, draggable) = single_area_fixture();
    let other = host.add_element(Rect::new(100.0, 100.0, 50.0, 50.0), None);
    engine
        .make_draggable(draggable, true, true, None, None)
        .unwrap();
    engine
        .make_draggable(other, true, true, None, None)
        .unwrap();

    engine.on_touch_start(draggable, 35.0, 35.0);
    engine.on_touch_start(other, 125.0, 125.0);
    engine.on_touch_move(60.0, 60.0);

    // Only the first draggable is in motion.
    assert_eq!(host.frame_of(draggable).origin(), Point::new(35.0, 35.0));
    assert_eq!(host.frame_of(other).origin(), Point::new(100.0, 100.0));
}
