//! Headless demo: two screens sharing a draggable trio.
//!
//! Screen one registers three drop areas (multi-drop: draggables roam the
//! whole drag area); screen two registers a single one (movement is clamped
//! to its spans). Each screen builds its own engine against a fresh
//! [`TestHost`], drives a few synthetic single-pointer drag sessions, and
//! tears the engine down before the next screen takes over.

use std::rc::Rc;

use dropkit_core::{DragEngine, DropCallback, ElementId};
use dropkit_geometry::Rect;
use dropkit_testing::TestHost;

fn report_drop() -> DropCallback {
    Rc::new(|draggable, area| log::info!("{draggable} dropped in {area}"))
}

fn report_drag() -> dropkit_core::DragCallback {
    Rc::new(|draggable, area| match area {
        Some(area) => log::info!("{draggable} dragged over {area}"),
        None => log::info!("{draggable} dragged outside any drop area"),
    })
}

/// One full drag session: press on the draggable, move through the given
/// points, release at the last one.
fn drag_session(host: &TestHost, engine: &DragEngine, draggable: ElementId, path: &[(f32, f32)]) {
    let center = host.frame_of(draggable).center();
    engine.on_touch_start(draggable, center.x, center.y);
    for &(x, y) in path {
        engine.on_touch_move(x, y);
        host.fire_timers();
    }
    if let Some(&(x, y)) = path.last() {
        engine.on_touch_end(x, y);
    }
    host.fire_timers();
    host.complete_animations();
}

/// Three drop areas; dragging is free across the whole drag area.
fn screen_one() {
    log::info!("--- screen one: three drop areas ---");
    let host = TestHost::new();
    let drag_area = host.add_element(Rect::new(0.0, 0.0, 400.0, 700.0), None);
    let area_one = host.add_element(Rect::new(20.0, 20.0, 360.0, 180.0), Some(drag_area));
    let area_two = host.add_element(Rect::new(20.0, 240.0, 360.0, 180.0), Some(drag_area));
    let area_three = host.add_element(Rect::new(20.0, 460.0, 360.0, 180.0), Some(drag_area));

    // The draggables start nested inside the first drop area.
    let pink_rect = host.add_element(Rect::new(10.0, 10.0, 60.0, 60.0), Some(area_one));
    let green_circle = host.add_element(Rect::new(90.0, 10.0, 60.0, 60.0), Some(area_one));
    let red_rect = host.add_element(Rect::new(170.0, 10.0, 60.0, 60.0), Some(area_one));

    let engine = DragEngine::new(host.clone());
    engine.make_drag_area(drag_area);
    engine.make_drop_area(area_one).expect("drag area registered");
    engine.make_drop_area(area_two).expect("drag area registered");
    engine.make_drop_area(area_three).expect("drag area registered");

    engine
        .make_draggable(pink_rect, true, false, Some(report_drag()), Some(report_drop()))
        .expect("configured in order");
    engine
        .make_draggable(green_circle, false, true, Some(report_drag()), Some(report_drop()))
        .expect("configured in order");
    engine
        .make_draggable(red_rect, true, true, Some(report_drag()), Some(report_drop()))
        .expect("configured in order");

    // Free draggable lands in the second area.
    drag_session(&host, &engine, red_rect, &[(200.0, 150.0), (200.0, 330.0)]);
    // Vertical-only draggable crosses into the third area.
    drag_session(&host, &engine, green_circle, &[(140.0, 330.0), (140.0, 550.0)]);
    // Horizontal-only draggable released between areas snaps back.
    drag_session(&host, &engine, pink_rect, &[(350.0, 40.0), (395.0, 40.0)]);

    engine.destroy();
}

/// A single drop area; movement is clamped to its spans.
fn screen_two() {
    log::info!("--- screen two: single drop area ---");
    let host = TestHost::new();
    let drag_area = host.add_element(Rect::new(0.0, 0.0, 400.0, 700.0), None);
    let area = host.add_element(Rect::new(50.0, 50.0, 300.0, 300.0), Some(drag_area));
    let red_rect = host.add_element(Rect::new(60.0, 60.0, 60.0, 60.0), Some(drag_area));

    let engine = DragEngine::new(host.clone());
    engine.make_drag_area(drag_area);
    engine.make_drop_area(area).expect("drag area registered");
    engine
        .make_draggable(red_rect, true, true, Some(report_drag()), Some(report_drop()))
        .expect("configured in order");

    // Stays inside the only area; the release is valid.
    drag_session(&host, &engine, red_rect, &[(200.0, 200.0)]);
    // A release outside the area snaps the draggable back.
    drag_session(&host, &engine, red_rect, &[(200.0, 200.0), (600.0, 600.0)]);
    log::info!(
        "red rect rests at ({}, {})",
        host.frame_of(red_rect).x,
        host.frame_of(red_rect).y
    );

    engine.destroy();
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    screen_one();
    screen_two();
}
