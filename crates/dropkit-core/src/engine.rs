//! The drag engine: registration, touch lifecycle, and snap-back.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use dropkit_animation::SnapBack;
use dropkit_geometry::{Point, Size};
use log::{debug, error, warn};
use smallvec::SmallVec;

use crate::error::ConfigError;
use crate::host::{DragHost, ElementId, TimerId};
use crate::resolve::{resolve_target_position, AxisPermissions};

/// Fired asynchronously (next scheduler tick) after every applied move, with
/// the draggable and the drop area currently containing it, if any.
pub type DragCallback = Rc<dyn Fn(ElementId, Option<ElementId>)>;

/// Fired synchronously from the end handler on a valid drop, with the
/// draggable and the containing drop area.
pub type DropCallback = Rc<dyn Fn(ElementId, ElementId)>;

/// Delay for the deferred on-drag notification and the settle-wait unit.
const TICK: Duration = Duration::from_millis(1);

/// Settle-wait ticks granted before an unresolved drop is abandoned.
const SETTLE_TIMEOUT_TICKS: u32 = 32;

static NEXT_INSTANCE: AtomicU64 = AtomicU64::new(0);

/// Per-draggable registration and position bookkeeping.
struct DraggableState {
    element: ElementId,
    permissions: AxisPermissions,
    on_drag: Option<DragCallback>,
    on_drop: Option<DropCallback>,
    /// First real layout position, captured once geometry becomes non-zero.
    start_position: Option<Point>,
    /// Most recent position applied during a drag; the fallback coordinate
    /// when an axis of a move is rejected.
    last_drag_position: Option<Point>,
    /// Most recent position known to lie inside some drop area; the
    /// snap-back target after an invalid release.
    last_drop_position: Option<Point>,
}

struct EngineState {
    drag_area: Option<ElementId>,
    /// Registration order matters: the first containing area wins when drop
    /// areas overlap.
    drop_areas: SmallVec<[ElementId; 4]>,
    /// True iff exactly one drop area is registered, which constrains
    /// in-flight movement to that area's spans.
    single_drop: bool,
    draggables: Vec<DraggableState>,
    /// Index of the draggable currently in motion. At most one; the system
    /// is single-pointer.
    dragging: Option<usize>,
    /// Scroll-enable state of the hosting screen, saved while a drag is in
    /// flight and restored afterwards.
    saved_scroll: Option<bool>,
    destroyed: bool,
}

impl EngineState {
    fn new() -> Self {
        Self {
            drag_area: None,
            drop_areas: SmallVec::new(),
            single_drop: true,
            draggables: Vec::new(),
            dragging: None,
            saved_scroll: None,
            destroyed: false,
        }
    }

    fn draggable_index(&self, element: ElementId) -> Option<usize> {
        self.draggables.iter().position(|d| d.element == element)
    }
}

/// First drop area, in registration order, fully containing a box of `size`
/// centered at (`cx`, `cy`).
fn first_area_containing(
    host: &dyn DragHost,
    areas: &[ElementId],
    size: Size,
    cx: f32,
    cy: f32,
) -> Option<ElementId> {
    areas
        .iter()
        .copied()
        .find(|area| host.frame(*area).contains_centered(size, cx, cy))
}

struct EngineShared {
    host: Rc<dyn DragHost>,
    state: RefCell<EngineState>,
    /// Namespaces timer ids so timers from a torn-down engine never collide
    /// with a successor's.
    instance: u64,
}

/// Drag-and-drop engine for a single drag area.
///
/// Configure it with [`make_drag_area`](DragEngine::make_drag_area) (once),
/// then [`make_drop_area`](DragEngine::make_drop_area) (one or more), then
/// [`make_draggable`](DragEngine::make_draggable) per element. At runtime the
/// host feeds it [`on_touch_start`](DragEngine::on_touch_start) on a
/// draggable and [`on_touch_move`](DragEngine::on_touch_move) /
/// [`on_touch_end`](DragEngine::on_touch_end) on the drag area. Tear it down
/// with [`destroy`](DragEngine::destroy) when the owning screen goes away.
pub struct DragEngine {
    shared: Rc<EngineShared>,
}

impl DragEngine {
    pub fn new(host: Rc<dyn DragHost>) -> Self {
        Self {
            shared: Rc::new(EngineShared {
                host,
                state: RefCell::new(EngineState::new()),
                instance: NEXT_INSTANCE.fetch_add(1, Ordering::Relaxed),
            }),
        }
    }

    /// Declares the container inside which all dragging happens. Required
    /// before anything else; a second call replaces the previous area.
    pub fn make_drag_area(&self, area: ElementId) {
        let mut st = self.shared.state.borrow_mut();
        if st.destroyed {
            warn!("make_drag_area on a destroyed engine ignored");
            return;
        }
        if let Some(previous) = st.drag_area.replace(area) {
            debug!("drag area {previous} replaced by {area}");
        }
    }

    /// Appends a drop area. Fails if no drag area is registered yet.
    pub fn make_drop_area(&self, area: ElementId) -> Result<(), ConfigError> {
        let mut st = self.shared.state.borrow_mut();
        if st.drag_area.is_none() {
            return Err(ConfigError::NoDragArea);
        }
        st.drop_areas.push(area);
        st.single_drop = st.drop_areas.len() == 1;
        Ok(())
    }

    /// Registers a draggable with its per-axis permissions and callbacks.
    /// Fails if no drag area or no drop area is registered yet.
    pub fn make_draggable(
        &self,
        element: ElementId,
        allow_horizontal: bool,
        allow_vertical: bool,
        on_drag: Option<DragCallback>,
        on_drop: Option<DropCallback>,
    ) -> Result<(), ConfigError> {
        {
            let mut st = self.shared.state.borrow_mut();
            if st.drag_area.is_none() {
                return Err(ConfigError::NoDragArea);
            }
            if st.drop_areas.is_empty() {
                return Err(ConfigError::NoDropAreas);
            }
            st.draggables.push(DraggableState {
                element,
                permissions: AxisPermissions {
                    horizontal: allow_horizontal,
                    vertical: allow_vertical,
                },
                on_drag,
                on_drop,
                start_position: None,
                last_drag_position: None,
                last_drop_position: None,
            });
        }

        // Capture the start position lazily, the first time the element has
        // real geometry after a layout pass.
        let weak = Rc::downgrade(&self.shared);
        self.shared.host.notify_layout_settled(
            element,
            Box::new(move || {
                let Some(shared) = weak.upgrade() else { return };
                let origin = shared.host.frame(element).origin();
                let mut st = shared.state.borrow_mut();
                if st.destroyed {
                    return;
                }
                if let Some(d) = st.draggables.iter_mut().find(|d| d.element == element) {
                    if d.start_position.is_none() {
                        d.start_position = Some(origin);
                    }
                    if d.last_drag_position.is_none() {
                        d.last_drag_position = Some(origin);
                    }
                }
            }),
        );
        Ok(())
    }

    /// Touch-start on a draggable: begins a drag.
    pub fn on_touch_start(&self, element: ElementId, x: f32, y: f32) {
        self.shared.on_touch_start(element, x, y);
    }

    /// Touch-move on the drag area: applies a resolved position while a drag
    /// is in flight. Ignored otherwise.
    pub fn on_touch_move(&self, x: f32, y: f32) {
        self.shared.on_touch_move(x, y);
    }

    /// Touch-end on the drag area: resolves the drop, fires the on-drop
    /// callback on a valid release, or snaps the draggable back.
    pub fn on_touch_end(&self, x: f32, y: f32) {
        self.shared.on_touch_end(x, y);
    }

    /// Clears all state and cancels any armed timers. Idempotent.
    pub fn destroy(&self) {
        self.shared.destroy();
    }

    pub fn is_dragging(&self) -> bool {
        self.shared.state.borrow().dragging.is_some()
    }

    /// Most recent position applied to a registered draggable during a drag.
    pub fn last_drag_position(&self, element: ElementId) -> Option<Point> {
        let st = self.shared.state.borrow();
        let idx = st.draggable_index(element)?;
        st.draggables[idx].last_drag_position
    }

    /// Most recent position of a registered draggable known to lie inside a
    /// drop area.
    pub fn last_drop_position(&self, element: ElementId) -> Option<Point> {
        let st = self.shared.state.borrow();
        let idx = st.draggable_index(element)?;
        st.draggables[idx].last_drop_position
    }
}

impl EngineShared {
    fn drag_timer_id(&self, element: ElementId) -> TimerId {
        TimerId::new(format!("dropkit{}_{}_on_drag", self.instance, element))
    }

    fn settle_timer_id(&self, element: ElementId) -> TimerId {
        TimerId::new(format!("dropkit{}_{}_settle", self.instance, element))
    }

    fn on_touch_start(&self, element: ElementId, _x: f32, _y: f32) {
        let (idx, drag_area) = {
            let st = self.state.borrow();
            if st.destroyed || st.dragging.is_some() {
                return;
            }
            let Some(idx) = st.draggable_index(element) else {
                return;
            };
            let Some(drag_area) = st.drag_area else {
                return;
            };
            (idx, drag_area)
        };

        // Scrolling would fight the drag; lock it until the drop resolves.
        let saved_scroll = self.host.is_scroll_enabled();
        self.host.set_scroll_enabled(false);

        // A draggable must be a direct child of the drag area while in
        // motion. On first drag out of a nested container, translate the
        // recorded start position by the former parent's offset so the
        // absolute position is preserved.
        let parent = self.host.parent(element);
        let position = match parent.filter(|p| *p != drag_area) {
            Some(parent) => {
                let start = self.state.borrow().draggables[idx].start_position;
                let local = start.unwrap_or_else(|| self.host.frame(element).origin());
                let offset = self.host.frame(parent).origin();
                let translated = local.translate(offset.x, offset.y);
                debug!("draggable {element} reparented under drag area {drag_area}");
                self.host.reparent(element, drag_area);
                self.host.set_position(element, translated);
                translated
            }
            None => self.host.frame(element).origin(),
        };

        let size = self.host.frame(element).size();
        let center = Point::new(position.x + size.width / 2.0, position.y + size.height / 2.0);

        let mut st = self.state.borrow_mut();
        if st.destroyed {
            return;
        }
        let contained =
            first_area_containing(self.host.as_ref(), &st.drop_areas, size, center.x, center.y);
        st.saved_scroll = Some(saved_scroll);
        st.dragging = Some(idx);
        let d = &mut st.draggables[idx];
        d.last_drag_position = Some(position);
        if d.last_drop_position.is_none() && contained.is_some() {
            d.last_drop_position = Some(position);
        }
    }

    fn on_touch_move(&self, x: f32, y: f32) {
        let applied = {
            let st = self.state.borrow();
            if st.destroyed {
                return;
            }
            let Some(idx) = st.dragging else {
                return;
            };
            let d = &st.draggables[idx];
            let size = self.host.frame(d.element).size();
            let single_area = if st.single_drop {
                st.drop_areas.first().map(|a| self.host.frame(*a))
            } else {
                None
            };
            let last = d
                .last_drag_position
                .unwrap_or_else(|| self.host.frame(d.element).origin());
            let target =
                resolve_target_position(single_area, d.permissions, size, last, Point::new(x, y));
            let center = Point::new(target.x + size.width / 2.0, target.y + size.height / 2.0);
            let area = first_area_containing(
                self.host.as_ref(),
                &st.drop_areas,
                size,
                center.x,
                center.y,
            );
            // With a single drop area the applied position must stay inside
            // it; with several, the draggable roams the whole drag area.
            if st.single_drop && area.is_none() {
                None
            } else {
                Some((idx, d.element, d.on_drag.clone(), target, area))
            }
        };
        let Some((idx, element, on_drag, target, area)) = applied else {
            return;
        };

        self.state.borrow_mut().draggables[idx].last_drag_position = Some(target);
        self.host.set_position(element, target);

        // The on-drag notification is deferred a tick so user code never
        // mutates drag state from inside the move handler.
        if let Some(on_drag) = on_drag {
            let timer = self.drag_timer_id(element);
            let result = self.host.schedule(
                timer,
                TICK,
                false,
                Box::new(move || on_drag(element, area)),
            );
            if let Err(err) = result {
                warn!("on-drag notification for {element} dropped: {err}");
            }
        }
    }

    fn on_touch_end(self: &Rc<Self>, x: f32, y: f32) {
        let (idx, element, permissions) = {
            let st = self.state.borrow();
            if st.destroyed {
                return;
            }
            let Some(idx) = st.dragging else {
                return;
            };
            let d = &st.draggables[idx];
            (idx, d.element, d.permissions)
        };

        if permissions.both() {
            self.finish_drop(idx, element, Point::new(x, y));
            return;
        }

        // An axis-constrained draggable resolves against its own committed
        // frame, which can lag the final touch event by a layout pass. Wait
        // for the settle signal, bounded by a timeout in case it never comes.
        let resolved = Rc::new(Cell::new(false));
        let timeout_timer = self.settle_timer_id(element);

        let timeout = {
            let resolved = Rc::clone(&resolved);
            let weak = Rc::downgrade(self);
            Box::new(move || {
                if resolved.replace(true) {
                    return;
                }
                let Some(shared) = weak.upgrade() else { return };
                error!("geometry for {element} never settled; abandoning the drop");
                shared.abandon_drop(idx, element);
            })
        };
        if let Err(err) = self.host.schedule(
            timeout_timer.clone(),
            TICK * SETTLE_TIMEOUT_TICKS,
            false,
            timeout,
        ) {
            warn!("settle timeout for {element} not armed: {err}");
        }

        let settle = {
            let resolved = Rc::clone(&resolved);
            let weak = Rc::downgrade(self);
            Box::new(move || {
                if resolved.replace(true) {
                    return;
                }
                let Some(shared) = weak.upgrade() else { return };
                shared.host.cancel(&timeout_timer);
                let center = shared.host.frame(element).center();
                shared.finish_drop(idx, element, center);
            })
        };
        self.host.notify_layout_settled(element, settle);
    }

    /// Resolves the final position for the draggable and either commits the
    /// drop or snaps it back. `touch` is the drop point, interpreted as the
    /// draggable's intended center.
    fn finish_drop(&self, idx: usize, element: ElementId, touch: Point) {
        let resolved = {
            let st = self.state.borrow();
            if st.destroyed || st.dragging != Some(idx) {
                return;
            }
            let d = &st.draggables[idx];
            let size = self.host.frame(element).size();
            let single_area = if st.single_drop {
                st.drop_areas.first().map(|a| self.host.frame(*a))
            } else {
                None
            };
            let last = d
                .last_drag_position
                .unwrap_or_else(|| self.host.frame(element).origin());
            let target = resolve_target_position(single_area, d.permissions, size, last, touch);
            // Validity is judged where the pointer released, not where the
            // clamped position would land: releasing outside every drop area
            // is an invalid drop even if the in-flight position never left
            // the single area.
            let area =
                first_area_containing(self.host.as_ref(), &st.drop_areas, size, touch.x, touch.y);
            let first_area = st.drop_areas.first().copied();
            (
                d.on_drop.clone(),
                target,
                area,
                first_area,
                d.last_drop_position,
            )
        };
        let (on_drop, target, area, first_area, last_drop) = resolved;

        match area {
            Some(area) => {
                {
                    let mut st = self.state.borrow_mut();
                    let d = &mut st.draggables[idx];
                    d.last_drag_position = Some(target);
                    d.last_drop_position = Some(target);
                }
                self.host.set_position(element, target);
                self.clear_drag();
                if let Some(on_drop) = on_drop {
                    on_drop(element, area);
                }
            }
            None => {
                // Snap back to the last valid drop position; a draggable that
                // has never sat in a drop area returns to the first area's
                // top-left corner.
                let fallback = first_area
                    .map(|a| self.host.frame(a).origin())
                    .unwrap_or(Point::ZERO);
                let to = last_drop.unwrap_or(fallback);
                self.state.borrow_mut().draggables[idx].last_drag_position = Some(to);
                self.clear_drag();
                self.host
                    .animate(element, SnapBack::new(target, to), Box::new(|| {}));
            }
        }
    }

    /// Timeout path of the settle wait: the drop never resolved, so snap the
    /// draggable back and end the interaction.
    fn abandon_drop(&self, idx: usize, element: ElementId) {
        let snap = {
            let st = self.state.borrow();
            if st.destroyed || st.dragging != Some(idx) {
                return;
            }
            let d = &st.draggables[idx];
            let from = d
                .last_drag_position
                .unwrap_or_else(|| self.host.frame(element).origin());
            let fallback = st
                .drop_areas
                .first()
                .map(|a| self.host.frame(*a).origin())
                .unwrap_or(Point::ZERO);
            let to = d.last_drop_position.unwrap_or(fallback);
            SnapBack::new(from, to)
        };
        self.state.borrow_mut().draggables[idx].last_drag_position = Some(snap.to);
        self.clear_drag();
        self.host.animate(element, snap, Box::new(|| {}));
    }

    fn clear_drag(&self) {
        let saved = {
            let mut st = self.state.borrow_mut();
            st.dragging = None;
            st.saved_scroll.take()
        };
        if let Some(enabled) = saved {
            self.host.set_scroll_enabled(enabled);
        }
    }

    fn destroy(&self) {
        let (elements, saved) = {
            let mut st = self.state.borrow_mut();
            if st.destroyed {
                return;
            }
            st.destroyed = true;
            st.dragging = None;
            st.drag_area = None;
            st.drop_areas.clear();
            st.single_drop = true;
            let elements: Vec<ElementId> = st.draggables.iter().map(|d| d.element).collect();
            st.draggables.clear();
            (elements, st.saved_scroll.take())
        };
        for element in elements {
            self.host.cancel(&self.drag_timer_id(element));
            self.host.cancel(&self.settle_timer_id(element));
        }
        if let Some(enabled) = saved {
            self.host.set_scroll_enabled(enabled);
        }
        debug!("drag engine {} destroyed", self.instance);
    }
}
