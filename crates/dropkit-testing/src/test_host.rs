use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use std::time::Duration;

use dropkit_animation::SnapBack;
use dropkit_core::{DragHost, ElementId, ScheduleError, TimerId};
use dropkit_geometry::{Point, Rect};

struct Element {
    frame: Rect,
    parent: Option<ElementId>,
}

struct Timer {
    id: TimerId,
    repeating: bool,
    callback: Box<dyn FnMut()>,
}

struct Settle {
    element: ElementId,
    callback: Box<dyn FnOnce()>,
}

struct Animation {
    element: ElementId,
    snap_back: SnapBack,
    on_end: Option<Box<dyn FnOnce()>>,
}

#[derive(Default)]
struct Inner {
    elements: HashMap<ElementId, Element>,
    next_id: u64,
    scroll_enabled: bool,
    timers: Vec<Timer>,
    firing: bool,
    cancelled_while_firing: HashSet<TimerId>,
    waiting_settle: Vec<Settle>,
    animations: Vec<Animation>,
}

/// In-memory [`DragHost`] with a manually pumped scheduler.
pub struct TestHost {
    inner: RefCell<Inner>,
}

impl TestHost {
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            inner: RefCell::new(Inner {
                scroll_enabled: true,
                ..Inner::default()
            }),
        })
    }

    /// Registers an element with the given frame (relative to its parent).
    pub fn add_element(&self, frame: Rect, parent: Option<ElementId>) -> ElementId {
        let mut inner = self.inner.borrow_mut();
        let id = ElementId(inner.next_id);
        inner.next_id += 1;
        inner.elements.insert(id, Element { frame, parent });
        id
    }

    /// Overwrites an element's frame without a layout pass, e.g. to model a
    /// frame the host has not committed yet.
    pub fn set_frame(&self, element: ElementId, frame: Rect) {
        self.inner
            .borrow_mut()
            .elements
            .get_mut(&element)
            .expect("unknown element")
            .frame = frame;
    }

    pub fn frame_of(&self, element: ElementId) -> Rect {
        self.frame(element)
    }

    pub fn parent_of(&self, element: ElementId) -> Option<ElementId> {
        self.parent(element)
    }

    pub fn scroll_enabled(&self) -> bool {
        self.inner.borrow().scroll_enabled
    }

    /// Ids of every armed timer, in scheduling order.
    pub fn armed_timers(&self) -> Vec<TimerId> {
        self.inner.borrow().timers.iter().map(|t| t.id.clone()).collect()
    }

    /// Every snap-back run requested so far, oldest first.
    pub fn animations(&self) -> Vec<(ElementId, SnapBack)> {
        self.inner
            .borrow()
            .animations
            .iter()
            .map(|a| (a.element, a.snap_back))
            .collect()
    }

    /// Performs a layout pass: settle notifications subscribed for elements
    /// with non-zero geometry are delivered, once each.
    pub fn run_layout(&self) {
        let ready = {
            let mut inner = self.inner.borrow_mut();
            let pending = std::mem::take(&mut inner.waiting_settle);
            let mut ready = Vec::new();
            for settle in pending {
                let settled = inner
                    .elements
                    .get(&settle.element)
                    .is_some_and(|e| !e.frame.size().is_zero());
                if settled {
                    ready.push(settle.callback);
                } else {
                    inner.waiting_settle.push(settle);
                }
            }
            ready
        };
        for callback in ready {
            callback();
        }
    }

    /// Fires every armed timer once. Non-repeating timers are disarmed before
    /// their callback runs; repeating ones stay armed unless cancelled.
    pub fn fire_timers(&self) {
        let due = {
            let mut inner = self.inner.borrow_mut();
            inner.firing = true;
            std::mem::take(&mut inner.timers)
        };
        let mut survivors = Vec::new();
        for mut timer in due {
            if self.inner.borrow().cancelled_while_firing.contains(&timer.id) {
                continue;
            }
            (timer.callback)();
            if timer.repeating
                && !self.inner.borrow().cancelled_while_firing.contains(&timer.id)
            {
                survivors.push(timer);
            }
        }
        let mut inner = self.inner.borrow_mut();
        inner.firing = false;
        inner.cancelled_while_firing.clear();
        // Timers scheduled from inside a callback come after the survivors.
        survivors.append(&mut inner.timers);
        inner.timers = survivors;
    }

    /// Jumps every pending snap-back to its end position and invokes its
    /// completion callback.
    pub fn complete_animations(&self) {
        let pending = {
            let mut inner = self.inner.borrow_mut();
            let mut pending = Vec::new();
            for animation in inner.animations.iter_mut() {
                if let Some(on_end) = animation.on_end.take() {
                    pending.push((animation.element, animation.snap_back.to, on_end));
                }
            }
            pending
        };
        for (element, to, on_end) in pending {
            self.set_position(element, to);
            on_end();
        }
    }
}

impl DragHost for TestHost {
    fn frame(&self, element: ElementId) -> Rect {
        self.inner
            .borrow()
            .elements
            .get(&element)
            .expect("unknown element")
            .frame
    }

    fn parent(&self, element: ElementId) -> Option<ElementId> {
        self.inner
            .borrow()
            .elements
            .get(&element)
            .expect("unknown element")
            .parent
    }

    fn set_position(&self, element: ElementId, position: Point) {
        {
            let mut inner = self.inner.borrow_mut();
            let entry = inner.elements.get_mut(&element).expect("unknown element");
            entry.frame.x = position.x;
            entry.frame.y = position.y;
        }
        // Setting a position forces a synchronous layout recompute.
        self.run_layout();
    }

    fn reparent(&self, element: ElementId, new_parent: ElementId) {
        self.inner
            .borrow_mut()
            .elements
            .get_mut(&element)
            .expect("unknown element")
            .parent = Some(new_parent);
    }

    fn is_scroll_enabled(&self) -> bool {
        self.inner.borrow().scroll_enabled
    }

    fn set_scroll_enabled(&self, enabled: bool) {
        self.inner.borrow_mut().scroll_enabled = enabled;
    }

    fn schedule(
        &self,
        timer: TimerId,
        _delay: Duration,
        repeating: bool,
        callback: Box<dyn FnMut()>,
    ) -> Result<(), ScheduleError> {
        let mut inner = self.inner.borrow_mut();
        if inner.timers.iter().any(|t| t.id == timer) {
            return Err(ScheduleError::DuplicateTimer(timer));
        }
        inner.timers.push(Timer {
            id: timer,
            repeating,
            callback,
        });
        Ok(())
    }

    fn cancel(&self, timer: &TimerId) {
        let mut inner = self.inner.borrow_mut();
        inner.timers.retain(|t| &t.id != timer);
        if inner.firing {
            inner.cancelled_while_firing.insert(timer.clone());
        }
    }

    fn notify_layout_settled(&self, element: ElementId, callback: Box<dyn FnOnce()>) {
        let ready = {
            let inner = self.inner.borrow();
            inner
                .elements
                .get(&element)
                .is_some_and(|e| !e.frame.size().is_zero())
        };
        if ready {
            callback();
        } else {
            self.inner.borrow_mut().waiting_settle.push(Settle {
                element,
                callback,
            });
        }
    }

    fn animate(&self, element: ElementId, snap_back: SnapBack, on_end: Box<dyn FnOnce()>) {
        log::debug!(
            "snap-back for {element}: ({}, {}) -> ({}, {})",
            snap_back.from.x,
            snap_back.from.y,
            snap_back.to.x,
            snap_back.to.y
        );
        self.inner.borrow_mut().animations.push(Animation {
            element,
            snap_back,
            on_end: Some(on_end),
        });
    }
}
