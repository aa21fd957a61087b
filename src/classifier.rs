//! Delay-gated classification of a touch gesture into tap, swipe, drag or
//! center press, owning the touch registry for the gesture's lifetime.

use statig::blocking::IntoStateMachineExt as _;

mod hsm;

use hsm::ClassifierHsm;

use crate::{
    config::GestureConfig,
    geometry::Point,
    touch::TouchRegistry,
    types::{GestureEvent, GesturePhase, GridCoordinate, RejectReason, TouchBatch, TouchId},
    zone::{NoZones, ZoneResolver},
};

#[derive(Clone, Debug)]
enum ClassifierEvent {
    Began(TouchBatch),
    Moved(TouchBatch),
    Ended(TouchBatch),
    Cancelled(TouchBatch),
    Timer,
    AssignGrid {
        id: TouchId,
        grid: Option<GridCoordinate>,
    },
    Switch {
        id: TouchId,
        point: Point,
        grid: Option<GridCoordinate>,
    },
    StartHold {
        id: TouchId,
        interval_ms: u64,
    },
}

#[derive(Debug, Default)]
struct DispatchContext {
    now_ms: u64,
    events: Vec<GestureEvent>,
}

impl DispatchContext {
    fn emit(&mut self, event: GestureEvent) {
        self.events.push(event);
    }
}

pub struct GestureClassifier {
    machine: statig::blocking::StateMachine<ClassifierHsm>,
}

impl GestureClassifier {
    pub fn new(config: &GestureConfig) -> Self {
        Self::with_resolver(config, Box::new(NoZones))
    }

    pub fn with_resolver(config: &GestureConfig, resolver: Box<dyn ZoneResolver>) -> Self {
        Self {
            machine: ClassifierHsm::new(*config, resolver).state_machine(),
        }
    }

    pub fn touch_began(&mut self, now_ms: u64, batch: &TouchBatch, out: &mut Vec<GestureEvent>) {
        self.dispatch(now_ms, ClassifierEvent::Began(batch.clone()), out);
    }

    pub fn touch_moved(&mut self, now_ms: u64, batch: &TouchBatch, out: &mut Vec<GestureEvent>) {
        self.dispatch(now_ms, ClassifierEvent::Moved(batch.clone()), out);
    }

    pub fn touch_ended(&mut self, now_ms: u64, batch: &TouchBatch, out: &mut Vec<GestureEvent>) {
        self.dispatch(now_ms, ClassifierEvent::Ended(batch.clone()), out);
    }

    pub fn touch_cancelled(
        &mut self,
        now_ms: u64,
        batch: &TouchBatch,
        out: &mut Vec<GestureEvent>,
    ) {
        self.dispatch(now_ms, ClassifierEvent::Cancelled(batch.clone()), out);
    }

    /// Fires every deadline at or before `now_ms` in deadline order.
    pub fn advance(&mut self, now_ms: u64, out: &mut Vec<GestureEvent>) {
        while let Some(due) = self.next_due_ms().filter(|due| *due <= now_ms) {
            self.dispatch(due, ClassifierEvent::Timer, out);
        }
    }

    pub fn next_due_ms(&self) -> Option<u64> {
        self.machine.inner().next_due_ms()
    }

    pub fn assign_grid(
        &mut self,
        now_ms: u64,
        id: TouchId,
        grid: Option<GridCoordinate>,
        out: &mut Vec<GestureEvent>,
    ) {
        self.dispatch(now_ms, ClassifierEvent::AssignGrid { id, grid }, out);
    }

    pub fn switch_touch(
        &mut self,
        now_ms: u64,
        id: TouchId,
        point: Point,
        grid: Option<GridCoordinate>,
        out: &mut Vec<GestureEvent>,
    ) {
        self.dispatch(now_ms, ClassifierEvent::Switch { id, point, grid }, out);
    }

    pub fn start_hold_timer(
        &mut self,
        now_ms: u64,
        id: TouchId,
        interval_ms: u64,
        out: &mut Vec<GestureEvent>,
    ) {
        self.dispatch(now_ms, ClassifierEvent::StartHold { id, interval_ms }, out);
    }

    pub fn phase(&self) -> GesturePhase {
        self.machine.inner().phase()
    }

    pub fn registry(&self) -> &TouchRegistry {
        self.machine.inner().registry()
    }

    pub fn touch_count_at_begin(&self) -> u8 {
        self.machine.inner().touch_count_at_begin()
    }

    pub fn reject_reason(&self) -> RejectReason {
        self.machine.inner().reject_reason()
    }

    fn dispatch(&mut self, now_ms: u64, event: ClassifierEvent, out: &mut Vec<GestureEvent>) {
        let mut context = DispatchContext {
            now_ms,
            events: std::mem::take(out),
        };
        self.machine.handle_with_context(&event, &mut context);
        *out = context.events;
    }
}
