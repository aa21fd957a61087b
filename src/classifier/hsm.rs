use super::*;
use crate::{
    config::SwipePolicy,
    geometry::distance,
    timer::OneShot,
    touch::TouchTiming,
};
use statig::prelude::*;

mod gesture;

pub(super) struct ClassifierHsm {
    config: GestureConfig,
    timing: TouchTiming,
    resolver: Box<dyn ZoneResolver>,
    registry: TouchRegistry,
    phase: GesturePhase,
    began_point: Option<Point>,
    reference_center: Point,
    touch_count_at_begin: u8,
    swipe_flagged: bool,
    center_hold: bool,
    assessment: OneShot,
    reject_reason: RejectReason,
}

#[state_machine(initial = "State::idle()")]
impl ClassifierHsm {
    #[state]
    fn idle(&mut self, context: &mut DispatchContext, event: &ClassifierEvent) -> Outcome<State> {
        match event {
            ClassifierEvent::Moved(_) => Handled,
            ClassifierEvent::Ended(batch) => {
                self.emit_drag_ended(context, batch);
                Handled
            }
            _ => self.handle_common(context, event),
        }
    }

    #[state]
    fn assessing(
        &mut self,
        context: &mut DispatchContext,
        event: &ClassifierEvent,
    ) -> Outcome<State> {
        match event {
            ClassifierEvent::Moved(batch) => {
                if !self.swipe_flagged {
                    self.assess_swipe(context, batch);
                }
                Handled
            }
            ClassifierEvent::Timer => {
                self.sweep_touches(context);
                if self.assessment.take_due(context.now_ms) {
                    let phase = self.finalize(context);
                    return self.enter(phase);
                }
                Handled
            }
            ClassifierEvent::Ended(batch) => {
                // Released before the delay: classify now, then treat as an ordinary release.
                let phase = self.finalize(context);
                self.release(context, batch, phase)
            }
            _ => self.handle_common(context, event),
        }
    }

    #[state]
    fn tap(&mut self, context: &mut DispatchContext, event: &ClassifierEvent) -> Outcome<State> {
        match event {
            ClassifierEvent::Moved(batch) => {
                self.emit_touch_moves(context, batch);
                Handled
            }
            ClassifierEvent::Ended(batch) => self.release(context, batch, GesturePhase::Tap),
            _ => self.handle_common(context, event),
        }
    }

    #[state]
    fn swipe(&mut self, context: &mut DispatchContext, event: &ClassifierEvent) -> Outcome<State> {
        match event {
            ClassifierEvent::Moved(_) => Handled,
            ClassifierEvent::Ended(batch) => self.release(context, batch, GesturePhase::Swipe),
            _ => self.handle_common(context, event),
        }
    }

    #[state]
    fn drag(&mut self, context: &mut DispatchContext, event: &ClassifierEvent) -> Outcome<State> {
        match event {
            ClassifierEvent::Moved(batch) => {
                if let Some(point) = batch.first_point() {
                    context.emit(GestureEvent::DragMoved { point });
                }
                Handled
            }
            ClassifierEvent::Ended(batch) => self.release(context, batch, GesturePhase::Drag),
            _ => self.handle_common(context, event),
        }
    }

    #[state]
    fn center(&mut self, context: &mut DispatchContext, event: &ClassifierEvent) -> Outcome<State> {
        match event {
            ClassifierEvent::Moved(batch) => match batch.first_point() {
                Some(point) if !self.in_center(point) => {
                    log::debug!("classifier: left center zone");
                    self.registry.remove_all();
                    self.enter(GesturePhase::Idle)
                }
                _ => Handled,
            },
            ClassifierEvent::Ended(batch) => self.release(context, batch, GesturePhase::Center),
            _ => self.handle_common(context, event),
        }
    }
}

impl ClassifierHsm {
    pub(super) fn next_due_ms(&self) -> Option<u64> {
        crate::timer::earliest(self.assessment.due_ms(), self.registry.next_due_ms())
    }

    pub(super) fn phase(&self) -> GesturePhase {
        self.phase
    }

    pub(super) fn registry(&self) -> &TouchRegistry {
        &self.registry
    }

    pub(super) fn touch_count_at_begin(&self) -> u8 {
        self.touch_count_at_begin
    }

    pub(super) fn reject_reason(&self) -> RejectReason {
        self.reject_reason
    }

    fn enter(&mut self, phase: GesturePhase) -> Outcome<State> {
        if phase != self.phase {
            log::debug!("classifier: {:?} -> {:?}", self.phase, phase);
        }
        self.phase = phase;
        match phase {
            GesturePhase::Idle => Transition(State::idle()),
            GesturePhase::Assessing => Transition(State::assessing()),
            GesturePhase::Tap => Transition(State::tap()),
            GesturePhase::Swipe => Transition(State::swipe()),
            GesturePhase::Drag => Transition(State::drag()),
            GesturePhase::Center => Transition(State::center()),
        }
    }

    /// Events every state treats the same way.
    fn handle_common(
        &mut self,
        context: &mut DispatchContext,
        event: &ClassifierEvent,
    ) -> Outcome<State> {
        match event {
            ClassifierEvent::Began(batch) => match self.begin_gesture(context, batch) {
                Some(phase) => self.enter(phase),
                None => Handled,
            },
            ClassifierEvent::Cancelled(batch) => {
                self.cancel_gesture(context, batch);
                self.enter(GesturePhase::Idle)
            }
            ClassifierEvent::Timer => {
                self.sweep_touches(context);
                if self.assessment.take_due(context.now_ms) {
                    log::warn!("classifier: stale assessment deadline dropped");
                }
                Handled
            }
            ClassifierEvent::AssignGrid { id, grid } => {
                if let Some(object) = self.registry.get_mut(*id) {
                    object.set_grid(*grid);
                }
                Handled
            }
            ClassifierEvent::Switch { id, point, grid } => {
                if let Some(object) = self.registry.get_mut(*id) {
                    object.switch_to(context.now_ms, *point, *grid, &mut context.events);
                }
                Handled
            }
            ClassifierEvent::StartHold { id, interval_ms } => {
                if let Some(object) = self.registry.get_mut(*id) {
                    object.start_hold_timer(context.now_ms, *interval_ms);
                }
                Handled
            }
            ClassifierEvent::Moved(_) | ClassifierEvent::Ended(_) => Handled,
        }
    }

    fn release(
        &mut self,
        context: &mut DispatchContext,
        batch: &TouchBatch,
        phase: GesturePhase,
    ) -> Outcome<State> {
        let point = self.emit_drag_ended(context, batch);
        match phase {
            GesturePhase::Swipe => self.finish_swipe(context, point),
            GesturePhase::Center => {
                self.finish_center(context, point);
                return self.enter(GesturePhase::Idle);
            }
            GesturePhase::Tap => {
                self.registry
                    .turn_off(batch.ids(), context.now_ms, &mut context.events);
            }
            GesturePhase::Drag | GesturePhase::Idle | GesturePhase::Assessing => {}
        }

        if batch.remaining_after_release() == 0 && !self.registry.any_on() {
            self.enter(GesturePhase::Idle)
        } else if phase != self.phase {
            self.enter(phase)
        } else {
            Handled
        }
    }

    fn swipe_measure(&self, point: Point) -> Option<f32> {
        let began = self.began_point?;
        match self.config.swipe.policy {
            SwipePolicy::Omnidirectional => Some(distance(began, point)),
            SwipePolicy::AwayFromCenter => Some(
                distance(self.reference_center, point) - distance(self.reference_center, began),
            ),
            SwipePolicy::Rightward => Some(point.x - began.x),
            SwipePolicy::Disabled => None,
        }
    }

    fn in_center(&self, point: Point) -> bool {
        distance(self.reference_center, point) < self.config.assessment.center_radius
    }
}
