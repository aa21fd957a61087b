use super::*;

impl ClassifierHsm {
    pub(crate) fn new(config: GestureConfig, resolver: Box<dyn ZoneResolver>) -> Self {
        Self {
            timing: TouchTiming::from(&config.hold),
            config,
            resolver,
            registry: TouchRegistry::new(),
            phase: GesturePhase::Idle,
            began_point: None,
            reference_center: Point::default(),
            touch_count_at_begin: 0,
            swipe_flagged: false,
            center_hold: false,
            assessment: OneShot::new(),
            reject_reason: RejectReason::None,
        }
    }

    /// Registers the batch and arms the assessment delay. Returns the phase to
    /// enter, or `None` when the call changes nothing.
    pub(super) fn begin_gesture(
        &mut self,
        context: &mut DispatchContext,
        batch: &TouchBatch,
    ) -> Option<GesturePhase> {
        let Some(viewport) = batch.viewport else {
            log::warn!("classifier: touch down without viewport");
            self.reject_reason = RejectReason::MissingViewport;
            // Only a gesture under assessment fails; live touches keep their release path.
            if self.phase != GesturePhase::Assessing {
                return None;
            }
            self.assessment.cancel();
            self.registry.remove_all();
            return Some(GesturePhase::Idle);
        };

        let created = self
            .registry
            .add(&batch.contacts, context.now_ms, self.timing);
        if created.is_empty() {
            log::warn!("classifier: touch down carried no new touches");
            self.reject_reason = RejectReason::NoNewTouches;
            return None;
        }

        self.reject_reason = RejectReason::None;
        self.swipe_flagged = false;
        self.center_hold = false;
        self.reference_center = viewport.center();
        self.began_point = batch.first_point();
        self.touch_count_at_begin = batch.active_count();

        for id in created {
            let Some(object) = self.registry.get_mut(id) else {
                continue;
            };
            let point = object.began_point();
            object.set_grid(self.resolver.resolve(point, viewport));
            if let Some(interval_ms) = self.config.hold.interval_ms {
                object.start_hold_timer(context.now_ms, interval_ms);
            }
            let touch = object.snapshot();
            context.emit(GestureEvent::TouchBegan { point, touch });
        }

        self.assessment
            .arm(context.now_ms, self.config.assessment.delay_ms);
        log::debug!(
            "classifier: began count={} live={}",
            self.touch_count_at_begin,
            self.registry.len()
        );
        Some(GesturePhase::Assessing)
    }

    pub(super) fn cancel_gesture(&mut self, context: &mut DispatchContext, batch: &TouchBatch) {
        self.assessment.cancel();
        self.emit_drag_ended(context, batch);
        self.registry.remove_all();
        self.swipe_flagged = false;
        self.center_hold = false;
    }

    pub(super) fn sweep_touches(&mut self, context: &mut DispatchContext) {
        let summary = self
            .registry
            .fire_due(context.now_ms, &mut context.events);
        if summary.held_off_grid && self.phase == GesturePhase::Center && !self.center_hold {
            self.center_hold = true;
            context.emit(GestureEvent::HoldOnCenter);
        }
    }

    /// Ends the assessment window and decides what the gesture is.
    pub(super) fn finalize(&mut self, context: &mut DispatchContext) -> GesturePhase {
        self.assessment.cancel();
        context.emit(GestureEvent::AssessmentComplete);

        let began = self.began_point.unwrap_or_default();
        let phase = if self.touch_count_at_begin == 1 && self.in_center(began) {
            GesturePhase::Center
        } else if self.swipe_flagged {
            self.registry.remove_all();
            GesturePhase::Swipe
        } else if self.touch_count_at_begin >= self.config.assessment.drag_touch_threshold {
            context.emit(GestureEvent::DragBegan { point: began });
            self.registry.remove_all();
            GesturePhase::Drag
        } else {
            self.registry.all_on(&mut context.events);
            GesturePhase::Tap
        };
        log::debug!(
            "classifier: assessed {:?} count={}",
            phase,
            self.touch_count_at_begin
        );
        phase
    }

    pub(super) fn assess_swipe(&mut self, context: &mut DispatchContext, batch: &TouchBatch) {
        if self.touch_count_at_begin != 1 {
            return;
        }
        let Some(measure) = batch.first_point().and_then(|point| self.swipe_measure(point)) else {
            return;
        };
        if measure > self.config.swipe.start_distance {
            self.swipe_flagged = true;
            let began = self.began_point.unwrap_or_default();
            context.emit(GestureEvent::SwipeBegan { began });
        }
    }

    /// Emitted on every release; returns the point it carried.
    pub(super) fn emit_drag_ended(
        &self,
        context: &mut DispatchContext,
        batch: &TouchBatch,
    ) -> Point {
        let point = batch
            .first_point()
            .or(self.began_point)
            .unwrap_or_default();
        context.emit(GestureEvent::DragEnded { point });
        point
    }

    pub(super) fn emit_touch_moves(&self, context: &mut DispatchContext, batch: &TouchBatch) {
        for contact in &batch.contacts {
            if let Some(object) = self.registry.get(contact.id) {
                context.emit(GestureEvent::TouchMoved {
                    point: contact.point,
                    touch: object.snapshot(),
                });
            }
        }
    }

    pub(super) fn finish_swipe(&mut self, context: &mut DispatchContext, ended: Point) {
        let Some(began) = self.began_point else {
            return;
        };
        match self.swipe_measure(ended) {
            Some(measure) if measure > self.config.swipe.end_distance => {
                context.emit(GestureEvent::SwipeEnded { began, ended });
            }
            _ => log::debug!("classifier: swipe too short to end"),
        }
        self.swipe_flagged = false;
    }

    pub(super) fn finish_center(&mut self, context: &mut DispatchContext, point: Point) {
        if self.in_center(point) && !self.center_hold {
            context.emit(GestureEvent::CenterPress);
        }
        self.registry.remove_all();
        self.center_hold = false;
    }
}
