//! Host-facing engine: runs the gesture classifier and the circle detector
//! over the same touch stream and gates rotation events between them.

use crate::{
    classifier::GestureClassifier,
    config::GestureConfig,
    error::Result,
    geometry::Point,
    rotation::{CircleDetector, RecognizerState},
    types::{
        GestureEvent, GesturePhase, GridCoordinate, RejectReason, RotationDirection, TouchBatch,
        TouchId, TouchSnapshot,
    },
    zone::{NoZones, ZoneResolver},
};

/// State sampled at the end of every host call.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EngineTrace {
    pub now_ms: u64,
    pub phase: GesturePhase,
    pub classifier_reject: RejectReason,
    pub rotation_reject: RejectReason,
    pub live_touches: usize,
    pub touch_count: u8,
    pub rotation_tally: i32,
    pub rotation_direction: RotationDirection,
    pub rotating: bool,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct EngineOutput {
    pub events: Vec<GestureEvent>,
    pub trace: EngineTrace,
}

impl EngineOutput {
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.events.iter().map(GestureEvent::name)
    }
}

pub struct GestureEngine {
    classifier: GestureClassifier,
    circle: CircleDetector,
    rotating: bool,
    touch_count: u8,
    last_now_ms: u64,
    last_trace: EngineTrace,
}

impl GestureEngine {
    pub fn new(config: GestureConfig) -> Self {
        Self::with_resolver(config, NoZones)
    }

    pub fn with_resolver(config: GestureConfig, resolver: impl ZoneResolver + 'static) -> Self {
        Self {
            classifier: GestureClassifier::with_resolver(&config, Box::new(resolver)),
            circle: CircleDetector::new(&config.rotation),
            rotating: false,
            touch_count: 0,
            last_now_ms: 0,
            last_trace: EngineTrace::default(),
        }
    }

    /// Sets the rotation annulus around the viewport centre.
    pub fn set_active_area(&mut self, inner_radius: f32, outer_radius: f32) -> Result<()> {
        self.circle.set_active_area(inner_radius, outer_radius)
    }

    pub fn touch_began(&mut self, now_ms: u64, batch: &TouchBatch) -> EngineOutput {
        self.run(now_ms, |engine, now_ms, out| {
            engine.touch_count = batch.active_count();
            engine.classifier.touch_began(now_ms, batch, out);
            engine.circle.began(batch);
            engine.update_rotation(batch.active_count(), out);
        })
    }

    pub fn touch_moved(&mut self, now_ms: u64, batch: &TouchBatch) -> EngineOutput {
        self.run(now_ms, |engine, now_ms, out| {
            engine.touch_count = batch.active_count();
            engine.classifier.touch_moved(now_ms, batch, out);
            engine.circle.moved(batch);
            engine.update_rotation(batch.active_count(), out);
        })
    }

    pub fn touch_ended(&mut self, now_ms: u64, batch: &TouchBatch) -> EngineOutput {
        self.run(now_ms, |engine, now_ms, out| {
            engine.classifier.touch_ended(now_ms, batch, out);
            engine.circle.ended(batch);
            engine.update_rotation(batch.active_count(), out);
            engine.touch_count = batch.remaining_after_release();
        })
    }

    pub fn touch_cancelled(&mut self, now_ms: u64, batch: &TouchBatch) -> EngineOutput {
        self.run(now_ms, |engine, now_ms, out| {
            engine.classifier.touch_cancelled(now_ms, batch, out);
            engine.circle.cancelled();
            engine.stop_rotation(RotationDirection::Unknown, out);
            engine.touch_count = 0;
        })
    }

    /// Fires timers due at or before `now_ms`.
    pub fn tick(&mut self, now_ms: u64) -> EngineOutput {
        self.run(now_ms, |_, _, _| {})
    }

    pub fn next_due_ms(&self) -> Option<u64> {
        self.classifier.next_due_ms()
    }

    pub fn assign_grid(
        &mut self,
        now_ms: u64,
        id: TouchId,
        grid: Option<GridCoordinate>,
    ) -> EngineOutput {
        self.run(now_ms, |engine, now_ms, out| {
            engine.classifier.assign_grid(now_ms, id, grid, out);
        })
    }

    /// Moves a live touch into another zone, retriggering it there.
    pub fn switch_touch(
        &mut self,
        now_ms: u64,
        id: TouchId,
        point: Point,
        grid: Option<GridCoordinate>,
    ) -> EngineOutput {
        self.run(now_ms, |engine, now_ms, out| {
            engine.classifier.switch_touch(now_ms, id, point, grid, out);
        })
    }

    pub fn start_hold_timer(&mut self, now_ms: u64, id: TouchId, interval_ms: u64) -> EngineOutput {
        self.run(now_ms, |engine, now_ms, out| {
            engine
                .classifier
                .start_hold_timer(now_ms, id, interval_ms.max(1), out);
        })
    }

    pub fn shake(&mut self, now_ms: u64) -> EngineOutput {
        self.run(now_ms, |_, _, out| out.push(GestureEvent::Shake))
    }

    pub fn touch(&self, id: TouchId) -> Option<TouchSnapshot> {
        self.classifier
            .registry()
            .get(id)
            .map(|object| object.snapshot())
    }

    pub fn live_touches(&self) -> usize {
        self.classifier.registry().len()
    }

    pub fn phase(&self) -> GesturePhase {
        self.classifier.phase()
    }

    pub fn is_rotating(&self) -> bool {
        self.rotating
    }

    pub fn circle(&self) -> &CircleDetector {
        &self.circle
    }

    pub fn trace(&self) -> EngineTrace {
        self.last_trace
    }

    fn run(
        &mut self,
        now_ms: u64,
        call: impl FnOnce(&mut Self, u64, &mut Vec<GestureEvent>),
    ) -> EngineOutput {
        let now_ms = self.clamp_time(now_ms);
        let mut events = Vec::new();
        self.classifier.advance(now_ms, &mut events);
        call(self, now_ms, &mut events);
        self.classifier.advance(now_ms, &mut events);

        self.last_trace = self.sample_trace(now_ms);
        EngineOutput {
            events,
            trace: self.last_trace,
        }
    }

    fn clamp_time(&mut self, now_ms: u64) -> u64 {
        if now_ms < self.last_now_ms {
            log::warn!(
                "engine: time went backwards now={} last={}",
                now_ms,
                self.last_now_ms
            );
            return self.last_now_ms;
        }
        self.last_now_ms = now_ms;
        now_ms
    }

    fn sample_trace(&self, now_ms: u64) -> EngineTrace {
        EngineTrace {
            now_ms,
            phase: self.classifier.phase(),
            classifier_reject: self.classifier.reject_reason(),
            rotation_reject: self.circle.reject_reason(),
            live_touches: self.classifier.registry().len(),
            touch_count: self.touch_count,
            rotation_tally: self.circle.tally(),
            rotation_direction: self.circle.direction(),
            rotating: self.rotating,
        }
    }

    fn update_rotation(&mut self, touch_count: u8, out: &mut Vec<GestureEvent>) {
        if touch_count > 1 || self.classifier.phase() == GesturePhase::Drag {
            self.stop_rotation(RotationDirection::Unknown, out);
            return;
        }

        match self.circle.state() {
            RecognizerState::Changed => {
                let circle = &self.circle;
                let angle_deg = circle.angle_deg();
                if circle.began_in_zone()
                    && circle.in_zone()
                    && circle.is_significant()
                    && angle_deg != 0.0
                {
                    if !self.rotating {
                        self.rotating = true;
                        log::debug!("engine: rotation began tally={}", circle.tally());
                        out.push(GestureEvent::RotationBegan);
                    }
                    out.push(GestureEvent::RotationMoved { angle_deg });
                } else if self.rotating && !circle.in_zone() {
                    log::debug!("engine: rotation left active area");
                    self.stop_rotation(RotationDirection::Unknown, out);
                }
            }
            RecognizerState::Ended => {
                let direction = self.circle.direction();
                if self.rotating {
                    self.stop_rotation(direction, out);
                    if direction == RotationDirection::CounterClockwise {
                        out.push(GestureEvent::ReverseRotationCompleted);
                    }
                }
            }
            RecognizerState::Failed | RecognizerState::Cancelled => {
                self.stop_rotation(RotationDirection::Unknown, out);
            }
            RecognizerState::Possible | RecognizerState::Began => {}
        }
    }

    fn stop_rotation(&mut self, direction: RotationDirection, out: &mut Vec<GestureEvent>) {
        if !self.rotating {
            return;
        }
        self.rotating = false;
        out.push(GestureEvent::RotationEnded { direction });
    }
}

#[cfg(test)]
mod tests;
