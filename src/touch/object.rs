use crate::{
    config::HoldConfig,
    geometry::Point,
    timer::{earliest, OneShot, Repeating},
    types::{GestureEvent, GridCoordinate, TouchId, TouchSnapshot},
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Lifecycle {
    #[default]
    Active,
    Removed,
}

/// What the owner has to do after driving a touch object.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TouchStatus {
    Alive,
    /// A hold landed outside any addressable zone; reported once per hold.
    HeldOffGrid,
    /// Final off delivered; the owner must drop the object.
    LifeComplete,
}

/// Timing limits copied from the hold configuration at creation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TouchTiming {
    pub hold_min_ms: u64,
    pub min_tap_length_ms: u64,
}

impl From<&HoldConfig> for TouchTiming {
    fn from(config: &HoldConfig) -> Self {
        Self {
            hold_min_ms: config.min_duration_ms,
            min_tap_length_ms: config.min_tap_length_ms,
        }
    }
}

/// One finger's contact from first down to its final note-off.
#[derive(Clone, Debug)]
pub struct TouchObject {
    id: TouchId,
    began_point: Point,
    began_ms: u64,
    on: bool,
    grid: Option<GridCoordinate>,
    hold_timer: Repeating,
    holding: bool,
    switching: bool,
    touch_length_ms: u64,
    note_off_timer: OneShot,
    lifecycle: Lifecycle,
    timing: TouchTiming,
}

impl TouchObject {
    pub fn new(id: TouchId, began_point: Point, now_ms: u64, timing: TouchTiming) -> Self {
        Self {
            id,
            began_point,
            began_ms: now_ms,
            on: false,
            grid: None,
            hold_timer: Repeating::new(),
            holding: false,
            switching: false,
            touch_length_ms: timing.min_tap_length_ms,
            note_off_timer: OneShot::new(),
            lifecycle: Lifecycle::Active,
            timing,
        }
    }

    pub fn id(&self) -> TouchId {
        self.id
    }

    pub fn began_point(&self) -> Point {
        self.began_point
    }

    pub fn began_ms(&self) -> u64 {
        self.began_ms
    }

    pub fn is_on(&self) -> bool {
        self.on
    }

    pub fn is_holding(&self) -> bool {
        self.holding
    }

    pub fn grid(&self) -> Option<GridCoordinate> {
        self.grid
    }

    pub fn is_addressable(&self) -> bool {
        self.grid.is_some()
    }

    /// Last computed duration, never below the minimum tap length.
    pub fn touch_length_ms(&self) -> u64 {
        self.touch_length_ms
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    fn is_removed(&self) -> bool {
        self.lifecycle == Lifecycle::Removed
    }

    pub fn snapshot(&self) -> TouchSnapshot {
        TouchSnapshot {
            id: self.id,
            began_point: self.began_point,
            grid: self.grid,
            touch_length_ms: self.touch_length_ms,
            holding: self.holding,
            on: self.on,
        }
    }

    pub fn set_grid(&mut self, grid: Option<GridCoordinate>) {
        if self.is_removed() {
            return;
        }
        self.grid = grid;
    }

    pub fn start_hold_timer(&mut self, now_ms: u64, interval_ms: u64) {
        if self.is_removed() {
            return;
        }
        self.hold_timer.arm(now_ms, interval_ms);
    }

    pub fn on(&mut self, out: &mut Vec<GestureEvent>) {
        if self.is_removed() {
            return;
        }
        if self.on && !self.holding {
            return;
        }
        self.on = true;
        if self.is_addressable() {
            out.push(GestureEvent::TouchOn(self.snapshot()));
        }
    }

    pub fn off(&mut self, now_ms: u64, out: &mut Vec<GestureEvent>) -> TouchStatus {
        if self.is_removed() {
            log::debug!("touch: off ignored, id={} already removed", self.id.0);
            return TouchStatus::Alive;
        }
        self.on = false;
        self.cancel_hold();

        if self.is_addressable() {
            let deficit_ms = self.update_touch_length(now_ms);
            out.push(GestureEvent::TouchOffZone(self.snapshot()));
            self.note_off_timer.arm(now_ms, deficit_ms);
            TouchStatus::Alive
        } else {
            out.push(GestureEvent::TouchOffNonZone(self.snapshot()));
            self.life_complete(out)
        }
    }

    /// Moves the touch into another zone while it stays down.
    pub fn switch_to(
        &mut self,
        now_ms: u64,
        began_point: Point,
        grid: Option<GridCoordinate>,
        out: &mut Vec<GestureEvent>,
    ) {
        if self.is_removed() {
            return;
        }
        self.switching = true;
        self.restart_hold(now_ms);
        self.on = false;

        if self.is_addressable() {
            self.update_touch_length(now_ms);
            out.push(GestureEvent::TouchOffZone(self.snapshot()));
            self.note_off_timer.cancel();
            self.note_off(out);
        }

        self.began_point = began_point;
        self.grid = grid;
        self.on(out);
        self.switching = false;
    }

    /// Clears coordinates and timers. The id stays as the key late calls are
    /// logged against.
    pub fn remove(&mut self) {
        self.cancel_hold();
        self.note_off_timer.cancel();
        self.began_point = Point::default();
        self.began_ms = 0;
        self.touch_length_ms = 0;
        self.grid = None;
        self.on = false;
        self.lifecycle = Lifecycle::Removed;
    }

    pub fn next_due_ms(&self) -> Option<u64> {
        if self.is_removed() {
            return None;
        }
        earliest(self.hold_timer.due_ms(), self.note_off_timer.due_ms())
    }

    /// Fires every timer due at `now_ms`, earliest deadline first.
    pub fn fire_due(&mut self, now_ms: u64, out: &mut Vec<GestureEvent>) -> TouchStatus {
        let mut status = TouchStatus::Alive;
        while let Some(due) = self.next_due_ms().filter(|due| *due <= now_ms) {
            let note_off_first = self
                .note_off_timer
                .due_ms()
                .is_some_and(|off_due| off_due == due);
            let fired = if note_off_first {
                self.note_off_timer.take_due(due);
                self.note_off(out)
            } else {
                self.hold_timer.take_due(due);
                self.hold_tick(due, out)
            };
            match fired {
                TouchStatus::LifeComplete => return fired,
                TouchStatus::HeldOffGrid => status = fired,
                TouchStatus::Alive => {}
            }
        }
        status
    }

    fn hold_tick(&mut self, now_ms: u64, out: &mut Vec<GestureEvent>) -> TouchStatus {
        if !self.holding {
            if now_ms.saturating_sub(self.began_ms) > self.timing.hold_min_ms {
                self.holding = true;
            }
            return TouchStatus::Alive;
        }

        if self.is_addressable() {
            out.push(GestureEvent::HoldOnZone(self.snapshot()));
            self.on(out);
            let interval_ms = self.hold_timer.interval_ms().unwrap_or(0);
            self.note_off_timer.arm(now_ms, interval_ms.saturating_mul(9) / 10);
            TouchStatus::Alive
        } else {
            out.push(GestureEvent::HoldOnNonZone(self.snapshot()));
            self.cancel_hold();
            TouchStatus::HeldOffGrid
        }
    }

    fn note_off(&mut self, out: &mut Vec<GestureEvent>) -> TouchStatus {
        out.push(GestureEvent::TouchDeferredOff(self.snapshot()));
        if !self.holding && !self.switching {
            return self.life_complete(out);
        }
        TouchStatus::Alive
    }

    fn life_complete(&mut self, out: &mut Vec<GestureEvent>) -> TouchStatus {
        out.push(GestureEvent::TouchLifeComplete(self.snapshot()));
        self.remove();
        TouchStatus::LifeComplete
    }

    fn cancel_hold(&mut self) {
        self.hold_timer.cancel();
        self.holding = false;
    }

    fn restart_hold(&mut self, now_ms: u64) {
        let interval_ms = self.hold_timer.interval_ms();
        let was_armed = self.hold_timer.is_pending();
        self.cancel_hold();
        self.began_ms = now_ms;
        if let (true, Some(interval_ms)) = (was_armed, interval_ms) {
            self.hold_timer.arm(now_ms, interval_ms);
        }
    }

    /// Records the floored touch length and returns how long the note-off must wait.
    fn update_touch_length(&mut self, now_ms: u64) -> u64 {
        let raw_ms = now_ms.saturating_sub(self.began_ms);
        let min_ms = self.timing.min_tap_length_ms;
        self.touch_length_ms = raw_ms.max(min_ms);
        min_ms.saturating_sub(raw_ms)
    }
}

#[cfg(test)]
mod tests;
