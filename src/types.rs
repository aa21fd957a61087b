use heapless::Vec as BoundedVec;

use crate::geometry::Point;

/// Contacts a single host call can carry. Surface counts above this still
/// reach `all_touches`.
pub const MAX_CONTACTS: usize = 16;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TouchId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TouchContact {
    pub id: TouchId,
    pub point: Point,
}

impl TouchContact {
    pub const fn new(id: u64, x: f32, y: f32) -> Self {
        Self {
            id: TouchId(id),
            point: Point::new(x, y),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }
}

/// One host touch callback: the contacts it concerns plus the surface-wide count.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TouchBatch {
    pub contacts: BoundedVec<TouchContact, MAX_CONTACTS>,
    /// Every touch on the surface, including the contacts of this batch.
    pub all_touches: u8,
    pub viewport: Option<Viewport>,
}

impl TouchBatch {
    /// Builds a batch whose surface count equals the contact count given,
    /// including contacts past the capacity.
    pub fn new(contacts: &[TouchContact], viewport: Option<Viewport>) -> Self {
        let mut batch = Self {
            contacts: BoundedVec::new(),
            all_touches: u8::try_from(contacts.len()).unwrap_or(u8::MAX),
            viewport,
        };
        for contact in contacts {
            if batch.contacts.push(*contact).is_err() {
                log::warn!("touch: batch full, dropping id={}", contact.id.0);
                break;
            }
        }
        batch
    }

    pub fn with_all_touches(mut self, all_touches: u8) -> Self {
        self.all_touches = all_touches;
        self
    }

    /// Surface count, never below the number of contacts carried.
    pub fn active_count(&self) -> u8 {
        self.all_touches.max(self.contacts.len() as u8)
    }

    /// Touches left on the surface once this batch's contacts have lifted.
    pub fn remaining_after_release(&self) -> u8 {
        self.active_count()
            .saturating_sub(self.contacts.len() as u8)
    }

    pub fn first_point(&self) -> Option<Point> {
        self.contacts.first().map(|contact| contact.point)
    }

    pub fn ids(&self) -> impl Iterator<Item = TouchId> + '_ {
        self.contacts.iter().map(|contact| contact.id)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GridCoordinate {
    pub x: u16,
    pub y: u16,
}

impl GridCoordinate {
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }
}

/// Copy of a touch object's observable state, carried by events.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TouchSnapshot {
    pub id: TouchId,
    pub began_point: Point,
    pub grid: Option<GridCoordinate>,
    pub touch_length_ms: u64,
    pub holding: bool,
    pub on: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RotationDirection {
    #[default]
    Unknown,
    Clockwise,
    CounterClockwise,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GestureEvent {
    TouchBegan { point: Point, touch: TouchSnapshot },
    TouchMoved { point: Point, touch: TouchSnapshot },
    AssessmentComplete,
    TouchOn(TouchSnapshot),
    TouchOffZone(TouchSnapshot),
    TouchOffNonZone(TouchSnapshot),
    TouchDeferredOff(TouchSnapshot),
    TouchLifeComplete(TouchSnapshot),
    HoldOnZone(TouchSnapshot),
    HoldOnNonZone(TouchSnapshot),
    HoldOnCenter,
    DragBegan { point: Point },
    DragMoved { point: Point },
    DragEnded { point: Point },
    SwipeBegan { began: Point },
    SwipeEnded { began: Point, ended: Point },
    CenterPress,
    RotationBegan,
    RotationMoved { angle_deg: f32 },
    RotationEnded { direction: RotationDirection },
    ReverseRotationCompleted,
    Shake,
}

impl GestureEvent {
    /// Stable snake_case name used by traces and replay output.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::TouchBegan { .. } => "touch_began",
            Self::TouchMoved { .. } => "touch_moved",
            Self::AssessmentComplete => "assessment_complete",
            Self::TouchOn(_) => "touch_on",
            Self::TouchOffZone(_) => "touch_off_zone",
            Self::TouchOffNonZone(_) => "touch_off_non_zone",
            Self::TouchDeferredOff(_) => "touch_deferred_off",
            Self::TouchLifeComplete(_) => "touch_life_complete",
            Self::HoldOnZone(_) => "hold_on_zone",
            Self::HoldOnNonZone(_) => "hold_on_non_zone",
            Self::HoldOnCenter => "hold_on_center",
            Self::DragBegan { .. } => "drag_began",
            Self::DragMoved { .. } => "drag_moved",
            Self::DragEnded { .. } => "drag_ended",
            Self::SwipeBegan { .. } => "swipe_began",
            Self::SwipeEnded { .. } => "swipe_ended",
            Self::CenterPress => "center_press",
            Self::RotationBegan => "rotation_began",
            Self::RotationMoved { .. } => "rotation_moved",
            Self::RotationEnded { .. } => "rotation_ended",
            Self::ReverseRotationCompleted => "reverse_rotation_completed",
            Self::Shake => "shake",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GesturePhase {
    #[default]
    Idle,
    Assessing,
    Tap,
    Swipe,
    Drag,
    Center,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum RejectReason {
    #[default]
    None = 0,
    MissingViewport = 1,
    NoNewTouches = 2,
    AnnulusUnset = 3,
    MultiTouch = 4,
    NotCircular = 5,
}

impl RejectReason {
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}
