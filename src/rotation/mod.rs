//! Single-touch circular sweep detection gated by an annulus around the
//! viewport centre.

mod fit;

pub use fit::{bounding_overlap, fit_circle, has_points_near_center, is_circular, CircleFit};

use crate::{
    config::{validate_annulus, RotationConfig},
    error::Result,
    geometry::{point_in_annulus, Point},
    types::{RejectReason, RotationDirection, TouchBatch},
};

/// Recognizer progress for the current single-touch gesture.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RecognizerState {
    #[default]
    Possible,
    Began,
    Changed,
    Ended,
    Failed,
    Cancelled,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Annulus {
    pub inner_radius: f32,
    pub outer_radius: f32,
}

pub struct CircleDetector {
    state: RecognizerState,
    annulus: Option<Annulus>,
    tolerance: f32,
    significant_tally: i32,
    center: Point,
    path: Vec<Point>,
    sum_x: f64,
    sum_y: f64,
    angle_deg: f32,
    tally: i32,
    direction: RotationDirection,
    began_in_zone: bool,
    in_zone: bool,
    significant: bool,
    fit: CircleFit,
    is_circle: bool,
    reject_reason: RejectReason,
}

impl CircleDetector {
    pub fn new(config: &RotationConfig) -> Self {
        Self {
            state: RecognizerState::Possible,
            annulus: config.annulus().map(|(inner_radius, outer_radius)| Annulus {
                inner_radius,
                outer_radius,
            }),
            tolerance: config.tolerance,
            significant_tally: config.significant_tally.min(i32::MAX as u32) as i32,
            center: Point::default(),
            path: Vec::new(),
            sum_x: 0.0,
            sum_y: 0.0,
            angle_deg: 0.0,
            tally: 0,
            direction: RotationDirection::Unknown,
            began_in_zone: false,
            in_zone: false,
            significant: false,
            fit: CircleFit::DEGENERATE,
            is_circle: false,
            reject_reason: RejectReason::None,
        }
    }

    /// Configures the active ring between the two radii.
    pub fn set_active_area(&mut self, inner_radius: f32, outer_radius: f32) -> Result<()> {
        validate_annulus(inner_radius, outer_radius)?;
        self.annulus = Some(Annulus {
            inner_radius,
            outer_radius,
        });
        Ok(())
    }

    pub fn annulus(&self) -> Option<Annulus> {
        self.annulus
    }

    pub fn state(&self) -> RecognizerState {
        self.state
    }

    pub fn angle_deg(&self) -> f32 {
        self.angle_deg
    }

    pub fn tally(&self) -> i32 {
        self.tally
    }

    pub fn direction(&self) -> RotationDirection {
        self.direction
    }

    pub fn began_in_zone(&self) -> bool {
        self.began_in_zone
    }

    pub fn in_zone(&self) -> bool {
        self.in_zone
    }

    pub fn is_significant(&self) -> bool {
        self.significant
    }

    pub fn fit(&self) -> CircleFit {
        self.fit
    }

    pub fn is_circle(&self) -> bool {
        self.is_circle
    }

    pub fn path(&self) -> &[Point] {
        &self.path
    }

    pub fn reject_reason(&self) -> RejectReason {
        self.reject_reason
    }

    fn is_tracking(&self) -> bool {
        matches!(self.state, RecognizerState::Began | RecognizerState::Changed)
    }

    pub fn reset(&mut self) {
        self.state = RecognizerState::Possible;
        self.path.clear();
        self.sum_x = 0.0;
        self.sum_y = 0.0;
        self.angle_deg = 0.0;
        self.tally = 0;
        self.direction = RotationDirection::Unknown;
        self.began_in_zone = false;
        self.in_zone = false;
        self.significant = false;
        self.fit = CircleFit::DEGENERATE;
        self.is_circle = false;
        self.reject_reason = RejectReason::None;
    }

    pub fn began(&mut self, batch: &TouchBatch) {
        self.reset();
        if batch.active_count() != 1 {
            self.fail(RejectReason::MultiTouch);
            return;
        }
        let Some(annulus) = self.annulus else {
            log::warn!("circle: active area unset at touch down");
            self.fail(RejectReason::AnnulusUnset);
            return;
        };
        let (Some(viewport), Some(point)) = (batch.viewport, batch.first_point()) else {
            log::warn!("circle: no viewport at touch down");
            self.fail(RejectReason::MissingViewport);
            return;
        };

        self.center = viewport.center();
        self.push_point(point);
        self.in_zone = self.hit_test(point, annulus);
        self.began_in_zone = self.in_zone;
        self.state = RecognizerState::Began;
    }

    pub fn moved(&mut self, batch: &TouchBatch) {
        if !self.is_tracking() {
            return;
        }
        if batch.active_count() != 1 {
            self.fail(RejectReason::MultiTouch);
            return;
        }
        let (Some(point), Some(annulus)) = (batch.first_point(), self.annulus) else {
            return;
        };

        self.push_point(point);
        let n = self.path.len() as f64;
        let average_x = self.sum_x / n;
        let average_y = self.sum_y / n;

        let last_angle = self.angle_deg;
        let dx = average_x - point.x as f64;
        let dy = average_y - point.y as f64;
        self.angle_deg = dy.atan2(dx).to_degrees() as f32;

        // Plain comparison with the previous tick; the ±180° seam is not unwrapped.
        if self.angle_deg < last_angle {
            self.tally -= 1;
            self.direction = RotationDirection::CounterClockwise;
        } else {
            self.tally += 1;
            self.direction = RotationDirection::Clockwise;
        }

        self.in_zone = self.hit_test(point, annulus);
        self.significant = self.tally.abs() > self.significant_tally;
        self.state = RecognizerState::Changed;
    }

    pub fn ended(&mut self, batch: &TouchBatch) {
        if !self.is_tracking() {
            return;
        }
        if batch.active_count() != 1 {
            self.fail(RejectReason::MultiTouch);
            return;
        }

        self.in_zone = false;
        self.fit = fit_circle(&self.path);
        self.is_circle = is_circular(&self.fit, &self.path, self.tolerance);

        if self.is_circle {
            self.direction = if self.tally < 0 {
                RotationDirection::CounterClockwise
            } else {
                RotationDirection::Clockwise
            };
            self.state = RecognizerState::Ended;
        } else {
            self.direction = RotationDirection::Unknown;
            self.fail(RejectReason::NotCircular);
        }
        log::debug!(
            "circle: ended circle={} error={:.3} tally={} direction={:?}",
            self.is_circle,
            self.fit.error,
            self.tally,
            self.direction
        );
    }

    pub fn cancelled(&mut self) {
        if self.is_tracking() {
            self.state = RecognizerState::Cancelled;
        }
    }

    fn fail(&mut self, reason: RejectReason) {
        self.state = RecognizerState::Failed;
        self.reject_reason = reason;
    }

    fn push_point(&mut self, point: Point) {
        self.path.push(point);
        self.sum_x += point.x as f64;
        self.sum_y += point.y as f64;
    }

    fn hit_test(&self, point: Point, annulus: Annulus) -> bool {
        point_in_annulus(
            point,
            self.center,
            annulus.inner_radius,
            annulus.outer_radius,
        )
    }
}
