use crate::geometry::{Circle, Point, Rect};

/// Best-fit circle for a point path.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CircleFit {
    pub center: Point,
    pub radius: f32,
    /// RMS radial residual divided by the radius; infinite for degenerate paths.
    pub error: f32,
}

impl CircleFit {
    pub const DEGENERATE: Self = Self {
        center: Point::new(0.0, 0.0),
        radius: 0.0,
        error: f32::INFINITY,
    };

    pub fn circle(&self) -> Circle {
        Circle::new(self.center, self.radius)
    }
}

impl Default for CircleFit {
    fn default() -> Self {
        Self::DEGENERATE
    }
}

/// Algebraic least-squares fit on mean-centred coordinates.
///
/// Fewer than three points, or collinear points, produce [`CircleFit::DEGENERATE`].
pub fn fit_circle(points: &[Point]) -> CircleFit {
    if points.len() < 3 {
        return CircleFit::DEGENERATE;
    }

    let n = points.len() as f64;
    let mean_x = points.iter().map(|p| p.x as f64).sum::<f64>() / n;
    let mean_y = points.iter().map(|p| p.y as f64).sum::<f64>() / n;

    let mut suu = 0.0;
    let mut svv = 0.0;
    let mut suv = 0.0;
    let mut suuu = 0.0;
    let mut svvv = 0.0;
    let mut suvv = 0.0;
    let mut svuu = 0.0;
    for point in points {
        let u = point.x as f64 - mean_x;
        let v = point.y as f64 - mean_y;
        suu += u * u;
        svv += v * v;
        suv += u * v;
        suuu += u * u * u;
        svvv += v * v * v;
        suvv += u * v * v;
        svuu += v * u * u;
    }

    let det = suu * svv - suv * suv;
    // Scale-relative so the collinear check does not depend on path size.
    if det.abs() <= f64::EPSILON * (suu * svv).max(1.0) * 1e3 {
        return CircleFit::DEGENERATE;
    }

    let bu = (suuu + suvv) / 2.0;
    let bv = (svvv + svuu) / 2.0;
    let uc = (bu * svv - bv * suv) / det;
    let vc = (suu * bv - suv * bu) / det;
    let radius = (uc * uc + vc * vc + (suu + svv) / n).sqrt();
    if !(radius.is_finite() && radius > 0.0) {
        return CircleFit::DEGENERATE;
    }

    let center_x = mean_x + uc;
    let center_y = mean_y + vc;
    let residual = points
        .iter()
        .map(|p| {
            let dx = p.x as f64 - center_x;
            let dy = p.y as f64 - center_y;
            let r = (dx * dx + dy * dy).sqrt() - radius;
            r * r
        })
        .sum::<f64>()
        / n;

    CircleFit {
        center: Point::new(center_x as f32, center_y as f32),
        radius: radius as f32,
        error: (residual.sqrt() / radius) as f32,
    }
}

/// True when any path point falls in the box at the fit centre sized
/// `radius / sqrt(2) * tolerance` on each side.
pub fn has_points_near_center(fit: &CircleFit, points: &[Point], tolerance: f32) -> bool {
    let half = fit.radius / core::f32::consts::SQRT_2 * tolerance;
    let inner = Rect::centered(fit.center, half);
    points.iter().any(|point| inner.contains(*point))
}

/// Share of the fit circle's bounding box covered by the path's bounding box.
pub fn bounding_overlap(fit: &CircleFit, points: &[Point]) -> f32 {
    let fit_box = fit.circle().bounds();
    let fit_area = fit_box.area();
    if fit_area <= 0.0 {
        return 0.0;
    }
    match Rect::bounding(points) {
        Some(path_box) => fit_box.intersection(&path_box).area() / fit_area,
        None => 0.0,
    }
}

/// Accepts a path as circular when the fit is tight, nothing crosses the
/// middle and the path spans the fitted circle.
pub fn is_circular(fit: &CircleFit, points: &[Point], tolerance: f32) -> bool {
    fit.error <= tolerance
        && !has_points_near_center(fit, points, tolerance)
        && bounding_overlap(fit, points) > 1.0 - tolerance
}
