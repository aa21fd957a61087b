//! Plane geometry used by the classifier and the rotation detector.

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Circle {
    pub center: Point,
    pub radius: f32,
}

impl Circle {
    pub const fn new(center: Point, radius: f32) -> Self {
        Self { center, radius }
    }

    pub fn bounds(&self) -> Rect {
        Rect {
            min_x: self.center.x - self.radius,
            min_y: self.center.y - self.radius,
            max_x: self.center.x + self.radius,
            max_y: self.center.y + self.radius,
        }
    }
}

/// Axis-aligned rectangle stored as edges.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl Rect {
    pub fn centered(center: Point, half_extent: f32) -> Self {
        Self {
            min_x: center.x - half_extent,
            min_y: center.y - half_extent,
            max_x: center.x + half_extent,
            max_y: center.y + half_extent,
        }
    }

    /// Smallest rectangle containing every point, `None` for an empty slice.
    pub fn bounding(points: &[Point]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut rect = Self::centered(*first, 0.0);
        for point in rest {
            rect.min_x = rect.min_x.min(point.x);
            rect.min_y = rect.min_y.min(point.y);
            rect.max_x = rect.max_x.max(point.x);
            rect.max_y = rect.max_y.max(point.y);
        }
        Some(rect)
    }

    pub fn width(&self) -> f32 {
        (self.max_x - self.min_x).max(0.0)
    }

    pub fn height(&self) -> f32 {
        (self.max_y - self.min_y).max(0.0)
    }

    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.min_x
            && point.x <= self.max_x
            && point.y >= self.min_y
            && point.y <= self.max_y
    }

    /// Overlapping region; disjoint rectangles yield a zero-area rect.
    pub fn intersection(&self, other: &Rect) -> Rect {
        let min_x = self.min_x.max(other.min_x);
        let min_y = self.min_y.max(other.min_y);
        Rect {
            min_x,
            min_y,
            max_x: self.max_x.min(other.max_x).max(min_x),
            max_y: self.max_y.min(other.max_y).max(min_y),
        }
    }
}

pub fn distance(a: Point, b: Point) -> f32 {
    squared_distance(a, b).sqrt()
}

pub fn squared_distance(a: Point, b: Point) -> f32 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    dx * dx + dy * dy
}

/// Closed-disc test with a bounding-box rejection ahead of the exact comparison.
pub fn point_in_circle(point: Point, circle: &Circle) -> bool {
    if !circle.bounds().contains(point) {
        return false;
    }
    squared_distance(point, circle.center) <= circle.radius * circle.radius
}

/// True when `point` lies between the two concentric circles, both edges included.
pub fn point_in_annulus(point: Point, center: Point, inner_radius: f32, outer_radius: f32) -> bool {
    if !point_in_circle(point, &Circle::new(center, outer_radius)) {
        return false;
    }
    squared_distance(point, center) >= inner_radius * inner_radius
}
