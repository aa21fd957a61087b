use crate::{
    geometry::{distance, Point},
    types::{GridCoordinate, Viewport},
};

/// Maps a touch-down point to an addressable grid cell.
pub trait ZoneResolver {
    fn resolve(&self, point: Point, viewport: Viewport) -> Option<GridCoordinate>;
}

impl<F> ZoneResolver for F
where
    F: Fn(Point, Viewport) -> Option<GridCoordinate>,
{
    fn resolve(&self, point: Point, viewport: Viewport) -> Option<GridCoordinate> {
        self(point, viewport)
    }
}

/// Leaves every touch non-addressable until the host assigns a grid.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoZones;

impl ZoneResolver for NoZones {
    fn resolve(&self, _point: Point, _viewport: Viewport) -> Option<GridCoordinate> {
        None
    }
}

/// Even columns × rows over the viewport with an optional dead disc in the middle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UniformGrid {
    pub columns: u16,
    pub rows: u16,
    pub center_dead_radius: Option<f32>,
}

impl UniformGrid {
    pub const fn new(columns: u16, rows: u16) -> Self {
        Self {
            columns,
            rows,
            center_dead_radius: None,
        }
    }

    pub const fn with_center_dead_radius(mut self, radius: f32) -> Self {
        self.center_dead_radius = Some(radius);
        self
    }
}

impl ZoneResolver for UniformGrid {
    fn resolve(&self, point: Point, viewport: Viewport) -> Option<GridCoordinate> {
        if self.columns == 0 || self.rows == 0 || viewport.width <= 0.0 || viewport.height <= 0.0 {
            return None;
        }
        if !(0.0..viewport.width).contains(&point.x) || !(0.0..viewport.height).contains(&point.y) {
            return None;
        }
        if let Some(radius) = self.center_dead_radius {
            if distance(point, viewport.center()) < radius {
                return None;
            }
        }
        let x = (point.x / viewport.width * self.columns as f32) as u16;
        let y = (point.y / viewport.height * self.rows as f32) as u16;
        Some(GridCoordinate::new(
            x.min(self.columns - 1),
            y.min(self.rows - 1),
        ))
    }
}
