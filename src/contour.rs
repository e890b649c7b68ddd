// src/contour.rs - Immutable contour model with cached orientation

use serde::Serialize;

use crate::errors::{Result, SectionAlignError};
use crate::orientation::{estimate_orientation, Orientation};

/// One boundary point in source-image pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ContourPoint {
    pub x: f64,
    pub y: f64,

    /// Position in the original point list. A back-reference, never an ordering key.
    pub index: usize,
}

impl ContourPoint {
    pub fn coordinates(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    pub fn squared_distance(&self, other: &ContourPoint) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

/// Closed contour given as an unordered set of boundary points.
///
/// Centroid and principal-axis angle are computed once at construction; the
/// point list never changes afterwards. Geometric transforms return new contours.
#[derive(Debug, Clone)]
pub struct Contour {
    points: Vec<ContourPoint>,
    orientation: Orientation,
}

impl Contour {
    /// Build a contour from raw coordinates; each point's index is its position
    pub fn new(coordinates: Vec<(f64, f64)>) -> Result<Self> {
        if let Some(position) = coordinates
            .iter()
            .position(|(x, y)| !x.is_finite() || !y.is_finite())
        {
            return Err(SectionAlignError::DegenerateContour(format!(
                "point {} has non-finite coordinates",
                position
            )));
        }

        let points: Vec<ContourPoint> = coordinates
            .into_iter()
            .enumerate()
            .map(|(index, (x, y))| ContourPoint { x, y, index })
            .collect();

        let orientation = estimate_orientation(&points)?;

        Ok(Self { points, orientation })
    }

    /// Build a contour from integer pixel coordinates
    pub fn from_pixels(pixels: &[(u32, u32)]) -> Result<Self> {
        Self::new(pixels.iter().map(|&(x, y)| (x as f64, y as f64)).collect())
    }

    pub fn points(&self) -> &[ContourPoint] {
        &self.points
    }

    /// Look up a point by its original index
    pub fn point(&self, index: usize) -> Option<&ContourPoint> {
        self.points.get(index)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn centroid(&self) -> (f64, f64) {
        self.orientation.centroid
    }

    pub fn theta(&self) -> f64 {
        self.orientation.theta
    }

    /// New contour shifted by `(dx, dy)`
    pub fn translated(&self, dx: f64, dy: f64) -> Result<Self> {
        Self::new(self.points.iter().map(|p| (p.x + dx, p.y + dy)).collect())
    }

    /// New contour rotated by `angle` radians around `pivot`
    pub fn rotated(&self, angle: f64, pivot: (f64, f64)) -> Result<Self> {
        let (sin, cos) = angle.sin_cos();
        Self::new(
            self.points
                .iter()
                .map(|p| {
                    let dx = p.x - pivot.0;
                    let dy = p.y - pivot.1;
                    (pivot.0 + dx * cos - dy * sin, pivot.1 + dx * sin + dy * cos)
                })
                .collect(),
        )
    }
}
