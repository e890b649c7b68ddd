// src/polar.rs - Centroid-centered, rotation-aligned polar view of a contour

use std::cmp::Ordering;
use std::f64::consts::PI;

use crate::contour::{Contour, ContourPoint};

/// A contour point in the centered, rotated frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolarPoint {
    pub u: f64,
    pub v: f64,

    /// Polar angle in (-π, π]
    pub phi: f64,
    pub r: f64,

    /// Index of the originating `ContourPoint`
    pub index: usize,
}

impl PolarPoint {
    /// Express `point` around `centroid`, rotated by `-theta`.
    ///
    /// With the `theta` of [`crate::orientation::estimate_orientation`] the
    /// principal axis lands on the v axis (phi = ±π/2).
    pub fn from_point(point: &ContourPoint, centroid: (f64, f64), theta: f64) -> Self {
        let (sin, cos) = theta.sin_cos();
        let dx = point.x - centroid.0;
        let dy = point.y - centroid.1;
        let u = dx * cos + dy * sin;
        let v = -dx * sin + dy * cos;

        Self {
            u,
            v,
            phi: polar_angle(u, v),
            r: (u * u + v * v).sqrt(),
            index: point.index,
        }
    }
}

/// `atan2(v, u)` folded into (-π, π]
pub fn polar_angle(u: f64, v: f64) -> f64 {
    let phi = v.atan2(u);
    if phi <= -PI {
        PI
    } else {
        phi
    }
}

/// Signed difference `to - from` wrapped into (-π, π]
pub fn wrap_angle_difference(from: f64, to: f64) -> f64 {
    let mut diff = to - from;
    while diff > PI {
        diff -= 2.0 * PI;
    }
    while diff <= -PI {
        diff += 2.0 * PI;
    }
    diff
}

/// Step direction along the angular ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AngularStep {
    /// Next higher angle
    Higher,
    /// Next lower angle
    Lower,
}

/// All points of a contour sorted ascending by `phi`.
///
/// Equal angles are ordered by original index. The collection is cyclic:
/// neighbour queries wrap across the ±π seam.
#[derive(Debug, Clone)]
pub struct PolarFrame {
    points: Vec<PolarPoint>,
    // position in `points` for each original index
    positions: Vec<usize>,
}

impl PolarFrame {
    /// Rotation-aligned frame around the contour's centroid, used by the sampler
    pub fn aligned(contour: &Contour) -> Self {
        Self::from_points(contour.points(), contour.centroid(), contour.theta())
    }

    /// Centered but unrotated frame, used by the optimizer
    pub fn centered(contour: &Contour) -> Self {
        Self::from_points(contour.points(), contour.centroid(), 0.0)
    }

    pub fn from_points(points: &[ContourPoint], centroid: (f64, f64), theta: f64) -> Self {
        let mut polar: Vec<PolarPoint> = points
            .iter()
            .map(|p| PolarPoint::from_point(p, centroid, theta))
            .collect();

        polar.sort_by(|a, b| {
            a.phi
                .partial_cmp(&b.phi)
                .unwrap_or(Ordering::Equal)
                .then(a.index.cmp(&b.index))
        });

        let max_index = polar.iter().map(|p| p.index).max().map_or(0, |m| m + 1);
        let mut positions = vec![usize::MAX; max_index];
        for (position, p) in polar.iter().enumerate() {
            positions[p.index] = position;
        }

        Self { points: polar, positions }
    }

    pub fn points(&self) -> &[PolarPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Position in the angular ordering of the point with original `index`
    pub fn position_of(&self, index: usize) -> Option<usize> {
        self.positions
            .get(index)
            .copied()
            .filter(|&position| position != usize::MAX)
    }

    /// Points with `lo <= phi <= hi`, in ascending angle order
    pub fn window(&self, lo: f64, hi: f64) -> &[PolarPoint] {
        if hi < lo {
            return &[];
        }
        let start = self.points.partition_point(|p| p.phi < lo);
        let end = self.points.partition_point(|p| p.phi <= hi);
        &self.points[start..end.max(start)]
    }

    /// Cyclic neighbour of `position` one step in `step` direction
    pub fn neighbor(&self, position: usize, step: AngularStep) -> usize {
        let n = self.points.len();
        match step {
            AngularStep::Higher => (position + 1) % n,
            AngularStep::Lower => (position + n - 1) % n,
        }
    }
}
