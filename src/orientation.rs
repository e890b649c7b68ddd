// src/orientation.rs - Centroid and principal-axis rotation of a contour point set

use nalgebra::Matrix2;
use std::f64::consts::FRAC_PI_2;

use crate::contour::ContourPoint;
use crate::errors::{Result, SectionAlignError};

/// Relative determinant below which the covariance is treated as singular
const SINGULAR_COVARIANCE_EPS: f64 = 1e-12;

/// Centroid and principal-axis rotation of a contour
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orientation {
    /// Arithmetic mean of all contour points
    pub centroid: (f64, f64),

    /// Rotation of the first principal axis relative to vertical, in radians.
    /// Rotating the centered points by `-theta` brings the principal axis onto
    /// the vertical axis of the polar frame.
    pub theta: f64,
}

/// Arithmetic mean of the point coordinates
pub fn calculate_centroid(points: &[ContourPoint]) -> Option<(f64, f64)> {
    if points.is_empty() {
        return None;
    }

    let n = points.len() as f64;
    let (sum_x, sum_y) = points
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));

    Some((sum_x / n, sum_y / n))
}

/// Sample covariance matrix of the point coordinates around `centroid`
pub fn calculate_covariance(points: &[ContourPoint], centroid: (f64, f64)) -> Matrix2<f64> {
    let (cx, cy) = centroid;
    let mut sxx = 0.0;
    let mut sxy = 0.0;
    let mut syy = 0.0;

    for p in points {
        let dx = p.x - cx;
        let dy = p.y - cy;
        sxx += dx * dx;
        sxy += dx * dy;
        syy += dy * dy;
    }

    let denom = (points.len().max(2) - 1) as f64;
    Matrix2::new(sxx / denom, sxy / denom, sxy / denom, syy / denom)
}

/// Estimate centroid and principal-axis angle using PCA
///
/// The eigenvector of the larger covariance eigenvalue is normalised to a
/// non-negative y component (non-negative x when y is zero), so a contour and
/// its 180-degree rotated twin get the same angle.
///
/// # Errors
/// `DegenerateContour` for fewer than 3 points, non-finite coordinates, or a
/// singular covariance matrix (collinear or coincident points).
pub fn estimate_orientation(points: &[ContourPoint]) -> Result<Orientation> {
    if points.len() < 3 {
        return Err(SectionAlignError::DegenerateContour(format!(
            "need at least 3 points, got {}",
            points.len()
        )));
    }

    let centroid = calculate_centroid(points).ok_or_else(|| {
        SectionAlignError::DegenerateContour("empty point set".to_string())
    })?;

    let covariance = calculate_covariance(points, centroid);
    let trace = covariance.trace();
    let determinant = covariance.determinant();

    if !trace.is_finite() || !determinant.is_finite() {
        return Err(SectionAlignError::DegenerateContour(
            "covariance is not finite".to_string(),
        ));
    }

    if determinant <= SINGULAR_COVARIANCE_EPS * trace * trace {
        return Err(SectionAlignError::DegenerateContour(format!(
            "singular covariance (det = {:.3e}, trace = {:.3e})",
            determinant, trace
        )));
    }

    let eigen = covariance.symmetric_eigen();
    let major = if eigen.eigenvalues[1] > eigen.eigenvalues[0] { 1 } else { 0 };
    let axis = eigen.eigenvectors.column(major);

    let (mut nx, mut ny) = (axis[0], axis[1]);
    if ny < 0.0 || (ny == 0.0 && nx < 0.0) {
        nx = -nx;
        ny = -ny;
    }

    let theta = if ny == 0.0 { -FRAC_PI_2 } else { -(nx / ny).atan() };

    log::debug!(
        "Orientation: centroid=({:.3}, {:.3}), axis=({:.4}, {:.4}), theta={:.4}",
        centroid.0, centroid.1, nx, ny, theta
    );

    Ok(Orientation { centroid, theta })
}
