use serde::Serialize;

use crate::contour::ContourPoint;
use crate::errors::{Result, SectionAlignError};

/// Ordered landmarks on one contour, paired index-for-index with another set
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrespondencePointSet {
    points: Vec<ContourPoint>,
}

impl CorrespondencePointSet {
    pub fn new(points: Vec<ContourPoint>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[ContourPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ContourPoint> {
        self.points.iter()
    }

    /// Sum of squared pixel distances between paired landmarks
    pub fn total_squared_distance(&self, other: &CorrespondencePointSet) -> Result<f64> {
        ensure_same_len(self.len(), other.len())?;

        Ok(self
            .points
            .iter()
            .zip(&other.points)
            .map(|(a, b)| a.squared_distance(b))
            .sum())
    }

    /// Sum of squared distances after centering each set on its own contour centroid
    pub fn centered_squared_distance(
        &self,
        centroid: (f64, f64),
        other: &CorrespondencePointSet,
        other_centroid: (f64, f64),
    ) -> Result<f64> {
        ensure_same_len(self.len(), other.len())?;

        Ok(self
            .points
            .iter()
            .zip(&other.points)
            .map(|(a, b)| {
                let dx = (a.x - centroid.0) - (b.x - other_centroid.0);
                let dy = (a.y - centroid.1) - (b.y - other_centroid.1);
                dx * dx + dy * dy
            })
            .sum())
    }
}

impl<'a> IntoIterator for &'a CorrespondencePointSet {
    type Item = &'a ContourPoint;
    type IntoIter = std::slice::Iter<'a, ContourPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

pub(crate) fn ensure_same_len(source_count: usize, reference_count: usize) -> Result<()> {
    if source_count != reference_count {
        return Err(SectionAlignError::MismatchedCorrespondenceCount {
            source_count,
            reference_count,
        });
    }
    Ok(())
}
