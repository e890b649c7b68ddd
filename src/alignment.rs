// src/alignment.rs - Matched point pairs handed to an external warp solver

use serde::Serialize;

use crate::correspondence::{ensure_same_len, CorrespondencePointSet};
use crate::errors::Result;

/// Weight of an ordinary landmark pair
pub const LANDMARK_WEIGHT: f64 = 1.0;

/// Default weight of the synthetic centroid-to-centroid pair
pub const CENTROID_WEIGHT: f64 = 3.0;

/// One source/reference correspondence with its least-squares weight
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AlignmentPair {
    pub source: (f64, f64),
    pub reference: (f64, f64),
    pub weight: f64,
}

/// Build the landmark pairs in their existing order, followed by one
/// centroid pair carrying `centroid_weight`
pub fn build_alignment_pairs(
    source_set: &CorrespondencePointSet,
    source_centroid: (f64, f64),
    reference_set: &CorrespondencePointSet,
    reference_centroid: (f64, f64),
    centroid_weight: f64,
) -> Result<Vec<AlignmentPair>> {
    ensure_same_len(source_set.len(), reference_set.len())?;

    let mut pairs: Vec<AlignmentPair> = source_set
        .iter()
        .zip(reference_set)
        .map(|(s, r)| AlignmentPair {
            source: s.coordinates(),
            reference: r.coordinates(),
            weight: LANDMARK_WEIGHT,
        })
        .collect();

    pairs.push(AlignmentPair {
        source: source_centroid,
        reference: reference_centroid,
        weight: centroid_weight,
    });

    Ok(pairs)
}
