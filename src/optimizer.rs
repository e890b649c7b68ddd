// src/optimizer.rs - Greedy single-direction correspondence optimization

use serde::Serialize;

use crate::contour::{Contour, ContourPoint};
use crate::correspondence::{ensure_same_len, CorrespondencePointSet};
use crate::errors::{Result, SectionAlignError};
use crate::polar::{polar_angle, wrap_angle_difference, AngularStep, PolarFrame, PolarPoint};

/// Tuning for the greedy optimizer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptimizerParams {
    /// Cumulative angular drift (radians) above which landmarks walk toward higher angles
    pub drift_threshold: f64,
}

impl Default for OptimizerParams {
    fn default() -> Self {
        Self { drift_threshold: 1.0 }
    }
}

/// Fixed traversal direction chosen once per optimization.
///
/// With image coordinates (y pointing down) increasing angle runs clockwise on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DriftDirection {
    /// Step to the next higher angle
    Clockwise,
    /// Step to the next lower angle
    CounterClockwise,
}

impl DriftDirection {
    fn step(self) -> AngularStep {
        match self {
            DriftDirection::Clockwise => AngularStep::Higher,
            DriftDirection::CounterClockwise => AngularStep::Lower,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DriftDirection::Clockwise => "clockwise",
            DriftDirection::CounterClockwise => "counter-clockwise",
        }
    }
}

/// What the optimizer did
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OptimizationReport {
    pub direction: DriftDirection,

    /// Sum of wrapped angle differences, reference minus source
    pub drift: f64,

    /// Centered squared distance before and after
    pub initial_cost: f64,
    pub final_cost: f64,

    /// Accepted shift steps
    pub iterations: usize,
}

/// Optimized landmarks plus the report that produced them
#[derive(Debug, Clone)]
pub struct OptimizedSet {
    pub set: CorrespondencePointSet,
    pub report: OptimizationReport,
}

/// Slide the source landmarks along the full source contour to reduce the
/// centered squared distance to the reference landmarks.
///
/// Every landmark moves one angular neighbour per step, all in the same fixed
/// direction; a step is kept only if the total cost strictly decreases. The
/// inputs are not modified; the caller decides whether to replace its set.
pub fn optimize(
    source: &Contour,
    source_set: &CorrespondencePointSet,
    reference: &Contour,
    reference_set: &CorrespondencePointSet,
    params: &OptimizerParams,
) -> Result<OptimizedSet> {
    ensure_same_len(source_set.len(), reference_set.len())?;

    let ring = PolarFrame::centered(source);
    let mut positions = source_set
        .iter()
        .map(|p| {
            source
                .point(p.index)
                .filter(|&q| q == p)
                .and_then(|_| ring.position_of(p.index))
                .ok_or(SectionAlignError::ForeignLandmark { index: p.index })
        })
        .collect::<Result<Vec<usize>>>()?;

    let targets = centered_targets(reference, reference_set);

    // Positive when the reference landmarks sit at higher angles than the source ones
    let drift: f64 = positions
        .iter()
        .zip(&targets)
        .map(|(&position, target)| {
            wrap_angle_difference(ring.points()[position].phi, polar_angle(target.0, target.1))
        })
        .sum();

    let direction = if drift > params.drift_threshold {
        DriftDirection::Clockwise
    } else {
        DriftDirection::CounterClockwise
    };

    let initial_cost = centered_cost(ring.points(), &positions, &targets);
    let mut best_cost = initial_cost;
    let mut iterations = 0;

    // A full turn around the ring revisits the starting set
    while iterations < ring.len() {
        let shifted: Vec<usize> = positions
            .iter()
            .map(|&position| ring.neighbor(position, direction.step()))
            .collect();

        let cost = centered_cost(ring.points(), &shifted, &targets);
        if cost < best_cost {
            positions = shifted;
            best_cost = cost;
            iterations += 1;
        } else {
            break;
        }
    }

    log::debug!(
        "Greedy optimization: drift={:.3} rad -> {}, cost {:.2} -> {:.2} after {} steps",
        drift,
        direction.as_str(),
        initial_cost,
        best_cost,
        iterations
    );

    let points = positions
        .iter()
        .map(|&position| source.points()[ring.points()[position].index])
        .collect::<Vec<ContourPoint>>();

    Ok(OptimizedSet {
        set: CorrespondencePointSet::new(points),
        report: OptimizationReport {
            direction,
            drift,
            initial_cost,
            final_cost: best_cost,
            iterations,
        },
    })
}

fn centered_targets(reference: &Contour, reference_set: &CorrespondencePointSet) -> Vec<(f64, f64)> {
    let (cx, cy) = reference.centroid();
    reference_set.iter().map(|p| (p.x - cx, p.y - cy)).collect()
}

fn centered_cost(ring: &[PolarPoint], positions: &[usize], targets: &[(f64, f64)]) -> f64 {
    positions
        .iter()
        .zip(targets)
        .map(|(&position, &(tu, tv))| {
            let p = &ring[position];
            let du = p.u - tu;
            let dv = p.v - tv;
            du * du + dv * dv
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::{sample_contour, SamplingParams};
    use assert_approx_eq::assert_approx_eq;

    fn ellipse(a: f64, b: f64, center: (f64, f64)) -> Contour {
        Contour::new(
            (0..720)
                .map(|i| {
                    let t = (i as f64 * 0.5).to_radians();
                    (center.0 + a * t.cos(), center.1 + b * t.sin())
                })
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn identical_contours_are_unchanged() {
        let contour = ellipse(60.0, 35.0, (120.0, 80.0));
        let params = SamplingParams { levels: 3, phi_tol: 0.1 };
        let set = sample_contour(&contour, params).unwrap();

        let optimized = optimize(&contour, &set, &contour, &set, &OptimizerParams::default()).unwrap();
        assert_eq!(optimized.set, set);
        assert_eq!(optimized.report.iterations, 0);
        assert_approx_eq!(optimized.report.initial_cost, 0.0);
        assert_approx_eq!(optimized.report.final_cost, 0.0);
    }

    #[test]
    fn cost_never_increases() {
        let source = ellipse(60.0, 35.0, (100.0, 100.0));
        let reference = ellipse(45.0, 45.0, (40.0, 70.0));
        let params = SamplingParams { levels: 3, phi_tol: 0.1 };
        let source_set = sample_contour(&source, params).unwrap();
        let reference_set = sample_contour(&reference, params).unwrap();

        let optimized = optimize(
            &source,
            &source_set,
            &reference,
            &reference_set,
            &OptimizerParams::default(),
        )
        .unwrap();

        let before = source_set
            .centered_squared_distance(source.centroid(), &reference_set, reference.centroid())
            .unwrap();
        let after = optimized
            .set
            .centered_squared_distance(source.centroid(), &reference_set, reference.centroid())
            .unwrap();

        assert!(after <= before);
        assert_approx_eq!(before, optimized.report.initial_cost, 1e-6);
        assert_approx_eq!(after, optimized.report.final_cost, 1e-6);
    }

    #[test]
    fn mismatched_sets_fail() {
        let contour = ellipse(60.0, 35.0, (0.0, 0.0));
        let small = sample_contour(&contour, SamplingParams { levels: 1, phi_tol: 0.1 }).unwrap();
        let large = sample_contour(&contour, SamplingParams { levels: 2, phi_tol: 0.1 }).unwrap();

        let result = optimize(&contour, &small, &contour, &large, &OptimizerParams::default());
        assert!(matches!(
            result,
            Err(SectionAlignError::MismatchedCorrespondenceCount { source_count: 8, reference_count: 16 })
        ));
    }

    #[test]
    fn direction_follows_drift_sign() {
        let contour = ellipse(50.0, 50.0, (0.0, 0.0));
        let set = sample_contour(&contour, SamplingParams { levels: 3, phi_tol: 0.1 }).unwrap();
        let ring = PolarFrame::centered(&contour);

        // Source landmarks five samples behind their partners in angle
        let lagging: Vec<ContourPoint> = set
            .iter()
            .map(|p| {
                let mut position = ring.position_of(p.index).unwrap();
                for _ in 0..5 {
                    position = ring.neighbor(position, AngularStep::Lower);
                }
                contour.points()[ring.points()[position].index]
            })
            .collect();
        let lagging = CorrespondencePointSet::new(lagging);

        let optimized =
            optimize(&contour, &lagging, &contour, &set, &OptimizerParams::default()).unwrap();
        assert_eq!(optimized.report.direction, DriftDirection::Clockwise);
        assert_eq!(optimized.report.iterations, 5);
        assert_eq!(optimized.set, set);
    }

    #[test]
    fn foreign_landmarks_are_rejected() {
        let contour = ellipse(50.0, 30.0, (0.0, 0.0));
        let other = ellipse(50.0, 30.0, (7.0, 3.0));
        let params = SamplingParams { levels: 1, phi_tol: 0.1 };
        let set = sample_contour(&contour, params).unwrap();
        let other_set = sample_contour(&other, params).unwrap();

        let result = optimize(&contour, &other_set, &contour, &set, &OptimizerParams::default());
        assert!(matches!(result, Err(SectionAlignError::ForeignLandmark { .. })));
    }
}
