// src/sampler.rs - Outline triangulation: angularly ordered landmark sampling

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use crate::contour::Contour;
use crate::correspondence::CorrespondencePointSet;
use crate::errors::{Result, SectionAlignError};
use crate::polar::{PolarFrame, PolarPoint};

/// Upper bound on refinement levels (4 * 2^12 = 16384 landmarks)
pub const MAX_LEVELS: u32 = 12;

/// Candidates closer than this to the chord midpoint (in both u and v) are taken at once
const MIDPOINT_HIT_DISTANCE: f64 = 1.0;

/// Sampling resolution and angular search tolerance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingParams {
    /// Refinement passes; the sampler returns `4 * 2^levels` landmarks
    pub levels: u32,

    /// Half-width of every angular search window, in radians
    pub phi_tol: f64,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            levels: 4,
            phi_tol: 0.1,
        }
    }
}

impl SamplingParams {
    /// Landmarks produced at these settings, saturating for out-of-range levels
    pub fn sample_count(&self) -> usize {
        1usize
            .checked_shl(self.levels)
            .and_then(|n| n.checked_mul(4))
            .unwrap_or(usize::MAX)
    }

    pub fn validate(&self) -> Result<()> {
        if self.levels > MAX_LEVELS {
            return Err(SectionAlignError::Config(format!(
                "levels must be <= {}, got {}",
                MAX_LEVELS, self.levels
            )));
        }

        if !(self.phi_tol > 0.0 && self.phi_tol <= FRAC_PI_4) {
            return Err(SectionAlignError::Config(format!(
                "phi_tol must be in (0, pi/4], got {}",
                self.phi_tol
            )));
        }

        Ok(())
    }
}

/// Axis a seed must lie closest to
#[derive(Debug, Clone, Copy)]
enum SeedAxis {
    /// ±u direction, pick minimal |v|
    Horizontal,
    /// ±v direction, pick minimal |u|
    Vertical,
}

/// Seed directions in emission order. The ±π direction comes first so two
/// contours are always paired quadrant-for-quadrant.
const SEED_DIRECTIONS: [(f64, SeedAxis); 4] = [
    (-PI, SeedAxis::Horizontal),
    (-FRAC_PI_2, SeedAxis::Vertical),
    (0.0, SeedAxis::Horizontal),
    (FRAC_PI_2, SeedAxis::Vertical),
];

/// Selects `4 * 2^levels` contour points approximating uniform angular coverage
pub struct CorrespondenceSampler<'a> {
    contour: &'a Contour,
    frame: PolarFrame,
    params: SamplingParams,
}

impl<'a> CorrespondenceSampler<'a> {
    pub fn new(contour: &'a Contour, params: SamplingParams) -> Self {
        Self {
            contour,
            frame: PolarFrame::aligned(contour),
            params,
        }
    }

    pub fn frame(&self) -> &PolarFrame {
        &self.frame
    }

    pub fn params(&self) -> SamplingParams {
        self.params
    }

    /// Run seeding and all refinement levels
    pub fn sample(&self) -> Result<CorrespondencePointSet> {
        let landmarks = self.sample_polar()?;

        let points = landmarks
            .iter()
            .map(|p| {
                self.contour.point(p.index).copied().ok_or_else(|| {
                    SectionAlignError::DegenerateContour(format!(
                        "polar point refers to missing index {}",
                        p.index
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(CorrespondencePointSet::new(points))
    }

    /// Landmarks in the polar frame, before mapping back to pixel coordinates
    pub fn sample_polar(&self) -> Result<Vec<PolarPoint>> {
        self.params.validate()?;
        let seeds = self.seed()?;

        (1..=self.params.levels).try_fold(seeds, |current, level| {
            let inserted = self.refine(&current)?;
            let next: Vec<PolarPoint> = current
                .into_iter()
                .zip(inserted)
                .flat_map(|(existing, new)| [existing, new])
                .collect();

            log::debug!("Sampling level {}: {} landmarks", level, next.len());
            Ok(next)
        })
    }

    /// Level-0 landmarks: the point closest to each of the four axis directions
    pub fn seed(&self) -> Result<Vec<PolarPoint>> {
        let tol = self.params.phi_tol;

        SEED_DIRECTIONS
            .iter()
            .map(|&(direction, axis)| {
                let candidates: Vec<&PolarPoint> = if direction == -PI {
                    self.frame
                        .window(-PI, -PI + tol)
                        .iter()
                        .chain(self.frame.window(PI - tol, PI))
                        .collect()
                } else {
                    self.frame.window(direction - tol, direction + tol).iter().collect()
                };

                let off_axis = |p: &PolarPoint| match axis {
                    SeedAxis::Horizontal => p.v.abs(),
                    SeedAxis::Vertical => p.u.abs(),
                };

                candidates
                    .into_iter()
                    .min_by(|a, b| off_axis(a).total_cmp(&off_axis(b)))
                    .copied()
                    .ok_or_else(|| SectionAlignError::InsufficientContourDensity {
                        window: format!("seed window {:.3} ± {:.3} rad", direction, tol),
                    })
            })
            .collect()
    }

    /// One new landmark for every angularly adjacent pair, the last pair wrapping to the first
    pub fn refine(&self, current: &[PolarPoint]) -> Result<Vec<PolarPoint>> {
        let n = current.len();
        (0..n)
            .map(|i| self.triangulate(&current[i], &current[(i + 1) % n]))
            .collect()
    }

    /// Contour point between `p1` and `p2` whose direction from the chord
    /// midpoint is closest to perpendicular to the chord
    fn triangulate(&self, p1: &PolarPoint, p2: &PolarPoint) -> Result<PolarPoint> {
        let tol = self.params.phi_tol;

        let candidates: Vec<&PolarPoint> = if p2.phi < p1.phi {
            // Arc crosses the ±π seam
            self.frame
                .window(p1.phi - tol, PI)
                .iter()
                .chain(self.frame.window(-PI, p2.phi + tol))
                .collect()
        } else {
            self.frame.window(p1.phi - tol, p2.phi + tol).iter().collect()
        };

        let mid_u = (p1.u + p2.u) / 2.0;
        let mid_v = (p1.v + p2.v) / 2.0;
        let chord_slope = (p2.v - p1.v) / (p2.u - p1.u);

        let mut best: Option<(&PolarPoint, f64)> = None;
        for candidate in candidates {
            let du = candidate.u - mid_u;
            let dv = candidate.v - mid_v;

            if du.abs() < MIDPOINT_HIT_DISTANCE && dv.abs() < MIDPOINT_HIT_DISTANCE {
                return Ok(*candidate);
            }

            let score = perpendicularity_score(chord_slope, dv / du);
            match best {
                Some((_, best_score)) if score >= best_score => {}
                _ => best = Some((candidate, score)),
            }
        }

        best.map(|(p, _)| *p)
            .ok_or_else(|| SectionAlignError::InsufficientContourDensity {
                window: format!(
                    "triangulation arc [{:.3} - {:.3}, {:.3} + {:.3}] rad",
                    p1.phi, tol, p2.phi, tol
                ),
            })
    }
}

/// `|1 + m1 * m2|`: zero when two lines with slopes m1, m2 are perpendicular.
/// Undefined products from vertical slopes rank last.
fn perpendicularity_score(m1: f64, m2: f64) -> f64 {
    let score = (1.0 + m1 * m2).abs();
    if score.is_nan() {
        f64::INFINITY
    } else {
        score
    }
}

/// Sample a contour with the given parameters
pub fn sample_contour(contour: &Contour, params: SamplingParams) -> Result<CorrespondencePointSet> {
    CorrespondenceSampler::new(contour, params).sample()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn circle(radius: f64, step_deg: f64) -> Contour {
        let steps = (360.0 / step_deg).round() as usize;
        Contour::new(
            (0..steps)
                .map(|i| {
                    let t = (i as f64 * step_deg).to_radians();
                    (radius * t.cos(), radius * t.sin())
                })
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn perpendicular_slopes_score_zero() {
        assert_approx_eq!(perpendicularity_score(2.0, -0.5), 0.0);
        assert_approx_eq!(perpendicularity_score(1.0, 1.0), 2.0);
        assert_eq!(perpendicularity_score(0.0, f64::INFINITY), f64::INFINITY);
    }

    #[test]
    fn seeds_lie_on_axes() {
        let contour = circle(50.0, 1.0);
        let sampler = CorrespondenceSampler::new(&contour, SamplingParams::default());
        let seeds = sampler.seed().unwrap();
        assert_eq!(seeds.len(), 4);

        let expected = [PI, -FRAC_PI_2, 0.0, FRAC_PI_2];
        for (seed, target) in seeds.iter().zip(expected) {
            let diff = crate::polar::wrap_angle_difference(target, seed.phi).abs();
            assert!(diff <= 0.5f64.to_radians() + 1e-9, "seed {:?} vs {}", seed, target);
        }
    }

    #[test]
    fn refine_doubles_count() {
        let contour = circle(50.0, 1.0);
        let sampler = CorrespondenceSampler::new(&contour, SamplingParams::default());
        let seeds = sampler.seed().unwrap();
        let inserted = sampler.refine(&seeds).unwrap();
        assert_eq!(inserted.len(), seeds.len());

        // Each inserted point bisects its arc on a circle
        for (i, new) in inserted.iter().enumerate() {
            let a = seeds[i].phi;
            let b = seeds[(i + 1) % seeds.len()].phi;
            let half = crate::polar::wrap_angle_difference(a, b) / 2.0;
            let expected = a + half;
            let diff = crate::polar::wrap_angle_difference(expected, new.phi).abs();
            assert!(diff < 2.0f64.to_radians(), "inserted {:?} expected {}", new, expected);
        }
    }

    #[test]
    fn level_zero_returns_seeds() {
        let contour = circle(50.0, 1.0);
        let params = SamplingParams { levels: 0, phi_tol: 0.1 };
        let set = sample_contour(&contour, params).unwrap();
        assert_eq!(set.len(), 4);
    }

    #[test]
    fn out_of_range_levels_are_rejected() {
        let contour = circle(50.0, 1.0);
        let params = SamplingParams { levels: 64, phi_tol: 0.1 };
        assert_eq!(params.sample_count(), usize::MAX);
        assert!(matches!(
            sample_contour(&contour, params),
            Err(SectionAlignError::Config(_))
        ));

        let params = SamplingParams { levels: MAX_LEVELS + 1, phi_tol: 0.1 };
        assert!(sample_contour(&contour, params).is_err());

        let params = SamplingParams { levels: 2, phi_tol: 0.0 };
        assert!(sample_contour(&contour, params).is_err());
    }

    #[test]
    fn sparse_contour_fails_seeding() {
        let contour = Contour::new(vec![(0.0, 0.0), (10.0, 0.0), (0.0, 10.0)]).unwrap();
        let result = sample_contour(&contour, SamplingParams::default());
        assert!(matches!(
            result,
            Err(SectionAlignError::InsufficientContourDensity { .. })
        ));
    }

    #[test]
    fn vertical_chord_hits_midpoint() {
        // Axis-aligned square: level-2 chords run along the edges
        let mut pixels = Vec::new();
        for x in 0..=100u32 {
            pixels.push((x, 0));
            pixels.push((x, 100));
        }
        for y in 1..100u32 {
            pixels.push((0, y));
            pixels.push((100, y));
        }
        let contour = Contour::from_pixels(&pixels).unwrap();
        let params = SamplingParams { levels: 2, phi_tol: 0.1 };
        let set = sample_contour(&contour, params).unwrap();
        assert_eq!(set.len(), 16);

        // Every landmark is within a pixel of an edge midpoint, a corner, or a quarter point
        for p in set.iter() {
            let near_grid = |c: f64| (c - (c / 25.0).round() * 25.0).abs() <= 1.0;
            assert!(near_grid(p.x) && near_grid(p.y), "unexpected landmark {:?}", p);
        }
    }
}
