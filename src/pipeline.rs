// src/pipeline.rs - Sampling, optimization and pair building for one section or a batch

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::alignment::{build_alignment_pairs, AlignmentPair};
use crate::config::Config;
use crate::contour::Contour;
use crate::correspondence::CorrespondencePointSet;
use crate::errors::{Result, SectionAlignError};
use crate::optimizer::{optimize, OptimizationReport};
use crate::output::{write_pairs_csv, write_pairs_json, write_summary, SectionSummary};
use crate::point_io::{load_contour_csv, section_id, InputContour};
use crate::sampler::sample_contour;

/// Everything produced for one source/reference pair
#[derive(Debug, Clone)]
pub struct AlignmentResult {
    /// Source landmarks, optimized when enabled
    pub source_samples: CorrespondencePointSet,
    pub reference_samples: CorrespondencePointSet,
    pub optimization: Option<OptimizationReport>,
    pub pairs: Vec<AlignmentPair>,
}

/// Outcome counts of a batch run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchSummary {
    pub processed: usize,
    pub failed: Vec<PathBuf>,
    pub summary_path: Option<PathBuf>,
}

/// Align `source` to `reference`: sample both, optionally run the greedy
/// optimizer on the source landmarks, and build the weighted pairs
pub fn align_contours(source: &Contour, reference: &Contour, config: &Config) -> Result<AlignmentResult> {
    let params = config.sampling_params();

    let reference_samples = sample_contour(reference, params)?;
    let sampled = sample_contour(source, params)?;

    let (source_samples, optimization) = if config.optimize {
        let optimized = optimize(
            source,
            &sampled,
            reference,
            &reference_samples,
            &config.optimizer_params(),
        )?;
        (optimized.set, Some(optimized.report))
    } else {
        (sampled, None)
    };

    let pairs = build_alignment_pairs(
        &source_samples,
        source.centroid(),
        &reference_samples,
        reference.centroid(),
        config.centroid_weight,
    )?;

    Ok(AlignmentResult {
        source_samples,
        reference_samples,
        optimization,
        pairs,
    })
}

/// Align one loaded section outline and write its pair files
pub fn process_section(
    input: InputContour,
    reference: &Contour,
    config: &Config,
    write_json: bool,
) -> Result<SectionSummary> {
    let InputContour { points, path, filename } = input;

    let source = Contour::new(points)?;
    let result = align_contours(&source, reference, config)?;

    write_pairs_csv(&result.pairs, &config.output_base_dir, &filename)?;
    if write_json {
        write_pairs_json(&result.pairs, &config.output_base_dir, &filename)?;
    }

    log::info!(
        "Aligned {} ({} outline points, {} landmarks, theta {:.3})",
        path.display(),
        source.len(),
        result.source_samples.len(),
        source.theta()
    );

    Ok(SectionSummary {
        id: filename,
        outline_points: source.len(),
        correspondence_points: result.source_samples.len(),
        theta: source.theta(),
        initial_cost: result.optimization.map(|r| r.initial_cost),
        final_cost: result.optimization.map(|r| r.final_cost),
        iterations: result.optimization.map_or(0, |r| r.iterations),
        direction: result.optimization.map(|r| r.direction.as_str()),
    })
}

/// Load and align one section file
pub fn process_section_file(
    path: &Path,
    reference: &Contour,
    config: &Config,
    write_json: bool,
) -> Result<SectionSummary> {
    let input = load_contour_csv(path)?;
    process_section(input, reference, config, write_json)
}

/// Pair each path with its section id below `root`. A repeated id is an
/// error for every path after the first that claims it.
fn assign_section_ids(paths: &[PathBuf], root: &Path) -> Vec<(PathBuf, Result<String>)> {
    let mut seen = HashSet::new();
    paths
        .iter()
        .map(|path| {
            let id = section_id(path, root).and_then(|id| {
                if seen.insert(id.clone()) {
                    Ok(id)
                } else {
                    Err(SectionAlignError::DuplicateSectionId { id, path: path.clone() })
                }
            });
            (path.clone(), id)
        })
        .collect()
}

/// Align every section file against the same reference.
///
/// Output files are named by the section's path below `config.input_path`.
/// A failing section is logged and recorded; the remaining sections still run.
pub fn process_batch(
    paths: &[PathBuf],
    reference: &Contour,
    config: &Config,
    write_json: bool,
) -> Result<BatchSummary> {
    let jobs = assign_section_ids(paths, Path::new(&config.input_path));

    let run = |(path, id): (PathBuf, Result<String>)| {
        let outcome = id.and_then(|id| {
            let mut input = load_contour_csv(&path)?;
            input.filename = id;
            process_section(input, reference, config, write_json)
        });
        (path, outcome)
    };

    let outcomes: Vec<(PathBuf, Result<SectionSummary>)> = if config.use_parallel {
        jobs.into_par_iter().map(run).collect()
    } else {
        jobs.into_iter().map(run).collect()
    };

    let mut summary = BatchSummary::default();
    let mut rows = Vec::with_capacity(outcomes.len());

    for (path, outcome) in outcomes {
        match outcome {
            Ok(row) => {
                summary.processed += 1;
                rows.push(row);
            }
            Err(e) => {
                log::warn!("Skipping {}: {}", path.display(), e);
                summary.failed.push(path);
            }
        }
    }

    summary.summary_path = Some(write_summary(&rows, &config.output_base_dir)?);

    Ok(summary)
}
