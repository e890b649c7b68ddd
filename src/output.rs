use std::fs;
use std::path::{Path, PathBuf};
use csv::Writer;

use crate::alignment::AlignmentPair;
use crate::errors::Result;

/// One row of the batch summary
#[derive(Debug, Clone, PartialEq)]
pub struct SectionSummary {
    pub id: String,
    pub outline_points: usize,
    pub correspondence_points: usize,
    pub theta: f64,
    pub initial_cost: Option<f64>,
    pub final_cost: Option<f64>,
    pub iterations: usize,
    pub direction: Option<&'static str>,
}

/// `<output_dir>/pairs/<id>.<extension>`; ids may contain `/` for nested inputs
fn pairs_path<P: AsRef<Path>>(output_dir: P, id: &str, extension: &str) -> Result<PathBuf> {
    let path = output_dir.as_ref().join("pairs").join(format!("{}.{}", id, extension));
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(path)
}

/// Write alignment pairs of one section to CSV
pub fn write_pairs_csv<P: AsRef<Path>>(
    pairs: &[AlignmentPair],
    output_dir: P,
    filename: &str,
) -> Result<PathBuf> {
    let output_path = pairs_path(output_dir, filename, "csv")?;
    let mut writer = Writer::from_path(&output_path)?;

    writer.write_record([
        "Pair_Index",
        "Source_X",
        "Source_Y",
        "Reference_X",
        "Reference_Y",
        "Weight",
    ])?;

    for (i, pair) in pairs.iter().enumerate() {
        writer.write_record(&[
            i.to_string(),
            format!("{:.6}", pair.source.0),
            format!("{:.6}", pair.source.1),
            format!("{:.6}", pair.reference.0),
            format!("{:.6}", pair.reference.1),
            format!("{:.1}", pair.weight),
        ])?;
    }

    writer.flush()?;

    Ok(output_path)
}

/// Write alignment pairs of one section to JSON
pub fn write_pairs_json<P: AsRef<Path>>(
    pairs: &[AlignmentPair],
    output_dir: P,
    filename: &str,
) -> Result<PathBuf> {
    let output_path = pairs_path(output_dir, filename, "json")?;
    let file = fs::File::create(&output_path)?;
    serde_json::to_writer_pretty(file, pairs)?;

    Ok(output_path)
}

/// Write the batch summary, one row per successfully aligned section
pub fn write_summary<P: AsRef<Path>>(rows: &[SectionSummary], output_dir: P) -> Result<PathBuf> {
    fs::create_dir_all(output_dir.as_ref())?;
    let summary_path = output_dir.as_ref().join("summary.csv");
    let mut writer = Writer::from_path(&summary_path)?;

    writer.write_record([
        "ID",
        "Outline_Points",
        "Correspondence_Points",
        "Theta",
        "Initial_Cost",
        "Final_Cost",
        "Iterations",
        "Direction",
    ])?;

    let optional = |value: Option<f64>| value.map(|v| format!("{:.6}", v)).unwrap_or_default();

    for row in rows {
        writer.write_record(&[
            row.id.clone(),
            row.outline_points.to_string(),
            row.correspondence_points.to_string(),
            format!("{:.6}", row.theta),
            optional(row.initial_cost),
            optional(row.final_cost),
            row.iterations.to_string(),
            row.direction.unwrap_or("").to_string(),
        ])?;
    }

    writer.flush()?;

    Ok(summary_path)
}
