use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord, Trim};

use crate::errors::{Result, SectionAlignError};

/// Represents an outline point list with its metadata
pub struct InputContour {
    pub points: Vec<(f64, f64)>,
    pub path: PathBuf,
    pub filename: String,
}

/// Get all CSV files from a directory (recursively), sorted by path
pub fn get_csv_files_in_dir<P: AsRef<Path>>(dir_path: P) -> Result<Vec<PathBuf>> {
    let dir_path = dir_path.as_ref();

    if !dir_path.exists() {
        return Err(SectionAlignError::InvalidPath(dir_path.to_path_buf()));
    }

    if !dir_path.is_dir() {
        return Err(SectionAlignError::Config(format!(
            "{} is not a directory", dir_path.display()
        )));
    }

    let mut csv_files = Vec::new();
    find_csv_files_recursive(dir_path, &mut csv_files)?;
    csv_files.sort();

    Ok(csv_files)
}

fn find_csv_files_recursive(dir_path: &Path, result: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir_path)? {
        let path = entry?.path();

        if path.is_dir() {
            find_csv_files_recursive(&path, result)?;
        } else if path.is_file() {
            if let Some(ext) = path.extension() {
                if ext.to_ascii_lowercase() == "csv" {
                    result.push(path);
                }
            }
        }
    }

    Ok(())
}

/// Section id of `path`: its location below `root` without the extension,
/// with `/` separators. Paths outside `root` fall back to the file stem.
pub fn section_id(path: &Path, root: &Path) -> Result<String> {
    let relative = match path.strip_prefix(root) {
        Ok(relative) if relative.file_name().is_some() => relative.with_extension(""),
        _ => PathBuf::from(
            path.file_stem()
                .ok_or_else(|| SectionAlignError::InvalidPath(path.to_path_buf()))?,
        ),
    };

    let parts = relative
        .components()
        .map(|c| {
            c.as_os_str()
                .to_str()
                .ok_or_else(|| SectionAlignError::InvalidPath(path.to_path_buf()))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(parts.join("/"))
}

/// Load an outline point list from a CSV file with an `x,y` header
pub fn load_contour_csv<P: AsRef<Path>>(path: P) -> Result<InputContour> {
    let path = path.as_ref();

    let filename = path.file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| SectionAlignError::InvalidPath(path.to_path_buf()))?
        .to_string();

    let file = fs::File::open(path)?;
    let points = read_points(file)?;

    Ok(InputContour {
        points,
        path: path.to_path_buf(),
        filename,
    })
}

/// Parse `x,y` rows. Columns are located by header name (case-insensitive),
/// falling back to the first two columns; extra columns are ignored.
pub fn read_points<R: Read>(reader: R) -> Result<Vec<(f64, f64)>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let (x_col, y_col) = coordinate_columns(&headers);

    let mut points = Vec::new();
    for record in reader.records() {
        let record = record?;
        let line = record.position().map_or(0, |p| p.line() as usize);

        if record.iter().all(|field| field.is_empty()) {
            continue;
        }

        let x = parse_field(&record, x_col, "x", line)?;
        let y = parse_field(&record, y_col, "y", line)?;
        points.push((x, y));
    }

    Ok(points)
}

fn coordinate_columns(headers: &StringRecord) -> (usize, usize) {
    let find = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));
    match (find("x"), find("y")) {
        (Some(x), Some(y)) => (x, y),
        _ => (0, 1),
    }
}

fn parse_field(record: &StringRecord, column: usize, name: &str, line: usize) -> Result<f64> {
    let raw = record.get(column).ok_or_else(|| SectionAlignError::InvalidPoint {
        line,
        reason: format!("missing {} column", name),
    })?;

    let value: f64 = raw.parse().map_err(|_| SectionAlignError::InvalidPoint {
        line,
        reason: format!("{} value '{}' is not a number", name, raw),
    })?;

    if !value.is_finite() {
        return Err(SectionAlignError::InvalidPoint {
            line,
            reason: format!("{} value '{}' is not finite", name, raw),
        });
    }

    Ok(value)
}
