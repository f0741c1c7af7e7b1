//! Calibration dataset ingest for the slow-path evaluator.
//!
//! Schema (CSV, header required, column order free, `#` comment lines allowed):
//!
//! ```text
//! band,t,dm15,flux,e_flux
//! B,-5.2,1.13,0.962,0.011
//! ```
//!
//! Rows that fail to parse are skipped and counted; an empty result is an error.

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use csv::StringRecord;
use tracing::warn;

use crate::domain::Band;
use crate::error::TemplateError;
use crate::surface::{CalibrationPoint, CalibrationSet};

const REQUIRED: [&str; 5] = ["band", "t", "dm15", "flux", "e_flux"];

/// Load the calibration set.
pub fn read_calibration_set(path: &Path) -> Result<CalibrationSet, TemplateError> {
    let file = File::open(path)
        .map_err(|e| TemplateError::Calibration(format!("failed to open '{}': {e}", path.display())))?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| TemplateError::Calibration(format!("failed to read headers of '{}': {e}", path.display())))?
        .clone();
    let header_map = build_header_map(&headers);
    for column in REQUIRED {
        if !header_map.contains_key(column) {
            return Err(TemplateError::Calibration(format!(
                "'{}' is missing required column `{column}`",
                path.display()
            )));
        }
    }

    let mut set = CalibrationSet::new();
    let mut skipped = 0usize;
    for (idx, result) in reader.records().enumerate() {
        let parsed = result
            .map_err(|e| e.to_string())
            .and_then(|record| parse_row(&record, &header_map));
        match parsed {
            Ok((band, point)) => set.push(band, point),
            Err(message) => {
                skipped += 1;
                // +2: header line plus 1-based numbering.
                warn!(line = idx + 2, %message, "skipping calibration row");
            }
        }
    }

    if set.is_empty() {
        return Err(TemplateError::Calibration(format!(
            "no usable rows in '{}' ({skipped} skipped)",
            path.display()
        )));
    }
    Ok(set)
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (name.trim().trim_start_matches('\u{feff}').to_ascii_lowercase(), idx))
        .collect()
}

fn field<'r>(record: &'r StringRecord, header_map: &HashMap<String, usize>, name: &str) -> Result<&'r str, String> {
    header_map
        .get(name)
        .and_then(|&idx| record.get(idx))
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("missing `{name}`"))
}

fn number(record: &StringRecord, header_map: &HashMap<String, usize>, name: &str) -> Result<f64, String> {
    let raw = field(record, header_map, name)?;
    let v: f64 = raw.parse().map_err(|_| format!("invalid `{name}` value '{raw}'"))?;
    if v.is_finite() { Ok(v) } else { Err(format!("non-finite `{name}`")) }
}

fn parse_row(record: &StringRecord, header_map: &HashMap<String, usize>) -> Result<(Band, CalibrationPoint), String> {
    let band_name = field(record, header_map, "band")?;
    let band: Band = band_name.parse().map_err(|_| format!("unknown band '{band_name}'"))?;
    if band.is_color_model() {
        return Err(format!("band '{band_name}' has no surface"));
    }

    let point = CalibrationPoint {
        t: number(record, header_map, "t")?,
        dm15: number(record, header_map, "dm15")?,
        flux: number(record, header_map, "flux")?,
        e_flux: number(record, header_map, "e_flux")?,
    };
    if point.e_flux <= 0.0 {
        return Err("`e_flux` must be positive".to_string());
    }
    Ok((band, point))
}
