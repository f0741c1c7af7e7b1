//! Template JSON export.
//!
//! The export is the "portable" form of a generated template: every band's
//! grid, value and error (negative where untrusted), plus the parameters that
//! produced it. The schema is defined by `domain::TemplateFile`.

use std::fs::File;
use std::path::Path;

use crate::domain::TemplateFile;
use crate::error::TemplateError;

/// Write a template JSON file.
pub fn write_template_json(path: &Path, template: &TemplateFile) -> Result<(), TemplateError> {
    let export_err = |message: String| TemplateError::Export { path: path.to_path_buf(), message };

    let file = File::create(path).map_err(|e| export_err(format!("failed to create file: {e}")))?;
    serde_json::to_writer_pretty(file, template).map_err(|e| export_err(e.to_string()))?;
    Ok(())
}

/// Read a template JSON file.
pub fn read_template_json(path: &Path) -> Result<TemplateFile, TemplateError> {
    let export_err = |message: String| TemplateError::Export { path: path.to_path_buf(), message };

    let file = File::open(path).map_err(|e| export_err(format!("failed to open file: {e}")))?;
    serde_json::from_reader(file).map_err(|e| export_err(format!("invalid template JSON: {e}")))
}
