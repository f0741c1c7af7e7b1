//! Read/write coefficient bundle JSON files.
//!
//! A bundle is a JSON object mapping surface names to splines:
//!
//! ```json
//! { "B": { "tx": [...], "ty": [...], "kx": 3, "ky": 1, "c": [...] },
//!   "e_B": { ... } }
//! ```
//!
//! Every spline is validated on read so evaluation can index freely.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::LoadError;
use crate::surface::CoefficientBundle;

/// Read and validate a bundle.
pub fn read_bundle(path: &Path) -> Result<CoefficientBundle, LoadError> {
    let file = File::open(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            LoadError::NotFound { path: path.to_path_buf() }
        } else {
            LoadError::Io { path: path.to_path_buf(), source }
        }
    })?;

    let bundle: CoefficientBundle = serde_json::from_reader(BufReader::new(file))
        .map_err(|source| LoadError::Parse { path: path.to_path_buf(), source })?;

    bundle
        .validate()
        .map_err(|(name, reason)| LoadError::InvalidSpline { path: path.to_path_buf(), name, reason })?;

    Ok(bundle)
}

/// Write a bundle (used by tooling that converts fitted surfaces, and by tests).
pub fn write_bundle(path: &Path, bundle: &CoefficientBundle) -> Result<(), LoadError> {
    let file = File::create(path).map_err(|source| LoadError::Io { path: path.to_path_buf(), source })?;
    serde_json::to_writer(file, bundle).map_err(|source| LoadError::Parse { path: path.to_path_buf(), source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Band;
    use crate::surface::fixtures::decline_bundle;

    #[test]
    fn bundle_survives_a_write_read_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tck.json");
        let bundle = decline_bundle();

        write_bundle(&path, &bundle).unwrap();
        let back = read_bundle(&path).unwrap();
        assert_eq!(back, bundle);
        assert!(back.names().any(|n| n == "e_i"));
        assert!(back.value(Band::I).is_some());
    }

    #[test]
    fn invalid_spline_is_rejected_with_its_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tck.json");
        std::fs::write(
            &path,
            r#"{"B": {"tx": [0, 0, 1, 1], "ty": [0, 0, 1, 1], "kx": 1, "ky": 1, "c": [1, 2, 3]}}"#,
        )
        .unwrap();

        match read_bundle(&path) {
            Err(LoadError::InvalidSpline { name, .. }) => assert_eq!(name, "B"),
            other => panic!("expected InvalidSpline, got {other:?}"),
        }
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_bundle(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, LoadError::NotFound { .. }));
    }
}
