//! JSON sketch reader.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use tracing::{info, instrument};

use crate::IoError;
use crate::domain::Sketch;

/// Fewest drawn points accepted as a query.
pub const MIN_SKETCH_POINTS: usize = 10;

/// Reads a user-drawn sketch from a JSON file.
///
/// Expected format: `{ "y": [0.1, 0.4, ...], "target_len": 200 }`, where
/// `target_len` may be omitted. Unknown fields are ignored.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`IoError::JsonParse`] | Not valid JSON, or `y` missing or not numeric |
/// | [`IoError::TooFewPoints`] | Fewer than [`MIN_SKETCH_POINTS`] values in `y` |
pub struct SketchReader {
    path: PathBuf,
}

impl SketchReader {
    /// Create a new reader for the given JSON file path.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Read and validate the sketch.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read(&self) -> Result<Sketch, IoError> {
        let file = File::open(&self.path).map_err(|e| IoError::FileNotFound {
            path: self.path.clone(),
            source: e,
        })?;

        let sketch: Sketch =
            serde_json::from_reader(BufReader::new(file)).map_err(|e| IoError::JsonParse {
                path: self.path.clone(),
                source: e,
            })?;

        if sketch.y.len() < MIN_SKETCH_POINTS {
            return Err(IoError::TooFewPoints {
                path: self.path.clone(),
                got: sketch.y.len(),
                min: MIN_SKETCH_POINTS,
            });
        }

        info!(points = sketch.y.len(), target_len = ?sketch.target_len, "sketch loaded");
        Ok(sketch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_json(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f.flush().unwrap();
        f
    }

    #[test]
    fn read_valid_sketch() {
        let f = write_json(r#"{"y": [0, 1, 2, 3, 4, 5, 6, 7, 8, 9], "target_len": 128}"#);
        let sketch = SketchReader::new(f.path()).read().unwrap();
        assert_eq!(sketch.y.len(), 10);
        assert_eq!(sketch.target_len, Some(128));
    }

    #[test]
    fn extra_fields_are_ignored() {
        let f = write_json(r#"{"y": [0, 1, 2, 3, 4, 5, 6, 7, 8, 9], "user": "anon"}"#);
        let sketch = SketchReader::new(f.path()).read().unwrap();
        assert_eq!(sketch.target_len, None);
    }

    #[test]
    fn error_too_few_points() {
        let f = write_json(r#"{"y": [1, 2, 3]}"#);
        let result = SketchReader::new(f.path()).read();
        assert!(matches!(result, Err(IoError::TooFewPoints { got: 3, min: 10, .. })));
    }

    #[test]
    fn error_missing_y() {
        let f = write_json(r#"{"target_len": 200}"#);
        let result = SketchReader::new(f.path()).read();
        assert!(matches!(result, Err(IoError::JsonParse { .. })));
    }

    #[test]
    fn error_non_numeric_point() {
        let f = write_json(r#"{"y": [1, 2, "three", 4, 5, 6, 7, 8, 9, 10]}"#);
        let result = SketchReader::new(f.path()).read();
        assert!(matches!(result, Err(IoError::JsonParse { .. })));
    }

    #[test]
    fn error_file_not_found() {
        let result = SketchReader::new(Path::new("/nonexistent/sketch.json")).read();
        assert!(matches!(result, Err(IoError::FileNotFound { .. })));
    }
}
