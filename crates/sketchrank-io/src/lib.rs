//! File I/O, validation, and serialization for the sketchrank pipeline.

mod domain;
mod error;
mod reader;
mod sketch;
mod writer;

pub use domain::{CandidateSet, RunName, Sketch};
pub use error::IoError;
pub use reader::CandidateReader;
pub use sketch::{MIN_SKETCH_POINTS, SketchReader};
pub use writer::ResultWriter;
