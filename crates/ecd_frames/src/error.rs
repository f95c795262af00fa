//! Error types for loading definitions, validating capacity and writing frames.

use std::path::PathBuf;

use ecd_common::InternalError;

use crate::capacity::CapacityReport;
use crate::lvds::ROW_SIZE;

/// Process exit status for malformed input and I/O failures.
pub const EXIT_FAILURE: i32 = 1;

/// Process exit status when the configuration does not fit the hardware:
/// the frames exceed the contiguous buffer or the frame width is not a
/// whole number of rows.
pub const EXIT_DOES_NOT_FIT: i32 = 3;

/// Errors that can occur while preparing a sample file.
///
/// Every variant is fatal for the run. Parse errors carry the file and the
/// 1-based line number of the offending definition.
#[derive(Debug, thiserror::Error)]
pub enum SamplePrepError {
    /// A definition file could not be opened.
    #[error("{} not found: {source}", .path.display())]
    FileNotFound {
        /// The definition file path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The sample file to trace could not be opened.
    #[error("can't open {}: {source}", .path.display())]
    CannotOpenFile {
        /// The sample file path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The output file could not be created.
    #[error("can't create {}: {source}", .path.display())]
    CannotCreateFile {
        /// The output file path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Reading or writing an already opened file failed.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        /// The file being read or written.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A distribution record names a cell outside the frame.
    #[error(
        "{}:{line}: invalid cell number {cell} (frames have {cells_per_frame} cells)",
        .path.display()
    )]
    InvalidCellNumber {
        /// The distribution file path.
        path: PathBuf,
        /// The 1-based line number.
        line: usize,
        /// The offending 1-based cell number.
        cell: i64,
        /// The configured frame width.
        cells_per_frame: u32,
    },

    /// A distribution record has an unusable stride.
    #[error("{}:{line}: invalid cell range: {reason}", .path.display())]
    InvalidCellRange {
        /// The distribution file path.
        path: PathBuf,
        /// The 1-based line number.
        line: usize,
        /// Description of the problem.
        reason: String,
    },

    /// A distribution record references a fragment that was never defined.
    #[error("{}:{line}: undefined fragment name '{name}'", .path.display())]
    UndefinedFragment {
        /// The distribution file path.
        path: PathBuf,
        /// The 1-based line number.
        line: usize,
        /// The unknown fragment name.
        name: String,
    },

    /// A numeric token could not be parsed.
    #[error("{}:{line}: invalid number '{token}' ({expected})", .path.display())]
    InvalidNumber {
        /// The definition file path.
        path: PathBuf,
        /// The 1-based line number.
        line: usize,
        /// The offending token.
        token: String,
        /// What kind of number was expected there.
        expected: &'static str,
    },

    /// The frame groups required by the distribution exceed the contiguous buffer.
    #[error(
        "the specified fragment distribution won't fit into the contiguous buffer \
         ({} frames required, {} fit)",
        .report.total_required_frames,
        .report.max_frames
    )]
    CapacityExceeded {
        /// The sizing statistics that failed the check.
        report: CapacityReport,
    },

    /// The frame width is not a whole number of rows.
    #[error(
        "config value 'cells_per_frame' ({cells_per_frame}) must be a multiple of {row_size}",
        row_size = ROW_SIZE
    )]
    GeometryMismatch {
        /// The configured frame width.
        cells_per_frame: u32,
    },

    /// A traced cell number lies outside the frame.
    #[error("cell {cell} is outside a frame of {cells_per_frame} cells")]
    InvalidTraceCell {
        /// The requested 0-based cell number.
        cell: u64,
        /// The configured frame width.
        cells_per_frame: u32,
    },

    /// An internal invariant was violated.
    #[error(transparent)]
    InternalConsistency(#[from] InternalError),
}

impl SamplePrepError {
    /// Returns the process exit status for this error.
    ///
    /// Configurations that do not fit the hardware get a status distinct from
    /// malformed input so that scripts can tell the two apart.
    pub fn exit_code(&self) -> i32 {
        match self {
            SamplePrepError::CapacityExceeded { .. } | SamplePrepError::GeometryMismatch { .. } => {
                EXIT_DOES_NOT_FIT
            }
            _ => EXIT_FAILURE,
        }
    }
}
