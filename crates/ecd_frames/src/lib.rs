//! Frame synthesis for ECD sample files.
//!
//! This crate turns fragment and distribution definitions into the frames of
//! a sample file. It loads the [`FragmentTable`] and the
//! [`DistributionList`], checks with [`CapacityReport`] that the resulting
//! frame groups fit the contiguous buffer, builds each frame with a
//! [`FrameBuilder`], optionally reorders every row for LVDS transmission
//! ([`lvds`]) and writes everything through an [`OutputWriter`]. The
//! [`trace`] module reads a written file back one cell at a time.

#![warn(missing_docs)]

pub mod capacity;
pub mod distribution;
pub mod error;
pub mod fragment;
pub mod frame;
pub mod lvds;
mod tokens;
pub mod trace;
pub mod writer;

pub use capacity::{check_geometry, verify_distribution_is_valid, CapacityReport};
pub use distribution::{DistributionList, DistributionRecord};
pub use error::{SamplePrepError, EXIT_DOES_NOT_FIT, EXIT_FAILURE};
pub use fragment::FragmentTable;
pub use frame::FrameBuilder;
pub use lvds::ROW_SIZE;
pub use trace::{trace_file, CellTrace};
pub use writer::{OutputWriter, WriteSummary};
