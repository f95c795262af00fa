//! Capacity validation: how many frame groups are needed and whether they fit.
//!
//! A frame group is the run of diagnostic frames followed by the run of data
//! frames. Enough groups are emitted to play out the longest fragment
//! sequence, and always at least one.

use std::fmt;

use ecd_config::SamplePrepConfig;
use serde::Serialize;

use crate::distribution::DistributionList;
use crate::error::SamplePrepError;
use crate::lvds::ROW_SIZE;

/// The sizing statistics of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CapacityReport {
    /// Frames in the longest fragment sequence.
    pub longest_sequence: u64,
    /// Frames in one frame group (diagnostic plus data frames).
    pub frame_group_length: u64,
    /// Frame groups required.
    pub frame_group_count: u64,
    /// Frames that fit into the contiguous buffer.
    pub max_frames: u64,
    /// Frames required in total.
    pub total_required_frames: u64,
    /// Bytes required in total.
    pub total_required_bytes: u64,
}

impl CapacityReport {
    /// Computes the sizing statistics for a configuration and distribution.
    pub fn compute(config: &SamplePrepConfig, distribution: &DistributionList) -> Self {
        let cells_per_frame = u64::from(config.cells_per_frame.max(1));
        let data_frames = u64::from(config.data_frames.max(1));

        let longest_sequence = distribution.longest_sequence() as u64;
        let frame_group_length = config.diagnostic_frame_count() as u64 + data_frames;
        // Rounds down then adds one, so an empty distribution still yields a group.
        let frame_group_count = longest_sequence / data_frames + 1;
        let total_required_frames = frame_group_count.saturating_mul(frame_group_length);

        Self {
            longest_sequence,
            frame_group_length,
            frame_group_count,
            max_frames: config.contig_size.bytes() / cells_per_frame,
            total_required_frames,
            total_required_bytes: total_required_frames.saturating_mul(cells_per_frame),
        }
    }

    /// Returns `true` if the required frames fit into the contiguous buffer.
    pub fn fits(&self) -> bool {
        self.total_required_frames <= self.max_frames
    }

    /// Fails with [`SamplePrepError::CapacityExceeded`] if the frames don't fit.
    pub fn ensure_fits(&self) -> Result<(), SamplePrepError> {
        if self.fits() {
            Ok(())
        } else {
            Err(SamplePrepError::CapacityExceeded { report: *self })
        }
    }
}

impl fmt::Display for CapacityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines = [
            (self.longest_sequence, "Frames in the longest fragment sequence"),
            (self.frame_group_length, "Frames in a frame group"),
            (self.frame_group_count, "Frame group(s) required"),
            (self.max_frames, "Frames will fit into the contig buffer"),
            (self.total_required_frames, "Frames required in total"),
            (self.total_required_bytes, "Bytes required in total"),
        ];
        for (value, label) in lines {
            writeln!(f, "{:>16} {label}", group_thousands(value))?;
        }
        Ok(())
    }
}

/// Formats a number with `,` between groups of three digits.
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Fails with [`SamplePrepError::GeometryMismatch`] if row reordering is
/// enabled and the frame width is not a whole number of rows.
pub fn check_geometry(cells_per_frame: u32, reorder: bool) -> Result<(), SamplePrepError> {
    if reorder && cells_per_frame as usize % ROW_SIZE != 0 {
        return Err(SamplePrepError::GeometryMismatch { cells_per_frame });
    }
    Ok(())
}

/// Validates geometry and capacity, returning the sizing statistics.
///
/// The frame group count to write is `report.frame_group_count`. When the
/// frames don't fit, the error carries the report that failed.
pub fn verify_distribution_is_valid(
    config: &SamplePrepConfig,
    distribution: &DistributionList,
    reorder: bool,
) -> Result<CapacityReport, SamplePrepError> {
    check_geometry(config.cells_per_frame, reorder)?;
    let report = CapacityReport::compute(config, distribution);
    log::debug!("capacity:\n{report}");
    report.ensure_fits()?;
    Ok(report)
}
