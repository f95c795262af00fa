//! Sample file output.
//!
//! The file is a sequence of frame groups. Each group holds one frame per
//! diagnostic value, filled with that value, followed by `data_frames` data
//! frames. Data frames are numbered continuously across groups, so group `g`
//! carries data frames `g * data_frames ..`. All frames are exactly
//! `cells_per_frame` bytes and are written without any header or padding.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use ecd_config::SamplePrepConfig;

use crate::distribution::DistributionList;
use crate::error::SamplePrepError;
use crate::frame::FrameBuilder;
use crate::lvds;

/// Totals of one completed write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WriteSummary {
    /// Frame groups written.
    pub frame_groups: u64,
    /// Frames written, diagnostic and data.
    pub frames: u64,
    /// Bytes written.
    pub bytes: u64,
}

/// Writes frame groups, reusing a single frame buffer for every frame.
#[derive(Debug)]
pub struct OutputWriter<'a> {
    builder: FrameBuilder<'a>,
    diagnostics: Vec<u8>,
    data_frames: u32,
    reorder: bool,
    frame: Vec<u8>,
}

impl<'a> OutputWriter<'a> {
    /// Creates a writer for the frames described by `config` and `distribution`.
    ///
    /// With `reorder` set, every data frame is converted to LVDS transmission
    /// order before it is written. Diagnostic frames are uniform and need no
    /// reordering.
    pub fn new(
        config: &SamplePrepConfig,
        distribution: &'a DistributionList,
        reorder: bool,
    ) -> Self {
        let cells_per_frame = config.cells_per_frame as usize;
        Self {
            builder: FrameBuilder::new(distribution, cells_per_frame, config.quiescent),
            diagnostics: config.diagnostic_sequence(),
            data_frames: config.data_frames,
            reorder,
            frame: vec![0; cells_per_frame],
        }
    }

    /// Creates `path` and writes `frame_group_count` frame groups to it.
    pub fn write_file(
        &mut self,
        path: &Path,
        frame_group_count: u64,
    ) -> Result<WriteSummary, SamplePrepError> {
        let file = File::create(path).map_err(|source| SamplePrepError::CannotCreateFile {
            path: path.to_path_buf(),
            source,
        })?;
        let mut out = BufWriter::new(file);
        let io_err = |source| SamplePrepError::Io {
            path: path.to_path_buf(),
            source,
        };
        let summary = self.write_to(&mut out, frame_group_count).map_err(io_err)?;
        out.flush().map_err(io_err)?;
        log::info!(
            "wrote {} frame(s), {} byte(s) to {}",
            summary.frames,
            summary.bytes,
            path.display()
        );
        Ok(summary)
    }

    /// Writes `frame_group_count` frame groups to `out`.
    pub fn write_to<W: Write>(
        &mut self,
        out: &mut W,
        frame_group_count: u64,
    ) -> io::Result<WriteSummary> {
        let mut summary = WriteSummary::default();
        let mut frame_index = 0u64;

        for group in 0..frame_group_count {
            log::debug!("writing frame group {group} of {frame_group_count}");

            for &value in &self.diagnostics {
                self.frame.fill(value);
                out.write_all(&self.frame)?;
                summary.frames += 1;
            }

            for _ in 0..self.data_frames {
                self.builder.build_into(frame_index, &mut self.frame);
                if self.reorder {
                    lvds::reorder_frame(&mut self.frame);
                }
                out.write_all(&self.frame)?;
                frame_index += 1;
                summary.frames += 1;
            }

            summary.frame_groups += 1;
        }

        summary.bytes = summary.frames * self.frame.len() as u64;
        Ok(summary)
    }
}
