//! Reading one cell back out of a written sample file.

use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use serde::Serialize;

use crate::capacity::check_geometry;
use crate::error::SamplePrepError;
use crate::lvds;

/// The values of one cell across every complete frame of a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CellTrace {
    /// The requested 0-based cell number, in raw order.
    pub cell: u64,
    /// Byte index of the cell within a frame as stored in the file.
    pub index: usize,
    /// One value per complete frame, diagnostic frames included.
    pub values: Vec<u8>,
}

impl fmt::Display for CellTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for value in &self.values {
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "{value}")?;
            first = false;
        }
        Ok(())
    }
}

/// Returns the byte index within a stored frame of raw cell `cell`.
pub fn trace_index(
    cell: u64,
    cells_per_frame: u32,
    reorder: bool,
) -> Result<usize, SamplePrepError> {
    if cell >= u64::from(cells_per_frame) {
        return Err(SamplePrepError::InvalidTraceCell {
            cell,
            cells_per_frame,
        });
    }
    let cell = cell as usize;
    if !reorder {
        return Ok(cell);
    }
    check_geometry(cells_per_frame, reorder)?;
    Ok(lvds::lvds_cell_index(cell)?)
}

/// Reads `reader` frame by frame, collecting the byte at `index` of every
/// complete frame. A trailing partial frame is ignored.
///
/// Fails with [`io::ErrorKind::InvalidInput`] if `index` is not inside a frame.
pub fn read_cell<R: Read>(
    reader: &mut R,
    frame_len: usize,
    index: usize,
) -> io::Result<Vec<u8>> {
    if index >= frame_len {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("byte {index} is outside a frame of {frame_len} bytes"),
        ));
    }
    let mut frame = vec![0u8; frame_len];
    let mut values = Vec::new();
    while read_frame(reader, &mut frame)? {
        values.push(frame[index]);
    }
    Ok(values)
}

/// Fills `frame` completely, returning `false` at end of input.
fn read_frame<R: Read>(reader: &mut R, frame: &mut [u8]) -> io::Result<bool> {
    let mut filled = 0;
    while filled < frame.len() {
        match reader.read(&mut frame[filled..]) {
            Ok(0) => return Ok(false),
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(true)
}

/// Traces raw cell `cell` through every frame of the sample file at `path`.
///
/// With `reorder` set the file is assumed to hold LVDS-ordered frames and the
/// cell is located through the inverse translation.
pub fn trace_file(
    path: &Path,
    cells_per_frame: u32,
    cell: u64,
    reorder: bool,
) -> Result<CellTrace, SamplePrepError> {
    let index = trace_index(cell, cells_per_frame, reorder)?;
    let file = File::open(path).map_err(|source| SamplePrepError::CannotOpenFile {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = BufReader::new(file);
    let values = read_cell(&mut reader, cells_per_frame as usize, index).map_err(|source| {
        SamplePrepError::Io {
            path: path.to_path_buf(),
            source,
        }
    })?;
    log::debug!(
        "traced cell {cell} (stored at byte {index}) through {} frame(s) of {}",
        values.len(),
        path.display()
    );
    Ok(CellTrace {
        cell,
        index,
        values,
    })
}
