//! `--trace`: print one cell of every frame of the written sample file.

use std::error::Error;
use std::path::Path;

use ecd_frames::{trace_file, CellTrace};

use crate::{GlobalArgs, ReportFormat};

/// Traces `cell` through the configured output file and prints the values.
pub fn run(config_path: &Path, cell: u64, global: &GlobalArgs) -> Result<i32, Box<dyn Error>> {
    let config = ecd_config::load_config(config_path)?;
    let trace = trace_file(
        &config.output_file,
        config.cells_per_frame,
        cell,
        global.reorder,
    )?;
    if trace.values.is_empty() {
        log::warn!("{} holds no complete frame", config.output_file.display());
    }
    println!("{}", render_trace(&trace, global.format)?);
    Ok(0)
}

fn render_trace(trace: &CellTrace, format: ReportFormat) -> serde_json::Result<String> {
    match format {
        ReportFormat::Text => Ok(trace.to_string()),
        ReportFormat::Json => serde_json::to_string(trace),
    }
}
