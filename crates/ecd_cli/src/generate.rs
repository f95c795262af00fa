//! Sample file generation.
//!
//! Loads the configuration and both definition files, prints the capacity
//! statistics, and writes the sample file if everything fits. Nothing is
//! written when any check fails.

use std::error::Error;
use std::path::Path;

use ecd_frames::{
    verify_distribution_is_valid, CapacityReport, DistributionList, FragmentTable, OutputWriter,
    SamplePrepError,
};

use crate::{GlobalArgs, ReportFormat};

/// Runs a generation. Returns exit code 0 on success.
pub fn run(config_path: &Path, global: &GlobalArgs) -> Result<i32, Box<dyn Error>> {
    let config = ecd_config::load_config(config_path)?;
    log::info!(
        "{}: {} cells per frame, {} data frame(s) per group, contig buffer {}",
        config_path.display(),
        config.cells_per_frame,
        config.data_frames,
        config.contig_size
    );

    let fragments = FragmentTable::load(&config.fragment_file)?;
    let distribution =
        DistributionList::load(&config.distribution_file, &fragments, config.cells_per_frame)?;

    // The statistics are shown even when the frames don't fit.
    let report = match verify_distribution_is_valid(&config, &distribution, global.reorder) {
        Ok(report) => report,
        Err(err) => {
            if let SamplePrepError::CapacityExceeded { report } = &err {
                show_report(report, global)?;
            }
            return Err(err.into());
        }
    };
    show_report(&report, global)?;

    let mut writer = OutputWriter::new(&config, &distribution, global.reorder);
    let summary = writer.write_file(&config.output_file, report.frame_group_count)?;

    if !global.quiet {
        eprintln!(
            "   Generated {} ({} frame group(s), {} frame(s){})",
            config.output_file.display(),
            summary.frame_groups,
            summary.frames,
            if global.reorder { ", LVDS order" } else { "" }
        );
    }
    Ok(0)
}

fn show_report(report: &CapacityReport, global: &GlobalArgs) -> serde_json::Result<()> {
    if !global.quiet {
        println!("{}", render_report(report, global.format)?);
    }
    Ok(())
}

/// Renders the capacity statistics in the requested format.
fn render_report(report: &CapacityReport, format: ReportFormat) -> serde_json::Result<String> {
    match format {
        ReportFormat::Text => Ok(report.to_string().trim_end().to_string()),
        ReportFormat::Json => serde_json::to_string_pretty(report),
    }
}
