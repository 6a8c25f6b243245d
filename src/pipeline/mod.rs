// Table build pipeline: load -> merge -> shape -> emit

pub mod emitter;
pub mod loader;
pub mod merger;
pub mod shaper;

use std::path::PathBuf;
use tracing::{info, instrument};

use crate::config::Config;
use crate::error::Result;

pub use shaper::Table;

/// Result of a complete pipeline run
#[derive(Debug)]
pub struct PipelineResult {
    pub rating_files: usize,
    pub total_entries: usize,
    pub merged_entries: usize,
    pub skipped_entries: usize,
    pub rows: usize,
    pub columns: usize,
    pub warnings: Vec<String>,
    pub output_file: PathBuf,
}

impl PipelineResult {
    /// One-line summary printed after a successful run
    pub fn summary(&self) -> String {
        format!(
            "Wrote {} ({} rows, {} columns)",
            self.output_file.display(),
            self.rows,
            self.columns
        )
    }
}

/// Builds the table in memory without writing anything.
pub fn build_table(config: &Config) -> Result<(Table, PipelineResult)> {
    let loaded = loader::load(config)?;
    let merged = merger::merge(&loaded.metadata.sources, &loaded.rating_files);
    info!(
        rows = merged.rows.len(),
        entries = merged.entries_total,
        skipped = merged.entries_skipped,
        "Merged ratings"
    );

    let table = shaper::shape(&loaded.metadata, &merged);

    let mut warnings = loaded.warnings;
    warnings.extend(merged.warnings);

    let result = PipelineResult {
        rating_files: loaded.rating_files.len(),
        total_entries: merged.entries_total,
        merged_entries: merged.entries_merged,
        skipped_entries: merged.entries_skipped,
        rows: table.rows.len(),
        columns: table.columns.len(),
        warnings,
        output_file: config.output.clone(),
    };
    Ok((table, result))
}

/// Runs the whole pipeline and writes the page. Any error leaves the output
/// file untouched.
#[instrument(skip(config), fields(root = %config.root.display()))]
pub fn run(config: &Config) -> Result<PipelineResult> {
    let (table, result) = build_table(config)?;
    emitter::emit(&config.template, &config.output, &config.marker, &config.global_name, &table)?;
    info!(rows = result.rows, columns = result.columns, warnings = result.warnings.len(), "Pipeline finished");
    Ok(result)
}
