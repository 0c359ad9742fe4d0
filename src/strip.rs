//! Offline pass that adds a normalized copy of each expression to a TSV.
//!
//! No network access; the output is the input plus one column.

use std::path::{Path, PathBuf};

use crate::{
    common::sibling_output_path,
    constants::{EXPRESSION_COLUMN, STRIPPED_EXPRESSION_COLUMN, STRIPPED_SUFFIX},
    error::Result,
    normalize::{NormalizeMode, normalize},
    schema::SchemaAccumulator,
    sink::LogSink,
    table::{read_tsv, write_tsv},
};

#[derive(Debug, Clone)]
pub struct StripConfig {
    pub mode: NormalizeMode,
    /// Defaults to `<stem>_stripped.tsv` next to the input.
    pub output_path: Option<PathBuf>,
}

impl Default for StripConfig {
    fn default() -> Self {
        Self {
            mode: NormalizeMode::Strict,
            output_path: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StripSummary {
    pub output_path: PathBuf,
    pub rows: usize,
    pub skipped_lines: usize,
}

/// Adds a normalized copy of the expression column. Nothing is written when
/// the expression column is missing.
pub fn strip_file<S: LogSink>(
    input_path: &Path,
    config: &StripConfig,
    sink: &mut S,
) -> Result<StripSummary> {
    let table = read_tsv(input_path)?;
    table.require_column(EXPRESSION_COLUMN, input_path)?;

    let mut schema = SchemaAccumulator::new(table.headers);
    schema.observe([STRIPPED_EXPRESSION_COLUMN]);

    let mut records = table.records;
    for record in &mut records {
        let stripped = normalize(record.get(EXPRESSION_COLUMN).unwrap_or(""), config.mode);
        record.set(STRIPPED_EXPRESSION_COLUMN, stripped);
    }

    let output_path = config
        .output_path
        .clone()
        .unwrap_or_else(|| sibling_output_path(input_path, STRIPPED_SUFFIX));
    write_tsv(&output_path, &schema.into_columns(), &records)?;
    sink.emit(&format!("Stripped file saved as {}", output_path.display()));

    Ok(StripSummary {
        output_path,
        rows: records.len(),
        skipped_lines: table.skipped_lines,
    })
}
