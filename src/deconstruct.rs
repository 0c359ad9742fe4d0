//! Expands each row's target code into flattened authoring-form columns.
//!
//! Rows move `Pending -> Fetching -> Flattened | Failed`. A failed row keeps
//! its input cells and gains an `Error` cell; it is never dropped, and it never
//! affects any other row.

use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::{
    common::sibling_output_path,
    constants::{DEFAULT_AUTHORING_BASE_URL, ERROR_COLUMN, PROCESSED_SUFFIX, TARGET_CODE_COLUMN},
    error::{LookupError, Result},
    flatten::{FlattenedFields, flatten},
    schema::SchemaAccumulator,
    sink::LogSink,
    table::{Record, Table, read_tsv, write_tsv},
    transport::{HttpRequest, Transport},
};

#[derive(Debug, Clone)]
pub struct DeconstructConfig {
    pub authoring_base_url: String,
    pub target_column: String,
    /// Defaults to `<stem>_processed.tsv` next to the input.
    pub output_path: Option<PathBuf>,
}

impl Default for DeconstructConfig {
    fn default() -> Self {
        Self {
            authoring_base_url: DEFAULT_AUTHORING_BASE_URL.to_string(),
            target_column: TARGET_CODE_COLUMN.to_string(),
            output_path: None,
        }
    }
}

#[derive(Debug)]
pub enum RowOutcome {
    Flattened(FlattenedFields),
    Failed(LookupError),
}

#[derive(Debug)]
pub struct Deconstructed {
    pub columns: Vec<String>,
    pub records: Vec<Record>,
    pub flattened: usize,
    pub failed: usize,
}

#[derive(Debug, Clone)]
pub struct DeconstructSummary {
    pub output_path: PathBuf,
    pub rows: usize,
    pub flattened: usize,
    pub failed: usize,
    pub skipped_lines: usize,
    pub columns: Vec<String>,
}

pub fn authoring_form_request(base_url: &str, code: &str) -> HttpRequest {
    HttpRequest::get(format!(
        "{}/{}/authoring-form",
        base_url.trim_end_matches('/'),
        code
    ))
}

/// Looks up one code and flattens the response. Exactly one request, no retry.
pub async fn fetch_fields<T: Transport>(
    transport: &T,
    base_url: &str,
    code: &str,
) -> Result<FlattenedFields, LookupError> {
    let request = authoring_form_request(base_url, code);
    let response = transport.get(&request).await?;
    if !response.is_success() {
        return Err(LookupError::Status {
            status: response.status,
            url: request.url,
            body: response.body,
        });
    }
    let graph: Value = serde_json::from_str(&response.body)?;
    flatten(&graph)
}

pub async fn deconstruct_record<T: Transport>(
    transport: &T,
    config: &DeconstructConfig,
    record: &Record,
) -> RowOutcome {
    let code = record
        .get(&config.target_column)
        .map(str::trim)
        .filter(|code| !code.is_empty());
    let Some(code) = code else {
        return RowOutcome::Failed(LookupError::MissingTargetCode);
    };
    match fetch_fields(transport, &config.authoring_base_url, code).await {
        Ok(fields) => RowOutcome::Flattened(fields),
        Err(err) => RowOutcome::Failed(err),
    }
}

pub async fn deconstruct_table<T: Transport, S: LogSink>(
    table: Table,
    transport: &T,
    config: &DeconstructConfig,
    sink: &mut S,
) -> Deconstructed {
    let mut schema = SchemaAccumulator::new(table.headers);
    let mut records = Vec::with_capacity(table.records.len());
    let mut flattened = 0usize;
    let mut failed = 0usize;

    sink.start(table.records.len());
    for mut record in table.records {
        let code = record
            .get(&config.target_column)
            .unwrap_or("<missing>")
            .to_string();
        sink.emit(&format!("Fetching data for code: {code}"));

        match deconstruct_record(transport, config, &record).await {
            RowOutcome::Flattened(fields) => {
                schema.observe(fields.keys());
                record.merge(fields);
                flattened += 1;
                sink.emit(&format!("Data formatted successfully for code: {code}"));
            }
            RowOutcome::Failed(err) => {
                let message = err.to_string();
                schema.observe([ERROR_COLUMN]);
                record.set(ERROR_COLUMN, message.as_str());
                failed += 1;
                sink.emit(&format!("Failed to fetch data for code: {code}: {message}"));
            }
        }
        records.push(record);
        sink.row_done();
    }

    Deconstructed {
        columns: schema.into_columns(),
        records,
        flattened,
        failed,
    }
}

/// Reads `input_path`, deconstructs every row and writes the processed table.
/// The output header is only known once every row has been seen, so rows are
/// buffered until end of file.
pub async fn deconstruct_file<T: Transport, S: LogSink>(
    input_path: &Path,
    transport: &T,
    config: &DeconstructConfig,
    sink: &mut S,
) -> Result<DeconstructSummary> {
    let table = read_tsv(input_path)?;
    sink.emit(&format!("Loaded file: {}", input_path.display()));

    let skipped_lines = table.skipped_lines;
    let rows = table.records.len();
    let output_path = config
        .output_path
        .clone()
        .unwrap_or_else(|| sibling_output_path(input_path, PROCESSED_SUFFIX));

    let result = deconstruct_table(table, transport, config, sink).await;
    write_tsv(&output_path, &result.columns, &result.records)?;

    sink.emit(&format!(
        "Process complete. Processed file saved as {}",
        output_path.display()
    ));
    sink.finish();

    Ok(DeconstructSummary {
        output_path,
        rows,
        flattened: result.flattened,
        failed: result.failed,
        skipped_lines,
        columns: result.columns,
    })
}
