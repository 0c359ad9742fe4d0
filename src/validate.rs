//! Expression validation against a FHIR `CodeSystem/$validate-code` endpoint.
//!
//! Each row is checked with a single request and classified on its own:
//!
//! - 200 with a `result` parameter whose `valueBoolean` is `true`: [`ValidationOutcome::Valid`]
//! - 200 otherwise: [`ValidationOutcome::Invalid`]
//! - any other status, a transport failure, or a non-JSON body: [`ValidationOutcome::ServerError`]
//!
//! Server errors count as invalid in the summary, so `valid + invalid == total`.

use serde::Deserialize;
use serde_json::Value;
use std::{
    fmt,
    path::{Path, PathBuf},
};

use crate::{
    common::sibling_output_path,
    constants::{
        DEFAULT_VALIDATE_URL, EXPRESSION_COLUMN, FHIR_JSON, SNOMED_CT_SYSTEM,
        STRIPPED_EXPRESSION_COLUMN, VALIDATED_SUFFIX, VALIDATION_RESULT_COLUMN,
    },
    error::{LookupError, Result},
    schema::SchemaAccumulator,
    sink::LogSink,
    table::{Table, read_tsv, write_tsv},
    transport::{HttpRequest, HttpResponse, Transport},
};

#[derive(Debug, Clone)]
pub struct ValidateConfig {
    pub validate_url: String,
    pub code_system: String,
    /// Column holding the expressions. `None` prefers the stripped column and
    /// falls back to the raw one.
    pub source_column: Option<String>,
    /// Defaults to `<stem>_validated.tsv` next to the input.
    pub output_path: Option<PathBuf>,
}

impl Default for ValidateConfig {
    fn default() -> Self {
        Self {
            validate_url: DEFAULT_VALIDATE_URL.to_string(),
            code_system: SNOMED_CT_SYSTEM.to_string(),
            source_column: None,
            output_path: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationOutcome {
    Valid,
    Invalid,
    ServerError,
}

impl ValidationOutcome {
    pub fn label(self) -> &'static str {
        match self {
            ValidationOutcome::Valid => "Valid",
            ValidationOutcome::Invalid => "Invalid",
            ValidationOutcome::ServerError => "Server Error",
        }
    }
}

impl fmt::Display for ValidationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub outcome: ValidationOutcome,
    /// The `result` flag as sent by the server, if any.
    pub result: Option<bool>,
    pub message: String,
}

impl Classification {
    fn server_error(message: impl Into<String>) -> Self {
        Self {
            outcome: ValidationOutcome::ServerError,
            result: None,
            message: message.into(),
        }
    }

    /// Log line for row `row` (1-based).
    pub fn row_message(&self, row: usize) -> String {
        match self.outcome {
            ValidationOutcome::Valid => format!("Row {row}: Expression is valid."),
            ValidationOutcome::Invalid => format!("Row {row}: Expression is not valid."),
            ValidationOutcome::ServerError => format!("Row {row}: Server error - {}", self.message),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationSummary {
    pub total: usize,
    pub valid: usize,
    pub invalid: usize,
}

impl ValidationSummary {
    pub fn record(&mut self, outcome: ValidationOutcome) {
        self.total += 1;
        match outcome {
            ValidationOutcome::Valid => self.valid += 1,
            ValidationOutcome::Invalid | ValidationOutcome::ServerError => self.invalid += 1,
        }
    }
}

impl fmt::Display for ValidationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Total expressions processed: {}\nValid expressions: {}\nInvalid expressions: {}",
            self.total, self.valid, self.invalid
        )
    }
}

#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub output_path: PathBuf,
    pub source_column: String,
    pub summary: ValidationSummary,
    pub skipped_lines: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupReport {
    pub status: u16,
    /// Pretty-printed when the body is JSON, verbatim otherwise.
    pub body: String,
}

/// The parts of a FHIR `Parameters` resource the classifier reads.
#[derive(Debug, Deserialize)]
struct ParametersResponse {
    #[serde(default)]
    parameter: Vec<Parameter>,
}

#[derive(Debug, Deserialize)]
struct Parameter {
    name: Option<String>,
    #[serde(rename = "valueBoolean")]
    value_boolean: Option<bool>,
}

impl ParametersResponse {
    // First parameter named `result`.
    fn result_flag(&self) -> Option<bool> {
        self.parameter
            .iter()
            .find(|param| param.name.as_deref() == Some("result"))?
            .value_boolean
    }
}

pub fn validate_code_request(config: &ValidateConfig, code: &str) -> HttpRequest {
    HttpRequest::get(config.validate_url.as_str())
        .query("url", &config.code_system)
        .query("code", code)
        .query("system", &config.code_system)
        .header("Accept", FHIR_JSON)
        .header("Content-Type", FHIR_JSON)
}

pub fn classify(response: &HttpResponse) -> Classification {
    if response.status != 200 {
        return Classification::server_error(response.body.as_str());
    }
    let body: Value = match serde_json::from_str(&response.body) {
        Ok(body) => body,
        Err(err) => return Classification::server_error(format!("invalid JSON in response: {err}")),
    };

    // JSON of another shape is still an answer, just not a positive one.
    let result = serde_json::from_value::<ParametersResponse>(body)
        .ok()
        .and_then(|params| params.result_flag());
    if result == Some(true) {
        Classification {
            outcome: ValidationOutcome::Valid,
            result,
            message: "Expression is valid.".to_string(),
        }
    } else {
        Classification {
            outcome: ValidationOutcome::Invalid,
            result,
            message: "Expression is not valid.".to_string(),
        }
    }
}

pub async fn check_expression<T: Transport>(
    transport: &T,
    config: &ValidateConfig,
    expression: &str,
) -> Classification {
    let request = validate_code_request(config, expression);
    match transport.get(&request).await {
        Ok(response) => classify(&response),
        Err(err) => Classification::server_error(err.to_string()),
    }
}

/// Picks the expression column, failing before any request is made if it is
/// absent.
pub fn resolve_source_column(table: &Table, config: &ValidateConfig, path: &Path) -> Result<String> {
    let column = match &config.source_column {
        Some(column) => column.as_str(),
        None if table.has_column(STRIPPED_EXPRESSION_COLUMN) => STRIPPED_EXPRESSION_COLUMN,
        None => EXPRESSION_COLUMN,
    };
    table.require_column(column, path)?;
    Ok(column.to_string())
}

pub async fn validate_table<T: Transport, S: LogSink>(
    table: &Table,
    source_column: &str,
    transport: &T,
    config: &ValidateConfig,
    sink: &mut S,
) -> (Vec<Classification>, ValidationSummary) {
    let mut summary = ValidationSummary::default();
    let mut results = Vec::with_capacity(table.records.len());

    sink.start(table.records.len());
    for (idx, record) in table.records.iter().enumerate() {
        let expression = record.get(source_column).unwrap_or("");
        let classification = check_expression(transport, config, expression).await;
        summary.record(classification.outcome);
        sink.emit(&classification.row_message(idx + 1));
        sink.row_done();
        results.push(classification);
    }
    (results, summary)
}

pub async fn validate_file<T: Transport, S: LogSink>(
    input_path: &Path,
    transport: &T,
    config: &ValidateConfig,
    sink: &mut S,
) -> Result<ValidationReport> {
    let table = read_tsv(input_path)?;
    let source_column = resolve_source_column(&table, config, input_path)?;
    sink.emit(&format!(
        "Validating column '{source_column}' of {}",
        input_path.display()
    ));

    let (results, summary) = validate_table(&table, &source_column, transport, config, sink).await;

    let mut schema = SchemaAccumulator::new(table.headers);
    schema.observe([VALIDATION_RESULT_COLUMN]);
    let mut records = table.records;
    for (record, classification) in records.iter_mut().zip(&results) {
        record.set(VALIDATION_RESULT_COLUMN, classification.outcome.label());
    }

    let output_path = config
        .output_path
        .clone()
        .unwrap_or_else(|| sibling_output_path(input_path, VALIDATED_SUFFIX));
    write_tsv(&output_path, &schema.into_columns(), &records)?;

    sink.emit(&summary.to_string());
    sink.emit(&format!("Validated file saved as {}", output_path.display()));
    sink.finish();

    Ok(ValidationReport {
        output_path,
        source_column,
        summary,
        skipped_lines: table.skipped_lines,
    })
}

/// Validates one ad-hoc code and returns the server's answer unclassified.
pub async fn lookup_code<T: Transport>(
    transport: &T,
    config: &ValidateConfig,
    code: &str,
) -> Result<LookupReport, LookupError> {
    let response = transport.get(&validate_code_request(config, code)).await?;
    let body = match serde_json::from_str::<Value>(&response.body) {
        Ok(json) => serde_json::to_string_pretty(&json)?,
        Err(_) => response.body,
    };
    Ok(LookupReport {
        status: response.status,
        body,
    })
}
