//! Tab-separated tables as ordered key/value rows.
//!
//! Rows stay as [`Record`]s (ordered pairs) rather than fixed structs because
//! their column set grows while a file is processed.

use csv::{QuoteStyle, ReaderBuilder, WriterBuilder};
use std::{borrow::Cow, fs, path::Path};

use crate::common::temp_path_for;
use crate::error::{PipelineError, Result};

/// One row: column name to cell value, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: Vec<(String, String)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Overwrites an existing cell in place, otherwise appends.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((key, value)),
        }
    }

    pub fn merge<I, K, V>(&mut self, pairs: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (key, value) in pairs {
            self.set(key, value);
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Record {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut record = Record::new();
        record.merge(iter);
        record
    }
}

#[derive(Debug, Clone)]
pub struct Table {
    pub headers: Vec<String>,
    pub records: Vec<Record>,
    /// Lines dropped by the permissive reader.
    pub skipped_lines: usize,
}

impl Table {
    pub fn has_column(&self, column: &str) -> bool {
        self.headers.iter().any(|h| h == column)
    }

    pub fn require_column(&self, column: &str, path: &Path) -> Result<()> {
        if self.has_column(column) {
            Ok(())
        } else {
            Err(PipelineError::MissingColumn {
                column: column.to_string(),
                path: path.to_path_buf(),
            })
        }
    }
}

/// Reads a UTF-8 TSV whose first line is the header.
///
/// Lines that fail to decode or carry more cells than the header are skipped
/// and counted. Short lines are padded with empty cells. Quotes carry no
/// meaning: every line is one row and a `"` is kept as part of its cell.
pub fn read_tsv(path: &Path) -> Result<Table> {
    let csv_err = |source| PipelineError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .flexible(true)
        .quoting(false)
        .from_path(path)
        .map_err(csv_err)?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_err)?
        .iter()
        .map(str::to_string)
        .collect();
    if headers.is_empty() {
        return Err(PipelineError::EmptyInput {
            path: path.to_path_buf(),
        });
    }

    let mut records = Vec::new();
    let mut skipped_lines = 0usize;
    for result in reader.records() {
        let row = match result {
            Ok(row) => row,
            Err(err) if err.is_io_error() => return Err(csv_err(err)),
            Err(err) => {
                tracing::warn!("Skipping unreadable line in {}: {err}", path.display());
                skipped_lines += 1;
                continue;
            }
        };

        if row.len() > headers.len() {
            tracing::warn!(
                "Skipping line {} in {}: expected {} fields, saw {}",
                row.position().map(|p| p.line()).unwrap_or_default(),
                path.display(),
                headers.len(),
                row.len()
            );
            skipped_lines += 1;
            continue;
        }

        let record: Record = headers
            .iter()
            .enumerate()
            .map(|(idx, header)| (header.as_str(), row.get(idx).unwrap_or("")))
            .collect();
        records.push(record);
    }

    Ok(Table {
        headers,
        records,
        skipped_lines,
    })
}

/// Writes `records` against `columns` through a temp file renamed into place.
/// Cells absent from a record are written empty.
///
/// Output is plain TSV like the input: nothing is quoted, and tabs or line
/// breaks inside a cell are written as spaces. The temp file is removed if
/// any step fails.
pub fn write_tsv(path: &Path, columns: &[String], records: &[Record]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| PipelineError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let tmp_path = temp_path_for(path);
    let written = write_rows(&tmp_path, columns, records).and_then(|()| {
        fs::rename(&tmp_path, path).map_err(|source| PipelineError::Io {
            path: path.to_path_buf(),
            source,
        })
    });
    if written.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    written
}

fn write_rows(tmp_path: &Path, columns: &[String], records: &[Record]) -> Result<()> {
    let csv_err = |source| PipelineError::Csv {
        path: tmp_path.to_path_buf(),
        source,
    };

    let mut writer = WriterBuilder::new()
        .delimiter(b'\t')
        .quote_style(QuoteStyle::Never)
        .from_path(tmp_path)
        .map_err(csv_err)?;

    writer
        .write_record(columns.iter().map(|c| plain_cell(c)))
        .map_err(csv_err)?;
    for record in records {
        writer
            .write_record(columns.iter().map(|c| plain_cell(record.get(c).unwrap_or(""))))
            .map_err(csv_err)?;
    }
    writer.flush().map_err(|source| PipelineError::Io {
        path: tmp_path.to_path_buf(),
        source,
    })
}

fn plain_cell(value: &str) -> Cow<'_, [u8]> {
    if value.contains(['\t', '\n', '\r']) {
        Cow::Owned(value.replace(['\t', '\n', '\r'], " ").into_bytes())
    } else {
        Cow::Borrowed(value.as_bytes())
    }
}
