//! Reads labeled messages from the SQLite message store.
//!
//! The store is produced by an upstream ETL step. The loader opens it
//! read-only, checks the requested table and columns against the live
//! schema, and reads every row in one pass:
//!
//! ```text
//! messages: id | message | original | genre | related | request | ...
//!                  ↓        (metadata, skipped)   ↓─── label columns ───↓
//!              messages                        LabelMatrix
//! ```

use std::path::Path;

use log::{debug, info};
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use serde::{Deserialize, Serialize};

use crate::dataset::MessageDataset;
use crate::dataset::labels::LabelMatrix;
use crate::error::{Result, TriageError};

/// Which columns of the message table hold category labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelSelection {
    /// Every column after the first `n`, in table order.
    Offset(usize),
    /// Exactly these columns, in this order.
    Named(Vec<String>),
}

impl Default for LabelSelection {
    fn default() -> Self {
        // id, message, original, genre
        LabelSelection::Offset(4)
    }
}

/// Where to find messages and labels inside the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Table holding one message per row.
    pub table: String,
    /// Column holding the message text.
    pub text_column: String,
    /// Columns holding the category labels.
    pub labels: LabelSelection,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            table: "messages".to_string(),
            text_column: "message".to_string(),
            labels: LabelSelection::default(),
        }
    }
}

/// Quote an SQL identifier.
fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// List the columns of `table`, in declaration order.
fn table_columns(conn: &Connection, table: &str) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", quote_identifier(table)))?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(columns)
}

/// Resolve the label column names against the table schema.
fn resolve_label_columns(
    columns: &[String],
    config: &LoaderConfig,
) -> Result<Vec<String>> {
    let labels = match &config.labels {
        LabelSelection::Offset(offset) => columns.iter().skip(*offset).cloned().collect(),
        LabelSelection::Named(names) => {
            let missing: Vec<&str> = names
                .iter()
                .filter(|name| !columns.contains(name))
                .map(String::as_str)
                .collect();
            if !missing.is_empty() {
                return Err(TriageError::schema(format!(
                    "table '{}' has no label column(s) {}; available columns: {}",
                    config.table,
                    missing.join(", "),
                    columns.join(", ")
                )));
            }
            names.clone()
        }
    };

    if labels.is_empty() {
        return Err(TriageError::schema(format!(
            "no label columns selected from table '{}' ({} columns, selection {:?})",
            config.table,
            columns.len(),
            config.labels
        )));
    }
    Ok(labels)
}

/// Convert one label cell to a class value.
fn label_value(value: ValueRef<'_>, row: usize, column: &str) -> Result<u8> {
    let invalid = |found: String| {
        TriageError::data(format!(
            "row {row}, column '{column}': expected a non-negative integer label, found {found}"
        ))
    };

    match value {
        ValueRef::Integer(v) => u8::try_from(v).map_err(|_| invalid(v.to_string())),
        ValueRef::Real(v) if v.fract() == 0.0 && (0.0..=f64::from(u8::MAX)).contains(&v) => {
            Ok(v as u8)
        }
        ValueRef::Real(v) => Err(invalid(v.to_string())),
        ValueRef::Null => Err(invalid("NULL".to_string())),
        ValueRef::Text(text) => Err(invalid(format!("text {:?}", String::from_utf8_lossy(text)))),
        ValueRef::Blob(_) => Err(invalid("a blob".to_string())),
    }
}

/// Load messages and their category labels from the store at `path`.
///
/// Fails if the store cannot be opened, the table or a requested column is
/// missing, a message is NULL, or a label cell is not a small non-negative
/// integer.
pub fn load_messages<P: AsRef<Path>>(path: P, config: &LoaderConfig) -> Result<MessageDataset> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(TriageError::not_found(format!(
            "message store {}",
            path.display()
        )));
    }

    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;

    let columns = table_columns(&conn, &config.table)?;
    if columns.is_empty() {
        return Err(TriageError::schema(format!(
            "table '{}' not found in {}",
            config.table,
            path.display()
        )));
    }
    if !columns.contains(&config.text_column) {
        return Err(TriageError::schema(format!(
            "table '{}' has no text column '{}'",
            config.table, config.text_column
        )));
    }

    let label_names = resolve_label_columns(&columns, config)?;
    debug!("Label columns: {}", label_names.join(", "));

    let selected: Vec<String> = std::iter::once(&config.text_column)
        .chain(label_names.iter())
        .map(|name| quote_identifier(name))
        .collect();
    let sql = format!(
        "SELECT {} FROM {}",
        selected.join(", "),
        quote_identifier(&config.table)
    );

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query([])?;

    let mut messages = Vec::new();
    let mut label_rows = Vec::new();
    while let Some(row) = rows.next()? {
        let index = messages.len();
        let text: Option<String> = row.get(0)?;
        let text = text.ok_or_else(|| {
            TriageError::data(format!(
                "row {index}: column '{}' is NULL",
                config.text_column
            ))
        })?;

        let mut labels = Vec::with_capacity(label_names.len());
        for (j, name) in label_names.iter().enumerate() {
            labels.push(label_value(row.get_ref(j + 1)?, index, name)?);
        }

        messages.push(text);
        label_rows.push(labels);
    }

    let labels = LabelMatrix::from_rows(&label_rows, label_names.len())?;

    info!(
        "Loaded {} messages with {} categories from {}",
        messages.len(),
        label_names.len(),
        path.display()
    );

    MessageDataset::new(messages, label_names, labels)
}
