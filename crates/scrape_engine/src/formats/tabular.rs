use std::collections::HashSet;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use scrape_core::{guess_meta, RawDocument};
use serde_json::{Map, Number, Value};

use super::{Format, FormatOptions};
use crate::error::HandlerError;

/// Header-row delimited text. Metadata is not stored in the file and is
/// inferred from the filename on read.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct CsvFormat;

impl Format for CsvFormat {
    fn read_raw(&self, path: &Path, options: &FormatOptions) -> Result<RawDocument, HandlerError> {
        let context = path.display().to_string();
        let csv_err = |e: csv::Error| match e.into_kind() {
            csv::ErrorKind::Io(source) => HandlerError::Io {
                path: path.to_path_buf(),
                source,
            },
            kind => HandlerError::validation(&context, format!("{kind:?}")),
        };

        let mut reader = ReaderBuilder::new()
            .delimiter(options.csv_delimiter)
            .flexible(true)
            .from_path(path)
            .map_err(csv_err)?;
        let headers = unique_headers(reader.headers().map_err(csv_err)?);

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(csv_err)?;
            if record.len() > headers.len() {
                let line = record.position().map_or(0, |pos| pos.line());
                return Err(HandlerError::validation(
                    &context,
                    format!(
                        "line {line} has {} fields, header has {}",
                        record.len(),
                        headers.len()
                    ),
                ));
            }
            // Short rows leave the trailing columns null.
            let row: Map<String, Value> = headers
                .iter()
                .enumerate()
                .map(|(idx, key)| {
                    let cell = record.get(idx).map_or(Value::Null, infer_scalar);
                    (key.clone(), cell)
                })
                .collect();
            rows.push(Value::Object(row));
        }

        let meta = guess_meta(path, &options.meta_overrides, &options.name_sep);
        Ok(meta.into_raw().with_data(Some(Value::Array(rows))))
    }

    fn encode(
        &self,
        raw: &RawDocument,
        explicit: Option<&Value>,
        options: &FormatOptions,
    ) -> Result<Vec<u8>, HandlerError> {
        const CONTEXT: &str = "csv encoding";
        let records = match explicit.or_else(|| raw.data()) {
            None => return Ok(Vec::new()),
            Some(Value::Array(items)) => items,
            Some(_) => {
                return Err(HandlerError::validation(
                    CONTEXT,
                    "tabular data must be an array of records",
                ))
            }
        };

        let mut rows = Vec::with_capacity(records.len());
        for (idx, record) in records.iter().enumerate() {
            match record {
                Value::Object(row) => rows.push(row),
                _ => {
                    return Err(HandlerError::validation(
                        CONTEXT,
                        format!("record {idx} is not an object"),
                    ))
                }
            }
        }
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        // Union of keys in first-seen order.
        let mut headers: Vec<&str> = Vec::new();
        for row in &rows {
            for key in row.keys() {
                if !headers.contains(&key.as_str()) {
                    headers.push(key);
                }
            }
        }

        let mut writer = WriterBuilder::new()
            .delimiter(options.csv_delimiter)
            .from_writer(Vec::new());
        let write_err = |e: csv::Error| HandlerError::validation(CONTEXT, e);
        writer.write_record(&headers).map_err(write_err)?;
        for row in &rows {
            let cells = headers.iter().map(|key| cell_text(row.get(*key)));
            writer.write_record(cells).map_err(write_err)?;
        }
        writer
            .into_inner()
            .map_err(|e| HandlerError::validation(CONTEXT, e.error()))
    }
}

/// Header names with repeats renamed `name.1`, `name.2`, ... so every column
/// gets its own key.
fn unique_headers(headers: &StringRecord) -> Vec<String> {
    let mut taken: HashSet<String> = headers.iter().map(str::to_string).collect();
    let mut seen = HashSet::new();
    headers
        .iter()
        .map(|name| {
            if seen.insert(name) {
                return name.to_string();
            }
            let renamed = (1..)
                .map(|n| format!("{name}.{n}"))
                .find(|candidate| !taken.contains(candidate))
                .unwrap_or_else(|| name.to_string());
            taken.insert(renamed.clone());
            renamed
        })
        .collect()
}

/// Best-effort typing of a cell: empty -> null, then integer, float, bool, string.
fn infer_scalar(cell: &str) -> Value {
    if cell.is_empty() {
        return Value::Null;
    }
    if let Ok(int) = cell.parse::<i64>() {
        return Value::Number(int.into());
    }
    if let Some(float) = cell.parse::<f64>().ok().and_then(Number::from_f64) {
        return Value::Number(float);
    }
    match cell {
        "true" | "True" => Value::Bool(true),
        "false" | "False" => Value::Bool(false),
        _ => Value::String(cell.to_string()),
    }
}

/// Non-primitive values are stringified as JSON.
fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
