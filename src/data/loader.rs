use std::path::Path;

use arrow::util::display::{ArrayFormatter, FormatOptions};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use crate::error::{Error, Result};

use super::model::Dataset;
use super::parser;

const LOG_TARGET: &str = "election_insight::loader";

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv` / `.txt` – delimited text split on `delimiter`
/// * `.tsv`          – delimited text split on tabs
/// * `.json`         – `[{ "col": value, ... }, ...]`
/// * `.parquet`      – any flat schema; every cell is rendered as text
pub fn load_file(path: &Path, delimiter: char) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "csv" | "txt" => load_delimited(path, delimiter),
        "tsv" => load_delimited(path, '\t'),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => Err(Error::unsupported_format(format!(".{other}"))),
    }?;

    log::info!(
        target: LOG_TARGET,
        "loaded {}: {} rows, {} columns",
        path.display(),
        dataset.len(),
        dataset.column_count()
    );
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// Delimited text loader
// ---------------------------------------------------------------------------

fn load_delimited(path: &Path, delimiter: char) -> Result<Dataset> {
    let text = std::fs::read_to_string(path).map_err(|e| Error::io(e, path))?;
    parser::parse(&text, delimiter)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented):
///
/// ```json
/// [
///   { "nombre": "Ana", "edad": 25 },
///   { "nombre": "Luis", "ciudad": null }
/// ]
/// ```
///
/// Headers are the union of keys in first-seen order. Records missing a key
/// produce an empty cell so every row lines up with the headers.
fn load_json(path: &Path) -> Result<Dataset> {
    let text = std::fs::read_to_string(path).map_err(|e| Error::io(e, path))?;
    let root: JsonValue = serde_json::from_str(&text)?;

    let records = root
        .as_array()
        .ok_or_else(|| Error::parse("expected a top-level JSON array"))?;

    let mut headers: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .ok_or_else(|| Error::parse(format!("record {i} is not a JSON object")))?;
        for key in obj.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }

    if headers.is_empty() {
        return Err(Error::parse("JSON input has no fields"));
    }

    let rows = records
        .iter()
        .filter_map(JsonValue::as_object)
        .map(|obj| {
            headers
                .iter()
                .map(|h| obj.get(h).map(json_to_cell).unwrap_or_default())
                .collect()
        })
        .collect();

    Ok(Dataset::new(headers, rows, ','))
}

fn json_to_cell(val: &JsonValue) -> String {
    match val {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file, rendering each value with Arrow's display formatter.
/// Null values become empty cells.
fn load_parquet(path: &Path) -> Result<Dataset> {
    let file = std::fs::File::open(path).map_err(|e| Error::io(e, path))?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build()?;

    let options = FormatOptions::default();
    let mut rows = Vec::new();

    for batch_result in reader {
        let batch = batch_result?;
        let formatters = batch
            .columns()
            .iter()
            .map(|col| ArrayFormatter::try_new(col.as_ref(), &options))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        for row in 0..batch.num_rows() {
            rows.push(
                formatters
                    .iter()
                    .map(|fmt| fmt.value(row).to_string())
                    .collect(),
            );
        }
    }

    Ok(Dataset::new(headers, rows, ','))
}
