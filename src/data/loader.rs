use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{
    Array, AsArray, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array, StringArray,
};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use super::derive::{append_indicators, SchemaReport};
use super::model::{is_numeric_column, SchoolDataset, SchoolRecord, Value};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// A cleaned dataset together with its negotiated schema: which declared
/// numeric columns the source carried and which indicators are computable.
#[derive(Debug, Clone)]
pub struct LoadedTable {
    pub dataset: SchoolDataset,
    pub schema: SchemaReport,
}

/// Load a school table from a file. Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with column names, one school per row
/// * `.parquet` – scalar columns (used for the multi-year trend extracts)
///
/// Cleaning rules: declared numeric columns coerce to float with
/// null-on-failure; key columns are trimmed, case preserved. Derived
/// indicator columns are appended before the table is returned.
pub fn load_file(path: &Path) -> Result<LoadedTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => load_csv(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

fn finish(records: Vec<SchoolRecord>, coercion_failures: &BTreeMap<String, usize>) -> LoadedTable {
    for (col, n) in coercion_failures {
        log::warn!("column {col}: {n} cells failed numeric coercion, stored as null");
    }
    let cleaned = SchoolDataset::from_records(records);
    let schema = SchemaReport::for_dataset(&cleaned);
    let dataset = append_indicators(cleaned);
    LoadedTable { dataset, schema }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<LoadedTable> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("opening CSV {}", path.display()))?;
    load_csv_reader(file)
}

/// CSV layout: header row with column names, cells free text. Exposed over
/// any reader so in-memory sources load the same way files do.
pub fn load_csv_reader<R: Read>(input: R) -> Result<LoadedTable> {
    let mut reader = csv::Reader::from_reader(input);
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut coercion_failures: BTreeMap<String, usize> = BTreeMap::new();
    let mut records = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let row = result.with_context(|| format!("CSV row {row_no}"))?;
        let mut rec = SchoolRecord::new();
        for (col_idx, raw) in row.iter().enumerate() {
            let Some(col) = headers.get(col_idx) else {
                continue;
            };
            let value = clean_cell(col, raw, &mut coercion_failures);
            rec.set(col, value);
        }
        records.push(rec);
    }

    Ok(finish(records, &coercion_failures))
}

/// Clean a single raw cell according to the column's declared type.
fn clean_cell(column: &str, raw: &str, failures: &mut BTreeMap<String, usize>) -> Value {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    if is_numeric_column(column) {
        match trimmed.parse::<f64>() {
            Ok(v) => Value::Float(v),
            Err(_) => {
                *failures.entry(column.to_string()).or_insert(0) += 1;
                Value::Null
            }
        }
    } else {
        guess_value(trimmed)
    }
}

/// Type inference for non-declared columns: integer, float, then text.
fn guess_value(s: &str) -> Value {
    if let Ok(i) = s.parse::<i64>() {
        return Value::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return Value::Float(f);
    }
    Value::Text(s.to_string())
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file of scalar columns (strings, ints, floats, bools).
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<LoadedTable> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("opening parquet file {}", path.display()))?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut coercion_failures: BTreeMap<String, usize> = BTreeMap::new();
    let mut records = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();
        let columns: Vec<(usize, String)> = schema
            .fields()
            .iter()
            .enumerate()
            .map(|(i, f)| (i, f.name().clone()))
            .collect();

        for row in 0..batch.num_rows() {
            let mut rec = SchoolRecord::new();
            for (col_idx, col_name) in &columns {
                let col_array = batch.column(*col_idx);
                let mut value = extract_value(col_array, row);
                if let Value::Text(s) = &value {
                    value = guess_value(s.trim());
                }
                if is_numeric_column(col_name) && !value.is_null() && value.as_f64().is_none() {
                    *coercion_failures.entry(col_name.clone()).or_insert(0) += 1;
                    value = Value::Null;
                }
                rec.set(col_name, value);
            }
            records.push(rec);
        }
    }

    Ok(finish(records, &coercion_failures))
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_value(col: &Arc<dyn Array>, row: usize) -> Value {
    if col.is_null(row) {
        return Value::Null;
    }
    match col.data_type() {
        DataType::Utf8 | DataType::LargeUtf8 => {
            if let Some(s) = col.as_any().downcast_ref::<StringArray>() {
                Value::Text(s.value(row).to_string())
            } else {
                // LargeStringArray
                let s = col.as_string::<i64>();
                Value::Text(s.value(row).to_string())
            }
        }
        DataType::Int32 => {
            let arr = col.as_any().downcast_ref::<Int32Array>().unwrap();
            Value::Integer(arr.value(row) as i64)
        }
        DataType::Int64 => {
            let arr = col.as_any().downcast_ref::<Int64Array>().unwrap();
            Value::Integer(arr.value(row))
        }
        DataType::Float32 => {
            let arr = col.as_any().downcast_ref::<Float32Array>().unwrap();
            Value::Float(arr.value(row) as f64)
        }
        DataType::Float64 => {
            let arr = col.as_any().downcast_ref::<Float64Array>().unwrap();
            Value::Float(arr.value(row))
        }
        DataType::Boolean => {
            let arr = col.as_any().downcast_ref::<BooleanArray>().unwrap();
            Value::Integer(arr.value(row) as i64)
        }
        _ => Value::Null,
    }
}
