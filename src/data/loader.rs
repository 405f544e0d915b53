use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{
    Array, AsArray, BooleanArray, Date32Array, Float32Array, Float64Array, Int32Array,
    Int64Array, StringArray,
};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use serde_json::Value as JsonValue;

use super::model::{CellValue, Record, RecordStore};
use crate::error::{DashboardError, Notice};

/// Table read from SQLite sources unless the configuration says otherwise.
pub const DEFAULT_SQLITE_TABLE: &str = "jugadores";

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a statistics table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, one record per line
/// * `.json`    – `[{ "nombre": "...", "goles_total": 3, ... }, ...]`
/// * `.parquet` – flat scalar columns
/// * `.db` / `.sqlite` / `.sqlite3` – every row of `table`
///
/// A source that reads fine but holds no rows is still a load failure.
pub fn load_file(path: &Path, table: &str) -> Result<RecordStore, DashboardError> {
    read_file(path, table)
        .and_then(|store| {
            if store.is_empty() {
                bail!("source contains no records");
            }
            Ok(store)
        })
        .map_err(|source| DashboardError::SourceLoad {
            path: path.to_path_buf(),
            source,
        })
}

/// Like [`load_file`], but a failed load yields an empty store and the
/// failure as a notice, so every downstream view degrades to "no data".
pub fn load_or_empty(path: &Path, table: &str) -> (RecordStore, Option<Notice>) {
    match load_file(path, table) {
        Ok(store) => {
            log::info!(
                "Loaded {} records with columns {:?} from {}",
                store.len(),
                store.columns,
                path.display()
            );
            (store, None)
        }
        Err(e) => {
            log::error!("{e}");
            (RecordStore::default(), Some(e.to_notice()))
        }
    }
}

fn read_file(path: &Path, table: &str) -> Result<RecordStore> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        "db" | "sqlite" | "sqlite3" => load_sqlite(path, table),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, any number of columns.
/// Short rows are padded with nulls.
fn load_csv(path: &Path) -> Result<RecordStore> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        rows.push(record.iter().map(guess_cell_type).collect());
    }

    Ok(RecordStore::from_table(&headers, rows))
}

fn guess_cell_type(s: &str) -> CellValue {
    let s = s.trim();
    if s.is_empty() || s.eq_ignore_ascii_case("nan") {
        return CellValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return CellValue::Float(f);
    }
    if s == "true" || s == "false" {
        return CellValue::Bool(s == "true");
    }
    if looks_like_date(s) {
        return CellValue::Date(s.to_string());
    }
    CellValue::Text(s.to_string())
}

/// `YYYY-MM-DD`, optionally followed by a time part.
fn looks_like_date(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() >= 10
        && b[4] == b'-'
        && b[7] == b'-'
        && b[..4].iter().all(u8::is_ascii_digit)
        && b[5..7].iter().all(u8::is_ascii_digit)
        && b[8..10].iter().all(u8::is_ascii_digit)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "nombre": "Juan", "nombre_equipo": "Millonarios", "goles_total": 4 },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<RecordStore> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let rows = root
        .as_array()
        .context("Expected top-level JSON array")?;

    let mut records = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        let obj = row
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        let cells: BTreeMap<String, CellValue> = obj
            .iter()
            .map(|(key, val)| (key.clone(), json_to_cell(val)))
            .collect();
        records.push(Record::new(cells));
    }

    Ok(RecordStore::from_records(records))
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) if looks_like_date(s) => CellValue::Date(s.clone()),
        JsonValue::String(s) => CellValue::Text(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::Text(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with flat scalar columns (strings, ints, floats,
/// bools, dates), as written by `df.to_parquet()`.
fn load_parquet(path: &Path) -> Result<RecordStore> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for row in 0..batch.num_rows() {
            rows.push(
                batch
                    .columns()
                    .iter()
                    .map(|col| extract_cell(col, row))
                    .collect(),
            );
        }
    }

    Ok(RecordStore::from_table(&headers, rows))
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &Arc<dyn Array>, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    let any = col.as_any();
    let value = match col.data_type() {
        DataType::Utf8 => any
            .downcast_ref::<StringArray>()
            .map(|a| CellValue::Text(a.value(row).to_string())),
        DataType::LargeUtf8 => Some(CellValue::Text(col.as_string::<i64>().value(row).to_string())),
        DataType::Int32 => any
            .downcast_ref::<Int32Array>()
            .map(|a| CellValue::Integer(a.value(row) as i64)),
        DataType::Int64 => any
            .downcast_ref::<Int64Array>()
            .map(|a| CellValue::Integer(a.value(row))),
        DataType::Float32 => any
            .downcast_ref::<Float32Array>()
            .map(|a| CellValue::Float(a.value(row) as f64)),
        DataType::Float64 => any
            .downcast_ref::<Float64Array>()
            .map(|a| CellValue::Float(a.value(row))),
        DataType::Boolean => any
            .downcast_ref::<BooleanArray>()
            .map(|a| CellValue::Bool(a.value(row))),
        DataType::Date32 => any
            .downcast_ref::<Date32Array>()
            .and_then(|a| a.value_as_date(row))
            .map(|d| CellValue::Date(d.to_string())),
        other => Some(CellValue::Text(format!("{other:?}"))),
    };
    value.unwrap_or(CellValue::Null)
}

// ---------------------------------------------------------------------------
// SQLite loader
// ---------------------------------------------------------------------------

/// Read every row of `table` from an SQLite database, opened read-only.
fn load_sqlite(path: &Path, table: &str) -> Result<RecordStore> {
    if table.is_empty() || !table.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        bail!("invalid table name '{table}'");
    }
    let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
        .context("opening SQLite database")?;
    let mut stmt = conn
        .prepare(&format!("SELECT * FROM \"{table}\""))
        .with_context(|| format!("querying table '{table}'"))?;

    let headers: Vec<String> = stmt.column_names().iter().map(|s| s.to_string()).collect();
    let n_cols = headers.len();

    let mut rows = Vec::new();
    let mut result = stmt.query([]).context("reading rows")?;
    while let Some(row) = result.next().context("reading row")? {
        let mut cells = Vec::with_capacity(n_cols);
        for i in 0..n_cols {
            let cell = match row.get_ref(i)? {
                ValueRef::Null => CellValue::Null,
                ValueRef::Integer(v) => CellValue::Integer(v),
                ValueRef::Real(v) => CellValue::Float(v),
                ValueRef::Text(bytes) => guess_cell_type(&String::from_utf8_lossy(bytes)),
                ValueRef::Blob(_) => CellValue::Null,
            };
            cells.push(cell);
        }
        rows.push(cells);
    }

    Ok(RecordStore::from_table(&headers, rows))
}
