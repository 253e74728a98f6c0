use std::fs::File;
use std::path::Path;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{Column, UserRecord, UserTable};
use crate::error::LoadError;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a user dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with at least the [`Column::ALL`] names
/// * `.json`    – `[{ "Username": "...", "Device_Type": "...", ... }, ...]`
/// * `.parquet` – one column per required name, any primitive/temporal type
///
/// Rows that cannot be decoded are skipped; cells that cannot be coerced
/// become `None`. Only an unreadable source or missing columns fail.
pub fn load_file(path: &Path) -> Result<UserTable, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "csv" | "tsv" | "txt" => load_csv(path)?,
        "json" => load_json(path)?,
        "parquet" | "pq" => load_parquet(path)?,
        other => return Err(LoadError::UnsupportedFormat(other.to_string())),
    };

    log::info!(
        "Loaded {} users from {} ({} device types, {} game modes)",
        table.len(),
        path.display(),
        table.device_types.len(),
        table.game_modes.len()
    );
    Ok(table)
}

fn open(path: &Path) -> Result<File, LoadError> {
    File::open(path).map_err(|source| LoadError::Unreadable {
        path: path.to_path_buf(),
        source,
    })
}

/// Map every required column to its position among `headers`.
fn resolve_columns(path: &Path, headers: &[&str]) -> Result<[usize; 7], LoadError> {
    let mut positions = [0usize; 7];
    let mut missing = Vec::new();

    for column in Column::ALL {
        match headers.iter().position(|h| h.trim() == column.name()) {
            Some(pos) => positions[column.index()] = pos,
            None => missing.push(column.name().to_string()),
        }
    }

    if missing.is_empty() {
        Ok(positions)
    } else {
        Err(LoadError::MissingColumns {
            path: path.to_path_buf(),
            missing,
        })
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Comma-separated unless the file is `.tsv`. Rows whose field count differs
/// from the header, or that are not valid UTF-8, are skipped with a warning.
fn load_csv(path: &Path) -> Result<UserTable, LoadError> {
    let delimiter = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => b'\t',
        _ => b',',
    };
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(open(path)?);

    let headers = reader.headers()?.clone();
    let names: Vec<&str> = headers.iter().collect();
    let positions = resolve_columns(path, &names)?;

    let mut records = Vec::new();
    let mut skipped = 0usize;

    for (row_no, result) in reader.records().enumerate() {
        let row = match result {
            Ok(row) => row,
            Err(e) => {
                log::warn!("{}: skipping CSV row {row_no}: {e}", path.display());
                skipped += 1;
                continue;
            }
        };
        if row.len() != headers.len() {
            log::warn!(
                "{}: skipping CSV row {row_no}: expected {} fields, found {}",
                path.display(),
                headers.len(),
                row.len()
            );
            skipped += 1;
            continue;
        }
        records.push(UserRecord::from_fields(|c| row.get(positions[c.index()])));
    }

    if skipped > 0 {
        log::warn!("{}: skipped {skipped} malformed rows", path.display());
    }
    Ok(UserTable::from_records(records))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "Username": "ava", "Device_Type": "Mobile", "Total_Revenue_USD": 12.5, ... },
///   ...
/// ]
/// ```
///
/// A column counts as present when at least one record carries the key.
fn load_json(path: &Path) -> Result<UserTable, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;
    let root: JsonValue = serde_json::from_str(&text)?;
    let rows = root.as_array().ok_or(LoadError::JsonShape)?;

    let objects: Vec<_> = rows
        .iter()
        .enumerate()
        .filter_map(|(i, row)| {
            let obj = row.as_object();
            if obj.is_none() {
                log::warn!("{}: skipping JSON row {i}: not an object", path.display());
            }
            obj
        })
        .collect();

    // With no objects at all, every column is missing.
    let missing: Vec<String> = Column::ALL
        .iter()
        .filter(|c| !objects.iter().any(|obj| obj.contains_key(c.name())))
        .map(|c| c.name().to_string())
        .collect();
    if !missing.is_empty() {
        return Err(LoadError::MissingColumns {
            path: path.to_path_buf(),
            missing,
        });
    }

    let records = objects
        .into_iter()
        .map(|obj| {
            let cells: Vec<Option<String>> = Column::ALL
                .iter()
                .map(|c| obj.get(c.name()).and_then(json_to_text))
                .collect();
            UserRecord::from_fields(|c| cells[c.index()].as_deref())
        })
        .collect();

    Ok(UserTable::from_records(records))
}

fn json_to_text(val: &JsonValue) -> Option<String> {
    match val {
        JsonValue::Null => None,
        JsonValue::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file containing user records.
///
/// Every required column is cast to UTF-8 and then coerced exactly like a
/// CSV cell, so numeric, string, date and timestamp physical types all work.
/// Works with files written by both **Pandas** and **Polars**.
fn load_parquet(path: &Path) -> Result<UserTable, LoadError> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(open(path)?)?;

    let schema = builder.schema().clone();
    let names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
    let positions = resolve_columns(path, &names)?;

    let reader = builder.build()?;
    let mut records = Vec::new();

    for batch_result in reader {
        let batch = batch_result?;

        let text_columns: Vec<ArrayRef> = positions
            .iter()
            .map(|&idx| cast(batch.column(idx).as_ref(), &DataType::Utf8))
            .collect::<Result<_, _>>()?;
        let columns: Vec<_> = text_columns.iter().map(|a| a.as_string::<i32>()).collect();

        for row in 0..batch.num_rows() {
            records.push(UserRecord::from_fields(|c| {
                let col = columns[c.index()];
                if col.is_null(row) {
                    None
                } else {
                    Some(col.value(row))
                }
            }));
        }
    }

    Ok(UserTable::from_records(records))
}
