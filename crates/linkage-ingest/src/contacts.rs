//! Enriched contact CSV loading.
//!
//! The first row holds column names. Columns are matched to record fields by
//! name, case-insensitively; columns the model does not know are skipped.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;
use tracing::{debug, info, warn};

use linkage_model::{ContactRecord, FieldName, RecordKey, RecordSet};

use crate::error::{IngestError, Result};

/// Key column of the enriched contact table.
pub const DEFAULT_KEY_COLUMN: &str = "SOURCE_CONTACT_KEY";

fn normalize_header(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').to_string()
}

fn normalize_cell(raw: &str) -> &str {
    raw.trim().trim_matches('\u{feff}')
}

/// Column layout resolved from the header row.
#[derive(Debug)]
struct ColumnMap {
    key: usize,
    fields: Vec<(usize, FieldName)>,
}

fn resolve_columns(headers: &[String], key_column: &str, path: &Path) -> Result<ColumnMap> {
    let key = headers
        .iter()
        .position(|header| header.eq_ignore_ascii_case(key_column))
        .ok_or_else(|| IngestError::MissingKeyColumn {
            column: key_column.to_string(),
            path: path.to_path_buf(),
        })?;

    let mut seen: BTreeMap<FieldName, &str> = BTreeMap::new();
    let mut fields = Vec::new();
    for (idx, header) in headers.iter().enumerate() {
        if idx == key {
            continue;
        }
        let Ok(field) = header.parse::<FieldName>() else {
            debug!(column = %header, "ignoring unknown column");
            continue;
        };
        if let Some(first) = seen.get(&field) {
            warn!(
                column = %header,
                kept = %first,
                field = %field,
                "duplicate column for field, keeping the first"
            );
            continue;
        }
        seen.insert(field, header.as_str());
        fields.push((idx, field));
    }
    for field in FieldName::ALL {
        if !seen.contains_key(&field) {
            debug!(field = %field, "column absent, field will be null");
        }
    }
    Ok(ColumnMap { key, fields })
}

/// Reads an enriched contact CSV into a record set.
///
/// # Errors
///
/// Fails when the file cannot be read or parsed, when `key_column` is missing,
/// when a row has a blank key, or when two rows share a key.
pub fn read_contacts_csv(path: &Path, key_column: &str) -> Result<RecordSet> {
    let file = File::open(path).map_err(|e| IngestError::file_read(path, e))?;
    read_contacts(file, path, key_column)
}

/// Reads contacts from any reader; `path` only labels errors and logs.
pub fn read_contacts<R: Read>(reader: R, path: &Path, key_column: &str) -> Result<RecordSet> {
    let csv_error = |source| IngestError::CsvParse {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut rows = reader.records();
    let Some(header) = rows.next() else {
        return Err(IngestError::EmptyCsv {
            path: path.to_path_buf(),
        });
    };
    let headers: Vec<String> = header.map_err(csv_error)?.iter().map(normalize_header).collect();
    let columns = resolve_columns(&headers, key_column, path)?;

    let mut records = Vec::new();
    let mut invalid_flags = 0usize;
    for (offset, row) in rows.enumerate() {
        let row = row.map_err(csv_error)?;
        if row.iter().all(|cell| normalize_cell(cell).is_empty()) {
            continue;
        }
        // Header is row 1.
        let line = offset + 2;
        let raw_key = row.get(columns.key).map(normalize_cell).unwrap_or_default();
        let key = RecordKey::new(raw_key).map_err(|_| IngestError::EmptyKey {
            row: line,
            path: path.to_path_buf(),
        })?;
        let mut record = ContactRecord::new(key);
        for &(idx, field) in &columns.fields {
            let value = row.get(idx).map(normalize_cell).unwrap_or_default();
            if !record.set(field, value) {
                invalid_flags += 1;
                debug!(row = line, field = %field, "unrecognized flag value treated as null");
            }
        }
        records.push(record);
    }

    let set = RecordSet::new(records).map_err(|source| IngestError::Records {
        path: path.to_path_buf(),
        source,
    })?;
    info!(
        path = %path.display(),
        records = set.len(),
        fields = columns.fields.len(),
        invalid_flags,
        "loaded contacts"
    );
    Ok(set)
}
