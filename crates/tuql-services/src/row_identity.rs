//! Resolving which row an edit or delete targets

use tuql_core::{ColumnMeta, Result, Row, TableSchema, TuqlError, Value};

/// Primary-key names and values of one row, copied out of the window
#[derive(Debug, Clone, PartialEq)]
pub struct PkInfo {
    pub names: Vec<String>,
    pub values: Vec<Value>,
}

/// Indices of the primary-key columns within `result_columns`.
///
/// Schema-declared keys win when every key column appears in the result;
/// otherwise the result-set annotations are used. Empty when neither source
/// knows the key.
pub fn find_pk_columns(schema: Option<&TableSchema>, result_columns: &[ColumnMeta]) -> Vec<usize> {
    if let Some(schema) = schema {
        let declared = schema.primary_key_columns();
        if !declared.is_empty() {
            let mapped: Option<Vec<usize>> = declared
                .iter()
                .map(|name| result_columns.iter().position(|c| c.name == *name))
                .collect();
            match mapped {
                Some(indices) => return indices,
                None => tracing::debug!(
                    table = %schema.name,
                    "primary key columns missing from result, falling back to column flags"
                ),
            }
        }
    }

    result_columns
        .iter()
        .enumerate()
        .filter(|(_, c)| c.is_primary_key)
        .map(|(i, _)| i)
        .collect()
}

/// Copy the key values of `row`.
pub fn build_pk_info(row: &Row, columns: &[ColumnMeta], pk_columns: &[usize]) -> Result<PkInfo> {
    if pk_columns.is_empty() {
        return Err(TuqlError::NoPrimaryKey(
            "result has no primary key; editing is disabled".to_string(),
        ));
    }

    let mut names = Vec::with_capacity(pk_columns.len());
    let mut values = Vec::with_capacity(pk_columns.len());
    for &index in pk_columns {
        let column = columns.get(index).ok_or_else(|| {
            TuqlError::InvalidArgument(format!(
                "key column {} out of range for {} columns",
                index,
                columns.len()
            ))
        })?;
        let value = row.get(index).ok_or_else(|| {
            TuqlError::InvalidArgument(format!(
                "key column {} out of range for a row of {} cells",
                index,
                row.len()
            ))
        })?;
        names.push(column.name.clone());
        values.push(value.clone());
    }
    Ok(PkInfo { names, values })
}
