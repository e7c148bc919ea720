//! Row and change-set validation shared by every backend.

use orgdesk_core::{Changes, Column, ColumnKind, RecordSchema, Row, Value};

use super::error::{StorageError, StorageResult};

/// Every key of `row` must be a known column and every value must fit its column.
pub fn check_row(schema: &RecordSchema, row: &Row) -> StorageResult<()> {
    for (name, value) in row.iter() {
        let column = schema
            .column(name)
            .ok_or_else(|| StorageError::UnknownField(name.to_string()))?;
        check_kind(column, value)?;
    }
    Ok(())
}

/// Changes may only touch declared columns; bookkeeping is owned by the store.
pub fn check_changes(schema: &RecordSchema, changes: &Changes) -> StorageResult<()> {
    for (name, value) in changes.iter() {
        let column = schema
            .declared(name)
            .ok_or_else(|| StorageError::UnknownField(name.to_string()))?;
        check_kind(column, value)?;
    }
    Ok(())
}

pub fn check_kind(column: &Column, value: &Value) -> StorageResult<()> {
    let fits = matches!(
        (column.kind, value),
        (_, Value::Null)
            | (ColumnKind::Uuid, Value::Uuid(_))
            | (ColumnKind::Text, Value::Text(_))
            | (ColumnKind::Timestamp, Value::Timestamp(_))
    );
    if fits {
        Ok(())
    } else {
        Err(StorageError::Persistence(format!(
            "column {} expects {:?}, got {value:?}",
            column.name, column.kind
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orgdesk_core::RecordId;

    static COLUMNS: [Column; 1] = [Column::text("name")];
    static SCHEMA: RecordSchema = RecordSchema::new("things", &COLUMNS);

    #[test]
    fn rows_may_carry_bookkeeping_but_changes_may_not() {
        let row = Row::new().with("uuid", RecordId::new()).with("name", "a");
        assert!(check_row(&SCHEMA, &row).is_ok());

        let changes = Changes::new().set("uuid", RecordId::new());
        assert_eq!(
            check_changes(&SCHEMA, &changes).unwrap_err(),
            StorageError::UnknownField("uuid".into())
        );
    }

    #[test]
    fn kind_mismatch_is_rejected() {
        let row = Row::new().with("name", RecordId::new());
        assert!(matches!(check_row(&SCHEMA, &row), Err(StorageError::Persistence(_))));
    }
}
