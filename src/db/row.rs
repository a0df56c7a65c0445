//! Row view returned by [`Database::get`](super::Database::get).

use crate::errors::{Error, Result};
use sea_orm::sqlx::sqlite::SqliteRow;
use sea_orm::sqlx::{self, Column as _, Row as _, TypeInfo as _, ValueRef as _};
use sea_orm::{DbErr, FromQueryResult, JsonValue, QueryResult, RuntimeErr};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Map;
use std::ops::Index;

/// One result row: named-field lookup, typed reads, conversion to a map.
///
/// Indexing with a column name yields the raw JSON value (`Null` when the
/// column is missing); [`Row::get`] and friends read typed values;
/// [`Row::deserialize`] maps the whole row onto a struct.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Row {
    fields: Map<String, JsonValue>,
}

static NULL: JsonValue = JsonValue::Null;

impl Row {
    /// Reads `column` as any deserializable type.
    pub fn get<T: DeserializeOwned>(&self, column: &str) -> Result<T> {
        let value = self.fields.get(column).ok_or_else(|| Error::Column {
            column: column.to_string(),
            message: "no such column".to_string(),
        })?;
        serde_json::from_value(value.clone()).map_err(|e| Error::Column {
            column: column.to_string(),
            message: e.to_string(),
        })
    }

    /// Reads an integer column.
    pub fn i64(&self, column: &str) -> Result<i64> {
        self.get(column)
    }

    /// Borrows a text column.
    pub fn str(&self, column: &str) -> Result<&str> {
        self.fields
            .get(column)
            .and_then(JsonValue::as_str)
            .ok_or_else(|| Error::Column {
                column: column.to_string(),
                message: "missing or not text".to_string(),
            })
    }

    /// Whether the row has a column named `column`.
    #[must_use]
    pub fn contains(&self, column: &str) -> bool {
        self.fields.contains_key(column)
    }

    /// Column names in this row.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Maps the whole row onto `T` by field name.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(JsonValue::Object(self.fields.clone())).map_err(|e| Error::Column {
            column: "*".to_string(),
            message: e.to_string(),
        })
    }

    /// Converts into a plain column → value map.
    #[must_use]
    pub fn into_map(self) -> Map<String, JsonValue> {
        self.fields
    }
}

impl Index<&str> for Row {
    type Output = JsonValue;

    fn index(&self, column: &str) -> &JsonValue {
        self.fields.get(column).unwrap_or(&NULL)
    }
}

impl From<Map<String, JsonValue>> for Row {
    fn from(fields: Map<String, JsonValue>) -> Self {
        Self { fields }
    }
}

impl TryFrom<JsonValue> for Row {
    type Error = Error;

    fn try_from(value: JsonValue) -> Result<Self> {
        match value {
            JsonValue::Object(fields) => Ok(Self { fields }),
            other => Err(Error::Column {
                column: "*".to_string(),
                message: format!("expected an object row, got {other}"),
            }),
        }
    }
}

/// Decodes one result row.
///
/// `SQLite` columns are decoded by the storage class of each value, so
/// computed columns (`COUNT(*)`, `coins + 1`) without a declared type are
/// kept. Other backends always report a column type.
pub(super) fn decode(result: &QueryResult) -> Result<Row> {
    match result.try_as_sqlite_row() {
        Some(row) => decode_sqlite(row),
        None => Row::try_from(JsonValue::from_query_result(result, "")?),
    }
}

fn decode_sqlite(row: &SqliteRow) -> Result<Row> {
    let mut fields = Map::new();
    for (idx, column) in row.columns().iter().enumerate() {
        let raw = row.try_get_raw(idx).map_err(storage)?;
        let value = if raw.is_null() {
            JsonValue::Null
        } else {
            match raw.type_info().name() {
                "INTEGER" => JsonValue::from(row.try_get::<i64, _>(idx).map_err(storage)?),
                "REAL" => JsonValue::from(row.try_get::<f64, _>(idx).map_err(storage)?),
                "BLOB" => JsonValue::from(row.try_get::<Vec<u8>, _>(idx).map_err(storage)?),
                _ => JsonValue::from(row.try_get::<String, _>(idx).map_err(storage)?),
            }
        };
        fields.insert(column.name().to_string(), value);
    }
    Ok(Row { fields })
}

fn storage(e: sqlx::Error) -> Error {
    Error::Storage(DbErr::Query(RuntimeErr::SqlxError(e)))
}
