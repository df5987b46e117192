use crate::adapters::statement::{parse_select, Statement};
use crate::adapters::ID_COLUMN;
use crate::domain::model::Entity;
use crate::domain::ports::{SqlCommand, SqlValue, StorageGateway};
use crate::utils::error::{StorageError, StorageResult};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

type Row = Map<String, Value>;

/// Tables of JSON rows kept in process memory.
///
/// Clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    tables: Arc<RwLock<HashMap<String, Vec<Row>>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed `T`'s table with `records`, keeping their ids as given.
    pub fn with_rows<T: Entity>(self, records: &[T]) -> StorageResult<Self> {
        let rows = records
            .iter()
            .map(|record| match serde_json::to_value(record)? {
                Value::Object(row) => Ok(row),
                _ => Err(StorageError::UnsupportedStatement {
                    sql: format!("seed rows for {}", T::TABLE),
                }),
            })
            .collect::<StorageResult<Vec<Row>>>()?;

        {
            let mut tables = self.tables.write().map_err(|_| StorageError::Poisoned)?;
            tables.entry(T::TABLE.to_string()).or_default().extend(rows);
        }
        Ok(self)
    }

    pub fn row_count(&self, table: &str) -> StorageResult<usize> {
        let tables = self.tables.read().map_err(|_| StorageError::Poisoned)?;
        Ok(tables.get(table).map_or(0, Vec::len))
    }

    fn select<T: Entity>(&self, table: &str) -> StorageResult<Vec<T>> {
        let tables = self.tables.read().map_err(|_| StorageError::Poisoned)?;
        let Some(rows) = tables.get(table) else {
            return Ok(Vec::new());
        };

        let records = rows
            .iter()
            .map(|row| serde_json::from_value(Value::Object(row.clone())))
            .collect::<Result<Vec<T>, serde_json::Error>>()?;
        Ok(records)
    }
}

fn next_id(rows: &[Row]) -> i64 {
    rows.iter()
        .filter_map(|row| row.get(ID_COLUMN).and_then(Value::as_i64))
        .max()
        .unwrap_or(0)
        + 1
}

fn to_json_values(values: Vec<(String, SqlValue)>) -> StorageResult<Vec<(String, Value)>> {
    values
        .into_iter()
        .map(|(column, value)| Ok((column, value.to_json()?)))
        .collect()
}

fn matches_key(cell: Option<&Value>, key: &SqlValue) -> bool {
    match (cell, key) {
        (Some(cell), SqlValue::Integer(key)) => cell.as_i64() == Some(*key),
        (Some(cell), SqlValue::Real(key)) => cell.as_f64() == Some(*key),
        (Some(cell), SqlValue::Text(key)) => cell.as_str() == Some(key.as_str()),
        (None, _) => false,
    }
}

impl StorageGateway for MemoryStorage {
    fn load_many<T: Entity>(&self, query: &str) -> StorageResult<Vec<T>> {
        let table = parse_select(query)?;
        self.select(&table)
    }

    fn load_many_named<T: Entity>(&self) -> StorageResult<Vec<T>> {
        self.select(T::TABLE)
    }

    fn save_one<T: Entity>(&self, _record: &T, command: &SqlCommand) -> StorageResult<()> {
        let Statement::Insert { table, values } = Statement::bind(command)? else {
            return Err(StorageError::UnsupportedStatement {
                sql: command.sql().to_string(),
            });
        };

        let values = to_json_values(values)?;

        let mut tables = self.tables.write().map_err(|_| StorageError::Poisoned)?;
        let rows = tables.entry(table.clone()).or_default();

        let mut row = Row::new();
        row.insert(ID_COLUMN.to_string(), Value::from(next_id(rows)));
        row.extend(values);
        tracing::debug!("Inserted row into {} ({} rows)", table, rows.len() + 1);
        rows.push(row);
        Ok(())
    }

    fn update_one<T: Entity>(&self, _record: &T, command: &SqlCommand) -> StorageResult<()> {
        let Statement::Update {
            table,
            assignments,
            key_column,
            key,
        } = Statement::bind(command)?
        else {
            return Err(StorageError::UnsupportedStatement {
                sql: command.sql().to_string(),
            });
        };

        let assignments = to_json_values(assignments)?;

        let mut tables = self.tables.write().map_err(|_| StorageError::Poisoned)?;
        let row = tables
            .get_mut(&table)
            .and_then(|rows| rows.iter_mut().find(|row| matches_key(row.get(&key_column), &key)))
            .ok_or_else(|| StorageError::RowNotFound {
                table: table.clone(),
                column: key_column.clone(),
                key: key.to_string(),
            })?;

        row.extend(assignments);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::processor::{INSERT_PERSON_SQL, LOAD_PEOPLE_QUERY, UPDATE_PERSON_SQL};
    use crate::domain::model::PersonRecord;

    fn insert(first: &str, last: &str, height: f64) -> SqlCommand {
        SqlCommand::new(INSERT_PERSON_SQL)
            .bind("FirstName", first)
            .bind("LastName", last)
            .bind("HeightInInches", height)
    }

    #[test]
    fn test_insert_assigns_sequential_ids() {
        let storage = MemoryStorage::new();
        let person = PersonRecord::default();

        storage.save_one(&person, &insert("mario", "buzza", 70.0)).unwrap();
        storage.save_one(&person, &insert("julie", "faverjon", 66.0)).unwrap();

        let people: Vec<PersonRecord> = storage.load_many(LOAD_PEOPLE_QUERY).unwrap();
        assert_eq!(people.len(), 2);
        assert_eq!(people[0].id, 1);
        assert_eq!(people[1].id, 2);
        assert_eq!(people[1].first_name, "julie");
        assert_eq!(people[1].height_in_inches, 66.0);
    }

    #[test]
    fn test_unknown_table_loads_empty() {
        let storage = MemoryStorage::new();
        let people: Vec<PersonRecord> = storage.load_many(LOAD_PEOPLE_QUERY).unwrap();
        assert!(people.is_empty());
        assert_eq!(storage.row_count("Person").unwrap(), 0);
    }

    #[test]
    fn test_seeded_rows_keep_ids_and_order() {
        let mut first = PersonRecord::new("mario", "buzza", 70.0);
        first.id = 10;
        let mut second = PersonRecord::new("valerie", "bouquet", 64.0);
        second.id = 4;
        let storage = MemoryStorage::new().with_rows(&[first, second]).unwrap();

        let people: Vec<PersonRecord> = storage.load_many_named().unwrap();
        let ids: Vec<i64> = people.iter().map(|p| p.id).collect();
        assert_eq!(ids, [10, 4]);

        storage
            .save_one(&PersonRecord::default(), &insert("julie", "faverjon", 66.0))
            .unwrap();
        let people: Vec<PersonRecord> = storage.load_many(LOAD_PEOPLE_QUERY).unwrap();
        assert_eq!(people[2].id, 11);
    }

    #[test]
    fn test_update_by_id() {
        let storage = MemoryStorage::new();
        storage
            .save_one(&PersonRecord::default(), &insert("mario", "buzza", 70.0))
            .unwrap();

        let command = SqlCommand::new(UPDATE_PERSON_SQL)
            .bind("FirstName", "Mario")
            .bind("LastName", "Buzza")
            .bind("HeightInInches", 71.5)
            .bind("Id", 1i64);
        storage.update_one(&PersonRecord::default(), &command).unwrap();

        let people: Vec<PersonRecord> = storage.load_many(LOAD_PEOPLE_QUERY).unwrap();
        assert_eq!(people[0].first_name, "Mario");
        assert_eq!(people[0].height_in_inches, 71.5);
        assert_eq!(people[0].id, 1);
    }

    #[test]
    fn test_update_missing_row() {
        let storage = MemoryStorage::new();
        let command = SqlCommand::new(UPDATE_PERSON_SQL)
            .bind("FirstName", "Mario")
            .bind("LastName", "Buzza")
            .bind("HeightInInches", 71.5)
            .bind("Id", 0i64);

        let err = storage.update_one(&PersonRecord::default(), &command).unwrap_err();
        assert!(matches!(err, StorageError::RowNotFound { .. }));
    }

    #[test]
    fn test_save_rejects_update_statement() {
        let storage = MemoryStorage::new();
        let command = SqlCommand::new(UPDATE_PERSON_SQL)
            .bind("FirstName", "Mario")
            .bind("LastName", "Buzza")
            .bind("HeightInInches", 71.5)
            .bind("Id", 1i64);

        let err = storage.save_one(&PersonRecord::default(), &command).unwrap_err();
        assert!(matches!(err, StorageError::UnsupportedStatement { .. }));
        assert_eq!(storage.row_count("Person").unwrap(), 0);
    }

    #[test]
    fn test_non_finite_height_is_rejected_without_writing() {
        let storage = MemoryStorage::new();
        storage
            .save_one(&PersonRecord::default(), &insert("Tim", "Corey", 80.0))
            .unwrap();

        let err = storage
            .save_one(&PersonRecord::default(), &insert("Jon", "Corey", f64::NAN))
            .unwrap_err();
        assert!(matches!(err, StorageError::NonFiniteValue { .. }));

        let command = SqlCommand::new(UPDATE_PERSON_SQL)
            .bind("FirstName", "Timothy")
            .bind("LastName", "Corey")
            .bind("HeightInInches", f64::INFINITY)
            .bind("Id", 1i64);
        let err = storage.update_one(&PersonRecord::default(), &command).unwrap_err();
        assert!(matches!(err, StorageError::NonFiniteValue { .. }));

        let people: Vec<PersonRecord> = storage.load_many(LOAD_PEOPLE_QUERY).unwrap();
        assert_eq!(people.len(), 1);
        assert_eq!(people[0].first_name, "Tim");
        assert_eq!(people[0].height_in_inches, 80.0);
        let people: Vec<PersonRecord> = storage.load_many_named().unwrap();
        assert_eq!(people.len(), 1);
    }

    #[test]
    fn test_clones_share_tables() {
        let storage = MemoryStorage::new();
        let other = storage.clone();
        storage
            .save_one(&PersonRecord::default(), &insert("mario", "buzza", 70.0))
            .unwrap();
        assert_eq!(other.row_count("Person").unwrap(), 1);
    }
}
