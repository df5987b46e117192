use crate::adapters::statement::{parse_select, Statement};
use crate::adapters::ID_COLUMN;
use crate::domain::model::Entity;
use crate::domain::ports::{SqlCommand, StorageGateway};
use crate::utils::error::{StorageError, StorageResult};
use csv::StringRecord;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// One `<Table>.csv` file per table under `base_path`. The header row holds column names.
#[derive(Debug, Clone)]
pub struct CsvStorage {
    base_path: PathBuf,
    // serializes read-modify-write cycles between clones
    write_lock: Arc<Mutex<()>>,
}

struct CsvTable {
    headers: StringRecord,
    records: Vec<StringRecord>,
}

impl CsvTable {
    fn column(&self, table: &str, name: &str) -> StorageResult<usize> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| StorageError::UnknownColumn {
                table: table.to_string(),
                column: name.to_string(),
            })
    }
}

impl CsvStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn table_path(&self, table: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", table))
    }

    fn select<T: Entity>(&self, table: &str) -> StorageResult<Vec<T>> {
        let path = self.table_path(table);
        if !path.exists() {
            tracing::debug!("No file for table {}, returning no rows", table);
            return Ok(Vec::new());
        }

        let mut reader = csv::Reader::from_path(&path)?;
        let records = reader.deserialize::<T>().collect::<Result<Vec<T>, csv::Error>>()?;
        Ok(records)
    }

    fn read_table(&self, table: &str) -> StorageResult<Option<CsvTable>> {
        let path = self.table_path(table);
        if !path.exists() {
            return Ok(None);
        }

        let mut reader = csv::Reader::from_path(&path)?;
        let headers = reader.headers()?.clone();
        let records = reader
            .records()
            .collect::<Result<Vec<StringRecord>, csv::Error>>()?;
        Ok(Some(CsvTable { headers, records }))
    }

    fn write_table(&self, table: &str, contents: &CsvTable) -> StorageResult<()> {
        fs::create_dir_all(&self.base_path)?;

        let mut writer = csv::Writer::from_path(self.table_path(table))?;
        writer.write_record(&contents.headers)?;
        for record in &contents.records {
            writer.write_record(record)?;
        }
        writer.flush()?;
        Ok(())
    }
}

impl StorageGateway for CsvStorage {
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

        let _guard = self.write_lock.lock().map_err(|_| StorageError::Poisoned)?;

        let mut contents = match self.read_table(&table)? {
            Some(contents) => contents,
            None => {
                let mut headers = StringRecord::new();
                headers.push_field(ID_COLUMN);
                for (column, _) in &values {
                    headers.push_field(column);
                }
                CsvTable {
                    headers,
                    records: Vec::new(),
                }
            }
        };

        let id_at = contents.column(&table, ID_COLUMN)?;
        let next_id = contents
            .records
            .iter()
            .filter_map(|record| record.get(id_at).and_then(|cell| cell.parse::<i64>().ok()))
            .max()
            .unwrap_or(0)
            + 1;

        let mut cells = vec![String::new(); contents.headers.len()];
        cells[id_at] = next_id.to_string();
        for (column, value) in &values {
            cells[contents.column(&table, column)?] = value.to_string();
        }

        contents.records.push(StringRecord::from(cells));
        self.write_table(&table, &contents)?;
        tracing::debug!("Appended row {} to {}", next_id, self.table_path(&table).display());
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

        let _guard = self.write_lock.lock().map_err(|_| StorageError::Poisoned)?;

        let not_found = || StorageError::RowNotFound {
            table: table.clone(),
            column: key_column.clone(),
            key: key.to_string(),
        };

        let mut contents = self.read_table(&table)?.ok_or_else(not_found)?;
        let key_at = contents.column(&table, &key_column)?;
        let key_cell = key.to_string();
        let row_at = contents
            .records
            .iter()
            .position(|record| record.get(key_at) == Some(key_cell.as_str()))
            .ok_or_else(not_found)?;

        let mut cells: Vec<String> = contents.records[row_at].iter().map(str::to_string).collect();
        for (column, value) in &assignments {
            cells[contents.column(&table, column)?] = value.to_string();
        }
        contents.records[row_at] = StringRecord::from(cells);

        self.write_table(&table, &contents)
    }
}
