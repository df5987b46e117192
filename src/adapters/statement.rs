//! Parsing of the small statement dialect the bundled adapters understand.
//!
//! Supported shapes:
//! - `select * from Table`
//! - `insert into Table (ColA, ColB) values (@A, @B)`
//! - `update Table set ColA = @A, ColB = @B where Key = @K`
//!
//! Values are bound by placeholder name from the command's parameter list and are
//! never read out of the statement text.

use crate::domain::ports::{SqlCommand, SqlValue};
use crate::utils::error::{StorageError, StorageResult};
use regex::Regex;
use std::sync::LazyLock;

static SELECT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*select\s+\*\s+from\s+(\w+)\s*;?\s*$").expect("select pattern is valid")
});

static INSERT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)^\s*insert\s+into\s+(\w+)\s*\(([^)]*)\)\s*values\s*\(([^)]*)\)\s*;?\s*$")
        .expect("insert pattern is valid")
});

static UPDATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)^\s*update\s+(\w+)\s+set\s+(.+?)\s+where\s+(\w+)\s*=\s*(@\w+)\s*;?\s*$")
        .expect("update pattern is valid")
});

static ASSIGNMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\w+)\s*=\s*(@\w+)\s*$").expect("assignment pattern is valid")
});

static IDENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\w+$").expect("identifier pattern is valid"));

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Insert {
        table: String,
        values: Vec<(String, SqlValue)>,
    },
    Update {
        table: String,
        assignments: Vec<(String, SqlValue)>,
        key_column: String,
        key: SqlValue,
    },
}

/// Table named by a `select * from Table` query.
pub fn parse_select(query: &str) -> StorageResult<String> {
    SELECT_RE
        .captures(query)
        .map(|caps| caps[1].to_string())
        .ok_or_else(|| unsupported(query))
}

impl Statement {
    /// Parse `command` and resolve every placeholder against its bound parameters.
    pub fn bind(command: &SqlCommand) -> StorageResult<Statement> {
        let sql = command.sql();

        if let Some(caps) = INSERT_RE.captures(sql) {
            let columns = split_list(&caps[2]);
            let placeholders = split_list(&caps[3]);
            if columns.len() != placeholders.len()
                || columns.iter().any(|c| !IDENT_RE.is_match(c))
            {
                return Err(unsupported(sql));
            }

            let values = columns
                .into_iter()
                .zip(placeholders)
                .map(|(column, placeholder)| Ok((column.to_string(), lookup(command, placeholder)?)))
                .collect::<StorageResult<Vec<_>>>()?;

            return Ok(Statement::Insert {
                table: caps[1].to_string(),
                values,
            });
        }

        if let Some(caps) = UPDATE_RE.captures(sql) {
            let assignments = split_list(&caps[2])
                .into_iter()
                .map(|assignment| {
                    let parts = ASSIGNMENT_RE
                        .captures(assignment)
                        .ok_or_else(|| unsupported(sql))?;
                    Ok((parts[1].to_string(), lookup(command, &parts[2])?))
                })
                .collect::<StorageResult<Vec<_>>>()?;

            return Ok(Statement::Update {
                table: caps[1].to_string(),
                assignments,
                key_column: caps[3].to_string(),
                key: lookup(command, &caps[4])?,
            });
        }

        Err(unsupported(sql))
    }

    pub fn table(&self) -> &str {
        match self {
            Statement::Insert { table, .. } | Statement::Update { table, .. } => table,
        }
    }
}

fn split_list(list: &str) -> Vec<&str> {
    list.split(',').map(str::trim).filter(|s| !s.is_empty()).collect()
}

fn lookup(command: &SqlCommand, placeholder: &str) -> StorageResult<SqlValue> {
    if !placeholder.starts_with('@') {
        return Err(unsupported(command.sql()));
    }
    command
        .param(placeholder)
        .cloned()
        .ok_or_else(|| StorageError::MissingParameter {
            name: placeholder.trim_start_matches('@').to_string(),
        })
}

fn unsupported(sql: &str) -> StorageError {
    StorageError::UnsupportedStatement {
        sql: sql.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::processor::{INSERT_PERSON_SQL, LOAD_PEOPLE_QUERY, UPDATE_PERSON_SQL};

    #[test]
    fn test_parse_select() {
        assert_eq!(parse_select(LOAD_PEOPLE_QUERY).unwrap(), "Person");
        assert_eq!(parse_select("SELECT * FROM Person;").unwrap(), "Person");
        assert!(parse_select("select FirstName from Person").is_err());
        assert!(parse_select("delete from Person").is_err());
    }

    #[test]
    fn test_bind_insert() {
        let command = SqlCommand::new(INSERT_PERSON_SQL)
            .bind("FirstName", "Tim")
            .bind("LastName", "Corey")
            .bind("HeightInInches", 80.0);

        let statement = Statement::bind(&command).unwrap();

        assert_eq!(
            statement,
            Statement::Insert {
                table: "Person".to_string(),
                values: vec![
                    ("FirstName".to_string(), SqlValue::Text("Tim".to_string())),
                    ("LastName".to_string(), SqlValue::Text("Corey".to_string())),
                    ("HeightInInches".to_string(), SqlValue::Real(80.0)),
                ],
            }
        );
    }

    #[test]
    fn test_bind_update() {
        let command = SqlCommand::new(UPDATE_PERSON_SQL)
            .bind("FirstName", "Tim")
            .bind("LastName", "Corey")
            .bind("HeightInInches", 80.0)
            .bind("Id", 7i64);

        match Statement::bind(&command).unwrap() {
            Statement::Update {
                table,
                assignments,
                key_column,
                key,
            } => {
                assert_eq!(table, "Person");
                assert_eq!(assignments.len(), 3);
                assert_eq!(assignments[2].0, "HeightInInches");
                assert_eq!(key_column, "Id");
                assert_eq!(key, SqlValue::Integer(7));
            }
            other => panic!("expected update, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_parameter() {
        let command = SqlCommand::new(INSERT_PERSON_SQL)
            .bind("FirstName", "Tim")
            .bind("HeightInInches", 80.0);

        let err = Statement::bind(&command).unwrap_err();
        assert!(matches!(err, StorageError::MissingParameter { name } if name == "LastName"));
    }

    #[test]
    fn test_bound_text_stays_data() {
        let command = SqlCommand::new(INSERT_PERSON_SQL)
            .bind("FirstName", "x'); drop table Person; --")
            .bind("LastName", "Corey")
            .bind("HeightInInches", 80.0);

        let statement = Statement::bind(&command).unwrap();
        assert_eq!(statement.table(), "Person");
    }

    #[test]
    fn test_literal_values_are_rejected() {
        let command = SqlCommand::new("insert into Person (FirstName) values ('Tim')");
        assert!(matches!(
            Statement::bind(&command),
            Err(StorageError::UnsupportedStatement { .. })
        ));

        let command = SqlCommand::new("insert into Person (FirstName, LastName) values (@FirstName)")
            .bind("FirstName", "Tim");
        assert!(Statement::bind(&command).is_err());
    }
}
