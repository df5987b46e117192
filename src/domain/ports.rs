use crate::domain::model::Entity;
use crate::utils::error::{StorageError, StorageResult};
use std::fmt;
use std::sync::Arc;

/// A value bound to a named statement parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Integer(i64),
    Real(f64),
    Text(String),
}

impl SqlValue {
    /// JSON form of the value. NaN and infinities have none and are rejected.
    pub fn to_json(&self) -> StorageResult<serde_json::Value> {
        match self {
            SqlValue::Integer(v) => Ok(serde_json::Value::from(*v)),
            SqlValue::Real(v) if v.is_finite() => Ok(serde_json::Value::from(*v)),
            SqlValue::Real(v) => Err(StorageError::NonFiniteValue { value: *v }),
            SqlValue::Text(v) => Ok(serde_json::Value::from(v.as_str())),
        }
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Integer(v) => write!(f, "{}", v),
            SqlValue::Real(v) => write!(f, "{}", v),
            SqlValue::Text(v) => f.write_str(v),
        }
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Integer(value)
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        SqlValue::Real(value)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

/// Statement text with `@Name` placeholders plus the values bound to them.
///
/// Values never get spliced into the text; gateways look them up by name.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlCommand {
    sql: String,
    params: Vec<(String, SqlValue)>,
}

impl SqlCommand {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// Bind `value` to `@name`. A leading `@` on `name` is optional.
    pub fn bind(mut self, name: &str, value: impl Into<SqlValue>) -> Self {
        let name = name.trim_start_matches('@').to_string();
        let value = value.into();
        match self.params.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = value,
            None => self.params.push((name, value)),
        }
        self
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[(String, SqlValue)] {
        &self.params
    }

    pub fn param(&self, name: &str) -> Option<&SqlValue> {
        let name = name.trim_start_matches('@');
        self.params
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value)
    }
}

/// Data access capability the person processor is built on.
pub trait StorageGateway: Send + Sync {
    /// Run a read query and map every row to `T`.
    fn load_many<T: Entity>(&self, query: &str) -> StorageResult<Vec<T>>;

    /// Run the predefined long-names query for `T`. Takes no parameters.
    fn load_many_named<T: Entity>(&self) -> StorageResult<Vec<T>>;

    fn save_one<T: Entity>(&self, record: &T, command: &SqlCommand) -> StorageResult<()>;

    fn update_one<T: Entity>(&self, record: &T, command: &SqlCommand) -> StorageResult<()>;
}

impl<S: StorageGateway> StorageGateway for Arc<S> {
    fn load_many<T: Entity>(&self, query: &str) -> StorageResult<Vec<T>> {
        (**self).load_many(query)
    }

    fn load_many_named<T: Entity>(&self) -> StorageResult<Vec<T>> {
        (**self).load_many_named()
    }

    fn save_one<T: Entity>(&self, record: &T, command: &SqlCommand) -> StorageResult<()> {
        (**self).save_one(record, command)
    }

    fn update_one<T: Entity>(&self, record: &T, command: &SqlCommand) -> StorageResult<()> {
        (**self).update_one(record, command)
    }
}

impl<S: StorageGateway> StorageGateway for &S {
    fn load_many<T: Entity>(&self, query: &str) -> StorageResult<Vec<T>> {
        (**self).load_many(query)
    }

    fn load_many_named<T: Entity>(&self) -> StorageResult<Vec<T>> {
        (**self).load_many_named()
    }

    fn save_one<T: Entity>(&self, record: &T, command: &SqlCommand) -> StorageResult<()> {
        (**self).save_one(record, command)
    }

    fn update_one<T: Entity>(&self, record: &T, command: &SqlCommand) -> StorageResult<()> {
        (**self).update_one(record, command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_replaces_existing_parameter() {
        let command = SqlCommand::new("update Person set FirstName = @FirstName where Id = @Id")
            .bind("@FirstName", "Tim")
            .bind("Id", 3i64)
            .bind("FirstName", "Jon");

        assert_eq!(command.params().len(), 2);
        assert_eq!(command.param("@FirstName"), Some(&SqlValue::Text("Jon".to_string())));
        assert_eq!(command.param("Id"), Some(&SqlValue::Integer(3)));
        assert!(command.param("LastName").is_none());
    }

    #[test]
    fn test_non_finite_reals_have_no_json_form() {
        assert_eq!(SqlValue::Real(66.5).to_json().unwrap(), serde_json::json!(66.5));
        assert!(matches!(
            SqlValue::Real(f64::NAN).to_json(),
            Err(StorageError::NonFiniteValue { .. })
        ));
        assert!(SqlValue::Real(f64::INFINITY).to_json().is_err());
    }

    #[test]
    fn test_sql_text_is_not_substituted() {
        let command = SqlCommand::new("insert into Person (FirstName) values (@FirstName)")
            .bind("FirstName", "O'Brien");

        assert_eq!(command.sql(), "insert into Person (FirstName) values (@FirstName)");
    }
}
