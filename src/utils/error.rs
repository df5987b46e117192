use std::fmt;
use thiserror::Error;

/// Input parameter blamed by a failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    FirstName,
    LastName,
    HeightText,
}

impl Field {
    /// Parameter name as callers pass it, e.g. `firstName`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::FirstName => "firstName",
            Field::LastName => "lastName",
            Field::HeightText => "heightText",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid argument: the value of {field} was not valid")]
    InvalidArgument { field: Field },

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Configuration error in {field}: {message}")]
    ConfigError { field: String, message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Storage,
    Configuration,
}

impl Error {
    pub fn invalid_argument(field: Field) -> Self {
        Error::InvalidArgument { field }
    }

    /// The blamed parameter, for `InvalidArgument` errors.
    pub fn field(&self) -> Option<Field> {
        match self {
            Error::InvalidArgument { field } => Some(*field),
            _ => None,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::InvalidArgument { .. } => ErrorCategory::Validation,
            Error::Storage(_) => ErrorCategory::Storage,
            Error::ConfigError { .. } | Error::IoError(_) => ErrorCategory::Configuration,
        }
    }
}

/// Failures raised by a storage gateway. The processor passes these through untouched.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV storage error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Row mapping error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unsupported statement: {sql}")]
    UnsupportedStatement { sql: String },

    #[error("Missing value for parameter @{name}")]
    MissingParameter { name: String },

    #[error("Cannot store non-finite number {value}")]
    NonFiniteValue { value: f64 },

    #[error("Unknown column {column} in table {table}")]
    UnknownColumn { table: String, column: String },

    #[error("No row in {table} where {column} = {key}")]
    RowNotFound {
        table: String,
        column: String,
        key: String,
    },

    #[error("Storage lock poisoned")]
    Poisoned,
}

pub type Result<T> = std::result::Result<T, Error>;

pub type StorageResult<T> = std::result::Result<T, StorageError>;
