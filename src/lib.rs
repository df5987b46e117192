pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::{CsvStorage, MemoryStorage, Storage};
pub use config::TomlConfig;
pub use crate::core::{height::convert_height_text_to_inches, processor::PersonProcessor};
pub use domain::model::{Entity, HeightParse, PersonRecord};
pub use domain::ports::{SqlCommand, SqlValue, StorageGateway};
pub use utils::error::{Error, ErrorCategory, Field, Result, StorageError};
