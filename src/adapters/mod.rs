// Adapters layer: concrete storage gateways the person processor can run on.

pub mod csv_file;
pub mod memory;
pub mod statement;

use crate::domain::model::Entity;
use crate::domain::ports::{SqlCommand, StorageGateway};
use crate::utils::error::StorageResult;

pub use csv_file::CsvStorage;
pub use memory::MemoryStorage;

/// Column storage fills in on insert.
pub const ID_COLUMN: &str = "Id";

/// Backend chosen from configuration.
#[derive(Debug, Clone)]
pub enum Storage {
    Memory(MemoryStorage),
    Csv(CsvStorage),
}

impl StorageGateway for Storage {
    fn load_many<T: Entity>(&self, query: &str) -> StorageResult<Vec<T>> {
        match self {
            Storage::Memory(storage) => storage.load_many(query),
            Storage::Csv(storage) => storage.load_many(query),
        }
    }

    fn load_many_named<T: Entity>(&self) -> StorageResult<Vec<T>> {
        match self {
            Storage::Memory(storage) => storage.load_many_named(),
            Storage::Csv(storage) => storage.load_many_named(),
        }
    }

    fn save_one<T: Entity>(&self, record: &T, command: &SqlCommand) -> StorageResult<()> {
        match self {
            Storage::Memory(storage) => storage.save_one(record, command),
            Storage::Csv(storage) => storage.save_one(record, command),
        }
    }

    fn update_one<T: Entity>(&self, record: &T, command: &SqlCommand) -> StorageResult<()> {
        match self {
            Storage::Memory(storage) => storage.update_one(record, command),
            Storage::Csv(storage) => storage.update_one(record, command),
        }
    }
}
