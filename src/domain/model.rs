use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A row type a storage gateway can load and persist.
///
/// Rows are mapped through serde, so the serialized field names are the column names.
pub trait Entity: Serialize + DeserializeOwned + Send + Sync {
    const TABLE: &'static str;

    fn id(&self) -> i64;
}

/// A person as stored in the `Person` table. `id` is 0 until storage assigns one.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PersonRecord {
    #[serde(default)]
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub height_in_inches: f64,
}

impl PersonRecord {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>, height_in_inches: f64) -> Self {
        Self {
            id: 0,
            first_name: first_name.into(),
            last_name: last_name.into(),
            height_in_inches,
        }
    }

    pub fn is_saved(&self) -> bool {
        self.id != 0
    }
}

impl Entity for PersonRecord {
    const TABLE: &'static str = "Person";

    fn id(&self) -> i64 {
        self.id
    }
}

/// Outcome of reading a height such as `6'8"`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HeightParse {
    Parsed(f64),
    Invalid,
}

impl HeightParse {
    pub fn is_valid(&self) -> bool {
        matches!(self, HeightParse::Parsed(_))
    }

    /// Total inches, or 0 when the text was not a valid height.
    pub fn inches(&self) -> f64 {
        match self {
            HeightParse::Parsed(inches) => *inches,
            HeightParse::Invalid => 0.0,
        }
    }
}
