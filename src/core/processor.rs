use crate::core::height::convert_height_text_to_inches;
use crate::domain::model::{HeightParse, PersonRecord};
use crate::domain::ports::{SqlCommand, StorageGateway};
use crate::utils::error::{Error, Field, Result};
use crate::utils::validation::validate_name;

pub const LOAD_PEOPLE_QUERY: &str = "select * from Person";

pub const INSERT_PERSON_SQL: &str = "insert into Person (FirstName, LastName, HeightInInches) \
     values (@FirstName, @LastName, @HeightInInches)";

pub const UPDATE_PERSON_SQL: &str = "update Person set FirstName = @FirstName, LastName = @LastName, \
     HeightInInches = @HeightInInches where Id = @Id";

/// First names longer than this many characters count as long.
pub const LONG_NAME_THRESHOLD: usize = 10;

/// Validates person input and drives the storage gateway.
pub struct PersonProcessor<S: StorageGateway> {
    database: S,
}

impl<S: StorageGateway> PersonProcessor<S> {
    pub fn new(database: S) -> Self {
        Self { database }
    }

    pub fn storage(&self) -> &S {
        &self.database
    }

    /// Build an unsaved record from raw input.
    ///
    /// Checks run first name, last name, then height; the first failure is the one reported.
    pub fn create_person(
        &self,
        first_name: &str,
        last_name: &str,
        height_text: &str,
    ) -> Result<PersonRecord> {
        let height_in_inches = check_person_parameters(first_name, last_name, height_text)?;

        Ok(PersonRecord::new(first_name, last_name, height_in_inches))
    }

    pub fn load_people(&self) -> Result<Vec<PersonRecord>> {
        let people = self.database.load_many::<PersonRecord>(LOAD_PEOPLE_QUERY)?;
        tracing::debug!("Loaded {} people", people.len());
        Ok(people)
    }

    /// People whose first name is longer than [`LONG_NAME_THRESHOLD`], in storage order.
    pub fn load_people_with_long_names(&self) -> Result<Vec<PersonRecord>> {
        let people = self.database.load_many_named::<PersonRecord>()?;
        let total = people.len();

        let long_names: Vec<PersonRecord> = people
            .into_iter()
            .filter(|p| p.first_name.chars().count() > LONG_NAME_THRESHOLD)
            .collect();

        tracing::debug!("Kept {} of {} people with long names", long_names.len(), total);
        Ok(long_names)
    }

    pub fn save_person(&self, person: &PersonRecord) -> Result<()> {
        let command = SqlCommand::new(INSERT_PERSON_SQL)
            .bind("FirstName", person.first_name.as_str())
            .bind("LastName", person.last_name.as_str())
            .bind("HeightInInches", person.height_in_inches);

        tracing::debug!("Saving person {} {}", person.first_name, person.last_name);
        self.database.save_one(person, &command)?;
        Ok(())
    }

    pub fn update_person(&self, person: &PersonRecord) -> Result<()> {
        let command = SqlCommand::new(UPDATE_PERSON_SQL)
            .bind("FirstName", person.first_name.as_str())
            .bind("LastName", person.last_name.as_str())
            .bind("HeightInInches", person.height_in_inches)
            .bind("Id", person.id);

        tracing::debug!("Updating person {}", person.id);
        self.database.update_one(person, &command)?;
        Ok(())
    }

    pub fn convert_height_text_to_inches(&self, height_text: &str) -> HeightParse {
        convert_height_text_to_inches(height_text)
    }
}

/// Returns the parsed height so callers don't convert twice.
fn check_person_parameters(first_name: &str, last_name: &str, height_text: &str) -> Result<f64> {
    validate_name(Field::FirstName, first_name)?;
    validate_name(Field::LastName, last_name)?;

    match convert_height_text_to_inches(height_text) {
        HeightParse::Parsed(inches) => Ok(inches),
        HeightParse::Invalid => {
            tracing::warn!("Rejected {}: {:?}", Field::HeightText, height_text);
            Err(Error::invalid_argument(Field::HeightText))
        }
    }
}
