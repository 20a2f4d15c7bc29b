use crate::error::{Error, Result};
use crate::table::{Schema, Table};

/// One named database: an ordered collection of tables, the most recently
/// created table first.
pub struct Database {
    pub name: String,
    tables: Vec<Table>,
}

impl Database {
    /// Creates a new, empty database.
    pub fn new(name: String) -> Self {
        Self {
            name,
            tables: Vec::new(),
        }
    }

    /// Creates a new table in the database.
    ///
    /// # Errors
    /// Returns [Error::TableExists] if a table with the same name
    /// (case-insensitive) already exists.
    pub fn create_table(&mut self, name: String, schema: Schema) -> Result<()> {
        if self.get_table(&name).is_some() {
            return Err(Error::TableExists(name));
        }
        self.tables.insert(0, Table::new(name, schema));
        Ok(())
    }

    /// Removes a table from the database by its name.
    ///
    /// # Errors
    /// Returns [Error::TableNotFound] if the table does not exist.
    pub fn drop_table(&mut self, name: &str) -> Result<()> {
        match self
            .tables
            .iter()
            .position(|table| table.name.eq_ignore_ascii_case(name))
        {
            Some(index) => {
                self.tables.remove(index);
                Ok(())
            }
            None => Err(Error::TableNotFound(name.to_string())),
        }
    }

    /// Retrieves a reference to a table by name, case-insensitively.
    pub fn get_table(&self, name: &str) -> Option<&Table> {
        self.tables
            .iter()
            .find(|table| table.name.eq_ignore_ascii_case(name))
    }

    /// Retrieves a mutable reference to a table by name, case-insensitively.
    pub fn get_table_mut(&mut self, name: &str) -> Option<&mut Table> {
        self.tables
            .iter_mut()
            .find(|table| table.name.eq_ignore_ascii_case(name))
    }

    /// All tables in storage order (most recently created first).
    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    /// Table names in storage order.
    pub fn list_tables(&self) -> Vec<&str> {
        self.tables.iter().map(|table| table.name.as_str()).collect()
    }
}
