use tracing::debug;

use crate::database::Database;
use crate::error::{Error, Result};
use crate::table::{Schema, Table};

/// The complete set of databases known to the process, plus the
/// current-database selection every unqualified statement operates on.
///
/// The selection is stored by name and always refers to a live database;
/// dropping the selected database clears it.
#[derive(Default)]
pub struct Catalog {
    databases: Vec<Database>,
    current: Option<String>,
}

impl Catalog {
    /// Creates an empty catalog with no database selected.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new, empty database.
    ///
    /// # Errors
    /// Returns [Error::DatabaseExists] if the name (case-insensitive) is
    /// already taken; the catalog is left unchanged.
    pub fn create_database(&mut self, name: &str) -> Result<()> {
        if self.find_database(name).is_some() {
            return Err(Error::DatabaseExists(name.to_string()));
        }
        debug!(name, "create database");
        self.databases.insert(0, Database::new(name.to_string()));
        Ok(())
    }

    /// Selects the database unqualified table operations resolve against.
    ///
    /// # Errors
    /// Returns [Error::DatabaseNotFound] if no such database exists; the
    /// previous selection is kept.
    pub fn use_database(&mut self, name: &str) -> Result<()> {
        let canonical = self
            .find_database(name)
            .ok_or_else(|| Error::DatabaseNotFound(name.to_string()))?
            .name
            .clone();
        debug!(name = %canonical, "use database");
        self.current = Some(canonical);
        Ok(())
    }

    /// Removes a database and everything it owns. If it was the current
    /// database, the selection is cleared.
    ///
    /// # Errors
    /// Returns [Error::DatabaseNotFound] if no such database exists.
    pub fn drop_database(&mut self, name: &str) -> Result<()> {
        let Some(index) = self
            .databases
            .iter()
            .position(|db| db.name.eq_ignore_ascii_case(name))
        else {
            return Err(Error::DatabaseNotFound(name.to_string()));
        };
        let removed = self.databases.remove(index);
        if self
            .current
            .as_deref()
            .is_some_and(|current| current.eq_ignore_ascii_case(&removed.name))
        {
            self.current = None;
        }
        debug!(name = %removed.name, "drop database");
        Ok(())
    }

    /// Creates a table in the current database.
    ///
    /// # Errors
    /// Returns [Error::NoDatabaseSelected] if nothing is selected, or
    /// [Error::TableExists] if the name is taken.
    pub fn create_table(&mut self, name: &str, schema: Schema) -> Result<()> {
        let db = self.current_database_mut().ok_or(Error::NoDatabaseSelected)?;
        db.create_table(name.to_string(), schema)?;
        debug!(table = name, database = %db.name, "create table");
        Ok(())
    }

    /// Drops a table from the current database.
    ///
    /// # Errors
    /// Returns [Error::TableNotFound] if the table does not exist, and also
    /// when no database is selected, since no table name can resolve at all.
    pub fn drop_table(&mut self, name: &str) -> Result<()> {
        let Some(db) = self.current_database_mut() else {
            return Err(Error::TableNotFound(name.to_string()));
        };
        db.drop_table(name)?;
        debug!(table = name, database = %db.name, "drop table");
        Ok(())
    }

    /// Database names in catalog order (most recently created first).
    pub fn list_databases(&self) -> Vec<&str> {
        self.databases.iter().map(|db| db.name.as_str()).collect()
    }

    /// Table names of the current database in storage order.
    ///
    /// # Errors
    /// Returns [Error::NoDatabaseSelected] if nothing is selected.
    pub fn list_tables(&self) -> Result<Vec<&str>> {
        Ok(self
            .current_database()
            .ok_or(Error::NoDatabaseSelected)?
            .list_tables())
    }

    /// Retrieves a database by name, case-insensitively.
    pub fn find_database(&self, name: &str) -> Option<&Database> {
        self.databases
            .iter()
            .find(|db| db.name.eq_ignore_ascii_case(name))
    }

    /// The currently selected database, if any.
    pub fn current_database(&self) -> Option<&Database> {
        let name = self.current.as_deref()?;
        self.find_database(name)
    }

    /// All databases in catalog order.
    pub fn databases(&self) -> &[Database] {
        &self.databases
    }

    fn current_database_mut(&mut self) -> Option<&mut Database> {
        let name = self.current.as_deref()?;
        self.databases
            .iter_mut()
            .find(|db| db.name.eq_ignore_ascii_case(name))
    }

    /// Resolves a table of the current database for reading. Any resolution
    /// failure, including having no database selected, reports the table as
    /// not found.
    pub(crate) fn get_table(&self, name: &str) -> Result<&Table> {
        self.current_database()
            .and_then(|db| db.get_table(name))
            .ok_or_else(|| Error::TableNotFound(name.to_string()))
    }

    /// Resolves a table of the current database for mutation.
    pub(crate) fn get_table_mut(&mut self, name: &str) -> Result<&mut Table> {
        self.current_database_mut()
            .and_then(|db| db.get_table_mut(name))
            .ok_or_else(|| Error::TableNotFound(name.to_string()))
    }
}
