use thiserror::Error;

use crate::executor::{MAX_SELECT_FIELDS, MAX_SELECT_TABLES};

/// Everything that can go wrong while parsing, executing or persisting a
/// statement. Every failure is reported at the statement boundary and never
/// crosses into the next statement.
#[derive(Error, Debug)]
pub enum Error {
    #[error("database not found: {0}")]
    DatabaseNotFound(String),

    #[error("database already exists: {0}")]
    DatabaseExists(String),

    #[error("table not found: {0}")]
    TableNotFound(String),

    #[error("table already exists: {0}")]
    TableExists(String),

    #[error("no database selected")]
    NoDatabaseSelected,

    #[error("no table specified")]
    NoTableSpecified,

    #[error("field not found: {0}")]
    FieldNotFound(String),

    #[error("too many tables in select: {0} (limit {max})", max = MAX_SELECT_TABLES)]
    TooManyTables(usize),

    #[error("too many fields in select: {0} (limit {max})", max = MAX_SELECT_FIELDS)]
    TooManyFields(usize),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("persistence parse error at line {line}: {message}")]
    PersistParse { line: usize, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
