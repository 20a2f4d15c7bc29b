pub mod ast;
pub mod catalog;
pub mod condition;
pub mod database;
pub mod error;
pub mod executor;
pub mod parser;
pub mod persist;
pub mod table;
pub mod tokenizer;
pub mod value;

pub use catalog::Catalog;
pub use condition::{CmpOp, Condition};
pub use database::Database;
pub use error::{Error, Result};
pub use executor::{ExecOutcome, QueryResult};
pub use table::{ColumnDef, Row, Schema, Table};
pub use value::{Kind, Value};
