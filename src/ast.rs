use crate::condition::Condition;
use crate::table::ColumnDef;
use crate::value::Value;

#[derive(Debug, PartialEq)]
pub enum Statement {
    CreateDatabase { name: String },
    UseDatabase { name: String },
    DropDatabase { name: String },
    ShowDatabases,
    ShowTables,
    CreateTable(CreateTable),
    DropTable { name: String },
    Insert(Insert),
    Select(Select),
    Update(Update),
    Delete(Delete),
    Exit,
}

#[derive(Debug, PartialEq)]
pub struct CreateTable {
    pub name: String,
    pub columns: Vec<ColumnDef>,
}

#[derive(Debug, PartialEq)]
pub struct Insert {
    pub table: String,
    pub columns: Option<Vec<String>>,
    pub values: Vec<Value>,
}

/// What a SELECT puts in its output: every column of every named table, or
/// an explicit name list.
#[derive(Debug, PartialEq)]
pub enum Projection {
    All,
    Columns(Vec<String>),
}

#[derive(Debug, PartialEq)]
pub struct Select {
    pub projection: Projection,
    pub tables: Vec<String>,
    pub condition: Option<Condition>,
}

#[derive(Debug, PartialEq)]
pub struct Assignment {
    pub column: String,
    pub value: Value,
}

#[derive(Debug, PartialEq)]
pub struct Update {
    pub table: String,
    pub assignments: Vec<Assignment>,
    pub condition: Option<Condition>,
}

#[derive(Debug, PartialEq)]
pub struct Delete {
    pub table: String,
    pub condition: Option<Condition>,
}
