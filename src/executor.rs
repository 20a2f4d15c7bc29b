use tracing::debug;

use crate::ast::{Assignment, Projection, Statement};
use crate::catalog::Catalog;
use crate::condition::{self, Condition};
use crate::error::{Error, Result};
use crate::table::{Row, Schema};
use crate::value::Value;

/// Upper bound on the number of tables one SELECT may name.
pub const MAX_SELECT_TABLES: usize = 8;
/// Upper bound on the number of fields in an explicit SELECT projection.
pub const MAX_SELECT_FIELDS: usize = 64;

/// Represents the result of a successful `SELECT` query.
#[derive(Debug)]
pub struct QueryResult {
    /// The names of the columns included in the result set.
    pub columns: Vec<String>,
    /// The actual data, returned as a vector of rows, where each row is a
    /// vector of [Value].
    pub rows: Vec<Vec<Value>>,
}

/// What a successfully executed statement produced. The shell turns this
/// into status lines or a rendered table.
#[derive(Debug)]
pub enum ExecOutcome {
    CreatedDatabase(String),
    UsingDatabase(String),
    DroppedDatabase(String),
    CreatedTable(String),
    DroppedTable(String),
    DatabaseList(Vec<String>),
    TableList(Vec<String>),
    Inserted { table: String },
    Updated { table: String, rows: usize },
    Deleted { table: String, rows: usize },
    Selected(QueryResult),
    Exit,
}

impl Catalog {
    /// Executes one parsed statement against the catalog.
    ///
    /// This is the single dispatch point the shell uses; each statement kind
    /// maps to exactly one operation below or on [Catalog] itself.
    ///
    /// # Errors
    /// Returns the first resolution or validation error; the catalog is left
    /// as the failing operation defines (always unchanged for anything that
    /// failed to resolve).
    ///
    /// # Example
    /// ```
    /// use minidb::{Catalog, ExecOutcome, parser};
    ///
    /// let mut catalog = Catalog::new();
    /// catalog.execute(parser::parse("CREATE DATABASE shop").unwrap()).unwrap();
    /// catalog.execute(parser::parse("USE shop").unwrap()).unwrap();
    /// catalog.execute(parser::parse("CREATE TABLE users (id INT, name CHAR(20))").unwrap()).unwrap();
    /// catalog.execute(parser::parse("INSERT INTO users VALUES (1, 'Alice')").unwrap()).unwrap();
    ///
    /// let outcome = catalog.execute(parser::parse("SELECT * FROM users").unwrap()).unwrap();
    /// let ExecOutcome::Selected(result) = outcome else { unreachable!() };
    /// assert_eq!(result.rows.len(), 1);
    /// ```
    pub fn execute(&mut self, statement: Statement) -> Result<ExecOutcome> {
        match statement {
            Statement::CreateDatabase { name } => {
                self.create_database(&name)?;
                Ok(ExecOutcome::CreatedDatabase(name))
            }
            Statement::UseDatabase { name } => {
                self.use_database(&name)?;
                Ok(ExecOutcome::UsingDatabase(name))
            }
            Statement::DropDatabase { name } => {
                self.drop_database(&name)?;
                Ok(ExecOutcome::DroppedDatabase(name))
            }
            Statement::ShowDatabases => Ok(ExecOutcome::DatabaseList(
                self.list_databases().iter().map(|s| s.to_string()).collect(),
            )),
            Statement::ShowTables => Ok(ExecOutcome::TableList(
                self.list_tables()?.iter().map(|s| s.to_string()).collect(),
            )),
            Statement::CreateTable(create) => {
                self.create_table(
                    &create.name,
                    Schema {
                        columns: create.columns,
                    },
                )?;
                Ok(ExecOutcome::CreatedTable(create.name))
            }
            Statement::DropTable { name } => {
                self.drop_table(&name)?;
                Ok(ExecOutcome::DroppedTable(name))
            }
            Statement::Insert(insert) => {
                self.insert(&insert.table, insert.columns.as_deref(), &insert.values)?;
                Ok(ExecOutcome::Inserted {
                    table: insert.table,
                })
            }
            Statement::Select(select) => Ok(ExecOutcome::Selected(self.select(
                &select.tables,
                &select.projection,
                select.condition.as_ref(),
            )?)),
            Statement::Update(update) => {
                let rows = self.update(&update.table, &update.assignments, update.condition.as_ref())?;
                Ok(ExecOutcome::Updated {
                    table: update.table,
                    rows,
                })
            }
            Statement::Delete(delete) => {
                let rows = self.delete(&delete.table, delete.condition.as_ref())?;
                Ok(ExecOutcome::Deleted {
                    table: delete.table,
                    rows,
                })
            }
            Statement::Exit => Ok(ExecOutcome::Exit),
        }
    }

    /// Inserts one row, aligning the given values with the table's schema.
    ///
    /// The alignment handles three cases:
    /// 1. No column list: values map positionally; missing trailing columns
    ///    take their default (absent string for CHAR columns, `0` otherwise)
    ///    and surplus values are discarded.
    /// 2. A column list: each schema column takes the value at its name's
    ///    position in the list (case-insensitive, first occurrence wins), or
    ///    its default when the name is missing or has no matching value.
    ///    List names that match no schema column are ignored.
    /// 3. An empty value list inserts nothing and succeeds.
    ///
    /// The stored values never alias the caller's; the new row lands at the
    /// front of the table.
    ///
    /// # Errors
    /// Returns [Error::TableNotFound] if the table (or a current database)
    /// cannot be resolved.
    pub fn insert(
        &mut self,
        table: &str,
        columns: Option<&[String]>,
        values: &[Value],
    ) -> Result<()> {
        let table = self.get_table_mut(table)?;
        if values.is_empty() {
            return Ok(());
        }

        let row_values: Vec<Value> = match columns {
            None => table
                .schema
                .columns
                .iter()
                .enumerate()
                .map(|(index, column)| {
                    values
                        .get(index)
                        .cloned()
                        .unwrap_or_else(|| column.default_value())
                })
                .collect(),
            Some(columns) => table
                .schema
                .columns
                .iter()
                .map(|column| {
                    columns
                        .iter()
                        .position(|name| name.eq_ignore_ascii_case(&column.name))
                        .and_then(|index| values.get(index).cloned())
                        .unwrap_or_else(|| column.default_value())
                })
                .collect(),
        };

        debug!(table = %table.name, "insert row");
        table.insert_row(Row { values: row_values });
        Ok(())
    }

    /// Runs a SELECT over one or more tables of the current database.
    ///
    /// # Errors
    /// Returns [Error::NoTableSpecified] for an empty FROM-list,
    /// [Error::TableNotFound] for an unresolved table,
    /// [Error::FieldNotFound] for an unresolved projection name (the whole
    /// statement aborts, no partial output), and [Error::TooManyTables] /
    /// [Error::TooManyFields] when a bound is exceeded.
    pub fn select(
        &self,
        tables: &[String],
        projection: &Projection,
        condition: Option<&Condition>,
    ) -> Result<QueryResult> {
        match tables {
            [] => Err(Error::NoTableSpecified),
            [table] => self.select_single(table, projection, condition),
            _ => self.select_multi(tables, projection, condition),
        }
    }

    fn select_single(
        &self,
        table: &str,
        projection: &Projection,
        condition: Option<&Condition>,
    ) -> Result<QueryResult> {
        let table = self.get_table(table)?;

        // Resolve the projection before visiting any row; an unknown name
        // aborts the whole statement.
        let (labels, positions): (Vec<String>, Vec<usize>) = match projection {
            Projection::All => (
                table
                    .schema
                    .columns
                    .iter()
                    .map(|column| column.name.clone())
                    .collect(),
                (0..table.schema.columns.len()).collect(),
            ),
            Projection::Columns(names) => {
                let mut positions = Vec::with_capacity(names.len());
                for name in names {
                    positions.push(
                        table
                            .schema
                            .position(name)
                            .ok_or_else(|| Error::FieldNotFound(name.clone()))?,
                    );
                }
                (names.clone(), positions)
            }
        };

        let rows = table
            .rows
            .iter()
            .filter(|row| condition::evaluate_single(row, &table.schema, condition))
            .map(|row| {
                positions
                    .iter()
                    .map(|&position| {
                        row.values
                            .get(position)
                            .cloned()
                            .unwrap_or(Value::Str(None))
                    })
                    .collect()
            })
            .collect();

        Ok(QueryResult {
            columns: labels,
            rows,
        })
    }

    fn select_multi(
        &self,
        names: &[String],
        projection: &Projection,
        condition: Option<&Condition>,
    ) -> Result<QueryResult> {
        if names.len() > MAX_SELECT_TABLES {
            return Err(Error::TooManyTables(names.len()));
        }

        let mut tables = Vec::with_capacity(names.len());
        for name in names {
            tables.push(self.get_table(name)?);
        }

        // Every projected field resolves to a (table, column) index pair
        // before enumeration begins; ambiguous names take the first table in
        // FROM-list order that knows them.
        let (labels, fields): (Vec<String>, Vec<(usize, usize)>) = match projection {
            Projection::All => {
                let mut labels = Vec::new();
                let mut fields = Vec::new();
                for (table_index, table) in tables.iter().enumerate() {
                    for (column_index, column) in table.schema.columns.iter().enumerate() {
                        labels.push(column.name.clone());
                        fields.push((table_index, column_index));
                    }
                }
                (labels, fields)
            }
            Projection::Columns(names) => {
                if names.len() > MAX_SELECT_FIELDS {
                    return Err(Error::TooManyFields(names.len()));
                }
                let mut labels = Vec::with_capacity(names.len());
                let mut fields = Vec::with_capacity(names.len());
                for name in names {
                    let field = tables
                        .iter()
                        .enumerate()
                        .find_map(|(table_index, table)| {
                            table
                                .schema
                                .position(name)
                                .map(|column_index| (table_index, column_index))
                        })
                        .ok_or_else(|| Error::FieldNotFound(name.clone()))?;
                    labels.push(name.clone());
                    fields.push(field);
                }
                (labels, fields)
            }
        };

        let mut result_rows: Vec<Vec<Value>> = Vec::new();
        if tables.iter().any(|table| table.rows.is_empty()) {
            return Ok(QueryResult {
                columns: labels,
                rows: result_rows,
            });
        }

        // Odometer over per-table row indices: the last table spins fastest,
        // making the first table the outermost loop.
        let mut indices = vec![0usize; tables.len()];
        'scan: loop {
            let tuple: Vec<&Row> = indices
                .iter()
                .zip(&tables)
                .map(|(&index, table)| &table.rows[index])
                .collect();

            if condition::evaluate_multi(&tuple, &tables, condition) {
                result_rows.push(
                    fields
                        .iter()
                        .map(|&(table_index, column_index)| {
                            tuple[table_index]
                                .values
                                .get(column_index)
                                .cloned()
                                .unwrap_or(Value::Str(None))
                        })
                        .collect(),
                );
            }

            let mut level = tables.len() - 1;
            loop {
                indices[level] += 1;
                if indices[level] < tables[level].rows.len() {
                    break;
                }
                indices[level] = 0;
                if level == 0 {
                    break 'scan;
                }
                level -= 1;
            }
        }

        Ok(QueryResult {
            columns: labels,
            rows: result_rows,
        })
    }

    /// Applies assignments to every row matching the condition.
    ///
    /// Each assignment resolves its target column by name; an unknown target
    /// is skipped, and so is an assignment whose literal kind differs from
    /// the stored value's kind. Skips never fail the row or the statement, so
    /// partial application within a row is expected.
    ///
    /// Returns the number of rows that matched the condition.
    ///
    /// # Errors
    /// Returns [Error::TableNotFound] if the table cannot be resolved.
    pub fn update(
        &mut self,
        table: &str,
        assignments: &[Assignment],
        condition: Option<&Condition>,
    ) -> Result<usize> {
        let table = self.get_table_mut(table)?;
        let schema = &table.schema;

        let mut matched = 0;
        for row in table.rows.iter_mut() {
            if !condition::evaluate_single(row, schema, condition) {
                continue;
            }
            matched += 1;
            for assignment in assignments {
                let Some(index) = schema.position(&assignment.column) else {
                    continue;
                };
                let Some(stored) = row.values.get_mut(index) else {
                    continue;
                };
                if stored.kind() == assignment.value.kind() {
                    *stored = assignment.value.clone();
                }
            }
        }

        debug!(table = %table.name, matched, "update");
        Ok(matched)
    }

    /// Removes every row matching the condition; the remaining rows keep
    /// their relative order. Returns the number of rows removed.
    ///
    /// # Errors
    /// Returns [Error::TableNotFound] if the table cannot be resolved.
    pub fn delete(&mut self, table: &str, condition: Option<&Condition>) -> Result<usize> {
        let table = self.get_table_mut(table)?;
        let schema = &table.schema;

        let before = table.rows.len();
        table
            .rows
            .retain(|row| !condition::evaluate_single(row, schema, condition));
        let removed = before - table.rows.len();

        debug!(table = %table.name, removed, "delete");
        Ok(removed)
    }
}
