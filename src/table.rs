use crate::value::Value;

/// Column definition in the schema: a name plus a free-form type label.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    pub name: String,
    pub data_type: String,
}

impl ColumnDef {
    /// A "CHAR"-prefixed type label (compared ASCII-case-insensitively)
    /// marks a string column; every other label is treated as integer.
    pub fn is_string(&self) -> bool {
        self.data_type
            .get(..4)
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case("CHAR"))
    }

    /// The value a column receives when an insert does not supply one:
    /// absent string for string columns, `0` for everything else.
    pub fn default_value(&self) -> Value {
        if self.is_string() {
            Value::Str(None)
        } else {
            Value::Int(0)
        }
    }
}

#[derive(Debug, Clone)]
pub struct Schema {
    pub columns: Vec<ColumnDef>,
}

impl Schema {
    /// Resolves a column name to its position, case-insensitively.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|column| column.name.eq_ignore_ascii_case(name))
    }
}

/// One stored row; always exactly one value per schema column.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub values: Vec<Value>,
}

pub struct Table {
    pub name: String,
    pub schema: Schema,
    pub rows: Vec<Row>,
}

impl Table {
    pub fn new(name: String, schema: Schema) -> Self {
        Self {
            name,
            schema,
            rows: Vec::new(),
        }
    }

    /// Prepends a row, so the most recently inserted row sits first.
    pub fn insert_row(&mut self, row: Row) {
        debug_assert_eq!(row.values.len(), self.schema.columns.len());
        self.rows.insert(0, row);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users_schema() -> Schema {
        Schema {
            columns: vec![
                ColumnDef {
                    name: "id".into(),
                    data_type: "INT".into(),
                },
                ColumnDef {
                    name: "name".into(),
                    data_type: "CHAR(20)".into(),
                },
            ],
        }
    }

    #[test]
    fn test_table_creation() {
        let table = Table::new("users".into(), users_schema());
        assert_eq!(table.schema.columns.len(), 2);
        assert!(table.rows.is_empty());
    }

    #[test]
    fn test_position_is_case_insensitive() {
        let schema = users_schema();

        assert_eq!(schema.position("id"), Some(0));
        assert_eq!(schema.position("ID"), Some(0));
        assert_eq!(schema.position("Name"), Some(1));
        assert_eq!(schema.position("age"), None);
    }

    #[test]
    fn test_insert_row_prepends() {
        let mut table = Table::new("users".into(), users_schema());

        table.insert_row(Row {
            values: vec![Value::Int(1), Value::string("ada")],
        });
        table.insert_row(Row {
            values: vec![Value::Int(2), Value::string("grace")],
        });

        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].values[0], Value::Int(2));
        assert_eq!(table.rows[1].values[0], Value::Int(1));
    }

    #[test]
    fn test_char_prefix_picks_string_default() {
        let text = ColumnDef {
            name: "a".into(),
            data_type: "CHAR(8)".into(),
        };
        let lower = ColumnDef {
            name: "b".into(),
            data_type: "char".into(),
        };
        let int = ColumnDef {
            name: "c".into(),
            data_type: "INT".into(),
        };
        let odd = ColumnDef {
            name: "d".into(),
            data_type: "DECIMAL".into(),
        };

        assert!(text.is_string());
        assert!(lower.is_string());
        assert!(!int.is_string());
        assert!(!odd.is_string());

        assert_eq!(text.default_value(), Value::Str(None));
        assert_eq!(int.default_value(), Value::Int(0));
    }
}
