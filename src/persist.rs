//! Whole-catalog persistence to a line-oriented text file.
//!
//! The format is one marker line per object:
//!
//! ```text
//! DB <name>
//! TABLE <name>
//! COLS <n>
//! <column-name> <type-label>     (n lines)
//! ROW <cell> <cell> ...          (one line per row)
//! ```
//!
//! A cell is `I <integer>`, `S <token>` for a present string, or `N` for an
//! absent string. String tokens are written raw: a stored string containing
//! whitespace is split by the reader and comes back truncated at its first
//! space. Loading replays every row through the regular insert path, which
//! prepends, so database, table and row order each reverse once per
//! save/load cycle.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Lines, Write};
use std::path::Path;

use tracing::info;

use crate::catalog::Catalog;
use crate::error::{Error, Result};
use crate::table::{ColumnDef, Schema};
use crate::value::Value;

/// Where the shell reads and writes the catalog by default.
pub const DEFAULT_PATH: &str = "data.db";

/// Writes the entire catalog to `path`, overwriting any previous file.
///
/// Databases, tables and rows are written in their current in-memory order
/// (most-recently-created-first).
///
/// # Errors
/// Returns [Error::Io] if the file cannot be created or written.
pub fn save(catalog: &Catalog, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    for database in catalog.databases() {
        writeln!(writer, "DB {}", database.name)?;
        for table in database.tables() {
            writeln!(writer, "TABLE {}", table.name)?;
            writeln!(writer, "COLS {}", table.schema.columns.len())?;
            for column in &table.schema.columns {
                writeln!(writer, "{} {}", column.name, column.data_type)?;
            }
            for row in &table.rows {
                write!(writer, "ROW")?;
                for value in &row.values {
                    match value {
                        Value::Int(n) => write!(writer, " I {n}")?,
                        Value::Str(Some(s)) => write!(writer, " S {s}")?,
                        Value::Str(None) => write!(writer, " N")?,
                    }
                }
                writeln!(writer)?;
            }
        }
    }

    writer.flush()?;
    info!(path = %path.display(), "catalog saved");
    Ok(())
}

/// Replays a saved file into `catalog`.
///
/// Each `DB` marker creates the database if needed and selects it; each
/// `TABLE` block creates its table under the selected database; each `ROW`
/// line is re-inserted through [Catalog::insert]. After a successful load the
/// current database is the last one named in the file.
///
/// # Errors
/// Returns [Error::PersistParse] with the offending line number for any
/// malformed or truncated input. The table being loaded when the error hit is
/// discarded; everything loaded before it is kept.
pub fn load_into(catalog: &mut Catalog, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let mut cursor = Cursor {
        lines: BufReader::new(file).lines(),
        line_no: 0,
    };

    // Table currently receiving ROW lines; dropped if its block fails.
    let mut load_target: Option<String> = None;

    let result = replay(catalog, &mut cursor, &mut load_target);
    match result {
        Ok(()) => {
            info!(path = %path.display(), "catalog loaded");
            Ok(())
        }
        Err(e) => {
            if let Some(table) = load_target {
                let _ = catalog.drop_table(&table);
            }
            Err(e)
        }
    }
}

/// Line reader that tracks the 1-based number of the last line it returned.
struct Cursor<B> {
    lines: Lines<B>,
    line_no: usize,
}

impl<B: BufRead> Cursor<B> {
    fn next_line(&mut self) -> Result<Option<String>> {
        match self.lines.next() {
            Some(line) => {
                self.line_no += 1;
                Ok(Some(line?))
            }
            None => Ok(None),
        }
    }

    fn error(&self, message: impl Into<String>) -> Error {
        Error::PersistParse {
            line: self.line_no,
            message: message.into(),
        }
    }
}

fn replay(
    catalog: &mut Catalog,
    cursor: &mut Cursor<impl BufRead>,
    load_target: &mut Option<String>,
) -> Result<()> {
    while let Some(line) = cursor.next_line()? {
        if line.is_empty() {
            continue;
        }

        if let Some(name) = line.strip_prefix("DB ") {
            *load_target = None;
            if catalog.find_database(name).is_none() {
                catalog.create_database(name)?;
            }
            catalog.use_database(name)?;
        } else if let Some(name) = line.strip_prefix("TABLE ") {
            // Reaching the next marker means the previous table is complete.
            *load_target = None;
            let schema = read_schema(cursor)?;
            catalog.create_table(name, schema)?;
            *load_target = Some(name.to_string());
        } else if line == "ROW" || line.starts_with("ROW ") {
            let Some(table) = load_target.as_deref() else {
                return Err(cursor.error("ROW before any TABLE"));
            };
            let width = catalog.get_table(table)?.schema.columns.len();
            let values = parse_cells(cursor, line.split_whitespace().skip(1), width)?;
            catalog.insert(table, None, &values)?;
        } else {
            return Err(cursor.error(format!("unrecognized line {line:?}")));
        }
    }
    Ok(())
}

/// Reads the `COLS <n>` line and the `n` column definition lines that follow it.
fn read_schema(cursor: &mut Cursor<impl BufRead>) -> Result<Schema> {
    let Some(line) = cursor.next_line()? else {
        return Err(cursor.error("unexpected end of file, expected COLS"));
    };
    let Some(count) = line.strip_prefix("COLS ") else {
        return Err(cursor.error(format!("expected COLS, found {line:?}")));
    };
    let count: usize = count
        .parse()
        .map_err(|_| cursor.error(format!("invalid column count {count:?}")))?;

    let mut columns = Vec::with_capacity(count);
    for _ in 0..count {
        let Some(line) = cursor.next_line()? else {
            return Err(cursor.error("unexpected end of file in column list"));
        };
        let Some((name, data_type)) = line.split_once(' ') else {
            return Err(cursor.error(format!("malformed column definition {line:?}")));
        };
        columns.push(ColumnDef {
            name: name.to_string(),
            data_type: data_type.to_string(),
        });
    }
    Ok(Schema { columns })
}

/// Decodes one tagged cell per schema column from a `ROW` line's tokens.
/// Tokens left over after the last cell are dropped, like the raw token
/// stream they come from.
fn parse_cells<'a>(
    cursor: &Cursor<impl BufRead>,
    mut tokens: impl Iterator<Item = &'a str>,
    width: usize,
) -> Result<Vec<Value>> {
    let mut values = Vec::with_capacity(width);
    for _ in 0..width {
        let tag = tokens
            .next()
            .ok_or_else(|| cursor.error("row has fewer cells than columns"))?;
        let value = match tag {
            "I" => {
                let token = tokens
                    .next()
                    .ok_or_else(|| cursor.error("integer cell missing its value"))?;
                let n: i64 = token
                    .parse()
                    .map_err(|_| cursor.error(format!("invalid integer cell {token:?}")))?;
                Value::Int(n)
            }
            "S" => {
                let token = tokens
                    .next()
                    .ok_or_else(|| cursor.error("string cell missing its value"))?;
                Value::string(token)
            }
            "N" => Value::Str(None),
            other => return Err(cursor.error(format!("unknown cell tag {other:?}"))),
        };
        values.push(value);
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::ColumnDef;

    fn shop_catalog() -> Catalog {
        let mut catalog = Catalog::default();
        catalog.create_database("shop").unwrap();
        catalog.use_database("shop").unwrap();
        catalog
            .create_table(
                "users",
                Schema {
                    columns: vec![
                        ColumnDef {
                            name: "id".into(),
                            data_type: "INT".into(),
                        },
                        ColumnDef {
                            name: "name".into(),
                            data_type: "CHAR(10)".into(),
                        },
                    ],
                },
            )
            .unwrap();
        catalog
    }

    #[test]
    fn test_save_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.db");

        let mut catalog = shop_catalog();
        catalog
            .insert("users", None, &[Value::Int(1), Value::string("Alice")])
            .unwrap();
        catalog.insert("users", None, &[Value::Int(2)]).unwrap();

        save(&catalog, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "DB shop\n\
             TABLE users\n\
             COLS 2\n\
             id INT\n\
             name CHAR(10)\n\
             ROW I 2 N\n\
             ROW I 1 S Alice\n"
        );
    }

    #[test]
    fn test_round_trip_reverses_row_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.db");

        let mut catalog = shop_catalog();
        for n in 1..=3 {
            catalog
                .insert("users", None, &[Value::Int(n), Value::string("x")])
                .unwrap();
        }
        // Most recent first in memory.
        let ids: Vec<&Value> = catalog
            .get_table("users")
            .unwrap()
            .rows
            .iter()
            .map(|r| &r.values[0])
            .collect();
        assert_eq!(ids, [&Value::Int(3), &Value::Int(2), &Value::Int(1)]);

        save(&catalog, &path).unwrap();
        let mut reloaded = Catalog::default();
        load_into(&mut reloaded, &path).unwrap();

        let ids: Vec<&Value> = reloaded
            .get_table("users")
            .unwrap()
            .rows
            .iter()
            .map(|r| &r.values[0])
            .collect();
        assert_eq!(ids, [&Value::Int(1), &Value::Int(2), &Value::Int(3)]); // reversed once

        save(&reloaded, &path).unwrap();
        let mut again = Catalog::default();
        load_into(&mut again, &path).unwrap();

        let ids: Vec<&Value> = again
            .get_table("users")
            .unwrap()
            .rows
            .iter()
            .map(|r| &r.values[0])
            .collect();
        assert_eq!(ids, [&Value::Int(3), &Value::Int(2), &Value::Int(1)]); // and back
    }

    #[test]
    fn test_round_trip_preserves_values_and_reverses_databases() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.db");

        let mut catalog = shop_catalog();
        catalog
            .insert("users", None, &[Value::Int(-5), Value::Str(None)])
            .unwrap();
        catalog.create_database("blog").unwrap();
        assert_eq!(catalog.list_databases(), ["blog", "shop"]);

        save(&catalog, &path).unwrap();
        let mut reloaded = Catalog::default();
        load_into(&mut reloaded, &path).unwrap();

        assert_eq!(reloaded.list_databases(), ["shop", "blog"]); // reversed once
        reloaded.use_database("shop").unwrap();
        let row = &reloaded.get_table("users").unwrap().rows[0];
        assert_eq!(row.values, [Value::Int(-5), Value::Str(None)]);
    }

    #[test]
    fn test_string_with_whitespace_truncates_on_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.db");

        let mut catalog = shop_catalog();
        catalog
            .insert("users", None, &[Value::Int(1), Value::string("Bob Dylan")])
            .unwrap();

        save(&catalog, &path).unwrap();
        let mut reloaded = Catalog::default();
        load_into(&mut reloaded, &path).unwrap();

        let row = &reloaded.get_table("users").unwrap().rows[0];
        assert_eq!(row.values[1], Value::string("Bob")); // lossy, not an error
    }

    #[test]
    fn test_row_before_table_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.db");
        std::fs::write(&path, "DB shop\nROW I 1\n").unwrap();

        let mut catalog = Catalog::default();
        let err = load_into(&mut catalog, &path).unwrap_err();
        assert!(matches!(err, Error::PersistParse { line: 2, .. }));
    }

    #[test]
    fn test_unrecognized_line_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.db");
        std::fs::write(&path, "GARBAGE\n").unwrap();

        let mut catalog = Catalog::default();
        let err = load_into(&mut catalog, &path).unwrap_err();
        assert!(matches!(err, Error::PersistParse { line: 1, .. }));
    }

    #[test]
    fn test_corrupt_row_discards_only_its_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.db");
        std::fs::write(
            &path,
            "DB shop\n\
             TABLE a\n\
             COLS 1\n\
             x INT\n\
             ROW I 1\n\
             TABLE b\n\
             COLS 1\n\
             y INT\n\
             ROW I oops\n",
        )
        .unwrap();

        let mut catalog = Catalog::default();
        let err = load_into(&mut catalog, &path).unwrap_err();
        assert!(matches!(err, Error::PersistParse { line: 9, .. }));

        // Everything before the bad row survives; table b is gone.
        assert!(catalog.find_database("shop").is_some());
        assert_eq!(catalog.get_table("a").unwrap().rows.len(), 1);
        assert!(catalog.get_table("b").is_err());
    }

    #[test]
    fn test_truncated_column_list_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.db");
        std::fs::write(&path, "DB shop\nTABLE a\nCOLS 2\nx INT\n").unwrap();

        let mut catalog = Catalog::default();
        let err = load_into(&mut catalog, &path).unwrap_err();
        assert!(matches!(err, Error::PersistParse { line: 4, .. }));

        // The table never came into being, but the database did.
        assert!(catalog.find_database("shop").is_some());
        assert!(catalog.list_tables().unwrap().is_empty());
    }

    #[test]
    fn test_bad_cell_tag_discards_the_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.db");
        std::fs::write(&path, "DB shop\nTABLE a\nCOLS 1\nx INT\nROW X 1\n").unwrap();

        let mut catalog = Catalog::default();
        let err = load_into(&mut catalog, &path).unwrap_err();
        assert!(matches!(err, Error::PersistParse { line: 5, .. }));
        assert!(catalog.get_table("a").is_err());
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.db");
        std::fs::write(&path, "DB shop\n\nTABLE a\nCOLS 1\nx INT\n\nROW I 7\n").unwrap();

        let mut catalog = Catalog::default();
        load_into(&mut catalog, &path).unwrap();
        assert_eq!(catalog.get_table("a").unwrap().rows.len(), 1);
    }

    #[test]
    fn test_duplicate_db_marker_reselects() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.db");
        std::fs::write(&path, "DB shop\nDB blog\nDB shop\n").unwrap();

        let mut catalog = Catalog::default();
        load_into(&mut catalog, &path).unwrap();
        assert_eq!(catalog.list_databases().len(), 2);
        let current = catalog.current_database().map(|db| db.name.as_str());
        assert_eq!(current, Some("shop"));
    }
}
