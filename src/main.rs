//! minidb interactive shell
//!
//! ```bash
//! # Start the prompt loop against the default persistence file
//! minidb
//!
//! # Use another persistence file
//! minidb --file /tmp/scratch.db
//!
//! # Execute a single statement and exit (never saves)
//! minidb --query "SELECT * FROM users"
//! ```

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use minidb::{Catalog, ExecOutcome, QueryResult, parser, persist};

/// In-memory relational store with a SQL-like statement shell
#[derive(Parser, Debug)]
#[command(name = "minidb", version, about = "In-memory relational store with a SQL-like shell")]
struct Args {
    /// Persistence file loaded at startup and written by EXIT
    #[arg(long, value_name = "PATH", default_value = persist::DEFAULT_PATH)]
    file: PathBuf,

    /// Execute a single statement, print its output and exit without saving
    #[arg(long, value_name = "STATEMENT")]
    query: Option<String>,
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let args = Args::parse();
    init_logging();

    let mut catalog = Catalog::new();
    if args.file.exists() {
        // A bad file keeps whatever prefix loaded cleanly.
        if let Err(e) = persist::load_into(&mut catalog, &args.file) {
            eprintln!("WARNING: could not load {}: {e}", args.file.display());
        }
    }

    // Every session starts inside a usable database.
    if catalog.find_database("default").is_none() {
        catalog.create_database("default")?;
    }
    catalog.use_database("default")?;

    if let Some(query) = &args.query {
        run_query(&mut catalog, query)
    } else {
        run_shell(&mut catalog, &args.file)
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run_query(catalog: &mut Catalog, query: &str) -> Result<()> {
    let statement = parser::parse(query)?;
    let outcome = catalog.execute(statement)?;
    print_outcome(&outcome);
    Ok(())
}

fn run_shell(catalog: &mut Catalog, file: &Path) -> Result<()> {
    let mut stdin = io::stdin().lock();
    let mut input = String::new();

    loop {
        print!("minidb> ");
        io::stdout().flush()?;

        input.clear();
        if stdin.read_line(&mut input)? == 0 {
            // EOF ends the session without saving.
            break;
        }
        let line = input.trim();
        if line.is_empty() {
            continue;
        }

        match parser::parse(line).and_then(|statement| catalog.execute(statement)) {
            Ok(ExecOutcome::Exit) => {
                persist::save(catalog, file)?;
                break;
            }
            Ok(outcome) => print_outcome(&outcome),
            Err(e) => eprintln!("ERROR: {e}"),
        }
    }

    Ok(())
}

fn print_outcome(outcome: &ExecOutcome) {
    match outcome {
        ExecOutcome::CreatedDatabase(name) => println!("Created database: {name}"),
        ExecOutcome::UsingDatabase(name) => println!("Using database: {name}"),
        ExecOutcome::DroppedDatabase(name) => println!("Dropped database: {name}"),
        ExecOutcome::CreatedTable(name) => println!("Created table: {name}"),
        ExecOutcome::DroppedTable(name) => println!("Dropped table: {name}"),
        ExecOutcome::DatabaseList(names) => print_name_list("Databases:", names),
        ExecOutcome::TableList(names) => print_name_list("Tables:", names),
        ExecOutcome::Inserted { table } => println!("Inserted into {table}"),
        ExecOutcome::Updated { table, rows } => println!("Updated {rows} row(s) in {table}"),
        ExecOutcome::Deleted { table, rows } => println!("Deleted {rows} row(s) from {table}"),
        ExecOutcome::Selected(result) => print_table(result),
        ExecOutcome::Exit => {}
    }
}

fn print_name_list(banner: &str, names: &[String]) {
    println!("{banner}");
    for name in names {
        println!("{name:>12}");
    }
}

/// Renders a result set as right-aligned 12-character cells: one header line
/// of column labels, then one line per row.
fn print_table(result: &QueryResult) {
    let mut header = String::new();
    for column in &result.columns {
        header.push_str(&format!("{column:>12}"));
    }
    println!("{header}");

    for row in &result.rows {
        let mut line = String::new();
        for value in row {
            line.push_str(&format!("{:>12}", value.to_string()));
        }
        println!("{line}");
    }
}
