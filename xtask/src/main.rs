// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! # xtask - Project Automation
//!
//! Run with `cargo xtask <command>`.
//!
//! - `ci` runs lint, build, test, and schema verification in order
//! - `verify-schema` applies the embedded migrations to a scratch in-memory
//!   database and checks the constraints the ledger relies on
//!
//! Standard `cargo test` remains fast and infrastructure-free.

#![deny(
    clippy::pedantic,
    //clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

use std::{io, process::Output};

use cargo_metadata::MetadataCommand;
use clap::{Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use color_eyre::{eyre::Context, eyre::eyre, Result};
use diesel::sql_types::{Integer, Text};
use diesel::{Connection, QueryableByName, RunQueryDsl, SqliteConnection};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use duct::cmd;
use tracing::level_filters::LevelFilter;
use tracing_log::AsTrace;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("../crates/persistence/migrations");

/// Tables the persistence layer expects.
const EXPECTED_TABLES: &[&str] = &["booking_policies", "reservations", "users"];

/// A partial unique index the ledger depends on for correctness.
struct RequiredIndex {
    table: &'static str,
    name: &'static str,
    columns: &'static [&'static str],
    /// A fragment the index's `WHERE` clause must contain.
    predicate: &'static str,
}

const REQUIRED_INDEXES: &[RequiredIndex] = &[
    RequiredIndex {
        table: "booking_policies",
        name: "idx_booking_policies_single_active",
        columns: &["is_active"],
        predicate: "is_active = 1",
    },
    RequiredIndex {
        table: "reservations",
        name: "idx_reservations_active_slot",
        columns: &["booking_date", "booking_time"],
        predicate: "'upcoming'",
    },
];

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(args.log_level())
        .without_time()
        .init();

    match args.run() {
        Ok(()) => (),
        Err(err) => {
            tracing::error!("{err}");
            std::process::exit(1);
        }
    }
    Ok(())
}

#[derive(Debug, Parser)]
#[command(bin_name = "cargo xtask", styles = clap_cargo::style::CLAP_STYLING)]
struct Args {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    verbosity: Verbosity<InfoLevel>,
}

impl Args {
    fn run(self) -> Result<()> {
        self.command.run()
    }

    fn log_level(&self) -> LevelFilter {
        self.verbosity.log_level_filter().as_trace()
    }
}

#[derive(Clone, Debug, Subcommand)]
enum Command {
    /// Run CI checks (lint, build, test, verify-schema)
    CI,

    /// Build the project
    #[command(visible_alias = "b")]
    Build,

    /// Run cargo check
    #[command(visible_alias = "c")]
    Check,

    /// Generate code coverage report
    #[command(visible_alias = "cov")]
    Coverage,

    /// Lint formatting, clippy, and docs
    #[command(visible_alias = "l")]
    Lint,

    /// Run clippy on the project
    #[command(visible_alias = "cl")]
    LintClippy,

    /// Check documentation for errors and warnings
    #[command(visible_alias = "d")]
    LintDocs,

    /// Check for formatting issues in the project
    #[command(visible_alias = "lf")]
    LintFormatting,

    /// Fix clippy warnings in the project
    #[command(visible_alias = "fc")]
    FixClippy,

    /// Fix formatting issues in the project
    #[command(visible_alias = "fmt")]
    FixFormatting,

    /// Run tests
    #[command(visible_alias = "t")]
    Test,

    /// Run doc tests
    #[command(visible_alias = "td")]
    TestDocs,

    /// Run lib tests
    #[command(visible_alias = "tl")]
    TestLibs,

    /// Verify the migrated schema carries the ledger's constraints
    #[command(visible_alias = "vs")]
    VerifySchema,
}

impl Command {
    fn run(self) -> Result<()> {
        match self {
            Self::CI => ci(),
            Self::Build => build(),
            Self::Check => check(),
            Self::Coverage => coverage(),
            Self::Lint => lint(),
            Self::LintClippy => lint_clippy(),
            Self::LintDocs => lint_docs(),
            Self::LintFormatting => lint_format(),
            Self::FixClippy => fix_clippy(),
            Self::FixFormatting => fix_format(),
            Self::Test => test(),
            Self::TestDocs => test_docs(),
            Self::TestLibs => test_libs(),
            Self::VerifySchema => verify_schema(),
        }
    }
}

/// Run CI checks (lint, build, test, verify-schema)
fn ci() -> Result<()> {
    lint()?;
    build()?;
    test()?;
    verify_schema()?;
    Ok(())
}

/// Build the project
fn build() -> Result<()> {
    run_cargo(vec!["build", "--all-targets", "--all-features"])
}

/// Run cargo check
fn check() -> Result<()> {
    run_cargo(vec!["check", "--all-targets", "--all-features"])
}

/// Generate code coverage report
fn coverage() -> Result<()> {
    run_cargo(vec![
        "llvm-cov",
        "--lcov",
        "--output-path",
        "target/lcov.info",
        "--all-features",
    ])
}

/// Lint formatting, clippy, and docs
fn lint() -> Result<()> {
    lint_clippy()?;
    lint_docs()?;
    lint_format()?;
    Ok(())
}

/// Run clippy on the project
fn lint_clippy() -> Result<()> {
    run_cargo(vec![
        "clippy",
        "--all-targets",
        "--all-features",
        "--",
        "-D",
        "warnings",
    ])
}

/// Fix clippy warnings in the project
fn fix_clippy() -> Result<()> {
    run_cargo(vec![
        "clippy",
        "--all-targets",
        "--all-features",
        "--fix",
        "--allow-dirty",
        "--allow-staged",
        "--",
        "-D",
        "warnings",
    ])
}

/// Check that docs build without errors using docs.rs-equivalent flags
fn lint_docs() -> Result<()> {
    let meta = MetadataCommand::new()
        .exec()
        .wrap_err("failed to get cargo metadata")?;

    for package in meta.workspace_default_packages() {
        cmd(
            "cargo",
            [
                "doc",
                "--no-deps",
                "--all-features",
                "--package",
                &package.name,
            ],
        )
        .env_remove("CARGO")
        .env("RUSTUP_TOOLCHAIN", "nightly")
        .env("RUSTDOCFLAGS", "--cfg docsrs -D warnings")
        .run_with_trace()?;
    }

    Ok(())
}

/// Lint formatting issues in the project
fn lint_format() -> Result<()> {
    run_cargo_nightly(vec!["fmt", "--all", "--check"])
}

/// Fix formatting issues in the project
fn fix_format() -> Result<()> {
    run_cargo_nightly(vec!["fmt", "--all"])
}

/// Run lib and doc tests
fn test() -> Result<()> {
    test_libs()?;
    test_docs()?; // run last because it's slow
    Ok(())
}

/// Run doc tests for the workspace's default packages
fn test_docs() -> Result<()> {
    run_cargo(vec!["test", "--doc", "--all-features"])
}

/// Run lib tests for the workspace's default packages
fn test_libs() -> Result<()> {
    run_cargo(vec!["test", "--all-targets", "--all-features"])
}

/// Run a cargo subcommand with the default toolchain
fn run_cargo(args: Vec<&str>) -> Result<()> {
    cmd("cargo", args).run_with_trace()?;
    Ok(())
}

/// Run a cargo subcommand with the nightly toolchain
fn run_cargo_nightly(args: Vec<&str>) -> Result<()> {
    cmd("cargo", args)
        // CARGO env var is set because we're running in a cargo subcommand
        .env_remove("CARGO")
        .env("RUSTUP_TOOLCHAIN", "nightly")
        .run_with_trace()?;
    Ok(())
}

#[derive(QueryableByName)]
struct TableName {
    #[diesel(sql_type = Text)]
    name: String,
}

#[derive(QueryableByName)]
struct IndexInfo {
    #[diesel(sql_type = Text)]
    name: String,
    #[diesel(sql_type = Integer)]
    unique: i32,
    #[diesel(sql_type = Integer)]
    partial: i32,
}

#[derive(QueryableByName)]
struct IndexColumnInfo {
    #[diesel(sql_type = Text)]
    name: String,
}

#[derive(QueryableByName)]
struct IndexSql {
    #[diesel(sql_type = Text)]
    sql: String,
}

#[derive(QueryableByName)]
struct ForeignKeysPragma {
    #[diesel(sql_type = Integer)]
    foreign_keys: i32,
}

/// Verify the migrated schema carries the ledger's constraints
///
/// Applies the embedded migrations to a scratch in-memory `SQLite` database
/// and checks that:
///
/// 1. Every expected table exists
/// 2. The single-active-policy and active-slot indexes are unique and partial
/// 3. Foreign keys are enforced on the connection
///
/// # Errors
///
/// Returns an error if migrations fail to apply or any check fails.
fn verify_schema() -> Result<()> {
    tracing::info!("Applying migrations to a scratch database");

    let mut conn = SqliteConnection::establish(":memory:")
        .wrap_err("Failed to create SQLite in-memory database")?;

    diesel::sql_query("PRAGMA foreign_keys = ON")
        .execute(&mut conn)
        .wrap_err("Failed to enable foreign keys")?;

    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| eyre!("Failed to apply migrations: {e}"))?;

    verify_tables(&mut conn)?;
    for index in REQUIRED_INDEXES {
        verify_index(&mut conn, index)?;
    }

    let pragma: Vec<ForeignKeysPragma> = diesel::sql_query("PRAGMA foreign_keys")
        .load(&mut conn)
        .wrap_err("Failed to read foreign_keys pragma")?;
    if pragma.first().map(|p| p.foreign_keys) != Some(1) {
        return Err(eyre!("Foreign key enforcement is not enabled"));
    }

    tracing::info!("✓ Schema verification passed");
    Ok(())
}

fn verify_tables(conn: &mut SqliteConnection) -> Result<()> {
    let tables: Vec<TableName> = diesel::sql_query(
        "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' AND name != '__diesel_schema_migrations' ORDER BY name",
    )
    .load(conn)
    .wrap_err("Failed to query tables")?;

    let names: Vec<&str> = tables.iter().map(|t| t.name.as_str()).collect();
    for expected in EXPECTED_TABLES {
        if !names.contains(expected) {
            return Err(eyre!("Missing table '{expected}' (found {names:?})"));
        }
    }
    tracing::info!(?names, "Tables present");
    Ok(())
}

fn verify_index(conn: &mut SqliteConnection, required: &RequiredIndex) -> Result<()> {
    let indexes: Vec<IndexInfo> =
        diesel::sql_query(format!("PRAGMA index_list({})", required.table))
            .load(conn)
            .wrap_err(format!("Failed to get indexes for table {}", required.table))?;

    let index: &IndexInfo = indexes
        .iter()
        .find(|i| i.name == required.name)
        .ok_or_else(|| eyre!("Missing index '{}' on {}", required.name, required.table))?;

    if index.unique != 1 {
        return Err(eyre!("Index '{}' is not unique", required.name));
    }
    if index.partial != 1 {
        return Err(eyre!("Index '{}' is not partial", required.name));
    }

    let columns: Vec<IndexColumnInfo> =
        diesel::sql_query(format!("PRAGMA index_info({})", required.name))
            .load(conn)
            .wrap_err(format!("Failed to get index columns for {}", required.name))?;
    let columns: Vec<String> = columns.into_iter().map(|c| c.name).collect();
    if columns != required.columns {
        return Err(eyre!(
            "Index '{}' covers {columns:?}, expected {:?}",
            required.name,
            required.columns
        ));
    }

    let sql: Vec<IndexSql> = diesel::sql_query(format!(
        "SELECT sql FROM sqlite_master WHERE type='index' AND name='{}'",
        required.name
    ))
    .load(conn)
    .wrap_err(format!("Failed to read definition of {}", required.name))?;
    let definition: &str = sql.first().map_or("", |s| s.sql.as_str());
    if !definition.contains(required.predicate) {
        return Err(eyre!(
            "Index '{}' predicate does not mention {}: {definition}",
            required.name,
            required.predicate
        ));
    }

    tracing::info!(index = required.name, ?columns, "Partial unique index present");
    Ok(())
}

/// An extension trait for `duct::Expression` that logs the command being run
/// before running it.
trait ExpressionExt {
    /// Run the command and log the command being run
    fn run_with_trace(&self) -> io::Result<Output>;
}

impl ExpressionExt for duct::Expression {
    fn run_with_trace(&self) -> io::Result<Output> {
        tracing::info!("running command: {:?}", self);
        self.run().inspect_err(|_| {
            // The command that was run may have scrolled off the screen, so repeat it here
            tracing::error!("failed to run command: {:?}", self);
        })
    }
}
