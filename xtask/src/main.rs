// Copyright (C) 2024-2025 Fred Clausen and the ratatui project contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! # xtask - Project Automation
//!
//! - `cargo xtask ci` runs lint, deny, machete, build, test and
//!   `verify-schema`
//! - `cargo xtask verify-schema` applies the embedded migrations to a fresh
//!   in-memory `SQLite` database and checks that the scheduling invariants
//!   the engines rely on are enforced by the schema itself: token and client
//!   uniqueness per queue day, the booking overlap triggers, and the
//!   foreign keys between bookings, queue entries and the directory.

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
use color_eyre::{eyre::Context, Result};
use diesel::sql_types::{Integer, Text};
use diesel::{QueryableByName, RunQueryDsl, SqliteConnection};
use duct::cmd;
use std::collections::{BTreeMap, BTreeSet};
use tracing::level_filters::LevelFilter;
use tracing_log::AsTrace;

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
    /// Run CI checks (lint, build, test, schema)
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

    /// Check dependencies
    #[command(visible_alias = "cd")]
    Deny,

    // Check unused dependencies
    #[command(visible_alias = "m")]
    Machete,

    /// Lint formatting, typos, clippy, and docs
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

    /// Lint markdown files
    #[command(visible_alias = "md")]
    LintMarkdown,

    /// Check for typos in the project
    #[command(visible_alias = "lt")]
    LintTypos,

    /// Fix clippy warnings in the project
    #[command(visible_alias = "fc")]
    FixClippy,

    /// Fix formatting issues in the project
    #[command(visible_alias = "fmt")]
    FixFormatting,

    /// Fix typos in the project
    #[command(visible_alias = "typos")]
    FixTypos,

    /// Run tests
    #[command(visible_alias = "t")]
    Test,

    /// Run doc tests
    #[command(visible_alias = "td")]
    TestDocs,

    /// Run lib tests
    #[command(visible_alias = "tl")]
    TestLibs,

    /// Verify the migrated schema enforces overlap and token constraints
    #[command(visible_alias = "vs")]
    VerifySchema,
}

impl Command {
    fn run(self) -> Result<()> {
        match self {
            Self::CI => ci(),
            Self::Build => build(),
            Self::Check => check(),
            Self::Deny => deny(),
            Self::Machete => machete(),
            Self::Coverage => coverage(),
            Self::Lint => lint(),
            Self::LintClippy => lint_clippy(),
            Self::LintDocs => lint_docs(),
            Self::LintFormatting => lint_format(),
            Self::LintTypos => lint_typos(),
            Self::LintMarkdown => lint_markdown(),
            Self::FixClippy => fix_clippy(),
            Self::FixFormatting => fix_format(),
            Self::FixTypos => fix_typos(),
            Self::Test => test(),
            Self::TestDocs => test_docs(),
            Self::TestLibs => test_libs(),
            Self::VerifySchema => verify_schema(),
        }
    }
}

/// Run CI checks (lint, build, test, schema)
fn ci() -> Result<()> {
    lint()?;
    deny()?;
    machete()?;
    build()?;
    test()?;
    verify_schema()?;
    Ok(())
}

fn deny() -> Result<()> {
    run_cargo(vec!["deny", "check"])
}

fn machete() -> Result<()> {
    cmd!("cargo-machete").run_with_trace()?;
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

/// Lint formatting, typos, clippy, and docs (and a soft fail on markdown)
fn lint() -> Result<()> {
    lint_clippy()?;
    lint_docs()?;
    lint_format()?;
    lint_typos()?;
    if let Err(err) = lint_markdown() {
        tracing::warn!("markdownlint reported issues: {err}");
    }
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

/// Lint markdown files using [markdownlint-cli2](https://github.com/DavidAnson/markdownlint-cli2)
fn lint_markdown() -> Result<()> {
    cmd!("markdownlint-cli2", "**/*.md", "!target", "!**/target").run_with_trace()?;

    Ok(())
}

/// Check for typos in the project using [typos-cli](https://github.com/crate-ci/typos/)
fn lint_typos() -> Result<()> {
    cmd!("typos").run_with_trace()?;
    Ok(())
}

/// Fix typos in the project
fn fix_typos() -> Result<()> {
    cmd!("typos", "-w").run_with_trace()?;
    Ok(())
}

/// Run tests for libs and docs
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

/// Tables the engines read and write.
const REQUIRED_TABLES: [&str; 9] = [
    "availability_exceptions",
    "blackout_days",
    "bookings",
    "branches",
    "cases",
    "queue_entries",
    "service_packages",
    "users",
    "weekly_availability",
];

/// Unique column sets the engines depend on, per table.
const REQUIRED_UNIQUE: [(&str, &[&str]); 3] = [
    ("queue_entries", &["lawyer_id", "queue_date", "token_number"]),
    ("queue_entries", &["lawyer_id", "queue_date", "client_id"]),
    ("blackout_days", &["lawyer_id", "blackout_date"]),
];

/// Foreign keys as `(table, column, referenced table)`.
const REQUIRED_FOREIGN_KEYS: [(&str, &str, &str); 6] = [
    ("bookings", "case_id", "cases"),
    ("bookings", "lawyer_id", "users"),
    ("bookings", "client_id", "users"),
    ("queue_entries", "booking_id", "bookings"),
    ("availability_exceptions", "template_id", "weekly_availability"),
    ("weekly_availability", "branch_id", "branches"),
];

/// Overlap exclusion triggers on `bookings`.
const REQUIRED_TRIGGERS: [&str; 2] = ["bookings_no_overlap_insert", "bookings_no_overlap_update"];

/// Verify that the migrated schema carries the scheduling constraints.
///
/// ## What This Command Does
///
/// 1. Applies the embedded migrations to an in-memory `SQLite` database
/// 2. Introspects tables, unique indexes, foreign keys and triggers
/// 3. Checks them against the required set
/// 4. Exercises the overlap triggers with two intersecting bookings
///
/// ## Failures
///
/// The command fails listing every missing table, constraint or trigger,
/// or if the trial insert is not rejected with `booking_overlap`.
fn verify_schema() -> Result<()> {
    use diesel::Connection;
    use diesel_migrations::{embed_migrations, MigrationHarness};

    tracing::info!("Starting schema verification");

    #[allow(clippy::items_after_statements)]
    const MIGRATIONS: diesel_migrations::EmbeddedMigrations =
        embed_migrations!("../crates/persistence/migrations");

    let mut conn = SqliteConnection::establish(":memory:")
        .wrap_err("Failed to create SQLite in-memory database")?;

    diesel::sql_query("PRAGMA foreign_keys = ON")
        .execute(&mut conn)
        .wrap_err("Failed to enable foreign keys on SQLite")?;

    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to apply migrations: {}", e))?;
    tracing::info!("Migrations applied successfully");

    let schema = introspect_sqlite_schema(&mut conn)?;
    check_schema(&schema)?;
    exercise_overlap_trigger(&mut conn)?;

    tracing::info!("✓ Schema verification passed");
    Ok(())
}

/// Normalized schema representation
#[derive(Debug, Clone, PartialEq, Eq)]
struct Schema {
    tables: BTreeMap<String, Table>,
    triggers: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Table {
    columns: BTreeSet<String>,
    foreign_keys: BTreeSet<ForeignKey>,
    unique_constraints: BTreeSet<UniqueConstraint>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct ForeignKey {
    from_column: String,
    to_table: String,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct UniqueConstraint {
    columns: Vec<String>,
}

/// Introspect `SQLite` schema
fn introspect_sqlite_schema(conn: &mut SqliteConnection) -> Result<Schema> {
    #[derive(QueryableByName)]
    struct NameRow {
        #[diesel(sql_type = Text)]
        name: String,
    }

    #[derive(QueryableByName)]
    struct ForeignKeyInfo {
        #[diesel(sql_type = Text)]
        table: String,
        #[diesel(sql_type = Text)]
        from: String,
    }

    #[derive(QueryableByName)]
    struct IndexInfo {
        #[diesel(sql_type = Text)]
        name: String,
        #[diesel(sql_type = Integer)]
        unique: i32,
        #[diesel(sql_type = Text)]
        origin: String,
    }

    let mut schema = Schema {
        tables: BTreeMap::new(),
        triggers: BTreeSet::new(),
    };

    let tables: Vec<NameRow> = diesel::sql_query(
        "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' AND name != '__diesel_schema_migrations' ORDER BY name"
    )
    .load(conn)
    .wrap_err("Failed to query SQLite tables")?;

    for table in tables {
        let columns: Vec<NameRow> =
            diesel::sql_query(format!("SELECT name FROM pragma_table_info('{}')", table.name))
                .load(conn)
                .wrap_err(format!("Failed to get columns for table {}", table.name))?;

        let fks: Vec<ForeignKeyInfo> =
            diesel::sql_query(format!("PRAGMA foreign_key_list({})", table.name))
                .load(conn)
                .wrap_err(format!(
                    "Failed to get foreign keys for table {}",
                    table.name
                ))?;

        let indexes: Vec<IndexInfo> =
            diesel::sql_query(format!("PRAGMA index_list({})", table.name))
                .load(conn)
                .wrap_err(format!("Failed to get indexes for table {}", table.name))?;

        let mut unique_constraints = BTreeSet::new();
        // Both table-level UNIQUE ('u') and CREATE UNIQUE INDEX ('c') count
        for idx in indexes.into_iter().filter(|i| i.unique == 1 && i.origin != "pk") {
            let index_columns: Vec<NameRow> =
                diesel::sql_query(format!("SELECT name FROM pragma_index_info('{}')", idx.name))
                    .load(conn)
                    .wrap_err(format!("Failed to get index columns for {}", idx.name))?;
            unique_constraints.insert(UniqueConstraint {
                columns: index_columns.into_iter().map(|c| c.name).collect(),
            });
        }

        schema.tables.insert(
            table.name,
            Table {
                columns: columns.into_iter().map(|c| c.name).collect(),
                foreign_keys: fks
                    .into_iter()
                    .map(|fk| ForeignKey {
                        from_column: fk.from,
                        to_table: fk.table,
                    })
                    .collect(),
                unique_constraints,
            },
        );
    }

    let triggers: Vec<NameRow> =
        diesel::sql_query("SELECT name FROM sqlite_master WHERE type='trigger' ORDER BY name")
            .load(conn)
            .wrap_err("Failed to query SQLite triggers")?;
    schema.triggers = triggers.into_iter().map(|t| t.name).collect();

    Ok(schema)
}

/// Checks the introspected schema against the required constraints.
fn check_schema(schema: &Schema) -> Result<()> {
    let mut errors = Vec::new();

    for table in REQUIRED_TABLES {
        if !schema.tables.contains_key(table) {
            errors.push(format!("  - Table '{table}' is missing"));
        }
    }

    for (table, columns) in REQUIRED_UNIQUE {
        let wanted: Vec<String> = columns.iter().map(ToString::to_string).collect();
        let present = schema.tables.get(table).is_some_and(|t| {
            t.unique_constraints
                .iter()
                .any(|u| u.columns == wanted)
        });
        if !present {
            errors.push(format!(
                "  - Table '{table}' lacks UNIQUE ({})",
                columns.join(", ")
            ));
        }
    }

    for (table, column, target) in REQUIRED_FOREIGN_KEYS {
        let present = schema.tables.get(table).is_some_and(|t| {
            t.columns.contains(column)
                && t.foreign_keys.contains(&ForeignKey {
                    from_column: column.to_string(),
                    to_table: target.to_string(),
                })
        });
        if !present {
            errors.push(format!(
                "  - Foreign key {table}.{column} -> {target} is missing"
            ));
        }
    }

    for trigger in REQUIRED_TRIGGERS {
        if !schema.triggers.contains(trigger) {
            errors.push(format!("  - Trigger '{trigger}' is missing"));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(color_eyre::eyre::eyre!(
            "❌ Schema verification FAILED\n{}",
            errors.join("\n")
        ))
    }
}

/// Inserts two intersecting blocking bookings and expects the second to be
/// rejected by the overlap trigger.
fn exercise_overlap_trigger(conn: &mut SqliteConnection) -> Result<()> {
    const SEED: [&str; 4] = [
        "INSERT INTO users (user_id, role, display_name) VALUES (1, 'lawyer', 'L'), (2, 'client', 'C')",
        "INSERT INTO cases (case_id, client_id) VALUES (1, 2)",
        "INSERT INTO bookings (client_id, lawyer_id, case_id, scheduled_at_utc, ends_at_utc, created_at, updated_at) \
         VALUES (2, 1, 1, '2026-02-02T03:30:00.000000Z', '2026-02-02T04:00:00.000000Z', \
         '2026-02-01T00:00:00.000000Z', '2026-02-01T00:00:00.000000Z')",
        // Touching ranges never conflict
        "INSERT INTO bookings (client_id, lawyer_id, case_id, scheduled_at_utc, ends_at_utc, created_at, updated_at) \
         VALUES (2, 1, 1, '2026-02-02T04:00:00.000000Z', '2026-02-02T04:30:00.000000Z', \
         '2026-02-01T00:00:00.000000Z', '2026-02-01T00:00:00.000000Z')",
    ];
    const CLASH: &str = "INSERT INTO bookings (client_id, lawyer_id, case_id, scheduled_at_utc, ends_at_utc, created_at, updated_at) \
         VALUES (2, 1, 1, '2026-02-02T03:45:00.000000Z', '2026-02-02T04:15:00.000000Z', \
         '2026-02-01T00:00:00.000000Z', '2026-02-01T00:00:00.000000Z')";

    for statement in SEED {
        diesel::sql_query(statement)
            .execute(conn)
            .wrap_err("Failed to seed overlap check")?;
    }

    match diesel::sql_query(CLASH).execute(conn) {
        Err(err) if err.to_string().contains("booking_overlap") => {
            tracing::info!("Overlap trigger rejected intersecting booking");
            Ok(())
        }
        Err(err) => Err(color_eyre::eyre::eyre!(
            "❌ Overlap check failed with an unexpected error: {err}"
        )),
        Ok(_) => Err(color_eyre::eyre::eyre!(
            "❌ Overlap check inserted an intersecting booking"
        )),
    }
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
