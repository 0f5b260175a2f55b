//! Event log database migrations - embedded SQL files
//!
//! Migrations are compiled into the binary with include_str! and applied
//! in order by name.

/// All log migrations as (filename, sql_content)
///
/// New migrations get the next NNN_ prefix and an entry at the end.
pub const LOG_MIGRATIONS: &[(&str, &str)] = &[
    ("000_migrations.sql", include_str!("000_migrations.sql")),
    (
        "001_initial_schema.sql",
        include_str!("001_initial_schema.sql"),
    ),
];
