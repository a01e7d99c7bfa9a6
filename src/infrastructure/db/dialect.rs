// ─────────────────────────────────────────────────────────────────────────────
// Trait
// ─────────────────────────────────────────────────────────────────────────────

/// SQL dialect: the introspection statements and the quoting rules used to
/// parameterize them by literal table/schema name.
///
/// Pure string manipulation with no sqlx dependency; the statement builders
/// in `sql_utils` compose these pieces.
pub trait QueryDialect: Send + Sync {
    /// Driver name as a lowercase string ("mysql", "mariadb").
    /// Used for log fields only, never for branching logic.
    fn name(&self) -> &'static str;

    /// Quote an identifier (table, schema). MySQL / MariaDB use backticks.
    fn quote_ident(&self, s: &str) -> String {
        format!("`{}`", s.replace('`', "``"))
    }

    /// Quote a string literal, doubling embedded single quotes and escaping
    /// backslashes (MySQL treats `\` as an escape in string literals).
    fn quote_literal(&self, s: &str) -> String {
        format!("'{}'", s.replace('\\', "\\\\").replace('\'', "''"))
    }

    /// Statement listing every base table and view of the current schema.
    /// The first column of each row is the table name.
    fn list_tables_sql(&self) -> &'static str {
        "SHOW TABLES"
    }

    /// Filter column for `SHOW TABLE STATUS … WHERE`.
    fn table_status_name_column(&self) -> &'static str {
        "Name"
    }

    /// Filter column for `SHOW TRIGGERS … WHERE`.
    fn trigger_table_column(&self) -> &'static str {
        "Table"
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// MySQL / MariaDB
// ─────────────────────────────────────────────────────────────────────────────

pub struct MysqlDialect;

impl QueryDialect for MysqlDialect {
    fn name(&self) -> &'static str {
        "mysql"
    }
}

// MariaDB shares MySQL's SHOW/DESCRIBE syntax and wire protocol.
pub struct MariadbDialect;

impl QueryDialect for MariadbDialect {
    fn name(&self) -> &'static str {
        "mariadb"
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Factory
// ─────────────────────────────────────────────────────────────────────────────

/// Resolve the dialect from a driver name string. Unknown names fall back to
/// MySQL; configuration validation rejects them before this point.
pub fn from_driver(driver: &str) -> Box<dyn QueryDialect> {
    match driver {
        "mariadb" => Box::new(MariadbDialect),
        _ => Box::new(MysqlDialect),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
