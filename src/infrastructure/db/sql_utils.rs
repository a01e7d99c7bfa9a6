use crate::infrastructure::db::dialect::QueryDialect;

// ─────────────────────────────────────────────────────────────────────────────
// Introspection statement builders
// ─────────────────────────────────────────────────────────────────────────────

/// `SHOW TABLES`
pub fn list_tables_query(dialect: &dyn QueryDialect) -> String {
    dialect.list_tables_sql().to_string()
}

/// ``SHOW TABLE STATUS WHERE `Name` = '<table>'``
pub fn table_status_query(table: &str, dialect: &dyn QueryDialect) -> String {
    format!(
        "SHOW TABLE STATUS WHERE {} = {}",
        dialect.quote_ident(dialect.table_status_name_column()),
        dialect.quote_literal(table)
    )
}

/// ``DESCRIBE `<table>` ``
pub fn describe_table_query(table: &str, dialect: &dyn QueryDialect) -> String {
    format!("DESCRIBE {}", dialect.quote_ident(table))
}

/// ``SHOW INDEXES FROM `<table>` ``
pub fn show_indexes_query(table: &str, dialect: &dyn QueryDialect) -> String {
    format!("SHOW INDEXES FROM {}", dialect.quote_ident(table))
}

/// ``SHOW TRIGGERS FROM `<schema>` WHERE `Table` = '<table>'``
pub fn show_triggers_query(schema: &str, table: &str, dialect: &dyn QueryDialect) -> String {
    format!(
        "SHOW TRIGGERS FROM {} WHERE {} = {}",
        dialect.quote_ident(schema),
        dialect.quote_ident(dialect.trigger_table_column()),
        dialect.quote_literal(table)
    )
}

/// Short label for a statement ("SHOW INDEXES", "DESCRIBE", …), used to
/// group timings without leaking table names into metric keys.
pub fn statement_kind(sql: &str) -> &'static str {
    let upper = sql.trim_start().to_ascii_uppercase();
    if upper.starts_with("SHOW TABLE STATUS") {
        "SHOW TABLE STATUS"
    } else if upper.starts_with("SHOW TABLES") {
        "SHOW TABLES"
    } else if upper.starts_with("SHOW INDEX") {
        "SHOW INDEXES"
    } else if upper.starts_with("SHOW TRIGGERS") {
        "SHOW TRIGGERS"
    } else if upper.starts_with("DESCRIBE") {
        "DESCRIBE"
    } else {
        "OTHER"
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::db::dialect::MysqlDialect;

    fn my() -> MysqlDialect {
        MysqlDialect
    }

    #[test]
    fn test_list_tables_query() {
        assert_eq!(list_tables_query(&my()), "SHOW TABLES");
    }

    #[test]
    fn test_table_status_query() {
        assert_eq!(
            table_status_query("users", &my()),
            "SHOW TABLE STATUS WHERE `Name` = 'users'"
        );
    }

    #[test]
    fn test_table_status_query_escapes_name() {
        assert_eq!(
            table_status_query("x' OR '1'='1", &my()),
            "SHOW TABLE STATUS WHERE `Name` = 'x'' OR ''1''=''1'"
        );
    }

    #[test]
    fn test_describe_and_indexes_quote_table() {
        assert_eq!(describe_table_query("order", &my()), "DESCRIBE `order`");
        assert_eq!(
            show_indexes_query("order", &my()),
            "SHOW INDEXES FROM `order`"
        );
    }

    #[test]
    fn test_show_triggers_query() {
        assert_eq!(
            show_triggers_query("shop", "users", &my()),
            "SHOW TRIGGERS FROM `shop` WHERE `Table` = 'users'"
        );
    }

    #[test]
    fn test_statement_kind() {
        assert_eq!(statement_kind("SHOW TABLES"), "SHOW TABLES");
        assert_eq!(
            statement_kind(&table_status_query("t", &my())),
            "SHOW TABLE STATUS"
        );
        assert_eq!(statement_kind(&describe_table_query("t", &my())), "DESCRIBE");
        assert_eq!(statement_kind(&show_indexes_query("t", &my())), "SHOW INDEXES");
        assert_eq!(
            statement_kind(&show_triggers_query("s", "t", &my())),
            "SHOW TRIGGERS"
        );
        assert_eq!(statement_kind("select 1"), "OTHER");
    }
}
