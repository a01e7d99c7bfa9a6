use std::fmt;

/// Progress and diagnostic events emitted while mapping and comparing.
///
/// Events borrow from the data being processed; a reporter that needs to
/// keep them must copy what it needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaEvent<'a> {
    MappingStarted { schema: &'a str },
    TableMapped { table: &'a str },
    TableNotFound { table: &'a str },
    MappingFinished { schema: &'a str, tables: usize },

    CheckingTable { table: &'a str },
    TableAdd { table: &'a str },
    TableRemove { table: &'a str },

    FieldAdd { table: &'a str, field: &'a str },
    FieldChange { table: &'a str, field: &'a str, attribute: &'a str },
    FieldRemove { table: &'a str, field: &'a str },

    IndexAdd { table: &'a str, index: &'a str },
    IndexColumnAdd { table: &'a str, index: &'a str, column: &'a str },
    IndexChange { table: &'a str, index: &'a str, attribute: &'a str },
    IndexColumnRemove { table: &'a str, index: &'a str, column: &'a str },
    IndexRemove { table: &'a str, index: &'a str },

    TriggerAdd { table: &'a str, trigger: &'a str },
    TriggerRemove { table: &'a str, trigger: &'a str },
}

impl SchemaEvent<'_> {
    /// Stable machine-readable event name, e.g. `"field_add"`.
    pub fn name(&self) -> &'static str {
        match self {
            SchemaEvent::MappingStarted { .. } => "mapping_started",
            SchemaEvent::TableMapped { .. } => "table_mapped",
            SchemaEvent::TableNotFound { .. } => "table_not_found",
            SchemaEvent::MappingFinished { .. } => "mapping_finished",
            SchemaEvent::CheckingTable { .. } => "checking_table",
            SchemaEvent::TableAdd { .. } => "table_add",
            SchemaEvent::TableRemove { .. } => "table_remove",
            SchemaEvent::FieldAdd { .. } => "field_add",
            SchemaEvent::FieldChange { .. } => "field_change",
            SchemaEvent::FieldRemove { .. } => "field_remove",
            SchemaEvent::IndexAdd { .. } => "index_add",
            SchemaEvent::IndexColumnAdd { .. } => "index_column_add",
            SchemaEvent::IndexChange { .. } => "index_change",
            SchemaEvent::IndexColumnRemove { .. } => "index_column_remove",
            SchemaEvent::IndexRemove { .. } => "index_remove",
            SchemaEvent::TriggerAdd { .. } => "trigger_add",
            SchemaEvent::TriggerRemove { .. } => "trigger_remove",
        }
    }

    /// The table the event is about, if any.
    pub fn table(&self) -> Option<&str> {
        match *self {
            SchemaEvent::MappingStarted { .. } | SchemaEvent::MappingFinished { .. } => None,
            SchemaEvent::TableMapped { table }
            | SchemaEvent::TableNotFound { table }
            | SchemaEvent::CheckingTable { table }
            | SchemaEvent::TableAdd { table }
            | SchemaEvent::TableRemove { table }
            | SchemaEvent::FieldAdd { table, .. }
            | SchemaEvent::FieldChange { table, .. }
            | SchemaEvent::FieldRemove { table, .. }
            | SchemaEvent::IndexAdd { table, .. }
            | SchemaEvent::IndexColumnAdd { table, .. }
            | SchemaEvent::IndexChange { table, .. }
            | SchemaEvent::IndexColumnRemove { table, .. }
            | SchemaEvent::IndexRemove { table, .. }
            | SchemaEvent::TriggerAdd { table, .. }
            | SchemaEvent::TriggerRemove { table, .. } => Some(table),
        }
    }
}

impl fmt::Display for SchemaEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaEvent::MappingStarted { schema } => write!(f, "mapping schema {schema}"),
            SchemaEvent::TableMapped { table } => write!(f, "mapped {table}"),
            SchemaEvent::TableNotFound { table } => write!(f, "table {table} not found"),
            SchemaEvent::MappingFinished { schema, tables } => {
                write!(f, "mapped {tables} table(s) of {schema}")
            }
            SchemaEvent::CheckingTable { table } => write!(f, "[i] checking {table}"),
            SchemaEvent::TableAdd { table } => write!(f, "[+] add table {table}"),
            SchemaEvent::TableRemove { table } => write!(f, "[-] remove table {table}"),
            SchemaEvent::FieldAdd { table, field } => write!(f, "[+] {table}: add field {field}"),
            SchemaEvent::FieldChange {
                table,
                field,
                attribute,
            } => write!(f, "[!] {table}: field {field} changes {attribute}"),
            SchemaEvent::FieldRemove { table, field } => {
                write!(f, "[-] {table}: remove field {field}")
            }
            SchemaEvent::IndexAdd { table, index } => write!(f, "[+] {table}: add index {index}"),
            SchemaEvent::IndexColumnAdd {
                table,
                index,
                column,
            } => write!(f, "[+] {table}: index {index} adds column {column}"),
            SchemaEvent::IndexChange {
                table,
                index,
                attribute,
            } => write!(f, "[!] {table}: index {index} changes {attribute}"),
            SchemaEvent::IndexColumnRemove {
                table,
                index,
                column,
            } => write!(f, "[-] {table}: index {index} drops column {column}"),
            SchemaEvent::IndexRemove { table, index } => {
                write!(f, "[-] {table}: remove index {index}")
            }
            SchemaEvent::TriggerAdd { table, trigger } => {
                write!(f, "[+] {table}: add trigger {trigger}")
            }
            SchemaEvent::TriggerRemove { table, trigger } => {
                write!(f, "[-] {table}: remove trigger {trigger}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_and_name() {
        let e = SchemaEvent::FieldChange {
            table: "users",
            field: "email",
            attribute: "type",
        };
        assert_eq!(e.name(), "field_change");
        assert_eq!(e.table(), Some("users"));
        assert_eq!(e.to_string(), "[!] users: field email changes type");
    }

    #[test]
    fn schema_level_events_have_no_table() {
        let e = SchemaEvent::MappingFinished {
            schema: "shop",
            tables: 3,
        };
        assert_eq!(e.table(), None);
        assert_eq!(e.to_string(), "mapped 3 table(s) of shop");
    }
}
