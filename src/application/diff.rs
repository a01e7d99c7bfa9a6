use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::domain::{
    comparison::ComparisonResult,
    events::SchemaEvent,
    ports::{Differ, Reporter, TableSource},
    row::Attributes,
    schema::{Index, Table, CONFIG_ATTRIBUTES},
    snapshot::SchemaSnapshot,
    table_diff::{AttributeChanges, IndexAddition, IndexRemoval, TableDiff, ValueChange},
    value_objects::IgnoredAttributes,
};
use crate::infrastructure::config::DiffOptions;

// ─── Compare Service ───

/// Compares a baseline snapshot (the migration file, the source of truth for
/// what should exist) against a current table source (normally the live
/// database).
///
/// Live tables are re-resolved one by one through [`TableSource::table`]
/// rather than read from a pre-built snapshot, so a table dropped while the
/// comparison runs degrades to an `add` entry instead of an error.
pub struct CompareService {
    differ: Arc<dyn Differ>,
    reporter: Arc<dyn Reporter>,
}

impl CompareService {
    pub fn new(differ: Arc<dyn Differ>, reporter: Arc<dyn Reporter>) -> Self {
        Self { differ, reporter }
    }

    pub async fn compare(
        &self,
        baseline: &SchemaSnapshot,
        current: &dyn TableSource,
    ) -> Result<ComparisonResult> {
        let mut result = ComparisonResult::new(current.schema_name());

        // Live tables the baseline does not know about.
        let live_names = current
            .table_names()
            .await
            .context("Failed to list current tables")?;
        for name in live_names {
            if !baseline.tables.contains_key(&name) {
                self.reporter
                    .report(&SchemaEvent::TableRemove { table: &name });
                result.target.remove.push(name);
            }
        }

        for (name, baseline_table) in &baseline.tables {
            self.reporter
                .report(&SchemaEvent::CheckingTable { table: name });

            let live = current
                .table(name)
                .await
                .with_context(|| format!("Failed to map current table {name}"))?;

            match live {
                Some(live_table) => {
                    let diff = self.differ.diff_table(baseline_table, &live_table);
                    if !diff.is_empty() {
                        result.target.diff.insert(name.clone(), diff);
                        result.stats.tables.changes += 1;
                    }
                }
                None => {
                    self.reporter
                        .report(&SchemaEvent::TableAdd { table: name });
                    result.target.add.push(baseline_table.clone());
                }
            }

            result.stats.tables.checked += 1;
        }

        Ok(result)
    }
}

// ─── Schema Differ (implementation of the port) ───

pub struct SchemaDiffer {
    options: DiffOptions,
    reporter: Arc<dyn Reporter>,
}

impl SchemaDiffer {
    pub fn new(options: DiffOptions, reporter: Arc<dyn Reporter>) -> Self {
        Self { options, reporter }
    }

    fn diff_fields(&self, baseline: &Table, current: &Table, diff: &mut TableDiff) {
        let table = baseline.name.as_str();
        let ignored = &self.options.ignored_field_attributes;

        for (name, field) in &baseline.fields {
            match current.fields.get(name) {
                None => {
                    self.reporter
                        .report(&SchemaEvent::FieldAdd { table, field: name });
                    diff.fields.add.push(field.clone());
                }
                Some(live) => {
                    let changes = diff_attributes(&field.attributes(), &live.attributes(), ignored);
                    if changes.is_empty() {
                        continue;
                    }
                    for attribute in changes.keys() {
                        self.reporter.report(&SchemaEvent::FieldChange {
                            table,
                            field: name,
                            attribute,
                        });
                    }
                    diff.fields.change.insert(name.clone(), changes);
                }
            }
        }

        for name in current.fields.keys() {
            if !baseline.fields.contains_key(name) {
                self.reporter
                    .report(&SchemaEvent::FieldRemove { table, field: name });
                diff.fields.remove.push(name.clone());
            }
        }
    }

    fn diff_indexes(&self, baseline: &Table, current: &Table, diff: &mut TableDiff) {
        let table = baseline.name.as_str();
        let ignored = &self.options.ignored_index_attributes;

        for (index, spec) in &baseline.indexes {
            let Some(live) = current.indexes.get(index) else {
                self.reporter
                    .report(&SchemaEvent::IndexAdd { table, index });
                diff.index.add.push(IndexAddition::Index(spec.clone()));
                continue;
            };

            let baseline_columns = flatten_index(spec);
            let live_columns = flatten_index(live);

            for (column, column_spec) in &baseline_columns {
                let Some(live_spec) = live_columns.get(column) else {
                    self.reporter.report(&SchemaEvent::IndexColumnAdd {
                        table,
                        index,
                        column,
                    });
                    diff.index.add.push(IndexAddition::Column(column_spec.clone()));
                    continue;
                };

                for (attribute, change) in diff_attributes(column_spec, live_spec, ignored) {
                    self.reporter.report(&SchemaEvent::IndexChange {
                        table,
                        index,
                        attribute: &attribute,
                    });
                    diff.index
                        .change
                        .entry(index.clone())
                        .or_default()
                        .insert(attribute, change);
                }
            }

            for column in live_columns.keys() {
                if !baseline_columns.contains_key(column) {
                    self.reporter.report(&SchemaEvent::IndexColumnRemove {
                        table,
                        index,
                        column,
                    });
                    diff.index.remove.push(IndexRemoval::Column {
                        index: index.clone(),
                        column: column.clone(),
                    });
                }
            }
        }

        for index in current.indexes.keys() {
            if !baseline.indexes.contains_key(index) {
                self.reporter
                    .report(&SchemaEvent::IndexRemove { table, index });
                diff.index.remove.push(IndexRemoval::Index(index.clone()));
            }
        }
    }

    fn diff_triggers(&self, baseline: &Table, current: &Table, diff: &mut TableDiff) {
        let table = baseline.name.as_str();

        for trigger in &baseline.triggers {
            let name = trigger.name();
            if !current.triggers.iter().any(|t| t.name() == name) {
                self.reporter
                    .report(&SchemaEvent::TriggerAdd { table, trigger: name });
                diff.triggers.add.push(trigger.clone());
            }
        }

        for trigger in &current.triggers {
            let name = trigger.name();
            if !baseline.triggers.iter().any(|t| t.name() == name) {
                self.reporter
                    .report(&SchemaEvent::TriggerRemove { table, trigger: name });
                diff.triggers.remove.push(name.to_string());
            }
        }
    }
}

impl Differ for SchemaDiffer {
    fn diff_table(&self, baseline: &Table, current: &Table) -> TableDiff {
        let mut diff = TableDiff::new(baseline, current);

        for attribute in CONFIG_ATTRIBUTES {
            let new = baseline.config_value(attribute);
            let old = current.config_value(attribute);
            if !json_equal(&new, &old) {
                diff.config
                    .insert(attribute.to_string(), ValueChange { new, old });
            }
        }

        self.diff_fields(baseline, current, &mut diff);
        self.diff_indexes(baseline, current, &mut diff);
        self.diff_triggers(baseline, current, &mut diff);

        diff
    }
}

// ─── Attribute comparison ───

/// Compare every baseline attribute with its current counterpart (missing
/// counts as `null`). Attributes only the current side has are not reported.
fn diff_attributes(
    baseline: &Attributes,
    current: &Attributes,
    ignored: &IgnoredAttributes,
) -> AttributeChanges {
    let mut changes = AttributeChanges::new();
    for (attribute, new) in baseline {
        if ignored.contains(attribute) {
            continue;
        }
        let old = current.get(attribute).unwrap_or(&Value::Null);

        if !json_equal(new, old) {
            changes.insert(
                attribute.clone(),
                ValueChange {
                    new: new.clone(),
                    old: old.clone(),
                },
            );
        }
    }
    changes
}

/// Column name → `{order, ...column attributes}`, `order` being the 0-based
/// position in the index. A column listed twice keeps the later spec.
fn flatten_index(index: &Index) -> IndexMap<String, Attributes> {
    let mut columns = IndexMap::with_capacity(index.columns.len());
    for (order, column) in index.columns.iter().enumerate() {
        let mut spec = Attributes::new();
        spec.insert("order".into(), json!(order));
        spec.extend(column.attributes());
        columns.insert(column.column_name.to_lowercase(), spec);
    }
    columns
}

fn json_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(na), Value::Number(nb)) => match (na.as_f64(), nb.as_f64()) {
            (Some(fa), Some(fb)) => float_eq(fa, fb),
            _ => na == nb,
        },
        // "10" == 10
        (Value::Number(n), Value::String(s)) | (Value::String(s), Value::Number(n)) => {
            match (n.as_f64(), s.trim().parse::<f64>()) {
                (Some(fa), Ok(fb)) => float_eq(fa, fb),
                _ => false,
            }
        }
        _ => normalize_json(a) == normalize_json(b),
    }
}

fn float_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn normalize_json(v: &Value) -> Value {
    match v {
        Value::Object(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by_key(|(k, _)| *k);
            Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.clone(), normalize_json(v)))
                    .collect(),
            )
        }
        Value::Array(arr) => Value::Array(arr.iter().map(normalize_json).collect()),
        _ => v.clone(),
    }
}
