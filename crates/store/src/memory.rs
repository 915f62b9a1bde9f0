//! `MemoryStore` — an in-process [`RowStore`].
//!
//! Evaluates the same [`Query`] model the HTTP client renders, over JSON rows
//! held in memory.  Used by tests and offline demos where a hosted store is
//! unavailable or irrelevant.  Every query received is recorded so callers
//! can assert on what was pushed down.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::{Column, Direction, Filter, Query, RowStore, StoreError};

type Row = Map<String, Value>;

/// How one table reaches another when embedded.
#[derive(Debug, Clone)]
struct Relation {
    /// Column on the base row.
    local_key: String,
    /// Column on the related row that must equal `local_key`.
    foreign_key: String,
    /// To-many relations embed an array, to-one an object or `null`.
    many: bool,
}

/// In-memory tables plus the foreign keys that link them.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: HashMap<String, Vec<Row>>,
    relations: HashMap<(String, String), Relation>,
    failures: HashMap<String, String>,
    /// All queries seen by this store (in call order).
    queries: Mutex<Vec<Query>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a table.  Non-object rows are ignored.
    pub fn with_table(mut self, name: &str, rows: Vec<Value>) -> Self {
        let rows = rows
            .into_iter()
            .filter_map(|row| match row {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect();
        self.tables.insert(name.to_owned(), rows);
        self
    }

    /// Declare that `child.foreign_key` references `parent.id`.
    ///
    /// Registers both directions: `child` embeds one `parent`, `parent`
    /// embeds many `child` rows.
    pub fn with_relation(mut self, child: &str, parent: &str, foreign_key: &str) -> Self {
        self.relations.insert(
            (child.to_owned(), parent.to_owned()),
            Relation {
                local_key: foreign_key.to_owned(),
                foreign_key: "id".to_owned(),
                many: false,
            },
        );
        self.relations.insert(
            (parent.to_owned(), child.to_owned()),
            Relation {
                local_key: "id".to_owned(),
                foreign_key: foreign_key.to_owned(),
                many: true,
            },
        );
        self
    }

    /// Make every query against `table` fail with a server error.
    pub fn failing_on(mut self, table: &str, message: impl Into<String>) -> Self {
        self.failures.insert(table.to_owned(), message.into());
        self
    }

    /// Snapshot of the queries received so far.
    pub fn queries(&self) -> Vec<Query> {
        self.queries.lock().unwrap().clone()
    }

    fn record(&self, query: &Query) {
        self.queries.lock().unwrap().push(query.clone());
    }

    fn evaluate(&self, query: &Query) -> Result<Vec<Value>, StoreError> {
        if let Some(message) = self.failures.get(&query.table) {
            return Err(StoreError::Api {
                status: 500,
                message: message.clone(),
            });
        }

        let rows = self.rows_of(&query.table)?;
        let mut matched: Vec<(&Row, Row)> = Vec::new();

        'rows: for row in rows {
            if !query.base_filters().all(|filter| row_matches(row, filter)) {
                continue;
            }

            let mut projected = if query.columns.is_empty() {
                row.clone()
            } else {
                Row::new()
            };

            for column in &query.columns {
                match column {
                    Column::All => projected.extend(row.clone()),
                    Column::Field(name) => {
                        projected.insert(name.clone(), row.get(name).cloned().unwrap_or(Value::Null));
                    }
                    Column::Embed { table, inner, columns } => {
                        let embedded = self.embed(query, row, table, columns)?;
                        if *inner && is_empty_embed(&embedded) {
                            continue 'rows;
                        }
                        projected.insert(table.clone(), embedded);
                    }
                }
            }

            matched.push((row, projected));
        }

        if let Some(order) = &query.order {
            matched.sort_by(|(a, _), (b, _)| {
                let ordering = compare_values(a.get(&order.column), b.get(&order.column));
                match order.direction {
                    Direction::Asc => ordering,
                    Direction::Desc => ordering.reverse(),
                }
            });
        }

        let offset = query.offset.unwrap_or(0);
        let limit = query.limit.unwrap_or(usize::MAX);

        Ok(matched
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|(_, projected)| Value::Object(projected))
            .collect())
    }

    fn embed(
        &self,
        query: &Query,
        row: &Row,
        related: &str,
        columns: &[String],
    ) -> Result<Value, StoreError> {
        let relation = self
            .relations
            .get(&(query.table.clone(), related.to_owned()))
            .ok_or_else(|| StoreError::Api {
                status: 400,
                message: format!(
                    "could not find a relationship between '{}' and '{}'",
                    query.table, related
                ),
            })?;

        let key = text_of(row.get(&relation.local_key));
        let candidates = self.rows_of(related)?.iter().filter(|candidate| {
            key.is_some()
                && text_of(candidate.get(&relation.foreign_key)) == key
                && query.scoped_filters(related).all(|f| row_matches(candidate, f))
        });

        let mut projected = candidates.map(|candidate| Value::Object(project(candidate, columns)));

        if relation.many {
            Ok(Value::Array(projected.collect()))
        } else {
            Ok(projected.next().unwrap_or(Value::Null))
        }
    }

    fn rows_of(&self, table: &str) -> Result<&Vec<Row>, StoreError> {
        self.tables.get(table).ok_or_else(|| StoreError::Api {
            status: 404,
            message: format!("relation '{table}' does not exist"),
        })
    }
}

#[async_trait]
impl RowStore for MemoryStore {
    async fn select(&self, query: &Query) -> Result<Vec<Value>, StoreError> {
        self.record(query);
        self.evaluate(query)
    }

    async fn count(&self, query: &Query) -> Result<u64, StoreError> {
        self.record(query);

        let mut unbounded = query.clone();
        unbounded.offset = None;
        unbounded.limit = None;

        Ok(self.evaluate(&unbounded)?.len() as u64)
    }
}

// ---------------------------------------------------------------------------
// Row helpers
// ---------------------------------------------------------------------------

fn project(row: &Row, columns: &[String]) -> Row {
    if columns.is_empty() || columns.iter().any(|c| c == "*") {
        return row.clone();
    }
    columns
        .iter()
        .map(|c| (c.clone(), row.get(c).cloned().unwrap_or(Value::Null)))
        .collect()
}

fn is_empty_embed(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// Textual form used for equality and substring matching.
fn text_of(value: Option<&Value>) -> Option<String> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => Some(other.to_string()),
    }
}

fn row_matches(row: &Row, filter: &Filter) -> bool {
    match filter {
        Filter::Eq { column, value } => text_of(row.get(column)).as_deref() == Some(value.as_str()),
        Filter::ContainsAny { columns, needle, .. } => {
            let needle = needle.to_lowercase();
            columns.iter().any(|column| {
                text_of(row.get(column))
                    .map(|text| text.to_lowercase().contains(&needle))
                    .unwrap_or(false)
            })
        }
    }
}

/// Ascending order with nulls last, so descending puts them first.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());

    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(x), Some(y)) => text_of(Some(x)).cmp(&text_of(Some(y))),
    }
}
