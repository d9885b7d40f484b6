use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use super::model::*;
use super::query::{Operation, Query};
use super::repo::Store;

/// In-process table store used by the tests.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<HashMap<String, Vec<Value>>>,
    calls: AtomicUsize,
    failing: bool,
    no_echo: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call fails the way a missing table does.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    /// Inserts succeed but return no representation.
    pub fn without_echo() -> Self {
        Self {
            no_echo: true,
            ..Self::default()
        }
    }

    pub fn seed(&self, table: &str, rows: impl IntoIterator<Item = Value>) {
        let mut tables = self.tables.lock().unwrap();
        tables.entry(table.to_string()).or_default().extend(rows);
    }

    pub fn rows(&self, table: &str) -> Vec<Value> {
        let tables = self.tables.lock().unwrap();
        tables.get(table).cloned().unwrap_or_default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

fn column_text(row: &Value, column: &str) -> String {
    match row.get(column) {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn execute(&self, query: &Query) -> StoreResult<QueryResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.failing {
            return Err(StoreError::Status {
                status: 404,
                message: format!("relation \"public.{}\" does not exist", query.table),
            });
        }

        let mut tables = self.tables.lock().unwrap();
        let table = tables.entry(query.table.clone()).or_default();

        match &query.operation {
            Operation::Insert { row } => {
                let mut row = row.clone();
                if let Value::Object(ref mut map) = row {
                    map.insert("id".to_string(), Value::from(table.len() as u64 + 1));
                }
                table.push(row.clone());
                let rows = if self.no_echo { vec![] } else { vec![row] };
                Ok(QueryResponse { rows, count: None })
            }
            Operation::Select { .. } => {
                let mut rows: Vec<Value> = table
                    .iter()
                    .filter(|row| {
                        query
                            .filters
                            .iter()
                            .all(|f| column_text(row, &f.column) == f.value)
                    })
                    .cloned()
                    .collect();

                if let Some(order) = &query.order {
                    rows.sort_by(|a, b| {
                        let ord = column_text(a, &order.column).cmp(&column_text(b, &order.column));
                        if order.descending {
                            ord.reverse()
                        } else {
                            ord
                        }
                    });
                }

                let count = query.count_exact.then_some(rows.len() as u64);

                if let Some(range) = query.range {
                    rows = rows
                        .into_iter()
                        .skip(range.start as usize)
                        .take((range.end - range.start + 1) as usize)
                        .collect();
                }

                Ok(QueryResponse { rows, count })
            }
        }
    }
}
