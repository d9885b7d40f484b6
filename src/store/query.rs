use serde_json::Value;

/// A single store call: one table, one operation, optional filters,
/// ordering and row range.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub table: String,
    pub operation: Operation,
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
    pub range: Option<RowRange>,
    pub count_exact: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Select { columns: String },
    Insert { row: Value },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub column: String,
    pub descending: bool,
}

/// Zero-based, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowRange {
    pub start: u64,
    pub end: u64,
}

impl Query {
    pub fn table(name: &str) -> Self {
        Self {
            table: name.to_string(),
            operation: Operation::Select {
                columns: "*".to_string(),
            },
            filters: Vec::new(),
            order: None,
            range: None,
            count_exact: false,
        }
    }

    pub fn select(mut self, columns: &str) -> Self {
        self.operation = Operation::Select {
            columns: columns.to_string(),
        };
        self
    }

    pub fn insert(mut self, row: Value) -> Self {
        self.operation = Operation::Insert { row };
        self
    }

    pub fn eq(mut self, column: &str, value: &str) -> Self {
        self.filters.push(Filter {
            column: column.to_string(),
            value: value.to_string(),
        });
        self
    }

    pub fn order(mut self, column: &str, descending: bool) -> Self {
        self.order = Some(Order {
            column: column.to_string(),
            descending,
        });
        self
    }

    pub fn range(mut self, start: u64, end: u64) -> Self {
        self.range = Some(RowRange { start, end });
        self
    }

    pub fn count_exact(mut self) -> Self {
        self.count_exact = true;
        self
    }

    pub fn is_insert(&self) -> bool {
        matches!(self.operation, Operation::Insert { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder_defaults_to_select_all() {
        let query = Query::table("movies");
        assert_eq!(
            query.operation,
            Operation::Select {
                columns: "*".to_string()
            }
        );
        assert!(!query.count_exact);
        assert!(query.range.is_none());
    }

    #[test]
    fn test_builder_chain() {
        let query = Query::table("favorites")
            .select("*")
            .eq("user_id", "u1")
            .order("created_at", true);
        assert_eq!(query.filters.len(), 1);
        assert_eq!(query.filters[0].value, "u1");
        assert!(query.order.as_ref().unwrap().descending);

        let insert = Query::table("attendance").insert(json!({"user_id": "u1"}));
        assert!(insert.is_insert());
    }
}
