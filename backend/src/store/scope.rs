//! Owner scoping for every patient and payment query.
//!
//! Rows are partitioned by `owner_username`. Query builders never write that predicate
//! themselves; they start from [`scoped_where`], which cannot be rendered without it.

use rusqlite::types::Value;

pub const OWNER_COLUMN: &str = "owner_username";

/// A WHERE clause that always filters on the owner, plus optional equality filters.
#[derive(Debug, Clone)]
pub struct OwnerScope {
    filters: Vec<(&'static str, Value)>,
    owner: String,
}

/// Start a WHERE clause scoped to `owner`.
pub fn scoped_where(owner: &str) -> OwnerScope {
    OwnerScope {
        filters: Vec::new(),
        owner: owner.to_string(),
    }
}

impl OwnerScope {
    /// Add `column = value` to the clause.
    pub fn and_eq(mut self, column: &'static str, value: impl Into<Value>) -> Self {
        self.filters.push((column, value.into()));
        self
    }

    /// Render `WHERE a = ?n AND ... AND owner_username = ?m`, numbering placeholders from
    /// `first`, and return the parameters in placeholder order.
    pub fn render(&self, first: usize) -> (String, Vec<Value>) {
        let mut predicates = Vec::with_capacity(self.filters.len() + 1);
        let mut params = Vec::with_capacity(self.filters.len() + 1);
        let mut idx = first;
        for (column, value) in &self.filters {
            predicates.push(format!("{column} = ?{idx}"));
            params.push(value.clone());
            idx += 1;
        }
        predicates.push(format!("{OWNER_COLUMN} = ?{idx}"));
        params.push(Value::Text(self.owner.clone()));
        (format!("WHERE {}", predicates.join(" AND ")), params)
    }
}
