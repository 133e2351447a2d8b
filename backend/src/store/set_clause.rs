//! Builder for partial-update statements.
//!
//! A sparse update contributes one `(column, value)` pair per field that is present; the
//! builder renders them with positional placeholders followed by the owner-scoped WHERE
//! clause. It never touches a connection.

use super::scope::OwnerScope;
use rusqlite::types::Value;

/// SQL text plus its parameters in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Value>,
}

#[derive(Debug, Clone, Default)]
pub struct SetClause {
    assignments: Vec<(&'static str, Value)>,
}

impl SetClause {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, column: &'static str, value: impl Into<Value>) -> &mut Self {
        self.assignments.push((column, value.into()));
        self
    }

    /// Assign `column` only when `value` is present.
    pub fn set_opt<T: Into<Value>>(&mut self, column: &'static str, value: Option<T>) -> &mut Self {
        if let Some(v) = value {
            self.set(column, v);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Render `UPDATE <table> SET ... <scope>`, or `None` when nothing is assigned.
    pub fn to_update(&self, table: &str, scope: &OwnerScope) -> Option<Statement> {
        if self.is_empty() {
            return None;
        }
        let sets: Vec<String> = self
            .assignments
            .iter()
            .enumerate()
            .map(|(i, (column, _))| format!("{column} = ?{}", i + 1))
            .collect();
        let mut params: Vec<Value> = self.assignments.iter().map(|(_, v)| v.clone()).collect();
        let (where_sql, where_params) = scope.render(params.len() + 1);
        params.extend(where_params);
        Some(Statement {
            sql: format!("UPDATE {table} SET {} {where_sql}", sets.join(", ")),
            params,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::scoped_where;
    use proptest::prelude::*;

    #[test]
    fn test_empty_renders_nothing() {
        let set = SetClause::new();
        assert!(set.to_update("patients", &scoped_where("a")).is_none());
    }

    #[test]
    fn test_only_present_fields_rendered() {
        let mut set = SetClause::new();
        set.set_opt("full_name", Some("Asha".to_string()))
            .set_opt::<String>("gender", None)
            .set("updated_time", "2025-02-24T04:30:00Z".to_string());

        let stmt = set
            .to_update("patients", &scoped_where("clinic-a").and_eq("id", "p-1".to_string()))
            .unwrap();
        assert_eq!(
            stmt.sql,
            "UPDATE patients SET full_name = ?1, updated_time = ?2 WHERE id = ?3 AND owner_username = ?4"
        );
        assert_eq!(
            stmt.params,
            vec![
                Value::Text("Asha".into()),
                Value::Text("2025-02-24T04:30:00Z".into()),
                Value::Text("p-1".into()),
                Value::Text("clinic-a".into()),
            ]
        );
    }

    proptest! {
        #[test]
        fn placeholders_match_parameter_count(n in 1usize..20) {
            let mut set = SetClause::new();
            for i in 0..n {
                set.set("amount", i as i64);
            }
            let stmt = set
                .to_update("payments", &scoped_where("o").and_eq("id", "x".to_string()))
                .unwrap();
            prop_assert_eq!(stmt.params.len(), n + 2);
            for i in 1..=n + 2 {
                let placeholder = format!("?{}", i);
                prop_assert!(stmt.sql.contains(&placeholder));
            }
            let last = format!("owner_username = ?{}", n + 2);
            prop_assert!(stmt.sql.ends_with(&last));
        }
    }
}
