//! DELETE builder.

use crate::dialect::Target;
use crate::error::{SqlError, SqlResult};
use crate::param::ParamTranslator;
use crate::predicate_set::PredicateSet;
use crate::qb::traits::Statement;

/// DELETE statement.
#[derive(Clone, Debug)]
pub struct Delete {
    target: Target,
    table: Option<String>,
    where_clause: PredicateSet,
}

impl Delete {
    pub fn new(target: impl Into<Target>) -> Self {
        let target = target.into();
        Self {
            where_clause: PredicateSet::new(target.clone()),
            target,
            table: None,
        }
    }

    pub fn from(&mut self, table: impl Into<String>) -> &mut Self {
        self.table = Some(table.into());
        self
    }

    where_methods!(where_clause);
}

impl Statement for Delete {
    fn target(&self) -> &Target {
        &self.target
    }

    fn render_with(&self, tr: &mut ParamTranslator<'_>) -> SqlResult<String> {
        let table = self
            .table
            .as_deref()
            .ok_or_else(|| SqlError::Other("DELETE requires a table".to_string()))?;

        let mut sql = format!("DELETE FROM {}", tr.quote_identifier(table));
        let where_sql = self.where_clause.render_with(tr)?;
        if !where_sql.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&where_sql);
        }
        Ok(sql)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Dialect;

    #[test]
    fn test_delete_without_where() {
        let mut q = Delete::new(Dialect::Sqlite);
        q.from("sessions");
        assert_eq!(q.render().unwrap(), r#"DELETE FROM "sessions""#);
    }

    #[test]
    fn test_delete_with_nested_where() {
        let mut q = Delete::new(Dialect::MySql);
        q.from("sessions").where_("expired = 1").unwrap();
        q.where_clause().or_nest().is_null("user_id").lt("created_at", "2024-01-01");
        assert_eq!(
            q.render().unwrap(),
            "DELETE FROM `sessions` WHERE ((`expired` = 1) OR ((`user_id` IS NULL) AND (`created_at` < '2024-01-01')))"
        );
    }
}
