//! UPDATE builder.

use crate::dialect::Target;
use crate::error::{SqlError, SqlResult};
use crate::param::ParamTranslator;
use crate::predicate_set::PredicateSet;
use crate::qb::traits::Statement;
use crate::value::Value;

/// UPDATE statement.
#[derive(Clone, Debug)]
pub struct Update {
    target: Target,
    table: Option<String>,
    set: Vec<(String, Value)>,
    where_clause: PredicateSet,
}

impl Update {
    pub fn new(target: impl Into<Target>) -> Self {
        let target = target.into();
        Self {
            where_clause: PredicateSet::new(target.clone()),
            target,
            table: None,
            set: Vec::new(),
        }
    }

    pub fn table(&mut self, table: impl Into<String>) -> &mut Self {
        self.table = Some(table.into());
        self
    }

    /// `SET column = value`.
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.set.push((column.into(), value.into()));
        self
    }

    pub fn set_many<I, K, V>(&mut self, entries: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.set
            .extend(entries.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// `SET column = <sql>` with the expression inlined verbatim.
    ///
    /// # Example
    ///
    /// ```
    /// use polysql::{Dialect, Statement, qb};
    ///
    /// let mut q = qb::update(Dialect::MySql);
    /// q.table("posts").set_raw("views", "views + 1").where_("id = 7")?;
    /// assert_eq!(
    ///     q.render()?,
    ///     "UPDATE `posts` SET `views` = views + 1 WHERE (`id` = 7)"
    /// );
    /// # Ok::<(), polysql::SqlError>(())
    /// ```
    pub fn set_raw(&mut self, column: impl Into<String>, sql: impl Into<String>) -> &mut Self {
        self.set.push((column.into(), Value::Raw(sql.into())));
        self
    }

    where_methods!(where_clause);
}

impl Statement for Update {
    fn target(&self) -> &Target {
        &self.target
    }

    fn render_with(&self, tr: &mut ParamTranslator<'_>) -> SqlResult<String> {
        let table = self
            .table
            .as_deref()
            .ok_or_else(|| SqlError::Other("UPDATE requires a table".to_string()))?;

        let assignments: Vec<String> = self
            .set
            .iter()
            .map(|(c, v)| {
                let column = tr.quote_identifier(c);
                let value = tr.quote_value(v, Some(c.as_str()));
                format!("{column} = {value}")
            })
            .collect();

        let mut sql = format!("UPDATE {} SET", tr.quote_identifier(table));
        if !assignments.is_empty() {
            sql.push(' ');
            sql.push_str(&assignments.join(", "));
        }

        let where_sql = self.where_clause.render_with(tr)?;
        if !where_sql.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&where_sql);
        }
        Ok(sql)
    }
}
