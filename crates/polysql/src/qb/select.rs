//! SELECT builder.

use crate::dialect::{Dialect, Target};
use crate::error::{SqlError, SqlResult};
use crate::param::ParamTranslator;
use crate::predicate_set::{Criterion, PredicateSet};
use crate::qb::table::{Join, JoinKind, TableRef};
use crate::qb::traits::{BuiltQuery, Statement};
use crate::value::Value;

const ROW_NUMBER: &str = "RowNumber";

/// Sort direction of an ORDER BY item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn as_sql(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone)]
struct OrderItem {
    column: String,
    direction: Option<Direction>,
}

/// SELECT statement.
#[derive(Debug, Clone)]
pub struct Select {
    target: Target,
    distinct: bool,
    columns: Vec<String>,
    from: Option<TableRef>,
    joins: Vec<Join>,
    where_clause: PredicateSet,
    group_by: Vec<String>,
    having: PredicateSet,
    order_by: Vec<OrderItem>,
    limit: Option<u64>,
    offset: Option<u64>,
}

impl Select {
    pub fn new(target: impl Into<Target>) -> Self {
        let target = target.into();
        Self {
            where_clause: PredicateSet::new(target.clone()),
            having: PredicateSet::new(target.clone()),
            target,
            distinct: false,
            columns: Vec::new(),
            from: None,
            joins: Vec::new(),
            group_by: Vec::new(),
            order_by: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    // ==================== Columns ====================

    /// Replace the selected columns. An empty list selects `*`.
    pub fn columns<I, S>(&mut self, columns: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Append one column (`"name"`, `"u.name AS author"`, `"COUNT(*) AS n"`).
    pub fn column(&mut self, column: impl Into<String>) -> &mut Self {
        self.columns.push(column.into());
        self
    }

    pub fn distinct(&mut self) -> &mut Self {
        self.distinct = true;
        self
    }

    // ==================== FROM / JOIN ====================

    /// Set the FROM target: `"users"`, `"users AS u"` or any [`TableRef`].
    pub fn from(&mut self, table: impl Into<TableRef>) -> &mut Self {
        self.from = Some(table.into());
        self
    }

    /// FROM an `alias => table` map holding exactly one entry.
    pub fn from_alias_map<I, A, T>(&mut self, entries: I) -> SqlResult<&mut Self>
    where
        I: IntoIterator<Item = (A, T)>,
        A: Into<String>,
        T: Into<String>,
    {
        self.from = Some(TableRef::from_alias_map(entries)?);
        Ok(self)
    }

    /// FROM a nested SELECT. Its placeholders are numbered in the same pass.
    pub fn from_subquery(&mut self, select: Select, alias: impl Into<String>) -> &mut Self {
        self.from = Some(TableRef::subquery(select, alias));
        self
    }

    /// Add a JOIN whose ON condition is parsed from `on`.
    pub fn join(
        &mut self,
        kind: JoinKind,
        table: impl Into<TableRef>,
        on: impl Into<Criterion>,
    ) -> SqlResult<&mut Self> {
        self.join_with(kind, table).add(on)?;
        Ok(self)
    }

    /// Add a JOIN and return its ON set for further conditions.
    pub fn join_with(&mut self, kind: JoinKind, table: impl Into<TableRef>) -> &mut PredicateSet {
        let idx = self.joins.len();
        self.joins.push(Join {
            kind,
            table: table.into(),
            on: PredicateSet::new(self.target.clone()),
        });
        &mut self.joins[idx].on
    }

    pub fn inner_join(
        &mut self,
        table: impl Into<TableRef>,
        on: impl Into<Criterion>,
    ) -> SqlResult<&mut Self> {
        self.join(JoinKind::Inner, table, on)
    }

    pub fn left_join(
        &mut self,
        table: impl Into<TableRef>,
        on: impl Into<Criterion>,
    ) -> SqlResult<&mut Self> {
        self.join(JoinKind::Left, table, on)
    }

    pub fn right_join(
        &mut self,
        table: impl Into<TableRef>,
        on: impl Into<Criterion>,
    ) -> SqlResult<&mut Self> {
        self.join(JoinKind::Right, table, on)
    }

    pub fn full_join(
        &mut self,
        table: impl Into<TableRef>,
        on: impl Into<Criterion>,
    ) -> SqlResult<&mut Self> {
        self.join(JoinKind::Full, table, on)
    }

    // ==================== WHERE / GROUP BY / HAVING ====================

    where_methods!(where_clause);

    pub fn group_by<I, S>(&mut self, columns: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.group_by.extend(columns.into_iter().map(Into::into));
        self
    }

    pub fn having(&mut self, criterion: impl Into<Criterion>) -> SqlResult<&mut Self> {
        self.having.add(criterion)?;
        Ok(self)
    }

    pub fn having_clause(&mut self) -> &mut PredicateSet {
        &mut self.having
    }

    // ==================== ORDER BY / paging ====================

    /// Append ORDER BY items from text such as `"created_at DESC, id"`.
    pub fn order_by(&mut self, clause: &str) -> &mut Self {
        for item in split_top_level(clause) {
            self.order_by.push(parse_order_item(item));
        }
        self
    }

    pub fn order_by_asc(&mut self, column: impl Into<String>) -> &mut Self {
        self.order_by.push(OrderItem {
            column: column.into(),
            direction: Some(Direction::Asc),
        });
        self
    }

    pub fn order_by_desc(&mut self, column: impl Into<String>) -> &mut Self {
        self.order_by.push(OrderItem {
            column: column.into(),
            direction: Some(Direction::Desc),
        });
        self
    }

    pub fn limit(&mut self, n: u64) -> &mut Self {
        self.limit = Some(n);
        self
    }

    pub fn offset(&mut self, n: u64) -> &mut Self {
        self.offset = Some(n);
        self
    }

    /// Pagination helper.
    ///
    /// `page` is 1-based (clamped to >= 1).
    /// `per_page` is clamped to >= 1.
    pub fn paginate(&mut self, page: u64, per_page: u64) -> &mut Self {
        let p = page.max(1);
        let size = per_page.max(1);
        self.limit = Some(size);
        self.offset = Some((p - 1).saturating_mul(size));
        self
    }

    /// Build `SELECT COUNT(*)` over the same FROM/JOIN/WHERE, ignoring
    /// ORDER BY and paging. Grouped or distinct queries are counted through
    /// a subquery.
    pub fn build_count(&self) -> SqlResult<BuiltQuery> {
        let mut tr = ParamTranslator::new(&self.target);
        let sql = if self.distinct || !self.group_by.is_empty() || !self.having.is_empty() {
            let inner = self.render_core(&mut tr, false, None, None)?;
            format!(
                "SELECT COUNT(*) FROM ({inner}) AS {}",
                tr.quote_identifier("count_subquery")
            )
        } else {
            let mut sql = String::from("SELECT COUNT(*)");
            self.push_body(&mut sql, &mut tr)?;
            sql
        };
        Ok(BuiltQuery {
            sql,
            params: tr.into_params(),
        })
    }

    // ==================== Build helpers ====================

    /// Offset that actually skips rows.
    fn effective_offset(&self) -> Option<u64> {
        self.offset.filter(|&o| o > 0)
    }

    fn render_columns(&self, tr: &ParamTranslator<'_>) -> String {
        if self.columns.is_empty() {
            return "*".to_string();
        }
        self.columns
            .iter()
            .map(|c| tr.quote_identifier(c))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn render_order(&self, tr: &ParamTranslator<'_>) -> String {
        self.order_by
            .iter()
            .map(|item| {
                let column = tr.quote_identifier(&item.column);
                match item.direction {
                    Some(dir) => format!("{column} {}", dir.as_sql()),
                    None => column,
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// FROM, JOIN, WHERE, GROUP BY and HAVING, each with a leading space.
    fn push_body(&self, sql: &mut String, tr: &mut ParamTranslator<'_>) -> SqlResult<()> {
        if let Some(from) = &self.from {
            sql.push_str(" FROM ");
            sql.push_str(&from.render_with(tr)?);
        }

        for join in &self.joins {
            sql.push(' ');
            sql.push_str(&join.render_with(tr)?);
        }

        let where_sql = self.where_clause.render_with(tr)?;
        if !where_sql.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&where_sql);
        }

        if !self.group_by.is_empty() {
            let cols: Vec<String> = self.group_by.iter().map(|c| tr.quote_identifier(c)).collect();
            sql.push_str(" GROUP BY ");
            sql.push_str(&cols.join(", "));
        }

        let having_sql = self.having.render_with(tr)?;
        if !having_sql.is_empty() {
            sql.push_str(" HAVING ");
            sql.push_str(&having_sql);
        }
        Ok(())
    }

    /// `SELECT [DISTINCT] [TOP n] cols[, extra] <body>`.
    fn render_core(
        &self,
        tr: &mut ParamTranslator<'_>,
        with_columns: bool,
        top: Option<u64>,
        extra_column: Option<String>,
    ) -> SqlResult<String> {
        let mut sql = String::from("SELECT ");
        if self.distinct {
            sql.push_str("DISTINCT ");
        }
        if let Some(n) = top {
            sql.push_str(&format!("TOP {n} "));
        }
        if with_columns || self.distinct {
            sql.push_str(&self.render_columns(tr));
        } else {
            sql.push('1');
        }
        if let Some(extra) = extra_column {
            sql.push_str(", ");
            sql.push_str(&extra);
        }
        self.push_body(&mut sql, tr)?;
        Ok(sql)
    }

    fn push_order(&self, sql: &mut String, tr: &ParamTranslator<'_>) {
        if !self.order_by.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&self.render_order(tr));
        }
    }

    fn render_limit_offset(&self, tr: &mut ParamTranslator<'_>) -> SqlResult<String> {
        let mut sql = self.render_core(tr, true, None, None)?;
        self.push_order(&mut sql, tr);

        match (self.limit, self.effective_offset()) {
            (Some(limit), Some(offset)) => {
                sql.push_str(&format!(" LIMIT {limit} OFFSET {offset}"));
            }
            (Some(limit), None) => sql.push_str(&format!(" LIMIT {limit}")),
            (None, Some(offset)) => match tr.target().spec().unbounded_limit {
                Some(unbounded) => {
                    sql.push_str(&format!(" LIMIT {unbounded} OFFSET {offset}"));
                }
                None => sql.push_str(&format!(" OFFSET {offset}")),
            },
            (None, None) => {}
        }
        Ok(sql)
    }

    fn render_sql_server(&self, tr: &mut ParamTranslator<'_>) -> SqlResult<String> {
        let Some(offset) = self.effective_offset() else {
            let mut sql = self.render_core(tr, true, self.limit, None)?;
            self.push_order(&mut sql, tr);
            return Ok(sql);
        };

        if self.order_by.is_empty() {
            return Err(SqlError::unsupported(
                Dialect::SqlServer,
                "OFFSET requires ORDER BY",
            ));
        }

        let row_number = tr.quote_identifier(ROW_NUMBER);
        let over = format!(
            "ROW_NUMBER() OVER (ORDER BY {}) AS {row_number}",
            self.render_order(tr)
        );
        // DISTINCT must apply before rows are numbered.
        let inner = if self.distinct {
            let rows = self.render_core(tr, true, None, None)?;
            format!(
                "SELECT *, {over} FROM ({rows}) AS {}",
                tr.quote_identifier("distinct_rows")
            )
        } else {
            self.render_core(tr, true, None, Some(over))?
        };

        let first = offset.saturating_add(1);
        let mut bounds = PredicateSet::new(tr.target().clone());
        match self.limit {
            Some(limit) => bounds.between(
                ROW_NUMBER,
                row_bound(first),
                row_bound(offset.saturating_add(limit)),
            ),
            None => bounds.gte(ROW_NUMBER, row_bound(first)),
        };
        let bounds = bounds.render_with(tr)?;

        Ok(format!(
            "SELECT * FROM ({inner}) AS {} WHERE {bounds} ORDER BY {row_number}",
            tr.quote_identifier("paged")
        ))
    }
}

impl Statement for Select {
    fn target(&self) -> &Target {
        &self.target
    }

    fn render_with(&self, tr: &mut ParamTranslator<'_>) -> SqlResult<String> {
        match tr.target().dialect() {
            Dialect::SqlServer => self.render_sql_server(tr),
            _ => self.render_limit_offset(tr),
        }
    }
}

fn row_bound(n: u64) -> Value {
    Value::Int(i64::try_from(n).unwrap_or(i64::MAX))
}

/// Split on commas that are not inside parentheses.
fn split_top_level(clause: &str) -> Vec<&str> {
    let mut items = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in clause.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                items.push(clause[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    items.push(clause[start..].trim());
    items.retain(|s| !s.is_empty());
    items
}

fn parse_order_item(item: &str) -> OrderItem {
    let upper = item.to_ascii_uppercase();
    for (suffix, direction) in [(" DESC", Direction::Desc), (" ASC", Direction::Asc)] {
        if upper.ends_with(suffix) {
            return OrderItem {
                column: item[..item.len() - suffix.len()].trim().to_string(),
                direction: Some(direction),
            };
        }
    }
    OrderItem {
        column: item.to_string(),
        direction: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_items_split_outside_parentheses() {
        assert_eq!(
            split_top_level("created_at DESC, COALESCE(a, b), id"),
            vec!["created_at DESC", "COALESCE(a, b)", "id"]
        );
        let item = parse_order_item("name desc");
        assert_eq!(item.column, "name");
        assert_eq!(item.direction, Some(Direction::Desc));
        assert_eq!(parse_order_item("id").direction, None);
    }

    #[test]
    fn paginate_clamps() {
        let mut q = Select::new(Dialect::MySql);
        q.from("users").paginate(0, 0);
        assert_eq!(q.render().unwrap(), "SELECT * FROM `users` LIMIT 1");

        q.paginate(3, 20);
        assert_eq!(q.render().unwrap(), "SELECT * FROM `users` LIMIT 20 OFFSET 40");

        q.paginate(u64::MAX, 2);
        assert_eq!(
            q.render().unwrap(),
            "SELECT * FROM `users` LIMIT 2 OFFSET 18446744073709551615"
        );
    }

    #[test]
    fn offset_alone_uses_unbounded_limit() {
        let mut q = Select::new(Dialect::MySql);
        q.from("t").offset(5);
        assert_eq!(
            q.render().unwrap(),
            "SELECT * FROM `t` LIMIT 18446744073709551615 OFFSET 5"
        );

        let mut q = Select::new(Dialect::Sqlite);
        q.from("t").offset(5);
        assert_eq!(q.render().unwrap(), r#"SELECT * FROM "t" LIMIT -1 OFFSET 5"#);

        let mut q = Select::new(Dialect::Postgres);
        q.from("t").offset(5);
        assert_eq!(q.render().unwrap(), r#"SELECT * FROM "t" OFFSET 5"#);
    }

    #[test]
    fn count_ignores_order_and_paging() {
        let mut q = Select::new(Dialect::Postgres);
        q.from("users").where_("status = 'active'").unwrap();
        q.order_by("id DESC").limit(10);
        assert_eq!(
            q.build_count().unwrap().sql,
            r#"SELECT COUNT(*) FROM "users" WHERE ("status" = 'active')"#
        );

        q.group_by(["status"]);
        assert_eq!(
            q.build_count().unwrap().sql,
            r#"SELECT COUNT(*) FROM (SELECT 1 FROM "users" WHERE ("status" = 'active') GROUP BY "status") AS "count_subquery""#
        );
    }
}
