//! FROM/JOIN targets.

use crate::dialect::split_alias;
use crate::error::{SqlError, SqlResult};
use crate::param::ParamTranslator;
use crate::predicate_set::PredicateSet;
use crate::qb::select::Select;
use crate::qb::traits::Statement;

/// A table reference: bare name, aliased name, or aliased subquery.
#[derive(Debug, Clone)]
pub enum TableRef {
    Name(String),
    Aliased { table: String, alias: String },
    Subquery { select: Box<Select>, alias: String },
}

impl TableRef {
    pub fn aliased(table: impl Into<String>, alias: impl Into<String>) -> Self {
        TableRef::Aliased {
            table: table.into(),
            alias: alias.into(),
        }
    }

    pub fn subquery(select: Select, alias: impl Into<String>) -> Self {
        TableRef::Subquery {
            select: Box::new(select),
            alias: alias.into(),
        }
    }

    /// Build from an `alias => table` map, which must hold exactly one entry.
    pub fn from_alias_map<I, A, T>(entries: I) -> SqlResult<Self>
    where
        I: IntoIterator<Item = (A, T)>,
        A: Into<String>,
        T: Into<String>,
    {
        let mut entries: Vec<(String, String)> = entries
            .into_iter()
            .map(|(alias, table)| (alias.into(), table.into()))
            .collect();
        if entries.len() != 1 {
            return Err(SqlError::InvalidTableShape(entries.len()));
        }
        match entries.pop() {
            Some((alias, table)) => Ok(Self::aliased(table, alias)),
            None => Err(SqlError::InvalidTableShape(0)),
        }
    }

    /// Alias if set, else the table name.
    pub fn reference_name(&self) -> &str {
        match self {
            TableRef::Name(name) => name,
            TableRef::Aliased { alias, .. } | TableRef::Subquery { alias, .. } => alias,
        }
    }

    pub(crate) fn render_with(&self, tr: &mut ParamTranslator<'_>) -> SqlResult<String> {
        match self {
            TableRef::Name(name) => Ok(tr.quote_identifier(name)),
            TableRef::Aliased { table, alias } => Ok(format!(
                "{} AS {}",
                tr.quote_identifier(table),
                tr.quote_identifier(alias)
            )),
            TableRef::Subquery { select, alias } => {
                let inner = select.render_with(tr)?;
                Ok(format!("({inner}) AS {}", tr.quote_identifier(alias)))
            }
        }
    }
}

impl From<&str> for TableRef {
    /// `"users"` or `"users AS u"`.
    fn from(s: &str) -> Self {
        match split_alias(s.trim()) {
            Some((table, alias)) => TableRef::aliased(table, alias),
            None => TableRef::Name(s.trim().to_string()),
        }
    }
}

impl From<String> for TableRef {
    fn from(s: String) -> Self {
        TableRef::from(s.as_str())
    }
}

/// JOIN type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Full,
}

impl JoinKind {
    pub fn as_sql(self) -> &'static str {
        match self {
            JoinKind::Inner => "INNER JOIN",
            JoinKind::Left => "LEFT JOIN",
            JoinKind::Right => "RIGHT JOIN",
            JoinKind::Full => "FULL OUTER JOIN",
        }
    }
}

/// One JOIN clause with its ON conditions.
#[derive(Debug, Clone)]
pub struct Join {
    pub kind: JoinKind,
    pub table: TableRef,
    pub on: PredicateSet,
}

impl Join {
    pub(crate) fn render_with(&self, tr: &mut ParamTranslator<'_>) -> SqlResult<String> {
        let table = self.table.render_with(tr)?;
        let on = self.on.render_with(tr)?;
        if on.is_empty() {
            Ok(format!("{} {table}", self.kind.as_sql()))
        } else {
            Ok(format!("{} {table} ON {on}", self.kind.as_sql()))
        }
    }
}
