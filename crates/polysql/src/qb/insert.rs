//! INSERT builder with dialect-aware upsert and RETURNING.

use crate::dialect::{ReturningStyle, Target, UpsertStyle};
use crate::error::{SqlError, SqlResult};
use crate::param::ParamTranslator;
use crate::qb::traits::Statement;
use crate::value::Value;

/// Conflict handling requested for an INSERT.
#[derive(Clone, Debug, Default)]
struct Upsert {
    /// Conflict target columns (required for `ON CONFLICT ... DO UPDATE`).
    keys: Vec<String>,
    /// Columns to overwrite; `None` means every inserted column except the keys.
    update: Option<Vec<String>>,
    /// Ignore the conflicting row instead of updating it.
    do_nothing: bool,
}

/// INSERT statement for one row.
#[derive(Clone, Debug)]
pub struct Insert {
    target: Target,
    table: Option<String>,
    values: Vec<(String, Value)>,
    upsert: Option<Upsert>,
    returning: Vec<String>,
}

impl Insert {
    pub fn new(target: impl Into<Target>) -> Self {
        Self {
            target: target.into(),
            table: None,
            values: Vec::new(),
            upsert: None,
            returning: Vec::new(),
        }
    }

    pub fn into_table(&mut self, table: impl Into<String>) -> &mut Self {
        self.table = Some(table.into());
        self
    }

    /// Set a column value. Columns render in the order they were set.
    pub fn value(&mut self, column: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.values.push((column.into(), value.into()));
        self
    }

    /// Set many column values, in iteration order.
    pub fn values<I, K, V>(&mut self, entries: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.values
            .extend(entries.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    fn upsert_mut(&mut self) -> &mut Upsert {
        self.upsert.get_or_insert_with(Upsert::default)
    }

    /// Turn the insert into an upsert keyed on `keys`.
    pub fn on_conflict<I, S>(&mut self, keys: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.upsert_mut().keys = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Turn the insert into an upsert without naming a conflict key.
    /// Enough for MySQL; PostgreSQL and SQLite also need [`Insert::on_conflict`].
    pub fn upsert(&mut self) -> &mut Self {
        self.upsert_mut();
        self
    }

    /// Columns overwritten on conflict.
    pub fn update_columns<I, S>(&mut self, columns: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.upsert_mut().update = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Skip conflicting rows (`ON CONFLICT DO NOTHING` / `INSERT IGNORE`).
    pub fn do_nothing(&mut self) -> &mut Self {
        self.upsert_mut().do_nothing = true;
        self
    }

    /// Columns returned from the inserted row.
    pub fn returning<I, S>(&mut self, columns: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.returning = columns.into_iter().map(Into::into).collect();
        self
    }

    fn update_set(&self, upsert: &Upsert) -> Vec<String> {
        match &upsert.update {
            Some(cols) => cols.clone(),
            None => self
                .values
                .iter()
                .map(|(c, _)| c.clone())
                .filter(|c| !upsert.keys.contains(c))
                .collect(),
        }
    }

    fn conflict_clause(&self, upsert: &Upsert, tr: &ParamTranslator<'_>) -> SqlResult<String> {
        let dialect = tr.target().dialect();
        match tr.target().spec().upsert {
            UpsertStyle::OnDuplicateKey => {
                if upsert.do_nothing {
                    return Ok(String::new());
                }
                let mut cols = self.update_set(upsert);
                if cols.is_empty() {
                    cols = self.values.iter().map(|(c, _)| c.clone()).collect();
                }
                let sets: Vec<String> = cols
                    .iter()
                    .map(|c| {
                        let c = tr.quote_identifier(c);
                        format!("{c} = VALUES({c})")
                    })
                    .collect();
                Ok(format!(" ON DUPLICATE KEY UPDATE {}", sets.join(", ")))
            }
            UpsertStyle::OnConflict => {
                let keys: Vec<String> = upsert.keys.iter().map(|k| tr.quote_identifier(k)).collect();
                let cols = self.update_set(upsert);
                if upsert.do_nothing || cols.is_empty() {
                    if keys.is_empty() {
                        return Ok(" ON CONFLICT DO NOTHING".to_string());
                    }
                    return Ok(format!(" ON CONFLICT ({}) DO NOTHING", keys.join(", ")));
                }
                if keys.is_empty() {
                    return Err(SqlError::unsupported(
                        dialect,
                        "ON CONFLICT ... DO UPDATE requires a conflict key",
                    ));
                }
                let sets: Vec<String> = cols
                    .iter()
                    .map(|c| {
                        let c = tr.quote_identifier(c);
                        format!("{c} = excluded.{c}")
                    })
                    .collect();
                Ok(format!(
                    " ON CONFLICT ({}) DO UPDATE SET {}",
                    keys.join(", "),
                    sets.join(", ")
                ))
            }
            UpsertStyle::Unsupported => Err(SqlError::unsupported(dialect, "upsert")),
        }
    }
}

impl Statement for Insert {
    fn target(&self) -> &Target {
        &self.target
    }

    fn render_with(&self, tr: &mut ParamTranslator<'_>) -> SqlResult<String> {
        let table = self
            .table
            .as_deref()
            .ok_or_else(|| SqlError::Other("INSERT requires a table".to_string()))?;
        let spec = tr.target().spec();
        let dialect = tr.target().dialect();

        let ignore = matches!(spec.upsert, UpsertStyle::OnDuplicateKey)
            && self.upsert.as_ref().is_some_and(|u| u.do_nothing);
        let mut sql = String::from(if ignore { "INSERT IGNORE INTO " } else { "INSERT INTO " });
        sql.push_str(&tr.quote_identifier(table));

        let columns: Vec<String> = self.values.iter().map(|(c, _)| tr.quote_identifier(c)).collect();
        sql.push_str(&format!(" ({})", columns.join(", ")));

        let returning: Vec<String> = self.returning.iter().map(|c| tr.quote_identifier(c)).collect();
        if !returning.is_empty() {
            match spec.returning {
                ReturningStyle::Output => {
                    let inserted: Vec<String> =
                        returning.iter().map(|c| format!("INSERTED.{c}")).collect();
                    sql.push_str(&format!(" OUTPUT {}", inserted.join(", ")));
                }
                ReturningStyle::Returning => {}
                ReturningStyle::Unsupported => {
                    return Err(SqlError::unsupported(dialect, "RETURNING"));
                }
            }
        }

        let values: Vec<String> = self
            .values
            .iter()
            .map(|(c, v)| tr.quote_value(v, Some(c.as_str())))
            .collect();
        sql.push_str(&format!(" VALUES ({})", values.join(", ")));

        if let Some(upsert) = &self.upsert {
            sql.push_str(&self.conflict_clause(upsert, tr)?);
        }

        if !returning.is_empty() && spec.returning == ReturningStyle::Returning {
            sql.push_str(&format!(" RETURNING {}", returning.join(", ")));
        }

        Ok(sql)
    }
}
