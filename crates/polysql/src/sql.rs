//! Statement container bound to one rendering target.
//!
//! `Sql` holds at most one active statement. Activating a kind returns the
//! builder already active for that kind, or starts a fresh one and drops any
//! statement of another kind.
//!
//! # Example
//!
//! ```
//! use polysql::{Dialect, Sql, Statement};
//!
//! let mut q = Sql::new(Dialect::Postgres);
//! q.insert().into_table("users").value("name", "alice");
//! assert_eq!(q.render()?, r#"INSERT INTO "users" ("name") VALUES ('alice')"#);
//!
//! // Switching kind clears the INSERT.
//! q.delete().from("users").where_("name = 'alice'")?;
//! assert_eq!(q.render()?, r#"DELETE FROM "users" WHERE ("name" = 'alice')"#);
//! # Ok::<(), polysql::SqlError>(())
//! ```

use crate::client::Connection;
use crate::dialect::Target;
use crate::error::{SqlError, SqlResult};
use crate::param::ParamTranslator;
use crate::qb::{Delete, Insert, Select, Statement, Update};

/// Kind of the statement currently held by a [`Sql`] container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
}

/// Container holding at most one active statement builder.
#[derive(Debug, Clone)]
pub struct Sql {
    target: Target,
    select: Option<Select>,
    insert: Option<Insert>,
    update: Option<Update>,
    delete: Option<Delete>,
}

impl Sql {
    pub fn new(target: impl Into<Target>) -> Self {
        Self {
            target: target.into(),
            select: None,
            insert: None,
            update: None,
            delete: None,
        }
    }

    /// Container rendering for `conn`'s dialect and string escaper.
    pub fn for_connection(conn: &impl Connection) -> Self {
        Self::new(Target::with_escaper(conn.dialect(), conn.escaper()))
    }

    /// Kind of the active statement, if any.
    pub fn kind(&self) -> Option<StatementKind> {
        if self.select.is_some() {
            Some(StatementKind::Select)
        } else if self.insert.is_some() {
            Some(StatementKind::Insert)
        } else if self.update.is_some() {
            Some(StatementKind::Update)
        } else if self.delete.is_some() {
            Some(StatementKind::Delete)
        } else {
            None
        }
    }

    /// Drop the active statement.
    pub fn reset(&mut self) -> &mut Self {
        self.select = None;
        self.insert = None;
        self.update = None;
        self.delete = None;
        self
    }

    pub fn select(&mut self) -> &mut Select {
        self.insert = None;
        self.update = None;
        self.delete = None;
        let target = &self.target;
        self.select.get_or_insert_with(|| Select::new(target.clone()))
    }

    pub fn insert(&mut self) -> &mut Insert {
        self.select = None;
        self.update = None;
        self.delete = None;
        let target = &self.target;
        self.insert.get_or_insert_with(|| Insert::new(target.clone()))
    }

    pub fn update(&mut self) -> &mut Update {
        self.select = None;
        self.insert = None;
        self.delete = None;
        let target = &self.target;
        self.update.get_or_insert_with(|| Update::new(target.clone()))
    }

    pub fn delete(&mut self) -> &mut Delete {
        self.select = None;
        self.insert = None;
        self.update = None;
        let target = &self.target;
        self.delete.get_or_insert_with(|| Delete::new(target.clone()))
    }

    /// Take the active SELECT out of the container, e.g. to use as a subquery.
    pub fn into_select(self) -> Option<Select> {
        self.select
    }
}

impl Statement for Sql {
    fn target(&self) -> &Target {
        &self.target
    }

    fn render_with(&self, tr: &mut ParamTranslator<'_>) -> SqlResult<String> {
        if let Some(q) = &self.select {
            q.render_with(tr)
        } else if let Some(q) = &self.insert {
            q.render_with(tr)
        } else if let Some(q) = &self.update {
            q.render_with(tr)
        } else if let Some(q) = &self.delete {
            q.render_with(tr)
        } else {
            Err(SqlError::EmptyStatement)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Dialect;

    #[test]
    fn test_empty_container_is_an_error() {
        let q = Sql::new(Dialect::MySql);
        assert!(matches!(q.render(), Err(SqlError::EmptyStatement)));
        assert!(matches!(q.build(), Err(SqlError::EmptyStatement)));
    }

    #[test]
    fn test_same_kind_is_reused() {
        let mut q = Sql::new(Dialect::MySql);
        q.select().from("users");
        q.select().limit(3);
        assert_eq!(q.kind(), Some(StatementKind::Select));
        assert_eq!(q.render().unwrap(), "SELECT * FROM `users` LIMIT 3");
    }

    #[test]
    fn test_switching_kind_clears_previous() {
        let mut q = Sql::new(Dialect::MySql);
        q.update().table("users").set("a", 1);
        q.select().from("users");
        assert_eq!(q.kind(), Some(StatementKind::Select));
        q.update().table("t");
        // The earlier SET is gone.
        assert_eq!(q.render().unwrap(), "UPDATE `t` SET");

        q.reset();
        assert_eq!(q.kind(), None);
    }

    #[test]
    fn test_container_select_as_subquery() {
        let mut inner = Sql::new(Dialect::Postgres);
        inner.select().from("orders");
        let inner = inner.into_select().unwrap();

        let mut outer = Sql::new(Dialect::Postgres);
        outer.select().from_subquery(inner, "o");
        assert_eq!(
            outer.render().unwrap(),
            r#"SELECT * FROM (SELECT * FROM "orders") AS "o""#
        );
    }
}
