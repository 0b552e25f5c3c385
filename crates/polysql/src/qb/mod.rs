//! Statement builders for polysql.
//!
//! Every builder is created for a [`Target`] and renders through a fresh
//! [`ParamTranslator`](crate::param::ParamTranslator) on each call, so the same
//! builder can be rendered any number of times with identical output.
//!
//! # Usage
//!
//! ```
//! use polysql::{Dialect, Statement, qb};
//!
//! let mut q = qb::select(Dialect::Postgres);
//! q.columns(["id", "username"])
//!     .from("users")
//!     .where_("status = :status")?
//!     .order_by("created_at DESC")
//!     .limit(20);
//! assert_eq!(
//!     q.render()?,
//!     r#"SELECT "id", "username" FROM "users" WHERE ("status" = $1) ORDER BY "created_at" DESC LIMIT 20"#
//! );
//! # Ok::<(), polysql::SqlError>(())
//! ```

use crate::dialect::Target;

/// WHERE helpers shared by SELECT, UPDATE and DELETE.
macro_rules! where_methods {
    ($field:ident) => {
        /// AND a condition into WHERE.
        pub fn where_(
            &mut self,
            criterion: impl Into<$crate::predicate_set::Criterion>,
        ) -> $crate::error::SqlResult<&mut Self> {
            self.$field.and_add(criterion)?;
            Ok(self)
        }

        /// OR a condition into WHERE.
        pub fn or_where(
            &mut self,
            criterion: impl Into<$crate::predicate_set::Criterion>,
        ) -> $crate::error::SqlResult<&mut Self> {
            self.$field.or_add(criterion)?;
            Ok(self)
        }

        /// AND every shorthand entry into WHERE, in iteration order.
        pub fn where_map<I, K, V>(&mut self, entries: I) -> $crate::error::SqlResult<&mut Self>
        where
            I: IntoIterator<Item = (K, V)>,
            K: AsRef<str>,
            V: Into<$crate::value::Value>,
        {
            self.$field.add_map(entries)?;
            Ok(self)
        }

        /// The WHERE set, for nesting and typed adders.
        pub fn where_clause(&mut self) -> &mut $crate::predicate_set::PredicateSet {
            &mut self.$field
        }
    };
}

mod delete;
mod insert;
mod select;
mod table;
mod traits;
mod update;


pub use delete::Delete;
pub use insert::Insert;
pub use select::{Direction, Select};
pub use table::{Join, JoinKind, TableRef};
pub use traits::{BuiltQuery, Statement};
pub use update::Update;

/// Create a SELECT builder.
pub fn select(target: impl Into<Target>) -> Select {
    Select::new(target)
}

/// Create an INSERT builder.
pub fn insert(target: impl Into<Target>) -> Insert {
    Insert::new(target)
}

/// Create an UPDATE builder.
pub fn update(target: impl Into<Target>) -> Update {
    Update::new(target)
}

/// Create a DELETE builder.
pub fn delete(target: impl Into<Target>) -> Delete {
    Delete::new(target)
}
