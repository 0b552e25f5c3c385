//! # polysql
//!
//! A cross-dialect SQL statement compiler with savepoint-based nested
//! transactions.
//!
//! ## Features
//!
//! - **Four dialects**: MySQL, PostgreSQL, SQLite and SQL Server quoting,
//!   placeholders, paging and upsert syntax from one builder API
//! - **Condition DSL**: `"age >= 18"` text and shorthand map keys
//!   (`"%name%"`, `"id-"`, `"age>="`) parse into typed predicates
//! - **Composable conditions**: nested AND/OR predicate sets for WHERE,
//!   HAVING and JOIN ... ON
//! - **Placeholder translation**: `?`, `$n` and `:name` are rewritten into the
//!   dialect's native form, numbered per render
//! - **Nested transactions**: inner levels become savepoints
//!
//! ## Query Builder (qb)
//!
//! ```
//! use polysql::{Dialect, Statement, qb};
//!
//! let mut q = qb::select(Dialect::MySql);
//! q.columns(["id", "username"]).from("users").where_("id = 1")?;
//! assert_eq!(q.render()?, "SELECT `id`, `username` FROM `users` WHERE (`id` = 1)");
//!
//! let mut q = qb::select(Dialect::SqlServer);
//! q.from("users").order_by("id").limit(10).offset(10);
//! assert!(q.render()?.contains("ROW_NUMBER() OVER (ORDER BY [id])"));
//! # Ok::<(), polysql::SqlError>(())
//! ```
//!
//! ## Transactions
//!
//! Statements execute through a [`Connection`]; an [`Adapter`] owns one and
//! tracks transaction depth. See [`transaction!`].

pub mod client;
pub mod config;
pub mod dialect;
pub mod error;
pub mod ident;
pub mod param;
pub mod parse;
pub mod predicate;
pub mod predicate_set;
pub mod qb;
pub mod sql;
pub mod transaction;
pub mod value;

#[cfg(feature = "postgres")]
pub mod pg;

pub use client::Connection;
pub use config::AdapterConfig;
pub use dialect::{Dialect, DialectSpec, Escape, PlaceholderStyle, Target};
pub use error::{SqlError, SqlResult};
pub use ident::Ident;
pub use param::{ParamTranslator, is_parameter_token};
pub use parse::{Expression, parse_expression, parse_shorthand};
pub use predicate::{Conjunction, Operator, Predicate};
pub use predicate_set::{Criterion, PredicateSet};
pub use sql::{Sql, StatementKind};
pub use transaction::{Adapter, TransactionManager};
pub use value::Value;

// Re-export qb module for easy access
pub use qb::{BuiltQuery, Delete, Insert, JoinKind, Select, Statement, TableRef, Update};
