//! Nested transactions over a single connection.
//!
//! The outermost [`TransactionManager::enter`] opens a real transaction;
//! every nested one becomes a savepoint. Leaving a nested level releases or
//! rolls back to its savepoint, leaving the outermost level commits or rolls
//! back the whole transaction.
//!
//! For ergonomic commit/rollback handling, use the [`transaction!`] macro.
//!
//! # Example
//!
//! ```ignore
//! use polysql::{Adapter, SqlResult, Statement};
//!
//! # async fn demo(adapter: &mut Adapter<impl polysql::Connection>) -> SqlResult<()> {
//! polysql::transaction!(adapter, {
//!     let mut debit = adapter.sql();
//!     debit.update().table("accounts").set_raw("balance", "balance - 100").where_("id = 1")?;
//!     adapter.execute(&debit).await?;
//!
//!     // Nested: runs inside a savepoint.
//!     let audit = polysql::transaction!(adapter, {
//!         let mut q = adapter.sql();
//!         q.insert().into_table("audit").value("event", "debit");
//!         adapter.execute(&q).await
//!     });
//!     if audit.is_err() {
//!         // Only the audit insert was rolled back.
//!     }
//!     Ok(())
//! })?;
//! # Ok(()) }
//! ```

use crate::client::Connection;
use crate::config::{AdapterConfig, DEFAULT_SAVEPOINT_PREFIX};
use crate::dialect::{Dialect, Target};
use crate::error::{SqlError, SqlResult};
use crate::param::placeholder_name;
use crate::qb::Statement;
use crate::sql::Sql;

/// Runs the given block inside a (possibly nested) transaction on an [`Adapter`].
///
/// - Enters a transaction level via `$adapter.begin().await`.
/// - Commits (or releases the savepoint) on `Ok(_)`.
/// - Rolls back (or rolls back to the savepoint) on `Err(_)`.
///
/// The block must evaluate to `polysql::SqlResult<T>`.
#[macro_export]
macro_rules! transaction {
    ($adapter:expr, $body:block) => {{
        ($adapter).begin().await?;

        let __polysql_tx_body_result: $crate::SqlResult<_> = async { $body }.await;
        match __polysql_tx_body_result {
            Ok(value) => {
                ($adapter).commit().await?;
                Ok(value)
            }
            Err(error) => match ($adapter).rollback().await {
                Ok(()) => Err(error),
                Err(rollback_err) => Err($crate::SqlError::Other(format!(
                    "{error} (rollback failed: {rollback_err})"
                ))),
            },
        }
    }};
}

/// Depth counter and savepoint stack for one connection.
#[derive(Debug, Clone)]
pub struct TransactionManager {
    depth: usize,
    savepoints: Vec<String>,
    sequence: u64,
    prefix: String,
}

impl Default for TransactionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionManager {
    pub fn new() -> Self {
        Self::with_prefix(DEFAULT_SAVEPOINT_PREFIX)
    }

    /// Manager naming its savepoints `{prefix}_{n}`.
    pub fn with_prefix(prefix: &str) -> Self {
        Self {
            depth: 0,
            savepoints: Vec::new(),
            sequence: 0,
            prefix: placeholder_name(prefix),
        }
    }

    /// Current nesting depth; 0 means no transaction is open.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn is_active(&self) -> bool {
        self.depth > 0
    }

    /// Savepoints currently open, innermost last.
    pub fn savepoints(&self) -> &[String] {
        &self.savepoints
    }

    fn next_savepoint_name(&mut self) -> String {
        self.sequence += 1;
        format!("{}_{}", self.prefix, self.sequence)
    }

    /// Open a transaction level: BEGIN at depth 0, a new savepoint otherwise.
    ///
    /// The depth only changes when the primitive succeeds.
    pub async fn enter<C: Connection>(&mut self, conn: &C) -> SqlResult<()> {
        if self.depth == 0 {
            conn.begin().await?;
            #[cfg(feature = "tracing")]
            tracing::debug!(target: "polysql.tx", depth = 1, "begin");
        } else {
            let name = self.next_savepoint_name();
            conn.savepoint(&name).await?;
            #[cfg(feature = "tracing")]
            tracing::debug!(target: "polysql.tx", depth = self.depth + 1, savepoint = %name, "savepoint");
            self.savepoints.push(name);
        }
        self.depth += 1;
        Ok(())
    }

    /// Close the innermost level, keeping (`success`) or discarding its work.
    ///
    /// At depth 1 the state is reset before COMMIT/ROLLBACK is issued, so a
    /// failed commit still leaves the manager at depth 0.
    pub async fn leave<C: Connection>(&mut self, conn: &C, success: bool) -> SqlResult<()> {
        match self.depth {
            0 => Err(SqlError::transaction("no active transaction")),
            1 => {
                self.depth = 0;
                self.savepoints.clear();
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    target: "polysql.tx",
                    depth = 0,
                    outcome = if success { "commit" } else { "rollback" },
                    "end"
                );
                if success {
                    conn.commit().await
                } else {
                    conn.rollback().await
                }
            }
            depth => {
                let name = self.savepoints.pop().ok_or_else(|| {
                    SqlError::transaction(format!("no savepoint recorded for depth {depth}"))
                })?;
                self.depth -= 1;
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    target: "polysql.tx",
                    depth = self.depth,
                    savepoint = %name,
                    outcome = if success { "release" } else { "rollback" },
                    "end savepoint"
                );
                if success {
                    conn.release_savepoint(&name).await
                } else {
                    conn.rollback_to_savepoint(&name).await
                }
            }
        }
    }
}

/// One connection plus its lazily created [`TransactionManager`].
#[derive(Debug)]
pub struct Adapter<C> {
    conn: C,
    config: AdapterConfig,
    transactions: Option<TransactionManager>,
}

impl<C: Connection> Adapter<C> {
    pub fn new(conn: C) -> Self {
        Self::with_config(conn, AdapterConfig::default())
    }

    pub fn with_config(conn: C, config: AdapterConfig) -> Self {
        Self {
            conn,
            config,
            transactions: None,
        }
    }

    pub fn connection(&self) -> &C {
        &self.conn
    }

    pub fn into_inner(self) -> C {
        self.conn
    }

    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    pub fn dialect(&self) -> Dialect {
        self.conn.dialect()
    }

    /// Rendering target for this connection: its dialect and escaper.
    pub fn target(&self) -> Target {
        Target::with_escaper(self.conn.dialect(), self.conn.escaper())
    }

    /// Empty statement container bound to this connection.
    pub fn sql(&self) -> Sql {
        Sql::new(self.target())
    }

    /// The transaction manager, created on first use.
    pub fn transaction_manager(&mut self) -> &mut TransactionManager {
        let prefix = &self.config.savepoint_prefix;
        self.transactions
            .get_or_insert_with(|| TransactionManager::with_prefix(prefix))
    }

    /// Current transaction depth; 0 before any transaction was started.
    pub fn transaction_depth(&self) -> usize {
        self.transactions.as_ref().map_or(0, TransactionManager::depth)
    }

    pub async fn begin(&mut self) -> SqlResult<()> {
        let Self {
            conn,
            config,
            transactions,
        } = self;
        let tm = transactions
            .get_or_insert_with(|| TransactionManager::with_prefix(&config.savepoint_prefix));
        tm.enter(&*conn).await
    }

    pub async fn commit(&mut self) -> SqlResult<()> {
        self.leave(true).await
    }

    pub async fn rollback(&mut self) -> SqlResult<()> {
        self.leave(false).await
    }

    async fn leave(&mut self, success: bool) -> SqlResult<()> {
        match self.transactions.as_mut() {
            Some(tm) => tm.leave(&self.conn, success).await,
            None => Err(SqlError::transaction("no active transaction")),
        }
    }

    /// Render `statement` and execute it, returning the affected row count.
    pub async fn execute(&self, statement: &impl Statement) -> SqlResult<u64> {
        let built = statement.build()?;
        #[cfg(feature = "tracing")]
        {
            if self.config.log_sql {
                tracing::debug!(
                    target: "polysql.sql",
                    dialect = %self.conn.dialect(),
                    param_count = built.params.len(),
                    sql = %self.config.truncate_sql(&built.sql),
                );
            }
        }
        self.conn.execute(&built.sql, &built.params).await
    }
}
