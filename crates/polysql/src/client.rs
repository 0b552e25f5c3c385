//! Connection boundary consumed by statements and the transaction manager.

use crate::dialect::{Dialect, Escape};
use crate::error::SqlResult;
use crate::value::Value;
use std::future::Future;
use std::sync::Arc;

/// A database connection as seen by polysql.
///
/// Implementors supply the dialect, string escaping and two execution
/// primitives. The transaction primitives default to executing the
/// dialect's literal SQL (`BEGIN`, `SAVEPOINT name`, ...) through
/// [`Connection::batch_execute`]; drivers with a dedicated API override them.
pub trait Connection: Send + Sync {
    /// Dialect spoken by this connection.
    fn dialect(&self) -> Dialect;

    /// String escaper used when literals are inlined into SQL text.
    fn escaper(&self) -> Arc<dyn Escape> {
        Arc::new(self.dialect())
    }

    /// Escape `value` for inclusion between single quotes.
    fn escape(&self, value: &str) -> String {
        self.escaper().escape(value)
    }

    /// Execute one or more statements without parameters.
    fn batch_execute(&self, sql: &str) -> impl Future<Output = SqlResult<()>> + Send;

    /// Execute a statement with bound values and return the affected row count.
    fn execute(
        &self,
        sql: &str,
        params: &[Value],
    ) -> impl Future<Output = SqlResult<u64>> + Send;

    fn begin(&self) -> impl Future<Output = SqlResult<()>> + Send {
        self.batch_execute(self.dialect().begin_sql())
    }

    fn commit(&self) -> impl Future<Output = SqlResult<()>> + Send {
        self.batch_execute(self.dialect().commit_sql())
    }

    fn rollback(&self) -> impl Future<Output = SqlResult<()>> + Send {
        self.batch_execute(self.dialect().rollback_sql())
    }

    fn savepoint(&self, name: &str) -> impl Future<Output = SqlResult<()>> + Send {
        async move {
            let sql = self.dialect().savepoint_sql(name);
            self.batch_execute(&sql).await
        }
    }

    /// Release a savepoint. A no-op on dialects without `RELEASE SAVEPOINT`.
    fn release_savepoint(&self, name: &str) -> impl Future<Output = SqlResult<()>> + Send {
        async move {
            match self.dialect().release_savepoint_sql(name) {
                Some(sql) => self.batch_execute(&sql).await,
                None => Ok(()),
            }
        }
    }

    fn rollback_to_savepoint(&self, name: &str) -> impl Future<Output = SqlResult<()>> + Send {
        async move {
            let sql = self.dialect().rollback_to_savepoint_sql(name);
            self.batch_execute(&sql).await
        }
    }
}
