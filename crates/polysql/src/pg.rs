//! PostgreSQL connection over `tokio-postgres`.
//!
//! ```ignore
//! use polysql::{Adapter, pg::PgConnection};
//! use tokio_postgres::NoTls;
//!
//! let (client, connection) = tokio_postgres::connect("postgres://...", NoTls).await?;
//! tokio::spawn(async move { let _ = connection.await; });
//!
//! let mut adapter = Adapter::new(PgConnection::new(client));
//! let mut q = adapter.sql();
//! q.delete().from("sessions").where_("expires_at < NOW()")?;
//! let removed = adapter.execute(&q).await?;
//! ```

use crate::client::Connection;
use crate::dialect::Dialect;
use crate::error::SqlResult;
use crate::qb::BuiltQuery;
use crate::value::Value;
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

/// A [`Connection`] backed by a `tokio_postgres::Client`.
pub struct PgConnection {
    client: tokio_postgres::Client,
}

impl PgConnection {
    pub fn new(client: tokio_postgres::Client) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &tokio_postgres::Client {
        &self.client
    }

    pub fn into_inner(self) -> tokio_postgres::Client {
        self.client
    }

    /// Run a rendered SELECT (or `RETURNING` statement) and collect its rows.
    pub async fn query(&self, built: &BuiltQuery) -> SqlResult<Vec<Row>> {
        let params = param_refs(&built.params);
        Ok(self.client.query(built.sql.as_str(), &params).await?)
    }
}

impl std::fmt::Debug for PgConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgConnection").finish_non_exhaustive()
    }
}

fn param_refs(values: &[Value]) -> Vec<&(dyn ToSql + Sync)> {
    values.iter().map(|v| v as &(dyn ToSql + Sync)).collect()
}

impl Connection for PgConnection {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    async fn batch_execute(&self, sql: &str) -> SqlResult<()> {
        self.client.batch_execute(sql).await?;
        Ok(())
    }

    async fn execute(&self, sql: &str, params: &[Value]) -> SqlResult<u64> {
        let params = param_refs(params);
        Ok(self.client.execute(sql, &params).await?)
    }
}
