//! Trait shared by every statement builder.

use crate::client::Connection;
use crate::dialect::Target;
use crate::error::SqlResult;
use crate::param::ParamTranslator;
use crate::value::Value;

/// Rendered SQL and the deferred values bound to its placeholders, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltQuery {
    pub sql: String,
    pub params: Vec<Value>,
}

/// Base trait for all statement builders.
pub trait Statement: Sync {
    /// Rendering target the statement was created for.
    fn target(&self) -> &Target;

    /// Render into an existing pass, sharing its placeholder numbering.
    fn render_with(&self, tr: &mut ParamTranslator<'_>) -> SqlResult<String>;

    /// Render SQL text and collect deferred parameter values.
    fn build(&self) -> SqlResult<BuiltQuery> {
        let mut tr = ParamTranslator::new(self.target());
        let sql = self.render_with(&mut tr)?;
        Ok(BuiltQuery {
            sql,
            params: tr.into_params(),
        })
    }

    /// Render SQL text only.
    fn render(&self) -> SqlResult<String> {
        self.build().map(|built| built.sql)
    }

    /// Render and execute on `conn`, returning the affected row count.
    fn execute(
        &self,
        conn: &impl Connection,
    ) -> impl std::future::Future<Output = SqlResult<u64>> + Send {
        async move {
            let built = self.build()?;
            conn.execute(&built.sql, &built.params).await
        }
    }
}
