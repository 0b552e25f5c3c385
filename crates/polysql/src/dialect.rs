//! Dialect descriptors: per-backend quoting, placeholder, paging and upsert rules.
//!
//! A [`Dialect`] is chosen once (usually from a [`Connection`](crate::Connection))
//! and every builder renders through its [`DialectSpec`] table instead of
//! branching on dialect names at each render site.

use crate::error::{SqlError, SqlResult};
use crate::ident::Ident;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Target SQL dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[serde(alias = "mariadb")]
    MySql,
    #[serde(alias = "pgsql", alias = "postgresql")]
    Postgres,
    #[serde(alias = "sqlite3")]
    Sqlite,
    #[serde(alias = "sqlsrv", alias = "mssql")]
    SqlServer,
}

/// Native placeholder convention of a dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderStyle {
    /// `?`
    Positional,
    /// `$1`, `$2`, ...
    Numbered,
    /// `:name`
    Named,
}

/// Upsert syntax family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertStyle {
    /// `ON DUPLICATE KEY UPDATE col = VALUES(col)`
    OnDuplicateKey,
    /// `ON CONFLICT (key) DO UPDATE SET col = excluded.col`
    OnConflict,
    Unsupported,
}

/// How inserted rows are returned to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturningStyle {
    /// Trailing `RETURNING ...`
    Returning,
    /// `OUTPUT INSERTED....` before `VALUES`
    Output,
    Unsupported,
}

/// Static facts about one dialect.
#[derive(Debug)]
pub struct DialectSpec {
    pub name: &'static str,
    pub open_quote: char,
    pub close_quote: char,
    pub placeholder: PlaceholderStyle,
    pub upsert: UpsertStyle,
    pub returning: ReturningStyle,
    /// LIMIT literal used when only an OFFSET is requested. `None` means OFFSET may stand alone.
    pub unbounded_limit: Option<&'static str>,
    /// Render booleans as `TRUE`/`FALSE` rather than `1`/`0`.
    pub boolean_literals: bool,
    /// Backslash is an escape character inside string literals.
    pub backslash_escapes: bool,
    pub begin: &'static str,
    pub commit: &'static str,
    pub rollback: &'static str,
    pub savepoint: &'static str,
    pub release_savepoint: Option<&'static str>,
    pub rollback_to_savepoint: &'static str,
}

static MYSQL: DialectSpec = DialectSpec {
    name: "MySQL",
    open_quote: '`',
    close_quote: '`',
    placeholder: PlaceholderStyle::Positional,
    upsert: UpsertStyle::OnDuplicateKey,
    returning: ReturningStyle::Unsupported,
    unbounded_limit: Some("18446744073709551615"),
    boolean_literals: false,
    backslash_escapes: true,
    begin: "START TRANSACTION",
    commit: "COMMIT",
    rollback: "ROLLBACK",
    savepoint: "SAVEPOINT",
    release_savepoint: Some("RELEASE SAVEPOINT"),
    rollback_to_savepoint: "ROLLBACK TO SAVEPOINT",
};

static POSTGRES: DialectSpec = DialectSpec {
    name: "PostgreSQL",
    open_quote: '"',
    close_quote: '"',
    placeholder: PlaceholderStyle::Numbered,
    upsert: UpsertStyle::OnConflict,
    returning: ReturningStyle::Returning,
    unbounded_limit: None,
    boolean_literals: true,
    backslash_escapes: false,
    begin: "BEGIN",
    commit: "COMMIT",
    rollback: "ROLLBACK",
    savepoint: "SAVEPOINT",
    release_savepoint: Some("RELEASE SAVEPOINT"),
    rollback_to_savepoint: "ROLLBACK TO SAVEPOINT",
};

static SQLITE: DialectSpec = DialectSpec {
    name: "SQLite",
    open_quote: '"',
    close_quote: '"',
    placeholder: PlaceholderStyle::Named,
    upsert: UpsertStyle::OnConflict,
    returning: ReturningStyle::Returning,
    unbounded_limit: Some("-1"),
    boolean_literals: false,
    backslash_escapes: false,
    begin: "BEGIN",
    commit: "COMMIT",
    rollback: "ROLLBACK",
    savepoint: "SAVEPOINT",
    release_savepoint: Some("RELEASE SAVEPOINT"),
    rollback_to_savepoint: "ROLLBACK TO SAVEPOINT",
};

static SQLSERVER: DialectSpec = DialectSpec {
    name: "SQL Server",
    open_quote: '[',
    close_quote: ']',
    placeholder: PlaceholderStyle::Positional,
    upsert: UpsertStyle::Unsupported,
    returning: ReturningStyle::Output,
    unbounded_limit: None,
    boolean_literals: false,
    backslash_escapes: false,
    begin: "BEGIN TRANSACTION",
    commit: "COMMIT TRANSACTION",
    rollback: "ROLLBACK TRANSACTION",
    savepoint: "SAVE TRANSACTION",
    release_savepoint: None,
    rollback_to_savepoint: "ROLLBACK TRANSACTION",
};

impl Dialect {
    /// All supported dialects.
    pub const ALL: [Dialect; 4] = [
        Dialect::MySql,
        Dialect::Postgres,
        Dialect::Sqlite,
        Dialect::SqlServer,
    ];

    /// The static descriptor table for this dialect.
    pub fn spec(self) -> &'static DialectSpec {
        match self {
            Dialect::MySql => &MYSQL,
            Dialect::Postgres => &POSTGRES,
            Dialect::Sqlite => &SQLITE,
            Dialect::SqlServer => &SQLSERVER,
        }
    }

    /// Human readable name.
    pub fn name(self) -> &'static str {
        self.spec().name
    }

    pub fn placeholder_style(self) -> PlaceholderStyle {
        self.spec().placeholder
    }

    /// Choose a dialect from a connection URL scheme.
    ///
    /// ```
    /// use polysql::Dialect;
    ///
    /// assert_eq!(Dialect::from_url("postgres://localhost/app").unwrap(), Dialect::Postgres);
    /// assert_eq!(Dialect::from_url("sqlite::memory:").unwrap(), Dialect::Sqlite);
    /// ```
    pub fn from_url(url: &str) -> SqlResult<Self> {
        let parsed = url::Url::parse(url)
            .map_err(|e| SqlError::Connection(format!("invalid connection url '{url}': {e}")))?;
        parsed.scheme().parse()
    }

    /// Quote an identifier for this dialect.
    ///
    /// Each dot-separated segment is wrapped in the dialect's quote pair.
    /// `*`, numbers, placeholder tokens and function/expression text pass
    /// through unchanged; `expr AS alias` quotes both sides.
    pub fn quote_identifier(self, name: &str) -> String {
        let name = name.trim();
        if let Some((expr, alias)) = split_alias(name) {
            return format!(
                "{} AS {}",
                self.quote_identifier(expr),
                self.quote_identifier(alias)
            );
        }
        if name.is_empty()
            || name == "*"
            || is_numeric(name)
            || crate::param::is_parameter_token(name, None)
            || name.contains(['(', ' ', '\t', '\n'])
        {
            return name.to_string();
        }

        match Ident::parse(name) {
            Ok(ident) => ident.to_sql(self),
            Err(_) => {
                // Not a plain identifier; quote the raw segments as-is.
                let mut out = String::with_capacity(name.len() + 2);
                for (i, segment) in name.split('.').enumerate() {
                    if i > 0 {
                        out.push('.');
                    }
                    self.push_quoted(&mut out, segment);
                }
                out
            }
        }
    }

    /// Append `segment` wrapped in the quote pair, doubling any embedded close quote.
    pub(crate) fn push_quoted(self, out: &mut String, segment: &str) {
        let spec = self.spec();
        out.push(spec.open_quote);
        for ch in segment.chars() {
            if ch == spec.close_quote {
                out.push(ch);
            }
            out.push(ch);
        }
        out.push(spec.close_quote);
    }

    /// Default string escaping for this dialect (content only, no surrounding quotes).
    pub fn escape_string(self, value: &str) -> String {
        let mut out = String::with_capacity(value.len());
        for ch in value.chars() {
            match ch {
                '\'' => out.push_str("''"),
                '\\' if self.spec().backslash_escapes => out.push_str("\\\\"),
                '\0' if self.spec().backslash_escapes => out.push_str("\\0"),
                c => out.push(c),
            }
        }
        out
    }

    /// SQL text opening a transaction.
    pub fn begin_sql(self) -> &'static str {
        self.spec().begin
    }

    pub fn commit_sql(self) -> &'static str {
        self.spec().commit
    }

    pub fn rollback_sql(self) -> &'static str {
        self.spec().rollback
    }

    pub fn savepoint_sql(self, name: &str) -> String {
        format!("{} {}", self.spec().savepoint, name)
    }

    /// `None` when the dialect has no release statement (SQL Server).
    pub fn release_savepoint_sql(self, name: &str) -> Option<String> {
        self.spec()
            .release_savepoint
            .map(|stmt| format!("{stmt} {name}"))
    }

    pub fn rollback_to_savepoint_sql(self, name: &str) -> String {
        format!("{} {}", self.spec().rollback_to_savepoint, name)
    }
}

fn is_numeric(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    digits.chars().any(|c| c.is_ascii_digit())
        && digits.chars().all(|c| c.is_ascii_digit() || c == '.')
}

/// Split `expr AS alias` (case-insensitive `AS`, outside parentheses).
pub(crate) fn split_alias(name: &str) -> Option<(&str, &str)> {
    let upper = name.to_ascii_uppercase();
    let idx = upper.rfind(" AS ")?;
    let (expr, alias) = (name[..idx].trim(), name[idx + 4..].trim());
    if expr.is_empty() || alias.is_empty() || alias.contains(['(', ')', ' ']) {
        return None;
    }
    Some((expr, alias))
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dialect {
    type Err = SqlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mysql" | "mariadb" => Ok(Dialect::MySql),
            "postgres" | "postgresql" | "pgsql" => Ok(Dialect::Postgres),
            "sqlite" | "sqlite3" => Ok(Dialect::Sqlite),
            "sqlserver" | "sqlsrv" | "mssql" => Ok(Dialect::SqlServer),
            other => Err(SqlError::Other(format!("unknown dialect '{other}'"))),
        }
    }
}

/// String escaping capability supplied by a connection.
pub trait Escape: Send + Sync {
    /// Escape `value` for inclusion between single quotes.
    fn escape(&self, value: &str) -> String;
}

impl Escape for Dialect {
    fn escape(&self, value: &str) -> String {
        self.escape_string(value)
    }
}

/// Rendering target: a dialect plus the escaper of the connection it came from.
#[derive(Clone)]
pub struct Target {
    dialect: Dialect,
    escaper: Arc<dyn Escape>,
}

impl Target {
    /// Target using the dialect's default escaping.
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            escaper: Arc::new(dialect),
        }
    }

    /// Target using a connection-provided escaper.
    pub fn with_escaper(dialect: Dialect, escaper: Arc<dyn Escape>) -> Self {
        Self { dialect, escaper }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn spec(&self) -> &'static DialectSpec {
        self.dialect.spec()
    }

    pub fn quote_identifier(&self, name: &str) -> String {
        self.dialect.quote_identifier(name)
    }

    /// Quote a string literal, delegating escaping to the connection.
    pub fn quote_string(&self, value: &str) -> String {
        format!("'{}'", self.escaper.escape(value))
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Target")
            .field("dialect", &self.dialect)
            .finish_non_exhaustive()
    }
}

impl From<Dialect> for Target {
    fn from(dialect: Dialect) -> Self {
        Self::new(dialect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotes_each_segment() {
        assert_eq!(Dialect::MySql.quote_identifier("users"), "`users`");
        assert_eq!(Dialect::MySql.quote_identifier("u.name"), "`u`.`name`");
        assert_eq!(Dialect::Postgres.quote_identifier("public.users"), r#""public"."users""#);
        assert_eq!(Dialect::Sqlite.quote_identifier("users"), r#""users""#);
        assert_eq!(Dialect::SqlServer.quote_identifier("dbo.users"), "[dbo].[users]");
    }

    #[test]
    fn leaves_star_numbers_and_tokens_alone() {
        assert_eq!(Dialect::MySql.quote_identifier("*"), "*");
        assert_eq!(Dialect::MySql.quote_identifier("u.*"), "`u`.*");
        assert_eq!(Dialect::MySql.quote_identifier("42"), "42");
        assert_eq!(Dialect::MySql.quote_identifier("?"), "?");
        assert_eq!(Dialect::Postgres.quote_identifier("$2"), "$2");
        assert_eq!(Dialect::MySql.quote_identifier("COUNT(*)"), "COUNT(*)");
    }

    #[test]
    fn quotes_alias_on_both_sides() {
        assert_eq!(
            Dialect::Postgres.quote_identifier("u.name AS username"),
            r#""u"."name" AS "username""#
        );
        assert_eq!(
            Dialect::SqlServer.quote_identifier("COUNT(*) as total"),
            "COUNT(*) AS [total]"
        );
    }

    #[test]
    fn requotes_foreign_quote_styles() {
        assert_eq!(Dialect::Postgres.quote_identifier("`Order`"), r#""Order""#);
        assert_eq!(Dialect::MySql.quote_identifier("[dbo].[Users]"), "`dbo`.`Users`");
    }

    #[test]
    fn doubles_embedded_close_quotes() {
        assert_eq!(Dialect::SqlServer.quote_identifier("odd]name"), "[odd]]name]");
        assert_eq!(Dialect::MySql.quote_identifier("user-id"), "`user-id`");
    }

    #[test]
    fn escapes_strings_per_dialect() {
        assert_eq!(Dialect::Postgres.escape_string("O'Brien"), "O''Brien");
        assert_eq!(Dialect::Postgres.escape_string(r"C:\tmp"), r"C:\tmp");
        assert_eq!(Dialect::MySql.escape_string(r"C:\tmp"), r"C:\\tmp");
        assert_eq!(Target::new(Dialect::Sqlite).quote_string("it's"), "'it''s'");
    }

    #[test]
    fn transaction_sql_text() {
        assert_eq!(Dialect::MySql.begin_sql(), "START TRANSACTION");
        assert_eq!(Dialect::Postgres.savepoint_sql("sp_1"), "SAVEPOINT sp_1");
        assert_eq!(
            Dialect::Sqlite.release_savepoint_sql("sp_1").as_deref(),
            Some("RELEASE SAVEPOINT sp_1")
        );
        assert_eq!(Dialect::SqlServer.release_savepoint_sql("sp_1"), None);
        assert_eq!(
            Dialect::SqlServer.rollback_to_savepoint_sql("sp_1"),
            "ROLLBACK TRANSACTION sp_1"
        );
    }

    #[test]
    fn parses_names_and_urls() {
        assert_eq!("PGSQL".parse::<Dialect>().unwrap(), Dialect::Postgres);
        assert_eq!("sqlsrv".parse::<Dialect>().unwrap(), Dialect::SqlServer);
        assert!("oracle".parse::<Dialect>().is_err());

        assert_eq!(Dialect::from_url("mysql://root@localhost/app").unwrap(), Dialect::MySql);
        assert_eq!(Dialect::from_url("mssql://sa@db:1433").unwrap(), Dialect::SqlServer);
        assert!(Dialect::from_url("not a url").is_err());
    }

    #[test]
    fn deserializes_from_lowercase_name() {
        let dialect: Dialect = serde_json::from_str(r#""postgresql""#).unwrap();
        assert_eq!(dialect, Dialect::Postgres);
        assert_eq!(serde_json::to_string(&Dialect::SqlServer).unwrap(), r#""sqlserver""#);
    }
}
