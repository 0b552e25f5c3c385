//! SQL identifier parsing.
//!
//! [`Ident`] represents a schema/table/column reference written in any of the
//! supported quote styles, and re-renders it with the quote pair of the
//! target [`Dialect`].
//!
//! - Unquoted parts are validated against: `[A-Za-z_][A-Za-z0-9_$]*`
//! - Quoted parts (`"x"`, `` `x` ``, `[x]`) allow anything except NUL; the
//!   closing quote is escaped by doubling it
//! - A trailing `*` part is allowed (`u.*`)
//!
//! # Example
//! ```
//! use polysql::{Dialect, Ident};
//!
//! let ident = Ident::parse("public.\"UserTable\"")?;
//! assert_eq!(ident.to_sql(Dialect::SqlServer), "[public].[UserTable]");
//! # Ok::<(), polysql::SqlError>(())
//! ```

use crate::dialect::Dialect;
use crate::error::{SqlError, SqlResult};

/// A part of a SQL identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentPart {
    /// Unquoted identifier: must match `[A-Za-z_][A-Za-z0-9_$]*`.
    Unquoted(String),
    /// Quoted identifier: allows any characters except NUL.
    Quoted(String),
    /// `*` wildcard, only as the last part.
    Star,
}

/// A SQL identifier (column, table, or schema name).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub parts: Vec<IdentPart>,
}

fn closing_quote(open: char) -> Option<char> {
    match open {
        '"' => Some('"'),
        '`' => Some('`'),
        '[' => Some(']'),
        _ => None,
    }
}

impl Ident {
    /// Parse an identifier string, supporting dotted and quoted forms.
    ///
    /// - Dotted: `schema.table.column`
    /// - Quoted: `"CamelCase"."UserTable"`, `` `order` ``, `[dbo].[Users]`
    /// - Mixed: `public."UserTable".id`
    pub fn parse(s: &str) -> SqlResult<Self> {
        if s.is_empty() {
            return Err(SqlError::InvalidIdentifier("identifier cannot be empty".into()));
        }
        if s.contains('\0') {
            return Err(SqlError::InvalidIdentifier(
                "identifier cannot contain NUL character".into(),
            ));
        }

        let mut parts = Vec::new();
        let mut chars = s.chars().peekable();

        while chars.peek().is_some() {
            if !parts.is_empty() {
                if parts.last() == Some(&IdentPart::Star) {
                    return Err(SqlError::InvalidIdentifier(format!(
                        "'*' must be the last part of '{s}'"
                    )));
                }
                match chars.next() {
                    Some('.') => {
                        if chars.peek().is_none() {
                            return Err(SqlError::InvalidIdentifier(format!(
                                "trailing '.' in '{s}'"
                            )));
                        }
                    }
                    Some(c) => {
                        return Err(SqlError::InvalidIdentifier(format!(
                            "expected '.' between identifier parts, got '{c}'"
                        )));
                    }
                    None => break,
                }
            }

            if chars.peek() == Some(&'*') {
                chars.next();
                parts.push(IdentPart::Star);
                continue;
            }

            if let Some(close) = chars.peek().copied().and_then(closing_quote) {
                chars.next();
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some(c) if c == close => {
                            // Doubled closing quote is an escaped literal.
                            if chars.peek() == Some(&close) {
                                chars.next();
                                name.push(close);
                            } else {
                                break;
                            }
                        }
                        Some(c) => name.push(c),
                        None => {
                            return Err(SqlError::InvalidIdentifier(format!(
                                "unclosed quoted identifier in '{s}'"
                            )));
                        }
                    }
                }
                if name.is_empty() {
                    return Err(SqlError::InvalidIdentifier("empty quoted identifier".into()));
                }
                parts.push(IdentPart::Quoted(name));
                continue;
            }

            let mut name = String::new();
            while let Some(&c) = chars.peek() {
                if c == '.' {
                    break;
                }
                let valid = if name.is_empty() {
                    c == '_' || c.is_ascii_alphabetic()
                } else {
                    c == '_' || c == '$' || c.is_ascii_alphanumeric()
                };
                if !valid {
                    return Err(SqlError::InvalidIdentifier(format!(
                        "invalid character '{c}' in '{s}'"
                    )));
                }
                name.push(c);
                chars.next();
            }
            if name.is_empty() {
                return Err(SqlError::InvalidIdentifier(format!(
                    "empty identifier segment in '{s}'"
                )));
            }
            parts.push(IdentPart::Unquoted(name));
        }

        Ok(Self { parts })
    }

    /// The last part's name, e.g. `name` for `u.name`.
    pub fn base_name(&self) -> Option<&str> {
        match self.parts.last()? {
            IdentPart::Unquoted(s) | IdentPart::Quoted(s) => Some(s),
            IdentPart::Star => None,
        }
    }

    /// Render the identifier quoted for `dialect`.
    pub fn to_sql(&self, dialect: Dialect) -> String {
        let mut out = String::new();
        self.write_sql(dialect, &mut out);
        out
    }

    pub(crate) fn write_sql(&self, dialect: Dialect, out: &mut String) {
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                out.push('.');
            }
            match part {
                IdentPart::Unquoted(s) | IdentPart::Quoted(s) => dialect.push_quoted(out, s),
                IdentPart::Star => out.push('*'),
            }
        }
    }
}
