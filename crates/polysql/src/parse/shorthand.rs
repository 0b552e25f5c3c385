//! Shorthand map keys: operator sigils attached to a column name.
//!
//! | key            | value                | operator                 |
//! |----------------|----------------------|--------------------------|
//! | `%name%`       | `"bar"`              | `LIKE '%bar%'`           |
//! | `-%name`       | `"bar"`              | `NOT LIKE '%bar'`        |
//! | `age>=`        | `18`                 | `>=` (also `>` `<` `<=` `!=` `<>`) |
//! | `flag` / `flag-` | `NULL`             | `IS NULL` / `IS NOT NULL` |
//! | `id` / `id-`   | list                 | `IN` / `NOT IN`          |
//! | `age` / `age-` | `"(18, 30)"`         | `BETWEEN` / `NOT BETWEEN` |
//! | `id` / `id-`   | other scalar         | `=` / `!=`               |

use super::{Expression, parse_value_list};
use crate::error::{SqlError, SqlResult};
use crate::predicate::Operator;
use crate::value::Value;

/// Sigils found on a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Modifier {
    Plain,
    Negated,
    Compare(Operator),
    Like {
        leading: bool,
        trailing: bool,
        negated: bool,
    },
}

/// Longest suffixes first.
const COMPARISON_SUFFIXES: [(&str, Operator); 6] = [
    (">=", Operator::Gte),
    ("<=", Operator::Lte),
    ("!=", Operator::Ne),
    ("<>", Operator::Ne),
    (">", Operator::Gt),
    ("<", Operator::Lt),
];

/// Split a key into its column and modifier.
fn tokenize(key: &str) -> SqlResult<(&str, Modifier)> {
    let key = key.trim();

    for (suffix, op) in COMPARISON_SUFFIXES {
        if let Some(column) = key.strip_suffix(suffix) {
            return Ok((checked_column(key, column.trim_end())?, Modifier::Compare(op)));
        }
    }

    let negated_leading = key.starts_with("-%");
    let negated_trailing = key.ends_with("%-");
    let (body, negated_like) = if negated_leading || negated_trailing {
        let mut body = key;
        if negated_leading {
            body = &body[1..];
        }
        if negated_trailing {
            body = &body[..body.len() - 1];
        }
        (body, true)
    } else {
        (key, false)
    };

    let leading = body.starts_with('%');
    let trailing = body.len() > 1 && body.ends_with('%');
    if leading || trailing {
        let mut column = body;
        if leading {
            column = &column[1..];
        }
        if trailing {
            column = &column[..column.len() - 1];
        }
        return Ok((
            checked_column(key, column)?,
            Modifier::Like {
                leading,
                trailing,
                negated: negated_like,
            },
        ));
    }

    if let Some(column) = key.strip_suffix('-') {
        return Ok((checked_column(key, column)?, Modifier::Negated));
    }

    Ok((checked_column(key, key)?, Modifier::Plain))
}

fn checked_column<'a>(key: &str, column: &'a str) -> SqlResult<&'a str> {
    if column.is_empty() {
        return Err(SqlError::malformed(key, "missing column name"));
    }
    if column.contains('%') || column.starts_with('-') || column.ends_with('-') {
        return Err(SqlError::malformed(key, "unrecognized key modifiers"));
    }
    Ok(column)
}

/// A text value shaped like `"(a, b)"`.
fn as_range(value: &Value) -> Option<Vec<Value>> {
    let text = value.as_str()?;
    if !text.trim_start().starts_with('(') {
        return None;
    }
    parse_value_list(text).filter(|bounds| bounds.len() == 2)
}

fn like_pattern(key: &str, value: Value, leading: bool, trailing: bool) -> SqlResult<Value> {
    let text = match value {
        Value::Text(s) => s,
        Value::Int(i) => i.to_string(),
        Value::Float(x) => x.to_string(),
        Value::Param(_) | Value::Raw(_) | Value::Column(_) => return Ok(value),
        other => {
            return Err(SqlError::malformed(
                key,
                format!("LIKE needs a text value, got {other}"),
            ));
        }
    };

    let mut core = text.as_str();
    if leading {
        core = core.strip_prefix('%').unwrap_or(core);
    }
    if trailing {
        core = core.strip_suffix('%').unwrap_or(core);
    }

    let mut pattern = String::with_capacity(core.len() + 2);
    if leading {
        pattern.push('%');
    }
    pattern.push_str(core);
    if trailing {
        pattern.push('%');
    }
    Ok(Value::Text(pattern))
}

/// Classify a shorthand `(key, value)` entry.
///
/// ```
/// use polysql::parse::parse_shorthand;
/// use polysql::{Operator, Value};
///
/// let e = parse_shorthand("%name%", "bar".into())?;
/// assert_eq!(e.operator, Operator::Like);
/// assert_eq!(e.operands, vec![Value::from("%bar%")]);
/// # Ok::<(), polysql::SqlError>(())
/// ```
pub fn parse_shorthand(key: &str, value: Value) -> SqlResult<Expression> {
    let (column, modifier) = tokenize(key)?;

    let (operator, operands) = match modifier {
        Modifier::Compare(op) => match value {
            Value::Null | Value::List(_) => {
                return Err(SqlError::malformed(
                    key,
                    format!("{} needs a single value", op.as_sql()),
                ));
            }
            v => (op, vec![v]),
        },
        Modifier::Like {
            leading,
            trailing,
            negated,
        } => {
            let op = if negated {
                Operator::NotLike
            } else {
                Operator::Like
            };
            (op, vec![like_pattern(key, value, leading, trailing)?])
        }
        Modifier::Negated => match value {
            Value::Null => (Operator::IsNotNull, Vec::new()),
            Value::List(items) => (Operator::NotIn, items),
            v => match as_range(&v) {
                Some(bounds) => (Operator::NotBetween, bounds),
                None => (Operator::Ne, vec![v]),
            },
        },
        Modifier::Plain => match value {
            Value::Null => (Operator::IsNull, Vec::new()),
            Value::List(items) => (Operator::In, items),
            v => match as_range(&v) {
                Some(bounds) => (Operator::Between, bounds),
                None => (Operator::Eq, vec![v]),
            },
        },
    };

    Ok(Expression::new(column, operator, operands))
}
