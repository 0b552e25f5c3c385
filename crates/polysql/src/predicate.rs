//! Single typed conditions.

use crate::dialect::Target;
use crate::error::{SqlError, SqlResult};
use crate::param::ParamTranslator;
use crate::parse::{parse_expression, parse_shorthand};
use crate::value::Value;
use std::fmt;

/// Comparison operator of a [`Predicate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    Like,
    NotLike,
    Between,
    NotBetween,
    In,
    NotIn,
    IsNull,
    IsNotNull,
}

impl Operator {
    pub fn as_sql(self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Ne => "!=",
            Operator::Gt => ">",
            Operator::Gte => ">=",
            Operator::Lt => "<",
            Operator::Lte => "<=",
            Operator::Like => "LIKE",
            Operator::NotLike => "NOT LIKE",
            Operator::Between => "BETWEEN",
            Operator::NotBetween => "NOT BETWEEN",
            Operator::In => "IN",
            Operator::NotIn => "NOT IN",
            Operator::IsNull => "IS NULL",
            Operator::IsNotNull => "IS NOT NULL",
        }
    }

    /// Whether `count` operands are acceptable, and the expectation as text.
    fn accepts(self, count: usize) -> (bool, &'static str) {
        match self {
            Operator::IsNull | Operator::IsNotNull => (count == 0, "0"),
            Operator::Between | Operator::NotBetween => (count == 2, "2"),
            Operator::In | Operator::NotIn => (count >= 1, "at least 1"),
            _ => (count == 1, "1"),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// How an element joins the element before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Conjunction {
    #[default]
    And,
    Or,
}

impl Conjunction {
    pub fn as_sql(self) -> &'static str {
        match self {
            Conjunction::And => "AND",
            Conjunction::Or => "OR",
        }
    }
}

/// One condition: `column operator operands`.
///
/// Operand count is checked on construction:
/// comparisons and `LIKE` take one, `BETWEEN` two, `IN` at least one, `IS NULL` none.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    column: String,
    operator: Operator,
    operands: Vec<Value>,
    conjunction: Conjunction,
}

impl Predicate {
    /// Build a predicate, rejecting operand counts the operator cannot take.
    ///
    /// A single list operand for `IN`/`NOT IN` is flattened.
    pub fn new(
        column: impl Into<String>,
        operator: Operator,
        mut operands: Vec<Value>,
    ) -> SqlResult<Self> {
        if matches!(operator, Operator::In | Operator::NotIn)
            && operands.len() == 1
            && matches!(operands[0], Value::List(_))
        {
            if let Some(Value::List(items)) = operands.pop() {
                operands = items;
            }
        }

        let (ok, expected) = operator.accepts(operands.len());
        if !ok {
            return Err(SqlError::ArityMismatch {
                operator: operator.as_sql(),
                expected,
                got: operands.len(),
            });
        }

        Ok(Self {
            column: column.into(),
            operator,
            operands,
            conjunction: Conjunction::And,
        })
    }

    /// Parse condition text such as `"age >= 18"`.
    pub fn parse(text: &str) -> SqlResult<Self> {
        parse_expression(text)?.into_predicate()
    }

    /// Build from a shorthand map entry such as `("age>=", 18)`.
    pub fn shorthand(key: &str, value: impl Into<Value>) -> SqlResult<Self> {
        parse_shorthand(key, value.into())?.into_predicate()
    }

    fn single(column: impl Into<String>, operator: Operator, value: Value) -> Self {
        Self {
            column: column.into(),
            operator,
            operands: vec![value],
            conjunction: Conjunction::And,
        }
    }

    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::single(column, Operator::Eq, value.into())
    }

    pub fn ne(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::single(column, Operator::Ne, value.into())
    }

    pub fn gt(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::single(column, Operator::Gt, value.into())
    }

    pub fn gte(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::single(column, Operator::Gte, value.into())
    }

    pub fn lt(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::single(column, Operator::Lt, value.into())
    }

    pub fn lte(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::single(column, Operator::Lte, value.into())
    }

    pub fn like(column: impl Into<String>, pattern: impl Into<Value>) -> Self {
        Self::single(column, Operator::Like, pattern.into())
    }

    pub fn not_like(column: impl Into<String>, pattern: impl Into<Value>) -> Self {
        Self::single(column, Operator::NotLike, pattern.into())
    }

    pub fn between(
        column: impl Into<String>,
        low: impl Into<Value>,
        high: impl Into<Value>,
    ) -> Self {
        Self {
            column: column.into(),
            operator: Operator::Between,
            operands: vec![low.into(), high.into()],
            conjunction: Conjunction::And,
        }
    }

    pub fn not_between(
        column: impl Into<String>,
        low: impl Into<Value>,
        high: impl Into<Value>,
    ) -> Self {
        Self {
            operator: Operator::NotBetween,
            ..Self::between(column, low, high)
        }
    }

    /// `column IN (...)`; an empty list is an arity error.
    pub fn in_list<I, V>(column: impl Into<String>, values: I) -> SqlResult<Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::new(
            column,
            Operator::In,
            values.into_iter().map(Into::into).collect(),
        )
    }

    pub fn not_in<I, V>(column: impl Into<String>, values: I) -> SqlResult<Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::new(
            column,
            Operator::NotIn,
            values.into_iter().map(Into::into).collect(),
        )
    }

    pub fn is_null(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            operator: Operator::IsNull,
            operands: Vec::new(),
            conjunction: Conjunction::And,
        }
    }

    pub fn is_not_null(column: impl Into<String>) -> Self {
        Self {
            operator: Operator::IsNotNull,
            ..Self::is_null(column)
        }
    }

    /// Set how this predicate joins the one before it.
    pub fn with_conjunction(mut self, conjunction: Conjunction) -> Self {
        self.conjunction = conjunction;
        self
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn operands(&self) -> &[Value] {
        &self.operands
    }

    pub fn conjunction(&self) -> Conjunction {
        self.conjunction
    }

    /// Render as `(column OP operands)` for `target`.
    pub fn render(&self, target: &Target) -> String {
        let mut tr = ParamTranslator::new(target);
        self.render_with(&mut tr)
    }

    pub(crate) fn render_with(&self, tr: &mut ParamTranslator<'_>) -> String {
        let column = tr.quote_identifier(&self.column);
        let bind_column = Some(self.column.as_str());
        let op = self.operator.as_sql();

        match self.operator {
            Operator::IsNull | Operator::IsNotNull => format!("({column} {op})"),
            Operator::Between | Operator::NotBetween => {
                let low = tr.quote_value(&self.operands[0], bind_column);
                let high = tr.quote_value(&self.operands[1], bind_column);
                format!("({column} {op} {low} AND {high})")
            }
            Operator::In | Operator::NotIn => {
                let items: Vec<String> = self
                    .operands
                    .iter()
                    .map(|v| tr.quote_value(v, bind_column))
                    .collect();
                format!("({column} {op} ({}))", items.join(", "))
            }
            _ => {
                let value = tr.quote_value(&self.operands[0], bind_column);
                format!("({column} {op} {value})")
            }
        }
    }
}
