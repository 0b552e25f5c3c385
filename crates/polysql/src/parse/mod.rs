//! Condition parsing.
//!
//! Two grammars produce the same typed [`Expression`]:
//!
//! - condition text, `"age >= 18"`, `"name NOT LIKE 'a%'"`, `"id IN (1, 2)"`
//!   ([`parse_expression`])
//! - shorthand map entries, where sigils on the key select the operator:
//!   `("%name%", "bar")`, `("id-", [1, 2])`, `("age>=", 18)`
//!   ([`parse_shorthand`])
//!
//! An [`Expression`] is transient: it is turned into a
//! [`Predicate`](crate::Predicate), which enforces operator arity.

mod expression;
mod shorthand;

pub use expression::parse_expression;
pub use shorthand::parse_shorthand;

pub(crate) use expression::parse_value_list;

use crate::error::SqlResult;
use crate::predicate::{Operator, Predicate};
use crate::value::Value;

/// A parsed `<column> <operator> <value>` triple.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    pub column: String,
    pub operator: Operator,
    pub operands: Vec<Value>,
}

impl Expression {
    pub fn new(column: impl Into<String>, operator: Operator, operands: Vec<Value>) -> Self {
        Self {
            column: column.into(),
            operator,
            operands,
        }
    }

    /// Build the predicate, checking the operand count against the operator.
    pub fn into_predicate(self) -> SqlResult<Predicate> {
        Predicate::new(self.column, self.operator, self.operands)
    }
}
