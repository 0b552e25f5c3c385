//! Composable AND/OR condition trees for WHERE, HAVING and JOIN ... ON.
//!
//! A [`PredicateSet`] holds predicates followed by nested sets. It renders
//! them in that order, each joined to the previous element by its own
//! conjunction, and wraps the result in parentheses only when more than one
//! element is present:
//!
//! ```
//! use polysql::{Dialect, PredicateSet};
//!
//! let mut set = PredicateSet::new(Dialect::MySql);
//! set.add("status = 'active'")?;
//! set.or_nest().add("role = 'admin'")?.add("verified = 1")?;
//! assert_eq!(
//!     set.render()?,
//!     "((`status` = 'active') OR ((`role` = 'admin') AND (`verified` = 1)))"
//! );
//! # Ok::<(), polysql::SqlError>(())
//! ```

use crate::dialect::Target;
use crate::error::{SqlError, SqlResult};
use crate::param::ParamTranslator;
use crate::predicate::{Conjunction, Predicate};
use crate::value::Value;

/// Anything that can be added to a [`PredicateSet`].
#[derive(Debug, Clone)]
pub enum Criterion {
    /// Condition text, parsed on add (`"age >= 18"`).
    Text(String),
    /// Shorthand key and value (`("age>=", 18)`).
    Shorthand(String, Value),
    Predicate(Predicate),
}

impl Criterion {
    fn into_predicate(self) -> SqlResult<Predicate> {
        match self {
            Criterion::Text(text) => Predicate::parse(&text),
            Criterion::Shorthand(key, value) => Predicate::shorthand(&key, value),
            Criterion::Predicate(p) => Ok(p),
        }
    }
}

impl From<&str> for Criterion {
    fn from(text: &str) -> Self {
        Criterion::Text(text.to_string())
    }
}

impl From<String> for Criterion {
    fn from(text: String) -> Self {
        Criterion::Text(text)
    }
}

impl From<Predicate> for Criterion {
    fn from(p: Predicate) -> Self {
        Criterion::Predicate(p)
    }
}

impl<K: Into<String>, V: Into<Value>> From<(K, V)> for Criterion {
    fn from((key, value): (K, V)) -> Self {
        Criterion::Shorthand(key.into(), value.into())
    }
}

/// An ordered, possibly nested, set of predicates.
#[derive(Debug, Clone)]
pub struct PredicateSet {
    target: Target,
    predicates: Vec<Predicate>,
    children: Vec<PredicateSet>,
    /// How this set joins its parent's previous element.
    conjunction: Option<Conjunction>,
    /// Conjunction for the next added element, set by `and()`/`or()`.
    pending: Option<Conjunction>,
}

macro_rules! typed_adder {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        pub fn $name(&mut self, column: impl Into<String>, value: impl Into<Value>) -> &mut Self {
            self.add_predicate(Predicate::$name(column, value))
        }
    };
}

impl PredicateSet {
    pub fn new(target: impl Into<Target>) -> Self {
        Self {
            target: target.into(),
            predicates: Vec::new(),
            children: Vec::new(),
            conjunction: None,
            pending: None,
        }
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    /// Add a condition with the pending conjunction (default AND).
    ///
    /// The pending conjunction is consumed even when parsing fails.
    pub fn add(&mut self, criterion: impl Into<Criterion>) -> SqlResult<&mut Self> {
        let pending = self.pending.take();
        let predicate = criterion.into().into_predicate()?;
        self.pending = pending;
        Ok(self.add_predicate(predicate))
    }

    /// Add a built predicate. An explicit `and()`/`or()` overrides its own conjunction.
    pub fn add_predicate(&mut self, predicate: Predicate) -> &mut Self {
        let predicate = match self.pending.take() {
            Some(conjunction) => predicate.with_conjunction(conjunction),
            None => predicate,
        };
        self.predicates.push(predicate);
        self
    }

    /// Add every shorthand entry, in iteration order.
    ///
    /// Nothing is added if any entry is malformed.
    pub fn add_map<I, K, V>(&mut self, entries: I) -> SqlResult<&mut Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let pending = self.pending.take();
        let predicates = entries
            .into_iter()
            .map(|(key, value)| Predicate::shorthand(key.as_ref(), value))
            .collect::<SqlResult<Vec<_>>>()?;
        self.pending = pending;
        for predicate in predicates {
            self.add_predicate(predicate);
        }
        Ok(self)
    }

    /// Join the next element with AND.
    pub fn and(&mut self) -> &mut Self {
        self.pending = Some(Conjunction::And);
        self
    }

    /// Join the next element with OR.
    pub fn or(&mut self) -> &mut Self {
        self.pending = Some(Conjunction::Or);
        self
    }

    pub fn and_add(&mut self, criterion: impl Into<Criterion>) -> SqlResult<&mut Self> {
        self.and().add(criterion)
    }

    pub fn or_add(&mut self, criterion: impl Into<Criterion>) -> SqlResult<&mut Self> {
        self.or().add(criterion)
    }

    /// Open a nested set joined with the pending conjunction (default AND).
    pub fn nest(&mut self) -> &mut PredicateSet {
        let conjunction = self.pending.take().unwrap_or_default();
        let child = PredicateSet::new(self.target.clone()).with_conjunction(conjunction);
        let idx = self.children.len();
        self.children.push(child);
        &mut self.children[idx]
    }

    pub fn and_nest(&mut self) -> &mut PredicateSet {
        self.and().nest()
    }

    pub fn or_nest(&mut self) -> &mut PredicateSet {
        self.or().nest()
    }

    /// Merge an independently built set. It must carry a conjunction, either
    /// its own or one set with `and()`/`or()` just before this call.
    pub fn add_set(&mut self, mut child: PredicateSet) -> &mut Self {
        if let Some(conjunction) = self.pending.take() {
            child.conjunction = Some(conjunction);
        }
        self.children.push(child);
        self
    }

    pub fn with_conjunction(mut self, conjunction: Conjunction) -> Self {
        self.conjunction = Some(conjunction);
        self
    }

    pub fn conjunction(&self) -> Option<Conjunction> {
        self.conjunction
    }

    typed_adder!(eq);
    typed_adder!(ne);
    typed_adder!(gt);
    typed_adder!(gte);
    typed_adder!(lt);
    typed_adder!(lte);
    typed_adder!(
        /// `column LIKE pattern`; the pattern is used as given.
        like
    );
    typed_adder!(not_like);

    pub fn between(
        &mut self,
        column: impl Into<String>,
        low: impl Into<Value>,
        high: impl Into<Value>,
    ) -> &mut Self {
        self.add_predicate(Predicate::between(column, low, high))
    }

    pub fn not_between(
        &mut self,
        column: impl Into<String>,
        low: impl Into<Value>,
        high: impl Into<Value>,
    ) -> &mut Self {
        self.add_predicate(Predicate::not_between(column, low, high))
    }

    pub fn in_list<I, V>(&mut self, column: impl Into<String>, values: I) -> SqlResult<&mut Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let predicate = Predicate::in_list(column, values)?;
        Ok(self.add_predicate(predicate))
    }

    pub fn not_in<I, V>(&mut self, column: impl Into<String>, values: I) -> SqlResult<&mut Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let predicate = Predicate::not_in(column, values)?;
        Ok(self.add_predicate(predicate))
    }

    pub fn is_null(&mut self, column: impl Into<String>) -> &mut Self {
        self.add_predicate(Predicate::is_null(column))
    }

    pub fn is_not_null(&mut self, column: impl Into<String>) -> &mut Self {
        self.add_predicate(Predicate::is_not_null(column))
    }

    /// Number of direct elements (predicates plus nested sets).
    pub fn len(&self) -> usize {
        self.predicates.len() + self.children.len()
    }

    /// True when nothing would be rendered.
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty() && self.children.iter().all(PredicateSet::is_empty)
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// Render the set on its own. Empty sets render as an empty string.
    pub fn render(&self) -> SqlResult<String> {
        let mut tr = ParamTranslator::new(&self.target);
        self.render_with(&mut tr)
    }

    pub(crate) fn render_with(&self, tr: &mut ParamTranslator<'_>) -> SqlResult<String> {
        let mut parts: Vec<(Conjunction, String)> = Vec::with_capacity(self.len());
        for predicate in &self.predicates {
            parts.push((predicate.conjunction(), predicate.render_with(tr)));
        }
        for child in &self.children {
            let conjunction = child.conjunction.ok_or(SqlError::UnboundConjunction)?;
            if child.is_empty() {
                continue;
            }
            parts.push((conjunction, child.render_with(tr)?));
        }

        let mut iter = parts.into_iter();
        let Some((_, first)) = iter.next() else {
            return Ok(String::new());
        };
        let mut rest = iter.peekable();
        if rest.peek().is_none() {
            return Ok(first);
        }

        let mut out = String::from("(");
        out.push_str(&first);
        for (conjunction, sql) in rest {
            out.push(' ');
            out.push_str(conjunction.as_sql());
            out.push(' ');
            out.push_str(&sql);
        }
        out.push(')');
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Dialect;

    fn mysql() -> PredicateSet {
        PredicateSet::new(Dialect::MySql)
    }

    #[test]
    fn single_predicate_is_not_wrapped_again() {
        let target = Target::new(Dialect::MySql);
        let p = Predicate::gte("age", 18);
        let mut set = PredicateSet::new(target.clone());
        set.add_predicate(p.clone());
        assert_eq!(set.render().unwrap(), p.render(&target));
        assert_eq!(set.render().unwrap(), "(`age` >= 18)");
    }

    #[test]
    fn many_predicates_get_one_outer_pair() {
        let mut set = mysql();
        set.add("a = 1").unwrap().or_add("b = 2").unwrap().add("c = 3").unwrap();
        assert_eq!(
            set.render().unwrap(),
            "((`a` = 1) OR (`b` = 2) AND (`c` = 3))"
        );
    }

    #[test]
    fn pending_conjunction_applies_once() {
        let mut set = mysql();
        set.eq("a", 1).or().eq("b", 2).eq("c", 3);
        let conjunctions: Vec<_> = set.predicates().iter().map(|p| p.conjunction()).collect();
        assert_eq!(
            conjunctions,
            vec![Conjunction::And, Conjunction::Or, Conjunction::And]
        );
    }

    #[test]
    fn predicates_render_before_nested_sets() {
        let mut set = mysql();
        set.or_nest().eq("x", 1).eq("y", 2);
        set.eq("a", 1);
        assert_eq!(
            set.render().unwrap(),
            "((`a` = 1) OR ((`x` = 1) AND (`y` = 2)))"
        );
    }

    #[test]
    fn lone_nested_set_renders_unwrapped() {
        let mut set = mysql();
        set.nest().eq("x", 1).or().eq("y", 2);
        assert_eq!(set.render().unwrap(), "((`x` = 1) OR (`y` = 2))");

        let mut single = mysql();
        single.nest().eq("x", 1);
        assert_eq!(single.render().unwrap(), "(`x` = 1)");
    }

    #[test]
    fn deep_nesting() {
        let mut set = mysql();
        set.eq("a", 1);
        let inner = set.and_nest();
        inner.eq("b", 2);
        inner.or_nest().eq("c", 3).eq("d", 4);
        assert_eq!(
            set.render().unwrap(),
            "((`a` = 1) AND ((`b` = 2) OR ((`c` = 3) AND (`d` = 4))))"
        );
    }

    #[test]
    fn empty_sets_render_nothing() {
        let mut set = mysql();
        assert_eq!(set.render().unwrap(), "");
        set.nest();
        assert!(set.is_empty());
        assert_eq!(set.render().unwrap(), "");
        set.eq("a", 1);
        assert_eq!(set.render().unwrap(), "(`a` = 1)");
    }

    #[test]
    fn unbound_child_is_an_error() {
        let mut child = mysql();
        child.eq("x", 1);
        let mut set = mysql();
        set.eq("a", 1).add_set(child.clone());
        assert!(matches!(set.render(), Err(SqlError::UnboundConjunction)));

        let mut bound = mysql();
        bound.eq("a", 1).or().add_set(child.clone());
        assert_eq!(bound.render().unwrap(), "((`a` = 1) OR (`x` = 1))");

        let mut own = mysql();
        own.eq("a", 1).add_set(child.with_conjunction(Conjunction::And));
        assert_eq!(own.render().unwrap(), "((`a` = 1) AND (`x` = 1))");
    }

    #[test]
    fn shorthand_entries() {
        let mut set = mysql();
        set.add_map([
            ("%name%", Value::from("bar")),
            ("name-", Value::from(vec![1, 2])),
            ("age>=", Value::from(18)),
            ("flag", Value::Null),
        ])
        .unwrap();
        assert_eq!(
            set.render().unwrap(),
            "((`name` LIKE '%bar%') AND (`name` NOT IN (1, 2)) AND (`age` >= 18) AND (`flag` IS NULL))"
        );
    }

    #[test]
    fn tuple_criterion_is_shorthand() {
        let mut set = PredicateSet::new(Dialect::Postgres);
        set.add(("age<", 65)).unwrap();
        assert_eq!(set.render().unwrap(), r#"("age" < 65)"#);
    }

    #[test]
    fn malformed_text_is_rejected() {
        let mut set = mysql();
        assert!(matches!(
            set.add("age >>= 1"),
            Err(SqlError::MalformedExpression { .. })
        ));
        assert!(set.is_empty());
    }

    #[test]
    fn failed_add_drops_the_pending_conjunction() {
        let mut set = mysql();
        set.add("a = 1").unwrap();
        assert!(set.or().add("b >>= 2").is_err());
        set.add("c = 3").unwrap();
        assert_eq!(set.render().unwrap(), "((`a` = 1) AND (`c` = 3))");

        let mut set = mysql();
        set.add("a = 1").unwrap();
        assert!(set.or().add_map([("x", Value::Int(1)), ("", Value::Int(2))]).is_err());
        set.add("c = 3").unwrap();
        assert_eq!(set.render().unwrap(), "((`a` = 1) AND (`c` = 3))");
    }
}
