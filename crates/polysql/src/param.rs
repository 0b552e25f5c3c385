//! Placeholder recognition and per-render parameter translation.
//!
//! Placeholders may be written in any of the three conventions (`?`, `$n`,
//! `:name`); [`ParamTranslator`] rewrites them into the target dialect's
//! native form while a statement renders, numbering `$n` placeholders and
//! collecting deferred bind values in left-to-right order.

use crate::dialect::{PlaceholderStyle, Target};
use crate::value::Value;
use std::collections::HashMap;

/// Returns the convention `token` is written in, if it is a placeholder.
///
/// `:name` only counts when `name` is the bound column (as written, or with
/// non-word characters replaced by `_`). Without a column any `:name` counts.
pub fn placeholder_style(token: &str, column: Option<&str>) -> Option<PlaceholderStyle> {
    if token == "?" {
        return Some(PlaceholderStyle::Positional);
    }
    if let Some(digits) = token.strip_prefix('$') {
        if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
            return Some(PlaceholderStyle::Numbered);
        }
        return None;
    }
    let name = token.strip_prefix(':')?;
    let matches = match column {
        Some(column) => name == column || name == placeholder_name(column),
        None => {
            !name.is_empty()
                && name.starts_with(|c: char| c == '_' || c.is_ascii_alphabetic())
                && name.chars().all(|c| c == '_' || c.is_ascii_alphanumeric())
        }
    };
    matches.then_some(PlaceholderStyle::Named)
}

/// True if `token` is a placeholder in any recognized convention.
pub fn is_parameter_token(token: &str, column: Option<&str>) -> bool {
    placeholder_style(token, column).is_some()
}

/// Name used for a `:name` placeholder bound to `column`.
pub fn placeholder_name(column: &str) -> String {
    let name: String = column
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if name.is_empty() {
        "param".to_string()
    } else {
        name
    }
}

/// State of one render pass: the `$n` counter, used `:name`s, and deferred values.
#[derive(Debug)]
pub struct ParamTranslator<'a> {
    target: &'a Target,
    counter: usize,
    names: HashMap<String, usize>,
    params: Vec<Value>,
}

impl<'a> ParamTranslator<'a> {
    pub fn new(target: &'a Target) -> Self {
        Self {
            target,
            counter: 0,
            names: HashMap::new(),
            params: Vec::new(),
        }
    }

    pub fn target(&self) -> &'a Target {
        self.target
    }

    /// Number of `$n` placeholders issued so far in this pass.
    pub fn counter(&self) -> usize {
        self.counter
    }

    /// Rewrite a placeholder token into the dialect's native convention.
    ///
    /// Tokens already in the native convention, and anything that is not a
    /// placeholder, are returned unchanged. A native `$n` raises the counter
    /// to at least `n`, so later placeholders never reuse its number.
    pub fn translate(&mut self, token: &str, column: Option<&str>) -> String {
        let Some(style) = placeholder_style(token, column) else {
            return token.to_string();
        };
        let native = self.target.dialect().placeholder_style();
        if style == native {
            match style {
                PlaceholderStyle::Named => {
                    self.reserve_name(&token[1..]);
                }
                PlaceholderStyle::Numbered => {
                    if let Ok(n) = token[1..].parse::<usize>() {
                        self.counter = self.counter.max(n);
                    }
                }
                PlaceholderStyle::Positional => {}
            }
            return token.to_string();
        }
        self.next_placeholder(native, column)
    }

    /// Defer `value` as a bind parameter and return its native placeholder.
    pub fn bind(&mut self, value: Value, column: Option<&str>) -> String {
        let native = self.target.dialect().placeholder_style();
        let placeholder = self.next_placeholder(native, column);
        self.params.push(value);
        placeholder
    }

    fn next_placeholder(&mut self, style: PlaceholderStyle, column: Option<&str>) -> String {
        match style {
            PlaceholderStyle::Positional => "?".to_string(),
            PlaceholderStyle::Numbered => {
                self.counter += 1;
                format!("${}", self.counter)
            }
            PlaceholderStyle::Named => {
                let base = placeholder_name(column.unwrap_or("param"));
                let name = self.reserve_name(&base);
                format!(":{name}")
            }
        }
    }

    /// Claim `base` (or `base_2`, `base_3`, ...) for this pass.
    fn reserve_name(&mut self, base: &str) -> String {
        let seen = self.names.entry(base.to_string()).or_insert(0);
        *seen += 1;
        if *seen == 1 {
            base.to_string()
        } else {
            format!("{base}_{seen}")
        }
    }

    /// Render a value for inclusion in SQL text.
    pub fn quote_value(&mut self, value: &Value, column: Option<&str>) -> String {
        match value {
            Value::Null => "NULL".to_string(),
            Value::Bool(b) => {
                let literals = self.target.spec().boolean_literals;
                match (b, literals) {
                    (true, true) => "TRUE".to_string(),
                    (false, true) => "FALSE".to_string(),
                    (true, false) => "1".to_string(),
                    (false, false) => "0".to_string(),
                }
            }
            Value::Int(i) => i.to_string(),
            Value::Float(x) if x.is_finite() => x.to_string(),
            Value::Float(x) => self.target.quote_string(&x.to_string()),
            Value::Text(s) => {
                if is_parameter_token(s, column) {
                    self.translate(s, column)
                } else {
                    self.target.quote_string(s)
                }
            }
            Value::List(items) => {
                let rendered: Vec<String> =
                    items.iter().map(|item| self.quote_value(item, column)).collect();
                format!("({})", rendered.join(", "))
            }
            Value::Column(name) => self.target.quote_identifier(name),
            Value::Raw(sql) => sql.clone(),
            Value::Param(inner) => self.bind((**inner).clone(), column),
        }
    }

    pub fn quote_identifier(&self, name: &str) -> String {
        self.target.quote_identifier(name)
    }

    /// Deferred values in placeholder order.
    pub fn into_params(self) -> Vec<Value> {
        self.params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Dialect;

    #[test]
    fn recognizes_the_three_conventions() {
        assert!(is_parameter_token("?", Some("id")));
        assert!(is_parameter_token("$1", Some("id")));
        assert!(is_parameter_token("$42", None));
        assert!(is_parameter_token(":id", Some("id")));
        assert!(is_parameter_token(":u_id", Some("u.id")));

        assert!(!is_parameter_token(":name", Some("id")));
        assert!(!is_parameter_token("$", None));
        assert!(!is_parameter_token("$1a", None));
        assert!(!is_parameter_token("??", None));
        assert!(!is_parameter_token("id", Some("id")));
    }

    #[test]
    fn named_to_positional_for_mysql() {
        let target = Target::new(Dialect::MySql);
        let mut tr = ParamTranslator::new(&target);
        assert_eq!(tr.translate(":name", Some("name")), "?");
        assert_eq!(tr.translate("$3", Some("name")), "?");
        assert_eq!(tr.translate("?", None), "?");
    }

    #[test]
    fn numbered_counter_increases_per_pass() {
        let target = Target::new(Dialect::Postgres);
        let mut tr = ParamTranslator::new(&target);
        assert_eq!(tr.translate(":name", Some("name")), "$1");
        assert_eq!(tr.translate("?", Some("age")), "$2");
        // Native tokens pass through and move the counter past their number.
        assert_eq!(tr.translate("$7", None), "$7");
        assert_eq!(tr.translate(":name", Some("name")), "$8");
        assert_eq!(tr.translate("$1", None), "$1");
        assert_eq!(tr.translate("?", None), "$9");
        assert_eq!(tr.counter(), 9);

        let mut fresh = ParamTranslator::new(&target);
        assert_eq!(fresh.translate(":name", Some("name")), "$1");
    }

    #[test]
    fn sqlite_names_are_unique_per_pass() {
        let target = Target::new(Dialect::Sqlite);
        let mut tr = ParamTranslator::new(&target);
        assert_eq!(tr.translate("?", Some("age")), ":age");
        assert_eq!(tr.translate("$1", Some("age")), ":age_2");
        assert_eq!(tr.translate("?", Some("u.id")), ":u_id");
        assert_eq!(tr.translate("?", None), ":param");
    }

    #[test]
    fn bind_collects_values_in_order() {
        let target = Target::new(Dialect::Postgres);
        let mut tr = ParamTranslator::new(&target);
        assert_eq!(tr.quote_value(&Value::param("alice"), Some("name")), "$1");
        assert_eq!(tr.quote_value(&Value::Int(3), Some("age")), "3");
        assert_eq!(tr.quote_value(&Value::param(30), Some("age")), "$2");
        assert_eq!(
            tr.into_params(),
            vec![Value::Text("alice".into()), Value::Int(30)]
        );
    }

    #[test]
    fn quotes_literals() {
        let target = Target::new(Dialect::MySql);
        let mut tr = ParamTranslator::new(&target);
        assert_eq!(tr.quote_value(&Value::from("O'Brien"), None), "'O''Brien'");
        assert_eq!(tr.quote_value(&Value::Bool(true), None), "1");
        assert_eq!(tr.quote_value(&Value::Null, None), "NULL");
        assert_eq!(tr.quote_value(&Value::Float(1.5), None), "1.5");
        assert_eq!(tr.quote_value(&Value::from(vec![1, 2]), None), "(1, 2)");
        assert_eq!(tr.quote_value(&Value::column("o.user_id"), None), "`o`.`user_id`");
        assert_eq!(tr.quote_value(&Value::raw("NOW()"), None), "NOW()");

        let pg = Target::new(Dialect::Postgres);
        let mut tr = ParamTranslator::new(&pg);
        assert_eq!(tr.quote_value(&Value::Bool(false), None), "FALSE");
    }
}
