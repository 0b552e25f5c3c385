//! Grammar for condition text: `<column> <op> <value>`.

use super::Expression;
use crate::error::{SqlError, SqlResult};
use crate::predicate::Operator;
use crate::value::Value;
use nom::{
    IResult,
    branch::alt,
    bytes::complete::{is_not, tag, tag_no_case},
    character::complete::{char, digit1, multispace0, multispace1, satisfy},
    combinator::{all_consuming, map, not, opt, recognize, value},
    multi::{many0_count, separated_list0, separated_list1},
    sequence::{delimited, pair, preceded, terminated, tuple},
};

/// Parse a condition such as `"age >= 18"` or `"u.id = o.user_id"`.
///
/// Values: single-quoted strings (`''` escapes a quote), integers and
/// decimals, `TRUE`/`FALSE`/`NULL`, placeholders (`?`, `$n`, `:name`), function
/// calls (kept verbatim) and bare identifiers (column references).
/// `BETWEEN` takes `a AND b` or `(a, b)`; `IN` takes `(a, b, ...)`.
pub fn parse_expression(input: &str) -> SqlResult<Expression> {
    let (rest, column) = delimited(multispace0, column, multispace0)(input)
        .map_err(|_| SqlError::malformed(input, "expected a column"))?;

    let (rest, operator) = operator(rest).map_err(|_| {
        SqlError::malformed(input, format!("unknown operator near '{}'", rest.trim()))
    })?;

    let (rest, operands) = match operator {
        Operator::IsNull | Operator::IsNotNull => (rest, Vec::new()),
        Operator::In | Operator::NotIn => preceded(multispace0, value_list)(rest)
            .map_err(|_| {
                SqlError::malformed(input, format!("{} expects a parenthesized list", operator.as_sql()))
            })?,
        Operator::Between | Operator::NotBetween => {
            preceded(multispace0, between_bounds)(rest).map_err(|_| {
                SqlError::malformed(
                    input,
                    format!("{} expects 'a AND b' or '(a, b)'", operator.as_sql()),
                )
            })?
        }
        _ => map(preceded(multispace0, scalar), |v| vec![v])(rest).map_err(|_| {
            SqlError::malformed(input, format!("expected a value after {}", operator.as_sql()))
        })?,
    };

    let rest = rest.trim();
    if !rest.is_empty() {
        return Err(SqlError::malformed(
            input,
            format!("unexpected trailing input '{rest}'"),
        ));
    }

    Ok(Expression::new(column, operator, operands))
}

/// Parse a complete parenthesized list such as `"(1, 'a')"`.
pub(crate) fn parse_value_list(input: &str) -> Option<Vec<Value>> {
    all_consuming(delimited(multispace0, value_list, multispace0))(input)
        .ok()
        .map(|(_, values)| values)
}

fn is_word_char(c: char) -> bool {
    c == '_' || c.is_ascii_alphanumeric()
}

/// A keyword that is not the prefix of a longer word.
fn keyword<'a>(kw: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    terminated(tag_no_case(kw), not(satisfy(is_word_char)))
}

fn bare_ident(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        satisfy(|c| c == '_' || c.is_ascii_alphabetic()),
        many0_count(satisfy(|c| is_word_char(c) || c == '$')),
    ))(input)
}

fn quoted_with<'a>(open: char, close: char) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    let doubled: &'static str = match close {
        '"' => "\"\"",
        '`' => "``",
        _ => "]]",
    };
    let stop: &'static str = match close {
        '"' => "\"",
        '`' => "`",
        _ => "]",
    };
    recognize(tuple((
        char(open),
        many0_count(alt((tag(doubled), is_not(stop)))),
        char(close),
    )))
}

fn ident_part(input: &str) -> IResult<&str, &str> {
    alt((
        quoted_with('"', '"'),
        quoted_with('`', '`'),
        quoted_with('[', ']'),
        bare_ident,
        tag("*"),
    ))(input)
}

fn dotted_ident(input: &str) -> IResult<&str, &str> {
    recognize(separated_list1(char('.'), ident_part))(input)
}

/// Text between balanced parentheses, parentheses included.
fn balanced_parens(input: &str) -> IResult<&str, &str> {
    let mut depth = 0usize;
    let mut in_string = false;
    for (idx, c) in input.char_indices() {
        match c {
            '\'' => in_string = !in_string,
            '(' if !in_string => depth += 1,
            ')' if !in_string => {
                if depth == 0 {
                    break;
                }
                depth -= 1;
                if depth == 0 {
                    let end = idx + 1;
                    return Ok((&input[end..], &input[..end]));
                }
            }
            _ => {}
        }
        if depth == 0 {
            break;
        }
    }
    Err(nom::Err::Error(nom::error::Error::new(
        input,
        nom::error::ErrorKind::Char,
    )))
}

fn function_call(input: &str) -> IResult<&str, &str> {
    recognize(tuple((dotted_ident, multispace0, balanced_parens)))(input)
}

fn column(input: &str) -> IResult<&str, String> {
    map(alt((function_call, dotted_ident)), str::to_string)(input)
}

fn operator(input: &str) -> IResult<&str, Operator> {
    alt((
        value(
            Operator::IsNotNull,
            tuple((keyword("IS"), multispace1, keyword("NOT"), multispace1, keyword("NULL"))),
        ),
        value(
            Operator::IsNull,
            tuple((keyword("IS"), multispace1, keyword("NULL"))),
        ),
        value(
            Operator::NotBetween,
            tuple((keyword("NOT"), multispace1, keyword("BETWEEN"))),
        ),
        value(
            Operator::NotLike,
            tuple((keyword("NOT"), multispace1, keyword("LIKE"))),
        ),
        value(
            Operator::NotIn,
            tuple((keyword("NOT"), multispace1, keyword("IN"))),
        ),
        value(Operator::Between, keyword("BETWEEN")),
        value(Operator::Like, keyword("LIKE")),
        value(Operator::In, keyword("IN")),
        value(Operator::Gte, tag(">=")),
        value(Operator::Lte, tag("<=")),
        value(Operator::Ne, alt((tag("!="), tag("<>")))),
        value(Operator::Eq, tag("=")),
        value(Operator::Gt, tag(">")),
        value(Operator::Lt, tag("<")),
    ))(input)
}

fn string_literal(input: &str) -> IResult<&str, Value> {
    map(
        delimited(
            char('\''),
            recognize(many0_count(alt((tag("''"), is_not("'"))))),
            char('\''),
        ),
        |body: &str| Value::Text(body.replace("''", "'")),
    )(input)
}

fn number(input: &str) -> IResult<&str, Value> {
    let (rest, text) = terminated(
        recognize(tuple((
            opt(char('-')),
            digit1,
            opt(pair(char('.'), digit1)),
        ))),
        not(satisfy(is_word_char)),
    )(input)?;
    let parsed = if text.contains('.') {
        text.parse::<f64>().ok().map(Value::Float)
    } else {
        text.parse::<i64>().ok().map(Value::Int)
    };
    match parsed {
        Some(v) => Ok((rest, v)),
        None => Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Digit,
        ))),
    }
}

fn placeholder(input: &str) -> IResult<&str, Value> {
    map(
        alt((
            recognize(char('?')),
            recognize(pair(char('$'), digit1)),
            recognize(pair(char(':'), bare_ident)),
        )),
        |token: &str| Value::Text(token.to_string()),
    )(input)
}

fn literal_keyword(input: &str) -> IResult<&str, Value> {
    alt((
        value(Value::Null, keyword("NULL")),
        value(Value::Bool(true), keyword("TRUE")),
        value(Value::Bool(false), keyword("FALSE")),
    ))(input)
}

fn scalar(input: &str) -> IResult<&str, Value> {
    alt((
        string_literal,
        number,
        placeholder,
        literal_keyword,
        map(function_call, |f: &str| Value::Raw(f.to_string())),
        map(dotted_ident, |c: &str| Value::Column(c.to_string())),
    ))(input)
}

fn value_list(input: &str) -> IResult<&str, Vec<Value>> {
    delimited(
        pair(char('('), multispace0),
        separated_list0(delimited(multispace0, char(','), multispace0), scalar),
        pair(multispace0, char(')')),
    )(input)
}

fn between_bounds(input: &str) -> IResult<&str, Vec<Value>> {
    alt((
        map(
            tuple((scalar, multispace1, keyword("AND"), multispace1, scalar)),
            |(low, _, _, _, high)| vec![low, high],
        ),
        value_list,
    ))(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Expression {
        parse_expression(text).unwrap()
    }

    #[test]
    fn comparison_with_number() {
        let e = parse("age >= 18");
        assert_eq!(e.column, "age");
        assert_eq!(e.operator, Operator::Gte);
        assert_eq!(e.operands, vec![Value::Int(18)]);

        let e = parse("price<9.5");
        assert_eq!(e.operator, Operator::Lt);
        assert_eq!(e.operands, vec![Value::Float(9.5)]);

        assert_eq!(parse("n = -3").operands, vec![Value::Int(-3)]);
        assert_eq!(parse("a <> 1").operator, Operator::Ne);
    }

    #[test]
    fn string_literals_unescape_quotes() {
        let e = parse("name = 'O''Brien'");
        assert_eq!(e.operands, vec![Value::Text("O'Brien".into())]);

        let e = parse("name not like 'a%'");
        assert_eq!(e.operator, Operator::NotLike);
        assert_eq!(e.operands, vec![Value::Text("a%".into())]);
    }

    #[test]
    fn null_checks_take_no_value() {
        assert_eq!(parse("deleted_at IS NULL").operator, Operator::IsNull);
        let e = parse("deleted_at is not null");
        assert_eq!(e.operator, Operator::IsNotNull);
        assert!(e.operands.is_empty());
    }

    #[test]
    fn in_and_between_lists() {
        let e = parse("id IN (1, 2, 3)");
        assert_eq!(e.operator, Operator::In);
        assert_eq!(e.operands.len(), 3);

        let e = parse("status NOT IN ('a','b')");
        assert_eq!(e.operator, Operator::NotIn);
        assert_eq!(
            e.operands,
            vec![Value::Text("a".into()), Value::Text("b".into())]
        );

        let e = parse("age BETWEEN 18 AND 30");
        assert_eq!(e.operands, vec![Value::Int(18), Value::Int(30)]);

        let e = parse("age NOT BETWEEN (1, 5)");
        assert_eq!(e.operator, Operator::NotBetween);
        assert_eq!(e.operands, vec![Value::Int(1), Value::Int(5)]);

        assert!(parse("id IN ()").operands.is_empty());
    }

    #[test]
    fn column_references_and_functions() {
        let e = parse("u.id = o.user_id");
        assert_eq!(e.column, "u.id");
        assert_eq!(e.operands, vec![Value::Column("o.user_id".into())]);

        let e = parse("COUNT(*) > 5");
        assert_eq!(e.column, "COUNT(*)");

        let e = parse("created_at < NOW()");
        assert_eq!(e.operands, vec![Value::Raw("NOW()".into())]);

        let e = parse(r#""Order"."Total" = 1"#);
        assert_eq!(e.column, r#""Order"."Total""#);
    }

    #[test]
    fn placeholders_and_keywords() {
        assert_eq!(parse("id = ?").operands, vec![Value::Text("?".into())]);
        assert_eq!(parse("id = $2").operands, vec![Value::Text("$2".into())]);
        assert_eq!(parse("id = :id").operands, vec![Value::Text(":id".into())]);
        assert_eq!(parse("active = true").operands, vec![Value::Bool(true)]);
        assert_eq!(parse("x = NULL").operands, vec![Value::Null]);
        // A keyword prefix is still an identifier.
        assert_eq!(parse("x = nullable").operands, vec![Value::Column("nullable".into())]);
    }

    #[test]
    fn malformed_inputs() {
        for bad in [
            "",
            "age",
            "age >>= 1",
            "age >=",
            "age = 1 2",
            "name = 'open",
            "id IN 1",
            "age BETWEEN 1",
            "= 5",
        ] {
            let err = parse_expression(bad).unwrap_err();
            assert!(
                matches!(err, SqlError::MalformedExpression { .. }),
                "{bad:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn value_list_helper() {
        assert_eq!(
            parse_value_list("(1, 5)"),
            Some(vec![Value::Int(1), Value::Int(5)])
        );
        assert_eq!(parse_value_list("hello"), None);
        assert_eq!(parse_value_list("(1, 5) trailing"), None);
    }
}
