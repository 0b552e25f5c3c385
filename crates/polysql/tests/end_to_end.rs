//! End-to-end rendering through the public API.

use polysql::{
    Conjunction, Dialect, Operator, Predicate, PredicateSet, Sql, SqlError, Statement, Value,
    parse_shorthand, qb,
};

#[test]
fn single_predicate_set_renders_like_the_predicate() {
    for dialect in Dialect::ALL {
        let p = Predicate::parse("age >= 18").unwrap();
        let mut set = PredicateSet::new(dialect);
        set.add_predicate(p.clone());
        assert_eq!(set.render().unwrap(), p.render(&dialect.into()));
    }
}

#[test]
fn predicate_lists_get_one_outer_pair() {
    let mut set = PredicateSet::new(Dialect::Postgres);
    set.add("a = 1").unwrap();
    set.or().add("b = 2").unwrap();
    set.add("c = 3").unwrap();
    assert_eq!(
        set.render().unwrap(),
        r#"(("a" = 1) OR ("b" = 2) AND ("c" = 3))"#
    );
}

#[test]
fn named_placeholders_follow_the_dialect() {
    let mut q = qb::select(Dialect::MySql);
    q.from("users").where_("name = :name").unwrap();
    assert_eq!(q.render().unwrap(), "SELECT * FROM `users` WHERE (`name` = ?)");

    let mut q = qb::select(Dialect::Postgres);
    q.from("users")
        .where_("name = :name")
        .unwrap()
        .where_("age > :age")
        .unwrap();
    let sql = q.render().unwrap();
    assert_eq!(
        sql,
        r#"SELECT * FROM "users" WHERE (("name" = $1) AND ("age" > $2))"#
    );
    // A second render numbers from $1 again.
    assert_eq!(q.render().unwrap(), sql);
}

#[test]
fn shorthand_map_entries() {
    let cases = [
        ("%name%", Value::from("bar"), "(`name` LIKE '%bar%')"),
        ("name-", Value::from(vec![1, 2]), "(`name` NOT IN (1, 2))"),
        ("age>=", Value::from(18), "(`age` >= 18)"),
        ("flag", Value::Null, "(`flag` IS NULL)"),
    ];
    for (key, value, expected) in cases {
        let mut set = PredicateSet::new(Dialect::MySql);
        set.add((key, value)).unwrap();
        assert_eq!(set.render().unwrap(), expected, "key {key}");
    }
}

#[test]
fn shorthand_range_and_negation() {
    let e = parse_shorthand("age", Value::from("(18, 65)")).unwrap();
    assert_eq!(e.operator, Operator::Between);

    let e = parse_shorthand("age-", Value::from("(18, 65)")).unwrap();
    assert_eq!(e.operator, Operator::NotBetween);

    let e = parse_shorthand("deleted_at-", Value::Null).unwrap();
    assert_eq!(e.operator, Operator::IsNotNull);

    assert!(matches!(
        parse_shorthand("", Value::from(1)),
        Err(SqlError::MalformedExpression { .. })
    ));
}

#[test]
fn select_matches_across_dialects() {
    let expected = [
        (Dialect::MySql, "SELECT `id`, `username` FROM `users` WHERE (`id` = 1)"),
        (Dialect::Postgres, r#"SELECT "id", "username" FROM "users" WHERE ("id" = 1)"#),
        (Dialect::Sqlite, r#"SELECT "id", "username" FROM "users" WHERE ("id" = 1)"#),
        (Dialect::SqlServer, "SELECT [id], [username] FROM [users] WHERE ([id] = 1)"),
    ];
    for (dialect, sql) in expected {
        let mut q = Sql::new(dialect);
        q.select()
            .columns(["id", "username"])
            .from("users")
            .where_("id = 1")
            .unwrap();
        assert_eq!(q.render().unwrap(), sql);
    }
}

#[test]
fn sql_server_paging_needs_order_by() {
    let mut q = qb::select(Dialect::SqlServer);
    q.from("posts").paginate(2, 10);
    assert!(matches!(
        q.render(),
        Err(SqlError::DialectConstraintViolation { .. })
    ));

    q.order_by("published_at DESC");
    let sql = q.render().unwrap();
    assert!(sql.contains("ROW_NUMBER() OVER (ORDER BY [published_at] DESC) AS [RowNumber]"));
    assert!(sql.ends_with("WHERE ([RowNumber] BETWEEN 11 AND 20) ORDER BY [RowNumber]"));
}

#[test]
fn nested_conditions_with_explicit_conjunctions() {
    let mut q = qb::select(Dialect::Sqlite);
    q.from("products").where_("price < 100").unwrap();
    {
        let any_tag = q.where_clause().and_nest();
        any_tag.like("name", "%lamp%");
        any_tag.or().like("name", "%light%");
    }
    q.where_clause()
        .add_set(PredicateSet::new(Dialect::Sqlite).with_conjunction(Conjunction::Or));
    assert_eq!(
        q.render().unwrap(),
        r#"SELECT * FROM "products" WHERE (("price" < 100) AND (("name" LIKE '%lamp%') OR ("name" LIKE '%light%')))"#
    );
}

#[test]
fn arity_errors_surface_from_builders() {
    let mut q = qb::select(Dialect::MySql);
    assert!(matches!(
        q.where_("id IN ()"),
        Err(SqlError::ArityMismatch { .. })
    ));
    assert!(matches!(
        q.where_clause().in_list("id", Vec::<i64>::new()),
        Err(SqlError::ArityMismatch { .. })
    ));
}
