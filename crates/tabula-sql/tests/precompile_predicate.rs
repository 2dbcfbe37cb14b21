use pretty_assertions::assert_eq;
use std::{sync::Arc, thread};
use tabula_core::{
    config::CaseFolding,
    registry::{ResultKind, StatementId, StatementKind},
    schema::{
        meta::{ClassMeta, MetadataRegistry, PropertyMeta, ValueType},
        Metamodel, SqlType,
    },
    stmt::{InArg, Operator, Order, Paging, Part, PredicateQuery, Query},
    Config, Dialect, Result, StatementRegistry,
};
use tabula_sql::Precompiler;

const NAMESPACE: &str = "ShopRepository";

fn make_shop() -> MetadataRegistry {
    MetadataRegistry::new().with(
        ClassMeta::new("Shop")
            .property(PropertyMeta::new("id", ValueType::I64).id())
            .property(PropertyMeta::new("name", ValueType::String))
            .property(PropertyMeta::new("active", ValueType::Bool)),
    )
}

fn make_metamodel(dialect: Dialect, config: Config) -> Metamodel {
    Metamodel::new(Arc::new(make_shop()), dialect, config)
}

fn try_compile(metamodel: &Metamodel, query: PredicateQuery) -> Result<StatementRegistry> {
    let registry = StatementRegistry::new();
    Precompiler::new(metamodel, &registry).compile(NAMESPACE, &"Shop".into(), &query.into())?;
    Ok(registry)
}

fn compile(dialect: Dialect, query: PredicateQuery) -> StatementRegistry {
    try_compile(&make_metamodel(dialect, Config::default()), query).unwrap()
}

fn sql(registry: &StatementRegistry, name: &str) -> String {
    registry
        .lookup(NAMESPACE, name)
        .unwrap_or_else(|| panic!("`{name}` not registered"))
        .sql
        .clone()
}

fn first_two_active() -> PredicateQuery {
    PredicateQuery::find("findFirst2ByActiveTrue")
        .or([Part::new("active", Operator::True)])
        .limit(2)
}

#[test]
fn first_n_appends_limit() {
    for dialect in [Dialect::MYSQL, Dialect::POSTGRESQL] {
        let registry = compile(dialect, first_two_active());
        assert_eq!(
            sql(&registry, "findFirst2ByActiveTrue"),
            "SELECT id, name, active FROM shop WHERE active = TRUE LIMIT 2"
        );
    }
}

#[test]
fn first_n_wraps_on_row_number_dialects() {
    let registry = compile(Dialect::ORACLE, first_two_active());
    assert_eq!(
        sql(&registry, "findFirst2ByActiveTrue"),
        "SELECT * FROM ( SELECT id, name, active FROM shop WHERE active = 1 ) WHERE ROWNUM <= 2"
    );

    let registry = compile(Dialect::DB2, first_two_active());
    let db2 = sql(&registry, "findFirst2ByActiveTrue");
    assert!(db2.contains("( SELECT id, name, active FROM shop WHERE active = 1 )"), "{db2}");
    assert!(db2.ends_with("WHERE rownumber_ <= 2 ORDER BY rownumber_"), "{db2}");
}

#[test]
fn find_registers_count_sibling() {
    let registry = compile(Dialect::MYSQL, first_two_active());

    let count = registry
        .lookup(NAMESPACE, "findFirst2ByActiveTrue__count")
        .unwrap();
    assert_eq!(count.sql, "SELECT COUNT(*) FROM shop WHERE active = TRUE");
    assert_eq!(
        count.result.as_ref().unwrap().kind,
        ResultKind::Scalar(SqlType::BigInt)
    );
}

#[test]
fn groups_and_generated_parameters() {
    let query = PredicateQuery::find("findByNameStartingWithAndIdBetweenOrNameInIgnoreCase")
        .or([
            Part::new("name", Operator::StartingWith),
            Part::new("id", Operator::Between),
        ])
        .or([Part::new("name", Operator::In(InArg::Collection)).ignore_case()]);

    let registry = compile(Dialect::POSTGRESQL, query);
    let statement = registry
        .lookup(NAMESPACE, "findByNameStartingWithAndIdBetweenOrNameInIgnoreCase")
        .unwrap();

    assert_eq!(
        statement.sql,
        concat!(
            "SELECT id, name, active FROM shop WHERE ",
            "(name LIKE #{param1} || '%' AND id BETWEEN #{param2} AND #{param3}) ",
            "OR UPPER(name) IN <foreach collection=\"param4\" item=\"item\" open=\"(\" ",
            "separator=\", \" close=\")\">UPPER(#{item})</foreach>"
        )
    );
    assert_eq!(statement.parameters, ["param1", "param2", "param3", "param4"]);
}

#[test]
fn comparison_and_null_operators() {
    let query = PredicateQuery::find("findByMany").or([
        Part::new("id", Operator::GreaterThanEqual).param("min"),
        Part::new("id", Operator::Before).param("max"),
        Part::new("name", Operator::NotEquals).param("excluded"),
        Part::new("name", Operator::IsNotNull),
        Part::new("active", Operator::False),
    ]);

    let registry = compile(Dialect::MYSQL, query);
    assert_eq!(
        sql(&registry, "findByMany"),
        "SELECT id, name, active FROM shop WHERE id >= #{min} AND id < #{max} \
         AND name <> #{excluded} AND name IS NOT NULL AND active = FALSE"
    );
}

#[test]
fn like_family_builds_patterns_with_dialect_concat() {
    let query = PredicateQuery::find("findByNameContaining").or([
        Part::new("name", Operator::Containing).param("fragment"),
        Part::new("name", Operator::NotLike).param("pattern"),
        Part::new("name", Operator::EndingWith).param("suffix"),
    ]);

    let registry = compile(Dialect::MYSQL, query);
    assert_eq!(
        sql(&registry, "findByNameContaining"),
        "SELECT id, name, active FROM shop WHERE name LIKE CONCAT('%', #{fragment}, '%') \
         AND name NOT LIKE #{pattern} AND name LIKE CONCAT('%', #{suffix})"
    );
}

#[test]
fn fixed_in_list() {
    let query = PredicateQuery::count("countByIdNotIn")
        .or([Part::new("id", Operator::NotIn(InArg::List(2)))]);

    let registry = compile(Dialect::POSTGRESQL, query);
    assert_eq!(
        sql(&registry, "countByIdNotIn"),
        "SELECT COUNT(*) FROM shop WHERE id NOT IN (#{param1}, #{param2})"
    );
}

#[test]
fn collation_folds_the_column_only() {
    let mut config = Config::default();
    config.case_folding(CaseFolding::Collate("NOCASE".to_string()));

    let query =
        PredicateQuery::find("findByNameIgnoreCase").or([Part::new("name", Operator::Equals).ignore_case()]);
    let registry = try_compile(&make_metamodel(Dialect::SQLITE, config), query).unwrap();

    assert_eq!(
        sql(&registry, "findByNameIgnoreCase"),
        "SELECT id, name, active FROM shop WHERE name COLLATE NOCASE = #{param1}"
    );
}

#[test]
fn ignore_case_skips_non_text_columns() {
    let query = PredicateQuery::find("findByIdIgnoreCase").or([Part::new("id", Operator::Equals).ignore_case()]);

    let registry = compile(Dialect::POSTGRESQL, query);
    assert_eq!(
        sql(&registry, "findByIdIgnoreCase"),
        "SELECT id, name, active FROM shop WHERE id = #{param1}"
    );
}

#[test]
fn regex_uses_the_dialect_template() {
    let query = PredicateQuery::find("findByNameRegex").or([Part::new("name", Operator::Regex).param("re")]);

    let registry = compile(Dialect::MYSQL, query);
    assert_eq!(
        sql(&registry, "findByNameRegex"),
        "SELECT id, name, active FROM shop WHERE name REGEXP #{re}"
    );
}

#[test]
fn regex_without_support_is_a_capability_error() {
    let query = PredicateQuery::find("findByNameRegex").or([Part::new("name", Operator::Regex)]);

    let err = try_compile(&make_metamodel(Dialect::ANSI, Config::default()), query).unwrap_err();
    assert!(err.is_unsupported_capability(), "{err}");
    assert!(err.to_string().contains("ShopRepository.findByNameRegex"), "{err}");
}

#[test]
fn distinct_sorted_find_and_wrapped_count() {
    let query = PredicateQuery::find("findDistinctByActiveFalseOrderByNameDesc")
        .distinct()
        .or([Part::new("active", Operator::False)])
        .order_by(Order::desc("name").ignore_case())
        .order_by(Order::asc("id"));

    let registry = compile(Dialect::POSTGRESQL, query);
    assert_eq!(
        sql(&registry, "findDistinctByActiveFalseOrderByNameDesc"),
        "SELECT DISTINCT id, name, active FROM shop WHERE active = FALSE ORDER BY UPPER(name) DESC, id ASC"
    );
    assert_eq!(
        sql(&registry, "findDistinctByActiveFalseOrderByNameDesc__count"),
        "SELECT COUNT(*) FROM ( SELECT DISTINCT id, name, active FROM shop WHERE active = FALSE ) count_"
    );
}

#[test]
fn pageable_find_registers_paged_sibling() {
    let query = PredicateQuery::find("findByActive")
        .or([Part::new("active", Operator::Equals)])
        .paging(Paging::Pageable);

    let registry = compile(Dialect::POSTGRESQL, query);

    assert_eq!(
        sql(&registry, "findByActive"),
        "SELECT id, name, active FROM shop WHERE active = #{param1}"
    );

    let paged = registry.lookup(NAMESPACE, "findByActive__paged").unwrap();
    assert_eq!(
        paged.sql,
        "SELECT id, name, active FROM shop WHERE active = #{param1} LIMIT #{pageSize} OFFSET #{offset}"
    );
    assert_eq!(paged.paging_companion.as_deref(), Some("findByActive__count"));
    assert_eq!(paged.parameters, ["param1", "pageSize", "offset"]);
    assert!(registry.contains(&paged.id.sibling("findByActive__count")));
}

#[test]
fn fixed_page_uses_literal_bounds() {
    let query = PredicateQuery::find("findAllPage3").paging(Paging::Fixed {
        offset: 20,
        size: 10,
    });

    let registry = compile(Dialect::MYSQL, query);
    assert_eq!(
        sql(&registry, "findAllPage3"),
        "SELECT id, name, active FROM shop LIMIT 20, 10"
    );
}

#[test]
fn exists_selects_one_row() {
    let query = PredicateQuery::exists("existsByName").or([Part::new("name", Operator::Equals).param("name")]);

    let registry = compile(Dialect::MYSQL, query);
    let statement = registry.lookup(NAMESPACE, "existsByName").unwrap();

    assert_eq!(statement.sql, "SELECT 1 FROM shop WHERE name = #{name} LIMIT 1");
    assert_eq!(
        statement.result.as_ref().unwrap().kind,
        ResultKind::Scalar(SqlType::Integer)
    );
}

#[test]
fn delete_returning_rows_registers_select_first() {
    let query = PredicateQuery::delete("deleteByActiveFalse", true).or([Part::new("active", Operator::False)]);

    let registry = compile(Dialect::POSTGRESQL, query);

    let delete = registry.lookup(NAMESPACE, "deleteByActiveFalse").unwrap();
    assert_eq!(delete.kind, StatementKind::Delete);
    assert_eq!(delete.sql, "DELETE FROM shop WHERE active = FALSE");

    assert_eq!(
        sql(&registry, "deleteByActiveFalse__select"),
        "SELECT id, name, active FROM shop WHERE active = FALSE"
    );
}

#[test]
fn plain_delete_has_no_companion() {
    let query = PredicateQuery::delete("deleteByName", false).or([Part::new("name", Operator::Equals)]);

    let registry = compile(Dialect::POSTGRESQL, query);
    assert!(registry.lookup(NAMESPACE, "deleteByName").is_some());
    assert!(registry.lookup(NAMESPACE, "deleteByName__select").is_none());
}

#[test]
fn parameter_count_must_match_operator() {
    let query =
        PredicateQuery::find("findByIdBetween").or([Part::new("id", Operator::Between).param("low")]);

    let err = try_compile(&make_metamodel(Dialect::MYSQL, Config::default()), query).unwrap_err();
    assert!(err.is_invalid_query(), "{err}");
    assert!(err.to_string().contains("takes 2 parameter(s), 1 given"), "{err}");
}

#[test]
fn unknown_property_is_rejected() {
    let query = PredicateQuery::find("findByOwner").or([Part::new("owner", Operator::Equals)]);

    let err = try_compile(&make_metamodel(Dialect::MYSQL, Config::default()), query).unwrap_err();
    assert!(err.is_invalid_query(), "{err}");
    assert!(err.to_string().contains("no property `owner` on `Shop`"), "{err}");
}

#[test]
fn empty_group_is_rejected() {
    let query = PredicateQuery::find("findBy").or([]);

    let err = try_compile(&make_metamodel(Dialect::MYSQL, Config::default()), query).unwrap_err();
    assert!(err.is_invalid_query(), "{err}");
}

#[test]
fn empty_in_list_is_rejected() {
    let query = PredicateQuery::find("findByIdIn").or([Part::new("id", Operator::In(InArg::List(0)))]);

    let err = try_compile(&make_metamodel(Dialect::MYSQL, Config::default()), query).unwrap_err();
    assert!(err.is_invalid_query(), "{err}");
    assert!(err.to_string().contains("`id` is compared against an empty IN list"), "{err}");
}

#[test]
fn oversized_fixed_page_saturates() {
    let query = PredicateQuery::find("findPage").paging(Paging::Fixed {
        offset: u64::MAX,
        size: 2,
    });

    let registry = compile(Dialect::ORACLE, query);
    assert!(
        sql(&registry, "findPage").contains(&format!("ROWNUM <= {}", u64::MAX)),
        "{}",
        sql(&registry, "findPage")
    );
}

#[test]
fn concurrent_compiles_see_every_sibling() {
    let metamodel = make_metamodel(Dialect::POSTGRESQL, Config::default());
    let registry = StatementRegistry::new();
    let query: Query = PredicateQuery::find("findByActive")
        .or([Part::new("active", Operator::Equals)])
        .paging(Paging::Pageable)
        .into();

    thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                scope.spawn(|| {
                    Precompiler::new(&metamodel, &registry)
                        .compile(NAMESPACE, &"Shop".into(), &query)
                        .unwrap();

                    let paged = registry.lookup(NAMESPACE, "findByActive__paged").unwrap();
                    let companion = paged.paging_companion.as_deref().unwrap();
                    assert!(registry.lookup(NAMESPACE, companion).is_some());
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
    });

    assert!(registry.contains(&StatementId::new(NAMESPACE, "findByActive")));
    assert!(registry.contains(&StatementId::new(NAMESPACE, "findByActive__count")));
}

#[test]
fn compiling_twice_is_a_no_op() {
    let metamodel = make_metamodel(Dialect::MYSQL, Config::default());
    let registry = StatementRegistry::new();
    let precompiler = Precompiler::new(&metamodel, &registry);

    precompiler
        .compile(NAMESPACE, &"Shop".into(), &first_two_active().into())
        .unwrap();
    let registered = registry.len();

    // Same name, different predicate: the first definition stays
    let other = PredicateQuery::find("findFirst2ByActiveTrue").or([Part::new("active", Operator::False)]);
    precompiler
        .compile(NAMESPACE, &"Shop".into(), &other.into())
        .unwrap();

    assert_eq!(registry.len(), registered);
    assert!(sql(&registry, "findFirst2ByActiveTrue").contains("active = TRUE"));
}
