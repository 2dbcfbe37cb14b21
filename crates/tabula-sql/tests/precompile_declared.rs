use pretty_assertions::assert_eq;
use std::sync::Arc;
use tabula_core::{
    registry::{ResultKind, StatementKind},
    schema::{
        meta::{ClassMeta, MetadataRegistry, PropertyMeta, ValueType},
        ClassId, Metamodel, SqlType,
    },
    stmt::DeclaredQuery,
    Config, Dialect, Error, StatementRegistry,
};
use tabula_sql::Precompiler;

const NAMESPACE: &str = "ShopRepository";

fn make_shop() -> MetadataRegistry {
    MetadataRegistry::new()
        .with(
            ClassMeta::new("Shop")
                .property(PropertyMeta::new("id", ValueType::I64).id())
                .property(PropertyMeta::new("name", ValueType::String))
                .property(PropertyMeta::new("active", ValueType::Bool)),
        )
        .with(ClassMeta::new("report.ShopSummary").constructor(2))
}

fn try_compile(dialect: Dialect, query: DeclaredQuery) -> Result<StatementRegistry, Error> {
    let metamodel = Metamodel::new(Arc::new(make_shop()), dialect, Config::default());
    let registry = StatementRegistry::new();

    Precompiler::new(&metamodel, &registry).compile(NAMESPACE, &"Shop".into(), &query.into())?;
    Ok(registry)
}

fn compile(query: DeclaredQuery) -> StatementRegistry {
    try_compile(Dialect::POSTGRESQL, query).unwrap()
}

fn sql(registry: &StatementRegistry, name: &str) -> String {
    registry
        .lookup(NAMESPACE, name)
        .unwrap_or_else(|| panic!("`{name}` not registered"))
        .sql
        .clone()
}

#[test]
fn positional_and_named_placeholders() {
    let registry = compile(
        DeclaredQuery::new(
            "findByNameAndMinId",
            "select * from shop where name = ?1 and id > :minId and active = ?3",
        )
        .param("name")
        .param("minId"),
    );

    let statement = registry.lookup(NAMESPACE, "findByNameAndMinId").unwrap();
    assert_eq!(
        statement.sql,
        "select * from shop where name = #{name} and id > #{minId} and active = #{param3}"
    );
    assert_eq!(statement.kind, StatementKind::Select);
    assert_eq!(statement.parameters, ["name", "minId", "param3"]);

    // `select *` maps whole entities
    let shape = statement.result.as_ref().unwrap();
    assert_eq!(shape.kind, ResultKind::Entity(ClassId::new("Shop")));
}

#[test]
fn expression_placeholders() {
    let registry = compile(
        DeclaredQuery::new(
            "findByExpression",
            "select * from shop where name = :#{[0]} and active = ?#{#flag}",
        )
        .param("name"),
    );

    assert_eq!(
        sql(&registry, "findByExpression"),
        "select * from shop where name = #{name} and active = #{flag}"
    );
}

#[test]
fn collection_parameter_expands_to_iteration() {
    let registry = compile(
        DeclaredQuery::new("findByIds", "select * from shop where id in (:ids)")
            .collection_param("ids"),
    );

    assert_eq!(
        sql(&registry, "findByIds"),
        r#"select * from shop where id in <foreach collection="ids" item="item" open="(" separator=", " close=")">#{item}</foreach>"#
    );
}

#[test]
fn like_wildcards_use_dialect_concat() {
    let query =
        || DeclaredQuery::new("search", "select * from shop where name like %:name%").param("name");

    assert_eq!(
        sql(&compile(query()), "search"),
        "select * from shop where name like '%' || #{name} || '%'"
    );
    assert_eq!(
        sql(&try_compile(Dialect::MYSQL, query()).unwrap(), "search"),
        "select * from shop where name like CONCAT('%', #{name}, '%')"
    );

    let registry = compile(
        DeclaredQuery::new("prefixed", "select * from shop where name like :prefix%")
            .param("prefix"),
    );
    assert_eq!(
        sql(&registry, "prefixed"),
        "select * from shop where name like #{prefix} || '%'"
    );
}

#[test]
fn literals_casts_and_binds_are_left_alone() {
    let registry = compile(
        DeclaredQuery::new(
            "countTagged",
            "select count(*) from shop where name::text = :name and name <> 'a:b' and id = #{id}",
        )
        .param("name"),
    );

    let statement = registry.lookup(NAMESPACE, "countTagged").unwrap();
    assert_eq!(
        statement.sql,
        "select count(*) from shop where name::text = #{name} and name <> 'a:b' and id = #{id}"
    );

    let shape = statement.result.as_ref().unwrap();
    assert_eq!(shape.kind, ResultKind::Scalar(SqlType::BigInt));
}

#[test]
fn entity_name_expands_to_table() {
    let registry = compile(DeclaredQuery::new(
        "findActive",
        "select * from #{#entityName} where active = true",
    ));

    assert_eq!(
        sql(&registry, "findActive"),
        "select * from shop where active = true"
    );
}

#[test]
fn constructor_expression_maps_arguments() {
    let registry = compile(
        DeclaredQuery::new(
            "summaries",
            "select new report.ShopSummary(s.name, count(s.id)) from shop s where s.active = :active group by s.name",
        )
        .param("active"),
    );

    let statement = registry.lookup(NAMESPACE, "summaries").unwrap();
    assert_eq!(
        statement.sql,
        "SELECT s.name AS arg0, count(s.id) AS arg1 from shop s where s.active = #{active} group by s.name"
    );

    let shape = statement.result.as_ref().unwrap();
    assert_eq!(shape.id, "summariesResult");
    assert_eq!(
        shape.kind,
        ResultKind::Constructor {
            class: ClassId::new("report.ShopSummary"),
            arity: 2,
        }
    );

    let columns: Vec<_> = shape
        .mappings
        .iter()
        .map(|mapping| (mapping.column.as_str(), mapping.sql_type))
        .collect();
    assert_eq!(
        columns,
        [("arg0", SqlType::VarChar), ("arg1", SqlType::Other)]
    );
}

#[test]
fn constructor_class_must_exist() {
    let err = try_compile(
        Dialect::POSTGRESQL,
        DeclaredQuery::new("summaries", "select new Missing(s.name) from shop s"),
    )
    .unwrap_err();

    assert!(err.is_invalid_query());
    assert!(
        err.to_string().contains("unknown class `Missing`"),
        "{err}"
    );
}

#[test]
fn constructor_arity_must_match() {
    let err = try_compile(
        Dialect::POSTGRESQL,
        DeclaredQuery::new("summaries", "select new report.ShopSummary(s.name) from shop s"),
    )
    .unwrap_err();

    assert!(err.is_mapping());
    assert!(
        err.to_string().contains("no constructor taking 1 arguments"),
        "{err}"
    );
}

#[test]
fn paged_select_derives_its_count() {
    let registry = compile(
        DeclaredQuery::new(
            "findByActive",
            "select * from shop where active = :active order by name",
        )
        .param("active")
        .paged(),
    );

    assert_eq!(
        sql(&registry, "findByActive__count"),
        "SELECT COUNT(*) FROM ( select * from shop where active = #{active} ) count_"
    );

    let paged = registry.lookup(NAMESPACE, "findByActive__paged").unwrap();
    assert_eq!(
        paged.sql,
        "select * from shop where active = #{active} order by name LIMIT #{pageSize} OFFSET #{offset}"
    );
    assert_eq!(paged.paging_companion.as_deref(), Some("findByActive__count"));
    assert!(paged.result.is_some());
}

#[test]
fn explicit_count_query_is_rewritten() {
    let registry = compile(
        DeclaredQuery::new("findByActive", "select * from shop where active = ?1")
            .param("active")
            .count_query("select count(id) from #{#entityName} where active = ?1")
            .paged(),
    );

    assert_eq!(
        sql(&registry, "findByActive__count"),
        "select count(id) from shop where active = #{active}"
    );
}

#[test]
fn modifying_queries() {
    let registry = compile(
        DeclaredQuery::new("deactivate", "update shop set active = false where id = ?1")
            .param("id")
            .modifying(),
    );

    let statement = registry.lookup(NAMESPACE, "deactivate").unwrap();
    assert_eq!(statement.kind, StatementKind::Update);
    assert_eq!(statement.sql, "update shop set active = false where id = #{id}");
    assert!(statement.result.is_none());

    let err = try_compile(
        Dialect::POSTGRESQL,
        DeclaredQuery::new("purge", "delete from shop"),
    )
    .unwrap_err();
    assert!(err.is_invalid_query());
    assert!(err.to_string().contains("must be declared modifying"), "{err}");

    let err = try_compile(
        Dialect::POSTGRESQL,
        DeclaredQuery::new("all", "select * from shop").modifying(),
    )
    .unwrap_err();
    assert!(err.is_invalid_query());
}

#[test]
fn only_selects_are_paged() {
    let err = try_compile(
        Dialect::POSTGRESQL,
        DeclaredQuery::new("purge", "delete from shop").modifying().paged(),
    )
    .unwrap_err();

    assert!(err.to_string().contains("only selects can be paged"), "{err}");
}

#[test]
fn positional_indexes_start_at_one() {
    let err = try_compile(
        Dialect::POSTGRESQL,
        DeclaredQuery::new("byName", "select * from shop where name = ?0"),
    )
    .unwrap_err();

    assert!(err.is_invalid_query());
    assert!(err.to_string().contains("start at 1"), "{err}");
}

#[test]
fn unknown_statement_keyword_is_rejected() {
    let err = try_compile(
        Dialect::POSTGRESQL,
        DeclaredQuery::new("merge", "merge into shop using other on (id)"),
    )
    .unwrap_err();

    assert!(err.is_invalid_query());
    assert!(err.to_string().contains("ShopRepository.merge"), "{err}");
}
