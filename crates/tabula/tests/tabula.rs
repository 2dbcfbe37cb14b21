use pretty_assertions::assert_eq;
use std::sync::Arc;
use tabula::{
    registry::StatementKind,
    schema::meta::{ClassMeta, PropertyMeta, ValueType},
    stmt::{Operator, Part},
    Config, DeclaredQuery, Dialect, Tabula, MetadataRegistry, PredicateQuery,
};

const NAMESPACE: &str = "ShopRepository";

fn make_shop() -> MetadataRegistry {
    MetadataRegistry::new().with(
        ClassMeta::new("Shop")
            .property(PropertyMeta::new("id", ValueType::I64).id())
            .property(PropertyMeta::new("name", ValueType::String)),
    )
}

fn make_tabula(dialect: Dialect) -> Tabula {
    Tabula::builder()
        .dialect(dialect)
        .metadata(make_shop())
        .build()
        .unwrap()
}

fn find_by_name() -> PredicateQuery {
    PredicateQuery::find("findByName").or([Part::new("name", Operator::Equals)])
}

#[test]
fn metadata_is_required() {
    let err = Tabula::builder().dialect(Dialect::MYSQL).build().unwrap_err();
    assert!(err.is_invalid_config());
}

#[test]
fn dialect_selection() {
    let mapper = Tabula::builder().metadata(make_shop()).build().unwrap();
    assert_eq!(mapper.dialect().name, "ansi");

    let mapper = make_tabula(Dialect::MYSQL);
    assert_eq!(mapper.dialect().name, "mysql");

    // A dialect named in the configuration takes precedence
    let mapper = Tabula::builder()
        .config_toml(r#"dialect = "oracle""#)
        .unwrap()
        .dialect(Dialect::MYSQL)
        .metadata(make_shop())
        .build()
        .unwrap();
    assert_eq!(mapper.dialect().name, "oracle");
}

#[test]
fn unknown_configured_dialect() {
    let err = Tabula::builder()
        .config_toml(r#"dialect = "foxpro""#)
        .unwrap()
        .metadata(make_shop())
        .build()
        .unwrap_err();

    assert!(err.is_invalid_config());
}

#[test]
fn domain_models_are_shared() {
    let mapper = make_tabula(Dialect::POSTGRESQL);

    let first = mapper.domain_model(&"Shop".into()).unwrap();
    let second = mapper.clone().domain_model(&"Shop".into()).unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    assert!(mapper.domain_model(&"Missing".into()).unwrap_err().is_mapping());
}

#[test]
fn compile_returns_the_registered_statement() {
    let mapper = make_tabula(Dialect::POSTGRESQL);

    let statement = mapper
        .compile(NAMESPACE, &"Shop".into(), find_by_name())
        .unwrap();
    assert_eq!(statement.kind, StatementKind::Select);
    assert_eq!(statement.sql, "SELECT id, name FROM shop WHERE name = #{param1}");

    // Base statements come along
    assert!(mapper.registry().lookup(NAMESPACE, "__get_by_id").is_some());

    let again = mapper
        .compile(NAMESPACE, &"Shop".into(), find_by_name())
        .unwrap();
    assert!(Arc::ptr_eq(&statement, &again));
}

#[test]
fn clones_share_the_registry() {
    let mapper = make_tabula(Dialect::MYSQL);
    let clone = mapper.clone();

    clone
        .compile(
            NAMESPACE,
            &"Shop".into(),
            DeclaredQuery::new("names", "select name from shop"),
        )
        .unwrap();

    assert!(mapper.statement(NAMESPACE, "names").is_ok());
    assert!(mapper.statement(NAMESPACE, "missing").is_err());
}

#[test]
fn compile_entity_only() {
    let mapper = make_tabula(Dialect::MYSQL);
    mapper.compile_entity(NAMESPACE, &"Shop".into()).unwrap();

    assert_eq!(
        mapper.statement(NAMESPACE, "__delete_by_id").unwrap().sql,
        "DELETE FROM shop WHERE id = #{id}"
    );
    assert!(mapper.statement(NAMESPACE, "findByName").is_err());
}

#[test]
fn configuration_reaches_the_generated_sql() {
    let mut config = Config::default();
    config.quote_identifiers(true);

    let mapper = Tabula::builder()
        .config(config)
        .table_name_prefix("app_")
        .dialect(Dialect::POSTGRESQL)
        .metadata(make_shop())
        .build()
        .unwrap();

    let statement = mapper
        .compile(NAMESPACE, &"Shop".into(), find_by_name())
        .unwrap();
    assert_eq!(
        statement.sql,
        r#"SELECT "id", "name" FROM "app_shop" WHERE "name" = #{param1}"#
    );
}
