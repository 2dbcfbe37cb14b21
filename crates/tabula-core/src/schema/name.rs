use heck::{ToLowerCamelCase, ToShoutySnakeCase, ToSnakeCase};
use serde::Deserialize;

/// Transform applied to class and property names to derive table and column
/// names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamingStrategy {
    /// `OrderLine` -> `order_line`
    #[default]
    SnakeCase,

    /// Names are used as declared.
    Preserve,

    /// `OrderLine` -> `ORDER_LINE`
    UpperSnakeCase,

    /// `OrderLine` -> `orderLine`
    CamelCase,
}

impl NamingStrategy {
    pub fn apply(&self, name: &str) -> String {
        match self {
            NamingStrategy::SnakeCase => name.to_snake_case(),
            NamingStrategy::Preserve => name.to_string(),
            NamingStrategy::UpperSnakeCase => name.to_shouty_snake_case(),
            NamingStrategy::CamelCase => name.to_lower_camel_case(),
        }
    }
}
