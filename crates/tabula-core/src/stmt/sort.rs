#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

/// One sort key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    /// Dotted property path.
    pub property: String,
    pub direction: Direction,

    /// Sort on the case-folded value.
    pub ignore_case: bool,
}

impl Order {
    pub fn asc(property: &str) -> Order {
        Order {
            property: property.to_string(),
            direction: Direction::Asc,
            ignore_case: false,
        }
    }

    pub fn desc(property: &str) -> Order {
        Order {
            direction: Direction::Desc,
            ..Order::asc(property)
        }
    }

    pub fn ignore_case(mut self) -> Order {
        self.ignore_case = true;
        self
    }
}

impl Direction {
    pub fn as_sql(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}
