/// Optional features that differ between products.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Native boolean literals (`TRUE`/`FALSE`) rather than `1`/`0`.
    pub boolean: bool,

    /// Regex match predicate template with `{column}` and `{pattern}`
    /// placeholders, when the product has one.
    pub regex: Option<&'static str>,

    /// How strings are concatenated.
    pub concat: ConcatStyle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConcatStyle {
    /// `CONCAT(a, b, c)`
    Function,

    /// `a || b || c`
    Pipes,

    /// `a + b + c`
    Plus,
}

impl Capabilities {
    pub const ANSI: Capabilities = Capabilities {
        boolean: false,
        regex: None,
        concat: ConcatStyle::Pipes,
    };
}

impl ConcatStyle {
    pub fn render(&self, parts: &[&str]) -> String {
        match self {
            ConcatStyle::Function => format!("CONCAT({})", parts.join(", ")),
            ConcatStyle::Pipes => parts.join(" || "),
            ConcatStyle::Plus => parts.join(" + "),
        }
    }
}
