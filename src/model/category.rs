use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The fixed set of spending categories an expense can belong to.
///
/// Categories are accepted case-insensitively (`"Food"`, `"FOOD"`) and always stored and
/// displayed in lowercase.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Food,
    Transport,
    Entertainment,
    Bills,
    Shopping,
    Health,
    Education,
    Travel,
    Savings,
    Other,
}

serde_plain::derive_display_from_serialize!(Category);

impl Category {
    /// All categories in their canonical order.
    pub const ALL: [Category; 10] = [
        Category::Food,
        Category::Transport,
        Category::Entertainment,
        Category::Bills,
        Category::Shopping,
        Category::Health,
        Category::Education,
        Category::Travel,
        Category::Savings,
        Category::Other,
    ];

    /// The lowercase name used for storage and on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Food => "food",
            Category::Transport => "transport",
            Category::Entertainment => "entertainment",
            Category::Bills => "bills",
            Category::Shopping => "shopping",
            Category::Health => "health",
            Category::Education => "education",
            Category::Travel => "travel",
            Category::Savings => "savings",
            Category::Other => "other",
        }
    }

    /// A comma separated list of every category name, for error messages.
    pub fn list() -> String {
        Self::ALL
            .iter()
            .map(Category::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Returned when a string does not name one of the known categories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCategory(String);

impl std::fmt::Display for UnknownCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "'{}' is not a known category, expected one of: {}",
            self.0,
            Category::list()
        )
    }
}

impl std::error::Error for UnknownCategory {}

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == lower)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}
