use qu::ick_use::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Higher-level cause of death groupings.
///
/// The declaration order matters: it is the order translation tables are searched in, and the
/// order categories appear in the output.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum Category {
    Infectious,
    Pregnancy,
    Injury,
    Circulatory,
    Nervous,
    Digestive,
    Musculoskeletal,
    Cancer,
    /// Codes not covered by any translation table entry.
    Unclassified,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Category::Infectious,
        Category::Pregnancy,
        Category::Injury,
        Category::Circulatory,
        Category::Nervous,
        Category::Digestive,
        Category::Musculoskeletal,
        Category::Cancer,
        Category::Unclassified,
    ];

    /// A human-readable label for the category, as written to the output.
    pub fn label(self) -> &'static str {
        use Category::*;
        match self {
            Infectious => "Infectious disease",
            Pregnancy => "Complications of pregnancy and childbirth",
            Injury => "Injury and poisoning",
            Circulatory => "Circulatory system",
            Nervous => "Nervous system",
            Digestive => "Digestive system",
            Musculoskeletal => "Musculoskeletal system",
            Cancer => "Cancer",
            Unclassified => "Unclassified",
        }
    }

    pub fn code(self) -> &'static str {
        use Category::*;
        match self {
            Infectious => "infectious",
            Pregnancy => "pregnancy",
            Injury => "injury",
            Circulatory => "circulatory",
            Nervous => "nervous",
            Digestive => "digestive",
            Musculoskeletal => "musculoskeletal",
            Cancer => "cancer",
            Unclassified => "unclassified",
        }
    }

    /// Label of the row that non-retained codes in this category are folded into.
    pub fn other_label(self) -> String {
        format!("Other {}", self.label())
    }
}

impl std::str::FromStr for Category {
    type Err = Error;
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let input = input.trim();
        Category::ALL
            .into_iter()
            .find(|cat| cat.code() == input || cat.label().eq_ignore_ascii_case(input))
            .ok_or_else(|| format_err!("didn't recognise category \"{}\"", input))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.label())
    }
}
