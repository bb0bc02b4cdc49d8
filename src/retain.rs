//! Keep the codes with the most deaths and fold the rest into one row per category.
use crate::{icd::IcdCode, mapper::CategorizedRow, ArcStr, Category};
use qu::ick_use::*;
use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, collections::BTreeMap, fmt, str::FromStr};

/// Code column value for rows aggregating the non-retained codes of a category.
pub const OTHER_CODE: &str = "Other";

/// Which codes compete for the top `n` places.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RetentionScope {
    /// Keep the top `n` codes of each category.
    #[default]
    PerCategory,
    /// Keep the top `n` codes of the whole year.
    PerYear,
}

impl FromStr for RetentionScope {
    type Err = Error;
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.trim() {
            "per-category" => Ok(RetentionScope::PerCategory),
            "per-year" => Ok(RetentionScope::PerYear),
            _ => bail!(
                "unrecognised retention scope \"{}\" (expected `per-category` or `per-year`)",
                input
            ),
        }
    }
}

impl fmt::Display for RetentionScope {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RetentionScope::PerCategory => f.write_str("per-category"),
            RetentionScope::PerYear => f.write_str("per-year"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputKind {
    /// A single code. The description is filled in by the description attacher.
    Retained {
        code: IcdCode,
        description: Option<ArcStr>,
    },
    /// Every non-retained code of the category, summed.
    Other,
}

/// A row of the output table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputRow {
    pub year: u16,
    pub category: Category,
    pub count: u64,
    pub kind: OutputKind,
}

impl OutputRow {
    pub fn is_other(&self) -> bool {
        matches!(self.kind, OutputKind::Other)
    }

    pub fn code(&self) -> &str {
        match &self.kind {
            OutputKind::Retained { code, .. } => code.as_str(),
            OutputKind::Other => OTHER_CODE,
        }
    }
}

/// Highest count first, ties broken by code ascending.
fn rank(a: &CategorizedRow, b: &CategorizedRow) -> Ordering {
    b.count.cmp(&a.count).then_with(|| a.code.cmp(&b.code))
}

/// Retain the top `n` codes of a year's rows and aggregate the remainder per category.
///
/// Output is in category order; within a category retained rows come first, highest count
/// first, followed by the `Other` row if any code was not retained. Counts are conserved.
pub fn retain_top_n(rows: &[CategorizedRow], n: usize, scope: RetentionScope) -> Vec<OutputRow> {
    let mut ranked: Vec<&CategorizedRow> = rows.iter().collect();
    ranked.sort_by(|a, b| rank(a, b));

    // rows per category, in rank order, flagged with whether they are retained
    let mut by_category: BTreeMap<Category, Vec<(&CategorizedRow, bool)>> = BTreeMap::new();
    for (idx, row) in ranked.into_iter().enumerate() {
        let group = by_category.entry(row.category).or_default();
        let retained = match scope {
            RetentionScope::PerCategory => group.len() < n,
            RetentionScope::PerYear => idx < n,
        };
        group.push((row, retained));
    }

    let mut out = vec![];
    for (category, group) in by_category {
        let mut other: Option<OutputRow> = None;
        for (row, retained) in group {
            if retained {
                out.push(OutputRow {
                    year: row.year,
                    category,
                    count: row.count,
                    kind: OutputKind::Retained {
                        code: row.code.clone(),
                        description: None,
                    },
                });
            } else {
                other
                    .get_or_insert_with(|| OutputRow {
                        year: row.year,
                        category,
                        count: 0,
                        kind: OutputKind::Other,
                    })
                    .count += row.count;
            }
        }
        out.extend(other);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(code: &str, category: Category, count: u64) -> CategorizedRow {
        CategorizedRow {
            year: 2000,
            code: IcdCode::new(code).unwrap(),
            category,
            count,
        }
    }

    fn summary(rows: &[OutputRow]) -> Vec<(Category, &str, u64)> {
        rows.iter()
            .map(|r| (r.category, r.code(), r.count))
            .collect()
    }

    #[test]
    fn keeps_top_n_per_category() {
        let rows = [
            row("C", Category::Injury, 10),
            row("A", Category::Injury, 50),
            row("B", Category::Injury, 30),
        ];
        let out = retain_top_n(&rows, 2, RetentionScope::PerCategory);
        assert_eq!(
            summary(&out),
            vec![
                (Category::Injury, "A", 50),
                (Category::Injury, "B", 30),
                (Category::Injury, OTHER_CODE, 10),
            ]
        );
        assert!(out[2].is_other());
    }

    #[test]
    fn ties_are_broken_by_code() {
        let rows = [
            row("B2", Category::Cancer, 5),
            row("B1", Category::Cancer, 5),
            row("A9", Category::Cancer, 5),
        ];
        let out = retain_top_n(&rows, 2, RetentionScope::PerCategory);
        assert_eq!(
            summary(&out),
            vec![
                (Category::Cancer, "A9", 5),
                (Category::Cancer, "B1", 5),
                (Category::Cancer, OTHER_CODE, 5),
            ]
        );
    }

    #[test]
    fn no_other_row_when_everything_fits() {
        let rows = [
            row("I21", Category::Circulatory, 7),
            row("A01", Category::Infectious, 3),
        ];
        let out = retain_top_n(&rows, 5, RetentionScope::PerCategory);
        // category order, not count order
        assert_eq!(
            summary(&out),
            vec![
                (Category::Infectious, "A01", 3),
                (Category::Circulatory, "I21", 7),
            ]
        );
    }

    #[test]
    fn zero_keeps_nothing() {
        let rows = [
            row("I21", Category::Circulatory, 7),
            row("I22", Category::Circulatory, 0),
        ];
        let out = retain_top_n(&rows, 0, RetentionScope::PerCategory);
        assert_eq!(summary(&out), vec![(Category::Circulatory, OTHER_CODE, 7)]);
    }

    #[test]
    fn per_year_ranks_all_codes_together() {
        let rows = [
            row("I21", Category::Circulatory, 100),
            row("I22", Category::Circulatory, 90),
            row("C34", Category::Cancer, 80),
            row("A01", Category::Infectious, 5),
        ];
        let out = retain_top_n(&rows, 2, RetentionScope::PerYear);
        assert_eq!(
            summary(&out),
            vec![
                (Category::Infectious, OTHER_CODE, 5),
                (Category::Circulatory, "I21", 100),
                (Category::Circulatory, "I22", 90),
                (Category::Cancer, OTHER_CODE, 80),
            ]
        );
    }

    #[test]
    fn counts_are_conserved_and_bounded() {
        let categories = [Category::Injury, Category::Cancer, Category::Unclassified];
        let rows: Vec<_> = (0..40u64)
            .map(|i| {
                row(
                    &format!("X{:02}", i),
                    categories[(i % 3) as usize],
                    (i * 7) % 11,
                )
            })
            .collect();
        let total: u64 = rows.iter().map(|r| r.count).sum();
        for scope in [RetentionScope::PerCategory, RetentionScope::PerYear] {
            for n in [0, 1, 3, 100] {
                let out = retain_top_n(&rows, n, scope);
                assert_eq!(out.iter().map(|r| r.count).sum::<u64>(), total);
                for category in categories {
                    let retained = out
                        .iter()
                        .filter(|r| r.category == category && !r.is_other())
                        .count();
                    assert!(retained <= n);
                }
            }
        }
    }

    #[test]
    fn parse_scope() {
        assert_eq!(
            "per-year".parse::<RetentionScope>().unwrap(),
            RetentionScope::PerYear
        );
        assert_eq!(RetentionScope::default().to_string(), "per-category");
        assert!("global".parse::<RetentionScope>().is_err());
    }
}
