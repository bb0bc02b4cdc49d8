use crate::{
    icd::IcdCode, loader::YearTable, translation::TranslationTables, Category, Result,
};
use qu::ick_use::*;

/// More than this share of a year's codes being unclassified suggests the table is wrong for
/// the data.
const UNCLASSIFIED_WARN_SHARE: f64 = 0.3;

/// A code with its death count and category, for one year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorizedRow {
    pub year: u16,
    pub code: IcdCode,
    pub category: Category,
    pub count: u64,
}

/// Assign every code in `table` to a category.
///
/// Codes not covered by the revision's table go to [`Category::Unclassified`].
pub fn categorize(table: &YearTable, tables: &TranslationTables) -> Result<Vec<CategorizedRow>> {
    let translation = tables.get(table.revision())?;
    let mut unclassified = 0usize;
    let rows: Vec<CategorizedRow> = table
        .entries()
        .iter()
        .map(|(code, count)| {
            let category = translation.category_of(code);
            if category == Category::Unclassified {
                unclassified += 1;
                event!(
                    Level::DEBUG,
                    "{} ({}): code \"{}\" is not in any category",
                    table.year(),
                    table.revision(),
                    code
                );
            }
            CategorizedRow {
                year: table.year(),
                code: code.clone(),
                category,
                count: *count,
            }
        })
        .collect();

    if unclassified > 0 {
        event!(
            Level::INFO,
            "{}: {} of {} codes unclassified",
            table.year(),
            unclassified,
            rows.len()
        );
    }
    if !rows.is_empty() && unclassified as f64 / rows.len() as f64 > UNCLASSIFIED_WARN_SHARE {
        event!(
            Level::WARN,
            "{}: {} of {} codes are unclassified, check the {} table",
            table.year(),
            unclassified,
            rows.len(),
            table.revision()
        );
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::icd::Revision;

    #[test]
    fn unknown_codes_are_unclassified() {
        let tables = TranslationTables::builtin().unwrap();
        let table = YearTable::new(
            1995,
            Revision::Icd9,
            [
                (IcdCode::new("4109").unwrap(), 10),
                (IcdCode::new("2500").unwrap(), 3),
            ],
        )
        .unwrap();
        let rows = categorize(&table, &tables).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].code.as_str(), "2500");
        assert_eq!(rows[0].category, Category::Unclassified);
        assert_eq!(rows[0].count, 3);
        assert_eq!(rows[1].category, Category::Circulatory);
        assert_eq!(rows.iter().map(|r| r.count).sum::<u64>(), table.total());
    }
}
