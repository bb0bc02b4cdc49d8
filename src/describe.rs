use crate::{
    descriptions::{Descriptions, UNKNOWN_DESCRIPTION},
    icd::Revision,
    loader::YearTable,
    retain::{OutputKind, OutputRow},
    ArcStr,
};
use qu::ick_use::*;

/// More than this share of codes without a description usually means the wrong description
/// table was loaded.
const MISSING_WARN_SHARE: f64 = 0.05;

/// Fill in the description of every retained row. Codes without a description get
/// [`UNKNOWN_DESCRIPTION`]. Use [`undescribed_codes`] to check coverage of the whole year.
///
/// Returns the number of rows that had no description.
pub fn attach_descriptions(
    rows: &mut [OutputRow],
    revision: Revision,
    descriptions: &Descriptions,
) -> usize {
    let unknown: ArcStr = ArcStr::from(UNKNOWN_DESCRIPTION);
    let mut missing = 0;
    for row in rows.iter_mut() {
        let year = row.year;
        let OutputKind::Retained { code, description } = &mut row.kind else {
            continue
        };
        match descriptions.get(revision, code) {
            Some(text) => *description = Some(text.clone()),
            None => {
                missing += 1;
                event!(
                    Level::DEBUG,
                    "{} ({}): no description for code \"{}\"",
                    year,
                    revision,
                    code
                );
                *description = Some(unknown.clone());
            }
        }
    }
    missing
}

/// Count the codes of a year with no description, warning if there are too many.
pub fn undescribed_codes(table: &YearTable, descriptions: &Descriptions) -> usize {
    let missing = table
        .entries()
        .iter()
        .filter(|(code, _)| descriptions.get(table.revision(), code).is_none())
        .count();
    if too_many_missing(missing, table.len()) {
        event!(
            Level::WARN,
            "{}: {} of {} {} codes have no description",
            table.year(),
            missing,
            table.len(),
            table.revision()
        );
    }
    missing
}

fn too_many_missing(missing: usize, codes: usize) -> bool {
    codes > 0 && missing as f64 / codes as f64 > MISSING_WARN_SHARE
}

/// The description column of an output row.
pub fn description_of(row: &OutputRow) -> String {
    match &row.kind {
        OutputKind::Retained {
            description: Some(text),
            ..
        } => text.to_string(),
        OutputKind::Retained {
            description: None, ..
        } => UNKNOWN_DESCRIPTION.to_string(),
        OutputKind::Other => row.category.other_label(),
    }
}
