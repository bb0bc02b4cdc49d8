//! Hardcoded tables mapping ICD codes to categories, one per revision.
//!
//! Each category has a definition string per revision listing single codes and inclusive code
//! ranges, e.g. `"1-136, 460-519"`. A range `lo-hi` matches every code whose lookup key sorts
//! between `lo` and `hi` followed by anything, so `136` also covers `136a`.
//!
//! The source taxonomy contains overlapping entries. These are resolved as follows:
//!
//! 1. A code that is listed on its own (its key equals a single-code entry) gets that entry's
//!    category.
//! 2. Otherwise the first entry containing the code wins, searching categories in
//!    [`Category`] order, then entries in the order they are written.
//! 3. Codes matching nothing are [`Category::Unclassified`].
use crate::{
    icd::{self, IcdCode, Revision},
    range::{Range, RangeSet},
    Category,
};
use qu::ick_use::*;
use std::collections::BTreeMap;

/// Category definitions for every revision in use.
///
/// ICD-2 to ICD-9 follow the groupings used for the published England & Wales series. ICD-10
/// mirrors the ICD-9 groupings (respiratory disease counts as infectious, eye and ear as
/// nervous system).
static CATEGORY_CODES: &[(Category, &[(Revision, &str)])] = &[
    (
        Category::Infectious,
        &[
            (Revision::Icd10, "A00-B99, J00-J99"),
            (Revision::Icd9, "1-136, 460-519"),
            (Revision::Icd8, "1-136, 460-519"),
            (Revision::Icd7, "1-138, 571, 240-241, 470-527"),
            (Revision::Icd6, "1-138, 571, 240-241, 470-527"),
            (Revision::Icd5, "1-32, 34-44, 119-120, 177, 33, 104-114, 115"),
            (Revision::Icd4, "1-10, 12-44, 79-80, 83, 119-120, 177, 11, 104-114, 115"),
            (Revision::Icd3, "1-10, 12-42, 71, 72, 76, 113-116, 121, 175, 11, 109, 97-107"),
            (
                Revision::Icd2,
                "1-9, 11-25, 28-35, 37-38, 60-62, 67, 104-107, 112, 164, 10, 86-98, 100",
            ),
        ],
    ),
    (
        Category::Pregnancy,
        &[
            (Revision::Icd10, "O00-O99"),
            (Revision::Icd9, "630-679"),
            (Revision::Icd8, "630-679"),
            (Revision::Icd7, "640-689"),
            (Revision::Icd6, "640-689"),
            (Revision::Icd5, "401-503"),
            (Revision::Icd4, "400-503"),
            (Revision::Icd3, "431-500"),
            (Revision::Icd2, "134-141"),
        ],
    ),
    (
        Category::Injury,
        &[
            (Revision::Icd10, "S00-T98, V01-Y98"),
            (Revision::Icd9, "800-999"),
            (Revision::Icd8, "800-999"),
            (Revision::Icd7, "800-999"),
            (Revision::Icd6, "800-999"),
            (Revision::Icd5, "163-176, 178-198"),
            (Revision::Icd4, "163-175, 178-198"),
            (Revision::Icd3, "165-174, 176-203"),
            (Revision::Icd2, "57-58, 153, 155-163, 165-173, 174-186"),
        ],
    ),
    (
        Category::Circulatory,
        &[
            (Revision::Icd10, "I00-I99"),
            (Revision::Icd9, "390-459"),
            (Revision::Icd8, "390-459, 782-789"),
            (Revision::Icd7, "330-334, 400-468, 782"),
            (Revision::Icd6, "330-334, 400-468, 782"),
            (Revision::Icd5, "58, 83, 87a, 90-97, 99-103"),
            (Revision::Icd4, "56, 82, 87a, 90-97, 99-103"),
            (Revision::Icd3, "51, 74, 81, 83, 87-96"),
            (Revision::Icd2, "47, 64-65, 72, 77-85"),
        ],
    ),
    (
        Category::Nervous,
        &[
            (Revision::Icd10, "G00-H95"),
            (Revision::Icd9, "320-389"),
            (Revision::Icd8, "320-389, 739-781"),
            (Revision::Icd7, "335-398, 740-744"),
            (Revision::Icd6, "335-398, 740-744"),
            (Revision::Icd5, "80-82, 85, 87b, 87c, 87d, 88, 89"),
            (Revision::Icd4, "81, 85, 87b, 87c, 87d, 87e, 88, 89"),
            (Revision::Icd3, "70, 73, 75, 78, 79-80, 82, 84(3), 84(4), 84(5), 85, 86"),
            (Revision::Icd2, "63, 66, 69, 73, 74a, 74b, 74d, 75, 76"),
        ],
    ),
    (
        Category::Digestive,
        &[
            (Revision::Icd10, "K00-K93"),
            (Revision::Icd9, "520-577"),
            (Revision::Icd8, "520-577"),
            (Revision::Icd7, "530-570, 572-587"),
            (Revision::Icd6, "530-570, 572-587"),
            (Revision::Icd5, "116-118, 121-129"),
            (Revision::Icd4, "115a, 115b, 116-118, 121-129"),
            (Revision::Icd3, "108, 110-112, 117-120, 122-127"),
            (Revision::Icd2, "99, 101-103, 108-111, 113-115, 117-118"),
        ],
    ),
    (
        Category::Musculoskeletal,
        &[
            (Revision::Icd10, "M00-M99"),
            (Revision::Icd9, "710-739"),
            (Revision::Icd8, "710-738"),
            (Revision::Icd7, "710-732, 734-738"),
            (Revision::Icd6, "720-739, 745-749"),
            (Revision::Icd5, "59, 154-156"),
            (Revision::Icd4, "57, 154-156"),
            (Revision::Icd3, "52, 155-158"),
            (Revision::Icd2, "48, 146-149"),
        ],
    ),
    (
        Category::Cancer,
        &[
            (Revision::Icd10, "C00-D48"),
            (Revision::Icd9, "140-239"),
            (Revision::Icd8, "140-239"),
            (Revision::Icd7, "140-239, 294"),
            (Revision::Icd6, "140-239, 294"),
            (Revision::Icd5, "45-57, 74"),
            (Revision::Icd4, "45-55, 72"),
            (Revision::Icd3, "43-49, 50, 65, 84b, 139"),
            (Revision::Icd2, "39-45, 46, 74c, 53, 129"),
        ],
    ),
];

/// One entry of a category definition.
#[derive(Debug, Clone)]
pub struct Rule {
    pub category: Category,
    /// The entry as written in the definition string, e.g. `"460-519"`.
    pub source: &'static str,
}

/// Two entries of a table, for different categories, that share codes.
#[derive(Debug, Clone)]
pub struct Overlap {
    pub first: Rule,
    pub second: Rule,
}

/// The translation table for one revision.
#[derive(Debug, Clone)]
pub struct TranslationTable {
    revision: Revision,
    /// Keys of entries that are a single code, in table order.
    exact: Vec<(String, Category)>,
    rules: RangeSet<String, Rule>,
}

impl TranslationTable {
    /// Build the table for a revision from category definition strings.
    pub fn from_definitions(
        revision: Revision,
        definitions: impl IntoIterator<Item = (Category, &'static str)>,
    ) -> Result<Self> {
        let mut exact = vec![];
        let mut rules = RangeSet::new();
        for (category, definition) in definitions {
            for entry in definition.split(',').map(str::trim).filter(|e| !e.is_empty()) {
                let (start, end) = match entry.split_once('-') {
                    Some((start, end)) => (start, end),
                    None => (entry, entry),
                };
                let lo = icd::bound_key(start, revision).with_context(|| {
                    format!("bad start of \"{}\" ({} {})", entry, revision, category)
                })?;
                let hi = icd::bound_key(end, revision).with_context(|| {
                    format!("bad end of \"{}\" ({} {})", entry, revision, category)
                })?;
                if start == end {
                    exact.push((lo.clone(), category));
                }
                let range = Range::new(lo, format!("{}z", hi)).with_context(|| {
                    format!("empty range \"{}\" ({} {})", entry, revision, category)
                })?;
                rules.push(
                    range,
                    Rule {
                        category,
                        source: entry,
                    },
                );
            }
        }
        Ok(Self {
            revision,
            exact,
            rules,
        })
    }

    pub fn revision(&self) -> Revision {
        self.revision
    }

    /// The category of `code`, or `None` if the code isn't covered by this table.
    pub fn classify(&self, code: &IcdCode) -> Option<Category> {
        let key = code.lookup_key(self.revision)?;
        if let Some((_, category)) = self.exact.iter().find(|(exact, _)| *exact == key) {
            return Some(*category);
        }
        self.rules.first_match(&key).map(|rule| rule.category)
    }

    /// Like `classify`, but falls back to [`Category::Unclassified`].
    pub fn category_of(&self, code: &IcdCode) -> Category {
        self.classify(code).unwrap_or(Category::Unclassified)
    }

    /// Entries for different categories covering some of the same codes.
    pub fn overlaps(&self) -> Vec<Overlap> {
        let rules: Vec<&Rule> = self.rules.iter().map(|(_, rule)| rule).collect();
        self.rules
            .overlapping_pairs()
            .into_iter()
            .map(|(idx1, idx2)| (rules[idx1], rules[idx2]))
            .filter(|(first, second)| first.category != second.category)
            .map(|(first, second)| Overlap {
                first: first.clone(),
                second: second.clone(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Translation tables for all revisions, built once at startup.
#[derive(Debug, Clone)]
pub struct TranslationTables {
    tables: BTreeMap<Revision, TranslationTable>,
}

impl TranslationTables {
    /// Parse the hardcoded category definitions.
    pub fn builtin() -> Result<Self> {
        let mut tables = BTreeMap::new();
        for revision in Revision::ALL {
            let definitions = CATEGORY_CODES.iter().filter_map(|(category, by_revision)| {
                by_revision
                    .iter()
                    .find(|(rev, _)| *rev == revision)
                    .map(|(_, definition)| (*category, *definition))
            });
            let table = TranslationTable::from_definitions(revision, definitions)
                .with_context(|| format!("building translation table for {}", revision))?;
            for overlap in table.overlaps() {
                event!(
                    Level::DEBUG,
                    "{}: \"{}\" ({}) overlaps \"{}\" ({})",
                    revision,
                    overlap.first.source,
                    overlap.first.category,
                    overlap.second.source,
                    overlap.second.category
                );
            }
            tables.insert(revision, table);
        }
        Ok(Self { tables })
    }

    pub fn get(&self, revision: Revision) -> Result<&TranslationTable> {
        self.tables
            .get(&revision)
            .with_context(|| format!("no translation table for {}", revision))
    }

    pub fn iter(&self) -> impl Iterator<Item = &TranslationTable> + '_ {
        self.tables.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(s: &str) -> IcdCode {
        IcdCode::new(s).unwrap()
    }

    #[test]
    fn every_revision_has_every_category() {
        for (category, by_revision) in CATEGORY_CODES {
            for revision in Revision::ALL {
                assert!(
                    by_revision.iter().any(|(rev, _)| *rev == revision),
                    "{} missing for {}",
                    category,
                    revision
                );
            }
        }
        let tables = TranslationTables::builtin().unwrap();
        assert_eq!(tables.iter().count(), Revision::ALL.len());
    }

    #[test]
    fn icd9_ranges() {
        let tables = TranslationTables::builtin().unwrap();
        let icd9 = tables.get(Revision::Icd9).unwrap();
        assert_eq!(icd9.category_of(&code("0010")), Category::Infectious);
        assert_eq!(icd9.category_of(&code("1369")), Category::Infectious);
        assert_eq!(icd9.category_of(&code("1400")), Category::Cancer);
        assert_eq!(icd9.category_of(&code("4109")), Category::Circulatory);
        assert_eq!(icd9.category_of(&code("8001")), Category::Injury);
        assert_eq!(icd9.category_of(&code("9999")), Category::Injury);
        assert_eq!(icd9.category_of(&code("2500")), Category::Unclassified);
        assert_eq!(icd9.category_of(&code("E800")), Category::Unclassified);
    }

    #[test]
    fn letter_suffixes_in_old_revisions() {
        let tables = TranslationTables::builtin().unwrap();
        let icd5 = tables.get(Revision::Icd5).unwrap();
        assert_eq!(icd5.category_of(&code("87a")), Category::Circulatory);
        assert_eq!(icd5.category_of(&code("87b")), Category::Nervous);
        assert_eq!(icd5.category_of(&code("087c")), Category::Nervous);

        let icd3 = tables.get(Revision::Icd3).unwrap();
        assert_eq!(icd3.category_of(&code("84(4)")), Category::Nervous);
        assert_eq!(icd3.category_of(&code("84b")), Category::Cancer);
    }

    #[test]
    fn exact_listing_beats_range() {
        let tables = TranslationTables::builtin().unwrap();
        let icd4 = tables.get(Revision::Icd4).unwrap();
        // `115` is infectious and covers `115a` as a prefix, but `115a` is listed under digestive.
        assert_eq!(icd4.category_of(&code("115")), Category::Infectious);
        assert_eq!(icd4.category_of(&code("115a")), Category::Digestive);
        assert_eq!(icd4.category_of(&code("115b")), Category::Digestive);
        assert_eq!(icd4.category_of(&code("115c")), Category::Infectious);
    }

    #[test]
    fn known_overlaps_are_reported() {
        let tables = TranslationTables::builtin().unwrap();
        let overlaps = tables.get(Revision::Icd4).unwrap().overlaps();
        assert!(overlaps.iter().any(|o| o.first.source == "115"
            && o.first.category == Category::Infectious
            && o.second.source == "115a"
            && o.second.category == Category::Digestive));
        assert!(tables.get(Revision::Icd9).unwrap().overlaps().is_empty());
    }

    #[test]
    fn first_entry_wins_for_overlapping_ranges() {
        let table = TranslationTable::from_definitions(
            Revision::Icd9,
            [(Category::Nervous, "100-200"), (Category::Cancer, "150-250")],
        )
        .unwrap();
        assert_eq!(table.category_of(&code("1600")), Category::Nervous);
        assert_eq!(table.category_of(&code("2100")), Category::Cancer);
        assert_eq!(table.overlaps().len(), 1);
    }

    #[test]
    fn icd10_ranges() {
        let tables = TranslationTables::builtin().unwrap();
        let icd10 = tables.get(Revision::Icd10).unwrap();
        assert_eq!(icd10.category_of(&code("A09")), Category::Infectious);
        assert_eq!(icd10.category_of(&code("J189")), Category::Infectious);
        assert_eq!(icd10.category_of(&code("C34.9")), Category::Cancer);
        assert_eq!(icd10.category_of(&code("I21")), Category::Circulatory);
        assert_eq!(icd10.category_of(&code("X59")), Category::Injury);
        assert_eq!(icd10.category_of(&code("R99")), Category::Unclassified);
        assert_eq!(icd10.category_of(&code("U071")), Category::Unclassified);
    }

    #[test]
    fn bad_definitions_are_rejected() {
        assert!(
            TranslationTable::from_definitions(Revision::Icd9, [(Category::Cancer, "200-100")])
                .is_err()
        );
        assert!(
            TranslationTable::from_definitions(Revision::Icd9, [(Category::Cancer, "x-100")])
                .is_err()
        );
    }
}
