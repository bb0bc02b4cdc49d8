//! Which ICD revision, and which published workbook, covers each year.
use crate::{icd::Revision, MortalityError};
use std::{
    ops::RangeInclusive,
    path::{Path, PathBuf},
};

/// A span of years published together under one ICD revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Period {
    pub first_year: u16,
    pub last_year: u16,
    pub revision: Revision,
    /// File name of the source workbook, if its layout is one we can read.
    pub workbook: Option<&'static str>,
}

impl Period {
    const fn new(
        first_year: u16,
        last_year: u16,
        revision: Revision,
        workbook: Option<&'static str>,
    ) -> Self {
        Self {
            first_year,
            last_year,
            revision,
            workbook,
        }
    }

    pub fn years(&self) -> RangeInclusive<u16> {
        self.first_year..=self.last_year
    }

    pub fn contains(&self, year: u16) -> bool {
        self.years().contains(&year)
    }

    pub fn workbook_path(&self, raw_dir: &Path) -> Option<PathBuf> {
        self.workbook.map(|name| raw_dir.join(name))
    }
}

/// The 20th century series is published as one workbook per revision (ICD-9 is split in three).
/// The 21st century workbook has a different layout, so those years must be supplied as per-year
/// tables.
static PERIODS: &[Period] = &[
    Period::new(1911, 1920, Revision::Icd2, Some("1911-1920-icd2.xls")),
    Period::new(1921, 1930, Revision::Icd3, Some("1921-1930-icd3.xls")),
    Period::new(1931, 1939, Revision::Icd4, Some("1931-1939-icd4.xls")),
    Period::new(1940, 1949, Revision::Icd5, Some("1940-1949-icd5.xls")),
    Period::new(1950, 1957, Revision::Icd6, Some("1950-1957-icd6.xls")),
    Period::new(1958, 1967, Revision::Icd7, Some("1958-1967-icd7.xlsx")),
    Period::new(1968, 1978, Revision::Icd8, Some("1968-1978-icd8.xls")),
    Period::new(1979, 1984, Revision::Icd9, Some("1979-1984-icd9a.xlsx")),
    Period::new(1985, 1993, Revision::Icd9, Some("1985-1993-icd9b.xls")),
    Period::new(1994, 2000, Revision::Icd9, Some("1994-2000-icd9c.xls")),
    Period::new(2001, 2019, Revision::Icd10, None),
];

/// The static list of source periods.
#[derive(Debug, Clone, Copy)]
pub struct Catalogue {
    periods: &'static [Period],
}

impl Default for Catalogue {
    fn default() -> Self {
        Self { periods: PERIODS }
    }
}

impl Catalogue {
    pub fn period(&self, year: u16) -> Result<&'static Period, MortalityError> {
        self.periods
            .iter()
            .find(|period| period.contains(year))
            .ok_or(MortalityError::UnknownYear { year })
    }

    pub fn revision(&self, year: u16) -> Result<Revision, MortalityError> {
        self.period(year).map(|period| period.revision)
    }

    pub fn periods(&self) -> impl Iterator<Item = &'static Period> {
        self.periods.iter()
    }

    /// Periods published under `revision`.
    pub fn periods_for(&self, revision: Revision) -> impl Iterator<Item = &'static Period> {
        self.periods
            .iter()
            .filter(move |period| period.revision == revision)
    }
}

/// The years processed when none are configured: every fifth year from 1915 to 2000.
pub fn default_years() -> Vec<u16> {
    (1915..=2000).step_by(5).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn revisions_by_year() {
        let catalogue = Catalogue::default();
        assert_eq!(catalogue.revision(1915).unwrap(), Revision::Icd2);
        assert_eq!(catalogue.revision(1930).unwrap(), Revision::Icd3);
        assert_eq!(catalogue.revision(1950).unwrap(), Revision::Icd6);
        assert_eq!(catalogue.revision(1995).unwrap(), Revision::Icd9);
        assert_eq!(catalogue.revision(2000).unwrap(), Revision::Icd9);
        assert_eq!(catalogue.revision(2005).unwrap(), Revision::Icd10);
        assert!(matches!(
            catalogue.revision(1900),
            Err(MortalityError::UnknownYear { year: 1900 })
        ));
    }

    #[test]
    fn default_years_are_covered() {
        let catalogue = Catalogue::default();
        let years = default_years();
        assert_eq!(years.len(), 18);
        assert_eq!(years.first(), Some(&1915));
        assert_eq!(years.last(), Some(&2000));
        for year in years {
            assert!(catalogue.period(year).unwrap().workbook.is_some());
        }
    }

    #[test]
    fn periods_do_not_overlap() {
        let periods: Vec<_> = Catalogue::default().periods().collect();
        for pair in periods.windows(2) {
            assert_eq!(pair[0].last_year + 1, pair[1].first_year);
        }
    }

    #[test]
    fn icd9_has_three_workbooks() {
        assert_eq!(Catalogue::default().periods_for(Revision::Icd9).count(), 3);
    }
}
