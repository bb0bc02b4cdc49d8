//! Load the raw death counts for a year.
//!
//! A year is read from `<raw_dir>/<year>.csv` if present, otherwise from the published workbook
//! covering it. Counts in the sources are broken down by sex and age; these are summed, so a
//! [`YearTable`] holds one count per code.
use crate::{
    catalogue::{Catalogue, Period},
    icd::{IcdCode, Revision},
    util, MortalityError, Result,
};
use calamine::{open_workbook_auto, Reader};
use qu::ick_use::*;
use serde::Deserialize;
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

/// Death counts by code for one year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearTable {
    year: u16,
    revision: Revision,
    /// Unique codes, in ascending order.
    entries: Vec<(IcdCode, u64)>,
    total: u64,
}

impl YearTable {
    /// Rows for the same code are summed.
    ///
    /// Fails if the per-code counts or the year's total don't fit in a `u64`.
    pub fn new(
        year: u16,
        revision: Revision,
        entries: impl IntoIterator<Item = (IcdCode, u64)>,
    ) -> Result<Self, MortalityError> {
        let mut counts: BTreeMap<IcdCode, u64> = BTreeMap::new();
        let mut total = 0u64;
        for (code, count) in entries {
            total = total
                .checked_add(count)
                .ok_or_else(|| MortalityError::InvalidCount {
                    year,
                    code: code.to_string(),
                    value: total as f64 + count as f64,
                })?;
            // bounded by `total`
            *counts.entry(code).or_insert(0) += count;
        }
        Ok(Self {
            year,
            revision,
            entries: counts.into_iter().collect(),
            total,
        })
    }

    pub fn year(&self) -> u16 {
        self.year
    }

    pub fn revision(&self) -> Revision {
        self.revision
    }

    pub fn entries(&self) -> &[(IcdCode, u64)] {
        &self.entries
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Where the table for a year comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Delimited(PathBuf),
    Workbook(PathBuf),
}

impl Source {
    pub fn path(&self) -> &Path {
        match self {
            Source::Delimited(path) | Source::Workbook(path) => path,
        }
    }
}

/// The per-year table file name, e.g. `1995.csv`.
pub fn year_table_path(raw_dir: &Path, year: u16) -> PathBuf {
    raw_dir.join(format!("{}.csv", year))
}

/// Find the source for a year.
pub fn find_source(raw_dir: &Path, year: u16, catalogue: &Catalogue) -> Result<Source> {
    let period = catalogue.period(year)?;
    let delimited = year_table_path(raw_dir, year);
    if util::path_exists(&delimited)? {
        return Ok(Source::Delimited(delimited));
    }
    let mut searched = vec![delimited];
    if let Some(workbook) = period.workbook_path(raw_dir) {
        if util::path_exists(&workbook)? {
            return Ok(Source::Workbook(workbook));
        }
        searched.push(workbook);
    }
    Err(MortalityError::MissingInputFile { year, searched }.into())
}

/// Load the table for `year` from `raw_dir`.
pub fn load_year(raw_dir: &Path, year: u16, catalogue: &Catalogue) -> Result<YearTable> {
    let period = catalogue.period(year)?;
    let source = find_source(raw_dir, year, catalogue)?;
    event!(
        Level::INFO,
        "loading {} ({}) from \"{}\"",
        year,
        period.revision,
        source.path().display()
    );
    let entries = match &source {
        Source::Delimited(path) => load_delimited(path, year),
        Source::Workbook(path) => load_workbook(path, year, period),
    }
    .with_context(|| format!("while loading {} from \"{}\"", year, source.path().display()))?;
    if entries.is_empty() {
        return Err(MortalityError::EmptyYear {
            year,
            path: source.path().to_owned(),
        }
        .into());
    }
    Ok(YearTable::new(year, period.revision, entries)?)
}

#[derive(Debug, Deserialize)]
struct DeathsRaw {
    #[serde(deserialize_with = "util::string_or_empty")]
    code: String,
    #[serde(default)]
    year: Option<u16>,
    #[serde(alias = "count", alias = "deaths")]
    n: f64,
}

fn load_delimited(path: &Path, year: u16) -> Result<Vec<(IcdCode, u64)>> {
    let mut entries = vec![];
    let reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)?;
    for row in reader.into_deserialize() {
        let row: DeathsRaw = row?;
        if matches!(row.year, Some(y) if y != year) {
            continue;
        }
        entries.push(entry(year, &row.code, row.n)?);
    }
    Ok(entries)
}

/// Data sheets are called `icdN_1`, `icdN_2`, ... with columns `code, year, sex, age, n` and
/// one header row.
fn load_workbook(path: &Path, year: u16, period: &Period) -> Result<Vec<(IcdCode, u64)>> {
    let mut workbook = open_workbook_auto(path)?;
    let prefix = period.revision.sheet_prefix();
    let sheet_names: Vec<String> = workbook
        .sheet_names()
        .iter()
        .filter(|name| name.starts_with(&prefix))
        .cloned()
        .collect();
    ensure!(
        !sheet_names.is_empty(),
        "no data sheets starting with `{}`",
        prefix
    );

    let mut entries = vec![];
    for name in sheet_names {
        let sheet = workbook
            .worksheet_range(&name)
            .with_context(|| format!("missing `{}` worksheet", name))??;
        for (idx, row) in sheet.rows().enumerate().skip(1) {
            let cell_year = row.get(1).and_then(util::cell_number);
            if cell_year != Some(year as f64) {
                continue;
            }
            let code = row
                .first()
                .and_then(|cell| util::cell_code(cell, period.revision))
                .unwrap_or_default();
            let n = row
                .get(4)
                .and_then(util::cell_number)
                .with_context(|| format!("sheet `{}` row {}: no death count", name, idx + 1))?;
            entries.push(entry(year, &code, n)?);
        }
    }
    Ok(entries)
}

fn entry(year: u16, code: &str, n: f64) -> Result<(IcdCode, u64)> {
    if code.trim().is_empty() {
        return Err(MortalityError::EmptyCode { year }.into());
    }
    let count = util::death_count(year, code, n)?;
    Ok((IcdCode::new(code)?, count))
}
