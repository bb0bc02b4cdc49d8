//! Human-readable text for codes.
use crate::{
    catalogue::Catalogue,
    icd::{IcdCode, Revision},
    util, ArcStr, Result,
};
use calamine::{open_workbook_auto, Reader};
use qu::ick_use::*;
use serde::Deserialize;
use std::{
    collections::{btree_map::Entry, BTreeMap},
    path::{Path, PathBuf},
};

/// Text used for codes without a description.
pub const UNKNOWN_DESCRIPTION: &str = "Unknown";

/// Name of the description sheet in the source workbooks.
const DESCRIPTION_SHEET: &str = "description";

/// Descriptions keyed by revision and code.
#[derive(Debug, Clone, Default)]
pub struct Descriptions {
    codes: BTreeMap<(Revision, ArcStr), ArcStr>,
}

impl Descriptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the descriptions for `revisions` from `raw_dir`.
    ///
    /// For each revision, `descriptions_icd<n>.csv` is read first, then the description sheets
    /// of the revision's workbooks. Missing files are skipped.
    pub fn load(
        raw_dir: &Path,
        revisions: impl IntoIterator<Item = Revision>,
        catalogue: &Catalogue,
    ) -> Result<Self> {
        let mut this = Self::new();
        for revision in revisions {
            let path = descriptions_path(raw_dir, revision);
            if util::path_exists(&path)? {
                this.load_delimited(&path, revision).with_context(|| {
                    format!("loading descriptions from \"{}\"", path.display())
                })?;
            }
            for period in catalogue.periods_for(revision) {
                let Some(path) = period.workbook_path(raw_dir) else {
                    continue
                };
                if !util::path_exists(&path)? {
                    continue;
                }
                this.load_workbook(&path, revision).with_context(|| {
                    format!("loading descriptions from \"{}\"", path.display())
                })?;
            }
            if !this.has_revision(revision) {
                event!(Level::WARN, "no descriptions found for {}", revision);
            }
        }
        Ok(this)
    }

    /// The first description inserted for a code is kept.
    pub fn insert(&mut self, revision: Revision, code: &str, description: impl Into<ArcStr>) {
        let code = code.trim();
        if code.is_empty() {
            return;
        }
        if let Entry::Vacant(entry) = self.codes.entry((revision, code.into())) {
            entry.insert(description.into());
        }
    }

    pub fn get(&self, revision: Revision, code: &IcdCode) -> Option<&ArcStr> {
        self.codes.get(&(revision, ArcStr::from(code.as_str())))
    }

    pub fn has_revision(&self, revision: Revision) -> bool {
        self.codes.keys().any(|(rev, _)| *rev == revision)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    fn load_delimited(&mut self, path: &Path, revision: Revision) -> Result {
        let reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_path(path)?;
        for row in reader.into_deserialize() {
            let row: DescriptionRaw = row?;
            self.insert(
                revision,
                &row.code,
                util::join_descriptions(&row.desc1, &row.desc2),
            );
        }
        Ok(())
    }

    /// The description sheet has one header row and columns `code, desc1, desc2`.
    fn load_workbook(&mut self, path: &Path, revision: Revision) -> Result {
        let mut workbook = open_workbook_auto(path)?;
        let sheet = workbook
            .worksheet_range(DESCRIPTION_SHEET)
            .with_context(|| format!("missing `{}` worksheet", DESCRIPTION_SHEET))??;
        for row in sheet.rows().skip(1) {
            let Some(code) = row.first().and_then(|cell| util::cell_code(cell, revision)) else {
                continue
            };
            let desc1 = row.get(1).map(util::cell_text).unwrap_or_default();
            let desc2 = row.get(2).map(util::cell_text).unwrap_or_default();
            self.insert(revision, &code, util::join_descriptions(&desc1, &desc2));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct DescriptionRaw {
    #[serde(deserialize_with = "util::string_or_empty")]
    code: String,
    #[serde(default, deserialize_with = "util::string_or_empty")]
    desc1: String,
    #[serde(default, deserialize_with = "util::string_or_empty")]
    desc2: String,
}

/// E.g. `descriptions_icd9.csv`.
pub fn descriptions_path(raw_dir: &Path, revision: Revision) -> PathBuf {
    raw_dir.join(format!("descriptions_icd{}.csv", revision.number()))
}
