//! The full run: load every year, categorise, keep the top codes, describe, write.
use crate::{
    catalogue::Catalogue,
    config::Config,
    describe::{attach_descriptions, undescribed_codes},
    descriptions::Descriptions,
    icd::Revision,
    loader::{load_year, YearTable},
    mapper::categorize,
    output,
    retain::{retain_top_n, OutputRow},
    translation::TranslationTables,
    Category, MortalityError, Result,
};
use qu::ick_use::*;
use std::{collections::BTreeSet, path::PathBuf};

/// What happened to one year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearSummary {
    pub year: u16,
    pub revision: Revision,
    /// Distinct codes in the raw table.
    pub codes: usize,
    pub deaths: u64,
    pub retained_rows: usize,
    pub other_rows: usize,
    pub unclassified_codes: usize,
    /// Retained rows written with the unknown description.
    pub missing_descriptions: usize,
    /// Codes of the raw table without a description, retained or not.
    pub undescribed_codes: usize,
}

/// The result of a full run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub years: Vec<YearSummary>,
    pub output_path: PathBuf,
    pub rows: usize,
}

/// Everything the run needs that doesn't change during it.
pub struct Pipeline {
    config: Config,
    catalogue: Catalogue,
    tables: TranslationTables,
}

impl Pipeline {
    pub fn new(config: Config) -> Result<Self> {
        let catalogue = Catalogue::default();
        config.validate(&catalogue)?;
        let tables = TranslationTables::builtin()?;
        Ok(Self {
            config,
            catalogue,
            tables,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Load, categorise, retain and describe every configured year, without writing anything.
    ///
    /// All raw tables are loaded before any processing, so a missing year fails fast.
    pub fn process(&self) -> Result<(Vec<OutputRow>, Vec<YearSummary>)> {
        let raw_dir = &self.config.raw_dir;
        let tables = self
            .config
            .years
            .iter()
            .map(|year| load_year(raw_dir, *year, &self.catalogue))
            .collect::<Result<Vec<YearTable>>>()?;

        let revisions: BTreeSet<Revision> = tables.iter().map(YearTable::revision).collect();
        let descriptions = Descriptions::load(raw_dir, revisions, &self.catalogue)?;

        let mut rows = vec![];
        let mut summaries = vec![];
        for table in &tables {
            let (year_rows, summary) = self.process_year(table, &descriptions)?;
            rows.extend(year_rows);
            summaries.push(summary);
        }
        Ok((rows, summaries))
    }

    /// Process every year and write the output file.
    pub fn run(&self) -> Result<RunSummary> {
        let (rows, years) = self.process()?;
        let output_path = self.config.output_path();
        output::save(&rows, &output_path)?;
        event!(
            Level::INFO,
            "wrote {} rows to \"{}\"",
            rows.len(),
            output_path.display()
        );
        Ok(RunSummary {
            years,
            output_path,
            rows: rows.len(),
        })
    }

    fn process_year(
        &self,
        table: &YearTable,
        descriptions: &Descriptions,
    ) -> Result<(Vec<OutputRow>, YearSummary)> {
        let categorized = categorize(table, &self.tables)
            .with_context(|| format!("categorising {}", table.year()))?;
        let unclassified_codes = categorized
            .iter()
            .filter(|row| row.category == Category::Unclassified)
            .count();

        let mut rows = retain_top_n(&categorized, self.config.top_n, self.config.scope);
        let missing_descriptions = attach_descriptions(&mut rows, table.revision(), descriptions);
        let undescribed_codes = undescribed_codes(table, descriptions);

        let input = table.total();
        let output: u64 = rows.iter().map(|row| row.count).sum();
        if input != output {
            return Err(MortalityError::ConservationViolated {
                year: table.year(),
                input,
                output,
            }
            .into());
        }

        let other_rows = rows.iter().filter(|row| row.is_other()).count();
        let summary = YearSummary {
            year: table.year(),
            revision: table.revision(),
            codes: table.len(),
            deaths: input,
            retained_rows: rows.len() - other_rows,
            other_rows,
            unclassified_codes,
            missing_descriptions,
            undescribed_codes,
        };
        event!(
            Level::INFO,
            "{}: {} deaths, {} codes -> {} rows",
            summary.year,
            summary.deaths,
            summary.codes,
            rows.len()
        );
        Ok((rows, summary))
    }
}

/// Run the whole pipeline with `config`.
pub fn run(config: Config) -> Result<RunSummary> {
    Pipeline::new(config)?.run()
}
