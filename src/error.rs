//! Failures a caller may want to tell apart.
//!
//! These travel inside `anyhow::Error` chains; use `downcast_ref::<MortalityError>()` to get at
//! them.
use itertools::Itertools;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MortalityError {
    /// No raw table exists for a requested year. `searched` lists every candidate file.
    #[error("no raw data for {year}: looked for {}", paths(.searched))]
    MissingInputFile { year: u16, searched: Vec<PathBuf> },

    /// The year isn't covered by any catalogue period.
    #[error("{year} is not covered by any known ICD revision")]
    UnknownYear { year: u16 },

    /// The source exists but contains no rows for the year.
    #[error("{path:?} contains no rows for {year}")]
    EmptyYear { year: u16, path: PathBuf },

    #[error("invalid death count {value} for code \"{code}\" in {year}")]
    InvalidCount { year: u16, code: String, value: f64 },

    #[error("row with an empty code in {year}")]
    EmptyCode { year: u16 },

    /// Mapping and aggregation must not change the number of deaths in a year.
    #[error("{year}: {input} deaths in, {output} deaths out")]
    ConservationViolated { year: u16, input: u64, output: u64 },
}

fn paths(paths: &[PathBuf]) -> String {
    paths.iter().map(|path| format!("{:?}", path)).join(" and ")
}
