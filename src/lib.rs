//! Turn the historical England & Wales mortality tables into one tidy CSV.
//!
//! Each processed year is loaded as a table of death counts per ICD code, every code is mapped
//! to a broad category using hardcoded per-revision tables, the codes with the most deaths are
//! kept (the rest are summed into an `Other` row per category), descriptions are attached and
//! everything is written to a single file.
pub mod catalogue;
mod category;
pub mod config;
pub mod describe;
pub mod descriptions;
mod error;
pub mod icd;
pub mod loader;
pub mod mapper;
pub mod output;
pub mod pipeline;
mod range;
pub mod retain;
pub mod translation;
mod util;

pub use anyhow::{Context, Error};
use std::sync::Arc;

pub use crate::{
    catalogue::Catalogue,
    category::Category,
    config::{Config, ConfigOverrides},
    descriptions::Descriptions,
    error::MortalityError,
    icd::{IcdCode, Revision},
    loader::YearTable,
    mapper::CategorizedRow,
    pipeline::{run, Pipeline, RunSummary, YearSummary},
    range::{Range, RangeSet},
    retain::{OutputKind, OutputRow, RetentionScope},
    translation::{TranslationTable, TranslationTables},
    util::header,
};

pub type ArcStr = Arc<str>;
pub type Result<T = (), E = anyhow::Error> = std::result::Result<T, E>;
