//! Run configuration.
//!
//! Values come from the built-in defaults, optionally overridden by a TOML file, optionally
//! overridden by command line flags.
use crate::{
    catalogue::{default_years, Catalogue},
    retain::RetentionScope,
    Result,
};
use qu::ick_use::*;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// How many codes are kept when not configured.
pub const DEFAULT_TOP_N: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directory holding the raw tables and workbooks.
    pub raw_dir: PathBuf,
    /// Directory the output file is written to. Created if missing.
    pub output_dir: PathBuf,
    /// How many codes to keep.
    pub top_n: usize,
    pub scope: RetentionScope,
    /// Years to process, ascending.
    pub years: Vec<u16>,
    /// Output file name. Derived from the years if not set.
    pub output_file: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            raw_dir: PathBuf::from("../rawdata"),
            output_dir: PathBuf::from("../outdata"),
            top_n: DEFAULT_TOP_N,
            scope: RetentionScope::default(),
            years: default_years(),
            output_file: None,
        }
    }
}

impl Config {
    /// Read a config file. Fields missing from the file keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        fn inner(path: &Path) -> Result<Config> {
            let text = fs::read_to_string(path)?;
            toml::from_str(&text).map_err(Error::from)
        }
        let path = path.as_ref();
        inner(path).with_context(|| format!("loading config from \"{}\"", path.display()))
    }

    /// Check the years are usable.
    pub fn validate(&self, catalogue: &Catalogue) -> Result {
        ensure!(!self.years.is_empty(), "no years to process");
        ensure!(
            self.years.windows(2).all(|pair| pair[0] < pair[1]),
            "years must be strictly ascending"
        );
        for year in &self.years {
            catalogue.period(*year)?;
        }
        Ok(())
    }

    /// E.g. `Deaths_ENW_1915-2000.csv`.
    pub fn output_file_name(&self) -> String {
        if let Some(name) = &self.output_file {
            return name.clone();
        }
        match (self.years.first(), self.years.last()) {
            (Some(first), Some(last)) => format!("Deaths_ENW_{}-{}.csv", first, last),
            _ => "Deaths_ENW.csv".to_string(),
        }
    }

    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(self.output_file_name())
    }

    /// Replace every setting given in `overrides`.
    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        let ConfigOverrides {
            raw_dir,
            output_dir,
            output_file,
            top_n,
            scope,
            years,
        } = overrides;
        if let Some(raw_dir) = raw_dir {
            self.raw_dir = raw_dir;
        }
        if let Some(output_dir) = output_dir {
            self.output_dir = output_dir;
        }
        if output_file.is_some() {
            self.output_file = output_file;
        }
        if let Some(top_n) = top_n {
            self.top_n = top_n;
        }
        if let Some(scope) = scope {
            self.scope = scope;
        }
        if let Some(years) = years.filter(|years| !years.is_empty()) {
            self.years = years;
        }
    }
}

/// Settings from the command line, which take precedence over the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub raw_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub output_file: Option<String>,
    pub top_n: Option<usize>,
    pub scope: Option<RetentionScope>,
    pub years: Option<Vec<u16>>,
}
