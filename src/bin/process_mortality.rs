//! Build the tidy deaths-by-cause table from the raw England & Wales mortality data.
use clap::Parser;
use enw_mortality::{header, Config, ConfigOverrides, Pipeline, RetentionScope};
use qu::ick_use::*;
use std::path::PathBuf;

#[derive(Parser)]
struct Opt {
    /// A TOML file with settings. Flags take precedence over it.
    #[clap(short, long)]
    config: Option<PathBuf>,
    /// Directory with the raw tables (`<year>.csv`) or source workbooks.
    #[clap(long)]
    raw_dir: Option<PathBuf>,
    /// Directory to write the output file to.
    #[clap(long)]
    output_dir: Option<PathBuf>,
    /// Name of the output file.
    #[clap(long)]
    output_file: Option<String>,
    /// How many codes to keep (per category, or per year with `--scope per-year`).
    #[clap(short = 'n', long)]
    top_n: Option<usize>,
    /// `per-category` or `per-year`.
    #[clap(long)]
    scope: Option<RetentionScope>,
    /// Years to process. Defaults to every fifth year from 1915 to 2000.
    #[clap(long, value_delimiter = ',')]
    years: Vec<u16>,
}

impl Opt {
    fn into_config(self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };
        config.apply_overrides(ConfigOverrides {
            raw_dir: self.raw_dir,
            output_dir: self.output_dir,
            output_file: self.output_file,
            top_n: self.top_n,
            scope: self.scope,
            years: Some(self.years),
        });
        Ok(config)
    }
}

#[qu::ick]
pub fn main(opt: Opt) -> Result {
    let config = opt.into_config()?;
    event!(
        Level::INFO,
        "reading from \"{}\", keeping top {} codes {}",
        config.raw_dir.display(),
        config.top_n,
        config.scope
    );
    let summary = Pipeline::new(config)?.run()?;

    header("Summary");
    println!(
        "{:>6} {:>7} {:>7} {:>10} {:>9} {:>7} {:>13} {:>11}",
        "year", "ICD", "codes", "deaths", "retained", "other", "unclassified", "no desc."
    );
    for year in &summary.years {
        println!(
            "{:>6} {:>7} {:>7} {:>10} {:>9} {:>7} {:>13} {:>11}",
            year.year,
            year.revision.to_string(),
            year.codes,
            year.deaths,
            year.retained_rows,
            year.other_rows,
            year.unclassified_codes,
            year.missing_descriptions
        );
    }
    println!(
        "\n{} rows written to \"{}\"",
        summary.rows,
        summary.output_path.display()
    );
    Ok(())
}
