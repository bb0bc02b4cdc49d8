//! Write the output table.
use crate::{describe::description_of, retain::OutputRow, util, Result};
use qu::ick_use::*;
use serde::Serialize;
use std::{fs, io, path::Path};

/// Column order of the output file.
pub const HEADER: [&str; 5] = ["year", "code", "description", "category", "count"];

#[derive(Debug, Serialize)]
struct OutputRecord<'a> {
    year: u16,
    code: &'a str,
    description: String,
    category: &'static str,
    count: u64,
}

impl<'a> From<&'a OutputRow> for OutputRecord<'a> {
    fn from(row: &'a OutputRow) -> Self {
        Self {
            year: row.year,
            code: row.code(),
            description: description_of(row),
            category: row.category.label(),
            count: row.count,
        }
    }
}

/// Serialize rows as CSV with a header, in the order given.
pub fn write_rows<W: io::Write>(rows: &[OutputRow], out: W) -> Result {
    let mut writer = csv::WriterBuilder::new().has_headers(true).from_writer(out);
    if rows.is_empty() {
        writer.write_record(HEADER)?;
    }
    for row in rows {
        writer.serialize(OutputRecord::from(row))?;
    }
    writer.flush()?;
    Ok(())
}

/// Write rows to `path`, replacing any existing file.
pub fn save(rows: &[OutputRow], path: impl AsRef<Path>) -> Result {
    fn inner(rows: &[OutputRow], path: &Path) -> Result {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("could not create parent")?;
        }
        if util::path_exists(path)? {
            event!(
                Level::WARN,
                "overwriting existing file at \"{}\"",
                path.display()
            );
        }
        let out = io::BufWriter::new(fs::File::create(path)?);
        write_rows(rows, out)
    }
    let path = path.as_ref();
    inner(rows, path).with_context(|| format!("unable to save output to \"{}\"", path.display()))
}
