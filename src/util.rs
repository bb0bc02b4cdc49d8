use crate::{icd::Revision, MortalityError};
use calamine::DataType;
use serde::{Deserialize, Deserializer};
use std::{fs, io, path::Path};

/// Converts a not found error to Ok(false)
pub fn path_exists(path: &Path) -> io::Result<bool> {
    match fs::metadata(path) {
        Ok(_) => Ok(true),
        Err(e) if matches!(e.kind(), io::ErrorKind::NotFound) => Ok(false),
        Err(e) => Err(e),
    }
}

/// Death counts arrive as floats from spreadsheets. Only whole, non-negative numbers are valid.
pub fn death_count(year: u16, code: &str, value: f64) -> Result<u64, MortalityError> {
    if !value.is_finite() || value < 0. || value != value.floor() || value > u64::MAX as f64 {
        return Err(MortalityError::InvalidCount {
            year,
            code: code.to_string(),
            value,
        });
    }
    Ok(value as u64)
}

// Helpers for reading spreadsheet cells.

/// Read a cell as text, turning numbers back into the code they were before the spreadsheet
/// got to them.
pub fn cell_code(cell: &DataType, revision: Revision) -> Option<String> {
    let text = match cell {
        DataType::String(s) => s.trim().to_string(),
        DataType::Int(i) => i.to_string(),
        DataType::Float(f) if f.fract() == 0. => format!("{}", *f as i64),
        DataType::Float(f) => f.to_string(),
        _ => return None,
    };
    if text.is_empty() {
        return None;
    }
    let numeric = !matches!(cell, DataType::String(_));
    if numeric && revision.has_four_digit_codes() && text.len() < 4 {
        Some(format!("{:0>4}", text))
    } else {
        Some(text)
    }
}

pub fn cell_text(cell: &DataType) -> String {
    match cell {
        DataType::String(s) => s.trim().to_string(),
        DataType::Int(i) => i.to_string(),
        DataType::Float(f) if f.fract() == 0. => format!("{}", *f as i64),
        DataType::Float(f) => f.to_string(),
        DataType::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

pub fn cell_number(cell: &DataType) -> Option<f64> {
    match cell {
        DataType::Int(i) => Some(*i as f64),
        DataType::Float(f) => Some(*f),
        DataType::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Descriptions are split across two columns. Either both hold the same text, or the second
/// narrows down the first.
pub fn join_descriptions(desc1: &str, desc2: &str) -> String {
    let (desc1, desc2) = (desc1.trim(), desc2.trim());
    if desc2.is_empty() || desc1 == desc2 {
        desc1.to_string()
    } else {
        format!("{}, {}", desc1, desc2)
    }
}

/// Parse a string, mapping an empty field to the empty string rather than an error.
pub fn string_or_empty<'de, D>(d: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Deserialize::deserialize(d)?;
    Ok(s.map(|s| s.trim().to_string()).unwrap_or_default())
}

pub fn header(header: &str) {
    let len = header.len();
    print!("\n{}\n", header);
    for _ in 0..len {
        print!("=");
    }
    println!("\n")
}
