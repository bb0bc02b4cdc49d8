//! ICD revisions and codes.
//!
//! Codes are kept exactly as they appear in the source tables (trimmed). Matching them against
//! the category tables goes through a *lookup key*, which depends on the revision: older
//! revisions mix numbers and letter suffixes (`87a`, `84(3)`), ICD-6 to ICD-9 use four-digit
//! codes that are categorised on their first three digits, and ICD-10 codes start with a letter.
use crate::ArcStr;
use once_cell::sync::Lazy;
use qu::ick_use::*;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

static LEADING_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new("^[0-9]+").expect("leading number regex is valid"));

/// An ICD revision.
///
/// ICD-1 predates the first year we have data for, so it has no variant.
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize,
)]
pub enum Revision {
    Icd2,
    Icd3,
    Icd4,
    Icd5,
    Icd6,
    Icd7,
    Icd8,
    Icd9,
    Icd10,
}

impl Revision {
    pub const ALL: [Revision; 9] = [
        Revision::Icd2,
        Revision::Icd3,
        Revision::Icd4,
        Revision::Icd5,
        Revision::Icd6,
        Revision::Icd7,
        Revision::Icd8,
        Revision::Icd9,
        Revision::Icd10,
    ];

    pub fn number(self) -> u8 {
        use Revision::*;
        match self {
            Icd2 => 2,
            Icd3 => 3,
            Icd4 => 4,
            Icd5 => 5,
            Icd6 => 6,
            Icd7 => 7,
            Icd8 => 8,
            Icd9 => 9,
            Icd10 => 10,
        }
    }

    pub fn from_number(number: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|rev| rev.number() == number)
    }

    /// The prefix of data sheet names in the source workbooks, e.g. `icd9`.
    pub fn sheet_prefix(self) -> String {
        format!("icd{}", self.number())
    }

    /// From ICD-6 on, codes are four digits long and categorised on their first three.
    pub fn has_four_digit_codes(self) -> bool {
        matches!(
            self,
            Revision::Icd6 | Revision::Icd7 | Revision::Icd8 | Revision::Icd9
        )
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ICD-{}", self.number())
    }
}

impl FromStr for Revision {
    type Err = Error;
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        let number = trimmed
            .strip_prefix("ICD-")
            .or_else(|| trimmed.strip_prefix("icd"))
            .unwrap_or(trimmed);
        number
            .parse::<u8>()
            .ok()
            .and_then(Revision::from_number)
            .ok_or_else(|| format_err!("didn't recognise ICD revision \"{}\"", input))
    }
}

/// A cause of death code, as written in the source data.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IcdCode(ArcStr);

impl IcdCode {
    pub fn new(code: &str) -> Result<Self> {
        let code = code.trim();
        ensure!(!code.is_empty(), "ICD codes cannot be empty");
        Ok(IcdCode(code.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The normalised form of this code used to match it against category ranges.
    ///
    /// Returns `None` if the code doesn't have the shape expected for the revision.
    pub fn lookup_key(&self, revision: Revision) -> Option<String> {
        lookup_key(&self.0, revision)
    }
}

impl fmt::Display for IcdCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for IcdCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for IcdCode {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl<'a> TryFrom<&'a str> for IcdCode {
    type Error = Error;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

/// Normalise a code from the source data.
pub(crate) fn lookup_key(code: &str, revision: Revision) -> Option<String> {
    let code = code.trim();
    if revision == Revision::Icd10 {
        icd10_key(code)
    } else if revision.has_four_digit_codes() {
        four_digit_key(code)
    } else {
        left_pad_code(code)
    }
}

/// Normalise a bound from a category definition string.
///
/// Bounds are written as 3-digit categories even for revisions with 4-digit codes.
pub(crate) fn bound_key(bound: &str, revision: Revision) -> Option<String> {
    let bound = bound.trim();
    if revision == Revision::Icd10 {
        icd10_key(bound)
    } else {
        left_pad_code(bound)
    }
}

/// Left-pad the leading numerical part of a code with zeros to 3 digits.
fn left_pad_code(code: &str) -> Option<String> {
    let code = code.trim_start_matches('0');
    let digits = LEADING_NUMBER.find(code)?.as_str();
    let number: u16 = digits.parse().ok()?;
    if !(1..=999).contains(&number) {
        return None;
    }
    Some(format!("{:03}{}", number, &code[digits.len()..]))
}

fn four_digit_key(code: &str) -> Option<String> {
    let mut code = code.to_string();
    // numeric cells lose their leading zeros
    if code.chars().all(|ch| ch.is_ascii_digit()) && code.len() < 4 {
        code = format!("{:0>4}", code);
    }
    let mut chars = code.chars();
    chars.next_back()?;
    let key = chars.as_str();
    if key.is_empty() {
        None
    } else {
        Some(key.to_string())
    }
}

fn icd10_key(code: &str) -> Option<String> {
    let code: String = code
        .chars()
        .filter(|ch| *ch != '.')
        .map(|ch| ch.to_ascii_uppercase())
        .collect();
    let key: String = code.chars().take(3).collect();
    let mut chars = key.chars();
    let well_formed = matches!(chars.next(), Some(ch) if ch.is_ascii_uppercase())
        && chars.clone().count() == 2
        && chars.all(|ch| ch.is_ascii_digit());
    if well_formed {
        Some(key)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn revision_names() {
        assert_eq!(Revision::Icd9.to_string(), "ICD-9");
        assert_eq!("ICD-4".parse::<Revision>().unwrap(), Revision::Icd4);
        assert_eq!("icd10".parse::<Revision>().unwrap(), Revision::Icd10);
        assert_eq!("7".parse::<Revision>().unwrap(), Revision::Icd7);
        assert!("ICD-1".parse::<Revision>().is_err());
        assert_eq!(Revision::Icd2.sheet_prefix(), "icd2");
    }

    #[test]
    fn old_revisions_are_left_padded() {
        assert_eq!(lookup_key("87a", Revision::Icd5).unwrap(), "087a");
        assert_eq!(lookup_key("084(3)", Revision::Icd3).unwrap(), "084(3)");
        assert_eq!(lookup_key("1", Revision::Icd2).unwrap(), "001");
        assert_eq!(lookup_key(" 136 ", Revision::Icd4).unwrap(), "136");
        assert_eq!(lookup_key("0", Revision::Icd2), None);
        assert_eq!(lookup_key("abc", Revision::Icd2), None);
        assert_eq!(lookup_key("1000", Revision::Icd3), None);
    }

    #[test]
    fn four_digit_codes_drop_last_digit() {
        assert_eq!(lookup_key("0010", Revision::Icd9).unwrap(), "001");
        assert_eq!(lookup_key("4109", Revision::Icd8).unwrap(), "410");
        // leading zeros lost in a spreadsheet
        assert_eq!(lookup_key("10", Revision::Icd6).unwrap(), "001");
        assert_eq!(lookup_key("E800", Revision::Icd9).unwrap(), "E80");
        assert_eq!(lookup_key("7", Revision::Icd7).unwrap(), "000");
    }

    #[test]
    fn icd10_codes_use_category() {
        assert_eq!(lookup_key("a01.2", Revision::Icd10).unwrap(), "A01");
        assert_eq!(lookup_key("I219", Revision::Icd10).unwrap(), "I21");
        assert_eq!(lookup_key("U5", Revision::Icd10), None);
        assert_eq!(lookup_key("123", Revision::Icd10), None);
    }

    #[test]
    fn bounds_are_three_digits() {
        assert_eq!(bound_key("1", Revision::Icd9).unwrap(), "001");
        assert_eq!(bound_key("460", Revision::Icd8).unwrap(), "460");
        assert_eq!(bound_key("S00", Revision::Icd10).unwrap(), "S00");
    }

    #[test]
    fn codes_are_trimmed() {
        let code = IcdCode::new(" 87a ").unwrap();
        assert_eq!(code.as_str(), "87a");
        assert!(IcdCode::new("  ").is_err());
    }

    #[test]
    fn codes_and_revisions_through_csv() {
        #[derive(Debug, PartialEq, Serialize, Deserialize)]
        struct Row {
            revision: Revision,
            code: IcdCode,
        }
        let input = "revision,code\nIcd9,4109\nIcd3,84(3)\n";
        let rows: Vec<Row> = csv::Reader::from_reader(input.as_bytes())
            .into_deserialize()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(
            rows[1],
            Row {
                revision: Revision::Icd3,
                code: IcdCode::new("84(3)").unwrap(),
            }
        );

        let mut writer = csv::Writer::from_writer(vec![]);
        for row in &rows {
            writer.serialize(row).unwrap();
        }
        let output = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        assert_eq!(output, input);
    }
}
