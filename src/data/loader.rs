use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use csv::StringRecord;
use serde::Deserialize;

use super::error::DataLoadError;
use super::model::{Dataset, Record};

// ---------------------------------------------------------------------------
// Source schema
// ---------------------------------------------------------------------------

pub const DATE_COLUMN: &str = "StichtagDat";
pub const YEAR_COLUMN: &str = "EreignisDatJahr";
pub const MONTH_COLUMN: &str = "EreignisDatMM";
pub const COUNT_COLUMN: &str = "AnzZuzuWir";
pub const SEX_COLUMN: &str = "SexLang";
pub const AGE_COLUMN: &str = "AlterV20ueber80Kurz_noDM";
pub const ORIGIN_COLUMN: &str = "HerkunftLang";
pub const QUARTER_COLUMN: &str = "QuarLang";
pub const DISTRICT_COLUMN: &str = "KreisLang";

/// Columns that must be present after header trimming.
pub const REQUIRED_COLUMNS: [&str; 9] = [
    DATE_COLUMN,
    YEAR_COLUMN,
    MONTH_COLUMN,
    COUNT_COLUMN,
    SEX_COLUMN,
    AGE_COLUMN,
    ORIGIN_COLUMN,
    QUARTER_COLUMN,
    DISTRICT_COLUMN,
];

/// One source row, every cell still raw text. Unknown columns are ignored.
#[derive(Debug, Deserialize)]
struct RawRow {
    #[serde(rename = "StichtagDat")]
    stated_date: String,
    #[serde(rename = "EreignisDatJahr")]
    year: String,
    #[serde(rename = "EreignisDatMM")]
    month: String,
    #[serde(rename = "AnzZuzuWir")]
    count: String,
    #[serde(rename = "SexLang")]
    sex: String,
    #[serde(rename = "AlterV20ueber80Kurz_noDM")]
    age_group: String,
    #[serde(rename = "HerkunftLang")]
    origin: String,
    #[serde(rename = "QuarLang")]
    quarter: String,
    #[serde(rename = "KreisLang")]
    district: String,
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load the arrivals dataset from a CSV file.
pub fn load_file(path: &Path) -> Result<Dataset, DataLoadError> {
    let file = File::open(path).map_err(|source| DataLoadError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let dataset = load_reader(file)?;
    if dataset.is_empty() {
        log::warn!("{} contains no records", path.display());
    }
    log::info!(
        "Loaded {} records from {} (years {:?})",
        dataset.len(),
        path.display(),
        dataset.options.year_bounds
    );
    Ok(dataset)
}

/// Parse and normalise a CSV stream with a header row.
pub fn load_reader<R: Read>(source: R) -> Result<Dataset, DataLoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(source);

    let headers: StringRecord = reader.headers()?.iter().map(normalize_header).collect();
    if let Some(missing) = REQUIRED_COLUMNS
        .iter()
        .find(|&&col| !headers.iter().any(|h| h == col))
    {
        return Err(DataLoadError::MissingColumn(missing.to_string()));
    }
    reader.set_headers(headers.clone());

    let mut records = Vec::new();
    for result in reader.records() {
        let row = result?;
        let line = row.position().map_or(0, |p| p.line());
        let raw: RawRow = row.deserialize(Some(&headers))?;
        records.push(derive_record(raw, line)?);
    }

    Ok(Dataset::from_records(records))
}

// ---------------------------------------------------------------------------
// Field derivation
// ---------------------------------------------------------------------------

fn derive_record(raw: RawRow, line: u64) -> Result<Record, DataLoadError> {
    let year = parse_integer(&raw.year, line, YEAR_COLUMN)?;
    let month = parse_integer(&raw.month, line, MONTH_COLUMN)?;

    Ok(Record {
        date: parse_stated_date(&raw.stated_date),
        year,
        month,
        count: coerce_count(&raw.count),
        age_group: stringify_code(&raw.age_group),
        sex: raw.sex,
        origin: raw.origin,
        quarter: raw.quarter,
        district: raw.district,
    })
}

/// Header names are compared after trimming; a UTF-8 BOM is not part of the name.
fn normalize_header(name: &str) -> &str {
    name.trim_start_matches('\u{feff}').trim()
}

fn parse_integer<T: std::str::FromStr>(
    raw: &str,
    line: u64,
    column: &'static str,
) -> Result<T, DataLoadError> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| DataLoadError::InvalidInteger {
            line,
            column,
            value: raw.to_string(),
        })
}

/// Anything that is not a finite, positive number counts as zero moves.
/// Fractions are truncated.
pub fn coerce_count(raw: &str) -> u64 {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => v.trunc() as u64,
        _ => 0,
    }
}

/// Collapse numeric age codes (`20`, `20.0`) onto one key; keep text verbatim.
pub fn stringify_code(raw: &str) -> String {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v.fract() == 0.0 => format!("{}", v as i64),
        _ => raw.to_string(),
    }
}

// Two-digit years come first so `03/04/20` is not read as year 20.
const DATE_FORMATS: [&str; 8] = [
    "%d.%m.%y",
    "%d/%m/%y",
    "%d-%m-%y",
    "%Y-%m-%d",
    "%d.%m.%Y",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%Y/%m/%d",
];
const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%SZ"];

/// Years below this are truncated input (`03-04-20` read as `%Y-%m-%d`).
const MIN_YEAR: i32 = 1000;

/// Parse the stated date. Ambiguous numeric dates are read day-first.
pub fn parse_stated_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.date())
        })
        .filter(|d| d.year() >= MIN_YEAR)
}
