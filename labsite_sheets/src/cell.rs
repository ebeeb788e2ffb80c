use calamine::Data;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::borrow::Cow;
use std::fmt;

/// The value of a single spreadsheet cell.
///
/// Numbers stay numeric; a blank cell is `Empty`, which displays as the empty
/// string so that formatting code never has to special-case it.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// text
    Text(String),
    /// a whole number
    Int(i64),
    /// any other number
    Float(f64),
    /// a boolean
    Bool(bool),
    /// a date, or a date and time
    Date(NaiveDateTime),
    /// nothing at all
    Empty,
}

impl CellValue {
    /// Is this cell blank?
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Render this cell as text, borrowing where possible
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            CellValue::Text(s) => Cow::Borrowed(s),
            CellValue::Empty => Cow::Borrowed(""),
            other => Cow::Owned(other.to_string()),
        }
    }

    /// Interpret this cell as a calendar date.
    /// Date cells are used directly; text is parsed as `YYYY-MM-DD`.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            CellValue::Date(dt) => Some(dt.date()),
            CellValue::Text(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok(),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => f.write_str(s),
            CellValue::Int(i) => write!(f, "{}", i),
            // spreadsheets store every number as a float; `2020` should not come out as `2020.0`
            CellValue::Float(x) if x.fract() == 0.0 && x.abs() < 1e15 => write!(f, "{}", *x as i64),
            CellValue::Float(x) => write!(f, "{}", x),
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::Date(dt) if dt.time() == NaiveTime::MIN => write!(f, "{}", dt.format("%Y-%m-%d")),
            CellValue::Date(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
            CellValue::Empty => Ok(()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(src: &str) -> Self {
        CellValue::Text(src.to_string())
    }
}

impl From<String> for CellValue {
    fn from(src: String) -> Self {
        CellValue::Text(src)
    }
}

impl From<i64> for CellValue {
    fn from(src: i64) -> Self {
        CellValue::Int(src)
    }
}

impl From<f64> for CellValue {
    fn from(src: f64) -> Self {
        CellValue::Float(src)
    }
}

impl From<&Data> for CellValue {
    fn from(src: &Data) -> Self {
        match src {
            Data::Int(i) => CellValue::Int(*i),
            Data::Float(x) => CellValue::Float(*x),
            Data::String(s) => CellValue::Text(s.clone()),
            Data::Bool(b) => CellValue::Bool(*b),
            Data::DateTime(dt) => match dt.as_datetime() {
                Some(dt) => CellValue::Date(dt),
                None => CellValue::Float(dt.as_f64()),
            },
            Data::DateTimeIso(s) => parse_iso(s),
            Data::DurationIso(s) => CellValue::Text(s.clone()),
            Data::Error(e) => CellValue::Text(e.to_string()),
            Data::Empty => CellValue::Empty,
        }
    }
}

fn parse_iso(s: &str) -> CellValue {
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        CellValue::Date(dt)
    } else if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        CellValue::Date(d.and_time(NaiveTime::MIN))
    } else {
        CellValue::Text(s.to_string())
    }
}
