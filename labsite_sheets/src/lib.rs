#![deny(dead_code)]
#![deny(unreachable_patterns)]
#![deny(unused_extern_crates)]
#![deny(unused_imports)]
#![deny(unused_qualifications)]
#![deny(clippy::all)]
#![deny(missing_docs)]
#![deny(missing_debug_implementations)]

//! Load xlsx workbooks as rows of named fields.
//!
//! The first row of every sheet names the fields; each later row becomes a `Row`.
//! Rows which are entirely blank are skipped, blank cells read as the empty string,
//! and a header row with a blank cell is an error.
//!
//! `save_workbook` writes the same structure back out as a minimal xlsx file.

use calamine::{open_workbook_auto, Data, Range, Reader};
use log::debug;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt;
use std::path::{Path, PathBuf};
mod cell;
mod writer;
pub use cell::CellValue;
pub use writer::save_workbook;

/// Errors loading a workbook
#[derive(Debug)]
pub enum SheetError {
    /// there is no file at this path
    NotFound(PathBuf),
    /// the file could not be opened or parsed as a workbook
    Calamine(calamine::Error),
    /// the workbook has no sheets at all
    NoSheets(PathBuf),
    /// the header row of `sheet` has a blank cell at (zero-based) `column`
    UnnamedColumn {
        /// the offending sheet
        sheet: String,
        /// zero-based column index
        column: usize,
    },
    /// error writing a workbook
    Io(std::io::Error),
    /// error assembling the xlsx container
    Zip(zip::result::ZipError),
}

impl fmt::Display for SheetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SheetError::NotFound(p) => write!(f, "Spreadsheet not found: {}", p.display()),
            SheetError::Calamine(e) => write!(f, "Error reading spreadsheet: {}", e),
            SheetError::NoSheets(p) => write!(f, "Spreadsheet has no sheets: {}", p.display()),
            SheetError::UnnamedColumn { sheet, column } => write!(
                f,
                "header cannot contain an unnamed column (sheet '{}', column {})",
                sheet,
                column + 1
            ),
            SheetError::Io(e) => write!(f, "Error writing spreadsheet: {}", e),
            SheetError::Zip(e) => write!(f, "Error writing spreadsheet: {}", e),
        }
    }
}

impl Error for SheetError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SheetError::Calamine(e) => Some(e),
            SheetError::Io(e) => Some(e),
            SheetError::Zip(e) => Some(e),
            _ => None,
        }
    }
}

macro_rules! error_conv {
    ($from:ty, $to:ident) => {
        impl From<$from> for SheetError {
            fn from(src: $from) -> Self {
                SheetError::$to(src)
            }
        }
    };
}

error_conv!(calamine::Error, Calamine);
error_conv!(std::io::Error, Io);
error_conv!(zip::result::ZipError, Zip);

/// One record: a mapping from field name to value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    cells: BTreeMap<String, CellValue>,
}

impl Row {
    /// Create an empty row
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, replacing any existing value
    pub fn set<K: Into<String>, V: Into<CellValue>>(&mut self, key: K, value: V) -> &mut Self {
        let _ = self.cells.insert(key.into(), value.into());
        self
    }

    /// The raw value of a field, if the sheet has that column
    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.cells.get(key)
    }

    /// A field as text; missing and blank fields are the empty string
    pub fn get_str(&self, key: &str) -> Cow<'_, str> {
        match self.cells.get(key) {
            Some(v) => v.as_text(),
            None => Cow::Borrowed(""),
        }
    }

    /// A field as trimmed text
    pub fn get_trimmed(&self, key: &str) -> String {
        self.get_str(key).trim().to_string()
    }

    /// Does this field hold something other than whitespace?
    pub fn has(&self, key: &str) -> bool {
        !self.get_str(key).trim().is_empty()
    }

    /// field names in this row, sorted
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.cells.keys().map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<CellValue>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let cells = iter
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Row { cells }
    }
}

/// A named sheet and its rows, in file order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
    /// the name of the sheet
    pub name: String,
    /// data rows, excluding the header
    pub rows: Vec<Row>,
}

/// Every sheet of a workbook, in workbook order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workbook {
    /// the sheets
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    /// Create an empty workbook
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sheet
    pub fn add_sheet<S: Into<String>>(&mut self, name: S, rows: Vec<Row>) -> &mut Self {
        self.sheets.push(Sheet {
            name: name.into(),
            rows,
        });
        self
    }

    /// Look up a sheet by name
    pub fn get(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    /// Look up a sheet by name, to change it
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Sheet> {
        self.sheets.iter_mut().find(|s| s.name == name)
    }

    /// The rows of a sheet; a missing sheet has no rows
    pub fn rows(&self, name: &str) -> &[Row] {
        self.get(name).map(|s| s.rows.as_slice()).unwrap_or(&[])
    }

    /// The names of every sheet, in order
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    /// The number of data rows across every sheet
    pub fn total_rows(&self) -> usize {
        self.sheets.iter().map(|s| s.rows.len()).sum()
    }
}

/// Turn a grid of cells into rows keyed by the first row.
/// `sheet` only names the sheet in error messages.
pub fn rows_from_grid<'a, I>(sheet: &str, mut grid: I) -> Result<Vec<Row>, SheetError>
where
    I: Iterator<Item = &'a [CellValue]>,
{
    let header = match grid.next() {
        Some(h) => h,
        None => return Ok(Vec::new()),
    };
    let mut names = Vec::with_capacity(header.len());
    for (column, cell) in header.iter().enumerate() {
        let name = cell.as_text().trim().to_string();
        if cell.is_empty() || name.is_empty() {
            return Err(SheetError::UnnamedColumn {
                sheet: sheet.to_string(),
                column,
            });
        }
        names.push(name);
    }

    let rows = grid
        .filter(|cells| cells.iter().any(|c| !c.is_empty()))
        .map(|cells| {
            names
                .iter()
                .enumerate()
                .map(|(i, name)| {
                    let value = cells.get(i).cloned().unwrap_or(CellValue::Empty);
                    (name.clone(), value)
                })
                .collect()
        })
        .collect();
    Ok(rows)
}

fn range_to_rows(sheet: &str, range: &Range<Data>) -> Result<Vec<Row>, SheetError> {
    let grid: Vec<Vec<CellValue>> = range
        .rows()
        .map(|r| r.iter().map(CellValue::from).collect())
        .collect();
    rows_from_grid(sheet, grid.iter().map(Vec::as_slice))
}

fn check_exists(path: &Path) -> Result<(), SheetError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(SheetError::NotFound(path.to_path_buf()))
    }
}

/// Load the rows of the first sheet of the workbook at `path`
pub fn load_spreadsheet<P: AsRef<Path>>(path: P) -> Result<Vec<Row>, SheetError> {
    let path = path.as_ref();
    check_exists(path)?;
    let mut workbook = open_workbook_auto(path)?;
    let first = workbook
        .sheet_names()
        .into_iter()
        .next()
        .ok_or_else(|| SheetError::NoSheets(path.to_path_buf()))?;
    let range = workbook.worksheet_range(&first)?;
    let rows = range_to_rows(&first, &range)?;
    debug!("loaded {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

/// Load every sheet of the workbook at `path`
pub fn load_workbook<P: AsRef<Path>>(path: P) -> Result<Workbook, SheetError> {
    let path = path.as_ref();
    check_exists(path)?;
    let mut workbook = open_workbook_auto(path)?;
    let mut out = Workbook::new();
    for name in workbook.sheet_names() {
        let range = workbook.worksheet_range(&name)?;
        let rows = range_to_rows(&name, &range)?;
        let _ = out.add_sheet(name, rows);
    }
    debug!(
        "loaded {} sheets ({} rows) from {}",
        out.sheets.len(),
        out.total_rows(),
        path.display()
    );
    Ok(out)
}
