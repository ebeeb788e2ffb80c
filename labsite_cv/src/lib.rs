#![deny(dead_code)]
#![deny(unreachable_patterns)]
#![deny(unused_extern_crates)]
#![deny(unused_imports)]
#![deny(unused_qualifications)]
#![deny(clippy::all)]
#![deny(missing_docs)]
#![deny(missing_debug_implementations)]

//! The lab director's cv: a LaTeX source typeset to pdf with `xelatex`,
//! converted to an html page, and mined for the trainees it lists.
//!
//! The html conversion is a small hand-written transformer rather than a TeX
//! engine. It understands the subset of LaTeX the cv actually uses
//! and leaves anything else in place instead of failing.
//!
//! ```no_run
//! use labsite_cv::{build_cv, CvPaths, Xelatex};
//! let built = build_cv(&Xelatex::default(), &CvPaths::new("documents", "JRM_CV")).unwrap();
//! println!("{} byte pdf", built.pdf_bytes);
//! ```

use labsite_common::CommandError;
use labsite_sheets::SheetError;
use log::{error, info};
use std::error::Error;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
mod braces;
mod convert;
mod document;
mod lists;
mod pdf;
mod sync;
mod trainees;
pub use braces::{balanced_braces_extract, convert_command, convert_href};
pub use convert::{convert_latex_formatting, strip_comments};
pub use document::{
	extract_document_body, extract_header, extract_sections, generate_html, CvHeader, CvSection, HeaderLine,
};
pub use lists::{list_groups, parse_etaremune, render_list_items, render_section_content, ListGroup};
pub use pdf::{
	build_cv, cleanup_aux_files, compile_html, compile_pdf, validate_cv_output, CvBuild, CvPaths, LatexPass,
	PdfCompiler, Xelatex, LATEX_AUX_EXTENSIONS, MIN_PDF_BYTES, REQUIRED_SECTIONS,
};
pub use sync::{
	apply_to_workbook, compare_trainees, format_years, normalize_name, role_for_spreadsheet, sort_members,
	spreadsheet_row, sync_trainees, target_sheet, title_case, NicknameTable, SyncAction, SyncReport, CHECKED_SHEETS,
};
pub use trainees::{
	clean_latex_name, load_cv_trainees, parse_cv_trainees, parse_grad_entry, parse_postdoc_entry,
	parse_undergrad_entry, parse_year_range, CvTrainees, Trainee, TraineeCategory,
};

/// Errors building the cv or reading from it
#[derive(Debug)]
pub enum CvError {
	/// reading or writing a file
	Io(std::io::Error),
	/// the LaTeX source does not exist
	SourceNotFound(PathBuf),
	/// the typesetter failed and left no pdf
	Latex {
		/// which pass failed, counting from one
		pass: usize,
		/// the typesetter's output
		message: String,
	},
	/// the typesetter could not be run
	Command(CommandError),
	/// the typesetter claimed success but there is no pdf
	PdfMissing(PathBuf),
	/// the outputs were built but are not right
	Validation(Vec<String>),
	/// a nickname table could not be read
	Nicknames(toml::de::Error),
	/// the people workbook could not be read
	Sheet(SheetError),
	/// a report could not be serialised
	Json(serde_json::Error),
}

impl fmt::Display for CvError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			CvError::Io(e) => write!(f, "{}", e),
			CvError::SourceNotFound(p) => write!(f, "Source file not found: {}", p.display()),
			CvError::Latex { pass, message } => write!(f, "XeLaTeX pass {} failed: {}", pass, message.trim()),
			CvError::Command(e) => write!(f, "{}", e),
			CvError::PdfMissing(p) => write!(f, "PDF file not created: {}", p.display()),
			CvError::Validation(errors) => write!(f, "Validation errors: {}", errors.join("; ")),
			CvError::Nicknames(e) => write!(f, "Error reading nickname table: {}", e),
			CvError::Sheet(e) => write!(f, "{}", e),
			CvError::Json(e) => write!(f, "{}", e),
		}
	}
}

impl Error for CvError {
	fn source(&self) -> Option<&(dyn Error + 'static)> {
		match self {
			CvError::Io(e) => Some(e),
			CvError::Command(e) => Some(e),
			CvError::Nicknames(e) => Some(e),
			CvError::Sheet(e) => Some(e),
			CvError::Json(e) => Some(e),
			_ => None,
		}
	}
}

macro_rules! error_conv {
	($from:ty, $to:ident) => {
		impl From<$from> for CvError {
			fn from(src: $from) -> Self {
				CvError::$to(src)
			}
		}
	};
}

error_conv!(std::io::Error, Io);
error_conv!(CommandError, Command);
error_conv!(toml::de::Error, Nicknames);
error_conv!(SheetError, Sheet);
error_conv!(serde_json::Error, Json);

/// The name of the pdf the html page links to: the source's stem with a `.pdf` extension
fn pdf_name(input: &Path) -> String {
	let stem = input.file_stem().and_then(|s| s.to_str()).unwrap_or("cv");
	format!("{}.pdf", stem)
}

/// Convert the LaTeX cv at `input` to an html page at `output`
pub fn convert_cv_file(input: &Path, output: &Path) -> Result<(), CvError> {
	if !input.exists() {
		return Err(CvError::SourceNotFound(input.to_path_buf()));
	}
	let tex = fs::read_to_string(input)?;
	let html = generate_html(&tex, &pdf_name(input));
	if let Some(parent) = output.parent() {
		if !parent.as_os_str().is_empty() {
			fs::create_dir_all(parent)?;
		}
	}
	fs::write(output, html)?;
	info!("Converted {} to {}", input.display(), output.display());
	Ok(())
}

/// Convert the LaTeX cv at `input` to an html page at `output`,
/// logging any failure. Returns whether the page was written.
pub fn extract_cv<P: AsRef<Path>, Q: AsRef<Path>>(input: P, output: Q) -> bool {
	match convert_cv_file(input.as_ref(), output.as_ref()) {
		Ok(()) => true,
		Err(e) => {
			error!("Error converting {}: {}", input.as_ref().display(), e);
			false
		}
	}
}
