use crate::{convert_cv_file, CvError};
use labsite_common::{run_command, CommandError};
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Files left behind by a LaTeX run, removed once the cv is built
pub static LATEX_AUX_EXTENSIONS: [&str; 22] = [
	".aux", ".log", ".out", ".toc", ".lof", ".lot", ".fls", ".fdb_latexmk",
	".synctex.gz", ".bbl", ".blg", ".nav", ".snm", ".vrb",
	".4ct", ".4tc", ".idv", ".lg", ".tmp", ".xdv", ".xref", ".dvi",
];

/// A pdf smaller than this is assumed to be broken
pub const MIN_PDF_BYTES: u64 = 1000;

/// Sections the generated html must mention
pub static REQUIRED_SECTIONS: [&str; 3] = ["Employment", "Education", "Publications"];

/// What happened during one pass of the typesetter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatexPass {
	/// the typesetter reported success
	pub success: bool,
	/// its diagnostic output
	pub log: String,
}

/// Something which can typeset a tex file sitting in a directory,
/// leaving the pdf beside it
pub trait PdfCompiler {
	/// Run a single pass over `tex_name` with `dir` as the working directory
	fn run_pass(&self, dir: &Path, tex_name: &str) -> Result<LatexPass, CommandError>;
}

/// Typeset with an installed `xelatex`
#[derive(Debug, Clone)]
pub struct Xelatex {
	/// the executable to call
	pub program: String,
	/// how long a single pass may run
	pub timeout: Duration,
}

impl Default for Xelatex {
	fn default() -> Self {
		Xelatex {
			program: "xelatex".to_string(),
			timeout: Duration::from_secs(120),
		}
	}
}

impl Xelatex {
	/// `xelatex` with a particular per-pass timeout
	pub fn with_timeout(timeout: Duration) -> Self {
		Xelatex {
			timeout,
			..Default::default()
		}
	}
}

impl PdfCompiler for Xelatex {
	fn run_pass(&self, dir: &Path, tex_name: &str) -> Result<LatexPass, CommandError> {
		let output = run_command(&self.program, &["-interaction=nonstopmode", tex_name], dir, self.timeout)?;
		let success = output.success();
		// xelatex reports most problems on stdout
		let log = if output.stderr.trim().is_empty() {
			output.stdout
		} else {
			output.stderr
		};
		Ok(LatexPass { success, log })
	}
}

/// Where the cv source and its outputs live
#[derive(Debug, Clone)]
pub struct CvPaths {
	/// directory holding the tex source; outputs are written beside it
	pub documents_dir: PathBuf,
	/// file stem shared by the source and its outputs
	pub stem: String,
}

impl CvPaths {
	/// The cv called `stem` inside `documents_dir`
	pub fn new<P: Into<PathBuf>, S: Into<String>>(documents_dir: P, stem: S) -> Self {
		CvPaths {
			documents_dir: documents_dir.into(),
			stem: stem.into(),
		}
	}

	fn file(&self, extension: &str) -> PathBuf {
		self.documents_dir.join(format!("{}.{}", self.stem, extension))
	}

	/// the LaTeX source
	pub fn tex(&self) -> PathBuf {
		self.file("tex")
	}

	/// the typeset pdf
	pub fn pdf(&self) -> PathBuf {
		self.file("pdf")
	}

	/// the html rendition
	pub fn html(&self) -> PathBuf {
		self.file("html")
	}
}

/// Sizes and housekeeping from a successful build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CvBuild {
	/// size of the pdf in bytes
	pub pdf_bytes: u64,
	/// size of the html in bytes
	pub html_bytes: u64,
	/// number of auxiliary files removed
	pub cleaned: usize,
}

/// Typeset the pdf, running the compiler twice so cross-references settle.
/// A failing pass is only fatal if it left no pdf behind.
pub fn compile_pdf(compiler: &dyn PdfCompiler, paths: &CvPaths) -> Result<u64, CvError> {
	let pdf = paths.pdf();
	let tex_name = format!("{}.tex", paths.stem);
	info!("Compiling {} to PDF...", tex_name);
	for pass in 1..=2 {
		let outcome = compiler.run_pass(&paths.documents_dir, &tex_name)?;
		if !outcome.success {
			warn!("XeLaTeX pass {} failed:\n{}", pass, outcome.log);
			if !pdf.exists() {
				return Err(CvError::Latex {
					pass,
					message: outcome.log,
				});
			}
		}
	}
	match fs::metadata(&pdf) {
		Ok(meta) => {
			info!("PDF generated: {} ({} bytes)", pdf.display(), meta.len());
			Ok(meta.len())
		}
		Err(_) => Err(CvError::PdfMissing(pdf)),
	}
}

/// Convert the tex source to its html page
pub fn compile_html(paths: &CvPaths) -> Result<u64, CvError> {
	let html = paths.html();
	info!("Converting {}.tex to HTML...", paths.stem);
	convert_cv_file(&paths.tex(), &html)?;
	let size = fs::metadata(&html)?.len();
	info!("HTML generated: {} ({} bytes)", html.display(), size);
	Ok(size)
}

fn is_aux_file(name: &str) -> bool {
	LATEX_AUX_EXTENSIONS.iter().any(|ext| name.ends_with(ext))
}

/// Remove auxiliary LaTeX files from `dir` (not its subdirectories),
/// returning how many went. Files which cannot be removed are logged and skipped.
pub fn cleanup_aux_files(dir: &Path) -> Result<usize, CvError> {
	let mut cleaned = 0;
	for entry in fs::read_dir(dir)? {
		let path = entry?.path();
		let is_aux = path.is_file()
			&& path
				.file_name()
				.and_then(|n| n.to_str())
				.map(is_aux_file)
				.unwrap_or(false);
		if !is_aux {
			continue;
		}
		match fs::remove_file(&path) {
			Ok(()) => cleaned += 1,
			Err(e) => warn!("Could not remove {}: {}", path.display(), e),
		}
	}
	info!("Removed {} temporary files", cleaned);
	Ok(cleaned)
}

/// Everything wrong with the built pdf and html; empty if both look right
pub fn validate_cv_output(paths: &CvPaths) -> Vec<String> {
	let mut errors = Vec::new();

	match fs::metadata(paths.pdf()) {
		Err(_) => errors.push("PDF file not found".to_string()),
		Ok(meta) if meta.len() < MIN_PDF_BYTES => {
			errors.push(format!("PDF file too small ({} bytes)", meta.len()))
		}
		Ok(_) => {}
	}

	match fs::read_to_string(paths.html()) {
		Err(_) => errors.push("HTML file not found".to_string()),
		Ok(html) => {
			for section in REQUIRED_SECTIONS.iter() {
				if !html.contains(section) {
					errors.push(format!("HTML missing section: {}", section));
				}
			}
			if !html.contains("cv-download-bar") {
				errors.push("HTML missing PDF download button".to_string());
			}
			if !html.contains("cv.css") {
				errors.push("HTML missing CSS link".to_string());
			}
		}
	}
	errors
}

/// Build both renditions of the cv, tidy up after the typesetter and check the results
pub fn build_cv(compiler: &dyn PdfCompiler, paths: &CvPaths) -> Result<CvBuild, CvError> {
	let tex = paths.tex();
	if !tex.exists() {
		return Err(CvError::SourceNotFound(tex));
	}
	let _ = compile_pdf(compiler, paths)?;
	let _ = compile_html(paths)?;
	let cleaned = cleanup_aux_files(&paths.documents_dir)?;

	let errors = validate_cv_output(paths);
	if !errors.is_empty() {
		return Err(CvError::Validation(errors));
	}
	Ok(CvBuild {
		pdf_bytes: fs::metadata(paths.pdf())?.len(),
		html_bytes: fs::metadata(paths.html())?.len(),
		cleaned,
	})
}
