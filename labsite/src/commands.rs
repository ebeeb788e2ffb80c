//! One function per subcommand. Each prints its report to stdout and
//! returns [`Failed`] when the work ran but did not pass.

use crate::Site;
use labsite_borders::add_borders;
use labsite_cv::{apply_to_workbook, load_cv_trainees, CvError};
use labsite_pages::{build_all, build_page, pre_push_check, validate_site, Page, PageOutcome};
use log::info;
use std::error::Error;
use std::fmt;
use std::path::PathBuf;

const BANNER: &str = "============================================================";

/// A command ran to completion but what it checked or built did not pass.
/// The details have already been printed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failed(pub String);

impl fmt::Display for Failed {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl Error for Failed {}

fn failed<S: Into<String>>(msg: S) -> Box<dyn Error> {
	Box::new(Failed(msg.into()))
}

/// Build one page, or all of them with a summary
pub fn build(site: &Site, page: Option<Page>) -> Result<(), Box<dyn Error>> {
	let paths = site.site_paths();
	match page {
		Some(page) => match build_page(page, &paths) {
			Ok(count) => {
				println!("{}", PageOutcome::Ok(count).status_line(page));
				Ok(())
			}
			Err(e) => {
				println!("{}", PageOutcome::Failed(e.to_string()).status_line(page));
				Err(e.into())
			}
		},
		None => {
			let summary = build_all(&paths);
			println!("{}", summary);
			if summary.is_ok() {
				Ok(())
			} else {
				Err(failed(format!("{} page(s) failed to build", summary.error_count())))
			}
		}
	}
}

/// Typeset the cv, convert it to html and check both
pub fn build_cv(site: &Site) -> Result<(), Box<dyn Error>> {
	println!("{}", BANNER);
	println!("Building CV from LaTeX source");
	println!("{}", BANNER);

	let paths = site.cv_paths();
	match labsite_cv::build_cv(&site.xelatex(), &paths) {
		Ok(built) => {
			println!("Validation passed!");
			println!("  PDF: {} ({} bytes)", paths.pdf().display(), built.pdf_bytes);
			println!("  HTML: {} ({} bytes)", paths.html().display(), built.html_bytes);
			println!("\n{}", BANNER);
			println!("CV build completed successfully!");
			println!("{}", BANNER);
			Ok(())
		}
		Err(CvError::Validation(errors)) => {
			println!("Validation errors:");
			for e in errors.iter() {
				println!("  - {}", e);
			}
			Err(failed("CV output failed validation"))
		}
		Err(e) => Err(e.into()),
	}
}

/// Convert the cv to html only, without typesetting it.
/// `input` and `output` default to the configured cv source and page.
pub fn extract_cv(
	site: &Site,
	input: Option<PathBuf>,
	output: Option<PathBuf>,
) -> Result<(), Box<dyn Error>> {
	let paths = site.cv_paths();
	let input = input.unwrap_or_else(|| paths.tex());
	let output = output.unwrap_or_else(|| paths.html());
	if labsite_cv::extract_cv(&input, &output) {
		println!("Successfully converted {} to {}", input.display(), output.display());
		Ok(())
	} else {
		Err(failed(format!("Could not convert {}", input.display())))
	}
}

/// Check the templates and workbooks without building anything
pub fn validate(site: &Site) -> Result<(), Box<dyn Error>> {
	let report = validate_site(&site.site_paths());
	println!("{}", report);
	if report.is_ok() {
		Ok(())
	} else {
		Err(failed(format!("{} validation error(s)", report.error_count())))
	}
}

/// Validate, then build everything, as a gate before pushing
pub fn pre_push(site: &Site) -> Result<(), Box<dyn Error>> {
	if pre_push_check(&site.site_paths()) {
		Ok(())
	} else {
		Err(failed("pre-push checks failed"))
	}
}

/// How to run the bordering utility from the command line
#[derive(Debug, Clone, Default)]
pub struct BorderArgs {
	/// image files, or directories of them
	pub inputs: Vec<PathBuf>,
	/// where framed images go
	pub output_dir: PathBuf,
	/// artwork to use instead of the configured one
	pub border_svg: Option<PathBuf>,
	/// side of each finished image, if not the default
	pub output_size: Option<u32>,
	/// centre crops on a detected face
	pub face: bool,
	/// fixes the choice of borders
	pub seed: Option<u64>,
}

/// Frame images with the site's hand-drawn borders
pub fn borders(site: &Site, args: BorderArgs) -> Result<(), Box<dyn Error>> {
	let mut options = site.border_options(args.inputs, args.output_dir);
	if let Some(svg) = args.border_svg {
		options.border_svg = svg;
	}
	if let Some(size) = args.output_size {
		options.output_size = size;
	}
	options.face = args.face;
	options.seed = args.seed;
	let written = add_borders(&options)?;
	info!("wrote {} image(s) to {}", written.len(), options.output_dir.display());
	Ok(())
}

/// Print the trainees listed in the cv
pub fn trainees(site: &Site) -> Result<(), Box<dyn Error>> {
	let trainees = load_cv_trainees(site.cv_paths().tex())?;
	println!("{}", trainees);
	Ok(())
}

/// How to run the trainee sync from the command line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncArgs {
	/// print the actions as json instead of a report
	pub json: bool,
	/// append missing trainees to the people workbook
	pub apply: bool,
	/// also order the members sheet by role; only with `apply`
	pub sort: bool,
}

/// Report the differences between the cv's trainees and the people workbook,
/// adding missing trainees to the workbook if asked. The cv is never changed.
pub fn sync_trainees(site: &Site, args: SyncArgs) -> Result<(), Box<dyn Error>> {
	let nicknames = site.nicknames()?;
	let people = site.people_workbook();
	let report = labsite_cv::sync_trainees(site.cv_paths().tex(), &people, &nicknames)?;
	if args.json {
		println!("{}", report.to_json()?);
	} else {
		println!("{}", report);
	}
	if args.apply {
		let added = apply_to_workbook(&report, &people, args.sort)?;
		info!("added {} trainee(s) to {}", added, people.display());
	} else if !args.json {
		println!("\nRun with --apply to make changes");
	}
	if !args.json {
		if let Some(additions) = report.cv_additions() {
			println!("\n{}", additions);
		}
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::SiteConfig;
	use tempfile::tempdir;

	#[test]
	fn failures_read_plainly() {
		assert_eq!(failed("2 page(s) failed to build").to_string(), "2 page(s) failed to build");
	}

	#[test]
	fn missing_cv() {
		let dir = tempdir().unwrap();
		let site = Site::new(dir.path(), SiteConfig::default());
		assert!(trainees(&site).is_err());
		assert!(extract_cv(&site, None, None).is_err());
		assert!(build_cv(&site).is_err());
	}

	#[test]
	fn empty_site_does_not_validate() {
		let dir = tempdir().unwrap();
		let site = Site::new(dir.path(), SiteConfig::default());
		let err = validate(&site).unwrap_err();
		assert!(err.downcast_ref::<Failed>().is_some());
		assert!(build(&site, None).is_err());
		assert!(build(&site, Some(Page::News)).is_err());
	}
}
