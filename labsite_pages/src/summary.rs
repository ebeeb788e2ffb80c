use crate::{build_page, validate_site, Page, SitePaths};
use log::{error, info};
use std::fmt;

static RULE: &str = "==================================================";

/// How building one page went
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
	/// written, with this many entries
	Ok(usize),
	/// not written
	Failed(String),
}

impl PageOutcome {
	/// How the outcome for `page` reads in a summary
	pub fn status_line(&self, page: Page) -> String {
		match self {
			PageOutcome::Ok(_) => format!("  {}: OK", page.output_file()),
			PageOutcome::Failed(msg) => format!("  {}: FAILED: {}", page.output_file(), msg),
		}
	}
}

/// The outcome of building every page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildSummary {
	/// one entry per page, in build order
	pub pages: Vec<(Page, PageOutcome)>,
}

impl BuildSummary {
	/// how many pages failed
	pub fn error_count(&self) -> usize {
		self.pages
			.iter()
			.filter(|(_, outcome)| matches!(outcome, PageOutcome::Failed(_)))
			.count()
	}

	/// did every page build?
	pub fn is_ok(&self) -> bool {
		self.error_count() == 0
	}
}

impl fmt::Display for BuildSummary {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		writeln!(f, "\n{}", RULE)?;
		writeln!(f, "Build Summary")?;
		writeln!(f, "{}", RULE)?;
		for (page, outcome) in self.pages.iter() {
			writeln!(f, "{}", outcome.status_line(*page))?;
		}
		writeln!(f, "{}", RULE)?;
		if self.is_ok() {
			write!(f, "Build completed successfully!")
		} else {
			write!(f, "Build completed with {} error(s)", self.error_count())
		}
	}
}

/// Build every page. A failure in one page does not stop the others.
pub fn build_all(paths: &SitePaths) -> BuildSummary {
	let pages = Page::ALL
		.iter()
		.map(|page| {
			let outcome = match build_page(*page, paths) {
				Ok(n) => PageOutcome::Ok(n),
				Err(e) => {
					error!("Error building {}: {}", page.output_file(), e);
					PageOutcome::Failed(e.to_string())
				}
			};
			(*page, outcome)
		})
		.collect();
	BuildSummary { pages }
}

fn step_banner(name: &str) {
	println!("\n{}", RULE);
	println!("Running {}...", name);
	println!("{}", RULE);
}

/// Validate the data and, only if that passes, rebuild every page.
/// Prints progress and a summary; returns whether everything passed.
pub fn pre_push_check(paths: &SitePaths) -> bool {
	println!("Context Lab Website Pre-Push Check");
	println!("{}", RULE);

	step_banner("validation");
	let report = validate_site(paths);
	println!("{}", report);
	let mut passed = report.is_ok();
	if !passed {
		println!("\n*** Data validation FAILED ***");
		println!("Fix validation errors before pushing.");
	}

	if passed {
		step_banner("build");
		let summary = build_all(paths);
		println!("{}", summary);
		if !summary.is_ok() {
			println!("\n*** Build FAILED ***");
			println!("Fix build errors before pushing.");
			passed = false;
		}
	} else {
		info!("skipping build, validation failed");
	}

	println!("\n{}", RULE);
	println!("Pre-Push Check Summary");
	println!("{}", RULE);
	if passed {
		println!("All checks PASSED!");
		println!("\nYou can safely push your changes.");
	} else {
		println!("Some checks FAILED!");
		println!("\nPlease fix the issues before pushing.");
	}
	passed
}

#[cfg(test)]
mod tests {
	use super::*;
	use tempfile::tempdir;

	#[test]
	fn summary_lists_every_page() {
		let summary = BuildSummary {
			pages: vec![
				(Page::Publications, PageOutcome::Ok(12)),
				(Page::News, PageOutcome::Failed("Marker '<!-- NEWS_CONTENT -->' not found".into())),
			],
		};
		assert_eq!(summary.error_count(), 1);
		assert_eq!(
			summary.to_string(),
			format!(
				"\n{0}\nBuild Summary\n{0}\n  publications.html: OK\n  news.html: FAILED: Marker '<!-- NEWS_CONTENT -->' not found\n{0}\nBuild completed with 1 error(s)",
				RULE
			)
		);
	}

	#[test]
	fn status_lines() {
		assert_eq!(PageOutcome::Ok(3).status_line(Page::People), "  people.html: OK");
		assert_eq!(
			PageOutcome::Failed("no data".into()).status_line(Page::Software),
			"  software.html: FAILED: no data"
		);
	}

	#[test]
	fn one_failure_does_not_stop_the_rest() {
		let dir = tempdir().unwrap();
		let summary = build_all(&SitePaths::new(dir.path()));
		assert_eq!(summary.pages.len(), 4);
		assert_eq!(summary.error_count(), 4);
	}

	#[test]
	fn pre_push_fails_without_data() {
		let dir = tempdir().unwrap();
		assert!(!pre_push_check(&SitePaths::new(dir.path())));
		// validation failed, so nothing was built
		assert!(!dir.path().join("people.html").exists());
	}
}
