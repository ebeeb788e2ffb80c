#![deny(dead_code)]
#![deny(unreachable_patterns)]
#![deny(unused_extern_crates)]
#![deny(unused_imports)]
#![deny(unused_qualifications)]
#![deny(clippy::all)]
#![deny(missing_docs)]
#![deny(missing_debug_implementations)]

//! Build the generated pages of the lab site.
//!
//! Each page has a workbook under `data/`, a template under `templates/` and an
//! output in the site root. A builder turns the workbook into one html fragment
//! per `<!-- MARKER -->` in the template, and `inject_content` writes the filled-in page.
//!
//! ```no_run
//! use labsite_pages::{build_all, SitePaths};
//! let summary = build_all(&SitePaths::new("."));
//! println!("{}", summary);
//! ```

use labsite_markup::LinkResolver;
use labsite_sheets::{load_spreadsheet, load_workbook, SheetError};
use log::info;
use std::error::Error;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
mod inject;
mod news;
mod people;
mod publications;
mod software;
mod summary;
mod validate;
pub use inject::{fill_template, inject_content, marker_comment, InjectError, Replacements};
pub use news::{news_item, news_replacements, sort_news};
pub use people::{
	alumni_entry, collaborator_entry, director_block, linked_position, member_card,
	members_content, people_replacements, undergrad_entry, CARDS_PER_GRID,
};
pub use publications::{
	publication_card, publication_section, publications_replacements, PublicationKind,
	PUBLICATION_SECTIONS,
};
pub use software::{software_item, software_links, software_replacements, SOFTWARE_SECTIONS};
pub use summary::{build_all, pre_push_check, BuildSummary, PageOutcome};
pub use validate::{
	validate_news, validate_people, validate_publications, validate_site, validate_software,
	validate_templates, ValidationReport, ValidationSection,
};

/// `<a href="url" target="_blank">text</a>`, with neither part escaped
pub(crate) fn external_link(url: &str, text: &str) -> String {
	format!("<a href=\"{}\" target=\"_blank\">{}</a>", url, text)
}

/// The generated pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
	/// papers, chapters, talks and so on
	Publications,
	/// the director, members, alumni and collaborators
	People,
	/// the lab's software packages
	Software,
	/// lab news, newest first
	News,
}

impl Page {
	/// Every page, in build order
	pub const ALL: [Page; 4] = [Page::Publications, Page::People, Page::Software, Page::News];

	/// The stem shared by the workbook, template and output
	pub fn name(self) -> &'static str {
		match self {
			Page::Publications => "publications",
			Page::People => "people",
			Page::Software => "software",
			Page::News => "news",
		}
	}

	/// Capitalised name, for reports
	pub fn title(self) -> &'static str {
		match self {
			Page::Publications => "Publications",
			Page::People => "People",
			Page::Software => "Software",
			Page::News => "News",
		}
	}

	/// what the page counts, in `Generated ... with N {unit}`
	fn unit(self) -> &'static str {
		match self {
			Page::Publications => "publications",
			Page::People => "people entries",
			Page::Software => "software items",
			Page::News => "news items",
		}
	}

	/// e.g. `publications.html`
	pub fn output_file(self) -> String {
		format!("{}.html", self.name())
	}
}

impl fmt::Display for Page {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.name())
	}
}

/// A page name which is not one of ours
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPage(pub String);

impl fmt::Display for UnknownPage {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"Unknown page '{}'; expected one of publications, people, software, news",
			self.0
		)
	}
}

impl Error for UnknownPage {}

impl FromStr for Page {
	type Err = UnknownPage;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let wanted = s.trim().trim_end_matches(".html").to_lowercase();
		Page::ALL
			.iter()
			.copied()
			.find(|p| p.name() == wanted)
			.ok_or_else(|| UnknownPage(s.to_string()))
	}
}

/// Where the site's inputs and outputs live
#[derive(Debug, Clone)]
pub struct SitePaths {
	/// workbooks, `{page}.xlsx`
	pub data_dir: PathBuf,
	/// templates, `{page}.html`
	pub templates_dir: PathBuf,
	/// where generated pages are written
	pub output_dir: PathBuf,
	/// thumbnails and photos, checked during validation
	pub images_dir: PathBuf,
	/// how relative links in the data become urls
	pub resolver: LinkResolver,
}

impl SitePaths {
	/// The standard layout below `root`: `data/`, `templates/`, `images/`, pages in `root` itself
	pub fn new<P: AsRef<Path>>(root: P) -> Self {
		let root = root.as_ref();
		SitePaths {
			data_dir: root.join("data"),
			templates_dir: root.join("templates"),
			output_dir: root.to_path_buf(),
			images_dir: root.join("images"),
			resolver: LinkResolver::default(),
		}
	}

	/// the workbook feeding `page`
	pub fn workbook(&self, page: Page) -> PathBuf {
		self.data_dir.join(format!("{}.xlsx", page.name()))
	}

	/// the template for `page`
	pub fn template(&self, page: Page) -> PathBuf {
		self.templates_dir.join(page.output_file())
	}

	/// where `page` is written
	pub fn output(&self, page: Page) -> PathBuf {
		self.output_dir.join(page.output_file())
	}
}

/// Errors building a single page
#[derive(Debug)]
pub enum BuildError {
	/// the workbook could not be loaded
	Sheet(SheetError),
	/// the template could not be filled in or written
	Inject(InjectError),
}

impl fmt::Display for BuildError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			BuildError::Sheet(e) => write!(f, "{}", e),
			BuildError::Inject(e) => write!(f, "{}", e),
		}
	}
}

impl Error for BuildError {
	fn source(&self) -> Option<&(dyn Error + 'static)> {
		match self {
			BuildError::Sheet(e) => Some(e),
			BuildError::Inject(e) => Some(e),
		}
	}
}

macro_rules! error_conv {
	($from:ty, $to:ident) => {
		impl From<$from> for BuildError {
			fn from(src: $from) -> Self {
				BuildError::$to(src)
			}
		}
	};
}

error_conv!(SheetError, Sheet);
error_conv!(InjectError, Inject);

/// Build one page, returning how many entries it holds.
/// Nothing is written unless every marker could be filled.
pub fn build_page(page: Page, paths: &SitePaths) -> Result<usize, BuildError> {
	let data = paths.workbook(page);
	info!("Building {} from {}", page.output_file(), data.display());
	let (replacements, count) = match page {
		Page::Publications => {
			let wb = load_workbook(&data)?;
			let count: usize = PUBLICATION_SECTIONS.iter().map(|(sheet, _, _)| wb.rows(sheet).len()).sum();
			(publications_replacements(&wb, &paths.resolver), count)
		}
		Page::People => {
			let wb = load_workbook(&data)?;
			let reps = people_replacements(&wb, &paths.resolver);
			let director = wb.rows("director").len().min(1);
			let others: usize = [
				"members",
				"alumni_postdocs",
				"alumni_grads",
				"alumni_managers",
				"alumni_undergrads",
				"collaborators",
			]
			.iter()
			.map(|sheet| wb.rows(sheet).len())
			.sum();
			(reps, director + others)
		}
		Page::Software => {
			let wb = load_workbook(&data)?;
			let count: usize = SOFTWARE_SECTIONS.iter().map(|(sheet, _)| wb.rows(sheet).len()).sum();
			(software_replacements(&wb, &paths.resolver), count)
		}
		Page::News => {
			let rows = load_spreadsheet(&data)?;
			(news_replacements(&rows), rows.len())
		}
	};
	let output = paths.output(page);
	inject_content(paths.template(page), &output, &replacements)?;
	println!("Generated {} with {} {}", output.display(), count, page.unit());
	Ok(count)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn page_names_parse() {
		assert_eq!("people".parse::<Page>(), Ok(Page::People));
		assert_eq!("News".parse::<Page>(), Ok(Page::News));
		assert_eq!("software.html".parse::<Page>(), Ok(Page::Software));
		assert!("blog".parse::<Page>().is_err());
	}

	#[test]
	fn standard_layout() {
		let paths = SitePaths::new("/site");
		assert_eq!(paths.workbook(Page::News), PathBuf::from("/site/data/news.xlsx"));
		assert_eq!(paths.template(Page::People), PathBuf::from("/site/templates/people.html"));
		assert_eq!(paths.output(Page::Software), PathBuf::from("/site/software.html"));
	}

	#[test]
	fn external_links_are_not_escaped() {
		assert_eq!(
			external_link("https://x?a=1&b=2", "<em>t</em>"),
			r#"<a href="https://x?a=1&b=2" target="_blank"><em>t</em></a>"#
		);
	}
}
