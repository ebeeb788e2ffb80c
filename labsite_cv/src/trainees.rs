//! The trainees listed in the cv's mentorship section.

use crate::CvError;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

// item names may not contain commands, apart from accents
lazy_static! {
	static ref POSTDOC_ITEM: Regex = Regex::new(r#"\\item\s+(?:[^\\]|\\["'](?:\{\w\}|\w))+\([^)]+\)"#).unwrap();
	static ref GRAD_ITEM: Regex = Regex::new(r"(?s)\\item\s+.+?\([^)]+\)").unwrap();
	static ref UNDERGRAD_ITEM: Regex = Regex::new(r#"\\item\s+(?:[^\\]|\\["'](?:\{\w\}|\w))+?\([^)]+\)"#).unwrap();
	static ref ENTRY: Regex = Regex::new(r"^\\item\s+(.+?)\s*\((.+)\)").unwrap();
	static ref MULTILINE_ENTRY: Regex = Regex::new(r"(?s)^\\item\s+(.+?)\s*\((.+)\)").unwrap();
	static ref FORMATTING: Regex = Regex::new(r"\\(?:textit|textbf|ul|emph)\{([^}]*)\}").unwrap();
	static ref ACTIVE_YEARS: Regex = Regex::new(r"(\d{4})\s*--\s*\)?$").unwrap();
	static ref YEAR_RANGE: Regex = Regex::new(r"(\d{4})\s*--?\s*(\d{4})").unwrap();
	static ref YEAR: Regex = Regex::new(r"\d{4}").unwrap();
	static ref CURRENT_POSITION: Regex = Regex::new(r"(?i)current position:\s*(.+)").unwrap();
}

const POSTDOC_START: &str = r"\textit{Postdoctoral Advisees}";
const GRAD_START: &str = r"\textit{Graduate Advisees}";
const GRAD_END: &str = r"\textit{Thesis Committees}";
const UNDERGRAD_START: &str = r"\textit{Undergraduate Advisees}";
const UNDERGRAD_END: &str = r"\section*{Service}";

/// The kind of advisee
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraineeCategory {
	/// postdoctoral researcher
	Postdoc,
	/// graduate student
	Grad,
	/// undergraduate researcher
	Undergrad,
}

impl fmt::Display for TraineeCategory {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			TraineeCategory::Postdoc => "postdoc",
			TraineeCategory::Grad => "grad",
			TraineeCategory::Undergrad => "undergrad",
		};
		f.write_str(name)
	}
}

/// One advisee as the cv lists them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trainee {
	/// name with LaTeX formatting removed
	pub name: String,
	/// which list they appear in
	pub category: TraineeCategory,
	/// e.g. `Doctoral student` or `Masters student, QBS`
	pub role: Option<String>,
	/// first year of the advisee relationship
	pub start_year: Option<i32>,
	/// last year; `None` means they are still in the lab
	pub end_year: Option<i32>,
	/// where they went afterwards
	pub current_position: Option<String>,
	/// undergraduates marked with an asterisk wrote a thesis in the lab
	pub is_thesis_student: bool,
}

impl Trainee {
	/// still in the lab?
	pub fn is_active(&self) -> bool {
		self.end_year.is_none()
	}
}

/// Every trainee in the cv, by category and in document order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CvTrainees {
	/// postdoctoral advisees
	pub postdocs: Vec<Trainee>,
	/// graduate advisees
	pub grads: Vec<Trainee>,
	/// undergraduate advisees
	pub undergrads: Vec<Trainee>,
}

impl CvTrainees {
	/// each category with the heading it is reported under
	pub fn categories(&self) -> [(&'static str, &[Trainee]); 3] {
		[
			("postdocs", self.postdocs.as_slice()),
			("grads", self.grads.as_slice()),
			("undergrads", self.undergrads.as_slice()),
		]
	}

	/// Every trainee across all categories
	pub fn iter(&self) -> impl Iterator<Item = &Trainee> {
		self.postdocs.iter().chain(self.grads.iter()).chain(self.undergrads.iter())
	}

	/// Trainees still in the lab
	pub fn active(&self) -> impl Iterator<Item = &Trainee> {
		self.iter().filter(|t| t.is_active())
	}

	/// Number of trainees parsed
	pub fn len(&self) -> usize {
		self.postdocs.len() + self.grads.len() + self.undergrads.len()
	}

	/// Were no trainees found at all?
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

impl fmt::Display for CvTrainees {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		writeln!(f, "=== CV Trainee Summary ===\n")?;
		for (heading, trainees) in self.categories().iter() {
			let active: Vec<&str> = trainees.iter().filter(|t| t.is_active()).map(|t| t.name.as_str()).collect();
			writeln!(
				f,
				"{}: {} total ({} active, {} alumni)",
				heading.to_uppercase(),
				trainees.len(),
				active.len(),
				trainees.len() - active.len()
			)?;
			if !active.is_empty() {
				writeln!(f, "  Active: {}", active.join(", "))?;
			}
			writeln!(f)?;
		}
		write!(f, "=== Active Members ===")?;
		for trainee in self.active() {
			let start = trainee.start_year.map(|y| y.to_string()).unwrap_or_default();
			write!(f, "\n  {} ({}, {} -- )", trainee.name, trainee.category, start)?;
		}
		Ok(())
	}
}

/// The text from `start` up to (not including) the next `end`, or to the end of
/// the document if there is none. Empty if `start` never appears.
fn extract_between<'a>(content: &'a str, start: &str, end: &str) -> &'a str {
	match content.find(start) {
		Some(begin) => {
			let after = begin + start.len();
			let finish = content[after..].find(end).map(|i| after + i).unwrap_or(content.len());
			&content[begin..finish]
		}
		None => "",
	}
}

/// Strip formatting, accents and a trailing thesis asterisk from a name
pub fn clean_latex_name(name: &str) -> String {
	let name = name.trim_end_matches('*');
	let name = FORMATTING.replace_all(name, "$1");
	name.replace("\\\"{a}", "a")
		.replace("\\\"{o}", "o")
		.replace("\\\"{u}", "u")
		.replace("\\'e", "e")
		.replace("\\&", "&")
		.trim()
		.to_string()
}

fn year(text: &str) -> Option<i32> {
	text.parse().ok()
}

/// Read `YYYY -- )` or `YYYY --` as a current trainee, `YYYY -- YYYY` as a range
/// and a lone `YYYY` as a single year.
pub fn parse_year_range(text: &str) -> (Option<i32>, Option<i32>) {
	let text = text.trim();

	if let Some(caps) = ACTIVE_YEARS.captures(text) {
		let after_dash = text
			.find("--")
			.map(|i| text[i + 2..].trim().trim_end_matches(')'))
			.unwrap_or("");
		if !YEAR.is_match(after_dash) {
			return (year(&caps[1]), None);
		}
	}
	if let Some(caps) = YEAR_RANGE.captures(text) {
		return (year(&caps[1]), year(&caps[2]));
	}
	match YEAR.find(text) {
		Some(m) => {
			let single = year(m.as_str());
			(single, single)
		}
		None => (None, None),
	}
}

fn current_position(part: &str) -> Option<String> {
	CURRENT_POSITION.captures(part).map(|caps| caps[1].trim().to_string())
}

/// `\item Name (YYYY -- YYYY; current position: Somewhere)`
pub fn parse_postdoc_entry(entry: &str) -> Option<Trainee> {
	let caps = ENTRY.captures(entry.trim())?;
	let mut parts = caps[2].split(';');
	let (start_year, end_year) = parse_year_range(parts.next().unwrap_or(""));
	let position = parts
		.filter(|part| part.to_lowercase().contains("current position"))
		.filter_map(current_position)
		.last();
	Some(Trainee {
		name: clean_latex_name(&caps[1]),
		category: TraineeCategory::Postdoc,
		role: Some("Postdoctoral Researcher".to_string()),
		start_year,
		end_year,
		current_position: position,
		is_thesis_student: false,
	})
}

/// `\item Name (Doctoral student; YYYY -- )`, optionally with a current position;
/// the parenthetical may run over several lines
pub fn parse_grad_entry(entry: &str) -> Option<Trainee> {
	let caps = MULTILINE_ENTRY.captures(entry.trim())?;
	let details = caps[2].replace('\n', " ");

	let mut role = None;
	let mut years = None;
	let mut position = None;
	for part in details.split(';').map(str::trim) {
		let lower = part.to_lowercase();
		if lower.contains("student") {
			role = Some(part.to_string());
		} else if lower.contains("current position") {
			if let Some(found) = current_position(part) {
				position = Some(found);
			}
		} else if YEAR.is_match(part) {
			years = Some(part);
		}
	}
	let (start_year, end_year) = years.map(parse_year_range).unwrap_or((None, None));

	Some(Trainee {
		name: clean_latex_name(&caps[1]),
		category: TraineeCategory::Grad,
		role,
		start_year,
		end_year,
		current_position: position,
		is_thesis_student: false,
	})
}

/// `\item Name (YYYY -- )`; an asterisk after the name marks a thesis student
pub fn parse_undergrad_entry(entry: &str) -> Option<Trainee> {
	let caps = ENTRY.captures(entry.trim())?;
	let raw_name = caps[1].trim();
	let (start_year, end_year) = parse_year_range(&caps[2]);
	Some(Trainee {
		name: clean_latex_name(raw_name),
		category: TraineeCategory::Undergrad,
		role: Some("Undergraduate Researcher".to_string()),
		start_year,
		end_year,
		current_position: None,
		is_thesis_student: raw_name.ends_with('*'),
	})
}

fn parse_items(section: &str, item: &Regex, parse: fn(&str) -> Option<Trainee>) -> Vec<Trainee> {
	item.find_iter(section).filter_map(|m| parse(m.as_str())).collect()
}

/// Find the postdoctoral, graduate and undergraduate advisees in the cv's source
pub fn parse_cv_trainees(tex: &str) -> CvTrainees {
	CvTrainees {
		postdocs: parse_items(extract_between(tex, POSTDOC_START, GRAD_START), &POSTDOC_ITEM, parse_postdoc_entry),
		grads: parse_items(extract_between(tex, GRAD_START, GRAD_END), &GRAD_ITEM, parse_grad_entry),
		undergrads: parse_items(
			extract_between(tex, UNDERGRAD_START, UNDERGRAD_END),
			&UNDERGRAD_ITEM,
			parse_undergrad_entry,
		),
	}
}

/// Read the cv at `path` and parse its trainees
pub fn load_cv_trainees<P: AsRef<Path>>(path: P) -> Result<CvTrainees, CvError> {
	let path = path.as_ref();
	if !path.exists() {
		return Err(CvError::SourceNotFound(path.to_path_buf()));
	}
	let tex = fs::read_to_string(path)?;
	Ok(parse_cv_trainees(&tex))
}
