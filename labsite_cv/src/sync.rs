//! Reconciling the trainees in the cv with the people workbook.
//!
//! The outcome is a report of what would need to change on either side.
//! Trainees missing from the workbook can then be appended to it, and its members sorted;
//! the cv is never rewritten.

use crate::trainees::{CvTrainees, Trainee, TraineeCategory};
use crate::CvError;
use labsite_sheets::{load_workbook, save_workbook, Row, Workbook};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs;
use std::path::Path;

static BUILTIN_NICKNAMES: &str = include_str!("nicknames.toml");

/// Sheets which never hold trainees
static IGNORED_SHEETS: [&str; 2] = ["director", "collaborators"];

/// Sheets whose people should all appear in the cv
pub static CHECKED_SHEETS: [&str; 4] = ["members", "alumni_postdocs", "alumni_grads", "alumni_undergrads"];

/// Order of roles in the members sheet; unknown roles go last
static MEMBER_ROLE_ORDER: [&str; 6] = [
	"postdoc",
	"grad student",
	"masters student",
	"lab manager",
	"research scientist",
	"undergrad",
];

const RULE: &str = "============================================================";

#[derive(Debug, Deserialize)]
struct NicknameFile {
	nicknames: BTreeMap<String, String>,
}

/// Which first names are interchangeable when matching people
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NicknameTable {
	/// nickname to the full name it stands for, both lowercase
	nicknames: BTreeMap<String, String>,
}

impl NicknameTable {
	/// Read a table from toml holding a `[nicknames]` section of `nickname = "full name"` pairs
	pub fn from_toml_str(text: &str) -> Result<Self, CvError> {
		let file: NicknameFile = toml::from_str(text)?;
		let nicknames = file
			.nicknames
			.into_iter()
			.map(|(nick, full)| (nick.trim().to_lowercase(), full.trim().to_lowercase()))
			.collect();
		Ok(NicknameTable { nicknames })
	}

	/// Read a table from a toml file
	pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CvError> {
		let text = fs::read_to_string(path)?;
		Self::from_toml_str(&text)
	}

	/// The table which ships with the crate
	pub fn builtin() -> Result<Self, CvError> {
		Self::from_toml_str(BUILTIN_NICKNAMES)
	}

	/// Number of nicknames known
	pub fn len(&self) -> usize {
		self.nicknames.len()
	}

	/// Is the table empty?
	pub fn is_empty(&self) -> bool {
		self.nicknames.is_empty()
	}

	/// Every way of writing a normalised name, swapping its first name for
	/// the full name it abbreviates, or for any nickname of it
	pub fn expand(&self, name: &str) -> BTreeSet<String> {
		let name = normalize_name(name);
		let mut variations = BTreeSet::new();
		let (first, rest) = match name.split_once(' ') {
			Some((first, rest)) => (first, Some(rest)),
			None => (name.as_str(), None),
		};
		let with_rest = |first: &str| match rest {
			Some(rest) => format!("{} {}", first, rest),
			None => first.to_string(),
		};

		if let Some(full) = self.nicknames.get(first) {
			let _ = variations.insert(with_rest(full.as_str()));
		}
		for (nick, full) in self.nicknames.iter() {
			if full == first {
				let _ = variations.insert(with_rest(nick.as_str()));
			}
		}
		let _ = variations.insert(name.clone());
		variations
	}

	/// Do two names refer to the same person, allowing for nicknames?
	pub fn names_match(&self, a: &str, b: &str) -> bool {
		let a = normalize_name(a);
		let b = normalize_name(b);
		if a == b {
			return true;
		}
		let expanded = self.expand(&a);
		self.expand(&b).iter().any(|v| expanded.contains(v))
	}
}

/// Lowercase with runs of whitespace collapsed to single spaces
pub fn normalize_name(name: &str) -> String {
	name.split_whitespace()
		.map(str::to_lowercase)
		.collect::<Vec<_>>()
		.join(" ")
}

/// Capitalise the first letter of each word, lowercasing the rest
pub fn title_case(text: &str) -> String {
	let mut out = String::with_capacity(text.len());
	let mut after_letter = false;
	for c in text.chars() {
		if after_letter {
			out.extend(c.to_lowercase());
		} else {
			out.extend(c.to_uppercase());
		}
		after_letter = c.is_alphabetic();
	}
	out
}

/// One change needed to bring the cv and the workbook into line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum SyncAction {
	/// a cv trainee is missing from the workbook
	AddToSpreadsheet {
		/// the sheet they belong in
		sheet: String,
		/// the trainee as the cv lists them
		trainee: Trainee,
	},
	/// a current trainee is still filed under alumni
	MoveInSpreadsheet {
		/// the sheet they are in
		from: String,
		/// the sheet they belong in
		to: String,
		/// the trainee as the cv lists them
		trainee: Trainee,
	},
	/// someone in the workbook is missing from the cv
	AddToCv {
		/// the sheet they were found in
		sheet: String,
		/// their name, title-cased
		name: String,
		/// their role in the workbook, if it gives one
		role: String,
	},
}

/// The workbook sheet a trainee belongs in
pub fn target_sheet(trainee: &Trainee) -> &'static str {
	if trainee.is_active() {
		return "members";
	}
	match trainee.category {
		TraineeCategory::Postdoc => "alumni_postdocs",
		TraineeCategory::Grad => "alumni_grads",
		TraineeCategory::Undergrad => "alumni_undergrads",
	}
}

/// Years as the workbook writes them: `2021-2024`, or a single year
pub fn format_years(trainee: &Trainee) -> String {
	match (trainee.start_year, trainee.end_year) {
		(None, _) => String::new(),
		(Some(start), Some(end)) if start != end => format!("{}-{}", start, end),
		(Some(start), _) => start.to_string(),
	}
}

/// The role the members sheet would give a trainee
pub fn role_for_spreadsheet(trainee: &Trainee) -> &'static str {
	match trainee.category {
		TraineeCategory::Postdoc => "postdoc",
		TraineeCategory::Grad => {
			let role = trainee.role.as_deref().unwrap_or("").to_lowercase();
			if !role.contains("doctoral") && role.contains("masters") {
				"masters student"
			} else {
				"grad student"
			}
		}
		TraineeCategory::Undergrad => "undergrad",
	}
}

/// The person a row describes: its `name` column, or failing that the first column mentioning a name
fn row_name(row: &Row) -> String {
	if row.has("name") {
		return normalize_name(&row.get_str("name"));
	}
	row.keys()
		.find(|key| key.to_lowercase().contains("name"))
		.map(|key| normalize_name(&row.get_str(key)))
		.unwrap_or_default()
}

/// Normalised names in every sheet which can hold trainees, in workbook order
fn names_by_sheet(people: &Workbook) -> Vec<(&str, BTreeSet<String>)> {
	people
		.sheets
		.iter()
		.filter(|sheet| !IGNORED_SHEETS.contains(&sheet.name.as_str()))
		.map(|sheet| {
			let names = sheet.rows.iter().map(row_name).filter(|n| !n.is_empty()).collect();
			(sheet.name.as_str(), names)
		})
		.collect()
}

/// Every difference between the cv's trainees and the people workbook
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
	/// what would have to change, cv trainees first
	pub actions: Vec<SyncAction>,
}

/// Compare the trainees in the cv with the people workbook.
///
/// A cv trainee missing from their sheet is flagged for adding, unless they are
/// filed elsewhere; being elsewhere only matters for a current trainee filed under alumni.
/// Anyone in the member or alumni sheets who matches nobody in the cv is flagged for the cv.
pub fn compare_trainees(cv: &CvTrainees, people: &Workbook, nicknames: &NicknameTable) -> SyncReport {
	let sheets = names_by_sheet(people);
	let in_sheet = |name: &str, sheet: &str| {
		sheets
			.iter()
			.filter(|(s, _)| *s == sheet)
			.any(|(_, names)| names.iter().any(|n| nicknames.names_match(name, n)))
	};
	let mut actions = Vec::new();

	for trainee in cv.iter() {
		let target = target_sheet(trainee);
		if in_sheet(&trainee.name, target) {
			continue;
		}
		let found_in = sheets
			.iter()
			.find(|(_, names)| names.iter().any(|n| nicknames.names_match(&trainee.name, n)))
			.map(|(sheet, _)| *sheet);
		match found_in {
			Some(from) if trainee.is_active() && from.starts_with("alumni") => {
				actions.push(SyncAction::MoveInSpreadsheet {
					from: from.to_string(),
					to: target.to_string(),
					trainee: trainee.clone(),
				})
			}
			// someone can rightly be in two places, e.g. a former undergraduate now a grad student
			Some(_) => {}
			None => actions.push(SyncAction::AddToSpreadsheet {
				sheet: target.to_string(),
				trainee: trainee.clone(),
			}),
		}
	}

	let cv_names: BTreeSet<String> = cv.iter().map(|t| normalize_name(&t.name)).collect();
	for sheet in CHECKED_SHEETS.iter() {
		for (_, names) in sheets.iter().filter(|(s, _)| s == sheet) {
			for name in names.iter() {
				if cv_names.iter().any(|cv_name| nicknames.names_match(name, cv_name)) {
					continue;
				}
				let role = people
					.rows(sheet)
					.iter()
					.find(|row| row_name(row) == *name)
					.map(|row| row.get_trimmed("role"))
					.unwrap_or_default();
				actions.push(SyncAction::AddToCv {
					sheet: sheet.to_string(),
					name: title_case(name),
					role,
				});
			}
		}
	}
	SyncReport { actions }
}

/// Load the cv and the people workbook from disk and compare them
pub fn sync_trainees<P: AsRef<Path>, Q: AsRef<Path>>(
	cv_path: P,
	people_path: Q,
	nicknames: &NicknameTable,
) -> Result<SyncReport, CvError> {
	let cv = crate::load_cv_trainees(cv_path)?;
	let people = load_workbook(people_path)?;
	Ok(compare_trainees(&cv, &people, nicknames))
}

/// The row to append to `sheet` for a trainee missing from it,
/// or `None` if `sheet` is not one trainees are added to.
/// Columns the cv knows nothing about, like photos and bios, are left blank.
pub fn spreadsheet_row(sheet: &str, trainee: &Trainee) -> Option<Row> {
	let years = format_years(trainee);
	let row = match sheet {
		"members" => Row::from_iter(vec![
			("image", String::new()),
			("name", trainee.name.to_lowercase()),
			("name_url", String::new()),
			("role", role_for_spreadsheet(trainee).to_string()),
			("bio", String::new()),
			("links_html", String::new()),
		]),
		"alumni_postdocs" | "alumni_grads" => {
			let years = match trainee.role {
				Some(ref role) if sheet == "alumni_grads" => format!("{}, {}", role, years),
				_ => years,
			};
			let position = trainee
				.current_position
				.as_ref()
				.map(|p| format!("now at {}", p))
				.unwrap_or_default();
			Row::from_iter(vec![
				("name", trainee.name.clone()),
				("name_url", String::new()),
				("years", years),
				("current_position", position),
				("current_position_url", String::new()),
			])
		}
		"alumni_undergrads" => Row::from_iter(vec![("name", trainee.name.clone()), ("years", years)]),
		_ => return None,
	};
	Some(row)
}

fn member_rank(row: &Row) -> usize {
	let role = row.get_trimmed("role").to_lowercase();
	MEMBER_ROLE_ORDER
		.iter()
		.position(|r| *r == role)
		.unwrap_or(MEMBER_ROLE_ORDER.len())
}

/// Order the members sheet by role, postdocs first, then by name.
/// Returns false if there is no members sheet.
pub fn sort_members(people: &mut Workbook) -> bool {
	match people.get_mut("members") {
		Some(sheet) => {
			sheet.rows.sort_by_cached_key(|row| (member_rank(row), row_name(row)));
			true
		}
		None => false,
	}
}

/// Write the report's additions into the workbook at `people_path`, sorting its
/// members afterwards if asked, and return how many rows were added.
/// The file is only rewritten if something changed.
pub fn apply_to_workbook<P: AsRef<Path>>(report: &SyncReport, people_path: P, sort: bool) -> Result<usize, CvError> {
	let people_path = people_path.as_ref();
	let mut people = load_workbook(people_path)?;
	let added = report.apply_additions(&mut people);
	if added == 0 {
		info!("No spreadsheet additions needed.");
	}
	let sorted = sort && sort_members(&mut people);
	if sort && !sorted {
		warn!("No members sheet to sort in {}", people_path.display());
	}
	if added > 0 || sorted {
		save_workbook(people_path, &people)?;
		info!("Saved changes to {}", people_path.display());
	}
	Ok(added)
}

impl SyncReport {
	/// Append a row for every trainee the workbook is missing, returning how many were added.
	/// Additions aimed at a sheet the workbook lacks are skipped with a warning.
	pub fn apply_additions(&self, people: &mut Workbook) -> usize {
		let mut added = 0;
		for action in self.actions.iter() {
			let (sheet_name, trainee) = match action {
				SyncAction::AddToSpreadsheet { sheet, trainee } => (sheet.as_str(), trainee),
				_ => continue,
			};
			let row = match spreadsheet_row(sheet_name, trainee) {
				Some(row) => row,
				None => {
					warn!("Unknown sheet type {}", sheet_name);
					continue;
				}
			};
			match people.get_mut(sheet_name) {
				Some(sheet) => {
					sheet.rows.push(row);
					added += 1;
					info!("Added {} to {}", trainee.name, sheet_name);
				}
				None => warn!("Sheet {} not found", sheet_name),
			}
		}
		added
	}

	/// Are the cv and the workbook already in agreement?
	pub fn is_in_sync(&self) -> bool {
		self.actions.is_empty()
	}

	/// Commented LaTeX listing the people the cv is missing, if there are any
	pub fn cv_additions(&self) -> Option<String> {
		let lines: Vec<String> = self
			.actions
			.iter()
			.filter_map(|action| match action {
				SyncAction::AddToCv { sheet, name, .. } => {
					Some(format!("% {}: Found in {} but not in CV", name, sheet))
				}
				_ => None,
			})
			.collect();
		if lines.is_empty() {
			None
		} else {
			Some(format!("% === People to add to CV ===\n{}", lines.join("\n")))
		}
	}

	/// The actions as a json array
	pub fn to_json(&self) -> Result<String, CvError> {
		Ok(serde_json::to_string_pretty(&self.actions)?)
	}
}

impl fmt::Display for SyncReport {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		writeln!(f, "{}\nCV <-> SPREADSHEET SYNC REPORT\n{}", RULE, RULE)?;
		if self.is_in_sync() {
			return write!(f, "\nNo sync actions needed - CV and spreadsheet are in sync!");
		}

		let mut additions: BTreeMap<&str, Vec<&Trainee>> = BTreeMap::new();
		let mut for_cv = Vec::new();
		let mut moves = Vec::new();
		for action in self.actions.iter() {
			match action {
				SyncAction::AddToSpreadsheet { sheet, trainee } => {
					additions.entry(sheet.as_str()).or_default().push(trainee)
				}
				SyncAction::AddToCv { sheet, name, .. } => for_cv.push((name, sheet)),
				SyncAction::MoveInSpreadsheet { from, to, trainee } => moves.push((&trainee.name, from, to)),
			}
		}

		if !additions.is_empty() {
			let count: usize = additions.values().map(Vec::len).sum();
			writeln!(f, "\n--- ADD TO SPREADSHEET ({} entries) ---", count)?;
			for (sheet, trainees) in additions.iter() {
				writeln!(f, "\n  [{}]", sheet)?;
				for trainee in trainees {
					let position = trainee
						.current_position
						.as_ref()
						.map(|p| format!(" -> {}", p))
						.unwrap_or_default();
					writeln!(
						f,
						"    - {} ({}, {}){}",
						trainee.name,
						role_for_spreadsheet(trainee),
						format_years(trainee),
						position
					)?;
				}
			}
		}
		if !for_cv.is_empty() {
			writeln!(f, "\n--- ADD TO CV ({} entries) ---", for_cv.len())?;
			for (name, sheet) in for_cv {
				writeln!(f, "    - {}: Found in {} but not in CV", name, sheet)?;
			}
		}
		if !moves.is_empty() {
			writeln!(f, "\n--- MOVE WITHIN SPREADSHEET ({} entries) ---", moves.len())?;
			for (name, from, to) in moves {
				writeln!(f, "    - {}: Move from {} to {}", name, from, to)?;
			}
		}
		write!(f, "\n{}", RULE)
	}
}
