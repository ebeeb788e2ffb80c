use crate::{Page, SitePaths};
use labsite_common::is_web_url;
use labsite_sheets::{load_workbook, Row, Workbook};
use log::debug;
use std::fmt;
use std::path::Path;

static RULE: &str = "==================================================";

/// The problems found in one part of the site
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationSection {
    /// e.g. `Templates`, `Publications`
    pub name: &'static str,
    /// one message per problem
    pub errors: Vec<String>,
}

/// The outcome of checking every template and workbook
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// templates first, then each page's data
    pub sections: Vec<ValidationSection>,
}

impl ValidationReport {
    /// total number of problems
    pub fn error_count(&self) -> usize {
        self.sections.iter().map(|s| s.errors.len()).sum()
    }

    /// were there no problems at all?
    pub fn is_ok(&self) -> bool {
        self.error_count() == 0
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Validating data files...")?;
        writeln!(f, "{}", RULE)?;
        for section in self.sections.iter() {
            if section.errors.is_empty() {
                writeln!(f, "{}: OK", section.name)?;
            } else {
                writeln!(f, "\n{} errors:", section.name)?;
                for e in section.errors.iter() {
                    writeln!(f, "  - {}", e)?;
                }
            }
        }
        writeln!(f, "\n{}", RULE)?;
        if self.is_ok() {
            write!(f, "Validation completed successfully!")
        } else {
            write!(f, "Validation completed with {} error(s)", self.error_count())
        }
    }
}

/// Collects messages of the form `{workbook}/{sheet} row {n}: ...`
struct SheetChecker<'a> {
    workbook: &'static str,
    sheet: &'a str,
    errors: Vec<String>,
}

impl<'a> SheetChecker<'a> {
    fn new(workbook: &'static str, sheet: &'a str) -> Self {
        SheetChecker {
            workbook,
            sheet,
            errors: Vec::new(),
        }
    }

    fn report(&mut self, n: usize, msg: String) {
        self.errors.push(format!("{}/{} row {}: {}", self.workbook, self.sheet, n, msg));
    }

    fn require(&mut self, n: usize, row: &Row, fields: &[&str]) {
        for field in fields {
            if !row.has(field) {
                self.report(n, format!("missing {}", field));
            }
        }
    }

    fn url(&mut self, n: usize, row: &Row, field: &str, what: &str) {
        let url = row.get_str(field);
        if !url.is_empty() && !is_web_url(&url) {
            self.report(n, format!("invalid {}URL '{}'", what, url));
        }
    }

    fn file(&mut self, n: usize, row: &Row, field: &str, dir: &Path) {
        let name = row.get_str(field);
        let name = name.trim();
        if name.is_empty() {
            return;
        }
        let full = dir.join(name);
        if !full.exists() {
            self.report(n, format!("File not found: {}", full.display()));
        }
    }
}

fn check_rows<F>(workbook: &'static str, sheet: &str, rows: &[Row], mut check: F) -> Vec<String>
where
    F: FnMut(&mut SheetChecker, usize, &Row),
{
    let mut checker = SheetChecker::new(workbook, sheet);
    for (i, row) in rows.iter().enumerate() {
        check(&mut checker, i + 1, row);
    }
    checker.errors
}

/// Every page template must exist
pub fn validate_templates(paths: &SitePaths) -> Vec<String> {
    Page::ALL
        .iter()
        .map(|page| paths.template(*page))
        .filter(|p| !p.exists())
        .map(|p| format!("Missing template: {}", p.display()))
        .collect()
}

/// Every publication needs a title; title urls must be web addresses;
/// thumbnails must exist under `images/publications`
pub fn validate_publications(workbook: &Workbook, images_dir: &Path) -> Vec<String> {
    let image_dir = images_dir.join("publications");
    workbook
        .sheets
        .iter()
        .flat_map(|sheet| {
            check_rows("publications", &sheet.name, &sheet.rows, |c, n, row| {
                c.require(n, row, &["title"]);
                c.url(n, row, "title_url", "");
                c.file(n, row, "image", &image_dir);
            })
        })
        .collect()
}

/// Names everywhere; photos must exist; personal and position links must be web addresses
pub fn validate_people(workbook: &Workbook, images_dir: &Path) -> Vec<String> {
    let image_dir = images_dir.join("people");
    let mut errors = Vec::new();
    errors.extend(check_rows("people", "director", workbook.rows("director"), |c, n, row| {
        c.require(n, row, &["name"]);
        c.file(n, row, "image", &image_dir);
    }));
    errors.extend(check_rows("people", "members", workbook.rows("members"), |c, n, row| {
        c.require(n, row, &["name"]);
        c.file(n, row, "image", &image_dir);
        c.url(n, row, "name_url", "");
    }));
    for sheet in ["alumni_postdocs", "alumni_grads", "alumni_managers"] {
        errors.extend(check_rows("people", sheet, workbook.rows(sheet), |c, n, row| {
            c.require(n, row, &["name"]);
            c.url(n, row, "name_url", "");
            c.url(n, row, "current_position_url", "position ");
        }));
    }
    errors.extend(check_rows("people", "alumni_undergrads", workbook.rows("alumni_undergrads"), |c, n, row| {
        c.require(n, row, &["name"]);
    }));
    errors.extend(check_rows("people", "collaborators", workbook.rows("collaborators"), |c, n, row| {
        c.require(n, row, &["name"]);
        c.url(n, row, "url", "");
    }));
    errors
}

/// Every software item needs a name and a description
pub fn validate_software(workbook: &Workbook) -> Vec<String> {
    workbook
        .sheets
        .iter()
        .flat_map(|sheet| {
            check_rows("software", &sheet.name, &sheet.rows, |c, n, row| {
                c.require(n, row, &["name", "description"]);
            })
        })
        .collect()
}

/// News items need a title and, if dated, a `YYYY-MM-DD` date; images must exist under `images/news`
pub fn validate_news(workbook: &Workbook, images_dir: &Path) -> Vec<String> {
    let image_dir = images_dir.join("news");
    let sheet = match workbook.sheets.first() {
        Some(sheet) => sheet,
        None => return Vec::new(),
    };
    check_rows("news", &sheet.name, &sheet.rows, |c, n, row| {
        c.require(n, row, &["title"]);
        if row.has("date") && row.get("date").and_then(|d| d.as_date()).is_none() {
            c.report(n, format!("invalid date '{}'", row.get_str("date")));
        }
        c.url(n, row, "title_url", "");
        c.file(n, row, "image", &image_dir);
    })
}

fn load_for_validation(path: &Path) -> Result<Workbook, Vec<String>> {
    if !path.exists() {
        return Err(vec![format!("Missing file: {}", path.display())]);
    }
    load_workbook(path).map_err(|e| vec![format!("Error loading {}: {}", path.display(), e)])
}

/// Check every template and workbook, without building anything.
/// Missing or unreadable workbooks are reported rather than aborting.
pub fn validate_site(paths: &SitePaths) -> ValidationReport {
    let mut sections = vec![ValidationSection {
        name: "Templates",
        errors: validate_templates(paths),
    }];
    for page in Page::ALL.iter() {
        let path = paths.workbook(*page);
        debug!("validating {}", path.display());
        let errors = match load_for_validation(&path) {
            Ok(wb) => match page {
                Page::Publications => validate_publications(&wb, &paths.images_dir),
                Page::People => validate_people(&wb, &paths.images_dir),
                Page::Software => validate_software(&wb),
                Page::News => validate_news(&wb, &paths.images_dir),
            },
            Err(errors) => errors,
        };
        sections.push(ValidationSection {
            name: page.title(),
            errors,
        });
    }
    ValidationReport { sections }
}
