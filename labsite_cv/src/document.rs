use crate::braces::balanced_braces_extract;
use crate::convert::{convert_latex_formatting, strip_comments};
use crate::lists::render_section_content;
use labsite_common::slugify;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
	static ref DOCUMENT: Regex = Regex::new(r"(?s)\\begin\{document\}(.+?)\\end\{document\}").unwrap();
	static ref SECTION: Regex = Regex::new(r"\\section\*?\{([^}]+)\}").unwrap();
	static ref SUBSECTION: Regex = Regex::new(r"\\subsection\*?\{([^}]+)\}").unwrap();
	static ref FIRST_SECTION: Regex = Regex::new(r"\\section\*?\{").unwrap();
	static ref LINE_BREAK: Regex = Regex::new(r"\\\\(\[[0-9.]+[a-z]*\])?").unwrap();
	static ref TAG: Regex = Regex::new(r"<[^>]+>").unwrap();
}

/// A section of the cv. Subsections never have subsections of their own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CvSection {
	/// the title as written in the source
	pub title: String,
	/// raw LaTeX before the first subsection, or the whole body
	pub content: String,
	/// in document order
	pub subsections: Vec<CvSection>,
}

impl CvSection {
	fn new(title: &str, content: &str) -> Self {
		CvSection {
			title: title.trim().to_string(),
			content: content.trim().to_string(),
			subsections: Vec::new(),
		}
	}

	/// the anchor id for this section
	pub fn id(&self) -> String {
		slugify(&self.title)
	}
}

/// One line of contact details under the name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderLine {
	/// converted html
	pub text: String,
	/// the break before this line carried extra vertical space
	pub spaced: bool,
}

/// The block above the first section
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CvHeader {
	/// from the `{\LARGE ...}` group
	pub name: Option<String>,
	/// everything after the name
	pub lines: Vec<HeaderLine>,
}

/// The text between `\begin{document}` and `\end{document}`, or everything if there are no such markers
pub fn extract_document_body(latex: &str) -> &str {
	DOCUMENT
		.captures(latex)
		.and_then(|caps| caps.get(1))
		.map(|m| m.as_str())
		.unwrap_or(latex)
}

fn skip_break(text: &str) -> (&str, bool) {
	match LINE_BREAK.captures(text) {
		Some(caps) => match caps.get(0) {
			Some(m) if m.start() == 0 => (&text[m.end()..], caps.get(1).is_some()),
			_ => (text, false),
		},
		None => (text, false),
	}
}

/// Drop braces left dangling at either end by a group which spans several lines
fn trim_unbalanced(mut part: &str) -> &str {
	let opens = |s: &str| s.matches('{').count();
	let closes = |s: &str| s.matches('}').count();
	while part.ends_with('}') && closes(part) > opens(part) {
		part = part[..part.len() - 1].trim_end();
	}
	while part.starts_with('{') && opens(part) > closes(part) {
		part = part[1..].trim_start();
	}
	part
}

fn is_stray(part: &str) -> bool {
	part.is_empty() || part == "{" || part == "}"
}

/// Find the name and contact lines before the first section.
/// A document with no sections has no header.
pub fn extract_header(body: &str) -> CvHeader {
	let header = match FIRST_SECTION.find(body) {
		Some(m) => strip_comments(&body[..m.start()]),
		None => return CvHeader::default(),
	};
	let header: &str = &header;

	let mut name = None;
	let mut rest = header;
	let mut spaced = false;
	if let Some(large) = header.find("{\\LARGE") {
		if let Some((inner, end)) = balanced_braces_extract(header, large) {
			let raw = inner.trim_start_matches("\\LARGE").trim();
			name = Some(convert_latex_formatting(raw).trim().to_string());
			let (after, was_spaced) = skip_break(&header[end..]);
			rest = after;
			spaced = was_spaced;
		}
	}

	let mut lines = Vec::new();
	let mut start = 0;
	let mut push_part = |part: &str, spaced: bool| {
		let part = trim_unbalanced(part.trim());
		if is_stray(part) {
			return;
		}
		let converted = convert_latex_formatting(part);
		let converted = converted.trim();
		if !is_stray(converted) {
			lines.push(HeaderLine {
				text: converted.to_string(),
				spaced,
			});
		}
	};
	for caps in LINE_BREAK.captures_iter(rest) {
		if let Some(m) = caps.get(0) {
			push_part(&rest[start..m.start()], spaced);
			spaced = caps.get(1).is_some();
			start = m.end();
		}
	}
	push_part(&rest[start..], spaced);

	CvHeader { name, lines }
}

/// `(title, content)` for each heading matched by `heading`, plus the text before the first one
fn split_on<'a>(text: &'a str, heading: &Regex) -> (&'a str, Vec<(&'a str, &'a str)>) {
	let mut parts = Vec::new();
	let mut preamble_end = text.len();
	let mut current: Option<(&str, usize)> = None;
	for caps in heading.captures_iter(text) {
		let (whole, title) = match (caps.get(0), caps.get(1)) {
			(Some(w), Some(t)) => (w, t),
			_ => continue,
		};
		match current {
			Some((t, from)) => parts.push((t, &text[from..whole.start()])),
			None => preamble_end = whole.start(),
		}
		current = Some((title.as_str(), whole.end()));
	}
	if let Some((t, from)) = current {
		parts.push((t, &text[from..]));
	}
	(&text[..preamble_end], parts)
}

/// Split the document body into sections, each split into subsections
pub fn extract_sections(body: &str) -> Vec<CvSection> {
	let (_, sections) = split_on(body, &SECTION);
	sections
		.into_iter()
		.map(|(title, content)| {
			let (intro, subsections) = split_on(content, &SUBSECTION);
			if subsections.is_empty() {
				CvSection::new(title, content)
			} else {
				let mut section = CvSection::new(title, intro);
				section.subsections = subsections
					.into_iter()
					.map(|(t, c)| CvSection::new(t, c))
					.collect();
				section
			}
		})
		.collect()
}

fn page_head(title: &str, pdf_name: &str) -> String {
	format!(
		r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{}</title>
    <link rel="stylesheet" href="../css/cv.css">
</head>
<body>
    <div class="cv-download-bar">
        <a href="{}" class="download-button" download>Download CV as PDF</a>
    </div>

    <div class="cv-content">
"#,
		title, pdf_name
	)
}

static PAGE_FOOT: &str = r#"        <footer class="cv-footer">
            <p>Last updated: <span id="last-updated"></span></p>
            <script>
                document.getElementById('last-updated').textContent = new Date().toLocaleDateString('en-US', {year: 'numeric', month: 'long', day: 'numeric'});
            </script>
        </footer>
    </div>
</body>
</html>
"#;

fn render_header(header: &CvHeader) -> String {
	let mut html = String::from("        <header class=\"cv-header\">\n");
	if let Some(ref name) = header.name {
		html.push_str(&format!("            <h1>{}</h1>\n", name));
	}
	if !header.lines.is_empty() {
		html.push_str("            <div class=\"contact-info\">\n");
		for line in header.lines.iter() {
			if line.spaced {
				html.push_str(&format!("                <p class=\"spaced\">{}</p>\n", line.text));
			} else {
				html.push_str(&format!("                <p>{}</p>\n", line.text));
			}
		}
		html.push_str("            </div>\n");
	}
	html.push_str("        </header>\n\n");
	html
}

fn render_section(section: &CvSection) -> String {
	let mut html = format!(
		"        <section id=\"{}\">\n            <h2>{}</h2>\n",
		section.id(),
		convert_latex_formatting(&section.title)
	);
	if section.subsections.is_empty() {
		html.push_str(&format!(
			"            {}\n",
			render_section_content(&section.content, &section.title)
		));
	} else {
		if !section.content.is_empty() {
			html.push_str(&format!(
				"            {}\n",
				render_section_content(&section.content, &section.title)
			));
		}
		for sub in section.subsections.iter() {
			html.push_str(&format!(
				"            <div class=\"subsection\" id=\"{}\">\n                <h3>{}</h3>\n",
				sub.id(),
				convert_latex_formatting(&sub.title)
			));
			html.push_str(&format!(
				"                {}\n",
				render_section_content(&sub.content, &sub.title)
			));
			html.push_str("            </div>\n");
		}
	}
	html.push_str("        </section>\n\n");
	html
}

/// The complete cv page for the LaTeX source `tex`, with a download bar linking `pdf_name`
pub fn generate_html(tex: &str, pdf_name: &str) -> String {
	let body = extract_document_body(tex);
	let header = extract_header(body);
	let sections = extract_sections(body);

	let title = match header.name {
		Some(ref name) => format!("{} - Curriculum Vitae", TAG.replace_all(name, "")),
		None => String::from("Curriculum Vitae"),
	};

	let mut html = page_head(&title, pdf_name);
	html.push_str(&render_header(&header));
	for section in sections.iter() {
		html.push_str(&render_section(section));
	}
	html.push_str(PAGE_FOOT);
	html
}
