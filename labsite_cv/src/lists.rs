use crate::convert::convert_latex_formatting;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
	static ref ETAREMUNE: Regex = Regex::new(r"(?s)\\begin\{etaremune\}(.*?)\\end\{etaremune\}").unwrap();
	static ref ITEM: Regex = Regex::new(r"\\item\s*").unwrap();
	static ref MULTICOLS_BEGIN: Regex = Regex::new(r"\\begin\{multicols\}\{\d+\}").unwrap();
	static ref MULTICOLS_END: Regex = Regex::new(r"\\end\{multicols\}").unwrap();
	static ref LEADING_BREAK: Regex = Regex::new(r"^(?:<br>\s*)+").unwrap();
	static ref TRAILING_BREAK: Regex = Regex::new(r"(?:\s*<br>)+\s*$").unwrap();
	static ref PARAGRAPH_BREAK: Regex = Regex::new(r"\n\s*\n").unwrap();
}

/// The converted items of a reverse-numbered list body, in document order
fn list_items(body: &str) -> Vec<String> {
	ITEM.split(body)
		.map(str::trim)
		.filter(|part| !part.is_empty())
		.map(convert_latex_formatting)
		.collect()
}

/// The converted items of the first `etaremune` environment in `content`
pub fn parse_etaremune(content: &str) -> Vec<String> {
	ETAREMUNE
		.captures(content)
		.map(|caps| list_items(&caps[1]))
		.unwrap_or_default()
}

fn trim_breaks(text: &str) -> String {
	let text = LEADING_BREAK.replace(text.trim(), "");
	TRAILING_BREAK.replace(&text, "").into_owned()
}

/// An ordered list; reversed lists count down from their length to one
pub fn render_list_items(items: &[String], reversed: bool) -> String {
	if items.is_empty() {
		return String::new();
	}
	let mut html = if reversed {
		format!("<ol reversed start=\"{}\">\n", items.len())
	} else {
		String::from("<ol>\n")
	};
	for item in items {
		html.push_str(&format!("  <li>{}</li>\n", trim_breaks(item)));
	}
	html.push_str("</ol>\n");
	html
}

/// One reverse-numbered list, with the text which introduces it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListGroup {
	/// converted text between the previous list and this one, if any
	pub label: Option<String>,
	/// converted items
	pub items: Vec<String>,
	/// the list sat inside a `multicols` environment
	pub multicolumn: bool,
}

/// Split section content into its lists, each with any label before it.
/// Returns the groups and whatever text follows the last list.
pub fn list_groups(content: &str) -> (Vec<ListGroup>, &str) {
	let mut groups = Vec::new();
	let mut last = 0;
	let mut open_multicols = false;
	for caps in ETAREMUNE.captures_iter(content) {
		let (whole, body) = match (caps.get(0), caps.get(1)) {
			(Some(whole), Some(body)) => (whole, body),
			_ => continue,
		};
		let before = &content[last..whole.start()];
		if MULTICOLS_BEGIN.is_match(before) {
			open_multicols = true;
		}
		if MULTICOLS_END.is_match(before) && !MULTICOLS_BEGIN.is_match(before) {
			open_multicols = false;
		}
		let cleaned = MULTICOLS_BEGIN.replace_all(before, "");
		let cleaned = MULTICOLS_END.replace_all(&cleaned, "");
		let label = trim_breaks(&convert_latex_formatting(cleaned.trim()));
		groups.push(ListGroup {
			label: if label.is_empty() { None } else { Some(label) },
			items: list_items(body.as_str()),
			multicolumn: open_multicols,
		});
		last = whole.end();
	}
	let rest = &content[last..];
	// a trailing `\end{multicols}` belongs to the last list
	match MULTICOLS_END.find(rest) {
		Some(end) => (groups, &rest[end.end()..]),
		None => (groups, rest),
	}
}

fn wants_two_columns(text: &str) -> bool {
	let text = text.to_lowercase();
	text.contains("talks") || text.contains("undergraduate")
}

/// Plain section text as paragraphs; anything already starting with a tag is left unwrapped
fn render_paragraphs(content: &str) -> String {
	let converted = convert_latex_formatting(content);
	let mut html = String::new();
	for para in PARAGRAPH_BREAK.split(&converted) {
		let para = para.trim();
		if para.is_empty() {
			continue;
		}
		if para.starts_with('<') {
			html.push_str(para);
		} else {
			html.push_str(&format!("<p>{}</p>", para));
		}
		html.push('\n');
	}
	html
}

/// Render the body of a section or subsection.
///
/// Content with reverse-numbered lists becomes those lists, each preceded by
/// its label as `<p class="list-label">`. A multi-column list is wrapped in a
/// `two-column-list` div when the section title or its label mentions talks or
/// undergraduates. Anything else becomes paragraphs.
pub fn render_section_content(content: &str, section_title: &str) -> String {
	if !content.contains("\\begin{etaremune}") {
		return render_paragraphs(content);
	}
	let (groups, rest) = list_groups(content);
	let mut html = String::new();
	for group in groups.iter() {
		if let Some(ref label) = group.label {
			html.push_str(&format!("<p class=\"list-label\">{}</p>\n", label));
		}
		let list = render_list_items(&group.items, true);
		let title_says = wants_two_columns(section_title)
			|| group.label.as_deref().map(wants_two_columns).unwrap_or(false);
		if group.multicolumn && title_says {
			html.push_str(&format!("<div class=\"two-column-list\">{}</div>", list));
		} else {
			html.push_str(&list);
		}
	}
	html.push_str(&render_paragraphs(rest));
	html
}
