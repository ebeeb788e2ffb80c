use crate::braces::{convert_command, convert_href};
use aho_corasick::{AhoCorasick, AhoCorasickBuilder, MatchKind};
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use std::borrow::Cow;

/// Single-argument commands and the html they become
static COMMANDS: [(&str, &str, &str); 7] = [
	("textbf", "<strong>", "</strong>"),
	("textit", "<em>", "</em>"),
	("emph", "<em>", "</em>"),
	("textsc", "<span class=\"small-caps\">", "</span>"),
	("ul", "<span class=\"underline\">", "</span>"),
	("texttt", "<code>", "</code>"),
	("textsuperscript", "<sup>", "</sup>"),
];

// an escaped dollar must not open math mode, so it is held back until math is done
const DOLLAR: &str = "\u{E002}";

// Earlier entries win where patterns overlap: `---` before `--`, ``` `` ``` before `` ` ``.
static LITERAL_TARGETS: [&str; 24] = [
	"\\&", "\\_", "\\%", "\\$", "\\#", "\\-",
	"``", "''", "`", "'",
	"---", "--", "~", "\\,",
	"\\\"{a}", "\\\"{o}", "\\\"{u}", "\\\"a", "\\\"o", "\\\"u",
	"\\'{e}", "\\'e", "\\'{a}", "\\'a",
];

static LITERAL_REPLACEMENTS: [&str; 24] = [
	"&amp;", "_", "%", DOLLAR, "#", "",
	"\u{201C}", "\u{201D}", "\u{2018}", "\u{2019}",
	"\u{2014}", "\u{2013}", " ", " ",
	"ä", "ö", "ü", "ä", "ö", "ü",
	"é", "é", "á", "á",
];

// `\&` and friends are escaped the same way inside urls; nothing else is touched there
static URL_TARGETS: [&str; 5] = ["\\&", "\\_", "\\%", "\\$", "\\#"];
static URL_REPLACEMENTS: [&str; 5] = ["&amp;", "_", "%", "$", "#"];

lazy_static! {
	static ref COMMENT: Regex = Regex::new(r"(?m)(^|[^\\])%.*$").unwrap();
	static ref OLD_BF: Regex = Regex::new(r"\{\\bf\s+([^}]+)\}").unwrap();
	static ref OLD_IT: Regex = Regex::new(r"\{\\it\s+([^}]+)\}").unwrap();
	static ref OLD_SC: Regex = Regex::new(r"\{\\sc\s+([^}]+)\}").unwrap();
	static ref SPACED_BREAK: Regex = Regex::new(r"\\\\\[[0-9.]+[a-z]*\]").unwrap();
	static ref DROPPED: Regex = Regex::new(r"\\(?:blfootnote|vspace\*?|hspace\*?)\{[^}]*\}").unwrap();
	static ref NOINDENT: Regex = Regex::new(r"\\noindent\s*").unwrap();
	static ref MATH: Regex = Regex::new(r"\$([^$]+)\$").unwrap();
	static ref SUP_MATHRM: Regex = Regex::new(r"\^\\mathrm\{([^}]+)\}").unwrap();
	static ref SUP_GROUP: Regex = Regex::new(r"\^\{([^}]+)\}").unwrap();
	static ref HREF_ATTR: Regex = Regex::new(r#"href="([^"]*)""#).unwrap();
	static ref SHIELDED: Regex = Regex::new("\u{E000}([0-9]+)\u{E001}").unwrap();
	static ref LITERALS: AhoCorasick = AhoCorasickBuilder::new()
		.match_kind(MatchKind::LeftmostFirst)
		.build(&LITERAL_TARGETS);
	static ref URL_ESCAPES: AhoCorasick = AhoCorasick::new(&URL_TARGETS);
}

fn replace<'a>(text: Cow<'a, str>, regex: &Regex, replace_func: fn(&Captures) -> String) -> Cow<'a, str> {
	match regex.replace_all(&text, replace_func) {
		Cow::Borrowed(_) => text,
		Cow::Owned(o) => Cow::Owned(o),
	}
}

fn replace_with<'a>(text: Cow<'a, str>, regex: &Regex, replacement: &str) -> Cow<'a, str> {
	match regex.replace_all(&text, replacement) {
		Cow::Borrowed(_) => text,
		Cow::Owned(o) => Cow::Owned(o),
	}
}

fn keep_prefix(caps: &Captures) -> String {
	caps[1].to_string()
}

fn strong(caps: &Captures) -> String {
	format!("<strong>{}</strong>", &caps[1])
}

fn em(caps: &Captures) -> String {
	format!("<em>{}</em>", &caps[1])
}

fn small_caps(caps: &Captures) -> String {
	format!("<span class=\"small-caps\">{}</span>", &caps[1])
}

fn math(caps: &Captures) -> String {
	format!("<span class=\"math\">{}</span>", &caps[1])
}

fn sup(caps: &Captures) -> String {
	format!("<sup>{}</sup>", &caps[1])
}

/// Remove comments: an unescaped `%` and everything after it on its line
pub fn strip_comments(text: &str) -> Cow<'_, str> {
	replace(Cow::Borrowed(text), &COMMENT, keep_prefix)
}

/// Move link targets out of the way of the text rewriting, leaving numbered placeholders
fn shield_urls(text: &str, urls: &mut Vec<String>) -> String {
	HREF_ATTR
		.replace_all(text, |caps: &Captures| {
			urls.push(URL_ESCAPES.replace_all(&caps[1], &URL_REPLACEMENTS));
			format!("href=\"\u{E000}{}\u{E001}\"", urls.len() - 1)
		})
		.into_owned()
}

fn restore_urls(text: &str, urls: &[String]) -> String {
	SHIELDED
		.replace_all(text, |caps: &Captures| {
			caps[1]
				.parse::<usize>()
				.ok()
				.and_then(|i| urls.get(i))
				.cloned()
				.unwrap_or_default()
		})
		.into_owned()
}

/// Convert a fragment of the cv's LaTeX to html.
///
/// Comments go first, then links, then the formatting commands, so that escapes
/// inside a command's argument survive; after that come literal characters,
/// line breaks, spacing commands, inline math and superscripts.
/// Anything unrecognised is left as it is.
pub fn convert_latex_formatting(text: &str) -> String {
	let text = strip_comments(text);
	let text = convert_href(&text);
	let mut urls = Vec::new();
	let mut text = shield_urls(&text, &mut urls);

	for (cmd, open, close) in COMMANDS.iter() {
		text = convert_command(&text, cmd, open, close);
	}

	let mut text = Cow::Owned(text);
	text = replace(text, &OLD_BF, strong);
	text = replace(text, &OLD_IT, em);
	text = replace(text, &OLD_SC, small_caps);

	let mut text = Cow::Owned(LITERALS.replace_all(&text, &LITERAL_REPLACEMENTS));
	text = replace_with(text, &SPACED_BREAK, "<br>\n");
	text = Cow::Owned(text.replace("\\\\", "<br>\n"));

	text = replace_with(text, &DROPPED, "");
	text = replace_with(text, &NOINDENT, "");

	text = replace(text, &MATH, math);
	text = replace(text, &SUP_MATHRM, sup);
	text = replace(text, &SUP_GROUP, sup);

	let text = text.replace(DOLLAR, "$");
	restore_urls(&text, &urls)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn formatting_commands() {
		assert_eq!(convert_latex_formatting(r"\textit{italic}"), "<em>italic</em>");
		assert_eq!(convert_latex_formatting(r"\emph{e}"), "<em>e</em>");
		assert_eq!(convert_latex_formatting(r"\textsc{Small Caps}"), r#"<span class="small-caps">Small Caps</span>"#);
		assert_eq!(convert_latex_formatting(r"\ul{me}"), r#"<span class="underline">me</span>"#);
		assert_eq!(convert_latex_formatting(r"\texttt{x}"), "<code>x</code>");
		assert_eq!(convert_latex_formatting(r"1\textsuperscript{st}"), "1<sup>st</sup>");
	}

	#[test]
	fn old_style_groups() {
		assert_eq!(convert_latex_formatting(r"{\bf Bold} and {\it it}"), "<strong>Bold</strong> and <em>it</em>");
		assert_eq!(convert_latex_formatting(r"{\sc caps}"), r#"<span class="small-caps">caps</span>"#);
	}

	#[test]
	fn special_characters() {
		assert_eq!(convert_latex_formatting(r"Smith \& Jones"), "Smith &amp; Jones");
		assert_eq!(convert_latex_formatting(r"file\_name"), "file_name");
		assert_eq!(convert_latex_formatting(r"50\% off"), "50% off");
		assert_eq!(convert_latex_formatting(r"\#1"), "#1");
		assert_eq!(convert_latex_formatting(r"hy\-phen"), "hyphen");
		assert_eq!(convert_latex_formatting(r#"M\"uller and M\"{u}ller"#), "Müller and Müller");
		assert_eq!(convert_latex_formatting(r"Ren\'e"), "René");
	}

	#[test]
	fn dashes_and_spaces() {
		assert_eq!(convert_latex_formatting("Hello---world"), "Hello\u{2014}world");
		assert_eq!(convert_latex_formatting("2020--2025"), "2020\u{2013}2025");
		assert_eq!(convert_latex_formatting(r"Dr.~Smith\,and"), "Dr. Smith and");
	}

	#[test]
	fn typographic_quotes() {
		assert_eq!(
			convert_latex_formatting("``Hello'' and `world'"),
			"\u{201C}Hello\u{201D} and \u{2018}world\u{2019}"
		);
		assert_eq!(convert_latex_formatting("Manning's"), "Manning\u{2019}s");
	}

	#[test]
	fn line_breaks() {
		assert_eq!(convert_latex_formatting(r"a\\b"), "a<br>\nb");
		assert_eq!(convert_latex_formatting(r"a\\[0.25cm]b"), "a<br>\nb");
		assert_eq!(convert_latex_formatting(r"a\\[2pt]b"), "a<br>\nb");
	}

	#[test]
	fn dropped_commands() {
		assert_eq!(
			convert_latex_formatting(r"\noindent Text\vspace{1em}\hspace{2cm}\blfootnote{note}"),
			"Text"
		);
	}

	#[test]
	fn comments() {
		assert_eq!(convert_latex_formatting("kept % dropped\n% all gone\nnext"), "kept \n\nnext");
		assert_eq!(convert_latex_formatting(r"100\% sure % but not this"), "100% sure ");
	}

	#[test]
	fn math_and_superscripts() {
		assert_eq!(convert_latex_formatting(r"$x$"), r#"<span class="math">x</span>"#);
		assert_eq!(
			convert_latex_formatting(r"$r^{2}$ and $p^\mathrm{th}$"),
			r#"<span class="math">r<sup>2</sup></span> and <span class="math">p<sup>th</sup></span>"#
		);
	}

	#[test]
	fn escaped_dollars_are_not_math() {
		assert_eq!(convert_latex_formatting(r"\$100 and \$200"), "$100 and $200");
	}

	#[test]
	fn links_survive_text_rewriting() {
		assert_eq!(
			convert_latex_formatting(r"\href{https://www.dartmouth.edu/~jrm/a--b_c}{Jeremy's page}"),
			"<a href=\"https://www.dartmouth.edu/~jrm/a--b_c\" target=\"_blank\">Jeremy\u{2019}s page</a>"
		);
		assert_eq!(
			convert_latex_formatting(r"\href{https://x.org/a\_b\#c}{x}"),
			r#"<a href="https://x.org/a_b#c" target="_blank">x</a>"#
		);
	}

	#[test]
	fn combined() {
		assert_eq!(
			convert_latex_formatting(r"\textbf{Bold} \textit{italic} \href{http://example.com}{link}"),
			r#"<strong>Bold</strong> <em>italic</em> <a href="http://example.com" target="_blank">link</a>"#
		);
	}

	#[test]
	fn unknown_commands_are_left_alone() {
		assert_eq!(convert_latex_formatting(r"\foo{bar}"), r"\foo{bar}");
	}
}
