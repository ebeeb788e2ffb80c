#![deny(dead_code)]
#![deny(unreachable_patterns)]
#![deny(unused_extern_crates)]
#![deny(unused_imports)]
#![deny(unused_qualifications)]
#![deny(clippy::all)]
#![deny(missing_docs)]
#![deny(missing_debug_implementations)]
#![deny(unused_results)]

//! A set of utilites used across the site crates.
//! Note that these may call external commands:
//! - `xelatex`, to typeset the cv (see `run_command`)
//!
//! Everything else, including rasterising svg artwork, happens in-process.

use std::borrow::Cow;
use aho_corasick::AhoCorasick;
use lazy_static::lazy_static;
mod command;
mod mimetypes;
mod svg;
pub use command::{run_command, CommandError, CommandOutput};
pub use mimetypes::{GuessMimeType, MimeType, MimeTypeHelper};
pub use svg::{load_svg, render_svg_region, svg_size, SvgError};

/// The scheme prefixes we accept as a real web address
pub static URL_SCHEMES: [&str; 2] = ["http://", "https://"];

lazy_static!{
	static ref ATTRIBUTE_FINDER: AhoCorasick = AhoCorasick::new(&ATTRIBUTE_TARGET_CHARS);
}

static ATTRIBUTE_TARGET_CHARS: [&str; 3] = [
	"\"",
	"<",
	">",
];

static ATTRIBUTE_REPLACEMENTS: [&str; 3] = [
	"&quot;",
	"&lt;",
	"&gt;",
];

/// escape `input` for use inside a double-quoted html attribute.
/// Ampersands are left alone, since spreadsheet text frequently
/// already contains entities.
pub fn escape_attribute<'a, S: Into<Cow<'a, str>>>(input: S) -> Cow<'a, str> {
	let input = input.into();
	let text: &str = &input;
	if ATTRIBUTE_FINDER.is_match(text) {
		Cow::Owned(ATTRIBUTE_FINDER.replace_all(text, &ATTRIBUTE_REPLACEMENTS))
	} else {
		input
	}
}

/// Does this look like an absolute web address?
/// Surrounding whitespace is ignored.
pub fn is_web_url(s: &str) -> bool {
	let s = s.trim();
	URL_SCHEMES.iter().any(|scheme| s.starts_with(scheme))
}

/// Lowercase `title` and collapse every run of characters other than
/// `a-z` and `0-9` into a single hyphen, trimming hyphens at either end.
/// ```
/// # use labsite_common::slugify;
/// assert_eq!(slugify("Teaching & Mentorship"), "teaching-mentorship");
/// ```
pub fn slugify(title: &str) -> String {
	let mut slug = String::with_capacity(title.len());
	let mut pending_hyphen = false;
	for c in title.chars().flat_map(char::to_lowercase) {
		if c.is_ascii_lowercase() || c.is_ascii_digit() {
			if pending_hyphen && !slug.is_empty() {
				slug.push('-');
			}
			pending_hyphen = false;
			slug.push(c);
		} else {
			pending_hyphen = true;
		}
	}
	slug
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_attribute_escapes() {
		let escapes = [
			("plain", "plain"),
			("\"quoted\"", "&quot;quoted&quot;"),
			("<b>", "&lt;b&gt;"),
			("Smith &amp; Jones", "Smith &amp; Jones"),
		];
		for (input, expected) in escapes.iter() {
			let out = escape_attribute(*input);
			assert_eq!(out, *expected);
		}
	}

	#[test]
	fn test_unescaped_attribute_is_borrowed() {
		let out = escape_attribute("nothing to do");
		assert!(matches!(out, Cow::Borrowed(_)));
	}

	#[test]
	fn test_is_web_url() {
		assert!(is_web_url("https://example.com"));
		assert!(is_web_url("  http://example.com "));
		assert!(!is_web_url("example.com"));
		assert!(!is_web_url("ftp://example.com"));
		assert!(!is_web_url(""));
	}

	#[test]
	fn test_slugify() {
		assert_eq!(slugify("Employment"), "employment");
		assert_eq!(slugify("Grants & Awards (selected)"), "grants-awards-selected");
		assert_eq!(slugify("  --Talks--  "), "talks");
		assert_eq!(slugify("Über"), "ber");
	}
}
