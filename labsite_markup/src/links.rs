//! Parsing of the small link mini-languages used in the spreadsheets, and
//! resolution of repository-relative paths to public urls.

/// Default prefix for bare filenames in publication and software sheets
pub const PDF_BASE_PATH: &str = "data/pdfs";
/// Default prefix for bare filenames in the people sheets
pub const DOCUMENTS_BASE_PATH: &str = "documents";

/// A labelled link, as written in a spreadsheet cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkSpec {
	/// the visible text of the link
	pub label: String,
	/// a full url, or a path relative to the site repository
	pub url: String,
}

impl LinkSpec {
	/// Create a new link
	pub fn new<L: Into<String>, U: Into<String>>(label: L, url: U) -> Self {
		LinkSpec {
			label: label.into(),
			url: url.into(),
		}
	}
}

/// Parse `Label:URL;Label2:URL2`.
///
/// Entries are split on the first colon, so urls may contain colons;
/// entries without any colon are ignored.
///
/// ```
/// # use labsite_markup::{parse_extra_links, LinkSpec};
/// let links = parse_extra_links("Slides:https://x.org/s; Video:https://y.org/v");
/// assert_eq!(links, vec![
///     LinkSpec::new("Slides", "https://x.org/s"),
///     LinkSpec::new("Video", "https://y.org/v"),
/// ]);
/// ```
pub fn parse_extra_links(src: &str) -> Vec<LinkSpec> {
	src.split(';')
		.filter_map(|part| part.split_once(':'))
		.map(|(label, url)| LinkSpec::new(label.trim(), url.trim()))
		.collect()
}

/// Parse `Label:URL, "Quoted, Label":URL`.
///
/// Entries are separated by commas and a url runs to the next comma.
/// A label in double quotes may itself contain commas and colons.
/// An unterminated quote, or an unquoted label with no colon, ends parsing;
/// whatever was parsed before it is kept.
pub fn parse_labeled_links(src: &str) -> Vec<LinkSpec> {
	let mut links = Vec::new();
	let mut remaining = src.trim();
	loop {
		remaining = remaining.trim_start_matches(|c| c == ' ' || c == ',');
		if remaining.is_empty() {
			break;
		}

		let (label, rest) = if let Some(quoted) = remaining.strip_prefix('"') {
			let end = match quoted.find('"') {
				Some(end) => end,
				None => break,
			};
			let rest = quoted[end + 1..].trim_start();
			(&quoted[..end], rest.strip_prefix(':').unwrap_or(rest))
		} else {
			match remaining.split_once(':') {
				Some((label, rest)) => (label.trim(), rest),
				None => break,
			}
		};

		let (url, next) = match rest.split_once(',') {
			Some((url, next)) => (url, next),
			None => (rest, ""),
		};
		links.push(LinkSpec::new(label, url.trim()));
		remaining = next;
	}
	links
}

/// Turns spreadsheet links into public urls.
///
/// Full `http(s)` urls are used unchanged. Anything else is a path in the
/// site repository: html pages are served from the site itself, while other
/// files link to their page in the repository browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkResolver {
	/// root of the published site
	pub site_url: String,
	/// root of the repository's file browser
	pub repo_blob_url: String,
}

impl Default for LinkResolver {
	fn default() -> Self {
		LinkResolver {
			site_url: "https://contextlab.github.io".to_string(),
			repo_blob_url: "https://github.com/ContextLab/contextlab.github.io/blob/main".to_string(),
		}
	}
}

impl LinkResolver {
	/// Create a resolver for a site and its repository
	pub fn new<S: Into<String>, R: Into<String>>(site_url: S, repo_blob_url: R) -> Self {
		LinkResolver {
			site_url: site_url.into(),
			repo_blob_url: repo_blob_url.into(),
		}
	}

	/// Resolve a single link. A bare filename (no `/`) is taken to live under `base_path`.
	///
	/// ```
	/// # use labsite_markup::LinkResolver;
	/// let r = LinkResolver::default();
	/// assert_eq!(r.resolve("paper.pdf", "data/pdfs"),
	///     "https://github.com/ContextLab/contextlab.github.io/blob/main/data/pdfs/paper.pdf");
	/// assert_eq!(r.resolve("/demos/viz.html", "data/pdfs"),
	///     "https://contextlab.github.io/demos/viz.html");
	/// ```
	pub fn resolve(&self, link: &str, base_path: &str) -> String {
		let link = link.trim();
		if link.is_empty() {
			return String::new();
		}
		if link.starts_with("http://") || link.starts_with("https://") {
			return link.to_string();
		}

		let link = link.trim_start_matches('/');
		let full_path = if link.contains('/') {
			link.to_string()
		} else {
			format!("{}/{}", base_path, link)
		};

		let root = if full_path.ends_with(".html") {
			&self.site_url
		} else {
			&self.repo_blob_url
		};
		format!("{}/{}", root.trim_end_matches('/'), full_path)
	}

	/// Render links as `[<a href="URL" target="_blank">LABEL</a>]`, separated by single spaces.
	/// Links with an empty url are left out.
	pub fn build_links_html(&self, links: &[LinkSpec], base_path: &str) -> String {
		links
			.iter()
			.filter(|l| !l.url.trim().is_empty())
			.map(|l| {
				format!(
					r#"[<a href="{}" target="_blank">{}</a>]"#,
					self.resolve(&l.url, base_path),
					l.label
				)
			})
			.collect::<Vec<_>>()
			.join(" ")
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn extra_links_split_on_first_colon() {
		let links = parse_extra_links("Preprint:https://arxiv.org/abs/1;Broken;  Talk : talk.pdf ");
		assert_eq!(
			links,
			vec![
				LinkSpec::new("Preprint", "https://arxiv.org/abs/1"),
				LinkSpec::new("Talk", "talk.pdf"),
			]
		);
		assert!(parse_extra_links("").is_empty());
	}

	#[test]
	fn labeled_links_plain() {
		let links = parse_labeled_links("CV:JRM_CV.pdf, Website:https://x.org");
		assert_eq!(
			links,
			vec![
				LinkSpec::new("CV", "JRM_CV.pdf"),
				LinkSpec::new("Website", "https://x.org"),
			]
		);
	}

	#[test]
	fn labeled_links_quoted_labels_may_hold_commas_and_colons() {
		let links = parse_labeled_links(r#""Google Scholar":https://scholar.google.com, "Talks, etc: 2020":talks.html"#);
		assert_eq!(
			links,
			vec![
				LinkSpec::new("Google Scholar", "https://scholar.google.com"),
				LinkSpec::new("Talks, etc: 2020", "talks.html"),
			]
		);
	}

	#[test]
	fn labeled_links_stop_at_malformed_entries() {
		assert_eq!(
			parse_labeled_links(r#"A:a.pdf, "Unterminated:b.pdf"#),
			vec![LinkSpec::new("A", "a.pdf")]
		);
		assert_eq!(
			parse_labeled_links("A:a.pdf, trailing words"),
			vec![LinkSpec::new("A", "a.pdf")]
		);
		// an unquoted label runs to the next colon, commas and all
		assert_eq!(
			parse_labeled_links("stray, B:b.pdf"),
			vec![LinkSpec::new("stray, B", "b.pdf")]
		);
		assert!(parse_labeled_links("  ").is_empty());
	}

	#[test]
	fn resolve_urls_unchanged() {
		let r = LinkResolver::default();
		assert_eq!(r.resolve("http://a.org/x_y", PDF_BASE_PATH), "http://a.org/x_y");
		assert_eq!(r.resolve("  https://a.org ", PDF_BASE_PATH), "https://a.org");
		assert_eq!(r.resolve("", PDF_BASE_PATH), "");
	}

	#[test]
	fn resolve_local_paths() {
		let r = LinkResolver::default();
		assert_eq!(
			r.resolve("cv.pdf", DOCUMENTS_BASE_PATH),
			"https://github.com/ContextLab/contextlab.github.io/blob/main/documents/cv.pdf"
		);
		assert_eq!(
			r.resolve("/data/slides/a.pdf", PDF_BASE_PATH),
			"https://github.com/ContextLab/contextlab.github.io/blob/main/data/slides/a.pdf"
		);
		assert_eq!(
			r.resolve("poster.html", PDF_BASE_PATH),
			"https://contextlab.github.io/data/pdfs/poster.html"
		);
	}

	#[test]
	fn custom_roots() {
		let r = LinkResolver::new("https://lab.example/", "https://git.example/blob/main");
		assert_eq!(r.resolve("a.html", "docs"), "https://lab.example/docs/a.html");
		assert_eq!(r.resolve("a.pdf", "docs"), "https://git.example/blob/main/docs/a.pdf");
	}

	#[test]
	fn links_html() {
		let r = LinkResolver::default();
		let links = vec![
			LinkSpec::new("PDF", "paper.pdf"),
			LinkSpec::new("CODE", ""),
			LinkSpec::new("DATA", "https://osf.io/x"),
		];
		assert_eq!(
			r.build_links_html(&links, PDF_BASE_PATH),
			concat!(
				r#"[<a href="https://github.com/ContextLab/contextlab.github.io/blob/main/data/pdfs/paper.pdf" target="_blank">PDF</a>] "#,
				r#"[<a href="https://osf.io/x" target="_blank">DATA</a>]"#
			)
		);
		assert_eq!(r.build_links_html(&[], PDF_BASE_PATH), "");
	}
}
