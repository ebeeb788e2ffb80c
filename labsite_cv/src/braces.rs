//! Scanning of brace-delimited LaTeX arguments.
//!
//! Indices are byte offsets. Braces are ascii, so they never fall inside
//! a multi-byte character and slicing at them is always valid.

/// Given that `text[start]` is `{`, return the text between it and its matching `}`,
/// along with the index just past that closing brace.
/// Returns `None` if `start` is not an opening brace or the group never closes.
///
/// ```
/// # use labsite_cv::balanced_braces_extract;
/// assert_eq!(balanced_braces_extract("{a {b} c}", 0), Some(("a {b} c", 9)));
/// assert_eq!(balanced_braces_extract("{a", 0), None);
/// ```
pub fn balanced_braces_extract(text: &str, start: usize) -> Option<(&str, usize)> {
	let bytes = text.as_bytes();
	if bytes.get(start) != Some(&b'{') {
		return None;
	}
	let mut depth = 0usize;
	for (i, b) in bytes.iter().enumerate().skip(start) {
		match b {
			b'{' => depth += 1,
			b'}' => {
				depth -= 1;
				if depth == 0 {
					return Some((&text[start + 1..i], i + 1));
				}
			}
			_ => {}
		}
	}
	None
}

/// Replace every `\cmd{arg}` with `open` + `arg` + `close`.
/// Arguments are converted recursively, so `\textbf{a \textbf{b}}` is handled;
/// an invocation whose braces never close is left as it is.
pub fn convert_command(text: &str, cmd: &str, open: &str, close: &str) -> String {
	let pattern = format!("\\{}{{", cmd);
	let mut out = String::with_capacity(text.len());
	let mut i = 0;
	while let Some(found) = text[i..].find(&pattern) {
		let pos = i + found;
		out.push_str(&text[i..pos]);
		let brace = pos + pattern.len() - 1;
		match balanced_braces_extract(text, brace) {
			Some((arg, end)) => {
				out.push_str(open);
				out.push_str(&convert_command(arg, cmd, open, close));
				out.push_str(close);
				i = end;
			}
			None => {
				out.push_str(&pattern);
				i = brace + 1;
			}
		}
	}
	out.push_str(&text[i..]);
	out
}

/// Replace every `\href{url}{text}` with a link opening in a new tab.
/// Either argument failing to close leaves the invocation as it is.
pub fn convert_href(text: &str) -> String {
	const HREF: &str = "\\href";
	let mut out = String::with_capacity(text.len());
	let mut i = 0;
	while let Some(found) = text[i..].find("\\href{") {
		let pos = i + found;
		out.push_str(&text[i..pos]);
		let url_start = pos + HREF.len();
		let link = balanced_braces_extract(text, url_start).and_then(|(url, url_end)| {
			balanced_braces_extract(text, url_end).map(|(label, end)| (url, label, end))
		});
		match link {
			Some((url, label, end)) => {
				out.push_str(&format!("<a href=\"{}\" target=\"_blank\">{}</a>", url.trim(), label));
				i = end;
			}
			None => {
				out.push_str(&text[pos..url_start + 1]);
				i = url_start + 1;
			}
		}
	}
	out.push_str(&text[i..]);
	out
}
