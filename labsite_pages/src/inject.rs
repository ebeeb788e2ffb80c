use aho_corasick::AhoCorasick;
use log::debug;
use std::error::Error;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Generated html for each marker in a template, in the order the builder produced them
pub type Replacements = Vec<(&'static str, String)>;

/// Errors filling in a template
#[derive(Debug)]
pub enum InjectError {
	/// the template could not be read
	ReadTemplate {
		/// the template
		path: PathBuf,
		/// the underlying error
		source: std::io::Error,
	},
	/// the filled-in page could not be written
	WriteOutput {
		/// the output page
		path: PathBuf,
		/// the underlying error
		source: std::io::Error,
	},
	/// the template does not contain `<!-- marker -->`
	MissingMarker {
		/// the marker name, without comment delimiters
		marker: String,
		/// the template
		template: PathBuf,
	},
}

impl fmt::Display for InjectError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			InjectError::ReadTemplate { path, source } => {
				write!(f, "Error reading template {}: {}", path.display(), source)
			}
			InjectError::WriteOutput { path, source } => {
				write!(f, "Error writing {}: {}", path.display(), source)
			}
			InjectError::MissingMarker { marker, template } => write!(
				f,
				"Marker '{}' not found in template {}",
				marker_comment(marker),
				template.display()
			),
		}
	}
}

impl Error for InjectError {
	fn source(&self) -> Option<&(dyn Error + 'static)> {
		match self {
			InjectError::ReadTemplate { source, .. } => Some(source),
			InjectError::WriteOutput { source, .. } => Some(source),
			InjectError::MissingMarker { .. } => None,
		}
	}
}

/// The literal comment that stands in for `marker` in a template
pub fn marker_comment(marker: &str) -> String {
	format!("<!-- {} -->", marker)
}

/// Replace every marker comment in `template` with its html.
///
/// Every marker must be present; if one is missing, nothing is substituted.
/// Each occurrence of a marker is replaced, and the inserted html is never
/// itself searched for markers.
pub fn fill_template(
	template: &str,
	replacements: &[(&str, String)],
	template_path: &Path,
) -> Result<String, InjectError> {
	let patterns: Vec<String> = replacements.iter().map(|(m, _)| marker_comment(m)).collect();
	for ((marker, _), pattern) in replacements.iter().zip(patterns.iter()) {
		if !template.contains(pattern.as_str()) {
			return Err(InjectError::MissingMarker {
				marker: marker.to_string(),
				template: template_path.to_path_buf(),
			});
		}
	}
	if patterns.is_empty() {
		return Ok(template.to_string());
	}
	let finder = AhoCorasick::new(&patterns);
	let html: Vec<&str> = replacements.iter().map(|(_, h)| h.as_str()).collect();
	Ok(finder.replace_all(template, &html))
}

/// Read `template`, fill in every marker, and write the result to `output`.
/// No output is written unless every marker is found.
pub fn inject_content<P: AsRef<Path>, Q: AsRef<Path>>(
	template: P,
	output: Q,
	replacements: &[(&str, String)],
) -> Result<(), InjectError> {
	let template = template.as_ref();
	let output = output.as_ref();
	let src = fs::read_to_string(template).map_err(|source| InjectError::ReadTemplate {
		path: template.to_path_buf(),
		source,
	})?;
	let filled = fill_template(&src, replacements, template)?;
	fs::write(output, filled).map_err(|source| InjectError::WriteOutput {
		path: output.to_path_buf(),
		source,
	})?;
	debug!(
		"filled {} markers from {} into {}",
		replacements.len(),
		template.display(),
		output.display()
	);
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use tempfile::tempdir;

	#[test]
	fn markers_are_replaced_verbatim() {
		let template = "<main>\n  <!-- A -->\n</main>\n<footer><!-- B --></footer>";
		let out = fill_template(
			template,
			&[("A", "<p>a & b</p>".to_string()), ("B", String::new())],
			Path::new("t.html"),
		)
		.unwrap();
		assert_eq!(out, "<main>\n  <p>a & b</p>\n</main>\n<footer></footer>");
	}

	#[test]
	fn every_occurrence_is_replaced() {
		let out = fill_template("<!-- X -->|<!-- X -->", &[("X", "y".to_string())], Path::new("t")).unwrap();
		assert_eq!(out, "y|y");
	}

	#[test]
	fn inserted_html_is_not_rescanned() {
		let out = fill_template(
			"<!-- A --> <!-- B -->",
			&[("A", "<!-- B -->".to_string()), ("B", "b".to_string())],
			Path::new("t"),
		)
		.unwrap();
		assert_eq!(out, "<!-- B --> b");
	}

	#[test]
	fn missing_marker_names_marker_and_template() {
		let err = fill_template("<!-- A -->", &[("A", String::new()), ("NOPE", String::new())], Path::new("templates/x.html"))
			.unwrap_err();
		let msg = err.to_string();
		assert!(msg.contains("<!-- NOPE -->"));
		assert!(msg.contains("templates/x.html"));
	}

	#[test]
	fn missing_marker_writes_nothing() {
		let dir = tempdir().unwrap();
		let template = dir.path().join("template.html");
		let output = dir.path().join("page.html");
		fs::write(&template, "<body><!-- CONTENT --></body>").unwrap();

		let err = inject_content(&template, &output, &[("OTHER", "x".to_string())]).unwrap_err();
		assert!(matches!(err, InjectError::MissingMarker { .. }));
		assert!(!output.exists());

		inject_content(&template, &output, &[("CONTENT", "<p>hi</p>".to_string())]).unwrap();
		assert_eq!(fs::read_to_string(&output).unwrap(), "<body><p>hi</p></body>");
	}

	#[test]
	fn missing_template_is_an_error() {
		let dir = tempdir().unwrap();
		let err = inject_content(dir.path().join("none.html"), dir.path().join("out.html"), &[]).unwrap_err();
		assert!(matches!(err, InjectError::ReadTemplate { .. }));
	}
}
