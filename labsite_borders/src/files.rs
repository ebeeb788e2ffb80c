use labsite_common::MimeTypeHelper;
use log::warn;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

fn is_image(path: &Path) -> bool {
	path.is_raster_image()
}

/// Every png or jpeg among `inputs`, sorted and without repeats.
///
/// Directories contribute the images directly inside them; other files are skipped with a warning.
pub fn collect_image_files(inputs: &[PathBuf]) -> Vec<PathBuf> {
	let mut found = BTreeSet::new();
	for input in inputs {
		if input.is_file() {
			if is_image(input) {
				let _ = found.insert(input.clone());
			} else {
				warn!("Skipping non-image file: {}", input.display());
			}
		} else if input.is_dir() {
			let entries = match fs::read_dir(input) {
				Ok(entries) => entries,
				Err(e) => {
					warn!("Could not read {}: {}", input.display(), e);
					continue;
				}
			};
			for path in entries.filter_map(|e| e.ok()).map(|e| e.path()) {
				if path.is_file() && is_image(&path) {
					let _ = found.insert(path);
				}
			}
		}
	}
	found.into_iter().collect()
}
