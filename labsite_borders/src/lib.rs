#![deny(dead_code)]
#![deny(unreachable_patterns)]
#![deny(unused_extern_crates)]
#![deny(unused_imports)]
#![deny(unused_qualifications)]
#![deny(clippy::all)]
#![deny(missing_docs)]
#![deny(missing_debug_implementations)]

//! Frame posters and photos with one of the hand-drawn borders from the site's artwork.
//!
//! Each image is cropped square, scaled down if it is very large, and composited
//! inside a randomly chosen border on a transparent square canvas.
//!
//! ```no_run
//! use labsite_borders::{add_borders, BorderOptions};
//! let options = BorderOptions::new(vec!["posters".into()], "images/posters", "images/templates/borders.svg");
//! let written = add_borders(&options).unwrap();
//! println!("framed {} images", written.len());
//! ```

use image::{ImageError, ImageFormat};
use labsite_common::SvgError;
use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::error::Error;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
mod border;
mod compose;
mod crop;
mod files;
pub use border::{BorderSet, BORDER_HEIGHT, BORDER_ORIGINS, BORDER_WIDTH};
pub use compose::{add_border_to_image, flood_fill_outside_border, BorderLayout, WHITE_TOLERANCE};
pub use crop::{crop_to_square, resize_to_max_dimension, FaceLocator, SkinToneLocator};
pub use files::collect_image_files;

/// Side of a finished image, in pixels
pub const OUTPUT_SIZE: u32 = 500;
/// Transparent margin around the border
pub const MARGIN: u32 = 41;
/// Side of the bordered area
pub const CONTENT_SIZE: u32 = OUTPUT_SIZE - 2 * MARGIN;
/// How far the border overlaps the picture
pub const BORDER_INSET: u32 = 6;
/// Larger inputs are scaled down to this before framing
pub const MAX_INPUT_DIMENSION: u32 = 1000;

/// Errors framing images
#[derive(Debug)]
pub enum BorderError {
	/// reading or writing a file
	Io(std::io::Error),
	/// the border artwork could not be read or rendered
	Svg(SvgError),
	/// an image could not be decoded or encoded
	Image {
		/// the file concerned
		path: PathBuf,
		/// the underlying error
		source: ImageError,
	},
	/// one of the inputs does not exist
	InputNotFound(PathBuf),
	/// the border artwork does not exist
	SvgNotFound(PathBuf),
	/// none of the borders could be rendered
	NoBorders,
}

impl fmt::Display for BorderError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			BorderError::Io(e) => write!(f, "{}", e),
			BorderError::Svg(e) => write!(f, "Error rendering borders: {}", e),
			BorderError::Image { path, source } => write!(f, "Error processing {}: {}", path.display(), source),
			BorderError::InputNotFound(p) => write!(f, "Input not found: {}", p.display()),
			BorderError::SvgNotFound(p) => write!(f, "Border SVG not found: {}", p.display()),
			BorderError::NoBorders => write!(f, "No borders could be loaded!"),
		}
	}
}

impl Error for BorderError {
	fn source(&self) -> Option<&(dyn Error + 'static)> {
		match self {
			BorderError::Io(e) => Some(e),
			BorderError::Svg(e) => Some(e),
			BorderError::Image { source, .. } => Some(source),
			_ => None,
		}
	}
}

impl From<std::io::Error> for BorderError {
	fn from(src: std::io::Error) -> Self {
		BorderError::Io(src)
	}
}

impl From<SvgError> for BorderError {
	fn from(src: SvgError) -> Self {
		BorderError::Svg(src)
	}
}

/// Frame a single image file, returning the finished image
pub fn frame_image<R: Rng + ?Sized>(
	path: &Path,
	borders: &BorderSet,
	layout: &BorderLayout,
	locator: Option<&dyn FaceLocator>,
	rng: &mut R,
) -> Result<image::RgbaImage, BorderError> {
	let image_error = |source| BorderError::Image {
		path: path.to_path_buf(),
		source,
	};
	let img = image::open(path).map_err(image_error)?.to_rgba8();
	let (width, height) = img.dimensions();

	let img = crop_to_square(&img, locator);
	if width != height {
		info!("Cropped to {}x{}", img.width(), img.height());
	}
	let before = img.dimensions();
	let img = resize_to_max_dimension(img, MAX_INPUT_DIMENSION);
	if img.dimensions() != before {
		info!("Resized to {}x{}", img.width(), img.height());
	}
	Ok(add_border_to_image(&img, borders.choose(rng), layout))
}

/// Frame every image found among `inputs`, writing each as `{stem}.png` in `output_dir`.
/// Returns the files written.
pub fn process_images<R: Rng + ?Sized>(
	inputs: &[PathBuf],
	output_dir: &Path,
	borders: &BorderSet,
	layout: &BorderLayout,
	locator: Option<&dyn FaceLocator>,
	rng: &mut R,
) -> Result<Vec<PathBuf>, BorderError> {
	fs::create_dir_all(output_dir)?;
	let images = collect_image_files(inputs);
	if images.is_empty() {
		info!("No image files found to process.");
		return Ok(Vec::new());
	}
	info!("Processing {} images...", images.len());
	if locator.is_some() {
		info!("(Face detection enabled)");
	}

	let mut written = Vec::with_capacity(images.len());
	for path in images.iter() {
		info!("Processing {}...", path.display());
		let framed = frame_image(path, borders, layout, locator, rng)?;
		let stem = path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
		let output = output_dir.join(format!("{}.png", stem));
		framed
			.save_with_format(&output, ImageFormat::Png)
			.map_err(|source| BorderError::Image {
				path: output.clone(),
				source,
			})?;
		info!("Saved to {}", output.display());
		written.push(output);
	}
	info!("Done! Processed {} images.", written.len());
	Ok(written)
}

/// Everything needed for a run over a set of images
#[derive(Debug, Clone)]
pub struct BorderOptions {
	/// image files, or directories of them
	pub inputs: Vec<PathBuf>,
	/// where framed images are written
	pub output_dir: PathBuf,
	/// the artwork holding the border drawings
	pub border_svg: PathBuf,
	/// side of each finished image
	pub output_size: u32,
	/// centre square crops on a detected face
	pub face: bool,
	/// seed for the border choice, for repeatable output
	pub seed: Option<u64>,
}

impl BorderOptions {
	/// Default sizes, no face detection, and a random seed
	pub fn new<O: Into<PathBuf>, S: Into<PathBuf>>(inputs: Vec<PathBuf>, output_dir: O, border_svg: S) -> Self {
		BorderOptions {
			inputs,
			output_dir: output_dir.into(),
			border_svg: border_svg.into(),
			output_size: OUTPUT_SIZE,
			face: false,
			seed: None,
		}
	}
}

/// Check the inputs, render the borders and frame every image
pub fn add_borders(options: &BorderOptions) -> Result<Vec<PathBuf>, BorderError> {
	if let Some(missing) = options.inputs.iter().find(|p| !p.exists()) {
		return Err(BorderError::InputNotFound(missing.clone()));
	}
	let layout = BorderLayout::for_size(options.output_size);
	let borders = BorderSet::load(&options.border_svg, layout.output_size)?;
	let locator = SkinToneLocator::default();
	let locator: Option<&dyn FaceLocator> = if options.face { Some(&locator) } else { None };
	let mut rng = match options.seed {
		Some(seed) => StdRng::seed_from_u64(seed),
		None => StdRng::from_entropy(),
	};
	process_images(&options.inputs, &options.output_dir, &borders, &layout, locator, &mut rng)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn constants() {
		assert_eq!(CONTENT_SIZE, 418);
		assert_eq!(BorderLayout::default().content_size(), CONTENT_SIZE);
	}

	#[test]
	fn missing_input_is_reported_first() {
		let options = BorderOptions::new(vec![PathBuf::from("/no/such/poster.png")], "/tmp/out", "/no/such.svg");
		match add_borders(&options) {
			Err(BorderError::InputNotFound(p)) => assert_eq!(p, PathBuf::from("/no/such/poster.png")),
			other => panic!("unexpected {:?}", other),
		}
	}
}
