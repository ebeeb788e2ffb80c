use crate::BorderError;
use image::imageops::{self, FilterType};
use image::RgbaImage;
use labsite_common::{load_svg, render_svg_region, svg_size};
use log::{info, warn};
use rand::seq::SliceRandom;
use rand::Rng;
use std::path::Path;

/// Width and height of each border drawing in the artwork
pub const BORDER_WIDTH: f32 = 412.84;
/// see `BORDER_WIDTH`
pub const BORDER_HEIGHT: f32 = 413.86;

/// Top-left corners of the ten border drawings, two per row
pub static BORDER_ORIGINS: [(f32, f32); 10] = [
	(0.0, 0.0),
	(520.0, 0.0),
	(0.0, 520.0),
	(520.0, 520.0),
	(0.0, 1040.0),
	(520.0, 1040.0),
	(0.0, 1560.0),
	(520.0, 1560.0),
	(0.0, 2080.0),
	(520.0, 2080.0),
];

// slack for rounding in the artwork's declared size
const ART_TOLERANCE: f32 = 1.0;

/// Rasterised border drawings, ready to be chosen from
#[derive(Debug, Clone)]
pub struct BorderSet {
	borders: Vec<RgbaImage>,
}

impl BorderSet {
	/// Render every border in the artwork at `svg_path` as a square of `size` pixels.
	/// A border which fails to render, or which lies outside the artwork, is skipped with a warning;
	/// it is an error if none are left.
	pub fn load<P: AsRef<Path>>(svg_path: P, size: u32) -> Result<Self, BorderError> {
		let svg_path = svg_path.as_ref();
		if !svg_path.exists() {
			return Err(BorderError::SvgNotFound(svg_path.to_path_buf()));
		}
		let tree = load_svg(svg_path)?;
		let (art_width, art_height) = svg_size(&tree);
		let scale = size as f32 / BORDER_WIDTH.max(BORDER_HEIGHT);

		info!("Loading {} border designs...", BORDER_ORIGINS.len());
		let mut borders = Vec::with_capacity(BORDER_ORIGINS.len());
		for (i, (x, y)) in BORDER_ORIGINS.iter().enumerate() {
			if x + BORDER_WIDTH > art_width + ART_TOLERANCE || y + BORDER_HEIGHT > art_height + ART_TOLERANCE {
				warn!(
					"Border {} lies outside the {}x{} artwork, skipping",
					i + 1,
					art_width,
					art_height
				);
				continue;
			}
			match render_svg_region(&tree, *x, *y, BORDER_WIDTH, BORDER_HEIGHT, scale) {
				Ok(region) => {
					borders.push(imageops::resize(&region, size, size, FilterType::Lanczos3));
					info!("Loaded border {}", i + 1);
				}
				Err(e) => warn!("Failed to load border {}: {}", i + 1, e),
			}
		}
		Self::from_images(borders)
	}

	/// Use already rasterised borders
	pub fn from_images(borders: Vec<RgbaImage>) -> Result<Self, BorderError> {
		if borders.is_empty() {
			return Err(BorderError::NoBorders);
		}
		Ok(BorderSet { borders })
	}

	/// How many borders there are to choose from
	pub fn len(&self) -> usize {
		self.borders.len()
	}

	/// Always false; a set holds at least one border
	pub fn is_empty(&self) -> bool {
		self.borders.is_empty()
	}

	/// Pick a border at random
	pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> &RgbaImage {
		// never empty, so the fallback is unreachable
		self.borders.choose(rng).unwrap_or(&self.borders[0])
	}
}
