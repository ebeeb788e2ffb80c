use image::imageops::{self, FilterType};
use image::RgbaImage;
use log::{debug, info};
use std::fmt;

/// Finds the centre of a face in an image, so a square crop can be centred on it
pub trait FaceLocator: fmt::Debug {
	/// The pixel at the centre of the most prominent face, if there is one
	fn locate(&self, image: &RgbaImage) -> Option<(u32, u32)>;
}

/// Locates a face as the centroid of skin-coloured pixels.
///
/// Crude, but good enough for a headshot against a plain background,
/// and it needs no model files.
#[derive(Debug, Clone, Copy)]
pub struct SkinToneLocator {
	/// the smallest share of sampled pixels which must be skin-coloured
	pub min_fraction: f32,
	/// only every `stride`th pixel in each direction is examined
	pub stride: u32,
}

impl Default for SkinToneLocator {
	fn default() -> Self {
		SkinToneLocator {
			min_fraction: 0.02,
			stride: 2,
		}
	}
}

/// The usual rgb rule for skin under daylight
fn is_skin(r: u8, g: u8, b: u8, a: u8) -> bool {
	let max = r.max(g).max(b);
	let min = r.min(g).min(b);
	a >= 128 && r > 95 && g > 40 && b > 20 && max - min > 15 && r.abs_diff(g) > 15 && r > g && r > b
}

impl FaceLocator for SkinToneLocator {
	fn locate(&self, image: &RgbaImage) -> Option<(u32, u32)> {
		let stride = self.stride.max(1);
		let (mut sum_x, mut sum_y, mut hits, mut sampled) = (0u64, 0u64, 0u64, 0u64);
		for y in (0..image.height()).step_by(stride as usize) {
			for x in (0..image.width()).step_by(stride as usize) {
				sampled += 1;
				let p = image.get_pixel(x, y);
				if is_skin(p[0], p[1], p[2], p[3]) {
					sum_x += u64::from(x);
					sum_y += u64::from(y);
					hits += 1;
				}
			}
		}
		if hits == 0 || (hits as f32) < self.min_fraction * sampled as f32 {
			return None;
		}
		Some(((sum_x / hits) as u32, (sum_y / hits) as u32))
	}
}

/// Crop to the largest centred square.
///
/// With a locator the square is centred on the face it finds instead, falling
/// back to the image centre when it finds none. Either way the square stays inside the image.
pub fn crop_to_square(image: &RgbaImage, locator: Option<&dyn FaceLocator>) -> RgbaImage {
	let (width, height) = image.dimensions();
	if width == height {
		return image.clone();
	}
	let size = width.min(height);
	let mut centre = (width / 2, height / 2);

	if let Some(locator) = locator {
		match locator.locate(image) {
			Some(found) => {
				info!("Face detected at ({}, {})", found.0, found.1);
				centre = found;
			}
			None => info!("No face detected, using center crop"),
		}
	}

	let start = |c: u32, extent: u32| -> u32 {
		let wanted = i64::from(c) - i64::from(size / 2);
		wanted.clamp(0, i64::from(extent - size)) as u32
	};
	let (left, top) = (start(centre.0, width), start(centre.1, height));
	debug!("cropping {}x{} square at ({}, {})", size, size, left, top);
	imageops::crop_imm(image, left, top, size, size).to_image()
}

/// Scale down so neither side exceeds `max_size`, keeping the aspect ratio.
/// Images already small enough are returned as they are.
pub fn resize_to_max_dimension(image: RgbaImage, max_size: u32) -> RgbaImage {
	let (width, height) = image.dimensions();
	if width.max(height) <= max_size {
		return image;
	}
	let (new_width, new_height) = if width > height {
		(max_size, (f64::from(height) * f64::from(max_size) / f64::from(width)) as u32)
	} else {
		((f64::from(width) * f64::from(max_size) / f64::from(height)) as u32, max_size)
	};
	imageops::resize(&image, new_width.max(1), new_height.max(1), FilterType::Lanczos3)
}

#[cfg(test)]
mod tests {
	use super::*;
	use image::Rgba;

	#[derive(Debug)]
	struct At(Option<(u32, u32)>);

	impl FaceLocator for At {
		fn locate(&self, _: &RgbaImage) -> Option<(u32, u32)> {
			self.0
		}
	}

	/// a wide image whose columns record their own x coordinate in the red channel
	fn ramp(width: u32, height: u32) -> RgbaImage {
		RgbaImage::from_fn(width, height, |x, _| Rgba([x as u8, 0, 0, 255]))
	}

	#[test]
	fn square_images_are_untouched() {
		let img = ramp(10, 10);
		assert_eq!(crop_to_square(&img, None), img);
	}

	#[test]
	fn centre_crop() {
		let cropped = crop_to_square(&ramp(200, 100), None);
		assert_eq!(cropped.dimensions(), (100, 100));
		assert_eq!(cropped.get_pixel(0, 0)[0], 50);
	}

	#[test]
	fn crop_follows_the_face() {
		let cropped = crop_to_square(&ramp(200, 100), Some(&At(Some((120, 50)))));
		assert_eq!(cropped.get_pixel(0, 0)[0], 70);
	}

	#[test]
	fn crop_is_clamped_inside_the_image() {
		let img = ramp(200, 100);
		assert_eq!(crop_to_square(&img, Some(&At(Some((5, 50))))).get_pixel(0, 0)[0], 0);
		assert_eq!(crop_to_square(&img, Some(&At(Some((199, 50))))).get_pixel(0, 0)[0], 100);
	}

	#[test]
	fn no_face_means_centre_crop() {
		let cropped = crop_to_square(&ramp(200, 100), Some(&At(None)));
		assert_eq!(cropped.get_pixel(0, 0)[0], 50);
	}

	#[test]
	fn skin_tone_centroid() {
		let mut img = RgbaImage::from_pixel(300, 200, Rgba([40, 60, 200, 255]));
		for y in 40..80 {
			for x in 200..240 {
				img.put_pixel(x, y, Rgba([224, 172, 140, 255]));
			}
		}
		let (x, y) = SkinToneLocator::default().locate(&img).unwrap();
		assert!((218..=220).contains(&x), "{}", x);
		assert!((58..=60).contains(&y), "{}", y);
	}

	#[test]
	fn no_skin_no_face() {
		let img = RgbaImage::from_pixel(100, 50, Rgba([40, 60, 200, 255]));
		assert_eq!(SkinToneLocator::default().locate(&img), None);
	}

	#[test]
	fn downscaling() {
		assert_eq!(resize_to_max_dimension(ramp(50, 20), 100).dimensions(), (50, 20));
		assert_eq!(resize_to_max_dimension(ramp(2000, 1000), 1000).dimensions(), (1000, 500));
		assert_eq!(resize_to_max_dimension(ramp(300, 1200), 1000).dimensions(), (250, 1000));
	}
}
