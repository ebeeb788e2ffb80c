use crate::{BORDER_INSET, MARGIN, OUTPUT_SIZE};
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

/// Pixels at least this close to white count as background when clearing around the border
pub const WHITE_TOLERANCE: u8 = 50;

/// Sizes for a framed image: a square canvas with a transparent margin,
/// inside which the border is drawn over the picture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BorderLayout {
	/// side of the finished image
	pub output_size: u32,
	/// transparent margin on every side
	pub margin: u32,
	/// how far the border overlaps the picture's edges
	pub border_inset: u32,
}

impl Default for BorderLayout {
	fn default() -> Self {
		BorderLayout {
			output_size: OUTPUT_SIZE,
			margin: MARGIN,
			border_inset: BORDER_INSET,
		}
	}
}

impl BorderLayout {
	/// The default proportions scaled to an output of `output_size` pixels
	pub fn for_size(output_size: u32) -> Self {
		let scale = |n: u32| ((f64::from(n) * f64::from(output_size)) / f64::from(OUTPUT_SIZE)).round() as u32;
		BorderLayout {
			output_size,
			margin: scale(MARGIN),
			border_inset: scale(BORDER_INSET),
		}
	}

	/// side of the bordered area inside the margin
	pub fn content_size(&self) -> u32 {
		self.output_size.saturating_sub(2 * self.margin).max(1)
	}

	/// side of the square the picture is fitted into
	pub fn picture_size(&self) -> u32 {
		self.content_size().saturating_sub(2 * self.border_inset).max(1)
	}
}

/// Make transparent everything reachable from the four corners through pixels
/// which are already mostly transparent, or close to white.
/// Returns how many pixels were cleared.
pub fn flood_fill_outside_border(image: &mut RgbaImage, tolerance: u8) -> usize {
	let (width, height) = image.dimensions();
	if width == 0 || height == 0 {
		return 0;
	}
	let threshold = 255 - tolerance;
	let mut visited = vec![false; width as usize * height as usize];
	let mut stack = vec![(0, 0), (width - 1, 0), (0, height - 1), (width - 1, height - 1)];
	let mut cleared = 0;

	while let Some((x, y)) = stack.pop() {
		let index = y as usize * width as usize + x as usize;
		if visited[index] {
			continue;
		}
		let pixel = image.get_pixel_mut(x, y);
		let transparent = pixel[3] < 128;
		let white = pixel[0] >= threshold && pixel[1] >= threshold && pixel[2] >= threshold;
		if !(transparent || white) {
			continue;
		}
		visited[index] = true;
		pixel[3] = 0;
		cleared += 1;

		if x + 1 < width {
			stack.push((x + 1, y));
		}
		if x > 0 {
			stack.push((x - 1, y));
		}
		if y + 1 < height {
			stack.push((x, y + 1));
		}
		if y > 0 {
			stack.push((x, y - 1));
		}
	}
	cleared
}

/// Frame `picture` with `border`.
///
/// The picture is fitted, centred, on white inside the border's frame, the border
/// is drawn over it, and the result is placed in the middle of a transparent canvas.
/// Any white left outside the frame is then cleared.
pub fn add_border_to_image(picture: &RgbaImage, border: &RgbaImage, layout: &BorderLayout) -> RgbaImage {
	let content_size = layout.content_size();
	let area = layout.picture_size();
	let border = imageops::resize(border, content_size, content_size, FilterType::Lanczos3);

	let (width, height) = picture.dimensions();
	let aspect = f64::from(width.max(1)) / f64::from(height.max(1));
	let (new_width, new_height) = if aspect > 1.0 {
		(area, (f64::from(area) / aspect) as u32)
	} else {
		((f64::from(area) * aspect) as u32, area)
	};
	let picture = imageops::resize(picture, new_width.max(1), new_height.max(1), FilterType::Lanczos3);

	let mut content = RgbaImage::from_pixel(content_size, content_size, Rgba([255, 255, 255, 255]));
	let x = (content_size - picture.width()) / 2;
	let y = (content_size - picture.height()) / 2;
	imageops::overlay(&mut content, &picture, i64::from(x), i64::from(y));
	imageops::overlay(&mut content, &border, 0, 0);

	let mut output = RgbaImage::new(layout.output_size, layout.output_size);
	imageops::overlay(&mut output, &content, i64::from(layout.margin), i64::from(layout.margin));
	let _ = flood_fill_outside_border(&mut output, WHITE_TOLERANCE);
	output
}
