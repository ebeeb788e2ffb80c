use std::path::Path;

/// A raster image format the border tool can decode
#[derive(Debug, Hash, PartialEq, Eq, Clone, Copy)]
pub enum MimeType {
	/// A jpeg file
	Jpeg,
	/// A png file
	Png,
}

impl MimeType {

	/// Guess a mimetype from an extension; the comparison ignores case
	pub fn new_from_extension(ext: &str) -> Option<Self> {
		match ext.to_ascii_lowercase().as_str() {
			"jpg" | "jpeg" => Some(MimeType::Jpeg),
			"png" => Some(MimeType::Png),
			_ => None
		}
	}
}

/// Helper to guess the mimetype of paths
pub trait GuessMimeType {
	/// guess the mimetype of this object
	fn guess_mime(&self) -> Option<MimeType>;
}

impl <T> GuessMimeType for T where T: AsRef<Path> {
	/// guess the mimetype of this path-like object
	fn guess_mime(&self) -> Option<MimeType> {
		self.as_ref()
			.extension()
			.and_then(|ext| ext.to_str())
			.and_then(MimeType::new_from_extension)
	}
}

/// Various helpful functions for analysing filepaths
pub trait MimeTypeHelper {
	/// is this likely to be a raster image we can decode (png or jpg)?
	fn is_raster_image(&self) -> bool;
}

impl <T> MimeTypeHelper for T where T: GuessMimeType {
	fn is_raster_image(&self) -> bool {
		self.guess_mime().is_some()
	}
}
