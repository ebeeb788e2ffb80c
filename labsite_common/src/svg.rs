use image::{Rgba, RgbaImage};
use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg::{Options, Tree};
use std::error::Error;
use std::fmt;
use std::path::Path;

/// Parse an svg file into a tree which can be rendered repeatedly
pub fn load_svg<P: AsRef<Path>>(path: P) -> Result<Tree, SvgError> {
    let data = std::fs::read_to_string(path)?;
    let options = Options::default();
    let tree = Tree::from_str(&data, &options)?;
    Ok(tree)
}

/// The width and height of an svg in user units
pub fn svg_size(tree: &Tree) -> (f32, f32) {
    let size = tree.size();
    (size.width(), size.height())
}

/// Rasterise the rectangle at (`x`, `y`) with size `width` x `height`,
/// in the svg's own coordinates, scaled by `scale`.
/// Transparent areas of the svg stay transparent.
pub fn render_svg_region(
    tree: &Tree,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    scale: f32,
) -> Result<RgbaImage, SvgError> {
    let px_width = (width * scale) as u32;
    let px_height = (height * scale) as u32;
    let mut pixmap = Pixmap::new(px_width, px_height).ok_or(SvgError::EmptyRegion)?;
    let transform = Transform::from_row(scale, 0.0, 0.0, scale, -x * scale, -y * scale);
    resvg::render(tree, transform, &mut pixmap.as_mut());

    let mut image = RgbaImage::new(px_width, px_height);
    for (target, source) in image.pixels_mut().zip(pixmap.pixels()) {
        let c = source.demultiply();
        *target = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }
    Ok(image)
}

/// Errors reading or rasterising an svg
#[derive(Debug)]
pub enum SvgError {
    /// the requested region rounds to zero pixels
    EmptyRegion,
    /// the svg could not be parsed
    Usvg(resvg::usvg::Error),
    /// the svg could not be read
    Io(std::io::Error),
}

impl Error for SvgError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SvgError::EmptyRegion => None,
            SvgError::Usvg(e) => Some(e),
            SvgError::Io(e) => Some(e),
        }
    }
}

impl fmt::Display for SvgError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl From<resvg::usvg::Error> for SvgError {
    fn from(src: resvg::usvg::Error) -> Self {
        SvgError::Usvg(src)
    }
}

impl From<std::io::Error> for SvgError {
    fn from(src: std::io::Error) -> Self {
        SvgError::Io(src)
    }
}
