//! Conversion between preview pixels and the normalized ROI domain.

use std::io::Cursor;

use image::ImageReader;

use crate::error::Result;
use crate::geometry::{NormalizedPoint, Shape, ShapeKind};


/// Preview width before any container measurement; snapshots keep this width.
pub const DEFAULT_VIEWPORT_WIDTH: f64 = 640.0;
pub const DEFAULT_VIEWPORT_HEIGHT: f64 = 640.0;


#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelPoint {
	pub x: f64,
	pub y: f64,
}

impl PixelPoint {
	pub fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}
}

/// On-screen size of the preview. Both sides are finite and positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
	width: f64,
	height: f64,
}

impl Viewport {
	pub fn new(width: f64, height: f64) -> Option<Self> {
		let valid = |v: f64| v.is_finite() && v > 0.0;
		if valid(width) && valid(height) {
			Some(Self { width, height })
		} else {
			None
		}
	}

	pub fn width(&self) -> f64 {
		self.width
	}

	pub fn height(&self) -> f64 {
		self.height
	}
}

impl Default for Viewport {
	fn default() -> Self {
		Self {
			width: DEFAULT_VIEWPORT_WIDTH,
			height: DEFAULT_VIEWPORT_HEIGHT,
		}
	}
}


pub fn to_viewport(points: &[NormalizedPoint], viewport: Viewport) -> Vec<PixelPoint> {
	points
		.iter()
		.map(|p| PixelPoint::new(p.x() * viewport.width, p.y() * viewport.height))
		.collect()
}

/// Maps a pointer position into the normalized domain.
///
/// Positions outside the canvas are clamped rather than rejected.
pub fn to_normalized(point: PixelPoint, viewport: Viewport) -> NormalizedPoint {
	NormalizedPoint::quantized(point.x / viewport.width, point.y / viewport.height)
}

/// Reads the pixel size of an encoded snapshot without decoding the whole image.
pub fn image_dimensions(bytes: &[u8]) -> Result<(u32, u32)> {
	let reader = ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;
	Ok(reader.into_dimensions()?)
}


/// Tracks the preview size as the container and the snapshot change.
///
/// Once an image is known its aspect ratio is kept: the width follows the
/// container and the height is derived from it.
#[derive(Debug, Clone, Default)]
pub struct CoordinateMapper {
	viewport: Viewport,
	aspect_ratio: Option<f64>,
}

impl CoordinateMapper {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn viewport(&self) -> Viewport {
		self.viewport
	}

	pub fn on_image_loaded(&mut self, image_width: u32, image_height: u32) {
		if image_width == 0 || image_height == 0 {
			return;
		}
		let aspect_ratio = f64::from(image_width) / f64::from(image_height);
		self.aspect_ratio = Some(aspect_ratio);
		self.apply_aspect(self.viewport.width);
	}

	pub fn on_container_resized(&mut self, width: f64, height: f64) {
		match self.aspect_ratio {
			Some(_) => self.apply_aspect(width),
			None => {
				if let Some(viewport) = Viewport::new(width, height) {
					self.viewport = viewport;
				}
			}
		}
	}

	/// Drops the image aspect ratio, e.g. when the snapshot is discarded.
	pub fn forget_image(&mut self) {
		self.aspect_ratio = None;
	}

	fn apply_aspect(&mut self, width: f64) {
		if let Some(aspect_ratio) = self.aspect_ratio {
			if let Some(viewport) = Viewport::new(width, width / aspect_ratio) {
				self.viewport = viewport;
			}
		}
	}

	pub fn to_viewport(&self, points: &[NormalizedPoint]) -> Vec<PixelPoint> {
		to_viewport(points, self.viewport)
	}

	pub fn to_normalized(&self, point: PixelPoint) -> NormalizedPoint {
		to_normalized(point, self.viewport)
	}
}


/// Pixel-space primitive the preview canvas draws for a shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Overlay {
	Segment(PixelPoint, PixelPoint),
	Rect {
		x: f64,
		y: f64,
		width: f64,
		height: f64,
	},
	ClosedPath(Vec<PixelPoint>),
}

/// Overlay for a possibly unfinished point list, `None` while it is not drawable yet.
pub fn overlay_for_points(kind: ShapeKind, points: &[NormalizedPoint], viewport: Viewport) -> Option<Overlay> {
	let pixels = to_viewport(points, viewport);
	match (kind, pixels.as_slice()) {
		(ShapeKind::Line, [a, b]) => Some(Overlay::Segment(*a, *b)),
		(ShapeKind::Rectangle, [a, b]) => Some(Overlay::Rect {
			x: a.x.min(b.x),
			y: a.y.min(b.y),
			width: (b.x - a.x).abs(),
			height: (b.y - a.y).abs(),
		}),
		(ShapeKind::Polygon, path) if path.len() > 2 => Some(Overlay::ClosedPath(pixels)),
		_ => None,
	}
}

impl Shape {
	pub fn to_viewport_overlay(&self, viewport: Viewport) -> Option<Overlay> {
		overlay_for_points(self.kind(), &self.points(), viewport)
	}
}
