//! Normalized ROI geometry.
//!
//! Every coordinate that enters the model goes through [`clamp_and_snap`], so a
//! [`NormalizedPoint`] is always inside `[0, 1] x [0, 1]`. Shapes carry their
//! arity in the type: a [`Shape::Line`] or [`Shape::Rectangle`] holds exactly two
//! points and a [`Polygon`] cannot be built with fewer than three vertices. The
//! flat `points` array only exists on the wire, see [`Roi`].

use std::fmt;

use thiserror::Error;


/// Coordinates at or below this value snap to 0.
pub const SNAP_LOW: f64 = 0.02;
/// Coordinates at or above this value snap to 1.
pub const SNAP_HIGH: f64 = 0.98;
/// Stored coordinates keep two decimals.
pub const COORDINATE_SCALE: f64 = 100.0;

pub const MIN_POLYGON_VERTICES: usize = 3;


#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeometryError {
	#[error("{kind} needs {expected} points, got {actual}")]
	Arity {
		kind: ShapeKind,
		expected: &'static str,
		actual: usize,
	},
	#[error("ROI points given without a ROI type")]
	MissingKind,
	#[error("cannot store a {shape} shape in a {roi} ROI")]
	KindMismatch {
		roi: ShapeKind,
		shape: ShapeKind,
	},
}


fn snap_coordinate(value: f64) -> f64 {
	let value = if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) };
	if value <= SNAP_LOW {
		0.0
	} else if value >= SNAP_HIGH {
		1.0
	} else {
		value
	}
}

/// Clamps a coordinate pair into the unit square and snaps near-edge values onto the edge.
///
/// Idempotent. NaN is treated as 0.
pub fn clamp_and_snap(x: f64, y: f64) -> (f64, f64) {
	(snap_coordinate(x), snap_coordinate(y))
}

pub fn round_to_precision(value: f64) -> f64 {
	(value * COORDINATE_SCALE).round() / COORDINATE_SCALE
}

/// Reports whether `points` fully describes a shape of `kind`.
pub fn is_complete(kind: ShapeKind, points: &[NormalizedPoint]) -> bool {
	kind != ShapeKind::None && kind.accepts_point_count(points.len())
}

/// Reports whether every raw coordinate already lies in `[0, 1]`.
pub fn is_in_domain(points: &[[f64; 2]]) -> bool {
	points
		.iter()
		.flatten()
		.all(|v| (0.0..=1.0).contains(v))
}


#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[derive(Serialize, Deserialize)]
pub enum ShapeKind {
	#[default]
	#[serde(rename = "", alias = "none")]
	None,
	#[serde(rename = "line")]
	Line,
	#[serde(rename = "rectangle")]
	Rectangle,
	#[serde(rename = "polygon")]
	Polygon,
}

impl ShapeKind {
	pub fn as_str(&self) -> &'static str {
		match self {
			ShapeKind::None => "",
			ShapeKind::Line => "line",
			ShapeKind::Rectangle => "rectangle",
			ShapeKind::Polygon => "polygon",
		}
	}

	fn expected_points(&self) -> &'static str {
		match self {
			ShapeKind::None => "no",
			ShapeKind::Line | ShapeKind::Rectangle => "exactly 2",
			ShapeKind::Polygon => "at least 3",
		}
	}

	pub fn accepts_point_count(&self, count: usize) -> bool {
		match self {
			ShapeKind::None => count == 0,
			ShapeKind::Line | ShapeKind::Rectangle => count == 2,
			ShapeKind::Polygon => count >= MIN_POLYGON_VERTICES,
		}
	}
}

impl fmt::Display for ShapeKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ShapeKind::None => f.write_str("none"),
			other => f.write_str(other.as_str()),
		}
	}
}


/// A point in the unit square. Serialized as `[x, y]`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[derive(Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct NormalizedPoint {
	x: f64,
	y: f64,
}

impl NormalizedPoint {
	/// Accepts any pair, clamping and snapping it into the domain.
	pub fn new(x: f64, y: f64) -> Self {
		let (x, y) = clamp_and_snap(x, y);
		Self { x, y }
	}

	/// Rounds to the stored precision first, then clamps and snaps.
	pub fn quantized(x: f64, y: f64) -> Self {
		Self::new(round_to_precision(x), round_to_precision(y))
	}

	pub fn x(&self) -> f64 {
		self.x
	}

	pub fn y(&self) -> f64 {
		self.y
	}
}

impl From<[f64; 2]> for NormalizedPoint {
	fn from([x, y]: [f64; 2]) -> Self {
		Self::new(x, y)
	}
}

impl From<NormalizedPoint> for [f64; 2] {
	fn from(point: NormalizedPoint) -> Self {
		[point.x, point.y]
	}
}


#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
	vertices: Vec<NormalizedPoint>,
}

impl Polygon {
	pub fn new(vertices: Vec<NormalizedPoint>) -> Result<Self, GeometryError> {
		if vertices.len() < MIN_POLYGON_VERTICES {
			return Err(GeometryError::Arity {
				kind: ShapeKind::Polygon,
				expected: ShapeKind::Polygon.expected_points(),
				actual: vertices.len(),
			});
		}
		Ok(Self { vertices })
	}

	pub fn vertices(&self) -> &[NormalizedPoint] {
		&self.vertices
	}
}


#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
	Line(NormalizedPoint, NormalizedPoint),
	/// Opposite corners, in the order they were drawn.
	Rectangle(NormalizedPoint, NormalizedPoint),
	Polygon(Polygon),
}

impl Shape {
	pub fn from_points(kind: ShapeKind, points: Vec<NormalizedPoint>) -> Result<Self, GeometryError> {
		let arity_error = |actual| GeometryError::Arity {
			kind,
			expected: kind.expected_points(),
			actual,
		};
		match kind {
			ShapeKind::None => Err(GeometryError::MissingKind),
			ShapeKind::Line | ShapeKind::Rectangle => match points.as_slice() {
				[a, b] if kind == ShapeKind::Line => Ok(Shape::Line(*a, *b)),
				[a, b] => Ok(Shape::Rectangle(*a, *b)),
				_ => Err(arity_error(points.len())),
			},
			ShapeKind::Polygon => Polygon::new(points).map(Shape::Polygon),
		}
	}

	pub fn kind(&self) -> ShapeKind {
		match self {
			Shape::Line(..) => ShapeKind::Line,
			Shape::Rectangle(..) => ShapeKind::Rectangle,
			Shape::Polygon(_) => ShapeKind::Polygon,
		}
	}

	/// Flattens the shape into the wire order of points.
	pub fn points(&self) -> Vec<NormalizedPoint> {
		match self {
			Shape::Line(a, b) | Shape::Rectangle(a, b) => vec![*a, *b],
			Shape::Polygon(polygon) => polygon.vertices().to_vec(),
		}
	}
}


/// Region of interest owned by a camera.
///
/// `kind` can be set while no shape is drawn yet, which is the state right
/// after the operator picks a type. Changing `kind` drops the shape.
#[derive(Debug, Clone, Default, PartialEq)]
#[derive(Serialize, Deserialize)]
#[serde(try_from = "RoiPayload", into = "RoiPayload")]
pub struct Roi {
	pub enable: bool,
	kind: ShapeKind,
	shape: Option<Shape>,
}

impl Roi {
	pub fn new(enable: bool, shape: Shape) -> Self {
		Self {
			enable,
			kind: shape.kind(),
			shape: Some(shape),
		}
	}

	pub fn kind(&self) -> ShapeKind {
		self.kind
	}

	pub fn shape(&self) -> Option<&Shape> {
		self.shape.as_ref()
	}

	pub fn points(&self) -> Vec<NormalizedPoint> {
		self.shape.as_ref().map(Shape::points).unwrap_or_default()
	}

	/// Switches the shape kind. A different kind always clears the points.
	pub fn set_kind(&mut self, kind: ShapeKind) {
		if kind != self.kind {
			self.kind = kind;
			self.clear_points();
		}
	}

	pub fn set_shape(&mut self, shape: Shape) -> Result<(), GeometryError> {
		if shape.kind() != self.kind {
			return Err(GeometryError::KindMismatch {
				roi: self.kind,
				shape: shape.kind(),
			});
		}
		self.shape = Some(shape);
		Ok(())
	}

	/// Drops the drawn area. An ROI without an area cannot stay enabled.
	pub fn clear_points(&mut self) {
		self.shape = None;
		self.enable = false;
	}

	/// Type chosen and area drawn; the precondition for `enable == true`.
	pub fn is_complete(&self) -> bool {
		is_complete(self.kind, &self.points())
	}
}


#[derive(Serialize, Deserialize)]
struct RoiPayload {
	#[serde(default)]
	enable: bool,
	#[serde(rename = "type", default)]
	kind: ShapeKind,
	#[serde(default)]
	points: Vec<[f64; 2]>,
}

impl TryFrom<RoiPayload> for Roi {
	type Error = GeometryError;

	fn try_from(payload: RoiPayload) -> Result<Self, Self::Error> {
		if !is_in_domain(&payload.points) {
			log::debug!("Clamping out-of-range ROI coordinates {:?}", payload.points);
		}
		let shape = if payload.points.is_empty() {
			None
		} else {
			let points = payload.points.into_iter().map(NormalizedPoint::from).collect();
			Some(Shape::from_points(payload.kind, points)?)
		};
		Ok(Roi {
			enable: payload.enable,
			kind: payload.kind,
			shape,
		})
	}
}

impl From<Roi> for RoiPayload {
	fn from(roi: Roi) -> Self {
		RoiPayload {
			enable: roi.enable,
			kind: roi.kind,
			points: roi.points().into_iter().map(<[f64; 2]>::from).collect(),
		}
	}
}
