//! Error handling for the ROI editor and camera service

use std::fmt;

use crate::common::CameraId;
use crate::geometry::GeometryError;

pub type Result<T> = std::result::Result<T, Error>;

/// Form field an issue is reported against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[derive(Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
	Url,
	Roi,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[derive(Serialize)]
pub struct FieldIssue {
	pub field: Field,
	pub message: &'static str,
}

impl fmt::Display for FieldIssue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let field = match self.field {
			Field::Url => "url",
			Field::Roi => "roi",
		};
		write!(f, "{}: {}", field, self.message)
	}
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
	/// Snapshot fetch, camera save or stream start/stop failed
	#[error("Network error: {0}")]
	Network(String),

	/// Cross-field validation of a camera record failed
	#[error("Validation error: {}", join_issues(.0))]
	Validation(Vec<FieldIssue>),

	/// `enable` toggled on before a type and area were specified
	#[error("ROI type and area must be specified")]
	IncompleteRoi,

	#[error("Geometry error: {0}")]
	Geometry(#[from] GeometryError),

	/// Action needs state that is not there yet (source unset, no preview image)
	#[error("Action unavailable: {0}")]
	ActionUnavailable(&'static str),

	#[error("Camera not found: {0}")]
	NotFound(CameraId),

	#[error("Image error: {0}")]
	Image(#[from] image::ImageError),

	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	#[error("YAML error: {0}")]
	Yaml(#[from] serde_yaml::Error),
}

fn join_issues(issues: &[FieldIssue]) -> String {
	issues
		.iter()
		.map(ToString::to_string)
		.collect::<Vec<_>>()
		.join("; ")
}
