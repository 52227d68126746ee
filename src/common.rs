use std::collections::BTreeMap;
use std::fmt;

use crate::geometry::Roi;



pub type CameraId = String;

/// Configuration map as served by the backend; a `None` entry is a known id with no record yet.
pub type CameraConfigMap = BTreeMap<CameraId, Option<Camera>>;

#[derive(Clone, Copy)]
#[derive(Debug, Default, PartialEq, Eq)]
#[derive(Serialize, Deserialize)]
pub enum Protocol {
	#[default]
	#[serde(rename = "")]
	None,
	#[serde(rename = "hls")]
	Hls,
	#[serde(rename = "rtsp")]
	Rtsp,
}

impl Protocol {
	pub fn as_str(&self) -> &'static str {
		match self {
			Protocol::None => "",
			Protocol::Hls => "hls",
			Protocol::Rtsp => "rtsp",
		}
	}
}

impl fmt::Display for Protocol {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Clone)]
#[derive(Debug, Default, PartialEq)]
#[derive(Serialize, Deserialize)]
#[serde(default)]
pub struct Camera {
	pub label: String,
	pub protocol: Protocol,
	pub url: String,
	pub active: bool,
	pub roi: Roi,
}

impl Camera {
	/// Source is configured enough to probe: both protocol and url are set.
	pub fn has_source(&self) -> bool {
		self.protocol != Protocol::None && !self.url.is_empty()
	}
}
