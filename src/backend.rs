//! Contracts of the services the editor talks to.
//!
//! All calls are asynchronous and report failures as [`Error::Network`](crate::error::Error::Network).

use crate::common::{Camera, CameraConfigMap, CameraId, Protocol};
use crate::error::Result;

/// Reads and writes camera records.
#[rocket::async_trait]
pub trait CameraConfigSource: Send + Sync {
	async fn fetch_camera_config(&self) -> Result<CameraConfigMap>;

	async fn save_camera(&self, id: &str, camera: Camera) -> Result<Camera>;
}

/// Produces still images used as the ROI drawing background.
#[rocket::async_trait]
pub trait SnapshotSource: Send + Sync {
	/// `force_refresh` bypasses any cached frame on the provider side.
	async fn fetch_roi_preview_image(&self, id: &str, source_url: &str, force_refresh: bool) -> Result<Vec<u8>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[derive(Serialize, Deserialize)]
pub struct PreviewStream {
	pub stream_url: String,
}

/// Starts and stops the live test-stream preview.
///
/// There is a single preview process on the provider side; stopping takes no
/// camera id and stops whichever stream is running.
#[rocket::async_trait]
pub trait PreviewStreamControl: Send + Sync {
	async fn start_preview_stream(&self, id: &str, url: &str, protocol: Protocol) -> Result<PreviewStream>;

	async fn stop_preview_stream(&self) -> Result<()>;
}

/// Request for a preview snapshot, tagged with the generation that issued it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotRequest {
	pub camera_id: CameraId,
	pub source_url: String,
	pub force_refresh: bool,
	pub generation: u64,
}
