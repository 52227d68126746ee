//! ROI edit session: one open ROI dialog for one camera.
//!
//! The session owns a snapshot of the camera as it was when the dialog opened
//! and a draft that all edits go to. Nothing leaves the session until
//! [`RoiEditSession::save`] hands the draft back; [`RoiEditSession::cancel`]
//! puts the snapshot back in place.
//!
//! Preview snapshots are fetched in two steps so that a refresh can overtake a
//! pending fetch: [`RoiEditSession::open`] and [`RoiEditSession::refresh`] hand
//! out a [`SnapshotRequest`] stamped with a generation, and
//! [`RoiEditSession::complete_snapshot`] only accepts the result of the latest
//! one.

use std::time::Instant;

use log::{debug, info, warn};

use crate::backend::{SnapshotRequest, SnapshotSource};
use crate::common::{Camera, CameraId};
use crate::drawing::{DrawingEvent, DrawingOutcome, DrawingStateMachine};
use crate::error::{Error, Result};
use crate::geometry::{NormalizedPoint, Roi, Shape, ShapeKind};
use crate::mapper::{self, CoordinateMapper, Overlay, PixelPoint};
use crate::notice::{Notice, NoticeKind, NoticeSlot};


#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewImage {
	pub bytes: Vec<u8>,
	pub width: u32,
	pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewState {
	Loading,
	Ready(PreviewImage),
	NoImage,
}

#[derive(Debug)]
pub struct RoiEditSession {
	camera_id: CameraId,
	original: Camera,
	draft: Camera,
	drawing: DrawingStateMachine,
	mapper: CoordinateMapper,
	preview: PreviewState,
	generation: u64,
	notices: NoticeSlot,
}

impl RoiEditSession {
	pub fn open(camera_id: &str, camera: &Camera) -> (Self, SnapshotRequest) {
		info!("Opening ROI editor for camera {}", camera_id);
		let session = Self {
			camera_id: camera_id.to_owned(),
			original: camera.clone(),
			draft: camera.clone(),
			drawing: DrawingStateMachine::new(camera.roi.kind()),
			mapper: CoordinateMapper::new(),
			preview: PreviewState::Loading,
			generation: 0,
			notices: NoticeSlot::default(),
		};
		let request = session.snapshot_request(false);
		(session, request)
	}

	/// Throws away the current preview and any half-drawn shape, then asks for a fresh snapshot.
	pub fn refresh(&mut self) -> SnapshotRequest {
		self.generation += 1;
		self.preview = PreviewState::Loading;
		self.mapper.forget_image();
		self.drawing.abandon();
		debug!("Refreshing ROI preview for camera {} (generation {})", self.camera_id, self.generation);
		self.snapshot_request(true)
	}

	fn snapshot_request(&self, force_refresh: bool) -> SnapshotRequest {
		SnapshotRequest {
			camera_id: self.camera_id.clone(),
			source_url: self.original.url.clone(),
			force_refresh,
			generation: self.generation,
		}
	}

	/// Applies a fetched snapshot. Returns `false` when the result belongs to a superseded request.
	pub fn complete_snapshot(&mut self, generation: u64, result: Result<Vec<u8>>) -> bool {
		if generation != self.generation || self.preview != PreviewState::Loading {
			debug!("Discarding stale ROI preview for camera {} (generation {})", self.camera_id, generation);
			return false;
		}

		let decoded = result.and_then(|bytes| {
			let (width, height) = mapper::image_dimensions(&bytes)?;
			Ok(PreviewImage { bytes, width, height })
		});
		match decoded {
			Ok(image) => {
				self.mapper.on_image_loaded(image.width, image.height);
				self.preview = PreviewState::Ready(image);
			},
			Err(err) => {
				warn!("No ROI preview for camera {}; error was {}", self.camera_id, err);
				self.preview = PreviewState::NoImage;
				self.notices.raise(NoticeKind::SnapshotFailed, Instant::now());
			},
		}
		true
	}

	/// Runs `request` against `source` and applies the result.
	pub async fn load_snapshot<S>(&mut self, source: &S, request: SnapshotRequest) -> bool
	where
		S: SnapshotSource + ?Sized,
	{
		let result = source
			.fetch_roi_preview_image(&request.camera_id, &request.source_url, request.force_refresh)
			.await;
		self.complete_snapshot(request.generation, result)
	}

	pub fn camera_id(&self) -> &str {
		&self.camera_id
	}

	pub fn original(&self) -> &Camera {
		&self.original
	}

	pub fn draft(&self) -> &Camera {
		&self.draft
	}

	pub fn roi(&self) -> &Roi {
		&self.draft.roi
	}

	pub fn preview(&self) -> &PreviewState {
		&self.preview
	}

	pub fn mapper(&self) -> &CoordinateMapper {
		&self.mapper
	}

	pub fn drawing(&self) -> &DrawingStateMachine {
		&self.drawing
	}

	pub fn notice(&mut self, now: Instant) -> Option<Notice> {
		self.notices.visible(now)
	}

	fn accepts_pointer(&self) -> bool {
		matches!(self.preview, PreviewState::Ready(_))
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.mapper.on_container_resized(width, height);
	}

	pub fn set_type(&mut self, kind: ShapeKind) {
		if kind == self.draft.roi.kind() {
			return;
		}
		self.draft.roi.set_kind(kind);
		let outcome = self.drawing.handle(DrawingEvent::TypeChanged(kind));
		self.apply(outcome);
	}

	/// Returns `false` when the input was ignored because no preview is shown.
	pub fn pointer_down(&mut self, position: PixelPoint) -> bool {
		self.pointer(DrawingEvent::PointerDown, position)
	}

	pub fn pointer_move(&mut self, position: PixelPoint) -> bool {
		self.pointer(DrawingEvent::PointerMove, position)
	}

	pub fn pointer_up(&mut self) -> bool {
		if !self.accepts_pointer() {
			return false;
		}
		let outcome = self.drawing.handle(DrawingEvent::PointerUp);
		self.apply(outcome);
		true
	}

	fn pointer(&mut self, event: impl FnOnce(NormalizedPoint) -> DrawingEvent, position: PixelPoint) -> bool {
		if !self.accepts_pointer() {
			return false;
		}
		let point = self.mapper.to_normalized(position);
		let outcome = self.drawing.handle(event(point));
		self.apply(outcome);
		true
	}

	pub fn close_polygon(&mut self) {
		let outcome = self.drawing.handle(DrawingEvent::ClosePolygon);
		self.apply(outcome);
	}

	/// Clears the drawn area and any gesture in progress.
	pub fn reset(&mut self) {
		let outcome = self.drawing.handle(DrawingEvent::Reset);
		self.apply(outcome);
	}

	fn apply(&mut self, outcome: DrawingOutcome) {
		match outcome {
			DrawingOutcome::Unchanged => {},
			DrawingOutcome::SelectTypeFirst => {
				self.notices.raise(NoticeKind::SelectTypeFirst, Instant::now());
			},
			DrawingOutcome::Committed(shape) => {
				if let Err(err) = self.commit_shape(shape) {
					warn!("Dropping drawn shape for camera {}; error was {}", self.camera_id, err);
				}
			},
			DrawingOutcome::Cleared => self.draft.roi.clear_points(),
		}
	}

	/// Stores a finished shape as the draft ROI's area.
	pub fn commit_shape(&mut self, shape: Shape) -> Result<()> {
		self.draft.roi.set_shape(shape)?;
		Ok(())
	}

	/// Builds a shape of the current type from `points` and stores it.
	pub fn commit_points(&mut self, points: Vec<NormalizedPoint>) -> Result<()> {
		let shape = Shape::from_points(self.draft.roi.kind(), points)?;
		self.commit_shape(shape)
	}

	/// Switching the ROI on needs a type and a drawn area; otherwise the toggle is refused.
	pub fn toggle_enable(&mut self, enable: bool) -> Result<()> {
		if enable && !self.draft.roi.is_complete() {
			warn!("Refusing to enable incomplete ROI for camera {}", self.camera_id);
			self.notices.raise(NoticeKind::IncompleteRoi, Instant::now());
			return Err(Error::IncompleteRoi);
		}
		self.draft.roi.enable = enable;
		Ok(())
	}

	pub fn committed_overlay(&self) -> Option<Overlay> {
		self.draft
			.roi
			.shape()
			.and_then(|shape| shape.to_viewport_overlay(self.mapper.viewport()))
	}

	pub fn drawing_overlay(&self) -> Option<Overlay> {
		self.drawing.preview_overlay(self.mapper.viewport())
	}

	/// Closes the session and hands the draft to the caller for persisting.
	pub fn save(self) -> Camera {
		info!("Saving ROI draft for camera {}", self.camera_id);
		self.draft
	}

	/// Reverts every edit made in this session and lets go of the preview image.
	///
	/// A snapshot still in flight is treated as stale afterwards.
	pub fn cancel(&mut self) {
		debug!("Reverting ROI draft for camera {}", self.camera_id);
		self.draft = self.original.clone();
		self.drawing = DrawingStateMachine::new(self.original.roi.kind());
		self.notices.clear();
		self.generation += 1;
		self.preview = PreviewState::NoImage;
		self.mapper.forget_image();
	}
}
