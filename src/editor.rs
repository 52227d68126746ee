//! Per-camera settings form.
//!
//! Edits go to a draft copy of the camera. The ROI is edited in a modal
//! [`RoiEditSession`] whose result is folded back into the draft only when the
//! dialog is saved. A save is refused locally when the draft breaks a
//! cross-field rule, so invalid records never reach the backend.

use std::time::Instant;

use log::{error, info, warn};
use url::Url;

use crate::backend::{CameraConfigSource, PreviewStream, PreviewStreamControl, SnapshotRequest};
use crate::common::{Camera, CameraId, Protocol};
use crate::error::{Error, Field, FieldIssue, Result};
use crate::notice::{Notice, NoticeKind, NoticeSlot};
use crate::session::RoiEditSession;


const URL_MUST_BE_EMPTY: &str = "URL must be empty when protocol is empty";
const URL_MUST_BE_HTTP: &str = "URL must be a valid HTTP/HTTPS URL";
const URL_MUST_BE_RTSP: &str = "URL must be a valid RTSP URL";
const ROI_INCOMPLETE: &str = "ROI type and area must be specified";


fn has_scheme(url: &str, schemes: &[&str]) -> bool {
	match Url::parse(url) {
		Ok(parsed) => schemes.contains(&parsed.scheme()) && parsed.has_host(),
		Err(_) => false,
	}
}

/// Collects every cross-field problem of `camera`.
pub fn field_issues(camera: &Camera) -> Vec<FieldIssue> {
	let mut issues = Vec::new();

	let url_issue = match camera.protocol {
		Protocol::None if !camera.url.is_empty() => Some(URL_MUST_BE_EMPTY),
		Protocol::Hls if !has_scheme(&camera.url, &["http", "https"]) => Some(URL_MUST_BE_HTTP),
		Protocol::Rtsp if !has_scheme(&camera.url, &["rtsp"]) => Some(URL_MUST_BE_RTSP),
		_ => None,
	};
	if let Some(message) = url_issue {
		issues.push(FieldIssue { field: Field::Url, message });
	}

	if camera.roi.enable && !camera.roi.is_complete() {
		issues.push(FieldIssue { field: Field::Roi, message: ROI_INCOMPLETE });
	}

	issues
}

pub fn validate_camera(camera: &Camera) -> Result<()> {
	let issues = field_issues(camera);
	if issues.is_empty() {
		Ok(())
	} else {
		Err(Error::Validation(issues))
	}
}


#[derive(Debug)]
pub struct CameraItemEditor {
	id: CameraId,
	saved: Camera,
	draft: Camera,
	expanded: bool,
	roi_dialog: Option<RoiEditSession>,
	stream: Option<PreviewStream>,
	issues: Vec<FieldIssue>,
	notices: NoticeSlot,
}

impl CameraItemEditor {
	pub fn new(id: &str, camera: Camera) -> Self {
		Self {
			id: id.to_owned(),
			draft: camera.clone(),
			saved: camera,
			expanded: false,
			roi_dialog: None,
			stream: None,
			issues: Vec::new(),
			notices: NoticeSlot::default(),
		}
	}

	pub fn id(&self) -> &str {
		&self.id
	}

	/// The record as last loaded or saved.
	pub fn camera(&self) -> &Camera {
		&self.saved
	}

	pub fn draft(&self) -> &Camera {
		&self.draft
	}

	pub fn is_dirty(&self) -> bool {
		self.draft != self.saved
	}

	pub fn is_expanded(&self) -> bool {
		self.expanded
	}

	pub fn toggle_expanded(&mut self) {
		self.expanded = !self.expanded;
	}

	/// Problems found by the last rejected save.
	pub fn issues(&self) -> &[FieldIssue] {
		&self.issues
	}

	pub fn notice(&mut self, now: Instant) -> Option<Notice> {
		self.notices.visible(now)
	}

	pub fn set_label(&mut self, label: &str) {
		self.draft.label = label.to_owned();
	}

	pub fn set_protocol(&mut self, protocol: Protocol) {
		self.draft.protocol = protocol;
	}

	pub fn set_url(&mut self, url: &str) {
		self.draft.url = url.to_owned();
	}

	pub fn set_active(&mut self, active: bool) {
		self.draft.active = active;
	}

	pub fn can_test_stream(&self) -> bool {
		self.draft.has_source()
	}

	pub fn can_configure_roi(&self) -> bool {
		self.draft.has_source()
	}

	/// Refuses to switch the ROI on unless a type and area are set.
	pub fn toggle_roi_enable(&mut self, enable: bool) -> Result<()> {
		if enable && !self.draft.roi.is_complete() {
			warn!("Refusing to enable incomplete ROI for camera {}", self.id);
			self.notices.raise(NoticeKind::IncompleteRoi, Instant::now());
			return Err(Error::IncompleteRoi);
		}
		self.draft.roi.enable = enable;
		Ok(())
	}

	pub fn open_roi_dialog(&mut self) -> Result<SnapshotRequest> {
		if !self.can_configure_roi() {
			return Err(Error::ActionUnavailable("configure ROI needs a protocol and url"));
		}
		let (session, request) = RoiEditSession::open(&self.id, &self.draft);
		self.roi_dialog = Some(session);
		Ok(request)
	}

	pub fn roi_dialog(&self) -> Option<&RoiEditSession> {
		self.roi_dialog.as_ref()
	}

	pub fn roi_dialog_mut(&mut self) -> Option<&mut RoiEditSession> {
		self.roi_dialog.as_mut()
	}

	/// Folds the dialog's ROI into the draft and closes the dialog.
	pub fn save_roi_dialog(&mut self) {
		if let Some(session) = self.roi_dialog.take() {
			self.draft.roi = session.save().roi;
		}
	}

	/// Closes the dialog, dropping its edits and preview image.
	pub fn cancel_roi_dialog(&mut self) {
		if let Some(mut session) = self.roi_dialog.take() {
			session.cancel();
		}
	}

	/// Validates the draft and hands it to `backend`.
	///
	/// On success the form collapses and the returned record becomes the new
	/// baseline. On failure the draft stays as it is.
	pub async fn save<B>(&mut self, backend: &B) -> Result<Camera>
	where
		B: CameraConfigSource + ?Sized,
	{
		if let Err(err) = validate_camera(&self.draft) {
			if let Error::Validation(issues) = &err {
				self.issues = issues.clone();
			}
			warn!("Not saving camera {}: {}", self.id, err);
			return Err(err);
		}
		self.issues.clear();

		match backend.save_camera(&self.id, self.draft.clone()).await {
			Ok(saved) => {
				info!("Saved camera {}", self.id);
				self.saved = saved.clone();
				self.draft = saved.clone();
				self.expanded = false;
				Ok(saved)
			},
			Err(err) => {
				error!("Failed to save camera {}; error was {}", self.id, err);
				self.notices.raise(NoticeKind::SaveFailed, Instant::now());
				Err(err)
			},
		}
	}

	/// Throws away every unsaved change.
	pub fn cancel(&mut self) {
		self.draft = self.saved.clone();
		self.issues.clear();
		self.cancel_roi_dialog();
	}

	pub fn stream(&self) -> Option<&PreviewStream> {
		self.stream.as_ref()
	}

	pub async fn start_stream<P>(&mut self, control: &P) -> Result<PreviewStream>
	where
		P: PreviewStreamControl + ?Sized,
	{
		if !self.can_test_stream() {
			return Err(Error::ActionUnavailable("test stream needs a protocol and url"));
		}
		match control.start_preview_stream(&self.id, &self.draft.url, self.draft.protocol).await {
			Ok(stream) => {
				self.stream = Some(stream.clone());
				Ok(stream)
			},
			Err(err) => {
				warn!("Could not start preview stream for camera {}; error was {}", self.id, err);
				self.notices.raise(NoticeKind::StreamFailed, Instant::now());
				Err(err)
			},
		}
	}

	/// Stops the preview this editor started. The stream is forgotten even if stopping fails.
	pub async fn stop_stream<P>(&mut self, control: &P) -> Result<()>
	where
		P: PreviewStreamControl + ?Sized,
	{
		if self.stream.take().is_none() {
			return Ok(());
		}
		control.stop_preview_stream().await.map_err(|err| {
			warn!("Could not stop preview stream for camera {}; error was {}", self.id, err);
			err
		})
	}
}
