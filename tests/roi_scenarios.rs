use std::io::Cursor;
use std::sync::Mutex;

use camera_roi_editor::backend::{CameraConfigSource, SnapshotSource};
use camera_roi_editor::controller::CameraListController;
use camera_roi_editor::mapper::PixelPoint;
use camera_roi_editor::session::{PreviewState, RoiEditSession};
use camera_roi_editor::{Camera, CameraConfigMap, Error, NormalizedPoint, Protocol, Result, ShapeKind};


fn png(width: u32, height: u32) -> Vec<u8> {
	let mut bytes = Vec::new();
	image::RgbImage::new(width, height)
		.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
		.unwrap();
	bytes
}

/// In-memory stand-in for the settings backend.
struct Backend {
	config: Mutex<CameraConfigMap>,
}

impl Backend {
	fn new(json: &str) -> Self {
		Self { config: Mutex::new(serde_json::from_str(json).unwrap()) }
	}
}

#[rocket::async_trait]
impl CameraConfigSource for Backend {
	async fn fetch_camera_config(&self) -> Result<CameraConfigMap> {
		Ok(self.config.lock().unwrap().clone())
	}

	async fn save_camera(&self, id: &str, camera: Camera) -> Result<Camera> {
		self.config.lock().unwrap().insert(id.to_owned(), Some(camera.clone()));
		Ok(camera)
	}
}

#[rocket::async_trait]
impl SnapshotSource for Backend {
	async fn fetch_roi_preview_image(&self, _id: &str, _source_url: &str, _force_refresh: bool) -> Result<Vec<u8>> {
		Ok(png(1280, 720))
	}
}

#[tokio::test]
async fn draw_polygon_enable_and_persist() {
	let backend = Backend::new(r#"{"cam1": {"protocol": "rtsp", "url": "rtsp://10.0.0.5/stream1"}, "cam2": null}"#);
	let mut controller = CameraListController::load(&backend).await.unwrap();
	assert_eq!(controller.editors().len(), 2);

	let editor = controller.editor_mut("cam1").unwrap();
	editor.toggle_expanded();
	let request = editor.open_roi_dialog().unwrap();
	{
		let session = editor.roi_dialog_mut().unwrap();
		assert!(session.load_snapshot(&backend, request).await);
		assert_eq!(session.mapper().viewport().height(), 360.0);

		session.set_type(ShapeKind::Polygon);
		for (x, y) in [(64.0, 36.0), (320.0, 36.0), (192.0, 144.0)] {
			session.pointer_down(PixelPoint::new(x, y));
			session.pointer_up();
		}
		session.toggle_enable(true).unwrap();
	}
	editor.save_roi_dialog();

	let saved = editor.save(&backend).await.unwrap();
	assert!(saved.roi.enable);
	assert_eq!(saved.roi.kind(), ShapeKind::Polygon);
	assert_eq!(saved.roi.points(), vec![
		NormalizedPoint::new(0.1, 0.1),
		NormalizedPoint::new(0.5, 0.1),
		NormalizedPoint::new(0.3, 0.4),
	]);
	assert!(!editor.is_expanded());

	let stored = backend.fetch_camera_config().await.unwrap();
	assert_eq!(stored["cam1"].as_ref(), Some(&saved));
	assert!(stored["cam2"].is_none());
}

#[tokio::test]
async fn hls_camera_with_ftp_url_is_never_sent() {
	let backend = Backend::new(r#"{"cam1": null}"#);
	let mut controller = CameraListController::load(&backend).await.unwrap();
	let editor = controller.editor_mut("cam1").unwrap();
	editor.set_protocol(Protocol::Hls);
	editor.set_url("ftp://x");

	assert!(matches!(editor.save(&backend).await, Err(Error::Validation(_))));
	assert!(backend.fetch_camera_config().await.unwrap()["cam1"].is_none());
}

#[test]
fn rectangle_near_edges_snaps_to_full_frame() {
	let camera = Camera {
		protocol: Protocol::Rtsp,
		url: "rtsp://10.0.0.5/stream1".to_owned(),
		..Camera::default()
	};
	let (mut session, request) = RoiEditSession::open("cam1", &camera);
	session.complete_snapshot(request.generation, Ok(png(100, 100)));
	assert!(matches!(session.preview(), PreviewState::Ready(_)));

	session.set_type(ShapeKind::Rectangle);
	session.pointer_down(PixelPoint::new(6.4, 6.4));
	session.pointer_move(PixelPoint::new(633.6, 633.6));
	session.pointer_up();

	assert_eq!(session.roi().points(), vec![NormalizedPoint::new(0.0, 0.0), NormalizedPoint::new(1.0, 1.0)]);
}

#[test]
fn cancel_after_any_edits_restores_original() {
	let camera: Camera = serde_json::from_str(r#"{
		"label": "dock",
		"protocol": "hls",
		"url": "https://cam.local/live.m3u8",
		"active": true,
		"roi": {"enable": true, "type": "rectangle", "points": [[0.2, 0.2], [0.6, 0.7]]}
	}"#).unwrap();
	let (mut session, request) = RoiEditSession::open("cam1", &camera);
	session.complete_snapshot(request.generation, Ok(png(640, 480)));

	session.toggle_enable(false).unwrap();
	session.set_type(ShapeKind::Line);
	session.commit_points(vec![NormalizedPoint::new(0.1, 0.1), NormalizedPoint::new(0.9, 0.9)]).unwrap();
	assert!(session.toggle_enable(true).is_ok());
	session.set_type(ShapeKind::None);
	assert!(!session.roi().enable);
	assert!(session.toggle_enable(true).is_err());

	session.cancel();
	assert_eq!(session.draft(), &camera);
}
