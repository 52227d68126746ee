use std::path::{Path, PathBuf};

use rand::Rng;
use rocket::http::{ContentType, Status};
use rocket::local::blocking::Client;
use rocket::serde::json::Value;

use camera_roi_editor::rest_api;
use camera_roi_editor::store::CameraStore;


fn scratch_file() -> PathBuf {
	let suffix: u64 = rand::thread_rng().gen();
	std::env::temp_dir()
		.join(format!("camera-roi-editor-api-{}", suffix))
		.join("cameras.yaml")
}

fn client_with(yaml: Option<&str>) -> (Client, PathBuf) {
	let path = scratch_file();
	if let Some(yaml) = yaml {
		std::fs::create_dir_all(path.parent().unwrap()).unwrap();
		std::fs::write(&path, yaml).unwrap();
	}
	let rocket = rocket::build().attach(rest_api::stage(CameraStore::open(&path)));
	(Client::tracked(rocket).expect("valid rocket instance"), path)
}

fn remove_scratch(path: &Path) {
	let _ = std::fs::remove_dir_all(path.parent().unwrap());
}

#[test]
fn lists_configuration_map_with_null_entries() {
	let (client, path) = client_with(Some("cam1: ~\ncam2:\n  label: yard\n"));

	let response = client.get("/v0/cameras").dispatch();
	assert_eq!(response.status(), Status::Ok);
	let body: Value = response.into_json().unwrap();
	assert!(body["cam1"].is_null());
	assert_eq!(body["cam2"]["label"], "yard");
	assert_eq!(body["cam2"]["roi"]["type"], "");

	remove_scratch(&path);
}

#[test]
fn unknown_camera_is_not_found() {
	let (client, path) = client_with(None);

	let response = client.get("/v0/cameras/nope").dispatch();
	assert_eq!(response.status(), Status::NotFound);
	let body: Value = response.into_json().unwrap();
	assert_eq!(body["status"], "error");

	remove_scratch(&path);
}

#[test]
fn saves_valid_camera_with_roi() {
	let (client, path) = client_with(None);
	let camera = r#"{
		"label": "gate",
		"protocol": "rtsp",
		"url": "rtsp://10.0.0.5/stream1",
		"active": true,
		"roi": {"enable": true, "type": "polygon", "points": [[0.1, 0.1], [0.5, 0.1], [0.3, 0.4]]}
	}"#;

	let response = client
		.post("/v0/cameras/cam1")
		.header(ContentType::JSON)
		.body(camera)
		.dispatch();
	assert_eq!(response.status(), Status::Ok);

	let response = client.get("/v0/cameras/cam1").dispatch();
	let body: Value = response.into_json().unwrap();
	assert_eq!(body["roi"]["points"][2][1], 0.4);
	assert!(path.exists());

	remove_scratch(&path);
}

#[test]
fn rejects_protocol_url_mismatch() {
	let (client, path) = client_with(None);

	let response = client
		.post("/v0/cameras/cam1")
		.header(ContentType::JSON)
		.body(r#"{"protocol": "hls", "url": "ftp://x"}"#)
		.dispatch();
	assert_eq!(response.status(), Status::UnprocessableEntity);
	let body: Value = response.into_json().unwrap();
	assert_eq!(body["issues"][0]["field"], "url");

	let response = client.get("/v0/cameras").dispatch();
	let body: Value = response.into_json().unwrap();
	assert!(body.as_object().unwrap().is_empty());

	remove_scratch(&path);
}

#[test]
fn rejects_roi_with_wrong_arity() {
	let (client, path) = client_with(None);

	let response = client
		.post("/v0/cameras/cam1")
		.header(ContentType::JSON)
		.body(r#"{"roi": {"enable": false, "type": "polygon", "points": [[0.1, 0.1], [0.5, 0.1]]}}"#)
		.dispatch();
	assert_eq!(response.status(), Status::UnprocessableEntity);

	remove_scratch(&path);
}
