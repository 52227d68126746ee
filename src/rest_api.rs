use rocket::http::Status;
use rocket::response::status;
use rocket::serde::json::{json, Json, Value};
use rocket::State;

use log::warn;

use crate::common::{Camera, CameraConfigMap};
use crate::error::Error;
use crate::store::CameraStore;


#[get("/")]
async fn list_cameras(store: &State<CameraStore>) -> Json<CameraConfigMap> {
	Json(store.list().await)
}

#[get("/<id>")]
async fn get_camera(id: &str, store: &State<CameraStore>) -> Option<Json<Camera>> {
	store.get(id).await.map(Json)
}

#[post("/<id>", data="<camera_json>")]
async fn save_camera(id: &str, camera_json: Json<Camera>, store: &State<CameraStore>) -> Result<Json<Camera>, status::Custom<Value>> {
	match store.save(id, camera_json.into_inner()).await {
		Ok(camera) => Ok(Json(camera)),
		Err(Error::Validation(issues)) => {
			warn!("Rejected camera {}: {:?}", id, issues);
			Err(status::Custom(Status::UnprocessableEntity, json!({
				"status": "error",
				"reason": "Camera settings are invalid.",
				"issues": issues,
			})))
		},
		Err(err) => Err(status::Custom(Status::InternalServerError, json!({
			"status": "error",
			"reason": err.to_string(),
		}))),
	}
}

#[catch(404)]
fn not_found() -> Value {
	json!({
		"status": "error",
		"reason": "Resource was not found."
	})
}

#[catch(422)]
fn unprocessable() -> Value {
	json!({
		"status": "error",
		"reason": "Camera settings could not be parsed."
	})
}



pub fn stage(store: CameraStore) -> rocket::fairing::AdHoc {
	rocket::fairing::AdHoc::on_ignite("JSON", |rocket| async {
		rocket
			.manage(store)
			.register("/", catchers![not_found, unprocessable])
			.mount("/v0/cameras", routes![list_cameras, get_camera, save_camera])
	})
}
