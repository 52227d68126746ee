use clap::{Arg, Command};
use rocket::{Request, Response};
use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::Header;

use camera_roi_editor::rest_api;
use camera_roi_editor::store::{CameraStore, DEFAULT_CAMERAS_FILE};



// The settings UI is served from another origin, so responses need CORS headers.
pub struct CORS;

#[rocket::async_trait]
impl Fairing for CORS {
	fn info(&self) -> Info {
		Info {
			name: "Add CORS headers to responses",
			kind: Kind::Response
		}
	}

	async fn on_response<'r>(&self, _request: &'r Request<'_>, response: &mut Response<'r>) {
		response.set_header(Header::new("Access-Control-Allow-Origin", "*"));
		response.set_header(Header::new("Access-Control-Allow-Methods", "POST, GET, OPTIONS"));
		response.set_header(Header::new("Access-Control-Allow-Headers", "*"));
		response.set_header(Header::new("Access-Control-Allow-Credentials", "true"));
	}
}


#[rocket::main]
async fn main() -> anyhow::Result<()> {
	let matches = Command::new("camera-roi-editor")
		.version(env!("CARGO_PKG_VERSION"))
		.about("Camera source and ROI configuration service.")
		.arg(
			Arg::new("cameras")
				.short('c')
				.long("cameras")
				.default_value(DEFAULT_CAMERAS_FILE)
				.help("YAML file the camera settings are stored in")
		)
		.get_matches();

	let cameras_file = matches
		.get_one::<String>("cameras")
		.map(String::as_str)
		.unwrap_or(DEFAULT_CAMERAS_FILE);
	let store = CameraStore::open(cameras_file);

	rocket::build()
		.attach(rest_api::stage(store))
		.attach(CORS)
		.launch()
		.await?;

	anyhow::Ok(())
}
