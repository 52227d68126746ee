use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

use log::{error, info, warn};

use crate::backend::CameraConfigSource;
use crate::common::{Camera, CameraConfigMap};
use crate::editor::validate_camera;
use crate::error::Result;


pub const DEFAULT_CAMERAS_FILE: &str = "/tmp/clustervms/cameras.yaml";


fn read_config_file(path: &Path) -> CameraConfigMap {
	let file_result = File::open(path);

	match file_result {
		Ok(file) => {
			let buf_reader = BufReader::new(file);
			match serde_yaml::from_reader(buf_reader) {
				Ok(cameras) => cameras,
				Err(err) => {
					error!("Failed to read camera config file; error was {}", err);
					CameraConfigMap::new()
				}
			}
		},
		Err(err) => {
			// Expected on first start, before anything was saved
			warn!("Failed to open camera config file for reading; error was {}", err);
			CameraConfigMap::new()
		}
	}
}

async fn write_config_file(path: &Path, cameras: &CameraConfigMap) -> Result<()> {
	if let Some(parent) = path.parent() {
		tokio::fs::create_dir_all(parent).await?;
	}
	let file = tokio::fs::File::create(path).await?;

	let yaml = serde_yaml::to_string(cameras)?;
	let mut writer = tokio::io::BufWriter::new(file);
	writer.write_all(yaml.as_bytes()).await?;
	writer.flush().await?;
	Ok(())
}


/// Camera records kept in memory and mirrored to a YAML file.
pub struct CameraStore {
	path: PathBuf,
	// tokio's RwLock so readers don't block each other and a waiting writer isn't starved.
	cameras: RwLock<CameraConfigMap>,
}

impl CameraStore {
	pub fn open(path: impl Into<PathBuf>) -> Self {
		let path = path.into();
		let cameras = read_config_file(&path);
		info!("Loaded {} camera(s) from {}", cameras.len(), path.display());
		Self {
			path,
			cameras: RwLock::new(cameras),
		}
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	pub async fn list(&self) -> CameraConfigMap {
		self.cameras.read().await.clone()
	}

	/// `None` when the id is unknown; a known id without a record yields the default camera.
	pub async fn get(&self, id: &str) -> Option<Camera> {
		let cameras = self.cameras.read().await;
		cameras.get(id).map(|camera| camera.clone().unwrap_or_default())
	}

	/// Validates and stores `camera` under `id`. The in-memory copy is only
	/// updated once the file was written.
	pub async fn save(&self, id: &str, camera: Camera) -> Result<Camera> {
		validate_camera(&camera)?;

		let mut cameras = self.cameras.write().await;
		let mut updated = cameras.clone();
		updated.insert(id.to_owned(), Some(camera.clone()));

		if let Err(err) = write_config_file(&self.path, &updated).await {
			error!("Failed to write camera config file; error was {}", err);
			return Err(err);
		}
		*cameras = updated;
		info!("Wrote camera config file");
		Ok(camera)
	}
}

#[rocket::async_trait]
impl CameraConfigSource for CameraStore {
	async fn fetch_camera_config(&self) -> Result<CameraConfigMap> {
		Ok(self.list().await)
	}

	async fn save_camera(&self, id: &str, camera: Camera) -> Result<Camera> {
		self.save(id, camera).await
	}
}
