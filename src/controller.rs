use log::{debug, info};

use crate::backend::CameraConfigSource;
use crate::common::{Camera, CameraConfigMap};
use crate::editor::CameraItemEditor;
use crate::error::Result;


/// One editor per camera id of the fetched configuration, in id order.
#[derive(Debug, Default)]
pub struct CameraListController {
	editors: Vec<CameraItemEditor>,
}

impl CameraListController {
	pub fn from_config(config: CameraConfigMap) -> Self {
		let editors = config
			.into_iter()
			.map(|(id, camera)| {
				if camera.is_none() {
					debug!("Camera {} has no record yet, using defaults", id);
				}
				CameraItemEditor::new(&id, camera.unwrap_or_default())
			})
			.collect();
		Self { editors }
	}

	pub async fn load<B>(backend: &B) -> Result<Self>
	where
		B: CameraConfigSource + ?Sized,
	{
		let config = backend.fetch_camera_config().await?;
		info!("Loaded configuration for {} camera(s)", config.len());
		Ok(Self::from_config(config))
	}

	/// `true` renders the "no cameras available" placeholder.
	pub fn is_empty(&self) -> bool {
		self.editors.is_empty()
	}

	pub fn editors(&self) -> &[CameraItemEditor] {
		&self.editors
	}

	pub fn editor(&self, id: &str) -> Option<&CameraItemEditor> {
		self.editors.iter().find(|editor| editor.id() == id)
	}

	pub fn editor_mut(&mut self, id: &str) -> Option<&mut CameraItemEditor> {
		self.editors.iter_mut().find(|editor| editor.id() == id)
	}

	pub fn cameras(&self) -> impl Iterator<Item = (&str, &Camera)> {
		self.editors.iter().map(|editor| (editor.id(), editor.camera()))
	}
}
