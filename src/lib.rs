//! Camera source settings and ROI annotation editing.
//!
//! The editor core (`geometry`, `mapper`, `drawing`, `session`, `editor`,
//! `controller`) has no I/O of its own and talks to the outside through the
//! traits in [`backend`]. `store` and `rest_api` make up the camera settings
//! service the binary runs.

#[macro_use] extern crate rocket;
#[macro_use] extern crate serde_derive;

pub mod backend;
pub mod common;
pub mod controller;
pub mod drawing;
pub mod editor;
pub mod error;
pub mod geometry;
pub mod mapper;
pub mod notice;
pub mod rest_api;
pub mod session;
pub mod store;

pub use common::{Camera, CameraConfigMap, CameraId, Protocol};
pub use error::{Error, Result};
pub use geometry::{NormalizedPoint, Roi, Shape, ShapeKind};
