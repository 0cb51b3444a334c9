//! # Scene Module
//!
//! Raw scene documents and their resolution into renderer-ready scenes.
//!
//! ## Key Components
//!
//! - [`SceneDocument`] - The JSON layout of a scene file
//! - [`ObjectInstance`] - A primitive with resolved transform and material
//! - [`ResolvedScene`] - Output of [`assemble`], consumed by renderers and model loaders
//!
//! ## Usage
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use haggis_scene::config::ResolveOptions;
//! use haggis_scene::gfx::scene::{assemble, SceneDocument};
//! use haggis_scene::vars::FsLoader;
//!
//! let text = std::fs::read_to_string("scenes/box.json").unwrap();
//! let document = SceneDocument::from_json_str(&text).unwrap();
//! let resolution = assemble(
//!     document,
//!     Path::new("scenes/box.json"),
//!     Arc::new(FsLoader::new()),
//!     &ResolveOptions::default(),
//! )
//! .unwrap();
//! println!("{} objects", resolution.scene.objects.len());
//! ```

pub mod document;
pub mod object;
pub mod scene;

// Re-export main types
pub use document::{ImageSettings, RenderSettings, SceneDocument};
pub use object::{ModelInstance, ObjectInstance, RotateSpec, Shape, ShapeKind, Transform};
pub use scene::{assemble, Resolution, ResolvedScene, SceneStatistics};
