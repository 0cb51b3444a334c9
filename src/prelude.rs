//! # Haggis Scene Prelude
//!
//! Commonly used types in one import.
//!
//! ```no_run
//! use haggis_scene::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let resolution = SceneResolver::default().resolve_file("scenes/box.json")?;
//!     for object in &resolution.scene.objects {
//!         println!("{:?} at {:?}", object.shape.kind, object.transform.translate);
//!     }
//!     Ok(())
//! }
//! ```

// Re-export core application types
pub use crate::app::SceneResolver;
pub use crate::config::{CancellationToken, ResolveOptions};
pub use crate::error::{ResolveWarning, Result, SceneError};

// Re-export graphics and scene types
pub use crate::gfx::camera::CameraFrame;
pub use crate::gfx::resources::{MaterialDef, MaterialKind, MaterialRef, MaterialRegistry};
pub use crate::gfx::scene::{
    ModelInstance, ObjectInstance, Resolution, ResolvedScene, RotateSpec, SceneDocument,
    ShapeKind, Transform,
};
pub use crate::gfx::value::{Color, Value};

// Re-export loaders
pub use crate::vars::{DocumentLoader, FsLoader, MemoryLoader};
