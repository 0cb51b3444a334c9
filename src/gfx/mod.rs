//! # Graphics Module
//!
//! Everything a renderer reads from a resolved scene: typed values, the
//! camera frame, materials and scene objects.
//!
//! ## Architecture Overview
//!
//! - **Values** ([`value`]) - Numbers and vectors, literal or by constant name
//! - **Camera System** ([`camera`]) - Orthonormal viewing frame from eye/target/roll/fov
//! - **Resource Management** ([`resources`]) - Named and inline materials
//! - **Scene Management** ([`scene`]) - Document schema, objects and scene assembly
//!
//! Resolution is usually driven through [`crate::app::SceneResolver`].

pub mod camera;
pub mod resources;
pub mod scene;
pub mod value;

// Re-export commonly used types
pub use camera::CameraFrame;
pub use scene::ResolvedScene;
pub use value::{Color, Value};
