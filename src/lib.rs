// src/lib.rs
//! Haggis Scene
//!
//! Resolves declarative JSON scene documents for the Haggis renderer: merges
//! constants imported across documents, resolves named and inline materials,
//! builds the camera frame and assembles the typed object list.

pub mod app;
pub mod config;
pub mod error;
pub mod gfx;
pub mod prelude;
pub mod vars;

// Re-export main types for convenience
pub use app::SceneResolver;
pub use error::{ResolveWarning, Result, SceneError};

/// Resolves the scene file at `path` from disk with default options
pub fn resolve_file(path: impl AsRef<std::path::Path>) -> Result<gfx::scene::Resolution> {
    SceneResolver::default().resolve_file(path)
}
