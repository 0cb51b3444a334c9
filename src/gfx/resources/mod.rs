// src/gfx/resources/mod.rs
//! Scene resources
//!
//! Named materials shared between objects.

pub mod material;

// Re-export main types
pub use material::{MaterialDef, MaterialKind, MaterialRef, MaterialRegistry};
