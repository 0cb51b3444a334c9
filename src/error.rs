//! Error and warning types produced while resolving a scene.
//!
//! Every fatal condition is a [`SceneError`] variant carrying enough context
//! (document path or field path) to render a diagnostic. Non-fatal findings are
//! collected as [`ResolveWarning`]s and returned next to the resolved scene.

use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::gfx::resources::material::MaterialKind;
use crate::gfx::value::ValueKind;

/// Result type alias for scene resolution
pub type Result<T> = std::result::Result<T, SceneError>;

/// Fatal errors. The first one encountered aborts the resolution.
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("cyclic import: {}", display_cycle(.cycle))]
    CyclicImport { cycle: Vec<PathBuf> },

    #[error("loading '{}' did not finish within {timeout:?}", .path.display())]
    ImportTimeout { path: PathBuf, timeout: Duration },

    #[error("unknown constant '{name}' referenced by {field}")]
    UnknownConstant { name: String, field: String },

    #[error("unknown material '{name}' referenced by {field}")]
    UnknownMaterial { name: String, field: String },

    #[error(
        "material '{name}' is declared twice (as {first} in '{}' and as {second} in '{}')",
        .first_origin.display(),
        .second_origin.display()
    )]
    DuplicateMaterialName {
        name: String,
        first: MaterialKind,
        first_origin: PathBuf,
        second: MaterialKind,
        second_origin: PathBuf,
    },

    #[error("invalid material definition '{name}': {reason}")]
    InvalidMaterialDefinition { name: String, reason: String },

    #[error("camera eye {eye:?} coincides with its target")]
    DegenerateCamera { eye: [f64; 3] },

    #[error("camera fov must lie in (0, 180) degrees, got {fov}")]
    InvalidCameraFov { fov: f64 },

    #[error("image dimensions must be positive, got {width}x{height}")]
    InvalidImageDimensions { width: i64, height: i64 },

    #[error("{field} has a zero scale component: {scale:?}")]
    DegenerateScale { field: String, scale: [f64; 3] },

    #[error("invalid value for {field}: {reason}")]
    InvalidField { field: String, reason: String },

    #[error("invalid constant '{name}': {reason}")]
    InvalidConstant { name: String, reason: String },

    #[error("constant '{name}' is a {found}, but {field} expects a {expected}")]
    ConstantTypeMismatch {
        name: String,
        field: String,
        expected: ValueKind,
        found: ValueKind,
    },

    #[error("failed to read '{}'", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse '{}'", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("loader failed for '{}': {reason}", .path.display())]
    LoadFailed { path: PathBuf, reason: String },

    #[error("scene resolution was cancelled")]
    Cancelled,
}

fn display_cycle(cycle: &[PathBuf]) -> String {
    cycle
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// A constant declared again by a later document. The later value wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConstantCollision {
    pub name: String,
    /// Document that held the overwritten definition
    pub previous: PathBuf,
    /// Document whose definition replaced it
    pub source: PathBuf,
}

/// Non-fatal findings, in processing order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ResolveWarning {
    ConstantCollision(ConstantCollision),
}

impl std::fmt::Display for ResolveWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolveWarning::ConstantCollision(c) => write!(
                f,
                "constant '{}' from '{}' overrides the definition from '{}'",
                c.name,
                c.source.display(),
                c.previous.display()
            ),
        }
    }
}
