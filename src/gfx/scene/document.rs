//! Raw scene documents as they appear on disk.
//!
//! These types mirror the JSON layout one to one and carry no resolved data.
//! Render and image settings are the exception: they are already final and are
//! passed through to the resolved scene unchanged.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::gfx::camera::camera_utils::CameraSection;
use crate::gfx::resources::material::MaterialKind;
use crate::gfx::scene::object::{ShaderType, ShapeKind};
use crate::gfx::value::{Color, VectorExpr};

pub type JsonMap = serde_json::Map<String, serde_json::Value>;

/// Root scene document
#[derive(Debug, Clone, Deserialize)]
pub struct SceneDocument {
    pub render: RenderSettings,
    pub image: ImageSettings,
    pub camera: CameraSection,
    #[serde(default)]
    pub scene: SceneSection,
}

impl SceneDocument {
    pub fn from_json_str(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SceneSection {
    #[serde(default)]
    pub vars: VarsSection,
    #[serde(default)]
    pub objects: ObjectsSection,
    #[serde(default)]
    pub models: Vec<RawModel>,
}

/// Variable declarations of a document.
///
/// Imported fragment documents have exactly this shape.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VarsSection {
    #[serde(default)]
    pub constants: JsonMap,
    #[serde(default)]
    pub imports: Vec<String>,
    #[serde(default)]
    pub materials: MaterialsSection,
}

/// Named material declarations, one dictionary per kind
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MaterialsSection {
    #[serde(default)]
    pub diffuse: JsonMap,
    #[serde(default)]
    pub diffuse_light: JsonMap,
    #[serde(default)]
    pub mirror: JsonMap,
    #[serde(default)]
    pub refract: JsonMap,
}

impl MaterialsSection {
    pub fn is_empty(&self) -> bool {
        self.diffuse.is_empty()
            && self.diffuse_light.is_empty()
            && self.mirror.is_empty()
            && self.refract.is_empty()
    }

    /// All declarations, kind by kind, each kind in declaration order
    pub fn entries(&self) -> impl Iterator<Item = (MaterialKind, &str, &serde_json::Value)> {
        [
            (MaterialKind::Diffuse, &self.diffuse),
            (MaterialKind::DiffuseLight, &self.diffuse_light),
            (MaterialKind::Mirror, &self.mirror),
            (MaterialKind::Refract, &self.refract),
        ]
        .into_iter()
        .flat_map(|(kind, dict)| dict.iter().map(move |(name, def)| (kind, name.as_str(), def)))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ObjectsSection {
    #[serde(default)]
    pub sphere: Vec<RawObject>,
    #[serde(default)]
    pub flat: Vec<RawObject>,
}

impl ObjectsSection {
    /// Object lists in processing order
    pub fn by_kind(&self) -> [(ShapeKind, &[RawObject]); 2] {
        [
            (ShapeKind::Sphere, self.sphere.as_slice()),
            (ShapeKind::Flat, self.flat.as_slice()),
        ]
    }

    pub fn len(&self) -> usize {
        self.sphere.len() + self.flat.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn empty_structure() -> serde_json::Value {
    serde_json::Value::Object(JsonMap::new())
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawObject {
    /// Kind-specific geometry, opaque to the resolver
    #[serde(default = "empty_structure")]
    pub structure: serde_json::Value,
    #[serde(default)]
    pub transform: RawTransform,
    /// Either a registered material name or an inline material literal
    pub material: serde_json::Value,
    /// Hidden objects are skipped without being resolved
    #[serde(default)]
    pub hide: bool,
}

/// Model entry as written in the document
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawModel {
    pub obj_path: String,
    pub texture_path: String,
    pub shader_type: ShaderType,
    #[serde(default)]
    pub transform: RawTransform,
    #[serde(default)]
    pub hide: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawTransform {
    #[serde(default = "unit_scale")]
    pub scale: VectorExpr,
    #[serde(default = "zero_rotation")]
    pub rotate: VectorExpr,
    #[serde(default = "zero_translation")]
    pub translate: VectorExpr,
}

fn unit_scale() -> VectorExpr {
    [1.0, 1.0, 1.0].into()
}

fn zero_rotation() -> VectorExpr {
    [0.0, 0.0, 0.0].into()
}

fn zero_translation() -> VectorExpr {
    [0.0, 0.0, 0.0].into()
}

impl Default for RawTransform {
    fn default() -> Self {
        Self {
            scale: unit_scale(),
            rotate: zero_rotation(),
            translate: zero_translation(),
        }
    }
}

/// Renderer backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderKind {
    /// Ray tracing
    Rt,
    /// Rasterization
    Rs,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderSettings {
    #[serde(rename = "type")]
    pub kind: RenderKind,
    /// Samples per pixel
    pub spp: u32,
    #[serde(default)]
    pub ui: bool,
    pub background: [f64; 3],
}

impl RenderSettings {
    pub fn is_ray_traced(&self) -> bool {
        self.kind == RenderKind::Rt
    }

    pub fn background_color(&self) -> Color {
        self.background.into()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Png,
    Bmp,
}

impl ImageFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Bmp => "bmp",
        }
    }
}

/// Output image settings.
///
/// Width and height are kept signed so that non-positive values survive
/// parsing and can be reported by the camera builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageSettings {
    pub scene_name: String,
    pub file_suffix: ImageFormat,
    pub width: i64,
    pub height: i64,
}

impl ImageSettings {
    /// Path of the `index`-th rendered image: `{sceneName}/spp_{spp}_v{index}.{suffix}`
    pub fn output_path(&self, spp: u32, index: u32) -> PathBuf {
        PathBuf::from(&self.scene_name).join(format!(
            "spp_{}_v{}.{}",
            spp,
            index,
            self.file_suffix.extension()
        ))
    }
}
