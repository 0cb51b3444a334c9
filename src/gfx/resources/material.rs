//! Material system for scene resolution
//!
//! Provides material definitions and the registry of named materials.
//! Named materials are declared once under `materials` and shared by every
//! object that references them; inline materials are built per object and
//! never registered.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SceneError};
use crate::gfx::value::{Color, Scalar, VectorExpr};
use crate::vars::constants::ConstantTable;
use crate::vars::imports::MaterialDeclarations;

/// Material ID for referencing registered materials
pub type MaterialId = String;

/// The four material kinds a scene can declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialKind {
    Diffuse,
    DiffuseLight,
    Mirror,
    Refract,
}

impl MaterialKind {
    /// Name used in documents, both as `materials` key and inline `type` tag
    pub fn name(&self) -> &'static str {
        match self {
            MaterialKind::Diffuse => "diffuse",
            MaterialKind::DiffuseLight => "diffuse_light",
            MaterialKind::Mirror => "mirror",
            MaterialKind::Refract => "refract",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "diffuse" => Some(MaterialKind::Diffuse),
            "diffuse_light" => Some(MaterialKind::DiffuseLight),
            "mirror" => Some(MaterialKind::Mirror),
            "refract" => Some(MaterialKind::Refract),
            _ => None,
        }
    }
}

impl std::fmt::Display for MaterialKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Resolved material definition, all constants substituted
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MaterialDef {
    /// Lambertian surface colored by a solid color or an image
    Diffuse {
        solid: Option<Color>,
        image: Option<PathBuf>,
    },
    /// Area light
    DiffuseLight { emit: Color },
    Mirror { albedo: Color },
    /// Dielectric with the given refractive index
    Refract { index: f64 },
}

impl MaterialDef {
    pub fn kind(&self) -> MaterialKind {
        match self {
            MaterialDef::Diffuse { .. } => MaterialKind::Diffuse,
            MaterialDef::DiffuseLight { .. } => MaterialKind::DiffuseLight,
            MaterialDef::Mirror { .. } => MaterialKind::Mirror,
            MaterialDef::Refract { .. } => MaterialKind::Refract,
        }
    }

    /// Whether objects using this material act as light sources
    pub fn is_light(&self) -> bool {
        matches!(self, MaterialDef::DiffuseLight { .. })
    }

    /// Parses and resolves the fields of a `kind` material.
    ///
    /// # Arguments
    /// * `kind` - Material kind selected by the dictionary or the `type` tag
    /// * `json` - The material's field object
    /// * `constants` - Merged constant table used for references
    /// * `name` - Material name (or field path for inline materials), used in errors
    /// * `path` - Field path of the material, prefixed to its field names in errors
    pub fn parse(
        kind: MaterialKind,
        json: &serde_json::Value,
        constants: &ConstantTable,
        name: &str,
        path: &str,
    ) -> Result<Self> {
        let invalid = |reason: String| SceneError::InvalidMaterialDefinition {
            name: name.to_string(),
            reason,
        };
        let field = |key: &str| format!("{path}.{key}");

        let def = match kind {
            MaterialKind::Diffuse => {
                let raw = RawDiffuse::deserialize(json).map_err(|e| invalid(e.to_string()))?;
                match (raw.solid, raw.image) {
                    (Some(solid), None) => MaterialDef::Diffuse {
                        solid: Some(solid.resolve_vec3(constants, &field("solid"))?),
                        image: None,
                    },
                    (None, Some(image)) => MaterialDef::Diffuse {
                        solid: None,
                        image: Some(PathBuf::from(image)),
                    },
                    (Some(_), Some(_)) => {
                        return Err(invalid("both `solid` and `image` are set".to_string()))
                    }
                    (None, None) => {
                        return Err(invalid("one of `solid` or `image` is required".to_string()))
                    }
                }
            }
            MaterialKind::DiffuseLight => {
                let raw = RawDiffuseLight::deserialize(json).map_err(|e| invalid(e.to_string()))?;
                MaterialDef::DiffuseLight {
                    emit: raw.emit.resolve_vec3(constants, &field("emit"))?,
                }
            }
            MaterialKind::Mirror => {
                let raw = RawMirror::deserialize(json).map_err(|e| invalid(e.to_string()))?;
                MaterialDef::Mirror {
                    albedo: raw.albedo.resolve_vec3(constants, &field("albedo"))?,
                }
            }
            MaterialKind::Refract => {
                let raw = RawRefract::deserialize(json).map_err(|e| invalid(e.to_string()))?;
                let index = raw.index.resolve(constants, &field("index"))?;
                if !index.is_finite() || index <= 0.0 {
                    return Err(invalid(format!(
                        "refractive index must be positive, got {index}"
                    )));
                }
                MaterialDef::Refract { index }
            }
        };

        Ok(def)
    }
}

#[derive(Deserialize)]
struct RawDiffuse {
    solid: Option<VectorExpr>,
    image: Option<String>,
}

#[derive(Deserialize)]
struct RawDiffuseLight {
    emit: VectorExpr,
}

#[derive(Deserialize)]
struct RawMirror {
    albedo: VectorExpr,
}

#[derive(Deserialize)]
struct RawRefract {
    index: Scalar,
}

/// Material used by an object
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum MaterialRef {
    /// Key into the [`MaterialRegistry`]
    Named(MaterialId),
    /// Literal material owned by a single object
    Inline(MaterialDef),
}

impl MaterialRef {
    /// Gets the definition this reference points at
    pub fn definition<'a>(&'a self, registry: &'a MaterialRegistry) -> Option<&'a MaterialDef> {
        match self {
            MaterialRef::Named(id) => registry.get(id),
            MaterialRef::Inline(def) => Some(def),
        }
    }

    pub fn is_inline(&self) -> bool {
        matches!(self, MaterialRef::Inline(_))
    }
}

/// Registry of named materials
///
/// Names are unique across all kinds and across all documents. Entries are
/// immutable once registered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaterialRegistry {
    materials: HashMap<MaterialId, MaterialDef>,
    order: Vec<MaterialId>,
}

impl MaterialRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the registry from every document's `materials` section.
    ///
    /// Sections are registered in the given order, kinds in the order
    /// diffuse, diffuse_light, mirror, refract, and entries in declaration
    /// order. Constant references are resolved against `constants` only;
    /// materials cannot reference other materials.
    pub fn build(declarations: &[MaterialDeclarations], constants: &ConstantTable) -> Result<Self> {
        let mut registry = Self::new();
        let mut declared_in: HashMap<&str, &Path> = HashMap::new();

        for decl in declarations {
            log::debug!("registering materials from {}", decl.origin.display());
            for (kind, name, json) in decl.section.entries() {
                if let (Some(first), Some(first_origin)) =
                    (registry.kind_of(name), declared_in.get(name))
                {
                    return Err(SceneError::DuplicateMaterialName {
                        name: name.to_string(),
                        first,
                        first_origin: first_origin.to_path_buf(),
                        second: kind,
                        second_origin: decl.origin.clone(),
                    });
                }
                // e.g. "lib.json: materials.mirror.chrome"
                let path = format!("{}: materials.{}.{}", decl.origin.display(), kind, name);
                let def = MaterialDef::parse(kind, json, constants, name, &path)
                    .map_err(|e| into_material_error(e, name))?;
                declared_in.insert(name, decl.origin.as_path());
                registry.register(name, def);
            }
        }

        Ok(registry)
    }

    fn register(&mut self, name: &str, def: MaterialDef) {
        log::trace!("registered {} material '{}'", def.kind(), name);
        self.order.push(name.to_string());
        self.materials.insert(name.to_string(), def);
    }

    /// Gets a material by ID
    pub fn get(&self, id: &str) -> Option<&MaterialDef> {
        self.materials.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.materials.contains_key(id)
    }

    /// Kind of the material registered under `id`
    pub fn kind_of(&self, id: &str) -> Option<MaterialKind> {
        self.get(id).map(MaterialDef::kind)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Materials in registration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MaterialDef)> {
        self.order
            .iter()
            .map(move |id| (id.as_str(), &self.materials[id]))
    }

    /// Resolves an object's `material` field.
    ///
    /// A string is looked up in the registry. An object literal selects its
    /// kind through the `type` tag and is resolved like a named declaration,
    /// but is returned as [`MaterialRef::Inline`] and never registered.
    ///
    /// # Arguments
    /// * `raw` - The object's `material` field
    /// * `constants` - Merged constant table
    /// * `field` - Field path of `raw`, used in errors
    pub fn resolve_reference(
        &self,
        raw: &serde_json::Value,
        constants: &ConstantTable,
        field: &str,
    ) -> Result<MaterialRef> {
        match raw {
            serde_json::Value::String(name) => {
                if self.contains(name) {
                    Ok(MaterialRef::Named(name.clone()))
                } else {
                    Err(SceneError::UnknownMaterial {
                        name: name.clone(),
                        field: field.to_string(),
                    })
                }
            }
            serde_json::Value::Object(fields) => {
                let invalid = |reason: String| SceneError::InvalidMaterialDefinition {
                    name: field.to_string(),
                    reason,
                };
                let tag = fields
                    .get("type")
                    .and_then(serde_json::Value::as_str)
                    .ok_or_else(|| invalid("inline material needs a string `type`".to_string()))?;
                let kind = MaterialKind::from_name(tag)
                    .ok_or_else(|| invalid(format!("unknown material type `{tag}`")))?;

                MaterialDef::parse(kind, raw, constants, field, field)
                    .map(MaterialRef::Inline)
                    .map_err(|e| into_material_error(e, field))
            }
            other => Err(SceneError::InvalidMaterialDefinition {
                name: field.to_string(),
                reason: format!("expected a material name or an inline material, got {other}"),
            }),
        }
    }
}

/// Malformed operands inside a material are reported as material errors
fn into_material_error(err: SceneError, name: &str) -> SceneError {
    match err {
        SceneError::InvalidField { field, reason } => SceneError::InvalidMaterialDefinition {
            name: name.to_string(),
            reason: format!("{field}: {reason}"),
        },
        other => other,
    }
}

impl Serialize for MaterialRegistry {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (id, def) in self.iter() {
            map.serialize_entry(id, def)?;
        }
        map.end()
    }
}
