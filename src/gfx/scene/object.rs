use cgmath::{Deg, Matrix3, Matrix4, Rad, Vector3};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SceneError};
use crate::gfx::camera::camera_utils::azimuth_elevation_rotation;
use crate::gfx::resources::material::MaterialRef;
use crate::gfx::scene::document::RawTransform;
use crate::gfx::value::Value;
use crate::vars::constants::ConstantTable;

/// Object rotation. The variant fixes the order in which angles apply.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "order", rename_all = "snake_case")]
pub enum RotateSpec {
    /// Azimuth about world `+y`, then elevation about the rotated `x` axis
    AzimuthElevation { azimuth: Deg<f64>, elevation: Deg<f64> },
    /// Rotation about `x`, then `y`, then `z`
    Xyz { x: Deg<f64>, y: Deg<f64>, z: Deg<f64> },
}

impl Default for RotateSpec {
    fn default() -> Self {
        RotateSpec::Xyz {
            x: Deg(0.0),
            y: Deg(0.0),
            z: Deg(0.0),
        }
    }
}

impl RotateSpec {
    /// Decodes a rotation from its arity: Vec2 is azimuth/elevation, Vec3 is xyz
    pub fn from_value(value: Value, field: &str) -> Result<Self> {
        match value {
            Value::Vec2(v) => Ok(RotateSpec::AzimuthElevation {
                azimuth: Deg(v.x),
                elevation: Deg(v.y),
            }),
            Value::Vec3(v) => Ok(RotateSpec::Xyz {
                x: Deg(v.x),
                y: Deg(v.y),
                z: Deg(v.z),
            }),
            Value::Number(_) => Err(SceneError::InvalidField {
                field: field.to_string(),
                reason: "rotation needs 2 (azimuth, elevation) or 3 (x, y, z) angles".to_string(),
            }),
        }
    }

    pub fn matrix(&self) -> Matrix3<f64> {
        match *self {
            RotateSpec::AzimuthElevation { azimuth, elevation } => {
                azimuth_elevation_rotation(Rad::from(azimuth), Rad::from(elevation))
            }
            RotateSpec::Xyz { x, y, z } => {
                Matrix3::from_angle_z(z) * Matrix3::from_angle_y(y) * Matrix3::from_angle_x(x)
            }
        }
    }
}

/// Resolved object transform
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Transform {
    pub scale: Vector3<f64>,
    pub rotate: RotateSpec,
    pub translate: Vector3<f64>,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            scale: Vector3::new(1.0, 1.0, 1.0),
            rotate: RotateSpec::default(),
            translate: Vector3::new(0.0, 0.0, 0.0),
        }
    }
}

impl Transform {
    /// Resolves constant references in `raw` and validates the scale.
    ///
    /// # Arguments
    /// * `raw` - Transform as written in the document
    /// * `constants` - Merged constant table
    /// * `field` - Field path of the transform, used in errors
    pub fn resolve(raw: &RawTransform, constants: &ConstantTable, field: &str) -> Result<Self> {
        let scale = raw
            .scale
            .resolve_vec3(constants, &format!("{field}.scale"))?;
        if [scale.x, scale.y, scale.z]
            .iter()
            .any(|c| *c == 0.0 || !c.is_finite())
        {
            return Err(SceneError::DegenerateScale {
                field: format!("{field}.scale"),
                scale: scale.into(),
            });
        }

        let rotate_field = format!("{field}.rotate");
        let rotate =
            RotateSpec::from_value(raw.rotate.resolve(constants, &rotate_field)?, &rotate_field)?;

        let translate = raw
            .translate
            .resolve_vec3(constants, &format!("{field}.translate"))?;

        Ok(Self {
            scale,
            rotate,
            translate,
        })
    }

    /// Object-to-world matrix, `T * R * S`
    pub fn matrix(&self) -> Matrix4<f64> {
        let t = Matrix4::from_translation(self.translate);
        let r = Matrix4::from(self.rotate.matrix());
        let s = Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z);
        t * r * s // Order matters: T * R * S
    }
}

/// Primitive kinds a scene can list under `objects`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    Sphere,
    Flat,
}

impl ShapeKind {
    pub fn name(&self) -> &'static str {
        match self {
            ShapeKind::Sphere => "sphere",
            ShapeKind::Flat => "flat",
        }
    }
}

/// Geometry of an object. `structure` is kind-specific and left uninterpreted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Shape {
    pub kind: ShapeKind,
    pub structure: serde_json::Value,
}

/// A resolved primitive ready for the renderer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectInstance {
    pub shape: Shape,
    pub transform: Transform,
    pub material: MaterialRef,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShaderType {
    Vertex,
    Fragment,
}

/// Model entry for the OBJ/texture loader, with its transform resolved
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInstance {
    pub obj_path: String,
    pub texture_path: String,
    pub shader_type: ShaderType,
    pub transform: Transform,
}
