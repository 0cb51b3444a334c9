//! Typed values shared by constants, materials, transforms and the camera.
//!
//! Scene documents are untyped JSON; this module gives them shapes. A [`Value`]
//! is what a constant holds. [`Scalar`] and [`VectorExpr`] are the operands
//! found inside material and transform fields, which may be literals or
//! references to constants.

use cgmath::{Vector2, Vector3};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SceneError};
use crate::vars::constants::ConstantTable;

/// RGB color, components nominally in `[0, 1]` (emitters may exceed 1)
pub type Color = Vector3<f64>;

/// A constant's value. The shape is fixed by the declaration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Vec2(Vector2<f64>),
    Vec3(Vector3<f64>),
}

/// Shape of a [`Value`], used in diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Number,
    Vec2,
    Vec3,
    /// Either vector arity
    Vector,
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ValueKind::Number => "number",
            ValueKind::Vec2 => "vec2",
            ValueKind::Vec3 => "vec3",
            ValueKind::Vector => "vec2 or vec3",
        };
        f.write_str(name)
    }
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Number(_) => ValueKind::Number,
            Value::Vec2(_) => ValueKind::Vec2,
            Value::Vec3(_) => ValueKind::Vec3,
        }
    }

    /// Parses a constant declaration.
    ///
    /// Only numbers and arrays of two or three numbers are accepted. Strings are
    /// rejected since constants may not depend on other constants.
    pub fn from_json(name: &str, json: &serde_json::Value) -> Result<Self> {
        let invalid = |reason: String| SceneError::InvalidConstant {
            name: name.to_string(),
            reason,
        };

        match json {
            serde_json::Value::Number(n) => n
                .as_f64()
                .map(Value::Number)
                .ok_or_else(|| invalid(format!("{n} is not representable as f64"))),
            serde_json::Value::Array(items) => {
                let components = items
                    .iter()
                    .map(|item| {
                        item.as_f64()
                            .ok_or_else(|| invalid(format!("component {item} is not a number")))
                    })
                    .collect::<Result<Vec<f64>>>()?;
                Value::from_components(&components).ok_or_else(|| {
                    invalid(format!(
                        "expected 2 or 3 components, got {}",
                        components.len()
                    ))
                })
            }
            serde_json::Value::String(other) => Err(invalid(format!(
                "constants cannot reference other constants (found \"{other}\")"
            ))),
            other => Err(invalid(format!("unsupported value {other}"))),
        }
    }

    fn from_components(components: &[f64]) -> Option<Self> {
        match *components {
            [x, y] => Some(Value::Vec2(Vector2::new(x, y))),
            [x, y, z] => Some(Value::Vec3(Vector3::new(x, y, z))),
            _ => None,
        }
    }
}

fn lookup<'a>(table: &'a ConstantTable, name: &str, field: &str) -> Result<&'a Value> {
    table.get(name).ok_or_else(|| SceneError::UnknownConstant {
        name: name.to_string(),
        field: field.to_string(),
    })
}

fn mismatch(name: &str, field: &str, expected: ValueKind, found: &Value) -> SceneError {
    SceneError::ConstantTypeMismatch {
        name: name.to_string(),
        field: field.to_string(),
        expected,
        found: found.kind(),
    }
}

/// A numeric operand: a literal or the name of a Number constant
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Literal(f64),
    Constant(String),
}

impl Scalar {
    pub fn resolve(&self, table: &ConstantTable, field: &str) -> Result<f64> {
        match self {
            Scalar::Literal(v) => Ok(*v),
            Scalar::Constant(name) => match lookup(table, name, field)? {
                Value::Number(v) => Ok(*v),
                other => Err(mismatch(name, field, ValueKind::Number, other)),
            },
        }
    }
}

/// A vector operand: the name of a vector constant, or a literal array whose
/// components are themselves [`Scalar`]s.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum VectorExpr {
    Constant(String),
    Components(Vec<Scalar>),
}

impl VectorExpr {
    /// Resolves to a Vec2 or Vec3 value; arity decides which.
    pub fn resolve(&self, table: &ConstantTable, field: &str) -> Result<Value> {
        self.resolve_as(table, field, ValueKind::Vector)
    }

    pub fn resolve_vec3(&self, table: &ConstantTable, field: &str) -> Result<Vector3<f64>> {
        match self.resolve_as(table, field, ValueKind::Vec3)? {
            Value::Vec3(v) => Ok(v),
            other => Err(self.arity_error(field, ValueKind::Vec3, &other)),
        }
    }

    /// `expected` is what a Number constant is reported against
    fn resolve_as(&self, table: &ConstantTable, field: &str, expected: ValueKind) -> Result<Value> {
        match self {
            VectorExpr::Constant(name) => match lookup(table, name, field)? {
                number @ Value::Number(_) => Err(mismatch(name, field, expected, number)),
                vector => Ok(*vector),
            },
            VectorExpr::Components(items) => {
                let components = items
                    .iter()
                    .enumerate()
                    .map(|(i, s)| s.resolve(table, &format!("{field}[{i}]")))
                    .collect::<Result<Vec<f64>>>()?;
                Value::from_components(&components).ok_or_else(|| SceneError::InvalidField {
                    field: field.to_string(),
                    reason: format!("expected 2 or 3 components, got {}", components.len()),
                })
            }
        }
    }

    fn arity_error(&self, field: &str, expected: ValueKind, found: &Value) -> SceneError {
        match self {
            VectorExpr::Constant(name) => mismatch(name, field, expected, found),
            VectorExpr::Components(_) => SceneError::InvalidField {
                field: field.to_string(),
                reason: format!("expected a {expected}, got a {}", found.kind()),
            },
        }
    }
}

impl From<[f64; 3]> for VectorExpr {
    fn from(v: [f64; 3]) -> Self {
        VectorExpr::Components(v.iter().map(|c| Scalar::Literal(*c)).collect())
    }
}
