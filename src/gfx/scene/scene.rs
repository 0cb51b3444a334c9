//! # Scene Assembly
//!
//! Turns a parsed [`SceneDocument`] into a [`ResolvedScene`]: imports are
//! merged, named materials registered, every object's transform and material
//! resolved, and the camera frame built. The first fatal error aborts the
//! whole pass; constant collisions are returned next to the scene.

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;

use crate::config::ResolveOptions;
use crate::error::{ResolveWarning, Result};
use crate::gfx::camera::CameraFrame;
use crate::gfx::resources::material::{MaterialDef, MaterialRegistry};
use crate::gfx::scene::document::{
    ImageSettings, ObjectsSection, RawModel, RenderSettings, SceneDocument, SceneSection,
};
use crate::gfx::scene::object::{ModelInstance, ObjectInstance, Shape, Transform};
use crate::vars::constants::ConstantTable;
use crate::vars::imports::ImportResolver;
use crate::vars::loader::{normalize_path, DocumentLoader};

/// Fully resolved scene, ready for a renderer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedScene {
    /// Merged constants, kept for diagnostics
    pub constants: ConstantTable,
    pub materials: MaterialRegistry,
    /// Spheres first, then flats, each in declaration order
    pub objects: Vec<ObjectInstance>,
    pub models: Vec<ModelInstance>,
    pub camera: CameraFrame,
    pub render: RenderSettings,
    pub image: ImageSettings,
}

impl ResolvedScene {
    /// Gets the material definition used by `object`
    pub fn material_of<'a>(&'a self, object: &'a ObjectInstance) -> Option<&'a MaterialDef> {
        object.material.definition(&self.materials)
    }

    /// Gets statistics about the scene
    pub fn statistics(&self) -> SceneStatistics {
        SceneStatistics {
            object_count: self.objects.len(),
            named_material_count: self.materials.len(),
            inline_material_count: self
                .objects
                .iter()
                .filter(|obj| obj.material.is_inline())
                .count(),
            light_count: self
                .objects
                .iter()
                .filter(|obj| self.material_of(obj).is_some_and(MaterialDef::is_light))
                .count(),
            model_count: self.models.len(),
            constant_count: self.constants.len(),
        }
    }
}

/// Scene statistics for driver summaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SceneStatistics {
    pub object_count: usize,
    pub named_material_count: usize,
    pub inline_material_count: usize,
    /// Objects whose material emits light
    pub light_count: usize,
    pub model_count: usize,
    pub constant_count: usize,
}

/// A resolved scene and the warnings collected while resolving it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolution {
    pub scene: ResolvedScene,
    /// Warnings in processing order
    pub warnings: Vec<ResolveWarning>,
}

/// Resolves `document` into a [`ResolvedScene`].
///
/// # Arguments
/// * `document` - Parsed root document
/// * `origin` - Path of the root document; imports are resolved relative to it
/// * `loader` - Source of imported documents
/// * `options` - Timeout, concurrency and cancellation settings
pub fn assemble(
    document: SceneDocument,
    origin: &Path,
    loader: Arc<dyn DocumentLoader>,
    options: &ResolveOptions,
) -> Result<Resolution> {
    options.cancel.check()?;

    let origin = normalize_path(origin);
    let SceneDocument {
        render,
        image,
        camera,
        scene,
    } = document;
    let SceneSection {
        vars,
        objects,
        models,
    } = scene;

    let merged = ImportResolver::new(loader, options).resolve(vars, &origin)?;
    let materials = MaterialRegistry::build(&merged.materials, &merged.constants)?;
    let objects = resolve_objects(&objects, &merged.constants, &materials, options)?;
    let models = resolve_models(&models, &merged.constants, options)?;
    let camera = CameraFrame::build(&camera, image.width, image.height)?;

    log::debug!(
        "resolved {}: {} objects, {} named materials, {} models, {} warnings",
        origin.display(),
        objects.len(),
        materials.len(),
        models.len(),
        merged.warnings.len()
    );

    Ok(Resolution {
        scene: ResolvedScene {
            constants: merged.constants,
            materials,
            objects,
            models,
            camera,
            render,
            image,
        },
        warnings: merged.warnings,
    })
}

fn resolve_objects(
    section: &ObjectsSection,
    constants: &ConstantTable,
    materials: &MaterialRegistry,
    options: &ResolveOptions,
) -> Result<Vec<ObjectInstance>> {
    let mut objects = Vec::with_capacity(section.len());

    for (kind, raw_objects) in section.by_kind() {
        for (index, raw) in raw_objects.iter().enumerate() {
            options.cancel.check()?;

            let field = format!("scene.objects.{}[{}]", kind.name(), index);
            if raw.hide {
                log::trace!("skipping hidden {field}");
                continue;
            }
            let transform =
                Transform::resolve(&raw.transform, constants, &format!("{field}.transform"))?;
            let material =
                materials.resolve_reference(&raw.material, constants, &format!("{field}.material"))?;

            log::trace!("resolved {field}");
            objects.push(ObjectInstance {
                shape: Shape {
                    kind,
                    structure: raw.structure.clone(),
                },
                transform,
                material,
            });
        }
    }

    Ok(objects)
}

fn resolve_models(
    raw_models: &[RawModel],
    constants: &ConstantTable,
    options: &ResolveOptions,
) -> Result<Vec<ModelInstance>> {
    let mut models = Vec::with_capacity(raw_models.len());

    for (index, raw) in raw_models.iter().enumerate() {
        options.cancel.check()?;
        if raw.hide {
            continue;
        }

        let field = format!("scene.models[{index}].transform");
        models.push(ModelInstance {
            obj_path: raw.obj_path.clone(),
            texture_path: raw.texture_path.clone(),
            shader_type: raw.shader_type,
            transform: Transform::resolve(&raw.transform, constants, &field)?,
        });
    }

    Ok(models)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CancellationToken;
    use crate::error::SceneError;
    use crate::gfx::resources::material::{MaterialKind, MaterialRef};
    use crate::gfx::scene::object::ShapeKind;
    use crate::gfx::value::Value;
    use crate::vars::loader::MemoryLoader;
    use approx::assert_relative_eq;
    use cgmath::Vector3;
    use serde_json::json;

    fn document(scene: serde_json::Value) -> SceneDocument {
        serde_json::from_value(json!({
            "render": { "type": "rt", "spp": 16, "ui": false, "background": [0, 0, 0] },
            "image": { "sceneName": "test", "fileSuffix": "png", "width": 1920, "height": 1080 },
            "camera": { "eye": [0, 0, 5], "target": [0, 0, 0], "rotate": 0, "fov": 60 },
            "scene": scene
        }))
        .unwrap()
    }

    fn assemble_with(loader: MemoryLoader, scene: serde_json::Value) -> Result<Resolution> {
        assemble(
            document(scene),
            Path::new("scene.json"),
            Arc::new(loader),
            &ResolveOptions::default(),
        )
    }

    fn box_scene() -> serde_json::Value {
        json!({
            "vars": {
                "constants": { "red": [1, 0, 0], "k": 0.9, "lift": 2 },
                "materials": {
                    "diffuse": { "wall": { "solid": "red" } },
                    "diffuse_light": { "lamp": { "emit": [4, 4, 4] } }
                }
            },
            "objects": {
                "sphere": [
                    { "material": "wall", "transform": { "translate": [0, "lift", 0] } },
                    { "material": "lamp" }
                ],
                "flat": [
                    { "structure": { "size": 10 }, "material": { "type": "mirror", "albedo": [0.9, "k", 0.9] } }
                ]
            },
            "models": [ { "objPath": "bunny.obj", "texturePath": "bunny.png", "shaderType": "vertex" } ]
        })
    }

    #[test]
    fn test_resolving_twice_is_deterministic() {
        let first = assemble_with(MemoryLoader::new(), box_scene()).unwrap();
        let second = assemble_with(MemoryLoader::new(), box_scene()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_objects_keep_kind_then_declaration_order() {
        let scene = assemble_with(MemoryLoader::new(), box_scene()).unwrap().scene;

        let kinds: Vec<ShapeKind> = scene.objects.iter().map(|o| o.shape.kind).collect();
        assert_eq!(kinds, vec![ShapeKind::Sphere, ShapeKind::Sphere, ShapeKind::Flat]);
        assert_eq!(scene.objects[0].material, MaterialRef::Named("wall".to_string()));
        assert_eq!(scene.objects[0].transform.translate, Vector3::new(0.0, 2.0, 0.0));
        assert_eq!(scene.objects[2].shape.structure, json!({ "size": 10 }));
        assert_eq!(
            scene.objects[2].material,
            MaterialRef::Inline(MaterialDef::Mirror {
                albedo: Vector3::new(0.9, 0.9, 0.9)
            })
        );
        assert_eq!(scene.models.len(), 1);
    }

    #[test]
    fn test_canonical_camera_and_exact_aspect() {
        let camera = assemble_with(MemoryLoader::new(), json!({})).unwrap().scene.camera;

        for (axis, expected) in [
            (camera.forward, [0.0, 0.0, -1.0]),
            (camera.up, [0.0, 1.0, 0.0]),
            (camera.right, [1.0, 0.0, 0.0]),
        ] {
            assert_relative_eq!(axis.x, expected[0], epsilon = 1e-12);
            assert_relative_eq!(axis.y, expected[1], epsilon = 1e-12);
            assert_relative_eq!(axis.z, expected[2], epsilon = 1e-12);
        }
        assert_eq!(camera.aspect, 1920.0 / 1080.0);
    }

    #[test]
    fn test_unknown_material_is_fatal() {
        let result = assemble_with(
            MemoryLoader::new(),
            json!({ "objects": { "sphere": [ { "material": "wall" } ] } }),
        );
        match result {
            Err(SceneError::UnknownMaterial { name, field }) => {
                assert_eq!(name, "wall");
                assert_eq!(field, "scene.objects.sphere[0].material");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_degenerate_scale_names_object() {
        let result = assemble_with(
            MemoryLoader::new(),
            json!({ "objects": { "flat": [
                { "material": { "type": "refract", "index": 1.5 } },
                { "material": { "type": "refract", "index": 1.5 }, "transform": { "scale": [1, 1, 0] } }
            ] } }),
        );
        assert!(matches!(
            result,
            Err(SceneError::DegenerateScale { ref field, .. }) if field == "scene.objects.flat[1].transform.scale"
        ));
    }

    #[test]
    fn test_self_import_is_a_cycle() {
        let loader = MemoryLoader::new().with_document("scene.json", r#"{ "imports": ["scene.json"] }"#);
        let result = assemble_with(loader, json!({ "vars": { "imports": ["./scene.json"] } }));
        match result {
            Err(SceneError::CyclicImport { cycle }) => {
                assert_eq!(cycle, vec![Path::new("scene.json"), Path::new("scene.json")]);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_collision_warning_is_returned_with_scene() {
        let loader = MemoryLoader::new()
            .with_document("one.json", r#"{ "constants": { "k": 1 } }"#)
            .with_document("two.json", r#"{ "constants": { "k": 2 } }"#);
        let resolution = assemble_with(
            loader,
            json!({ "vars": { "imports": ["one.json", "two.json"] } }),
        )
        .unwrap();

        assert_eq!(resolution.scene.constants.get("k"), Some(&Value::Number(2.0)));
        assert_eq!(resolution.warnings.len(), 1);
        assert!(resolution.warnings[0].to_string().contains("'k'"));
    }

    #[test]
    fn test_imported_materials_see_root_constants() {
        let loader = MemoryLoader::new().with_document(
            "lib/materials.json",
            r#"{ "materials": { "mirror": { "chrome": { "albedo": "tint" } } } }"#,
        );
        let scene = assemble_with(
            loader,
            json!({
                "vars": { "imports": ["lib/materials.json"], "constants": { "tint": [0.5, 0.5, 0.5] } },
                "objects": { "sphere": [ { "material": "chrome" } ] }
            }),
        )
        .unwrap()
        .scene;

        assert_eq!(scene.materials.kind_of("chrome"), Some(MaterialKind::Mirror));
        assert_eq!(
            scene.material_of(&scene.objects[0]),
            Some(&MaterialDef::Mirror {
                albedo: Vector3::new(0.5, 0.5, 0.5)
            })
        );
    }

    #[test]
    fn test_identical_inline_materials_stay_separate() {
        let inline = json!({ "type": "diffuse_light", "emit": [1, 1, 1] });
        let scene = assemble_with(
            MemoryLoader::new(),
            json!({ "objects": { "sphere": [ { "material": inline }, { "material": inline } ] } }),
        )
        .unwrap()
        .scene;

        assert!(scene.materials.is_empty());
        assert!(scene.objects.iter().all(|o| o.material.is_inline()));
    }

    #[test]
    fn test_invalid_dimensions() {
        let mut doc = document(json!({}));
        doc.image.height = 0;
        let result = assemble(
            doc,
            Path::new("scene.json"),
            Arc::new(MemoryLoader::new()),
            &ResolveOptions::default(),
        );
        assert!(matches!(
            result,
            Err(SceneError::InvalidImageDimensions { width: 1920, height: 0 })
        ));
    }

    #[test]
    fn test_cancelled_resolution_returns_nothing() {
        let token = CancellationToken::new();
        token.cancel();
        let options = ResolveOptions::default().with_cancellation(token);

        let result = assemble(
            document(box_scene()),
            Path::new("scene.json"),
            Arc::new(MemoryLoader::new()),
            &options,
        );
        assert!(matches!(result, Err(SceneError::Cancelled)));
    }

    #[test]
    fn test_cancellation_is_checked_per_object() {
        let objects: ObjectsSection = serde_json::from_value(json!({
            "sphere": [ { "material": { "type": "refract", "index": 1.5 } } ]
        }))
        .unwrap();
        let token = CancellationToken::new();
        let options = ResolveOptions::default().with_cancellation(token.clone());

        let resolved =
            resolve_objects(&objects, &ConstantTable::new(), &MaterialRegistry::new(), &options)
                .unwrap();
        assert_eq!(resolved.len(), 1);

        token.cancel();
        let result =
            resolve_objects(&objects, &ConstantTable::new(), &MaterialRegistry::new(), &options);
        assert!(matches!(result, Err(SceneError::Cancelled)));

        let empty = ObjectsSection::default();
        assert!(resolve_objects(&empty, &ConstantTable::new(), &MaterialRegistry::new(), &options)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_hidden_entries_are_skipped() {
        let scene = assemble_with(
            MemoryLoader::new(),
            json!({
                "objects": { "sphere": [
                    { "material": { "type": "mirror", "albedo": [1, 1, 1] } },
                    { "material": "missing", "hide": true },
                    { "material": { "type": "mirror", "albedo": [0, 0, 0] }, "hide": false }
                ] },
                "models": [
                    { "objPath": "a.obj", "texturePath": "a.png", "shaderType": "vertex", "hide": true },
                    { "objPath": "b.obj", "texturePath": "b.png", "shaderType": "fragment" }
                ]
            }),
        )
        .unwrap()
        .scene;

        assert_eq!(scene.objects.len(), 2);
        assert_eq!(scene.models.len(), 1);
        assert_eq!(scene.models[0].obj_path, "b.obj");
    }

    #[test]
    fn test_model_transform_is_resolved() {
        let scene = assemble_with(
            MemoryLoader::new(),
            json!({
                "vars": { "constants": { "up": [0, 2, 0] } },
                "models": [ {
                    "objPath": "a.obj", "texturePath": "a.png", "shaderType": "vertex",
                    "transform": { "translate": "up", "rotate": [90, 0] }
                } ]
            }),
        )
        .unwrap()
        .scene;

        let model = &scene.models[0];
        assert_eq!(model.transform.translate, Vector3::new(0.0, 2.0, 0.0));
        assert!(matches!(
            model.transform.rotate,
            crate::gfx::scene::object::RotateSpec::AzimuthElevation { .. }
        ));

        let json = serde_json::to_value(model).unwrap();
        assert_eq!(json["transform"]["translate"]["y"], 2.0);
    }

    #[test]
    fn test_model_degenerate_scale() {
        let result = assemble_with(
            MemoryLoader::new(),
            json!({ "models": [ {
                "objPath": "a.obj", "texturePath": "a.png", "shaderType": "vertex",
                "transform": { "scale": [0, 1, 1] }
            } ] }),
        );
        assert!(matches!(
            result,
            Err(SceneError::DegenerateScale { ref field, .. }) if field == "scene.models[0].transform.scale"
        ));
    }

    #[test]
    fn test_statistics() {
        let stats = assemble_with(MemoryLoader::new(), box_scene())
            .unwrap()
            .scene
            .statistics();
        assert_eq!(
            stats,
            SceneStatistics {
                object_count: 3,
                named_material_count: 2,
                inline_material_count: 1,
                light_count: 1,
                model_count: 1,
                constant_count: 3,
            }
        );
    }

    #[test]
    fn test_resolved_scene_serializes() {
        let resolution = assemble_with(MemoryLoader::new(), box_scene()).unwrap();
        let json = serde_json::to_value(&resolution).unwrap();
        assert_eq!(json["scene"]["materials"]["wall"]["type"], "diffuse");
        assert_eq!(json["scene"]["image"]["sceneName"], "test");
        assert_eq!(json["scene"]["objects"].as_array().map(Vec::len), Some(3));
    }
}
