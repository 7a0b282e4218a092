//! High-level scene pack loading.
//!
//! `.rtr` files are parsed, their `models` entries resolved against the
//! file's directory and loaded through the OBJ importer, and the result is
//! validated into a [`ScenePack`]. `.json` files deserialize directly.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::obj::load_obj;
use crate::primitive::Primitive;
use crate::rtr::parser::{parse_rtr, ObjectDecl, ParseError};
use crate::scene::{Object, SceneError, ScenePack};

/// Errors that can occur while loading a scene pack.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Invalid scene pack: {0}")]
    Scene(#[from] SceneError),

    #[error("Failed to load model {path}: {source}")]
    Obj {
        path: PathBuf,
        source: tobj::LoadError,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for loading operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Load a scene pack from disk.
///
/// Files ending in `.json` are read as JSON packs; anything else is parsed
/// as `.rtr` text.
///
/// # Example
///
/// ```ignore
/// use rtr_core::load_scene_pack;
///
/// let pack = load_scene_pack("scenes.rtr")?;
/// println!("Loaded {} scenes", pack.scene_count());
/// ```
pub fn load_scene_pack<P: AsRef<Path>>(path: P) -> LoadResult<ScenePack> {
    let path = path.as_ref();
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    if is_json {
        let content = read(path)?;
        let pack = ScenePack::from_json(&content)?;
        log::info!("Loaded {} scenes from {}", pack.scene_count(), path.display());
        Ok(pack)
    } else {
        load_rtr(path)
    }
}

/// Load a `.rtr` file. Model paths are relative to the file's directory.
pub fn load_rtr<P: AsRef<Path>>(path: P) -> LoadResult<ScenePack> {
    let path = path.as_ref();
    let content = read(path)?;
    let base_dir = path.parent().map(Path::to_path_buf);

    let pack = load_rtr_from_string(&content, base_dir)?;
    log::info!("Loaded {} scenes from {}", pack.scene_count(), path.display());
    Ok(pack)
}

/// Load a scene pack from `.rtr` content.
///
/// Relative model paths are resolved against `base_dir` when given, and
/// against the working directory otherwise.
pub fn load_rtr_from_string(content: &str, base_dir: Option<PathBuf>) -> LoadResult<ScenePack> {
    let doc = parse_rtr(content)?;

    let mut objects = Vec::with_capacity(doc.objects.len());
    for decl in doc.objects {
        let object = match decl {
            ObjectDecl::Inline(object) => object,
            ObjectDecl::Model(model) => {
                let path = match &base_dir {
                    Some(dir) => dir.join(&model.path),
                    None => PathBuf::from(&model.path),
                };
                let mesh = load_obj(&path, model.shift, model.scale)
                    .map_err(|source| LoadError::Obj { path, source })?;
                Object::new(Primitive::Mesh(mesh), model.material)
            }
        };
        objects.push(object);
    }

    Ok(ScenePack::new(objects, doc.materials, doc.lights, doc.scenes)?)
}

fn read(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rtr_math::Vec3;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("rtr_loader_{}_{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    const SIMPLE: &str = "
lights
#0 0 10 0 1
--
materials
#0 ff0000ff 1 0 0 0 10 1
--
objects
spheres
#0 0 0 -5 1 0
--
scenes
#0 8x6 0 0 0 0 0 0 1.0 2 { 0 } { 0 }
--
";

    #[test]
    fn test_load_from_string() {
        let pack = load_rtr_from_string(SIMPLE, None).unwrap();
        assert_eq!(pack.scene_count(), 1);
        assert_eq!(pack.objects().len(), 1);
        assert_eq!(pack.scene(0).unwrap().pixel_count(), 48);
    }

    #[test]
    fn test_load_reports_dangling_reference() {
        let content = SIMPLE.replace("{ 0 } { 0 }", "{ 0 } { 4 }");
        let err = load_rtr_from_string(&content, None).unwrap_err();
        assert!(matches!(
            err,
            LoadError::Scene(SceneError::MissingLight { light: 4, .. })
        ));
    }

    #[test]
    fn test_load_resolves_models_against_base_dir() {
        let dir = temp_dir("models");
        std::fs::write(dir.join("tri.obj"), "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();

        let content = SIMPLE.replace(
            "#0 0 0 -5 1 0",
            "#0 0 0 -5 1 0\nmodels\n#1 tri.obj 0 0 -3 2 0",
        );
        let content = content.replace("{ 0 } { 0 }", "{ 0 1 } { 0 }");
        let pack = load_rtr_from_string(&content, Some(dir.clone())).unwrap();

        match &pack.objects()[1].primitive {
            Primitive::Mesh(mesh) => {
                assert_eq!(mesh.triangle_count(), 1);
                assert_eq!(mesh.bounds().max(), Vec3::new(2.0, 2.0, -3.0));
            }
            other => panic!("expected mesh, got {}", other.kind()),
        }

        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_load_missing_model() {
        let content = SIMPLE.replace("spheres", "models\n#1 missing.obj 0 0 0 1 0\nspheres");
        let err = load_rtr_from_string(&content, Some(temp_dir("missing"))).unwrap_err();
        assert!(matches!(err, LoadError::Obj { .. }));
    }

    #[test]
    fn test_load_scene_pack_dispatches_on_extension() {
        let dir = temp_dir("dispatch");

        let rtr = dir.join("pack.rtr");
        std::fs::write(&rtr, SIMPLE).unwrap();
        assert_eq!(load_scene_pack(&rtr).unwrap().scene_count(), 1);

        let json = dir.join("pack.json");
        std::fs::write(&json, r#"{ "materials": [], "scenes": [] }"#).unwrap();
        assert_eq!(load_scene_pack(&json).unwrap().scene_count(), 0);

        let err = load_scene_pack(dir.join("absent.rtr")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));

        std::fs::remove_dir_all(dir).ok();
    }
}
