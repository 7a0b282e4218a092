//! Wavefront OBJ mesh import.
//!
//! All models in the file are merged into a single [`Mesh`]; materials and
//! texture coordinates are ignored.

use std::io::BufRead;
use std::path::Path;

use rtr_math::Vec3;

use crate::mesh::Mesh;

fn load_options() -> tobj::LoadOptions {
    tobj::LoadOptions {
        single_index: true,
        triangulate: true,
        ..Default::default()
    }
}

/// Load an OBJ file, scale its vertices about the origin and move them by `shift`.
pub fn load_obj<P: AsRef<Path>>(path: P, shift: Vec3, scale: f64) -> Result<Mesh, tobj::LoadError> {
    let path = path.as_ref();
    let (models, _materials) = tobj::load_obj(path, &load_options())?;
    let mesh = merge_models(&models).transformed(shift, scale);

    if mesh.is_empty() {
        log::warn!("OBJ file {} contains no triangles", path.display());
    } else {
        log::info!(
            "Loaded {}: {} triangles, size {:.3}",
            path.display(),
            mesh.triangle_count(),
            mesh.size()
        );
    }
    Ok(mesh)
}

/// Load OBJ data from a reader. `mtllib` statements are ignored.
pub fn load_obj_buf<R: BufRead>(reader: &mut R, shift: Vec3, scale: f64) -> Result<Mesh, tobj::LoadError> {
    let (models, _materials) =
        tobj::load_obj_buf(reader, &load_options(), |_| Ok(Default::default()))?;
    Ok(merge_models(&models).transformed(shift, scale))
}

fn merge_models(models: &[tobj::Model]) -> Mesh {
    let mut positions = Vec::new();
    let mut indices = Vec::new();

    for model in models {
        let mesh = &model.mesh;
        let base = positions.len() as u32;

        positions.extend(
            mesh.positions
                .chunks_exact(3)
                .map(|p| Vec3::new(p[0] as f64, p[1] as f64, p[2] as f64)),
        );
        indices.extend(mesh.indices.iter().map(|&i| base + i));

        log::debug!(
            "OBJ model '{}': {} vertices, {} faces",
            model.name,
            mesh.positions.len() / 3,
            mesh.indices.len() / 3
        );
    }

    Mesh::from_indexed(&positions, &indices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const TWO_OBJECTS: &str = "\
o first
v 0 0 0
v 1 0 0
v 0 1 0
f 1 2 3
o second
v 0 0 1
v 1 0 1
v 1 1 1
v 0 1 1
f 4 5 6 7
";

    #[test]
    fn test_load_merges_and_triangulates() {
        let mesh = load_obj_buf(&mut Cursor::new(TWO_OBJECTS), Vec3::ZERO, 1.0).unwrap();

        // One triangle plus a quad split in two
        assert_eq!(mesh.triangle_count(), 3);
        assert_eq!(mesh.bounds().min(), Vec3::ZERO);
        assert_eq!(mesh.bounds().max(), Vec3::ONE);
    }

    #[test]
    fn test_load_applies_scale_then_shift() {
        let mesh = load_obj_buf(&mut Cursor::new(TWO_OBJECTS), Vec3::new(0.0, -4.0, -12.0), 3.0).unwrap();

        assert_eq!(mesh.bounds().min(), Vec3::new(0.0, -4.0, -12.0));
        assert_eq!(mesh.bounds().max(), Vec3::new(3.0, -1.0, -9.0));
    }

    #[test]
    fn test_load_empty() {
        let mesh = load_obj_buf(&mut Cursor::new("# nothing here\n"), Vec3::ZERO, 1.0).unwrap();
        assert!(mesh.is_empty());
    }

    #[test]
    fn test_load_missing_file() {
        assert!(load_obj("/nonexistent/mesh.obj", Vec3::ZERO, 1.0).is_err());
    }
}
