//! Integration tests for mesh loading.

use std::fs;
use std::path::PathBuf;

use prism_resources::{MeshData, MeshSource};

/// Writes a minimal textured quad OBJ to a temp file.
fn write_quad_obj(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(name);
    let obj = "\
v -1.0 0.0 -1.0
v  1.0 0.0 -1.0
v  1.0 0.0  1.0
v -1.0 0.0  1.0
vt 0.0 0.0
vt 1.0 0.0
vt 1.0 1.0
vt 0.0 1.0
f 1/1 2/2 3/3 4/4
";
    fs::write(&path, obj).expect("failed to write test OBJ");
    path
}

#[test]
fn test_load_obj_quad() {
    let path = write_quad_obj("prism_test_quad.obj");

    let mesh = MeshData::load_obj(&path).expect("failed to load OBJ quad");

    // The quad triangulates into two triangles sharing two vertices.
    assert_eq!(mesh.vertices.len(), 4, "shared vertices should deduplicate");
    assert_eq!(mesh.indices.len(), 6);
    assert_eq!(mesh.triangle_count(), 2);

    let count = mesh.vertices.len() as u32;
    assert!(mesh.indices.iter().all(|&i| i < count));

    // V coordinates are flipped at load time.
    let has_flipped_v = mesh
        .vertices
        .iter()
        .any(|v| (v.tex_coord.y - 1.0).abs() < f32::EPSILON);
    assert!(has_flipped_v, "OBJ vt 0.0 should map to texture V 1.0");

    let _ = fs::remove_file(&path);
}

#[test]
fn test_load_obj_dedup_across_faces() {
    let path = std::env::temp_dir().join("prism_test_tris.obj");
    // Two triangles sharing an edge, no texcoords.
    let obj = "\
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 0.0 1.0 0.0
v 1.0 1.0 0.0
f 1 2 3
f 3 2 4
";
    fs::write(&path, obj).expect("failed to write test OBJ");

    let mesh = MeshData::load_obj(&path).expect("failed to load OBJ");
    assert_eq!(mesh.vertices.len(), 4);
    assert_eq!(mesh.indices.len(), 6);

    let _ = fs::remove_file(&path);
}

#[test]
fn test_primitive_sources_produce_valid_meshes() {
    for source in [MeshSource::Box, MeshSource::Sphere, MeshSource::Plane] {
        let mesh = MeshData::from_source(&source).expect("primitive generation failed");
        assert!(!mesh.vertices.is_empty(), "{source:?} has no vertices");
        assert_eq!(mesh.indices.len() % 3, 0, "{source:?} is not a triangle list");

        let count = mesh.vertices.len() as u32;
        assert!(mesh.indices.iter().all(|&i| i < count));
    }
}
