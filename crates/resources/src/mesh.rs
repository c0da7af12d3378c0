//! Mesh data: OBJ loading and procedural primitives.
//!
//! [`MeshData`] is plain CPU-side geometry, deduplicated and ready for
//! upload into vertex/index buffers. OBJ files are loaded with `tobj`;
//! the box, sphere and plane primitives are generated at unit size and
//! scaled per instance through the model transform.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use glam::{Vec2, Vec3};
use tracing::info;

use prism_rhi::vertex::Vertex;

use crate::error::{ResourceError, ResourceResult};

/// Where a mesh's geometry comes from.
#[derive(Clone, Debug, PartialEq)]
pub enum MeshSource {
    /// Wavefront OBJ file on disk.
    ObjFile(PathBuf),
    /// Unit cube centered at the origin.
    Box,
    /// Unit-radius UV sphere centered at the origin.
    Sphere,
    /// Unit quad in the XZ plane centered at the origin.
    Plane,
}

/// CPU-side mesh geometry.
#[derive(Clone, Debug, Default)]
pub struct MeshData {
    /// Deduplicated vertices.
    pub vertices: Vec<Vertex>,
    /// Triangle list indices into `vertices`.
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Builds mesh data from a [`MeshSource`].
    ///
    /// # Errors
    ///
    /// Returns an error if an OBJ file cannot be read or parsed.
    pub fn from_source(source: &MeshSource) -> ResourceResult<Self> {
        match source {
            MeshSource::ObjFile(path) => Self::load_obj(path),
            MeshSource::Box => Ok(Self::unit_box()),
            MeshSource::Sphere => Ok(Self::unit_sphere(32, 16)),
            MeshSource::Plane => Ok(Self::unit_plane()),
        }
    }

    /// Loads and triangulates an OBJ file, merging identical vertices.
    ///
    /// Texture V coordinates are flipped so OBJ UVs land right side up in
    /// Vulkan's top-left texture space. Vertex color is white; lighting is
    /// carried entirely by the texture.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::ObjLoad`] on parse failure and
    /// [`ResourceError::NoMeshes`] for files without geometry.
    pub fn load_obj(path: &Path) -> ResourceResult<Self> {
        let options = tobj::LoadOptions {
            triangulate: true,
            ignore_points: true,
            ignore_lines: true,
            ..Default::default()
        };

        let (models, _materials) =
            tobj::load_obj(path, &options).map_err(|e| ResourceError::ObjLoad {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        if models.is_empty() {
            return Err(ResourceError::NoMeshes(path.to_path_buf()));
        }

        let mut vertices: Vec<Vertex> = Vec::new();
        let mut indices: Vec<u32> = Vec::new();
        let mut unique: HashMap<[u32; 8], u32> = HashMap::new();

        for model in &models {
            let mesh = &model.mesh;
            let has_texcoords = !mesh.texcoords.is_empty();

            for (i, &pos_index) in mesh.indices.iter().enumerate() {
                let p = pos_index as usize;
                let position = Vec3::new(
                    mesh.positions[3 * p],
                    mesh.positions[3 * p + 1],
                    mesh.positions[3 * p + 2],
                );

                let tex_coord = if has_texcoords {
                    let t = if mesh.texcoord_indices.is_empty() {
                        p
                    } else {
                        mesh.texcoord_indices[i] as usize
                    };
                    Vec2::new(mesh.texcoords[2 * t], 1.0 - mesh.texcoords[2 * t + 1])
                } else {
                    Vec2::ZERO
                };

                let vertex = Vertex::new(position, Vec3::ONE, tex_coord);

                let index = *unique.entry(vertex.dedup_key()).or_insert_with(|| {
                    vertices.push(vertex);
                    (vertices.len() - 1) as u32
                });
                indices.push(index);
            }
        }

        info!(
            path = %path.display(),
            vertices = vertices.len(),
            indices = indices.len(),
            "Loaded OBJ mesh"
        );

        Ok(Self { vertices, indices })
    }

    /// Unit cube centered at the origin, one quad per face.
    pub fn unit_box() -> Self {
        let h = 0.5;
        // Each face gets its own four vertices so UVs stay per-face.
        // (position, uv), faces ordered +Z, -Z, +X, -X, +Y, -Y.
        let faces: [([Vec3; 4], Vec3); 6] = [
            (
                [
                    Vec3::new(-h, -h, h),
                    Vec3::new(h, -h, h),
                    Vec3::new(h, h, h),
                    Vec3::new(-h, h, h),
                ],
                Vec3::Z,
            ),
            (
                [
                    Vec3::new(h, -h, -h),
                    Vec3::new(-h, -h, -h),
                    Vec3::new(-h, h, -h),
                    Vec3::new(h, h, -h),
                ],
                Vec3::NEG_Z,
            ),
            (
                [
                    Vec3::new(h, -h, h),
                    Vec3::new(h, -h, -h),
                    Vec3::new(h, h, -h),
                    Vec3::new(h, h, h),
                ],
                Vec3::X,
            ),
            (
                [
                    Vec3::new(-h, -h, -h),
                    Vec3::new(-h, -h, h),
                    Vec3::new(-h, h, h),
                    Vec3::new(-h, h, -h),
                ],
                Vec3::NEG_X,
            ),
            (
                [
                    Vec3::new(-h, h, h),
                    Vec3::new(h, h, h),
                    Vec3::new(h, h, -h),
                    Vec3::new(-h, h, -h),
                ],
                Vec3::Y,
            ),
            (
                [
                    Vec3::new(-h, -h, -h),
                    Vec3::new(h, -h, -h),
                    Vec3::new(h, -h, h),
                    Vec3::new(-h, -h, h),
                ],
                Vec3::NEG_Y,
            ),
        ];

        let uvs = [
            Vec2::new(0.0, 1.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(0.0, 0.0),
        ];

        let mut vertices = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);

        for (corners, _normal) in &faces {
            let base = vertices.len() as u32;
            for (corner, uv) in corners.iter().zip(uvs.iter()) {
                vertices.push(Vertex::new(*corner, Vec3::ONE, *uv));
            }
            indices.extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
        }

        Self { vertices, indices }
    }

    /// Unit-radius UV sphere with the given resolution.
    pub fn unit_sphere(sectors: u32, stacks: u32) -> Self {
        let sectors = sectors.max(3);
        let stacks = stacks.max(2);

        let mut vertices = Vec::with_capacity(((sectors + 1) * (stacks + 1)) as usize);
        let mut indices = Vec::new();

        for stack in 0..=stacks {
            // Latitude from +Y pole to -Y pole.
            let phi = std::f32::consts::PI * stack as f32 / stacks as f32;
            let y = phi.cos();
            let ring_radius = phi.sin();

            for sector in 0..=sectors {
                let theta = 2.0 * std::f32::consts::PI * sector as f32 / sectors as f32;
                let x = ring_radius * theta.cos();
                let z = ring_radius * theta.sin();

                let uv = Vec2::new(
                    sector as f32 / sectors as f32,
                    stack as f32 / stacks as f32,
                );
                vertices.push(Vertex::new(Vec3::new(x, y, z), Vec3::ONE, uv));
            }
        }

        let ring = sectors + 1;
        for stack in 0..stacks {
            for sector in 0..sectors {
                let a = stack * ring + sector;
                let b = a + ring;

                if stack != 0 {
                    indices.extend_from_slice(&[a, a + 1, b]);
                }
                if stack != stacks - 1 {
                    indices.extend_from_slice(&[a + 1, b + 1, b]);
                }
            }
        }

        Self { vertices, indices }
    }

    /// Unit quad in the XZ plane, facing +Y.
    pub fn unit_plane() -> Self {
        let h = 0.5;
        let vertices = vec![
            Vertex::new(Vec3::new(-h, 0.0, -h), Vec3::ONE, Vec2::new(0.0, 0.0)),
            Vertex::new(Vec3::new(-h, 0.0, h), Vec3::ONE, Vec2::new(0.0, 1.0)),
            Vertex::new(Vec3::new(h, 0.0, h), Vec3::ONE, Vec2::new(1.0, 1.0)),
            Vertex::new(Vec3::new(h, 0.0, -h), Vec3::ONE, Vec2::new(1.0, 0.0)),
        ];
        let indices = vec![0, 1, 2, 2, 3, 0];

        Self { vertices, indices }
    }

    /// Returns the number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_indices_in_bounds(mesh: &MeshData) {
        let count = mesh.vertices.len() as u32;
        assert!(mesh.indices.iter().all(|&i| i < count));
    }

    #[test]
    fn test_unit_box_geometry() {
        let mesh = MeshData::unit_box();
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.indices.len(), 36);
        assert_eq!(mesh.triangle_count(), 12);
        assert_indices_in_bounds(&mesh);

        for v in &mesh.vertices {
            assert!(v.position.abs().max_element() <= 0.5 + f32::EPSILON);
            assert_eq!(v.color, Vec3::ONE);
        }
    }

    #[test]
    fn test_unit_plane_geometry() {
        let mesh = MeshData::unit_plane();
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.triangle_count(), 2);
        assert_indices_in_bounds(&mesh);
        assert!(mesh.vertices.iter().all(|v| v.position.y == 0.0));
    }

    #[test]
    fn test_unit_sphere_geometry() {
        let mesh = MeshData::unit_sphere(32, 16);
        assert_indices_in_bounds(&mesh);
        assert!(!mesh.indices.is_empty());
        // Every vertex sits on the unit sphere.
        for v in &mesh.vertices {
            assert!((v.position.length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_unit_sphere_minimum_resolution() {
        let mesh = MeshData::unit_sphere(0, 0);
        assert!(!mesh.vertices.is_empty());
        assert_indices_in_bounds(&mesh);
    }

    #[test]
    fn test_from_source_primitives() {
        assert_eq!(
            MeshData::from_source(&MeshSource::Box).unwrap().vertices.len(),
            24
        );
        assert_eq!(
            MeshData::from_source(&MeshSource::Plane)
                .unwrap()
                .vertices
                .len(),
            4
        );
        assert!(!MeshData::from_source(&MeshSource::Sphere)
            .unwrap()
            .vertices
            .is_empty());
    }

    #[test]
    fn test_load_obj_missing_file() {
        let result = MeshData::load_obj(Path::new("does/not/exist.obj"));
        assert!(result.is_err());
    }
}
