use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Interleaved vertex uploaded to the GPU.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

/// Triangle list ready for upload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Primitive shapes, centred on the local origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Geometry {
    Cuboid { width: f32, height: f32, depth: f32 },
    /// Flat rectangle in the local XY plane, facing +Z.
    Plane { width: f32, height: f32 },
}

impl Geometry {
    pub fn cuboid(width: f32, height: f32, depth: f32) -> Self {
        Self::Cuboid {
            width,
            height,
            depth,
        }
    }

    pub fn plane(width: f32, height: f32) -> Self {
        Self::Plane { width, height }
    }

    pub fn to_mesh_data(&self) -> MeshData {
        match *self {
            Self::Cuboid {
                width,
                height,
                depth,
            } => cuboid_mesh(Vec3::new(width, height, depth) * 0.5),
            Self::Plane { width, height } => {
                let mut mesh = MeshData::default();
                push_quad(
                    &mut mesh,
                    Vec3::Z,
                    Vec3::X * (width * 0.5),
                    Vec3::Y * (height * 0.5),
                    Vec3::ZERO,
                );
                mesh
            }
        }
    }
}

fn cuboid_mesh(half: Vec3) -> MeshData {
    let mut mesh = MeshData::default();
    // (normal, u axis, v axis); u x v == normal keeps every face CCW.
    let faces = [
        (Vec3::X, Vec3::NEG_Z * half.z, Vec3::Y * half.y, half.x),
        (Vec3::NEG_X, Vec3::Z * half.z, Vec3::Y * half.y, half.x),
        (Vec3::Y, Vec3::X * half.x, Vec3::NEG_Z * half.z, half.y),
        (Vec3::NEG_Y, Vec3::X * half.x, Vec3::Z * half.z, half.y),
        (Vec3::Z, Vec3::X * half.x, Vec3::Y * half.y, half.z),
        (Vec3::NEG_Z, Vec3::NEG_X * half.x, Vec3::Y * half.y, half.z),
    ];
    for (normal, u, v, offset) in faces {
        push_quad(&mut mesh, normal, u, v, normal * offset);
    }
    mesh
}

fn push_quad(mesh: &mut MeshData, normal: Vec3, u: Vec3, v: Vec3, centre: Vec3) {
    let base = mesh.vertices.len() as u32;
    let corners = [
        centre - u - v,
        centre + u - v,
        centre + u + v,
        centre - u + v,
    ];
    mesh.vertices.extend(corners.iter().map(|corner| Vertex {
        position: corner.to_array(),
        normal: normal.to_array(),
    }));
    mesh.indices
        .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn face_normal(mesh: &MeshData, triangle: usize) -> Vec3 {
        let idx = &mesh.indices[triangle * 3..triangle * 3 + 3];
        let p = |i: u32| Vec3::from_array(mesh.vertices[i as usize].position);
        (p(idx[1]) - p(idx[0]))
            .cross(p(idx[2]) - p(idx[0]))
            .normalize()
    }

    #[test]
    fn cuboid_has_six_faces_with_matching_extent() {
        let mesh = Geometry::cuboid(2.0, 2.0, 2.0).to_mesh_data();
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.triangle_count(), 12);
        for vertex in &mesh.vertices {
            for component in vertex.position {
                assert_eq!(component.abs(), 1.0);
            }
        }
    }

    #[test]
    fn winding_agrees_with_normals() {
        let mesh = Geometry::cuboid(1.0, 3.0, 2.0).to_mesh_data();
        for triangle in 0..mesh.triangle_count() {
            let stored = Vec3::from_array(mesh.vertices[mesh.indices[triangle * 3] as usize].normal);
            assert!(face_normal(&mesh, triangle).abs_diff_eq(stored, 1e-5));
        }
    }

    #[test]
    fn plane_faces_positive_z() {
        let mesh = Geometry::plane(10.0, 10.0).to_mesh_data();
        assert_eq!(mesh.triangle_count(), 2);
        assert!(mesh.vertices.iter().all(|v| v.position[2] == 0.0));
        assert!(face_normal(&mesh, 0).abs_diff_eq(Vec3::Z, 1e-5));
        let max_x = mesh
            .vertices
            .iter()
            .map(|v| v.position[0])
            .fold(f32::MIN, f32::max);
        assert_eq!(max_x, 5.0);
    }
}
