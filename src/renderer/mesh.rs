use glam::Vec3;
use std::f32::consts::PI;

use crate::gpu::{GpuHandle, MeshBuffers, VertexAttribute, VertexLayout};

/// Interleaved `[x, y, z, u, v, nx, ny, nz]`.
pub const MESH_LAYOUT: VertexLayout = VertexLayout {
    stride: 8,
    attributes: &[
        VertexAttribute { location: 0, components: 3, offset: 0 },
        VertexAttribute { location: 1, components: 2, offset: 3 },
        VertexAttribute { location: 2, components: 3, offset: 5 },
    ],
};

const NORMAL_OFFSET: usize = 5;

pub struct Mesh {
    gpu: GpuHandle,
    buffers: MeshBuffers,
    index_count: i32,
}

impl Mesh {
    pub fn new(gpu: GpuHandle, vertices: &[f32], indices: &[u32]) -> Self {
        let buffers = gpu.create_mesh(vertices, indices, &MESH_LAYOUT);
        Self {
            gpu,
            buffers,
            index_count: indices.len() as i32,
        }
    }

    /// Issues one indexed draw with whatever program and uniforms are bound.
    pub fn render(&self) {
        self.gpu.draw_indexed(self.buffers.vao, self.index_count);
    }

    pub fn index_count(&self) -> i32 {
        self.index_count
    }

    pub fn vao(&self) -> u32 {
        self.buffers.vao
    }
}

impl Drop for Mesh {
    fn drop(&mut self) {
        self.gpu.delete_mesh(self.buffers);
    }
}

/// Replaces each vertex normal with the normalized sum of the normals of
/// the triangles using it. Face normals follow clockwise winding, which is
/// what the pyramid index list below uses for its outward faces.
pub fn calc_average_normals(indices: &[u32], vertices: &mut [f32], stride: usize, normal_offset: usize) {
    let position = |v: &[f32], i: usize| Vec3::new(v[i * stride], v[i * stride + 1], v[i * stride + 2]);

    for tri in indices.chunks_exact(3) {
        let (i0, i1, i2) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
        let p0 = position(vertices, i0);
        let normal = (position(vertices, i2) - p0)
            .cross(position(vertices, i1) - p0)
            .normalize_or_zero();

        for i in [i0, i1, i2] {
            let n = i * stride + normal_offset;
            vertices[n] += normal.x;
            vertices[n + 1] += normal.y;
            vertices[n + 2] += normal.z;
        }
    }

    for vertex in vertices.chunks_exact_mut(stride) {
        let n = &mut vertex[normal_offset..normal_offset + 3];
        let v = Vec3::new(n[0], n[1], n[2]).normalize_or_zero();
        n.copy_from_slice(&v.to_array());
    }
}

/// Four-sided pyramid with its apex at +Y.
pub fn pyramid_geometry() -> (Vec<f32>, Vec<u32>) {
    let indices = vec![0, 3, 1, 1, 3, 2, 2, 3, 0, 0, 1, 2];
    #[rustfmt::skip]
    let mut vertices = vec![
    //  x     y     z       u    v      nx   ny   nz
        -1.0, -1.0, -0.6,   0.0, 0.0,   0.0, 0.0, 0.0,
         0.0, -1.0,  1.0,   0.5, 0.0,   0.0, 0.0, 0.0,
         1.0, -1.0, -0.6,   1.0, 0.0,   0.0, 0.0, 0.0,
         0.0,  1.0,  0.0,   0.5, 1.0,   0.0, 0.0, 0.0,
    ];
    calc_average_normals(&indices, &mut vertices, MESH_LAYOUT.stride, NORMAL_OFFSET);
    (vertices, indices)
}

/// Flat square on y = 0 facing +Y. `uv_repeat` tiles the texture.
pub fn floor_geometry(half_size: f32, uv_repeat: f32) -> (Vec<f32>, Vec<u32>) {
    let s = half_size;
    let r = uv_repeat;
    #[rustfmt::skip]
    let vertices = vec![
        -s, 0.0, -s,   0.0, 0.0,   0.0, 1.0, 0.0,
         s, 0.0, -s,   r,   0.0,   0.0, 1.0, 0.0,
        -s, 0.0,  s,   0.0, r,     0.0, 1.0, 0.0,
         s, 0.0,  s,   r,   r,     0.0, 1.0, 0.0,
    ];
    (vertices, vec![0, 2, 1, 1, 2, 3])
}

pub fn sphere_geometry(radius: f32, stacks: u32, sectors: u32) -> (Vec<f32>, Vec<u32>) {
    let mut vertices = Vec::new();
    let mut indices = Vec::new();

    for i in 0..=stacks {
        let stack_angle = PI / 2.0 - (i as f32) * PI / (stacks as f32);
        for j in 0..=sectors {
            let sector_angle = 2.0 * PI * (j as f32) / (sectors as f32);
            let normal = Vec3::new(
                stack_angle.cos() * sector_angle.cos(),
                stack_angle.sin(),
                stack_angle.cos() * sector_angle.sin(),
            );
            let position = normal * radius;

            vertices.extend_from_slice(&position.to_array());
            vertices.push(j as f32 / sectors as f32);
            vertices.push(i as f32 / stacks as f32);
            vertices.extend_from_slice(&normal.to_array());
        }
    }

    for i in 0..stacks {
        for j in 0..sectors {
            let first = i * (sectors + 1) + j;
            let second = first + sectors + 1;

            indices.extend_from_slice(&[first, second, first + 1]);
            indices.extend_from_slice(&[first + 1, second, second + 1]);
        }
    }

    (vertices, indices)
}

pub fn create_pyramid(gpu: GpuHandle) -> Mesh {
    let (vertices, indices) = pyramid_geometry();
    Mesh::new(gpu, &vertices, &indices)
}

pub fn create_floor(gpu: GpuHandle, half_size: f32, uv_repeat: f32) -> Mesh {
    let (vertices, indices) = floor_geometry(half_size, uv_repeat);
    Mesh::new(gpu, &vertices, &indices)
}

pub fn create_sphere(gpu: GpuHandle, radius: f32, stacks: u32, sectors: u32) -> Mesh {
    let (vertices, indices) = sphere_geometry(radius, stacks, sectors);
    Mesh::new(gpu, &vertices, &indices)
}
