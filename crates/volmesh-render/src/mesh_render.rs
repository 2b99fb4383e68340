//! GPU resources for the isosurface mesh.

use glam::Vec3;
use volmesh_core::TriangleMesh;
use wgpu::util::DeviceExt;

/// Camera uniforms for GPU.
/// Layout must match WGSL `CameraUniforms` (80 bytes).
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub camera_pos: [f32; 3],
    pub _padding: f32,
}

impl Default for CameraUniforms {
    fn default() -> Self {
        Self {
            view_proj: glam::Mat4::IDENTITY.to_cols_array_2d(),
            camera_pos: [0.0, 0.0, 5.0],
            _padding: 0.0,
        }
    }
}

/// Surface colors for mesh shading.
/// Layout must match WGSL `MeshUniforms` (32 bytes).
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshUniforms {
    /// Front face color (RGBA)
    pub surface_color: [f32; 4],
    /// Back face color (RGBA)
    pub backface_color: [f32; 4],
}

impl Default for MeshUniforms {
    fn default() -> Self {
        Self {
            surface_color: [0.85, 0.75, 0.65, 1.0], // bone
            backface_color: [0.45, 0.4, 0.35, 1.0],
        }
    }
}

/// GPU buffers holding one extracted mesh.
///
/// Positions and normals live in storage buffers (vec4 for alignment) and are
/// fetched in the vertex shader by index, so the index buffer drives the draw.
pub struct MeshRenderData {
    /// Position buffer (storage buffer, vec4 for alignment).
    pub position_buffer: wgpu::Buffer,
    /// Normal buffer (storage buffer, vec4 for alignment).
    pub normal_buffer: wgpu::Buffer,
    /// Index buffer (triangle indices).
    pub index_buffer: wgpu::Buffer,
    /// Bind group for this mesh.
    pub bind_group: wgpu::BindGroup,
    /// Number of indices (`num_triangles * 3`).
    pub num_indices: u32,
}

impl MeshRenderData {
    /// Uploads `mesh`. Returns `None` for a mesh without triangles, which has
    /// nothing to draw and would need zero-sized buffers.
    pub fn new(
        device: &wgpu::Device,
        bind_group_layout: &wgpu::BindGroupLayout,
        camera_buffer: &wgpu::Buffer,
        mesh_uniform_buffer: &wgpu::Buffer,
        mesh: &TriangleMesh,
    ) -> Option<Self> {
        if mesh.is_empty() {
            return None;
        }
        let num_indices = u32::try_from(mesh.num_triangles() * 3).ok()?;

        let positions = pad_to_vec4(&mesh.vertices, 1.0);
        let normals = pad_to_vec4(&mesh.normals, 0.0);
        let indices = mesh.flat_indices();

        let position_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("mesh positions"),
            contents: bytemuck::cast_slice(&positions),
            usage: wgpu::BufferUsages::STORAGE,
        });
        let normal_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("mesh normals"),
            contents: bytemuck::cast_slice(&normals),
            usage: wgpu::BufferUsages::STORAGE,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("mesh indices"),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("mesh bind group"),
            layout: bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: mesh_uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: position_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: normal_buffer.as_entire_binding(),
                },
            ],
        });

        Some(Self {
            position_buffer,
            normal_buffer,
            index_buffer,
            bind_group,
            num_indices,
        })
    }

    /// Records the draw call into `render_pass`.
    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.set_bind_group(0, &self.bind_group, &[]);
        render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        render_pass.draw_indexed(0..self.num_indices, 0, 0..1);
    }
}

/// Flattens `v` into `[x, y, z, w]` quadruples.
fn pad_to_vec4(v: &[Vec3], w: f32) -> Vec<[f32; 4]> {
    v.iter().map(|p| [p.x, p.y, p.z, w]).collect()
}
