//! Mesh data, vertex layout, and the mesh cache
//!
//! A mesh is a flat vertex list plus a device-local vertex buffer. The
//! cache is keyed by source path: parsing and GPU upload happen exactly
//! once per unique path for the lifetime of the process.

use crate::assets::obj_loader;
use crate::console::Console;
use crate::render::context::VulkanResult;
use ash::vk;
use bytemuck::{Pod, Zeroable};
use std::collections::HashMap;

/// One vertex in the engine's fixed layout.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    /// Object-space position
    pub position: [f32; 3],
    /// Surface normal
    pub normal: [f32; 3],
    /// Vertex color
    pub color: [f32; 3],
    /// Texture coordinates
    pub uv: [f32; 2],
}

impl Vertex {
    /// Byte stride of one vertex.
    pub const STRIDE: u32 = std::mem::size_of::<Vertex>() as u32;

    /// Vertex binding descriptions for pipeline creation.
    pub fn binding_descriptions() -> Vec<vk::VertexInputBindingDescription> {
        vec![vk::VertexInputBindingDescription::builder()
            .binding(0)
            .stride(Self::STRIDE)
            .input_rate(vk::VertexInputRate::VERTEX)
            .build()]
    }

    /// Vertex attribute descriptions for pipeline creation.
    pub fn attribute_descriptions() -> Vec<vk::VertexInputAttributeDescription> {
        vec![
            vk::VertexInputAttributeDescription::builder()
                .location(0)
                .binding(0)
                .format(vk::Format::R32G32B32_SFLOAT)
                .offset(0)
                .build(),
            vk::VertexInputAttributeDescription::builder()
                .location(1)
                .binding(0)
                .format(vk::Format::R32G32B32_SFLOAT)
                .offset(12)
                .build(),
            vk::VertexInputAttributeDescription::builder()
                .location(2)
                .binding(0)
                .format(vk::Format::R32G32B32_SFLOAT)
                .offset(24)
                .build(),
            vk::VertexInputAttributeDescription::builder()
                .location(3)
                .binding(0)
                .format(vk::Format::R32G32_SFLOAT)
                .offset(36)
                .build(),
        ]
    }
}

/// Mesh geometry plus its device-local vertex buffer handle.
///
/// The vertex buffer's memory is owned by the deletion queue; this
/// struct only keeps the bindable handle (null until uploaded).
pub struct Mesh {
    /// Host-side vertex list
    pub vertices: Vec<Vertex>,
    /// Device-local vertex buffer, null before upload
    pub vertex_buffer: vk::Buffer,
}

impl Mesh {
    /// Create a mesh from a vertex list, not yet uploaded.
    pub fn new(vertices: Vec<Vertex>) -> Self {
        Self {
            vertices,
            vertex_buffer: vk::Buffer::null(),
        }
    }

    /// Number of vertices to draw.
    pub fn vertex_count(&self) -> u32 {
        self.vertices.len() as u32
    }
}

/// Lightweight index into the mesh cache.
///
/// Handles are only minted by [`MeshManager`] and stay valid for the
/// life of the process; cache growth never invalidates them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshHandle(pub(crate) u32);

/// Content-keyed mesh cache with lookup-or-create semantics.
#[derive(Default)]
pub struct MeshManager {
    meshes: Vec<Mesh>,
    by_path: HashMap<String, MeshHandle>,
}

impl MeshManager {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached mesh for `path`, loading and uploading it on
    /// the first call.
    ///
    /// `upload` runs exactly once per unique path. Parser warnings are
    /// logged and do not fail the load; open/parse failures are logged
    /// and yield `Ok(None)`. An `Err` means the GPU upload itself
    /// failed, which the caller treats as fatal.
    pub fn load(
        &mut self,
        console: &mut Console,
        path: &str,
        upload: impl FnOnce(&mut Mesh) -> VulkanResult<()>,
    ) -> VulkanResult<Option<MeshHandle>> {
        if let Some(&handle) = self.by_path.get(path) {
            return Ok(Some(handle));
        }

        let data = match obj_loader::load_obj(path) {
            Ok(data) => data,
            Err(err) => {
                console.log(format!("[ERROR]: Failed to load mesh {}: {}", path, err));
                return Ok(None);
            }
        };

        for warning in &data.warnings {
            console.log(format!("[WARN]: {}: {}", path, warning));
        }

        let mut mesh = Mesh::new(data.vertices);
        upload(&mut mesh)?;

        console.log(format!("Loaded mesh {} successfully", path));

        let handle = MeshHandle(self.meshes.len() as u32);
        self.meshes.push(mesh);
        self.by_path.insert(path.to_string(), handle);
        Ok(Some(handle))
    }

    /// Look up a mesh by handle.
    pub fn get(&self, handle: MeshHandle) -> &Mesh {
        &self.meshes[handle.0 as usize]
    }

    /// Number of cached meshes.
    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp_obj(name: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();
        path
    }

    #[test]
    fn test_load_is_idempotent_and_uploads_once() {
        let path = write_temp_obj("mesh_manager_idempotent.obj");
        let path = path.to_str().unwrap().to_string();

        let mut manager = MeshManager::new();
        let mut console = Console::new();
        let mut uploads = 0;

        let first = manager
            .load(&mut console, &path, |_| {
                uploads += 1;
                Ok(())
            })
            .unwrap()
            .unwrap();
        let second = manager
            .load(&mut console, &path, |_| {
                uploads += 1;
                Ok(())
            })
            .unwrap()
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(uploads, 1);
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn test_missing_file_logs_and_returns_none() {
        let mut manager = MeshManager::new();
        let mut console = Console::new();
        let mut uploads = 0;

        let result = manager
            .load(&mut console, "does/not/exist.obj", |_| {
                uploads += 1;
                Ok(())
            })
            .unwrap();

        assert!(result.is_none());
        assert_eq!(uploads, 0);
        assert_eq!(console.lines().len(), 1);
        assert!(console.lines()[0].contains("[ERROR]"));
        assert!(manager.is_empty());
    }

    #[test]
    fn test_vertex_layout_matches_attribute_offsets() {
        // The attribute offsets are hand-written; keep them honest
        // against the struct layout.
        assert_eq!(Vertex::STRIDE, 44);
        let attributes = Vertex::attribute_descriptions();
        assert_eq!(attributes.len(), 4);
        assert_eq!(attributes[3].offset, 36);
    }
}
