//! Draw-queue batcher
//!
//! Drawables enqueued during the frame are recorded in insertion order
//! with greedy state-change minimization: the pipeline and descriptor
//! sets rebind only when the material changes, and the vertex buffer
//! only when the mesh changes. There is no internal sort; callers that
//! want optimal batching insert already material-grouped. The entry's
//! queue position doubles as its slot in the per-frame transform
//! storage buffer and as the draw's first-instance index.

use crate::render::material::MaterialManager;
use crate::render::mesh::MeshManager;
use crate::scene::Model;
use ash::vk;

/// The narrow command-recording surface the batcher needs.
///
/// Production recording goes through [`CommandEncoder`]; tests count
/// calls instead.
pub trait DrawCommands {
    /// Bind a graphics pipeline.
    fn bind_pipeline(&mut self, pipeline: vk::Pipeline);

    /// Bind one descriptor set at `set_index`.
    fn bind_descriptor_set(
        &mut self,
        layout: vk::PipelineLayout,
        set_index: u32,
        set: vk::DescriptorSet,
        dynamic_offsets: &[u32],
    );

    /// Bind a vertex buffer at binding zero.
    fn bind_vertex_buffer(&mut self, buffer: vk::Buffer);

    /// Issue one non-indexed draw of a single instance, with the
    /// queue position passed through as the first-instance index.
    fn draw(&mut self, vertex_count: u32, first_instance: u32);
}

/// Records draw commands into a Vulkan command buffer.
pub struct CommandEncoder<'a> {
    device: &'a ash::Device,
    cmd: vk::CommandBuffer,
}

impl<'a> CommandEncoder<'a> {
    /// Wrap a command buffer that is inside an active render pass.
    pub fn new(device: &'a ash::Device, cmd: vk::CommandBuffer) -> Self {
        Self { device, cmd }
    }
}

impl DrawCommands for CommandEncoder<'_> {
    fn bind_pipeline(&mut self, pipeline: vk::Pipeline) {
        unsafe {
            self.device
                .cmd_bind_pipeline(self.cmd, vk::PipelineBindPoint::GRAPHICS, pipeline);
        }
    }

    fn bind_descriptor_set(
        &mut self,
        layout: vk::PipelineLayout,
        set_index: u32,
        set: vk::DescriptorSet,
        dynamic_offsets: &[u32],
    ) {
        unsafe {
            self.device.cmd_bind_descriptor_sets(
                self.cmd,
                vk::PipelineBindPoint::GRAPHICS,
                layout,
                set_index,
                &[set],
                dynamic_offsets,
            );
        }
    }

    fn bind_vertex_buffer(&mut self, buffer: vk::Buffer) {
        unsafe {
            self.device
                .cmd_bind_vertex_buffers(self.cmd, 0, &[buffer], &[0]);
        }
    }

    fn draw(&mut self, vertex_count: u32, first_instance: u32) {
        unsafe {
            self.device.cmd_draw(self.cmd, vertex_count, 1, 0, first_instance);
        }
    }
}

/// Per-frame descriptor bindings shared by every queued drawable.
pub struct FrameBindings {
    /// The frame slot's camera/scene descriptor set
    pub global_set: vk::DescriptorSet,
    /// The frame slot's transform-storage descriptor set
    pub model_set: vk::DescriptorSet,
    /// Dynamic offset selecting this slot's scene uniform region
    pub scene_dynamic_offset: u32,
}

/// Per-frame drawable queue, drained on every flush.
#[derive(Default)]
pub struct DrawQueue {
    entries: Vec<Model>,
}

impl DrawQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a drawable for this frame.
    pub fn enqueue(&mut self, model: Model) {
        self.entries.push(model);
    }

    /// Drawables queued so far this frame, in insertion order.
    pub fn entries(&self) -> &[Model] {
        &self.entries
    }

    /// Number of queued drawables.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop entries past `max`, keeping the first `max` in queue order.
    pub fn truncate(&mut self, max: usize) {
        self.entries.truncate(max);
    }

    /// Record the queued draws and drain the queue.
    ///
    /// Single greedy pass in insertion order: rebinds happen only on
    /// material or mesh changes relative to the previous entry.
    pub fn record(
        &mut self,
        rec: &mut impl DrawCommands,
        meshes: &MeshManager,
        materials: &MaterialManager,
        bindings: &FrameBindings,
    ) {
        let mut last_material = None;
        let mut last_mesh = None;

        for (index, model) in self.entries.iter().enumerate() {
            if last_material != Some(model.material) {
                let material = materials.get(model.material);
                rec.bind_pipeline(material.pipeline);
                rec.bind_descriptor_set(
                    material.pipeline_layout,
                    0,
                    bindings.global_set,
                    &[bindings.scene_dynamic_offset],
                );
                rec.bind_descriptor_set(material.pipeline_layout, 1, bindings.model_set, &[]);
                if let Some(texture_set) = material.texture_set {
                    rec.bind_descriptor_set(material.pipeline_layout, 2, texture_set, &[]);
                }
                last_material = Some(model.material);
            }

            if last_mesh != Some(model.mesh) {
                rec.bind_vertex_buffer(meshes.get(model.mesh).vertex_buffer);
                last_mesh = Some(model.mesh);
            }

            rec.draw(meshes.get(model.mesh).vertex_count(), index as u32);
        }

        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::Console;
    use crate::render::material::CreateMaterialInfo;
    use std::io::Write;

    #[derive(Default)]
    struct CountingRecorder {
        pipeline_binds: usize,
        descriptor_binds: usize,
        vertex_binds: usize,
        draws: Vec<u32>,
    }

    impl DrawCommands for CountingRecorder {
        fn bind_pipeline(&mut self, _pipeline: vk::Pipeline) {
            self.pipeline_binds += 1;
        }

        fn bind_descriptor_set(
            &mut self,
            _layout: vk::PipelineLayout,
            _set_index: u32,
            _set: vk::DescriptorSet,
            _dynamic_offsets: &[u32],
        ) {
            self.descriptor_binds += 1;
        }

        fn bind_vertex_buffer(&mut self, _buffer: vk::Buffer) {
            self.vertex_binds += 1;
        }

        fn draw(&mut self, _vertex_count: u32, first_instance: u32) {
            self.draws.push(first_instance);
        }
    }

    fn test_mesh(manager: &mut MeshManager, name: &str) -> crate::render::MeshHandle {
        let path = std::env::temp_dir().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();

        let mut console = Console::new();
        manager
            .load(&mut console, path.to_str().unwrap(), |_| Ok(()))
            .unwrap()
            .unwrap()
    }

    fn test_material(manager: &mut MaterialManager, name: &str) -> crate::render::MaterialHandle {
        manager.create(CreateMaterialInfo {
            name: name.to_string(),
            pipeline: vk::Pipeline::null(),
            pipeline_layout: vk::PipelineLayout::null(),
            texture_set: None,
        })
    }

    fn bindings() -> FrameBindings {
        FrameBindings {
            global_set: vk::DescriptorSet::null(),
            model_set: vk::DescriptorSet::null(),
            scene_dynamic_offset: 0,
        }
    }

    #[test]
    fn test_shared_material_two_meshes() {
        let mut meshes = MeshManager::new();
        let mut materials = MaterialManager::new();
        let mesh_a = test_mesh(&mut meshes, "draw_queue_a.obj");
        let mesh_b = test_mesh(&mut meshes, "draw_queue_b.obj");
        let material = test_material(&mut materials, "shared");

        let mut queue = DrawQueue::new();
        queue.enqueue(Model::new(mesh_a, material));
        queue.enqueue(Model::new(mesh_b, material));

        let mut rec = CountingRecorder::default();
        queue.record(&mut rec, &meshes, &materials, &bindings());

        assert_eq!(rec.pipeline_binds, 1);
        assert_eq!(rec.vertex_binds, 2);
        assert_eq!(rec.draws, vec![0, 1]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_consecutive_same_state_never_rebinds() {
        let mut meshes = MeshManager::new();
        let mut materials = MaterialManager::new();
        let mesh = test_mesh(&mut meshes, "draw_queue_same.obj");
        let material = test_material(&mut materials, "only");

        let mut queue = DrawQueue::new();
        for _ in 0..16 {
            queue.enqueue(Model::new(mesh, material));
        }

        let mut rec = CountingRecorder::default();
        queue.record(&mut rec, &meshes, &materials, &bindings());

        assert_eq!(rec.pipeline_binds, 1);
        assert_eq!(rec.vertex_binds, 1);
        assert_eq!(rec.draws.len(), 16);
    }

    #[test]
    fn test_interleaved_materials_rebind_each_switch() {
        let mut meshes = MeshManager::new();
        let mut materials = MaterialManager::new();
        let mesh = test_mesh(&mut meshes, "draw_queue_interleave.obj");
        let red = test_material(&mut materials, "red");
        let blue = test_material(&mut materials, "blue");

        let mut queue = DrawQueue::new();
        queue.enqueue(Model::new(mesh, red));
        queue.enqueue(Model::new(mesh, blue));
        queue.enqueue(Model::new(mesh, red));

        let mut rec = CountingRecorder::default();
        queue.record(&mut rec, &meshes, &materials, &bindings());

        // Greedy single-pass minimization: interleaving defeats it.
        assert_eq!(rec.pipeline_binds, 3);
        assert_eq!(rec.vertex_binds, 1);
    }

    #[test]
    fn test_queue_position_is_instance_index() {
        let mut meshes = MeshManager::new();
        let mut materials = MaterialManager::new();
        let mesh = test_mesh(&mut meshes, "draw_queue_index.obj");
        let material = test_material(&mut materials, "indexed");

        let mut queue = DrawQueue::new();
        for _ in 0..4 {
            queue.enqueue(Model::new(mesh, material));
        }

        let mut rec = CountingRecorder::default();
        queue.record(&mut rec, &meshes, &materials, &bindings());

        assert_eq!(rec.draws, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_empty_queue_records_nothing() {
        let meshes = MeshManager::new();
        let materials = MaterialManager::new();
        let mut queue = DrawQueue::new();

        let mut rec = CountingRecorder::default();
        queue.record(&mut rec, &meshes, &materials, &bindings());

        assert_eq!(rec.pipeline_binds, 0);
        assert_eq!(rec.vertex_binds, 0);
        assert!(rec.draws.is_empty());
    }
}
