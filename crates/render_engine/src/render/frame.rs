//! Frame-in-flight slots and their synchronization state
//!
//! `FRAME_OVERLAP` independent resource sets are cycled round-robin so
//! the CPU can prepare frame N+1 while the GPU consumes frame N. A
//! slot's resources are only reused after its render fence (submitted
//! `FRAME_OVERLAP` frames earlier) has signaled; the [`FrameScheduler`]
//! state machine enforces that ordering on the CPU side.

use crate::render::buffer::{self, AllocatedBuffer};
use crate::render::context::{VulkanContext, VulkanError, VulkanResult};
use crate::render::deletion_queue::{DeferredResource, DeletionQueue};
use crate::render::descriptors::{Descriptors, GpuCameraData, GpuModelData, GpuSceneData};
use crate::render::renderer::MAX_RENDERABLE_OBJECTS;
use ash::vk;

/// Number of frames the CPU may run ahead of the GPU.
pub const FRAME_OVERLAP: u32 = 2;

/// One frame slot's command recording, sync, and buffer resources.
///
/// Command pool, fence, and semaphores are registered with the deletion
/// queue at creation. The camera and model buffers are remapped every
/// frame, so the slot owns them and destroys them itself at shutdown.
pub struct FrameData {
    /// Command pool backing this slot's command buffer
    pub command_pool: vk::CommandPool,
    /// Primary command buffer, re-recorded each cycle
    pub command_buffer: vk::CommandBuffer,
    /// Signaled when the swapchain image is acquired
    pub present_semaphore: vk::Semaphore,
    /// Signaled when this slot's rendering finishes
    pub render_semaphore: vk::Semaphore,
    /// CPU-GPU fence guarding reuse of this slot's resources
    pub render_fence: vk::Fence,
    /// Camera uniform buffer, rewritten in full every frame
    pub camera_buffer: AllocatedBuffer,
    /// Per-object transform storage buffer
    pub model_buffer: AllocatedBuffer,
    /// Descriptor set for camera + scene uniforms
    pub global_descriptor: vk::DescriptorSet,
    /// Descriptor set for the transform storage buffer
    pub model_descriptor: vk::DescriptorSet,
}

impl FrameData {
    /// Create one frame slot and register its pooled resources with the
    /// deletion queue.
    pub fn new(
        context: &VulkanContext,
        descriptors: &Descriptors,
        deletion_queue: &mut DeletionQueue<DeferredResource>,
    ) -> VulkanResult<Self> {
        let device = &context.device;

        let pool_info = vk::CommandPoolCreateInfo::builder()
            .queue_family_index(context.graphics_family)
            .flags(vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER);
        let command_pool = unsafe {
            device
                .create_command_pool(&pool_info, None)
                .map_err(VulkanError::Api)?
        };
        deletion_queue.push(DeferredResource::CommandPool(command_pool));

        let alloc_info = vk::CommandBufferAllocateInfo::builder()
            .command_pool(command_pool)
            .level(vk::CommandBufferLevel::PRIMARY)
            .command_buffer_count(1);
        let command_buffer = unsafe {
            device
                .allocate_command_buffers(&alloc_info)
                .map_err(VulkanError::Api)?[0]
        };

        // The fence starts signaled so the first wait on this slot
        // passes immediately.
        let fence_info = vk::FenceCreateInfo::builder().flags(vk::FenceCreateFlags::SIGNALED);
        let render_fence = unsafe {
            device
                .create_fence(&fence_info, None)
                .map_err(VulkanError::Api)?
        };
        deletion_queue.push(DeferredResource::Fence(render_fence));

        let semaphore_info = vk::SemaphoreCreateInfo::builder();
        let present_semaphore = unsafe {
            device
                .create_semaphore(&semaphore_info, None)
                .map_err(VulkanError::Api)?
        };
        deletion_queue.push(DeferredResource::Semaphore(present_semaphore));
        let render_semaphore = unsafe {
            device
                .create_semaphore(&semaphore_info, None)
                .map_err(VulkanError::Api)?
        };
        deletion_queue.push(DeferredResource::Semaphore(render_semaphore));

        let camera_buffer = buffer::create_buffer(
            context,
            std::mem::size_of::<GpuCameraData>() as u64,
            vk::BufferUsageFlags::UNIFORM_BUFFER,
            vk_mem::MemoryUsage::CpuToGpu,
        )?;

        let model_buffer = buffer::create_buffer(
            context,
            (std::mem::size_of::<GpuModelData>() * MAX_RENDERABLE_OBJECTS) as u64,
            vk::BufferUsageFlags::STORAGE_BUFFER,
            vk_mem::MemoryUsage::CpuToGpu,
        )?;

        let set_layouts = [descriptors.global_set_layout, descriptors.model_set_layout];
        let set_alloc = vk::DescriptorSetAllocateInfo::builder()
            .descriptor_pool(descriptors.pool)
            .set_layouts(&set_layouts);
        let sets = unsafe {
            device
                .allocate_descriptor_sets(&set_alloc)
                .map_err(VulkanError::Api)?
        };
        let (global_descriptor, model_descriptor) = (sets[0], sets[1]);

        let camera_info = [vk::DescriptorBufferInfo::builder()
            .buffer(camera_buffer.buffer)
            .offset(0)
            .range(std::mem::size_of::<GpuCameraData>() as u64)
            .build()];
        let scene_info = [vk::DescriptorBufferInfo::builder()
            .buffer(descriptors.scene_props_buffer.buffer)
            .offset(0)
            .range(std::mem::size_of::<GpuSceneData>() as u64)
            .build()];
        let model_info = [vk::DescriptorBufferInfo::builder()
            .buffer(model_buffer.buffer)
            .offset(0)
            .range((std::mem::size_of::<GpuModelData>() * MAX_RENDERABLE_OBJECTS) as u64)
            .build()];

        let writes = [
            vk::WriteDescriptorSet::builder()
                .dst_set(global_descriptor)
                .dst_binding(0)
                .descriptor_type(vk::DescriptorType::UNIFORM_BUFFER)
                .buffer_info(&camera_info)
                .build(),
            vk::WriteDescriptorSet::builder()
                .dst_set(global_descriptor)
                .dst_binding(1)
                .descriptor_type(vk::DescriptorType::UNIFORM_BUFFER_DYNAMIC)
                .buffer_info(&scene_info)
                .build(),
            vk::WriteDescriptorSet::builder()
                .dst_set(model_descriptor)
                .dst_binding(0)
                .descriptor_type(vk::DescriptorType::STORAGE_BUFFER)
                .buffer_info(&model_info)
                .build(),
        ];

        unsafe {
            device.update_descriptor_sets(&writes, &[]);
        }

        Ok(Self {
            command_pool,
            command_buffer,
            present_semaphore,
            render_semaphore,
            render_fence,
            camera_buffer,
            model_buffer,
            global_descriptor,
            model_descriptor,
        })
    }

    /// Destroy the buffers this slot owns. Pooled resources are torn
    /// down by the deletion queue.
    pub fn destroy_buffers(&mut self, context: &VulkanContext) {
        buffer::destroy_buffer(context, &mut self.camera_buffer);
        buffer::destroy_buffer(context, &mut self.model_buffer);
    }
}

/// CPU-side lifecycle state of one frame slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameSlotState {
    /// Fence signaled; the slot's resources may be reused
    Available,
    /// Command buffer is being recorded
    Recording,
    /// Commands submitted; fence pending
    Submitted,
    /// Image handed to the presentation engine
    Presented,
}

/// Frame-slot state machine enforcing the reuse ordering.
///
/// A slot transitions `Available -> Recording -> Submitted ->
/// Presented`, and back to `Available` only when its render fence
/// signal is observed. Re-recording a slot whose fence is still pending
/// is a hard error.
pub struct FrameScheduler {
    states: Vec<FrameSlotState>,
    fence_pending: Vec<bool>,
}

impl FrameScheduler {
    /// Create a scheduler for `slot_count` slots, all available (fences
    /// are created signaled).
    pub fn new(slot_count: usize) -> Self {
        Self {
            states: vec![FrameSlotState::Available; slot_count],
            fence_pending: vec![false; slot_count],
        }
    }

    /// The slot a given frame counter maps to.
    pub fn slot_for_frame(&self, frame_number: u32) -> usize {
        frame_number as usize % self.states.len()
    }

    /// Record that the slot's render fence has been observed signaled.
    pub fn fence_signaled(&mut self, slot: usize) {
        self.fence_pending[slot] = false;
        self.states[slot] = FrameSlotState::Available;
    }

    /// Begin re-recording the slot's command buffer.
    ///
    /// Fails if the slot's previous submission has not been observed
    /// complete; recording over in-flight commands is never allowed.
    pub fn begin_recording(&mut self, slot: usize) -> VulkanResult<()> {
        if self.fence_pending[slot] {
            return Err(VulkanError::InvalidOperation {
                reason: format!("frame slot {} re-recorded before its fence signaled", slot),
            });
        }
        self.states[slot] = FrameSlotState::Recording;
        Ok(())
    }

    /// Record that the slot's commands were submitted with its fence.
    pub fn submitted(&mut self, slot: usize) {
        self.states[slot] = FrameSlotState::Submitted;
        self.fence_pending[slot] = true;
    }

    /// Record that the slot's image was handed to presentation.
    pub fn presented(&mut self, slot: usize) {
        self.states[slot] = FrameSlotState::Presented;
    }

    /// Current state of a slot.
    pub fn state(&self, slot: usize) -> FrameSlotState {
        self.states[slot]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_index_cycles_round_robin() {
        let scheduler = FrameScheduler::new(FRAME_OVERLAP as usize);
        assert_eq!(scheduler.slot_for_frame(0), 0);
        assert_eq!(scheduler.slot_for_frame(1), 1);
        assert_eq!(scheduler.slot_for_frame(2), 0);
        assert_eq!(scheduler.slot_for_frame(5), 1);
    }

    #[test]
    fn test_no_re_record_before_fence_signal() {
        let mut scheduler = FrameScheduler::new(2);

        // Frame 0 and 1 record and submit normally.
        for frame in 0..2u32 {
            let slot = scheduler.slot_for_frame(frame);
            scheduler.fence_signaled(slot);
            scheduler.begin_recording(slot).unwrap();
            scheduler.submitted(slot);
            scheduler.presented(slot);
        }

        // Frame 2 reuses slot 0, but its fence signal is delayed:
        // recording must be refused until the signal is observed.
        let slot = scheduler.slot_for_frame(2);
        assert!(scheduler.begin_recording(slot).is_err());

        scheduler.fence_signaled(slot);
        assert!(scheduler.begin_recording(slot).is_ok());
    }

    #[test]
    fn test_state_transitions() {
        let mut scheduler = FrameScheduler::new(2);
        assert_eq!(scheduler.state(0), FrameSlotState::Available);

        scheduler.begin_recording(0).unwrap();
        assert_eq!(scheduler.state(0), FrameSlotState::Recording);

        scheduler.submitted(0);
        assert_eq!(scheduler.state(0), FrameSlotState::Submitted);

        scheduler.presented(0);
        assert_eq!(scheduler.state(0), FrameSlotState::Presented);

        scheduler.fence_signaled(0);
        assert_eq!(scheduler.state(0), FrameSlotState::Available);
    }
}
