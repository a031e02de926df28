//! Descriptor layouts, pool, and shared scene uniform region
//!
//! Three set layouts back the single graphics pipeline: a global set
//! (camera uniform + dynamically offset scene uniform), a per-object
//! set (transform storage buffer), and a single-texture set. The scene
//! uniform is one buffer partitioned into `FRAME_OVERLAP` regions, each
//! padded up to the device's minimum uniform-offset alignment and
//! selected at bind time via a dynamic offset.

use crate::render::buffer::{self, AllocatedBuffer};
use crate::render::context::{VulkanContext, VulkanError, VulkanResult};
use crate::render::deletion_queue::{DeferredResource, DeletionQueue};
use crate::render::frame::FRAME_OVERLAP;
use ash::vk;
use bytemuck::{Pod, Zeroable};

/// Camera matrices, rewritten in full every frame.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct GpuCameraData {
    /// View matrix
    pub view: [[f32; 4]; 4],
    /// Projection matrix
    pub projection: [[f32; 4]; 4],
    /// Combined projection * view matrix
    pub view_proj: [[f32; 4]; 4],
}

/// Rarely changing global scene properties.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, Pod, Zeroable)]
pub struct GpuSceneData {
    /// Fog color (w unused)
    pub fog_color: [f32; 4],
    /// Fog start/end distances (x = min, y = max)
    pub fog_distance: [f32; 4],
    /// Ambient light color
    pub ambient_color: [f32; 4],
    /// Sun direction (w = power)
    pub sun_direction: [f32; 4],
    /// Sun light color
    pub sun_color: [f32; 4],
}

/// One per-object entry in the frame's transform storage buffer.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct GpuModelData {
    /// World transform matrix
    pub matrix: [[f32; 4]; 4],
}

/// Round `size` up to the next multiple of `alignment`.
///
/// `alignment` is a power of two as reported by
/// `min_uniform_buffer_offset_alignment`; zero means no alignment
/// requirement.
pub fn pad_uniform_buffer_size(size: u64, alignment: u64) -> u64 {
    if alignment > 0 {
        (size + alignment - 1) & !(alignment - 1)
    } else {
        size
    }
}

/// Descriptor pool, set layouts, and the shared scene uniform buffer.
pub struct Descriptors {
    /// Pool all engine descriptor sets are allocated from
    pub pool: vk::DescriptorPool,
    /// Set 0 layout: camera UBO + dynamic scene UBO
    pub global_set_layout: vk::DescriptorSetLayout,
    /// Set 1 layout: per-object transform storage buffer
    pub model_set_layout: vk::DescriptorSetLayout,
    /// Set 2 layout: one combined image sampler
    pub single_texture_set_layout: vk::DescriptorSetLayout,
    /// Scene properties buffer, one padded region per frame slot
    pub scene_props_buffer: AllocatedBuffer,
    /// Byte size of one padded scene region
    pub scene_region_size: u64,
}

impl Descriptors {
    /// Create the pool, layouts, and scene buffer. Pool and layouts are
    /// registered with the deletion queue; the scene buffer stays owned
    /// here because it is remapped every frame.
    pub fn new(
        context: &VulkanContext,
        deletion_queue: &mut DeletionQueue<DeferredResource>,
    ) -> VulkanResult<Self> {
        let device = &context.device;

        let pool_sizes = [
            vk::DescriptorPoolSize {
                ty: vk::DescriptorType::UNIFORM_BUFFER,
                descriptor_count: 10,
            },
            vk::DescriptorPoolSize {
                ty: vk::DescriptorType::UNIFORM_BUFFER_DYNAMIC,
                descriptor_count: 10,
            },
            vk::DescriptorPoolSize {
                ty: vk::DescriptorType::STORAGE_BUFFER,
                descriptor_count: 10,
            },
            vk::DescriptorPoolSize {
                ty: vk::DescriptorType::COMBINED_IMAGE_SAMPLER,
                descriptor_count: 10,
            },
        ];

        let pool_info = vk::DescriptorPoolCreateInfo::builder()
            .max_sets(10)
            .pool_sizes(&pool_sizes);

        let pool = unsafe {
            device
                .create_descriptor_pool(&pool_info, None)
                .map_err(VulkanError::Api)?
        };
        deletion_queue.push(DeferredResource::DescriptorPool(pool));

        let global_bindings = [
            vk::DescriptorSetLayoutBinding::builder()
                .binding(0)
                .descriptor_type(vk::DescriptorType::UNIFORM_BUFFER)
                .descriptor_count(1)
                .stage_flags(vk::ShaderStageFlags::VERTEX | vk::ShaderStageFlags::FRAGMENT)
                .build(),
            vk::DescriptorSetLayoutBinding::builder()
                .binding(1)
                .descriptor_type(vk::DescriptorType::UNIFORM_BUFFER_DYNAMIC)
                .descriptor_count(1)
                .stage_flags(vk::ShaderStageFlags::VERTEX | vk::ShaderStageFlags::FRAGMENT)
                .build(),
        ];
        let global_info = vk::DescriptorSetLayoutCreateInfo::builder().bindings(&global_bindings);
        let global_set_layout = unsafe {
            device
                .create_descriptor_set_layout(&global_info, None)
                .map_err(VulkanError::Api)?
        };
        deletion_queue.push(DeferredResource::DescriptorSetLayout(global_set_layout));

        let model_bindings = [vk::DescriptorSetLayoutBinding::builder()
            .binding(0)
            .descriptor_type(vk::DescriptorType::STORAGE_BUFFER)
            .descriptor_count(1)
            .stage_flags(vk::ShaderStageFlags::VERTEX)
            .build()];
        let model_info = vk::DescriptorSetLayoutCreateInfo::builder().bindings(&model_bindings);
        let model_set_layout = unsafe {
            device
                .create_descriptor_set_layout(&model_info, None)
                .map_err(VulkanError::Api)?
        };
        deletion_queue.push(DeferredResource::DescriptorSetLayout(model_set_layout));

        let texture_bindings = [vk::DescriptorSetLayoutBinding::builder()
            .binding(0)
            .descriptor_type(vk::DescriptorType::COMBINED_IMAGE_SAMPLER)
            .descriptor_count(1)
            .stage_flags(vk::ShaderStageFlags::FRAGMENT)
            .build()];
        let texture_info = vk::DescriptorSetLayoutCreateInfo::builder().bindings(&texture_bindings);
        let single_texture_set_layout = unsafe {
            device
                .create_descriptor_set_layout(&texture_info, None)
                .map_err(VulkanError::Api)?
        };
        deletion_queue.push(DeferredResource::DescriptorSetLayout(
            single_texture_set_layout,
        ));

        // The padding must come from the queried device limit; it
        // differs per device and is never hardcoded.
        let scene_region_size = pad_uniform_buffer_size(
            std::mem::size_of::<GpuSceneData>() as u64,
            context.min_uniform_buffer_offset_alignment(),
        );
        let scene_props_buffer = buffer::create_buffer(
            context,
            FRAME_OVERLAP as u64 * scene_region_size,
            vk::BufferUsageFlags::UNIFORM_BUFFER,
            vk_mem::MemoryUsage::CpuToGpu,
        )?;

        Ok(Self {
            pool,
            global_set_layout,
            model_set_layout,
            single_texture_set_layout,
            scene_props_buffer,
            scene_region_size,
        })
    }

    /// Dynamic offset selecting the scene region for `frame_index`.
    pub fn scene_dynamic_offset(&self, frame_index: usize) -> u32 {
        (self.scene_region_size * frame_index as u64) as u32
    }

    /// Destroy the scene buffer. Pool and layouts are torn down by the
    /// deletion queue.
    pub fn destroy(&mut self, context: &VulkanContext) {
        buffer::destroy_buffer(context, &mut self.scene_props_buffer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pad_is_monotonic_and_aligned() {
        for alignment in [1u64, 4, 16, 64, 256] {
            for size in [0u64, 1, 4, 17, 64, 100, 255, 256, 257, 4096] {
                let padded = pad_uniform_buffer_size(size, alignment);
                assert!(padded >= size, "pad({}, {}) shrank", size, alignment);
                assert_eq!(padded % alignment, 0, "pad({}, {}) misaligned", size, alignment);
                assert!(
                    padded < size + alignment,
                    "pad({}, {}) overshot",
                    size,
                    alignment
                );
            }
        }
    }

    #[test]
    fn test_pad_without_alignment_requirement() {
        assert_eq!(pad_uniform_buffer_size(100, 0), 100);
    }

    #[test]
    fn test_gpu_struct_sizes() {
        assert_eq!(std::mem::size_of::<GpuCameraData>(), 3 * 64);
        assert_eq!(std::mem::size_of::<GpuSceneData>(), 5 * 16);
        assert_eq!(std::mem::size_of::<GpuModelData>(), 64);
    }
}
