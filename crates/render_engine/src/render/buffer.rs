//! Allocator-backed buffer and image handles
//!
//! Thin pairings of a Vulkan handle with its allocator-owned memory
//! token. Ownership is exclusive: whichever component created the
//! allocation destroys it through the same allocator, either directly
//! or via a deletion-queue record.

use crate::render::context::{VulkanContext, VulkanError, VulkanResult};
use ash::vk;
use vk_mem::Alloc;

/// A buffer plus its allocator memory token.
pub struct AllocatedBuffer {
    /// Vulkan buffer handle
    pub buffer: vk::Buffer,
    /// Allocator-owned memory token
    pub allocation: vk_mem::Allocation,
}

/// An image plus its allocator memory token.
pub struct AllocatedImage {
    /// Vulkan image handle
    pub image: vk::Image,
    /// Allocator-owned memory token
    pub allocation: vk_mem::Allocation,
}

/// Create a buffer of `size` bytes in the requested memory class.
pub fn create_buffer(
    context: &VulkanContext,
    size: vk::DeviceSize,
    usage: vk::BufferUsageFlags,
    memory_usage: vk_mem::MemoryUsage,
) -> VulkanResult<AllocatedBuffer> {
    let buffer_info = vk::BufferCreateInfo::builder()
        .size(size)
        .usage(usage)
        .sharing_mode(vk::SharingMode::EXCLUSIVE);

    let allocation_info = vk_mem::AllocationCreateInfo {
        usage: memory_usage,
        ..Default::default()
    };

    let (buffer, allocation) = unsafe {
        context
            .allocator()
            .create_buffer(&buffer_info, &allocation_info)
            .map_err(VulkanError::Api)?
    };

    Ok(AllocatedBuffer { buffer, allocation })
}

/// Destroy a buffer and return its memory to the allocator.
pub fn destroy_buffer(context: &VulkanContext, buffer: &mut AllocatedBuffer) {
    unsafe {
        context
            .allocator()
            .destroy_buffer(buffer.buffer, &mut buffer.allocation);
    }
}

/// Map a host-visible buffer and copy `bytes` into it at `offset`.
pub fn write_buffer(
    context: &VulkanContext,
    buffer: &mut AllocatedBuffer,
    offset: usize,
    bytes: &[u8],
) -> VulkanResult<()> {
    unsafe {
        let mapped = context
            .allocator()
            .map_memory(&mut buffer.allocation)
            .map_err(VulkanError::Api)?;
        std::ptr::copy_nonoverlapping(bytes.as_ptr(), mapped.add(offset), bytes.len());
        context.allocator().unmap_memory(&mut buffer.allocation);
    }
    Ok(())
}
