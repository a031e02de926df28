//! Staged GPU uploads through a dedicated one-shot submission path
//!
//! The upload context owns its own command pool so frame recording can
//! never invalidate an in-flight upload. `immediate_submit` is fully
//! synchronous: it records, submits, blocks on the upload fence, and
//! resets the pool before returning, so upload ordering is simply
//! program order.

use crate::render::buffer;
use crate::render::context::{VulkanContext, VulkanError, VulkanResult};
use crate::render::deletion_queue::{DeferredResource, DeletionQueue};
use crate::render::mesh::{Mesh, Vertex};
use crate::render::texture::Texture;
use crate::assets::image_loader::ImageData;
use ash::vk;
use vk_mem::Alloc;

/// Bounded wait applied to the upload fence; expiry is fatal.
const UPLOAD_TIMEOUT_NS: u64 = 1_000_000_000;

const TEXTURE_FORMAT: vk::Format = vk::Format::R8G8B8A8_SRGB;

/// Dedicated command pool, buffer, and fence for one-shot submissions.
pub struct UploadContext {
    /// Pool separate from the per-frame pools
    pub command_pool: vk::CommandPool,
    /// The single one-shot command buffer
    pub command_buffer: vk::CommandBuffer,
    /// Signaled when a submitted upload completes
    pub upload_fence: vk::Fence,
}

impl UploadContext {
    /// Create the upload path and register its resources with the
    /// deletion queue.
    pub fn new(
        context: &VulkanContext,
        deletion_queue: &mut DeletionQueue<DeferredResource>,
    ) -> VulkanResult<Self> {
        let device = &context.device;

        let pool_info =
            vk::CommandPoolCreateInfo::builder().queue_family_index(context.graphics_family);
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

        // Unlike the render fences, the upload fence starts unsignaled:
        // it is only ever waited on right after a submit.
        let fence_info = vk::FenceCreateInfo::builder();
        let upload_fence = unsafe {
            device
                .create_fence(&fence_info, None)
                .map_err(VulkanError::Api)?
        };
        deletion_queue.push(DeferredResource::Fence(upload_fence));

        Ok(Self {
            command_pool,
            command_buffer,
            upload_fence,
        })
    }

    /// Record `record` into the one-shot buffer, submit it, and block
    /// until the GPU finishes.
    pub fn immediate_submit(
        &self,
        context: &VulkanContext,
        record: impl FnOnce(vk::CommandBuffer),
    ) -> VulkanResult<()> {
        let device = &context.device;
        let cmd = self.command_buffer;

        let begin_info = vk::CommandBufferBeginInfo::builder()
            .flags(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT);

        unsafe {
            device
                .begin_command_buffer(cmd, &begin_info)
                .map_err(VulkanError::Api)?;
        }

        record(cmd);

        unsafe {
            device.end_command_buffer(cmd).map_err(VulkanError::Api)?;

            let command_buffers = [cmd];
            let submit_info = vk::SubmitInfo::builder()
                .command_buffers(&command_buffers)
                .build();
            device
                .queue_submit(context.graphics_queue, &[submit_info], self.upload_fence)
                .map_err(VulkanError::Api)?;

            device
                .wait_for_fences(&[self.upload_fence], true, UPLOAD_TIMEOUT_NS)
                .map_err(VulkanError::Api)?;
            device
                .reset_fences(&[self.upload_fence])
                .map_err(VulkanError::Api)?;

            device
                .reset_command_pool(self.command_pool, vk::CommandPoolResetFlags::empty())
                .map_err(VulkanError::Api)?;
        }

        Ok(())
    }
}

/// Upload a mesh's vertices to a device-local buffer via staging.
///
/// The staging buffer lives only for the duration of the call; the
/// device-local buffer's teardown is registered with the deletion
/// queue and its handle stored on the mesh.
pub fn upload_mesh(
    context: &VulkanContext,
    upload: &UploadContext,
    deletion_queue: &mut DeletionQueue<DeferredResource>,
    mesh: &mut Mesh,
) -> VulkanResult<()> {
    let buffer_size = (mesh.vertices.len() * std::mem::size_of::<Vertex>()) as vk::DeviceSize;

    let mut staging = buffer::create_buffer(
        context,
        buffer_size,
        vk::BufferUsageFlags::TRANSFER_SRC,
        vk_mem::MemoryUsage::CpuOnly,
    )?;
    buffer::write_buffer(context, &mut staging, 0, bytemuck::cast_slice(&mesh.vertices))?;

    let vertex_buffer = buffer::create_buffer(
        context,
        buffer_size,
        vk::BufferUsageFlags::VERTEX_BUFFER | vk::BufferUsageFlags::TRANSFER_DST,
        vk_mem::MemoryUsage::GpuOnly,
    )?;

    let device = &context.device;
    upload.immediate_submit(context, |cmd| {
        let copy = vk::BufferCopy {
            src_offset: 0,
            dst_offset: 0,
            size: buffer_size,
        };
        unsafe {
            device.cmd_copy_buffer(cmd, staging.buffer, vertex_buffer.buffer, &[copy]);
        }
    })?;

    mesh.vertex_buffer = vertex_buffer.buffer;
    deletion_queue.push(DeferredResource::Buffer {
        buffer: vertex_buffer.buffer,
        allocation: vertex_buffer.allocation,
    });

    buffer::destroy_buffer(context, &mut staging);
    Ok(())
}

/// Upload decoded RGBA8 pixels to a device-local sampled image.
///
/// Layout transitions bracket the copy: undefined to transfer
/// destination before, transfer destination to shader-read after. Image
/// and view teardown are registered with the deletion queue.
pub fn upload_texture(
    context: &VulkanContext,
    upload: &UploadContext,
    deletion_queue: &mut DeletionQueue<DeferredResource>,
    image_data: &ImageData,
) -> VulkanResult<Texture> {
    let byte_size = image_data.byte_size() as vk::DeviceSize;

    let mut staging = buffer::create_buffer(
        context,
        byte_size,
        vk::BufferUsageFlags::TRANSFER_SRC,
        vk_mem::MemoryUsage::CpuOnly,
    )?;
    buffer::write_buffer(context, &mut staging, 0, &image_data.pixels)?;

    let image_extent = vk::Extent3D {
        width: image_data.width,
        height: image_data.height,
        depth: 1,
    };

    let image_info = vk::ImageCreateInfo::builder()
        .image_type(vk::ImageType::TYPE_2D)
        .format(TEXTURE_FORMAT)
        .extent(image_extent)
        .mip_levels(1)
        .array_layers(1)
        .samples(vk::SampleCountFlags::TYPE_1)
        .tiling(vk::ImageTiling::OPTIMAL)
        .usage(vk::ImageUsageFlags::SAMPLED | vk::ImageUsageFlags::TRANSFER_DST);

    let alloc_info = vk_mem::AllocationCreateInfo {
        usage: vk_mem::MemoryUsage::GpuOnly,
        ..Default::default()
    };

    let (image, allocation) = unsafe {
        context
            .allocator()
            .create_image(&image_info, &alloc_info)
            .map_err(VulkanError::Api)?
    };

    let device = &context.device;
    upload.immediate_submit(context, |cmd| {
        let range = vk::ImageSubresourceRange::builder()
            .aspect_mask(vk::ImageAspectFlags::COLOR)
            .base_mip_level(0)
            .level_count(1)
            .base_array_layer(0)
            .layer_count(1)
            .build();

        let to_transfer = vk::ImageMemoryBarrier::builder()
            .old_layout(vk::ImageLayout::UNDEFINED)
            .new_layout(vk::ImageLayout::TRANSFER_DST_OPTIMAL)
            .image(image)
            .subresource_range(range)
            .src_access_mask(vk::AccessFlags::empty())
            .dst_access_mask(vk::AccessFlags::TRANSFER_WRITE)
            .build();

        let copy_region = vk::BufferImageCopy::builder()
            .buffer_offset(0)
            .buffer_row_length(0)
            .buffer_image_height(0)
            .image_subresource(
                vk::ImageSubresourceLayers::builder()
                    .aspect_mask(vk::ImageAspectFlags::COLOR)
                    .mip_level(0)
                    .base_array_layer(0)
                    .layer_count(1)
                    .build(),
            )
            .image_extent(image_extent)
            .build();

        let to_readable = vk::ImageMemoryBarrier::builder()
            .old_layout(vk::ImageLayout::TRANSFER_DST_OPTIMAL)
            .new_layout(vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL)
            .image(image)
            .subresource_range(range)
            .src_access_mask(vk::AccessFlags::TRANSFER_WRITE)
            .dst_access_mask(vk::AccessFlags::SHADER_READ)
            .build();

        unsafe {
            device.cmd_pipeline_barrier(
                cmd,
                vk::PipelineStageFlags::TOP_OF_PIPE,
                vk::PipelineStageFlags::TRANSFER,
                vk::DependencyFlags::empty(),
                &[],
                &[],
                &[to_transfer],
            );
            device.cmd_copy_buffer_to_image(
                cmd,
                staging.buffer,
                image,
                vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                &[copy_region],
            );
            device.cmd_pipeline_barrier(
                cmd,
                vk::PipelineStageFlags::TRANSFER,
                vk::PipelineStageFlags::FRAGMENT_SHADER,
                vk::DependencyFlags::empty(),
                &[],
                &[],
                &[to_readable],
            );
        }
    })?;

    deletion_queue.push(DeferredResource::Image { image, allocation });

    let view_info = vk::ImageViewCreateInfo::builder()
        .image(image)
        .view_type(vk::ImageViewType::TYPE_2D)
        .format(TEXTURE_FORMAT)
        .subresource_range(
            vk::ImageSubresourceRange::builder()
                .aspect_mask(vk::ImageAspectFlags::COLOR)
                .base_mip_level(0)
                .level_count(1)
                .base_array_layer(0)
                .layer_count(1)
                .build(),
        );
    let image_view = unsafe {
        device
            .create_image_view(&view_info, None)
            .map_err(VulkanError::Api)?
    };
    deletion_queue.push(DeferredResource::ImageView(image_view));

    buffer::destroy_buffer(context, &mut staging);

    Ok(Texture { image, image_view })
}
