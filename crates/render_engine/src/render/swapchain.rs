//! Swapchain, depth buffer, and framebuffer lifecycle
//!
//! Owns the presentable image chain and everything sized to it. On
//! resize or staleness the whole bundle is destroyed and rebuilt from
//! the window's current extent; recreation never happens mid-recording.

use crate::render::buffer::AllocatedImage;
use crate::render::context::{VulkanContext, VulkanError, VulkanResult};
use ash::vk;
use vk_mem::Alloc;

const DEPTH_FORMAT: vk::Format = vk::Format::D32_SFLOAT;

/// The presentable image chain plus depth buffer and framebuffers.
pub struct Swapchain {
    /// Swapchain handle
    pub swapchain: vk::SwapchainKHR,
    /// Images owned by the presentation engine
    pub images: Vec<vk::Image>,
    /// One view per swapchain image
    pub image_views: Vec<vk::ImageView>,
    /// Selected surface format
    pub format: vk::SurfaceFormatKHR,
    /// Extent the chain was created with
    pub extent: vk::Extent2D,
    /// Depth attachment shared by all framebuffers
    pub depth_image: AllocatedImage,
    /// View over the depth attachment
    pub depth_image_view: vk::ImageView,
    /// One framebuffer per swapchain image
    pub framebuffers: Vec<vk::Framebuffer>,
}

impl Swapchain {
    /// Build the swapchain and everything sized to it against the
    /// engine's render pass, using the window's current extent.
    pub fn new(
        context: &VulkanContext,
        render_pass: vk::RenderPass,
        window_extent: vk::Extent2D,
    ) -> VulkanResult<Self> {
        let device = &context.device;

        let surface_caps = unsafe {
            context
                .surface_loader
                .get_physical_device_surface_capabilities(context.physical_device, context.surface)
                .map_err(VulkanError::Api)?
        };
        let surface_formats = unsafe {
            context
                .surface_loader
                .get_physical_device_surface_formats(context.physical_device, context.surface)
                .map_err(VulkanError::Api)?
        };
        let present_modes = unsafe {
            context
                .surface_loader
                .get_physical_device_surface_present_modes(context.physical_device, context.surface)
                .map_err(VulkanError::Api)?
        };

        let format = choose_surface_format(&surface_formats);
        let present_mode = choose_present_mode(&present_modes);
        let extent = choose_extent(&surface_caps, window_extent);
        let image_count = choose_image_count(&surface_caps);

        let swapchain_info = vk::SwapchainCreateInfoKHR::builder()
            .surface(context.surface)
            .min_image_count(image_count)
            .image_format(format.format)
            .image_color_space(format.color_space)
            .image_extent(extent)
            .image_array_layers(1)
            .image_usage(vk::ImageUsageFlags::COLOR_ATTACHMENT)
            .image_sharing_mode(vk::SharingMode::EXCLUSIVE)
            .pre_transform(surface_caps.current_transform)
            .composite_alpha(vk::CompositeAlphaFlagsKHR::OPAQUE)
            .present_mode(present_mode)
            .clipped(true);

        let swapchain = unsafe {
            context
                .swapchain_loader
                .create_swapchain(&swapchain_info, None)
                .map_err(VulkanError::Api)?
        };

        let images = unsafe {
            context
                .swapchain_loader
                .get_swapchain_images(swapchain)
                .map_err(VulkanError::Api)?
        };

        let mut image_views = Vec::with_capacity(images.len());
        for &image in &images {
            let view_info = vk::ImageViewCreateInfo::builder()
                .image(image)
                .view_type(vk::ImageViewType::TYPE_2D)
                .format(format.format)
                .subresource_range(
                    vk::ImageSubresourceRange::builder()
                        .aspect_mask(vk::ImageAspectFlags::COLOR)
                        .base_mip_level(0)
                        .level_count(1)
                        .base_array_layer(0)
                        .layer_count(1)
                        .build(),
                );
            let view = unsafe {
                device
                    .create_image_view(&view_info, None)
                    .map_err(VulkanError::Api)?
            };
            image_views.push(view);
        }

        let depth_extent = vk::Extent3D {
            width: extent.width,
            height: extent.height,
            depth: 1,
        };
        let depth_info = vk::ImageCreateInfo::builder()
            .image_type(vk::ImageType::TYPE_2D)
            .format(DEPTH_FORMAT)
            .extent(depth_extent)
            .mip_levels(1)
            .array_layers(1)
            .samples(vk::SampleCountFlags::TYPE_1)
            .tiling(vk::ImageTiling::OPTIMAL)
            .usage(vk::ImageUsageFlags::DEPTH_STENCIL_ATTACHMENT);

        let depth_alloc_info = vk_mem::AllocationCreateInfo {
            usage: vk_mem::MemoryUsage::GpuOnly,
            required_flags: vk::MemoryPropertyFlags::DEVICE_LOCAL,
            ..Default::default()
        };

        let (depth_vk_image, depth_allocation) = unsafe {
            context
                .allocator()
                .create_image(&depth_info, &depth_alloc_info)
                .map_err(VulkanError::Api)?
        };
        let depth_image = AllocatedImage {
            image: depth_vk_image,
            allocation: depth_allocation,
        };

        let depth_view_info = vk::ImageViewCreateInfo::builder()
            .image(depth_image.image)
            .view_type(vk::ImageViewType::TYPE_2D)
            .format(DEPTH_FORMAT)
            .subresource_range(
                vk::ImageSubresourceRange::builder()
                    .aspect_mask(vk::ImageAspectFlags::DEPTH)
                    .base_mip_level(0)
                    .level_count(1)
                    .base_array_layer(0)
                    .layer_count(1)
                    .build(),
            );
        let depth_image_view = unsafe {
            device
                .create_image_view(&depth_view_info, None)
                .map_err(VulkanError::Api)?
        };

        let mut framebuffers = Vec::with_capacity(image_views.len());
        for &view in &image_views {
            let attachments = [view, depth_image_view];
            let framebuffer_info = vk::FramebufferCreateInfo::builder()
                .render_pass(render_pass)
                .attachments(&attachments)
                .width(extent.width)
                .height(extent.height)
                .layers(1);
            let framebuffer = unsafe {
                device
                    .create_framebuffer(&framebuffer_info, None)
                    .map_err(VulkanError::Api)?
            };
            framebuffers.push(framebuffer);
        }

        log::debug!(
            "Created swapchain: {}x{}, {} images, {:?}",
            extent.width,
            extent.height,
            images.len(),
            format.format
        );

        Ok(Self {
            swapchain,
            images,
            image_views,
            format,
            extent,
            depth_image,
            depth_image_view,
            framebuffers,
        })
    }

    /// Tear down framebuffers, views, depth buffer, and the chain, in
    /// reverse creation order.
    pub fn destroy(&mut self, context: &VulkanContext) {
        let device = &context.device;
        unsafe {
            for &framebuffer in &self.framebuffers {
                device.destroy_framebuffer(framebuffer, None);
            }
            self.framebuffers.clear();

            device.destroy_image_view(self.depth_image_view, None);
            context
                .allocator()
                .destroy_image(self.depth_image.image, &mut self.depth_image.allocation);

            for &view in &self.image_views {
                device.destroy_image_view(view, None);
            }
            self.image_views.clear();

            context
                .swapchain_loader
                .destroy_swapchain(self.swapchain, None);
        }
    }
}

/// Prefer sRGB BGRA; fall back to whatever the surface offers first.
pub fn choose_surface_format(formats: &[vk::SurfaceFormatKHR]) -> vk::SurfaceFormatKHR {
    formats
        .iter()
        .find(|sf| {
            sf.format == vk::Format::B8G8R8A8_SRGB
                && sf.color_space == vk::ColorSpaceKHR::SRGB_NONLINEAR
        })
        .copied()
        .unwrap_or(formats[0])
}

/// Prefer immediate presentation; FIFO is the guaranteed fallback.
pub fn choose_present_mode(modes: &[vk::PresentModeKHR]) -> vk::PresentModeKHR {
    modes
        .iter()
        .copied()
        .find(|&mode| mode == vk::PresentModeKHR::IMMEDIATE)
        .unwrap_or(vk::PresentModeKHR::FIFO)
}

/// Resolve the swapchain extent from the surface capabilities and the
/// window's freshly queried extent.
pub fn choose_extent(
    caps: &vk::SurfaceCapabilitiesKHR,
    window_extent: vk::Extent2D,
) -> vk::Extent2D {
    // A fixed current_extent means the surface dictates the size.
    if caps.current_extent.width != u32::MAX {
        return caps.current_extent;
    }
    vk::Extent2D {
        width: window_extent
            .width
            .clamp(caps.min_image_extent.width, caps.max_image_extent.width),
        height: window_extent
            .height
            .clamp(caps.min_image_extent.height, caps.max_image_extent.height),
    }
}

fn choose_image_count(caps: &vk::SurfaceCapabilitiesKHR) -> u32 {
    let mut count = caps.min_image_count + 1;
    if caps.max_image_count > 0 {
        count = count.min(caps.max_image_count);
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caps(min: (u32, u32), max: (u32, u32), current: Option<(u32, u32)>) -> vk::SurfaceCapabilitiesKHR {
        vk::SurfaceCapabilitiesKHR {
            min_image_extent: vk::Extent2D {
                width: min.0,
                height: min.1,
            },
            max_image_extent: vk::Extent2D {
                width: max.0,
                height: max.1,
            },
            current_extent: match current {
                Some((w, h)) => vk::Extent2D { width: w, height: h },
                None => vk::Extent2D {
                    width: u32::MAX,
                    height: u32::MAX,
                },
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_extent_tracks_latest_window_size() {
        let caps = caps((1, 1), (4096, 4096), None);
        let extent = choose_extent(&caps, vk::Extent2D { width: 1280, height: 720 });
        assert_eq!((extent.width, extent.height), (1280, 720));

        // A later resize query must win over any earlier value.
        let extent = choose_extent(&caps, vk::Extent2D { width: 800, height: 600 });
        assert_eq!((extent.width, extent.height), (800, 600));
    }

    #[test]
    fn test_extent_is_clamped_to_surface_caps() {
        let caps = caps((200, 200), (1000, 1000), None);
        let extent = choose_extent(&caps, vk::Extent2D { width: 10, height: 4000 });
        assert_eq!((extent.width, extent.height), (200, 1000));
    }

    #[test]
    fn test_surface_dictated_extent_wins() {
        let caps = caps((1, 1), (4096, 4096), Some((1920, 1080)));
        let extent = choose_extent(&caps, vk::Extent2D { width: 100, height: 100 });
        assert_eq!((extent.width, extent.height), (1920, 1080));
    }

    #[test]
    fn test_surface_format_prefers_srgb() {
        let formats = [
            vk::SurfaceFormatKHR {
                format: vk::Format::R8G8B8A8_UNORM,
                color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
            },
            vk::SurfaceFormatKHR {
                format: vk::Format::B8G8R8A8_SRGB,
                color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
            },
        ];
        assert_eq!(choose_surface_format(&formats).format, vk::Format::B8G8R8A8_SRGB);
    }

    #[test]
    fn test_present_mode_falls_back_to_fifo() {
        let modes = [vk::PresentModeKHR::FIFO, vk::PresentModeKHR::MAILBOX];
        assert_eq!(choose_present_mode(&modes), vk::PresentModeKHR::FIFO);

        let modes = [vk::PresentModeKHR::FIFO, vk::PresentModeKHR::IMMEDIATE];
        assert_eq!(choose_present_mode(&modes), vk::PresentModeKHR::IMMEDIATE);
    }
}
