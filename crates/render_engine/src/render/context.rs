//! Vulkan context bootstrap
//!
//! Creates the instance, picks a physical device, creates the logical
//! device and graphics queue, and brings up the GPU memory allocator.
//! The context is a read-only shared handle bundle: every other render
//! component borrows it, and it outlives all of them.

use crate::window::Window;
#[cfg(debug_assertions)]
use ash::extensions::ext::DebugUtils;
use ash::extensions::khr::{Surface, Swapchain as SwapchainLoader};
use ash::vk;
use ash::{Device, Entry, Instance};
use std::ffi::{CStr, CString};
use thiserror::Error;

/// Vulkan-specific error types
#[derive(Error, Debug)]
pub enum VulkanError {
    /// General Vulkan API error with result code
    #[error("Vulkan API error: {0:?}")]
    Api(vk::Result),

    /// Vulkan context initialization failed
    #[error("Initialization failed: {0}")]
    InitializationFailed(String),

    /// Invalid operation attempted
    #[error("Invalid operation: {reason}")]
    InvalidOperation {
        /// Description of why the operation is invalid
        reason: String,
    },
}

/// Result type for Vulkan operations
pub type VulkanResult<T> = Result<T, VulkanError>;

/// Main Vulkan context owning the instance, device, queue, and allocator.
pub struct VulkanContext {
    /// Vulkan entry point
    pub entry: Entry,
    /// Vulkan instance handle
    pub instance: Instance,
    #[cfg(debug_assertions)]
    debug_utils: Option<DebugUtils>,
    #[cfg(debug_assertions)]
    debug_messenger: Option<vk::DebugUtilsMessengerEXT>,
    /// Window surface
    pub surface: vk::SurfaceKHR,
    /// Surface extension loader
    pub surface_loader: Surface,
    /// Selected physical device
    pub physical_device: vk::PhysicalDevice,
    /// Physical device properties (source of alignment limits)
    pub properties: vk::PhysicalDeviceProperties,
    /// Logical device
    pub device: Device,
    /// Graphics + present queue
    pub graphics_queue: vk::Queue,
    /// Index of the graphics queue family
    pub graphics_family: u32,
    /// Swapchain extension loader
    pub swapchain_loader: SwapchainLoader,
    /// GPU memory allocator; `Option` so teardown can drop it before
    /// the device is destroyed
    allocator: Option<vk_mem::Allocator>,
}

impl VulkanContext {
    /// Bootstrap the full Vulkan context for a window.
    pub fn new(window: &mut Window, app_name: &str) -> VulkanResult<Self> {
        let entry = unsafe { Entry::load() }.map_err(|e| {
            VulkanError::InitializationFailed(format!("Failed to load Vulkan: {:?}", e))
        })?;

        let instance = create_instance(&entry, window, app_name)?;

        #[cfg(debug_assertions)]
        let (debug_utils, debug_messenger) = {
            let debug_utils = DebugUtils::new(&entry, &instance);
            let messenger = create_debug_messenger(&debug_utils)?;
            (Some(debug_utils), Some(messenger))
        };

        let surface_loader = Surface::new(&entry, &instance);
        let surface = window
            .create_surface(instance.handle())
            .map_err(|e| VulkanError::InitializationFailed(format!("Surface creation: {}", e)))?;

        let (physical_device, graphics_family) =
            select_physical_device(&instance, surface, &surface_loader)?;
        let properties = unsafe { instance.get_physical_device_properties(physical_device) };

        log::info!("Selected GPU: {}", unsafe {
            CStr::from_ptr(properties.device_name.as_ptr()).to_string_lossy()
        });

        let device = create_device(&instance, physical_device, graphics_family)?;
        let graphics_queue = unsafe { device.get_device_queue(graphics_family, 0) };
        let swapchain_loader = SwapchainLoader::new(&instance, &device);

        let allocator_info = vk_mem::AllocatorCreateInfo::new(&instance, &device, physical_device);
        let allocator = vk_mem::Allocator::new(allocator_info).map_err(VulkanError::Api)?;

        Ok(Self {
            entry,
            instance,
            #[cfg(debug_assertions)]
            debug_utils,
            #[cfg(debug_assertions)]
            debug_messenger,
            surface,
            surface_loader,
            physical_device,
            properties,
            device,
            graphics_queue,
            graphics_family,
            swapchain_loader,
            allocator: Some(allocator),
        })
    }

    /// The GPU memory allocator.
    ///
    /// Valid until [`VulkanContext::destroy`]; all allocations must be
    /// returned through it before teardown.
    pub fn allocator(&self) -> &vk_mem::Allocator {
        self.allocator
            .as_ref()
            .expect("allocator used after context teardown")
    }

    /// The device's minimum uniform-buffer offset alignment.
    pub fn min_uniform_buffer_offset_alignment(&self) -> u64 {
        self.properties.limits.min_uniform_buffer_offset_alignment
    }

    /// Block until the device finishes all submitted work.
    pub fn wait_idle(&self) -> VulkanResult<()> {
        unsafe { self.device.device_wait_idle().map_err(VulkanError::Api) }
    }

    /// Tear down the context: allocator, device, surface, debug
    /// messenger, instance — strict reverse of bootstrap order.
    ///
    /// Every allocation must already be returned to the allocator.
    pub fn destroy(&mut self) {
        // Dropping the allocator destroys the VMA instance; it must
        // happen while the device is still alive.
        drop(self.allocator.take());

        unsafe {
            self.device.destroy_device(None);
            self.surface_loader.destroy_surface(self.surface, None);

            #[cfg(debug_assertions)]
            if let (Some(debug_utils), Some(messenger)) =
                (&self.debug_utils, self.debug_messenger.take())
            {
                debug_utils.destroy_debug_utils_messenger(messenger, None);
            }

            self.instance.destroy_instance(None);
        }
    }
}

fn create_instance(entry: &Entry, window: &Window, app_name: &str) -> VulkanResult<Instance> {
    let app_name_cstr = CString::new(app_name).unwrap();
    let engine_name_cstr = CString::new("render_engine").unwrap();
    let app_info = vk::ApplicationInfo::builder()
        .application_name(&app_name_cstr)
        .application_version(vk::make_api_version(0, 1, 0, 0))
        .engine_name(&engine_name_cstr)
        .engine_version(vk::make_api_version(0, 1, 0, 0))
        .api_version(vk::API_VERSION_1_3);

    let required_extensions = window.required_instance_extensions().map_err(|e| {
        VulkanError::InitializationFailed(format!("Failed to get required extensions: {}", e))
    })?;

    let cstr_extensions: Vec<CString> = required_extensions
        .iter()
        .map(|ext| CString::new(ext.as_str()).unwrap())
        .collect();

    #[allow(unused_mut)]
    let mut extensions: Vec<*const i8> = cstr_extensions.iter().map(|ext| ext.as_ptr()).collect();

    #[cfg(debug_assertions)]
    extensions.push(DebugUtils::name().as_ptr());

    let layer_names: Vec<CString> = if cfg!(debug_assertions) {
        vec![CString::new("VK_LAYER_KHRONOS_validation").unwrap()]
    } else {
        vec![]
    };
    let layer_names_ptrs: Vec<*const i8> = layer_names.iter().map(|name| name.as_ptr()).collect();

    let create_info = vk::InstanceCreateInfo::builder()
        .application_info(&app_info)
        .enabled_extension_names(&extensions)
        .enabled_layer_names(&layer_names_ptrs);

    unsafe {
        entry
            .create_instance(&create_info, None)
            .map_err(VulkanError::Api)
    }
}

#[cfg(debug_assertions)]
fn create_debug_messenger(debug_utils: &DebugUtils) -> VulkanResult<vk::DebugUtilsMessengerEXT> {
    let create_info = vk::DebugUtilsMessengerCreateInfoEXT::builder()
        .message_severity(
            vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
                | vk::DebugUtilsMessageSeverityFlagsEXT::ERROR,
        )
        .message_type(
            vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
        )
        .pfn_user_callback(Some(debug_callback));

    unsafe {
        debug_utils
            .create_debug_utils_messenger(&create_info, None)
            .map_err(VulkanError::Api)
    }
}

/// Validation-layer messages routed to the `log` facade.
#[cfg(debug_assertions)]
unsafe extern "system" fn debug_callback(
    message_severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    message_type: vk::DebugUtilsMessageTypeFlagsEXT,
    callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT,
    _user_data: *mut std::ffi::c_void,
) -> vk::Bool32 {
    let callback_data = *callback_data;
    let message = CStr::from_ptr(callback_data.p_message).to_string_lossy();

    if message_severity >= vk::DebugUtilsMessageSeverityFlagsEXT::ERROR {
        log::error!("[Vulkan] {:?} - {}", message_type, message);
    } else {
        log::warn!("[Vulkan] {:?} - {}", message_type, message);
    }

    vk::FALSE
}

/// Pick the first physical device with swapchain support and a queue
/// family that can both draw and present to the surface.
fn select_physical_device(
    instance: &Instance,
    surface: vk::SurfaceKHR,
    surface_loader: &Surface,
) -> VulkanResult<(vk::PhysicalDevice, u32)> {
    let devices = unsafe {
        instance
            .enumerate_physical_devices()
            .map_err(VulkanError::Api)?
    };

    for device in devices {
        if let Some(graphics_family) = evaluate_device(instance, device, surface, surface_loader)? {
            return Ok((device, graphics_family));
        }
    }

    Err(VulkanError::InitializationFailed(
        "No suitable GPU found".to_string(),
    ))
}

fn evaluate_device(
    instance: &Instance,
    device: vk::PhysicalDevice,
    surface: vk::SurfaceKHR,
    surface_loader: &Surface,
) -> VulkanResult<Option<u32>> {
    let extensions = unsafe {
        instance
            .enumerate_device_extension_properties(device)
            .map_err(VulkanError::Api)?
    };

    let has_swapchain = extensions.iter().any(|available| {
        let name = unsafe { CStr::from_ptr(available.extension_name.as_ptr()) };
        name == SwapchainLoader::name()
    });
    if !has_swapchain {
        return Ok(None);
    }

    let queue_families = unsafe { instance.get_physical_device_queue_family_properties(device) };

    for (index, family) in queue_families.iter().enumerate() {
        let index = index as u32;
        if !family.queue_flags.contains(vk::QueueFlags::GRAPHICS) {
            continue;
        }

        let present_support = unsafe {
            surface_loader
                .get_physical_device_surface_support(device, index, surface)
                .map_err(VulkanError::Api)?
        };
        if present_support {
            return Ok(Some(index));
        }
    }

    Ok(None)
}

fn create_device(
    instance: &Instance,
    physical_device: vk::PhysicalDevice,
    graphics_family: u32,
) -> VulkanResult<Device> {
    let queue_priorities = [1.0f32];
    let queue_infos = [vk::DeviceQueueCreateInfo::builder()
        .queue_family_index(graphics_family)
        .queue_priorities(&queue_priorities)
        .build()];

    let required_extensions = [SwapchainLoader::name().as_ptr()];
    let device_features = vk::PhysicalDeviceFeatures::builder();

    // The vertex stage indexes the per-object storage buffer with
    // gl_BaseInstance, which needs the shader-draw-parameters feature.
    let mut draw_parameters_features =
        vk::PhysicalDeviceShaderDrawParametersFeatures::builder().shader_draw_parameters(true);

    let create_info = vk::DeviceCreateInfo::builder()
        .queue_create_infos(&queue_infos)
        .enabled_extension_names(&required_extensions)
        .enabled_features(&device_features)
        .push_next(&mut draw_parameters_features);

    unsafe {
        instance
            .create_device(physical_device, &create_info, None)
            .map_err(VulkanError::Api)
    }
}
