//! Renderer orchestration
//!
//! Owns the full Vulkan state and drives the per-frame sequence: fence
//! wait, image acquisition, command recording through the draw-queue
//! batcher, submission, and presentation. Swapchain staleness abandons
//! the frame and recreates before the next one proceeds. Unexpected
//! GPU errors are propagated for the engine shell to treat as fatal.

use crate::camera::Camera;
use crate::config::EngineConfig;
use crate::console::Console;
use crate::render::buffer::{self, AllocatedBuffer};
use crate::render::context::{VulkanContext, VulkanError, VulkanResult};
use crate::render::deletion_queue::{self, DeferredResource, DeletionQueue};
use crate::render::descriptors::{Descriptors, GpuCameraData, GpuModelData, GpuSceneData};
use crate::render::draw_queue::{CommandEncoder, DrawQueue, FrameBindings};
use crate::render::frame::{FrameData, FrameScheduler, FRAME_OVERLAP};
use crate::render::material::{CreateMaterialInfo, MaterialManager};
use crate::render::mesh::MeshManager;
use crate::render::pipeline::{self, PipelineBuilder};
use crate::render::swapchain::Swapchain;
use crate::render::texture::TextureManager;
use crate::render::upload::{self, UploadContext};
use crate::scene::Model;
use crate::window::Window;
use ash::vk;

/// Capacity of each frame slot's transform storage buffer.
pub const MAX_RENDERABLE_OBJECTS: usize = 10_000;

/// Bounded wait applied to fences and image acquisition; expiry is
/// treated as fatal.
const FRAME_TIMEOUT_NS: u64 = 1_000_000_000;

/// Key of the engine's built-in material.
const DEFAULT_MATERIAL: &str = "default";

/// Descriptor for loading a drawable model.
#[derive(Debug, Clone)]
pub struct LoadModelInfo {
    /// Path to the OBJ mesh file
    pub file_path: String,
    /// Optional path to the texture image
    pub texture_path: Option<String>,
}

/// The engine's Vulkan renderer.
pub struct Renderer {
    context: VulkanContext,
    render_pass: vk::RenderPass,
    swapchain: Swapchain,
    descriptors: Descriptors,
    frames: Vec<FrameData>,
    scheduler: FrameScheduler,
    upload: UploadContext,
    deletion_queue: DeletionQueue<DeferredResource>,
    mesh_manager: MeshManager,
    material_manager: MaterialManager,
    texture_manager: TextureManager,
    draw_queue: DrawQueue,
    console: Console,
    /// First-person camera; public mutable state driven by the scene layer
    pub camera: Camera,
    /// Global scene properties written to the shared uniform region
    pub scene_props: GpuSceneData,
    frame_number: u32,
    resize_requested: bool,
    initialised: bool,
}

impl Renderer {
    /// Bring up the whole rendering stack against a window.
    pub fn new(window: &mut Window, config: &EngineConfig) -> VulkanResult<Self> {
        let mut console = Console::new();
        let mut deletion_queue = DeletionQueue::new();

        let context = VulkanContext::new(window, &config.window.title)?;

        let render_pass = create_render_pass(&context)?;
        deletion_queue.push(DeferredResource::RenderPass(render_pass));

        let swapchain = Swapchain::new(&context, render_pass, window.extent())?;

        let descriptors = Descriptors::new(&context, &mut deletion_queue)?;

        let mut frames = Vec::with_capacity(FRAME_OVERLAP as usize);
        for _ in 0..FRAME_OVERLAP {
            frames.push(FrameData::new(&context, &descriptors, &mut deletion_queue)?);
        }

        let upload = UploadContext::new(&context, &mut deletion_queue)?;

        let mut material_manager = MaterialManager::new();
        create_default_pipeline(
            &context,
            &descriptors,
            render_pass,
            config,
            &mut console,
            &mut deletion_queue,
            &mut material_manager,
        )?;

        console.log("Renderer initialised");

        Ok(Self {
            context,
            render_pass,
            swapchain,
            descriptors,
            frames,
            scheduler: FrameScheduler::new(FRAME_OVERLAP as usize),
            upload,
            deletion_queue,
            mesh_manager: MeshManager::new(),
            material_manager,
            texture_manager: TextureManager::new(),
            draw_queue: DrawQueue::new(),
            console,
            camera: Camera::new(config.camera.fov),
            scene_props: GpuSceneData::default(),
            frame_number: 0,
            resize_requested: false,
            initialised: true,
        })
    }

    /// Frames drawn (or abandoned to a recreate) since startup.
    pub fn frame_number(&self) -> u32 {
        self.frame_number
    }

    /// Flag the swapchain for recreation before the next frame.
    pub fn request_resize(&mut self) {
        self.resize_requested = true;
    }

    /// The in-process log sink.
    pub fn console(&self) -> &Console {
        &self.console
    }

    /// Mutable access to the in-process log sink.
    pub fn console_mut(&mut self) -> &mut Console {
        &mut self.console
    }

    /// Submit a drawable for this frame. The queue drains on `draw`.
    pub fn add_to_model_queue(&mut self, model: Model) {
        self.draw_queue.enqueue(model);
    }

    /// Create a GPU buffer in the requested memory class.
    pub fn create_buffer(
        &self,
        size: vk::DeviceSize,
        usage: vk::BufferUsageFlags,
        memory_usage: vk_mem::MemoryUsage,
    ) -> VulkanResult<AllocatedBuffer> {
        buffer::create_buffer(&self.context, size, usage, memory_usage)
    }

    /// Record and synchronously execute a one-shot command sequence.
    pub fn immediate_submit(&self, record: impl FnOnce(vk::CommandBuffer)) -> VulkanResult<()> {
        self.upload.immediate_submit(&self.context, record)
    }

    /// Load (or fetch from cache) a mesh and material pair.
    ///
    /// A missing mesh file yields `Ok(None)`; a missing texture falls
    /// back to the untextured default material. Both are logged. `Err`
    /// means a GPU operation failed and is fatal to the process.
    pub fn load_model(&mut self, info: &LoadModelInfo) -> VulkanResult<Option<Model>> {
        let Renderer {
            ref context,
            ref upload,
            ref descriptors,
            ref mut deletion_queue,
            ref mut console,
            ref mut mesh_manager,
            ref mut texture_manager,
            ref mut material_manager,
            ..
        } = *self;

        let mesh = match mesh_manager.load(console, &info.file_path, |mesh| {
            upload::upload_mesh(context, upload, deletion_queue, mesh)
        })? {
            Some(handle) => handle,
            None => return Ok(None),
        };

        let default_material = material_manager.find(DEFAULT_MATERIAL).ok_or_else(|| {
            VulkanError::InvalidOperation {
                reason: "default material missing".to_string(),
            }
        })?;

        let material = match &info.texture_path {
            None => default_material,
            Some(texture_path) => {
                let variant_name = format!("{}+{}", info.file_path, texture_path);
                match material_manager.find(&variant_name) {
                    Some(handle) => handle,
                    None => {
                        let texture = texture_manager.load(console, texture_path, |image_data| {
                            upload::upload_texture(context, upload, deletion_queue, image_data)
                        })?;

                        match texture {
                            None => {
                                console.log(format!(
                                    "Using untextured default material for {}",
                                    info.file_path
                                ));
                                default_material
                            }
                            Some(texture_handle) => {
                                let texture = *texture_manager.get(texture_handle);
                                let texture_set = create_texture_set(
                                    context,
                                    descriptors,
                                    deletion_queue,
                                    texture.image_view,
                                )?;
                                let base = *material_manager.get(default_material);
                                material_manager.create(CreateMaterialInfo {
                                    name: variant_name,
                                    pipeline: base.pipeline,
                                    pipeline_layout: base.pipeline_layout,
                                    texture_set: Some(texture_set),
                                })
                            }
                        }
                    }
                }
            }
        };

        Ok(Some(Model::new(mesh, material)))
    }

    /// Lines for the debug overlay.
    pub fn debug_lines(&self) -> Vec<String> {
        vec![
            format!(
                "Camera Position: {{{:.3}, {:.3}, {:.3}}}",
                self.camera.position.x, self.camera.position.y, self.camera.position.z
            ),
            format!(
                "Camera Rotation: {{{:.3}, {:.3}}}",
                self.camera.rotation.x, self.camera.rotation.y
            ),
            format!("Frame: {}", self.frame_number),
        ]
    }

    /// Draw one frame.
    ///
    /// Runs the full frame sequence. Swapchain staleness (out-of-date,
    /// suboptimal, or a pending resize request) abandons the frame,
    /// recreates the swapchain from the window's current extent, and
    /// returns `Ok`. Any other GPU failure is returned for the caller
    /// to treat as fatal.
    pub fn draw(&mut self, window: &Window) -> VulkanResult<()> {
        let slot = self.scheduler.slot_for_frame(self.frame_number);

        unsafe {
            self.context
                .device
                .wait_for_fences(&[self.frames[slot].render_fence], true, FRAME_TIMEOUT_NS)
                .map_err(VulkanError::Api)?;
        }
        self.scheduler.fence_signaled(slot);

        let acquire = unsafe {
            self.context.swapchain_loader.acquire_next_image(
                self.swapchain.swapchain,
                FRAME_TIMEOUT_NS,
                self.frames[slot].present_semaphore,
                vk::Fence::null(),
            )
        };

        let image_index = match acquire {
            Ok((index, suboptimal)) if !suboptimal && !self.resize_requested => index,
            Ok(_) | Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => {
                // Expected staleness: abandon this frame before any
                // recording and rebuild from the current extent. The
                // render fence stays signaled for the next pass.
                self.recreate_swapchain(window)?;
                self.resize_requested = false;
                self.draw_queue.truncate(0);
                self.frame_number += 1;
                return Ok(());
            }
            Err(err) => return Err(VulkanError::Api(err)),
        };

        let cmd = self.frames[slot].command_buffer;
        unsafe {
            self.context
                .device
                .reset_fences(&[self.frames[slot].render_fence])
                .map_err(VulkanError::Api)?;
            self.context
                .device
                .reset_command_buffer(cmd, vk::CommandBufferResetFlags::empty())
                .map_err(VulkanError::Api)?;
        }

        self.scheduler.begin_recording(slot)?;

        let begin_info = vk::CommandBufferBeginInfo::builder()
            .flags(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT);
        unsafe {
            self.context
                .device
                .begin_command_buffer(cmd, &begin_info)
                .map_err(VulkanError::Api)?;
        }

        let clear_values = [
            vk::ClearValue {
                color: vk::ClearColorValue {
                    float32: [0.0, 0.0, 0.0, 1.0],
                },
            },
            vk::ClearValue {
                depth_stencil: vk::ClearDepthStencilValue {
                    depth: 1.0,
                    stencil: 0,
                },
            },
        ];

        let render_pass_info = vk::RenderPassBeginInfo::builder()
            .render_pass(self.render_pass)
            .framebuffer(self.swapchain.framebuffers[image_index as usize])
            .render_area(vk::Rect2D {
                offset: vk::Offset2D { x: 0, y: 0 },
                extent: self.swapchain.extent,
            })
            .clear_values(&clear_values);

        let viewport = vk::Viewport {
            x: 0.0,
            y: 0.0,
            width: self.swapchain.extent.width as f32,
            height: self.swapchain.extent.height as f32,
            min_depth: 0.0,
            max_depth: 1.0,
        };
        let scissor = vk::Rect2D {
            offset: vk::Offset2D { x: 0, y: 0 },
            extent: self.swapchain.extent,
        };

        unsafe {
            self.context.device.cmd_begin_render_pass(
                cmd,
                &render_pass_info,
                vk::SubpassContents::INLINE,
            );
            self.context.device.cmd_set_viewport(cmd, 0, &[viewport]);
            self.context.device.cmd_set_scissor(cmd, 0, &[scissor]);
        }

        self.draw_models_in_queue(cmd, slot)?;

        unsafe {
            self.context.device.cmd_end_render_pass(cmd);
            self.context
                .device
                .end_command_buffer(cmd)
                .map_err(VulkanError::Api)?;
        }

        let wait_semaphores = [self.frames[slot].present_semaphore];
        let wait_stages = [vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT];
        let signal_semaphores = [self.frames[slot].render_semaphore];
        let command_buffers = [cmd];

        let submit_info = vk::SubmitInfo::builder()
            .wait_semaphores(&wait_semaphores)
            .wait_dst_stage_mask(&wait_stages)
            .signal_semaphores(&signal_semaphores)
            .command_buffers(&command_buffers)
            .build();

        unsafe {
            self.context
                .device
                .queue_submit(
                    self.context.graphics_queue,
                    &[submit_info],
                    self.frames[slot].render_fence,
                )
                .map_err(VulkanError::Api)?;
        }
        self.scheduler.submitted(slot);

        let swapchains = [self.swapchain.swapchain];
        let image_indices = [image_index];
        let present_info = vk::PresentInfoKHR::builder()
            .wait_semaphores(&signal_semaphores)
            .swapchains(&swapchains)
            .image_indices(&image_indices);

        let present = unsafe {
            self.context
                .swapchain_loader
                .queue_present(self.context.graphics_queue, &present_info)
        };
        match present {
            Ok(false) => {}
            // Stale at presentation: the image was consumed, so just
            // flag the rebuild for the next frame.
            Ok(true) | Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => self.resize_requested = true,
            Err(err) => return Err(VulkanError::Api(err)),
        }
        self.scheduler.presented(slot);

        self.frame_number += 1;
        Ok(())
    }

    /// Write this frame's uniforms and record the queued draws.
    ///
    /// Invoked exactly once per frame inside the render pass; leaves
    /// the draw queue empty.
    fn draw_models_in_queue(&mut self, cmd: vk::CommandBuffer, slot: usize) -> VulkanResult<()> {
        if self.draw_queue.is_empty() {
            return Ok(());
        }

        if self.draw_queue.len() > MAX_RENDERABLE_OBJECTS {
            self.console.log(format!(
                "[WARN]: model queue holds {} entries, drawing first {}",
                self.draw_queue.len(),
                MAX_RENDERABLE_OBJECTS
            ));
            self.draw_queue.truncate(MAX_RENDERABLE_OBJECTS);
        }

        let scene_offset = self.descriptors.scene_dynamic_offset(slot);
        let scene_bytes = bytemuck::bytes_of(&self.scene_props).to_vec();
        buffer::write_buffer(
            &self.context,
            &mut self.descriptors.scene_props_buffer,
            scene_offset as usize,
            &scene_bytes,
        )?;

        let camera_data = GpuCameraData {
            view: self.camera.view().into(),
            projection: self.camera.projection().into(),
            view_proj: self.camera.matrix().into(),
        };
        buffer::write_buffer(
            &self.context,
            &mut self.frames[slot].camera_buffer,
            0,
            bytemuck::bytes_of(&camera_data),
        )?;

        // One batched write of every queued transform, in queue order:
        // an entry's queue position is its storage-buffer slot and its
        // first-instance index.
        let transforms: Vec<GpuModelData> = self
            .draw_queue
            .entries()
            .iter()
            .map(|model| GpuModelData {
                matrix: model.transform.into(),
            })
            .collect();
        buffer::write_buffer(
            &self.context,
            &mut self.frames[slot].model_buffer,
            0,
            bytemuck::cast_slice(&transforms),
        )?;

        let bindings = FrameBindings {
            global_set: self.frames[slot].global_descriptor,
            model_set: self.frames[slot].model_descriptor,
            scene_dynamic_offset: scene_offset,
        };

        let Renderer {
            ref context,
            ref mut draw_queue,
            ref mesh_manager,
            ref material_manager,
            ..
        } = *self;

        let mut encoder = CommandEncoder::new(&context.device, cmd);
        draw_queue.record(&mut encoder, mesh_manager, material_manager, &bindings);

        Ok(())
    }

    /// Destroy and rebuild the swapchain from the window's current
    /// extent. Never called mid-recording.
    fn recreate_swapchain(&mut self, window: &Window) -> VulkanResult<()> {
        self.context.wait_idle()?;
        self.swapchain.destroy(&self.context);
        self.swapchain = Swapchain::new(&self.context, self.render_pass, window.extent())?;
        log::debug!(
            "Swapchain recreated at {}x{}",
            self.swapchain.extent.width,
            self.swapchain.extent.height
        );
        Ok(())
    }

    /// Tear down all GPU state in strict reverse dependency order.
    ///
    /// Waits for every in-flight frame, then flushes the deletion
    /// queue exactly once before the context itself goes down.
    pub fn cleanup(&mut self) {
        if !self.initialised {
            return;
        }
        self.initialised = false;

        for frame in &self.frames {
            let wait = unsafe {
                self.context.device.wait_for_fences(
                    &[frame.render_fence],
                    true,
                    FRAME_TIMEOUT_NS,
                )
            };
            if let Err(err) = wait {
                log::error!("Fence wait during shutdown failed: {:?}", err);
            }
        }

        for frame in &mut self.frames {
            frame.destroy_buffers(&self.context);
        }
        self.descriptors.destroy(&self.context);
        self.swapchain.destroy(&self.context);

        let Renderer {
            ref context,
            ref mut deletion_queue,
            ..
        } = *self;
        deletion_queue.flush_with(|record| deletion_queue::destroy_resource(context, record));

        self.context.destroy();
    }
}

/// Single-subpass render pass: one color attachment presented to the
/// surface and one depth attachment.
fn create_render_pass(context: &VulkanContext) -> VulkanResult<vk::RenderPass> {
    let surface_formats = unsafe {
        context
            .surface_loader
            .get_physical_device_surface_formats(context.physical_device, context.surface)
            .map_err(VulkanError::Api)?
    };
    let color_format = crate::render::swapchain::choose_surface_format(&surface_formats).format;

    let attachments = [
        vk::AttachmentDescription::builder()
            .format(color_format)
            .samples(vk::SampleCountFlags::TYPE_1)
            .load_op(vk::AttachmentLoadOp::CLEAR)
            .store_op(vk::AttachmentStoreOp::STORE)
            .stencil_load_op(vk::AttachmentLoadOp::DONT_CARE)
            .stencil_store_op(vk::AttachmentStoreOp::DONT_CARE)
            .initial_layout(vk::ImageLayout::UNDEFINED)
            .final_layout(vk::ImageLayout::PRESENT_SRC_KHR)
            .build(),
        vk::AttachmentDescription::builder()
            .format(vk::Format::D32_SFLOAT)
            .samples(vk::SampleCountFlags::TYPE_1)
            .load_op(vk::AttachmentLoadOp::CLEAR)
            .store_op(vk::AttachmentStoreOp::STORE)
            .stencil_load_op(vk::AttachmentLoadOp::CLEAR)
            .stencil_store_op(vk::AttachmentStoreOp::DONT_CARE)
            .initial_layout(vk::ImageLayout::UNDEFINED)
            .final_layout(vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL)
            .build(),
    ];

    let color_refs = [vk::AttachmentReference {
        attachment: 0,
        layout: vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
    }];
    let depth_ref = vk::AttachmentReference {
        attachment: 1,
        layout: vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL,
    };

    let subpasses = [vk::SubpassDescription::builder()
        .pipeline_bind_point(vk::PipelineBindPoint::GRAPHICS)
        .color_attachments(&color_refs)
        .depth_stencil_attachment(&depth_ref)
        .build()];

    let dependencies = [
        vk::SubpassDependency::builder()
            .src_subpass(vk::SUBPASS_EXTERNAL)
            .dst_subpass(0)
            .src_stage_mask(vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT)
            .src_access_mask(vk::AccessFlags::empty())
            .dst_stage_mask(vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT)
            .dst_access_mask(vk::AccessFlags::COLOR_ATTACHMENT_WRITE)
            .build(),
        vk::SubpassDependency::builder()
            .src_subpass(vk::SUBPASS_EXTERNAL)
            .dst_subpass(0)
            .src_stage_mask(
                vk::PipelineStageFlags::EARLY_FRAGMENT_TESTS
                    | vk::PipelineStageFlags::LATE_FRAGMENT_TESTS,
            )
            .src_access_mask(vk::AccessFlags::empty())
            .dst_stage_mask(
                vk::PipelineStageFlags::EARLY_FRAGMENT_TESTS
                    | vk::PipelineStageFlags::LATE_FRAGMENT_TESTS,
            )
            .dst_access_mask(vk::AccessFlags::DEPTH_STENCIL_ATTACHMENT_WRITE)
            .build(),
    ];

    let render_pass_info = vk::RenderPassCreateInfo::builder()
        .attachments(&attachments)
        .subpasses(&subpasses)
        .dependencies(&dependencies);

    unsafe {
        context
            .device
            .create_render_pass(&render_pass_info, None)
            .map_err(VulkanError::Api)
    }
}

/// Build the default mesh pipeline and register it as the "default"
/// material.
fn create_default_pipeline(
    context: &VulkanContext,
    descriptors: &Descriptors,
    render_pass: vk::RenderPass,
    config: &EngineConfig,
    console: &mut Console,
    deletion_queue: &mut DeletionQueue<DeferredResource>,
    material_manager: &mut MaterialManager,
) -> VulkanResult<()> {
    let device = &context.device;

    let set_layouts = [
        descriptors.global_set_layout,
        descriptors.model_set_layout,
        descriptors.single_texture_set_layout,
    ];
    let layout_info = vk::PipelineLayoutCreateInfo::builder().set_layouts(&set_layouts);
    let pipeline_layout = unsafe {
        device
            .create_pipeline_layout(&layout_info, None)
            .map_err(VulkanError::Api)?
    };
    deletion_queue.push(DeferredResource::PipelineLayout(pipeline_layout));

    let vert_module =
        pipeline::load_shader_module(device, &config.shaders.vertex_shader_path, console)
            .unwrap_or(vk::ShaderModule::null());
    if vert_module != vk::ShaderModule::null() {
        console.log("Mesh vertex shader successfully loaded");
    }

    let frag_module =
        pipeline::load_shader_module(device, &config.shaders.fragment_shader_path, console)
            .unwrap_or(vk::ShaderModule::null());
    if frag_module != vk::ShaderModule::null() {
        console.log("Mesh fragment shader successfully loaded");
    }

    let pipeline_result = PipelineBuilder::new()
        .with_shader(vk::ShaderStageFlags::VERTEX, vert_module)
        .with_shader(vk::ShaderStageFlags::FRAGMENT, frag_module)
        .with_layout(pipeline_layout)
        .build(device, render_pass);

    // Shader modules are baked into the pipeline; drop them either way.
    unsafe {
        if vert_module != vk::ShaderModule::null() {
            device.destroy_shader_module(vert_module, None);
        }
        if frag_module != vk::ShaderModule::null() {
            device.destroy_shader_module(frag_module, None);
        }
    }

    let pipeline = pipeline_result?;
    deletion_queue.push(DeferredResource::Pipeline(pipeline));

    material_manager.load(CreateMaterialInfo {
        name: DEFAULT_MATERIAL.to_string(),
        pipeline,
        pipeline_layout,
        texture_set: None,
    });

    Ok(())
}

/// Allocate and write a single-texture descriptor set for a material
/// variant.
fn create_texture_set(
    context: &VulkanContext,
    descriptors: &Descriptors,
    deletion_queue: &mut DeletionQueue<DeferredResource>,
    image_view: vk::ImageView,
) -> VulkanResult<vk::DescriptorSet> {
    let device = &context.device;

    let sampler_info = vk::SamplerCreateInfo::builder()
        .mag_filter(vk::Filter::NEAREST)
        .min_filter(vk::Filter::NEAREST)
        .address_mode_u(vk::SamplerAddressMode::REPEAT)
        .address_mode_v(vk::SamplerAddressMode::REPEAT)
        .address_mode_w(vk::SamplerAddressMode::REPEAT);
    let sampler = unsafe {
        device
            .create_sampler(&sampler_info, None)
            .map_err(VulkanError::Api)?
    };
    deletion_queue.push(DeferredResource::Sampler(sampler));

    let set_layouts = [descriptors.single_texture_set_layout];
    let alloc_info = vk::DescriptorSetAllocateInfo::builder()
        .descriptor_pool(descriptors.pool)
        .set_layouts(&set_layouts);
    let texture_set = unsafe {
        device
            .allocate_descriptor_sets(&alloc_info)
            .map_err(VulkanError::Api)?[0]
    };

    let image_info = [vk::DescriptorImageInfo::builder()
        .sampler(sampler)
        .image_view(image_view)
        .image_layout(vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL)
        .build()];
    let write = vk::WriteDescriptorSet::builder()
        .dst_set(texture_set)
        .dst_binding(0)
        .descriptor_type(vk::DescriptorType::COMBINED_IMAGE_SAMPLER)
        .image_info(&image_info)
        .build();

    unsafe {
        device.update_descriptor_sets(&[write], &[]);
    }

    Ok(texture_set)
}
