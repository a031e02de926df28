//! Vulkan rendering backend
//!
//! The renderer's frame lifecycle and GPU resource management:
//! device/context bootstrap, swapchain lifecycle, frame-in-flight
//! synchronization, per-frame uniform/storage layout, staged uploads,
//! the deletion queue, and the draw-queue batcher.

pub mod buffer;
pub mod context;
pub mod deletion_queue;
pub mod descriptors;
pub mod draw_queue;
pub mod frame;
pub mod material;
pub mod mesh;
pub mod pipeline;
pub mod renderer;
pub mod swapchain;
pub mod texture;
pub mod upload;

pub use buffer::{AllocatedBuffer, AllocatedImage};
pub use context::{VulkanContext, VulkanError, VulkanResult};
pub use deletion_queue::{DeferredResource, DeletionQueue};
pub use descriptors::{pad_uniform_buffer_size, Descriptors, GpuCameraData, GpuModelData, GpuSceneData};
pub use draw_queue::{DrawCommands, DrawQueue, FrameBindings};
pub use frame::{FrameData, FrameScheduler, FrameSlotState, FRAME_OVERLAP};
pub use material::{CreateMaterialInfo, Material, MaterialHandle, MaterialManager};
pub use mesh::{Mesh, MeshHandle, MeshManager, Vertex};
pub use pipeline::PipelineBuilder;
pub use renderer::{LoadModelInfo, Renderer, MAX_RENDERABLE_OBJECTS};
pub use swapchain::Swapchain;
pub use texture::{Texture, TextureHandle, TextureManager};
pub use upload::UploadContext;
