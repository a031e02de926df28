//! Reverse-order GPU resource teardown registry
//!
//! Setup code pushes an ownership record for every long-lived GPU
//! resource, in dependency order: a record is pushed only after the
//! records of everything it depends on. The queue is flushed exactly
//! once at shutdown, destroying records strictly last-in-first-out, so
//! no dependency dies before its dependents.
//!
//! Records are tagged handles rather than closures; a fixed dispatch
//! over `(device, allocator)` does the destruction.

use crate::render::context::VulkanContext;
use ash::vk;

/// Ordered teardown registry, generic over the record type so the
/// ordering contract is testable without a device.
pub struct DeletionQueue<T> {
    records: Vec<T>,
}

impl<T> Default for DeletionQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> DeletionQueue<T> {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self { records: Vec::new() }
    }

    /// Register a teardown record.
    ///
    /// Invariant: push a record only after the records of all resources
    /// it depends on.
    pub fn push(&mut self, record: T) {
        self.records.push(record);
    }

    /// Drain the queue, applying `destroy` to each record in strict
    /// reverse push order. The queue is empty afterwards.
    pub fn flush_with(&mut self, mut destroy: impl FnMut(T)) {
        for record in self.records.drain(..).rev() {
            destroy(record);
        }
    }

    /// Number of registered records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the queue holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// An owned GPU resource awaiting teardown.
pub enum DeferredResource {
    /// Buffer plus its allocator memory token
    Buffer {
        /// Buffer handle
        buffer: vk::Buffer,
        /// Allocator memory token
        allocation: vk_mem::Allocation,
    },
    /// Image plus its allocator memory token
    Image {
        /// Image handle
        image: vk::Image,
        /// Allocator memory token
        allocation: vk_mem::Allocation,
    },
    /// Image view
    ImageView(vk::ImageView),
    /// Texture sampler
    Sampler(vk::Sampler),
    /// Fence
    Fence(vk::Fence),
    /// Semaphore
    Semaphore(vk::Semaphore),
    /// Command pool (frees its command buffers)
    CommandPool(vk::CommandPool),
    /// Descriptor pool (frees its descriptor sets)
    DescriptorPool(vk::DescriptorPool),
    /// Descriptor set layout
    DescriptorSetLayout(vk::DescriptorSetLayout),
    /// Pipeline layout
    PipelineLayout(vk::PipelineLayout),
    /// Graphics pipeline
    Pipeline(vk::Pipeline),
    /// Render pass
    RenderPass(vk::RenderPass),
}

/// Destroy one record through the context's device and allocator.
pub fn destroy_resource(context: &VulkanContext, record: DeferredResource) {
    use vk_mem::Alloc;

    let device = &context.device;
    unsafe {
        match record {
            DeferredResource::Buffer {
                buffer,
                mut allocation,
            } => context.allocator().destroy_buffer(buffer, &mut allocation),
            DeferredResource::Image {
                image,
                mut allocation,
            } => context.allocator().destroy_image(image, &mut allocation),
            DeferredResource::ImageView(view) => device.destroy_image_view(view, None),
            DeferredResource::Sampler(sampler) => device.destroy_sampler(sampler, None),
            DeferredResource::Fence(fence) => device.destroy_fence(fence, None),
            DeferredResource::Semaphore(semaphore) => device.destroy_semaphore(semaphore, None),
            DeferredResource::CommandPool(pool) => device.destroy_command_pool(pool, None),
            DeferredResource::DescriptorPool(pool) => device.destroy_descriptor_pool(pool, None),
            DeferredResource::DescriptorSetLayout(layout) => {
                device.destroy_descriptor_set_layout(layout, None)
            }
            DeferredResource::PipelineLayout(layout) => {
                device.destroy_pipeline_layout(layout, None)
            }
            DeferredResource::Pipeline(pipeline) => device.destroy_pipeline(pipeline, None),
            DeferredResource::RenderPass(render_pass) => {
                device.destroy_render_pass(render_pass, None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flush_is_reverse_of_push_order() {
        let mut queue = DeletionQueue::new();
        queue.push("A");
        queue.push("B");
        queue.push("C");

        let mut order = Vec::new();
        queue.flush_with(|record| order.push(record));

        assert_eq!(order, vec!["C", "B", "A"]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_flush_empties_the_queue() {
        let mut queue = DeletionQueue::new();
        queue.push(1);
        queue.push(2);
        assert_eq!(queue.len(), 2);

        queue.flush_with(|_| {});
        assert_eq!(queue.len(), 0);

        // A second flush has nothing left to destroy
        let mut second = Vec::new();
        queue.flush_with(|record| second.push(record));
        assert!(second.is_empty());
    }
}
