//! Graphics pipeline construction and shader module loading
//!
//! One builder gathers the fixed-function state for the engine's
//! single-subpass pipelines. Viewport and scissor are dynamic, so a
//! window resize never forces a pipeline rebuild.

use crate::console::Console;
use crate::render::context::{VulkanError, VulkanResult};
use crate::render::mesh::Vertex;
use ash::vk;
use std::ffi::CString;
use std::io::Cursor;
use std::path::Path;

/// Read a precompiled SPIR-V module from disk.
///
/// Open/read failures and malformed blobs (size not a multiple of 4)
/// are logged and yield `None`; the caller proceeds with a null handle
/// and pipeline construction fails later.
pub fn load_shader_module(
    device: &ash::Device,
    path: &str,
    console: &mut Console,
) -> Option<vk::ShaderModule> {
    let bytes = match std::fs::read(Path::new(path)) {
        Ok(bytes) => bytes,
        Err(err) => {
            console.log(format!("Failed to read shader file {}: {}", path, err));
            return None;
        }
    };

    if bytes.len() % 4 != 0 {
        console.log(format!(
            "Shader file {} is not a valid SPIR-V blob ({} bytes)",
            path,
            bytes.len()
        ));
        return None;
    }

    let code = match ash::util::read_spv(&mut Cursor::new(&bytes)) {
        Ok(code) => code,
        Err(err) => {
            console.log(format!("Failed to decode shader {}: {}", path, err));
            return None;
        }
    };

    let create_info = vk::ShaderModuleCreateInfo::builder().code(&code);
    match unsafe { device.create_shader_module(&create_info, None) } {
        Ok(module) => Some(module),
        Err(err) => {
            console.log(format!("Failed to create shader module {}: {:?}", path, err));
            None
        }
    }
}

/// Accumulates pipeline state and builds a graphics pipeline.
pub struct PipelineBuilder {
    /// Shader stages (vertex + fragment)
    pub shader_stages: Vec<(vk::ShaderStageFlags, vk::ShaderModule)>,
    /// Primitive topology
    pub topology: vk::PrimitiveTopology,
    /// Polygon rasterization mode
    pub polygon_mode: vk::PolygonMode,
    /// Depth test enable
    pub depth_test: bool,
    /// Depth write enable
    pub depth_write: bool,
    /// Depth comparison operator
    pub depth_compare: vk::CompareOp,
    /// Pipeline layout the pipeline binds against
    pub pipeline_layout: vk::PipelineLayout,
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineBuilder {
    /// Builder preconfigured for the engine's default mesh pipeline.
    pub fn new() -> Self {
        Self {
            shader_stages: Vec::new(),
            topology: vk::PrimitiveTopology::TRIANGLE_LIST,
            polygon_mode: vk::PolygonMode::FILL,
            depth_test: true,
            depth_write: true,
            depth_compare: vk::CompareOp::LESS_OR_EQUAL,
            pipeline_layout: vk::PipelineLayout::null(),
        }
    }

    /// Add a shader stage.
    pub fn with_shader(mut self, stage: vk::ShaderStageFlags, module: vk::ShaderModule) -> Self {
        self.shader_stages.push((stage, module));
        self
    }

    /// Set the pipeline layout.
    pub fn with_layout(mut self, layout: vk::PipelineLayout) -> Self {
        self.pipeline_layout = layout;
        self
    }

    /// Build the graphics pipeline against `render_pass`.
    pub fn build(
        self,
        device: &ash::Device,
        render_pass: vk::RenderPass,
    ) -> VulkanResult<vk::Pipeline> {
        let entry_point = CString::new("main").unwrap();
        let stages: Vec<vk::PipelineShaderStageCreateInfo> = self
            .shader_stages
            .iter()
            .map(|&(stage, module)| {
                vk::PipelineShaderStageCreateInfo::builder()
                    .stage(stage)
                    .module(module)
                    .name(&entry_point)
                    .build()
            })
            .collect();

        let binding_descriptions = Vertex::binding_descriptions();
        let attribute_descriptions = Vertex::attribute_descriptions();
        let vertex_input = vk::PipelineVertexInputStateCreateInfo::builder()
            .vertex_binding_descriptions(&binding_descriptions)
            .vertex_attribute_descriptions(&attribute_descriptions);

        let input_assembly = vk::PipelineInputAssemblyStateCreateInfo::builder()
            .topology(self.topology)
            .primitive_restart_enable(false);

        // Viewport and scissor are set at record time from the window's
        // current extent.
        let viewport_state = vk::PipelineViewportStateCreateInfo::builder()
            .viewport_count(1)
            .scissor_count(1);
        let dynamic_states = [vk::DynamicState::VIEWPORT, vk::DynamicState::SCISSOR];
        let dynamic_state =
            vk::PipelineDynamicStateCreateInfo::builder().dynamic_states(&dynamic_states);

        let rasterizer = vk::PipelineRasterizationStateCreateInfo::builder()
            .depth_clamp_enable(false)
            .rasterizer_discard_enable(false)
            .polygon_mode(self.polygon_mode)
            .line_width(1.0)
            .cull_mode(vk::CullModeFlags::NONE)
            .front_face(vk::FrontFace::CLOCKWISE);

        let multisampling = vk::PipelineMultisampleStateCreateInfo::builder()
            .sample_shading_enable(false)
            .rasterization_samples(vk::SampleCountFlags::TYPE_1);

        let color_blend_attachments = [vk::PipelineColorBlendAttachmentState::builder()
            .color_write_mask(vk::ColorComponentFlags::RGBA)
            .blend_enable(false)
            .build()];
        let color_blending = vk::PipelineColorBlendStateCreateInfo::builder()
            .logic_op_enable(false)
            .attachments(&color_blend_attachments);

        let depth_stencil = vk::PipelineDepthStencilStateCreateInfo::builder()
            .depth_test_enable(self.depth_test)
            .depth_write_enable(self.depth_write)
            .depth_compare_op(self.depth_compare)
            .depth_bounds_test_enable(false)
            .stencil_test_enable(false);

        let pipeline_info = vk::GraphicsPipelineCreateInfo::builder()
            .stages(&stages)
            .vertex_input_state(&vertex_input)
            .input_assembly_state(&input_assembly)
            .viewport_state(&viewport_state)
            .dynamic_state(&dynamic_state)
            .rasterization_state(&rasterizer)
            .multisample_state(&multisampling)
            .color_blend_state(&color_blending)
            .depth_stencil_state(&depth_stencil)
            .layout(self.pipeline_layout)
            .render_pass(render_pass)
            .subpass(0)
            .build();

        let pipelines = unsafe {
            device
                .create_graphics_pipelines(vk::PipelineCache::null(), &[pipeline_info], None)
                .map_err(|(_, err)| VulkanError::Api(err))?
        };

        Ok(pipelines[0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let builder = PipelineBuilder::new();
        assert_eq!(builder.topology, vk::PrimitiveTopology::TRIANGLE_LIST);
        assert_eq!(builder.polygon_mode, vk::PolygonMode::FILL);
        assert!(builder.depth_test && builder.depth_write);
        assert_eq!(builder.depth_compare, vk::CompareOp::LESS_OR_EQUAL);
    }
}
