//! Materials and the material cache
//!
//! A material is a pipeline, its layout, and an optional texture
//! descriptor set, keyed by name. Variants (base pipeline + texture)
//! are derived by inserting under a new key with `create`.

use ash::vk;
use std::collections::HashMap;

/// GPU state bundle a drawable renders with.
#[derive(Debug, Clone, Copy)]
pub struct Material {
    /// Graphics pipeline
    pub pipeline: vk::Pipeline,
    /// Pipeline layout used for descriptor binds
    pub pipeline_layout: vk::PipelineLayout,
    /// Texture descriptor set, if the material samples a texture
    pub texture_set: Option<vk::DescriptorSet>,
}

/// Parameters for creating or looking up a material.
#[derive(Debug, Clone)]
pub struct CreateMaterialInfo {
    /// Cache key
    pub name: String,
    /// Graphics pipeline
    pub pipeline: vk::Pipeline,
    /// Pipeline layout
    pub pipeline_layout: vk::PipelineLayout,
    /// Optional texture descriptor set
    pub texture_set: Option<vk::DescriptorSet>,
}

/// Lightweight index into the material cache.
///
/// Minted only by [`MaterialManager`]; valid for the process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialHandle(pub(crate) u32);

/// Name-keyed material cache with lookup-or-create semantics.
#[derive(Default)]
pub struct MaterialManager {
    materials: Vec<Material>,
    by_name: HashMap<String, MaterialHandle>,
}

impl MaterialManager {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the material cached under `info.name`, inserting one
    /// built from `info` if absent.
    pub fn load(&mut self, info: CreateMaterialInfo) -> MaterialHandle {
        if let Some(&handle) = self.by_name.get(&info.name) {
            return handle;
        }
        self.create(info)
    }

    /// Insert a material unconditionally, replacing any previous entry
    /// under the same name. Used to derive variants from a base
    /// material's pipeline.
    pub fn create(&mut self, info: CreateMaterialInfo) -> MaterialHandle {
        let handle = MaterialHandle(self.materials.len() as u32);
        self.materials.push(Material {
            pipeline: info.pipeline,
            pipeline_layout: info.pipeline_layout,
            texture_set: info.texture_set,
        });
        self.by_name.insert(info.name, handle);
        handle
    }

    /// Look up a material handle by name.
    pub fn find(&self, name: &str) -> Option<MaterialHandle> {
        self.by_name.get(name).copied()
    }

    /// Look up a material by handle.
    pub fn get(&self, handle: MaterialHandle) -> &Material {
        &self.materials[handle.0 as usize]
    }

    /// Number of cached materials.
    pub fn len(&self) -> usize {
        self.materials.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(name: &str) -> CreateMaterialInfo {
        CreateMaterialInfo {
            name: name.to_string(),
            pipeline: vk::Pipeline::null(),
            pipeline_layout: vk::PipelineLayout::null(),
            texture_set: None,
        }
    }

    #[test]
    fn test_load_is_idempotent() {
        let mut manager = MaterialManager::new();
        let first = manager.load(info("default"));
        let second = manager.load(info("default"));

        assert_eq!(first, second);
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn test_create_always_inserts() {
        let mut manager = MaterialManager::new();
        let base = manager.load(info("default"));
        let variant = manager.create(info("default+texture.png"));

        assert_ne!(base, variant);
        assert_eq!(manager.len(), 2);
        assert_eq!(manager.find("default+texture.png"), Some(variant));
    }

    #[test]
    fn test_find_missing_is_none() {
        let manager = MaterialManager::new();
        assert!(manager.find("nope").is_none());
    }
}
