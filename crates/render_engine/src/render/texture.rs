//! Textures and the texture cache
//!
//! A texture is a device-local sampled image plus its view, keyed by
//! source path. Decoding happens before any GPU work, so a bad path
//! costs one log line and nothing else.

use crate::assets::image_loader::{self, ImageData};
use crate::console::Console;
use crate::render::context::VulkanResult;
use ash::vk;
use std::collections::HashMap;

/// A sampled GPU image and its view.
///
/// Image memory and view are owned by the deletion queue; this struct
/// keeps only the bindable handles.
#[derive(Debug, Clone, Copy)]
pub struct Texture {
    /// Device-local image handle
    pub image: vk::Image,
    /// Image view handle, created and destroyed alongside the image
    pub image_view: vk::ImageView,
}

/// Lightweight index into the texture cache.
///
/// Minted only by [`TextureManager`]; valid for the process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub(crate) u32);

/// Path-keyed texture cache with lookup-or-create semantics.
#[derive(Default)]
pub struct TextureManager {
    textures: Vec<Texture>,
    by_path: HashMap<String, TextureHandle>,
}

impl TextureManager {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached texture for `path`, decoding and uploading it
    /// on the first call.
    ///
    /// The image is decoded before `upload` runs; a decode failure is
    /// logged once and yields `Ok(None)` with no GPU work performed.
    /// An `Err` means the GPU upload failed, which the caller treats as
    /// fatal.
    pub fn load(
        &mut self,
        console: &mut Console,
        path: &str,
        upload: impl FnOnce(&ImageData) -> VulkanResult<Texture>,
    ) -> VulkanResult<Option<TextureHandle>> {
        if let Some(&handle) = self.by_path.get(path) {
            return Ok(Some(handle));
        }

        let image_data = match image_loader::load_image(path) {
            Ok(data) => data,
            Err(err) => {
                console.log(format!("Failed to load texture file {}: {}", path, err));
                return Ok(None);
            }
        };

        let texture = upload(&image_data)?;
        console.log(format!("Texture {} loaded successfully", path));

        let handle = TextureHandle(self.textures.len() as u32);
        self.textures.push(texture);
        self.by_path.insert(path.to_string(), handle);
        Ok(Some(handle))
    }

    /// Look up a texture by handle.
    pub fn get(&self, handle: TextureHandle) -> &Texture {
        &self.textures[handle.0 as usize]
    }

    /// Number of cached textures.
    pub fn len(&self) -> usize {
        self.textures.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_path_logs_once_and_skips_upload() {
        let mut manager = TextureManager::new();
        let mut console = Console::new();
        let mut uploads = 0;

        let result = manager
            .load(&mut console, "does/not/exist.png", |_| {
                uploads += 1;
                Ok(Texture {
                    image: vk::Image::null(),
                    image_view: vk::ImageView::null(),
                })
            })
            .unwrap();

        assert!(result.is_none());
        assert_eq!(uploads, 0);
        assert_eq!(console.lines().len(), 1);
        assert!(console.lines()[0].contains("Failed to load texture file"));
        assert!(manager.is_empty());
    }
}
