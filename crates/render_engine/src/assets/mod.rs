//! Asset loading: mesh geometry and texture pixel data
//!
//! Loaders decode host-side data only; GPU upload is the renderer's
//! business. All failures here are recoverable: callers log them and
//! skip the asset.

pub mod image_loader;
pub mod obj_loader;

pub use image_loader::{load_image, ImageData, ImageError};
pub use obj_loader::{load_obj, ObjData, ObjError};
