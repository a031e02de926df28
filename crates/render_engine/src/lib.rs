//! # Render Engine
//!
//! A small real-time 3D rendering engine with a Vulkan backend.
//!
//! The engine opens a window, loads textured meshes into content-keyed
//! caches, and renders a scene every frame through a single graphics
//! pipeline with two frames in flight. The heavy lifting lives in the
//! [`render`] module: swapchain lifecycle, frame synchronization,
//! staged GPU uploads, and a draw-queue batcher that minimizes pipeline
//! and vertex-buffer rebinds.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use render_engine::{Engine, EngineConfig, Scene};
//!
//! # struct EmptyScene;
//! # impl Scene for EmptyScene {
//! #     fn init(&mut self, _renderer: &mut render_engine::render::Renderer) {}
//! #     fn update(&mut self, _dt: f32, _input: &render_engine::InputHandler,
//! #               _renderer: &mut render_engine::render::Renderer) {}
//! #     fn draw(&mut self, _renderer: &mut render_engine::render::Renderer) {}
//! # }
//! let config = EngineConfig::default();
//! let scenes: Vec<Box<dyn Scene>> = vec![Box::new(EmptyScene)];
//! let mut engine = Engine::new(config, scenes).expect("engine init");
//! engine.run();
//! engine.cleanup();
//! ```

pub mod assets;
pub mod camera;
pub mod config;
pub mod console;
pub mod engine;
pub mod input;
pub mod render;
pub mod scene;
pub mod window;

pub use camera::Camera;
pub use config::EngineConfig;
pub use console::Console;
pub use engine::Engine;
pub use input::{ButtonState, InputHandler};
pub use scene::{Entity, Model, Scene};
pub use window::Window;
