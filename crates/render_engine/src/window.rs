//! GLFW window wrapper for Vulkan rendering
//!
//! Owns the GLFW context and window, creates the Vulkan surface, and
//! tracks the resize notification flag the renderer polls to trigger
//! swapchain recreation.

use crate::config::WindowConfig;
use ash::vk;
use thiserror::Error;

/// Window management errors
#[derive(Error, Debug)]
pub enum WindowError {
    /// GLFW library initialization failed
    #[error("GLFW initialization failed")]
    InitializationFailed,

    /// Window creation failed
    #[error("Window creation failed")]
    CreationFailed,

    /// Any other GLFW error
    #[error("GLFW error: {0}")]
    Glfw(String),
}

/// Result type for window operations
pub type WindowResult<T> = Result<T, WindowError>;

/// GLFW window wrapper with Vulkan surface support.
pub struct Window {
    glfw: glfw::Glfw,
    window: glfw::PWindow,
    events: glfw::GlfwReceiver<(f64, glfw::WindowEvent)>,
    resized: bool,
    cursor_captured: bool,
}

impl Window {
    /// Create a window configured for Vulkan (no client API).
    pub fn new(config: &WindowConfig) -> WindowResult<Self> {
        let mut glfw = glfw::init(glfw::fail_on_errors)
            .map_err(|_| WindowError::InitializationFailed)?;

        glfw.window_hint(glfw::WindowHint::ClientApi(glfw::ClientApiHint::NoApi));
        glfw.window_hint(glfw::WindowHint::Resizable(true));

        let (mut window, events) = glfw
            .create_window(
                config.width,
                config.height,
                &config.title,
                glfw::WindowMode::Windowed,
            )
            .ok_or(WindowError::CreationFailed)?;

        window.set_framebuffer_size_polling(true);
        window.set_close_polling(true);

        Ok(Self {
            glfw,
            window,
            events,
            resized: false,
            cursor_captured: false,
        })
    }

    /// Pump the event queue and fold events into window state.
    ///
    /// Sets the resize flag when the framebuffer size changed; the flag
    /// stays up until [`Window::take_resized`] is called.
    pub fn poll_events(&mut self) {
        self.glfw.poll_events();
        for (_, event) in glfw::flush_messages(&self.events) {
            if let glfw::WindowEvent::FramebufferSize(_, _) = event {
                self.resized = true;
            }
        }
    }

    /// Read and clear the resize notification flag.
    pub fn take_resized(&mut self) -> bool {
        std::mem::take(&mut self.resized)
    }

    /// Whether the user requested the window to close.
    pub fn should_close(&self) -> bool {
        self.window.should_close()
    }

    /// Request the window to close.
    pub fn set_should_close(&mut self, should_close: bool) {
        self.window.set_should_close(should_close);
    }

    /// Whether the window is currently minimized.
    pub fn is_minimized(&self) -> bool {
        self.window.is_iconified()
    }

    /// The window's *current* framebuffer extent in pixels.
    pub fn extent(&self) -> vk::Extent2D {
        let (width, height) = self.window.get_framebuffer_size();
        vk::Extent2D {
            width: width as u32,
            height: height as u32,
        }
    }

    /// Aspect ratio of the current framebuffer extent.
    pub fn aspect_ratio(&self) -> f32 {
        let extent = self.extent();
        extent.width as f32 / extent.height.max(1) as f32
    }

    /// Capture or release the cursor (relative mouse mode).
    pub fn set_cursor_captured(&mut self, captured: bool) {
        self.window.set_cursor_mode(if captured {
            glfw::CursorMode::Disabled
        } else {
            glfw::CursorMode::Normal
        });
        self.cursor_captured = captured;
    }

    /// Whether the cursor is currently captured.
    pub fn cursor_captured(&self) -> bool {
        self.cursor_captured
    }

    /// Current cursor position in screen coordinates.
    pub fn cursor_position(&self) -> (f64, f64) {
        self.window.get_cursor_pos()
    }

    /// Whether `key` is currently down.
    pub fn is_key_down(&self, key: glfw::Key) -> bool {
        self.window.get_key(key) != glfw::Action::Release
    }

    /// Instance extensions the surface requires.
    pub fn required_instance_extensions(&self) -> WindowResult<Vec<String>> {
        self.glfw
            .get_required_instance_extensions()
            .ok_or_else(|| WindowError::Glfw("no Vulkan instance extensions reported".to_string()))
    }

    /// Create the Vulkan surface for this window.
    pub fn create_surface(&mut self, instance: vk::Instance) -> WindowResult<vk::SurfaceKHR> {
        let mut surface = vk::SurfaceKHR::null();
        let result = self
            .window
            .create_window_surface(instance, std::ptr::null(), &mut surface);

        if result == vk::Result::SUCCESS {
            Ok(surface)
        } else {
            Err(WindowError::Glfw(format!(
                "surface creation failed: {:?}",
                result
            )))
        }
    }
}
