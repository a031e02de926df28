//! Engine shell: window, input, renderer, and the main loop
//!
//! One top-level owner constructed at startup and threaded through the
//! components it drives; the engine outlives everything it passes
//! itself to. The loop is single-threaded: poll input, update the
//! active scene, draw, repeat. GPU errors surfacing from the renderer
//! are fatal and abort the process after logging.

use crate::config::EngineConfig;
use crate::input::{ButtonState, InputHandler};
use crate::render::{Renderer, VulkanResult};
use crate::scene::Scene;
use crate::window::Window;
use std::time::Instant;

/// How often (in frames) the running stats are reported.
const STATS_INTERVAL: u32 = 240;

/// Top-level application driver.
pub struct Engine {
    window: Window,
    input: InputHandler,
    renderer: Renderer,
    scenes: Vec<Box<dyn Scene>>,
    active_scene: usize,
    last_frame: Instant,
    frame_time: f32,
    fps: u16,
    relative_mode: bool,
    show_debug: bool,
}

impl Engine {
    /// Build the window and renderer, then initialise every scene.
    pub fn new(config: EngineConfig, scenes: Vec<Box<dyn Scene>>) -> VulkanResult<Self> {
        let mut window = Window::new(&config.window).map_err(|e| {
            crate::render::VulkanError::InitializationFailed(format!("window: {}", e))
        })?;

        let mut renderer = Renderer::new(&mut window, &config)?;
        renderer.camera.aspect = window.aspect_ratio();

        let relative_mode = true;
        window.set_cursor_captured(relative_mode);

        let mut scenes = scenes;
        for scene in &mut scenes {
            scene.init(&mut renderer);
        }

        Ok(Self {
            window,
            input: InputHandler::new(),
            renderer,
            scenes,
            active_scene: 0,
            last_frame: Instant::now(),
            frame_time: 0.0,
            fps: 0,
            relative_mode,
            show_debug: cfg!(debug_assertions),
        })
    }

    /// The renderer, for applications that poke at it between frames.
    pub fn renderer(&mut self) -> &mut Renderer {
        &mut self.renderer
    }

    /// Run the main loop until the window is closed.
    pub fn run(&mut self) {
        self.last_frame = Instant::now();

        while !self.window.should_close() {
            self.window.poll_events();
            if self.window.take_resized() {
                self.renderer.camera.aspect = self.window.aspect_ratio();
                self.renderer.request_resize();
            }

            self.input.update(&self.window);

            let now = Instant::now();
            let delta_time = now.duration_since(self.last_frame).as_secs_f32();
            self.last_frame = now;
            self.frame_time = delta_time;
            if delta_time > 0.0 {
                self.fps = (1.0 / delta_time) as u16;
            }

            self.update(delta_time);

            if !self.window.is_minimized() {
                self.draw();
            }
        }
    }

    fn update(&mut self, delta_time: f32) {
        // Escape or grave toggles between camera control and a free
        // cursor; the stale mouse delta is dropped with it.
        if self.input.key_state(glfw::Key::Escape) == ButtonState::Pressed
            || self.input.key_state(glfw::Key::GraveAccent) == ButtonState::Pressed
        {
            self.relative_mode = !self.relative_mode;
            self.window.set_cursor_captured(self.relative_mode);
            self.input.clear_mouse_delta();

            if !cfg!(debug_assertions) {
                self.show_debug = !self.relative_mode;
            }
            return;
        }

        self.scenes[self.active_scene].update(delta_time, &self.input, &mut self.renderer);
    }

    fn draw(&mut self) {
        self.scenes[self.active_scene].draw(&mut self.renderer);

        if self.show_debug && self.renderer.frame_number() % STATS_INTERVAL == 0 {
            log::debug!("FPS: {} frame time: {:.4}ms", self.fps, self.frame_time * 1000.0);
            for line in self.renderer.debug_lines() {
                log::debug!("{}", line);
            }
            for line in self.scenes[self.active_scene].debug_lines() {
                log::debug!("{}", line);
            }
        }

        if let Err(err) = self.renderer.draw(&self.window) {
            // Device state is unspecified after a failed core GPU
            // call; there is no recovery path.
            log::error!("Fatal rendering error: {}", err);
            self.renderer.console_mut().log(format!("Fatal rendering error: {}", err));
            std::process::abort();
        }
    }

    /// Tear down scenes, then the renderer, in reverse of construction.
    pub fn cleanup(&mut self) {
        for scene in &mut self.scenes {
            scene.teardown();
        }
        self.renderer.cleanup();
    }
}
