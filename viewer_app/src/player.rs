//! First-person player entity driving the camera.

use nalgebra::Vector3;
use render_engine::render::Renderer;
use render_engine::scene::move_in_direction;
use render_engine::{ButtonState, Camera, Entity, InputHandler};

const MOUSE_SENSITIVITY: f32 = 0.05;

/// WASD + space/shift movement with mouse look.
pub struct Player {
    position: Vector3<f32>,
    rotation: Vector3<f32>,
    speed: f32,
}

impl Player {
    /// Create a player at the origin.
    pub fn new() -> Self {
        Self {
            position: Vector3::zeros(),
            rotation: Vector3::zeros(),
            speed: 2.0,
        }
    }

    fn walk(&mut self, direction: Vector3<f32>) {
        let yaw_only = Vector3::new(0.0, self.rotation.y, 0.0);
        self.position += move_in_direction(direction, yaw_only);
    }
}

impl Entity for Player {
    fn update(&mut self, dt: f32, input: &InputHandler, camera: &mut Camera) {
        let step = self.speed * dt;

        if input.key_state(glfw::Key::W) == ButtonState::Held {
            self.walk(Vector3::new(0.0, 0.0, step));
        }
        if input.key_state(glfw::Key::S) == ButtonState::Held {
            self.walk(Vector3::new(0.0, 0.0, -step));
        }
        if input.key_state(glfw::Key::A) == ButtonState::Held {
            self.walk(Vector3::new(step, 0.0, 0.0));
        }
        if input.key_state(glfw::Key::D) == ButtonState::Held {
            self.walk(Vector3::new(-step, 0.0, 0.0));
        }
        if input.key_state(glfw::Key::Space) == ButtonState::Held {
            self.position.y -= step;
        }
        if input.key_state(glfw::Key::LeftShift) == ButtonState::Held {
            self.position.y += step;
        }

        let mouse = input.mouse_delta();
        self.rotation.x = (self.rotation.x - mouse.y * MOUSE_SENSITIVITY).clamp(-90.0, 90.0);
        self.rotation.y += mouse.x * MOUSE_SENSITIVITY;
        if self.rotation.y > 180.0 {
            self.rotation.y -= 360.0;
        } else if self.rotation.y < -180.0 {
            self.rotation.y += 360.0;
        }

        camera.position = self.position;
        camera.rotation = self.rotation;
    }

    fn draw(&mut self, _renderer: &mut Renderer) {}
}
