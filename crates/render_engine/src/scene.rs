//! Scene and entity capability interfaces
//!
//! Scenes and entities are the gameplay-facing seam of the engine: the
//! engine only needs `update`/`draw`/`teardown`, and the renderer only
//! needs the narrower drawable capability captured by [`Model`]
//! (mesh handle + material handle + transform). Entity polymorphism and
//! renderable submission stay decoupled.

use crate::camera::Camera;
use crate::input::InputHandler;
use crate::render::{MaterialHandle, MeshHandle, Renderer};
use nalgebra::{Matrix4, Rotation3, Vector3};

/// A drawable instance: references into the mesh/material caches plus a
/// world transform.
///
/// Holds copyable handles rather than references, so cache growth never
/// invalidates a model. Submitted to the renderer's draw queue each
/// frame; the queue is drained on every draw.
#[derive(Debug, Clone, Copy)]
pub struct Model {
    /// Handle into the mesh cache
    pub mesh: MeshHandle,
    /// Handle into the material cache
    pub material: MaterialHandle,
    /// World transform applied in the vertex stage
    pub transform: Matrix4<f32>,
}

impl Model {
    /// Create a model with an identity transform.
    pub fn new(mesh: MeshHandle, material: MaterialHandle) -> Self {
        Self {
            mesh,
            material,
            transform: Matrix4::identity(),
        }
    }
}

/// A top-level scene driven by the engine's main loop.
pub trait Scene {
    /// Called once after the renderer is ready; load assets here.
    fn init(&mut self, renderer: &mut Renderer);

    /// Advance the simulation by `dt` seconds.
    fn update(&mut self, dt: f32, input: &InputHandler, renderer: &mut Renderer);

    /// Submit this frame's drawables to the renderer's model queue.
    fn draw(&mut self, renderer: &mut Renderer);

    /// Lines for the debug overlay.
    fn debug_lines(&self) -> Vec<String> {
        Vec::new()
    }

    /// Called once at shutdown, before the renderer is torn down.
    fn teardown(&mut self) {}
}

/// A positionable object living inside a scene.
pub trait Entity {
    /// Advance this entity by `dt` seconds.
    fn update(&mut self, dt: f32, input: &InputHandler, camera: &mut Camera);

    /// Submit this entity's drawables to the renderer's model queue.
    fn draw(&mut self, renderer: &mut Renderer);

    /// Called once at shutdown.
    fn teardown(&mut self) {}
}

/// Rotate `vector` by the negated `rotation` (degrees, XYZ order) and
/// return the result, for movement relative to a facing direction.
pub fn move_in_direction(vector: Vector3<f32>, rotation: Vector3<f32>) -> Vector3<f32> {
    let rotated = Rotation3::from_axis_angle(&Vector3::x_axis(), (-rotation.x).to_radians()) * vector;
    let rotated = Rotation3::from_axis_angle(&Vector3::y_axis(), (-rotation.y).to_radians()) * rotated;
    Rotation3::from_axis_angle(&Vector3::z_axis(), (-rotation.z).to_radians()) * rotated
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_move_in_direction_identity() {
        let moved = move_in_direction(Vector3::new(0.0, 0.0, 1.0), Vector3::zeros());
        assert_relative_eq!(moved.z, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_move_in_direction_yaw_quarter_turn() {
        // Facing 90 degrees of yaw, "forward" swings onto the x axis.
        let moved = move_in_direction(Vector3::new(0.0, 0.0, 1.0), Vector3::new(0.0, 90.0, 0.0));
        assert_relative_eq!(moved.x.abs(), 1.0, epsilon = 1e-5);
        assert_relative_eq!(moved.z, 0.0, epsilon = 1e-5);
    }
}
