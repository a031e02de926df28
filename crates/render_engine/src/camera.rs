//! First-person camera
//!
//! Position, rotation (pitch/yaw/roll in degrees), field of view, and
//! aspect ratio are public mutable state; the scene layer drives them
//! directly. The projection matrix applies the Vulkan Y-flip.

use nalgebra::{Matrix4, Vector3};

/// Lowest permitted pitch in degrees.
pub const MIN_PITCH: f32 = -90.0;
/// Highest permitted pitch in degrees.
pub const MAX_PITCH: f32 = 90.0;

const NEAR_PLANE: f32 = 0.1;
const FAR_PLANE: f32 = 200.0;

/// First-person camera with public mutable state.
#[derive(Debug, Clone)]
pub struct Camera {
    /// World-space position
    pub position: Vector3<f32>,
    /// Rotation in degrees: x = pitch, y = yaw, z = roll
    pub rotation: Vector3<f32>,
    /// Vertical field of view in degrees
    pub fov: f32,
    /// Viewport aspect ratio (width / height)
    pub aspect: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vector3::zeros(),
            rotation: Vector3::zeros(),
            fov: 70.0,
            aspect: 1920.0 / 1080.0,
        }
    }
}

impl Camera {
    /// Create a camera with the given field of view in degrees.
    pub fn new(fov: f32) -> Self {
        Self {
            fov,
            ..Self::default()
        }
    }

    /// Move the camera by the given world-space offset.
    pub fn translate(&mut self, amount: Vector3<f32>) {
        self.position += amount;
    }

    /// Pitch the camera by `angle` degrees, clamped to [-90, 90].
    pub fn pitch(&mut self, angle: f32) {
        self.rotation.x = (self.rotation.x - angle).clamp(MIN_PITCH, MAX_PITCH);
    }

    /// Yaw the camera by `angle` degrees.
    pub fn yaw(&mut self, angle: f32) {
        self.rotation.y += angle;
    }

    /// Perspective projection matrix with the Vulkan Y-flip applied.
    pub fn projection(&self) -> Matrix4<f32> {
        let mut projection =
            Matrix4::new_perspective(self.aspect, self.fov.to_radians(), NEAR_PLANE, FAR_PLANE);
        projection[(1, 1)] *= -1.0;
        projection
    }

    /// View matrix: rotation applied after translation.
    pub fn view(&self) -> Matrix4<f32> {
        let translation = Matrix4::new_translation(&self.position);

        let rotation = Matrix4::from_axis_angle(&Vector3::x_axis(), self.rotation.x.to_radians())
            * Matrix4::from_axis_angle(&Vector3::y_axis(), self.rotation.y.to_radians())
            * Matrix4::from_axis_angle(&Vector3::z_axis(), self.rotation.z.to_radians());

        rotation * translation
    }

    /// Combined projection * view matrix.
    pub fn matrix(&self) -> Matrix4<f32> {
        self.projection() * self.view()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_projection_flips_y() {
        let camera = Camera::default();
        let projection = camera.projection();
        // The Vulkan clip space has Y pointing down; the GL-style
        // perspective matrix must be flipped.
        assert!(projection[(1, 1)] < 0.0);
    }

    #[test]
    fn test_view_translates_by_position() {
        let mut camera = Camera::default();
        camera.position = Vector3::new(1.0, 2.0, 3.0);

        let view = camera.view();
        assert_relative_eq!(view[(0, 3)], 1.0, epsilon = 1e-5);
        assert_relative_eq!(view[(1, 3)], 2.0, epsilon = 1e-5);
        assert_relative_eq!(view[(2, 3)], 3.0, epsilon = 1e-5);
    }

    #[test]
    fn test_pitch_is_clamped() {
        let mut camera = Camera::default();
        camera.pitch(500.0);
        assert_relative_eq!(camera.rotation.x, MIN_PITCH);
        camera.pitch(-1000.0);
        assert_relative_eq!(camera.rotation.x, MAX_PITCH);
    }

    #[test]
    fn test_translate_accumulates() {
        let mut camera = Camera::default();
        camera.translate(Vector3::new(1.0, 0.0, 0.0));
        camera.translate(Vector3::new(0.5, 0.0, -1.0));
        assert_relative_eq!(camera.position.x, 1.5);
        assert_relative_eq!(camera.position.z, -1.0);
    }
}
