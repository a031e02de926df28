//! A static scene object backed by a loaded model.

use nalgebra::{Matrix4, Vector3};
use render_engine::render::{LoadModelInfo, Renderer};
use render_engine::{Camera, Entity, InputHandler, Model};

/// A placeable, scalable object. Skips drawing if its model failed to
/// load.
pub struct Object {
    model: Option<Model>,
    /// World position
    pub position: Vector3<f32>,
    /// Rotation in degrees
    pub rotation: Vector3<f32>,
    /// Uniform scale factor
    pub scale: f32,
}

impl Object {
    /// Load the object's model; a failed load leaves the object inert.
    pub fn new(renderer: &mut Renderer, info: LoadModelInfo) -> Self {
        let model = match renderer.load_model(&info) {
            Ok(model) => model,
            Err(err) => {
                log::error!("Fatal error loading {}: {}", info.file_path, err);
                std::process::abort();
            }
        };

        Self {
            model,
            position: Vector3::zeros(),
            rotation: Vector3::zeros(),
            scale: 1.0,
        }
    }

    fn update_transform(&mut self) {
        if let Some(model) = &mut self.model {
            let transform = Matrix4::new_translation(&self.position)
                * Matrix4::from_axis_angle(&Vector3::x_axis(), self.rotation.x.to_radians())
                * Matrix4::from_axis_angle(&Vector3::y_axis(), self.rotation.y.to_radians())
                * Matrix4::from_axis_angle(&Vector3::z_axis(), self.rotation.z.to_radians())
                * Matrix4::new_scaling(self.scale);
            model.transform = transform;
        }
    }
}

impl Entity for Object {
    fn update(&mut self, _dt: f32, _input: &InputHandler, _camera: &mut Camera) {
        self.update_transform();
    }

    fn draw(&mut self, renderer: &mut Renderer) {
        if let Some(model) = self.model {
            renderer.add_to_model_queue(model);
        }
    }
}
