//! The demo scene: a spinning cube and a pyramid.

use crate::object::Object;
use crate::player::Player;
use nalgebra::Vector3;
use render_engine::render::{LoadModelInfo, Renderer};
use render_engine::{Entity, InputHandler, Scene};

/// Demo scene with a player-controlled camera and two objects.
pub struct SceneMain {
    objects: Vec<Object>,
    player: Player,
}

impl SceneMain {
    /// Create the scene; objects are loaded in `init`.
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            player: Player::new(),
        }
    }
}

impl Scene for SceneMain {
    fn init(&mut self, renderer: &mut Renderer) {
        let mut cube = Object::new(
            renderer,
            LoadModelInfo {
                file_path: "assets/cube.obj".to_string(),
                texture_path: Some("assets/checker.png".to_string()),
            },
        );
        cube.position = Vector3::new(4.0, 0.0, -6.0);

        let mut pyramid = Object::new(
            renderer,
            LoadModelInfo {
                file_path: "assets/pyramid.obj".to_string(),
                texture_path: Some("assets/checker.png".to_string()),
            },
        );
        pyramid.position = Vector3::new(-1.0, 0.0, -6.0);
        pyramid.scale = 1.5;

        self.objects.push(cube);
        self.objects.push(pyramid);
    }

    fn update(&mut self, dt: f32, input: &InputHandler, renderer: &mut Renderer) {
        self.player.update(dt, input, &mut renderer.camera);

        // Idle spin on the first object
        if let Some(first) = self.objects.first_mut() {
            first.rotation.y += dt * 10.0;
            if first.rotation.y > 180.0 {
                first.rotation.y -= 360.0;
            }
        }

        for object in &mut self.objects {
            object.update(dt, input, &mut renderer.camera);
        }
    }

    fn draw(&mut self, renderer: &mut Renderer) {
        for object in &mut self.objects {
            object.draw(renderer);
        }
    }

    fn debug_lines(&self) -> Vec<String> {
        self.objects
            .iter()
            .enumerate()
            .map(|(index, object)| {
                format!(
                    "Object {}: {{{:.2}, {:.2}, {:.2}}} scale {:.3}",
                    index, object.position.x, object.position.y, object.position.z, object.scale
                )
            })
            .collect()
    }
}
