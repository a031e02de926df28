//! Windowed demo: two textured objects and a first-person camera.

mod object;
mod player;
mod scene_main;

use render_engine::{Engine, EngineConfig, Scene};
use scene_main::SceneMain;

fn main() {
    env_logger::init();

    let config = EngineConfig::load_or_default("viewer.toml");

    let scenes: Vec<Box<dyn Scene>> = vec![Box::new(SceneMain::new())];

    let mut engine = match Engine::new(config, scenes) {
        Ok(engine) => engine,
        Err(err) => {
            log::error!("Engine initialisation failed: {}", err);
            std::process::exit(1);
        }
    };

    engine.run();
    engine.cleanup();
}
