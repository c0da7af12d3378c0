//! Demo scene for the prism renderer.
//!
//! Describes a handful of models and cameras up front, then hands control
//! to the engine's event loop. See the printed banner for runtime controls.

use anyhow::Result;
use tracing::info;

use prism_renderer::Engine;

fn main() -> Result<()> {
    prism_core::init_logging();
    info!("Starting prism demo");

    let mut engine = Engine::new("Prism demo", 800, 600);

    let main_camera = engine.create_camera();
    let _side_camera = engine.create_camera_at(1.0, 0.5, -1.0);
    engine.translate_camera(main_camera, 1.0, 2.0, -0.5)?;

    let teapot = engine.create_model_at("assets/models/teapot.obj", 0.4, 1.0, -0.3);
    engine.change_texture(teapot, "assets/textures/tex1.jpg")?;
    engine.scale_model(teapot, 0.5, 0.5, 0.5)?;
    engine.switch_animated_rotation(teapot)?;

    let _orb = engine.create_model_at("assets/models/sphere.obj", 2.0, 2.0, 0.0);

    let crate_box = engine.create_box(2.0, 3.0, 0.5);
    engine.change_texture(crate_box, "assets/textures/tex2.jpg")?;

    let chalet = engine.create_model_at("assets/models/chalet.obj", 3.0, 0.0, -1.0);
    engine.change_texture(chalet, "assets/textures/chalet.jpg")?;
    engine.rotate_model(chalet, 10.0, 20.0, 40.0)?;

    let corner_camera = engine.create_camera();
    engine.set_camera_position(corner_camera, 1.0, 1.0, 1.0)?;

    engine.translate_model(teapot, 1.0, 1.0, 1.0)?;
    engine.change_fov(main_camera, 90.0)?;

    let floor = engine.create_plane_at(5.0, 5.0, 0.0, -4.0, 0.0);
    engine.change_texture(floor, "assets/textures/tex1.png")?;

    let boulder = engine.create_sphere_at(5.0, 13.0, -4.0, 0.0);
    engine.change_texture(boulder, "assets/textures/tex1.jpg")?;

    let far_teapot = engine.create_model_at("assets/models/teapot.obj", -10.0, 3.2, 5.0);
    engine.change_texture(far_teapot, "assets/textures/chalet.jpg")?;

    engine.run()?;
    Ok(())
}
