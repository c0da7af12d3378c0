//! Engine facade: scene construction plus the window run loop.
//!
//! A host program builds the scene by index — cameras, primitives, OBJ
//! models, textures, per-instance tweaks — then hands control to
//! [`Engine::run`]. The window and all GPU resources exist only while the
//! loop runs; scene calls before `run()` are cheap description edits.
//!
//! Controls while running:
//! - `W`/`A`/`S`/`D`/`Q`/`E` move the active camera
//! - arrow keys rotate it, `O`/`P` change its field of view
//! - `F` toggles wireframe, `2` cycles the active camera

use std::path::PathBuf;

use glam::Vec3;
use tracing::{error, info};
use winit::application::ApplicationHandler;
use winit::event::{KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::PhysicalKey;
use winit::window::WindowId;

use prism_core::Timer;
use prism_platform::{EventQueue, InputState, KeyCode, PlatformEvent, Window, WindowConfig};
use prism_resources::TextureData;
use prism_scene::{Camera, FreeCamera};

use crate::error::{RendererError, RendererResult};
use crate::model::Model;
use crate::renderer::Renderer;

/// Camera rotation and field-of-view speed, degrees per second.
const ROTATE_DEGREES_PER_SECOND: f32 = 45.0;

/// Scene state and run loop.
pub struct Engine {
    config: WindowConfig,
    cameras: Vec<FreeCamera>,
    active_camera: usize,
    models: Vec<Model>,
    start_wireframe: bool,

    window: Option<Window>,
    renderer: Option<Renderer>,
    events: EventQueue,
    input: InputState,
    timer: Timer,
    exit_error: Option<RendererError>,
}

impl Engine {
    /// Creates an engine for a window of the given title and size.
    pub fn new(title: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            config: WindowConfig {
                title: title.into(),
                width,
                height,
            },
            cameras: Vec::new(),
            active_camera: 0,
            models: Vec::new(),
            start_wireframe: false,
            window: None,
            renderer: None,
            events: EventQueue::new(),
            input: InputState::new(),
            timer: Timer::new(),
            exit_error: None,
        }
    }

    fn initial_aspect(&self) -> f32 {
        self.config.width as f32 / self.config.height as f32
    }

    /// Adds a camera at the origin. Returns its index.
    pub fn create_camera(&mut self) -> usize {
        self.cameras.push(FreeCamera::with_aspect(self.initial_aspect()));
        self.cameras.len() - 1
    }

    /// Adds a camera at the given position. Returns its index.
    pub fn create_camera_at(&mut self, x: f32, y: f32, z: f32) -> usize {
        self.cameras.push(FreeCamera::at_with_aspect(
            Vec3::new(x, y, z),
            self.initial_aspect(),
        ));
        self.cameras.len() - 1
    }

    fn camera_mut(&mut self, id: usize) -> RendererResult<&mut FreeCamera> {
        let count = self.cameras.len();
        self.cameras
            .get_mut(id)
            .ok_or_else(|| RendererError::InvalidIndex(format!("camera {id} of {count}")))
    }

    /// Queues a world-space translation for camera `id`.
    pub fn translate_camera(&mut self, id: usize, x: f32, y: f32, z: f32) -> RendererResult<()> {
        self.camera_mut(id)?.translate(Vec3::new(x, y, z));
        Ok(())
    }

    /// Moves camera `id` to an absolute position.
    pub fn set_camera_position(&mut self, id: usize, x: f32, y: f32, z: f32) -> RendererResult<()> {
        self.camera_mut(id)?.set_position(Vec3::new(x, y, z));
        Ok(())
    }

    /// Sets camera `id`'s absolute orientation in degrees.
    pub fn rotate_camera(
        &mut self,
        id: usize,
        yaw: f32,
        pitch: f32,
        roll: f32,
    ) -> RendererResult<()> {
        self.camera_mut(id)?.set_rotation(yaw, pitch, roll);
        Ok(())
    }

    /// Adjusts camera `id`'s field of view by `delta` degrees.
    pub fn change_fov(&mut self, id: usize, delta: f32) -> RendererResult<()> {
        self.camera_mut(id)?.change_fov(delta);
        Ok(())
    }

    fn add_model(&mut self, model: Model) -> usize {
        self.models.push(model);
        self.models.len() - 1
    }

    /// Adds a box primitive of the given extent. Returns its index.
    pub fn create_box(&mut self, width: f32, height: f32, depth: f32) -> usize {
        self.add_model(Model::cuboid(width, height, depth))
    }

    /// Adds a sphere primitive of the given radius. Returns its index.
    pub fn create_sphere(&mut self, radius: f32) -> usize {
        self.add_model(Model::sphere(radius))
    }

    /// Adds an XZ plane primitive. Returns its index.
    pub fn create_plane(&mut self, width: f32, depth: f32) -> usize {
        self.add_model(Model::plane(width, depth))
    }

    /// Adds a model loaded from a Wavefront OBJ file. Returns its index.
    pub fn create_model(&mut self, path: impl Into<PathBuf>) -> usize {
        self.add_model(Model::from_obj(path))
    }

    /// Adds a box primitive placed at the given position. Returns its index.
    pub fn create_box_at(
        &mut self,
        width: f32,
        height: f32,
        depth: f32,
        x: f32,
        y: f32,
        z: f32,
    ) -> usize {
        self.add_model(Model::cuboid_at(width, height, depth, Vec3::new(x, y, z)))
    }

    /// Adds a sphere primitive placed at the given position. Returns its index.
    pub fn create_sphere_at(&mut self, radius: f32, x: f32, y: f32, z: f32) -> usize {
        self.add_model(Model::sphere_at(radius, Vec3::new(x, y, z)))
    }

    /// Adds an XZ plane primitive placed at the given position. Returns its index.
    pub fn create_plane_at(&mut self, width: f32, depth: f32, x: f32, y: f32, z: f32) -> usize {
        self.add_model(Model::plane_at(width, depth, Vec3::new(x, y, z)))
    }

    /// Adds an OBJ model placed at the given position. Returns its index.
    pub fn create_model_at(&mut self, path: impl Into<PathBuf>, x: f32, y: f32, z: f32) -> usize {
        self.add_model(Model::from_obj_at(path, Vec3::new(x, y, z)))
    }

    fn model_mut(&mut self, id: usize) -> RendererResult<&mut Model> {
        let count = self.models.len();
        self.models
            .get_mut(id)
            .ok_or_else(|| RendererError::InvalidIndex(format!("model {id} of {count}")))
    }

    /// Moves model `id` by a world-space offset.
    pub fn translate_model(&mut self, id: usize, x: f32, y: f32, z: f32) -> RendererResult<()> {
        self.model_mut(id)?.translate(Vec3::new(x, y, z));
        Ok(())
    }

    /// Rotates model `id` by Euler angles in degrees.
    pub fn rotate_model(&mut self, id: usize, x: f32, y: f32, z: f32) -> RendererResult<()> {
        self.model_mut(id)?.rotate(x, y, z);
        Ok(())
    }

    /// Scales model `id`; zero components are ignored.
    pub fn scale_model(&mut self, id: usize, x: f32, y: f32, z: f32) -> RendererResult<()> {
        self.model_mut(id)?.scale(Vec3::new(x, y, z));
        Ok(())
    }

    /// Assigns the texture file sampled by model `id`. Once the renderer is
    /// live this reloads the image and rebuilds the model's descriptors.
    pub fn change_texture(&mut self, id: usize, path: impl Into<PathBuf>) -> RendererResult<()> {
        let path = path.into();
        self.model_mut(id)?.set_texture(path.clone());
        if let Some(renderer) = self.renderer.as_mut() {
            let data = TextureData::load(&path)?;
            renderer.replace_texture(id, &data)?;
        }
        Ok(())
    }

    /// Toggles model `id`'s 90°/s spin.
    pub fn switch_animated_rotation(&mut self, id: usize) -> RendererResult<()> {
        self.model_mut(id)?.toggle_animated_rotation();
        Ok(())
    }

    /// Toggles wireframe rendering for the whole scene.
    pub fn toggle_wireframe(&mut self) {
        self.start_wireframe = !self.start_wireframe;
    }

    /// Opens the window and runs the frame loop until close is requested.
    ///
    /// # Errors
    ///
    /// Returns the first fatal error from initialization or a frame tick.
    pub fn run(mut self) -> RendererResult<()> {
        if self.cameras.is_empty() {
            // A scene is unrenderable without a viewpoint.
            self.create_camera();
        }

        let event_loop = EventLoop::new()
            .map_err(|e| prism_core::Error::Window(format!("event loop creation failed: {e}")))?;
        event_loop.set_control_flow(ControlFlow::Poll);
        event_loop
            .run_app(&mut self)
            .map_err(|e| prism_core::Error::Window(format!("event loop failed: {e}")))?;

        match self.exit_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn banner(&self) {
        info!(
            cameras = self.cameras.len(),
            models = self.models.len(),
            "Scene ready"
        );
        info!(
            "Controls: W/A/S/D/Q/E move camera, arrows rotate, O/P change FOV, \
             F toggle wireframe, 2 cycle camera"
        );
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: RendererError) {
        error!("Fatal renderer error: {err}");
        if self.exit_error.is_none() {
            self.exit_error = Some(err);
        }
        event_loop.exit();
    }

    /// One frame: drain events, apply held-key movement, draw.
    fn tick(&mut self, event_loop: &ActiveEventLoop) {
        if let Err(err) = self.tick_inner() {
            self.fail(event_loop, err);
        }
    }

    fn tick_inner(&mut self) -> RendererResult<()> {
        let Some(renderer) = self.renderer.as_mut() else {
            return Ok(());
        };

        let tick = self.timer.frame();

        for event in self.events.drain() {
            match event {
                PlatformEvent::Resized { width, height } => renderer.resize(width, height),
                PlatformEvent::KeyPressed(KeyCode::KeyF) => {
                    renderer.toggle_wireframe(&mut self.cameras)?;
                }
                PlatformEvent::KeyReleased(KeyCode::Digit2) => {
                    self.active_camera = (self.active_camera + 1) % self.cameras.len();
                    info!(camera = self.active_camera, "Switched active camera");
                }
                PlatformEvent::FocusLost => self.input.clear(),
                // Exit was already requested when this was queued.
                PlatformEvent::CloseRequested => {}
                _ => {}
            }
        }

        let camera = &mut self.cameras[self.active_camera];
        let speed = camera.speed() * tick.delta_seconds;
        let angle = ROTATE_DEGREES_PER_SECOND * tick.delta_seconds;

        if self.input.is_key_held(KeyCode::KeyW) {
            camera.walk(speed);
        }
        if self.input.is_key_held(KeyCode::KeyS) {
            camera.walk(-speed);
        }
        if self.input.is_key_held(KeyCode::KeyA) {
            camera.strafe(-speed);
        }
        if self.input.is_key_held(KeyCode::KeyD) {
            camera.strafe(speed);
        }
        if self.input.is_key_held(KeyCode::KeyQ) {
            camera.lift(speed);
        }
        if self.input.is_key_held(KeyCode::KeyE) {
            camera.lift(-speed);
        }
        if self.input.is_key_held(KeyCode::ArrowUp) {
            camera.rotate(0.0, -angle);
        }
        if self.input.is_key_held(KeyCode::ArrowDown) {
            camera.rotate(0.0, angle);
        }
        if self.input.is_key_held(KeyCode::ArrowLeft) {
            camera.rotate(angle, 0.0);
        }
        if self.input.is_key_held(KeyCode::ArrowRight) {
            camera.rotate(-angle, 0.0);
        }
        if self.input.is_key_held(KeyCode::KeyO) {
            camera.change_fov(-angle);
        }
        if self.input.is_key_held(KeyCode::KeyP) {
            camera.change_fov(angle);
        }

        renderer.draw_frame(
            &self.models,
            &mut self.cameras,
            self.active_camera,
            tick.elapsed_seconds,
        )
    }
}

impl ApplicationHandler for Engine {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window = match Window::new(event_loop, &self.config) {
            Ok(window) => window,
            Err(err) => {
                self.fail(event_loop, err.into());
                return;
            }
        };

        let mut renderer = match Renderer::new(&window, &self.models) {
            Ok(renderer) => renderer,
            Err(err) => {
                self.fail(event_loop, err);
                return;
            }
        };

        for camera in &mut self.cameras {
            camera.set_aspect_ratio(renderer.aspect_ratio());
        }

        if self.start_wireframe {
            if let Err(err) = renderer.toggle_wireframe(&mut self.cameras) {
                self.fail(event_loop, err);
                return;
            }
        }

        self.banner();
        self.timer.reset();
        self.window = Some(window);
        self.renderer = Some(renderer);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                self.events.push(PlatformEvent::CloseRequested);
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                self.events.push(PlatformEvent::Resized {
                    width: size.width,
                    height: size.height,
                });
            }
            WindowEvent::Focused(false) => {
                self.events.push(PlatformEvent::FocusLost);
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        repeat,
                        ..
                    },
                ..
            } => {
                if state.is_pressed() {
                    self.input.on_key_pressed(code);
                    if !repeat {
                        self.events.push(PlatformEvent::KeyPressed(code));
                    }
                } else {
                    self.input.on_key_released(code);
                    self.events.push(PlatformEvent::KeyReleased(code));
                }
            }
            WindowEvent::RedrawRequested => {
                self.tick(event_loop);
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}
