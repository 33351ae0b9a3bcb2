//! # TANDEM Game Loop
//!
//! ```text
//! Tick N:
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │ 1. TICK TIMER                                                       │
//! │    └─ dt = time since tick N-1 (clamped)                            │
//! │                                                                     │
//! │ 2. UPDATE                                                           │
//! │    ├─ Move game objects, writing frame N                            │
//! │    ├─ Move the camera from input                                    │
//! │    └─ Write the camera view into frame N                            │
//! │                                                                     │
//! │ 3. PLATFORM LOOP                                                    │
//! │    └─ Pump window messages, decide whether to quit                  │
//! │                                                                     │
//! │ 4. END FRAME                                                        │
//! │    └─ Publish frame N, hand it to the render thread (may block)     │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use tandem_rendering::{RenderBackend, RenderStats, RenderThread};
use tandem_shared::{DefaultGeometry, Vec3};

use crate::camera::Camera;
use crate::config::GameConfig;
use crate::error::GameResult;
use crate::game_object::{GameObjectId, GameObjects};
use crate::input::{InputSource, Key};
use crate::timer::GameTimer;

/// Number of cubes spawned at startup.
pub const SHOWCASE_OBJECTS: usize = 3;

/// Showcase drift speed in world units per second.
pub const SHOWCASE_SPEED: f32 = 0.5;

/// The simulation: owns the render thread and everything it draws.
pub struct Game<I: InputSource> {
    config: GameConfig,
    timer: GameTimer,
    render: RenderThread,
    objects: GameObjects,
    camera: Camera,
    input: I,
    ticks: u64,
}

impl<I: InputSource> Game<I> {
    /// Starts the render thread on `backend` and spawns the showcase cubes.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` is invalid or the render thread cannot
    /// be started.
    pub fn new<B: RenderBackend>(config: GameConfig, backend: B, input: I) -> GameResult<Self> {
        config.validate()?;
        let mut render = RenderThread::spawn(&config.render, backend)?;

        let mut objects = GameObjects::new();
        for _ in 0..SHOWCASE_OBJECTS {
            let _ = objects.spawn(DefaultGeometry::cube(), Vec3::ZERO, &mut render);
        }
        tracing::info!(objects = objects.len(), "game created");

        Ok(Self {
            config,
            timer: GameTimer::new(),
            render,
            objects,
            camera: Camera::default(),
            input,
            ticks: 0,
        })
    }

    /// Runs ticks until `platform_loop` returns `false`.
    ///
    /// The tick that sees `false` still ends its frame, so the render thread
    /// gets every frame the simulation produced.
    pub fn run(&mut self, mut platform_loop: impl FnMut() -> bool) {
        tracing::info!("game loop started");
        self.timer.reset();

        let mut quit = false;
        while !quit {
            self.timer.tick();
            let dt = self.timer.delta_time();

            self.update(dt);
            quit = !platform_loop();
            self.end_frame();
        }

        tracing::info!(ticks = self.ticks, seconds = self.timer.total_time(), "game loop finished");
    }

    /// Advances the simulation by `dt` seconds, writing the current frame.
    pub fn update(&mut self, dt: f32) {
        let frame = self.render.current_frame();

        for index in 0..self.objects.len() {
            let id = GameObjectId(index as u32);
            let Some(object) = self.objects.get(id) else {
                continue;
            };
            let position = showcase_motion(index, object.position(), dt);
            self.objects.set_position(id, position, frame, &self.render);
        }

        self.move_camera(dt);
        self.render.set_view(self.camera.view_state(), frame);
    }

    /// Publishes the current frame. May block on render backpressure.
    pub fn end_frame(&mut self) {
        self.render.end_frame();
        self.ticks += 1;
    }

    /// Despawns every game object, then stops the render thread after it
    /// applies everything queued.
    ///
    /// # Errors
    ///
    /// Returns an error if the render thread panicked.
    pub fn shutdown(mut self) -> GameResult<RenderStats> {
        self.objects.despawn_all(&mut self.render);
        let stats = self.render.shutdown()?;
        tracing::info!(frames_drawn = stats.frames_drawn, "game shut down");
        Ok(stats)
    }

    fn move_camera(&mut self, dt: f32) {
        let mut direction = Vec3::ZERO;
        if self.input.is_key_pressed(Key::W) {
            direction.y += 1.0;
        }
        if self.input.is_key_pressed(Key::A) {
            direction.x += 1.0;
        }
        if self.input.is_key_pressed(Key::S) {
            direction.y -= 1.0;
        }
        if self.input.is_key_pressed(Key::D) {
            direction.x -= 1.0;
        }
        if self.input.is_key_pressed(Key::R) {
            direction.z += 1.0;
        }
        if self.input.is_key_pressed(Key::F) {
            direction.z -= 1.0;
        }

        if direction != Vec3::ZERO {
            let velocity = direction.normalized() * (dt * self.config.control.camera_speed);
            self.camera.translate_local(velocity);
        }
    }

    /// Game objects.
    #[must_use]
    pub fn objects(&self) -> &GameObjects {
        &self.objects
    }

    /// The camera.
    #[must_use]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// The input source.
    pub fn input_mut(&mut self) -> &mut I {
        &mut self.input
    }

    /// The render thread handle.
    #[must_use]
    pub fn render(&self) -> &RenderThread {
        &self.render
    }

    /// Frames ended so far.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

/// Drift for showcase object `index`: +x, -y, or both.
fn showcase_motion(index: usize, mut position: Vec3, dt: f32) -> Vec3 {
    let step = SHOWCASE_SPEED * dt;
    match index {
        0 => position.x += step,
        1 => position.y -= step,
        2 => {
            position.x += step;
            position.y -= step;
        }
        _ => {}
    }
    position
}
