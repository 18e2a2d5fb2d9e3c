#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for Tile Quest.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! To keep `cargo test` usable everywhere we depend on macroquad without its
//! default `audio` feature.

mod sprites;

use std::{
    collections::VecDeque,
    path::PathBuf,
    sync::mpsc,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use glam::{UVec2, Vec2};
use macroquad::input::{
    is_key_down, is_key_pressed, is_mouse_button_down, mouse_position, show_mouse, KeyCode,
    MouseButton,
};
use tile_quest_rendering::{
    DirectionalKeys, FrameInput, GridOverlay, Presentation, RenderingBackend, Scene, SpriteDraw,
    SpriteKey,
};
use tracing::{debug, info, warn};

use self::sprites::SpriteAtlas;

const DEFAULT_MANIFEST_PATH: &str = "assets/manifest.toml";

/// Latches the `Ctrl+D` chord so the debug overlay flips once each time the
/// chord breaks.
#[doc(hidden)]
#[derive(Clone, Copy, Debug, Default)]
pub struct DebugOverlayToggle {
    visible: bool,
    chord_held: bool,
}

impl DebugOverlayToggle {
    /// Feeds one frame of keyboard state and returns whether the overlay is shown.
    ///
    /// The overlay toggles on the first frame after the chord was held in
    /// which either key is up, whichever key is released first.
    pub fn observe(&mut self, control_down: bool, d_down: bool) -> bool {
        let chord_down = control_down && d_down;
        if self.chord_held && !chord_down {
            self.visible = !self.visible;
        }
        self.chord_held = chord_down;
        self.visible
    }

    /// Whether the overlay is currently shown.
    #[must_use]
    pub fn visible(&self) -> bool {
        self.visible
    }
}

/// Rendering backend implemented on top of macroquad.
#[derive(Debug)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    show_fps: bool,
    load_sprites: bool,
    manifest_path: PathBuf,
}

impl Default for MacroquadBackend {
    fn default() -> Self {
        Self {
            swap_interval: None,
            show_fps: false,
            load_sprites: true,
            manifest_path: PathBuf::from(DEFAULT_MANIFEST_PATH),
        }
    }
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }

    /// Configures whether the backend logs frame timing metrics once per second.
    #[must_use]
    pub fn with_show_fps(mut self, show: bool) -> Self {
        self.show_fps = show;
        self
    }

    /// Configures whether the backend should attempt to load sprite assets.
    ///
    /// Without sprites every blit is drawn as a flat placeholder rectangle.
    #[must_use]
    pub fn with_sprite_loading(mut self, enabled: bool) -> Self {
        self.load_sprites = enabled;
        self
    }

    /// Overrides the location of the sprite manifest.
    #[must_use]
    pub fn with_manifest_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.manifest_path = path.into();
        self
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct FrameBreakdown {
    frame: Duration,
    update: Duration,
    render: Duration,
}

#[derive(Debug, Default)]
struct FpsCounter {
    elapsed: Duration,
    frames: u32,
    frame_times: VecDeque<Duration>,
    window_duration: Duration,
    update_accum: Duration,
    render_accum: Duration,
}

#[derive(Clone, Copy, Debug)]
struct FpsMetrics {
    per_second: f32,
    trailing_ten_seconds: f32,
    avg_update: Duration,
    avg_render: Duration,
}

impl FpsCounter {
    /// Records a rendered frame and returns the per-second and trailing ten-second averages once
    /// one second has elapsed.
    fn record_frame(&mut self, breakdown: FrameBreakdown) -> Option<FpsMetrics> {
        self.elapsed += breakdown.frame;
        self.frames = self.frames.saturating_add(1);
        self.update_accum += breakdown.update;
        self.render_accum += breakdown.render;

        self.frame_times.push_back(breakdown.frame);
        self.window_duration += breakdown.frame;

        let trailing_window = Duration::from_secs(10);
        while self.window_duration > trailing_window {
            if let Some(removed) = self.frame_times.pop_front() {
                self.window_duration = self.window_duration.saturating_sub(removed);
            } else {
                break;
            }
        }

        if self.elapsed < Duration::from_secs(1) {
            return None;
        }

        let seconds = self.elapsed.as_secs_f32();
        let frames = self.frames;
        let update_accum = self.update_accum;
        let render_accum = self.render_accum;
        self.elapsed = Duration::ZERO;
        self.frames = 0;
        self.update_accum = Duration::ZERO;
        self.render_accum = Duration::ZERO;

        if seconds <= f32::EPSILON || frames == 0 {
            return None;
        }

        let per_second = frames as f32 / seconds;
        let window_seconds = self.window_duration.as_secs_f32();
        let trailing_ten_seconds = if window_seconds <= f32::EPSILON {
            per_second
        } else {
            self.frame_times.len() as f32 / window_seconds
        };

        Some(FpsMetrics {
            per_second,
            trailing_ten_seconds,
            avg_update: update_accum / frames,
            avg_render: render_accum / frames,
        })
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static,
    {
        let Self {
            swap_interval,
            show_fps,
            load_sprites,
            manifest_path,
        } = self;

        let Presentation {
            window_title,
            window_size,
            scene,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width: i32::try_from(window_size.x).unwrap_or(i32::MAX),
            window_height: i32::try_from(window_size.y).unwrap_or(i32::MAX),
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        let (atlas_init_sender, atlas_init_receiver) = mpsc::channel::<Result<()>>();

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let sprite_atlas = if load_sprites {
                match SpriteAtlas::from_manifest_path(&manifest_path)
                    .context("failed to initialise sprite atlas")
                {
                    Ok(atlas) => Some(atlas),
                    Err(error) => {
                        let _ = atlas_init_sender.send(Err(error));
                        return;
                    }
                }
            } else {
                None
            };
            let _ = atlas_init_sender.send(Ok(()));
            if let Some(atlas) = &sprite_atlas {
                debug!(textures = atlas.texture_count(), "sprite_atlas_loaded");
            }

            show_mouse(false);
            let mut fps_counter = FpsCounter::default();
            let mut debug_overlay = DebugOverlayToggle::default();
            let mut latest_fps = None;

            loop {
                if is_key_pressed(KeyCode::Escape) {
                    info!("quit_requested");
                    break;
                }

                let control_down =
                    is_key_down(KeyCode::LeftControl) || is_key_down(KeyCode::RightControl);
                let was_visible = debug_overlay.visible();
                if debug_overlay.observe(control_down, is_key_down(KeyCode::D)) != was_visible {
                    debug!(visible = debug_overlay.visible(), "debug_overlay_toggled");
                }

                let dt_seconds = macroquad::time::get_frame_time();
                let frame_dt = Duration::from_secs_f32(dt_seconds.max(0.0));
                let frame_input = gather_frame_input(control_down);

                let update_start = Instant::now();
                update_scene(frame_dt, frame_input, &mut scene);
                let update_duration = update_start.elapsed();

                let render_start = Instant::now();
                macroquad::window::clear_background(to_macroquad_color(scene.background));
                for draw in &scene.sprites {
                    draw_sprite(draw, sprite_atlas.as_ref());
                }
                if debug_overlay.visible() {
                    if let Some(grid) = scene.grid {
                        draw_grid(&grid);
                    }
                    draw_fps(latest_fps);
                }
                let render_duration = render_start.elapsed();

                let fps_metrics = fps_counter.record_frame(FrameBreakdown {
                    frame: frame_dt,
                    update: update_duration,
                    render: render_duration,
                });
                if let Some(metrics) = fps_metrics {
                    latest_fps = Some(metrics.per_second);
                    if show_fps {
                        info!(
                            fps = metrics.per_second,
                            fps_10s = metrics.trailing_ten_seconds,
                            update_ms = metrics.avg_update.as_secs_f64() * 1_000.0,
                            render_ms = metrics.avg_render.as_secs_f64() * 1_000.0,
                            "frame_timing"
                        );
                    }
                }

                macroquad::window::next_frame().await;
            }
        });

        atlas_init_receiver.recv().unwrap_or_else(|_| Ok(()))?;

        Ok(())
    }
}

fn gather_frame_input(control_down: bool) -> FrameInput {
    let letters = !control_down;
    let keys = DirectionalKeys {
        up: is_key_down(KeyCode::Up) || (letters && is_key_down(KeyCode::W)),
        down: is_key_down(KeyCode::Down) || (letters && is_key_down(KeyCode::S)),
        left: is_key_down(KeyCode::Left) || (letters && is_key_down(KeyCode::A)),
        right: is_key_down(KeyCode::Right) || (letters && is_key_down(KeyCode::D)),
    };

    let back_buffer = Vec2::new(
        macroquad::window::screen_width(),
        macroquad::window::screen_height(),
    );
    let (cursor_x, cursor_y) = mouse_position();

    FrameInput {
        keys,
        cursor: cursor_inside(Vec2::new(cursor_x, cursor_y), back_buffer),
        primary_down: is_mouse_button_down(MouseButton::Left),
        back_buffer: UVec2::new(back_buffer.x.max(0.0) as u32, back_buffer.y.max(0.0) as u32),
    }
}

fn cursor_inside(cursor: Vec2, back_buffer: Vec2) -> Option<Vec2> {
    let inside = cursor.x >= 0.0
        && cursor.y >= 0.0
        && cursor.x < back_buffer.x
        && cursor.y < back_buffer.y;
    inside.then_some(cursor)
}

fn draw_sprite(draw: &SpriteDraw, atlas: Option<&SpriteAtlas>) {
    if let Some(atlas) = atlas {
        match atlas.draw(draw) {
            Ok(()) => return,
            Err(error) => warn!(%error, sprite = ?draw.sprite, "sprite_draw_failed"),
        }
    }

    let size = draw.dest_size();
    macroquad::shapes::draw_rectangle(
        draw.position.x,
        draw.position.y,
        size.x,
        size.y,
        placeholder_color(draw.sprite),
    );
}

fn placeholder_color(sprite: SpriteKey) -> macroquad::color::Color {
    match sprite {
        SpriteKey::TileSheet => macroquad::color::Color::new(0.25, 0.45, 0.25, 1.0),
        SpriteKey::Player => macroquad::color::Color::new(0.2, 0.35, 0.85, 1.0),
        SpriteKey::PathTarget => macroquad::color::Color::new(0.95, 0.85, 0.2, 0.8),
        SpriteKey::Cursor => macroquad::color::Color::new(1.0, 1.0, 1.0, 1.0),
    }
}

fn draw_grid(grid: &GridOverlay) {
    let color = to_macroquad_color(grid.line_color);
    let width = grid.columns as f32 * grid.cell_size.x;
    let height = grid.rows as f32 * grid.cell_size.y;

    for column in 0..=grid.columns {
        let x = grid.origin.x + column as f32 * grid.cell_size.x;
        macroquad::shapes::draw_line(x, grid.origin.y, x, grid.origin.y + height, 1.0, color);
    }

    for row in 0..=grid.rows {
        let y = grid.origin.y + row as f32 * grid.cell_size.y;
        macroquad::shapes::draw_line(grid.origin.x, y, grid.origin.x + width, y, 1.0, color);
    }
}

fn draw_fps(fps: Option<f32>) {
    let label = match fps {
        Some(fps) => format!("FPS: {fps:.1}"),
        None => "FPS: --".to_owned(),
    };
    let _ = macroquad::text::draw_text(&label, 8.0, 20.0, 20.0, macroquad::color::YELLOW);
}

fn to_macroquad_color(color: tile_quest_rendering::Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}
