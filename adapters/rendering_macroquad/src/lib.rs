#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for Path Defence.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in containerised CI environments. To keep
//! `cargo test` usable everywhere we depend on macroquad without its default
//! `audio` feature.
//!
//! The adapter owns everything the simulation treats as platform territory:
//! the window, texture decode and lifetime, input polling, and frame timing.
//! The simulation only ever sees [`FrameInput`] and hands back a [`Scene`].

mod sprites;

pub use self::sprites::{DrawParams, SpriteAtlas};

use anyhow::Result;
use glam::Vec2;
use macroquad::input::{is_key_pressed, KeyCode};
use path_defence_rendering::{
    Color, FpsCounter, FrameBreakdown, FrameInput, Presentation, RenderingBackend, Scene,
    SceneTower, SceneUnit, ShotLine,
};
use std::{
    path::PathBuf,
    sync::mpsc,
    time::{Duration, Instant},
};

const SHOT_LINE_THICKNESS: f32 = 2.0;
const SHOT_LINE_COLOR: Color = Color::new(1.0, 0.85, 0.2, 1.0);
const RANGE_RING_THICKNESS: f32 = 1.5;
const RANGE_RING_COLOR: Color = Color::new(0.75, 0.75, 0.75, 0.6);
const TOWER_FALLBACK_FILL: Color = Color::new(0.45, 0.45, 0.5, 1.0);
const UNIT_FALLBACK_FILL: Color = Color::new(0.8, 0.2, 0.2, 1.0);

/// Snapshot of edge-triggered keyboard shortcuts observed during a single frame.
#[derive(Clone, Copy, Debug, Default)]
struct KeyboardShortcuts {
    /// `Q` or `Escape` to quit the frame loop.
    quit_requested: bool,
}

impl KeyboardShortcuts {
    fn poll() -> Self {
        let quit_requested = is_key_pressed(KeyCode::Escape) || is_key_pressed(KeyCode::Q);
        Self { quit_requested }
    }
}

/// Rendering backend implemented on top of macroquad.
#[derive(Debug)]
pub struct MacroquadBackend {
    show_fps: bool,
    sprite_manifest: Option<PathBuf>,
}

impl MacroquadBackend {
    /// Creates a backend with sprites loaded from the default manifest and
    /// frame metrics disabled.
    #[must_use]
    pub fn new() -> Self {
        Self {
            show_fps: false,
            sprite_manifest: Some(SpriteAtlas::default_manifest_path()),
        }
    }

    /// Configures whether the backend prints frame timing metrics once per second.
    #[must_use]
    pub fn with_show_fps(mut self, show_fps: bool) -> Self {
        self.show_fps = show_fps;
        self
    }

    /// Overrides the sprite manifest path; `None` disables sprite loading and
    /// falls back to flat-colour shapes.
    #[must_use]
    pub fn with_sprite_manifest(mut self, manifest: Option<PathBuf>) -> Self {
        self.sprite_manifest = manifest;
        self
    }
}

impl Default for MacroquadBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static,
    {
        let Self {
            show_fps,
            sprite_manifest,
        } = self;
        let Presentation {
            window_title,
            scene,
        } = presentation;

        let config = macroquad::window::Conf {
            window_title,
            window_width: scene.board_width_px as i32,
            window_height: scene.board_height_px as i32,
            ..macroquad::window::Conf::default()
        };

        let (atlas_init_sender, atlas_init_receiver) = mpsc::channel::<Result<()>>();

        macroquad::Window::from_config(config, async move {
            let mut init_sender = Some(atlas_init_sender);
            let mut scene = scene;

            let sprite_atlas = match &sprite_manifest {
                Some(path) => match SpriteAtlas::from_manifest_path(path) {
                    Ok(atlas) => Some(atlas),
                    Err(error) => {
                        if let Some(sender) = init_sender.take() {
                            let _ = sender.send(Err(error));
                        }
                        return;
                    }
                },
                None => None,
            };

            if let Some(sender) = init_sender.take() {
                let _ = sender.send(Ok(()));
            }

            let mut fps_counter = FpsCounter::new();

            loop {
                let keyboard = KeyboardShortcuts::poll();
                let input = FrameInput {
                    quit_requested: keyboard.quit_requested,
                };
                if input.quit_requested {
                    break;
                }

                let dt_seconds = macroquad::time::get_frame_time();
                let frame_dt = Duration::from_secs_f32(dt_seconds.max(0.0));

                let simulation_start = Instant::now();
                update(frame_dt, input, &mut scene);
                let simulation = simulation_start.elapsed();

                let render_start = Instant::now();
                macroquad::window::clear_background(to_macroquad_color(scene.background));
                draw_towers(&scene.towers, sprite_atlas.as_ref());
                draw_units(&scene.units, sprite_atlas.as_ref());
                draw_shots(&scene.shots);
                let render = render_start.elapsed();

                if show_fps {
                    if let Some(report) = fps_counter.record_frame(FrameBreakdown {
                        frame: frame_dt,
                        simulation,
                        render,
                    }) {
                        println!(
                            "FPS: {:.2} | sim: {:>6.2}ms render: {:>6.2}ms",
                            report.per_second,
                            report.avg_simulation.as_secs_f64() * 1_000.0,
                            report.avg_render.as_secs_f64() * 1_000.0,
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

fn draw_towers(towers: &[SceneTower], atlas: Option<&SpriteAtlas>) {
    for tower in towers {
        let center_x = tower.position.x() as f32;
        let center_y = tower.position.y() as f32;
        let width = tower.bounds.width_px() as f32;
        let height = tower.bounds.height_px() as f32;

        macroquad::shapes::draw_circle_lines(
            center_x,
            center_y,
            tower.range_px,
            RANGE_RING_THICKNESS,
            to_macroquad_color(RANGE_RING_COLOR),
        );

        let top_left = Vec2::new(center_x - width / 2.0, center_y - height / 2.0);
        let drawn = atlas
            .map(|atlas| {
                atlas
                    .draw(
                        tower.sprite,
                        DrawParams::new(top_left, Vec2::new(width, height)),
                    )
                    .is_ok()
            })
            .unwrap_or(false);
        if !drawn {
            macroquad::shapes::draw_rectangle(
                top_left.x,
                top_left.y,
                width,
                height,
                to_macroquad_color(TOWER_FALLBACK_FILL),
            );
        }
    }
}

fn draw_units(units: &[SceneUnit], atlas: Option<&SpriteAtlas>) {
    for unit in units {
        let top_left = Vec2::new(unit.position.x() as f32, unit.position.y() as f32);
        let size = Vec2::new(unit.bounds.width_px() as f32, unit.bounds.height_px() as f32);

        let drawn = atlas
            .map(|atlas| {
                atlas
                    .draw(unit.sprite, DrawParams::new(top_left, size))
                    .is_ok()
            })
            .unwrap_or(false);
        if !drawn {
            macroquad::shapes::draw_rectangle(
                top_left.x,
                top_left.y,
                size.x,
                size.y,
                to_macroquad_color(UNIT_FALLBACK_FILL),
            );
        }
    }
}

fn draw_shots(shots: &[ShotLine]) {
    for shot in shots {
        macroquad::shapes::draw_line(
            shot.from.x() as f32,
            shot.from.y() as f32,
            shot.to.x() as f32,
            shot.to.y() as f32,
            SHOT_LINE_THICKNESS,
            to_macroquad_color(SHOT_LINE_COLOR),
        );
    }
}

pub(crate) fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}
