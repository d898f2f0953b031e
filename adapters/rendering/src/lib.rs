#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Path Defence adapters.
//!
//! The simulation hands backends a read-only [`Scene`] snapshot once per
//! step; backends hand back a [`FrameInput`] describing platform signals.
//! Nothing in this crate draws: concrete backends (such as the macroquad
//! adapter) implement [`RenderingBackend`] against these types.

use std::time::Duration;

use anyhow::Result;
use path_defence_core::{PixelPoint, TowerId, UnitId};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

/// Input snapshot gathered by adapters before updating the scene.
///
/// This is the continuation signal: the simulation keeps stepping until a
/// frame reports `quit_requested`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct FrameInput {
    /// Whether the platform observed a quit signal on this frame.
    pub quit_requested: bool,
}

/// Opaque drawable handle carried by scene entities.
///
/// Backends resolve keys to decoded textures; the simulation never loads,
/// decodes, or frees the underlying asset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpriteKey {
    /// Mobile unit body.
    Unit,
    /// Stationary tower body.
    Tower,
}

/// Pixel dimensions of a drawable assigned at entity construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SpriteBounds {
    width_px: u32,
    height_px: u32,
}

impl SpriteBounds {
    /// Creates bounds with explicit pixel dimensions.
    #[must_use]
    pub const fn new(width_px: u32, height_px: u32) -> Self {
        Self {
            width_px,
            height_px,
        }
    }

    /// Width of the drawable in pixels.
    #[must_use]
    pub const fn width_px(&self) -> u32 {
        self.width_px
    }

    /// Height of the drawable in pixels.
    #[must_use]
    pub const fn height_px(&self) -> u32 {
        self.height_px
    }
}

/// Immutable snapshot describing a unit placed within the scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SceneUnit {
    /// Identifier allocated by the world.
    pub id: UnitId,
    /// Top-left pixel position of the unit's drawable.
    pub position: PixelPoint,
    /// Bounds assigned at construction.
    pub bounds: SpriteBounds,
    /// Drawable handle assigned at construction.
    pub sprite: SpriteKey,
}

/// Immutable snapshot describing a tower placed within the scene.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneTower {
    /// Identifier allocated by the world.
    pub id: TowerId,
    /// Center pixel position of the tower.
    pub position: PixelPoint,
    /// Bounds assigned at construction.
    pub bounds: SpriteBounds,
    /// Drawable handle assigned at construction.
    pub sprite: SpriteKey,
    /// Engagement radius in pixels, drawn as a range ring.
    pub range_px: f32,
}

/// One-frame line segment describing a shot that connected this step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ShotLine {
    /// Muzzle end of the line.
    pub from: PixelPoint,
    /// Impact end of the line.
    pub to: PixelPoint,
}

/// Read-only snapshot of everything a backend draws for one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Board width in pixels.
    pub board_width_px: u32,
    /// Board height in pixels.
    pub board_height_px: u32,
    /// Clear color behind the board.
    pub background: Color,
    /// Towers present this frame.
    pub towers: Vec<SceneTower>,
    /// Live units present this frame.
    pub units: Vec<SceneUnit>,
    /// Shot visuals recorded this step; valid for exactly one frame.
    pub shots: Vec<ShotLine>,
}

impl Scene {
    /// Creates an empty scene for the provided board dimensions.
    #[must_use]
    pub fn new(board_width_px: u32, board_height_px: u32, background: Color) -> Self {
        Self {
            board_width_px,
            board_height_px,
            background,
            towers: Vec::new(),
            units: Vec::new(),
            shots: Vec::new(),
        }
    }
}

/// Per-frame timing handed to the observability hook.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct FrameBreakdown {
    /// Wall-clock duration of the whole frame.
    pub frame: Duration,
    /// Portion spent stepping the simulation.
    pub simulation: Duration,
    /// Portion spent issuing draw calls.
    pub render: Duration,
}

/// Aggregated frame metrics published roughly once per second.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FpsReport {
    /// Frames completed during the aggregation window.
    pub per_second: f64,
    /// Mean simulation time per frame in the window.
    pub avg_simulation: Duration,
    /// Mean render time per frame in the window.
    pub avg_render: Duration,
}

/// Optional frame-timing hook; incidental instrumentation, not simulation
/// state.
#[derive(Debug, Default)]
pub struct FpsCounter {
    window: Duration,
    frames: u32,
    simulation: Duration,
    render: Duration,
}

impl FpsCounter {
    /// Creates a counter with an empty aggregation window.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one frame; returns a report each time a second of frame time
    /// has accumulated.
    pub fn record_frame(&mut self, breakdown: FrameBreakdown) -> Option<FpsReport> {
        self.window = self.window.saturating_add(breakdown.frame);
        self.frames += 1;
        self.simulation = self.simulation.saturating_add(breakdown.simulation);
        self.render = self.render.saturating_add(breakdown.render);

        if self.window < Duration::from_secs(1) {
            return None;
        }

        let frames = f64::from(self.frames);
        let report = FpsReport {
            per_second: frames / self.window.as_secs_f64(),
            avg_simulation: self.simulation.div_f64(frames),
            avg_render: self.render.div_f64(frames),
        };
        *self = Self::default();
        Some(report)
    }
}

/// Everything a backend needs to open a window and present the first frame.
#[derive(Clone, Debug)]
pub struct Presentation {
    /// Title displayed by the platform window.
    pub window_title: String,
    /// Scene presented on the first frame and updated in place thereafter.
    pub scene: Scene,
}

/// Contract implemented by platform backends that own the frame loop.
pub trait RenderingBackend {
    /// Runs the frame loop until the continuation signal turns false.
    ///
    /// The backend calls `update` once per frame with the elapsed frame time
    /// and gathered input; the closure steps the simulation and repopulates
    /// the scene in place.
    fn run<F>(self, presentation: Presentation, update: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lighten_moves_channels_toward_white() {
        let color = Color::from_rgb_u8(100, 0, 200).lighten(0.5);
        assert!(color.red > 100.0 / 255.0);
        assert!(color.green > 0.0);
        assert!(color.blue > 200.0 / 255.0);
        assert_eq!(color.alpha, 1.0);
    }

    #[test]
    fn lighten_clamps_out_of_range_amounts() {
        let color = Color::from_rgb_u8(10, 20, 30).lighten(5.0);
        assert_eq!((color.red, color.green, color.blue), (1.0, 1.0, 1.0));
    }

    #[test]
    fn fps_counter_reports_once_per_accumulated_second() {
        let mut counter = FpsCounter::new();
        let breakdown = FrameBreakdown {
            frame: Duration::from_millis(100),
            simulation: Duration::from_millis(20),
            render: Duration::from_millis(30),
        };

        for _ in 0..9 {
            assert!(counter.record_frame(breakdown).is_none());
        }
        let report = counter.record_frame(breakdown).expect("tenth frame fills the window");
        assert!((report.per_second - 10.0).abs() < 1e-9);
        assert_eq!(report.avg_simulation, Duration::from_millis(20));
        assert_eq!(report.avg_render, Duration::from_millis(30));

        assert!(counter.record_frame(breakdown).is_none(), "window resets");
    }
}
