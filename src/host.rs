//! Sketch host: owns the canvas, the frame counter and the active sketch.
//!
//! The window loop (or a headless export) drives it with [`SketchHost::step`].
//! Resizes are applied synchronously, so the next frame always sees the new
//! canvas dimensions.

use std::path::{Path, PathBuf};
use std::time::Duration;

use egui::Vec2;

use crate::canvas::{Canvas, MIN_CANVAS_SIZE};
use crate::config::{SketchKind, StudioConfig};
use crate::export;
use crate::kandinsky::KandinskyPainting;
use crate::network::ParticleNetwork;

/// Frame-driven drawing routine.
pub trait Sketch {
    fn kind(&self) -> SketchKind;

    /// One-off painting right after construction.
    fn setup(&mut self, _canvas: &mut Canvas) {}

    /// Render frame `frame` (the first frame is 1).
    fn draw(&mut self, canvas: &mut Canvas, frame: u64);

    /// The canvas has just been reallocated at a new size.
    fn resized(&mut self, canvas: &mut Canvas);
}

/// Canvas dimensions a sketch uses inside a window of `window` logical pixels.
pub fn canvas_size(kind: SketchKind, config: &StudioConfig, window: Vec2) -> (u32, u32) {
    let scale = match kind {
        SketchKind::ParticleNetwork => 1.0,
        SketchKind::Kandinsky => config.kandinsky.canvas_scale,
    };
    let edge = |v: f32| (v * scale).floor().max(MIN_CANVAS_SIZE as f32) as u32;
    (edge(window.x), edge(window.y))
}

fn build(config: &StudioConfig, canvas: &Canvas) -> Box<dyn Sketch> {
    match config.sketch {
        SketchKind::ParticleNetwork => Box::new(ParticleNetwork::new(
            config.network.clone(),
            canvas.width() as f32,
            canvas.height() as f32,
        )),
        SketchKind::Kandinsky => Box::new(KandinskyPainting::new(
            config.kandinsky.clone(),
            canvas.width(),
            canvas.height(),
        )),
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum KeyCommand {
    SaveFrame,
    Reseed,
}

impl KeyCommand {
    pub fn from_key(key: char) -> Option<Self> {
        match key {
            's' | 'S' => Some(KeyCommand::SaveFrame),
            'r' | 'R' => Some(KeyCommand::Reseed),
            _ => None,
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum KeyOutcome {
    Saved(PathBuf),
    Reseeded,
    Ignored,
}

pub struct SketchHost {
    config: StudioConfig,
    window: Vec2,
    canvas: Canvas,
    sketch: Box<dyn Sketch>,
    frame: u64,
}

impl SketchHost {
    pub fn new(config: StudioConfig, window: Vec2) -> Self {
        let (width, height) = canvas_size(config.sketch, &config, window);
        let mut canvas = Canvas::new(width, height);
        let mut sketch = build(&config, &canvas);
        sketch.setup(&mut canvas);
        log::info!(
            "Started {} on a {}x{} canvas",
            config.sketch.name(),
            canvas.width(),
            canvas.height()
        );

        Self {
            config,
            window,
            canvas,
            sketch,
            frame: 0,
        }
    }

    pub fn kind(&self) -> SketchKind {
        self.sketch.kind()
    }

    pub fn config(&self) -> &StudioConfig {
        &self.config
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn frame_duration(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.config.target_fps.max(1) as f64)
    }

    pub fn step(&mut self) {
        self.frame += 1;
        self.sketch.draw(&mut self.canvas, self.frame);
    }

    /// Returns true when the canvas was actually reallocated.
    ///
    /// Before the first frame the sketch is rebuilt at the new size, so the
    /// first frame shown always matches the first frame after a reseed.
    pub fn resize(&mut self, window: Vec2) -> bool {
        self.window = window;
        let (width, height) = canvas_size(self.config.sketch, &self.config, window);
        if (width, height) == (self.canvas.width(), self.canvas.height()) {
            return false;
        }
        if self.frame == 0 {
            self.reseed();
            return true;
        }
        self.canvas.resize(width, height);
        self.sketch.resized(&mut self.canvas);
        log::info!("Resized canvas to {width}x{height}");
        true
    }

    /// Throw away every entity and run setup again from the configured seed.
    pub fn reseed(&mut self) {
        let (width, height) = canvas_size(self.config.sketch, &self.config, self.window);
        self.canvas = Canvas::new(width, height);
        self.sketch = build(&self.config, &self.canvas);
        self.sketch.setup(&mut self.canvas);
        self.frame = 0;
        log::info!("Re-seeded {}", self.config.sketch.name());
    }

    pub fn switch_to(&mut self, kind: SketchKind) {
        if kind == self.config.sketch {
            return;
        }
        self.config.sketch = kind;
        self.reseed();
    }

    pub fn set_config(&mut self, config: StudioConfig) {
        self.config = config;
        self.reseed();
    }

    pub fn handle_key(&mut self, key: char) -> anyhow::Result<KeyOutcome> {
        match KeyCommand::from_key(key) {
            Some(KeyCommand::SaveFrame) => {
                let dir = self.config.export.directory.clone();
                Ok(KeyOutcome::Saved(self.save_frame(&dir)?))
            }
            Some(KeyCommand::Reseed) => {
                self.reseed();
                Ok(KeyOutcome::Reseeded)
            }
            None => Ok(KeyOutcome::Ignored),
        }
    }

    pub fn save_frame(&self, dir: &Path) -> anyhow::Result<PathBuf> {
        export::save_frame(&self.canvas.to_image(), dir, self.kind().base_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::vec2;

    fn config(kind: SketchKind) -> StudioConfig {
        let mut config = StudioConfig::default();
        config.sketch = kind;
        config.network.seed = Some(1);
        config.network.count = 30;
        config
    }

    #[test]
    fn key_mapping() {
        assert_eq!(KeyCommand::from_key('s'), Some(KeyCommand::SaveFrame));
        assert_eq!(KeyCommand::from_key('S'), Some(KeyCommand::SaveFrame));
        assert_eq!(KeyCommand::from_key('r'), Some(KeyCommand::Reseed));
        assert_eq!(KeyCommand::from_key('R'), Some(KeyCommand::Reseed));
        assert_eq!(KeyCommand::from_key('x'), None);
        assert_eq!(KeyCommand::from_key(' '), None);
    }

    #[test]
    fn other_keys_are_ignored() {
        let mut host = SketchHost::new(config(SketchKind::ParticleNetwork), vec2(80.0, 60.0));
        host.step();
        assert_eq!(host.handle_key('q').unwrap(), KeyOutcome::Ignored);
        assert_eq!(host.frame(), 1);
    }

    #[test]
    fn frame_duration_60fps() {
        let host = SketchHost::new(config(SketchKind::ParticleNetwork), vec2(10.0, 10.0));
        let duration = host.frame_duration();
        assert!(duration.as_millis() >= 16 && duration.as_millis() <= 17);
    }

    #[test]
    fn painting_uses_half_the_window() {
        let cfg = config(SketchKind::Kandinsky);
        assert_eq!(canvas_size(SketchKind::Kandinsky, &cfg, vec2(641.0, 480.0)), (320, 240));
        assert_eq!(canvas_size(SketchKind::ParticleNetwork, &cfg, vec2(641.0, 480.0)), (641, 480));
        assert_eq!(canvas_size(SketchKind::Kandinsky, &cfg, vec2(0.0, 1.0)), (1, 1));
    }

    #[test]
    fn frames_count_from_one() {
        let mut host = SketchHost::new(config(SketchKind::Kandinsky), vec2(200.0, 160.0));
        assert_eq!(host.frame(), 0);
        host.step();
        assert_eq!(host.frame(), 1);
        host.step();
        assert_eq!(host.frame(), 2);
    }

    #[test]
    fn reseed_reproduces_first_frame() {
        let mut host = SketchHost::new(config(SketchKind::Kandinsky), vec2(240.0, 180.0));
        host.step();
        let first = host.canvas().to_image();
        for _ in 0..5 {
            host.step();
        }
        assert_ne!(host.canvas().to_image().as_raw(), first.as_raw());

        assert_eq!(host.handle_key('R').unwrap(), KeyOutcome::Reseeded);
        assert_eq!(host.frame(), 0);
        host.step();
        assert_eq!(host.canvas().to_image().as_raw(), first.as_raw());
    }

    #[test]
    fn seeded_network_reseed_is_reproducible() {
        let mut host = SketchHost::new(config(SketchKind::ParticleNetwork), vec2(160.0, 120.0));
        host.step();
        let first = host.canvas().to_image();
        host.step();
        host.reseed();
        host.step();
        assert_eq!(host.canvas().to_image().as_raw(), first.as_raw());
    }

    #[test]
    fn resize_applies_before_next_frame() {
        let mut host = SketchHost::new(config(SketchKind::Kandinsky), vec2(200.0, 200.0));
        host.step();
        assert!(host.resize(vec2(300.0, 120.0)));
        assert_eq!((host.canvas().width(), host.canvas().height()), (150, 60));
        host.step();
        assert_eq!(host.canvas().to_image().dimensions(), (150, 60));
        assert!(!host.resize(vec2(300.0, 120.0)));
    }

    #[test]
    fn resize_before_first_frame_matches_reseed() {
        for kind in [SketchKind::Kandinsky, SketchKind::ParticleNetwork] {
            let mut host = SketchHost::new(config(kind), vec2(400.0, 300.0));
            assert!(host.resize(vec2(400.0, 260.0)));
            host.step();
            let startup = host.canvas().to_image();

            host.step();
            host.reseed();
            host.step();
            assert_eq!(host.canvas().to_image().as_raw(), startup.as_raw(), "{kind:?}");
        }
    }

    #[test]
    fn resize_mid_animation_keeps_frame_count() {
        let mut host = SketchHost::new(config(SketchKind::Kandinsky), vec2(200.0, 200.0));
        host.step();
        host.step();
        assert!(host.resize(vec2(260.0, 200.0)));
        assert_eq!(host.frame(), 2);
    }

    #[test]
    fn zero_window_is_clamped() {
        let mut host = SketchHost::new(config(SketchKind::ParticleNetwork), vec2(0.0, 0.0));
        host.step();
        assert_eq!((host.canvas().width(), host.canvas().height()), (1, 1));
        let mut host = SketchHost::new(config(SketchKind::Kandinsky), vec2(0.0, 0.0));
        host.step();
        assert_eq!((host.canvas().width(), host.canvas().height()), (1, 1));
    }

    #[test]
    fn switching_sketch_restarts() {
        let mut host = SketchHost::new(config(SketchKind::ParticleNetwork), vec2(200.0, 100.0));
        host.step();
        host.switch_to(SketchKind::Kandinsky);
        assert_eq!(host.kind(), SketchKind::Kandinsky);
        assert_eq!(host.frame(), 0);
        assert_eq!(host.canvas().width(), 100);
    }

    #[test]
    fn save_key_writes_fixed_name() {
        let scratch = tempfile::tempdir().unwrap();
        let dir = scratch.path().to_path_buf();
        let mut cfg = config(SketchKind::Kandinsky);
        cfg.export.directory = dir.clone();
        let mut host = SketchHost::new(cfg, vec2(120.0, 80.0));
        host.step();

        let outcome = host.handle_key('s').unwrap();
        let expected = dir.join("kandinsky_sketch.png");
        assert_eq!(outcome, KeyOutcome::Saved(expected.clone()));
        assert!(expected.exists());
    }
}
