//! Configuration System for Sketch Studio
//! Per-sketch parameters, palette and export settings, saved as JSON

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

// ============================================================================
// Sketch selection
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Debug, Default)]
pub enum SketchKind {
    #[default]
    ParticleNetwork,
    Kandinsky,
}

impl SketchKind {
    pub fn all() -> [SketchKind; 2] {
        [SketchKind::ParticleNetwork, SketchKind::Kandinsky]
    }

    pub fn name(&self) -> &'static str {
        match self {
            SketchKind::ParticleNetwork => "Particle Network",
            SketchKind::Kandinsky => "Kandinsky Painting",
        }
    }

    /// Base file name for exported frames.
    pub fn base_name(&self) -> &'static str {
        match self {
            SketchKind::ParticleNetwork => "landing_sketch",
            SketchKind::Kandinsky => "kandinsky_sketch",
        }
    }
}

// ============================================================================
// Palette
// ============================================================================

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(default)]
pub struct Palette {
    pub name: String,
    pub colors: Vec<[u8; 3]>,
}

impl Default for Palette {
    fn default() -> Self {
        Self::kandinsky()
    }
}

impl Palette {
    pub fn kandinsky() -> Self {
        Self {
            name: "Kandinsky".to_string(),
            colors: vec![
                [0x0a, 0x0a, 0x0a], // near-black
                [0xf2, 0xe9, 0xe4], // paper
                [0xe6, 0x39, 0x46], // red
                [0x1d, 0x35, 0x57], // deep blue
                [0x45, 0x7b, 0x9d], // sky blue
                [0xf4, 0xa2, 0x61], // orange
                [0xe9, 0xc4, 0x6a], // yellow
                [0x2a, 0x9d, 0x8f], // teal
            ],
        }
    }

    /// The saturated colours, skipping the two neutrals at the front.
    pub fn bolds(&self) -> &[[u8; 3]] {
        if self.colors.len() > 2 {
            &self.colors[2..]
        } else {
            &self.colors
        }
    }
}

// ============================================================================
// Particle Network Configuration
// ============================================================================

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(default)]
pub struct NetworkConfig {
    pub count: usize,
    /// Pairs closer than this are linked.
    pub link_distance: f32,
    /// Each velocity component is drawn from `[-max_speed, max_speed)`.
    pub max_speed: f32,
    pub stroke_weight: f32,
    /// Per-frame translucent fill that leaves motion trails.
    pub trail: [u8; 4],
    /// First colour channel at distance 0.
    pub edge_near: f32,
    /// First colour channel at `link_distance`.
    pub edge_far: f32,
    pub edge_green: u8,
    pub edge_blue: u8,
    pub edge_alpha: u8,
    /// `None` seeds from OS entropy on every setup.
    pub seed: Option<u64>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            count: 150,
            link_distance: 150.0,
            max_speed: 1.0,
            stroke_weight: 1.5,
            trail: [15, 15, 25, 40],
            edge_near: 255.0,
            edge_far: 50.0,
            edge_green: 180,
            edge_blue: 255,
            edge_alpha: 120,
            seed: None,
        }
    }
}

// ============================================================================
// Kandinsky Configuration
// ============================================================================

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(default)]
pub struct KandinskyConfig {
    pub seed: u64,
    /// Canvas edge as a fraction of the window edge.
    pub canvas_scale: f32,
    pub ring_count: usize,
    pub swivel_count: usize,
    pub slide_count: usize,
    pub confetti_count: usize,
    /// Grain specks per canvas pixel.
    pub grain_density: f32,
    pub palette: Palette,
}

impl Default for KandinskyConfig {
    fn default() -> Self {
        Self {
            seed: 20250811,
            canvas_scale: 0.5,
            ring_count: 5,
            swivel_count: 6,
            slide_count: 5,
            confetti_count: 90,
            grain_density: 0.015,
            palette: Palette::kandinsky(),
        }
    }
}

// ============================================================================
// Export Configuration
// ============================================================================

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(default)]
pub struct ExportConfig {
    pub directory: PathBuf,
    /// Frames rendered by a sequence export.
    pub sequence_frames: usize,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            sequence_frames: 120,
        }
    }
}

// ============================================================================
// Main Configuration
// ============================================================================

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(default)]
pub struct StudioConfig {
    pub sketch: SketchKind,
    pub target_fps: u32,
    pub network: NetworkConfig,
    pub kandinsky: KandinskyConfig,
    pub export: ExportConfig,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            sketch: SketchKind::default(),
            target_fps: 60,
            network: NetworkConfig::default(),
            kandinsky: KandinskyConfig::default(),
            export: ExportConfig::default(),
        }
    }
}

impl StudioConfig {
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("writing config to {}", path.display()))?;
        Ok(())
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        let config = serde_json::from_str(&json)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }
}
