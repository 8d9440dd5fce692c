//! Frame Export for Sketch Studio
//! Single PNG snapshots and headless PNG-sequence renders

use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;

use anyhow::Context;
use egui::Vec2;
use image::RgbaImage;

use crate::config::StudioConfig;
use crate::host::SketchHost;

/// Messages from the export thread to the UI.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportMessage {
    /// (current_frame, total_frames)
    Progress(usize, usize),
    /// Directory the sequence was written to.
    Completed(PathBuf),
    Error(String),
}

pub fn frame_path(dir: &Path, base_name: &str) -> PathBuf {
    dir.join(format!("{base_name}.png"))
}

pub fn sequence_path(dir: &Path, base_name: &str, index: usize) -> PathBuf {
    dir.join(format!("{base_name}_{index:05}.png"))
}

/// Write `image` as `<dir>/<base_name>.png`, replacing any earlier snapshot.
pub fn save_frame(image: &RgbaImage, dir: &Path, base_name: &str) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("creating export directory {}", dir.display()))?;
    let path = frame_path(dir, base_name);
    image
        .save(&path)
        .with_context(|| format!("saving frame to {}", path.display()))?;
    log::info!("Saved frame to {}", path.display());
    Ok(path)
}

/// Render `config.export.sequence_frames` frames of the configured sketch on a
/// private host and write them as a PNG sequence.
///
/// `main.rs` spawns this on a background thread.
pub fn run_sequence_export(config: StudioConfig, window: Vec2, progress_tx: Sender<ExportMessage>) {
    match render_sequence(config, window, &progress_tx) {
        Ok(dir) => {
            log::info!("Sequence export completed in {}", dir.display());
            let _ = progress_tx.send(ExportMessage::Completed(dir));
        }
        Err(e) => {
            log::error!("Sequence export failed: {e:#}");
            let _ = progress_tx.send(ExportMessage::Error(format!("{e:#}")));
        }
    }
}

fn render_sequence(
    config: StudioConfig,
    window: Vec2,
    progress_tx: &Sender<ExportMessage>,
) -> anyhow::Result<PathBuf> {
    let total = config.export.sequence_frames;
    if total == 0 {
        anyhow::bail!("Export length is 0 frames");
    }
    let dir = config.export.directory.clone();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("creating export directory {}", dir.display()))?;

    let mut host = SketchHost::new(config, window);
    let base_name = host.kind().base_name();

    for index in 1..=total {
        host.step();
        let path = sequence_path(&dir, base_name, index);
        host.canvas()
            .to_image()
            .save(&path)
            .with_context(|| format!("saving frame to {}", path.display()))?;
        let _ = progress_tx.send(ExportMessage::Progress(index, total));
    }

    Ok(dir)
}
