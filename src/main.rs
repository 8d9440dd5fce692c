//! Sketch Studio - Main Application
//! Plays the particle-network and Kandinsky sketches in an egui window

mod canvas;
mod config;
mod export;
mod grain;
mod host;
mod kandinsky;
mod network;
mod random;
mod shapes;

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver};
use std::time::Instant;

use clap::Parser;
use eframe::egui;
use config::{SketchKind, StudioConfig};
use export::ExportMessage;
use host::{KeyOutcome, SketchHost};

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "sketch-studio", version, about = "Generative sketches on a CPU canvas")]
struct Cli {
    /// Studio config (JSON) to load at start
    config: Option<PathBuf>,
}

/// Main application state
struct SketchStudioApp {
    host: SketchHost,
    texture: Option<egui::TextureHandle>,
    last_update: Instant,
    last_step: Instant,
    last_dt: f32,
    is_playing: bool,
    /// Set whenever the canvas changed and the texture needs re-uploading.
    texture_dirty: bool,
    /// Canvas area of the central panel, as of the last frame.
    canvas_area: egui::Vec2,

    status: Option<String>,

    // Export thread communication
    export_progress_rx: Option<Receiver<ExportMessage>>,
    export_progress: (usize, usize),
}

impl SketchStudioApp {
    fn new(cc: &eframe::CreationContext<'_>, config: StudioConfig) -> Self {
        let mut visuals = egui::Visuals::dark();
        visuals.panel_fill = egui::Color32::from_rgb(15, 15, 25);
        cc.egui_ctx.set_visuals(visuals);

        let window = cc.egui_ctx.screen_rect().size();
        let now = Instant::now();

        Self {
            host: SketchHost::new(config, window),
            canvas_area: window,
            texture: None,
            last_update: now,
            last_step: now,
            last_dt: 0.016,
            is_playing: true,
            texture_dirty: true,
            status: None,
            export_progress_rx: None,
            export_progress: (0, 0),
        }
    }

    fn report<T>(&mut self, result: anyhow::Result<T>, ok: impl FnOnce(T) -> String) {
        match result {
            Ok(value) => self.status = Some(ok(value)),
            Err(e) => {
                log::error!("{e:#}");
                self.status = Some(format!("Error: {e:#}"));
            }
        }
    }

    fn save_frame(&mut self) {
        let dir = self.host.config().export.directory.clone();
        let result = self.host.save_frame(&dir);
        self.report(result, |path| format!("Saved {}", path.display()));
    }

    fn reseed(&mut self) {
        self.host.reseed();
        self.texture_dirty = true;
        self.status = Some("Re-seeded".to_string());
    }

    fn start_sequence_export(&mut self, window: egui::Vec2) {
        if self.export_progress_rx.is_some() {
            return;
        }
        let (tx, rx) = mpsc::channel();
        let config = self.host.config().clone();
        self.export_progress = (0, config.export.sequence_frames);
        self.export_progress_rx = Some(rx);
        std::thread::spawn(move || export::run_sequence_export(config, window, tx));
        log::info!("Sequence export started in background thread");
    }

    fn poll_export(&mut self) {
        let mut finished = false;
        if let Some(ref rx) = self.export_progress_rx {
            while let Ok(msg) = rx.try_recv() {
                match msg {
                    ExportMessage::Progress(current, total) => {
                        self.export_progress = (current, total);
                    }
                    ExportMessage::Completed(dir) => {
                        self.status = Some(format!("Exported sequence to {}", dir.display()));
                        finished = true;
                    }
                    ExportMessage::Error(e) => {
                        self.status = Some(format!("Export failed: {e}"));
                        finished = true;
                    }
                }
            }
        }
        if finished {
            self.export_progress_rx = None;
        }
    }

    fn handle_keys(&mut self, ctx: &egui::Context) {
        let keys: Vec<char> = ctx.input(|i| {
            i.events
                .iter()
                .filter_map(|event| match event {
                    egui::Event::Text(text) => text.chars().next(),
                    _ => None,
                })
                .collect()
        });

        for key in keys {
            match self.host.handle_key(key) {
                Ok(KeyOutcome::Saved(path)) => {
                    self.status = Some(format!("Saved {}", path.display()));
                }
                Ok(KeyOutcome::Reseeded) => {
                    self.texture_dirty = true;
                    self.status = Some("Re-seeded".to_string());
                }
                Ok(KeyOutcome::Ignored) => {}
                Err(e) => {
                    log::error!("{e:#}");
                    self.status = Some(format!("Error: {e:#}"));
                }
            }
        }
    }

    fn load_config(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("JSON", &["json"])
            .pick_file()
        {
            match StudioConfig::load(&path) {
                Ok(config) => {
                    self.host.set_config(config);
                    self.texture_dirty = true;
                    self.status = Some(format!("Loaded {}", path.display()));
                }
                Err(e) => {
                    log::error!("Error loading config: {e:#}");
                    self.status = Some(format!("Error: {e:#}"));
                }
            }
        }
    }

    fn save_config(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("JSON", &["json"])
            .set_file_name("sketch_studio.json")
            .save_file()
        {
            let result = self.host.config().save(&path);
            self.report(result, |_| format!("Saved config to {}", path.display()));
        }
    }
}

impl eframe::App for SketchStudioApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        self.last_dt = now.duration_since(self.last_update).as_secs_f32();
        self.last_update = now;

        self.poll_export();
        self.handle_keys(ctx);

        self.render_top_bar(ctx);
        self.render_canvas(ctx);

        // Request continuous repaint for animation
        ctx.request_repaint();
    }
}

impl SketchStudioApp {
    fn render_top_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Sketch Studio");
                ui.separator();

                let mut selected = self.host.kind();
                egui::ComboBox::from_id_source("sketch_combo")
                    .selected_text(selected.name())
                    .show_ui(ui, |ui| {
                        for kind in SketchKind::all() {
                            ui.selectable_value(&mut selected, kind, kind.name());
                        }
                    });
                if selected != self.host.kind() {
                    self.host.switch_to(selected);
                    self.texture_dirty = true;
                }

                ui.separator();

                let play_label = if self.is_playing { "⏸ Pause" } else { "▶ Play" };
                if ui.button(play_label).clicked() {
                    self.is_playing = !self.is_playing;
                }
                if ui.button("🔀 Re-seed (R)").clicked() {
                    self.reseed();
                }
                if ui.button("💾 Save Frame (S)").clicked() {
                    self.save_frame();
                }

                ui.separator();

                if self.export_progress_rx.is_some() {
                    let (current, total) = self.export_progress;
                    ui.label(format!("Exporting {current}/{total}"));
                } else if ui.button("🎞 Export Sequence").clicked() {
                    self.start_sequence_export(self.canvas_area);
                }

                ui.separator();

                if ui.button("📂 Load Config").clicked() {
                    self.load_config();
                }
                if ui.button("💾 Save Config").clicked() {
                    self.save_config();
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let fps = 1.0 / self.last_dt.max(0.001);
                    ui.label(format!("FPS: {:.0}", fps));
                    ui.label(format!("Frame {}", self.host.frame()));
                    if let Some(ref status) = self.status {
                        ui.label(status);
                    }
                });
            });
        });
    }

    fn render_canvas(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let (rect, _) = ui.allocate_exact_size(ui.available_size(), egui::Sense::hover());
            self.canvas_area = rect.size();

            // Resize is applied before the next frame is drawn
            if self.host.resize(rect.size()) {
                self.texture_dirty = true;
            }

            if self.is_playing && self.last_step.elapsed() >= self.host.frame_duration() {
                self.last_step = Instant::now();
                self.host.step();
                self.texture_dirty = true;
            }

            if self.texture_dirty || self.texture.is_none() {
                let image = self.host.canvas().to_image();
                let size = [image.width() as usize, image.height() as usize];
                let color_image = egui::ColorImage::from_rgba_unmultiplied(size, image.as_raw());
                match self.texture {
                    Some(ref mut texture) => texture.set(color_image, egui::TextureOptions::LINEAR),
                    None => {
                        self.texture = Some(ctx.load_texture(
                            "sketch_canvas",
                            color_image,
                            egui::TextureOptions::LINEAR,
                        ))
                    }
                }
                self.texture_dirty = false;
            }

            if let Some(ref texture) = self.texture {
                let canvas_size = self.host.canvas().size();
                let canvas_rect = egui::Rect::from_center_size(rect.center(), canvas_size);
                let painter = ui.painter_at(rect);
                painter.image(
                    texture.id(),
                    canvas_rect,
                    egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                    egui::Color32::WHITE,
                );
            }
        });
    }
}

fn load_startup_config(cli: &Cli) -> StudioConfig {
    let Some(ref path) = cli.config else {
        return StudioConfig::default();
    };
    match StudioConfig::load(path) {
        Ok(config) => {
            log::info!("Loaded config from {}", path.display());
            config
        }
        Err(e) => {
            log::error!("Falling back to defaults: {e:#}");
            StudioConfig::default()
        }
    }
}

fn main() -> eframe::Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = load_startup_config(&cli);
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_title("Sketch Studio")
            .with_min_inner_size([320.0, 240.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Sketch Studio",
        options,
        Box::new(move |cc| Box::new(SketchStudioApp::new(cc, config))),
    )
}
