//! Kandinsky-inspired painting
//! Static colour fields, hatching and an arc under animated rings, swivels,
//! sliding lines and confetti, finished with a paper grain.

use egui::{pos2, vec2, Pos2, Vec2};

use crate::canvas::{rgb, rgba, BlendMode, Canvas, Stroke};
use crate::config::{KandinskyConfig, SketchKind};
use crate::grain::PaperGrain;
use crate::host::Sketch;
use crate::random::{NoiseField, SketchRng};
use crate::shapes::{ConfettiDot, Layer, Ring, Shape, Slide, Swivel, INK, PAPER};

const DEEP_BLUE: [u8; 3] = [0x1d, 0x35, 0x57];
const SKY_BLUE: [u8; 3] = [0x45, 0x7b, 0x9d];
const ORANGE: [u8; 3] = [0xf4, 0xa2, 0x61];
const YELLOW: [u8; 3] = [0xe9, 0xc4, 0x6a];

const GRID_COLS: usize = 6;
const GRID_ROWS: usize = 4;
const STRIPE_GAP: f32 = 38.0;
const WIRE_STEP: f32 = 20.0;

/// Static rectangular paper block.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Field {
    pub min: Pos2,
    pub size: Vec2,
    pub color: [u8; 3],
}

fn grid(start: f32, end: f32, cells: usize) -> Vec<f32> {
    (0..=cells)
        .map(|i| start + (end - start) * i as f32 / cells as f32)
        .collect()
}

/// The four colour fields, laid out on a 6x4 grid inset from the canvas edge.
pub fn layout_fields(width: f32, height: f32) -> [Field; 4] {
    let gx = grid(width * 0.08, width * 0.92, GRID_COLS);
    let gy = grid(height * 0.12, height * 0.88, GRID_ROWS);
    let field = |c0: usize, r0: usize, c1: usize, r1: usize, color: [u8; 3]| Field {
        min: pos2(gx[c0], gy[r0]),
        size: vec2(gx[c1] - gx[c0], gy[r1] - gy[r0]),
        color,
    };

    [
        field(0, 0, 2, 2, PAPER),
        field(2, 0, 4, 1, YELLOW),
        field(1, 2, 3, 4, ORANGE),
        field(4, 1, 6, 4, SKY_BLUE),
    ]
}

pub struct KandinskyPainting {
    config: KandinskyConfig,
    rng: SketchRng,
    noise: NoiseField,
    grain: PaperGrain,
    shapes: Vec<Shape>,
    confetti: Vec<ConfettiDot>,
}

impl KandinskyPainting {
    /// Seed everything in a fixed order: grain, rings, swivels, slides, confetti.
    pub fn new(config: KandinskyConfig, width: u32, height: u32) -> Self {
        let mut rng = SketchRng::seeded(config.seed);
        let noise = NoiseField::new(config.seed);
        let grain = PaperGrain::generate(width, height, config.grain_density, &mut rng);

        let (w, h) = (width as f32, height as f32);
        let palette = &config.palette;
        let mut shapes =
            Vec::with_capacity(config.ring_count + config.swivel_count + config.slide_count);
        for _ in 0..config.ring_count {
            shapes.push(Shape::Ring(Ring::generate(&mut rng, w, h, palette)));
        }
        for _ in 0..config.swivel_count {
            shapes.push(Shape::Swivel(Swivel::generate(&mut rng, w, h, palette)));
        }
        for _ in 0..config.slide_count {
            shapes.push(Shape::Slide(Slide::generate(&mut rng, palette)));
        }
        let confetti = (0..config.confetti_count)
            .map(|_| ConfettiDot::generate(&mut rng, w, h, palette))
            .collect();

        log::debug!(
            "Painting seeded with {} shapes and {} confetti (seed {})",
            shapes.len(),
            config.confetti_count,
            config.seed
        );

        Self {
            config,
            rng,
            noise,
            grain,
            shapes,
            confetti,
        }
    }

    #[cfg(test)]
    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    #[cfg(test)]
    pub fn confetti(&self) -> &[ConfettiDot] {
        &self.confetti
    }

    #[cfg(test)]
    pub fn grain(&self) -> &PaperGrain {
        &self.grain
    }

    fn draw_fields(canvas: &mut Canvas) {
        let size = canvas.size();
        canvas.with_blend(BlendMode::Multiply, |c| {
            for field in layout_fields(size.x, size.y) {
                c.fill_rect(field.min + field.size / 2.0, field.size, 0.0, 4.0, rgb(field.color));
            }
        });
    }

    fn draw_diagonal_stripes(canvas: &mut Canvas) {
        let size = canvas.size();
        let stroke = Stroke::new(2.0, rgba([10, 10, 10], 8));
        canvas.with_blend(BlendMode::Multiply, |c| {
            let mut i = -size.y;
            while i < size.x + size.y {
                c.line(pos2(i, 0.0), pos2(i - size.y, size.y), &stroke);
                i += STRIPE_GAP;
            }
        });
    }

    fn draw_big_arc(canvas: &mut Canvas) {
        let size = canvas.size();
        let diameter = size.x.min(size.y) * 0.7;
        let center = pos2(size.x * 0.72, size.y * 0.2);
        let stroke = Stroke::new(16.0, rgb(DEEP_BLUE)).square_cap();
        canvas.stroke_arc(center, diameter, 200.0, 330.0, &stroke);
    }

    fn draw_wire(canvas: &mut Canvas, frame: f32) {
        let size = canvas.size();
        let mut points = Vec::new();
        let mut x = 0.0;
        while x <= size.x {
            let y = size.y * 0.85 + (x * 0.8 + frame * 2.0).to_radians().sin() * 10.0;
            points.push(pos2(x, y));
            x += WIRE_STEP;
        }
        canvas.polyline(&points, &Stroke::new(3.0, rgb(INK)));

        let cross = Stroke::new(2.0, rgb(INK));
        canvas.line(
            pos2(size.x * 0.12, size.y * 0.18),
            pos2(size.x * 0.18, size.y * 0.12),
            &cross,
        );
        canvas.line(
            pos2(size.x * 0.12, size.y * 0.12),
            pos2(size.x * 0.18, size.y * 0.18),
            &cross,
        );
    }
}

impl Sketch for KandinskyPainting {
    fn kind(&self) -> SketchKind {
        SketchKind::Kandinsky
    }

    fn draw(&mut self, canvas: &mut Canvas, frame: u64) {
        let t = frame as f32;

        canvas.background(rgb(PAPER));
        Self::draw_fields(canvas);
        Self::draw_diagonal_stripes(canvas);
        Self::draw_big_arc(canvas);

        for layer in [Layer::Under, Layer::Core] {
            for shape in self.shapes.iter().filter(|s| s.layer() == layer) {
                shape.update_and_draw(canvas, &self.noise, t);
            }
        }

        for dot in &mut self.confetti {
            dot.update_and_draw(canvas, &self.noise, t);
        }

        Self::draw_wire(canvas, t);
        canvas.composite(self.grain.image(), BlendMode::Multiply);
    }

    fn resized(&mut self, canvas: &mut Canvas) {
        self.grain = PaperGrain::generate(
            canvas.width(),
            canvas.height(),
            self.config.grain_density,
            &mut self.rng,
        );
    }
}
