//! Animated shapes for the Kandinsky painting
//!
//! Rings, swivels and slides are pure functions of their creation-time
//! parameters and the frame counter. Confetti is the one shape that carries
//! mutable state (its noise-driven random walk).
//!
//! All angles are in degrees and turn clockwise on screen.

use egui::{pos2, vec2, Pos2};

use crate::canvas::{polar, rgb, rgba, BlendMode, Canvas, Stroke};
use crate::config::Palette;
use crate::random::{NoiseField, SketchRng};

pub const PAPER: [u8; 3] = [0xf2, 0xe9, 0xe4];
pub const INK: [u8; 3] = [0x0a, 0x0a, 0x0a];
pub const ACCENT_RED: [u8; 3] = [0xe6, 0x39, 0x46];

/// Radial tick marks drawn on every ring.
pub const RING_TICKS: usize = 5;

/// Confetti leaves the canvas by this margin before wrapping to the far side.
pub const WRAP_MARGIN: f32 = 10.0;

fn sin_deg(degrees: f32) -> f32 {
    degrees.to_radians().sin()
}

// ============================================================================
// Ring
// ============================================================================

/// Pulsing disc with a paper-coloured hole, orbiting satellites and radial ticks.
#[derive(Clone, Debug, PartialEq)]
pub struct Ring {
    pub center: Pos2,
    pub base_radius: f32,
    /// Fraction of the radius that is filled; the hole has radius `R * (1 - density)`.
    pub density: f32,
    pub color: [u8; 3],
    /// +1 clockwise, -1 counter-clockwise.
    pub dir: f32,
    pub spin: f32,
    pub pulse_speed: f32,
    pub satellite_colors: Vec<[u8; 3]>,
}

impl Ring {
    pub fn generate(rng: &mut SketchRng, width: f32, height: f32, palette: &Palette) -> Self {
        let center = pos2(
            rng.range(width * 0.2, width * 0.8),
            rng.range(height * 0.25, height * 0.75),
        );
        let base_radius = rng.range(50.0, width.min(height) * 0.15);
        let density = rng.range(0.4, 0.9);
        let color = rng.pick(palette.bolds());
        let dir = if rng.coin() { 1.0 } else { -1.0 };
        let spin = rng.below(360.0);
        let pulse_speed = rng.range(0.3, 0.8);
        let satellites = rng.range(3.0, 7.0).floor() as usize;
        let satellite_colors = (0..satellites).map(|_| rng.pick(&palette.colors)).collect();

        Self {
            center,
            base_radius,
            density,
            color,
            dir,
            spin,
            pulse_speed,
            satellite_colors,
        }
    }

    pub fn satellites(&self) -> usize {
        self.satellite_colors.len()
    }

    pub fn radius(&self, frame: f32) -> f32 {
        self.base_radius + sin_deg(frame * self.pulse_speed) * 6.0
    }

    pub fn rotation(&self, frame: f32) -> f32 {
        self.spin + frame * 0.4 * self.dir
    }

    /// Satellite angles in the ring's rotating frame, evenly spaced by `360 / k`.
    pub fn satellite_angles(&self, frame: f32) -> Vec<f32> {
        let k = self.satellites();
        let step = 360.0 / k as f32;
        (0..k)
            .map(|i| step * i as f32 + frame * 1.2 * self.dir)
            .collect()
    }

    pub fn tick_angles(&self, frame: f32) -> [f32; RING_TICKS] {
        std::array::from_fn(|k| self.spin + k as f32 * 36.0 + frame * 0.6 * self.dir)
    }

    pub fn draw(&self, canvas: &mut Canvas, frame: f32) {
        let radius = self.radius(frame);
        let rotation = self.rotation(frame);

        canvas.fill_circle(self.center, radius * 2.0, rgba(self.color, 180));
        canvas.fill_circle(self.center, radius * (1.0 - self.density) * 2.0, rgb(PAPER));

        let orbit = radius * 0.68;
        for (i, angle) in self.satellite_angles(frame).into_iter().enumerate() {
            let pos = polar(self.center, rotation + angle, orbit);
            let diameter = 10.0 + 4.0 * sin_deg(frame * 2.0 + i as f32 * 60.0);
            canvas.fill_circle(pos, diameter, rgb(self.satellite_colors[i]));
        }

        let tick = Stroke::new(2.0, rgb(INK));
        for angle in self.tick_angles(frame) {
            canvas.line(
                polar(self.center, angle, radius * 0.2),
                polar(self.center, angle, radius * 0.5),
                &tick,
            );
        }
    }
}

// ============================================================================
// Swivel
// ============================================================================

/// Rounded bar spinning about its centre, with an accent dot and a notch.
#[derive(Clone, Debug, PartialEq)]
pub struct Swivel {
    pub center: Pos2,
    pub length: f32,
    pub thickness: f32,
    pub color: [u8; 3],
    /// Degrees per frame; the sign is the direction.
    pub speed: f32,
    pub phase: f32,
}

impl Swivel {
    pub fn generate(rng: &mut SketchRng, width: f32, height: f32, palette: &Palette) -> Self {
        let center = pos2(
            rng.range(width * 0.15, width * 0.85),
            rng.range(height * 0.2, height * 0.85),
        );
        let length = rng.range(60.0, 160.0);
        let thickness = rng.range(8.0, 22.0);
        let color = rng.pick(palette.bolds());
        let sign = if rng.coin() { -1.0 } else { 1.0 };
        let speed = sign * rng.range(0.2, 0.8);
        let phase = rng.below(360.0);

        Self {
            center,
            length,
            thickness,
            color,
            speed,
            phase,
        }
    }

    pub fn angle(&self, frame: f32) -> f32 {
        self.phase + frame * self.speed
    }

    pub fn draw(&self, canvas: &mut Canvas, frame: f32) {
        let angle = self.angle(frame);

        canvas.fill_rect(
            self.center,
            vec2(self.length, self.thickness),
            angle,
            f32::MAX,
            rgb(self.color),
        );
        canvas.fill_circle(
            polar(self.center, angle, self.length * 0.28),
            self.thickness * 1.2,
            rgb(ACCENT_RED),
        );
        canvas.fill_rect(
            polar(self.center, angle, -self.length * 0.3),
            vec2(6.0, self.thickness * 0.9),
            angle,
            0.0,
            rgb(INK),
        );
    }
}

// ============================================================================
// Slide
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// Full-span line drifting along a noise curve.
#[derive(Clone, Debug, PartialEq)]
pub struct Slide {
    pub orientation: Orientation,
    pub color: [u8; 3],
    pub weight: f32,
    pub speed: f32,
    pub offset: f32,
}

impl Slide {
    pub fn generate(rng: &mut SketchRng, palette: &Palette) -> Self {
        let orientation = if rng.coin() {
            Orientation::Horizontal
        } else {
            Orientation::Vertical
        };
        let color = rng.pick(&palette.colors);
        let weight = rng.range(2.0, 6.0);
        let speed = rng.range(0.4, 1.2);
        let offset = rng.below(1000.0);

        Self {
            orientation,
            color,
            weight,
            speed,
            offset,
        }
    }

    /// Offset across the canvas, overshooting the edges by 10% either side.
    pub fn position(&self, noise: &NoiseField, frame: f32, extent: f32) -> f32 {
        let t = frame * self.speed;
        (noise.sample(self.offset + t * 0.002) * 1.2 - 0.1) * extent
    }

    pub fn draw(&self, canvas: &mut Canvas, noise: &NoiseField, frame: f32) {
        let size = canvas.size();
        let stroke = Stroke::new(self.weight, rgb(self.color));
        match self.orientation {
            Orientation::Horizontal => {
                let y = self.position(noise, frame, size.y);
                canvas.line(pos2(0.0, y), pos2(size.x, y), &stroke);
            }
            Orientation::Vertical => {
                let x = self.position(noise, frame, size.x);
                canvas.line(pos2(x, 0.0), pos2(x, size.y), &stroke);
            }
        }
    }
}

// ============================================================================
// Shape dispatch
// ============================================================================

/// Stateless animated shapes, drawn in one of two layers.
#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    Ring(Ring),
    Swivel(Swivel),
    Slide(Slide),
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Layer {
    /// Multiplied beneath everything else.
    Under,
    Core,
}

impl Shape {
    pub fn layer(&self) -> Layer {
        match self {
            Shape::Slide(_) => Layer::Under,
            Shape::Ring(_) | Shape::Swivel(_) => Layer::Core,
        }
    }

    pub fn update_and_draw(&self, canvas: &mut Canvas, noise: &NoiseField, frame: f32) {
        match self {
            Shape::Ring(ring) => ring.draw(canvas, frame),
            Shape::Swivel(swivel) => swivel.draw(canvas, frame),
            Shape::Slide(slide) => canvas.with_blend(BlendMode::Multiply, |c| {
                slide.draw(c, noise, frame)
            }),
        }
    }
}

// ============================================================================
// Confetti
// ============================================================================

/// Flickering dot on a toroidal random walk.
#[derive(Clone, Debug, PartialEq)]
pub struct ConfettiDot {
    pub pos: Pos2,
    pub diameter: f32,
    pub color: [u8; 3],
    /// Noise offset; also phases the flicker.
    pub n: f32,
}

impl ConfettiDot {
    pub fn generate(rng: &mut SketchRng, width: f32, height: f32, palette: &Palette) -> Self {
        let x = rng.below(width);
        let y = rng.below(height);
        let diameter = rng.range(3.0, 10.0);
        let color = rng.pick(&palette.colors);
        let n = rng.below(1000.0);

        Self {
            pos: pos2(x, y),
            diameter,
            color,
            n,
        }
    }

    /// Noise-driven displacement for this frame.
    pub fn drift(&mut self, noise: &NoiseField, frame: f32) {
        let t = frame * 0.003;
        let dx = (noise.sample(self.n + t) - 0.5) * 0.8;
        let dy = (noise.sample(self.n + 500.0 + t) - 0.5) * 0.8;
        self.pos += vec2(dx, dy);
    }

    pub fn alpha(&self, frame: f32) -> u8 {
        (180.0 + 60.0 * sin_deg(frame * 3.0 + self.n)).round() as u8
    }

    /// Teleport to the opposite side once a dot is past the margin.
    pub fn wrap(&mut self, width: f32, height: f32) {
        if self.pos.x < -WRAP_MARGIN {
            self.pos.x = width + WRAP_MARGIN;
        }
        if self.pos.x > width + WRAP_MARGIN {
            self.pos.x = -WRAP_MARGIN;
        }
        if self.pos.y < -WRAP_MARGIN {
            self.pos.y = height + WRAP_MARGIN;
        }
        if self.pos.y > height + WRAP_MARGIN {
            self.pos.y = -WRAP_MARGIN;
        }
    }

    /// Drift, draw at the new position, then wrap.
    pub fn update_and_draw(&mut self, canvas: &mut Canvas, noise: &NoiseField, frame: f32) {
        self.drift(noise, frame);
        canvas.fill_circle(self.pos, self.diameter, rgba(self.color, self.alpha(frame)));
        let size = canvas.size();
        self.wrap(size.x, size.y);
    }
}
