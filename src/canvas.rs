//! CPU canvas for Sketch Studio
//! Float RGB frame buffer with analytic (signed-distance) anti-aliasing.
//!
//! Every primitive is rasterised by evaluating a signed distance function at
//! pixel centres inside the primitive's bounding box. Coverage is
//! `clamp(0.5 - sdf, 0, 1)`, giving a one-pixel soft edge. Source colours are
//! straight-alpha RGBA8; the canvas itself is always opaque.

use egui::{pos2, vec2, Pos2, Vec2};
use image::{Rgba, RgbaImage};
use rayon::prelude::*;

/// Straight-alpha colour used by all drawing calls.
pub type Color = Rgba<u8>;

/// Smallest edge a canvas is allowed to have.
pub const MIN_CANVAS_SIZE: u32 = 1;

pub fn rgb(c: [u8; 3]) -> Color {
    Rgba([c[0], c[1], c[2], 255])
}

pub fn rgba(c: [u8; 3], alpha: u8) -> Color {
    Rgba([c[0], c[1], c[2], alpha])
}

/// Rotate `v` clockwise on screen (y down) by `degrees`.
pub fn rotate(v: Vec2, degrees: f32) -> Vec2 {
    let (s, c) = degrees.to_radians().sin_cos();
    vec2(v.x * c - v.y * s, v.x * s + v.y * c)
}

/// Point at `radius` from `center` in direction `degrees`.
pub fn polar(center: Pos2, degrees: f32, radius: f32) -> Pos2 {
    let (s, c) = degrees.to_radians().sin_cos();
    pos2(center.x + c * radius, center.y + s * radius)
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum BlendMode {
    #[default]
    Normal,
    Multiply,
}

impl BlendMode {
    fn apply(self, dst: &mut [f32; 3], src: [f32; 3], alpha: f32) {
        match self {
            BlendMode::Normal => {
                for c in 0..3 {
                    dst[c] += (src[c] - dst[c]) * alpha;
                }
            }
            BlendMode::Multiply => {
                for c in 0..3 {
                    let product = src[c] * dst[c] / 255.0;
                    dst[c] += (product - dst[c]) * alpha;
                }
            }
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum StrokeCap {
    #[default]
    Round,
    Square,
}

#[derive(Clone, Copy, Debug)]
pub struct Stroke {
    pub color: Color,
    pub weight: f32,
    pub cap: StrokeCap,
}

impl Stroke {
    pub fn new(weight: f32, color: Color) -> Self {
        Self {
            color,
            weight,
            cap: StrokeCap::Round,
        }
    }

    pub fn square_cap(mut self) -> Self {
        self.cap = StrokeCap::Square;
        self
    }

    fn half(&self) -> f32 {
        self.weight.max(0.0) / 2.0
    }
}

pub struct Canvas {
    width: u32,
    height: u32,
    rgb: Vec<[f32; 3]>,
    blend: BlendMode,
}

fn clamp_size(width: u32, height: u32) -> (u32, u32) {
    (width.max(MIN_CANVAS_SIZE), height.max(MIN_CANVAS_SIZE))
}

fn channels(color: Color) -> ([f32; 3], f32) {
    (
        [color[0] as f32, color[1] as f32, color[2] as f32],
        color[3] as f32 / 255.0,
    )
}

fn segment_distance(p: Pos2, a: Pos2, b: Pos2) -> f32 {
    let ab = b - a;
    let ap = p - a;
    let len_sq = ab.length_sq();
    let t = if len_sq > 0.0 {
        (ap.dot(ab) / len_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };
    (ap - ab * t).length()
}

/// Signed distance to an axis-aligned box of half extents `half` centred at the origin.
fn box_distance(local: Vec2, half: Vec2) -> f32 {
    let qx = local.x.abs() - half.x;
    let qy = local.y.abs() - half.y;
    vec2(qx.max(0.0), qy.max(0.0)).length() + qx.max(qy).min(0.0)
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        let (width, height) = clamp_size(width, height);
        Self {
            width,
            height,
            rgb: vec![[0.0; 3]; (width * height) as usize],
            blend: BlendMode::Normal,
        }
    }

    /// Reallocate to the new size. Contents are cleared to black, like a host
    /// `resizeCanvas`.
    pub fn resize(&mut self, width: u32, height: u32) {
        let (width, height) = clamp_size(width, height);
        if self.width == width && self.height == height {
            return;
        }
        self.width = width;
        self.height = height;
        self.rgb = vec![[0.0; 3]; (width * height) as usize];
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> Vec2 {
        vec2(self.width as f32, self.height as f32)
    }

    #[cfg(test)]
    pub fn blend_mode(&self) -> BlendMode {
        self.blend
    }

    /// Run `f` with `mode` active, restoring the previous mode afterwards.
    pub fn with_blend<R>(&mut self, mode: BlendMode, f: impl FnOnce(&mut Self) -> R) -> R {
        let previous = self.blend;
        self.blend = mode;
        let result = f(self);
        self.blend = previous;
        result
    }

    /// Fill the whole canvas. Always a normal blend at the colour's alpha.
    pub fn background(&mut self, color: Color) {
        let (src, alpha) = channels(color);
        self.rgb
            .par_iter_mut()
            .for_each(|px| BlendMode::Normal.apply(px, src, alpha));
    }

    #[cfg(test)]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let px = self.rgb[(y * self.width + x) as usize];
        Some([quantize(px[0]), quantize(px[1]), quantize(px[2])])
    }

    pub fn line(&mut self, a: Pos2, b: Pos2, stroke: &Stroke) {
        let half = stroke.half();
        if half <= 0.0 {
            return;
        }
        let pad = stroke.weight;
        let min = pos2(a.x.min(b.x) - pad, a.y.min(b.y) - pad);
        let max = pos2(a.x.max(b.x) + pad, a.y.max(b.y) + pad);

        match stroke.cap {
            StrokeCap::Round => {
                self.cover(min, max, stroke.color, |p| segment_distance(p, a, b) - half);
            }
            StrokeCap::Square => {
                let along = b - a;
                let len = along.length();
                let dir = if len > 0.0 { along / len } else { vec2(1.0, 0.0) };
                let normal = vec2(-dir.y, dir.x);
                let mid = a + along * 0.5;
                let extent = vec2(len / 2.0 + half, half);
                self.cover(min, max, stroke.color, |p| {
                    let local = p - mid;
                    box_distance(vec2(local.dot(dir), local.dot(normal)), extent)
                });
            }
        }
    }

    /// Open polyline with round joins, blended once per pixel.
    pub fn polyline(&mut self, points: &[Pos2], stroke: &Stroke) {
        let half = stroke.half();
        if points.len() < 2 || half <= 0.0 {
            return;
        }
        let mut min = points[0];
        let mut max = points[0];
        for p in points {
            min = min.min(*p);
            max = max.max(*p);
        }
        let pad = vec2(stroke.weight, stroke.weight);

        self.cover(min - pad, max + pad, stroke.color, |p| {
            points
                .windows(2)
                .map(|seg| segment_distance(p, seg[0], seg[1]))
                .fold(f32::INFINITY, f32::min)
                - half
        });
    }

    pub fn fill_circle(&mut self, center: Pos2, diameter: f32, color: Color) {
        let radius = diameter.abs() / 2.0;
        if radius <= 0.0 {
            return;
        }
        let extent = vec2(radius, radius);
        self.cover(center - extent, center + extent, color, |p| {
            (p - center).length() - radius
        });
    }

    /// Filled rectangle centred at `center`, rotated by `angle` degrees.
    /// `corner_radius` is clamped to half the shorter side, so a huge value
    /// gives fully rounded ends.
    pub fn fill_rect(&mut self, center: Pos2, size: Vec2, angle: f32, corner_radius: f32, color: Color) {
        let half = vec2(size.x.abs() / 2.0, size.y.abs() / 2.0);
        if half.x <= 0.0 || half.y <= 0.0 {
            return;
        }
        let radius = corner_radius.clamp(0.0, half.x.min(half.y));
        let inner = half - vec2(radius, radius);
        let reach = half.length();
        let extent = vec2(reach, reach);

        self.cover(center - extent, center + extent, color, |p| {
            let local = rotate(p - center, -angle);
            box_distance(local, inner) - radius
        });
    }

    /// Stroked arc from `start` to `stop` degrees, clockwise on screen.
    pub fn stroke_arc(&mut self, center: Pos2, diameter: f32, start: f32, stop: f32, stroke: &Stroke) {
        let radius = diameter.abs() / 2.0;
        let half = stroke.half();
        if radius <= 0.0 || half <= 0.0 {
            return;
        }
        let span = (stop - start).clamp(0.0, 360.0);
        let extent = vec2(radius + stroke.weight, radius + stroke.weight);

        match stroke.cap {
            StrokeCap::Square => {
                let overhang = (half / radius).to_degrees();
                self.cover(center - extent, center + extent, stroke.color, |p| {
                    let d = p - center;
                    let angle = d.y.atan2(d.x).to_degrees();
                    let rel = (angle - start + overhang).rem_euclid(360.0);
                    if rel <= span + 2.0 * overhang {
                        (d.length() - radius).abs() - half
                    } else {
                        f32::INFINITY
                    }
                });
            }
            StrokeCap::Round => {
                let head = polar(center, start, radius);
                let tail = polar(center, stop, radius);
                self.cover(center - extent, center + extent, stroke.color, |p| {
                    let d = p - center;
                    let angle = d.y.atan2(d.x).to_degrees();
                    if (angle - start).rem_euclid(360.0) <= span {
                        (d.length() - radius).abs() - half
                    } else {
                        (p - head).length().min((p - tail).length()) - half
                    }
                });
            }
        }
    }

    /// Composite a same-sized straight-alpha image over the canvas.
    pub fn composite(&mut self, image: &RgbaImage, mode: BlendMode) {
        if image.dimensions() != (self.width, self.height) {
            log::warn!(
                "Skipping composite: image is {:?}, canvas is {}x{}",
                image.dimensions(),
                self.width,
                self.height
            );
            return;
        }
        self.rgb
            .par_iter_mut()
            .zip(image.as_raw().par_chunks_exact(4))
            .for_each(|(dst, src)| {
                let alpha = src[3] as f32 / 255.0;
                if alpha > 0.0 {
                    mode.apply(dst, [src[0] as f32, src[1] as f32, src[2] as f32], alpha);
                }
            });
    }

    /// Quantise to an opaque RGBA8 image.
    pub fn to_image(&self) -> RgbaImage {
        let mut raw = vec![0u8; self.rgb.len() * 4];
        raw.par_chunks_exact_mut(4)
            .zip(self.rgb.par_iter())
            .for_each(|(out, px)| {
                out[0] = quantize(px[0]);
                out[1] = quantize(px[1]);
                out[2] = quantize(px[2]);
                out[3] = 255;
            });
        RgbaImage::from_raw(self.width, self.height, raw)
            .unwrap_or_else(|| RgbaImage::new(self.width, self.height))
    }

    fn cover(&mut self, min: Pos2, max: Pos2, color: Color, sdf: impl Fn(Pos2) -> f32) {
        let (src, alpha) = channels(color);
        if alpha <= 0.0 {
            return;
        }
        let x0 = (min.x - 1.0).floor().max(0.0) as u32;
        let y0 = (min.y - 1.0).floor().max(0.0) as u32;
        let x1 = (max.x + 1.0).ceil().min(self.width as f32) as u32;
        let y1 = (max.y + 1.0).ceil().min(self.height as f32) as u32;
        if x0 >= x1 || y0 >= y1 {
            return;
        }

        let mode = self.blend;
        for y in y0..y1 {
            let row = (y * self.width) as usize;
            for x in x0..x1 {
                let p = pos2(x as f32 + 0.5, y as f32 + 0.5);
                let coverage = (0.5 - sdf(p)).clamp(0.0, 1.0);
                if coverage <= 0.0 {
                    continue;
                }
                mode.apply(&mut self.rgb[row + x as usize], src, alpha * coverage);
            }
        }
    }
}

fn quantize(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: [u8; 3] = [255, 255, 255];
    const BLACK: [u8; 3] = [0, 0, 0];

    #[test]
    fn zero_size_is_clamped() {
        let canvas = Canvas::new(0, 0);
        assert_eq!((canvas.width(), canvas.height()), (1, 1));

        let mut canvas = Canvas::new(10, 10);
        canvas.resize(0, 7);
        assert_eq!((canvas.width(), canvas.height()), (1, 7));
    }

    #[test]
    fn opaque_background_replaces_pixels() {
        let mut canvas = Canvas::new(4, 3);
        canvas.background(rgb([242, 233, 228]));
        assert_eq!(canvas.pixel(3, 2), Some([242, 233, 228]));
        assert_eq!(canvas.pixel(4, 0), None);
    }

    #[test]
    fn translucent_background_accumulates() {
        let mut canvas = Canvas::new(2, 2);
        canvas.background(rgb(WHITE));
        canvas.background(rgba(BLACK, 128));
        let [r, _, _] = canvas.pixel(0, 0).unwrap();
        assert!((126..=128).contains(&r), "got {r}");
    }

    #[test]
    fn multiply_with_white_is_identity() {
        let mut canvas = Canvas::new(8, 8);
        canvas.background(rgb([120, 60, 30]));
        canvas.with_blend(BlendMode::Multiply, |c| {
            c.fill_rect(pos2(4.0, 4.0), vec2(20.0, 20.0), 0.0, 0.0, rgb(WHITE));
        });
        assert_eq!(canvas.pixel(4, 4), Some([120, 60, 30]));
        assert_eq!(canvas.blend_mode(), BlendMode::Normal);
    }

    #[test]
    fn multiply_darkens() {
        let mut canvas = Canvas::new(8, 8);
        canvas.background(rgb([200, 200, 200]));
        canvas.with_blend(BlendMode::Multiply, |c| {
            c.fill_circle(pos2(4.0, 4.0), 20.0, rgb([128, 255, 0]));
        });
        let [r, g, b] = canvas.pixel(4, 4).unwrap();
        assert_eq!(g, 200);
        assert_eq!(b, 0);
        assert!((99..=101).contains(&r), "got {r}");
    }

    #[test]
    fn circle_covers_center_only() {
        let mut canvas = Canvas::new(40, 40);
        canvas.background(rgb(BLACK));
        canvas.fill_circle(pos2(20.0, 20.0), 10.0, rgb(WHITE));
        assert_eq!(canvas.pixel(20, 20), Some(WHITE));
        assert_eq!(canvas.pixel(2, 2), Some(BLACK));
        assert_eq!(canvas.pixel(20, 27), Some(BLACK));
    }

    #[test]
    fn square_cap_extends_past_endpoint() {
        let stroke = Stroke::new(6.0, rgb(WHITE));
        let mut round = Canvas::new(40, 20);
        round.line(pos2(10.0, 10.0), pos2(30.0, 10.0), &stroke);
        let mut square = Canvas::new(40, 20);
        square.line(pos2(10.0, 10.0), pos2(30.0, 10.0), &stroke.square_cap());

        // Corner of the cap: inside the square cap, outside the round one.
        assert_eq!(square.pixel(31, 12), Some(WHITE));
        assert_ne!(round.pixel(32, 12), Some(WHITE));
    }

    #[test]
    fn rotated_rect_follows_angle() {
        let mut canvas = Canvas::new(60, 60);
        canvas.fill_rect(pos2(30.0, 30.0), vec2(40.0, 4.0), 90.0, 0.0, rgb(WHITE));
        assert_eq!(canvas.pixel(30, 12), Some(WHITE));
        assert_eq!(canvas.pixel(12, 30), Some(BLACK));
    }

    #[test]
    fn arc_only_covers_its_span() {
        let mut canvas = Canvas::new(100, 100);
        let stroke = Stroke::new(4.0, rgb(WHITE)).square_cap();
        canvas.stroke_arc(pos2(50.0, 50.0), 60.0, 0.0, 90.0, &stroke);
        // 45 degrees is inside the span (down-right on screen).
        let inside = polar(pos2(50.0, 50.0), 45.0, 30.0);
        assert_eq!(canvas.pixel(inside.x as u32, inside.y as u32), Some(WHITE));
        // 225 degrees is outside.
        let outside = polar(pos2(50.0, 50.0), 225.0, 30.0);
        assert_eq!(canvas.pixel(outside.x as u32, outside.y as u32), Some(BLACK));
    }

    #[test]
    fn polyline_draws_every_segment() {
        let mut canvas = Canvas::new(50, 50);
        let points = [pos2(5.0, 5.0), pos2(45.0, 5.0), pos2(45.0, 45.0)];
        canvas.polyline(&points, &Stroke::new(3.0, rgb(WHITE)));
        assert_eq!(canvas.pixel(25, 5), Some(WHITE));
        assert_eq!(canvas.pixel(45, 25), Some(WHITE));
        assert_eq!(canvas.pixel(25, 25), Some(BLACK));
    }

    #[test]
    fn composite_requires_matching_size() {
        let mut canvas = Canvas::new(4, 4);
        canvas.background(rgb(WHITE));
        let wrong = RgbaImage::from_pixel(3, 3, Rgba([0, 0, 0, 255]));
        canvas.composite(&wrong, BlendMode::Multiply);
        assert_eq!(canvas.pixel(0, 0), Some(WHITE));

        let right = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 255]));
        canvas.composite(&right, BlendMode::Multiply);
        assert_eq!(canvas.pixel(0, 0), Some(BLACK));
    }

    #[test]
    fn image_matches_pixels() {
        let mut canvas = Canvas::new(5, 3);
        canvas.background(rgb([1, 2, 3]));
        let image = canvas.to_image();
        assert_eq!(image.dimensions(), (5, 3));
        assert_eq!(image.get_pixel(4, 2), &Rgba([1, 2, 3, 255]));
    }
}
