//! Particle Network sketch
//! Drifting points linked by distance-shaded edges over a trailing background

use egui::{vec2, Vec2};
use rayon::prelude::*;

use crate::canvas::{rgb, rgba, Canvas, Color, Stroke};
use crate::config::{NetworkConfig, SketchKind};
use crate::host::Sketch;
use crate::random::SketchRng;

/// Individual drifting point
#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
}

impl Particle {
    /// Advance by one frame of velocity, bouncing off the `[0, width] x [0, height]` box.
    pub fn step(&mut self, width: f32, height: f32) {
        self.pos += self.vel;
        reflect(&mut self.pos.x, &mut self.vel.x, width);
        reflect(&mut self.pos.y, &mut self.vel.y, height);
    }
}

/// A coordinate that left `[0, extent]` is put back on the boundary and its
/// velocity component is pointed inward.
fn reflect(pos: &mut f32, vel: &mut f32, extent: f32) {
    if *pos < 0.0 {
        *pos = 0.0;
        *vel = vel.abs();
    } else if *pos > extent {
        *pos = extent;
        *vel = -vel.abs();
    }
}

/// Link between two particles, `a < b`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Edge {
    pub a: usize,
    pub b: usize,
    pub distance: f32,
}

pub struct ParticleNetwork {
    config: NetworkConfig,
    pub particles: Vec<Particle>,
}

impl ParticleNetwork {
    pub fn new(config: NetworkConfig, width: f32, height: f32) -> Self {
        let mut rng = match config.seed {
            Some(seed) => SketchRng::seeded(seed),
            None => SketchRng::from_entropy(),
        };
        let speed = config.max_speed;

        let particles = (0..config.count)
            .map(|_| {
                let x = rng.below(width);
                let y = rng.below(height);
                let vx = rng.range(-speed, speed);
                let vy = rng.range(-speed, speed);
                Particle {
                    pos: vec2(x, y),
                    vel: vec2(vx, vy),
                }
            })
            .collect();

        log::debug!("Seeded {} network particles", config.count);
        Self { config, particles }
    }

    pub fn update(&mut self, width: f32, height: f32) {
        self.particles
            .par_iter_mut()
            .for_each(|p| p.step(width, height));
    }

    pub fn distance(&self, i: usize, j: usize) -> f32 {
        (self.particles[i].pos - self.particles[j].pos).length()
    }

    /// Every unordered pair closer than the link distance. Plain O(n²) scan.
    pub fn edges(&self) -> Vec<Edge> {
        let mut edges = Vec::new();
        for a in 0..self.particles.len() {
            for b in (a + 1)..self.particles.len() {
                let distance = self.distance(a, b);
                if distance < self.config.link_distance {
                    edges.push(Edge { a, b, distance });
                }
            }
        }
        edges
    }

    /// Closer pairs get the higher first channel.
    pub fn edge_color(&self, distance: f32) -> Color {
        let cfg = &self.config;
        let t = if cfg.link_distance > 0.0 {
            distance / cfg.link_distance
        } else {
            0.0
        };
        let red = cfg.edge_near + (cfg.edge_far - cfg.edge_near) * t;
        rgba(
            [red.round().clamp(0.0, 255.0) as u8, cfg.edge_green, cfg.edge_blue],
            cfg.edge_alpha,
        )
    }

    pub fn render(&self, canvas: &mut Canvas) {
        let [r, g, b, a] = self.config.trail;
        canvas.background(rgba([r, g, b], a));

        for edge in self.edges() {
            let stroke = Stroke::new(self.config.stroke_weight, self.edge_color(edge.distance));
            canvas.line(
                self.particles[edge.a].pos.to_pos2(),
                self.particles[edge.b].pos.to_pos2(),
                &stroke,
            );
        }
    }

    fn paint_base(&self, canvas: &mut Canvas) {
        let [r, g, b, _] = self.config.trail;
        canvas.background(rgb([r, g, b]));
    }
}

impl Sketch for ParticleNetwork {
    fn kind(&self) -> SketchKind {
        SketchKind::ParticleNetwork
    }

    fn setup(&mut self, canvas: &mut Canvas) {
        self.paint_base(canvas);
    }

    fn draw(&mut self, canvas: &mut Canvas, _frame: u64) {
        self.update(canvas.width() as f32, canvas.height() as f32);
        self.render(canvas);
    }

    fn resized(&mut self, canvas: &mut Canvas) {
        self.paint_base(canvas);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(count: usize, seed: u64) -> NetworkConfig {
        NetworkConfig {
            count,
            seed: Some(seed),
            ..NetworkConfig::default()
        }
    }

    #[test]
    fn count_is_fixed() {
        let mut network = ParticleNetwork::new(seeded(150, 1), 800.0, 600.0);
        assert_eq!(network.particles.len(), 150);
        for _ in 0..10 {
            network.update(800.0, 600.0);
        }
        assert_eq!(network.particles.len(), 150);
    }

    #[test]
    fn particles_stay_in_bounds() {
        let (w, h) = (120.0, 80.0);
        let mut network = ParticleNetwork::new(seeded(150, 2), w, h);
        for _ in 0..2000 {
            network.update(w, h);
            for p in &network.particles {
                assert!((0.0..=w).contains(&p.pos.x), "x = {}", p.pos.x);
                assert!((0.0..=h).contains(&p.pos.y), "y = {}", p.pos.y);
            }
        }
    }

    #[test]
    fn shrinking_canvas_pulls_particles_back() {
        let mut network = ParticleNetwork::new(seeded(50, 3), 1000.0, 1000.0);
        network.update(10.0, 10.0);
        for p in &network.particles {
            assert!(p.pos.x <= 10.0 && p.pos.y <= 10.0);
        }
    }

    #[test]
    fn reflection_points_velocity_inward() {
        let mut p = Particle {
            pos: vec2(0.5, 50.0),
            vel: vec2(-1.0, 0.0),
        };
        p.step(100.0, 100.0);
        assert_eq!(p.pos.x, 0.0);
        assert_eq!(p.vel.x, 1.0);

        let mut p = Particle {
            pos: vec2(50.0, 99.5),
            vel: vec2(0.0, 1.0),
        };
        p.step(100.0, 100.0);
        assert_eq!(p.pos.y, 100.0);
        assert_eq!(p.vel.y, -1.0);
    }

    #[test]
    fn edges_are_symmetric_and_thresholded() {
        let network = ParticleNetwork::new(seeded(60, 4), 400.0, 300.0);
        let edges = network.edges();
        let n = network.particles.len();

        for i in 0..n {
            for j in (i + 1)..n {
                let d = network.distance(i, j);
                assert_eq!(d, network.distance(j, i));
                let linked = edges.iter().any(|e| e.a == i && e.b == j);
                assert_eq!(linked, d < 150.0, "pair ({i}, {j}) at {d}");
            }
        }
        assert!(edges.iter().all(|e| e.a < e.b));
    }

    #[test]
    fn edge_color_ramps_with_distance() {
        let network = ParticleNetwork::new(seeded(0, 5), 10.0, 10.0);
        assert_eq!(network.edge_color(0.0).0, [255, 180, 255, 120]);
        assert_eq!(network.edge_color(150.0).0, [50, 180, 255, 120]);
        assert!(network.edge_color(40.0)[0] > network.edge_color(90.0)[0]);
    }

    #[test]
    fn same_seed_same_points() {
        let a = ParticleNetwork::new(seeded(20, 6), 300.0, 200.0);
        let b = ParticleNetwork::new(seeded(20, 6), 300.0, 200.0);
        assert_eq!(a.particles, b.particles);
    }

    #[test]
    fn velocities_respect_max_speed() {
        let network = ParticleNetwork::new(seeded(200, 7), 300.0, 200.0);
        for p in &network.particles {
            assert!(p.vel.x.abs() <= 1.0 && p.vel.y.abs() <= 1.0);
        }
    }

    #[test]
    fn render_draws_links_over_trail() {
        let mut config = seeded(2, 8);
        config.trail = [15, 15, 25, 255];
        let mut network = ParticleNetwork::new(config, 100.0, 100.0);
        network.particles[0].pos = vec2(20.0, 50.0);
        network.particles[1].pos = vec2(80.0, 50.0);

        let mut canvas = Canvas::new(100, 100);
        network.render(&mut canvas);

        let [r, g, b] = canvas.pixel(50, 50).unwrap();
        assert!(r > 15 && g > 15 && b > 25, "edge pixel {:?}", (r, g, b));
        assert_eq!(canvas.pixel(50, 10), Some([15, 15, 25]));
    }
}
