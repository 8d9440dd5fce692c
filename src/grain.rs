//! Paper grain texture composited over the painting with a multiply blend.

use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, Blend};
use imageproc::rect::Rect;

use crate::random::SketchRng;

/// Alpha range of a single grain speck.
const SPECK_ALPHA: (f32, f32) = (8.0, 22.0);

/// Off-screen speckle buffer, always the size of the canvas it textures.
pub struct PaperGrain {
    image: RgbaImage,
}

impl PaperGrain {
    /// Scatter `width * height * density` translucent black 1x1 specks over a
    /// transparent buffer, alpha-blending where they overlap.
    pub fn generate(width: u32, height: u32, density: f32, rng: &mut SketchRng) -> Self {
        let blank = RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 0]));
        let mut layer = Blend(blank);
        let specks = (width as f32 * height as f32 * density.max(0.0)) as usize;

        for _ in 0..specks {
            let x = rng.below(width as f32);
            let y = rng.below(height as f32);
            let alpha = rng.range(SPECK_ALPHA.0, SPECK_ALPHA.1);
            draw_filled_rect_mut(
                &mut layer,
                Rect::at(x as i32, y as i32).of_size(1, 1),
                Rgba([0, 0, 0, alpha as u8]),
            );
        }

        log::debug!("Generated {specks} grain specks for {width}x{height}");
        Self { image: layer.0 }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    #[cfg(test)]
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}
