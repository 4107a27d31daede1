/// Gradient noise for demo terrain
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const TABLE_SIZE: usize = 255;

/// 2D Perlin noise over a seeded table of unit gradients.
///
/// The lattice wraps every 255 cells, so values repeat at that period.
pub struct Perlin2d {
    gradients: Vec<(f32, f32)>,
}

impl Perlin2d {
    pub fn new(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let gradients = (0..TABLE_SIZE * TABLE_SIZE)
            .map(|_| {
                let x: f32 = rng.gen_range(-1.0..=1.0);
                let y: f32 = rng.gen_range(-1.0..=1.0);
                let len = (x * x + y * y).sqrt();
                if len > 0.0 {
                    (x / len, y / len)
                } else {
                    (0.0, 0.0)
                }
            })
            .collect();
        Self { gradients }
    }

    fn gradient(&self, ix: i64, iy: i64) -> (f32, f32) {
        let n = TABLE_SIZE as i64;
        let x = ix.rem_euclid(n) as usize;
        let y = iy.rem_euclid(n) as usize;
        self.gradients[y * TABLE_SIZE + x]
    }

    /// Noise value at (x, y), roughly in [-0.7, 0.7] and 0 on lattice points
    pub fn noise(&self, x: f32, y: f32) -> f32 {
        let x0 = x.floor();
        let y0 = y.floor();
        let (ix, iy) = (x0 as i64, y0 as i64);
        let (fx, fy) = (x - x0, y - y0);

        let corner = |dx: i64, dy: i64| {
            let g = self.gradient(ix + dx, iy + dy);
            g.0 * (fx - dx as f32) + g.1 * (fy - dy as f32)
        };
        let s = corner(0, 0);
        let t = corner(1, 0);
        let u = corner(0, 1);
        let v = corner(1, 1);

        let sx = s_curve(fx);
        let sy = s_curve(fy);
        let a = s + sx * (t - s);
        let b = u + sx * (v - u);
        a + sy * (b - a)
    }

    /// Two octaves of noise at the given frequency
    pub fn octaves(&self, x: f32, y: f32, frequency: f32) -> f32 {
        0.5 * self.noise(x * frequency, y * frequency)
            + 0.25 * self.noise(x * frequency * 2.0, y * frequency * 2.0)
    }
}

fn s_curve(t: f32) -> f32 {
    t * t * (3.0 - 2.0 * t)
}
