use std::sync::Mutex;

use super::Well1024a;

/// shared normal-deviate source: a single WELL-1024a instance behind a mutex
/// held only across the four draws needed for one Box-Muller pair.
pub struct NormalGenerator {
    well: Mutex<Well1024a>,
}

impl NormalGenerator {
    pub fn new(well: Well1024a) -> Self {
        Self {
            well: Mutex::new(well),
        }
    }

    pub fn from_entropy() -> Self {
        Self::new(Well1024a::from_entropy())
    }

    /// draw a pair of independent standard normal deviates via Box-Muller.
    pub fn get_normals(&self) -> (f64, f64) {
        let mut well = self.well.lock().expect("normal generator mutex poisoned");
        loop {
            let u0i = ((well.next_u32() as u64) << 32) | well.next_u32() as u64;
            let u1i = ((well.next_u32() as u64) << 32) | well.next_u32() as u64;
            let u0 = u0i as f64 / (u64::MAX as f64 + 1.0);
            let u1 = u1i as f64 / (u64::MAX as f64 + 1.0);
            if u1 <= 0.0 {
                // vanishingly unlikely; redraw rather than take ln(0)
                continue;
            }
            let radius = (-2.0 * u1.ln()).sqrt();
            let angle = 2.0 * std::f64::consts::PI * u0;
            return (radius * angle.cos(), radius * angle.sin());
        }
    }
}
