//! Synthetic line-camera frames: dark sky with bright horizontal strips.

pub const SKY: u8 = 30;
pub const STRIP: u8 = 200;

/// Horizontal strip covering rows `upper..=lower` at every column.
pub fn stripe_u8(width: usize, height: usize, upper: usize, lower: usize) -> Vec<u8> {
    stripes_u8(width, height, &[(upper, lower)])
}

/// Several strips, each spanning all columns.
pub fn stripes_u8(width: usize, height: usize, strips: &[(usize, usize)]) -> Vec<u8> {
    assert!(width > 0 && height > 0, "image dimensions must be positive");
    let mut img = vec![SKY; width * height];
    for &(upper, lower) in strips {
        assert!(upper <= lower && lower < height, "strip must lie inside the frame");
        for y in upper..=lower {
            img[y * width..(y + 1) * width].fill(STRIP);
        }
    }
    img
}

/// Paint rows `upper..=lower` of columns `columns` with `value`.
pub fn paint(
    img: &mut [u8],
    width: usize,
    columns: std::ops::Range<usize>,
    upper: usize,
    lower: usize,
    value: u8,
) {
    for y in upper..=lower {
        for x in columns.clone() {
            img[y * width + x] = value;
        }
    }
}

/// Strip whose position is offset per column by `offset(x)` rows.
pub fn shifted_stripe_u8<F: Fn(usize) -> i64>(
    width: usize,
    height: usize,
    upper: usize,
    lower: usize,
    offset: F,
) -> Vec<u8> {
    let mut img = vec![SKY; width * height];
    for x in 0..width {
        let d = offset(x);
        let u = (upper as i64 + d).clamp(0, height as i64 - 1) as usize;
        let l = (lower as i64 + d).clamp(0, height as i64 - 1) as usize;
        for y in u..=l {
            img[y * width + x] = STRIP;
        }
    }
    img
}

/// Deterministic xorshift sequence for reproducible noise and jitter.
pub struct XorShift(u64);

impl XorShift {
    pub fn new(seed: u64) -> Self {
        Self(seed.max(1))
    }

    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    /// Uniform integer in `-amp..=amp`.
    pub fn symmetric(&mut self, amp: i64) -> i64 {
        let span = (2 * amp + 1) as u64;
        (self.next_u64() % span) as i64 - amp
    }
}

/// Add uniform noise of amplitude `amp` to every pixel, saturating.
pub fn add_noise(img: &mut [u8], amp: i64, seed: u64) {
    let mut rng = XorShift::new(seed);
    for p in img.iter_mut() {
        *p = (i64::from(*p) + rng.symmetric(amp)).clamp(0, 255) as u8;
    }
}
